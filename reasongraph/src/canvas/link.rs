//! Two-click node linking.

use reasongraph_common::NodeId;

/// Result of clicking a node while linking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// A connection from `source` to `target` should be added.
    Completed { source: NodeId, target: NodeId },
    /// The source was clicked again; linking stopped.
    Cancelled,
    /// No link was armed.
    Idle,
}

/// Link mode: either idle or armed with a source node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LinkMode {
    #[default]
    NoLink,
    ArmedAt(NodeId),
}

impl LinkMode {
    /// Arm linking from `source`. Refused while already armed.
    pub fn arm(&mut self, source: &str) -> bool {
        match self {
            LinkMode::NoLink => {
                *self = LinkMode::ArmedAt(source.to_string());
                true
            }
            LinkMode::ArmedAt(_) => false,
        }
    }

    /// Disarm. Returns whether a link was armed.
    pub fn cancel(&mut self) -> bool {
        matches!(std::mem::take(self), LinkMode::ArmedAt(_))
    }

    /// Feed a node click into the link machine.
    pub fn click(&mut self, node: &str) -> LinkOutcome {
        match std::mem::take(self) {
            LinkMode::NoLink => LinkOutcome::Idle,
            LinkMode::ArmedAt(source) if source == node => LinkOutcome::Cancelled,
            LinkMode::ArmedAt(source) => LinkOutcome::Completed {
                source,
                target: node.to_string(),
            },
        }
    }

    pub fn source(&self) -> Option<&str> {
        match self {
            LinkMode::ArmedAt(source) => Some(source),
            LinkMode::NoLink => None,
        }
    }

    pub fn is_armed(&self) -> bool {
        matches!(self, LinkMode::ArmedAt(_))
    }
}
