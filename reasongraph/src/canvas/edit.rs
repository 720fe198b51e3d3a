//! In-place text editing of one node.

use reasongraph_common::NodeId;

/// An open edit of a node's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub node_id: NodeId,
    pub buffer: String,
}

/// Editor state for the canvas. At most one node is edited at a time.
#[derive(Debug, Clone, Default)]
pub struct InlineEditor {
    session: Option<EditSession>,
}

impl InlineEditor {
    /// Start editing `node_id` from its current content.
    ///
    /// An edit already open on another node is returned so the caller can
    /// commit it.
    pub fn begin(&mut self, node_id: &str, content: &str) -> Option<EditSession> {
        if self.node_id() == Some(node_id) {
            return None;
        }
        self.session.replace(EditSession {
            node_id: node_id.to_string(),
            buffer: content.to_string(),
        })
    }

    pub fn node_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.node_id.as_str())
    }

    pub fn buffer(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.buffer.as_str())
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Append typed text. Control characters are dropped.
    pub fn insert(&mut self, text: &str) {
        if let Some(session) = &mut self.session {
            session
                .buffer
                .extend(text.chars().filter(|c| !c.is_control()));
        }
    }

    pub fn newline(&mut self) {
        if let Some(session) = &mut self.session {
            session.buffer.push('\n');
        }
    }

    pub fn backspace(&mut self) {
        if let Some(session) = &mut self.session {
            session.buffer.pop();
        }
    }

    /// Close the edit and return it for committing.
    pub fn commit(&mut self) -> Option<EditSession> {
        self.session.take()
    }

    /// Close the edit, discarding the buffer.
    pub fn discard(&mut self) {
        self.session = None;
    }
}
