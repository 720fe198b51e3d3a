//! Provisional position of the node being dragged.

use reasongraph_common::{NodeId, ReasoningNode};

use super::transform::WorldPoint;

/// Single-slot store for the in-flight drag position.
///
/// Only one node can be dragged at a time, so the overlay holds at most one
/// entry. Writing a different node replaces the previous entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransientOverlay {
    slot: Option<(NodeId, WorldPoint)>,
}

impl TransientOverlay {
    pub fn set(&mut self, id: &str, position: WorldPoint) {
        if let Some((current, pos)) = &mut self.slot
            && current.as_str() == id
        {
            *pos = position;
            return;
        }
        self.slot = Some((id.to_string(), position));
    }

    pub fn get(&self, id: &str) -> Option<WorldPoint> {
        match &self.slot {
            Some((current, pos)) if current == id => Some(*pos),
            _ => None,
        }
    }

    /// Remove and return the entry for `id`, if it is the one held.
    pub fn take(&mut self, id: &str) -> Option<WorldPoint> {
        if self.get(id).is_some() {
            self.slot.take().map(|(_, pos)| pos)
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    pub fn len(&self) -> usize {
        usize::from(self.slot.is_some())
    }

    /// The transient position if the node is being dragged, else the committed one.
    pub fn effective_position(&self, node: &ReasoningNode) -> WorldPoint {
        self.get(&node.id).unwrap_or(node.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reasongraph_common::NodeType;

    #[test]
    fn test_single_slot() {
        let mut overlay = TransientOverlay::default();
        overlay.set("a", WorldPoint::new(1.0, 1.0));
        overlay.set("a", WorldPoint::new(2.0, 2.0));
        overlay.set("b", WorldPoint::new(3.0, 3.0));

        assert_eq!(overlay.len(), 1);
        assert_eq!(overlay.get("a"), None);
        assert_eq!(overlay.get("b"), Some(WorldPoint::new(3.0, 3.0)));
    }

    #[test]
    fn test_take_only_matching() {
        let mut overlay = TransientOverlay::default();
        overlay.set("a", WorldPoint::new(1.0, 1.0));

        assert_eq!(overlay.take("b"), None);
        assert!(!overlay.is_empty());
        assert_eq!(overlay.take("a"), Some(WorldPoint::new(1.0, 1.0)));
        assert!(overlay.is_empty());
    }

    #[test]
    fn test_effective_position() {
        let node = ReasoningNode::new(NodeType::Branch, WorldPoint::new(5.0, 5.0));
        let mut overlay = TransientOverlay::default();
        assert_eq!(overlay.effective_position(&node), WorldPoint::new(5.0, 5.0));

        overlay.set(&node.id, WorldPoint::new(9.0, 9.0));
        assert_eq!(overlay.effective_position(&node), WorldPoint::new(9.0, 9.0));
    }
}
