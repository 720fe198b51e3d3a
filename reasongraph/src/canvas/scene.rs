//! Per-frame projection of the graph into screen space.

use std::collections::HashMap;

use reasongraph_common::{NodeId, NodeType, ReasoningNode};

use super::edit::InlineEditor;
use super::link::LinkMode;
use super::overlay::TransientOverlay;
use super::transform::{ScreenPoint, ScreenRect, to_screen};
use super::viewport::Viewport;

/// Node card width in world units.
pub const NODE_WIDTH: f64 = 220.0;
/// Node card height in world units.
pub const NODE_HEIGHT: f64 = 100.0;

/// A node as it should be drawn this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSprite {
    pub id: NodeId,
    pub kind: NodeType,
    /// Card centre on screen.
    pub screen_position: ScreenPoint,
    pub bounds: ScreenRect,
    /// Text to display; the edit buffer while editing.
    pub label: String,
    pub ai_generated: bool,
    pub is_selected: bool,
    pub is_link_source: bool,
    pub is_link_candidate: bool,
    pub is_editing: bool,
}

/// A connection line between two node centres.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLine {
    pub source: NodeId,
    pub target: NodeId,
    pub from: ScreenPoint,
    pub to: ScreenPoint,
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneSnapshot {
    pub viewport: Viewport,
    pub nodes: Vec<NodeSprite>,
    pub edges: Vec<EdgeLine>,
    pub link_armed: bool,
}

impl SceneSnapshot {
    pub fn node(&self, id: &str) -> Option<&NodeSprite> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Inputs to a projection.
pub struct Scene<'a> {
    pub nodes: &'a [ReasoningNode],
    pub overlay: &'a TransientOverlay,
    pub viewport: &'a Viewport,
    pub selection: Option<&'a str>,
    pub link: &'a LinkMode,
    pub editor: &'a InlineEditor,
}

impl Scene<'_> {
    /// Project nodes and edges through the viewport.
    ///
    /// Edges whose target no longer exists are skipped.
    pub fn project(&self) -> SceneSnapshot {
        let zoom = self.viewport.zoom();
        let link_source = self.link.source();
        let editing = self.editor.node_id();

        let nodes: Vec<NodeSprite> = self
            .nodes
            .iter()
            .map(|node| {
                let center = to_screen(self.overlay.effective_position(node), self.viewport);
                let is_editing = editing == Some(node.id.as_str());
                let label = match (is_editing, self.editor.buffer()) {
                    (true, Some(buffer)) => buffer.to_string(),
                    _ => node.content.clone(),
                };
                NodeSprite {
                    id: node.id.clone(),
                    kind: node.kind,
                    screen_position: center,
                    bounds: ScreenRect::centered(center, NODE_WIDTH * zoom, NODE_HEIGHT * zoom),
                    label,
                    ai_generated: node.metadata.ai_generated,
                    is_selected: self.selection == Some(node.id.as_str()),
                    is_link_source: link_source == Some(node.id.as_str()),
                    is_link_candidate: link_source.is_some_and(|s| s != node.id),
                    is_editing,
                }
            })
            .collect();

        let centers: HashMap<&str, ScreenPoint> = nodes
            .iter()
            .map(|n| (n.id.as_str(), n.screen_position))
            .collect();
        let centers = &centers;

        let edges = self
            .nodes
            .iter()
            .flat_map(|node| {
                let from = centers.get(node.id.as_str()).copied();
                node.connections.iter().filter_map(move |target| {
                    let to = centers.get(target.as_str()).copied()?;
                    Some(EdgeLine {
                        source: node.id.clone(),
                        target: target.clone(),
                        from: from?,
                        to,
                    })
                })
            })
            .collect();

        SceneSnapshot {
            viewport: *self.viewport,
            nodes,
            edges,
            link_armed: self.link.is_armed(),
        }
    }
}
