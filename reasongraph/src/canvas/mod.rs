//! Infinite-canvas interaction engine.
//!
//! [`CanvasEngine`] turns [`InputEvent`]s into viewport changes, a transient
//! drag overlay, link-mode transitions and [`GraphCommand`]s. It never touches
//! the graph itself: the application applies the commands to its
//! [`GraphStore`](reasongraph_common::GraphStore) and hands the committed nodes
//! back in on the next event.

pub mod edit;
pub mod gesture;
pub mod input;
pub mod link;
pub mod overlay;
pub mod scene;
pub mod transform;
pub mod viewport;

use reasongraph_common::{NodeId, NodeType, ReasoningNode};

pub use edit::InlineEditor;
pub use gesture::{GestureClassifier, GestureContext, GestureState, PressTarget};
pub use hit_test::{Hit, HitList};
pub use input::{ContactId, DeviceKind, InputEvent, Key, Modifiers, PointerButton, PointerEvent};
pub use link::LinkMode;
pub use overlay::TransientOverlay;
pub use scene::{EdgeLine, NodeSprite, Scene, SceneSnapshot};
pub use transform::{ScreenPoint, ScreenRect, ScreenVector, WorldPoint, to_screen, to_world};
pub use viewport::Viewport;

/// A mutation or notification for the application to act on.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphCommand {
    /// Selection changed.
    Select(Option<NodeId>),
    UpdatePosition { id: NodeId, position: WorldPoint },
    UpdateContent { id: NodeId, content: String },
    AddConnection { source: NodeId, target: NodeId },
    CreateNode { kind: NodeType, position: WorldPoint },
    DeleteNode(NodeId),
    SaveProject,
}

/// All interaction state for one canvas.
#[derive(Debug, Default)]
pub struct CanvasEngine {
    viewport: Viewport,
    gestures: GestureClassifier,
    overlay: TransientOverlay,
    link: LinkMode,
    editor: InlineEditor,
    selection: Option<NodeId>,
    new_node_kind: NodeType,
    canvas_size: Option<ScreenVector>,
}

impl CanvasEngine {
    pub fn new(new_node_kind: NodeType) -> Self {
        Self {
            new_node_kind,
            ..Self::default()
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn overlay(&self) -> &TransientOverlay {
        &self.overlay
    }

    pub fn link(&self) -> &LinkMode {
        &self.link
    }

    pub fn editor(&self) -> &InlineEditor {
        &self.editor
    }

    pub fn gesture(&self) -> &GestureState {
        self.gestures.state()
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    pub fn new_node_kind(&self) -> NodeType {
        self.new_node_kind
    }

    /// Type used for nodes created by double-clicking the background.
    pub fn set_new_node_kind(&mut self, kind: NodeType) {
        self.new_node_kind = kind;
    }

    /// Record the canvas size so button zoom can anchor on its centre.
    pub fn set_canvas_size(&mut self, width: f64, height: f64) {
        self.canvas_size = Some(ScreenVector::new(width, height));
    }

    /// Centre of the canvas, or the origin before the first layout.
    pub fn canvas_center(&self) -> ScreenPoint {
        self.canvas_size
            .map(|size| ScreenPoint::new(size.x / 2.0, size.y / 2.0))
            .unwrap_or(ScreenPoint::ORIGIN)
    }

    /// World point at the canvas centre.
    pub fn center_world(&self) -> WorldPoint {
        to_world(self.canvas_center(), &self.viewport)
    }

    pub fn zoom_in(&mut self) -> bool {
        let anchor = self.canvas_center();
        self.viewport.zoom_in(anchor)
    }

    pub fn zoom_out(&mut self) -> bool {
        let anchor = self.canvas_center();
        self.viewport.zoom_out(anchor)
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    pub fn select(&mut self, id: Option<NodeId>) {
        self.selection = id;
    }

    /// Arm linking from `source`.
    ///
    /// Refused while already armed, and while a drag or pinch is running.
    pub fn arm_link(&mut self, source: &str) -> bool {
        if self.gestures.is_dragging() || self.gestures.is_pinching() {
            return false;
        }
        let armed = self.link.arm(source);
        if armed {
            tracing::debug!(source, "Link armed");
        }
        armed
    }

    pub fn cancel_link(&mut self) -> bool {
        self.link.cancel()
    }

    /// Forget everything tied to the current graph. Used when switching projects.
    pub fn switch_graph(&mut self) {
        self.gestures.reset(&mut self.overlay);
        self.link.cancel();
        self.editor.discard();
        self.selection = None;
    }

    /// Drop references to a node that no longer exists.
    pub fn forget_node(&mut self, id: &str) {
        if self.selection.as_deref() == Some(id) {
            self.selection = None;
        }
        if self.link.source() == Some(id) {
            self.link.cancel();
        }
        if self.editor.node_id() == Some(id) {
            self.editor.discard();
        }
        if self.overlay.get(id).is_some() {
            self.gestures.reset(&mut self.overlay);
        }
    }

    /// Project the current state for rendering.
    pub fn scene(&self, nodes: &[ReasoningNode]) -> SceneSnapshot {
        Scene {
            nodes,
            overlay: &self.overlay,
            viewport: &self.viewport,
            selection: self.selection.as_deref(),
            link: &self.link,
            editor: &self.editor,
        }
        .project()
    }

    /// Feed one input event. `nodes` are the committed nodes of the graph.
    pub fn handle(&mut self, event: InputEvent, nodes: &[ReasoningNode]) -> Vec<GraphCommand> {
        let mut commands = Vec::new();

        match event {
            InputEvent::PointerDown(pointer) => self.pointer_down(pointer, nodes, &mut commands),
            InputEvent::PointerMove(pointer) => {
                let cx = Self::context(
                    &mut self.viewport,
                    &mut self.overlay,
                    &mut self.link,
                    &mut commands,
                );
                self.gestures.pointer_move(&pointer, cx);
            }
            InputEvent::PointerUp(pointer) | InputEvent::PointerCancel(pointer) => {
                let cx = Self::context(
                    &mut self.viewport,
                    &mut self.overlay,
                    &mut self.link,
                    &mut commands,
                );
                self.gestures.pointer_up(pointer.contact, cx);
            }
            InputEvent::PointerLeave => {
                let cx = Self::context(
                    &mut self.viewport,
                    &mut self.overlay,
                    &mut self.link,
                    &mut commands,
                );
                self.gestures.pointer_leave(cx);
            }
            InputEvent::Wheel {
                delta,
                modifiers,
                position,
            } => {
                if modifiers.command() {
                    self.viewport.wheel_zoom(position, delta.y);
                } else {
                    self.viewport.set_pan(self.viewport.pan() - delta);
                }
            }
            InputEvent::DoubleClick { position } => {
                self.double_click(position, nodes, &mut commands)
            }
            InputEvent::Key {
                key,
                modifiers,
                text,
            } => self.key(key, modifiers, text, &mut commands),
            InputEvent::FocusLost => self.commit_edit(&mut commands),
        }

        for command in &commands {
            if let GraphCommand::Select(id) = command {
                self.selection = id.clone();
            }
        }
        commands
    }

    fn context<'a>(
        viewport: &'a mut Viewport,
        overlay: &'a mut TransientOverlay,
        link: &'a mut LinkMode,
        commands: &'a mut Vec<GraphCommand>,
    ) -> GestureContext<'a> {
        GestureContext {
            viewport,
            overlay,
            link,
            commands,
        }
    }

    fn pointer_down(
        &mut self,
        pointer: PointerEvent,
        nodes: &[ReasoningNode],
        commands: &mut Vec<GraphCommand>,
    ) {
        if matches!(
            pointer.button,
            Some(PointerButton::Secondary | PointerButton::Middle)
        ) {
            return;
        }

        let target = match HitList::from_scene(&self.scene(nodes)).resolve(pointer.position) {
            Hit::Claimed(element) => {
                tracing::trace!(?element, "Press claimed");
                return;
            }
            Hit::Node(id) => {
                let position = nodes
                    .iter()
                    .find(|n| n.id == id)
                    .map(|n| self.overlay.effective_position(n))
                    .unwrap_or_default();
                PressTarget::Node { id, position }
            }
            Hit::Background => PressTarget::Background,
        };

        // Pressing anywhere outside the editor blurs it.
        self.commit_edit(commands);

        let cx = Self::context(
            &mut self.viewport,
            &mut self.overlay,
            &mut self.link,
            commands,
        );
        self.gestures.pointer_down(&pointer, target, cx);
    }

    fn double_click(
        &mut self,
        position: ScreenPoint,
        nodes: &[ReasoningNode],
        commands: &mut Vec<GraphCommand>,
    ) {
        match HitList::from_scene(&self.scene(nodes)).resolve(position) {
            Hit::Claimed(_) => {}
            Hit::Node(id) => {
                let content = nodes
                    .iter()
                    .find(|n| n.id == id)
                    .map(|n| n.content.as_str())
                    .unwrap_or_default();
                if let Some(previous) = self.editor.begin(&id, content) {
                    commands.push(GraphCommand::UpdateContent {
                        id: previous.node_id,
                        content: previous.buffer,
                    });
                }
                commands.push(GraphCommand::Select(Some(id)));
            }
            Hit::Background => {
                self.commit_edit(commands);
                commands.push(GraphCommand::CreateNode {
                    kind: self.new_node_kind,
                    position: to_world(position, &self.viewport),
                });
            }
        }
    }

    fn key(
        &mut self,
        key: Key,
        modifiers: Modifiers,
        text: Option<String>,
        commands: &mut Vec<GraphCommand>,
    ) {
        if modifiers.command() && matches!(&key, Key::Character(c) if c.eq_ignore_ascii_case("s")) {
            self.commit_edit(commands);
            commands.push(GraphCommand::SaveProject);
            return;
        }

        if self.editor.is_active() {
            match key {
                Key::Enter if modifiers.shift => self.editor.newline(),
                Key::Enter => self.commit_edit(commands),
                Key::Escape => {
                    self.editor.discard();
                    self.link.cancel();
                }
                Key::Backspace => self.editor.backspace(),
                _ => {
                    if !modifiers.command()
                        && let Some(text) = text
                    {
                        self.editor.insert(&text);
                    }
                }
            }
            return;
        }

        match key {
            Key::Escape => {
                if !self.link.cancel() && self.selection.is_some() {
                    commands.push(GraphCommand::Select(None));
                }
            }
            Key::Delete if !modifiers.control => {
                if let Some(id) = self.selection.clone() {
                    self.forget_node(&id);
                    commands.push(GraphCommand::DeleteNode(id));
                }
            }
            _ => {}
        }
    }

    fn commit_edit(&mut self, commands: &mut Vec<GraphCommand>) {
        if let Some(session) = self.editor.commit() {
            commands.push(GraphCommand::UpdateContent {
                id: session.node_id,
                content: session.buffer,
            });
        }
    }
}
