//! Gesture classification.
//!
//! One transition function for every input device. The mouse is a single
//! implicit contact that only pans or drags. Touch reports one contact per
//! finger, which is what makes pinch zoom reachable. The two never share a
//! gesture: while one device holds contacts, presses from the other are
//! dropped.

use reasongraph_common::NodeId;

use super::GraphCommand;
use super::input::{ContactId, DeviceKind, PointerEvent};
use super::link::{LinkMode, LinkOutcome};
use super::overlay::TransientOverlay;
use super::transform::{ScreenPoint, ScreenVector, WorldPoint, to_world};
use super::viewport::Viewport;

/// Pinches with contacts closer than this are refused.
pub const PINCH_EPSILON: f64 = 1e-3;

#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub node_id: NodeId,
    pub contact: ContactId,
    pub origin: WorldPoint,
    pub pointer_start: ScreenPoint,
    pub moved: bool,
}

/// Frozen at the moment the contact set becomes two.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchSession {
    pub initial_distance: f64,
    pub initial_zoom: f64,
    pub center_screen: ScreenPoint,
    pub center_world: WorldPoint,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum GestureState {
    #[default]
    Idle,
    /// `reference` is the press position minus the pan at press time.
    Panning { reference: ScreenVector },
    DraggingNode(DragSession),
    Pinching(PinchSession),
}

/// What a press landed on, after hit testing.
#[derive(Debug, Clone, PartialEq)]
pub enum PressTarget {
    Background,
    /// A node, with its effective world position.
    Node { id: NodeId, position: WorldPoint },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Contact {
    id: ContactId,
    device: DeviceKind,
    position: ScreenPoint,
}

/// State the classifier mutates while handling an event.
pub struct GestureContext<'a> {
    pub viewport: &'a mut Viewport,
    pub overlay: &'a mut TransientOverlay,
    pub link: &'a mut LinkMode,
    pub commands: &'a mut Vec<GraphCommand>,
}

#[derive(Debug, Clone, Default)]
pub struct GestureClassifier {
    state: GestureState,
    contacts: Vec<Contact>,
}

impl GestureClassifier {
    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GestureState::DraggingNode(_))
    }

    pub fn is_pinching(&self) -> bool {
        matches!(self.state, GestureState::Pinching(_))
    }

    pub fn pointer_down(&mut self, event: &PointerEvent, target: PressTarget, cx: GestureContext<'_>) {
        if self.contacts.iter().any(|c| c.id == event.contact) {
            tracing::debug!(contact = event.contact, "Ignoring press for a contact already down");
            return;
        }
        if let Some(held) = self.contacts.first()
            && held.device != event.device
        {
            tracing::debug!(
                contact = event.contact,
                device = ?event.device,
                "Ignoring press from a second device"
            );
            return;
        }

        // Extra contacts during a drag are tracked but inert; this also
        // covers a second node press.
        if self.is_dragging() {
            self.track(event);
            return;
        }

        match self.contacts.len() {
            0 => self.first_contact(event, target, cx),
            1 => {
                self.track(event);
                self.state = match self.start_pinch(cx.viewport) {
                    Some(pinch) => GestureState::Pinching(pinch),
                    None => GestureState::Idle,
                };
            }
            _ => {
                self.track(event);
                if self.is_pinching() {
                    tracing::debug!("Pinch interrupted by an additional contact");
                    self.state = GestureState::Idle;
                }
            }
        }
    }

    fn first_contact(&mut self, event: &PointerEvent, target: PressTarget, cx: GestureContext<'_>) {
        match target {
            PressTarget::Background => {
                cx.link.cancel();
                self.track(event);
                self.state = GestureState::Panning {
                    reference: event.position.to_vector() - cx.viewport.pan(),
                };
            }
            PressTarget::Node { id, .. } if cx.link.is_armed() => {
                // A node press while linking belongs to the link machine.
                if let LinkOutcome::Completed { source, target } = cx.link.click(&id) {
                    cx.commands.push(GraphCommand::AddConnection { source, target });
                }
            }
            PressTarget::Node { id, position } => {
                self.track(event);
                cx.commands.push(GraphCommand::Select(Some(id.clone())));
                self.state = GestureState::DraggingNode(DragSession {
                    node_id: id,
                    contact: event.contact,
                    origin: position,
                    pointer_start: event.position,
                    moved: false,
                });
            }
        }
    }

    pub fn pointer_move(&mut self, event: &PointerEvent, cx: GestureContext<'_>) {
        let Some(contact) = self.contacts.iter_mut().find(|c| c.id == event.contact) else {
            return;
        };
        contact.position = event.position;

        match &mut self.state {
            GestureState::Idle => {}
            GestureState::Panning { reference } => {
                cx.viewport.set_pan(event.position.to_vector() - *reference);
            }
            GestureState::DraggingNode(drag) => {
                if drag.contact != event.contact {
                    return;
                }
                let zoom = cx.viewport.zoom();
                let delta = event.position - drag.pointer_start;
                if !delta.is_zero() {
                    drag.moved = true;
                }
                cx.overlay.set(
                    &drag.node_id,
                    drag.origin.offset(delta.x / zoom, delta.y / zoom),
                );
            }
            GestureState::Pinching(pinch) => {
                if let [a, b] = self.contacts.as_slice() {
                    let ratio = a.position.distance(b.position) / pinch.initial_distance;
                    cx.viewport.zoom_keeping(
                        pinch.center_screen,
                        pinch.center_world,
                        pinch.initial_zoom * ratio,
                    );
                }
            }
        }
    }

    /// Release or cancel of one contact. A drag is committed when the last
    /// contact goes away and the node actually moved.
    pub fn pointer_up(&mut self, contact: ContactId, cx: GestureContext<'_>) {
        let Some(index) = self.contacts.iter().position(|c| c.id == contact) else {
            tracing::debug!(contact, "Ignoring release of an untracked contact");
            return;
        };
        let before = self.contacts.len();
        self.contacts.remove(index);

        match self.contacts.len() {
            0 => self.finish(true, cx),
            1 if self.is_pinching() => self.state = GestureState::Idle,
            2 if before == 3 && !self.is_dragging() => {
                self.state = match self.start_pinch(cx.viewport) {
                    Some(pinch) => GestureState::Pinching(pinch),
                    None => GestureState::Idle,
                };
            }
            _ => {}
        }
    }

    /// The pointer left the canvas: end everything without committing.
    pub fn pointer_leave(&mut self, cx: GestureContext<'_>) {
        self.contacts.clear();
        self.finish(false, cx);
    }

    /// Drop all gesture state without committing.
    pub fn reset(&mut self, overlay: &mut TransientOverlay) {
        self.contacts.clear();
        self.state = GestureState::Idle;
        overlay.clear();
    }

    fn finish(&mut self, commit: bool, cx: GestureContext<'_>) {
        if let GestureState::DraggingNode(drag) = std::mem::take(&mut self.state) {
            // The overlay entry is gone before the commit is issued.
            let last = cx.overlay.take(&drag.node_id);
            if commit
                && drag.moved
                && let Some(position) = last
            {
                cx.commands.push(GraphCommand::UpdatePosition {
                    id: drag.node_id,
                    position,
                });
            }
        }
    }

    fn track(&mut self, event: &PointerEvent) {
        self.contacts.push(Contact {
            id: event.contact,
            device: event.device,
            position: event.position,
        });
    }

    fn start_pinch(&self, viewport: &Viewport) -> Option<PinchSession> {
        let [a, b] = self.contacts.as_slice() else {
            return None;
        };
        if a.device != DeviceKind::Touch || b.device != DeviceKind::Touch {
            return None;
        }
        let distance = a.position.distance(b.position);
        if distance < PINCH_EPSILON {
            tracing::debug!(distance, "Refusing pinch with coincident contacts");
            return None;
        }
        let center = a.position.midpoint(b.position);
        Some(PinchSession {
            initial_distance: distance,
            initial_zoom: viewport.zoom(),
            center_screen: center,
            center_world: to_world(center, viewport),
        })
    }
}
