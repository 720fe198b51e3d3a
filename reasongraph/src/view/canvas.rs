//! Canvas widget for the reasoning graph.
//!
//! The program is a thin adapter: it translates iced mouse, touch and
//! keyboard events into [`InputEvent`]s for the engine and draws the
//! [`SceneSnapshot`] the engine projected for this frame.

use iced::advanced::mouse::{Click, click};
use iced::keyboard;
use iced::mouse;
use iced::touch;
use iced::widget::canvas::{self, Cache, Canvas, Frame, Geometry, LineDash, Path, Stroke, Text};
use iced::{Element, Length, Point, Rectangle, Renderer, Size, Theme};

use reasongraph_common::NodeType;

use crate::canvas::{
    ContactId, EdgeLine, Hit, HitList, InputEvent, Key, Modifiers, NodeSprite, PointerEvent,
    SceneSnapshot, ScreenPoint, ScreenVector,
};
use crate::message::Message;
use crate::view::theme::colors;

/// Pixels per scrolled line, matching what browsers report.
const LINE_HEIGHT_PX: f64 = 40.0;
/// Grid spacing in world units.
const GRID_SPACING: f32 = 20.0;
/// Below this on-screen spacing the grid is not drawn.
const MIN_GRID_SPACING: f32 = 8.0;
const CARD_PADDING: f32 = 12.0;
const LABEL_LINES: usize = 3;

pub const EMPTY_LABEL: &str = "Double-click to edit the content...";
pub const LINK_HINT: &str =
    "Click another node to connect, or click the source again / press Esc to cancel.";

/// Interactive reasoning graph canvas.
pub struct GraphCanvas<'a> {
    scene: SceneSnapshot,
    new_node_kind: NodeType,
    cache: &'a Cache,
}

impl<'a> GraphCanvas<'a> {
    pub fn new(scene: SceneSnapshot, new_node_kind: NodeType, cache: &'a Cache) -> Self {
        Self {
            scene,
            new_node_kind,
            cache,
        }
    }

    pub fn view(self) -> Element<'a, Message> {
        Canvas::new(self)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

/// Per-widget input state kept by iced between events.
#[derive(Debug, Clone, Default)]
pub struct AdapterState {
    focused: bool,
    pressed: bool,
    modifiers: Modifiers,
    last_click: Option<Click>,
}

impl canvas::Program<Message> for GraphCanvas<'_> {
    type State = AdapterState;

    fn update(
        &self,
        state: &mut Self::State,
        event: &canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        translate(state, event, bounds, cursor)
            .map(|input| canvas::Action::publish(Message::Canvas(input, bounds.size())))
    }

    fn draw(
        &self,
        state: &Self::State,
        renderer: &Renderer,
        theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let geometry = self.cache.draw(renderer, bounds.size(), |frame| {
            self.draw_scene(frame, theme, bounds.size(), state.focused);
        });

        vec![geometry]
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if state.pressed {
            return mouse::Interaction::Grabbing;
        }
        let Some(position) = cursor.position_in(bounds) else {
            return mouse::Interaction::default();
        };
        match HitList::from_scene(&self.scene).resolve(screen(position)) {
            Hit::Claimed(_) => mouse::Interaction::Text,
            Hit::Node(_) if self.scene.link_armed => mouse::Interaction::Crosshair,
            Hit::Node(_) => mouse::Interaction::Pointer,
            Hit::Background => mouse::Interaction::Grab,
        }
    }
}

/// Translate one iced event into an engine event.
///
/// Pointer motion is only forwarded while a button is held, keys only while
/// the canvas has focus. A press outside the canvas takes the focus away.
pub fn translate(
    state: &mut AdapterState,
    event: &canvas::Event,
    bounds: Rectangle,
    cursor: mouse::Cursor,
) -> Option<InputEvent> {
    match event {
        canvas::Event::Mouse(event) => translate_mouse(state, event, bounds, cursor),
        canvas::Event::Touch(event) => translate_touch(state, event, bounds),
        canvas::Event::Keyboard(event) => translate_keyboard(state, event),
        _ => None,
    }
}

fn translate_mouse(
    state: &mut AdapterState,
    event: &mouse::Event,
    bounds: Rectangle,
    cursor: mouse::Cursor,
) -> Option<InputEvent> {
    match event {
        mouse::Event::ButtonPressed(mouse::Button::Left) => {
            let Some(position) = cursor.position_in(bounds) else {
                return take_focus(state);
            };
            state.focused = true;

            let press = Click::new(position, mouse::Button::Left, state.last_click);
            state.last_click = Some(press);
            if press.kind() == click::Kind::Double {
                return Some(InputEvent::DoubleClick {
                    position: screen(position),
                });
            }

            state.pressed = true;
            Some(InputEvent::PointerDown(PointerEvent::mouse(screen(position))))
        }
        mouse::Event::ButtonPressed(_) => {
            if cursor.is_over(bounds) {
                None
            } else {
                take_focus(state)
            }
        }
        mouse::Event::CursorMoved { .. } if state.pressed => match cursor.position_in(bounds) {
            Some(position) => Some(InputEvent::PointerMove(PointerEvent::mouse(screen(
                position,
            )))),
            None => {
                state.pressed = false;
                Some(InputEvent::PointerLeave)
            }
        },
        mouse::Event::CursorLeft if state.pressed => {
            state.pressed = false;
            Some(InputEvent::PointerLeave)
        }
        mouse::Event::ButtonReleased(mouse::Button::Left) if state.pressed => {
            state.pressed = false;
            let position = cursor.position_in(bounds).unwrap_or(Point::ORIGIN);
            Some(InputEvent::PointerUp(PointerEvent::mouse(screen(position))))
        }
        mouse::Event::WheelScrolled { delta } => {
            let position = cursor.position_in(bounds)?;
            Some(InputEvent::Wheel {
                delta: wheel_delta(delta),
                modifiers: state.modifiers,
                position: screen(position),
            })
        }
        _ => None,
    }
}

fn translate_touch(
    state: &mut AdapterState,
    event: &touch::Event,
    bounds: Rectangle,
) -> Option<InputEvent> {
    let relative = |position: &Point| {
        ScreenPoint::new(
            f64::from(position.x - bounds.x),
            f64::from(position.y - bounds.y),
        )
    };
    match event {
        touch::Event::FingerPressed { id, position } => {
            if !bounds.contains(*position) {
                return None;
            }
            state.focused = true;
            Some(InputEvent::PointerDown(PointerEvent::touch(
                finger_contact(*id),
                relative(position),
            )))
        }
        touch::Event::FingerMoved { id, position } => Some(InputEvent::PointerMove(
            PointerEvent::touch(finger_contact(*id), relative(position)),
        )),
        touch::Event::FingerLifted { id, position } => Some(InputEvent::PointerUp(
            PointerEvent::touch(finger_contact(*id), relative(position)),
        )),
        touch::Event::FingerLost { id, position } => Some(InputEvent::PointerCancel(
            PointerEvent::touch(finger_contact(*id), relative(position)),
        )),
    }
}

fn translate_keyboard(state: &mut AdapterState, event: &keyboard::Event) -> Option<InputEvent> {
    match event {
        keyboard::Event::ModifiersChanged(modifiers) => {
            state.modifiers = convert_modifiers(*modifiers);
            None
        }
        keyboard::Event::KeyPressed {
            key,
            modifiers,
            text,
            ..
        } if state.focused => Some(InputEvent::Key {
            key: convert_key(key),
            modifiers: convert_modifiers(*modifiers),
            text: text.as_ref().map(|t| t.to_string()),
        }),
        _ => None,
    }
}

fn take_focus(state: &mut AdapterState) -> Option<InputEvent> {
    if std::mem::take(&mut state.focused) {
        Some(InputEvent::FocusLost)
    } else {
        None
    }
}

/// Touch contacts start at 1; 0 is the mouse.
fn finger_contact(finger: touch::Finger) -> ContactId {
    finger.0.saturating_add(1)
}

/// Wheel delta in pixels, positive `y` scrolling the content up.
fn wheel_delta(delta: &mouse::ScrollDelta) -> ScreenVector {
    match delta {
        mouse::ScrollDelta::Lines { x, y } => ScreenVector::new(
            -f64::from(*x) * LINE_HEIGHT_PX,
            -f64::from(*y) * LINE_HEIGHT_PX,
        ),
        mouse::ScrollDelta::Pixels { x, y } => ScreenVector::new(-f64::from(*x), -f64::from(*y)),
    }
}

fn convert_modifiers(modifiers: keyboard::Modifiers) -> Modifiers {
    Modifiers {
        shift: modifiers.shift(),
        control: modifiers.control(),
        alt: modifiers.alt(),
        logo: modifiers.logo(),
    }
}

fn convert_key(key: &keyboard::Key) -> Key {
    use keyboard::key::Named;

    match key {
        keyboard::Key::Named(Named::Escape) => Key::Escape,
        keyboard::Key::Named(Named::Enter) => Key::Enter,
        keyboard::Key::Named(Named::Backspace) => Key::Backspace,
        keyboard::Key::Named(Named::Delete) => Key::Delete,
        keyboard::Key::Character(c) => Key::Character(c.to_string()),
        _ => Key::Other,
    }
}

fn screen(point: Point) -> ScreenPoint {
    ScreenPoint::new(f64::from(point.x), f64::from(point.y))
}

fn point(p: ScreenPoint) -> Point {
    Point::new(p.x as f32, p.y as f32)
}

impl GraphCanvas<'_> {
    fn draw_scene(&self, frame: &mut Frame, theme: &Theme, size: Size, focused: bool) {
        let palette = colors(theme);
        let zoom = self.scene.viewport.zoom() as f32;

        frame.fill(
            &Path::rectangle(Point::ORIGIN, size),
            palette.canvas_background(),
        );
        self.draw_grid(frame, theme, size);

        // Edges behind nodes
        for edge in &self.scene.edges {
            draw_edge(frame, theme, edge, zoom);
        }
        for node in &self.scene.nodes {
            draw_node(frame, theme, node, zoom, focused);
        }

        if self.scene.nodes.is_empty() {
            frame.fill_text(Text {
                content: format!(
                    "Double-click anywhere to add a {} node",
                    self.new_node_kind
                ),
                position: Point::new(size.width / 2.0, size.height / 2.0),
                color: palette.text_dimmed(),
                size: 16.0.into(),
                align_x: iced::alignment::Horizontal::Center.into(),
                align_y: iced::alignment::Vertical::Center.into(),
                ..Text::default()
            });
        }

        if self.scene.link_armed {
            let banner = Size::new(560.0_f32.min(size.width - 20.0), 32.0);
            let top_left = Point::new((size.width - banner.width) / 2.0, 12.0);
            frame.fill(
                &Path::rounded_rectangle(top_left, banner, 6.0_f32.into()),
                palette.link_banner(),
            );
            frame.fill_text(Text {
                content: LINK_HINT.to_string(),
                position: Point::new(size.width / 2.0, top_left.y + banner.height / 2.0),
                color: palette.text(),
                size: 13.0.into(),
                align_x: iced::alignment::Horizontal::Center.into(),
                align_y: iced::alignment::Vertical::Center.into(),
                ..Text::default()
            });
        }

        frame.fill_text(Text {
            content: format!("Zoom: {}%", self.scene.viewport.percent()),
            position: Point::new(10.0, size.height - 20.0),
            color: palette.text_muted(),
            size: 12.0.into(),
            ..Text::default()
        });
    }

    fn draw_grid(&self, frame: &mut Frame, theme: &Theme, size: Size) {
        let spacing = GRID_SPACING * self.scene.viewport.zoom() as f32;
        if spacing < MIN_GRID_SPACING {
            return;
        }
        let pan = self.scene.viewport.pan();
        let start_x = (pan.x as f32).rem_euclid(spacing);
        let start_y = (pan.y as f32).rem_euclid(spacing);

        let dots = Path::new(|builder| {
            let mut y = start_y;
            while y < size.height {
                let mut x = start_x;
                while x < size.width {
                    builder.circle(Point::new(x, y), 1.0);
                    x += spacing;
                }
                y += spacing;
            }
        });
        frame.fill(&dots, colors(theme).canvas_grid());
    }
}

fn draw_edge(frame: &mut Frame, theme: &Theme, edge: &EdgeLine, zoom: f32) {
    let line = Path::line(point(edge.from), point(edge.to));
    frame.stroke(
        &line,
        Stroke {
            line_dash: LineDash {
                segments: &[5.0, 5.0],
                offset: 0,
            },
            ..Stroke::default()
                .with_color(colors(theme).edge())
                .with_width((2.0 * zoom).max(1.0))
        },
    );
}

fn draw_node(frame: &mut Frame, theme: &Theme, node: &NodeSprite, zoom: f32, focused: bool) {
    let palette = colors(theme);
    let top_left = point(node.bounds.min);
    let size = Size::new(node.bounds.width() as f32, node.bounds.height() as f32);
    let radius = 8.0 * zoom;

    // Link rings take precedence over selection.
    let ring = if node.is_editing {
        Some(palette.ring_editing())
    } else if node.is_link_source {
        Some(palette.ring_link_source())
    } else if node.is_selected {
        Some(palette.ring_selected())
    } else if node.is_link_candidate {
        Some(palette.ring_link_candidate())
    } else {
        None
    };
    if let Some(color) = ring {
        let inset = 4.0;
        let ring_path = Path::rounded_rectangle(
            Point::new(top_left.x - inset, top_left.y - inset),
            Size::new(size.width + inset * 2.0, size.height + inset * 2.0),
            (radius + inset).into(),
        );
        frame.stroke(&ring_path, Stroke::default().with_color(color).with_width(3.0));
    }

    let card = Path::rounded_rectangle(top_left, size, radius.into());
    frame.fill(&card, palette.node_fill(node.kind));
    frame.stroke(
        &card,
        Stroke::default()
            .with_color(palette.node_accent(node.kind))
            .with_width((2.0 * zoom).max(1.0)),
    );

    let padding = CARD_PADDING * zoom;
    let header_size = (11.0 * zoom).max(6.0);
    let mut header = capitalize(node.kind.as_str());
    if node.ai_generated {
        header.push_str("  · AI");
    }
    frame.fill_text(Text {
        content: header,
        position: Point::new(top_left.x + padding, top_left.y + padding),
        color: palette.node_accent(node.kind),
        size: header_size.into(),
        ..Text::default()
    });

    let body_size = (13.0 * zoom).max(6.0);
    let mut body = if node.label.is_empty() && !node.is_editing {
        EMPTY_LABEL.to_string()
    } else {
        node.label.clone()
    };
    if node.is_editing && focused {
        body.push('|');
    }
    let columns = ((size.width - padding * 2.0) / (body_size * 0.55)).max(1.0) as usize;
    let color = if node.label.is_empty() && !node.is_editing {
        palette.text_dimmed()
    } else {
        palette.node_text()
    };
    frame.fill_text(Text {
        content: wrap_label(&body, columns, LABEL_LINES),
        position: Point::new(
            top_left.x + padding,
            top_left.y + padding + header_size * 1.8,
        ),
        color,
        size: body_size.into(),
        ..Text::default()
    });
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Word-wrap `text` to `columns` characters and at most `max_lines` lines,
/// ending with an ellipsis when truncated.
pub fn wrap_label(text: &str, columns: usize, max_lines: usize) -> String {
    let columns = columns.max(1);
    let mut lines: Vec<String> = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split(' ') {
            let candidate = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if candidate > columns && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            while current.chars().count() > columns {
                let head: String = current.chars().take(columns).collect();
                current = current.chars().skip(columns).collect();
                lines.push(head);
            }
        }
        lines.push(current);
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            let keep = columns.saturating_sub(1);
            if last.chars().count() > keep {
                *last = last.chars().take(keep).collect();
            }
            last.push('…');
        }
    }
    lines.join("\n")
}
