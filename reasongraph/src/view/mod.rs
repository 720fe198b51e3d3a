//! View components for the Reasongraph application.

pub mod canvas;
pub mod detail;
pub mod sidebar;
pub mod theme;
pub mod toolbar;

use iced::widget::{button, container, row, text};
use iced::{Alignment, Element, Length, Theme};

use reasongraph_common::NodeType;

use crate::message::Message;

/// Display name of a node type.
pub fn type_label(kind: NodeType) -> &'static str {
    match kind {
        NodeType::Question => "Research Question",
        NodeType::Reasoning => "Reasoning Step",
        NodeType::Hypothesis => "Hypothesis",
        NodeType::Branch => "Branch",
        NodeType::Conclusion => "Conclusion",
    }
}

/// One-line explanation of a node type.
pub fn type_description(kind: NodeType) -> &'static str {
    match kind {
        NodeType::Question => "Frame the problem or inquiry you are investigating.",
        NodeType::Reasoning => "Explain how evidence or logic advances the argument.",
        NodeType::Hypothesis => "Capture a testable idea or assumption to validate.",
        NodeType::Branch => "Divergent line of reasoning or alternative path.",
        NodeType::Conclusion => "Synthesize findings or final recommendations.",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Error,
}

/// A dismissable message shown under the toolbar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub text: String,
}

impl Notification {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            text: text.into(),
        }
    }
}

pub fn notification_view(notification: &Notification) -> Element<'_, Message> {
    let kind = notification.kind;
    let label = text(&notification.text)
        .size(13)
        .style(move |theme: &Theme| {
            let colors = theme::colors(theme);
            text::Style {
                color: Some(match kind {
                    NotificationKind::Info => colors.success(),
                    NotificationKind::Error => colors.danger(),
                }),
            }
        })
        .width(Length::Fill);

    let dismiss = button(text("Dismiss").size(12))
        .on_press(Message::DismissNotification)
        .style(iced::widget::button::text);

    container(
        row![label, dismiss]
            .spacing(10)
            .align_y(Alignment::Center),
    )
    .padding([6, 12])
    .width(Length::Fill)
    .into()
}
