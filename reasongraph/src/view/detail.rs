//! Right panel: details and actions for the selected node.

use iced::widget::{Column, button, column, container, row, rule, scrollable, text, text_input};
use iced::{Alignment, Element, Length, Theme};

use reasongraph_common::{ReasoningNode, ReasoningProject};

use crate::message::Message;
use crate::view::theme::colors;
use crate::view::{type_description, type_label};

const DETAIL_WIDTH: f32 = 300.0;

/// State of the expansion form.
#[derive(Debug, Clone, Default)]
pub struct ExpansionState {
    /// Extra instructions sent along with the node.
    pub context: String,
    /// Node currently being expanded.
    pub pending: Option<String>,
    /// Whether an API key is configured.
    pub available: bool,
}

/// Render the detail panel for `selected` in `project`.
pub fn detail_view<'a>(
    project: &'a ReasoningProject,
    selected: Option<&'a ReasoningNode>,
    link_source: Option<&'a str>,
    expansion: &'a ExpansionState,
) -> Element<'a, Message> {
    let content: Element<'a, Message> = match selected {
        Some(node) => render_node(project, node, link_source, expansion),
        None => text("Select a node to see its details.")
            .size(13)
            .style(|theme: &Theme| text::Style {
                color: Some(colors(theme).text_dimmed()),
            })
            .into(),
    };

    container(scrollable(column![content].padding(12)))
        .width(Length::Fixed(DETAIL_WIDTH))
        .height(Length::Fill)
        .into()
}

fn render_node<'a>(
    project: &'a ReasoningProject,
    node: &'a ReasoningNode,
    link_source: Option<&'a str>,
    expansion: &'a ExpansionState,
) -> Element<'a, Message> {
    let kind = node.kind;
    let header = column![
        text(type_label(kind)).size(18).style(move |theme: &Theme| {
            text::Style {
                color: Some(colors(theme).node_accent(kind)),
            }
        }),
        text(type_description(kind)).size(12),
    ]
    .spacing(4);

    let body = if node.content.is_empty() {
        text("No content yet. Double-click the node to edit.").size(13)
    } else {
        text(&node.content).size(13)
    };

    let mut properties = Column::new()
        .spacing(4)
        .push(property("Type", kind.as_str().to_string()))
        .push(property(
            "Confidence",
            format!("{:.0}%", node.metadata.confidence * 100.0),
        ))
        .push(property(
            "Created",
            node.metadata.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ))
        .push(property(
            "Updated",
            node.metadata.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        ));
    if node.metadata.ai_generated {
        properties = properties.push(property("Source", "AI generated".to_string()));
    }
    if let Some(rationale) = &node.metadata.rationale {
        properties = properties.push(text(format!("Rationale: {}", rationale)).size(12));
    }

    let mut connections = Column::new().spacing(2);
    for target in &node.connections {
        let label = project
            .node(target)
            .map(|n| format!("{}: {}", n.kind, preview(&n.content)))
            .unwrap_or_else(|| format!("missing node {}", target));
        connections = connections.push(text(label).size(12));
    }
    if node.connections.is_empty() {
        connections = connections.push(text("None").size(12));
    }

    let link_button = if link_source.is_some() {
        button(text("Cancel linking").size(13))
            .on_press(Message::CancelLink)
            .style(iced::widget::button::secondary)
    } else {
        button(text("Connect node").size(13))
            .on_press(Message::ConnectFrom(node.id.clone()))
            .style(iced::widget::button::secondary)
    };
    let delete = button(text("Delete node").size(13))
        .on_press(Message::DeleteNode(node.id.clone()))
        .style(iced::widget::button::danger);

    column![
        header,
        rule::horizontal(1),
        body,
        rule::horizontal(1),
        text("Properties").size(14),
        properties,
        text("Connections").size(14),
        connections,
        row![link_button, delete].spacing(8),
        rule::horizontal(1),
        render_expansion(node, expansion),
    ]
    .spacing(10)
    .into()
}

fn render_expansion<'a>(
    node: &'a ReasoningNode,
    expansion: &'a ExpansionState,
) -> Element<'a, Message> {
    let title = text("AI expansion").size(14);

    if !expansion.available {
        return column![
            title,
            text("Enter an OpenRouter API key under AI preferences, or set OPENROUTER_API_KEY.")
                .size(12),
        ]
        .spacing(6)
        .into();
    }

    let busy = expansion.pending.is_some();
    let context = text_input("Optional context for the model...", &expansion.context)
        .on_input(Message::SetExpansionContext)
        .padding(6)
        .size(13);
    let expand = button(text(if busy { "Expanding..." } else { "Expand with AI" }).size(13))
        .on_press_maybe((!busy).then(|| Message::ExpandNode(node.id.clone())))
        .style(iced::widget::button::primary);

    column![title, context, expand]
        .spacing(6)
        .align_x(Alignment::Start)
        .into()
}

fn property<'a>(name: &'a str, value: String) -> Element<'a, Message> {
    row![
        text(name).size(12).width(Length::Fixed(90.0)).style(|theme: &Theme| {
            text::Style {
                color: Some(colors(theme).text_muted()),
            }
        }),
        text(value).size(12),
    ]
    .spacing(6)
    .into()
}

fn preview(content: &str) -> String {
    const MAX: usize = 40;
    if content.chars().count() > MAX {
        let head: String = content.chars().take(MAX - 3).collect();
        format!("{}...", head)
    } else if content.is_empty() {
        "(empty)".to_string()
    } else {
        content.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview() {
        assert_eq!(preview(""), "(empty)");
        assert_eq!(preview("short"), "short");
        let long = "x".repeat(50);
        assert_eq!(preview(&long).chars().count(), 40);
        assert!(preview(&long).ends_with("..."));
    }
}
