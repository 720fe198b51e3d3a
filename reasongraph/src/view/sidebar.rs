//! Left panel: project list, node-type palette and AI preferences.

use iced::widget::{
    Column, button, column, container, pick_list, row, rule, scrollable, slider, text, text_input,
};
use iced::{Alignment, Element, Length, Theme};

use reasongraph_common::{AiModel, NodeType, ProjectSettings, ReasoningProject};

use crate::message::Message;
use crate::view::theme::colors;
use crate::view::{type_description, type_label};

const SIDEBAR_WIDTH: f32 = 260.0;

pub const TEMPERATURE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=2.0;
pub const MAX_TOKENS_RANGE: std::ops::RangeInclusive<u32> = 200..=4000;

/// Model settings of the active project plus the session API key.
#[derive(Debug, Clone, Copy)]
pub struct AiPreferences<'a> {
    pub settings: &'a ProjectSettings,
    pub api_key: &'a str,
}

/// Render the sidebar.
pub fn sidebar_view<'a>(
    projects: &'a [ReasoningProject],
    active: Option<&'a str>,
    new_project_name: &'a str,
    new_node_kind: NodeType,
    ai: Option<AiPreferences<'a>>,
) -> Element<'a, Message> {
    let mut content = column![
        render_projects(projects, active, new_project_name),
        rule::horizontal(1),
        render_palette(new_node_kind, active.is_some()),
    ]
    .spacing(16)
    .padding(12);

    if let Some(ai) = ai {
        content = content.push(rule::horizontal(1)).push(render_ai(ai));
    }

    container(scrollable(content))
        .width(Length::Fixed(SIDEBAR_WIDTH))
        .height(Length::Fill)
        .into()
}

fn render_projects<'a>(
    projects: &'a [ReasoningProject],
    active: Option<&'a str>,
    new_project_name: &'a str,
) -> Element<'a, Message> {
    let mut list = Column::new().spacing(4);

    if projects.is_empty() {
        list = list.push(text("No projects yet").size(12).style(|theme: &Theme| {
            text::Style {
                color: Some(colors(theme).text_dimmed()),
            }
        }));
    }

    for project in projects {
        let is_active = active == Some(project.id.as_str());
        let label = column![
            text(&project.name).size(14),
            text(format!("{} nodes", project.nodes.len()))
                .size(11)
                .style(|theme: &Theme| text::Style {
                    color: Some(colors(theme).text_muted()),
                }),
        ];
        let select = button(label)
            .on_press(Message::SelectProject(project.id.clone()))
            .width(Length::Fill)
            .style(if is_active {
                iced::widget::button::primary
            } else {
                iced::widget::button::text
            });
        let delete = button(text("x").size(12))
            .on_press(Message::DeleteProject(project.id.clone()))
            .style(iced::widget::button::text);
        list = list.push(row![select, delete].align_y(Alignment::Center));
    }

    let name_input = text_input("New project name...", new_project_name)
        .on_input(Message::SetNewProjectName)
        .on_submit(Message::CreateProject)
        .padding(6)
        .size(13);
    let create = button(text("Create project").size(13))
        .on_press_maybe(
            (!new_project_name.trim().is_empty()).then_some(Message::CreateProject),
        )
        .width(Length::Fill)
        .style(iced::widget::button::primary);

    column![text("Projects").size(16), list, name_input, create]
        .spacing(8)
        .into()
}

fn render_palette<'a>(selected: NodeType, enabled: bool) -> Element<'a, Message> {
    let mut palette = Column::new().spacing(6);

    for kind in NodeType::ALL {
        let is_selected = kind == selected;
        let entry = column![
            text(type_label(kind)).size(13).style(move |theme: &Theme| {
                text::Style {
                    color: Some(colors(theme).node_accent(kind)),
                }
            }),
            text(type_description(kind)).size(11),
        ]
        .spacing(2);
        palette = palette.push(
            button(entry)
                .on_press(Message::SetNewNodeType(kind))
                .width(Length::Fill)
                .style(if is_selected {
                    iced::widget::button::secondary
                } else {
                    iced::widget::button::text
                }),
        );
    }

    let add = button(text(format!("Add {}", type_label(selected))).size(13))
        .on_press_maybe(enabled.then_some(Message::AddNode(selected)))
        .width(Length::Fill)
        .style(iced::widget::button::primary);

    column![text("Node type").size(16), palette, add]
        .spacing(8)
        .into()
}

fn render_ai(ai: AiPreferences<'_>) -> Element<'_, Message> {
    let hint = |label: &'static str| {
        text(label).size(11).style(|theme: &Theme| text::Style {
            color: Some(colors(theme).text_dimmed()),
        })
    };
    let settings = ai.settings;

    let api_key = text_input("sk-or-v1-...", ai.api_key)
        .on_input(Message::SetApiKey)
        .secure(true)
        .padding(6)
        .size(13);
    let model = pick_list(AiModel::ALL, Some(settings.model), Message::SetAiModel)
        .width(Length::Fill)
        .text_size(13);
    let temperature = slider(TEMPERATURE_RANGE, settings.temperature, Message::SetTemperature)
        .step(0.1);
    let max_tokens =
        slider(MAX_TOKENS_RANGE, settings.max_tokens, Message::SetMaxTokens).step(100u32);

    column![
        text("AI preferences").size(16),
        text("OpenRouter API key").size(13),
        api_key,
        hint("Kept for this session only. Falls back to the configured key."),
        text("Model").size(13),
        model,
        text(format!("Temperature: {:.1}", settings.temperature)).size(13),
        temperature,
        hint("Lower values keep responses focused."),
        text(format!("Max tokens: {}", settings.max_tokens)).size(13),
        max_tokens,
    ]
    .spacing(6)
    .into()
}
