//! Top toolbar: project title, persistence and zoom controls.

use iced::widget::{button, container, row, text};
use iced::{Alignment, Element, Length, Theme};

use reasongraph_common::ReasoningProject;

use crate::message::Message;
use crate::view::theme::colors;

/// Render the toolbar.
pub fn toolbar_view<'a>(
    project: Option<&'a ReasoningProject>,
    zoom_percent: i32,
    saving: bool,
) -> Element<'a, Message> {
    let title = text("Reasoning Graph Workspace").size(18);
    let project_name = text(project.map(|p| p.name.as_str()).unwrap_or("No project"))
        .size(14)
        .style(|theme: &Theme| text::Style {
            color: Some(colors(theme).text_muted()),
        });

    let has_project = project.is_some();
    let save = button(text(if saving { "Saving..." } else { "Save" }).size(14))
        .on_press_maybe(has_project.then_some(Message::SaveProject))
        .style(iced::widget::button::primary);
    let export_json = button(text("Export JSON").size(14))
        .on_press_maybe(has_project.then_some(Message::ExportJson))
        .style(iced::widget::button::secondary);
    let export_markdown = button(text("Export Markdown").size(14))
        .on_press_maybe(has_project.then_some(Message::ExportMarkdown))
        .style(iced::widget::button::secondary);

    let zoom_out = button(text("-").size(14))
        .on_press(Message::ZoomOut)
        .style(iced::widget::button::secondary);
    let zoom_label = text(format!("{}%", zoom_percent)).size(14);
    let zoom_in = button(text("+").size(14))
        .on_press(Message::ZoomIn)
        .style(iced::widget::button::secondary);
    let reset = button(text("Reset").size(14))
        .on_press(Message::ResetView)
        .style(iced::widget::button::secondary);

    container(
        row![
            container(row![title, project_name].spacing(12).align_y(Alignment::Center))
                .width(Length::Fill),
            zoom_out,
            zoom_label,
            zoom_in,
            reset,
            export_json,
            export_markdown,
            save,
        ]
        .spacing(10)
        .align_y(Alignment::Center),
    )
    .padding(10)
    .width(Length::Fill)
    .into()
}
