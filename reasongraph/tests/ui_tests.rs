//! UI tests using iced_test Simulator.
//!
//! These tests drive the panels and the application without a window or a
//! project file on disk.

use iced::Size;
use iced_test::simulator;

use reasongraph::canvas::{InputEvent, Key, Modifiers, ScreenPoint};
use reasongraph::message::Message;
use reasongraph::view::detail::{ExpansionState, detail_view};
use reasongraph::view::sidebar::{AiPreferences, sidebar_view};
use reasongraph::view::toolbar::toolbar_view;
use reasongraph::{AppConfig, Reasongraph};

use reasongraph_common::{
    AiModel, NodeType, ProjectSettings, ProjectStore, ReasoningNode, ReasoningProject, WorldPoint,
};

fn canvas_size() -> Size {
    Size::new(800.0, 600.0)
}

fn sample_project() -> ReasoningProject {
    let mut project = ReasoningProject::new("Climate", None);
    let mut question = ReasoningNode::new(NodeType::Question, WorldPoint::new(0.0, 0.0))
        .with_content("Why is the sea rising?");
    let step = ReasoningNode::new(NodeType::Reasoning, WorldPoint::new(300.0, 0.0))
        .with_content("Ice sheets are melting");
    question.connections.push(step.id.clone());
    project.nodes.push(question);
    project.nodes.push(step);
    project
}

fn app() -> Reasongraph {
    Reasongraph::new(AppConfig::default(), ProjectStore::in_memory())
}

/// Test that the toolbar shows the project name and zoom level.
#[test]
fn test_toolbar_renders() {
    let project = sample_project();
    let mut ui = simulator(toolbar_view(Some(&project), 100, false));

    assert!(ui.find("Reasoning Graph Workspace").is_ok());
    assert!(ui.find("Climate").is_ok());
    assert!(ui.find("100%").is_ok());
}

/// Test clicking the Save button.
#[test]
fn test_toolbar_save_button() {
    let project = sample_project();
    let mut ui = simulator(toolbar_view(Some(&project), 100, false));

    let _ = ui.click("Save");

    let messages: Vec<Message> = ui.into_messages().collect();
    assert!(messages.iter().any(|m| matches!(m, Message::SaveProject)));
}

/// Test the export and zoom buttons.
#[test]
fn test_toolbar_export_and_zoom() {
    let project = sample_project();
    let mut ui = simulator(toolbar_view(Some(&project), 125, false));

    let _ = ui.click("Export JSON");
    let _ = ui.click("Export Markdown");
    let _ = ui.click("+");

    let messages: Vec<Message> = ui.into_messages().collect();
    assert!(messages.iter().any(|m| matches!(m, Message::ExportJson)));
    assert!(messages.iter().any(|m| matches!(m, Message::ExportMarkdown)));
    assert!(messages.iter().any(|m| matches!(m, Message::ZoomIn)));
}

/// Test that persistence buttons stay inert without a project.
#[test]
fn test_toolbar_without_project() {
    let mut ui = simulator(toolbar_view(None, 100, false));

    assert!(ui.find("No project").is_ok());
    let _ = ui.click("Save");

    let messages: Vec<Message> = ui.into_messages().collect();
    assert!(!messages.iter().any(|m| matches!(m, Message::SaveProject)));
}

/// Test the saving indicator.
#[test]
fn test_toolbar_saving_label() {
    let project = sample_project();
    let mut ui = simulator(toolbar_view(Some(&project), 100, true));

    assert!(ui.find("Saving...").is_ok());
}

/// Test that the sidebar lists projects with their node count.
#[test]
fn test_sidebar_lists_projects() {
    let projects = vec![sample_project()];
    let active = projects[0].id.clone();
    let mut ui = simulator(sidebar_view(
        &projects,
        Some(&active),
        "",
        NodeType::Question,
        None,
    ));

    assert!(ui.find("Climate").is_ok());
    assert!(ui.find("2 nodes").is_ok());
    assert!(ui.find("Research Question").is_ok());
    assert!(ui.find("Add Research Question").is_ok());
}

/// Test that the AI preferences show the project's model settings.
#[test]
fn test_sidebar_ai_preferences() {
    let projects = vec![sample_project()];
    let active = projects[0].id.clone();
    let settings = ProjectSettings::default();
    let mut ui = simulator(sidebar_view(
        &projects,
        Some(&active),
        "",
        NodeType::Question,
        Some(AiPreferences {
            settings: &settings,
            api_key: "",
        }),
    ));

    assert!(ui.find("AI preferences").is_ok());
    assert!(ui.find("OpenRouter API key").is_ok());
    assert!(ui.find("Temperature: 0.7").is_ok());
    assert!(ui.find("Max tokens: 2000").is_ok());
}

/// Test the empty project list.
#[test]
fn test_sidebar_empty() {
    let mut ui = simulator(sidebar_view(&[], None, "", NodeType::Question, None));

    assert!(ui.find("No projects yet").is_ok());
}

/// Test clicking a project entry.
#[test]
fn test_sidebar_select_project() {
    let projects = vec![sample_project()];
    let id = projects[0].id.clone();
    let mut ui = simulator(sidebar_view(&projects, None, "", NodeType::Question, None));

    let _ = ui.click("Climate");

    let messages: Vec<Message> = ui.into_messages().collect();
    assert!(
        messages
            .iter()
            .any(|m| matches!(m, Message::SelectProject(selected) if *selected == id))
    );
}

/// Test the create form with a typed name.
#[test]
fn test_sidebar_create_project() {
    let mut ui = simulator(sidebar_view(&[], None, "Ethics", NodeType::Question, None));

    let _ = ui.click("Create project");

    let messages: Vec<Message> = ui.into_messages().collect();
    assert!(messages.iter().any(|m| matches!(m, Message::CreateProject)));
}

/// Test picking a node type from the palette.
#[test]
fn test_sidebar_palette() {
    let projects = vec![sample_project()];
    let active = projects[0].id.clone();
    let mut ui = simulator(sidebar_view(
        &projects,
        Some(&active),
        "",
        NodeType::Question,
        None,
    ));

    let _ = ui.click("Hypothesis");
    let _ = ui.click("Add Research Question");

    let messages: Vec<Message> = ui.into_messages().collect();
    assert!(
        messages
            .iter()
            .any(|m| matches!(m, Message::SetNewNodeType(NodeType::Hypothesis)))
    );
    assert!(
        messages
            .iter()
            .any(|m| matches!(m, Message::AddNode(NodeType::Question)))
    );
}

/// Test the detail panel with nothing selected.
#[test]
fn test_detail_empty() {
    let project = sample_project();
    let expansion = ExpansionState::default();
    let mut ui = simulator(detail_view(&project, None, None, &expansion));

    assert!(ui.find("Select a node to see its details.").is_ok());
}

/// Test the detail panel for a selected node.
#[test]
fn test_detail_selected_node() {
    let project = sample_project();
    let node = &project.nodes[0];
    let expansion = ExpansionState::default();
    let mut ui = simulator(detail_view(&project, Some(node), None, &expansion));

    assert!(ui.find("Research Question").is_ok());
    assert!(ui.find("Why is the sea rising?").is_ok());
    assert!(ui.find("80%").is_ok());
    assert!(ui.find("reasoning: Ice sheets are melting").is_ok());
    assert!(
        ui.find("Enter an OpenRouter API key under AI preferences, or set OPENROUTER_API_KEY.")
            .is_ok()
    );
}

/// Test the node action buttons.
#[test]
fn test_detail_actions() {
    let project = sample_project();
    let node = &project.nodes[0];
    let expansion = ExpansionState::default();
    let mut ui = simulator(detail_view(&project, Some(node), None, &expansion));

    let _ = ui.click("Connect node");
    let _ = ui.click("Delete node");

    let messages: Vec<Message> = ui.into_messages().collect();
    assert!(
        messages
            .iter()
            .any(|m| matches!(m, Message::ConnectFrom(id) if *id == node.id))
    );
    assert!(
        messages
            .iter()
            .any(|m| matches!(m, Message::DeleteNode(id) if *id == node.id))
    );
}

/// Test that an armed link offers cancellation instead.
#[test]
fn test_detail_cancel_link() {
    let project = sample_project();
    let node = &project.nodes[0];
    let expansion = ExpansionState::default();
    let mut ui = simulator(detail_view(
        &project,
        Some(node),
        Some(node.id.as_str()),
        &expansion,
    ));

    let _ = ui.click("Cancel linking");

    let messages: Vec<Message> = ui.into_messages().collect();
    assert!(messages.iter().any(|m| matches!(m, Message::CancelLink)));
}

/// Test the expansion form when a key is configured.
#[test]
fn test_detail_expansion() {
    let project = sample_project();
    let node = &project.nodes[0];
    let expansion = ExpansionState {
        available: true,
        ..ExpansionState::default()
    };
    let mut ui = simulator(detail_view(&project, Some(node), None, &expansion));

    let _ = ui.click("Expand with AI");

    let messages: Vec<Message> = ui.into_messages().collect();
    assert!(
        messages
            .iter()
            .any(|m| matches!(m, Message::ExpandNode(id) if *id == node.id))
    );
}

/// Test that the application starts with a starter project.
#[test]
fn test_app_starter_project() {
    let app = app();

    assert_eq!(app.store().list().len(), 1);
    assert!(app.active_project().is_some());
    assert!(app.title().starts_with("Reasongraph - "));

    let mut ui = simulator(app.view());
    assert!(ui.find("My first reasoning graph").is_ok());
    assert!(ui.find("Select a node to see its details.").is_ok());
}

/// Test creating a project from the sidebar form.
#[test]
fn test_app_create_project() {
    let mut app = app();

    let _ = app.update(Message::SetNewProjectName("  Ethics  ".to_string()));
    let _ = app.update(Message::CreateProject);

    assert_eq!(app.store().list().len(), 2);
    assert_eq!(app.active_project().map(|p| p.name.as_str()), Some("Ethics"));

    // Blank names are ignored.
    let _ = app.update(Message::SetNewProjectName("   ".to_string()));
    let _ = app.update(Message::CreateProject);
    assert_eq!(app.store().list().len(), 2);
}

/// Test deleting the active project picks another one.
#[test]
fn test_app_delete_project() {
    let mut app = app();
    let _ = app.update(Message::SetNewProjectName("Second".to_string()));
    let _ = app.update(Message::CreateProject);
    let second = app.active_project().map(|p| p.id.clone()).unwrap();

    let _ = app.update(Message::DeleteProject(second.clone()));

    assert_eq!(app.store().list().len(), 1);
    assert!(app.store().get(&second).is_none());
    assert_eq!(
        app.active_project().map(|p| p.name.as_str()),
        Some("My first reasoning graph")
    );
}

/// Test adding a node from the palette and deleting it.
#[test]
fn test_app_add_and_delete_node() {
    let mut app = app();

    let _ = app.update(Message::AddNode(NodeType::Hypothesis));
    let node = app.selected_node().cloned().unwrap();
    assert_eq!(node.kind, NodeType::Hypothesis);
    assert_eq!(app.active_project().unwrap().nodes.len(), 1);

    let _ = app.update(Message::DeleteNode(node.id.clone()));
    assert!(app.active_project().unwrap().nodes.is_empty());
    assert!(app.selected_node().is_none());
}

/// Test that a canvas double-click creates a node where it landed.
#[test]
fn test_app_canvas_double_click() {
    let mut app = app();
    let _ = app.update(Message::SetNewNodeType(NodeType::Conclusion));

    let _ = app.update(Message::Canvas(
        InputEvent::DoubleClick {
            position: ScreenPoint::new(120.0, 80.0),
        },
        canvas_size(),
    ));

    let project = app.active_project().unwrap();
    assert_eq!(project.nodes.len(), 1);
    assert_eq!(project.nodes[0].kind, NodeType::Conclusion);
    assert_eq!(project.nodes[0].position, WorldPoint::new(120.0, 80.0));
}

/// Test linking two nodes through the detail panel and the canvas.
#[test]
fn test_app_link_nodes() {
    let mut app = app();
    let _ = app.update(Message::Canvas(
        InputEvent::DoubleClick {
            position: ScreenPoint::new(150.0, 150.0),
        },
        canvas_size(),
    ));
    let _ = app.update(Message::Canvas(
        InputEvent::DoubleClick {
            position: ScreenPoint::new(550.0, 150.0),
        },
        canvas_size(),
    ));
    let ids: Vec<String> = app
        .active_project()
        .unwrap()
        .nodes
        .iter()
        .map(|n| n.id.clone())
        .collect();

    let _ = app.update(Message::ConnectFrom(ids[0].clone()));
    assert_eq!(app.engine().link().source(), Some(ids[0].as_str()));

    let press = reasongraph::canvas::PointerEvent::mouse(ScreenPoint::new(550.0, 150.0));
    let _ = app.update(Message::Canvas(InputEvent::PointerDown(press), canvas_size()));
    let _ = app.update(Message::Canvas(InputEvent::PointerUp(press), canvas_size()));

    let project = app.active_project().unwrap();
    assert_eq!(project.nodes[0].connections, vec![ids[1].clone()]);
    assert!(!app.engine().link().is_armed());
}

/// Test the save shortcut with an in-memory store.
#[test]
fn test_app_save_in_memory() {
    let mut app = app();

    let _ = app.update(Message::Canvas(
        InputEvent::Key {
            key: Key::Character("s".to_string()),
            modifiers: Modifiers {
                control: true,
                ..Modifiers::default()
            },
            text: Some("s".to_string()),
        },
        canvas_size(),
    ));

    let notification = app.notification().map(|n| n.text.clone());
    assert_eq!(
        notification.as_deref(),
        Some("Projects are kept in memory only for this session")
    );

    let _ = app.update(Message::DismissNotification);
    assert!(app.notification().is_none());
}

/// Test that zoom buttons update the toolbar label.
#[test]
fn test_app_zoom_buttons() {
    let mut app = app();

    let _ = app.update(Message::ZoomIn);
    assert_eq!(app.engine().viewport().percent(), 125);

    let mut ui = simulator(app.view());
    assert!(ui.find("125%").is_ok());
    drop(ui);

    let _ = app.update(Message::ResetView);
    assert_eq!(app.engine().viewport().percent(), 100);
}

/// Test editing the active project's model settings.
#[test]
fn test_app_ai_settings() {
    let mut app = app();

    let _ = app.update(Message::SetAiModel(AiModel::Gemini25Pro));
    let _ = app.update(Message::SetTemperature(1.23));
    let _ = app.update(Message::SetMaxTokens(9000));

    let settings = app.active_project().map(|p| p.settings.clone()).unwrap();
    assert_eq!(settings.model, AiModel::Gemini25Pro);
    assert_eq!(settings.temperature, 1.2);
    assert_eq!(settings.max_tokens, 4000);

    let mut ui = simulator(app.view());
    assert!(ui.find("Temperature: 1.2").is_ok());
    assert!(ui.find("Max tokens: 4000").is_ok());
}

/// Test that a session API key enables expansion.
#[test]
fn test_app_session_api_key() {
    let mut app = app();
    let _ = app.update(Message::AddNode(NodeType::Question));

    let _ = app.update(Message::SetApiKey("sk-or-v1-session".to_string()));

    let mut ui = simulator(app.view());
    assert!(ui.find("Expand with AI").is_ok());
}
