use iced::Size;

use reasongraph_common::{AiModel, NodeId, NodeType, ProjectId, ReasoningNode};

use crate::canvas::InputEvent;

/// Messages for the Reasongraph application.
#[derive(Debug, Clone)]
pub enum Message {
    /// Input from the canvas, with the canvas size at the time of the event.
    Canvas(InputEvent, Size),

    // Toolbar
    ZoomIn,
    ZoomOut,
    ResetView,
    SaveProject,
    ExportJson,
    ExportMarkdown,

    // Sidebar
    SelectProject(ProjectId),
    SetNewProjectName(String),
    CreateProject,
    DeleteProject(ProjectId),
    /// Type used for the next node created on the canvas.
    SetNewNodeType(NodeType),
    /// Add a node of the given type at the centre of the view.
    AddNode(NodeType),
    /// Session API key; empty falls back to the configured key.
    SetApiKey(String),
    SetAiModel(AiModel),
    SetTemperature(f64),
    SetMaxTokens(u32),

    // Node details
    ConnectFrom(NodeId),
    CancelLink,
    DeleteNode(NodeId),
    SetExpansionContext(String),
    ExpandNode(NodeId),

    /// Model expansion finished.
    Expanded {
        project_id: ProjectId,
        parent_id: NodeId,
        result: Result<Vec<ReasoningNode>, String>,
    },
    /// A background write of the project file finished.
    Persisted(Result<(), String>),
    /// An export file was written.
    Exported(Result<String, String>),

    DismissNotification,
}
