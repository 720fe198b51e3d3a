//! Reasongraph Iced application.

use std::path::PathBuf;

use iced::widget::canvas::Cache;
use iced::widget::{column, container, row, rule, text};
use iced::{Element, Length, Task, Theme};

use reasongraph_common::{
    Connection, ExpansionSettings, GraphStore, NodeId, OpenRouterClient, ProjectId, ProjectPatch,
    ProjectSettings, ProjectStore, ReasoningNode, ReasoningProject, apply_expansion, export,
    persist,
};

use crate::canvas::{CanvasEngine, GraphCommand};
use crate::config::AppConfig;
use crate::message::Message;
use crate::view::canvas::GraphCanvas;
use crate::view::detail::{ExpansionState, detail_view};
use crate::view::sidebar::{AiPreferences, MAX_TOKENS_RANGE, TEMPERATURE_RANGE, sidebar_view};
use crate::view::toolbar::toolbar_view;
use crate::view::{Notification, notification_view};

const STARTER_PROJECT: &str = "My first reasoning graph";

/// The main Reasongraph application.
pub struct Reasongraph {
    config: AppConfig,
    store: ProjectStore,
    /// Project shown on the canvas.
    active: Option<ProjectId>,
    engine: CanvasEngine,
    canvas_cache: Cache,
    new_project_name: String,
    /// API key entered in the sidebar, never written to disk.
    api_key: String,
    expansion: ExpansionState,
    client: OpenRouterClient,
    notification: Option<Notification>,
    /// A write is running; further writes wait for it.
    persist_in_flight: bool,
    /// Something changed while a write was running.
    persist_pending: bool,
    /// Announce the next completed write.
    save_requested: bool,
}

impl Reasongraph {
    /// Boot the application (called by iced::application).
    pub fn boot(config: AppConfig) -> (Self, Task<Message>) {
        let path = config.store_path();
        let (store, notification) = match ProjectStore::open(&path, config.storage_format) {
            Ok(store) => (store, None),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Falling back to in-memory store");
                (
                    ProjectStore::in_memory(),
                    Some(Notification::error(format!(
                        "Could not open {}: {}. Changes will not be saved.",
                        path.display(),
                        e
                    ))),
                )
            }
        };

        let mut app = Self::new(config, store);
        app.notification = notification;
        (app, Task::none())
    }

    /// Build the application around an already opened store.
    ///
    /// An empty store gets a starter project.
    pub fn new(config: AppConfig, mut store: ProjectStore) -> Self {
        if store.list().is_empty() {
            let mut project = ReasoningProject::new(STARTER_PROJECT, None);
            project.settings = default_settings(&config);
            store.insert(project);
            if let Err(e) = store.save() {
                tracing::warn!(error = %e, "Failed to save starter project");
            }
        }

        let active = store.list().first().map(|p| p.id.clone());
        let expansion = ExpansionState {
            available: config.ai.resolved_api_key().is_some(),
            ..ExpansionState::default()
        };

        Self {
            engine: CanvasEngine::new(config.default_node_type),
            config,
            store,
            active,
            canvas_cache: Cache::new(),
            new_project_name: String::new(),
            api_key: String::new(),
            expansion,
            client: OpenRouterClient::default(),
            notification: None,
            persist_in_flight: false,
            persist_pending: false,
            save_requested: false,
        }
    }

    /// Get the window title.
    pub fn title(&self) -> String {
        match self.active_project() {
            Some(project) => format!("Reasongraph - {}", project.name),
            None => "Reasongraph".to_string(),
        }
    }

    pub fn store(&self) -> &ProjectStore {
        &self.store
    }

    pub fn engine(&self) -> &CanvasEngine {
        &self.engine
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn active_project(&self) -> Option<&ReasoningProject> {
        self.active.as_deref().and_then(|id| self.store.get(id))
    }

    pub fn selected_node(&self) -> Option<&ReasoningNode> {
        let id = self.engine.selection()?;
        self.active_project()?.node(id)
    }

    /// Handle incoming messages.
    pub fn update(&mut self, message: Message) -> Task<Message> {
        let task = self.handle(message);
        // Anything may have changed what the canvas shows.
        self.canvas_cache.clear();
        task
    }

    fn handle(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Canvas(input, size) => {
                self.engine
                    .set_canvas_size(f64::from(size.width), f64::from(size.height));
                let nodes: &[ReasoningNode] = match self.active.as_deref() {
                    Some(id) => self.store.get(id).map(|p| p.list_nodes()).unwrap_or(&[]),
                    None => &[],
                };
                let commands = self.engine.handle(input, nodes);
                self.apply(commands)
            }

            Message::ZoomIn => {
                self.engine.zoom_in();
                Task::none()
            }
            Message::ZoomOut => {
                self.engine.zoom_out();
                Task::none()
            }
            Message::ResetView => {
                self.engine.reset_view();
                Task::none()
            }

            Message::SaveProject => self.apply(vec![GraphCommand::SaveProject]),
            Message::ExportJson => self.export_active(ExportKind::Json),
            Message::ExportMarkdown => self.export_active(ExportKind::Markdown),

            Message::SelectProject(id) => {
                if self.store.get(&id).is_some() && self.active.as_ref() != Some(&id) {
                    tracing::info!(project = %id, "Switched project");
                    self.engine.switch_graph();
                    self.active = Some(id);
                }
                Task::none()
            }
            Message::SetNewProjectName(name) => {
                self.new_project_name = name;
                Task::none()
            }
            Message::CreateProject => {
                let name = self.new_project_name.trim().to_string();
                if name.is_empty() {
                    return Task::none();
                }
                let mut project = ReasoningProject::new(name, None);
                project.settings = default_settings(&self.config);
                let id = self.store.insert(project).id.clone();
                tracing::info!(project = %id, "Created project");
                self.new_project_name.clear();
                self.engine.switch_graph();
                self.active = Some(id);
                self.request_persist()
            }
            Message::DeleteProject(id) => {
                if let Err(e) = self.store.delete(&id) {
                    self.report(&e);
                    return Task::none();
                }
                tracing::info!(project = %id, "Deleted project");
                if self.active.as_ref() == Some(&id) {
                    self.engine.switch_graph();
                    self.active = self.store.list().first().map(|p| p.id.clone());
                }
                self.request_persist()
            }

            Message::SetNewNodeType(kind) => {
                self.engine.set_new_node_kind(kind);
                Task::none()
            }
            Message::AddNode(kind) => {
                let position = self.engine.center_world();
                self.apply(vec![GraphCommand::CreateNode { kind, position }])
            }

            Message::SetApiKey(key) => {
                self.api_key = key;
                self.expansion.available = self.resolved_api_key().is_some();
                Task::none()
            }
            Message::SetAiModel(model) => self.update_settings(|s| s.model = model),
            Message::SetTemperature(temperature) => self.update_settings(|s| {
                let rounded = (temperature * 10.0).round() / 10.0;
                s.temperature = rounded.clamp(*TEMPERATURE_RANGE.start(), *TEMPERATURE_RANGE.end());
            }),
            Message::SetMaxTokens(max_tokens) => self.update_settings(|s| {
                s.max_tokens = max_tokens.clamp(*MAX_TOKENS_RANGE.start(), *MAX_TOKENS_RANGE.end());
            }),

            Message::ConnectFrom(id) => {
                if !self.engine.arm_link(&id) {
                    tracing::debug!(node = %id, "Link not armed");
                }
                Task::none()
            }
            Message::CancelLink => {
                self.engine.cancel_link();
                Task::none()
            }
            Message::DeleteNode(id) => self.apply(vec![GraphCommand::DeleteNode(id)]),

            Message::SetExpansionContext(context) => {
                self.expansion.context = context;
                Task::none()
            }
            Message::ExpandNode(id) => self.expand(id),
            Message::Expanded {
                project_id,
                parent_id,
                result,
            } => self.finish_expansion(project_id, parent_id, result),

            Message::Persisted(result) => {
                self.persist_in_flight = false;
                match result {
                    Ok(()) => {
                        if std::mem::take(&mut self.save_requested) {
                            self.notification = Some(Notification::info("Project saved"));
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to persist projects");
                        self.notification = Some(Notification::error(format!("Save failed: {}", e)));
                    }
                }
                if std::mem::take(&mut self.persist_pending) {
                    return self.request_persist();
                }
                Task::none()
            }
            Message::Exported(result) => {
                self.notification = Some(match result {
                    Ok(path) => Notification::info(format!("Exported to {}", path)),
                    Err(e) => Notification::error(format!("Export failed: {}", e)),
                });
                Task::none()
            }

            Message::DismissNotification => {
                self.notification = None;
                Task::none()
            }
        }
    }

    /// Apply engine commands to the active project.
    fn apply(&mut self, commands: Vec<GraphCommand>) -> Task<Message> {
        let mut dirty = false;

        for command in commands {
            let Some(project) = self.active.as_deref().and_then(|id| self.store.get_mut(id))
            else {
                tracing::debug!(?command, "No active project, dropping command");
                continue;
            };

            // Ok(true) when the project changed.
            let result = match command {
                GraphCommand::Select(_) => Ok(false),
                GraphCommand::UpdatePosition { id, position } => {
                    project.update_position(&id, position).map(|()| true)
                }
                GraphCommand::UpdateContent { id, content } => {
                    project.update_content(&id, &content).map(|()| true)
                }
                GraphCommand::AddConnection { source, target } => project
                    .add_connection(&source, &target)
                    .map(|connection| match connection {
                        Connection::Added => {
                            tracing::info!(source = %source, target = %target, "Connected nodes");
                            true
                        }
                        Connection::AlreadyExists => {
                            tracing::debug!(source = %source, target = %target, "Link already exists");
                            false
                        }
                    }),
                GraphCommand::CreateNode { kind, position } => {
                    project.create_node(kind, position).map(|id| {
                        tracing::info!(node = %id, kind = %kind, "Created node");
                        self.engine.select(Some(id));
                        true
                    })
                }
                GraphCommand::DeleteNode(id) => project.delete_node(&id).map(|()| {
                    tracing::info!(node = %id, "Deleted node");
                    self.engine.forget_node(&id);
                    true
                }),
                GraphCommand::SaveProject => {
                    self.save_requested = true;
                    Ok(true)
                }
            };

            match result {
                Ok(changed) => dirty |= changed,
                Err(e) => self.report(&e),
            }
        }

        if dirty {
            self.request_persist()
        } else {
            Task::none()
        }
    }

    /// Patch the model settings of the active project.
    fn update_settings(&mut self, change: impl FnOnce(&mut ProjectSettings)) -> Task<Message> {
        let Some(project) = self.active_project() else {
            return Task::none();
        };
        let id = project.id.clone();
        let mut settings = project.settings.clone();
        change(&mut settings);
        if settings == project.settings {
            return Task::none();
        }

        let patch = ProjectPatch {
            settings: Some(settings),
            ..ProjectPatch::default()
        };
        match self.store.update_meta(&id, patch) {
            Ok(project) => {
                tracing::debug!(
                    project = %id,
                    settings = ?project.settings,
                    "Updated model settings"
                );
                self.request_persist()
            }
            Err(e) => {
                self.report(&e);
                Task::none()
            }
        }
    }

    /// The session key wins over the configured one.
    fn resolved_api_key(&self) -> Option<String> {
        Some(self.api_key.trim())
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .or_else(|| self.config.ai.resolved_api_key())
    }

    /// Start a background write, or queue one behind the running write.
    fn request_persist(&mut self) -> Task<Message> {
        if self.persist_in_flight {
            self.persist_pending = true;
            return Task::none();
        }
        let Some(request) = self.store.snapshot() else {
            if std::mem::take(&mut self.save_requested) {
                self.notification = Some(Notification::info(
                    "Projects are kept in memory only for this session",
                ));
            }
            return Task::none();
        };
        self.persist_in_flight = true;
        Task::perform(persist(request), |result| {
            Message::Persisted(result.map_err(|e| e.to_string()))
        })
    }

    fn export_active(&mut self, kind: ExportKind) -> Task<Message> {
        let Some(project) = self.active_project() else {
            return Task::none();
        };
        let path = self
            .config
            .data_dir()
            .join("exports")
            .join(export::file_name(project, kind.extension()));
        let contents = match kind {
            ExportKind::Json => export::to_json(project),
            ExportKind::Markdown => Ok(export::to_markdown(project)),
        };
        tracing::info!(project = %project.id, path = %path.display(), "Exporting project");

        match contents {
            Ok(contents) => Task::perform(write_export(path, contents), Message::Exported),
            Err(e) => {
                self.report(&e);
                Task::none()
            }
        }
    }

    fn expand(&mut self, node_id: NodeId) -> Task<Message> {
        if self.expansion.pending.is_some() {
            return Task::none();
        }
        let Some(api_key) = self.resolved_api_key() else {
            self.notification = Some(Notification::error("AI API key is required"));
            return Task::none();
        };
        let Some(project) = self.active_project().cloned() else {
            return Task::none();
        };
        let Some(node) = project.node(&node_id).cloned() else {
            return Task::none();
        };

        let context = Some(self.expansion.context.trim().to_string()).filter(|c| !c.is_empty());
        let settings = ExpansionSettings {
            api_key,
            model: Some(project.settings.model.as_str().to_string()),
            temperature: Some(project.settings.temperature),
            max_tokens: Some(project.settings.max_tokens),
        };
        let client = self.client.clone();
        let project_id = project.id.clone();
        self.expansion.pending = Some(node_id.clone());

        Task::perform(
            async move {
                client
                    .expand(&project, &node, context.as_deref(), &settings)
                    .await
                    .map_err(|e| e.to_string())
            },
            move |result| Message::Expanded {
                project_id,
                parent_id: node_id,
                result,
            },
        )
    }

    fn finish_expansion(
        &mut self,
        project_id: ProjectId,
        parent_id: NodeId,
        result: Result<Vec<ReasoningNode>, String>,
    ) -> Task<Message> {
        self.expansion.pending = None;

        let children = match result {
            Ok(children) => children,
            Err(e) => {
                tracing::warn!(node = %parent_id, error = %e, "Expansion failed");
                self.notification = Some(Notification::error(format!("AI expansion failed: {}", e)));
                return Task::none();
            }
        };

        let applied = self
            .store
            .project_mut(&project_id)
            .and_then(|project| apply_expansion(project, &parent_id, children));
        match applied {
            Ok(ids) => {
                tracing::info!(node = %parent_id, children = ids.len(), "Applied expansion");
                self.expansion.context.clear();
                self.notification = Some(Notification::info(format!(
                    "Added {} AI-generated nodes",
                    ids.len()
                )));
                self.request_persist()
            }
            Err(e) => {
                self.report(&e);
                Task::none()
            }
        }
    }

    fn report(&mut self, error: &reasongraph_common::Error) {
        tracing::warn!(error = %error, "Graph update failed");
        self.notification = Some(Notification::error(error.to_string()));
    }

    /// Render the view.
    pub fn view(&self) -> Element<'_, Message> {
        let toolbar = toolbar_view(
            self.active_project(),
            self.engine.viewport().percent(),
            self.persist_in_flight && self.save_requested,
        );

        let sidebar = sidebar_view(
            self.store.list(),
            self.active.as_deref(),
            &self.new_project_name,
            self.engine.new_node_kind(),
            self.active_project().map(|project| AiPreferences {
                settings: &project.settings,
                api_key: &self.api_key,
            }),
        );

        let main: Element<'_, Message> = match self.active_project() {
            Some(project) => {
                let scene = self.engine.scene(project.list_nodes());
                let canvas =
                    GraphCanvas::new(scene, self.engine.new_node_kind(), &self.canvas_cache).view();
                let detail = detail_view(
                    project,
                    self.selected_node(),
                    self.engine.link().source(),
                    &self.expansion,
                );
                row![canvas, rule::vertical(1), detail].into()
            }
            None => container(text("Create a project to start").size(16))
                .center(Length::Fill)
                .into(),
        };

        let mut content = column![toolbar, rule::horizontal(1)];
        if let Some(notification) = &self.notification {
            content = content.push(notification_view(notification));
        }
        content
            .push(row![sidebar, rule::vertical(1), main].height(Length::Fill))
            .into()
    }

    /// Get the application theme.
    pub fn theme(&self) -> Theme {
        Theme::Dark
    }
}

#[derive(Debug, Clone, Copy)]
enum ExportKind {
    Json,
    Markdown,
}

impl ExportKind {
    fn extension(self) -> &'static str {
        match self {
            ExportKind::Json => "json",
            ExportKind::Markdown => "md",
        }
    }
}

/// Settings for new projects, taken from the `ai` config section.
fn default_settings(config: &AppConfig) -> ProjectSettings {
    ProjectSettings {
        model: config.ai.model,
        temperature: config.ai.temperature,
        max_tokens: config.ai.max_tokens,
    }
}

async fn write_export(path: PathBuf, contents: String) -> Result<String, String> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }
    tokio::fs::write(&path, contents)
        .await
        .map_err(|e| e.to_string())?;
    Ok(path.display().to_string())
}
