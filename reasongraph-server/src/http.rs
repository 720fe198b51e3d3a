//! HTTP API over the project store.
//!
//! Every JSON response uses the envelope `{success, data?, error?, message?}`.
//! Mutations are written back to the store file before the response is sent.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, watch};
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use reasongraph_common::{
    AiModel, ExpansionSettings, GraphStore, NodeId, NodeMetadata, NodePatch, NodeType,
    OpenRouterClient, ProjectPatch, ProjectSettings, ProjectStore, ReasoningNode,
    ReasoningProject, WorldPoint, apply_expansion, export, persist,
};

/// Project store shared across handlers.
pub type SharedStore = Arc<RwLock<ProjectStore>>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    store: SharedStore,
    client: OpenRouterClient,
    /// Serializes file writes so snapshots land in the order they were taken.
    write_gate: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(store: SharedStore) -> Self {
        Self::with_client(store, OpenRouterClient::default())
    }

    /// State with a specific model client.
    pub fn with_client(store: SharedStore, client: OpenRouterClient) -> Self {
        Self {
            store,
            client,
            write_gate: Arc::new(Mutex::new(())),
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Write the current store contents to its file.
    async fn persist(&self) -> Result<(), ApiError> {
        let _gate = self.write_gate.lock().await;
        let snapshot = self.store.read().snapshot();
        let Some(request) = snapshot else {
            return Ok(());
        };
        persist(request).await.map_err(|e| {
            warn!(error = %e, "Failed to persist projects");
            ApiError::internal("Failed to save projects", e.to_string())
        })
    }
}

/// Response envelope.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }
    }
}

/// A failed request, rendered as an error envelope.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    message: Option<String>,
}

impl ApiError {
    fn bad_request(error: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: error.into(),
            message: None,
        }
    }

    fn not_found(error: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error: error.into(),
            message: None,
        }
    }

    fn internal(error: impl Into<String>, message: String) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: error.into(),
            message: Some(message),
        }
    }
}

impl From<reasongraph_common::Error> for ApiError {
    fn from(e: reasongraph_common::Error) -> Self {
        use reasongraph_common::Error;
        match e {
            Error::ProjectNotFound(_) => ApiError::not_found("Project not found"),
            Error::NodeNotFound(_) => ApiError::not_found("Node not found"),
            Error::SelfConnection(_) => ApiError::bad_request(e.to_string()),
            other => ApiError::internal("Internal Server Error", other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: "Invalid request body".to_string(),
            message: Some(rejection.body_text()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Envelope::<()> {
            success: false,
            data: None,
            error: Some(self.error),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<(StatusCode, Json<Envelope<T>>), ApiError>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(Envelope::data(data))))
}

fn created<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::CREATED, Json(Envelope::data(data))))
}

/// Create the HTTP router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/projects", get(list_projects).post(create_project))
        .route(
            "/api/projects/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/api/projects/:id/nodes", post(add_node))
        .route(
            "/api/projects/:id/nodes/:node_id",
            put(update_node).delete(delete_node),
        )
        .route("/api/export/json/:id", get(export_json))
        .route("/api/export/markdown/:id", get(export_markdown))
        .route("/api/ai/reason", post(reason))
        .fallback(fallback_handler)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    timestamp: String,
}

async fn health_handler() -> Json<Health> {
    Json(Health {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

async fn fallback_handler() -> ApiError {
    ApiError::not_found("Route not found")
}

async fn list_projects(State(state): State<AppState>) -> ApiResult<Vec<ReasoningProject>> {
    let projects = state.store.read().list().to_vec();
    ok(projects)
}

async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ReasoningProject> {
    let project = state
        .store
        .read()
        .get(&id)
        .cloned()
        .ok_or_else(|| ApiError::not_found("Project not found"))?;
    ok(project)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewProject {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    settings: Option<SettingsPatch>,
}

/// Settings fields a client may change; missing fields keep their value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsPatch {
    #[serde(default)]
    model: Option<AiModel>,
    #[serde(default)]
    temperature: Option<f64>,
    #[serde(default)]
    max_tokens: Option<u32>,
}

impl SettingsPatch {
    fn merge(self, base: &ProjectSettings) -> ProjectSettings {
        ProjectSettings {
            model: self.model.unwrap_or(base.model),
            temperature: self.temperature.unwrap_or(base.temperature),
            max_tokens: self.max_tokens.unwrap_or(base.max_tokens),
        }
    }
}

async fn create_project(
    State(state): State<AppState>,
    payload: Result<Json<NewProject>, JsonRejection>,
) -> ApiResult<ReasoningProject> {
    let Json(body) = payload?;
    let name = body
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::bad_request("Project name is required"))?;

    let mut project = ReasoningProject::new(name, body.description);
    if let Some(settings) = body.settings {
        project.settings = settings.merge(&project.settings);
    }
    let project = state.store.write().insert(project).clone();
    state.persist().await?;

    info!(project = %project.id, name = %project.name, "Created project");
    created(project)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProject {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    settings: Option<SettingsPatch>,
}

async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateProject>, JsonRejection>,
) -> ApiResult<ReasoningProject> {
    let Json(body) = payload?;
    let project = {
        let mut store = state.store.write();
        let settings = match body.settings {
            Some(patch) => {
                let current = store
                    .get(&id)
                    .ok_or_else(|| ApiError::not_found("Project not found"))?;
                Some(patch.merge(&current.settings))
            }
            None => None,
        };
        let patch = ProjectPatch {
            name: body.name.filter(|n| !n.trim().is_empty()),
            description: body.description,
            settings,
        };
        store.update_meta(&id, patch)?.clone()
    };
    state.persist().await?;

    info!(project = %id, "Updated project");
    ok(project)
}

async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<()>>, ApiError> {
    state.store.write().delete(&id)?;
    state.persist().await?;

    info!(project = %id, "Deleted project");
    Ok(Json(Envelope {
        success: true,
        data: None,
        error: None,
        message: Some("Project deleted successfully".to_string()),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewNode {
    #[serde(default)]
    id: Option<NodeId>,
    #[serde(default, rename = "type")]
    kind: Option<NodeType>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    position: Option<WorldPoint>,
    #[serde(default)]
    connections: Option<Vec<NodeId>>,
    #[serde(default)]
    metadata: Option<NewMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewMetadata {
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    ai_generated: Option<bool>,
    #[serde(default)]
    rationale: Option<String>,
}

impl NewNode {
    fn into_node(self, kind: NodeType) -> ReasoningNode {
        let mut node = ReasoningNode::new(kind, self.position.unwrap_or_default());
        if let Some(id) = self.id.filter(|id| !id.is_empty()) {
            node.id = id;
        }
        node.content = self.content.unwrap_or_default();
        if let Some(mut connections) = self.connections {
            let mut seen = std::collections::HashSet::new();
            connections.retain(|c| *c != node.id && seen.insert(c.clone()));
            node.connections = connections;
        }
        if let Some(meta) = self.metadata {
            let defaults = NodeMetadata::now(node.metadata.confidence);
            node.metadata = NodeMetadata {
                confidence: meta
                    .confidence
                    .map(|c| c.clamp(0.0, 1.0))
                    .unwrap_or(defaults.confidence),
                ai_generated: meta.ai_generated.unwrap_or(false),
                rationale: meta.rationale,
                ..defaults
            };
        }
        node
    }
}

async fn add_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<NewNode>, JsonRejection>,
) -> ApiResult<ReasoningProject> {
    let Json(body) = payload?;
    let kind = body
        .kind
        .ok_or_else(|| ApiError::bad_request("Node type is required"))?;
    let node = body.into_node(kind);

    let project = {
        let mut store = state.store.write();
        let project = store.project_mut(&id)?;
        if project.node(&node.id).is_some() {
            return Err(ApiError::bad_request("Node id already exists"));
        }
        info!(project = %id, node = %node.id, kind = %kind, "Added node");
        project.nodes.push(node);
        project.touch();
        project.clone()
    };
    state.persist().await?;

    created(project)
}

async fn update_node(
    State(state): State<AppState>,
    Path((id, node_id)): Path<(String, String)>,
    payload: Result<Json<NodePatch>, JsonRejection>,
) -> ApiResult<ReasoningProject> {
    let Json(patch) = payload?;
    let project = {
        let mut store = state.store.write();
        let project = store.project_mut(&id)?;
        project.patch_node(&node_id, patch)?;
        project.clone()
    };
    state.persist().await?;

    debug!(project = %id, node = %node_id, "Updated node");
    ok(project)
}

async fn delete_node(
    State(state): State<AppState>,
    Path((id, node_id)): Path<(String, String)>,
) -> ApiResult<ReasoningProject> {
    let project = {
        let mut store = state.store.write();
        let project = store.project_mut(&id)?;
        project.delete_node(&node_id)?;
        project.clone()
    };
    state.persist().await?;

    info!(project = %id, node = %node_id, "Deleted node");
    ok(project)
}

fn attachment(
    content_type: &str,
    file_name: String,
    body: String,
) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        body,
    )
        .into_response()
}

async fn export_json(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let store = state.store.read();
    let project = store
        .get(&id)
        .ok_or_else(|| ApiError::not_found("Project not found"))?;
    let body = export::to_json(project)?;
    Ok(attachment(
        "application/json",
        export::file_name(project, "json"),
        body,
    ))
}

async fn export_markdown(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let store = state.store.read();
    let project = store
        .get(&id)
        .ok_or_else(|| ApiError::not_found("Project not found"))?;
    Ok(attachment(
        "text/markdown; charset=utf-8",
        export::file_name(project, "md"),
        export::to_markdown(project),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReasonRequest {
    #[serde(default)]
    node_id: Option<NodeId>,
    #[serde(default)]
    project_id: Option<String>,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    ai_settings: Option<AiSettings>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AiSettings {
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    temperature: Option<f64>,
    #[serde(default)]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReasonResponse {
    project: ReasoningProject,
    new_nodes: Vec<ReasoningNode>,
}

async fn reason(
    State(state): State<AppState>,
    payload: Result<Json<ReasonRequest>, JsonRejection>,
) -> ApiResult<ReasonResponse> {
    let Json(body) = payload?;
    let (Some(node_id), Some(project_id)) = (
        body.node_id.filter(|id| !id.is_empty()),
        body.project_id.filter(|id| !id.is_empty()),
    ) else {
        return Err(ApiError::bad_request("nodeId and projectId are required"));
    };
    let ai = body.ai_settings;
    let Some(api_key) = ai
        .as_ref()
        .and_then(|s| s.api_key.clone())
        .filter(|key| !key.trim().is_empty())
    else {
        return Err(ApiError::bad_request("AI API key is required"));
    };
    let settings = ExpansionSettings {
        api_key,
        model: ai.as_ref().and_then(|s| s.model.clone()),
        temperature: ai.as_ref().and_then(|s| s.temperature),
        max_tokens: ai.as_ref().and_then(|s| s.max_tokens),
    };

    let (project, node) = {
        let store = state.store.read();
        let project = store
            .get(&project_id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("Project not found"))?;
        let node = project
            .node(&node_id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("Node not found"))?;
        (project, node)
    };

    let context = body.context.filter(|c| !c.trim().is_empty());
    let children = state
        .client
        .expand(&project, &node, context.as_deref(), &settings)
        .await
        .map_err(|e| {
            warn!(project = %project_id, node = %node_id, error = %e, "Expansion failed");
            ApiError::internal("Failed to generate AI reasoning", e.to_string())
        })?;

    let new_nodes = children.clone();
    let project = {
        let mut store = state.store.write();
        let project = store.project_mut(&project_id)?;
        apply_expansion(project, &node_id, children)?;
        project.clone()
    };
    state.persist().await?;

    info!(
        project = %project_id,
        node = %node_id,
        children = new_nodes.len(),
        "Expanded node"
    );
    ok(ReasonResponse { project, new_nodes })
}

/// HTTP server configuration.
pub struct HttpServer {
    state: AppState,
    listen_addr: SocketAddr,
}

impl HttpServer {
    /// Create a new HTTP server.
    pub fn new(state: AppState, listen_addr: SocketAddr) -> Self {
        Self { state, listen_addr }
    }

    /// Run the HTTP server until the shutdown signal is received.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        let router = create_router(self.state);

        let listener = tokio::net::TcpListener::bind(self.listen_addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", self.listen_addr, e))?;

        info!(addr = %self.listen_addr, "HTTP server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                loop {
                    if shutdown.changed().await.is_err() {
                        break;
                    }
                    if *shutdown.borrow() {
                        break;
                    }
                }
                info!("HTTP server shutting down");
            })
            .await
            .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;

        info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn make_state() -> AppState {
        AppState::new(Arc::new(RwLock::new(ProjectStore::in_memory())))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let router = create_router(make_state());

        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let router = create_router(make_state());

        let response = router
            .oneshot(Request::get("/api/nothing").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_missing_project() {
        let router = create_router(make_state());

        let response = router
            .oneshot(
                Request::get("/api/projects/missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let router = create_router(make_state());

        let response = router
            .oneshot(
                Request::post("/api/projects")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_settings_patch_merges() {
        let base = ProjectSettings::default();
        let merged = SettingsPatch {
            temperature: Some(0.1),
            ..SettingsPatch::default()
        }
        .merge(&base);

        assert_eq!(merged.model, base.model);
        assert_eq!(merged.temperature, 0.1);
        assert_eq!(merged.max_tokens, base.max_tokens);
    }

    #[test]
    fn test_new_node_defaults() {
        let body: NewNode = serde_json::from_str(
            r#"{"id": "n1", "type": "hypothesis", "connections": ["n1", "n2", "n2"]}"#,
        )
        .unwrap();
        let node = body.into_node(NodeType::Hypothesis);

        assert_eq!(node.id, "n1");
        assert_eq!(node.content, "");
        assert_eq!(node.connections, vec!["n2".to_string()]);
        assert_eq!(node.position, WorldPoint::default());
        assert!(!node.metadata.ai_generated);
    }
}
