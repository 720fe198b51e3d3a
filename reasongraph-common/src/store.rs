//! Graph storage.
//!
//! [`GraphStore`] is the narrow mutation interface the canvas engine commits
//! through. [`ReasoningProject`] implements it directly; [`ProjectStore`] keeps
//! a set of projects in memory and persists them to a single file.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::{
    NodeId, NodeType, ProjectSettings, ReasoningNode, ReasoningProject, WorldPoint,
};
use crate::serialization::{Format, decode_auto, encode};

/// Outcome of a connection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connection {
    /// The link was appended.
    Added,
    /// The link already existed; nothing changed.
    AlreadyExists,
}

/// Mutations the canvas commits to the authoritative graph.
pub trait GraphStore {
    /// Current committed nodes.
    fn list_nodes(&self) -> &[ReasoningNode];

    /// Move a node to a world position.
    fn update_position(&mut self, id: &str, position: WorldPoint) -> Result<()>;

    /// Replace a node's text.
    fn update_content(&mut self, id: &str, content: &str) -> Result<()>;

    /// Append `target` to the connections of `id`. Duplicates are a no-op.
    fn add_connection(&mut self, id: &str, target: &str) -> Result<Connection>;

    /// Create an empty node and return its id.
    fn create_node(&mut self, kind: NodeType, position: WorldPoint) -> Result<NodeId>;

    /// Remove a node and every link pointing at it.
    fn delete_node(&mut self, id: &str) -> Result<()>;
}

impl GraphStore for ReasoningProject {
    fn list_nodes(&self) -> &[ReasoningNode] {
        &self.nodes
    }

    fn update_position(&mut self, id: &str, position: WorldPoint) -> Result<()> {
        let node = self
            .node_mut(id)
            .ok_or_else(|| Error::NodeNotFound(id.to_string()))?;
        node.position = position;
        node.touch();
        self.touch();
        Ok(())
    }

    fn update_content(&mut self, id: &str, content: &str) -> Result<()> {
        let node = self
            .node_mut(id)
            .ok_or_else(|| Error::NodeNotFound(id.to_string()))?;
        node.content = content.to_string();
        node.touch();
        self.touch();
        Ok(())
    }

    fn add_connection(&mut self, id: &str, target: &str) -> Result<Connection> {
        if id == target {
            return Err(Error::SelfConnection(id.to_string()));
        }
        if self.node(target).is_none() {
            return Err(Error::NodeNotFound(target.to_string()));
        }
        let node = self
            .node_mut(id)
            .ok_or_else(|| Error::NodeNotFound(id.to_string()))?;
        if node.connects_to(target) {
            return Ok(Connection::AlreadyExists);
        }
        node.connections.push(target.to_string());
        node.touch();
        self.touch();
        Ok(Connection::Added)
    }

    fn create_node(&mut self, kind: NodeType, position: WorldPoint) -> Result<NodeId> {
        let node = ReasoningNode::new(kind, position);
        let id = node.id.clone();
        self.nodes.push(node);
        self.touch();
        Ok(id)
    }

    fn delete_node(&mut self, id: &str) -> Result<()> {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != id);
        if self.nodes.len() == before {
            return Err(Error::NodeNotFound(id.to_string()));
        }
        for node in &mut self.nodes {
            node.connections.retain(|c| c != id);
        }
        self.touch();
        Ok(())
    }
}

/// Partial update of a node, as sent by API clients.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePatch {
    #[serde(default, rename = "type")]
    pub kind: Option<NodeType>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub position: Option<WorldPoint>,
    #[serde(default)]
    pub connections: Option<Vec<NodeId>>,
    #[serde(default)]
    pub metadata: Option<MetadataPatch>,
}

/// Partial update of node metadata.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataPatch {
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub rationale: Option<String>,
}

impl ReasoningProject {
    /// Apply a partial update to one node.
    pub fn patch_node(&mut self, id: &str, patch: NodePatch) -> Result<&ReasoningNode> {
        let node = self
            .node_mut(id)
            .ok_or_else(|| Error::NodeNotFound(id.to_string()))?;
        if let Some(kind) = patch.kind {
            node.kind = kind;
        }
        if let Some(content) = patch.content {
            node.content = content;
        }
        if let Some(position) = patch.position {
            node.position = position;
        }
        if let Some(mut connections) = patch.connections {
            let mut seen = std::collections::HashSet::new();
            connections.retain(|c| c != id && seen.insert(c.clone()));
            node.connections = connections;
        }
        if let Some(meta) = patch.metadata {
            if let Some(confidence) = meta.confidence {
                node.metadata.confidence = confidence.clamp(0.0, 1.0);
            }
            if meta.rationale.is_some() {
                node.metadata.rationale = meta.rationale;
            }
        }
        node.touch();
        self.touch();
        self.node(id)
            .ok_or_else(|| Error::NodeNotFound(id.to_string()))
    }
}

/// Partial update of project-level fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub settings: Option<ProjectSettings>,
}

/// A request to write a snapshot of the store to disk.
#[derive(Debug, Clone)]
pub struct PersistRequest {
    pub path: PathBuf,
    pub format: Format,
    pub projects: Vec<ReasoningProject>,
}

/// All projects, backed by one file.
#[derive(Debug, Default)]
pub struct ProjectStore {
    path: Option<PathBuf>,
    format: Format,
    projects: Vec<ReasoningProject>,
}

impl ProjectStore {
    /// A store that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open (or create) the store file at `path`.
    ///
    /// A missing file is created empty. A file that cannot be parsed is
    /// logged and treated as empty so the application can still start.
    pub fn open(path: impl AsRef<Path>, format: Format) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let mut store = Self {
            path: Some(path.clone()),
            format,
            projects: Vec::new(),
        };

        if !path.exists() {
            store.save()?;
            tracing::info!(path = %path.display(), "Created empty project store");
            return Ok(store);
        }

        let data = std::fs::read(&path)?;
        match decode_auto::<Vec<ReasoningProject>>(&data) {
            Ok(projects) => {
                tracing::info!(
                    path = %path.display(),
                    projects = projects.len(),
                    "Loaded project store"
                );
                store.projects = projects;
            }
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "Failed to parse persisted projects, starting with empty store"
                );
            }
        }

        Ok(store)
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// All projects in insertion order.
    pub fn list(&self) -> &[ReasoningProject] {
        &self.projects
    }

    pub fn get(&self, id: &str) -> Option<&ReasoningProject> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ReasoningProject> {
        self.projects.iter_mut().find(|p| p.id == id)
    }

    /// Look up a project or fail with `ProjectNotFound`.
    pub fn project_mut(&mut self, id: &str) -> Result<&mut ReasoningProject> {
        self.get_mut(id)
            .ok_or_else(|| Error::ProjectNotFound(id.to_string()))
    }

    /// Create and store an empty project.
    pub fn create(
        &mut self,
        name: impl Into<String>,
        description: Option<String>,
    ) -> &ReasoningProject {
        self.insert(ReasoningProject::new(name, description))
    }

    /// Store a project, replacing one with the same id.
    pub fn insert(&mut self, project: ReasoningProject) -> &ReasoningProject {
        let index = match self.projects.iter().position(|p| p.id == project.id) {
            Some(index) => {
                self.projects[index] = project;
                index
            }
            None => {
                self.projects.push(project);
                self.projects.len() - 1
            }
        };
        &self.projects[index]
    }

    /// Update project-level fields.
    pub fn update_meta(&mut self, id: &str, patch: ProjectPatch) -> Result<&ReasoningProject> {
        let project = self.project_mut(id)?;
        if let Some(name) = patch.name {
            project.name = name;
        }
        if let Some(description) = patch.description {
            project.description = Some(description).filter(|d| !d.trim().is_empty());
        }
        if let Some(settings) = patch.settings {
            project.settings = settings;
        }
        project.touch();
        Ok(project)
    }

    /// Remove a project.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        let before = self.projects.len();
        self.projects.retain(|p| p.id != id);
        if self.projects.len() == before {
            return Err(Error::ProjectNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Write the store synchronously. In-memory stores do nothing.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let bytes = encode(&self.projects, self.format)?;
        write_atomically(path, &bytes)
    }

    /// Capture the current state for an asynchronous write.
    pub fn snapshot(&self) -> Option<PersistRequest> {
        self.path.as_ref().map(|path| PersistRequest {
            path: path.clone(),
            format: self.format,
            projects: self.projects.clone(),
        })
    }
}

/// Write a snapshot without blocking the caller's thread.
pub async fn persist(request: PersistRequest) -> Result<()> {
    let bytes = encode(&request.projects, request.format)?;
    let tmp = request.path.with_extension("tmp");
    tokio::fs::write(&tmp, &bytes).await?;
    tokio::fs::rename(&tmp, &request.path).await?;
    tracing::debug!(
        path = %request.path.display(),
        projects = request.projects.len(),
        "Persisted project store"
    );
    Ok(())
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project_with_two_nodes() -> (ReasoningProject, NodeId, NodeId) {
        let mut project = ReasoningProject::new("Test", None);
        let a = project
            .create_node(NodeType::Question, WorldPoint::new(0.0, 0.0))
            .unwrap();
        let b = project
            .create_node(NodeType::Reasoning, WorldPoint::new(300.0, 0.0))
            .unwrap();
        (project, a, b)
    }

    #[test]
    fn test_duplicate_connection_is_noop() {
        let (mut project, a, b) = project_with_two_nodes();

        assert_eq!(project.add_connection(&a, &b).unwrap(), Connection::Added);
        assert_eq!(
            project.add_connection(&a, &b).unwrap(),
            Connection::AlreadyExists
        );
        assert_eq!(project.node(&a).unwrap().connections, vec![b.clone()]);
    }

    #[test]
    fn test_connection_errors() {
        let (mut project, a, _) = project_with_two_nodes();

        assert!(matches!(
            project.add_connection(&a, &a),
            Err(Error::SelfConnection(_))
        ));
        assert!(matches!(
            project.add_connection(&a, "missing"),
            Err(Error::NodeNotFound(_))
        ));
        assert!(matches!(
            project.add_connection("missing", &a),
            Err(Error::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_delete_strips_connections() {
        let (mut project, a, b) = project_with_two_nodes();
        project.add_connection(&a, &b).unwrap();

        project.delete_node(&b).unwrap();

        assert_eq!(project.nodes.len(), 1);
        assert!(project.node(&a).unwrap().connections.is_empty());
        assert!(project.delete_node(&b).unwrap_err().is_not_found());
    }

    #[test]
    fn test_update_position_and_content() {
        let (mut project, a, _) = project_with_two_nodes();

        project
            .update_position(&a, WorldPoint::new(40.0, 40.0))
            .unwrap();
        project.update_content(&a, "What changed?").unwrap();

        let node = project.node(&a).unwrap();
        assert_eq!(node.position, WorldPoint::new(40.0, 40.0));
        assert_eq!(node.content, "What changed?");
        assert!(
            project
                .update_position("gone", WorldPoint::ORIGIN)
                .is_err()
        );
    }

    #[test]
    fn test_patch_node_dedups_connections() {
        let (mut project, a, b) = project_with_two_nodes();

        let patch = NodePatch {
            connections: Some(vec![b.clone(), b.clone(), a.clone()]),
            metadata: Some(MetadataPatch {
                confidence: Some(1.5),
                rationale: Some("because".to_string()),
            }),
            ..NodePatch::default()
        };
        let node = project.patch_node(&a, patch).unwrap();

        assert_eq!(node.connections, vec![b]);
        assert_eq!(node.metadata.confidence, 1.0);
        assert_eq!(node.metadata.rationale.as_deref(), Some("because"));
    }

    #[test]
    fn test_in_memory_store_crud() {
        let mut store = ProjectStore::in_memory();
        let id = store.create("First", Some("desc".to_string())).id.clone();

        let patch = ProjectPatch {
            name: Some("Renamed".to_string()),
            ..ProjectPatch::default()
        };
        assert_eq!(store.update_meta(&id, patch).unwrap().name, "Renamed");
        assert!(store.save().is_ok());
        assert!(store.snapshot().is_none());

        store.delete(&id).unwrap();
        assert!(store.list().is_empty());
        assert!(matches!(store.delete(&id), Err(Error::ProjectNotFound(_))));
    }
}
