use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a reasoning node.
pub type NodeId = String;

/// Unique identifier for a project.
pub type ProjectId = String;

/// Default confidence assigned to manually created nodes.
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

/// A point in world space (the pan/zoom independent plane nodes live in).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

impl WorldPoint {
    pub const ORIGIN: WorldPoint = WorldPoint { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Translate by a world-space offset.
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Kind of reasoning step a node represents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    #[default]
    Question,
    Reasoning,
    Hypothesis,
    Branch,
    Conclusion,
}

impl NodeType {
    /// All node types, in toolbar order.
    pub const ALL: [NodeType; 5] = [
        NodeType::Question,
        NodeType::Reasoning,
        NodeType::Hypothesis,
        NodeType::Branch,
        NodeType::Conclusion,
    ];

    /// Wire name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Question => "question",
            NodeType::Reasoning => "reasoning",
            NodeType::Hypothesis => "hypothesis",
            NodeType::Branch => "branch",
            NodeType::Conclusion => "conclusion",
        }
    }

    /// Plural heading used when grouping nodes by type.
    pub fn group_title(&self) -> &'static str {
        match self {
            NodeType::Question => "Questions",
            NodeType::Reasoning => "Reasoning",
            NodeType::Hypothesis => "Hypotheses",
            NodeType::Branch => "Branches",
            NodeType::Conclusion => "Conclusions",
        }
    }

    /// Parse a type name, falling back to `Reasoning` for anything unknown.
    pub fn parse_lenient(s: &str) -> Self {
        Self::parse(s).unwrap_or(NodeType::Reasoning)
    }

    /// Parse an exact type name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "question" => Some(NodeType::Question),
            "reasoning" => Some(NodeType::Reasoning),
            "hypothesis" => Some(NodeType::Hypothesis),
            "branch" => Some(NodeType::Branch),
            "conclusion" => Some(NodeType::Conclusion),
            _ => None,
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bookkeeping attached to every node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Confidence in the step, 0.0 to 1.0.
    pub confidence: f64,
    /// Whether the node came from a model expansion.
    #[serde(default)]
    pub ai_generated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl NodeMetadata {
    /// Metadata for a node created right now.
    pub fn now(confidence: f64) -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
            confidence,
            ai_generated: false,
            rationale: None,
        }
    }
}

/// A single node of a reasoning graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningNode {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeType,
    #[serde(default)]
    pub content: String,
    /// Position in world space.
    pub position: WorldPoint,
    /// Outgoing links, in creation order.
    #[serde(default)]
    pub connections: Vec<NodeId>,
    pub metadata: NodeMetadata,
}

impl ReasoningNode {
    /// Create an empty node of the given type at a world position.
    pub fn new(kind: NodeType, position: WorldPoint) -> Self {
        Self {
            id: new_node_id(),
            kind,
            content: String::new(),
            position,
            connections: Vec::new(),
            metadata: NodeMetadata::now(DEFAULT_CONFIDENCE),
        }
    }

    /// Set the content.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Whether this node links to `target`.
    pub fn connects_to(&self, target: &str) -> bool {
        self.connections.iter().any(|c| c == target)
    }

    /// Record a modification.
    pub fn touch(&mut self) {
        self.metadata.updated_at = Utc::now();
    }
}

/// Models a project may ask the expansion proxy for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiModel {
    #[default]
    #[serde(rename = "openai/gpt-5")]
    Gpt5,
    #[serde(rename = "google/gemini-2.5-pro")]
    Gemini25Pro,
}

impl AiModel {
    pub const ALL: [AiModel; 2] = [AiModel::Gpt5, AiModel::Gemini25Pro];

    pub fn as_str(&self) -> &'static str {
        match self {
            AiModel::Gpt5 => "openai/gpt-5",
            AiModel::Gemini25Pro => "google/gemini-2.5-pro",
        }
    }

    /// Look up an allowed model by its identifier.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == s)
    }
}

impl std::fmt::Display for AiModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-project model settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    #[serde(default)]
    pub model: AiModel,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

pub(crate) fn default_temperature() -> f64 {
    0.7
}

pub(crate) fn default_max_tokens() -> u32 {
    2000
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            model: AiModel::default(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// A named reasoning graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasoningProject {
    pub id: ProjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub settings: ProjectSettings,
    #[serde(default)]
    pub nodes: Vec<ReasoningNode>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReasoningProject {
    /// Create an empty project.
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: format!("project-{}", uuid::Uuid::new_v4()),
            name: name.into(),
            description: description.filter(|d| !d.trim().is_empty()),
            settings: ProjectSettings::default(),
            nodes: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Find a node by id.
    pub fn node(&self, id: &str) -> Option<&ReasoningNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Find a node by id, mutably.
    pub fn node_mut(&mut self, id: &str) -> Option<&mut ReasoningNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Record a modification.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Generate a fresh id for a manually created node.
pub fn new_node_id() -> NodeId {
    format!("node-{}", uuid::Uuid::new_v4())
}

/// Generate a fresh id for a model-generated node.
pub fn new_ai_node_id() -> NodeId {
    format!("ai-node-{}", uuid::Uuid::new_v4())
}
