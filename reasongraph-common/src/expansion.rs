//! Model-driven node expansion.
//!
//! Builds the prompt for a focus node, calls an OpenRouter-compatible chat
//! completion endpoint, and turns the reply into child nodes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::{
    AiModel, NodeId, NodeMetadata, NodeType, ReasoningNode, ReasoningProject, new_ai_node_id,
};

/// Horizontal distance between a parent and its generated children.
pub const CHILD_OFFSET_X: f64 = 300.0;
/// Vertical spacing between generated siblings.
pub const CHILD_SPACING_Y: f64 = 150.0;
/// Confidence used when the reply does not provide one.
pub const FALLBACK_CONFIDENCE: f64 = 0.7;

const SYSTEM_PROMPT: &str = "You are a research reasoning assistant. Expand structured reasoning trees with well-argued steps and JSON output.";

pub const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Settings for one expansion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpansionSettings {
    pub api_key: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

/// Describe the focus node and its neighbourhood.
pub fn build_context(
    project: &ReasoningProject,
    node: &ReasoningNode,
    user_context: Option<&str>,
) -> String {
    let mut context = format!(
        "Current node type: {}\nCurrent node content: {}\n\n",
        node.kind, node.content
    );

    let related: Vec<&ReasoningNode> = project
        .nodes
        .iter()
        .filter(|n| node.connects_to(&n.id))
        .collect();
    if !related.is_empty() {
        context.push_str("Related nodes:\n");
        for n in related {
            context.push_str(&format!("- {}: {}\n", n.kind, n.content));
        }
        context.push('\n');
    }

    let project_context = project
        .description
        .as_deref()
        .filter(|d| !d.is_empty())
        .unwrap_or(&project.name);
    context.push_str(&format!("Project context: {}\n\n", project_context));

    if let Some(extra) = user_context.filter(|c| !c.trim().is_empty()) {
        context.push_str(&format!("User-provided context: {}\n\n", extra));
    }
    context
}

/// Full user prompt for the focus node.
pub fn build_prompt(context: &str, node: &ReasoningNode) -> String {
    format!(
        r#"{context}
Current focus node ({kind}): {content}
Based on the context above, expand the next reasoning steps for the current {kind} node.
Provide concise, structured thinking that considers alternate branches.
Return valid JSON using the following schema:
{{
  "reasoningSteps": [
    {{
      "type": "reasoning|hypothesis|branch|conclusion",
      "content": "Detailed description of the step",
      "confidence": 0.8,
      "rationale": "Short explanation"
    }}
  ],
  "summary": "Optional short summary",
  "confidence": 0.75
}}"#,
        context = context,
        kind = node.kind,
        content = node.content,
    )
}

/// Turn a model reply into child nodes of `parent`.
///
/// Structured JSON is preferred; otherwise numbered or bulleted lines become
/// reasoning nodes, with non-list lines appended to the previous item.
pub fn parse_response(response: &str, parent: &ReasoningNode) -> Vec<ReasoningNode> {
    if let Some(steps) = parse_json_steps(response, parent) {
        return steps;
    }
    tracing::debug!("Expansion reply is not JSON, falling back to text parsing");
    parse_text_steps(response, parent)
}

fn child_position(parent: &ReasoningNode, index: usize) -> crate::model::WorldPoint {
    parent
        .position
        .offset(CHILD_OFFSET_X, index as f64 * CHILD_SPACING_Y)
}

fn ai_node(
    parent: &ReasoningNode,
    index: usize,
    kind: NodeType,
    content: String,
    confidence: f64,
    rationale: Option<String>,
) -> ReasoningNode {
    let mut metadata = NodeMetadata::now(confidence);
    metadata.ai_generated = true;
    metadata.rationale = rationale;
    ReasoningNode {
        id: new_ai_node_id(),
        kind,
        content,
        position: child_position(parent, index),
        connections: Vec::new(),
        metadata,
    }
}

fn extract_json(content: &str) -> Option<Value> {
    let mut normalized = content.trim();
    if normalized.is_empty() {
        return None;
    }

    if let Some(start) = normalized.find("```") {
        let after = &normalized[start + 3..];
        if let Some(end) = after.find("```") {
            let fenced = &after[..end];
            normalized = fenced
                .strip_prefix("json")
                .or_else(|| fenced.strip_prefix("JSON"))
                .unwrap_or(fenced)
                .trim();
        }
    }

    if let (Some(first), Some(last)) = (normalized.find('{'), normalized.rfind('}'))
        && first < last
    {
        normalized = &normalized[first..=last];
    }

    serde_json::from_str(normalized).ok()
}

fn parse_json_steps(response: &str, parent: &ReasoningNode) -> Option<Vec<ReasoningNode>> {
    let parsed = extract_json(response)?;
    let steps = parsed.get("reasoningSteps")?.as_array()?;
    let top_confidence = parsed.get("confidence").and_then(Value::as_f64);
    let summary = parsed
        .get("summary")
        .and_then(Value::as_str)
        .map(str::to_string);

    let nodes = steps
        .iter()
        .enumerate()
        .map(|(index, step)| match step {
            Value::String(text) => ai_node(
                parent,
                index,
                NodeType::Reasoning,
                text.clone(),
                top_confidence.unwrap_or(FALLBACK_CONFIDENCE),
                summary.clone(),
            ),
            other => {
                let kind = other
                    .get("type")
                    .and_then(Value::as_str)
                    .map(NodeType::parse_lenient)
                    .unwrap_or(NodeType::Reasoning);
                let content = other
                    .get("content")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let confidence = other
                    .get("confidence")
                    .and_then(Value::as_f64)
                    .or(top_confidence)
                    .unwrap_or(FALLBACK_CONFIDENCE);
                let rationale = other
                    .get("rationale")
                    .and_then(Value::as_str)
                    .filter(|r| !r.is_empty())
                    .map(str::to_string)
                    .or_else(|| summary.clone());
                ai_node(parent, index, kind, content, confidence, rationale)
            }
        })
        .collect();
    Some(nodes)
}

fn list_item(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if let Some(rest) = trimmed.strip_prefix(['-', '*']) {
        return Some(rest.trim_start());
    }
    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 && trimmed[digits..].starts_with('.') {
        return Some(trimmed[digits + 1..].trim_start());
    }
    None
}

fn parse_text_steps(response: &str, parent: &ReasoningNode) -> Vec<ReasoningNode> {
    let mut items: Vec<String> = Vec::new();
    for line in response.lines().filter(|l| !l.trim().is_empty()) {
        match list_item(line) {
            Some(item) => items.push(item.to_string()),
            None => {
                if let Some(current) = items.last_mut() {
                    current.push(' ');
                    current.push_str(line.trim());
                }
            }
        }
    }

    items
        .into_iter()
        .enumerate()
        .map(|(index, content)| {
            ai_node(
                parent,
                index,
                NodeType::Reasoning,
                content,
                FALLBACK_CONFIDENCE,
                None,
            )
        })
        .collect()
}

/// Insert generated children and link them from the parent.
pub fn apply_expansion(
    project: &mut ReasoningProject,
    parent_id: &str,
    children: Vec<ReasoningNode>,
) -> Result<Vec<NodeId>> {
    if project.node(parent_id).is_none() {
        return Err(Error::NodeNotFound(parent_id.to_string()));
    }
    let ids: Vec<NodeId> = children.iter().map(|c| c.id.clone()).collect();
    project.nodes.extend(children);
    if let Some(parent) = project.node_mut(parent_id) {
        parent.connections.extend(ids.iter().cloned());
        parent.touch();
    }
    project.touch();
    Ok(ids)
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Extract the assistant text from a chat completion body.
///
/// Content may be a plain string or an array of chunks.
pub fn completion_text(body: &Value) -> String {
    let Some(content) = body.pointer("/choices/0/message/content") else {
        return String::new();
    };
    match content {
        Value::String(s) => s.clone(),
        Value::Array(chunks) => chunks
            .iter()
            .filter_map(|chunk| match chunk {
                Value::String(s) => Some(s.clone()),
                other => other
                    .get("text")
                    .and_then(Value::as_str)
                    .or_else(|| other.get("content").and_then(Value::as_str))
                    .map(str::to_string),
            })
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

/// Client for OpenRouter chat completions.
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    http: reqwest::Client,
    endpoint: String,
}

impl Default for OpenRouterClient {
    fn default() -> Self {
        Self::new(OPENROUTER_URL)
    }
}

impl OpenRouterClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Ask the model to expand `node` and return the generated children.
    ///
    /// Unknown model names fall back to the project's configured model.
    pub async fn expand(
        &self,
        project: &ReasoningProject,
        node: &ReasoningNode,
        user_context: Option<&str>,
        settings: &ExpansionSettings,
    ) -> Result<Vec<ReasoningNode>> {
        if settings.api_key.trim().is_empty() {
            return Err(Error::Expansion("AI API key is required".to_string()));
        }

        let model = settings
            .model
            .as_deref()
            .and_then(AiModel::parse)
            .unwrap_or(project.settings.model);
        let context = build_context(project, node, user_context);
        let prompt = build_prompt(&context, node);
        let request = ChatRequest {
            model: model.as_str(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: settings.temperature.unwrap_or(project.settings.temperature),
            max_tokens: settings.max_tokens.unwrap_or(project.settings.max_tokens),
        };

        tracing::info!(node = %node.id, model = %model, "Requesting expansion");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&settings.api_key)
            .header("HTTP-Referer", "https://reasoning-graph-workspace.com")
            .header("X-Title", "Reasoning Graph Workspace")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await?;
        if !status.is_success() {
            let message = body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("request failed");
            return Err(Error::Expansion(format!(
                "OpenRouter API error ({}): {}",
                status, message
            )));
        }

        let text = completion_text(&body);
        let children = parse_response(&text, node);
        tracing::info!(node = %node.id, children = children.len(), "Expansion parsed");
        Ok(children)
    }
}
