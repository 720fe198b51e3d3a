//! Project export to JSON and Markdown.

use std::fmt::Write;

use crate::error::Result;
use crate::model::{NodeType, ReasoningNode, ReasoningProject};

/// Pretty-printed JSON of the whole project.
pub fn to_json(project: &ReasoningProject) -> Result<String> {
    Ok(serde_json::to_string_pretty(project)?)
}

/// Suggested download file name for an export.
pub fn file_name(project: &ReasoningProject, extension: &str) -> String {
    let stem: String = project
        .name
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '"') { '_' } else { c })
        .collect();
    format!("{}.{}", stem, extension)
}

/// Human-readable Markdown report of the project.
///
/// Nodes are grouped by type, groups ordered by first appearance.
pub fn to_markdown(project: &ReasoningProject) -> String {
    let mut md = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(md, "# {}\n", project.name);

    if let Some(description) = &project.description {
        let _ = writeln!(md, "## Project description\n\n{}\n", description);
    }

    md.push_str("## Project info\n\n");
    let _ = writeln!(
        md,
        "- **Created at**: {}",
        project.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(
        md,
        "- **Updated at**: {}",
        project.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(md, "- **Total nodes**: {}\n", project.nodes.len());

    md.push_str("## AI settings\n\n");
    let _ = writeln!(md, "- **Model**: {}", project.settings.model);
    let _ = writeln!(md, "- **Temperature**: {}", project.settings.temperature);
    let _ = writeln!(md, "- **Max tokens**: {}\n", project.settings.max_tokens);

    if project.nodes.is_empty() {
        return md;
    }

    md.push_str("## Reasoning nodes\n\n");
    for (kind, nodes) in group_by_type(&project.nodes) {
        let title = kind.group_title();
        let _ = writeln!(md, "### {}\n", title);

        for (index, node) in nodes.iter().enumerate() {
            let _ = writeln!(md, "#### {} {}\n", title, index + 1);
            if node.content.trim().is_empty() {
                md.push_str("_No content provided._\n\n");
            } else {
                let _ = writeln!(md, "{}\n", node.content);
            }

            let _ = writeln!(
                md,
                "**Confidence**: {}%\n",
                (node.metadata.confidence * 100.0).round() as i64
            );
            if node.metadata.ai_generated {
                md.push_str("**Source**: AI generated\n\n");
            }
            if let Some(rationale) = &node.metadata.rationale {
                let _ = writeln!(md, "**Rationale**: {}\n", rationale);
            }
            if !node.connections.is_empty() {
                let _ = writeln!(md, "**Connections**: {}\n", node.connections.join(", "));
            }
        }
    }

    md
}

fn group_by_type(nodes: &[ReasoningNode]) -> Vec<(NodeType, Vec<&ReasoningNode>)> {
    let mut groups: Vec<(NodeType, Vec<&ReasoningNode>)> = Vec::new();
    for node in nodes {
        match groups.iter_mut().find(|(kind, _)| *kind == node.kind) {
            Some((_, members)) => members.push(node),
            None => groups.push((node.kind, vec![node])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WorldPoint;

    #[test]
    fn test_markdown_groups_in_first_appearance_order() {
        let mut project = ReasoningProject::new("Outage review", Some("Why did it fail?".into()));
        project.nodes.push(
            ReasoningNode::new(NodeType::Hypothesis, WorldPoint::ORIGIN).with_content("Disk full"),
        );
        project
            .nodes
            .push(ReasoningNode::new(NodeType::Question, WorldPoint::ORIGIN));
        let mut ai = ReasoningNode::new(NodeType::Hypothesis, WorldPoint::ORIGIN)
            .with_content("Memory leak");
        ai.metadata.ai_generated = true;
        ai.metadata.rationale = Some("RSS grew".into());
        project.nodes.push(ai);

        let md = to_markdown(&project);

        assert!(md.starts_with("# Outage review\n"));
        assert!(md.contains("## Project description\n\nWhy did it fail?"));
        assert!(md.contains("- **Total nodes**: 3"));
        assert!(md.contains("- **Model**: openai/gpt-5"));
        let hyp = md.find("### Hypotheses").unwrap();
        let q = md.find("### Questions").unwrap();
        assert!(hyp < q);
        assert!(md.contains("#### Hypotheses 2\n\nMemory leak"));
        assert!(md.contains("_No content provided._"));
        assert!(md.contains("**Confidence**: 80%"));
        assert!(md.contains("**Source**: AI generated"));
        assert!(md.contains("**Rationale**: RSS grew"));
    }

    #[test]
    fn test_empty_project_has_no_node_section() {
        let project = ReasoningProject::new("Blank", None);
        let md = to_markdown(&project);
        assert!(!md.contains("## Reasoning nodes"));
        assert!(!md.contains("## Project description"));
    }

    #[test]
    fn test_file_name_sanitizes() {
        let project = ReasoningProject::new("a/b \"c\"", None);
        assert_eq!(file_name(&project, "md"), "a_b _c_.md");
    }
}
