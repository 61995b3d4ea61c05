use super::graph::ProvisionGraph;
use super::lint::{LintResult, LintSeverity, TemplateLintRule};
use super::types::{TemplateFlow, WorkflowStepType, WorkflowTemplate};
use regex::Regex;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Lowercase, no leading `_`, `-` or `+`, none of the characters the backend forbids.
pub const DEFAULT_INDEX_NAME_PATTERN: &str = r#"^[^_\-+A-Z\s][^A-Z\s,:"*+/\\|?#<>]*$"#;

fn provision(template: &WorkflowTemplate) -> Option<&TemplateFlow> {
    template.provision()
}

pub struct DuplicateNodeIdsRule;

impl TemplateLintRule for DuplicateNodeIdsRule {
    fn validate(&self, template: &WorkflowTemplate) -> Vec<LintResult> {
        let Some(flow) = provision(template) else {
            return Vec::new();
        };
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for node in &flow.nodes {
            *counts.entry(node.id.as_str()).or_insert(0) += 1;
        }

        let mut out = Vec::new();
        for (node_id, count) in counts {
            if count > 1 {
                out.push(LintResult::new(
                    "TPL-GRAPH-001",
                    LintSeverity::Error,
                    format!("duplicate node id '{}' found {} times", node_id, count),
                    Some(node_id.to_string()),
                    Some("rename nodes so every node id is unique".to_string()),
                ));
            }
        }
        out
    }
}

pub struct DanglingEdgeRule;

impl TemplateLintRule for DanglingEdgeRule {
    fn validate(&self, template: &WorkflowTemplate) -> Vec<LintResult> {
        let Some(flow) = provision(template) else {
            return Vec::new();
        };
        let known: HashSet<&str> = flow.nodes.iter().map(|node| node.id.as_str()).collect();
        let mut out = Vec::new();
        for edge in &flow.edges {
            for (end, id) in [("source", &edge.source), ("dest", &edge.dest)] {
                if !known.contains(id.as_str()) {
                    out.push(LintResult::new(
                        "TPL-GRAPH-002",
                        LintSeverity::Error,
                        format!(
                            "edge {} -> {} references unknown {} node '{}'",
                            edge.source, edge.dest, end, id
                        ),
                        Some(format!("{}->{}", edge.source, edge.dest)),
                        Some("point edges at existing node ids".to_string()),
                    ));
                }
            }
        }
        out
    }
}

pub struct GraphCycleRule;

impl TemplateLintRule for GraphCycleRule {
    fn validate(&self, template: &WorkflowTemplate) -> Vec<LintResult> {
        let Some(flow) = provision(template) else {
            return Vec::new();
        };
        ProvisionGraph::new(flow)
            .cycles()
            .into_iter()
            .map(|ids| {
                let joined = ids.join(", ");
                LintResult::new(
                    "TPL-GRAPH-003",
                    LintSeverity::Error,
                    format!("nodes [{}] form a cycle", joined),
                    ids.first().map(|id| id.to_string()),
                    Some("remove an edge so provisioning has a valid order".to_string()),
                )
            })
            .collect()
    }
}

pub struct PreviousNodeInputEdgeRule;

impl TemplateLintRule for PreviousNodeInputEdgeRule {
    fn validate(&self, template: &WorkflowTemplate) -> Vec<LintResult> {
        let Some(flow) = provision(template) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for node in &flow.nodes {
            for (source, output) in &node.previous_node_inputs {
                if !flow.has_edge(source, &node.id) {
                    out.push(LintResult::new(
                        "TPL-GRAPH-004",
                        LintSeverity::Error,
                        format!(
                            "node '{}' consumes '{}' from '{}' without an edge {} -> {}",
                            node.id, output, source, source, node.id
                        ),
                        Some(node.id.clone()),
                        Some(format!("add an edge from '{}' to '{}'", source, node.id)),
                    ));
                }
            }
        }
        out
    }
}

pub struct RequiredUserInputsRule;

impl TemplateLintRule for RequiredUserInputsRule {
    fn validate(&self, template: &WorkflowTemplate) -> Vec<LintResult> {
        let Some(flow) = provision(template) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for node in &flow.nodes {
            for required in node.node_type.required_user_inputs() {
                let present = match node.user_inputs.get(*required) {
                    Some(Value::Null) | None => false,
                    Some(Value::String(text)) => !text.trim().is_empty(),
                    Some(_) => true,
                };
                if !present {
                    out.push(LintResult::new(
                        "TPL-GRAPH-005",
                        LintSeverity::Error,
                        format!(
                            "{} node '{}' is missing required input '{}'",
                            node.node_type, node.id, required
                        ),
                        Some(format!("{}.user_inputs.{}", node.id, required)),
                        None,
                    ));
                }
            }
        }
        out
    }
}

pub struct ConfigurationsJsonRule;

impl TemplateLintRule for ConfigurationsJsonRule {
    fn validate(&self, template: &WorkflowTemplate) -> Vec<LintResult> {
        let Some(flow) = provision(template) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for node in &flow.nodes {
            let Some(configurations) = node.user_inputs.get("configurations") else {
                continue;
            };
            let problem = match configurations {
                Value::Null => continue,
                Value::String(text) if text.trim().is_empty() => continue,
                Value::String(text) => match serde_json::from_str::<Value>(text) {
                    Ok(Value::Object(_)) => continue,
                    Ok(_) => "parses to something other than an object".to_string(),
                    Err(err) => format!("is not valid JSON: {}", err),
                },
                _ => "must be a JSON-encoded string".to_string(),
            };
            out.push(LintResult::new(
                "TPL-GRAPH-006",
                LintSeverity::Error,
                format!("configurations of node '{}' {}", node.id, problem),
                Some(format!("{}.user_inputs.configurations", node.id)),
                None,
            ));
        }
        out
    }
}

pub struct UnknownNodeTypeRule;

impl TemplateLintRule for UnknownNodeTypeRule {
    fn validate(&self, template: &WorkflowTemplate) -> Vec<LintResult> {
        let Some(flow) = provision(template) else {
            return Vec::new();
        };
        flow.nodes
            .iter()
            .filter(|node| !node.node_type.is_known())
            .map(|node| {
                LintResult::new(
                    "TPL-GRAPH-007",
                    LintSeverity::Warning,
                    format!(
                        "node '{}' has step type '{}' which the editor does not manage",
                        node.id, node.node_type
                    ),
                    Some(node.id.clone()),
                    None,
                )
            })
            .collect()
    }
}

pub struct EmptyTemplateNameRule;

impl TemplateLintRule for EmptyTemplateNameRule {
    fn validate(&self, template: &WorkflowTemplate) -> Vec<LintResult> {
        if !template.name.trim().is_empty() {
            return Vec::new();
        }
        vec![LintResult::new(
            "TPL-GRAPH-008",
            LintSeverity::Error,
            "template name must not be empty",
            None,
            Some("give the workflow a name".to_string()),
        )]
    }
}

/// `index_name` inputs of create-index nodes must be valid index names.
pub struct IndexNameRule {
    pattern: Regex,
}

impl IndexNameRule {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }
}

impl Default for IndexNameRule {
    fn default() -> Self {
        Self {
            pattern: Regex::new(DEFAULT_INDEX_NAME_PATTERN).expect("built-in index name pattern"),
        }
    }
}

impl TemplateLintRule for IndexNameRule {
    fn validate(&self, template: &WorkflowTemplate) -> Vec<LintResult> {
        let Some(flow) = provision(template) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for node in &flow.nodes {
            if node.node_type != WorkflowStepType::CreateIndex {
                continue;
            }
            let Some(Value::String(name)) = node.user_inputs.get("index_name") else {
                continue;
            };
            if name.is_empty() || self.pattern.is_match(name) {
                continue;
            }
            out.push(LintResult::new(
                "TPL-GRAPH-009",
                LintSeverity::Error,
                format!("'{}' is not a valid index name", name),
                Some(format!("{}.user_inputs.index_name", node.id)),
                Some("use lowercase letters, digits, '-', '_' or '.'".to_string()),
            ));
        }
        out
    }
}
