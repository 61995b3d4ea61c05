use super::types::TemplateFlow;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Dependency graph of a provision flow. Edges pointing at unknown nodes are skipped.
pub struct ProvisionGraph<'a> {
    graph: DiGraph<&'a str, ()>,
    indices: HashMap<&'a str, NodeIndex>,
}

impl<'a> ProvisionGraph<'a> {
    pub fn new(flow: &'a TemplateFlow) -> Self {
        let mut graph = DiGraph::new();
        let mut indices = HashMap::new();
        for node in &flow.nodes {
            indices
                .entry(node.id.as_str())
                .or_insert_with(|| graph.add_node(node.id.as_str()));
        }
        for edge in &flow.edges {
            if let (Some(source), Some(dest)) = (
                indices.get(edge.source.as_str()),
                indices.get(edge.dest.as_str()),
            ) {
                graph.add_edge(*source, *dest, ());
            }
        }
        Self { graph, indices }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.indices.contains_key(id)
    }

    /// Node ids that take part in a cycle, one list per strongly connected component.
    pub fn cycles(&self) -> Vec<Vec<&'a str>> {
        let mut cycles = Vec::new();
        for component in tarjan_scc(&self.graph) {
            let is_cycle = component.len() > 1
                || component
                    .first()
                    .map(|index| self.graph.contains_edge(*index, *index))
                    .unwrap_or(false);
            if is_cycle {
                let mut ids: Vec<&str> = component.iter().map(|index| self.graph[*index]).collect();
                ids.sort_unstable();
                cycles.push(ids);
            }
        }
        cycles
    }

    /// Topological order of node ids, or the id of a node on a cycle.
    pub fn order(&self) -> Result<Vec<&'a str>, &'a str> {
        toposort(&self.graph, None)
            .map(|order| order.into_iter().map(|index| self.graph[index]).collect())
            .map_err(|cycle| self.graph[cycle.node_id()])
    }
}

/// Node ids in an order where every edge's source precedes its dest.
pub fn provision_order(flow: &TemplateFlow) -> Result<Vec<String>, AppError> {
    ProvisionGraph::new(flow)
        .order()
        .map(|order| order.into_iter().map(str::to_string).collect())
        .map_err(|node| {
            AppError::new(
                ErrorCategory::GraphStructureError,
                format!("provision graph has a cycle through '{}'", node),
            )
            .with_code("TPL-GRAPH-003")
            .with_detail("node", node)
        })
}
