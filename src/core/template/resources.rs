use super::types::{
    RawWorkflowResource, ResourceType, Workflow, WorkflowResource, WorkflowState,
    WorkflowStepType, WorkflowTemplate,
};
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use serde::Serialize;
use tracing::debug;

impl ResourceType {
    /// Display type for resources created by a step. Pipelines are told apart by step.
    pub fn for_step(step: &WorkflowStepType) -> Option<Self> {
        match step {
            WorkflowStepType::CreateIngestPipeline => Some(ResourceType::IngestPipeline),
            WorkflowStepType::CreateSearchPipeline => Some(ResourceType::SearchPipeline),
            WorkflowStepType::CreateIndex => Some(ResourceType::Index),
            WorkflowStepType::Other(_) => None,
        }
    }

    /// Display type for a raw backend resource key such as `pipeline_id`.
    pub fn from_raw_key(key: &str) -> Self {
        match key {
            "pipeline_id" => ResourceType::IngestPipeline,
            "index_name" => ResourceType::Index,
            "model_id" => ResourceType::Model,
            "model_group_id" => ResourceType::ModelGroup,
            "connector_id" => ResourceType::Connector,
            other => ResourceType::Other(other.to_string()),
        }
    }
}

impl WorkflowResource {
    pub fn from_raw(raw: &RawWorkflowResource) -> Self {
        let step_type = WorkflowStepType::from(raw.workflow_step_name.as_str());
        let resource_type = ResourceType::for_step(&step_type)
            .unwrap_or_else(|| ResourceType::from_raw_key(&raw.resource_type));
        Self {
            id: raw.resource_id.clone(),
            step_type,
            resource_type,
        }
    }
}

/// A provisioned resource paired with the template node that created it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelatedResource {
    pub node_id: Option<String>,
    pub resource: WorkflowResource,
}

/// Match each resource to its node: by step id first, else the only node of that step type.
pub fn correlate_resources(
    template: &WorkflowTemplate,
    resources: &[RawWorkflowResource],
) -> Vec<CorrelatedResource> {
    let nodes = template
        .provision()
        .map(|flow| flow.nodes.as_slice())
        .unwrap_or(&[]);

    resources
        .iter()
        .map(|raw| {
            let resource = WorkflowResource::from_raw(raw);
            let node_id = nodes
                .iter()
                .find(|node| node.id == raw.workflow_step_id)
                .or_else(|| {
                    let mut same_type = nodes
                        .iter()
                        .filter(|node| node.node_type == resource.step_type);
                    match (same_type.next(), same_type.next()) {
                        (Some(only), None) => Some(only),
                        _ => None,
                    }
                })
                .map(|node| node.id.clone());
            CorrelatedResource { node_id, resource }
        })
        .collect()
}

impl Workflow {
    /// Apply a provisioning status update, rejecting impossible state transitions.
    pub fn apply_status(
        &mut self,
        state: WorkflowState,
        error: Option<String>,
        resources: &[RawWorkflowResource],
    ) -> Result<(), AppError> {
        let current = self.state.unwrap_or(WorkflowState::NotStarted);
        if current != state && !current.can_transition_to(state) {
            return Err(AppError::new(
                ErrorCategory::BackendError,
                format!("workflow cannot move from '{}' to '{}'", current, state),
            )
            .with_code("WORKFLOW-STATE")
            .with_detail("from", current.to_string())
            .with_detail("to", state.to_string()));
        }
        debug!(from = %current, to = %state, resources = resources.len(), "applied workflow status");
        self.state = Some(state);
        self.error = error;
        self.resources_created = resources.iter().map(WorkflowResource::from_raw).collect();
        Ok(())
    }
}
