//! Workflow templates: the provisioning graph, its lint rules, and how editor
//! configs are turned into backend-ready templates.

mod builder;
mod graph;
mod lint;
mod resources;
pub mod rules;
mod types;
pub mod wire;

pub use builder::{TemplateBuilder, DEFAULT_SCHEMA_VERSION};
pub use graph::{provision_order, ProvisionGraph};
pub use lint::{LintRegistry, LintResult, LintSeverity, TemplateLintRule};
pub use resources::{correlate_resources, CorrelatedResource};
pub use types::*;

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;

/// Every diagnostic from the built-in rules, most severe first.
pub fn lint_template(template: &WorkflowTemplate) -> Vec<LintResult> {
    LintRegistry::new().run(template)
}

/// Fails on any error-severity diagnostic; otherwise returns the warnings.
pub fn validate_template(template: &WorkflowTemplate) -> Result<Vec<LintResult>, AppError> {
    into_result(LintRegistry::new().run(template))
}

/// Structural checks on a bare provision flow.
pub fn validate_graph(flow: &TemplateFlow) -> Result<(), AppError> {
    let template = WorkflowTemplate::new("graph").with_provision(flow.clone());
    into_result(LintRegistry::structural().run(&template)).map(|_| ())
}

fn into_result(results: Vec<LintResult>) -> Result<Vec<LintResult>, AppError> {
    let (errors, warnings): (Vec<LintResult>, Vec<LintResult>) =
        results.into_iter().partition(LintResult::is_error);
    let Some(first) = errors.first() else {
        return Ok(warnings);
    };

    let mut err = AppError::new(
        ErrorCategory::GraphStructureError,
        format!("template failed validation with {} error(s): {}", errors.len(), first.message),
    )
    .with_code(first.code.clone());
    for (index, diagnostic) in errors.iter().enumerate() {
        err.add_context(&format!("error.{}", index), &diagnostic.to_string());
    }
    if let Some(suggestion) = &first.suggestion {
        err = err.with_suggestion(suggestion.clone());
    }
    Err(err)
}
