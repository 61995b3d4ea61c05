use super::rules::{
    ConfigurationsJsonRule, DanglingEdgeRule, DuplicateNodeIdsRule, EmptyTemplateNameRule,
    GraphCycleRule, IndexNameRule, PreviousNodeInputEdgeRule, RequiredUserInputsRule,
    UnknownNodeTypeRule,
};
use super::types::WorkflowTemplate;
use serde::Serialize;
use std::fmt;

/// Diagnostic severity levels emitted by template lint rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LintSeverity {
    Error,
    Warning,
    Info,
}

impl LintSeverity {
    fn rank(&self) -> u8 {
        match self {
            LintSeverity::Error => 3,
            LintSeverity::Warning => 2,
            LintSeverity::Info => 1,
        }
    }
}

impl fmt::Display for LintSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintSeverity::Error => write!(f, "Error"),
            LintSeverity::Warning => write!(f, "Warning"),
            LintSeverity::Info => write!(f, "Info"),
        }
    }
}

/// One diagnostic produced by a rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LintResult {
    pub code: String,
    pub severity: LintSeverity,
    pub message: String,
    pub location: Option<String>,
    pub suggestion: Option<String>,
}

impl LintResult {
    pub fn new(
        code: impl Into<String>,
        severity: LintSeverity,
        message: impl Into<String>,
        location: Option<String>,
        suggestion: Option<String>,
    ) -> Self {
        Self {
            code: code.into(),
            severity,
            message: message.into(),
            location,
            suggestion,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == LintSeverity::Error
    }
}

impl fmt::Display for LintResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.severity, self.code, self.message)?;
        if let Some(location) = &self.location {
            write!(f, " (at {})", location)?;
        }
        Ok(())
    }
}

/// Trait implemented by template lint rules.
pub trait TemplateLintRule: Send + Sync {
    fn validate(&self, template: &WorkflowTemplate) -> Vec<LintResult>;
}

/// Runs a set of rules and orders their diagnostics.
pub struct LintRegistry {
    rules: Vec<Box<dyn TemplateLintRule>>,
}

impl LintRegistry {
    /// All built-in rules.
    pub fn new() -> Self {
        let mut registry = Self::structural();
        let content_rules: Vec<Box<dyn TemplateLintRule>> = vec![
            Box::new(RequiredUserInputsRule),
            Box::new(ConfigurationsJsonRule),
            Box::new(UnknownNodeTypeRule),
            Box::new(EmptyTemplateNameRule),
            Box::new(IndexNameRule::default()),
        ];
        registry.rules.extend(content_rules);
        registry
    }

    /// Only the graph-shape rules: unique ids, edge endpoints, cycles and declared inputs.
    pub fn structural() -> Self {
        Self {
            rules: vec![
                Box::new(DuplicateNodeIdsRule),
                Box::new(DanglingEdgeRule),
                Box::new(GraphCycleRule),
                Box::new(PreviousNodeInputEdgeRule),
            ],
        }
    }

    pub fn with_rule<R: TemplateLintRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Run all registered rules against the template.
    /// The results are sorted by `(severity desc, code asc, location asc)`.
    pub fn run(&self, template: &WorkflowTemplate) -> Vec<LintResult> {
        let mut results = Vec::new();
        for rule in &self.rules {
            results.extend(rule.validate(template));
        }
        results.sort_by(|a, b| {
            let severity_cmp = b.severity.rank().cmp(&a.severity.rank());
            severity_cmp
                .then(a.code.cmp(&b.code))
                .then(a.location.cmp(&b.location))
        });
        results
    }
}

impl Default for LintRegistry {
    fn default() -> Self {
        Self::new()
    }
}
