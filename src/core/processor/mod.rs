//! Dispatch of processor configs to per-type layout and validation strategies.

mod layout;
mod strategies;

pub use layout::{FieldBinding, LayoutSection, ProcessorLayout, ADVANCED_SETTINGS};
pub use strategies::{
    validate_fields, GenericStrategy, MlInferenceStrategy, NormalizationStrategy,
    TextChunkingStrategy,
};

use crate::core::form::{validate_field, FieldError, FieldPath, FormState};
use crate::core::schema::{ProcessorConfig, ProcessorContext, ProcessorType, WorkflowConfig};
use crate::core::transform::TransformEngine;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Per-type handling of a processor: how it is laid out and validated.
pub trait ProcessorStrategy: Send + Sync + 'static {
    /// Strategy name reported in layouts and logs.
    fn name(&self) -> &'static str;

    /// Sections and field bindings rendered for the processor at `base_path`.
    fn layout(&self, processor: &ProcessorConfig, base_path: &FieldPath) -> ProcessorLayout;

    /// Field errors for the processor's current form values.
    fn validate(
        &self,
        processor: &ProcessorConfig,
        state: &FormState,
        base_path: &FieldPath,
        engine: &TransformEngine,
    ) -> Vec<FieldError>;
}

/// Builder used to register strategies before routing.
pub struct ProcessorRouterBuilder {
    strategies: HashMap<ProcessorType, Arc<dyn ProcessorStrategy>>,
}

impl Default for ProcessorRouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessorRouterBuilder {
    pub fn new() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    pub fn register<T: ProcessorStrategy>(
        &mut self,
        processor_type: ProcessorType,
        strategy: T,
    ) -> &mut Self {
        if self.strategies.contains_key(&processor_type) {
            panic!("duplicate strategy registered for processor type: {}", processor_type);
        }
        self.strategies.insert(processor_type, Arc::new(strategy));
        self
    }

    pub fn build(self) -> ProcessorRouter {
        ProcessorRouter {
            strategies: self.strategies,
            fallback: Arc::new(GenericStrategy),
        }
    }
}

/// Registry keyed by processor type. Unregistered types use the generic strategy.
#[derive(Clone)]
pub struct ProcessorRouter {
    strategies: HashMap<ProcessorType, Arc<dyn ProcessorStrategy>>,
    fallback: Arc<dyn ProcessorStrategy>,
}

impl Default for ProcessorRouter {
    fn default() -> Self {
        Self::standard()
    }
}

impl ProcessorRouter {
    pub fn builder() -> ProcessorRouterBuilder {
        ProcessorRouterBuilder::new()
    }

    /// Router with the built-in ML inference, text chunking and normalization strategies.
    pub fn standard() -> Self {
        let mut builder = Self::builder();
        builder
            .register(ProcessorType::MlProcessor, MlInferenceStrategy)
            .register(ProcessorType::TextChunking, TextChunkingStrategy)
            .register(ProcessorType::Normalization, NormalizationStrategy);
        builder.build()
    }

    pub fn route(&self, processor_type: &ProcessorType) -> &dyn ProcessorStrategy {
        self.strategies
            .get(processor_type)
            .unwrap_or(&self.fallback)
            .as_ref()
    }

    pub fn layout(&self, processor: &ProcessorConfig, context: ProcessorContext) -> ProcessorLayout {
        let base_path = context.base_path().key(processor.id());
        self.route(&processor.processor_type).layout(processor, &base_path)
    }

    pub fn validate_processor(
        &self,
        processor: &ProcessorConfig,
        context: ProcessorContext,
        state: &FormState,
        engine: &TransformEngine,
    ) -> Vec<FieldError> {
        let base_path = context.base_path().key(processor.id());
        let strategy = self.route(&processor.processor_type);
        let errors = strategy.validate(processor, state, &base_path, engine);
        debug!(
            processor = processor.id(),
            strategy = strategy.name(),
            errors = errors.len(),
            "validated processor"
        );
        errors
    }

    /// Validate the whole form: pipeline-level fields, then each processor by its strategy.
    pub fn validate_workflow(
        &self,
        config: &WorkflowConfig,
        state: &FormState,
        engine: &TransformEngine,
    ) -> Vec<FieldError> {
        let processor_bases: Vec<FieldPath> = ProcessorContext::ALL
            .iter()
            .map(ProcessorContext::base_path)
            .collect();

        let mut errors = Vec::new();
        for slot in config.field_slots() {
            if processor_bases.iter().any(|base| slot.path.starts_with(base)) {
                continue;
            }
            let value = state
                .get(&slot.path)
                .cloned()
                .unwrap_or_else(|| slot.field.field_type.initial_value());
            errors.extend(validate_field(&slot.path, slot.field, slot.optional, &value, engine));
        }
        for context in ProcessorContext::ALL {
            for processor in config.processors(context) {
                errors.extend(self.validate_processor(processor, context, state, engine));
            }
        }
        errors
    }
}
