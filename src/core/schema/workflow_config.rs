use super::field::{ConfigField, ConfigFieldType};
use crate::core::error::AppError;
use crate::core::form::FieldPath;
use crate::core::types::ErrorCategory;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::fmt;

/// A named group of required and optional fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub fields: Vec<ConfigField>,
    #[serde(
        default,
        rename = "optionalFields",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub optional_fields: Vec<ConfigField>,
}

impl Config {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            fields: Vec::new(),
            optional_fields: Vec::new(),
        }
    }

    pub fn all_fields(&self) -> impl Iterator<Item = &ConfigField> {
        self.fields.iter().chain(self.optional_fields.iter())
    }

    pub fn field(&self, id: &str) -> Option<&ConfigField> {
        self.all_fields().find(|field| field.id == id)
    }

    pub fn field_mut(&mut self, id: &str) -> Option<&mut ConfigField> {
        self.fields
            .iter_mut()
            .chain(self.optional_fields.iter_mut())
            .find(|field| field.id == id)
    }

    pub fn is_optional(&self, id: &str) -> bool {
        self.optional_fields.iter().any(|field| field.id == id)
    }

    /// Field ids must be unique across required and optional fields.
    pub fn ensure_unique_ids(&self) -> Result<(), AppError> {
        let mut seen = HashSet::new();
        for field in self.all_fields() {
            if !seen.insert(field.id.as_str()) {
                return Err(AppError::new(
                    ErrorCategory::SchemaValidationError,
                    format!("config '{}' declares field '{}' twice", self.id, field.id),
                )
                .with_code("SCHEMA-DUPLICATE-FIELD")
                .with_detail("config", self.id.as_str())
                .with_detail("field", field.id.as_str()));
            }
        }
        Ok(())
    }
}

/// Processor type tags offered by the editor. Unknown tags are carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProcessorType {
    MlProcessor,
    Split,
    Sort,
    TextChunking,
    Normalization,
    Collapse,
    Rerank,
    Copy,
    TextEmbedding,
    TextImageEmbedding,
    Other(String),
}

impl ProcessorType {
    pub fn as_str(&self) -> &str {
        match self {
            ProcessorType::MlProcessor => "ml_processor",
            ProcessorType::Split => "split",
            ProcessorType::Sort => "sort",
            ProcessorType::TextChunking => "text_chunking",
            ProcessorType::Normalization => "normalization-processor",
            ProcessorType::Collapse => "collapse",
            ProcessorType::Rerank => "rerank",
            ProcessorType::Copy => "copy",
            ProcessorType::TextEmbedding => "text_embedding",
            ProcessorType::TextImageEmbedding => "text_image_embedding",
            ProcessorType::Other(tag) => tag,
        }
    }
}

impl From<String> for ProcessorType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "ml_processor" => ProcessorType::MlProcessor,
            "split" => ProcessorType::Split,
            "sort" => ProcessorType::Sort,
            "text_chunking" => ProcessorType::TextChunking,
            "normalization-processor" => ProcessorType::Normalization,
            "collapse" => ProcessorType::Collapse,
            "rerank" => ProcessorType::Rerank,
            "copy" => ProcessorType::Copy,
            "text_embedding" => ProcessorType::TextEmbedding,
            "text_image_embedding" => ProcessorType::TextImageEmbedding,
            _ => ProcessorType::Other(tag),
        }
    }
}

impl From<&str> for ProcessorType {
    fn from(tag: &str) -> Self {
        ProcessorType::from(tag.to_string())
    }
}

impl From<ProcessorType> for String {
    fn from(processor_type: ProcessorType) -> Self {
        processor_type.as_str().to_string()
    }
}

impl fmt::Display for ProcessorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A processor stage: a config plus its type tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorConfig {
    #[serde(rename = "type")]
    pub processor_type: ProcessorType,
    #[serde(flatten)]
    pub config: Config,
}

impl ProcessorConfig {
    pub fn id(&self) -> &str {
        &self.config.id
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProcessorsConfig {
    #[serde(default)]
    pub processors: Vec<ProcessorConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    pub name: ConfigField,
    pub mappings: ConfigField,
    pub settings: ConfigField,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchIndexConfig {
    pub name: ConfigField,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestConfig {
    pub enabled: ConfigField,
    pub pipeline_name: ConfigField,
    #[serde(default)]
    pub enrich: ProcessorsConfig,
    pub index: IndexConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConfig {
    pub request: ConfigField,
    pub index: SearchIndexConfig,
    pub pipeline_name: ConfigField,
    #[serde(default)]
    pub enrich_request: ProcessorsConfig,
    #[serde(default)]
    pub enrich_response: ProcessorsConfig,
}

/// The full ingest + search configuration edited by the form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkflowConfig {
    pub ingest: IngestConfig,
    pub search: SearchConfig,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            enabled: ConfigField::new("enabled", ConfigFieldType::Boolean).with_value(json!(true)),
            pipeline_name: ConfigField::new("pipelineName", ConfigFieldType::String),
            enrich: ProcessorsConfig::default(),
            index: IndexConfig {
                name: ConfigField::new("indexName", ConfigFieldType::String),
                mappings: ConfigField::new("indexMappings", ConfigFieldType::Json)
                    .with_value(json!({ "properties": {} })),
                settings: ConfigField::new("indexSettings", ConfigFieldType::Json)
                    .with_value(json!({})),
            },
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            request: ConfigField::new("request", ConfigFieldType::Json)
                .with_value(json!({ "query": { "match_all": {} } })),
            index: SearchIndexConfig {
                name: ConfigField::new("indexName", ConfigFieldType::String),
            },
            pipeline_name: ConfigField::new("pipelineName", ConfigFieldType::String),
            enrich_request: ProcessorsConfig::default(),
            enrich_response: ProcessorsConfig::default(),
        }
    }
}

/// Where a processor list lives inside a workflow config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessorContext {
    Ingest,
    SearchRequest,
    SearchResponse,
}

impl ProcessorContext {
    pub const ALL: [ProcessorContext; 3] = [
        ProcessorContext::Ingest,
        ProcessorContext::SearchRequest,
        ProcessorContext::SearchResponse,
    ];

    /// Form path of the processor list, e.g. `ingest.enrich.processors`.
    pub fn base_path(&self) -> FieldPath {
        match self {
            ProcessorContext::Ingest => FieldPath::from_keys(["ingest", "enrich", "processors"]),
            ProcessorContext::SearchRequest => {
                FieldPath::from_keys(["search", "enrichRequest", "processors"])
            }
            ProcessorContext::SearchResponse => {
                FieldPath::from_keys(["search", "enrichResponse", "processors"])
            }
        }
    }
}

impl fmt::Display for ProcessorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessorContext::Ingest => write!(f, "ingest"),
            ProcessorContext::SearchRequest => write!(f, "search request"),
            ProcessorContext::SearchResponse => write!(f, "search response"),
        }
    }
}

/// A ConfigField together with its form path.
#[derive(Debug)]
pub struct FieldSlot<'a> {
    pub path: FieldPath,
    pub field: &'a ConfigField,
    pub optional: bool,
}

#[derive(Debug)]
pub struct FieldSlotMut<'a> {
    pub path: FieldPath,
    pub field: &'a mut ConfigField,
    pub optional: bool,
}

impl WorkflowConfig {
    pub fn processors(&self, context: ProcessorContext) -> &[ProcessorConfig] {
        match context {
            ProcessorContext::Ingest => &self.ingest.enrich.processors,
            ProcessorContext::SearchRequest => &self.search.enrich_request.processors,
            ProcessorContext::SearchResponse => &self.search.enrich_response.processors,
        }
    }

    pub fn processors_mut(&mut self, context: ProcessorContext) -> &mut Vec<ProcessorConfig> {
        match context {
            ProcessorContext::Ingest => &mut self.ingest.enrich.processors,
            ProcessorContext::SearchRequest => &mut self.search.enrich_request.processors,
            ProcessorContext::SearchResponse => &mut self.search.enrich_response.processors,
        }
    }

    /// Every ConfigField in a stable order, addressed by its form path.
    pub fn field_slots(&self) -> Vec<FieldSlot<'_>> {
        let ingest = &self.ingest;
        let search = &self.search;
        let mut slots = vec![
            slot(&["ingest", "enabled"], &ingest.enabled),
            slot(&["ingest", "pipelineName"], &ingest.pipeline_name),
            slot(&["ingest", "index", "name"], &ingest.index.name),
            slot(&["ingest", "index", "mappings"], &ingest.index.mappings),
            slot(&["ingest", "index", "settings"], &ingest.index.settings),
            slot(&["search", "request"], &search.request),
            slot(&["search", "index", "name"], &search.index.name),
            slot(&["search", "pipelineName"], &search.pipeline_name),
        ];
        for context in ProcessorContext::ALL {
            let base = context.base_path();
            for processor in self.processors(context) {
                let processor_path = base.clone().key(processor.id());
                for field in &processor.config.fields {
                    slots.push(FieldSlot {
                        path: processor_path.clone().key(&field.id),
                        field,
                        optional: false,
                    });
                }
                for field in &processor.config.optional_fields {
                    slots.push(FieldSlot {
                        path: processor_path.clone().key(&field.id),
                        field,
                        optional: true,
                    });
                }
            }
        }
        slots
    }

    /// Mutable counterpart of [`WorkflowConfig::field_slots`], in the same order.
    pub fn field_slots_mut(&mut self) -> Vec<FieldSlotMut<'_>> {
        let WorkflowConfig { ingest, search } = self;
        let mut slots = vec![
            slot_mut(&["ingest", "enabled"], &mut ingest.enabled),
            slot_mut(&["ingest", "pipelineName"], &mut ingest.pipeline_name),
            slot_mut(&["ingest", "index", "name"], &mut ingest.index.name),
            slot_mut(&["ingest", "index", "mappings"], &mut ingest.index.mappings),
            slot_mut(&["ingest", "index", "settings"], &mut ingest.index.settings),
            slot_mut(&["search", "request"], &mut search.request),
            slot_mut(&["search", "index", "name"], &mut search.index.name),
            slot_mut(&["search", "pipelineName"], &mut search.pipeline_name),
        ];
        let lists = [
            (ProcessorContext::Ingest, &mut ingest.enrich.processors),
            (ProcessorContext::SearchRequest, &mut search.enrich_request.processors),
            (ProcessorContext::SearchResponse, &mut search.enrich_response.processors),
        ];
        for (context, processors) in lists {
            let base = context.base_path();
            for processor in processors {
                let processor_path = base.clone().key(processor.config.id.clone());
                for field in &mut processor.config.fields {
                    slots.push(FieldSlotMut {
                        path: processor_path.clone().key(field.id.clone()),
                        field,
                        optional: false,
                    });
                }
                for field in &mut processor.config.optional_fields {
                    slots.push(FieldSlotMut {
                        path: processor_path.clone().key(field.id.clone()),
                        field,
                        optional: true,
                    });
                }
            }
        }
        slots
    }

    /// Processor ids are unique per list and field ids unique per processor.
    pub fn ensure_unique_ids(&self) -> Result<(), AppError> {
        for context in ProcessorContext::ALL {
            let mut seen = HashSet::new();
            for processor in self.processors(context) {
                if !seen.insert(processor.id()) {
                    return Err(AppError::new(
                        ErrorCategory::SchemaValidationError,
                        format!(
                            "{} processors declare id '{}' twice",
                            context,
                            processor.id()
                        ),
                    )
                    .with_code("SCHEMA-DUPLICATE-PROCESSOR")
                    .with_detail("processor", processor.id()));
                }
                processor.config.ensure_unique_ids()?;
            }
        }
        Ok(())
    }

    /// Parse a workflow config from JSON, checking id uniqueness.
    pub fn from_json(value: Value) -> Result<Self, AppError> {
        let config: WorkflowConfig = serde_json::from_value(value).map_err(|err| {
            AppError::new(
                ErrorCategory::SchemaValidationError,
                format!("invalid workflow config: {}", err),
            )
            .with_code("SCHEMA-PARSE")
        })?;
        config.ensure_unique_ids()?;
        Ok(config)
    }
}

fn slot<'a>(keys: &[&str], field: &'a ConfigField) -> FieldSlot<'a> {
    FieldSlot {
        path: FieldPath::from_keys(keys.iter().copied()),
        field,
        optional: false,
    }
}

fn slot_mut<'a>(keys: &[&str], field: &'a mut ConfigField) -> FieldSlotMut<'a> {
    FieldSlotMut {
        path: FieldPath::from_keys(keys.iter().copied()),
        field,
        optional: false,
    }
}
