use crate::core::form::FieldPath;
use crate::core::schema::{ConfigField, ConfigFieldType, ProcessorConfig};
use serde::Serialize;

pub const ADVANCED_SETTINGS: &str = "Advanced settings";

/// What the editor renders for one processor: titled sections of field bindings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessorLayout {
    pub processor_id: String,
    pub title: String,
    pub strategy: &'static str,
    pub sections: Vec<LayoutSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutSection {
    pub title: String,
    pub collapsed: bool,
    pub fields: Vec<FieldBinding>,
}

/// A field placed in a section, addressed by its form path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldBinding {
    pub id: String,
    pub path: FieldPath,
    #[serde(rename = "type")]
    pub field_type: ConfigFieldType,
    pub optional: bool,
}

impl ProcessorLayout {
    pub fn new(processor: &ProcessorConfig, strategy: &'static str) -> Self {
        Self {
            processor_id: processor.id().to_string(),
            title: processor.config.name.clone(),
            strategy,
            sections: Vec::new(),
        }
    }

    pub fn section(&self, title: &str) -> Option<&LayoutSection> {
        self.sections.iter().find(|section| section.title == title)
    }

    pub fn bindings(&self) -> impl Iterator<Item = &FieldBinding> {
        self.sections.iter().flat_map(|section| section.fields.iter())
    }
}

fn binding(processor: &ProcessorConfig, base_path: &FieldPath, field: &ConfigField) -> FieldBinding {
    FieldBinding {
        id: field.id.clone(),
        path: base_path.clone().key(field.id.as_str()),
        field_type: field.field_type,
        optional: processor.config.is_optional(&field.id),
    }
}

/// Collects fields into sections, each field placed at most once.
pub(crate) struct LayoutBuilder<'a> {
    processor: &'a ProcessorConfig,
    base_path: &'a FieldPath,
    placed: Vec<String>,
    layout: ProcessorLayout,
}

impl<'a> LayoutBuilder<'a> {
    pub(crate) fn new(
        processor: &'a ProcessorConfig,
        base_path: &'a FieldPath,
        strategy: &'static str,
    ) -> Self {
        Self {
            processor,
            base_path,
            placed: Vec::new(),
            layout: ProcessorLayout::new(processor, strategy),
        }
    }

    /// A section holding the listed ids that exist and are not yet placed.
    pub(crate) fn section(self, title: &str, ids: &[&str]) -> Self {
        let fields: Vec<FieldBinding> = ids
            .iter()
            .copied()
            .filter(|id| !self.placed.iter().any(|placed| placed == id))
            .filter_map(|id| self.processor.config.field(id))
            .map(|field| binding(self.processor, self.base_path, field))
            .collect();
        self.push(title, false, fields)
    }

    /// Remaining required fields, in declaration order.
    pub(crate) fn required_rest(self, title: &str) -> Self {
        let fields = self.rest(&self.processor.config.fields);
        self.push(title, false, fields)
    }

    /// Remaining optional fields under a collapsed advanced-settings section.
    pub(crate) fn advanced_rest(self) -> Self {
        let fields = self.rest(&self.processor.config.optional_fields);
        self.push(ADVANCED_SETTINGS, true, fields)
    }

    pub(crate) fn build(self) -> ProcessorLayout {
        self.layout
    }

    fn rest(&self, fields: &[ConfigField]) -> Vec<FieldBinding> {
        fields
            .iter()
            .filter(|field| !self.placed.contains(&field.id))
            .map(|field| binding(self.processor, self.base_path, field))
            .collect()
    }

    fn push(mut self, title: &str, collapsed: bool, fields: Vec<FieldBinding>) -> Self {
        if fields.is_empty() {
            return self;
        }
        self.placed.extend(fields.iter().map(|field| field.id.clone()));
        self.layout.sections.push(LayoutSection {
            title: title.to_string(),
            collapsed,
            fields,
        });
        self
    }
}
