use super::cache::MapCache;
use super::path::FieldPath;
use super::state::FormState;
use crate::core::transform::{
    InputMapArrayFormValue, InputMapEntry, Transform, TransformEngine, TransformError,
    TransformType,
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("no mapping at index {0}")]
    NoMapping(usize),
    #[error("no row {row} in mapping {outer}")]
    NoRow { outer: usize, row: usize },
    #[error("row {row} of mapping {outer}: {source}")]
    Transform {
        outer: usize,
        row: usize,
        #[source]
        source: TransformError,
    },
}

/// Row-level editor for one input/output map-array leaf of the form.
#[derive(Debug, Clone)]
pub struct MapEditor {
    path: FieldPath,
    value: InputMapArrayFormValue,
    cache: MapCache,
    engine: TransformEngine,
}

impl MapEditor {
    /// Start editing the map array stored at `path`. A malformed leaf opens empty.
    pub fn open(state: &FormState, path: FieldPath, engine: TransformEngine) -> Self {
        let value = read_value(state, &path);
        Self {
            path,
            value,
            cache: MapCache::new(),
            engine,
        }
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub fn value(&self) -> &InputMapArrayFormValue {
        &self.value
    }

    pub fn cache(&self) -> &MapCache {
        &self.cache
    }

    pub fn add_mapping(&mut self) -> usize {
        self.value.push(Vec::new());
        self.value.len() - 1
    }

    pub fn remove_mapping(&mut self, outer: usize) -> Result<(), EditError> {
        if outer >= self.value.len() {
            return Err(EditError::NoMapping(outer));
        }
        self.value.remove(outer);
        self.cache.outer_removed(outer);
        Ok(())
    }

    pub fn add_row(&mut self, outer: usize, transform_type: TransformType) -> Result<usize, EditError> {
        let rows = self.value.get_mut(outer).ok_or(EditError::NoMapping(outer))?;
        rows.push(InputMapEntry::new("", Transform::empty(transform_type)));
        Ok(rows.len() - 1)
    }

    pub fn remove_row(&mut self, outer: usize, row: usize) -> Result<(), EditError> {
        let rows = self.value.get_mut(outer).ok_or(EditError::NoMapping(outer))?;
        if row >= rows.len() {
            return Err(EditError::NoRow { outer, row });
        }
        rows.remove(row);
        self.cache.row_removed(outer, row);
        Ok(())
    }

    pub fn set_key(&mut self, outer: usize, row: usize, key: impl Into<String>) -> Result<(), EditError> {
        self.entry_mut(outer, row)?.key = key.into();
        Ok(())
    }

    /// Set the raw value of a row, keeping its type and nested variables.
    pub fn set_value(&mut self, outer: usize, row: usize, value: impl Into<String>) -> Result<(), EditError> {
        let value = value.into();
        let entry = self.entry_mut(outer, row)?;
        entry.value.value = if value.is_empty() { None } else { Some(value) };
        Ok(())
    }

    /// Change a row's transform type, restoring what the user last entered for that type.
    pub fn switch_transform_type(
        &mut self,
        outer: usize,
        row: usize,
        transform_type: TransformType,
    ) -> Result<(), EditError> {
        let current = self.entry_mut(outer, row)?.value.clone();
        if current.transform_type == transform_type {
            return Ok(());
        }
        let next = self
            .cache
            .restore(outer, row, transform_type)
            .unwrap_or_else(|| Transform {
                optional: current.optional,
                ..Transform::empty(transform_type)
            });
        if !current.is_blank() {
            self.cache.remember(outer, row, current.clone());
        }
        debug!(
            path = %self.path,
            outer,
            row,
            from = %current.transform_type,
            to = %transform_type,
            "switched transform type"
        );
        self.entry_mut(outer, row)?.value = next;
        Ok(())
    }

    /// Replace a row's transform, e.g. on modal save. Unresolvable transforms are refused.
    pub fn set_transform(&mut self, outer: usize, row: usize, transform: Transform) -> Result<(), EditError> {
        self.engine
            .resolve(&transform)
            .map_err(|source| EditError::Transform { outer, row, source })?;
        self.entry_mut(outer, row)?.value = transform;
        Ok(())
    }

    /// Write the edited value back into the form, refusing if any row fails to resolve.
    pub fn commit(&self, state: &mut FormState) -> Result<(), EditError> {
        for (outer, rows) in self.value.iter().enumerate() {
            for (row, entry) in rows.iter().enumerate() {
                self.engine
                    .resolve(&entry.value)
                    .map_err(|source| EditError::Transform { outer, row, source })?;
            }
        }
        let value = serde_json::to_value(&self.value).unwrap_or_default();
        state.set(&self.path, value);
        Ok(())
    }

    /// Discard edits, reload from the form state and drop the cache.
    pub fn reset(&mut self, state: &FormState) {
        self.value = read_value(state, &self.path);
        self.cache.clear();
    }

    fn entry_mut(&mut self, outer: usize, row: usize) -> Result<&mut InputMapEntry, EditError> {
        self.value
            .get_mut(outer)
            .ok_or(EditError::NoMapping(outer))?
            .get_mut(row)
            .ok_or(EditError::NoRow { outer, row })
    }
}

fn read_value(state: &FormState, path: &FieldPath) -> InputMapArrayFormValue {
    state
        .get(path)
        .and_then(|value| serde_json::from_value(value.clone()).ok())
        .unwrap_or_default()
}
