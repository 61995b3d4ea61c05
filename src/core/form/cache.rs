use crate::core::transform::{Transform, TransformType};
use std::collections::BTreeMap;

/// Last-known transforms per outer map index, used to restore a value when the
/// user switches a row back to a transform type they already filled in.
///
/// Advisory only: the form state stays authoritative. Scoped to one editor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapCache {
    entries: BTreeMap<usize, Vec<Transform>>,
}

impl MapCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, outer: usize, row: usize) -> Option<&Transform> {
        self.entries.get(&outer)?.get(row)
    }

    /// Cached transform for a row if it has the requested type and a value.
    pub fn restore(
        &self,
        outer: usize,
        row: usize,
        transform_type: TransformType,
    ) -> Option<Transform> {
        self.get(outer, row)
            .filter(|cached| cached.transform_type == transform_type && !cached.is_blank())
            .cloned()
    }

    pub fn remember(&mut self, outer: usize, row: usize, transform: Transform) {
        let rows = self.entries.entry(outer).or_default();
        if rows.len() <= row {
            rows.resize(row + 1, Transform::default());
        }
        rows[row] = transform;
    }

    pub fn row_removed(&mut self, outer: usize, row: usize) {
        if let Some(rows) = self.entries.get_mut(&outer) {
            if row < rows.len() {
                rows.remove(row);
            }
        }
    }

    /// Indices at or after a removed outer mapping no longer line up.
    pub fn outer_removed(&mut self, outer: usize) {
        self.entries.retain(|index, _| *index < outer);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
