//! Saving and restoring a view's column layout.
//!
//! A [`ColumnLayout`] records column order, widths, visibility and sort keys,
//! keyed by model column so it can be applied to a freshly built view showing
//! the same model. When several columns show the same model column, the n-th
//! state for it belongs to the n-th such column in display order. Layouts
//! serialize to JSON:
//!
//! ```json
//! {
//!   "columns": [
//!     { "model_column": 2, "width": { "Pixels": 120 }, "hidden": false },
//!     { "model_column": 0, "width": "AutoSize", "hidden": false }
//!   ],
//!   "sort_keys": [ { "model_column": 2, "occurrence": 0, "order": "Descending" } ],
//!   "multi_column_sort": false
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use horizon_dataview_core::PerfSpan;
use horizon_dataview_core::logging::{span_names, targets};
use serde::{Deserialize, Serialize};

use crate::column::{ColumnWidth, SortOrder};
use crate::error::{Error, Result};
use crate::registry::ColumnId;
use crate::view::DataView;

/// Saved state of one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnState {
    /// Model column the state belongs to.
    pub model_column: usize,
    /// Requested width.
    pub width: ColumnWidth,
    /// Whether the column is hidden.
    #[serde(default)]
    pub hidden: bool,
}

/// One saved sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    /// Model column sorted by.
    pub model_column: usize,
    /// Which of the columns showing `model_column` is meant, counted in
    /// display order from 0.
    #[serde(default)]
    pub occurrence: usize,
    /// Sort direction.
    pub order: SortOrder,
}

/// A saved column layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLayout {
    /// Column states in display order.
    pub columns: Vec<ColumnState>,
    /// Sort keys, primary key first.
    #[serde(default)]
    pub sort_keys: Vec<SortKey>,
    /// Whether several sort keys were allowed.
    #[serde(default)]
    pub multi_column_sort: bool,
}

impl ColumnLayout {
    /// Parses a layout from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serializes the layout as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reads a layout from a JSON file.
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json(&text)
    }

    /// Writes the layout to a JSON file, replacing any existing file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = self.to_json()?;
        std::fs::write(path, text).map_err(|e| Error::io(path, e))?;
        tracing::debug!(target: targets::LAYOUT, path = %path.display(), "wrote column layout");
        Ok(())
    }
}

impl DataView {
    /// Captures the current column layout.
    pub fn save_layout(&self) -> ColumnLayout {
        let registry = self.columns_registry();
        let columns = registry
            .iter()
            .map(|(_, column)| ColumnState {
                model_column: column.model_column(),
                width: column.width(),
                hidden: column.is_hidden(),
            })
            .collect();
        let sort_keys = self
            .marked_sort_keys()
            .iter()
            .filter_map(|&position| registry.get(position).map(|column| (position, column)))
            .map(|(position, column)| SortKey {
                model_column: column.model_column(),
                occurrence: registry
                    .iter()
                    .take(position)
                    .filter(|(_, other)| other.model_column() == column.model_column())
                    .count(),
                order: column.sort_order(),
            })
            .collect();

        ColumnLayout {
            columns,
            sort_keys,
            multi_column_sort: self.is_multi_column_sort_allowed(),
        }
    }

    /// Applies a saved layout.
    ///
    /// Columns listed in the layout are moved to the front in the saved
    /// order; columns it does not mention keep their relative order after
    /// them. The layout is checked completely before anything changes, so on
    /// error the view is left untouched.
    ///
    /// Returns the number of column states applied.
    pub fn restore_layout(&mut self, layout: &ColumnLayout) -> Result<usize> {
        let _span = PerfSpan::new(span_names::LAYOUT_RESTORE);

        let ids = self.resolve_layout_columns(layout)?;
        let sort_ids = self.resolve_layout_sort_keys(layout, &ids)?;

        let mut moved = false;
        for (target, &id) in ids.iter().enumerate() {
            moved |= self.move_column_batched(id, target);
        }
        if moved {
            self.finish_batched_moves();
        }

        for (state, &id) in layout.columns.iter().zip(&ids) {
            if let Some(mut column) = self.column_mut_by_id(id) {
                column.update_width(state.width);
                column.set_hidden(state.hidden);
            }
        }

        let keys: Vec<(usize, SortOrder)> = sort_ids
            .iter()
            .filter_map(|&(id, order)| self.position_of(id).map(|position| (position, order)))
            .collect();
        self.replace_sort_keys(layout.multi_column_sort, &keys);

        tracing::debug!(
            target: targets::LAYOUT,
            columns = ids.len(),
            sort_keys = keys.len(),
            moved,
            "restored column layout"
        );
        Ok(ids.len())
    }

    /// Finds the `occurrence`-th column showing `model_column` among `ids`.
    fn nth_showing(&self, ids: &[ColumnId], model_column: usize, occurrence: usize) -> Result<ColumnId> {
        let showing: Vec<ColumnId> = ids
            .iter()
            .copied()
            .filter(|&id| {
                self.column_by_id(id)
                    .is_some_and(|column| column.model_column() == model_column)
            })
            .collect();
        showing.get(occurrence).copied().ok_or(if showing.is_empty() {
            Error::UnknownModelColumn { model_column }
        } else {
            Error::DuplicateModelColumn { model_column }
        })
    }

    fn resolve_layout_columns(&self, layout: &ColumnLayout) -> Result<Vec<ColumnId>> {
        let current: Vec<ColumnId> = self.columns().map(|(id, _)| id).collect();
        let mut occurrences: HashMap<usize, usize> = HashMap::new();
        layout
            .columns
            .iter()
            .map(|state| {
                let occurrence = occurrences.entry(state.model_column).or_default();
                let id = self.nth_showing(&current, state.model_column, *occurrence)?;
                *occurrence += 1;
                Ok(id)
            })
            .collect()
    }

    /// Resolves sort keys against the order the columns will have once the
    /// layout's columns have been moved to the front.
    fn resolve_layout_sort_keys(
        &self,
        layout: &ColumnLayout,
        listed: &[ColumnId],
    ) -> Result<Vec<(ColumnId, SortOrder)>> {
        if layout.multi_column_sort
            && let Some(model) = self.model()
            && !model.supports_multi_column_sort()
        {
            return Err(Error::MultiColumnSortRejected);
        }

        let mut restored_order = listed.to_vec();
        restored_order.extend(self.columns().map(|(id, _)| id).filter(|id| !listed.contains(id)));

        // Without multi-column sorting only the primary key survives
        let limit = if layout.multi_column_sort { usize::MAX } else { 1 };
        let mut seen = HashSet::new();
        layout
            .sort_keys
            .iter()
            .take(limit)
            .map(|key| {
                let model_column = key.model_column;
                if !seen.insert((model_column, key.occurrence)) {
                    return Err(Error::DuplicateModelColumn { model_column });
                }
                let id = self.nth_showing(&restored_order, model_column, key.occurrence)?;
                if !self.column_by_id(id).is_some_and(|column| column.is_sortable()) {
                    return Err(Error::NotSortable { model_column });
                }
                Ok((id, key.order))
            })
            .collect()
    }
}
