//! The data view control.
//!
//! [`DataView`] owns a view's columns and keeps three things in step with
//! them: the best-width cache, the set of sort keys, and the header/content
//! windows that display them. Every public mutation sends exactly one
//! [`ColumnEvent`] to each window, however many columns it touched.
//!
//! Best widths are recomputed lazily. Invalidations only mark cache entries
//! dirty; the host event loop calls [`DataView::on_internal_idle`] when it has
//! nothing else to do, and all pending recomputation happens there at once.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use horizon_dataview::{Column, ColumnFlags, DataView, DataViewConfig, TextRenderer};
//!
//! let mut view = DataView::new(Box::new(content_window))
//!     .with_header(Box::new(header_window))
//!     .with_config(DataViewConfig::default().with_multi_column_sort(true));
//!
//! let sortable = ColumnFlags::new().with_sortable(true);
//! let name = view
//!     .append_column(Column::new("Name", Arc::new(TextRenderer::new()), 0).with_flags(sortable))
//!     .unwrap();
//!
//! view.column_sorted.connect(|column| println!("sorted by column {}", column));
//! view.toggle_sort_by_column(0);
//!
//! // From the host's idle handler:
//! view.on_internal_idle();
//! ```

use std::sync::Arc;

use horizon_dataview_core::logging::{span_names, targets};
use horizon_dataview_core::{PerfSpan, Signal};

use crate::column::{Alignment, Bitmap, Column, ColumnFlags, ColumnLabel, ColumnWidth, SortOrder};
use crate::config::DataViewConfig;
use crate::registry::{ColumnId, ColumnRegistry};
use crate::sort_state::{SortState, moved_position};
use crate::traits::{ColumnEvent, ContentWindow, DataViewModel, Font, HeaderWindow, ViewChange};
use crate::width_cache::WidthCache;

/// A hierarchical/tabular data view's column and sort management.
///
/// # Signals
///
/// - `column_sorted(usize)`: Emitted when a column's sort state changed
///   through a sort call (position of the column)
/// - `column_reordered((usize, usize))`: Emitted after a column was dragged
///   to a new position (old position, new position)
/// - `columns_changed(usize)`: Emitted after columns were added, removed or
///   cleared (new column count)
pub struct DataView {
    config: DataViewConfig,

    columns: ColumnRegistry,

    /// Best widths, one entry per column.
    widths: WidthCache,

    sorting: SortState,

    header: Option<Box<dyn HeaderWindow>>,
    content: Box<dyn ContentWindow>,
    model: Option<Arc<dyn DataViewModel>>,

    /// Model column showing tree expanders.
    expander_column: Option<usize>,
    indent: u32,
    font: Option<Font>,
    row_height: Option<u32>,

    /// Column holding keyboard focus within the current row.
    current_column: Option<usize>,

    /// Emitted when a column's sort state changed.
    pub column_sorted: Signal<usize>,

    /// Emitted after a column was moved by the user.
    pub column_reordered: Signal<(usize, usize)>,

    /// Emitted after the set of columns changed.
    pub columns_changed: Signal<usize>,
}

impl DataView {
    /// Creates an empty view drawing its cells into `content`.
    pub fn new(content: Box<dyn ContentWindow>) -> Self {
        let config = DataViewConfig::default();
        Self {
            sorting: SortState::new(config.allow_multi_column_sort),
            indent: config.indent,
            row_height: config.row_height,
            config,
            columns: ColumnRegistry::new(),
            widths: WidthCache::new(),
            header: None,
            content,
            model: None,
            expander_column: None,
            font: None,
            current_column: None,
            column_sorted: Signal::new(),
            column_reordered: Signal::new(),
            columns_changed: Signal::new(),
        }
    }

    /// Attaches a header window using builder pattern.
    pub fn with_header(mut self, header: Box<dyn HeaderWindow>) -> Self {
        self.header = Some(header);
        self
    }

    /// Applies a configuration using builder pattern.
    pub fn with_config(mut self, config: DataViewConfig) -> Self {
        self.sorting.set_allow_multi(config.allow_multi_column_sort);
        if !config.allow_multi_column_sort {
            let dropped = self.sorting.collapse_to_primary();
            self.unmark_sort_keys(&dropped);
        }
        self.indent = config.indent;
        self.row_height = config.row_height;
        self.config = config;
        self
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &DataViewConfig {
        &self.config
    }

    // =========================================================================
    // Column Registry
    // =========================================================================

    /// Adds a column after the last one.
    pub fn append_column(&mut self, column: Column) -> Option<ColumnId> {
        self.insert_column(self.columns.len(), column)
    }

    /// Adds a column before the first one.
    pub fn prepend_column(&mut self, column: Column) -> Option<ColumnId> {
        self.insert_column(0, column)
    }

    /// Inserts a column at `position`, taking ownership of it.
    ///
    /// Returns `None` (and drops the column) if `position` is past the end.
    pub fn insert_column(&mut self, position: usize, column: Column) -> Option<ColumnId> {
        let Some(id) = self.columns.insert(position, column) else {
            tracing::debug!(
                target: targets::COLUMNS,
                position,
                count = self.columns.len(),
                "rejected column insert past the end"
            );
            return None;
        };

        self.widths.insert(position);
        self.sorting.column_inserted(position);
        if let Some(current) = self.current_column
            && current >= position
        {
            self.current_column = Some(current + 1);
        }

        // A sort key must be recorded in the sort state, which also enforces
        // the single-key policy.
        if self.columns.get(position).is_some_and(Column::is_sort_key) {
            self.adopt_sort_key(position);
        }

        tracing::debug!(target: targets::COLUMNS, position, count = self.columns.len(), "inserted column");
        self.on_columns_count_changed();
        Some(id)
    }

    /// Returns the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns the column at `position`.
    pub fn column(&self, position: usize) -> Option<&Column> {
        self.columns.get(position)
    }

    /// Returns the column with the given identity.
    pub fn column_by_id(&self, id: ColumnId) -> Option<&Column> {
        self.columns.get_by_id(id)
    }

    /// Returns the identity of the column at `position`.
    pub fn column_id(&self, position: usize) -> Option<ColumnId> {
        self.columns.id_at(position)
    }

    /// Returns the column displayed at the given visual position.
    ///
    /// Storage order is display order, so this is the same as
    /// [`column`](Self::column).
    pub fn column_at(&self, position: usize) -> Option<&Column> {
        self.columns.get(position)
    }

    /// Iterates columns in display order.
    pub fn columns(&self) -> impl Iterator<Item = (ColumnId, &Column)> + '_ {
        self.columns.iter()
    }

    /// Borrows the column at `position` for modification.
    pub fn column_mut(&mut self, position: usize) -> Option<ColumnMut<'_>> {
        let id = self.columns.id_at(position)?;
        Some(ColumnMut {
            view: self,
            id,
            position,
        })
    }

    /// Borrows the column with the given identity for modification.
    pub fn column_mut_by_id(&mut self, id: ColumnId) -> Option<ColumnMut<'_>> {
        let position = self.columns.position_of(id)?;
        Some(ColumnMut {
            view: self,
            id,
            position,
        })
    }

    /// Removes and destroys a column. Returns `false` if the view does not
    /// own it.
    pub fn delete_column(&mut self, id: ColumnId) -> bool {
        let Some((position, column)) = self.columns.remove(id) else {
            tracing::debug!(target: targets::COLUMNS, ?id, "delete of unknown column ignored");
            return false;
        };

        self.widths.remove(position);
        let was_sort_key = self.sorting.column_removed(position);
        self.current_column = match self.current_column {
            Some(current) if current == position => None,
            Some(current) if current > position => Some(current - 1),
            other => other,
        };

        tracing::debug!(
            target: targets::COLUMNS,
            position,
            title = column.title(),
            was_sort_key,
            "deleted column"
        );
        drop(column);

        if was_sort_key {
            self.resort_model();
        }
        self.on_columns_count_changed();
        true
    }

    /// Removes and destroys every column.
    pub fn clear_columns(&mut self) -> bool {
        let removed = self.columns.clear();
        self.widths.clear();
        let had_sort_keys = !self.sorting.clear().is_empty();
        self.current_column = None;

        tracing::debug!(target: targets::COLUMNS, removed, "cleared columns");
        if had_sort_keys {
            self.resort_model();
        }
        self.on_columns_count_changed();
        true
    }

    /// Returns the position of a column, or `-1` if the view does not own it.
    pub fn column_position(&self, id: ColumnId) -> i32 {
        self.columns
            .position_of(id)
            .map_or(-1, |position| position as i32)
    }

    /// Returns the position of a column, or `None` if the view does not own it.
    pub fn position_of(&self, id: ColumnId) -> Option<usize> {
        self.columns.position_of(id)
    }

    /// Returns the index of a column in the view's storage, or `-1`.
    pub fn column_index(&self, id: ColumnId) -> i32 {
        self.column_position(id)
    }

    /// Returns the position of the first column showing `model_column`, or
    /// `-1` if no column shows it.
    pub fn model_column_index(&self, model_column: usize) -> i32 {
        self.columns
            .position_of_model_column(model_column)
            .map_or(-1, |position| position as i32)
    }

    /// Moves a column after the user dragged its header.
    ///
    /// `new_position` is clamped into `[0, count - 1]`. Returns `false` if the
    /// view does not own the column.
    pub fn column_moved(&mut self, id: ColumnId, new_position: usize) -> bool {
        let Some((from, to)) = self.move_column_silently(id, new_position) else {
            return false;
        };
        if from == to {
            return true;
        }

        tracing::debug!(target: targets::COLUMNS, from, to, "moved column");
        self.on_columns_count_changed();
        self.column_reordered.emit((from, to));
        true
    }

    /// Moves a column and realigns the width cache and sort state without
    /// notifying anyone.
    fn move_column_silently(&mut self, id: ColumnId, new_position: usize) -> Option<(usize, usize)> {
        let (from, to) = self.columns.move_to(id, new_position)?;
        if from != to {
            self.widths.move_entry(from, to);
            self.sorting.column_moved(from, to);
            self.current_column = self
                .current_column
                .map(|current| moved_position(current, from, to));
        }
        Some((from, to))
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    fn notify(&mut self, event: ColumnEvent) {
        if self.config.show_header
            && let Some(header) = self.header.as_mut()
        {
            header.column_event(&event);
        }
        self.content.column_event(&event);
    }

    /// Updates the display after a change to an individual column.
    fn on_column_change(&mut self, index: usize) {
        self.notify(ColumnEvent::DisplayChanged { index });
    }

    /// Updates after a column's width or label changed.
    fn on_column_width_change(&mut self, index: usize) {
        self.invalidate_col_best_width(index);
        self.notify(ColumnEvent::WidthChanged { index });
    }

    /// Updates after a change to the number or order of columns.
    fn on_columns_count_changed(&mut self) {
        self.check_invariants();
        let count = self.columns.len();
        self.notify(ColumnEvent::CountChanged { count });
        self.columns_changed.emit(count);
    }

    fn check_invariants(&self) {
        assert_eq!(
            self.widths.len(),
            self.columns.len(),
            "width cache out of sync with columns"
        );
        assert!(
            self.sorting.is_consistent(self.columns.len()),
            "sort state out of sync with columns"
        );
    }

    // =========================================================================
    // Width Cache
    // =========================================================================

    /// Returns the best width of the column at `index`, measuring it if it is
    /// not cached.
    pub fn best_column_width(&mut self, index: usize) -> Option<u32> {
        if let Some(width) = self.widths.cached(index) {
            return Some(width);
        }
        let column = self.columns.get(index)?;
        let width = self.content.best_column_width(index, column);
        self.widths.store(index, width);
        tracing::trace!(target: targets::WIDTH_CACHE, index, width, "measured best width");
        Some(width)
    }

    /// Forgets the best width of one column.
    pub fn invalidate_col_best_width(&mut self, index: usize) {
        if !self.widths.invalidate(index) {
            tracing::debug!(target: targets::WIDTH_CACHE, index, "invalidate of unknown column ignored");
        }
    }

    /// Forgets the best width of every column.
    pub fn invalidate_col_best_widths(&mut self) {
        self.widths.invalidate_all();
    }

    /// Returns whether any best width is waiting for the next idle flush.
    pub fn has_dirty_widths(&self) -> bool {
        self.widths.is_any_dirty()
    }

    /// Returns whether the best width of one column is waiting for a flush.
    pub fn is_width_dirty(&self, index: usize) -> bool {
        self.widths.is_dirty(index)
    }

    /// Returns the cached best width of a column without measuring.
    pub fn cached_best_width(&self, index: usize) -> Option<u32> {
        self.widths.cached(index)
    }

    /// Recomputes dirty best widths and tells the header about columns whose
    /// displayed width changed.
    ///
    /// Returns the number of columns the header was told about.
    pub fn update_col_widths(&mut self) -> usize {
        let _span = PerfSpan::new(span_names::WIDTH_FLUSH);
        let mut updated = 0;

        for index in self.widths.dirty_indices() {
            let sized_by_content = self
                .columns
                .get(index)
                .is_some_and(|column| column.width() == ColumnWidth::AutoSize && !column.is_hidden());
            if !sized_by_content {
                self.widths.mark_clean(index);
                continue;
            }

            let Some(best) = self.best_column_width(index) else {
                self.widths.mark_clean(index);
                continue;
            };
            if self.widths.mark_synced(index, best) {
                if self.config.show_header
                    && let Some(header) = self.header.as_mut()
                {
                    header.column_event(&ColumnEvent::WidthChanged { index });
                }
                updated += 1;
            }
        }

        debug_assert!(!self.widths.is_any_dirty());
        tracing::trace!(target: targets::WIDTH_CACHE, updated, "flushed column widths");
        updated
    }

    /// Idle hook for the host event loop: flushes pending width updates.
    ///
    /// Does nothing when no width is dirty, so it is cheap to call on every
    /// idle cycle.
    pub fn on_internal_idle(&mut self) {
        if self.widths.is_any_dirty() {
            self.update_col_widths();
        }
    }

    /// Returns the width the column at `position` is displayed with.
    ///
    /// Hidden columns take no space.
    pub fn column_width(&mut self, position: usize) -> Option<u32> {
        let column = self.columns.get(position)?;
        if column.is_hidden() {
            return Some(0);
        }
        let min_width = column.min_width();
        let width = match column.width() {
            ColumnWidth::Pixels(px) => px,
            ColumnWidth::Default => self.config.default_column_width,
            ColumnWidth::AutoSize => self.best_column_width(position)?,
        };
        Some(width.max(min_width))
    }

    /// Returns the total width of all visible columns, saturating at
    /// `u32::MAX`.
    pub fn total_columns_width(&mut self) -> u32 {
        (0..self.columns.len())
            .filter_map(|position| self.column_width(position))
            .fold(0u32, u32::saturating_add)
    }

    /// Returns the position of the visible column covering horizontal
    /// offset `x`.
    pub fn column_at_offset(&mut self, x: u32) -> Option<usize> {
        let x = u64::from(x);
        let mut start = 0u64;
        for position in 0..self.columns.len() {
            let end = start + u64::from(self.column_width(position)?);
            if x >= start && x < end {
                return Some(position);
            }
            start = end;
        }
        None
    }

    // =========================================================================
    // Sort State
    // =========================================================================

    /// Marks the column at `index` as a sort key, keeping its direction.
    ///
    /// When multi-column sorting is not allowed, other keys are dropped.
    /// Returns `false` if the column does not exist or is not sortable.
    pub fn use_column_for_sorting(&mut self, index: usize) -> bool {
        if !self.can_sort_by(index) {
            return false;
        }
        if self.sorting.contains(index) {
            return true;
        }
        self.mark_sort_key(index);
        self.sorting_changed(Some(index));
        true
    }

    /// Stops sorting by the column at `index`. Returns `false` if it was not
    /// a sort key.
    pub fn dont_use_column_for_sorting(&mut self, index: usize) -> bool {
        if !self.sorting.remove(index) {
            return false;
        }
        if let Some(column) = self.columns.get_mut(index) {
            column.set_sort_key(false);
        }
        tracing::debug!(target: targets::SORT, index, "column no longer used for sorting");
        self.sorting_changed(Some(index));
        true
    }

    /// Cycles a column through unsorted → ascending → descending → unsorted.
    ///
    /// Non-sortable and unknown columns are ignored.
    pub fn toggle_sort_by_column(&mut self, index: usize) {
        if !self.can_sort_by(index) {
            tracing::debug!(target: targets::SORT, index, "toggle on non-sortable column ignored");
            return;
        }

        if !self.sorting.contains(index) {
            self.mark_sort_key(index);
            self.set_stored_sort_order(index, SortOrder::Ascending);
        } else if self.columns.get(index).is_some_and(Column::is_sort_order_ascending) {
            self.set_stored_sort_order(index, SortOrder::Descending);
        } else {
            self.sorting.remove(index);
            if let Some(column) = self.columns.get_mut(index) {
                column.set_sort_key(false);
            }
        }

        tracing::debug!(
            target: targets::SORT,
            index,
            sorted = self.sorting.contains(index),
            "toggled sort by column"
        );
        self.sorting_changed(Some(index));
    }

    /// Returns whether the column at `index` is a sort key.
    pub fn is_column_sorted(&self, index: usize) -> bool {
        self.sorting.contains(index)
    }

    /// Stops sorting by any column.
    pub fn reset_all_sort_columns(&mut self) {
        let dropped = self.sorting.clear();
        if dropped.is_empty() {
            return;
        }
        self.unmark_sort_keys(&dropped);
        tracing::debug!(target: targets::SORT, dropped = dropped.len(), "reset all sort columns");
        self.sorting_changed(None);
    }

    /// Allows or forbids sorting by more than one column.
    ///
    /// Forbidding it while several columns are sort keys keeps only the first
    /// one that was marked. Returns `false`, changing nothing, if the model
    /// cannot sort by several columns.
    pub fn allow_multi_column_sort(&mut self, allow: bool) -> bool {
        if self.sorting.allows_multi() == allow {
            return true;
        }
        if allow
            && let Some(model) = &self.model
            && !model.supports_multi_column_sort()
        {
            tracing::debug!(target: targets::SORT, "model rejected multi-column sort");
            return false;
        }

        self.sorting.set_allow_multi(allow);
        self.config.allow_multi_column_sort = allow;

        let dropped = self.sorting.collapse_to_primary();
        if !dropped.is_empty() {
            self.unmark_sort_keys(&dropped);
            tracing::debug!(target: targets::SORT, dropped = dropped.len(), "collapsed to single sort key");
            self.sorting_changed(None);
        }
        true
    }

    /// Returns whether more than one column may be a sort key.
    pub fn is_multi_column_sort_allowed(&self) -> bool {
        self.sorting.allows_multi()
    }

    /// Returns the leftmost sort key column.
    pub fn sorting_column(&self) -> Option<&Column> {
        self.sorting
            .in_display_order()
            .first()
            .and_then(|&position| self.columns.get(position))
    }

    /// Returns all sort key columns in display order.
    pub fn sorting_columns(&self) -> Vec<&Column> {
        self.sorting
            .in_display_order()
            .into_iter()
            .filter_map(|position| self.columns.get(position))
            .collect()
    }

    /// Returns the positions of all sort key columns in display order.
    pub fn sorting_column_positions(&self) -> Vec<usize> {
        self.sorting.in_display_order()
    }

    fn can_sort_by(&self, index: usize) -> bool {
        self.columns.get(index).is_some_and(Column::is_sortable)
    }

    /// Adds a sort key without notifying. Displaced keys are unmarked.
    fn mark_sort_key(&mut self, index: usize) {
        let displaced = self.sorting.add(index);
        self.unmark_sort_keys(&displaced);
        if let Some(column) = self.columns.get_mut(index) {
            column.set_sort_key(true);
        }
    }

    /// Records a column inserted already flagged as a sort key.
    fn adopt_sort_key(&mut self, position: usize) {
        if self.can_sort_by(position) {
            self.mark_sort_key(position);
            self.resort_model();
        } else if let Some(column) = self.columns.get_mut(position) {
            column.set_sort_key(false);
        }
    }

    fn unmark_sort_keys(&mut self, positions: &[usize]) {
        for &position in positions {
            if let Some(column) = self.columns.get_mut(position) {
                column.set_sort_key(false);
            }
        }
    }

    fn set_stored_sort_order(&mut self, index: usize, order: SortOrder) {
        if let Some(column) = self.columns.get_mut(index) {
            column.set_sort_order(order);
        }
    }

    fn sorting_changed(&mut self, column: Option<usize>) {
        debug_assert!(self.sorting.is_consistent(self.columns.len()));
        self.notify(ColumnEvent::SortingChanged);
        self.resort_model();
        if let Some(column) = column {
            self.column_sorted.emit(column);
        }
    }

    fn resort_model(&self) {
        if let Some(model) = &self.model {
            model.resort();
        }
    }

    // =========================================================================
    // Model
    // =========================================================================

    /// Associates a model with the view.
    ///
    /// Existing sort keys and best widths no longer apply and are dropped.
    /// If the model cannot sort by several columns, multi-column sorting is
    /// turned off.
    pub fn associate_model(&mut self, model: Arc<dyn DataViewModel>) -> bool {
        if !model.supports_multi_column_sort() && self.sorting.allows_multi() {
            self.sorting.set_allow_multi(false);
            self.config.allow_multi_column_sort = false;
        }
        self.model = Some(model);
        self.model_cleared();
        true
    }

    /// Returns the associated model.
    pub fn model(&self) -> Option<&Arc<dyn DataViewModel>> {
        self.model.as_ref()
    }

    /// Called when the model was reset: sorting and best widths are dropped.
    pub fn model_cleared(&mut self) {
        tracing::debug!(target: targets::SORT, "model reset");
        self.reset_all_sort_columns();
        self.invalidate_col_best_widths();
    }

    /// Called when values of one model column changed.
    pub fn model_value_changed(&mut self, model_column: usize) {
        let positions: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, (_, column))| column.model_column() == model_column)
            .map(|(position, _)| position)
            .collect();
        for position in positions {
            self.widths.invalidate(position);
        }
    }

    /// Called when rows were added or removed.
    pub fn model_items_changed(&mut self) {
        self.invalidate_col_best_widths();
    }

    // =========================================================================
    // View Settings
    // =========================================================================

    /// Sets which model column shows the tree expanders.
    pub fn set_expander_column(&mut self, model_column: Option<usize>) {
        if self.expander_column == model_column {
            return;
        }
        // The expander and indent add to the best width of both columns
        for affected in [self.expander_column, model_column].into_iter().flatten() {
            self.model_value_changed(affected);
        }
        self.expander_column = model_column;
        self.content
            .view_changed(&ViewChange::ExpanderColumn(model_column));
    }

    /// Returns the model column showing tree expanders.
    pub fn expander_column(&self) -> Option<usize> {
        self.expander_column
    }

    /// Sets the tree indentation per level.
    pub fn set_indent(&mut self, indent: u32) {
        if self.indent == indent {
            return;
        }
        self.indent = indent;
        if let Some(model_column) = self.expander_column {
            self.model_value_changed(model_column);
        }
        self.content.view_changed(&ViewChange::Indent(indent));
    }

    /// Returns the tree indentation per level.
    pub fn indent(&self) -> u32 {
        self.indent
    }

    /// Sets the cell font. All best widths are recomputed.
    pub fn set_font(&mut self, font: Font) -> bool {
        if self.font.as_ref() == Some(&font) {
            return true;
        }
        self.content.view_changed(&ViewChange::Font(font.clone()));
        self.font = Some(font);
        self.invalidate_col_best_widths();
        true
    }

    /// Returns the cell font, if one was set.
    pub fn font(&self) -> Option<&Font> {
        self.font.as_ref()
    }

    /// Sets a fixed row height. Returns `false` for a zero height.
    pub fn set_row_height(&mut self, height: u32) -> bool {
        if height == 0 {
            return false;
        }
        if self.row_height != Some(height) {
            self.row_height = Some(height);
            self.content.view_changed(&ViewChange::RowHeight(height));
        }
        true
    }

    /// Returns the fixed row height, if one was set.
    pub fn row_height(&self) -> Option<u32> {
        self.row_height
    }

    /// Sets the column holding keyboard focus. Returns `false` if there is no
    /// column at `position`.
    pub fn set_current_column(&mut self, position: Option<usize>) -> bool {
        if let Some(position) = position
            && position >= self.columns.len()
        {
            return false;
        }
        self.current_column = position;
        true
    }

    /// Returns the column holding keyboard focus.
    pub fn current_column(&self) -> Option<&Column> {
        self.current_column
            .and_then(|position| self.columns.get(position))
    }

    /// Returns the position of the column holding keyboard focus.
    pub fn current_column_position(&self) -> Option<usize> {
        self.current_column
    }

    // Used by layout restoration, which batches its own notifications.
    pub(crate) fn columns_registry(&self) -> &ColumnRegistry {
        &self.columns
    }

    pub(crate) fn move_column_batched(&mut self, id: ColumnId, new_position: usize) -> bool {
        self.move_column_silently(id, new_position)
            .is_some_and(|(from, to)| from != to)
    }

    pub(crate) fn finish_batched_moves(&mut self) {
        tracing::debug!(target: targets::COLUMNS, "applied batched column moves");
        self.on_columns_count_changed();
    }

    pub(crate) fn marked_sort_keys(&self) -> &[usize] {
        self.sorting.marked()
    }

    fn sort_snapshot(&self) -> Vec<(usize, SortOrder)> {
        self.sorting
            .marked()
            .iter()
            .filter_map(|&position| {
                self.columns
                    .get(position)
                    .map(|column| (position, column.sort_order()))
            })
            .collect()
    }

    /// Replaces the sort policy and keys (positions in marking order) and
    /// notifies once if the keys changed.
    pub(crate) fn replace_sort_keys(&mut self, allow_multi: bool, keys: &[(usize, SortOrder)]) {
        let before = self.sort_snapshot();

        let dropped = self.sorting.clear();
        self.unmark_sort_keys(&dropped);
        self.sorting.set_allow_multi(allow_multi);
        self.config.allow_multi_column_sort = allow_multi;
        for &(position, order) in keys {
            if self.can_sort_by(position) {
                self.mark_sort_key(position);
                self.set_stored_sort_order(position, order);
            }
        }

        if before != self.sort_snapshot() {
            self.sorting_changed(None);
        }
    }
}

/// Mutable access to one column of a [`DataView`].
///
/// Every setter tells the view what changed, so the header and content
/// windows stay in sync. Dereferences to the [`Column`] for reading.
pub struct ColumnMut<'a> {
    view: &'a mut DataView,
    id: ColumnId,
    position: usize,
}

impl std::ops::Deref for ColumnMut<'_> {
    type Target = Column;

    fn deref(&self) -> &Column {
        self.view
            .columns
            .get_by_id(self.id)
            .expect("ColumnMut refers to a live column")
    }
}

impl ColumnMut<'_> {
    /// Returns the column's identity.
    pub fn id(&self) -> ColumnId {
        self.id
    }

    /// Returns the column's position.
    pub fn position(&self) -> usize {
        self.position
    }

    fn column_mut(&mut self) -> &mut Column {
        self.view
            .columns
            .get_by_id_mut(self.id)
            .expect("ColumnMut refers to a live column")
    }

    /// Labels the column with text.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.column_mut().set_label(ColumnLabel::Title(title.into()));
        self.view.on_column_width_change(self.position);
    }

    /// Labels the column with an image.
    pub fn set_bitmap(&mut self, bitmap: Bitmap) {
        self.column_mut().set_label(ColumnLabel::Bitmap(bitmap));
        self.view.on_column_width_change(self.position);
    }

    /// Sets the minimum width, growing a smaller fixed width to match.
    pub fn set_min_width(&mut self, min_width: u32) {
        self.column_mut().set_min_width(min_width);
        self.view.on_column_width_change(self.position);
    }

    /// Sets the width.
    pub fn set_width(&mut self, width: ColumnWidth) {
        let _ = self.update_width(width);
    }

    /// Sets the width only if it differs from the current one.
    ///
    /// Returns `false`, without notifying anyone, if the (clamped) width is
    /// unchanged. Returns `true` after exactly one width notification
    /// otherwise.
    pub fn update_width(&mut self, width: ColumnWidth) -> bool {
        if !self.column_mut().store_width(width) {
            return false;
        }
        self.view.on_column_width_change(self.position);
        true
    }

    /// Sets the alignment.
    pub fn set_alignment(&mut self, alignment: Alignment) {
        self.column_mut().set_alignment(alignment);
        self.view.on_column_change(self.position);
    }

    /// Sets the flags.
    ///
    /// Clearing the sortable flag of a sort key also stops sorting by it.
    pub fn set_flags(&mut self, flags: ColumnFlags) {
        let position = self.position;
        let stop_sorting = !flags.sortable && self.is_sort_key();
        if stop_sorting {
            self.view.sorting.remove(position);
            self.column_mut().set_sort_key(false);
        }
        self.column_mut().set_flags(flags);
        self.view.on_column_change(position);
        if stop_sorting {
            tracing::debug!(target: targets::SORT, position, "column no longer sortable");
            self.view.resort_model();
        }
    }

    /// Shows or hides the column.
    pub fn set_hidden(&mut self, hidden: bool) {
        if self.is_hidden() != hidden {
            let flags = self.flags().with_hidden(hidden);
            self.set_flags(flags);
        }
    }

    /// Makes this column a sort key with the given direction.
    ///
    /// When multi-column sorting is not allowed, it replaces any other key.
    /// Ignored for columns that are not sortable.
    pub fn set_sort_order(&mut self, ascending: bool) {
        let position = self.position;
        if !self.is_sortable() {
            tracing::debug!(target: targets::SORT, position, "sort order on non-sortable column ignored");
            return;
        }
        if !self.view.sorting.contains(position) {
            self.view.mark_sort_key(position);
        }
        self.column_mut()
            .set_sort_order(SortOrder::from_ascending(ascending));
        self.view.sorting_changed(Some(position));
    }

    /// Flips the direction of a column that is already a sort key.
    pub fn toggle_sort_order(&mut self) {
        if self.is_sort_key() {
            let ascending = !self.is_sort_order_ascending();
            self.set_sort_order(ascending);
        }
    }

    /// Stops sorting by this column. Does nothing if it is not a sort key.
    pub fn unset_as_sort_key(&mut self) {
        let position = self.position;
        self.view.dont_use_column_for_sorting(position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::TextRenderer;
    use parking_lot::Mutex;

    type Events = Arc<Mutex<Vec<ColumnEvent>>>;

    struct RecordingHeader {
        events: Events,
    }

    impl HeaderWindow for RecordingHeader {
        fn column_event(&mut self, event: &ColumnEvent) {
            self.events.lock().push(*event);
        }
    }

    struct FixedContent {
        events: Events,
        best_width: u32,
    }

    impl ContentWindow for FixedContent {
        fn column_event(&mut self, event: &ColumnEvent) {
            self.events.lock().push(*event);
        }

        fn best_column_width(&self, _index: usize, column: &Column) -> u32 {
            self.best_width + column.title().len() as u32
        }
    }

    fn view() -> (DataView, Events, Events) {
        let header_events = Events::default();
        let content_events = Events::default();
        let view = DataView::new(Box::new(FixedContent {
            events: content_events.clone(),
            best_width: 40,
        }))
        .with_header(Box::new(RecordingHeader {
            events: header_events.clone(),
        }));
        (view, header_events, content_events)
    }

    fn sortable(title: &str, model_column: usize) -> Column {
        Column::new(title, Arc::new(TextRenderer::new()), model_column)
            .with_flags(ColumnFlags::new().with_sortable(true))
    }

    #[test]
    fn test_append_prepend_insert_order() {
        let (mut view, _, _) = view();
        view.append_column(sortable("b", 1)).unwrap();
        view.prepend_column(sortable("a", 0)).unwrap();
        view.insert_column(2, sortable("c", 2)).unwrap();
        assert!(view.insert_column(9, sortable("x", 9)).is_none());

        let titles: Vec<&str> = view.columns().map(|(_, c)| c.title()).collect();
        assert_eq!(titles, ["a", "b", "c"]);
        assert_eq!(view.model_column_index(2), 2);
        assert_eq!(view.model_column_index(7), -1);
    }

    #[test]
    fn test_one_count_event_per_call() {
        let (mut view, header, content) = view();
        view.append_column(sortable("a", 0));
        view.append_column(sortable("b", 1));
        view.clear_columns();

        let expected = vec![
            ColumnEvent::CountChanged { count: 1 },
            ColumnEvent::CountChanged { count: 2 },
            ColumnEvent::CountChanged { count: 0 },
        ];
        assert_eq!(*header.lock(), expected);
        assert_eq!(*content.lock(), expected);
    }

    #[test]
    fn test_hidden_header_not_notified() {
        let (view, header, content) = view();
        let mut view = view.with_config(DataViewConfig::default().with_header(false));
        view.append_column(sortable("a", 0));
        assert!(header.lock().is_empty());
        assert_eq!(content.lock().len(), 1);
    }

    #[test]
    fn test_alignment_is_display_change() {
        let (mut view, header, _) = view();
        view.append_column(sortable("a", 0));
        header.lock().clear();

        view.column_mut(0).unwrap().set_alignment(Alignment::Right);
        assert_eq!(*header.lock(), vec![ColumnEvent::DisplayChanged { index: 0 }]);
        assert_eq!(view.column(0).unwrap().alignment(), Alignment::Right);
    }

    #[test]
    fn test_title_change_invalidates_width() {
        let (mut view, header, _) = view();
        view.append_column(sortable("a", 0));
        view.on_internal_idle();
        header.lock().clear();

        view.column_mut(0).unwrap().set_title("longer");
        assert_eq!(*header.lock(), vec![ColumnEvent::WidthChanged { index: 0 }]);
        assert!(view.is_width_dirty(0));
    }

    #[test]
    fn test_effective_widths() {
        let (mut view, _, _) = view();
        view.append_column(sortable("a", 0));
        view.append_column(sortable("bb", 1).with_width(ColumnWidth::AutoSize));
        view.append_column(sortable("c", 2).with_width(ColumnWidth::Pixels(30)).with_min_width(50));
        view.append_column(sortable("d", 3).with_flags(ColumnFlags::new().with_hidden(true)));

        assert_eq!(view.column_width(0), Some(80));
        assert_eq!(view.column_width(1), Some(42));
        assert_eq!(view.column_width(2), Some(50));
        assert_eq!(view.column_width(3), Some(0));
        assert_eq!(view.column_width(4), None);
        assert_eq!(view.total_columns_width(), 172);

        assert_eq!(view.column_at_offset(0), Some(0));
        assert_eq!(view.column_at_offset(80), Some(1));
        assert_eq!(view.column_at_offset(171), Some(2));
        assert_eq!(view.column_at_offset(172), None);
    }

    #[test]
    fn test_huge_widths_do_not_overflow() {
        let (mut view, _, _) = view();
        view.append_column(sortable("wide", 0).with_width(ColumnWidth::Pixels(u32::MAX)));
        view.append_column(sortable("b", 1));

        assert_eq!(view.total_columns_width(), u32::MAX);
        assert_eq!(view.column_at_offset(u32::MAX - 1), Some(0));
        assert_eq!(view.column_at_offset(u32::MAX), Some(1));
    }

    #[test]
    fn test_flush_notifies_header_for_autosize_only() {
        let (mut view, header, content) = view();
        view.append_column(sortable("a", 0));
        view.append_column(sortable("b", 1).with_width(ColumnWidth::AutoSize));
        header.lock().clear();
        content.lock().clear();

        view.on_internal_idle();
        assert_eq!(*header.lock(), vec![ColumnEvent::WidthChanged { index: 1 }]);
        assert!(content.lock().is_empty());
        assert!(!view.has_dirty_widths());

        // Nothing dirty: the idle hook is a no-op
        header.lock().clear();
        view.on_internal_idle();
        assert!(header.lock().is_empty());

        // Same best width after invalidation: header is not bothered
        view.invalidate_col_best_width(1);
        view.on_internal_idle();
        assert!(header.lock().is_empty());
    }

    #[test]
    fn test_current_column_follows_structure() {
        let (mut view, _, _) = view();
        let a = view.append_column(sortable("a", 0)).unwrap();
        view.append_column(sortable("b", 1));
        assert!(view.set_current_column(Some(1)));
        assert!(!view.set_current_column(Some(5)));

        view.prepend_column(sortable("z", 9));
        assert_eq!(view.current_column().unwrap().title(), "b");

        view.column_moved(a, 99);
        assert_eq!(view.current_column().unwrap().title(), "b");
        assert_eq!(view.current_column_position(), Some(1));

        let b = view.column_id(1).unwrap();
        view.delete_column(b);
        assert!(view.current_column().is_none());
    }

    #[test]
    fn test_set_flags_non_sortable_drops_sort_key() {
        let (mut view, _, _) = view();
        view.append_column(sortable("a", 0));
        view.toggle_sort_by_column(0);
        assert!(view.is_column_sorted(0));

        view.column_mut(0).unwrap().set_flags(ColumnFlags::new());
        assert!(!view.is_column_sorted(0));
        assert!(!view.column(0).unwrap().is_sort_key());
    }

    #[test]
    fn test_inserting_sort_key_column_respects_policy() {
        let (mut view, _, _) = view();
        view.append_column(sortable("a", 0));
        view.toggle_sort_by_column(0);

        let mut presorted = sortable("b", 1);
        presorted.set_sort_key(true);
        view.append_column(presorted);

        assert_eq!(view.sorting_column_positions(), vec![1]);
        assert!(!view.column(0).unwrap().is_sort_key());
    }

    #[test]
    fn test_expander_and_indent_invalidate_widths() {
        let (mut view, _, _) = view();
        view.append_column(sortable("tree", 4));
        view.append_column(sortable("other", 5));
        view.on_internal_idle();

        view.set_expander_column(Some(4));
        assert!(view.is_width_dirty(0));
        assert!(!view.is_width_dirty(1));
        assert_eq!(view.expander_column(), Some(4));

        view.on_internal_idle();
        view.set_indent(24);
        assert!(view.is_width_dirty(0));
        assert_eq!(view.indent(), 24);
    }

    #[test]
    fn test_font_and_row_height() {
        let (mut view, _, _) = view();
        view.append_column(sortable("a", 0));
        view.on_internal_idle();

        assert!(view.set_font(Font::new("Sans", 11.0)));
        assert!(view.is_width_dirty(0));
        assert_eq!(view.font().unwrap().family, "Sans");

        assert!(!view.set_row_height(0));
        assert!(view.set_row_height(22));
        assert_eq!(view.row_height(), Some(22));
    }
}
