//! Interfaces a data view consumes from its surroundings.
//!
//! A [`DataView`](crate::DataView) does not draw anything. It drives two
//! windows supplied by the toolkit integration:
//!
//! - a [`HeaderWindow`] showing the column headers, and
//! - a [`ContentWindow`] showing the cells, which also knows how to measure
//!   a column's best width.
//!
//! Both receive one [`ColumnEvent`] per public mutation of the view. The
//! [`DataViewModel`] is consulted for sort capabilities and told when the
//! sort order changed.

use crate::column::Column;

/// A change to the view's columns, delivered to the header and content
/// windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnEvent {
    /// Columns were inserted, removed, reordered or cleared. Everything needs
    /// to be laid out again.
    CountChanged {
        /// Number of columns after the change.
        count: usize,
    },
    /// A column's appearance changed (alignment, flags); repaint it.
    DisplayChanged {
        /// Position of the column.
        index: usize,
    },
    /// A column's width or label changed; the total content width may have
    /// changed, so all columns need laying out again.
    WidthChanged {
        /// Position of the column.
        index: usize,
    },
    /// The set of sort keys or their directions changed.
    SortingChanged,
}

/// Font description forwarded to the content window.
///
/// Text metrics are the windowing layer's concern; the view only needs to
/// know the font changed.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    /// Font family name.
    pub family: String,
    /// Size in points.
    pub point_size: f32,
    /// Bold weight.
    pub bold: bool,
}

impl Font {
    /// Creates a regular-weight font.
    pub fn new(family: impl Into<String>, point_size: f32) -> Self {
        Self {
            family: family.into(),
            point_size,
            bold: false,
        }
    }
}

/// View-wide settings forwarded to the content window.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewChange {
    /// The model column that shows tree expanders changed.
    ExpanderColumn(Option<usize>),
    /// Tree indentation per level, in pixels.
    Indent(u32),
    /// The cell font changed.
    Font(Font),
    /// Row height, in pixels.
    RowHeight(u32),
}

/// The header sub-window of a data view.
pub trait HeaderWindow {
    /// Called once per public mutation of the view's columns.
    fn column_event(&mut self, event: &ColumnEvent);
}

/// The main content sub-window of a data view.
pub trait ContentWindow {
    /// Called once per public mutation of the view's columns.
    fn column_event(&mut self, event: &ColumnEvent);

    /// Measures the width needed to show the column's cells without clipping.
    fn best_column_width(&self, index: usize, column: &Column) -> u32;

    /// Called when a view-wide setting changed.
    fn view_changed(&mut self, change: &ViewChange) {
        let _ = change;
    }
}

/// What a data view needs from its model.
///
/// The full model/notifier protocol lives elsewhere; the view only asks
/// whether multi-column sorting is supported and tells the model to re-sort.
pub trait DataViewModel: Send + Sync {
    /// Returns whether the model can sort by more than one column.
    fn supports_multi_column_sort(&self) -> bool {
        true
    }

    /// Called after the sort keys or directions changed.
    fn resort(&self) {}
}
