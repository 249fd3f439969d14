//! Column descriptors for data views.
//!
//! A [`Column`] describes one visual column of a data view: what it is labelled
//! with, which model field it shows, how wide it is, how its cells are aligned,
//! and whether it takes part in sorting.
//!
//! Columns are plain records. Once a column has been handed to a
//! [`DataView`](crate::DataView) it can only be changed through a
//! [`ColumnMut`](crate::ColumnMut) handle, which tells the view what changed so
//! it can update the header and content windows.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_dataview::{Alignment, Column, ColumnFlags, ColumnWidth, TextRenderer};
//!
//! let column = Column::new("Name", Arc::new(TextRenderer::new()), 0)
//!     .with_width(ColumnWidth::Pixels(120))
//!     .with_alignment(Alignment::Left)
//!     .with_flags(ColumnFlags::new().with_sortable(true));
//!
//! assert_eq!(column.title(), "Name");
//! assert!(column.is_sortable());
//! assert!(!column.is_sort_key());
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Opaque per-column drawing strategy.
///
/// The data view never draws cells itself; it only stores the renderer so the
/// content window can find it. The variant type names the kind of value the
/// renderer expects (`"string"`, `"bool"`, `"long"`, ...).
pub trait CellRenderer: Send + Sync + fmt::Debug {
    /// Returns the name of the value type this renderer displays.
    fn variant_type(&self) -> &str;
}

/// Renderer for plain text cells.
#[derive(Debug, Clone, Default)]
pub struct TextRenderer {
    _private: (),
}

impl TextRenderer {
    /// Creates a new text renderer.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CellRenderer for TextRenderer {
    fn variant_type(&self) -> &str {
        "string"
    }
}

/// An image used as a column label instead of a title.
///
/// Pixel data lives in the windowing layer; a data view only needs to know the
/// bitmap exists and how much room it takes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bitmap {
    name: String,
    width: u32,
    height: u32,
}

impl Bitmap {
    /// Creates a bitmap reference with the given resource name and size.
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
        }
    }

    /// Returns the resource name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }
}

/// What a column header displays. A column shows either text or an image,
/// never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnLabel {
    /// Text label.
    Title(String),
    /// Image label.
    Bitmap(Bitmap),
}

/// Requested width of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColumnWidth {
    /// Use the view's default column width.
    #[default]
    Default,
    /// Size the column to fit its content (the best width).
    AutoSize,
    /// A fixed width in pixels.
    Pixels(u32),
}

impl ColumnWidth {
    /// Returns the pixel width, if this is a fixed width.
    pub fn pixels(self) -> Option<u32> {
        match self {
            Self::Pixels(px) => Some(px),
            _ => None,
        }
    }

    /// Clamps a fixed width so it is at least `min_width`.
    pub(crate) fn clamped(self, min_width: u32) -> Self {
        match self {
            Self::Pixels(px) => Self::Pixels(px.max(min_width)),
            other => other,
        }
    }
}

/// Horizontal alignment of a column's cells and header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Alignment {
    /// Align to the left edge.
    Left,
    /// Center within the column.
    #[default]
    Center,
    /// Align to the right edge.
    Right,
}

/// Sort direction of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// Ascending order (A-Z, 0-9).
    #[default]
    Ascending,
    /// Descending order (Z-A, 9-0).
    Descending,
}

impl SortOrder {
    /// Builds a sort order from an "ascending" flag.
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            Self::Ascending
        } else {
            Self::Descending
        }
    }

    /// Returns `true` for [`SortOrder::Ascending`].
    pub fn is_ascending(self) -> bool {
        self == Self::Ascending
    }

    /// Returns the opposite direction.
    pub fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Flags controlling what the user may do with a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ColumnFlags {
    /// The column edge can be dragged to resize it.
    pub resizable: bool,
    /// Clicking the header sorts by this column.
    pub sortable: bool,
    /// The header can be dragged to a new position.
    pub reorderable: bool,
    /// The column is not shown.
    pub hidden: bool,
}

impl ColumnFlags {
    /// Creates the default flags for a new column (resizable only).
    pub fn new() -> Self {
        Self {
            resizable: true,
            ..Default::default()
        }
    }

    /// Creates flags with nothing set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sets the resizable flag.
    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    /// Sets the sortable flag.
    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Sets the reorderable flag.
    pub fn with_reorderable(mut self, reorderable: bool) -> Self {
        self.reorderable = reorderable;
        self
    }

    /// Sets the hidden flag.
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }
}

/// One visual column of a data view.
#[derive(Clone)]
pub struct Column {
    label: ColumnLabel,
    renderer: Arc<dyn CellRenderer>,
    model_column: usize,
    width: ColumnWidth,
    min_width: u32,
    alignment: Alignment,
    flags: ColumnFlags,
    sort_key: bool,
    sort_order: SortOrder,
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("label", &self.label)
            .field("renderer", &self.renderer.variant_type())
            .field("model_column", &self.model_column)
            .field("width", &self.width)
            .field("min_width", &self.min_width)
            .field("alignment", &self.alignment)
            .field("flags", &self.flags)
            .field("sort_key", &self.sort_key)
            .field("sort_order", &self.sort_order)
            .finish()
    }
}

impl Column {
    /// Creates a column labelled with a title.
    ///
    /// The column starts with the default width, centered alignment and the
    /// resizable flag.
    pub fn new(
        title: impl Into<String>,
        renderer: Arc<dyn CellRenderer>,
        model_column: usize,
    ) -> Self {
        Self::with_label(ColumnLabel::Title(title.into()), renderer, model_column)
    }

    /// Creates a column labelled with a bitmap.
    pub fn from_bitmap(bitmap: Bitmap, renderer: Arc<dyn CellRenderer>, model_column: usize) -> Self {
        Self::with_label(ColumnLabel::Bitmap(bitmap), renderer, model_column)
    }

    fn with_label(label: ColumnLabel, renderer: Arc<dyn CellRenderer>, model_column: usize) -> Self {
        Self {
            label,
            renderer,
            model_column,
            width: ColumnWidth::Default,
            min_width: 0,
            alignment: Alignment::Center,
            flags: ColumnFlags::new(),
            sort_key: false,
            sort_order: SortOrder::Ascending,
        }
    }

    /// Sets the initial width using builder pattern.
    pub fn with_width(mut self, width: ColumnWidth) -> Self {
        self.width = width.clamped(self.min_width);
        self
    }

    /// Sets the initial minimum width using builder pattern.
    pub fn with_min_width(mut self, min_width: u32) -> Self {
        self.min_width = min_width;
        self.width = self.width.clamped(min_width);
        self
    }

    /// Sets the alignment using builder pattern.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Sets the flags using builder pattern.
    pub fn with_flags(mut self, flags: ColumnFlags) -> Self {
        self.flags = flags;
        self
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns the header label.
    pub fn label(&self) -> &ColumnLabel {
        &self.label
    }

    /// Returns the title, or an empty string for bitmap-labelled columns.
    pub fn title(&self) -> &str {
        match &self.label {
            ColumnLabel::Title(title) => title,
            ColumnLabel::Bitmap(_) => "",
        }
    }

    /// Returns the bitmap, if the column is labelled with one.
    pub fn bitmap(&self) -> Option<&Bitmap> {
        match &self.label {
            ColumnLabel::Bitmap(bitmap) => Some(bitmap),
            ColumnLabel::Title(_) => None,
        }
    }

    /// Returns the cell renderer.
    pub fn renderer(&self) -> &Arc<dyn CellRenderer> {
        &self.renderer
    }

    /// Returns the index of the model field this column displays.
    pub fn model_column(&self) -> usize {
        self.model_column
    }

    /// Returns the requested width.
    pub fn width(&self) -> ColumnWidth {
        self.width
    }

    /// Returns the minimum width in pixels.
    pub fn min_width(&self) -> u32 {
        self.min_width
    }

    /// Returns the alignment.
    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    /// Returns the flags.
    pub fn flags(&self) -> ColumnFlags {
        self.flags
    }

    /// Returns whether the column can be resized by the user.
    pub fn is_resizable(&self) -> bool {
        self.flags.resizable
    }

    /// Returns whether the column can be sorted by.
    pub fn is_sortable(&self) -> bool {
        self.flags.sortable
    }

    /// Returns whether the column can be dragged to a new position.
    pub fn is_reorderable(&self) -> bool {
        self.flags.reorderable
    }

    /// Returns whether the column is hidden.
    pub fn is_hidden(&self) -> bool {
        self.flags.hidden
    }

    /// Returns whether the column is currently a sort key.
    pub fn is_sort_key(&self) -> bool {
        self.sort_key
    }

    /// Returns the sort direction.
    ///
    /// The direction is remembered even while the column is not a sort key.
    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Returns whether the sort direction is ascending.
    pub fn is_sort_order_ascending(&self) -> bool {
        self.sort_order.is_ascending()
    }

    // =========================================================================
    // Mutation (through the owning view)
    // =========================================================================

    pub(crate) fn set_label(&mut self, label: ColumnLabel) {
        self.label = label;
    }

    /// Stores a new width, clamped to the minimum. Returns `false` if the
    /// stored value did not change.
    pub(crate) fn store_width(&mut self, width: ColumnWidth) -> bool {
        let width = width.clamped(self.min_width);
        if width == self.width {
            return false;
        }
        self.width = width;
        true
    }

    pub(crate) fn set_min_width(&mut self, min_width: u32) {
        self.min_width = min_width;
        self.width = self.width.clamped(min_width);
    }

    pub(crate) fn set_alignment(&mut self, alignment: Alignment) {
        self.alignment = alignment;
    }

    pub(crate) fn set_flags(&mut self, flags: ColumnFlags) {
        self.flags = flags;
    }

    pub(crate) fn set_sort_key(&mut self, sort_key: bool) {
        debug_assert!(
            !sort_key || self.flags.sortable,
            "only sortable columns can be sort keys"
        );
        self.sort_key = sort_key;
    }

    pub(crate) fn set_sort_order(&mut self, order: SortOrder) {
        self.sort_order = order;
    }
}
