//! Column layout and sort state for Horizon data view controls.
//!
//! A data view shows a model as rows and columns. This crate manages the
//! column side of such a control, independent of any windowing system:
//!
//! - **Columns**: Ordered, owned column descriptors with titles or bitmaps,
//!   widths, alignment and flags
//! - **Sorting**: Single- or multi-column sort keys kept consistent as
//!   columns are added, removed and reordered
//! - **Best Widths**: Lazily measured content widths, batched into one
//!   update per idle cycle
//! - **Layouts**: Save and restore column order, widths and sort keys as JSON
//!
//! Drawing is delegated to a [`HeaderWindow`] and a [`ContentWindow`]
//! supplied by the toolkit integration.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use horizon_dataview::prelude::*;
//!
//! let mut view = DataView::new(Box::new(content)).with_header(Box::new(header));
//!
//! let renderer = Arc::new(TextRenderer::new());
//! view.append_column(Column::new("Name", renderer.clone(), 0)
//!     .with_flags(ColumnFlags::new().with_sortable(true)));
//! view.append_column(Column::new("Size", renderer, 1)
//!     .with_width(ColumnWidth::AutoSize));
//!
//! // Header click
//! view.toggle_sort_by_column(0);
//!
//! // Remember the user's arrangement
//! view.save_layout().write_to_file("columns.json")?;
//! ```

pub mod column;
pub mod config;
pub mod layout;
pub mod traits;
pub mod view;

mod error;
mod registry;
mod sort_state;
mod width_cache;

pub use column::{
    Alignment, Bitmap, CellRenderer, Column, ColumnFlags, ColumnLabel, ColumnWidth, SortOrder,
    TextRenderer,
};
pub use config::DataViewConfig;
pub use error::{Error, Result};
pub use layout::{ColumnLayout, ColumnState, SortKey};
pub use registry::ColumnId;
pub use traits::{ColumnEvent, ContentWindow, DataViewModel, Font, HeaderWindow, ViewChange};
pub use view::{ColumnMut, DataView};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::column::{
        Alignment, Bitmap, CellRenderer, Column, ColumnFlags, ColumnWidth, SortOrder, TextRenderer,
    };
    pub use crate::config::DataViewConfig;
    pub use crate::layout::ColumnLayout;
    pub use crate::registry::ColumnId;
    pub use crate::traits::{ColumnEvent, ContentWindow, DataViewModel, HeaderWindow};
    pub use crate::view::{ColumnMut, DataView};
}
