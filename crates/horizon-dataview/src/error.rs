//! Error types for data views.
//!
//! Column and sort operations never return these: they fail soft with
//! `None`, `-1` or `false`. Errors only come from loading configuration and
//! from saving or restoring column layouts.

use std::path::PathBuf;

/// Result type alias for data view operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring a view or restoring its layout.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file could not be parsed.
    #[error("Invalid data view configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration could not be written out.
    #[error("Failed to serialize data view configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Column layout could not be (de)serialized.
    #[error("Invalid column layout: {0}")]
    Layout(#[from] serde_json::Error),

    /// File I/O error.
    #[error("Failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A saved layout mentions a model column that no column displays.
    #[error("Layout refers to model column {model_column}, which no column displays")]
    UnknownModelColumn { model_column: usize },

    /// A saved layout mentions a model column more often than columns
    /// display it.
    #[error("Layout lists model column {model_column} more often than columns display it")]
    DuplicateModelColumn { model_column: usize },

    /// A saved layout sorts by a column that is not sortable.
    #[error("Layout sorts by model column {model_column}, which is not sortable")]
    NotSortable { model_column: usize },

    /// The model does not support the sort mode a saved layout asks for.
    #[error("Model does not support sorting by multiple columns")]
    MultiColumnSortRejected,
}

impl Error {
    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
