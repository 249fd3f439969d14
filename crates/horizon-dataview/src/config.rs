//! Data view configuration.
//!
//! Settings can be built in code or loaded from TOML. Missing keys fall back
//! to the defaults:
//!
//! ```toml
//! default_column_width = 80
//! allow_multi_column_sort = false
//! show_header = true
//! indent = 15
//! # row_height = 22
//! ```

use std::path::Path;

use horizon_dataview_core::logging::targets;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Width used for columns whose width is [`ColumnWidth::Default`](crate::ColumnWidth::Default).
pub const DEFAULT_COLUMN_WIDTH: u32 = 80;

/// Default tree indentation per level, in pixels.
pub const DEFAULT_INDENT: u32 = 15;

/// Settings for a [`DataView`](crate::DataView).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataViewConfig {
    /// Pixel width of columns using the default width.
    pub default_column_width: u32,
    /// Whether more than one column may be a sort key at a time.
    pub allow_multi_column_sort: bool,
    /// Whether the header window is shown (and notified).
    pub show_header: bool,
    /// Tree indentation per level, in pixels.
    pub indent: u32,
    /// Fixed row height in pixels, or `None` to derive it from the font.
    pub row_height: Option<u32>,
}

impl Default for DataViewConfig {
    fn default() -> Self {
        Self {
            default_column_width: DEFAULT_COLUMN_WIDTH,
            allow_multi_column_sort: false,
            show_header: true,
            indent: DEFAULT_INDENT,
            row_height: None,
        }
    }
}

impl DataViewConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        tracing::debug!(target: targets::CONFIG, ?config, "loaded data view configuration");
        Ok(config)
    }

    /// Reads a configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Serializes the configuration to TOML text.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Sets whether multi-column sorting is allowed using builder pattern.
    pub fn with_multi_column_sort(mut self, allow: bool) -> Self {
        self.allow_multi_column_sort = allow;
        self
    }

    /// Sets the default column width using builder pattern.
    pub fn with_default_column_width(mut self, width: u32) -> Self {
        self.default_column_width = width;
        self
    }

    /// Sets whether the header is shown using builder pattern.
    pub fn with_header(mut self, show: bool) -> Self {
        self.show_header = show;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DataViewConfig::default();
        assert_eq!(config.default_column_width, 80);
        assert!(!config.allow_multi_column_sort);
        assert!(config.show_header);
        assert_eq!(config.indent, 15);
        assert_eq!(config.row_height, None);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = DataViewConfig::from_toml_str("allow_multi_column_sort = true\nrow_height = 22\n")
            .unwrap();
        assert!(config.allow_multi_column_sort);
        assert_eq!(config.row_height, Some(22));
        assert_eq!(config.default_column_width, DEFAULT_COLUMN_WIDTH);
    }

    #[test]
    fn test_invalid_toml() {
        let err = DataViewConfig::from_toml_str("indent = \"wide\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = DataViewConfig::default()
            .with_multi_column_sort(true)
            .with_default_column_width(120);
        let text = config.to_toml_string().unwrap();
        assert_eq!(DataViewConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "show_header = false").unwrap();
        let config = DataViewConfig::from_toml_file(file.path()).unwrap();
        assert!(!config.show_header);

        let missing = DataViewConfig::from_toml_file("/nonexistent/dataview.toml").unwrap_err();
        assert!(matches!(missing, Error::Io { .. }));
    }
}
