//! Format trait definition
//!
//! This module defines the core Format trait that all format implementations must implement,
//! together with the option bags passed to imports and exports.

use crate::error::{FormatError, Result};
use crate::layout::LayoutOracle;
use crate::model::MindMap;
use crate::resources::{FsResourceLoader, ResourceLoader};
use crate::theme::Theme;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Serialized output produced by a [`Format`] implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerializedDocument {
    /// UTF-8 text output (e.g., markdown, FreeMind XML)
    Text(String),
    /// Binary output (e.g., PNG)
    Binary(Vec<u8>),
}

impl SerializedDocument {
    /// Consume the serialized output and return the underlying bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            SerializedDocument::Text(text) => text.into_bytes(),
            SerializedDocument::Binary(bytes) => bytes,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SerializedDocument::Text(text) => Some(text),
            SerializedDocument::Binary(_) => None,
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, SerializedDocument::Binary(_))
    }
}

/// Export settings shared by all exporters.
#[derive(Clone)]
pub struct ExportOptions {
    /// Deepest level rendered as a native heading; deeper topics use ordinal pseudo-headings.
    pub max_heading_depth: usize,
    /// Render folded branches too (SVG/PNG).
    pub unfold_all: bool,
    /// Paint the paper color behind the diagram (SVG/PNG).
    pub draw_background: bool,
    /// Folder file references are made relative to.
    pub base_folder: Option<PathBuf>,
    pub generator: String,
    pub generated_at: OffsetDateTime,
    pub theme: Theme,
    /// Geometry provider for the renderers. `None` uses the built-in tree layout.
    pub layout: Option<Arc<dyn LayoutOracle>>,
    /// Format specific parameters (`--extra-<key> <value>` on the command line).
    pub extra: HashMap<String, String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            max_heading_depth: 5,
            unfold_all: false,
            draw_background: true,
            base_folder: None,
            generator: format!("mmd-babel {}", env!("CARGO_PKG_VERSION")),
            generated_at: OffsetDateTime::now_utc(),
            theme: Theme::default(),
            layout: None,
            extra: HashMap::new(),
        }
    }
}

impl ExportOptions {
    /// Fold free-form parameters into the typed options. Unknown keys stay in `extra`.
    pub fn with_params(mut self, params: &HashMap<String, String>) -> Result<Self> {
        if let Some(depth) = params.get("max-heading-depth") {
            self.max_heading_depth = depth.trim().parse().map_err(|_| {
                FormatError::NotSupported(format!(
                    "Invalid value '{depth}' for parameter 'max-heading-depth' (expected a number)"
                ))
            })?;
        }
        self.unfold_all = parse_bool_flag(params, "unfold-all", self.unfold_all)?;
        self.draw_background = parse_bool_flag(params, "draw-background", self.draw_background)?;
        if let Some(generator) = params.get("generator") {
            self.generator = generator.clone();
        }
        self.extra.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(self)
    }

    pub fn flag(&self, key: &str, default: bool) -> Result<bool> {
        parse_bool_flag(&self.extra, key, default)
    }

    /// Export time as RFC 3339.
    pub fn timestamp(&self) -> String {
        self.generated_at
            .format(&Rfc3339)
            .unwrap_or_else(|_| self.generated_at.unix_timestamp().to_string())
    }

    pub fn timestamp_millis(&self) -> i128 {
        self.generated_at.unix_timestamp_nanos() / 1_000_000
    }
}

/// Import settings shared by all importers.
#[derive(Clone)]
pub struct ImportOptions {
    /// Folder of the source document; relative references resolve against it.
    pub base_folder: Option<PathBuf>,
    pub resources: Arc<dyn ResourceLoader>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            base_folder: None,
            resources: Arc::new(FsResourceLoader::new(None)),
        }
    }
}

impl ImportOptions {
    pub fn with_base_folder(folder: impl Into<PathBuf>) -> Self {
        let folder = folder.into();
        Self {
            resources: Arc::new(FsResourceLoader::new(Some(folder.clone()))),
            base_folder: Some(folder),
        }
    }

    pub fn with_resources(mut self, resources: Arc<dyn ResourceLoader>) -> Self {
        self.resources = resources;
        self
    }
}

/// Trait for mind map formats
///
/// Implementors convert between bytes and a [`MindMap`]. Formats can support parsing,
/// serialization, or both.
///
/// # Examples
///
/// ```ignore
/// struct MyFormat;
///
/// impl Format for MyFormat {
///     fn name(&self) -> &str {
///         "my-format"
///     }
///
///     fn supports_serialization(&self) -> bool {
///         true
///     }
///
///     fn serialize(&self, map: &MindMap, options: &ExportOptions) -> Result<SerializedDocument> {
///         Ok(SerializedDocument::Text(map[map.root()].text().to_string()))
///     }
/// }
/// ```
pub trait Format: Send + Sync {
    /// The name of this format (e.g., "freemind", "markdown")
    fn name(&self) -> &str;

    /// Optional description of this format
    fn description(&self) -> &str {
        ""
    }

    /// File extensions associated with this format (e.g., ["mm"], ["md", "markdown"])
    ///
    /// Returns a slice of file extensions without the leading dot.
    /// Used for automatic format detection from filenames.
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    /// Whether this format supports parsing (bytes → MindMap)
    fn supports_parsing(&self) -> bool {
        false
    }

    /// Whether this format supports serialization (MindMap → bytes)
    fn supports_serialization(&self) -> bool {
        false
    }

    /// Parse source bytes into a MindMap
    ///
    /// Default implementation returns NotSupported error.
    fn parse(&self, _source: &[u8], _options: &ImportOptions) -> Result<MindMap> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support parsing",
            self.name()
        )))
    }

    /// Serialize a MindMap
    ///
    /// Default implementation returns NotSupported error.
    fn serialize(&self, _map: &MindMap, _options: &ExportOptions) -> Result<SerializedDocument> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support serialization",
            self.name()
        )))
    }
}

/// Decode source bytes as UTF-8 text, dropping a leading byte order mark.
pub(crate) fn source_text<'a>(source: &'a [u8], format: &str) -> Result<&'a str> {
    let text = std::str::from_utf8(source)
        .map_err(|e| FormatError::malformed_at(format, "input is not valid UTF-8", format!("byte {}", e.valid_up_to())))?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
}

pub(crate) fn parse_bool_flag(
    options: &HashMap<String, String>,
    key: &str,
    default: bool,
) -> Result<bool> {
    if let Some(value) = options.get(key) {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(FormatError::NotSupported(format!(
                "Invalid value '{other}' for parameter '{key}' (expected true/false)"
            ))),
        }
    } else {
        Ok(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_update_typed_options() {
        let mut params = HashMap::new();
        params.insert("unfold-all".to_string(), "true".to_string());
        params.insert("max-heading-depth".to_string(), "3".to_string());
        params.insert("custom".to_string(), "x".to_string());
        let options = ExportOptions::default().with_params(&params).unwrap();
        assert!(options.unfold_all);
        assert_eq!(options.max_heading_depth, 3);
        assert_eq!(options.extra.get("custom").map(String::as_str), Some("x"));
    }

    #[test]
    fn bad_flag_values_are_rejected() {
        let mut params = HashMap::new();
        params.insert("draw-background".to_string(), "maybe".to_string());
        assert!(ExportOptions::default().with_params(&params).is_err());
    }

    #[test]
    fn empty_flag_means_true() {
        let mut params = HashMap::new();
        params.insert("unfold-all".to_string(), String::new());
        assert!(parse_bool_flag(&params, "unfold-all", false).unwrap());
        assert!(!parse_bool_flag(&params, "other", false).unwrap());
    }

    #[test]
    fn source_text_strips_bom() {
        assert_eq!(source_text("\u{feff}abc".as_bytes(), "text").unwrap(), "abc");
        assert!(source_text(&[0xff, 0xfe], "text").is_err());
    }
}
