//! Format registry for format discovery and selection
//!
//! This module provides a centralized registry for all available formats.
//! Formats can be registered and retrieved by name, or detected from a file name.

use crate::error::{FormatError, Result};
use crate::format::{ExportOptions, Format, ImportOptions, SerializedDocument};
use crate::model::MindMap;
use std::collections::HashMap;

/// Registry of mind map formats
///
/// # Examples
///
/// ```ignore
/// let registry = FormatRegistry::default();
/// let map = registry.parse(&bytes, "freemind", &ImportOptions::default())?;
/// let markdown = registry.serialize(&map, "markdown", &ExportOptions::default())?;
/// ```
pub struct FormatRegistry {
    formats: HashMap<String, Box<dyn Format>>,
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        FormatRegistry {
            formats: HashMap::new(),
        }
    }

    /// Register a format
    ///
    /// If a format with the same name already exists, it will be replaced.
    pub fn register<F: Format + 'static>(&mut self, format: F) {
        self.formats
            .insert(format.name().to_string(), Box::new(format));
    }

    /// Get a format by name
    pub fn get(&self, name: &str) -> Result<&dyn Format> {
        self.formats
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| FormatError::FormatNotFound(name.to_string()))
    }

    /// Check if a format exists
    pub fn has(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// List all available format names (sorted)
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formats.keys().cloned().collect();
        names.sort();
        names
    }

    /// All registered formats, sorted by name.
    pub fn formats(&self) -> Vec<&dyn Format> {
        let mut formats: Vec<&dyn Format> = self.formats.values().map(|f| f.as_ref()).collect();
        formats.sort_by(|a, b| a.name().cmp(b.name()));
        formats
    }

    /// Detect format from filename based on file extension
    ///
    /// Extensions are compared without regard to case. Formats without extensions (Coggle)
    /// are never detected and must be named explicitly.
    pub fn detect_format_from_filename(&self, filename: &str) -> Option<String> {
        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())?
            .to_ascii_lowercase();

        self.formats
            .values()
            .find(|format| format.file_extensions().contains(&extension.as_str()))
            .map(|format| format.name().to_string())
    }

    /// Parse source bytes using the specified format
    pub fn parse(&self, source: &[u8], format: &str, options: &ImportOptions) -> Result<MindMap> {
        let fmt = self.get(format)?;
        if !fmt.supports_parsing() {
            return Err(FormatError::NotSupported(format!(
                "Format '{format}' does not support parsing"
            )));
        }
        tracing::debug!(format, bytes = source.len(), "import");
        fmt.parse(source, options)
    }

    /// Serialize a map using the specified format
    pub fn serialize(
        &self,
        map: &MindMap,
        format: &str,
        options: &ExportOptions,
    ) -> Result<SerializedDocument> {
        let fmt = self.get(format)?;
        if !fmt.supports_serialization() {
            return Err(FormatError::NotSupported(format!(
                "Format '{format}' does not support serialization"
            )));
        }
        tracing::debug!(format, topics = map.topic_count(), "export");
        fmt.serialize(map, options)
    }

    /// Serialize to text, rejecting formats with binary output.
    pub fn serialize_text(&self, map: &MindMap, format: &str, options: &ExportOptions) -> Result<String> {
        match self.serialize(map, format, options)? {
            SerializedDocument::Text(text) => Ok(text),
            SerializedDocument::Binary(_) => Err(FormatError::Serialization(format!(
                "Format '{format}' produced binary output when text was expected"
            ))),
        }
    }

    /// Create a registry with default formats
    pub fn with_defaults() -> Self {
        use crate::formats::*;

        let mut registry = Self::new();
        registry.register(MarkdownFormat);
        registry.register(OrgModeFormat);
        registry.register(AsciiDocFormat);
        registry.register(TextFormat);
        registry.register(PlantUmlFormat);
        registry.register(FreeMindFormat);
        registry.register(MindmupFormat);
        registry.register(XMindFormat);
        registry.register(NovamindFormat);
        registry.register(CoggleFormat);
        registry.register(MmdFormat);
        registry.register(SvgFormat);
        registry.register(PngFormat);
        registry.register(TreevizFormat);
        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
