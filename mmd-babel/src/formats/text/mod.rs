//! Plain text format implementation
//!
//! Export writes an indented, underlined outline (see [`serializer`]). Import reads any
//! indented list of lines (see [`parser`]); everything but the text and the branch side is
//! lost on the way back.

pub mod parser;
pub mod serializer;

use crate::error::Result;
use crate::format::{source_text, ExportOptions, Format, ImportOptions, SerializedDocument};
use crate::model::MindMap;

/// Format implementation for plain indented text
pub struct TextFormat;

impl Format for TextFormat {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Plain indented text outline"
    }

    fn file_extensions(&self) -> &[&str] {
        &["txt"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &[u8], _options: &ImportOptions) -> Result<MindMap> {
        parser::parse_from_text(source_text(source, self.name())?)
    }

    fn serialize(&self, map: &MindMap, options: &ExportOptions) -> Result<SerializedDocument> {
        serializer::serialize_to_text(map, options).map(SerializedDocument::Text)
    }
}
