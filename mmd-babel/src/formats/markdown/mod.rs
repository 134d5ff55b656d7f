//! Markdown format implementation
//!
//! This module implements MindMap → CommonMark Markdown export.
//!
//! # Element Mapping Table
//!
//! | MindMap Element   | Markdown Equivalent                | Notes                                  |
//! |-------------------|------------------------------------|----------------------------------------|
//! | Root topic        | `## text`                          | Level 0 maps to h2                     |
//! | Topic             | `#` × (level + 2), capped at h6    | Up to `max_heading_depth`              |
//! | Deep topic        | `**1.2.3.** text`                  | Ordinal from the ancestor index chain  |
//! | Jump target       | `<a name="anchor"></a>`            | Only topics some jump points at        |
//! | File extra        | `> File: [name:line](path)`        | Relative to the export base folder     |
//! | Link extra        | `> Url: [url](ascii-url)`          |                                        |
//! | Topic jump        | `*Related to: [text](#anchor)*`    | Dropped when the target is missing     |
//! | Note              | Block quote                        | Encrypted notes are skipped            |
//! | Code snippet      | Fenced block with language         |                                        |
//!
//! # Lossy Conversions
//!
//! - Attributes (colors, fold state, images) are not exported
//! - Heading text is single line: newlines become `<br/>`
//! - Control characters other than tab are dropped
//! - Anchors are the target uid reduced to `[A-Za-z0-9_-]`, with a `-N` suffix on clashes
//!
//! # Testing
//!
//! Unit tests live next to the serializer. Integration tests in `tests/markdown/` parse the
//! output back with `comrak` and check the resulting heading structure.

pub mod serializer;

use crate::error::Result;
use crate::format::{ExportOptions, Format, SerializedDocument};
use crate::model::MindMap;

/// Format implementation for Markdown
pub struct MarkdownFormat;

impl Format for MarkdownFormat {
    fn name(&self) -> &str {
        "markdown"
    }

    fn description(&self) -> &str {
        "CommonMark Markdown outline"
    }

    fn file_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, map: &MindMap, options: &ExportOptions) -> Result<SerializedDocument> {
        serializer::serialize_to_markdown(map, options).map(SerializedDocument::Text)
    }
}
