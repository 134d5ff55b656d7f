//! FreeMind format implementation
//!
//! FreeMind `.mm` is the only format that round-trips the whole outline: text, sibling order,
//! branch side, colors and every extra survive `export` followed by `import`.
//!
//! # Element Mapping Table
//!
//! | MindMap Element   | FreeMind Equivalent                              |
//! |-------------------|--------------------------------------------------|
//! | Topic             | `<node TEXT=".." ID="mmlink..">`                 |
//! | Left-sided topic  | `POSITION="left"` (level 1 only)                 |
//! | Text / fill color | `COLOR` / `BACKGROUND_COLOR`                     |
//! | Topic jump        | `LINK="#id"` plus `<arrowlink DESTINATION="id">` |
//! | File or link      | `LINK` when free, else `<li>` in the note HTML   |
//! | Note              | `<richcontent TYPE="NOTE">` with a `<pre>` block |
//!
//! # Lossy Conversions
//!
//! - Code snippets, images and alignment are not exported
//! - Jumps survive but the target receives a fresh UID on import
//! - Encrypted notes are skipped

pub mod parser;
pub mod serializer;

use crate::error::Result;
use crate::format::{source_text, ExportOptions, Format, ImportOptions, SerializedDocument};
use crate::model::MindMap;

/// Format implementation for FreeMind
pub struct FreeMindFormat;

impl Format for FreeMindFormat {
    fn name(&self) -> &str {
        "freemind"
    }

    fn description(&self) -> &str {
        "FreeMind XML mind map"
    }

    fn file_extensions(&self) -> &[&str] {
        &["mm"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &[u8], options: &ImportOptions) -> Result<MindMap> {
        parser::parse_from_freemind(source_text(source, self.name())?, options)
    }

    fn serialize(&self, map: &MindMap, options: &ExportOptions) -> Result<SerializedDocument> {
        serializer::serialize_to_freemind(map, options).map(SerializedDocument::Text)
    }
}
