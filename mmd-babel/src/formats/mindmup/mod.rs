//! Mindmup format implementation
//!
//! # Element Mapping Table
//!
//! | MindMap Element   | Mindmup Equivalent                                   |
//! |-------------------|------------------------------------------------------|
//! | Topic             | idea object (`title`, `id`, `attr`, `ideas`)          |
//! | Sibling order     | numeric key in the parent's `ideas`                  |
//! | Left-sided topic  | negative key (root children only)                    |
//! | Fill color        | `attr.style.background`                              |
//! | Note              | `attr.note.text`                                     |
//! | Image             | `attr.icon` with a PNG data URL                      |
//! | File / link       | `attachment` HTML with `FILE:` / `LINK:` anchors     |
//! | Topic jump        | top level `links[]` entry (`ideaIdFrom`, `ideaIdTo`) |
//!
//! # Lossy Conversions
//!
//! - Code snippets and alignment are not exported
//! - On import the text color is derived from the fill color

pub mod parser;
pub mod serializer;

use crate::error::Result;
use crate::format::{source_text, ExportOptions, Format, ImportOptions, SerializedDocument};
use crate::model::MindMap;

/// Format implementation for Mindmup
pub struct MindmupFormat;

impl Format for MindmupFormat {
    fn name(&self) -> &str {
        "mindmup"
    }

    fn description(&self) -> &str {
        "Mindmup JSON mind map"
    }

    fn file_extensions(&self) -> &[&str] {
        &["mup"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &[u8], options: &ImportOptions) -> Result<MindMap> {
        parser::parse_from_mindmup(source_text(source, self.name())?, options)
    }

    fn serialize(&self, map: &MindMap, options: &ExportOptions) -> Result<SerializedDocument> {
        serializer::serialize_to_mindmup(map, options).map(SerializedDocument::Text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Extra;

    #[test]
    fn export_then_import_keeps_sides_and_jumps() {
        let mut map = MindMap::with_root("Root");
        let root = map.root();
        let a = map.create_child(root, "A", None).unwrap();
        let b = map.create_child(root, "B", None).unwrap();
        let c = map.create_child(root, "C", None).unwrap();
        map.set_left_sided(b, true).unwrap();
        map.link_to(c, a).unwrap();
        map.set_extra(a, Extra::file("notes/a.md")).unwrap();

        let format = MindmupFormat;
        let bytes = format.serialize(&map, &ExportOptions::default()).unwrap().into_bytes();
        let back = format.parse(&bytes, &ImportOptions::default()).unwrap();

        let kids = back[back.root()].children().to_vec();
        let titles: Vec<&str> = kids.iter().map(|k| back[*k].text()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
        assert!(back.is_left_sided(kids[1]));
        assert_eq!(back[kids[0]].file().unwrap().path(), "notes/a.md");
        assert_eq!(back[kids[2]].jump_target(), back[kids[0]].uid());
    }
}
