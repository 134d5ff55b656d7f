//! Native `.mmd` document format
//!
//! The editor's own Markdown-flavoured format and the only one that keeps everything: every
//! attribute, extra and code snippet survives a round trip.
//!
//! # Element Mapping Table
//!
//! | MindMap Element     | `.mmd` Equivalent                                        |
//! |---------------------|----------------------------------------------------------|
//! | Map attributes      | `> key=`value`` line in the header, before `---`          |
//! | Topic               | `#` heading, one `#` per level (root is `#`)             |
//! | Topic text          | Markdown escaped, newlines as `<br/>`                    |
//! | Attributes          | `> key=`value`,...` line under the heading               |
//! | Extra               | `- FILE` / `- LINK` / `- TOPIC` / `- NOTE` + `<pre>` body |
//! | Code snippet        | fenced block tagged with the language                    |
//! | Encrypted note      | note body plus `extras.note.encrypted*` attributes       |

pub mod parser;
pub mod serializer;

use crate::error::Result;
use crate::format::{source_text, ExportOptions, Format, ImportOptions, SerializedDocument};
use crate::model::MindMap;

/// Format implementation for native mind map documents
pub struct MmdFormat;

impl Format for MmdFormat {
    fn name(&self) -> &str {
        "mmd"
    }

    fn description(&self) -> &str {
        "Native mind map document"
    }

    fn file_extensions(&self) -> &[&str] {
        &["mmd"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &[u8], _options: &ImportOptions) -> Result<MindMap> {
        parser::parse_from_mmd(source_text(source, self.name())?)
    }

    fn serialize(&self, map: &MindMap, options: &ExportOptions) -> Result<SerializedDocument> {
        serializer::serialize_to_mmd(map, options).map(SerializedDocument::Text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{attrs, Extra, Note};

    #[test]
    fn round_trip_keeps_everything() {
        let mut map = MindMap::with_root("Root [x]");
        let root = map.root();
        let a = map.create_child(root, "A\nsecond line", None).unwrap();
        let b = map.create_child(root, "B", None).unwrap();
        let b1 = map.create_child(b, "B1 `code`", None).unwrap();
        map.set_left_sided(a, true).unwrap();
        map.set_attribute(b, attrs::FILL_COLOR, "#123456").unwrap();
        map.set_attribute(b, "custom", "with `tick` and ``two``").unwrap();
        map.set_extra(a, Extra::file("docs/a b.txt?line=3")).unwrap();
        map.set_extra(a, Extra::note("<b>\"quoted\"</b> & more")).unwrap();
        map.set_extra(b1, Extra::Note(Note::encrypted("XYZ", None))).unwrap();
        map.link_to(b1, a).unwrap();
        map.add_code_snippet(b, "sh", "echo hi\n```\nstill code").unwrap();
        map.set_map_attribute(attrs::MAP_SHOW_JUMPS, Some("true".to_string()));

        let format = MmdFormat;
        let bytes = format.serialize(&map, &ExportOptions::default()).unwrap().into_bytes();
        let back = format.parse(&bytes, &ImportOptions::default()).unwrap();

        assert_eq!(back.topic_count(), map.topic_count());
        assert_eq!(back.attribute(attrs::MAP_SHOW_JUMPS), Some("true"));
        assert_eq!(back.attribute(attrs::MAP_VERSION), Some("1.1"));
        for (original, restored) in map.iter().zip(back.iter()) {
            let (original, restored) = (&map[original], &back[restored]);
            assert_eq!(original.text(), restored.text());
            assert_eq!(original.attributes(), restored.attributes());
            assert_eq!(
                original.extras().collect::<Vec<_>>(),
                restored.extras().collect::<Vec<_>>()
            );
            assert_eq!(original.code_snippets(), restored.code_snippets());
        }
    }
}
