//! Escaping: properties of the shared helpers, then whole documents through every exporter.

use crate::common::export_options;
use mmd_babel::common::escape::{
    escape_markdown, escape_pre, escape_xml_attr, strip_controls, unescape_entities,
    unescape_markdown,
};
use mmd_babel::formats::mmd::parser::parse_attributes;
use mmd_babel::formats::mmd::serializer::code_quote;
use mmd_babel::model::attrs;
use mmd_babel::{Extra, ImportOptions, MindMap};
use proptest::prelude::*;

/// Printable text with Markdown and XML punctuation, tabs and newlines.
const TEXT: &str = "[a-zA-Z0-9 éß\\\\`*_{}\\[\\]()#<>+\\-.!&;\"'/\t\n]{0,40}";

proptest! {
    #[test]
    fn markdown_escaping_is_reversible(text in TEXT) {
        prop_assert_eq!(unescape_markdown(&escape_markdown(&text)), text);
    }

    #[test]
    fn escaped_markdown_has_no_line_breaks(text in TEXT) {
        prop_assert!(!escape_markdown(&text).contains('\n'));
    }

    #[test]
    fn pre_escaping_is_reversible(text in TEXT) {
        prop_assert_eq!(unescape_entities(&escape_pre(&text)), text);
    }

    #[test]
    fn xml_attributes_are_single_line(text in TEXT) {
        let escaped = escape_xml_attr(&text);
        prop_assert!(!escaped.contains(|c: char| matches!(c, '\n' | '\t' | '<' | '"')));
        prop_assert_eq!(unescape_entities(&escaped), text);
    }

    #[test]
    fn controls_never_survive(text in "\\PC{0,20}", control in "[\\x00-\\x08\\x0B\\x0C\\x0E-\\x1F]") {
        let mixed = format!("{text}{control}{text}");
        prop_assert_eq!(strip_controls(&mixed), format!("{text}{text}"));
    }

    #[test]
    fn quoted_attributes_parse_back(
        pairs in prop::collection::vec(
            ("[a-zA-Z][a-zA-Z0-9._]{0,10}", "[a-z#,= ]([a-z#,= `]{0,12}[a-z#,= ])?"),
            1..6,
        )
    ) {
        let line = pairs
            .iter()
            .map(|(key, value)| format!("{key}={}", code_quote(value)))
            .collect::<Vec<_>>()
            .join(",");
        prop_assert_eq!(parse_attributes(&line), pairs);
    }
}

const NASTY: &str = "a<b & \"c\"\nd\u{7}e";
const CLEAN: &str = "a<b & \"c\"\nde";

/// Every topic carries markup characters, a line break and a bell; the target's uid too.
fn nasty_map() -> MindMap {
    let mut map = MindMap::with_root(NASTY);
    let root = map.root();
    let target = map.create_child(root, NASTY, None).unwrap();
    let source = map.create_child(root, "source", None).unwrap();
    map.set_attribute(target, attrs::UID, "id\u{7}\"<1>").unwrap();
    map.set_extra(source, Extra::jump("id\u{7}\"<1>")).unwrap();
    map.set_extra(source, Extra::note(NASTY)).unwrap();
    map
}

fn has_raw_control(text: &str) -> bool {
    text.contains(|c: char| c.is_control() && !matches!(c, '\n' | '\t' | '\r'))
}

#[test]
fn exporters_never_emit_raw_controls() {
    let map = nasty_map();
    for format in [
        "markdown", "orgmode", "asciidoc", "plantuml", "text", "mindmup", "freemind", "mmd", "svg",
    ] {
        let bytes = mmd_babel::export(&map, format, &export_options()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(!has_raw_control(&text), "{format} leaked a control character");
    }
}

#[test]
fn markup_anchors_match_their_references() {
    let map = nasty_map();
    let export = |format| {
        String::from_utf8(mmd_babel::export(&map, format, &export_options()).unwrap()).unwrap()
    };
    let markdown = export("markdown");
    assert!(markdown.contains("<a name=\"id__1_\"></a>"));
    assert!(markdown.contains("](#id__1_)*"));
    let asciidoc = export("asciidoc");
    assert!(asciidoc.contains("[[id__1_]]"));
    assert!(asciidoc.contains("<<id__1_,"));
    let org = export("orgmode");
    assert!(org.contains(":CUSTOM_ID: sec:id__1_\n"));
    assert!(org.contains("[[#sec:id__1_]["));
}

#[test]
fn reimported_text_loses_only_the_control() {
    let map = nasty_map();
    for format in ["freemind", "mmd", "mindmup"] {
        let bytes = mmd_babel::export(&map, format, &export_options()).unwrap();
        let back = mmd_babel::import(&bytes, format, &ImportOptions::default()).unwrap();
        let root = back.root();
        assert_eq!(back[root].text(), CLEAN, "{format}");
        let target = back[root].children()[0];
        let source = back[root].children()[1];
        assert_eq!(back[target].text(), CLEAN, "{format}");
        assert_eq!(back[source].jump_target(), back[target].uid(), "{format}");
        if format != "mindmup" {
            assert_eq!(back[source].note().unwrap().text, CLEAN, "{format}");
        }
    }
}
