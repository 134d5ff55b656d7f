//! Markdown export tests
//!
//! The exported text is parsed back with comrak and checked on the resulting AST.

use crate::common::{export_options, load_fixture};
use comrak::nodes::{AstNode, NodeValue};
use comrak::{parse_document, Arena, ComrakOptions};
use mmd_babel::{Extra, MindMap};
use regex::Regex;

fn to_markdown(map: &MindMap) -> String {
    let bytes = mmd_babel::export(map, "markdown", &export_options()).unwrap();
    String::from_utf8(bytes).unwrap()
}

fn inline_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    for child in node.descendants() {
        match &child.data.borrow().value {
            NodeValue::Text(t) => text.push_str(t),
            NodeValue::Code(code) => text.push_str(&code.literal),
            _ => {}
        }
    }
    text
}

/// `(level, text)` of every heading in document order.
fn headings(markdown: &str) -> Vec<(u8, String)> {
    let arena = Arena::new();
    let root = parse_document(&arena, markdown, &ComrakOptions::default());
    root.descendants()
        .filter_map(|node| match &node.data.borrow().value {
            NodeValue::Heading(heading) => Some((heading.level, inline_text(node))),
            _ => None,
        })
        .collect()
}

fn link_urls(markdown: &str) -> Vec<String> {
    let arena = Arena::new();
    let root = parse_document(&arena, markdown, &ComrakOptions::default());
    root.descendants()
        .filter_map(|node| match &node.data.borrow().value {
            NodeValue::Link(link) => Some(link.url.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_outline_becomes_headings() {
    let markdown = to_markdown(&load_fixture("sample.mm", "freemind"));
    assert_eq!(
        headings(&markdown),
        vec![
            (2, "Travel".to_string()),
            (3, "Packing".to_string()),
            (4, "Passport".to_string()),
            (4, "Charger".to_string()),
            (3, "Route".to_string()),
            (4, "Stop at the lake".to_string()),
        ]
    );
}

#[test]
fn test_header_comment() {
    let markdown = to_markdown(&MindMap::with_root("Only"));
    assert!(markdown.starts_with("<!--\nGenerated by tests\n2024-01-02T03:04:05Z\n-->\n"));
}

#[test]
fn test_links_and_jumps_are_clickable() {
    let markdown = to_markdown(&load_fixture("sample.mm", "freemind"));
    let urls = link_urls(&markdown);
    assert!(urls.contains(&"https://example.com/route".to_string()));

    let jump = urls.iter().find(|u| u.starts_with('#')).expect("a jump link");
    let anchor = format!("<a name=\"{}\"></a>", &jump[1..]);
    let anchor_at = markdown.find(&anchor).expect("jump target anchor");
    assert!(anchor_at < markdown.find("### Packing").unwrap());
}

#[test]
fn test_markdown_punctuation_is_escaped() {
    let mut map = MindMap::with_root("1. not a list");
    let root = map.root();
    let child = map.create_child(root, "*stars* and [brackets]", None).unwrap();
    map.set_extra(child, Extra::note("# not a heading")).unwrap();

    let markdown = to_markdown(&map);
    assert_eq!(
        headings(&markdown),
        vec![
            (2, "1. not a list".to_string()),
            (3, "*stars* and [brackets]".to_string()),
        ]
    );
}

#[test]
fn test_deep_topics_use_ordinals() {
    let mut map = MindMap::with_root("R");
    let mut parent = map.root();
    for depth in 1..=7 {
        parent = map.create_child(parent, format!("level {depth}"), None).unwrap();
    }
    let markdown = to_markdown(&map);
    let found = headings(&markdown);
    assert!(found.iter().all(|(level, _)| *level <= 6));
    assert!(!found.iter().any(|(_, text)| text == "level 7"));
    let ordinal = Regex::new(r"(?m)^\*\*1(\.1)+\.\*\* level 7$").unwrap();
    assert!(ordinal.is_match(&markdown), "{markdown}");
}

#[test]
fn test_ordinals_follow_the_sibling_chain() {
    let mut map = MindMap::with_root("R");
    let mut parent = map.root();
    for depth in 1..=5 {
        parent = map.create_child(parent, format!("d{depth}"), None).unwrap();
    }
    let first = map.create_child(parent, "first", None).unwrap();
    let second = map.create_child(parent, "second", None).unwrap();
    map.create_child(second, "a", None).unwrap();
    map.create_child(second, "b", None).unwrap();
    map.create_child(first, "under first", None).unwrap();

    let markdown = to_markdown(&map);
    let ordinals: Vec<String> = Regex::new(r"(?m)^\*\*([0-9.]+)\*\* (.+)$")
        .unwrap()
        .captures_iter(&markdown)
        .map(|c| format!("{} {}", &c[1], &c[2]))
        .collect();
    assert_eq!(
        ordinals,
        vec!["1.1. first", "1.1.1. under first", "1.2. second", "1.2.1. a", "1.2.2. b"]
    );
}
