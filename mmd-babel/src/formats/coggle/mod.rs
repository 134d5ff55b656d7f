//! Coggle format implementation (import only)
//!
//! Coggle exports a FreeMind-like `.mm` file whose `TEXT` attributes hold Markdown. Labels
//! are parsed with `comrak`: link and image destinations are pulled out and the rest is
//! flattened to plain text. Since the extension clashes with FreeMind, this format is only
//! picked by name.
//!
//! # Element Mapping Table
//!
//! | Coggle Element               | MindMap Element                               |
//! |------------------------------|-----------------------------------------------|
//! | first `<node>` under `<map>` | Root topic                                    |
//! | `TEXT` (Markdown)            | Topic text without link and image markup      |
//! | `[text](url)`                | Link extra (first URL)                        |
//! | `![alt](url)`                | Embedded image (first one that loads)         |
//! | `<edge COLOR>`               | Fill color with contrasting text color        |
//! | `POSITION="left"`            | Left-sided root child                         |
//! | `FOLDED="true"`              | Collapsed topic                               |
//!
//! # Lossy Conversions
//!
//! - Markdown emphasis and code markers are dropped from the label
//! - Extra URLs and images are only listed in the note ("Detected URLs",
//!   "Detected image links")

use crate::common::color::Color;
use crate::common::images;
use crate::error::{FormatError, Result};
use crate::format::{source_text, Format, ImportOptions};
use crate::formats::common::{append_to_note, detected_section, first_resolved, set_fill_with_contrast};
use crate::formats::freemind::parser::{element_children, parse_xml};
use crate::model::{attrs, Extra, MindMap, MmUri, TopicId};
use comrak::nodes::{AstNode, NodeValue};
use comrak::{parse_document, Arena, ComrakOptions};
use roxmltree::Node;

const FORMAT: &str = "coggle";

/// A Markdown label split into plain text and the destinations it referenced.
#[derive(Debug, Default, PartialEq, Eq)]
struct Label {
    text: String,
    links: Vec<String>,
    images: Vec<String>,
}

fn flatten<'a>(node: &'a AstNode<'a>, label: &mut Label) {
    match &node.data.borrow().value {
        NodeValue::Text(text) => label.text.push_str(text),
        NodeValue::Code(code) => label.text.push_str(&code.literal),
        NodeValue::HtmlInline(html) => label.text.push_str(html),
        NodeValue::SoftBreak | NodeValue::LineBreak => label.text.push('\n'),
        NodeValue::Link(link) => label.links.push(link.url.clone()),
        NodeValue::Image(link) => label.images.push(link.url.clone()),
        value => {
            if value.block() && !label.text.is_empty() && !label.text.ends_with('\n') {
                label.text.push('\n');
            }
        }
    }
    for child in node.children() {
        flatten(child, label);
    }
}

fn parse_label(markdown: &str) -> Label {
    let arena = Arena::new();
    let root = parse_document(&arena, markdown, &ComrakOptions::default());
    let mut label = Label::default();
    flatten(root, &mut label);
    label.text = label.text.trim_end_matches('\n').replace('\r', "");
    label
}

struct CoggleReader<'o> {
    options: &'o ImportOptions,
    map: MindMap,
}

impl CoggleReader<'_> {
    fn node(&mut self, node: Node<'_, '_>, topic: TopicId) -> Result<()> {
        let label = parse_label(node.attribute("TEXT").unwrap_or_default());
        self.map.set_text(topic, label.text)?;

        let image = first_resolved(&label.images, |url| {
            images::load(self.options.resources.as_ref(), url, FORMAT)
        });
        if let Some(image) = &image.value {
            images::attach(&mut self.map, topic, image, None)?;
        }
        let link = first_resolved(&label.links, |url| {
            (!url.trim().is_empty()).then(|| MmUri::parse(url))
        });
        if let Some(uri) = link.value {
            self.map.set_extra(topic, Extra::Link(uri))?;
        }
        if link.ambiguous {
            append_to_note(&mut self.map, topic, &detected_section("Detected URLs", &label.links))?;
        }
        if image.ambiguous {
            append_to_note(
                &mut self.map,
                topic,
                &detected_section("Detected image links", &label.images),
            )?;
        }

        let parent_is_root = self.map[topic].parent() == Some(self.map.root());
        let attribute = |name: &str| node.attribute(name).map(str::trim).unwrap_or_default();
        if parent_is_root && attribute("POSITION").eq_ignore_ascii_case("left") {
            self.map.set_left_sided(topic, true)?;
        }
        if attribute("FOLDED").eq_ignore_ascii_case("true") {
            self.map.set_attribute(topic, attrs::COLLAPSED, "true")?;
        }
        if let Some(color) = element_children(node, "edge")
            .filter_map(|e| e.attribute("COLOR"))
            .last()
            .and_then(Color::parse)
        {
            set_fill_with_contrast(&mut self.map, topic, color)?;
        }

        for child in element_children(node, "node") {
            let id = self.map.create_child(topic, "", None)?;
            self.node(child, id)?;
        }
        Ok(())
    }
}

pub fn parse_from_coggle(source: &str, options: &ImportOptions) -> Result<MindMap> {
    let document = parse_xml(source, FORMAT)?;
    let root = document.root_element();
    if !root.has_tag_name("map") {
        return Err(FormatError::unsupported(FORMAT, "file is not a Coggle mind map"));
    }
    let mut reader = CoggleReader {
        options,
        map: MindMap::with_root("Empty"),
    };
    if let Some(node) = element_children(root, "node").next() {
        let map_root = reader.map.root();
        reader.node(node, map_root)?;
    }
    tracing::debug!(topics = reader.map.topic_count(), "coggle import finished");
    Ok(reader.map)
}

/// Format implementation for Coggle
pub struct CoggleFormat;

impl Format for CoggleFormat {
    fn name(&self) -> &str {
        "coggle"
    }

    fn description(&self) -> &str {
        "Coggle mind map (.mm with Markdown labels)"
    }

    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn parse(&self, source: &[u8], options: &ImportOptions) -> Result<MindMap> {
        parse_from_coggle(source_text(source, self.name())?, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::NoResources;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use std::sync::Arc;

    fn import(source: &str) -> Result<MindMap> {
        let options = ImportOptions::default().with_resources(Arc::new(NoResources));
        parse_from_coggle(source, &options)
    }

    #[test]
    fn labels_lose_link_markup() {
        let label = parse_label("See [the docs](https://docs.rs) and ![logo](https://x.org/l.png) now");
        assert_eq!(label.text, "See the docs and logo now");
        assert_eq!(label.links, vec!["https://docs.rs"]);
        assert_eq!(label.images, vec!["https://x.org/l.png"]);

        let label = parse_label("two\nlines");
        assert_eq!(label.text, "two\nlines");
    }

    #[test]
    fn reads_tree_sides_and_edge_colors() {
        let map = import(
            r##"<map version="0.9.0">
              <node TEXT="Central">
                <node TEXT="Left" POSITION="left" FOLDED="true"><edge COLOR="#ffffff"/>
                  <node TEXT="Deep" POSITION="left"/>
                </node>
                <node TEXT="Right" POSITION="right"/>
              </node>
            </map>"##,
        )
        .unwrap();
        let root = map.root();
        assert_eq!(map[root].text(), "Central");
        let kids = map[root].children().to_vec();
        assert!(map.is_left_sided(kids[0]));
        assert!(!map.is_left_sided(kids[1]));
        assert!(map[kids[0]].is_collapsed());
        assert_eq!(map[kids[0]].attribute(attrs::FILL_COLOR), Some("#FFFFFF"));
        assert_eq!(map[kids[0]].attribute(attrs::TEXT_COLOR), Some("#000000"));
        let deep = map[kids[0]].children()[0];
        assert!(map[deep].attribute(attrs::LEFT_SIDE).is_none());
    }

    #[test]
    fn extra_urls_and_unloadable_images_go_to_the_note() {
        let map = import(
            r#"<map><node TEXT="[a](https://a.org) [b](https://b.org) ![p](https://img.org/p.png)"/></map>"#,
        )
        .unwrap();
        let root = &map[map.root()];
        assert_eq!(root.link().unwrap().to_string(), "https://a.org");
        assert!(root.attribute(attrs::IMAGE).is_none());
        assert_eq!(
            root.note().unwrap().text,
            "Detected URLs\n---------------\nhttps://a.org\nhttps://b.org\n\n\
             Detected image links\n---------------\nhttps://img.org/p.png"
        );
    }

    #[test]
    fn inline_images_are_embedded() {
        let png = STANDARD.encode(crate::common::images::tiny_png());
        let map = import(&format!(
            r#"<map><node TEXT="![dot](data:image/png;base64,{png})"/></map>"#
        ))
        .unwrap();
        let root = &map[map.root()];
        assert_eq!(root.text(), "dot");
        assert!(root.attribute(attrs::IMAGE).is_some());
        assert!(root.note().is_none());
    }

    #[test]
    fn empty_and_foreign_documents() {
        let map = import("<map/>").unwrap();
        assert_eq!(map[map.root()].text(), "Empty");
        let err = import("<workbook/>").unwrap_err();
        assert!(matches!(err, FormatError::UnsupportedFormat { .. }));
    }
}
