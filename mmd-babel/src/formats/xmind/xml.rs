//! Legacy `content.xml` reader, with topic colors taken from `styles.xml`.

use super::{XMindReader, XMindStyle, FORMAT};
use crate::common::archive::Archive;
use crate::common::color::Color;
use crate::error::{FormatError, Result};
use crate::formats::freemind::parser::{self, element_children, parse_xml};
use crate::model::{attrs, MindMap, TopicId};
use roxmltree::Node;
use std::collections::HashMap;

/// Attribute lookup by local name, whatever the namespace prefix (`xlink:href`, `svg:fill`).
fn attr<'a>(node: Node<'a, '_>, local: &str) -> Option<&'a str> {
    node.attributes()
        .find(|a| a.name() == local)
        .map(|a| a.value())
        .filter(|v| !v.is_empty())
}

fn text_content(node: Node<'_, '_>) -> String {
    parser::text_content(node).replace('\r', "")
}

/// Topic styles by id. An unreadable `styles.xml` only costs the colors.
fn load_styles(archive: &Archive) -> HashMap<String, XMindStyle> {
    let mut styles = HashMap::new();
    let source = match archive.text("styles.xml", FORMAT) {
        Ok(Some(source)) => source,
        Ok(None) => return styles,
        Err(e) => {
            tracing::warn!(error = %e, "can't read xmind styles");
            return styles;
        }
    };
    let document = match parse_xml(source, FORMAT) {
        Ok(document) => document,
        Err(e) => {
            tracing::warn!(error = %e, "can't parse xmind styles");
            return styles;
        }
    };
    let root = document.root_element();
    if root.tag_name().name() != "xmap-styles" {
        return styles;
    }
    for style in element_children(root, "styles").flat_map(|s| element_children(s, "style")) {
        let Some(id) = attr(style, "id") else { continue };
        if attr(style, "type") != Some("topic") {
            continue;
        }
        let mut parsed = XMindStyle::default();
        for props in element_children(style, "topic-properties") {
            let color = |key| attr(props, key).and_then(Color::parse);
            parsed = XMindStyle {
                fill: color("fill"),
                text: color("color"),
                border: color("border-line-color"),
            };
        }
        styles.insert(id.to_string(), parsed);
    }
    styles
}

fn note_of(topic: Node<'_, '_>) -> String {
    let mut result = String::new();
    for notes in element_children(topic, "notes") {
        let part = |tag| element_children(notes, tag).map(text_content).collect::<String>();
        let (plain, html) = (part("plain"), part("html"));
        if !result.is_empty() {
            result.push('\n');
        }
        result.push_str(if plain.is_empty() { &html } else { &plain });
    }
    result
}

impl XMindReader<'_> {
    fn xml_topic(
        &mut self,
        node: Node<'_, '_>,
        topic: TopicId,
        styles: &HashMap<String, XMindStyle>,
    ) -> Result<()> {
        let title = element_children(node, "title").next().map(text_content).unwrap_or_default();
        self.map.set_text(topic, title)?;
        self.register(attr(node, "id"), topic);

        if let Some(style) = attr(node, "style-id").and_then(|id| styles.get(id)) {
            self.style(topic, *style)?;
        }
        if attr(node, "branch") == Some("folded") {
            self.map.set_attribute(topic, attrs::COLLAPSED, "true")?;
        }
        if let Some(src) = element_children(node, "img")
            .filter_map(|img| attr(img, "src"))
            .find(|src| src.starts_with("xap:"))
        {
            self.image(topic, src)?;
        }
        if let Some(href) = attr(node, "href") {
            self.href(topic, href)?;
        }
        self.note(topic, &note_of(node))?;

        let children: Vec<Node<'_, '_>> = element_children(node, "children")
            .flat_map(|c| element_children(c, "topics"))
            .flat_map(|t| element_children(t, "topic"))
            .collect();
        for child in children {
            let id = self.map.create_child(topic, "", None)?;
            self.xml_topic(child, id, styles)?;
        }
        Ok(())
    }
}

pub(super) fn parse(content: &str, archive: &Archive) -> Result<MindMap> {
    let document = parse_xml(content, FORMAT)?;
    let root = document.root_element();
    if root.tag_name().name() != "xmap-content" {
        return Err(FormatError::unsupported(
            FORMAT,
            format!("unexpected root element <{}>", root.tag_name().name()),
        ));
    }
    let styles = load_styles(archive);

    let mut reader = XMindReader::new(archive);
    let map_root = reader.map.root();
    let Some(sheet) = element_children(root, "sheet").next() else {
        reader.map.set_text(map_root, "Empty")?;
        return reader.finish();
    };
    match element_children(sheet, "topic").next() {
        Some(topic) => reader.xml_topic(topic, map_root, &styles)?,
        None => reader.map.set_text(map_root, "Empty sheet")?,
    }

    for relation in element_children(sheet, "relationships")
        .flat_map(|r| element_children(r, "relationship"))
    {
        if let (Some(from), Some(to)) = (attr(relation, "end1"), attr(relation, "end2")) {
            reader.relationship(from, to);
        }
    }
    reader.finish()
}

#[cfg(test)]
mod tests {
    use super::super::XMindFormat;
    use crate::common::archive::build_zip;
    use crate::error::FormatError;
    use crate::format::{Format, ImportOptions};
    use crate::model::attrs;

    const CONTENT: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<xmap-content xmlns="urn:xmind:xmap:xmlns:content:2.0" xmlns:xlink="http://www.w3.org/1999/xlink"
    xmlns:xhtml="http://www.w3.org/1999/xhtml" version="2.0">
  <sheet id="s1">
    <topic id="root" style-id="st1">
      <title>Central</title>
      <children><topics type="attached">
        <topic id="a" xlink:href="xmind:#b"><title>Alpha</title>
          <notes><plain>first line</plain><html><xhtml:p>ignored</xhtml:p></html></notes>
        </topic>
        <topic id="b" branch="folded"><title>Beta</title>
          <notes><html><xhtml:p>html only</xhtml:p></html></notes>
        </topic>
        <topic id="c" xlink:href="https://example.com/page"><title>Gamma</title></topic>
      </topics></children>
    </topic>
    <relationships>
      <relationship end1="b" end2="c"/>
      <relationship end1="a" end2="c"/>
    </relationships>
  </sheet>
</xmap-content>"##;

    const STYLES: &str = r##"<xmap-styles xmlns:svg="http://www.w3.org/2000/svg" xmlns:fo="http://www.w3.org/1999/XSL/Format">
  <styles>
    <style id="st1" type="topic"><topic-properties svg:fill="#336699" fo:color="#FFFFFF"/></style>
    <style id="st2" type="relationship"><topic-properties svg:fill="#000000"/></style>
  </styles>
</xmap-styles>"##;

    #[test]
    fn reads_legacy_content_with_styles() {
        let bytes = build_zip(&[
            ("content.xml", CONTENT.as_bytes()),
            ("styles.xml", STYLES.as_bytes()),
        ]);
        let map = XMindFormat.parse(&bytes, &ImportOptions::default()).unwrap();
        let root = map.root();
        assert_eq!(map[root].text(), "Central");
        assert_eq!(map[root].attribute(attrs::FILL_COLOR), Some("#336699"));
        assert_eq!(map[root].attribute(attrs::TEXT_COLOR), Some("#FFFFFF"));
        assert_eq!(map.attribute(attrs::MAP_SHOW_JUMPS), Some("true"));

        let kids = map[root].children().to_vec();
        let (a, b, c) = (kids[0], kids[1], kids[2]);
        assert_eq!(map[a].note().unwrap().text, "first line");
        assert_eq!(map[b].note().unwrap().text, "html only");
        assert!(map[b].is_collapsed());
        assert_eq!(map[c].link().unwrap().to_string(), "https://example.com/page");

        assert_eq!(map[a].jump_target(), map[b].uid());
        assert_eq!(map[b].jump_target(), map[c].uid());
    }

    #[test]
    fn foreign_root_is_unsupported() {
        let bytes = build_zip(&[("content.xml", b"<workbook/>")]);
        let err = XMindFormat.parse(&bytes, &ImportOptions::default()).unwrap_err();
        assert!(matches!(err, FormatError::UnsupportedFormat { .. }));
    }

    #[test]
    fn content_without_sheets() {
        let bytes = build_zip(&[("content.xml", b"<xmap-content/>")]);
        let map = XMindFormat.parse(&bytes, &ImportOptions::default()).unwrap();
        assert_eq!(map[map.root()].text(), "Empty");
    }

    #[test]
    fn nested_note_markup_is_read_once() {
        let content = r#"<xmap-content xmlns:xhtml="http://www.w3.org/1999/xhtml"><sheet>
  <topic id="r"><title>Central</title>
    <notes><html><xhtml:p>one <xhtml:span>two</xhtml:span></xhtml:p></html></notes>
  </topic>
</sheet></xmap-content>"#;
        let bytes = build_zip(&[("content.xml", content.as_bytes())]);
        let map = XMindFormat.parse(&bytes, &ImportOptions::default()).unwrap();
        let root = &map[map.root()];
        assert_eq!(root.text(), "Central");
        assert_eq!(root.note().unwrap().text, "one two");
    }
}
