//! FreeMind parsing (`.mm` XML → MindMap)
//!
//! Pass 1 builds the tree and records every `ID` together with the jumps (`LINK="#id"` and
//! `<arrowlink DESTINATION>`). Pass 2 attaches the jumps whose target turned up.

use crate::common::color::Color;
use crate::common::html;
use crate::common::images;
use crate::common::links::JumpTableBuilder;
use crate::error::{FormatError, Result};
use crate::format::ImportOptions;
use crate::model::{attrs, Extra, MindMap, MmUri, TopicId};
use roxmltree::{Document, Node, ParsingOptions};

const FORMAT: &str = "freemind";

pub(crate) fn parse_xml<'a>(source: &'a str, format: &str) -> Result<Document<'a>> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(source, options).map_err(|e| {
        let pos = e.pos();
        FormatError::malformed_at(format, e, format!("line {}, column {}", pos.row, pos.col))
    })
}

pub(crate) fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

/// Concatenated text nodes below `node`.
pub(crate) fn text_content(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

/// What a `richcontent` block contributed to its topic.
#[derive(Debug, Default)]
struct RichContent {
    text: String,
    /// A `<pre>` block was present, even an empty one.
    preformatted: bool,
    images: Vec<String>,
    file: Option<String>,
    link: Option<String>,
}

/// `<li><b>FILE: </b><a href="..">` entries written next to a note.
fn list_extra(li: Node<'_, '_>) -> Option<(String, String)> {
    let label = li
        .descendants()
        .find(|n| n.has_tag_name("b"))
        .map(text_content)?;
    let href = li
        .descendants()
        .find(|n| n.has_tag_name("a"))
        .and_then(|a| a.attribute("href"))?;
    let label = label.trim().trim_end_matches(':').trim().to_ascii_uppercase();
    matches!(label.as_str(), "FILE" | "LINK").then(|| (label, href.trim().to_string()))
}

fn is_extras_list(node: Node<'_, '_>) -> bool {
    node.has_tag_name("ul")
        && node
            .children()
            .filter(|n| n.is_element())
            .all(|li| li.has_tag_name("li") && list_extra(li).is_some())
}

fn rich_content(node: Node<'_, '_>, source: &str) -> RichContent {
    let mut content = RichContent::default();
    let Some(html) = node.children().find(|n| n.has_tag_name("html")) else {
        return content;
    };
    let Some(body) = html.children().find(|n| n.has_tag_name("body")) else {
        return content;
    };

    let mut markup = String::new();
    for child in body.children() {
        if child.is_element() && is_extras_list(child) {
            for li in child.children().filter(|n| n.has_tag_name("li")) {
                match list_extra(li) {
                    Some((label, href)) if label == "FILE" => content.file = Some(href),
                    Some((_, href)) => content.link = Some(href),
                    None => {}
                }
            }
        } else {
            markup.push_str(&source[child.range()]);
        }
    }

    let pre: Vec<String> = body
        .descendants()
        .filter(|n| n.has_tag_name("pre"))
        .map(text_content)
        .collect();
    let summary = html::reduce(&markup);
    content.images = summary.images;
    content.preformatted = !pre.is_empty();
    // preformatted blocks are taken verbatim, everything else is reduced to plain text
    content.text = if pre.is_empty() {
        summary.text.trim().to_string()
    } else {
        pre.join("\n")
    };
    content
}

struct FreeMindReader<'o> {
    options: &'o ImportOptions,
    source: &'o str,
    map: MindMap,
    jumps: JumpTableBuilder,
}

impl FreeMindReader<'_> {
    fn set_link(&mut self, topic: TopicId, value: &str) -> Result<()> {
        let uri = MmUri::parse(value);
        if uri.path().is_empty() {
            return Ok(());
        }
        let extra = if uri.is_file() { Extra::File(uri) } else { Extra::Link(uri) };
        self.map.set_extra(topic, extra)?;
        Ok(())
    }

    fn topic(&mut self, node: Node<'_, '_>, topic: TopicId) -> Result<()> {
        let text = node.attribute("TEXT").unwrap_or_default().replace('\r', "");
        self.map.set_text(topic, text)?;

        if self.map.level(topic) == 1
            && node
                .attribute("POSITION")
                .is_some_and(|p| p.eq_ignore_ascii_case("left"))
        {
            self.map.set_left_sided(topic, true)?;
        }
        for (name, key) in [("COLOR", attrs::TEXT_COLOR), ("BACKGROUND_COLOR", attrs::FILL_COLOR)] {
            if let Some(color) = node.attribute(name).and_then(Color::parse) {
                self.map.set_attribute(topic, key, color.to_html())?;
            }
        }
        if node.attribute("FOLDED").is_some_and(|f| f == "true") {
            self.map.set_attribute(topic, attrs::COLLAPSED, "true")?;
        }

        if let Some(id) = node.attribute("ID").filter(|id| !id.is_empty()) {
            self.jumps.register(id, topic);
        }
        match node.attribute("LINK").map(str::trim) {
            Some(link) if link.starts_with('#') => self.jumps.jump(topic, &link[1..]),
            Some(link) => self.set_link(topic, link)?,
            None => {}
        }
        if !self.jumps.has_jump_from(topic) {
            if let Some(destination) = element_children(node, "arrowlink")
                .filter_map(|a| a.attribute("DESTINATION"))
                .find(|d| !d.is_empty())
            {
                self.jumps.jump(topic, destination);
            }
        }

        let mut found_images = Vec::new();
        for rich in element_children(node, "richcontent") {
            let content = rich_content(rich, self.source);
            match rich.attribute("TYPE") {
                Some("NODE") => {
                    if !content.text.is_empty() {
                        self.map.set_text(topic, content.text.trim())?;
                    }
                }
                Some("NOTE") => {
                    if content.preformatted || !content.text.is_empty() {
                        self.map.set_extra(topic, Extra::note(content.text.replace('\r', "")))?;
                    }
                    if let Some(file) = content.file.filter(|_| self.map[topic].file().is_none()) {
                        self.map.set_extra(topic, Extra::file(&file))?;
                    }
                    if let Some(link) = content.link.filter(|_| self.map[topic].link().is_none()) {
                        self.map.set_extra(topic, Extra::link(&link))?;
                    }
                }
                other => tracing::warn!(kind = ?other, "skipping unknown freemind rich content"),
            }
            found_images.extend(content.images);
        }
        if let Some(image) = found_images
            .iter()
            .find_map(|src| images::load(self.options.resources.as_ref(), src, FORMAT))
        {
            images::attach(&mut self.map, topic, &image, None)?;
        }

        for child in element_children(node, "node") {
            let id = self.map.create_child(topic, "", None)?;
            self.topic(child, id)?;
        }
        Ok(())
    }
}

pub fn parse_from_freemind(source: &str, options: &ImportOptions) -> Result<MindMap> {
    let doc = parse_xml(source, FORMAT)?;
    let root = doc.root_element();
    if root.tag_name().name() != "map" {
        return Err(FormatError::unsupported(
            FORMAT,
            format!("root element is <{}>, expected <map>", root.tag_name().name()),
        ));
    }

    let mut reader = FreeMindReader {
        options,
        source,
        map: MindMap::new(),
        jumps: JumpTableBuilder::new(),
    };
    let map_root = reader.map.root();
    match element_children(root, "node").next() {
        Some(node) => reader.topic(node, map_root)?,
        None => reader.map.set_text(map_root, "Empty")?,
    }

    let FreeMindReader { mut map, jumps, .. } = reader;
    let attached = jumps.finish().apply(&mut map, FORMAT)?;
    if attached > 0 {
        map.set_map_attribute(attrs::MAP_SHOW_JUMPS, Some("true".to_string()));
    }
    tracing::debug!(topics = map.topic_count(), jumps = attached, "freemind import finished");
    Ok(map)
}
