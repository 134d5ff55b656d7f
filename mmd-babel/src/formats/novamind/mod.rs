//! Novamind format implementation (import only)
//!
//! A `.nm5` file is a zip container. `content.xml` keeps the topic contents (`topics/topic`)
//! apart from the map layout (`maps/map/topic-node`), which references them by `topic-ref`.
//! Images live under `Resources/` and are listed in `manifest.xml`.
//!
//! # Element Mapping Table
//!
//! | Novamind Element                          | MindMap Element                      |
//! |-------------------------------------------|--------------------------------------|
//! | first `map` / `topic-node`                | Root topic                           |
//! | `sub-topics/topic-node`                   | Child topics                         |
//! | `rich-text/text-run`                      | Topic text (`<br>` as newline)       |
//! | `notes/rich-text`                         | Note                                 |
//! | `top-image resource-ref`                  | Embedded image from `Resources/`     |
//! | `solid-color` fill / `line-style` color   | Fill (contrast text) / border colors |
//! | `link-lines/.../link-line-data`           | Topic jump                           |
//! | `links/link url`                          | Jump, link or file extra             |
//!
//! # Lossy Conversions
//!
//! A topic holds one extra of each kind. When a topic lists several URLs of the same kind,
//! each becomes a child topic ("Linked to topic", "URL link", "File link") carrying it.

use crate::common::archive::Archive;
use crate::common::color::Color;
use crate::common::images;
use crate::common::links::JumpTableBuilder;
use crate::error::{FormatError, Result};
use crate::format::{Format, ImportOptions};
use crate::formats::common::set_fill_with_contrast;
use crate::formats::freemind::parser::{element_children, parse_xml, text_content};
use crate::model::{attrs, Extra, MindMap, MmUri, Topic, TopicId};
use roxmltree::Node;
use std::collections::HashMap;

const FORMAT: &str = "novamind";
const TOPIC_URL_PREFIX: &str = "novamind://topic/";

/// `topics/topic`: what a topic node shows.
#[derive(Debug, Default)]
struct ContentTopic {
    text: String,
    notes: Option<String>,
    urls: Vec<String>,
    image: Option<String>,
}

fn first_child<'a, 'input>(node: Node<'a, 'input>, name: &'a str) -> Option<Node<'a, 'input>> {
    element_children(node, name).next()
}

fn non_empty<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attribute(name).map(str::trim).filter(|v| !v.is_empty())
}

fn rich_text(node: Node<'_, '_>) -> Option<String> {
    let mut text = String::new();
    for run in element_children(node, "rich-text").flat_map(|r| element_children(r, "text-run")) {
        for part in run.children() {
            if part.has_tag_name("br") {
                text.push('\n');
            } else if part.is_element() {
                text.push_str(&text_content(part));
            } else if let Some(t) = part.text() {
                text.push_str(t);
            }
        }
    }
    (!text.is_empty()).then_some(text)
}

impl ContentTopic {
    fn read(node: Node<'_, '_>) -> Self {
        let notes: String = element_children(node, "notes").filter_map(rich_text).collect();
        Self {
            text: rich_text(node).unwrap_or_default().replace('\r', ""),
            notes: (!notes.is_empty()).then_some(notes),
            urls: element_children(node, "links")
                .flat_map(|l| element_children(l, "link"))
                .filter_map(|l| non_empty(l, "url"))
                .map(str::to_string)
                .collect(),
            image: first_child(node, "top-image").and_then(|i| non_empty(i, "resource-ref")).map(str::to_string),
        }
    }
}

/// Resource id to archive path, from `manifest.xml`.
fn read_manifest(archive: &Archive) -> HashMap<String, String> {
    let mut resources = HashMap::new();
    let Ok(Some(source)) = archive.text("manifest.xml", FORMAT) else {
        return resources;
    };
    let document = match parse_xml(source, FORMAT) {
        Ok(document) => document,
        Err(e) => {
            tracing::warn!(error = %e, "can't parse novamind manifest");
            return resources;
        }
    };
    let root = document.root_element();
    if !root.has_tag_name("manifest") {
        tracing::warn!("novamind manifest has no <manifest> root");
        return resources;
    }
    for resource in element_children(root, "resources").flat_map(|r| element_children(r, "resource")) {
        if let (Some(id), Some(url)) = (non_empty(resource, "id"), non_empty(resource, "url")) {
            resources.insert(id.to_string(), format!("Resources/{url}"));
        }
    }
    resources
}

struct NovamindReader<'a> {
    archive: &'a Archive,
    resources: HashMap<String, String>,
    contents: HashMap<String, ContentTopic>,
    map: MindMap,
    /// Topic nodes by their own id, for link lines.
    jumps: JumpTableBuilder,
    /// First topic showing each content topic, for `novamind://topic/` URLs.
    by_content: HashMap<String, TopicId>,
    /// Topics in creation order with the URLs they list.
    urls: Vec<(TopicId, Vec<String>)>,
}

impl NovamindReader<'_> {
    fn topic_node(&mut self, node: Node<'_, '_>, topic: TopicId) -> Result<()> {
        if let Some(style) = first_child(node, "topic-node-view").and_then(|v| first_child(v, "topic-node-style")) {
            if let Some(fill) = first_child(style, "fill-style")
                .and_then(|f| first_child(f, "solid-color"))
                .and_then(|c| c.attribute("color"))
                .and_then(Color::parse)
            {
                set_fill_with_contrast(&mut self.map, topic, fill)?;
            }
            if let Some(border) = first_child(style, "line-style")
                .and_then(|l| l.attribute("color"))
                .and_then(Color::parse)
            {
                self.map.set_attribute(topic, attrs::BORDER_COLOR, border.to_html())?;
            }
        }

        let content_id = non_empty(node, "topic-ref").unwrap_or_default();
        let Some(content) = self.contents.get(content_id) else {
            tracing::warn!(topic_ref = content_id, "novamind topic node without content");
            return Ok(());
        };
        let (text, notes, urls, image) = (
            content.text.clone(),
            content.notes.clone(),
            content.urls.clone(),
            content.image.clone(),
        );
        self.map.set_text(topic, text)?;
        if let Some(id) = non_empty(node, "id") {
            self.jumps.register(id, topic);
        }
        self.by_content.entry(content_id.to_string()).or_insert(topic);
        if let Some(path) = image.and_then(|id| self.resources.get(&id)) {
            if let Some(image) = images::load(self.archive, path, FORMAT) {
                images::attach(&mut self.map, topic, &image, None)?;
            }
        }
        if let Some(notes) = notes {
            self.map.set_extra(topic, Extra::note(notes))?;
        }
        if !urls.is_empty() {
            self.urls.push((topic, urls));
        }

        let children: Vec<Node<'_, '_>> = first_child(node, "sub-topics")
            .into_iter()
            .flat_map(|s| element_children(s, "topic-node"))
            .collect();
        for child in children {
            let id = self.map.create_child(topic, "", None)?;
            self.topic_node(child, id)?;
        }
        Ok(())
    }
}

/// Second pass over the finished tree: `links/link` URLs become jumps, links and files.
struct UrlPass {
    map: MindMap,
    by_content: HashMap<String, TopicId>,
}

impl UrlPass {
    fn topic_urls(&mut self, topic: TopicId, urls: &[String]) -> Result<()> {
        let mut targets = Vec::new();
        let mut links = Vec::new();
        let mut files = Vec::new();
        for url in urls {
            if let Some(content_id) = url.strip_prefix(TOPIC_URL_PREFIX) {
                match self.by_content.get(content_id) {
                    Some(&target) => targets.push(target),
                    None => tracing::warn!(url = %url, "novamind link to an unknown topic"),
                }
            } else {
                let uri = MmUri::parse(url);
                if uri.is_file() {
                    files.push(uri);
                } else {
                    links.push(uri);
                }
            }
        }

        if let &[target] = targets.as_slice() {
            if self.map[topic].jump_target().is_none() {
                self.map.link_to(topic, target)?;
                targets.clear();
            }
        }
        for target in targets {
            let child = self.map.create_child(topic, "Linked to topic", None)?;
            self.map.link_to(child, target)?;
        }
        self.spread(topic, links, "URL link", Extra::Link, |t| t.link().is_some())?;
        self.spread(topic, files, "File link", Extra::File, |t| t.file().is_some())?;
        Ok(())
    }

    /// A single URI goes on the topic itself when that slot is free, otherwise every URI
    /// gets a child topic of its own.
    fn spread(
        &mut self,
        topic: TopicId,
        uris: Vec<MmUri>,
        label: &str,
        extra: fn(MmUri) -> Extra,
        occupied: fn(&Topic) -> bool,
    ) -> Result<()> {
        if uris.len() == 1 && !occupied(&self.map[topic]) {
            for uri in uris {
                self.map.set_extra(topic, extra(uri))?;
            }
            return Ok(());
        }
        for uri in uris {
            let child = self.map.create_child(topic, label, None)?;
            self.map.set_extra(child, extra(uri))?;
        }
        Ok(())
    }
}

pub fn parse_from_novamind(source: &[u8], _options: &ImportOptions) -> Result<MindMap> {
    let archive = Archive::open(source, FORMAT)?;
    let content = archive
        .text("content.xml", FORMAT)?
        .ok_or_else(|| FormatError::unsupported(FORMAT, "archive holds no content.xml"))?;
    let document = parse_xml(content, FORMAT)?;
    let root = document.root_element();
    if !root.has_tag_name("document") {
        return Err(FormatError::unsupported(
            FORMAT,
            format!("unexpected root element <{}>", root.tag_name().name()),
        ));
    }

    let contents = element_children(root, "topics")
        .flat_map(|t| element_children(t, "topic"))
        .filter_map(|t| non_empty(t, "id").map(|id| (id.to_string(), ContentTopic::read(t))))
        .collect();
    let mut reader = NovamindReader {
        archive: &archive,
        resources: read_manifest(&archive),
        contents,
        map: MindMap::with_root("Empty map"),
        jumps: JumpTableBuilder::new(),
        by_content: HashMap::new(),
        urls: Vec::new(),
    };
    reader.map.set_map_attribute(attrs::MAP_SHOW_JUMPS, Some("true".to_string()));

    let Some(first_map) = first_child(root, "maps").and_then(|m| first_child(m, "map")) else {
        return Ok(reader.map);
    };
    let map_root = reader.map.root();
    if let Some(node) = first_child(first_map, "topic-node") {
        reader.topic_node(node, map_root)?;
    }
    for line in element_children(first_map, "link-lines")
        .flat_map(|l| element_children(l, "topic-node"))
        .flat_map(|n| element_children(n, "link-line-data"))
    {
        if let (Some(from), Some(to)) = (
            non_empty(line, "start-topic-node-ref"),
            non_empty(line, "end-topic-node-ref"),
        ) {
            match reader.jumps.topic(from) {
                Some(source) => reader.jumps.jump(source, to),
                None => tracing::warn!(from, to, "novamind link line starts at an unknown node"),
            }
        }
    }

    let NovamindReader { mut map, jumps, urls, by_content, .. } = reader;
    let attached = jumps.finish().apply(&mut map, FORMAT)?;
    let mut reader = UrlPass { map, by_content };
    for (topic, topic_urls) in urls {
        reader.topic_urls(topic, &topic_urls)?;
    }
    tracing::debug!(topics = reader.map.topic_count(), jumps = attached, "novamind import finished");
    Ok(reader.map)
}

/// Format implementation for Novamind
pub struct NovamindFormat;

impl Format for NovamindFormat {
    fn name(&self) -> &str {
        "novamind"
    }

    fn description(&self) -> &str {
        "Novamind 5 document (first map)"
    }

    fn file_extensions(&self) -> &[&str] {
        &["nm5"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn parse(&self, source: &[u8], options: &ImportOptions) -> Result<MindMap> {
        parse_from_novamind(source, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::archive::build_zip;
    use crate::common::images::tiny_png;

    const CONTENT: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<document>
  <topics>
    <topic id="t-root"><rich-text><text-run>Main<br/>idea</text-run></rich-text>
      <top-image resource-ref="r1"/>
    </topic>
    <topic id="t-a"><rich-text><text-run>Alpha</text-run></rich-text>
      <notes><rich-text><text-run>A <b>note</b></text-run></rich-text></notes>
      <links><link url="novamind://topic/t-b"/><link url="https://one.org"/><link url="https://two.org"/></links>
    </topic>
    <topic id="t-b"><rich-text><text-run>Beta</text-run></rich-text>
      <links><link url="docs/readme.txt"/></links>
    </topic>
  </topics>
  <maps>
    <map>
      <topic-node id="n-root" topic-ref="t-root">
        <topic-node-view><topic-node-style>
          <fill-style><solid-color color="#000000"/></fill-style>
          <line-style color="#FF0000"/>
        </topic-node-style></topic-node-view>
        <sub-topics>
          <topic-node id="n-a" topic-ref="t-a"/>
          <topic-node id="n-b" topic-ref="t-b"/>
        </sub-topics>
      </topic-node>
      <link-lines>
        <topic-node><link-line-data start-topic-node-ref="n-b" end-topic-node-ref="n-root"/></topic-node>
      </link-lines>
    </map>
  </maps>
</document>"##;

    const MANIFEST: &str = r#"<manifest><resources><resource id="r1" url="pic.png"/></resources></manifest>"#;

    fn import(files: &[(&str, &[u8])]) -> Result<MindMap> {
        NovamindFormat.parse(&build_zip(files), &ImportOptions::default())
    }

    #[test]
    fn reads_topics_styles_and_images() {
        let png = tiny_png();
        let map = import(&[
            ("content.xml", CONTENT.as_bytes()),
            ("manifest.xml", MANIFEST.as_bytes()),
            ("Resources/pic.png", png.as_slice()),
        ])
        .unwrap();
        let root = map.root();
        assert_eq!(map[root].text(), "Main\nidea");
        assert_eq!(map[root].attribute(attrs::FILL_COLOR), Some("#000000"));
        assert_eq!(map[root].attribute(attrs::TEXT_COLOR), Some("#FFFFFF"));
        assert_eq!(map[root].attribute(attrs::BORDER_COLOR), Some("#FF0000"));
        assert!(map[root].attribute(attrs::IMAGE).is_some());
        assert_eq!(map.attribute(attrs::MAP_SHOW_JUMPS), Some("true"));

        let kids = map[root].children().to_vec();
        assert_eq!(map[kids[0]].note().unwrap().text, "A note");
    }

    #[test]
    fn links_become_jumps_extras_and_child_topics() {
        let map = import(&[("content.xml", CONTENT.as_bytes())]).unwrap();
        let root = map.root();
        let kids = map[root].children().to_vec();
        let (a, b) = (kids[0], kids[1]);

        // link line from Beta to the root, topic URL from Alpha to Beta
        assert_eq!(map[b].jump_target(), map[root].uid());
        assert_eq!(map[a].jump_target(), map[b].uid());
        assert_eq!(map[b].file().unwrap().path(), "docs/readme.txt");

        let url_children: Vec<&str> = map[a]
            .children()
            .iter()
            .map(|c| map[*c].link().unwrap().path())
            .collect();
        assert_eq!(url_children, vec!["https://one.org", "https://two.org"]);
        assert!(map[a].children().iter().all(|c| map[*c].text() == "URL link"));
        assert!(map[a].link().is_none());
    }

    #[test]
    fn missing_map_keeps_placeholder_root() {
        let map = import(&[("content.xml", b"<document><topics/></document>")]).unwrap();
        assert_eq!(map[map.root()].text(), "Empty map");
    }

    #[test]
    fn rejects_archives_without_content() {
        let err = import(&[("manifest.xml", MANIFEST.as_bytes())]).unwrap_err();
        assert!(matches!(err, FormatError::UnsupportedFormat { .. }));
        let err = import(&[("content.xml", b"<xmap-content/>")]).unwrap_err();
        assert!(matches!(err, FormatError::UnsupportedFormat { .. }));
    }

    #[test]
    fn nested_runs_are_read_once() {
        let content = r#"<document>
  <topics><topic id="t"><rich-text><text-run>plain <i>it<b>alic</b></i> end</text-run></rich-text></topic></topics>
  <maps><map><topic-node id="n" topic-ref="t"/></map></maps>
</document>"#;
        let map = import(&[("content.xml", content.as_bytes())]).unwrap();
        assert_eq!(map[map.root()].text(), "plain italic end");
    }
}
