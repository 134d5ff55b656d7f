//! XMind format implementation (import only)
//!
//! An `.xmind` file is a zip container. Current versions store the sheets in `content.json`;
//! legacy ones use `content.xml` with colors in `styles.xml`. Both are read, JSON first. Only
//! the first sheet is imported.
//!
//! # Element Mapping Table
//!
//! | XMind Element                        | MindMap Element                    |
//! |--------------------------------------|------------------------------------|
//! | sheet `rootTopic` / first `<topic>`  | Root topic                         |
//! | `children.attached` / `<children>`   | Child topics                       |
//! | `notes.plain` (else `realHTML`)      | Note                               |
//! | `href` `xmind:#id`                   | Topic jump                         |
//! | `href` `file:` / other URL           | File / link extra                  |
//! | `relationships`                      | Topic jump, unless `href` has one  |
//! | `image.src` / `<xhtml:img>` (`xap:`) | Embedded image from the archive    |
//! | style `svg:fill`, `fo:color`, border | Fill, text and border colors       |
//! | `branch: folded`                     | Collapsed topic                    |

mod json;
mod xml;

use crate::common::archive::Archive;
use crate::common::color::Color;
use crate::common::images;
use crate::common::links::JumpTableBuilder;
use crate::error::{FormatError, Result};
use crate::format::{Format, ImportOptions};
use crate::model::{attrs, Extra, MindMap, MmUri, TopicId};

const FORMAT: &str = "xmind";

/// Colors of one topic style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct XMindStyle {
    fill: Option<Color>,
    text: Option<Color>,
    border: Option<Color>,
}

/// Import state shared by the JSON and XML readers.
struct XMindReader<'a> {
    archive: &'a Archive,
    map: MindMap,
    jumps: JumpTableBuilder,
}

impl<'a> XMindReader<'a> {
    fn new(archive: &'a Archive) -> Self {
        Self {
            archive,
            map: MindMap::new(),
            jumps: JumpTableBuilder::new(),
        }
    }

    fn register(&mut self, id: Option<&str>, topic: TopicId) {
        if let Some(id) = id.filter(|id| !id.is_empty()) {
            self.jumps.register(id, topic);
        }
    }

    fn href(&mut self, topic: TopicId, href: &str) -> Result<()> {
        let href = href.trim();
        if let Some(target) = href.strip_prefix("xmind:#") {
            self.jumps.jump(topic, target);
        } else if !href.is_empty() {
            let uri = MmUri::parse(href);
            let extra = if uri.is_file() { Extra::File(uri) } else { Extra::Link(uri) };
            self.map.set_extra(topic, extra)?;
        }
        Ok(())
    }

    /// `relationship` end points; ignored when the source already jumps through its `href`.
    fn relationship(&mut self, from: &str, to: &str) {
        match self.jumps.topic(from) {
            Some(source) if !self.jumps.has_jump_from(source) => self.jumps.jump(source, to),
            Some(_) => {}
            None => tracing::warn!(from, to, "xmind relationship starts at an unknown topic"),
        }
    }

    fn image(&mut self, topic: TopicId, src: &str) -> Result<()> {
        let name = src.trim().strip_prefix("xap:").unwrap_or(src.trim());
        if let Some(image) = images::load(self.archive, name, FORMAT) {
            images::attach(&mut self.map, topic, &image, None)?;
        }
        Ok(())
    }

    fn style(&mut self, topic: TopicId, style: XMindStyle) -> Result<()> {
        for (key, color) in [
            (attrs::FILL_COLOR, style.fill),
            (attrs::TEXT_COLOR, style.text),
            (attrs::BORDER_COLOR, style.border),
        ] {
            if let Some(color) = color {
                self.map.set_attribute(topic, key, color.to_html())?;
            }
        }
        Ok(())
    }

    fn note(&mut self, topic: TopicId, text: &str) -> Result<()> {
        let text = text.replace('\r', "");
        if !text.trim().is_empty() {
            self.map.set_extra(topic, Extra::note(text))?;
        }
        Ok(())
    }

    fn finish(self) -> Result<MindMap> {
        let Self { mut map, jumps, .. } = self;
        let attached = jumps.finish().apply(&mut map, FORMAT)?;
        map.set_map_attribute(attrs::MAP_SHOW_JUMPS, Some("true".to_string()));
        tracing::debug!(topics = map.topic_count(), jumps = attached, "xmind import finished");
        Ok(map)
    }
}

pub fn parse_from_xmind(source: &[u8], _options: &ImportOptions) -> Result<MindMap> {
    let archive = Archive::open(source, FORMAT)?;
    if let Some(content) = archive.text("content.json", FORMAT)? {
        return json::parse(content, &archive);
    }
    if let Some(content) = archive.text("content.xml", FORMAT)? {
        return xml::parse(content, &archive);
    }
    Err(FormatError::unsupported(
        FORMAT,
        "archive holds neither content.json nor content.xml",
    ))
}

/// Format implementation for XMind
pub struct XMindFormat;

impl Format for XMindFormat {
    fn name(&self) -> &str {
        "xmind"
    }

    fn description(&self) -> &str {
        "XMind workbook (first sheet)"
    }

    fn file_extensions(&self) -> &[&str] {
        &["xmind"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn parse(&self, source: &[u8], options: &ImportOptions) -> Result<MindMap> {
        parse_from_xmind(source, options)
    }
}
