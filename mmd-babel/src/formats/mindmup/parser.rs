//! Mindmup parsing (`.mup` JSON → MindMap)
//!
//! Only `formatVersion` 2 and later are accepted. The `ideas` of the document hold the root;
//! every idea lists its children under numeric keys, sorted by magnitude so left (negative)
//! and right (positive) children interleave the way they were written. The top level `links`
//! array is resolved once the whole tree exists.

use crate::common::color::Color;
use crate::common::html;
use crate::common::images;
use crate::common::links::JumpTableBuilder;
use crate::error::{FormatError, Result};
use crate::format::ImportOptions;
use crate::formats::common::{append_to_note, detected_section, first_resolved, set_fill_with_contrast};
use crate::model::{attrs, Extra, MindMap, MmUri, TopicId};
use serde_json::Value;

const FORMAT: &str = "mindmup";

/// Idea ids are numbers in current files and strings in some older ones.
fn id_key(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Child ideas ordered by key magnitude, negative first on ties.
fn sorted_ideas(idea: &Value) -> Vec<(f64, &Value)> {
    let Some(ideas) = idea.get("ideas").and_then(Value::as_object) else {
        return Vec::new();
    };
    let mut sorted: Vec<(f64, &Value)> = ideas
        .iter()
        .filter(|(_, v)| v.is_object())
        .map(|(key, value)| {
            let order = key.trim().parse::<f64>().unwrap_or_else(|_| {
                tracing::warn!(key = %key, "mindmup idea key is not a number");
                0.0
            });
            (order, value)
        })
        .collect();
    sorted.sort_by(|a, b| {
        a.0.abs()
            .total_cmp(&b.0.abs())
            .then_with(|| a.0.total_cmp(&b.0))
    });
    sorted
}

struct MupReader<'o> {
    options: &'o ImportOptions,
    map: MindMap,
    jumps: JumpTableBuilder,
}

impl MupReader<'_> {
    fn attr(&mut self, topic: TopicId, attr: &Value) -> Result<()> {
        let Some(attr) = attr.as_object() else {
            return Ok(());
        };
        for (key, value) in attr {
            match key.as_str() {
                "note" => {
                    if let Some(text) = value.get("text").and_then(Value::as_str) {
                        self.map.set_extra(topic, Extra::note(text))?;
                    }
                }
                "icon" => {
                    if let Some(url) = value.get("url").and_then(Value::as_str) {
                        self.icon(topic, url)?;
                    }
                }
                "style" => {
                    if let Some(color) = value.get("background").and_then(Value::as_str).and_then(Color::parse) {
                        set_fill_with_contrast(&mut self.map, topic, color)?;
                    }
                }
                "collapsed" => {
                    if value.as_bool() == Some(true) {
                        self.map.set_attribute(topic, attrs::COLLAPSED, "true")?;
                    }
                }
                other => tracing::warn!(attribute = other, "unsupported mindmup attribute"),
            }
        }
        Ok(())
    }

    fn icon(&mut self, topic: TopicId, url: &str) -> Result<()> {
        if let Some(image) = images::load(self.options.resources.as_ref(), url, FORMAT) {
            images::attach(&mut self.map, topic, &image, None)?;
        } else if !url.trim().starts_with("data:") && self.map[topic].link().is_none() {
            self.map.set_extra(topic, Extra::link(url))?;
        }
        Ok(())
    }

    fn attachment(&mut self, topic: TopicId, attachment: &Value) -> Result<()> {
        let Some(content) = attachment.get("content").and_then(Value::as_str) else {
            return Ok(());
        };
        let summary = html::reduce(content);
        let (files, urls): (Vec<MmUri>, Vec<MmUri>) = summary
            .links
            .iter()
            .map(|(href, _)| MmUri::parse(href))
            .partition(MmUri::is_file);
        if let Some(file) = files.into_iter().next() {
            self.map.set_extra(topic, Extra::File(file))?;
        }
        let urls: Vec<String> = urls.iter().map(|u| u.as_string(false, true)).collect();
        let resolved = first_resolved(&urls, |u| Some(MmUri::parse(u)));
        if let Some(link) = resolved.value.filter(|_| self.map[topic].link().is_none()) {
            self.map.set_extra(topic, Extra::Link(link))?;
        }
        if resolved.ambiguous {
            append_to_note(&mut self.map, topic, &detected_section("Detected URLs", &urls))?;
        }
        Ok(())
    }

    fn idea(&mut self, idea: &Value, topic: TopicId) -> Result<()> {
        let title = idea.get("title").and_then(Value::as_str).unwrap_or_default();
        self.map.set_text(topic, title.trim().replace('\r', ""))?;
        if let Some(id) = idea.get("id").and_then(id_key) {
            self.jumps.register(id, topic);
        }
        if let Some(attr) = idea.get("attr") {
            self.attr(topic, attr)?;
        }
        if let Some(attachment) = idea.get("attachment") {
            self.attachment(topic, attachment)?;
        }

        let is_root = topic == self.map.root();
        for (order, child_idea) in sorted_ideas(idea) {
            let child = self.map.create_child(topic, "", None)?;
            if is_root && order < 0.0 {
                self.map.set_left_sided(child, true)?;
            }
            self.idea(child_idea, child)?;
        }
        Ok(())
    }
}

pub fn parse_from_mindmup(source: &str, options: &ImportOptions) -> Result<MindMap> {
    let document: Value = serde_json::from_str(source).map_err(|e| {
        FormatError::malformed_at(FORMAT, &e, format!("line {}, column {}", e.line(), e.column()))
    })?;
    let version = document
        .get("formatVersion")
        .and_then(Value::as_f64)
        .ok_or_else(|| FormatError::unsupported(FORMAT, "missing formatVersion"))?;
    if version < 2.0 {
        return Err(FormatError::unsupported(
            FORMAT,
            format!("formatVersion {version} is not supported, 2 or later required"),
        ));
    }

    let mut reader = MupReader {
        options,
        map: MindMap::new(),
        jumps: JumpTableBuilder::new(),
    };
    let root = reader.map.root();
    match sorted_ideas(&document).first() {
        Some((_, root_idea)) => reader.idea(root_idea, root)?,
        None => {
            let title = document.get("title").and_then(Value::as_str).unwrap_or("Empty");
            reader.map.set_text(root, title.trim())?;
        }
    }

    for link in document.get("links").and_then(Value::as_array).into_iter().flatten() {
        let from = link.get("ideaIdFrom").and_then(id_key);
        let to = link.get("ideaIdTo").and_then(id_key);
        match (from.and_then(|f| reader.jumps.topic(&f)), to) {
            (Some(source), Some(target)) => reader.jumps.jump(source, target),
            _ => tracing::warn!(link = %link, "skipping mindmup link with unknown endpoints"),
        }
    }

    let MupReader { mut map, jumps, .. } = reader;
    let attached = jumps.finish().apply(&mut map, FORMAT)?;
    if attached > 0 {
        map.set_map_attribute(attrs::MAP_SHOW_JUMPS, Some("true".to_string()));
    }
    tracing::debug!(topics = map.topic_count(), jumps = attached, "mindmup import finished");
    Ok(map)
}
