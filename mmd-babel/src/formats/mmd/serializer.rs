//! Native document serialization (MindMap → `.mmd`)

use crate::common::escape::{escape_markdown, escape_pre, strip_controls};
use crate::error::Result;
use crate::format::ExportOptions;
use crate::model::{attrs, Extra, MindMap, TopicId};
use std::collections::BTreeMap;

pub const FORMAT_VERSION: &str = "1.1";

/// Wrap `value` in a backtick run one longer than the longest run inside it.
pub fn code_quote(value: &str) -> String {
    let mut longest = 0;
    let mut current = 0;
    for ch in value.chars() {
        if ch == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    let fence = "`".repeat(longest + 1);
    format!("{fence}{value}{fence}")
}

/// Attribute values stay on one line: controls are dropped, line breaks and tabs become spaces.
fn single_line(value: &str) -> String {
    strip_controls(value).replace(['\n', '\t'], " ")
}

/// `key=`value`` pairs joined by commas.
pub fn attribute_line(attributes: &BTreeMap<String, String>) -> String {
    attributes
        .iter()
        .map(|(key, value)| format!("{key}={}", code_quote(&single_line(value))))
        .collect::<Vec<_>>()
        .join(",")
}

/// Fence long enough for a code snippet body.
fn snippet_fence(body: &str) -> String {
    let longest = body
        .lines()
        .map(|l| l.trim_start().chars().take_while(|c| *c == '`').count())
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}

fn write_topic(map: &MindMap, id: TopicId, level: usize, out: &mut String) {
    let topic = &map[id];
    out.push('\n');
    out.push_str(&"#".repeat(level));
    out.push(' ');
    out.push_str(&escape_markdown(topic.text()));
    out.push('\n');

    let mut attributes = topic.attributes().clone();
    if let Some(note) = topic.note().filter(|n| n.encrypted) {
        attributes.insert(attrs::NOTE_ENCRYPTED.to_string(), "true".to_string());
        if let Some(hint) = &note.hint {
            attributes.insert(attrs::NOTE_HINT.to_string(), hint.clone());
        }
    }
    if !attributes.is_empty() {
        out.push_str("> ");
        out.push_str(&attribute_line(&attributes));
        out.push_str("\n\n");
    }

    for extra in topic.extras() {
        out.push_str("- ");
        out.push_str(extra.extra_type().keyword());
        out.push('\n');
        let value = match extra {
            Extra::Note(note) => note.text.clone(),
            // must match the uid attribute of the target
            Extra::TopicJump(uid) => single_line(uid),
            other => other.value_string(),
        };
        out.push_str("<pre>");
        out.push_str(&escape_pre(&value));
        out.push_str("</pre>\n");
    }

    for (language, body) in topic.code_snippets() {
        let fence = snippet_fence(body);
        out.push_str(&format!("{fence}{language}\n{body}"));
        if !body.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&fence);
        out.push('\n');
    }

    for &child in topic.children() {
        write_topic(map, child, level + 1, out);
    }
}

pub fn serialize_to_mmd(map: &MindMap, options: &ExportOptions) -> Result<String> {
    let mut attributes = map.attributes().clone();
    attributes.insert(attrs::MAP_VERSION.to_string(), FORMAT_VERSION.to_string());

    let mut out = format!("Mind Map generated by {}\n", options.generator);
    out.push_str("> ");
    out.push_str(&attribute_line(&attributes));
    out.push_str("\n---\n");
    write_topic(map, map.root(), 1, &mut out);
    tracing::debug!(topics = map.topic_count(), bytes = out.len(), "mmd export finished");
    Ok(out)
}
