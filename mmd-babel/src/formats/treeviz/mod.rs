//! Treeviz formatter for mind maps
//!
//! A box-drawing outline of the topic tree, meant for a quick look at a map in the terminal
//! (`mmd inspect`). Each line is:
//!
//! `<prefix><connector> <icon> <label>[ <extra icons>]`
//!
//! Labels show the first line of the topic text, truncated to 30 characters. The icons after
//! the label mark the extras, embedded image and code snippets a topic carries.
//!
//! Example:
//!
//! ```text
//! ⧉ Map (4 topics)
//! └─ ◉ Project ✎
//!   ├─ ⊕ Research ↗
//!   │ └─ ○ Papers
//!   └─ ○ Build ⤳
//! ```
//!
//! With `--extra-full true` every extra, attribute and snippet is listed as a child line of
//! its topic, with its value.

use super::icons::get_icon;
use crate::error::Result;
use crate::format::{ExportOptions, Format, SerializedDocument};
use crate::model::{attrs, Extra, MindMap, Topic, TopicId};

const LABEL_WIDTH: usize = 30;

fn truncate(text: &str) -> String {
    let first = text.lines().next().unwrap_or_default();
    if first.chars().count() > LABEL_WIDTH {
        let cut: String = first.chars().take(LABEL_WIDTH - 1).collect();
        format!("{cut}…")
    } else if first.len() < text.trim_end().len() {
        format!("{first}…")
    } else {
        first.to_string()
    }
}

fn markers(topic: &Topic) -> String {
    let mut out = String::new();
    for extra in topic.extras() {
        out.push(' ');
        out.push_str(get_icon(extra.extra_type().keyword()));
    }
    if topic.attribute(attrs::IMAGE).is_some() {
        out.push(' ');
        out.push_str(get_icon("Image"));
    }
    if !topic.code_snippets().is_empty() {
        out.push(' ');
        out.push_str(get_icon("Code"));
    }
    out
}

/// Child lines describing a topic's payload, for the full view.
fn details(topic: &Topic) -> Vec<String> {
    let mut lines = Vec::new();
    for (key, value) in topic.attributes() {
        if key == attrs::IMAGE {
            lines.push(format!("{} image", get_icon("Image")));
        } else {
            lines.push(format!("{} {key}={}", get_icon("Attribute"), truncate(value)));
        }
    }
    for extra in topic.extras() {
        let value = match extra {
            Extra::Note(note) if note.encrypted => "(encrypted)".to_string(),
            Extra::Note(note) => truncate(&note.text),
            other => other.value_string(),
        };
        lines.push(format!("{} {value}", get_icon(extra.extra_type().keyword())));
    }
    for language in topic.code_snippets().keys() {
        lines.push(format!("{} {language}", get_icon("Code")));
    }
    lines
}

fn format_topic(
    map: &MindMap,
    id: TopicId,
    prefix: &str,
    is_last: bool,
    full: bool,
    output: &mut String,
) {
    let topic = &map[id];
    let connector = if is_last { "└─" } else { "├─" };
    let icon = if id == map.root() {
        get_icon("Root")
    } else if topic.is_collapsed() && topic.has_children() {
        get_icon("Collapsed")
    } else {
        get_icon("Topic")
    };
    let label = truncate(topic.text());
    if full {
        output.push_str(&format!("{prefix}{connector} {icon} {label}\n"));
    } else {
        output.push_str(&format!("{prefix}{connector} {icon} {label}{}\n", markers(topic)));
    }

    let child_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
    let details = if full { details(topic) } else { Vec::new() };
    let children = topic.children();
    for (i, line) in details.iter().enumerate() {
        let last = i == details.len() - 1 && children.is_empty();
        let connector = if last { "└─" } else { "├─" };
        output.push_str(&format!("{child_prefix}{connector} {line}\n"));
    }
    for (i, child) in children.iter().enumerate() {
        format_topic(map, *child, &child_prefix, i == children.len() - 1, full, output);
    }
}

pub fn to_treeviz_str(map: &MindMap) -> String {
    to_treeviz_str_with_options(map, false)
}

/// Outline of the whole map; `full` lists topic payloads as child lines.
pub fn to_treeviz_str_with_options(map: &MindMap, full: bool) -> String {
    let mut output = format!("{} Map ({} topics)\n", get_icon("Map"), map.topic_count());
    if full {
        for (key, value) in map.attributes() {
            output.push_str(&format!("├─ {} {key}={value}\n", get_icon("Attribute")));
        }
    }
    format_topic(map, map.root(), "", true, full, &mut output);
    output
}

/// Format implementation for treeviz format
pub struct TreevizFormat;

impl Format for TreevizFormat {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn description(&self) -> &str {
        "Visual tree outline with box drawing and Unicode icons"
    }

    fn file_extensions(&self) -> &[&str] {
        &["tree", "treeviz"]
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, map: &MindMap, options: &ExportOptions) -> Result<SerializedDocument> {
        let full = options.flag("full", false)?;
        Ok(SerializedDocument::Text(to_treeviz_str_with_options(map, full)))
    }
}
