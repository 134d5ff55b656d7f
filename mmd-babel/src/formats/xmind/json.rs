//! `content.json` reader (XMind 8 Zen and later).

use super::{XMindReader, XMindStyle, FORMAT};
use crate::common::archive::Archive;
use crate::common::color::Color;
use crate::common::html;
use crate::error::{FormatError, Result};
use crate::model::{attrs, MindMap, TopicId};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Sheet {
    root_topic: Option<JsonTopic>,
    relationships: Vec<Relationship>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JsonTopic {
    id: Option<String>,
    title: Option<String>,
    href: Option<String>,
    branch: Option<String>,
    image: Option<Image>,
    notes: Option<Notes>,
    style: Option<Style>,
    children: Option<Children>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Image {
    src: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Notes {
    plain: Option<NoteContent>,
    #[serde(rename = "realHTML")]
    real_html: Option<NoteContent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NoteContent {
    content: Option<String>,
}

/// Style properties keep their raw values; only string colors are used.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Style {
    properties: HashMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Children {
    attached: Vec<JsonTopic>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Relationship {
    end1_id: Option<String>,
    end2_id: Option<String>,
}

impl JsonTopic {
    fn style(&self) -> XMindStyle {
        let color = |key: &str| {
            self.style
                .as_ref()
                .and_then(|s| s.properties.get(key))
                .and_then(Value::as_str)
                .and_then(Color::parse)
        };
        XMindStyle {
            fill: color("svg:fill"),
            text: color("fo:color"),
            border: color("border-line-color"),
        }
    }

    fn note(&self) -> Option<String> {
        let notes = self.notes.as_ref()?;
        let content = |n: &Option<NoteContent>| n.as_ref().and_then(|n| n.content.clone());
        match content(&notes.plain) {
            Some(plain) if !plain.trim().is_empty() => Some(plain),
            _ => content(&notes.real_html).map(|rich| html::reduce(&rich).text),
        }
    }
}

impl XMindReader<'_> {
    fn json_topic(&mut self, value: &JsonTopic, topic: TopicId) -> Result<()> {
        let title = value.title.as_deref().unwrap_or_default();
        self.map.set_text(topic, title.replace('\r', ""))?;
        self.register(value.id.as_deref(), topic);
        self.style(topic, value.style())?;

        if value.branch.as_deref() == Some("folded") {
            self.map.set_attribute(topic, attrs::COLLAPSED, "true")?;
        }
        if let Some(href) = &value.href {
            self.href(topic, href)?;
        }
        if let Some(src) = value.image.as_ref().and_then(|i| i.src.as_deref()) {
            self.image(topic, src)?;
        }
        if let Some(note) = value.note() {
            self.note(topic, &note)?;
        }

        for child in value.children.iter().flat_map(|c| &c.attached) {
            let id = self.map.create_child(topic, "", None)?;
            self.json_topic(child, id)?;
        }
        Ok(())
    }
}

pub(super) fn parse(content: &str, archive: &Archive) -> Result<MindMap> {
    let sheets: Vec<Sheet> = serde_json::from_str(content).map_err(|e| {
        FormatError::malformed_at(FORMAT, &e, format!("content.json line {}, column {}", e.line(), e.column()))
    })?;

    let mut reader = XMindReader::new(archive);
    let root = reader.map.root();
    let Some(sheet) = sheets.first() else {
        reader.map.set_text(root, "Empty")?;
        return reader.finish();
    };
    match &sheet.root_topic {
        Some(topic) => reader.json_topic(topic, root)?,
        None => reader.map.set_text(root, "Empty sheet")?,
    }

    for relation in &sheet.relationships {
        if let (Some(from), Some(to)) = (&relation.end1_id, &relation.end2_id) {
            reader.relationship(from, to);
        }
    }
    reader.finish()
}
