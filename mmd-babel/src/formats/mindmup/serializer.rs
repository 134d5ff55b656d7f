//! Mindmup serialization (MindMap → `.mup` JSON)
//!
//! Every topic gets a numeric `id` from one counter shared by the whole export, in pre-order.
//! Children sit in the parent's `ideas` object under their one-based position; root children
//! on the left branch use the negated position. Jumps become entries of the top level `links`
//! array once both endpoints have an id.

use crate::common::escape::strip_controls;
use crate::common::images::decode_attribute;
use crate::common::links::LinkTable;
use crate::error::{FormatError, Result};
use crate::format::ExportOptions;
use crate::model::{attrs, MindMap, TopicId};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

struct MupWriter<'a> {
    map: &'a MindMap,
    options: &'a ExportOptions,
    links: LinkTable,
    next_id: u64,
    ids: HashMap<TopicId, u64>,
    jumps: Vec<(TopicId, TopicId)>,
}

/// `FILE:` / `LINK:` lines of the HTML attachment.
fn attachment_html(map: &MindMap, id: TopicId) -> Option<String> {
    let topic = &map[id];
    let mut html = String::new();
    if let Some(file) = topic.file() {
        let uri = file.as_string(true, false);
        html.push_str(&format!("FILE: <a href=\"{uri}\">{uri}</a><br>"));
    }
    if let Some(link) = topic.link() {
        let uri = link.as_string(true, true);
        html.push_str(&format!("LINK: <a href=\"{uri}\">{uri}</a><br>"));
    }
    (!html.is_empty()).then_some(html)
}

impl MupWriter<'_> {
    fn idea(&mut self, id: TopicId) -> Value {
        let map = self.map;
        let topic = &map[id];
        let idea_id = self.next_id;
        self.next_id += 1;
        self.ids.insert(id, idea_id);
        if let Some(target) = self.links.jump_of(topic) {
            self.jumps.push((id, target));
        }

        let fill = self.options.theme.colors(map, id).fill;
        let mut attr = Map::new();
        attr.insert("style".into(), json!({ "background": fill.to_html() }));
        if topic.is_collapsed() {
            attr.insert("collapsed".into(), Value::Bool(true));
        }
        if let Some(note) = topic.note().filter(|n| !n.encrypted) {
            attr.insert("note".into(), json!({ "index": 3, "text": strip_controls(&note.text) }));
        }
        if let Some(image) = topic.attribute(attrs::IMAGE) {
            let mut icon = Map::new();
            icon.insert("url".into(), Value::String(format!("data:image/png;base64,{image}")));
            icon.insert("position".into(), Value::String("left".into()));
            match decode_attribute(image) {
                Some(decoded) => {
                    icon.insert("width".into(), decoded.width().into());
                    icon.insert("height".into(), decoded.height().into());
                }
                None => tracing::warn!(topic = id.index(), "topic image is not a decodable PNG"),
            }
            attr.insert("icon".into(), Value::Object(icon));
        }

        let mut idea = Map::new();
        idea.insert("title".into(), Value::String(strip_controls(topic.text())));
        idea.insert("id".into(), idea_id.into());
        idea.insert("attr".into(), Value::Object(attr));
        if let Some(html) = attachment_html(map, id) {
            idea.insert(
                "attachment".into(),
                json!({ "contentType": "text/html", "content": html }),
            );
        }

        let mut ideas = Map::new();
        for (index, &child) in topic.children().iter().enumerate() {
            let position = index as i64 + 1;
            let key = if id == map.root() && map.is_left_sided(child) {
                -position
            } else {
                position
            };
            let value = self.idea(child);
            ideas.insert(key.to_string(), value);
        }
        idea.insert("ideas".into(), Value::Object(ideas));
        Value::Object(idea)
    }
}

pub fn serialize_to_mindmup(map: &MindMap, options: &ExportOptions) -> Result<String> {
    let mut writer = MupWriter {
        map,
        options,
        links: LinkTable::build(map),
        next_id: 1,
        ids: HashMap::new(),
        jumps: Vec::new(),
    };
    let root = writer.idea(map.root());

    let mut document = Map::new();
    document.insert("formatVersion".into(), 3.into());
    document.insert("id".into(), "root".into());
    document.insert("title".into(), Value::String(strip_controls(map[map.root()].text())));
    document.insert("ideas".into(), json!({ "1": root }));

    let links: Vec<Value> = writer
        .jumps
        .iter()
        .filter_map(|(from, to)| {
            let (from, to) = (writer.ids.get(from)?, writer.ids.get(to)?);
            Some(json!({
                "ideaIdFrom": from,
                "ideaIdTo": to,
                "attr": {
                    "style": {
                        "arrow": "to",
                        "color": options.theme.jump_link_color.to_html(),
                        "lineStyle": "dashed"
                    }
                }
            }))
        })
        .collect();
    if !links.is_empty() {
        document.insert("links".into(), Value::Array(links));
    }

    serde_json::to_string_pretty(&Value::Object(document))
        .map_err(|e| FormatError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Extra;

    fn export(map: &MindMap) -> Value {
        let text = serialize_to_mindmup(map, &ExportOptions::default()).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    #[test]
    fn left_children_use_negative_keys() {
        let mut map = MindMap::with_root("Root");
        let root = map.root();
        let a = map.create_child(root, "A", None).unwrap();
        map.create_child(root, "B", None).unwrap();
        let c = map.create_child(root, "C", None).unwrap();
        map.set_left_sided(a, true).unwrap();
        map.set_left_sided(c, true).unwrap();

        let json = export(&map);
        assert_eq!(json["formatVersion"], 3);
        let ideas = json["ideas"]["1"]["ideas"].as_object().unwrap();
        let keys: Vec<&str> = ideas.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["-1", "2", "-3"]);
        assert_eq!(ideas["-3"]["title"], "C");
    }

    #[test]
    fn ids_follow_pre_order_and_jumps_become_links() {
        let mut map = MindMap::with_root("Root");
        let root = map.root();
        let a = map.create_child(root, "A", None).unwrap();
        let a1 = map.create_child(a, "A1", None).unwrap();
        let b = map.create_child(root, "B", None).unwrap();
        map.link_to(a1, b).unwrap();
        map.set_extra(b, Extra::jump("dangling")).unwrap();

        let json = export(&map);
        let root_idea = &json["ideas"]["1"];
        assert_eq!(root_idea["id"], 1);
        assert_eq!(root_idea["ideas"]["1"]["id"], 2);
        assert_eq!(root_idea["ideas"]["1"]["ideas"]["1"]["id"], 3);
        assert_eq!(root_idea["ideas"]["2"]["id"], 4);

        let links = json["links"].as_array().unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0]["ideaIdFrom"], 3);
        assert_eq!(links[0]["ideaIdTo"], 4);
        assert_eq!(links[0]["attr"]["style"]["lineStyle"], "dashed");
    }

    #[test]
    fn notes_and_attachments() {
        let mut map = MindMap::with_root("Root");
        let root = map.root();
        map.set_extra(root, Extra::note("hello")).unwrap();
        map.set_extra(root, Extra::link("https://example.com/")).unwrap();
        map.set_attribute(root, attrs::FILL_COLOR, "#123456").unwrap();

        let json = export(&map);
        let idea = &json["ideas"]["1"];
        assert_eq!(idea["attr"]["note"]["text"], "hello");
        assert_eq!(idea["attr"]["style"]["background"], "#123456");
        assert_eq!(idea["attachment"]["contentType"], "text/html");
        assert!(idea["attachment"]["content"]
            .as_str()
            .unwrap()
            .contains("LINK: <a href=\"https://example.com/\">"));
        assert!(json.get("links").is_none());
    }
}
