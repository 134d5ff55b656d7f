//! PlantUML mind map format implementation (export only)
//!
//!     Output is a single `@startmindmap` … `@endmindmap` block:
//!
//!         skinparam block        paper, connector and border settings from the theme
//!         <style> block          one class per distinct (text, fill, border, alignment) tuple
//!         image variables        `!$image_N="<img data:image/png;base64,…>"`
//!         topics                 `*` × (level + 1), root children prefixed by
//!                                `left side` / `right side`
//!
//!     Topics with multi-line text or any extra use the `:…;` multi-line node syntax, with the
//!     note, file, link and jump rendered as extra lines. Every node ends with its `<<styleN>>`
//!     class.
//!
//!     PlantUML mind maps have no anchor or cross-reference syntax. Jump targets therefore get
//!     no anchor, and a resolved jump is written as a "Related to:" line naming the target's
//!     text. Dangling jumps are left out like in the other text formats.

use crate::common::color::Color;
use crate::common::escape::escape_html;
use crate::common::links::LinkTable;
use crate::common::paths::file_reference;
use crate::error::Result;
use crate::format::{ExportOptions, Format, SerializedDocument};
use crate::model::{attrs, MindMap, TopicId};
use crate::render::svg::dbl;
use std::collections::HashMap;

const EOL: &str = "\n";

/// Escape text for a PlantUML label. `one_line` also turns newlines into `\n`.
pub fn escape_plantuml(text: &str, one_line: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '[' | ']' | ':' | ';' | '{' | '|' | '}' | '<' | '>' | '#' | '&' | '~' => {
                out.push_str(&format!("<U+{:04X}>", ch as u32));
            }
            '\n' if one_line => out.push_str("\\n"),
            '\n' => out.push('\n'),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StyleItem {
    text: Color,
    fill: Color,
    border: Color,
    align: &'static str,
}

fn alignment(value: Option<&str>) -> &'static str {
    match value.map(str::trim) {
        Some(v) if v.eq_ignore_ascii_case("left") => "left",
        Some(v) if v.eq_ignore_ascii_case("right") => "right",
        _ => "center",
    }
}

/// Style table, numbered in first-use (pre-order) order.
struct Styles {
    items: Vec<StyleItem>,
    default_border: Color,
}

impl Styles {
    fn collect(map: &MindMap, options: &ExportOptions) -> Self {
        let mut styles = Styles {
            items: Vec::new(),
            default_border: options.theme.border_color,
        };
        for id in map.iter() {
            let item = style_of(map, id, options);
            if !styles.items.contains(&item) {
                styles.items.push(item);
            }
        }
        styles
    }

    fn class_of(&self, item: &StyleItem) -> String {
        let index = self.items.iter().position(|s| s == item).unwrap_or_default();
        format!("style{}", index + 1)
    }

    fn write(&self, out: &mut String) {
        for (index, item) in self.items.iter().enumerate() {
            out.push_str(&format!(".style{} {{{EOL}", index + 1));
            out.push_str(&format!("  BackgroundColor {}{EOL}", item.fill.to_html()));
            out.push_str(&format!("  FontColor {}{EOL}", item.text.to_html()));
            if item.border != self.default_border {
                out.push_str(&format!("  LineColor {}{EOL}", item.border.to_html()));
            }
            out.push_str(&format!("  HorizontalAlignment {}{EOL}", item.align));
            out.push_str(&format!("}}{EOL}"));
        }
    }
}

fn style_of(map: &MindMap, id: TopicId, options: &ExportOptions) -> StyleItem {
    let colors = options.theme.colors(map, id);
    StyleItem {
        text: colors.text,
        fill: colors.fill,
        border: colors.border,
        align: alignment(map[id].attribute(attrs::ALIGN)),
    }
}

struct PumlWriter<'a> {
    map: &'a MindMap,
    options: &'a ExportOptions,
    links: LinkTable,
    styles: Styles,
    images: HashMap<TopicId, String>,
    out: String,
}

impl PumlWriter<'_> {
    fn topic(&mut self, id: TopicId, level: usize) {
        let map = self.map;
        let topic = &map[id];
        let note = topic.note().filter(|n| !n.encrypted);
        let file = topic.file();
        let link = topic.link();
        let jump = self.links.jump_of(topic);
        if topic.jump_target().is_some() && jump.is_none() {
            tracing::warn!(format = "plantuml", "dangling topic jump dropped");
        }
        let multiline = topic.text().trim().contains('\n')
            || note.is_some()
            || file.is_some()
            || link.is_some()
            || jump.is_some();

        self.out.push_str(&"*".repeat(level + 1));
        let mut need_space = true;
        if multiline {
            self.out.push(':');
            need_space = false;
        }
        if let Some(image) = self.images.get(&id) {
            if need_space {
                self.out.push(' ');
            }
            self.out.push_str(image);
            self.out.push(' ');
            need_space = false;
        }
        if need_space {
            self.out.push(' ');
        }

        if multiline {
            self.out.push_str(&format!("<b>{}</b>", escape_plantuml(topic.text(), false)));
            if let Some(note) = note {
                self.out.push_str(EOL);
                self.out.push_str(EOL);
                self.out.push_str(&escape_plantuml(&note.text, false));
                self.out.push_str(EOL);
            }
            if let Some(file) = file {
                let target = file_reference(file, self.options.base_folder.as_deref(), true);
                let name = match file.line() {
                    Some(line) => format!("{}:{line}", file.file_name()),
                    None => file.file_name().to_string(),
                };
                self.out.push_str(&format!(
                    "{EOL}<b>File:</b>  <b>[[{} {}]]</b>",
                    escape_plantuml(&target, true),
                    escape_plantuml(&name, true)
                ));
            }
            if let Some(link) = link {
                self.out.push_str(&format!(
                    "{EOL}<b>URI:</b>  <i>[[{}]]</i>",
                    escape_html(&link.as_string(true, true))
                ));
            }
            if let Some(target) = jump {
                self.out.push_str(&format!(
                    "{EOL}<b>Related to:</b>  <i>{}</i>",
                    escape_plantuml(map[target].text(), true)
                ));
            }
            self.out.push(';');
        } else {
            self.out.push_str(&format!("<b>{}</b>", escape_plantuml(topic.text().trim(), false)));
        }
        let class = self.styles.class_of(&style_of(map, id, self.options));
        self.out.push_str(&format!(" <<{class}>>{EOL}"));
    }

    fn subtree(&mut self, id: TopicId, level: usize) {
        self.topic(id, level);
        for child in self.map[id].children().to_vec() {
            self.subtree(child, level + 1);
        }
    }
}

pub fn serialize_to_plantuml(map: &MindMap, options: &ExportOptions) -> Result<String> {
    let theme = &options.theme;
    let mut writer = PumlWriter {
        map,
        options,
        links: LinkTable::build(map),
        styles: Styles::collect(map, options),
        images: HashMap::new(),
        out: String::new(),
    };

    let out = &mut writer.out;
    out.push_str(&format!("@startmindmap{EOL}"));
    out.push_str(&format!("skinparam {{{EOL}"));
    out.push_str(&format!("  shadowing {}{EOL}", theme.drop_shadow));
    out.push_str(&format!("  BackgroundColor {}{EOL}", theme.paper_color.to_html()));
    out.push_str(&format!("  ArrowColor {}{EOL}", theme.connector_color.to_html()));
    out.push_str(&format!("  ArrowThickness {}{EOL}", dbl(theme.connector_width)));
    out.push_str(&format!("  RoundCorner 0{EOL}"));
    out.push_str(&format!("  NodeBorderThickness {}{EOL}", dbl(theme.border_width)));
    out.push_str(&format!("  NodeBorderColor {}{EOL}", theme.border_color.to_html()));
    out.push_str(&format!("}}{EOL}"));
    out.push_str(&format!("<style>{EOL}"));
    writer.styles.write(&mut writer.out);
    writer.out.push_str(&format!("{EOL}</style>{EOL}"));

    let mut counter = 0;
    for id in map.iter() {
        if let Some(image) = map[id].attribute(attrs::IMAGE) {
            counter += 1;
            let name = format!("$image_{counter}");
            writer.out.push_str(&format!(
                "!{name}=\"<img data:image/png;base64,{}>\"{EOL}",
                image.trim()
            ));
            writer.images.insert(id, name);
        }
    }

    let root = map.root();
    writer.topic(root, 0);
    for child in map[root].children() {
        let side = if map.is_left_sided(*child) {
            "left side"
        } else {
            "right side"
        };
        writer.out.push_str(side);
        writer.out.push_str(EOL);
        writer.subtree(*child, 1);
    }
    writer.out.push_str("@endmindmap");
    Ok(writer.out)
}

/// Format implementation for PlantUML mind maps
pub struct PlantUmlFormat;

impl Format for PlantUmlFormat {
    fn name(&self) -> &str {
        "plantuml"
    }

    fn description(&self) -> &str {
        "PlantUML @startmindmap diagram source"
    }

    fn file_extensions(&self) -> &[&str] {
        &["puml", "plantuml"]
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, map: &MindMap, options: &ExportOptions) -> Result<SerializedDocument> {
        serialize_to_plantuml(map, options).map(SerializedDocument::Text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Extra;

    #[test]
    fn escapes_plantuml_markup() {
        assert_eq!(escape_plantuml("a[b]:c;", false), "a<U+005B>b<U+005D><U+003A>c<U+003B>");
        assert_eq!(escape_plantuml("x\ny\t\u{7}", true), "x\\ny\\t");
        assert_eq!(escape_plantuml("x\ny", false), "x\ny");
    }

    #[test]
    fn styles_are_deduplicated() {
        let mut map = MindMap::with_root("Root");
        let root = map.root();
        let a = map.create_child(root, "A", None).unwrap();
        let b = map.create_child(root, "B", None).unwrap();
        map.create_child(a, "A1", None).unwrap();
        map.set_attribute(b, attrs::FILL_COLOR, "#FF0000").unwrap();
        map.set_attribute(b, attrs::BORDER_COLOR, "#00FF00").unwrap();
        map.set_left_sided(b, true).unwrap();

        let out = serialize_to_plantuml(&map, &ExportOptions::default()).unwrap();
        assert!(out.starts_with("@startmindmap\nskinparam {\n  shadowing true\n"));
        assert!(out.contains("  ArrowThickness 1.5\n"));
        assert_eq!(out.matches("HorizontalAlignment").count(), 4);
        assert!(out.contains(".style4 {\n  BackgroundColor #FF0000\n  FontColor #000000\n  LineColor #00FF00\n"));
        assert!(out.contains("\n* <b>Root</b> <<style1>>\nright side\n** <b>A</b> <<style2>>\n*** <b>A1</b> <<style3>>\nleft side\n** <b>B</b> <<style4>>\n"));
        assert!(out.ends_with("@endmindmap"));
    }

    #[test]
    fn extras_make_multiline_nodes() {
        let mut map = MindMap::with_root("Root");
        let root = map.root();
        let a = map.create_child(root, "A", None).unwrap();
        let b = map.create_child(root, "B", None).unwrap();
        map.set_extra(a, Extra::note("n1")).unwrap();
        map.set_extra(a, Extra::link("https://example.com")).unwrap();
        map.link_to(a, b).unwrap();

        let out = serialize_to_plantuml(&map, &ExportOptions::default()).unwrap();
        assert!(out.contains(
            "**:<b>A</b>\n\nn1\n\n<b>URI:</b>  <i>[[https://example.com/]]</i>\n<b>Related to:</b>  <i>B</i>; <<style2>>\n"
        ));
    }

    #[test]
    fn jumps_name_their_target_without_anchors() {
        let mut map = MindMap::with_root("Root");
        let root = map.root();
        let a = map.create_child(root, "A", None).unwrap();
        let b = map.create_child(root, "B", None).unwrap();
        let c = map.create_child(root, "C", None).unwrap();
        map.set_attribute(b, attrs::UID, "uid\u{7}:b").unwrap();
        map.set_extra(a, Extra::jump("uid\u{7}:b")).unwrap();
        map.set_extra(c, Extra::jump("missing")).unwrap();

        let out = serialize_to_plantuml(&map, &ExportOptions::default()).unwrap();
        assert!(out.contains("<b>Related to:</b>  <i>B</i>;"));
        assert_eq!(out.matches("Related to:").count(), 1);
        assert!(!out.contains("uid"));
        assert!(!out.contains('\u{7}'));
    }
}
