//! FreeMind serialization (MindMap → `.mm` XML)
//!
//! Topics become nested `<node>` elements. FreeMind has a single `LINK` slot per node, so
//! extras compete for it: a resolvable jump wins, then the file, then the link. Whatever
//! lost goes into an HTML list inside the `NOTE` rich content, next to the note itself, where
//! the importer picks it up again.

use crate::common::color::Color;
use crate::common::escape::{escape_xml, escape_xml_attr};
use crate::common::links::LinkTable;
use crate::error::Result;
use crate::format::ExportOptions;
use crate::model::{attrs, MindMap, MmUri, TopicId};

/// Synthetic node id built from the child-index path.
///
/// Every index is written in base 26 with lowercase letters for the leading digits and an
/// uppercase letter for the last one, so concatenated indices stay unambiguous.
pub fn path_id(path: &[usize]) -> String {
    let mut id = String::from("mmlink");
    for &index in path {
        let mut digits = Vec::new();
        let mut rest = index;
        loop {
            digits.push((rest % 26) as u8);
            rest /= 26;
            if rest == 0 {
                break;
            }
        }
        let last = digits.len() - 1;
        for (i, digit) in digits.iter().rev().enumerate() {
            let base = if i == last { b'A' } else { b'a' };
            id.push((base + digit) as char);
        }
    }
    id
}

struct FreeMindWriter<'a> {
    map: &'a MindMap,
    links: LinkTable,
    created: i128,
    out: String,
}

impl FreeMindWriter<'_> {
    fn color_attr(&mut self, name: &str, value: Option<&str>) {
        if let Some(color) = value.and_then(Color::parse) {
            self.out.push_str(&format!(" {name}=\"{}\"", color.to_html()));
        }
    }

    fn topic(&mut self, id: TopicId, indent: usize) {
        let map = self.map;
        let topic = &map[id];
        let pad = " ".repeat(indent);

        self.out.push_str(&format!(
            "{pad}<node CREATED=\"{}\" MODIFIED=\"{}\"",
            self.created, self.created
        ));
        self.color_attr("COLOR", topic.attribute(attrs::TEXT_COLOR));
        self.color_attr("BACKGROUND_COLOR", topic.attribute(attrs::FILL_COLOR));
        if map.level(id) == 1 {
            let side = if map.is_left_sided(id) { "left" } else { "right" };
            self.out.push_str(&format!(" POSITION=\"{side}\""));
        }
        if topic.is_collapsed() {
            self.out.push_str(" FOLDED=\"true\"");
        }
        self.out.push_str(&format!(
            " ID=\"{}\" TEXT=\"{}\"",
            path_id(&map.path(id)),
            escape_xml_attr(topic.text())
        ));

        let jump = self.links.jump_of(topic).map(|target| path_id(&map.path(target)));
        let file = topic.file();
        let link = topic.link();
        let mut leftovers: Vec<(&str, &MmUri)> = Vec::new();
        let main_link = match (&jump, file, link) {
            (Some(target), _, _) => {
                leftovers.extend(file.map(|f| ("FILE", f)));
                leftovers.extend(link.map(|l| ("LINK", l)));
                Some(format!("#{target}"))
            }
            (None, Some(file), _) => {
                leftovers.extend(link.map(|l| ("LINK", l)));
                Some(file.as_string(false, true))
            }
            (None, None, Some(link)) => Some(link.as_string(false, true)),
            (None, None, None) => None,
        };
        if let Some(main_link) = main_link {
            self.out.push_str(&format!(" LINK=\"{}\"", escape_xml_attr(&main_link)));
        }
        self.out.push_str(">\n");

        let inner = " ".repeat(indent + 1);
        self.out.push_str(&format!("{inner}<edge WIDTH=\"thin\"/>\n"));
        if let Some(target) = &jump {
            self.out.push_str(&format!(
                "{inner}<arrowlink DESTINATION=\"{target}\" ENDARROW=\"Default\" STARTARROW=\"None\"/>\n"
            ));
        }

        let mut body = String::new();
        if !leftovers.is_empty() {
            body.push_str("<ul>");
            for (label, uri) in &leftovers {
                let value = uri.as_string(false, true);
                body.push_str(&format!(
                    "<li><b>{label}: </b><a href=\"{}\">{}</a></li>",
                    escape_xml_attr(&value),
                    escape_xml(&value)
                ));
            }
            body.push_str("</ul>");
        }
        if let Some(note) = topic.note().filter(|n| !n.encrypted) {
            body.push_str(&format!("<p><pre>{}</pre></p>", escape_xml(&note.text)));
        }
        if !body.is_empty() {
            self.out.push_str(&format!(
                "{inner}<richcontent TYPE=\"NOTE\"><html><head></head><body>{body}</body></html></richcontent>\n"
            ));
        }

        for &child in topic.children() {
            self.topic(child, indent + 1);
        }
        self.out.push_str(&format!("{pad}</node>\n"));
    }
}

pub fn serialize_to_freemind(map: &MindMap, options: &ExportOptions) -> Result<String> {
    let mut writer = FreeMindWriter {
        map,
        links: LinkTable::build(map),
        created: options.timestamp_millis(),
        out: String::new(),
    };
    writer.out.push_str("<map version=\"1.0.1\">\n<!--\n");
    writer.out.push_str(&format!(
        "Generated by {}\n{}\n-->\n",
        escape_xml(&options.generator).replace("--", "- -"),
        options.timestamp()
    ));
    writer.topic(map.root(), 1);
    writer.out.push_str("</map>");
    tracing::debug!(topics = map.topic_count(), "freemind export finished");
    Ok(writer.out)
}
