//! AsciiDoc format implementation (export only)
//!
//! The root becomes the document title (`= Title` plus the `:encoding:` and `:Date:`
//! attributes), every other topic a section of `=` × (level + 1). Jump targets get an inline
//! `[[anchor]]` right before their heading, jumps render as `<<anchor,text>>`. Notes are quote
//! blocks, code snippets `[source,lang]` listing blocks.

use crate::common::escape::strip_controls;
use crate::common::outline::{walk, ExportContext, HeadingMarker, OutlineVisitor};
use crate::common::paths::file_reference;
use crate::error::Result;
use crate::format::{ExportOptions, Format, SerializedDocument};
use crate::model::{MindMap, MmUri, Note, TopicId};

/// Heading text; line breaks become AsciiDoc passthrough breaks.
fn head(text: &str) -> String {
    strip_controls(text).replace('\t', " ").replace('\n', " pass:[<br>]")
}

struct AsciiDocVisitor;

impl OutlineVisitor for AsciiDocVisitor {
    type Acc = String;

    fn header(&self, cx: &ExportContext<'_>, acc: &mut String) -> Result<()> {
        acc.push_str(&format!("// Generated by {}\n", strip_controls(&cx.options.generator).replace('\n', " ")));
        Ok(())
    }

    fn heading(
        &self,
        cx: &ExportContext<'_>,
        topic: TopicId,
        marker: &HeadingMarker,
        anchor: Option<&str>,
        acc: &mut String,
    ) -> Result<()> {
        if marker.level > 0 {
            acc.push('\n');
        }
        if let Some(anchor) = anchor {
            acc.push_str(&format!("[[{anchor}]]\n"));
        }
        let text = head(cx.text(topic));
        match &marker.ordinal {
            Some(ordinal) => acc.push_str(&format!("*{ordinal}* {text}\n")),
            None => acc.push_str(&format!("{} {text}\n", "=".repeat(marker.depth + 1))),
        }
        if marker.level == 0 {
            acc.push_str(":encoding: UTF-8\n");
            acc.push_str(&format!(":Date: {}\n", cx.options.timestamp()));
        }
        Ok(())
    }

    fn file(&self, cx: &ExportContext<'_>, _topic: TopicId, uri: &MmUri, acc: &mut String) -> Result<()> {
        let target = file_reference(uri, cx.options.base_folder.as_deref(), false);
        acc.push_str(&format!("\nlink:++{target}++[File]\n"));
        Ok(())
    }

    fn link(&self, _cx: &ExportContext<'_>, _topic: TopicId, uri: &MmUri, acc: &mut String) -> Result<()> {
        acc.push_str(&format!("\nlink:{}[Link]\n", uri.as_string(true, true)));
        Ok(())
    }

    fn jump(
        &self,
        cx: &ExportContext<'_>,
        _topic: TopicId,
        target: TopicId,
        anchor: &str,
        acc: &mut String,
    ) -> Result<()> {
        let text = strip_controls(cx.text(target)).replace(['\n', '\t'], " ").replace(">>", "> >");
        acc.push_str(&format!("\n<<{anchor},{text}>>\n"));
        Ok(())
    }

    fn note(&self, _cx: &ExportContext<'_>, _topic: TopicId, note: &Note, acc: &mut String) -> Result<()> {
        acc.push_str("\n____\n");
        for line in strip_controls(&note.text).split('\n') {
            // a bare delimiter line would close the block early
            if line.trim() == "____" {
                acc.push_str("pass:[____]\n");
            } else {
                acc.push_str(line);
                acc.push('\n');
            }
        }
        acc.push_str("____\n");
        Ok(())
    }

    fn code_snippet(
        &self,
        _cx: &ExportContext<'_>,
        _topic: TopicId,
        language: &str,
        body: &str,
        acc: &mut String,
    ) -> Result<()> {
        acc.push_str(&format!("\n[source,{}]\n----\n", strip_controls(language).trim()));
        let body = strip_controls(body);
        acc.push_str(&body);
        if !body.ends_with('\n') {
            acc.push('\n');
        }
        acc.push_str("----\n");
        Ok(())
    }
}

pub fn serialize_to_asciidoc(map: &MindMap, options: &ExportOptions) -> Result<String> {
    let cx = ExportContext::new(map, options, "asciidoc");
    let mut out = String::new();
    walk(&AsciiDocVisitor, &cx, &mut out)?;
    Ok(out)
}

/// Format implementation for AsciiDoc
pub struct AsciiDocFormat;

impl Format for AsciiDocFormat {
    fn name(&self) -> &str {
        "asciidoc"
    }

    fn description(&self) -> &str {
        "AsciiDoc document with one section per topic"
    }

    fn file_extensions(&self) -> &[&str] {
        &["asciidoc", "adoc"]
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, map: &MindMap, options: &ExportOptions) -> Result<SerializedDocument> {
        serialize_to_asciidoc(map, options).map(SerializedDocument::Text)
    }
}
