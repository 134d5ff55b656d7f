//! Markdown serialization (MindMap → Markdown export)
//!
//! Runs the shared outline walk with a visitor that appends Markdown to a [`MdWriter`].

use crate::common::escape::{escape_markdown, strip_controls};
use crate::common::outline::{walk, ExportContext, HeadingMarker, OutlineVisitor};
use crate::common::paths::file_reference;
use crate::error::Result;
use crate::format::ExportOptions;
use crate::model::{MindMap, MmUri, Note, TopicId};

/// Output buffer plus the per-topic bookkeeping the visitor needs.
#[derive(Default)]
pub struct MdWriter {
    out: String,
    extras_printed: bool,
}

impl MdWriter {
    fn line(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Line ending in two spaces, a hard break inside a block quote.
    fn marked_line(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push_str("  \n");
        self.extras_printed = true;
    }
}

struct MarkdownVisitor;

/// Heading text on a single line.
fn heading_text(text: &str) -> String {
    escape_markdown(&strip_controls(text))
}

/// File name plus the `line` parameter, if any.
fn line_info(uri: &MmUri) -> String {
    match uri.line() {
        Some(line) => format!("{}:{line}", uri.file_name()),
        None => uri.file_name().to_string(),
    }
}

impl OutlineVisitor for MarkdownVisitor {
    type Acc = MdWriter;

    fn header(&self, cx: &ExportContext<'_>, acc: &mut MdWriter) -> Result<()> {
        acc.line("<!--");
        acc.line(&format!("Generated by {}", strip_controls(&cx.options.generator).replace("--", "- -")));
        acc.line(&cx.options.timestamp());
        acc.line("-->");
        Ok(())
    }

    fn heading(
        &self,
        cx: &ExportContext<'_>,
        topic: TopicId,
        marker: &HeadingMarker,
        anchor: Option<&str>,
        acc: &mut MdWriter,
    ) -> Result<()> {
        acc.extras_printed = false;
        acc.line("");
        if let Some(anchor) = anchor {
            acc.line(&format!("<a name=\"{anchor}\"></a>"));
        }
        let text = heading_text(cx.text(topic));
        match &marker.ordinal {
            Some(ordinal) => acc.line(&format!("**{ordinal}** {text}")),
            None => {
                let hashes = "#".repeat((marker.depth + 2).min(6));
                acc.line(&format!("{hashes} {text}"));
            }
        }
        Ok(())
    }

    fn file(&self, cx: &ExportContext<'_>, _topic: TopicId, uri: &MmUri, acc: &mut MdWriter) -> Result<()> {
        let target = file_reference(uri, cx.options.base_folder.as_deref(), true);
        acc.marked_line(&format!(
            "> File: [{}]({})",
            escape_markdown(&line_info(uri)),
            target
        ));
        Ok(())
    }

    fn link(&self, _cx: &ExportContext<'_>, _topic: TopicId, uri: &MmUri, acc: &mut MdWriter) -> Result<()> {
        acc.marked_line(&format!(
            "> Url: [{}]({})",
            escape_markdown(&uri.as_string(false, true)),
            uri.as_string(true, true)
        ));
        Ok(())
    }

    fn jump(
        &self,
        cx: &ExportContext<'_>,
        _topic: TopicId,
        target: TopicId,
        anchor: &str,
        acc: &mut MdWriter,
    ) -> Result<()> {
        let text = heading_text(&cx.text(target).replace('\n', " "));
        acc.marked_line(&format!("*Related to: [{text}](#{anchor})*"));
        Ok(())
    }

    fn note(&self, _cx: &ExportContext<'_>, _topic: TopicId, note: &Note, acc: &mut MdWriter) -> Result<()> {
        if acc.extras_printed {
            acc.line("");
        }
        for line in strip_controls(&note.text).split('\n') {
            if line.trim().is_empty() {
                acc.line(">");
            } else {
                acc.line(&format!("> {}", escape_markdown(line)));
            }
        }
        Ok(())
    }

    fn code_snippet(
        &self,
        _cx: &ExportContext<'_>,
        _topic: TopicId,
        language: &str,
        body: &str,
        acc: &mut MdWriter,
    ) -> Result<()> {
        acc.line("");
        acc.line(&format!("```{}", strip_controls(language).trim()));
        for line in strip_controls(body).lines() {
            acc.line(line);
        }
        acc.line("```");
        Ok(())
    }
}

/// Serialize a mind map to Markdown
pub fn serialize_to_markdown(map: &MindMap, options: &ExportOptions) -> Result<String> {
    let cx = ExportContext::new(map, options, "markdown");
    let mut writer = MdWriter::default();
    walk(&MarkdownVisitor, &cx, &mut writer)?;
    Ok(writer.out)
}
