//! Plain text serialization
//!
//! Every topic is a block shifted right by one space per level and underlined with `=` (root),
//! `-` (first level) or `.` (deeper), two characters wider than its longest line.

use crate::common::escape::strip_controls;
use crate::common::outline::{walk, ExportContext, HeadingMarker, OutlineVisitor};
use crate::error::Result;
use crate::format::ExportOptions;
use crate::model::{MindMap, MmUri, Note, TopicId};

#[derive(Default)]
struct TextWriter {
    out: String,
    shift: usize,
    extras_printed: bool,
    snippets: usize,
}

impl TextWriter {
    /// Append `text`, every line of it shifted to the current indentation.
    fn shifted(&mut self, text: &str) {
        let pad = " ".repeat(self.shift);
        for line in text.replace('\r', "").split('\n') {
            self.out.push_str(&pad);
            self.out.push_str(line);
            self.out.push('\n');
        }
    }
}

fn underline_char(level: usize) -> char {
    match level {
        0 => '=',
        1 => '-',
        _ => '.',
    }
}

struct TextVisitor;

impl OutlineVisitor for TextVisitor {
    type Acc = TextWriter;

    fn header(&self, cx: &ExportContext<'_>, acc: &mut TextWriter) -> Result<()> {
        acc.out.push_str(&format!("# Generated by {}\n", strip_controls(&cx.options.generator).replace('\n', " ")));
        acc.out.push_str(&format!("# {}\n", cx.options.timestamp()));
        Ok(())
    }

    fn heading(
        &self,
        cx: &ExportContext<'_>,
        topic: TopicId,
        marker: &HeadingMarker,
        _anchor: Option<&str>,
        acc: &mut TextWriter,
    ) -> Result<()> {
        acc.shift = marker.level;
        acc.extras_printed = false;
        acc.snippets = 0;
        acc.out.push('\n');

        let text = strip_controls(cx.text(topic));
        let widest = text.split('\n').map(|l| l.chars().count()).max().unwrap_or(0);
        acc.shifted(&text);
        acc.shifted(&underline_char(marker.level).to_string().repeat(widest + 2));
        Ok(())
    }

    fn file(&self, _cx: &ExportContext<'_>, _topic: TopicId, uri: &MmUri, acc: &mut TextWriter) -> Result<()> {
        acc.shifted(&format!("FILE: {}", uri.as_string(false, false)));
        acc.extras_printed = true;
        Ok(())
    }

    fn link(&self, _cx: &ExportContext<'_>, _topic: TopicId, uri: &MmUri, acc: &mut TextWriter) -> Result<()> {
        acc.shifted(&format!("URL: {}", uri.as_string(false, false)));
        acc.extras_printed = true;
        Ok(())
    }

    fn jump(
        &self,
        cx: &ExportContext<'_>,
        _topic: TopicId,
        target: TopicId,
        _anchor: &str,
        acc: &mut TextWriter,
    ) -> Result<()> {
        let text = strip_controls(cx.text(target)).replace(['\n', '\t'], " ");
        acc.shifted(&format!("Related to: \"{text}\""));
        acc.extras_printed = true;
        Ok(())
    }

    fn note(&self, _cx: &ExportContext<'_>, _topic: TopicId, note: &Note, acc: &mut TextWriter) -> Result<()> {
        if acc.extras_printed {
            acc.out.push('\n');
        }
        acc.shifted(&strip_controls(&note.text));
        Ok(())
    }

    fn code_snippet(
        &self,
        _cx: &ExportContext<'_>,
        _topic: TopicId,
        language: &str,
        body: &str,
        acc: &mut TextWriter,
    ) -> Result<()> {
        if acc.snippets > 0 {
            acc.out.push('\n');
        }
        acc.snippets += 1;
        acc.shifted(&format!("====BEGIN SOURCE ({})", strip_controls(language).trim()));
        for line in strip_controls(body).lines() {
            acc.shifted(line);
        }
        acc.shifted("====END SOURCE");
        Ok(())
    }
}

pub fn serialize_to_text(map: &MindMap, options: &ExportOptions) -> Result<String> {
    let cx = ExportContext::new(map, options, "text");
    let mut writer = TextWriter::default();
    walk(&TextVisitor, &cx, &mut writer)?;
    Ok(writer.out)
}
