//! Org-mode format implementation (export only)
//!
//! # Element Mapping Table
//!
//! | MindMap Element   | Org-mode Equivalent                          |
//! |-------------------|----------------------------------------------|
//! | Root topic        | `#+TITLE:` plus a level 1 heading            |
//! | Topic             | `*` × (level + 1) up to `max_heading_depth`  |
//! | Deep topic        | `*1.2.3.* text` pseudo heading               |
//! | Jump target       | `:PROPERTIES:` drawer, `:CUSTOM_ID: sec:<anchor>` |
//! | File extra        | `FILE: [[file:path]] \\`                     |
//! | Link extra        | `URL: [[url]] \\`                            |
//! | Topic jump        | `RELATED TO: [[#sec:anchor][text]] \\`       |
//! | Note              | Fixed-width lines (`: text`)                 |
//! | Code snippet      | `#+BEGIN_SRC lang` … `#+END_SRC`             |

use crate::common::escape::strip_controls;
use crate::common::outline::{walk, ExportContext, HeadingMarker, OutlineVisitor};
use crate::common::paths::file_reference;
use crate::error::Result;
use crate::format::{ExportOptions, Format, SerializedDocument};
use crate::model::{MindMap, MmUri, Note, TopicId};
use time::OffsetDateTime;

#[derive(Default)]
struct OrgWriter {
    out: String,
    extras_printed: bool,
}

impl OrgWriter {
    fn line(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
    }
}

/// Text on one line, control characters dropped.
fn one_line(text: &str) -> String {
    strip_controls(text).replace(['\n', '\t'], " ")
}

/// `2026-03-01 Sun 17:05:09`, the Org timestamp layout.
fn org_timestamp(at: OffsetDateTime) -> String {
    let weekday = at.weekday().to_string();
    format!(
        "{:04}-{:02}-{:02} {} {:02}:{:02}:{:02}",
        at.year(),
        u8::from(at.month()),
        at.day(),
        &weekday[..3],
        at.hour(),
        at.minute(),
        at.second()
    )
}

struct OrgVisitor;

impl OutlineVisitor for OrgVisitor {
    type Acc = OrgWriter;

    fn header(&self, cx: &ExportContext<'_>, acc: &mut OrgWriter) -> Result<()> {
        acc.line(&format!("#+TITLE: {}", one_line(cx.text(cx.map.root()))));
        acc.line(&format!("#+DATE: {}", org_timestamp(cx.options.generated_at)));
        acc.line(&format!("#+CREATOR: Generated by {}", one_line(&cx.options.generator)));
        Ok(())
    }

    fn heading(
        &self,
        cx: &ExportContext<'_>,
        topic: TopicId,
        marker: &HeadingMarker,
        anchor: Option<&str>,
        acc: &mut OrgWriter,
    ) -> Result<()> {
        acc.extras_printed = false;
        acc.line("");
        let text = one_line(cx.text(topic));
        match &marker.ordinal {
            Some(ordinal) => acc.line(&format!("*{ordinal}* {text}")),
            None => acc.line(&format!("{} {text}", "*".repeat(marker.depth + 1))),
        }
        if let Some(anchor) = anchor {
            acc.line(":PROPERTIES:");
            acc.line(&format!(":CUSTOM_ID: sec:{anchor}"));
            acc.line(":END:");
        }
        Ok(())
    }

    fn file(&self, cx: &ExportContext<'_>, _topic: TopicId, uri: &MmUri, acc: &mut OrgWriter) -> Result<()> {
        let target = file_reference(uri, cx.options.base_folder.as_deref(), true);
        acc.line(&format!("FILE: [[file:{target}]] \\\\"));
        acc.extras_printed = true;
        Ok(())
    }

    fn link(&self, _cx: &ExportContext<'_>, _topic: TopicId, uri: &MmUri, acc: &mut OrgWriter) -> Result<()> {
        acc.line(&format!("URL: [[{}]] \\\\", uri.as_string(true, true)));
        acc.extras_printed = true;
        Ok(())
    }

    fn jump(
        &self,
        cx: &ExportContext<'_>,
        _topic: TopicId,
        target: TopicId,
        anchor: &str,
        acc: &mut OrgWriter,
    ) -> Result<()> {
        let text = one_line(cx.text(target)).replace(['[', ']'], "");
        acc.line(&format!("RELATED TO: [[#sec:{anchor}][{text}]] \\\\"));
        acc.extras_printed = true;
        Ok(())
    }

    fn note(&self, _cx: &ExportContext<'_>, _topic: TopicId, note: &Note, acc: &mut OrgWriter) -> Result<()> {
        if acc.extras_printed {
            acc.line("");
        }
        for line in strip_controls(&note.text).split('\n') {
            acc.line(&format!(": {line}"));
        }
        Ok(())
    }

    fn code_snippet(
        &self,
        _cx: &ExportContext<'_>,
        _topic: TopicId,
        language: &str,
        body: &str,
        acc: &mut OrgWriter,
    ) -> Result<()> {
        acc.line(&format!("#+BEGIN_SRC {}", one_line(language).trim()));
        for line in strip_controls(body).lines() {
            acc.line(line);
        }
        acc.line("#+END_SRC");
        Ok(())
    }
}

pub fn serialize_to_org(map: &MindMap, options: &ExportOptions) -> Result<String> {
    let cx = ExportContext::new(map, options, "orgmode");
    let mut writer = OrgWriter::default();
    walk(&OrgVisitor, &cx, &mut writer)?;
    Ok(writer.out)
}

/// Format implementation for Org-mode
pub struct OrgModeFormat;

impl Format for OrgModeFormat {
    fn name(&self) -> &str {
        "orgmode"
    }

    fn description(&self) -> &str {
        "Emacs Org-mode outline"
    }

    fn file_extensions(&self) -> &[&str] {
        &["org"]
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, map: &MindMap, options: &ExportOptions) -> Result<SerializedDocument> {
        serialize_to_org(map, options).map(SerializedDocument::Text)
    }
}
