//! Outline traversal shared by the heading-based exporters (Markdown, Org-mode, AsciiDoc).
//!
//!     [`walk`] drives an [`OutlineVisitor`] over the map in pre-order. The visitor holds no
//!     state of its own: everything it produces goes into the accumulator threaded through
//!     every call. Per topic the hooks fire in a fixed order:
//!
//!         heading (with the anchor, if the topic is a jump target)
//!         file, link, jump, note      (extra order)
//!         code snippets               (attachment order)
//!         children                    (recursively)
//!         end_topic
//!
//!     framed by `header` once before the root and `footer` once after it.
//!
//!     Jumps whose target does not exist are reported and skipped, encrypted notes are
//!     skipped, so visitors only ever see something they can render.

use super::links::LinkTable;
use crate::error::{Diagnostic, Result};
use crate::format::ExportOptions;
use crate::model::{Extra, MindMap, MmUri, Note, TopicId};

/// Everything a visitor may consult while rendering.
pub struct ExportContext<'a> {
    pub map: &'a MindMap,
    pub links: LinkTable,
    pub options: &'a ExportOptions,
    pub format: &'static str,
}

impl<'a> ExportContext<'a> {
    pub fn new(map: &'a MindMap, options: &'a ExportOptions, format: &'static str) -> Self {
        Self {
            map,
            links: LinkTable::build(map),
            options,
            format,
        }
    }

    pub fn text(&self, id: TopicId) -> &str {
        self.map[id].text()
    }
}

/// Level information for a topic heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingMarker {
    /// Distance from the root.
    pub level: usize,
    /// `min(level, max_heading_depth)`.
    pub depth: usize,
    /// Dotted ordinal (`1.2.3.`) for topics deeper than the maximum heading depth.
    pub ordinal: Option<String>,
}

impl HeadingMarker {
    pub fn is_fallback(&self) -> bool {
        self.ordinal.is_some()
    }
}

/// Build the marker of a topic from its child-index path.
///
/// The ordinal lists, one-based, the indices of every ancestor from the maximum heading
/// depth down to the topic itself.
pub fn heading_marker(path: &[usize], max_depth: usize) -> HeadingMarker {
    let level = path.len();
    let ordinal = (level > max_depth).then(|| {
        let start = max_depth.saturating_sub(1);
        path[start..]
            .iter()
            .map(|i| format!("{}.", i + 1))
            .collect::<String>()
    });
    HeadingMarker {
        level,
        depth: level.min(max_depth),
        ordinal,
    }
}

#[allow(unused_variables)]
pub trait OutlineVisitor {
    type Acc;

    fn header(&self, cx: &ExportContext<'_>, acc: &mut Self::Acc) -> Result<()> {
        Ok(())
    }

    fn heading(
        &self,
        cx: &ExportContext<'_>,
        topic: TopicId,
        marker: &HeadingMarker,
        anchor: Option<&str>,
        acc: &mut Self::Acc,
    ) -> Result<()>;

    fn file(&self, cx: &ExportContext<'_>, topic: TopicId, uri: &MmUri, acc: &mut Self::Acc) -> Result<()> {
        Ok(())
    }

    fn link(&self, cx: &ExportContext<'_>, topic: TopicId, uri: &MmUri, acc: &mut Self::Acc) -> Result<()> {
        Ok(())
    }

    /// Only called for jumps that resolve; `anchor` is the target's anchor.
    fn jump(
        &self,
        cx: &ExportContext<'_>,
        topic: TopicId,
        target: TopicId,
        anchor: &str,
        acc: &mut Self::Acc,
    ) -> Result<()> {
        Ok(())
    }

    fn note(&self, cx: &ExportContext<'_>, topic: TopicId, note: &Note, acc: &mut Self::Acc) -> Result<()> {
        Ok(())
    }

    fn code_snippet(
        &self,
        cx: &ExportContext<'_>,
        topic: TopicId,
        language: &str,
        body: &str,
        acc: &mut Self::Acc,
    ) -> Result<()> {
        Ok(())
    }

    fn end_topic(&self, cx: &ExportContext<'_>, topic: TopicId, acc: &mut Self::Acc) -> Result<()> {
        Ok(())
    }

    fn footer(&self, cx: &ExportContext<'_>, acc: &mut Self::Acc) -> Result<()> {
        Ok(())
    }
}

/// Drive `visitor` over the whole map.
pub fn walk<V: OutlineVisitor>(visitor: &V, cx: &ExportContext<'_>, acc: &mut V::Acc) -> Result<()> {
    visitor.header(cx, acc)?;
    let mut path = Vec::new();
    visit(visitor, cx, cx.map.root(), &mut path, acc)?;
    visitor.footer(cx, acc)
}

fn visit<V: OutlineVisitor>(
    visitor: &V,
    cx: &ExportContext<'_>,
    id: TopicId,
    path: &mut Vec<usize>,
    acc: &mut V::Acc,
) -> Result<()> {
    let topic = &cx.map[id];
    let marker = heading_marker(path, cx.options.max_heading_depth);
    visitor.heading(cx, id, &marker, cx.links.anchor(id), acc)?;

    for extra in topic.extras() {
        match extra {
            Extra::File(uri) => visitor.file(cx, id, uri, acc)?,
            Extra::Link(uri) => visitor.link(cx, id, uri, acc)?,
            Extra::TopicJump(uid) => match cx.links.resolve(uid) {
                Some(target) => match cx.links.anchor(target) {
                    Some(anchor) => visitor.jump(cx, id, target, anchor, acc)?,
                    None => Diagnostic::dangling(uid.as_str()).report(cx.format),
                },
                None => Diagnostic::dangling(uid.as_str()).report(cx.format),
            },
            Extra::Note(note) if note.encrypted => {
                tracing::debug!(format = cx.format, "encrypted note skipped");
            }
            Extra::Note(note) => visitor.note(cx, id, note, acc)?,
        }
    }

    for (language, body) in topic.code_snippets() {
        visitor.code_snippet(cx, id, language, body, acc)?;
    }

    for (index, child) in topic.children().iter().enumerate() {
        path.push(index);
        visit(visitor, cx, *child, path, acc)?;
        path.pop();
    }

    visitor.end_topic(cx, id, acc)
}
