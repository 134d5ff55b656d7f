//! Helpers shared by the importers.
//!
//! When a source offers several candidate images or URLs for one topic, the first one that
//! resolves becomes the image attribute or link extra. If none resolves, or there was more
//! than one, every candidate is listed in a "Detected ..." section of the topic note so
//! nothing is silently lost.

use crate::common::color::Color;
use crate::error::ModelError;
use crate::model::{attrs, Extra, MindMap, TopicId};

const SECTION_RULE: &str = "---------------";

/// Outcome of [`first_resolved`].
pub(crate) struct Resolved<T> {
    pub value: Option<T>,
    /// Whether the candidates should also be listed in the note.
    pub ambiguous: bool,
}

pub(crate) fn first_resolved<T>(
    candidates: &[String],
    resolve: impl FnMut(&str) -> Option<T>,
) -> Resolved<T> {
    let mut resolve = resolve;
    let value = candidates.iter().find_map(|c| resolve(c));
    let ambiguous = !candidates.is_empty() && (value.is_none() || candidates.len() > 1);
    Resolved { value, ambiguous }
}

/// `Title`, a rule, then one candidate per line.
pub(crate) fn detected_section(title: &str, candidates: &[String]) -> String {
    let mut section = format!("{title}\n{SECTION_RULE}");
    for candidate in candidates {
        section.push('\n');
        section.push_str(candidate);
    }
    section
}

/// Append a section to the topic note, separated from existing text by a blank line.
pub(crate) fn append_to_note(map: &mut MindMap, topic: TopicId, section: &str) -> Result<(), ModelError> {
    let text = match map[topic].note() {
        Some(note) if !note.text.is_empty() && !note.encrypted => format!("{}\n\n{section}", note.text),
        _ => section.to_string(),
    };
    map.set_extra(topic, Extra::note(text))
}

/// Use `color` as the topic fill with a contrasting text color.
pub(crate) fn set_fill_with_contrast(map: &mut MindMap, topic: TopicId, color: Color) -> Result<(), ModelError> {
    map.set_attribute(topic, attrs::FILL_COLOR, color.to_html())?;
    map.set_attribute(topic, attrs::TEXT_COLOR, color.contrast().to_html())
}
