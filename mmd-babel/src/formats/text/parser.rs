//! Plain text import: indentation defines nesting.
//!
//! Blank lines are ignored. The offset of a line counts leading whitespace, a tab advancing
//! to the next multiple of [`TAB_POSITIONS`]. A line becomes a child of the closest previous
//! line with a smaller offset; when there is none it goes under the least indented line seen
//! so far. The first line is the root.

use crate::error::Result;
use crate::model::{MindMap, TopicId};

pub const TAB_POSITIONS: usize = 16;

/// Indentation width of `line`.
pub fn data_offset(line: &str) -> usize {
    let mut offset = 0;
    for ch in line.chars() {
        match ch {
            '\t' => offset += TAB_POSITIONS - offset % TAB_POSITIONS,
            c if c.is_whitespace() => offset += 1,
            _ => break,
        }
    }
    offset
}

pub fn parse_from_text(source: &str) -> Result<MindMap> {
    let mut lines = source.lines().filter(|l| !l.trim().is_empty());
    let Some(first) = lines.next() else {
        return Ok(MindMap::new());
    };

    let mut map = MindMap::with_root(first.trim());
    // newest first
    let mut stack: Vec<(usize, TopicId)> = vec![(data_offset(first), map.root())];

    for line in lines {
        let offset = data_offset(line);
        let parent = stack
            .iter()
            .rev()
            .find(|(o, _)| *o < offset)
            .or_else(|| stack.iter().min_by_key(|(o, _)| *o))
            .map(|(_, id)| *id)
            .unwrap_or_else(|| map.root());
        let topic = map.create_child(parent, line.trim(), None)?;
        stack.push((offset, topic));
    }

    let root = map.root();
    let children = map[root].children().to_vec();
    let left = (children.len() + 1) / 2;
    for child in &children[..left] {
        map.set_left_sided(*child, true)?;
    }
    tracing::debug!(topics = map.topic_count(), "text outline imported");
    Ok(map)
}
