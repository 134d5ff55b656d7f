//! Native document parsing (`.mmd` → MindMap)
//!
//! The header runs up to the first line made only of dashes; `>` lines in it hold map
//! attributes. The body is read line by line:
//!
//! - `#...# text` starts a topic, the number of `#` giving its depth
//! - `> key=`value`,...` sets attributes of the current topic
//! - `- KEYWORD` announces an extra whose value is the following `<pre>` block
//! - a fenced block adds a code snippet
//!
//! A heading deeper than expected attaches to the closest shallower topic.

use crate::common::escape::{unescape_entities, unescape_markdown};
use crate::error::{FormatError, Result};
use crate::model::{attrs, Extra, ExtraType, MindMap, Note, TopicId};

const FORMAT: &str = "mmd";

/// Offset of the closing fence: the last `n` backticks of the first run at least `n` long.
fn closing_fence(text: &str, n: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && bytes[i] == b'`' {
            i += 1;
        }
        if i - start >= n {
            return Some(i - n);
        }
    }
    None
}

/// Split `key=`value`,key2=``v`2``` pairs. Parsing stops at the first malformed pair.
pub fn parse_attributes(text: &str) -> Vec<(String, String)> {
    let mut result = Vec::new();
    let mut rest = text;
    loop {
        rest = rest.trim_start_matches(|c: char| c == ',' || c.is_whitespace());
        let Some(eq) = rest.find('=') else { break };
        let key = rest[..eq].trim();
        let after = rest[eq + 1..].trim_start();
        let run = after.bytes().take_while(|b| *b == b'`').count();
        if key.is_empty() || key.contains(char::is_whitespace) || run == 0 {
            break;
        }
        // longest opening fence first; a shorter one means the value starts with backticks
        let parsed = (1..=run).rev().find_map(|n| {
            closing_fence(&after[n..], n).map(|end| (after[n..n + end].to_string(), n + end + n))
        });
        let Some((value, consumed)) = parsed else { break };
        result.push((key.to_string(), value));
        rest = &after[consumed..];
    }
    result
}

/// Depth and text of a `# heading` line.
fn heading(line: &str) -> Option<(usize, &str)> {
    let depth = line.chars().take_while(|c| *c == '#').count();
    let rest = &line[depth..];
    (depth > 0 && (rest.is_empty() || rest.starts_with(char::is_whitespace)))
        .then(|| (depth, rest.trim_start()))
}

struct MmdReader {
    map: MindMap,
    /// Open topics with their heading depth, root first.
    stack: Vec<(usize, TopicId)>,
    pending: Option<ExtraType>,
}

impl MmdReader {
    fn current(&self) -> Option<TopicId> {
        self.stack.last().map(|(_, id)| *id)
    }

    fn open_topic(&mut self, depth: usize, text: &str) -> Result<()> {
        let text = unescape_markdown(text);
        if self.stack.is_empty() {
            let root = self.map.root();
            self.map.set_text(root, text)?;
            self.stack.push((depth, root));
            return Ok(());
        }
        while self.stack.len() > 1 && self.stack.last().is_some_and(|(d, _)| *d >= depth) {
            self.stack.pop();
        }
        let (parent_depth, parent) = self.stack[self.stack.len() - 1];
        if parent_depth >= depth {
            tracing::warn!(depth, text = %text, "heading at root level, attached to the root");
        }
        let topic = self.map.create_child(parent, text, None)?;
        self.stack.push((depth, topic));
        Ok(())
    }

    fn extra(&mut self, kind: ExtraType, raw: &str) -> Result<()> {
        let Some(topic) = self.current() else {
            return Ok(());
        };
        let value = unescape_entities(raw);
        let extra = if kind == ExtraType::Note {
            let encrypted = self.map[topic].flag(attrs::NOTE_ENCRYPTED);
            let hint = self.map[topic].attribute(attrs::NOTE_HINT).map(str::to_string);
            self.map.remove_attribute(topic, attrs::NOTE_ENCRYPTED)?;
            self.map.remove_attribute(topic, attrs::NOTE_HINT)?;
            if encrypted {
                Extra::Note(Note::encrypted(value, hint))
            } else {
                Extra::note(value)
            }
        } else {
            Extra::from_value(kind, value.trim())
        };
        self.map.set_extra(topic, extra)?;
        Ok(())
    }
}

pub fn parse_from_mmd(source: &str) -> Result<MindMap> {
    let lines: Vec<&str> = source.lines().map(|l| l.trim_end_matches('\r')).collect();
    let separator = lines
        .iter()
        .position(|l| {
            let l = l.trim();
            !l.is_empty() && l.chars().all(|c| c == '-')
        })
        .ok_or_else(|| FormatError::malformed(FORMAT, "missing '---' line after the document header"))?;

    let mut reader = MmdReader {
        map: MindMap::new(),
        stack: Vec::new(),
        pending: None,
    };
    for line in &lines[..separator] {
        if let Some(rest) = line.trim_start().strip_prefix('>') {
            for (key, value) in parse_attributes(rest) {
                reader.map.set_map_attribute(key, Some(value));
            }
        }
    }

    let mut body = lines[separator + 1..].iter().copied();
    while let Some(line) = body.next() {
        let trimmed = line.trim_start();
        if let Some((depth, text)) = heading(trimmed) {
            reader.pending = None;
            reader.open_topic(depth, text)?;
        } else if trimmed.starts_with("```") {
            let fence_len = trimmed.chars().take_while(|c| *c == '`').count();
            let language = trimmed[fence_len..].trim().to_string();
            let mut code = Vec::new();
            for code_line in body.by_ref() {
                let t = code_line.trim();
                if t.len() >= fence_len && t.chars().all(|c| c == '`') {
                    break;
                }
                code.push(code_line);
            }
            if let Some(topic) = reader.current() {
                reader.map.add_code_snippet(topic, language, code.join("\n"))?;
            }
            reader.pending = None;
        } else if let Some(rest) = trimmed.strip_prefix("<pre>") {
            let mut raw = String::new();
            let mut current = rest;
            loop {
                if let Some(end) = current.find("</pre>") {
                    raw.push_str(&current[..end]);
                    break;
                }
                raw.push_str(current);
                match body.next() {
                    Some(next) => {
                        raw.push('\n');
                        current = next;
                    }
                    None => {
                        return Err(FormatError::malformed(FORMAT, "unterminated <pre> block"));
                    }
                }
            }
            if let Some(kind) = reader.pending.take() {
                reader.extra(kind, &raw)?;
            }
        } else if let Some(rest) = trimmed.strip_prefix('>') {
            reader.pending = None;
            if let Some(topic) = reader.current() {
                for (key, value) in parse_attributes(rest) {
                    reader.map.set_attribute(topic, key, value)?;
                }
            }
        } else if let Some(keyword) = trimmed.strip_prefix("- ") {
            reader.pending = ExtraType::from_keyword(keyword);
            if reader.pending.is_none() {
                tracing::warn!(keyword = keyword.trim(), "unknown extra type in mmd document");
            }
        } else if !trimmed.is_empty() {
            reader.pending = None;
        }
    }

    tracing::debug!(topics = reader.map.topic_count(), "mmd import finished");
    Ok(reader.map)
}
