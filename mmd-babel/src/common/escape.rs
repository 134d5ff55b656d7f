//! Escaping rules shared by the text exporters.
//!
//!     Every function here drops raw control characters. Newline, carriage return and tab
//!     survive only where the target syntax has a way to carry them.

/// Remove control characters, keeping newlines and tabs.
pub fn strip_controls(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect()
}

/// Entity-escape text for HTML bodies. Newlines are kept as is.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\n' | '\t' => out.push(ch),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

/// Escape text for an XML element body.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' | '\t' => out.push(ch),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

/// Escape text for a double-quoted XML attribute. Line breaks become character references
/// so parsers do not normalize them to spaces.
pub fn escape_xml_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

const MD_SPECIAL: &str = "\\`*_{}[]()#<>+-.!";

/// Backslash-escape Markdown punctuation. Newlines become `<br/>`.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '\n' => out.push_str("<br/>"),
            c if MD_SPECIAL.contains(c) => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() && c != '\t' => {}
            c => out.push(c),
        }
    }
    out
}

/// Reverse of [`escape_markdown`].
pub fn unescape_markdown(text: &str) -> String {
    let text = text.replace("<br/>", "\n").replace("<br>", "\n");
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.peek().copied() {
                if MD_SPECIAL.contains(next) {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(ch);
    }
    out
}

/// Escape text placed inside a `<pre>` block.
pub fn escape_pre(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' | '\t' => out.push(ch),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

/// Decode the five predefined XML entities and numeric character references.
pub fn unescape_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let decoded = tail.find(';').and_then(|end| {
            let entity = &tail[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|d| d.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, end))
        });
        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controls_are_stripped_everywhere() {
        let text = "a\u{0007}b\u{0000}c";
        for escaped in [
            strip_controls(text),
            escape_html(text),
            escape_xml(text),
            escape_xml_attr(text),
            escape_markdown(text),
            escape_pre(text),
        ] {
            assert_eq!(escaped, "abc");
        }
    }

    #[test]
    fn xml_attribute_keeps_line_breaks_as_references() {
        assert_eq!(
            escape_xml_attr("a<b & \"c\"\nd\te"),
            "a&lt;b &amp; &quot;c&quot;&#10;d&#9;e"
        );
    }

    #[test]
    fn markdown_escape_round_trips() {
        let text = "1. *bold* [x](y)\nnext line #tag";
        let escaped = escape_markdown(text);
        assert_eq!(
            escaped,
            "1\\. \\*bold\\* \\[x\\]\\(y\\)<br/>next line \\#tag"
        );
        assert_eq!(unescape_markdown(&escaped), text);
    }

    #[test]
    fn entities_decode() {
        assert_eq!(
            unescape_entities("&lt;a&gt; &amp; &quot;b&quot; &#65;&#x42; &unknown"),
            "<a> & \"b\" AB &unknown"
        );
        assert_eq!(unescape_entities(&escape_pre("<x & \"y\">")), "<x & \"y\">");
    }
}
