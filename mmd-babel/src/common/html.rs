//! Reduction of HTML fragments (rich notes, attachments) to plain text.
//!
//! We use `html5ever` with the `markup5ever_rcdom` tree: imported HTML is authored by other
//! tools and is rarely well-formed, so a browser-grade parser is the only safe choice.
//! Images and hyperlinks are collected separately so importers can turn them into extras.

use html5ever::tendril::TendrilSink;
use html5ever::parse_document;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Plain text plus the references found in an HTML fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlSummary {
    pub text: String,
    /// `src` of every `<img>`, in document order.
    pub images: Vec<String>,
    /// `(href, anchor text)` of every `<a href>`, in document order.
    pub links: Vec<(String, String)>,
}

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "pre", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "table",
    "blockquote", "section", "article",
];

pub fn reduce(html: &str) -> HtmlSummary {
    let dom = parse_document(RcDom::default(), Default::default()).one(html);
    let mut summary = HtmlSummary::default();
    let mut text = String::new();
    walk(&dom.document, &mut text, &mut summary, false);
    summary.text = tidy(&text);
    summary
}

fn walk(handle: &Handle, text: &mut String, summary: &mut HtmlSummary, in_pre: bool) {
    match &handle.data {
        NodeData::Text { contents } => {
            let contents = contents.borrow();
            if in_pre {
                text.push_str(&contents);
            } else {
                push_collapsed(text, &contents);
            }
        }
        NodeData::Element { name, attrs, .. } => {
            let tag = name.local.as_ref();
            let attr = |key: &str| {
                attrs
                    .borrow()
                    .iter()
                    .find(|a| a.name.local.as_ref() == key)
                    .map(|a| a.value.to_string())
            };
            match tag {
                "script" | "style" | "head" | "title" => return,
                "br" => {
                    text.push('\n');
                    return;
                }
                "img" => {
                    if let Some(src) = attr("src").filter(|s| !s.trim().is_empty()) {
                        summary.images.push(src.trim().to_string());
                    }
                    return;
                }
                "a" => {
                    if let Some(href) = attr("href").filter(|s| !s.trim().is_empty()) {
                        let mut inner = String::new();
                        collect_text(handle, &mut inner);
                        summary
                            .links
                            .push((href.trim().to_string(), inner.trim().to_string()));
                    }
                }
                _ => {}
            }

            let block = BLOCK_TAGS.contains(&tag);
            if block && !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            let pre = in_pre || tag == "pre";
            for child in handle.children.borrow().iter() {
                walk(child, text, summary, pre);
            }
            if block && !text.ends_with('\n') {
                text.push('\n');
            }
        }
        _ => {
            for child in handle.children.borrow().iter() {
                walk(child, text, summary, in_pre);
            }
        }
    }
}

fn collect_text(handle: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &handle.data {
        push_collapsed(out, &contents.borrow());
    }
    for child in handle.children.borrow().iter() {
        collect_text(child, out);
    }
}

fn push_collapsed(out: &mut String, text: &str) {
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !out.is_empty() && !out.ends_with([' ', '\n']) {
                out.push(' ');
            }
        } else {
            out.push(ch);
        }
    }
}

/// Trim trailing spaces of every line and squeeze runs of blank lines.
fn tidy(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim_end) {
        if line.is_empty() && lines.last().is_some_and(|l| l.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    lines.join("\n").trim_matches('\n').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_become_lines() {
        let summary = reduce("<html><body><p>First   line</p><p>Second<br/>Third</p></body></html>");
        assert_eq!(summary.text, "First line\nSecond\nThird");
    }

    #[test]
    fn collects_images_and_links() {
        let summary = reduce(
            r#"<div>FILE: <a href="docs/a.txt">a.txt</a><br>LINK: <a href="https://x.org">x</a><img src="pic.png"></div>"#,
        );
        assert_eq!(
            summary.links,
            vec![
                ("docs/a.txt".to_string(), "a.txt".to_string()),
                ("https://x.org".to_string(), "x".to_string())
            ]
        );
        assert_eq!(summary.images, vec!["pic.png".to_string()]);
        assert_eq!(summary.text, "FILE: a.txt\nLINK: x");
    }

    #[test]
    fn pre_keeps_whitespace() {
        let summary = reduce("<pre>a  b\n  c</pre>");
        assert_eq!(summary.text, "a  b\n  c");
    }

    #[test]
    fn entities_are_decoded() {
        assert_eq!(reduce("<p>&lt;tag&gt; &amp; co</p>").text, "<tag> & co");
    }
}
