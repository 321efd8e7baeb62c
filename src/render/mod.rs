//! Minimal markdown presentation for formatted transcripts.
//!
//! Input is first classified line by line into headings (`## `), list items
//! (`* `), text and blank lines. Two renderers consume that:
//!
//! * [`render_html`] produces the exact markup existing consumers expect. Its
//!   passes run in a fixed order and the order matters: every line from the
//!   first list item to the last one ends up inside a single list container,
//!   blank-line pairs are turned into paragraph breaks before paragraphs are
//!   wrapped, and lines beginning with `<h`, `<u`, `<l` or `<|` are never
//!   wrapped. Empty paragraphs left behind by that order are removed last.
//! * [`blocks`] groups the same lines into typed blocks for plain display.

use serde::Serialize;

const HEADING_OPEN: &str = "<h2 class=\"formatted-heading\">";
const HEADING_CLOSE: &str = "</h2>";
const LIST_OPEN: &str = "<ul class=\"formatted-list\">";
const LIST_CLOSE: &str = "</ul>";
const ITEM_OPEN: &str = "<li";
const ITEM_CLOSE: &str = "</li>";
const PARAGRAPH_OPEN: &str = "<p class=\"formatted-paragraph\">";
const PARAGRAPH_CLOSE: &str = "</p>";

/// One classified input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    Heading(&'a str),
    ListItem(&'a str),
    Text(&'a str),
    Blank,
}

/// A typed presentation block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum Block {
    Heading(String),
    List(Vec<String>),
    Paragraph(String),
}

/// Classify each `\n`-separated line. Headings win over list items.
pub fn classify(markdown: &str) -> Vec<Line<'_>> {
    markdown
        .split('\n')
        .map(|line| {
            if let Some(text) = line.strip_prefix("## ") {
                Line::Heading(text)
            } else if let Some(text) = line.strip_prefix("* ") {
                Line::ListItem(text)
            } else if line.is_empty() {
                Line::Blank
            } else {
                Line::Text(line)
            }
        })
        .collect()
}

/// Render markdown to HTML markup
pub fn render_html(markdown: &str) -> String {
    let lines: Vec<String> = classify(markdown)
        .into_iter()
        .map(|line| match line {
            Line::Heading(text) => format!("{}{}{}", HEADING_OPEN, text, HEADING_CLOSE),
            Line::ListItem(text) => format!("<li>{}</li>", text),
            Line::Text(text) => text.to_string(),
            Line::Blank => String::new(),
        })
        .collect();

    let html = wrap_list_span(&lines.join("\n"));
    let html = html.replace("\n\n", &format!("{}{}", PARAGRAPH_CLOSE, PARAGRAPH_OPEN));
    let html = wrap_paragraphs(&html);
    html.replace(&format!("{}{}", PARAGRAPH_OPEN, PARAGRAPH_CLOSE), "")
}

/// Wrap everything from the first `<li` to the last `</li>` in one list
fn wrap_list_span(html: &str) -> String {
    let (Some(start), Some(end)) = (html.find(ITEM_OPEN), html.rfind(ITEM_CLOSE)) else {
        return html.to_string();
    };

    if start + ITEM_OPEN.len() > end {
        return html.to_string();
    }

    let end = end + ITEM_CLOSE.len();
    format!(
        "{}{}{}{}{}",
        &html[..start],
        LIST_OPEN,
        &html[start..end],
        LIST_CLOSE,
        &html[end..]
    )
}

/// Wrap every non-empty line that does not open with `<h`, `<u`, `<l` or `<|`
fn wrap_paragraphs(html: &str) -> String {
    html.split('\n')
        .map(|line| {
            if line.is_empty() || is_block_markup(line) {
                line.to_string()
            } else {
                format!("{}{}{}", PARAGRAPH_OPEN, line, PARAGRAPH_CLOSE)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_block_markup(line: &str) -> bool {
    let mut chars = line.chars();
    chars.next() == Some('<') && matches!(chars.next(), Some('h' | 'u' | 'l' | '|'))
}

/// Group lines into blocks: consecutive list items form one list, runs of
/// text separated by blank lines form paragraphs, blank paragraphs vanish
pub fn blocks(markdown: &str) -> Vec<Block> {
    let mut out = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut list: Vec<String> = Vec::new();

    fn flush_paragraph(out: &mut Vec<Block>, paragraph: &mut Vec<&str>) {
        let text = paragraph.join("\n");
        paragraph.clear();
        if !text.trim().is_empty() {
            out.push(Block::Paragraph(text));
        }
    }

    fn flush_list(out: &mut Vec<Block>, list: &mut Vec<String>) {
        if !list.is_empty() {
            out.push(Block::List(std::mem::take(list)));
        }
    }

    for line in classify(markdown) {
        match line {
            Line::Heading(text) => {
                flush_paragraph(&mut out, &mut paragraph);
                flush_list(&mut out, &mut list);
                out.push(Block::Heading(text.to_string()));
            }
            Line::ListItem(text) => {
                flush_paragraph(&mut out, &mut paragraph);
                list.push(text.to_string());
            }
            Line::Text(text) => {
                flush_list(&mut out, &mut list);
                paragraph.push(text);
            }
            Line::Blank => {
                flush_paragraph(&mut out, &mut paragraph);
                flush_list(&mut out, &mut list);
            }
        }
    }

    flush_paragraph(&mut out, &mut paragraph);
    flush_list(&mut out, &mut list);
    out
}
