//! Message formatting: plain chat text with lightweight markup to safe HTML.
//!
//! Everything is escaped before any markup is produced, so neither party can
//! inject tags. The conversions then run in a fixed order: bold, italic,
//! bullet lists, numbered lists, line breaks, links.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern is valid"));
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(.*?)\*").expect("italic pattern is valid"));
static BULLET_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^•\s(.+)$").expect("bullet pattern is valid"));
static NUMBERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.\s(.+)$").expect("numbered pattern is valid"));
// Escaped text never contains '<', so a URL stops at the first generated tag.
static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s<]+").expect("url pattern is valid"));

/// How numbered-list items are wrapped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberedListStyle {
    /// Items become `<li>` elements with no surrounding container.
    #[default]
    Bare,
    /// Contiguous items are grouped into one `<ol>`.
    Ordered,
}

impl NumberedListStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            NumberedListStyle::Bare => "bare",
            NumberedListStyle::Ordered => "ordered",
        }
    }
}

impl FromStr for NumberedListStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bare" => Ok(NumberedListStyle::Bare),
            "ordered" => Ok(NumberedListStyle::Ordered),
            other => Err(format!("unknown numbered list style '{}' (expected bare or ordered)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormatOptions {
    pub numbered_lists: NumberedListStyle,
}

enum LineKind<'a> {
    Bullet(&'a str),
    Numbered(&'a str),
    Plain(&'a str),
}

fn classify(line: &str) -> LineKind<'_> {
    // List items end before a CRLF's '\r'
    let content = line.strip_suffix('\r').unwrap_or(line);
    if let Some(item) = BULLET_ITEM.captures(content).and_then(|c| c.get(1)) {
        LineKind::Bullet(item.as_str())
    } else if let Some(item) = NUMBERED_ITEM.captures(content).and_then(|c| c.get(1)) {
        LineKind::Numbered(item.as_str())
    } else {
        LineKind::Plain(line)
    }
}

/// Escape the characters that are significant in HTML text and attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Convert a chat message into markup that is safe to insert into a page.
pub fn format_message(text: &str, options: &FormatOptions) -> String {
    if text.is_empty() {
        return String::new();
    }

    let escaped = escape_html(text);
    let bolded = BOLD.replace_all(&escaped, "<strong>$1</strong>");
    let emphasized = ITALIC.replace_all(&bolded, "<em>$1</em>");

    // Lines folded into a list container lose their newline; every other
    // newline becomes a <br> when the segments are joined.
    let mut segments: Vec<String> = Vec::new();
    let mut lines = emphasized.split('\n').map(classify).peekable();

    while let Some(kind) = lines.next() {
        match kind {
            LineKind::Bullet(item) => {
                let mut block = format!("<ul><li>{}</li>", item);
                while let Some(LineKind::Bullet(next)) = lines.peek() {
                    block.push_str(&format!("<li>{}</li>", next));
                    lines.next();
                }
                block.push_str("</ul>");
                segments.push(block);
            }
            LineKind::Numbered(item) => match options.numbered_lists {
                NumberedListStyle::Bare => segments.push(format!("<li>{}</li>", item)),
                NumberedListStyle::Ordered => {
                    let mut block = format!("<ol><li>{}</li>", item);
                    while let Some(LineKind::Numbered(next)) = lines.peek() {
                        block.push_str(&format!("<li>{}</li>", next));
                        lines.next();
                    }
                    block.push_str("</ol>");
                    segments.push(block);
                }
            },
            LineKind::Plain(line) => segments.push(line.to_string()),
        }
    }

    let joined = segments.join("<br>");
    URL.replace_all(
        &joined,
        r#"<a href="${0}" target="_blank" rel="noopener noreferrer">${0}</a>"#,
    )
    .into_owned()
}
