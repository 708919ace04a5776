//! Terminal rendering of the chat's lightweight markup: `**bold**`, `*italic*`,
//! `• ` bullets and links. Mirrors the HTML formatter's rules with styles.

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const BULLET_PREFIX: &str = "• ";

/// Index of the next `**` at or after `from`
fn find_double_star(chars: &[char], from: usize) -> Option<usize> {
    (from..chars.len().saturating_sub(1)).find(|&i| chars[i] == '*' && chars[i + 1] == '*')
}

fn find_star(chars: &[char], from: usize) -> Option<usize> {
    (from..chars.len()).find(|&i| chars[i] == '*')
}

fn next_url_start(text: &str) -> Option<usize> {
    [text.find("http://"), text.find("https://")]
        .into_iter()
        .flatten()
        .min()
}

/// Split plain text into spans, underlining anything that looks like a URL
fn push_plain(spans: &mut Vec<Span<'static>>, text: &str, base: Style) {
    let mut rest = text;
    while let Some(start) = next_url_start(rest) {
        if start > 0 {
            spans.push(Span::styled(rest[..start].to_string(), base));
        }
        let url_len = rest[start..]
            .find(char::is_whitespace)
            .unwrap_or(rest.len() - start);
        spans.push(Span::styled(
            rest[start..start + url_len].to_string(),
            base.add_modifier(Modifier::UNDERLINED),
        ));
        rest = &rest[start + url_len..];
    }
    if !rest.is_empty() {
        spans.push(Span::styled(rest.to_string(), base));
    }
}

/// Parse one line, converting bold and italic markers to styled spans.
/// Bold runs first so `**` is never read as two italic markers.
pub fn parse_line(text: &str, base: Style) -> Line<'static> {
    let chars: Vec<char> = text.chars().collect();
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut plain = String::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '*' {
            let is_double = chars.get(i + 1) == Some(&'*');
            if is_double {
                if let Some(close) = find_double_star(&chars, i + 2) {
                    push_plain(&mut spans, &std::mem::take(&mut plain), base);
                    let inner: String = chars[i + 2..close].iter().collect();
                    spans.push(Span::styled(inner, base.add_modifier(Modifier::BOLD)));
                    i = close + 2;
                    continue;
                }
            } else if let Some(close) = find_star(&chars, i + 1) {
                push_plain(&mut spans, &std::mem::take(&mut plain), base);
                let inner: String = chars[i + 1..close].iter().collect();
                spans.push(Span::styled(inner, base.add_modifier(Modifier::ITALIC)));
                i = close + 1;
                continue;
            }
        }
        plain.push(chars[i]);
        i += 1;
    }
    push_plain(&mut spans, &plain, base);

    // Drop empty spans left by adjacent markers
    spans.retain(|s| !s.content.is_empty());
    Line::from(spans)
}

/// Render a whole message body, one terminal line per text line
pub fn message_lines(content: &str, base: Style) -> Vec<Line<'static>> {
    content
        .split('\n')
        .map(|line| match line.strip_prefix(BULLET_PREFIX) {
            Some(item) => {
                let mut rendered = parse_line(item, base);
                rendered.spans.insert(0, Span::styled("  • ", base));
                rendered
            }
            None => parse_line(line, base),
        })
        .collect()
}

fn char_width(c: char) -> usize {
    UnicodeWidthChar::width(c).unwrap_or(0)
}

fn line_width(line: &Line<'_>) -> usize {
    line.spans
        .iter()
        .map(|s| UnicodeWidthStr::width(s.content.as_ref()))
        .sum()
}

/// Rebuild spans from styled cells, merging runs that share a style
fn cells_to_line(cells: Vec<(char, Style)>) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    for (c, style) in cells {
        match spans.last_mut() {
            Some(last) if last.style == style => last.content.to_mut().push(c),
            _ => spans.push(Span::styled(c.to_string(), style)),
        }
    }
    Line::from(spans)
}

/// Word-wrap a styled line into rows no wider than `width` columns.
///
/// Breaks at whitespace and drops the whitespace at the break. A word wider
/// than a whole row is split across rows. Always returns at least one row.
pub fn wrap_line(line: &Line<'static>, width: usize) -> Vec<Line<'static>> {
    let width = width.max(1);
    if line_width(line) <= width {
        return vec![line.clone()];
    }

    let cells: Vec<(char, Style)> = line
        .spans
        .iter()
        .flat_map(|s| s.content.chars().map(move |c| (c, s.style)))
        .collect();

    let mut rows: Vec<Line<'static>> = Vec::new();
    let mut row: Vec<(char, Style)> = Vec::new();
    let mut row_width = 0;
    let mut i = 0;

    while i < cells.len() {
        let space = cells[i].0.is_whitespace();
        let end = cells[i..]
            .iter()
            .position(|(c, _)| c.is_whitespace() != space)
            .map_or(cells.len(), |n| i + n);
        let token = &cells[i..end];
        let token_width: usize = token.iter().map(|(c, _)| char_width(*c)).sum();
        i = end;

        if row_width + token_width <= width {
            row.extend_from_slice(token);
            row_width += token_width;
        } else if space {
            if !row.is_empty() {
                rows.push(cells_to_line(std::mem::take(&mut row)));
                row_width = 0;
            }
        } else {
            if row_width > 0 && token_width <= width {
                rows.push(cells_to_line(std::mem::take(&mut row)));
                row_width = 0;
            }
            for &(c, style) in token {
                let w = char_width(c);
                if row_width > 0 && row_width + w > width {
                    rows.push(cells_to_line(std::mem::take(&mut row)));
                    row_width = 0;
                }
                row.push((c, style));
                row_width += w;
            }
        }
    }
    if !row.is_empty() || rows.is_empty() {
        rows.push(cells_to_line(row));
    }
    rows
}
