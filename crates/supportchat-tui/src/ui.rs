use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};
use supportchat_core::{CharCount, ChatRole, CountLevel, Theme};

use crate::app::{App, Focus, SUGGESTED_QUESTIONS};
use crate::markup::{message_lines, wrap_line};

/// The input box grows with its content up to this many rows
const MAX_INPUT_ROWS: u16 = 5;

struct Palette {
    bg: Color,
    fg: Color,
    muted: Color,
    accent: Color,
    user: Color,
    agent: Color,
    online: Color,
    warning: Color,
    error: Color,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Light => Palette {
            bg: Color::White,
            fg: Color::Black,
            muted: Color::Gray,
            accent: Color::Blue,
            user: Color::Blue,
            agent: Color::Magenta,
            online: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
        },
        Theme::Dark => Palette {
            bg: Color::Black,
            fg: Color::White,
            muted: Color::DarkGray,
            accent: Color::Cyan,
            user: Color::Cyan,
            agent: Color::LightMagenta,
            online: Color::LightGreen,
            warning: Color::LightYellow,
            error: Color::LightRed,
        },
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let p = palette(app.theme);
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(p.bg).fg(p.fg)), area);

    let attachment_height = if app.attachment.is_some() { 1 } else { 0 };
    let input_rows = (app.input.split('\n').count() as u16).clamp(1, MAX_INPUT_ROWS);

    let [header_area, body_area, attachment_area, input_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(attachment_height),
        Constraint::Length(input_rows + 2),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area, &p);
    if app.show_welcome && app.controller.log().is_empty() {
        render_welcome(app, frame, body_area, &p);
    } else {
        render_chat(app, frame, body_area, &p);
    }
    if app.attachment.is_some() {
        render_attachment(app, frame, attachment_area, &p);
    }
    render_input(app, frame, input_area, &p);
    render_status(app, frame, status_area, &p);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect, p: &Palette) {
    let [left, right] =
        Layout::horizontal([Constraint::Min(10), Constraint::Length(22)]).areas(area);

    let title = Line::from(vec![
        Span::styled(
            format!(" {} ", app.agent.display_name()),
            Style::default().fg(p.accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled("● Online", Style::default().fg(p.online)),
    ]);
    frame.render_widget(Paragraph::new(title), left);

    let theme = Line::from(Span::styled(
        format!("{} theme (Ctrl+T) ", app.theme.as_str()),
        Style::default().fg(p.muted),
    ))
    .right_aligned();
    frame.render_widget(Paragraph::new(theme), right);
}

fn render_welcome(app: &mut App, frame: &mut Frame, area: Rect, p: &Palette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(p.muted))
        .title(" Welcome ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [greeting_area, suggestions_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).areas(inner);

    let greeting = Text::from(vec![
        Line::from(Span::styled(
            app.agent.greeting(),
            Style::default().fg(p.fg).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(Span::styled(
            "Suggested questions (Tab to choose, Enter to ask):",
            Style::default().fg(p.muted),
        )),
    ]);
    frame.render_widget(Paragraph::new(greeting).wrap(Wrap { trim: true }), greeting_area);

    let items: Vec<ListItem> = SUGGESTED_QUESTIONS
        .iter()
        .map(|q| ListItem::new(format!(" {} ", q)))
        .collect();
    let highlight = if app.focus == Focus::Suggestions {
        Style::default().bg(p.accent).fg(p.bg).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let list = List::new(items)
        .style(Style::default().fg(p.accent))
        .highlight_style(highlight)
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, suggestions_area, &mut app.suggestion_state);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect, p: &Palette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(p.muted));
    let inner = block.inner(area);

    // Page scrolling moves by half the visible height
    app.chat_height = usize::from(inner.height);

    let agent_name = app.agent.display_name().to_string();
    let mut lines: Vec<Line<'static>> = Vec::new();

    for msg in app.controller.log().entries() {
        let (label, color) = match msg.role {
            ChatRole::User => ("You".to_string(), p.user),
            ChatRole::Agent => (agent_name.clone(), p.agent),
        };
        lines.push(Line::from(Span::styled(
            label,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        lines.extend(message_lines(&msg.content, Style::default().fg(p.fg)));
        lines.push(Line::default());
    }

    if app.controller.is_pending() {
        lines.push(Line::from(Span::styled(
            agent_name,
            Style::default().fg(p.agent).add_modifier(Modifier::BOLD),
        )));
        // Animated typing indicator: ".", "..", "..."
        let dots = ".".repeat(app.animation_frame as usize + 1);
        lines.push(Line::from(Span::styled(
            format!("typing{}", dots),
            Style::default().fg(p.muted).add_modifier(Modifier::ITALIC),
        )));
    }

    // Wrap up front so scrolling counts the rows that are actually drawn
    let width = usize::from(inner.width);
    let rows: Vec<Line<'static>> = lines.iter().flat_map(|l| wrap_line(l, width)).collect();
    let max_scroll = rows.len().saturating_sub(app.chat_height);
    if app.follow_bottom || app.chat_scroll >= max_scroll {
        app.chat_scroll = max_scroll;
        app.follow_bottom = true;
    }

    let visible: Vec<Line<'static>> = rows
        .into_iter()
        .skip(app.chat_scroll)
        .take(app.chat_height)
        .collect();
    let chat = Paragraph::new(Text::from(visible)).block(block);
    frame.render_widget(chat, area);
}

fn render_attachment(app: &App, frame: &mut Frame, area: Rect, p: &Palette) {
    let Some(staged) = &app.attachment else {
        return;
    };
    let kind = if staged.is_image() { "image" } else { "file" };
    let line = Line::from(vec![
        Span::styled(" Attached ", Style::default().fg(p.bg).bg(p.accent)),
        Span::styled(
            format!(" {} ", staged.name),
            Style::default().fg(p.fg).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{} · {} · /detach to remove", staged.size_label(), kind),
            Style::default().fg(p.muted),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect, p: &Palette) {
    let enabled = app.input_enabled();
    let border_color = if app.error_flash > 0 {
        p.error
    } else if !enabled {
        p.muted
    } else if app.focus == Focus::Input {
        p.accent
    } else {
        p.muted
    };

    let count = CharCount::of(&app.input);
    let count_color = match count.level() {
        CountLevel::Normal => p.muted,
        CountLevel::Warning => p.warning,
        CountLevel::Error => p.error,
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Message ")
        .title_bottom(
            Line::from(Span::styled(
                format!(" {} ", count.label()),
                Style::default().fg(count_color),
            ))
            .right_aligned(),
        );
    let inner = block.inner(area);

    if !enabled {
        let waiting = Paragraph::new(Span::styled(
            "Waiting for a reply...",
            Style::default().fg(p.muted).add_modifier(Modifier::ITALIC),
        ))
        .block(block);
        frame.render_widget(waiting, area);
        return;
    }

    if app.input.is_empty() {
        let placeholder = Paragraph::new(Span::styled(
            "Type your message... (Enter to send, Alt+Enter for a new line)",
            Style::default().fg(p.muted),
        ))
        .block(block);
        frame.render_widget(placeholder, area);
        if app.focus == Focus::Input {
            frame.set_cursor_position((inner.x, inner.y));
        }
        return;
    }

    // Cursor row/column within the multi-line input
    let before: String = app.input.chars().take(app.input_cursor).collect();
    let row = before.matches('\n').count() as u16;
    let col = before.rsplit('\n').next().map(|l| l.chars().count()).unwrap_or(0) as u16;

    // Scroll both ways to keep the cursor visible
    let v_offset = row.saturating_sub(inner.height.saturating_sub(1));
    let h_offset = col.saturating_sub(inner.width.saturating_sub(1));

    let input = Paragraph::new(app.input.as_str())
        .style(Style::default().fg(p.fg))
        .block(block)
        .scroll((v_offset, h_offset));
    frame.render_widget(input, area);

    if app.focus == Focus::Input {
        frame.set_cursor_position((inner.x + col - h_offset, inner.y + row - v_offset));
    }
}

fn render_status(app: &App, frame: &mut Frame, area: Rect, p: &Palette) {
    let line = if let Some((text, _)) = &app.announcement {
        Line::from(Span::styled(format!(" {}", text), Style::default().fg(p.fg)))
    } else if let Some(status) = &app.status {
        Line::from(Span::styled(format!(" {}", status), Style::default().fg(p.accent)))
    } else {
        Line::from(Span::styled(
            " PgUp/PgDn scroll · /attach <file> · Ctrl+T theme · Ctrl+C quit",
            Style::default().fg(p.muted),
        ))
    };
    frame.render_widget(Paragraph::new(line), area);
}
