use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};
use localchat_core::ERROR_PREFIX;

use crate::app::{App, MenuAction, Popup};
use crate::theme::Theme;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(app.theme.bg).fg(app.theme.fg)),
        area,
    );

    // Main layout: header, transcript, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_transcript(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);

    match app.popup.clone() {
        Popup::None => {}
        Popup::Menu => render_menu(app, frame, area),
        Popup::ConfirmSave { .. } => render_confirm_save(&app.theme, frame, area),
        Popup::TitlePrompt { .. } => render_title_prompt(app, frame, area),
        Popup::Browser { files } => render_browser(app, &files, frame, area),
        Popup::Notice { title, message, is_error } => {
            render_notice(&app.theme, &title, &message, is_error, frame, area)
        }
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let theme = &app.theme;
    let status = if app.session.is_waiting() {
        Span::styled(" waiting ", Style::default().fg(theme.bar_bg).bg(theme.accent))
    } else {
        Span::styled(" ready ", Style::default().fg(theme.bar_bg).bg(theme.bot_color))
    };

    let title = Line::from(vec![
        Span::styled(format!(" {} ", app.app_title), Style::default().fg(theme.accent).bold()),
        Span::styled(format!("ollama: {} ", app.model), Style::default().fg(theme.muted)),
        status,
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(theme.muted),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(theme.bar_bg));
    frame.render_widget(header, area);
}

/// Style a transcript line by who wrote it.
fn transcript_line<'a>(line: &'a str, theme: &Theme) -> Line<'a> {
    if let Some(rest) = line.strip_prefix("You:") {
        Line::from(vec![
            Span::styled("You:", Style::default().fg(theme.user_color).add_modifier(Modifier::BOLD)),
            Span::raw(rest),
        ])
    } else if let Some(rest) = line.strip_prefix("Bot:") {
        let body_style = if rest.trim_start().starts_with(ERROR_PREFIX) {
            Style::default().fg(theme.error)
        } else {
            Style::default()
        };
        Line::from(vec![
            Span::styled("Bot:", Style::default().fg(theme.bot_color).add_modifier(Modifier::BOLD)),
            Span::styled(rest, body_style),
        ])
    } else {
        Line::from(line)
    }
}

fn render_transcript(app: &mut App, frame: &mut Frame, area: Rect) {
    // Inner size minus borders, used for scroll calculations
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);
    let max_scroll = app.max_scroll();
    app.chat_scroll = if app.stick_to_bottom {
        max_scroll
    } else {
        app.chat_scroll.min(max_scroll)
    };

    let theme = &app.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(" Conversation ");

    let mut lines: Vec<Line> = app
        .session
        .display()
        .lines()
        .map(|line| transcript_line(line, theme))
        .collect();

    if app.session.is_waiting() {
        lines.push(Line::from(Span::styled(
            app.thinking_text(),
            Style::default().fg(theme.muted).add_modifier(Modifier::ITALIC),
        )));
    }

    let chat = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let theme = &app.theme;
    let waiting = app.session.is_waiting();

    let (border_color, title) = if waiting {
        (theme.muted, " Waiting for reply... ")
    } else {
        (theme.accent, " Message (Enter to send) ")
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scrolling keeps the cursor visible
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let text_style = if waiting {
        Style::default().fg(theme.muted)
    } else {
        Style::default().fg(theme.user_color)
    };
    let input = Paragraph::new(visible_text)
        .style(text_style)
        .block(input_block);

    frame.render_widget(input, area);

    if !waiting && app.popup == Popup::None {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let theme = &app.theme;
    let key_style = Style::default().bg(theme.muted).fg(theme.bar_bg);
    let label_style = Style::default().bg(theme.bar_bg).fg(theme.bar_fg);

    let hints: Vec<(&str, &str)> = match app.popup {
        Popup::None => vec![
            ("Enter", "send"),
            ("F10", "menu"),
            ("^N", "new"),
            ("^S", "save"),
            ("^O", "load"),
            ("^T", theme.name),
            ("PgUp/PgDn", "scroll"),
            ("^Q", "quit"),
        ],
        Popup::Menu => vec![("j/k", "nav"), ("Enter", "select"), ("Esc", "close")],
        Popup::ConfirmSave { .. } => vec![("y", "save"), ("n", "discard"), ("Esc", "cancel")],
        Popup::TitlePrompt { .. } => vec![("Enter", "save"), ("Esc", "skip")],
        Popup::Browser { .. } => vec![("j/k", "nav"), ("Enter", "load"), ("Esc", "close")],
        Popup::Notice { .. } => vec![("any key", "dismiss")],
    };

    let spans: Vec<Span> = hints
        .into_iter()
        .flat_map(|(key, label)| {
            [
                Span::styled(format!(" {} ", key), key_style),
                Span::styled(format!(" {} ", label), label_style),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(spans)).style(label_style);
    frame.render_widget(footer, area);
}

/// Centered popup area, clamped to the frame.
fn popup_rect(area: Rect, width: u16, height: u16) -> Rect {
    let popup_width = width.min(area.width.saturating_sub(4));
    let popup_height = height.min(area.height.saturating_sub(4));

    let popup_x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(popup_height)) / 2;

    Rect::new(popup_x, popup_y, popup_width, popup_height)
}

fn popup_block<'a>(theme: &Theme, title: &'a str) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent))
        .style(Style::default().bg(theme.bg).fg(theme.fg))
        .title(title)
}

fn highlight(theme: &Theme) -> Style {
    Style::default()
        .bg(theme.highlight_bg)
        .fg(theme.highlight_fg)
        .add_modifier(Modifier::BOLD)
}

fn render_menu(app: &mut App, frame: &mut Frame, area: Rect) {
    let actions = MenuAction::all();
    let popup_area = popup_rect(area, 36, actions.len() as u16 + 2);
    frame.render_widget(Clear, popup_area);

    let items: Vec<ListItem> = actions
        .iter()
        .map(|action| ListItem::new(format!(" {:<20}{:>8} ", action.label(), action.shortcut())))
        .collect();

    let list = List::new(items)
        .block(popup_block(&app.theme, " Menu "))
        .highlight_style(highlight(&app.theme))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, popup_area, &mut app.menu_state);
}

fn render_confirm_save(theme: &Theme, frame: &mut Frame, area: Rect) {
    let popup_area = popup_rect(area, 40, 5);
    frame.render_widget(Clear, popup_area);

    let text = Text::from(vec![
        Line::from("Save this conversation?"),
        Line::default(),
        Line::from(vec![
            Span::styled("[y]", Style::default().fg(theme.accent).bold()),
            Span::raw(" yes   "),
            Span::styled("[n]", Style::default().fg(theme.accent).bold()),
            Span::raw(" no"),
        ]),
    ]);

    let dialog = Paragraph::new(text).block(popup_block(theme, " Save Conversation "));
    frame.render_widget(dialog, popup_area);
}

fn render_title_prompt(app: &App, frame: &mut Frame, area: Rect) {
    let theme = &app.theme;
    let popup_area = popup_rect(area, 50, 6);
    frame.render_widget(Clear, popup_area);

    let block = popup_block(theme, " Save Conversation ");
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let instructions = Paragraph::new("Enter a title for this conversation:")
        .style(Style::default().fg(theme.muted));
    frame.render_widget(instructions, Rect::new(inner.x, inner.y, inner.width, 1));

    let input_area = Rect::new(inner.x, inner.y + 2, inner.width, 1);
    let visible: String = {
        let count = app.title_input.chars().count();
        let skip = count.saturating_sub(input_area.width.saturating_sub(1) as usize);
        app.title_input.chars().skip(skip).collect()
    };
    let cursor_x = visible.chars().count() as u16;
    frame.render_widget(
        Paragraph::new(visible).style(Style::default().fg(theme.user_color)),
        input_area,
    );
    frame.set_cursor_position((input_area.x + cursor_x, input_area.y));
}

fn render_browser(app: &mut App, files: &[String], frame: &mut Frame, area: Rect) {
    let popup_area = popup_rect(area, 50, files.len() as u16 + 2);
    frame.render_widget(Clear, popup_area);

    let items: Vec<ListItem> = files
        .iter()
        .map(|file| ListItem::new(format!(" {} ", file)))
        .collect();

    let list = List::new(items)
        .block(popup_block(&app.theme, " Select a conversation "))
        .highlight_style(highlight(&app.theme))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, popup_area, &mut app.browser_state);
}

fn render_notice(
    theme: &Theme,
    title: &str,
    message: &str,
    is_error: bool,
    frame: &mut Frame,
    area: Rect,
) {
    let popup_area = popup_rect(area, 60, 5);
    frame.render_widget(Clear, popup_area);

    let title = format!(" {} ", title);
    let mut block = popup_block(theme, &title);
    if is_error {
        block = block.border_style(Style::default().fg(theme.error));
    }

    let notice = Paragraph::new(message)
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(notice, popup_area);
}
