use akshara_core::content::{self, ExerciseSet};
use akshara_core::{Language, Message, MessageKind, Origin, RecordingState};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, InputMode, LineInput, Screen};

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Chat => render_chat_screen(app, frame, body_area),
        Screen::Letters => render_letters_screen(app, frame, body_area),
        Screen::Exercises => render_exercises_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);

    // Render popups (in order of priority)
    if let Some(alert) = app.alert.clone() {
        render_alert(&alert, frame, area);
    } else if app.show_image_prompt {
        render_image_prompt(app, frame, area);
    } else if app.show_language_picker {
        render_language_picker(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let language = app.language();

    let title = Line::from(vec![
        Span::styled(" Akshara ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("→ {} ({}) ", language.display_name(), language.code()),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hint = |key: &'static str, label: &'static str| {
        vec![
            Span::styled(format!(" {} ", key), key_style),
            Span::styled(format!(" {} ", label), label_style),
        ]
    };

    let mut hints: Vec<Span> = Vec::new();
    match (app.screen, app.input_mode) {
        (Screen::Chat, InputMode::Editing) => {
            hints.extend(hint("Enter", "send"));
            hints.extend(hint("Esc", "stop typing"));
        }
        (Screen::Chat, InputMode::Normal) => {
            hints.extend(hint("i", "type"));
            hints.extend(hint("r", if app.session.is_recording() { "stop" } else { "mic" }));
            hints.extend(hint("o", "image"));
            hints.extend(hint("j/k", "scroll"));
        }
        (Screen::Letters, _) => {
            hints.extend(hint("j/k", "scroll"));
        }
        (Screen::Exercises, _) => {
            hints.extend(hint("j/k", "set"));
            hints.extend(hint("Space", if app.reveal_answers { "hide" } else { "reveal" }));
        }
    }

    if app.input_mode == InputMode::Normal {
        hints.extend(hint("l", "language"));
        hints.extend(hint("Tab", "screen"));
        hints.extend(hint("q", "quit"));
    }

    let footer_content = Line::from(
        vec![
            Span::styled(app.screen.label(), mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn message_lines(msg: &Message) -> Vec<Line<'static>> {
    let (label, color, alignment) = match msg.origin {
        Origin::User => ("You", Color::Cyan, Alignment::Right),
        Origin::Assistant => ("Assistant", Color::Yellow, Alignment::Left),
    };

    let mut lines = vec![Line::from(Span::styled(
        format!("{}:", label),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
    .alignment(alignment)];

    match msg.kind {
        MessageKind::Text => {
            for line in msg.content.lines() {
                lines.push(Line::from(line.to_string()).alignment(alignment));
            }
        }
        MessageKind::Image => {
            lines.push(
                Line::from(vec![
                    Span::styled("[image] ", Style::default().fg(Color::Magenta)),
                    Span::raw(msg.content.clone()),
                ])
                .alignment(alignment),
            );
        }
        MessageKind::Audio => {
            lines.push(
                Line::from(Span::styled("▶ Play Audio", Style::default().fg(Color::Green)))
                    .alignment(alignment),
            );
        }
    }

    lines.push(Line::default());
    lines
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    // Store chat area for mouse hit-testing and scroll calculations (inner size minus borders)
    app.chat_area = Some(chat_area);
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" Assistant: {} ", app.language().display_name()));

    let messages = app.session.messages();
    let chat_text = if messages.is_empty() && !app.session.is_loading() {
        Text::from(Span::styled(
            "Ask anything, or press r to record...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = messages.iter().flat_map(message_lines).collect();

        if app.session.is_loading() {
            lines.push(Line::from(Span::styled(
                "Assistant:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, chat_area);

    render_input_row(app, frame, input_area);
}

fn mic_label(state: &RecordingState) -> Span<'static> {
    match state {
        RecordingState::Recording => Span::styled(" ■ stop ", Style::default().fg(Color::Red).bold()),
        RecordingState::AwaitingTranscription { .. } => {
            Span::styled(" … transcribing ", Style::default().fg(Color::Yellow))
        }
        _ => Span::styled(" ● mic ", Style::default().fg(Color::Green)),
    }
}

fn render_input_row(app: &App, frame: &mut Frame, area: Rect) {
    let [image_area, mic_area, field_area] = Layout::horizontal([
        Constraint::Length(10),
        Constraint::Length(18),
        Constraint::Min(0),
    ])
    .areas(area);

    let image_button = Paragraph::new(Span::styled(" o image ", Style::default().fg(Color::Magenta)))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
    frame.render_widget(image_button, image_area);

    let mic_button = Paragraph::new(mic_label(app.session.recording_state()))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
    frame.render_widget(mic_button, mic_area);

    let editing = app.input_mode == InputMode::Editing;
    let border_color = if editing { Color::Yellow } else { Color::DarkGray };
    let title = if app.is_sending() { " Message (waiting) " } else { " Message (Enter to send) " };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    render_line_input(frame, field_area, input_block, &app.input, editing);
}

/// Single-line field with horizontal scrolling to keep the cursor visible
fn render_line_input(frame: &mut Frame, area: Rect, block: Block, input: &LineInput, show_cursor: bool) {
    let inner = block.inner(area);
    let inner_width = inner.width as usize;
    let cursor_pos = input.cursor;

    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = input
        .text
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let paragraph = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);

    frame.render_widget(paragraph, area);

    if show_cursor {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((inner.x + cursor_x, inner.y));
    }
}

fn render_letters_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let language = app.language();

    // Inner size for scroll bounds
    app.letters_height = area.height.saturating_sub(2);
    app.letters_width = area.width.saturating_sub(2);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} letters ", language.display_name()));

    let mut lines: Vec<Line> = Vec::new();
    match content::characters(language.code()) {
        Some(groups) => {
            for group in groups {
                lines.push(Line::from(Span::styled(
                    group.role,
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(group.dialogue_items.join("  ")));
                lines.push(Line::default());
            }
        }
        None => lines.push(Line::from(Span::styled(
            "No letters for this language yet.",
            Style::default().fg(Color::DarkGray),
        ))),
    }

    let letters = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.letters_scroll, 0));

    frame.render_widget(letters, area);
}

fn render_exercises_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [list_area, detail_area] = Layout::horizontal([
        Constraint::Length(28),
        Constraint::Min(0),
    ])
    .areas(area);

    let sets = content::exercise_sets();
    let items: Vec<ListItem> = sets
        .iter()
        .map(|set| {
            ListItem::new(format!(
                "Set {}  {} xp  {}",
                set.id,
                set.xp,
                set.difficulty.as_str()
            ))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(format!(" Exercises ({} xp) ", content::total_xp())),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, list_area, &mut app.exercise_state);

    let detail = app
        .selected_exercise()
        .map(|set| exercise_detail(set, app.reveal_answers))
        .unwrap_or_default();

    let detail_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Items ");

    frame.render_widget(
        Paragraph::new(detail).block(detail_block).wrap(Wrap { trim: true }),
        detail_area,
    );
}

fn exercise_detail(set: &ExerciseSet, reveal: bool) -> Text<'static> {
    let mut lines = Vec::new();
    for (i, item) in set.items.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!("{}. ", i + 1), Style::default().fg(Color::DarkGray)),
            Span::styled(item.label(), Style::default().fg(Color::Yellow)),
        ]));
        lines.push(Line::from(format!("   {}", item.prompt())));

        let answer = if reveal {
            Span::styled(format!("   → {}", item.answer()), Style::default().fg(Color::Green))
        } else {
            Span::styled("   → ?", Style::default().fg(Color::DarkGray))
        };
        lines.push(Line::from(answer));
        lines.push(Line::default());
    }
    Text::from(lines)
}

fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    let popup_width = width.min(area.width.saturating_sub(4));
    let popup_height = height.min(area.height.saturating_sub(4));

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    Rect::new(popup_x, popup_y, popup_width, popup_height)
}

fn render_language_picker(app: &mut App, frame: &mut Frame, area: Rect) {
    let languages = Language::all();
    let popup_area = centered_popup(area, 32, languages.len() as u16 + 2);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Translate into ");

    let current = app.language();
    let items: Vec<ListItem> = languages
        .iter()
        .map(|language| {
            let is_current = *language == current;
            let prefix = if is_current { "* " } else { "  " };
            let style = if is_current {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(format!("{}{} ({})", prefix, language.display_name(), language.code())).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, popup_area, &mut app.language_picker_state);
}

fn render_image_prompt(app: &App, frame: &mut Frame, area: Rect) {
    let popup_area = centered_popup(area, 60, 6);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(" Attach image ");

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let instructions = Paragraph::new("Image path (relative to your pictures folder). Enter to attach, Esc to cancel.")
        .style(Style::default().fg(Color::DarkGray))
        .wrap(Wrap { trim: true });
    frame.render_widget(instructions, Rect::new(inner.x, inner.y, inner.width, 2));

    // Below the two instruction rows
    let field_area = Rect::new(inner.x, inner.y + 2, inner.width, 1);
    render_line_input(frame, field_area, Block::default(), &app.image_input, true);
}

fn render_alert(message: &str, frame: &mut Frame, area: Rect) {
    let popup_area = centered_popup(area, 50, 7);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Alert ");

    let text = Text::from(vec![
        Line::from(message.to_string()),
        Line::default(),
        Line::from(Span::styled("Press any key", Style::default().fg(Color::DarkGray))),
    ]);

    let alert = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(alert, popup_area);
}
