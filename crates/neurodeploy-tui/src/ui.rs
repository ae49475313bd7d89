use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Tabs, Wrap,
    },
};
use neurodeploy_core::{ChatRole, ScriptLanguage};
use unicode_width::UnicodeWidthChar;
use crate::app::{App, ConfigRow, FocusPane, InputMode};

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'*') {
            chars.next();

            if !current_text.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_text)));
            }

            // Find closing **
            let mut bold_text = String::new();
            let mut found_close = false;
            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next();
                    found_close = true;
                    break;
                }
                bold_text.push(c);
            }

            if found_close && !bold_text.is_empty() {
                spans.push(Span::styled(
                    bold_text,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            } else {
                // No closing **, treat as literal
                current_text.push_str("**");
                current_text.push_str(&bold_text);
            }
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    Line::from(spans)
}

fn border_style(focused: bool) -> Style {
    Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray })
}

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

    if app.assistant.open {
        let [config_area, preview_area, chat_area] = Layout::horizontal([
            Constraint::Length(44),
            Constraint::Min(0),
            Constraint::Percentage(35),
        ])
        .areas(body_area);
        render_config_column(app, frame, config_area);
        render_preview(app, frame, preview_area);
        render_assistant(app, frame, chat_area);
    } else {
        let [config_area, preview_area] = Layout::horizontal([
            Constraint::Length(44),
            Constraint::Min(0),
        ])
        .areas(body_area);
        app.chat_area = None;
        render_config_column(app, frame, config_area);
        render_preview(app, frame, preview_area);
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let key_status = match (app.client.has_api_key(), app.key_source) {
        (true, Some(source)) => format!(" [API key: {}]", source.as_str()),
        (true, None) => " [API key: set]".to_string(),
        (false, _) => " [API key: missing]".to_string(),
    };

    let mut spans = vec![
        Span::styled(" NeuroDeploy ", Style::default().fg(Color::Cyan).bold()),
        Span::styled("LangChain Environment Generator", Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Black),
        ),
        Span::styled(key_status, Style::default().fg(Color::Black)),
    ];
    if let Some(status) = &app.status {
        spans.push(Span::styled(format!("  {}", status), Style::default().fg(Color::Green)));
    }

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match (app.focus, app.input_mode) {
        (_, InputMode::Editing) => " ASK ",
        (FocusPane::Config, _) => " CONFIG ",
        (FocusPane::Preview, _) => " PREVIEW ",
        (FocusPane::Assistant, _) => " ASSISTANT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);
    let hint = |key: &'static str, label: &'static str| {
        vec![
            Span::styled(key, key_style),
            Span::styled(label, label_style),
        ]
    };

    let hints: Vec<Span> = match (app.focus, app.input_mode) {
        (_, InputMode::Editing) => [
            hint(" Enter ", " send "),
            hint(" Esc ", " stop typing "),
        ]
        .concat(),
        (FocusPane::Config, _) => [
            hint(" j/k ", " nav "),
            hint(" Enter ", " toggle "),
            hint(" h/l ", " change "),
            hint(" Tab ", " focus "),
            hint(" 1-8 ", " tab "),
            hint(" c ", " copy "),
            hint(" d/D ", " save/all "),
            hint(" a ", " assistant "),
            hint(" q ", " quit "),
        ]
        .concat(),
        (FocusPane::Preview, _) => [
            hint(" h/l ", " tab "),
            hint(" j/k ", " scroll "),
            hint(" c ", " copy "),
            hint(" d ", " save "),
            hint(" D ", " save all "),
            hint(" Tab ", " focus "),
            hint(" a ", " assistant "),
            hint(" q ", " quit "),
        ]
        .concat(),
        (FocusPane::Assistant, _) => [
            hint(" i ", " type "),
            hint(" j/k ", " scroll "),
            hint(" Tab ", " focus "),
            hint(" Esc ", " close "),
        ]
        .concat(),
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_config_column(app: &mut App, frame: &mut Frame, area: Rect) {
    let [list_area, notes_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(6),
    ])
    .areas(area);

    app.config_area = Some(list_area);
    render_config_list(app, frame, list_area);

    let notes = Paragraph::new(vec![
        Line::from(Span::styled("Optimization Active:", Style::default().bold())),
        Line::from("- LLM & Embeddings offloaded to Gemini Cloud (Save ~6GB VRAM)."),
        Line::from("- Vector Store runs on CPU (FAISS)."),
        Line::from("- RTX 4060 Ti is free for local display/gaming while AI runs."),
    ])
    .style(Style::default().fg(Color::Green))
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)))
    .wrap(Wrap { trim: true });
    frame.render_widget(notes, notes_area);
}

fn render_config_list(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app.focus == FocusPane::Config))
        .title(" Hardware & Model Config ");

    let dim = Style::default().fg(Color::DarkGray);
    let config = app.config;

    let items: Vec<ListItem> = ConfigRow::all()
        .into_iter()
        .map(|row| match row {
            ConfigRow::GpuProfile => {
                let mut lines = vec![
                    Line::from(Span::styled("Target GPU Environment", dim)),
                    Line::from(format!("< {} >", config.gpu_profile.label())),
                ];
                if let Some(hint) = config.gpu_profile.hint() {
                    lines.push(Line::from(Span::styled(
                        format!("  {}", hint),
                        Style::default().fg(Color::Green),
                    )));
                }
                ListItem::new(lines)
            }
            ConfigRow::Provider => ListItem::new(vec![
                Line::from(Span::styled("Core LLM Provider", dim)),
                Line::from(format!("< {} >", config.llm_provider.display_name())),
                Line::from(Span::styled(format!("  {}", config.llm_provider.blurb()), dim)),
            ]),
            ConfigRow::Feature(feature) => {
                let mark = if config.features.get(feature) { "[x]" } else { "[ ]" };
                ListItem::new(vec![
                    Line::from(format!("{} {}", mark, feature.label())),
                    Line::from(Span::styled(format!("    {}", feature.description()), dim)),
                ])
            }
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

    frame.render_stateful_widget(list, area, &mut app.config_state);
}

fn render_preview(app: &mut App, frame: &mut Frame, area: Rect) {
    let [tabs_area, desc_area, content_area, steps_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(4),
    ])
    .areas(area);

    app.preview_area = Some(content_area);
    let focused = app.focus == FocusPane::Preview;

    let titles: Vec<Line> = app
        .scripts
        .iter()
        .enumerate()
        .map(|(i, s)| Line::from(format!("{} {}", i + 1, s.filename)))
        .collect();
    let tabs = Tabs::new(titles)
        .select(app.preview.active())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style(focused))
                .title(" Scripts (D: Download Bundle) "),
        )
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .divider("|");
    frame.render_widget(tabs, tabs_area);

    let Some(script) = app.preview.active_script(&app.scripts) else {
        return;
    };

    let description = Paragraph::new(script.description.as_str())
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL).border_style(border_style(false)))
        .wrap(Wrap { trim: true });
    frame.render_widget(description, desc_area);

    let language_color = match script.language {
        ScriptLanguage::Python => Color::Yellow,
        ScriptLanguage::PowerShell => Color::Blue,
        ScriptLanguage::Text => Color::Gray,
    };
    let mut title = vec![
        Span::raw(format!(" {} ", script.filename)),
        Span::styled(format!("[{}] ", script.language.as_str()), Style::default().fg(language_color)),
    ];
    if app.preview.is_copied() {
        title.push(Span::styled("Copied! ", Style::default().fg(Color::Green).bold()));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(focused))
        .title(Line::from(title));

    let inner = block.inner(content_area);
    app.preview_height = inner.height;

    // The bundle's first line is always blank; keep it so line numbers match the saved file
    let lines: Vec<Line> = script
        .content
        .split('\n')
        .enumerate()
        .map(|(i, line)| {
            Line::from(vec![
                Span::styled(format!("{:>4} ", i + 1), Style::default().fg(Color::DarkGray)),
                Span::raw(line.to_string()),
            ])
        })
        .collect();
    let total_lines = lines.len() as u16;

    let max_scroll = total_lines.saturating_sub(inner.height);
    if app.preview.scroll > max_scroll {
        app.preview.scroll = max_scroll;
    }

    let content = Paragraph::new(lines)
        .block(block)
        .scroll((app.preview.scroll, 0));
    frame.render_widget(content, content_area);

    if total_lines > inner.height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));
        let mut scrollbar_state = ScrollbarState::new(max_scroll as usize)
            .position(app.preview.scroll as usize);
        frame.render_stateful_widget(
            scrollbar,
            content_area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }

    render_steps(frame, steps_area);
}

fn render_steps(frame: &mut Frame, area: Rect) {
    let steps = [
        ("01", "Download Bundle", "Press D to save all files (including .bat helpers)."),
        ("02", "Clean Install", "Run 'rollback.bat' to clean old files, then 'setup.bat' to reinstall."),
        ("03", "Start App", "Double-click 'start.bat' to launch the interface."),
    ];
    let areas = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(area);

    for ((step, title, desc), step_area) in steps.iter().zip(areas.iter()) {
        let card = Paragraph::new(vec![
            Line::from(Span::styled(*desc, Style::default().fg(Color::Gray))),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(Line::from(vec![
                    Span::styled(format!(" STEP {} ", step), Style::default().fg(Color::Blue)),
                    Span::styled(format!("{} ", title), Style::default().bold()),
                ])),
        )
        .wrap(Wrap { trim: true });
        frame.render_widget(card, *step_area);
    }
}

fn render_assistant(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    app.chat_area = Some(chat_area);
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    let focused = app.focus == FocusPane::Assistant;
    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(focused && app.input_mode == InputMode::Normal))
        .title(" Deployment Assistant ");

    let mut lines: Vec<Line> = Vec::new();
    for msg in app.assistant.transcript() {
        let label_style = match msg.role {
            ChatRole::User => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ChatRole::Assistant => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        };
        lines.push(Line::from(Span::styled(App::message_label(msg.role), label_style)));
        for line in msg.text.lines() {
            lines.push(parse_markdown_line(line));
        }
        lines.push(Line::default());
    }

    if app.assistant.is_awaiting() {
        lines.push(Line::from(Span::styled(
            App::message_label(ChatRole::Assistant),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let chat = Paragraph::new(Text::from(lines))
        .block(chat_block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, chat_area);

    let editing = app.input_mode == InputMode::Editing && focused;
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { Color::Yellow } else { Color::DarkGray }))
        .title(" Ask about the installation... ");

    let inner_width = input_area.width.saturating_sub(2) as usize;
    let (visible_text, cursor_x) =
        input_window(&app.assistant.input, app.assistant.cursor, inner_width);

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(input, input_area);

    if editing {
        frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
    }
}

/// Slice of the input that fits in `width` columns with the cursor visible,
/// plus the cursor's column inside that slice. Widths are display columns.
fn input_window(input: &str, cursor: usize, width: usize) -> (String, u16) {
    let chars: Vec<char> = input.chars().collect();
    let cursor = cursor.min(chars.len());
    let col = |c: &char| c.width().unwrap_or(0);

    let mut offset = 0;
    let mut before: usize = chars[..cursor].iter().map(col).sum();
    while width > 0 && before >= width && offset < cursor {
        before -= col(&chars[offset]);
        offset += 1;
    }

    let mut used = 0;
    let visible: String = chars[offset..]
        .iter()
        .take_while(|c| {
            used += col(*c);
            used <= width
        })
        .collect();

    (visible, u16::try_from(before).unwrap_or(u16::MAX))
}
