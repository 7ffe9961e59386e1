mod theme;

use crate::app::{
    AppModel, ContextCopyState, HomeRow, HomeView, Route, SessionRow, SessionView, UsagePanel,
    UsageView,
};
use crate::domain::{
    diff_lines, diff_stats, format_cost, format_cost_precise, format_date_time, format_model_name,
    format_relative_date, format_tokens, highlight_spans, DiffLineKind, MessageRole, SessionSummary,
    ToolDetail,
};
use crate::infra::ViewMode;
use ratatui::prelude::*;
use ratatui::widgets::*;
use time::OffsetDateTime;
use unicode_width::UnicodeWidthStr;

const SIDEBAR_WIDTH: u16 = 34;
const MAX_DETAIL_LINES: usize = 160;

pub fn render(frame: &mut Frame, model: &AppModel) {
    let full_area = frame.area();
    if full_area.width == 0 || full_area.height == 0 {
        return;
    }

    frame.render_widget(Block::default().style(Style::default().bg(theme::BG)), full_area);

    render_header(frame, full_area, model);

    let body = Rect {
        x: full_area.x,
        y: full_area.y.saturating_add(1),
        width: full_area.width,
        height: full_area.height.saturating_sub(2),
    };

    match &model.route {
        Route::Home => render_home(frame, body, model, &model.home),
        Route::Session(view) => render_session(frame, body, view),
        Route::Usage(view) => render_usage(frame, body, view),
    }

    render_status_line(frame, full_area, model);

    if model.help_open {
        render_help_overlay(frame, body);
    }
}

fn render_header(frame: &mut Frame, area: Rect, model: &AppModel) {
    let bar = Rect {
        x: area.x,
        y: area.y,
        width: area.width,
        height: 1,
    };
    let base = Style::default().fg(theme::FG).bg(theme::BAR_BG);

    let title = match &model.route {
        Route::Home => " ccview ".to_string(),
        Route::Session(view) => format!(" ccview · {} ", truncate_end(&view.session_id, 24)),
        Route::Usage(_) => " ccview · usage ".to_string(),
    };
    let source = match &model.route {
        Route::Usage(view) => view.source,
        _ => model.prefs.source,
    };

    let spans = vec![
        Span::styled(title, base.add_modifier(Modifier::BOLD)),
        Span::styled(format!("[{}] ", source.label()), base.fg(theme::ACCENT)),
        Span::styled(
            format!("{} ", model.prefs.view_mode.label()),
            base.fg(theme::MUTED),
        ),
    ];
    frame.render_widget(Paragraph::new(Line::from(spans)).style(base), bar);
}

fn render_status_line(frame: &mut Frame, area: Rect, model: &AppModel) {
    if area.height < 2 {
        return;
    }
    let bar = Rect {
        x: area.x,
        y: area.y + area.height - 1,
        width: area.width,
        height: 1,
    };
    let base = Style::default().fg(theme::DIM).bg(theme::BAR_BG);

    let text = match &model.notice {
        Some(notice) => notice.clone(),
        None => match &model.route {
            Route::Home => {
                "enter: open  /: search  t: view  s: source  p: project  u: usage  c: copy context  ?: help  q: quit"
                    .to_string()
            }
            Route::Session(_) => {
                "enter: expand  y: copy message  c: copy context  r: reload  esc: back".to_string()
            }
            Route::Usage(_) => "d: range  s: source  r: refresh  esc: back".to_string(),
        },
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(format!(" {text}"), base))).style(base),
        bar,
    );
}

fn render_home(frame: &mut Frame, area: Rect, model: &AppModel, home: &HomeView) {
    let chunks = Layout::horizontal([
        Constraint::Length(SIDEBAR_WIDTH.min(area.width / 2)),
        Constraint::Min(10),
    ])
    .split(area);

    render_home_sidebar(frame, chunks[0], model, home);
    render_home_main(frame, chunks[1], model, home);
}

fn render_home_sidebar(frame: &mut Frame, area: Rect, model: &AppModel, home: &HomeView) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER))
        .title(Span::styled(" ccview ", Style::default().fg(theme::ACCENT)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        "Token usage",
        Style::default().fg(theme::MUTED).add_modifier(Modifier::BOLD),
    )));
    match &home.usage {
        UsagePanel::Loading => lines.push(dim_line("  loading...")),
        UsagePanel::Failed(error) => lines.push(Line::from(Span::styled(
            format!("  {}", truncate_end(error, inner.width.saturating_sub(2) as usize)),
            Style::default().fg(theme::ERROR),
        ))),
        UsagePanel::Ready(usage) => {
            for (label, bucket) in [
                ("today", usage.today),
                ("month", usage.this_month),
                ("total", usage.total),
            ] {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {label:<6}"), Style::default().fg(theme::DIM)),
                    Span::styled(
                        format!("{:>8}", format_tokens(bucket.total_tokens)),
                        Style::default().fg(theme::FG),
                    ),
                    Span::styled(
                        format!("  {:>8}", format_cost(bucket.cost_usd)),
                        Style::default().fg(theme::ACCENT),
                    ),
                ]));
            }
        }
    }
    lines.push(Line::default());

    match model.prefs.view_mode {
        ViewMode::Projects => {
            lines.push(Line::from(Span::styled(
                "Projects",
                Style::default().fg(theme::MUTED).add_modifier(Modifier::BOLD),
            )));
            let all_style = if home.selected_project.is_none() {
                Style::default().fg(theme::ACCENT)
            } else {
                Style::default().fg(theme::FG)
            };
            lines.push(Line::from(Span::styled("  all projects", all_style)));
            for project in &home.projects {
                let style = if home.selected_project.as_deref() == Some(project.path.as_str()) {
                    Style::default().fg(theme::ACCENT)
                } else {
                    Style::default().fg(theme::FG)
                };
                let label = truncate_end(&project.name, inner.width.saturating_sub(8) as usize);
                lines.push(Line::from(vec![
                    Span::styled(format!("  {label}"), style),
                    Span::styled(
                        format!(" ({})", project.session_count),
                        Style::default().fg(theme::DIM),
                    ),
                ]));
            }
        }
        ViewMode::Timeline => {
            lines.push(Line::from(Span::styled(
                "Timeline",
                Style::default().fg(theme::MUTED).add_modifier(Modifier::BOLD),
            )));
            for group in &home.groups {
                let title = group.label.title();
                let marker = if home.collapsed.contains(&title) {
                    "▸"
                } else {
                    "▾"
                };
                lines.push(Line::from(vec![
                    Span::styled(format!("  {marker} {title}"), Style::default().fg(theme::FG)),
                    Span::styled(
                        format!(" ({})", group.sessions.len()),
                        Style::default().fg(theme::DIM),
                    ),
                ]));
            }
        }
    }

    frame.render_widget(Paragraph::new(Text::from(lines)), inner);
}

fn render_home_main(frame: &mut Frame, area: Rect, model: &AppModel, home: &HomeView) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height < 2 {
        return;
    }

    // Search input on top of the list.
    let search_area = Rect {
        height: 1,
        ..inner
    };
    let search_style = if home.searching {
        Style::default().fg(theme::FG)
    } else {
        Style::default().fg(theme::DIM)
    };
    let search_text = if home.search.is_empty() && !home.searching {
        "/ search sessions...".to_string()
    } else {
        format!("/ {}", home.search.text())
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(search_text, search_style))),
        search_area,
    );
    if home.searching {
        let cursor_x = search_area.x + 2 + home.search.cursor() as u16;
        frame.set_cursor_position((cursor_x.min(search_area.right().saturating_sub(1)), search_area.y));
    }

    let list_area = Rect {
        x: inner.x,
        y: inner.y + 1,
        width: inner.width,
        height: inner.height - 1,
    };

    if home.loading || home.search_loading {
        frame.render_widget(Paragraph::new(dim_line("loading...")), list_area);
        return;
    }
    if let Some(error) = &home.error {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(theme::ERROR),
            ))),
            list_area,
        );
        return;
    }

    let rows = home.rows(model.prefs.view_mode);
    if rows.is_empty() {
        let empty = if home.search_results.is_some() {
            "no matching results"
        } else {
            "no sessions found"
        };
        frame.render_widget(Paragraph::new(dim_line(empty)), list_area);
        return;
    }

    let now = OffsetDateTime::now_utc();
    let width = list_area.width as usize;
    let mut lines: Vec<Line> = Vec::new();
    let mut selected_range = (0usize, 0usize);

    for (row_index, row) in rows.iter().enumerate() {
        let selected = row_index == home.selected;
        let start = lines.len();
        match *row {
            HomeRow::GroupHeader(group_index) => {
                if let Some(group) = home.groups.get(group_index) {
                    let title = group.label.title();
                    let marker = if home.collapsed.contains(&title) {
                        "▸"
                    } else {
                        "▾"
                    };
                    let style = row_style(selected).add_modifier(Modifier::BOLD);
                    lines.push(Line::from(vec![
                        Span::styled(format!("{marker} {title} "), style.fg(theme::ACCENT)),
                        Span::styled(format!("({})", group.sessions.len()), style.fg(theme::DIM)),
                    ]));
                }
            }
            HomeRow::SearchResult(index) => {
                if let Some((query, results)) = &home.search_results {
                    if let Some(result) = results.get(index) {
                        let badge_color = if result.message_type == "user" {
                            theme::ACCENT
                        } else {
                            theme::SUCCESS
                        };
                        let style = row_style(selected);
                        let mut meta = vec![
                            Span::styled(format!("[{}] ", result.message_type), style.fg(badge_color)),
                            Span::styled(result.project_name.clone(), style.fg(theme::MUTED)),
                            Span::styled(
                                format!(" · {}", format_relative_date(now, &result.timestamp)),
                                style.fg(theme::DIM),
                            ),
                        ];
                        if let Some(source) = result.source {
                            meta.push(Span::styled(
                                format!(" · {}", source.label()),
                                style.fg(theme::DIM),
                            ));
                        }
                        lines.push(Line::from(meta));
                        lines.push(highlighted_line(
                            &truncate_end(&result.matched_content.replace('\n', " "), width.saturating_sub(2)),
                            query,
                            selected,
                        ));
                    }
                }
            }
            HomeRow::Session(index) => {
                if let Some(session) = home.sessions.get(index) {
                    push_session_lines(&mut lines, session, selected, now, width);
                }
            }
            HomeRow::TimelineSession { group, index } => {
                if let Some(session) = home
                    .groups
                    .get(group)
                    .and_then(|group| group.sessions.get(index))
                {
                    push_session_lines(&mut lines, session, selected, now, width);
                }
            }
        }
        if selected {
            selected_range = (start, lines.len());
        }
    }

    let offset = scroll_offset(selected_range, lines.len(), list_area.height);
    frame.render_widget(
        Paragraph::new(Text::from(lines)).scroll((offset, 0)),
        list_area,
    );
}

fn push_session_lines(
    lines: &mut Vec<Line>,
    session: &SessionSummary,
    selected: bool,
    now: OffsetDateTime,
    width: usize,
) {
    let style = row_style(selected);
    let title = if session.title.trim().is_empty() {
        "(untitled)"
    } else {
        session.title.as_str()
    };
    lines.push(Line::from(Span::styled(
        truncate_end(title, width),
        style.fg(theme::FG).add_modifier(Modifier::BOLD),
    )));

    let mut meta = vec![
        Span::styled(format!("  {}", session.project_name), style.fg(theme::MUTED)),
        Span::styled(
            format!(" · {} msgs", session.message_count),
            style.fg(theme::DIM),
        ),
        Span::styled(
            format!(" · {}", format_relative_date(now, &session.updated_at)),
            style.fg(theme::DIM),
        ),
    ];
    if !session.tool_calls.is_empty() {
        let shown: Vec<&str> = session
            .tool_calls
            .iter()
            .take(5)
            .map(String::as_str)
            .collect();
        let mut chips = format!(" · {}", shown.join(" "));
        if session.tool_calls.len() > 5 {
            chips.push_str(&format!(" +{}", session.tool_calls.len() - 5));
        }
        meta.push(Span::styled(chips, style.fg(theme::DIM)));
    }
    lines.push(Line::from(meta));
}

fn render_session(frame: &mut Frame, area: Rect, view: &SessionView) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER))
        .title(Span::styled(
            format!(" {} ", truncate_end(&view.title, area.width.saturating_sub(4) as usize)),
            Style::default().fg(theme::FG).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height < 2 {
        return;
    }

    // Transcript header: project, source, context-copy status.
    let mut header = vec![
        Span::styled(view.project_name.clone(), Style::default().fg(theme::MUTED)),
        Span::styled(
            format!(" · {}", view.source.label()),
            Style::default().fg(theme::DIM),
        ),
    ];
    match &view.context_copy {
        ContextCopyState::Idle => {}
        ContextCopyState::Loading => header.push(Span::styled(
            " · copying context...",
            Style::default().fg(theme::DIM),
        )),
        ContextCopyState::Copied(_) => header.push(Span::styled(
            " · ✓ context copied",
            Style::default().fg(theme::SUCCESS),
        )),
        ContextCopyState::Failed(error, _) => header.push(Span::styled(
            format!(" · copy failed: {error}"),
            Style::default().fg(theme::ERROR),
        )),
    }
    frame.render_widget(
        Paragraph::new(Line::from(header)),
        Rect { height: 1, ..inner },
    );

    let body = Rect {
        x: inner.x,
        y: inner.y + 1,
        width: inner.width,
        height: inner.height - 1,
    };

    if view.loading {
        frame.render_widget(Paragraph::new(dim_line("loading transcript...")), body);
        return;
    }
    if let Some(error) = &view.error {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(theme::ERROR),
            ))),
            body,
        );
        return;
    }

    let rows = view.rows();
    if rows.is_empty() {
        frame.render_widget(Paragraph::new(dim_line("empty transcript")), body);
        return;
    }

    let width = body.width as usize;
    let mut lines: Vec<Line> = Vec::new();
    let mut selected_range = (0usize, 0usize);

    for (row_index, row) in rows.iter().enumerate() {
        let selected = row_index == view.selected;
        let start = lines.len();
        match *row {
            SessionRow::Message(index) => {
                if let Some(message) = view.messages.get(index) {
                    push_message_lines(&mut lines, view, message, selected, width);
                }
            }
            SessionRow::Tool { message, tool } => {
                if let Some(tool_view) = view
                    .messages
                    .get(message)
                    .and_then(|message| message.tool_calls.get(tool))
                {
                    push_tool_lines(&mut lines, tool_view, view.expanded.contains(&tool_view.id), selected, width);
                }
            }
            SessionRow::FileChange(index) => {
                if let Some(change) = view.file_changes.get(index) {
                    if index == 0 {
                        lines.push(Line::default());
                        lines.push(Line::from(Span::styled(
                            "File changes",
                            Style::default().fg(theme::MUTED).add_modifier(Modifier::BOLD),
                        )));
                    }
                    let style = row_style(selected);
                    let mut spans = vec![
                        Span::styled(format!("  v{:<3}", change.version), style.fg(theme::ACCENT)),
                        Span::styled(change.file_path.clone(), style.fg(theme::FG)),
                        Span::styled(
                            format!("  {}", format_date_time(&change.timestamp)),
                            style.fg(theme::DIM),
                        ),
                    ];
                    if change.backup_file.is_some() {
                        spans.push(Span::styled("  (backup)", style.fg(theme::DIM)));
                    }
                    lines.push(Line::from(spans));
                }
            }
        }
        if selected {
            selected_range = (start, lines.len());
        }
    }

    let offset = scroll_offset(selected_range, lines.len(), body.height);
    frame.render_widget(Paragraph::new(Text::from(lines)).scroll((offset, 0)), body);
}

fn push_message_lines(
    lines: &mut Vec<Line>,
    view: &SessionView,
    message: &crate::domain::MessageView,
    selected: bool,
    width: usize,
) {
    let style = row_style(selected);
    let (who, color) = match message.role {
        MessageRole::User => ("You", theme::ACCENT),
        MessageRole::Assistant => ("Assistant", theme::SUCCESS),
    };
    if !lines.is_empty() {
        lines.push(Line::default());
    }
    let mut header = vec![
        Span::styled(format!("● {who}"), style.fg(color).add_modifier(Modifier::BOLD)),
        Span::styled(
            format!(" · {}", format_date_time(&message.timestamp)),
            style.fg(theme::DIM),
        ),
    ];
    if view.is_copied(&message.uuid) {
        header.push(Span::styled(" · ✓ copied", style.fg(theme::SUCCESS)));
    }
    lines.push(Line::from(header));

    if message.has_text() {
        for text_line in message.content.lines() {
            lines.push(Line::from(Span::styled(
                format!("  {}", truncate_end(text_line, width.saturating_sub(2))),
                style.fg(theme::FG),
            )));
        }
    }
}

fn push_tool_lines(
    lines: &mut Vec<Line>,
    tool: &crate::domain::ToolCallView,
    expanded: bool,
    selected: bool,
    width: usize,
) {
    let style = row_style(selected);
    let color = theme::tool_color(tool.kind.accent());
    let marker = if expanded { "▾" } else { "▸" };
    let mut spans = vec![
        Span::styled(format!("  {marker} "), style.fg(theme::DIM)),
        Span::styled(tool.name.clone(), style.fg(color).add_modifier(Modifier::BOLD)),
        Span::styled(
            format!(" {}", truncate_end(&tool.summary, width.saturating_sub(tool.name.len() + 8))),
            style.fg(theme::MUTED),
        ),
    ];
    if tool.has_result {
        spans.push(Span::styled(" ✓", style.fg(theme::SUCCESS)));
    }
    lines.push(Line::from(spans));

    if expanded {
        let detail_lines = detail_text_lines(tool, width.saturating_sub(6));
        let total = detail_lines.len();
        for detail_line in detail_lines.into_iter().take(MAX_DETAIL_LINES) {
            lines.push(detail_line);
        }
        if total > MAX_DETAIL_LINES {
            lines.push(dim_line(&format!(
                "      ... {} more lines",
                total - MAX_DETAIL_LINES
            )));
        }
    }
}

// Expanded detail body, one widget-free line list per variant.
fn detail_text_lines(tool: &crate::domain::ToolCallView, width: usize) -> Vec<Line<'static>> {
    let mut lines: Vec<Line> = Vec::new();
    let indent = "      ";
    let body_style = Style::default().fg(theme::FG);
    let dim = Style::default().fg(theme::DIM);

    match &tool.detail {
        ToolDetail::Diff {
            file_path,
            old_text,
            new_text,
        } => {
            let diff = diff_lines(old_text, new_text);
            let stats = diff_stats(&diff);
            lines.push(Line::from(vec![
                Span::styled(format!("{indent}{file_path} "), dim),
                Span::styled(format!("+{}", stats.added), Style::default().fg(theme::DIFF_ADDED)),
                Span::styled(
                    format!(" -{}", stats.removed),
                    Style::default().fg(theme::DIFF_REMOVED),
                ),
            ]));
            for line in diff {
                let (sign, color) = match line.kind {
                    DiffLineKind::Added => ("+", theme::DIFF_ADDED),
                    DiffLineKind::Removed => ("-", theme::DIFF_REMOVED),
                    DiffLineKind::Unchanged => (" ", theme::MUTED),
                };
                let old_no = line
                    .old_line_no
                    .map(|no| no.to_string())
                    .unwrap_or_default();
                let new_no = line
                    .new_line_no
                    .map(|no| no.to_string())
                    .unwrap_or_default();
                lines.push(Line::from(vec![
                    Span::styled(format!("{indent}{old_no:>4} {new_no:>4} "), dim),
                    Span::styled(
                        format!("{sign} {}", truncate_end(&line.content, width.saturating_sub(12))),
                        Style::default().fg(color),
                    ),
                ]));
            }
        }
        ToolDetail::Code { file_path, content } => {
            if !file_path.is_empty() {
                lines.push(Line::from(Span::styled(format!("{indent}{file_path}"), dim)));
            }
            for code_line in content.lines() {
                lines.push(Line::from(Span::styled(
                    format!("{indent}{}", truncate_end(code_line, width)),
                    body_style,
                )));
            }
        }
        ToolDetail::RichText(text) => {
            for text_line in text.lines() {
                lines.push(Line::from(Span::styled(
                    format!("{indent}{}", truncate_end(text_line, width)),
                    body_style,
                )));
            }
        }
        ToolDetail::Subtask {
            agent_type,
            description,
            prompt,
        } => {
            let mut header = Vec::new();
            if let Some(agent_type) = agent_type {
                header.push(Span::styled(
                    format!("{indent}[{agent_type}] "),
                    Style::default().fg(theme::ACCENT),
                ));
            }
            if let Some(description) = description {
                header.push(Span::styled(description.clone(), dim));
            }
            if !header.is_empty() {
                lines.push(Line::from(header));
            }
            for text_line in prompt.lines() {
                lines.push(Line::from(Span::styled(
                    format!("{indent}{}", truncate_end(text_line, width)),
                    body_style,
                )));
            }
        }
        ToolDetail::FileList(entries) => {
            for entry in entries {
                lines.push(Line::from(Span::styled(
                    format!("{indent}• {}", truncate_end(entry, width.saturating_sub(2))),
                    body_style,
                )));
            }
        }
        ToolDetail::WebFetch { url, content } => {
            lines.push(Line::from(Span::styled(
                format!("{indent}{url}"),
                Style::default().fg(theme::tool_color(crate::domain::ToolAccent::Web)),
            )));
            if let Some(content) = content {
                for text_line in content.lines() {
                    lines.push(Line::from(Span::styled(
                        format!("{indent}{}", truncate_end(text_line, width)),
                        body_style,
                    )));
                }
            }
        }
        ToolDetail::WebSearch { query, content } => {
            lines.push(Line::from(Span::styled(
                format!("{indent}search: {query}"),
                Style::default().fg(theme::tool_color(crate::domain::ToolAccent::Web)),
            )));
            if let Some(content) = content {
                for text_line in content.lines() {
                    lines.push(Line::from(Span::styled(
                        format!("{indent}{}", truncate_end(text_line, width)),
                        body_style,
                    )));
                }
            }
        }
        ToolDetail::Questions(questions) => {
            for question in questions {
                lines.push(Line::from(Span::styled(
                    format!("{indent}{}", question.question),
                    body_style.add_modifier(Modifier::BOLD),
                )));
                for (index, option) in question.options.iter().enumerate() {
                    let mut text = format!("{indent}  {}. {}", index + 1, option.label);
                    if let Some(description) = &option.description {
                        text.push_str(&format!(" - {description}"));
                    }
                    lines.push(Line::from(Span::styled(truncate_end(&text, width + indent.len()), dim)));
                }
            }
        }
        ToolDetail::Todos(todos) => {
            for todo in todos {
                let done = todo.status.as_deref() == Some("completed");
                let checkbox = if done { "[x]" } else { "[ ]" };
                let mut spans = vec![Span::styled(
                    format!("{indent}{checkbox} "),
                    if done {
                        Style::default().fg(theme::SUCCESS)
                    } else {
                        dim
                    },
                )];
                let content_style = if done {
                    dim.add_modifier(Modifier::CROSSED_OUT)
                } else {
                    body_style
                };
                spans.push(Span::styled(
                    truncate_end(&todo.content, width.saturating_sub(10)),
                    content_style,
                ));
                if let Some(priority) = &todo.priority {
                    spans.push(Span::styled(format!(" ({priority})"), dim));
                }
                lines.push(Line::from(spans));
            }
        }
        ToolDetail::TaskCreate {
            subject,
            description,
        } => {
            lines.push(Line::from(Span::styled(
                format!("{indent}{subject}"),
                body_style.add_modifier(Modifier::BOLD),
            )));
            if let Some(description) = description {
                for text_line in description.lines() {
                    lines.push(Line::from(Span::styled(
                        format!("{indent}{}", truncate_end(text_line, width)),
                        dim,
                    )));
                }
            }
        }
        ToolDetail::TaskUpdate { task_id, status } => {
            lines.push(Line::from(vec![
                Span::styled(format!("{indent}#{task_id}"), Style::default().fg(theme::ACCENT)),
                Span::styled(
                    format!(" -> {}", status.as_deref().unwrap_or("updated")),
                    body_style,
                ),
            ]));
        }
        ToolDetail::Raw { input_json, output } => {
            if let Some(input_json) = input_json {
                lines.push(Line::from(Span::styled(format!("{indent}input:"), dim)));
                for text_line in input_json.lines() {
                    lines.push(Line::from(Span::styled(
                        format!("{indent}{}", truncate_end(text_line, width)),
                        dim,
                    )));
                }
            }
            if let Some(output) = output {
                lines.push(Line::from(Span::styled(format!("{indent}output:"), dim)));
                for text_line in output.lines() {
                    lines.push(Line::from(Span::styled(
                        format!("{indent}{}", truncate_end(text_line, width)),
                        body_style,
                    )));
                }
            }
        }
        ToolDetail::NoOutput => {
            lines.push(Line::from(Span::styled(
                format!("{indent}(no output)"),
                dim.add_modifier(Modifier::ITALIC),
            )));
        }
    }

    lines
}

fn render_usage(frame: &mut Frame, area: Rect, view: &UsageView) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER))
        .title(Span::styled(
            format!(" Token usage · {} · last {} days ", view.source.label(), view.days),
            Style::default().fg(theme::FG).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if view.loading {
        frame.render_widget(Paragraph::new(dim_line("loading usage...")), inner);
        return;
    }
    if let Some(error) = &view.error {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(theme::ERROR),
            ))),
            inner,
        );
        return;
    }

    let mut lines: Vec<Line> = Vec::new();

    if let Some(summary) = &view.summary {
        for (label, bucket) in [
            ("Today", summary.today),
            ("This month", summary.this_month),
            ("Total", summary.total),
        ] {
            lines.push(Line::from(vec![
                Span::styled(format!("{label:<12}", ), Style::default().fg(theme::MUTED)),
                Span::styled(
                    format!("{:>10}", format_tokens(bucket.total_tokens)),
                    Style::default().fg(theme::FG).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {}", format_cost(bucket.cost_usd)),
                    Style::default().fg(theme::ACCENT),
                ),
            ]));
        }
        lines.push(Line::default());
    }

    if let Some(detail) = &view.detail {
        let models = detail.models_by_total();
        if !models.is_empty() {
            lines.push(Line::from(Span::styled(
                "By model",
                Style::default().fg(theme::MUTED).add_modifier(Modifier::BOLD),
            )));
            lines.push(usage_table_header("Model"));
            for (model, usage) in models {
                lines.push(usage_table_row(&format_model_name(&model), usage));
            }
            lines.push(Line::default());
        }

        if !detail.daily_usage.is_empty() {
            lines.push(Line::from(Span::styled(
                "Daily",
                Style::default().fg(theme::MUTED).add_modifier(Modifier::BOLD),
            )));
            lines.push(usage_table_header("Date"));
            for day in &detail.daily_usage {
                let mut line = usage_table_row(&day.date, day_usage_tokens(day));
                if !day.models.is_empty() {
                    let models = day
                        .models
                        .iter()
                        .map(|model| format_model_name(model))
                        .collect::<Vec<_>>()
                        .join(", ");
                    line.push_span(Span::styled(
                        format!("  {models}"),
                        Style::default().fg(theme::DIM),
                    ));
                }
                lines.push(line);
            }
        }
    }

    if lines.is_empty() {
        lines.push(dim_line("no usage recorded"));
    }

    frame.render_widget(Paragraph::new(Text::from(lines)), inner);
}

fn day_usage_tokens(day: &crate::domain::DailyUsage) -> crate::domain::TokenUsage {
    crate::domain::TokenUsage {
        input_tokens: day.input_tokens,
        output_tokens: day.output_tokens,
        cache_creation_tokens: day.cache_creation_tokens,
        cache_read_tokens: day.cache_read_tokens,
        total_tokens: day.total_tokens,
        cost_usd: day.cost_usd,
    }
}

fn usage_table_header(first: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!(
            "{first:<14}{:>9}{:>9}{:>10}{:>10}{:>9}{:>10}",
            "Input", "Output", "CacheCr", "CacheRd", "Total", "Cost"
        ),
        Style::default().fg(theme::DIM),
    ))
}

fn usage_table_row(label: &str, usage: crate::domain::TokenUsage) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{:<14}", truncate_end(label, 13)),
            Style::default().fg(theme::FG),
        ),
        Span::styled(
            format!(
                "{:>9}{:>9}{:>10}{:>10}{:>9}",
                format_tokens(usage.input_tokens),
                format_tokens(usage.output_tokens),
                format_tokens(usage.cache_creation_tokens),
                format_tokens(usage.cache_read_tokens),
                format_tokens(usage.total_tokens),
            ),
            Style::default().fg(theme::MUTED),
        ),
        Span::styled(
            format!("{:>10}", format_cost_precise(usage.cost_usd)),
            Style::default().fg(theme::ACCENT),
        ),
    ])
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let entries: &[(&str, &str)] = &[
        ("enter", "open session / expand tool call"),
        ("j/k or arrows", "move selection"),
        ("/", "search sessions"),
        ("t", "toggle list vs timeline"),
        ("s", "cycle source (Claude/Codex/Gemini)"),
        ("p", "cycle project filter"),
        ("u", "usage statistics"),
        ("y", "copy message text"),
        ("c", "copy compacted session context"),
        ("R", "refresh usage cache"),
        ("r", "reload current view"),
        ("esc", "back / quit"),
    ];

    let popup_width = 52u16.min(area.width);
    let popup_height = (entries.len() as u16 + 2).min(area.height);
    let popup = Rect {
        x: area.x + (area.width.saturating_sub(popup_width)) / 2,
        y: area.y + (area.height.saturating_sub(popup_height)) / 2,
        width: popup_width,
        height: popup_height,
    };

    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER))
        .style(Style::default().bg(theme::SURFACE))
        .title(" keys ");
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let lines: Vec<Line> = entries
        .iter()
        .map(|(key, action)| {
            Line::from(vec![
                Span::styled(format!(" {key:<14}"), Style::default().fg(theme::ACCENT)),
                Span::styled(*action, Style::default().fg(theme::FG)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(Text::from(lines)), inner);
}

fn highlighted_line(text: &str, query: &str, selected: bool) -> Line<'static> {
    let base = row_style(selected);
    let spans = highlight_spans(text, query)
        .into_iter()
        .map(|span| {
            if span.highlighted {
                Span::styled(
                    span.text,
                    Style::default()
                        .fg(theme::HIGHLIGHT_FG)
                        .bg(theme::HIGHLIGHT_BG),
                )
            } else {
                Span::styled(span.text, base.fg(theme::FG))
            }
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}

fn row_style(selected: bool) -> Style {
    if selected {
        Style::default().bg(theme::SELECTION_BG)
    } else {
        Style::default()
    }
}

fn dim_line(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(theme::DIM),
    ))
}

// Keeps the selected row inside the viewport without per-frame scroll state.
fn scroll_offset(selected_range: (usize, usize), total_lines: usize, height: u16) -> u16 {
    let height = height as usize;
    if height == 0 || total_lines <= height {
        return 0;
    }
    let (start, end) = selected_range;
    let max_offset = total_lines - height;

    // Center the selected row, but never scroll past the ends.
    let middle = start.saturating_add(end.saturating_sub(start) / 2);
    let desired = middle.saturating_sub(height / 2);
    desired.min(max_offset) as u16
}

fn truncate_end(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if UnicodeWidthStr::width(text) <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0usize;
    for ch in text.chars() {
        let ch_width = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + ch_width + 1 > max_width {
            break;
        }
        out.push(ch);
        used += ch_width;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_on_display_width() {
        assert_eq!(truncate_end("hello", 10), "hello");
        assert_eq!(truncate_end("hello world", 6), "hello…");
        // Wide chars count double.
        assert_eq!(truncate_end("日本語テキスト", 5), "日本…");
    }

    #[test]
    fn scroll_keeps_short_content_pinned() {
        assert_eq!(scroll_offset((0, 2), 10, 20), 0);
        assert!(scroll_offset((90, 92), 100, 20) <= 80);
    }
}
