use ratatui::prelude::*;
use ratatui::widgets::{Block, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap};

use crate::output::{format_score, truncate_name, NO_SCORE};
use crate::score::MAX_SUB_SCORE;
use crate::tui::app::{App, Field, InputMode, View, SEARCH_DISPLAY_LIMIT};
use crate::tui::theme::ThemeColors;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Handle very small terminal sizes gracefully
    if area.height < 8 || area.width < 30 {
        let msg = Paragraph::new("Terminal too small").alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    // Layout: Title(1) + Tabs(1) + Body(fill) + Status(1)
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(area);

    render_title(frame, chunks[0], app);
    render_tabs(frame, chunks[1], app);
    match app.view {
        View::Rate => render_rate(frame, chunks[2], app),
        View::Search => render_search(frame, chunks[2], app),
        View::Rank => render_rank(frame, chunks[2], app),
        View::Stats => render_stats(frame, chunks[2], app),
    }
    render_status_bar(frame, chunks[3], app);

    match app.input_mode {
        InputMode::Help => render_help_popup(frame, &app.theme),
        InputMode::ImportPath => render_import_popup(frame, app),
        _ => {}
    }
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let title = "Genre Rater";
    let mut spans = vec![Span::styled(
        title,
        Style::default().fg(app.theme.title_color).bold(),
    )];

    let genres = app.session.genres();
    let progress = if genres.is_empty() {
        "no genres loaded".to_string()
    } else {
        format!(
            "genre {} of {}  ·  {} rated",
            app.session.position() + 1,
            genres.len(),
            app.stats.total
        )
    };
    let padding_len = (area.width as usize).saturating_sub(title.len() + progress.chars().count());
    spans.push(Span::raw(" ".repeat(padding_len)));
    spans.push(Span::styled(progress, Style::default().fg(app.theme.muted)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<String> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| format!("{} {}", i + 1, view.title()))
        .collect();
    let selected = View::ALL.iter().position(|v| *v == app.view).unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive_style)
        .highlight_style(app.theme.tab_active_style.reversed())
        .divider(" | ");

    frame.render_widget(tabs, area);
}

// Rate view

fn render_rate(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let Some(name) = app.session.current_name() else {
        let msg = Paragraph::new("No genres loaded. Point genres_file at a list, one genre per line.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.muted));
        frame.render_widget(msg, area);
        return;
    };

    let block = Block::bordered()
        .title(Line::from(Span::styled(
            format!(" #{} ", app.session.position()),
            Style::default().fg(theme.index_color),
        )))
        .border_style(Style::default().fg(theme.popup_border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::vertical([
        Constraint::Length(1), // Name
        Constraint::Length(1), // Link
        Constraint::Length(1),
        Constraint::Length(Field::ALL.len() as u16),
        Constraint::Length(1),
        Constraint::Length(1), // Score
        Constraint::Fill(1),   // Last saved
    ])
    .split(inner);

    frame.render_widget(
        Paragraph::new(Span::styled(name.to_string(), Style::default().fg(theme.accent).bold())),
        chunks[0],
    );
    let url = app.session.current_url().unwrap_or_default();
    frame.render_widget(
        Paragraph::new(Span::styled(url, Style::default().fg(theme.muted).underlined())),
        chunks[1],
    );

    let form: Vec<Line> = Field::ALL
        .iter()
        .map(|field| field_line(app, *field))
        .collect();
    frame.render_widget(Paragraph::new(form), chunks[3]);

    let score = app.draft_score();
    let mut score_spans = vec![
        Span::styled("Score        ", theme.header_style),
        Span::styled(
            format!("{:<14}", format_score(score, app.draft.special)),
            Style::default().fg(theme.score_color(score)).bold(),
        ),
    ];
    if !app.draft.special {
        score_spans.extend(score_bar(score, 10, theme).spans);
    }
    if app.dirty {
        score_spans.push(Span::styled("  (unsaved)", Style::default().fg(theme.flash_error)));
    }
    frame.render_widget(Paragraph::new(Line::from(score_spans)), chunks[5]);

    let saved = match app.session.current_rating().and_then(|r| r.updated_at) {
        Some(at) => format!("Last saved {}", at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")),
        None => "Not rated yet".to_string(),
    };
    frame.render_widget(
        Paragraph::new(Span::styled(saved, Style::default().fg(theme.muted)))
            .wrap(Wrap { trim: true }),
        chunks[6],
    );
}

fn field_line(app: &App, field: Field) -> Line<'static> {
    let theme = &app.theme;
    let editing = app.input_mode == InputMode::Editing(field);
    let selected = app.selected_field == field && app.view == View::Rate;

    let marker = if selected { "> " } else { "  " };
    let label_style = if selected {
        theme.field_selected
    } else {
        Style::default()
    };

    let value = if editing {
        Span::styled(format!("{}|", app.edit_buffer), theme.field_editing)
    } else {
        let text = match field {
            Field::Skip => sub_score_text(app.draft.skip),
            Field::Kiff => sub_score_text(app.draft.kiff),
            Field::Special => check_box(app.draft.special).to_string(),
            Field::Flou => check_box(app.draft.flou).to_string(),
            Field::Comment if app.draft.comment.is_empty() => NO_SCORE.to_string(),
            Field::Comment => truncate_name(&app.draft.comment, 60),
        };
        Span::raw(text)
    };

    Line::from(vec![
        Span::styled(marker, label_style),
        Span::styled(format!("{:<13}", field.label()), label_style),
        value,
    ])
}

fn sub_score_text(value: Option<u8>) -> String {
    match value {
        Some(v) => format!("{} / {}", v, MAX_SUB_SCORE),
        None => NO_SCORE.to_string(),
    }
}

fn check_box(flag: bool) -> &'static str {
    if flag {
        "[x]"
    } else {
        "[ ]"
    }
}

// Search view

fn render_search(frame: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::vertical([Constraint::Length(3), Constraint::Fill(1)]).split(area);

    let typing = app.input_mode == InputMode::SearchInput;
    let query = if typing {
        format!("{}|", app.search_query)
    } else {
        app.search_query.clone()
    };
    let border = if typing {
        app.theme.popup_border
    } else {
        app.theme.muted
    };
    let input = Paragraph::new(query).block(
        Block::bordered()
            .title(" Search ")
            .border_style(Style::default().fg(border)),
    );
    frame.render_widget(input, chunks[0]);

    let all = app.search_results();
    if all.is_empty() {
        let hint = if app.search_query.trim().is_empty() {
            "Press / to search genre names"
        } else {
            "No matches"
        };
        let msg = Paragraph::new(hint)
            .alignment(Alignment::Center)
            .style(Style::default().fg(app.theme.muted));
        frame.render_widget(msg, chunks[1]);
        return;
    }

    let rows: Vec<Row> = all
        .iter()
        .take(SEARCH_DISPLAY_LIMIT)
        .enumerate()
        .map(|(idx, (id, name))| {
            let rating = app.session.store().get_rating(*id);
            let score = rating.and_then(|r| r.score());
            let special = rating.is_some_and(|r| r.special);
            let score_text = if rating.is_some() {
                format_score(score, special)
            } else {
                String::new()
            };
            alt_row(
                idx,
                vec![
                    Cell::from(format!("#{}", id)).style(Style::default().fg(app.theme.index_color)),
                    Cell::from(name.clone()),
                    Cell::from(score_text).style(Style::default().fg(app.theme.score_color(score))),
                ],
                &app.theme,
            )
        })
        .collect();

    let mut title = format!(" {} matches ", all.len());
    if all.len() > SEARCH_DISPLAY_LIMIT {
        title = format!(" showing {} of {} matches ", SEARCH_DISPLAY_LIMIT, all.len());
    }

    let widths = [
        Constraint::Length(8),
        Constraint::Fill(1),
        Constraint::Length(14),
    ];
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["ID", "Genre", "Score"])
                .style(app.theme.header_style)
                .bottom_margin(1),
        )
        .block(Block::default().title(Span::styled(title, Style::default().fg(app.theme.muted))))
        .row_highlight_style(app.theme.row_selected);

    frame.render_stateful_widget(table, chunks[1], &mut app.search_state);
}

// Rank view

fn render_rank(frame: &mut Frame, area: Rect, app: &mut App) {
    if app.ranking.is_empty() {
        let msg = Paragraph::new("Nothing ranked yet. Rate a genre with both Skip and Kiff.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(app.theme.muted));
        frame.render_widget(msg, area);
        return;
    }

    let visible = app.visible_ranking();
    let rows: Vec<Row> = visible
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let mut score_spans = vec![Span::styled(
                format!("{:>5.2} ", item.score),
                Style::default().fg(app.theme.score_color(Some(item.score))),
            )];
            score_spans.extend(score_bar(Some(item.score), 10, &app.theme).spans);

            let flou = if item.flou { "flou" } else { "" };
            alt_row(
                idx,
                vec![
                    Cell::from(format!("{}.", idx + 1)).style(Style::default().fg(app.theme.index_color)),
                    Cell::from(Line::from(score_spans)),
                    Cell::from(item.name.clone()),
                    Cell::from(flou).style(Style::default().fg(app.theme.muted)),
                ],
                &app.theme,
            )
        })
        .collect();

    let mut title = format!(" {} ranked, {} ", app.ranking.len(), app.rank_order.label());
    if app.ranking.len() > visible.len() {
        title = format!(
            " top {} of {} ranked, {} ",
            visible.len(),
            app.ranking.len(),
            app.rank_order.label()
        );
    }

    let widths = [
        Constraint::Length(6),
        Constraint::Length(17),
        Constraint::Fill(1),
        Constraint::Length(5),
    ];
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["#", "Score", "Genre", ""])
                .style(app.theme.header_style)
                .bottom_margin(1),
        )
        .block(Block::default().title(Span::styled(title, Style::default().fg(app.theme.muted))))
        .row_highlight_style(app.theme.row_selected);

    frame.render_stateful_widget(table, area, &mut app.rank_state);
}

// Stats view

fn render_stats(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let stats = &app.stats;

    let rows = [
        ("Total ratings", stats.total.to_string()),
        ("Special (excluded)", stats.special_count.to_string()),
        ("Counted", stats.eligible.to_string()),
        ("Scored", stats.scored_count.to_string()),
        ("Flou (of counted)", stats.flou_count.to_string()),
    ];
    let mut lines: Vec<Line> = rows
        .into_iter()
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(format!("{:<20}", label), Style::default().fg(theme.muted)),
                Span::styled(value, Style::default().bold()),
            ])
        })
        .collect();
    lines.push(Line::from(vec![
        Span::styled(format!("{:<20}", "Average score"), Style::default().fg(theme.muted)),
        Span::styled(
            format_score(stats.average, false),
            Style::default().fg(theme.score_color(stats.average)).bold(),
        ),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Distribution (rounded 0-10)", theme.header_style)));

    let max = stats.distribution.iter().copied().max().unwrap_or(0);
    let bar_width = (area.width as usize).saturating_sub(14).min(40);
    for (bucket, count) in stats.distribution.iter().enumerate() {
        let filled = if max == 0 {
            0
        } else {
            ((*count as f64 / max as f64) * bar_width as f64).round() as usize
        };
        let color = theme.score_color(Some(bucket as f64));
        lines.push(Line::from(vec![
            Span::styled(format!("{:>3} ", bucket), Style::default().fg(theme.index_color)),
            Span::raw(format!("{:>5} ", count)),
            Span::styled("█".repeat(filled), Style::default().fg(color)),
        ]));
    }

    let block = Block::bordered()
        .title(" Stats ")
        .border_style(Style::default().fg(theme.muted));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

// Shared pieces

fn alt_row<'a>(idx: usize, cells: Vec<Cell<'a>>, theme: &ThemeColors) -> Row<'a> {
    let style = if idx % 2 == 1 {
        Style::default().bg(theme.row_alt_bg)
    } else {
        Style::default()
    };
    Row::new(cells).style(style)
}

/// A 0-10 score as a fixed-width bar
fn score_bar(score: Option<f64>, width: usize, theme: &ThemeColors) -> Line<'static> {
    let ratio = score.map(|s| (s / 10.0).clamp(0.0, 1.0)).unwrap_or(0.0);
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);

    let mut spans = Vec::new();
    if filled > 0 {
        spans.push(Span::styled(
            "█".repeat(filled),
            Style::default().fg(theme.score_color(score)),
        ));
    }
    if empty > 0 {
        spans.push(Span::styled("░".repeat(empty), Style::default().fg(theme.bar_empty)));
    }
    Line::from(spans)
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let text = if let Some((ref msg, _)) = app.flash_message {
        let msg_color = if msg.starts_with("Failed") || msg.starts_with("Error") {
            theme.flash_error
        } else if msg.starts_with("Saved:")
            || msg.starts_with("Opened:")
            || msg.starts_with("Exported")
            || msg.starts_with("Imported")
        {
            theme.flash_success
        } else {
            theme.muted
        };
        Line::from(Span::styled(msg.clone(), Style::default().fg(msg_color)))
    } else {
        let hints: &[(&str, &str)] = match (app.input_mode, app.view) {
            (InputMode::Editing(_), _) => &[("Enter", ":confirm "), ("Esc", ":cancel")],
            (InputMode::SearchInput, _) => &[("Enter", ":done "), ("Esc", ":done")],
            (InputMode::ImportPath, _) => &[("Enter", ":import "), ("Esc", ":cancel")],
            (_, View::Rate) => &[
                ("j/k", ":field "),
                ("Enter", ":edit "),
                ("s", ":save "),
                ("n", ":save+next "),
                ("N", ":skip "),
                ("o", ":open "),
                ("?", ":help "),
                ("q", ":quit"),
            ],
            (_, View::Search) => &[
                ("/", ":search "),
                ("j/k", ":nav "),
                ("Enter", ":rate "),
                ("?", ":help "),
                ("q", ":quit"),
            ],
            (_, View::Rank) => &[
                ("j/k", ":nav "),
                ("Enter", ":rate "),
                ("r", ":reverse "),
                ("?", ":help "),
                ("q", ":quit"),
            ],
            (_, View::Stats) => &[
                ("E", ":export "),
                ("I", ":import "),
                ("Tab", ":view "),
                ("?", ":help "),
                ("q", ":quit"),
            ],
        };

        let mut spans = Vec::new();
        for (i, (key, label)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(*key, Style::default().fg(theme.status_key_color)));
            spans.push(Span::raw(*label));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(theme.status_bar_bg)),
        area,
    );
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Render the backup path prompt
fn render_import_popup(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let popup_area = centered_rect_fixed(70, 5, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(Span::styled(" Import Backup ", theme.popup_title))
        .border_style(Style::default().fg(theme.popup_border));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(inner);

    // Keep the end of long paths visible
    let width = chunks[0].width.saturating_sub(1) as usize;
    let chars: Vec<char> = app.edit_buffer.chars().collect();
    let shown: String = chars[chars.len().saturating_sub(width)..].iter().collect();
    frame.render_widget(
        Paragraph::new(Span::styled(format!("{}|", shown), theme.field_editing)),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new("Enter: replace all ratings | Esc: cancel")
            .style(Style::default().fg(theme.muted)),
        chunks[1],
    );
}

/// Render the help overlay popup
fn render_help_popup(frame: &mut Frame, theme: &ThemeColors) {
    let shortcuts = [
        ("Tab / 1-4", "Switch view"),
        ("j / k", "Move between fields or rows"),
        ("Enter / e", "Edit field, or rate selected genre"),
        ("Space", "Toggle Special / Flou"),
        ("x / f", "Toggle Special / Flou directly"),
        ("s", "Save rating"),
        ("n", "Save and go to next genre"),
        ("N", "Next genre without saving"),
        ("o", "Open reference page"),
        ("/", "Search genres"),
        ("r", "Reverse ranking order"),
        ("E", "Export backup"),
        ("I", "Import backup (replaces all)"),
        ("?", "Show/hide this help"),
        ("q / Ctrl-c", "Quit"),
    ];

    let popup_area = centered_rect_fixed(52, shortcuts.len() as u16 + 4, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(Span::styled(" Keyboard Shortcuts ", theme.popup_title))
        .border_style(Style::default().fg(theme.popup_border));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_style = Style::default().fg(theme.status_key_color).bold();
    let mut help_lines: Vec<Line> = shortcuts
        .iter()
        .map(|(key, action)| {
            Line::from(vec![
                Span::styled(format!("{:<14}", key), key_style),
                Span::raw(*action),
            ])
        })
        .collect();
    help_lines.push(Line::from(""));
    help_lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(theme.muted),
    )));

    frame.render_widget(Paragraph::new(help_lines), inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fixed_clamps_to_area() {
        let area = Rect::new(0, 0, 20, 10);
        let rect = centered_rect_fixed(40, 4, area);
        assert_eq!(rect.width, 20);
        assert_eq!(rect.height, 4);
        assert_eq!(rect.y, 3);
    }

    #[test]
    fn test_score_bar_widths() {
        let theme = ThemeColors::dark();
        let full: usize = score_bar(Some(10.0), 10, &theme)
            .spans
            .iter()
            .map(|s| s.content.chars().count())
            .sum();
        assert_eq!(full, 10);

        let empty = score_bar(None, 10, &theme);
        assert_eq!(empty.spans.len(), 1);
        assert_eq!(empty.spans[0].content, "░".repeat(10));
    }

    #[test]
    fn test_sub_score_text() {
        assert_eq!(sub_score_text(Some(7)), "7 / 10");
        assert_eq!(sub_score_text(None), NO_SCORE);
    }
}
