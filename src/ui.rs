pub mod charting;

use std::ops::Range;
use std::time::Instant;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Block, Chart, Dataset, GraphType, Paragraph, Widget},
    Frame,
};
use typesprint::{session::Phase, theme::Theme, Mode};
use unicode_width::UnicodeWidthChar;

use crate::{App, AppState, KeyFlash};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;
/// Rows of target text visible at once; the view scrolls with the caret.
const VISIBLE_TEXT_ROWS: usize = 3;
/// Attempts averaged for the results screen.
const AVERAGE_OVER: usize = 10;
const WEAKEST_KEYS: usize = 5;

pub fn draw(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let theme = self.theme();
        Block::default()
            .style(Style::default().bg(theme.bg_color()).fg(theme.main_color()))
            .render(area, buf);

        match self.state {
            AppState::Typing => render_typing(self, theme, area, buf),
            AppState::Results => render_results(self, theme, area, buf),
        }
    }
}

fn render_typing(app: &App, theme: &Theme, area: Rect, buf: &mut Buffer) {
    let engine = &app.engine;
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // settings
            Constraint::Min(0),
            Constraint::Length(1), // timer, wpm, accuracy
            Constraint::Length(VISIBLE_TEXT_ROWS as u16),
            Constraint::Min(0),
            Constraint::Length(4), // keyboard
            Constraint::Length(1), // notice or legend
        ])
        .split(area);

    Paragraph::new(Span::styled(settings_summary(app), dim_style)).render(chunks[0], buf);

    let timer = match engine.remaining_seconds() {
        Some(secs) => format!("{:.0}", secs.ceil()),
        None => format!("{}/{}", engine.input().len(), engine.target().len()),
    };
    let hud = Line::from(vec![
        Span::styled(timer, bold_style.fg(theme.caret_color())),
        Span::raw("   "),
        Span::styled(format!("{} wpm", engine.wpm()), bold_style),
        Span::raw("   "),
        Span::styled(format!("{}% acc", engine.accuracy()), bold_style),
    ]);
    let hud_style = if engine.phase() == Phase::Idle {
        dim_style
    } else {
        Style::default()
    };
    Paragraph::new(hud)
        .style(hud_style)
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    let text_area = chunks[3];
    let target = engine.target();
    let input = engine.input();
    let lines = wrap_lines(target, text_area.width as usize);
    let first = first_visible_line(&lines, input.len());
    let rendered: Vec<Line> = lines
        .iter()
        .skip(first)
        .take(VISIBLE_TEXT_ROWS)
        .map(|range| {
            Line::from(
                range
                    .clone()
                    .map(|idx| char_span(theme, target, input, idx))
                    .collect::<Vec<_>>(),
            )
        })
        .collect();
    Paragraph::new(rendered)
        .alignment(if lines.len() == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .render(text_area, buf);

    let flash = app.flash_visible(Instant::now());
    Paragraph::new(keyboard_lines(app, theme, flash))
        .alignment(Alignment::Center)
        .render(chunks[5], buf);

    let footer = match app.notice {
        Some(ref notice) => Span::styled(notice.clone(), bold_style.fg(theme.error_color())),
        None => Span::styled(
            "(tab) restart / (shift+tab) mode / (f2) theme / (f3) layout / (esc)ape",
            Style::default().add_modifier(Modifier::ITALIC),
        ),
    };
    Paragraph::new(footer).render(chunks[6], buf);
}

fn settings_summary(app: &App) -> String {
    let cfg = &app.config;
    let detail = match cfg.mode {
        Mode::Time => format!("{}s", cfg.duration),
        Mode::Word | Mode::Practice => format!("{} words", cfg.word_count),
        Mode::Quote => "quote".to_string(),
    };
    format!(
        "{} · {} · {} · {}",
        cfg.mode,
        detail,
        cfg.layout,
        app.theme().name
    )
}

fn char_span<'a>(theme: &Theme, target: &[char], input: &[char], idx: usize) -> Span<'a> {
    let expected = target[idx];
    match input.get(idx) {
        Some(&typed) if typed == expected => Span::styled(
            expected.to_string(),
            Style::default().fg(theme.correct_color()),
        ),
        Some(&typed) => Span::styled(
            match typed {
                ' ' => "·".to_owned(),
                c => c.to_string(),
            },
            Style::default()
                .fg(theme.error_color())
                .add_modifier(Modifier::BOLD),
        ),
        None if idx == input.len() => Span::styled(
            expected.to_string(),
            Style::default()
                .fg(theme.caret_color())
                .add_modifier(Modifier::UNDERLINED | Modifier::BOLD),
        ),
        None => Span::styled(
            expected.to_string(),
            Style::default()
                .fg(theme.main_color())
                .add_modifier(Modifier::DIM),
        ),
    }
}

/// Greedy word wrap of `target` into lines at most `width` columns wide.
/// A word keeps its trailing space; a word wider than the line gets a line
/// of its own.
pub fn wrap_lines(target: &[char], width: usize) -> Vec<Range<usize>> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line_start = 0;
    let mut line_width = 0;
    let mut word_start = 0;

    while word_start < target.len() {
        let word_end = target[word_start..]
            .iter()
            .position(|&c| c == ' ')
            .map_or(target.len(), |p| word_start + p + 1);
        let word_width: usize = target[word_start..word_end]
            .iter()
            .map(|c| c.width().unwrap_or(0))
            .sum();

        if line_width > 0 && line_width + word_width > width {
            lines.push(line_start..word_start);
            line_start = word_start;
            line_width = 0;
        }
        line_width += word_width;
        word_start = word_end;
    }

    if line_start < target.len() || lines.is_empty() {
        lines.push(line_start..target.len());
    }
    lines
}

/// First line to show so the caret stays on the second visible row once
/// the text is longer than the view.
fn first_visible_line(lines: &[Range<usize>], cursor: usize) -> usize {
    let caret_line = lines
        .iter()
        .position(|r| r.contains(&cursor))
        .unwrap_or(lines.len().saturating_sub(1));
    let last_start = lines.len().saturating_sub(VISIBLE_TEXT_ROWS);
    caret_line.saturating_sub(1).min(last_start)
}

fn keyboard_lines<'a>(app: &App, theme: &Theme, flash: Option<KeyFlash>) -> Vec<Line<'a>> {
    let layout = app.config.layout;
    let lit = flash.and_then(|f| layout.position_of(f.key).map(|pos| (pos, f.correct)));
    let key_style = |correct: bool| {
        let bg = if correct {
            theme.correct_color()
        } else {
            theme.error_color()
        };
        Style::default()
            .fg(theme.bg_color())
            .bg(bg)
            .add_modifier(Modifier::BOLD)
    };
    let idle_style = Style::default().fg(theme.main_color());

    let mut lines: Vec<Line> = layout
        .rows()
        .iter()
        .enumerate()
        .map(|(row, keys)| {
            let spans = keys
                .chars()
                .enumerate()
                .map(|(col, key)| {
                    let style = match lit {
                        Some((pos, correct)) if pos == (row, col) => key_style(correct),
                        _ => idle_style,
                    };
                    Span::styled(format!(" {key} "), style)
                })
                .collect::<Vec<_>>();
            Line::from(spans)
        })
        .collect();

    let space_style = match flash {
        Some(f) if f.key == ' ' => key_style(f.correct),
        _ => idle_style,
    };
    lines.push(Line::from(Span::styled(
        "[          space          ]",
        space_style,
    )));
    lines
}

fn render_results(app: &App, theme: &Theme, area: Rect, buf: &mut Buffer) {
    let engine = &app.engine;
    let history = engine.history();
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),    // progress chart
            Constraint::Length(1), // stats
            Constraint::Length(1), // compared with earlier attempts
            Constraint::Length(1), // this attempt's misses
            Constraint::Length(1), // weakest keys overall
            Constraint::Length(1), // notice
            Constraint::Length(1), // legend
        ])
        .split(area);

    let points = charting::history_points(history.load_all());
    let (attempts, highest_wpm) = charting::compute_chart_params(&points);
    let datasets = vec![Dataset::default()
        .marker(ratatui::symbols::Marker::Braille)
        .style(Style::default().fg(theme.caret_color()))
        .graph_type(GraphType::Line)
        .data(&points)];

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("attempts")
                .bounds([1.0, attempts])
                .labels(vec![
                    Span::styled("1", bold_style),
                    Span::styled(charting::format_label(attempts), bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([0.0, highest_wpm])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(highest_wpm), bold_style),
                ]),
        );
    chart.render(chunks[0], buf);

    let (wpm, accuracy, missed) = match app.last_report {
        Some(ref report) => (report.record.wpm, report.record.accuracy, report.record.missed),
        None => (engine.wpm(), engine.accuracy(), engine.missed().len()),
    };

    Paragraph::new(Span::styled(
        format!("{wpm} wpm   {accuracy}% acc   {missed} missed"),
        bold_style.fg(theme.correct_color()),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    let comparison = match history.previous() {
        Some(prev) => format!(
            "{} wpm / {} acc vs last attempt",
            signed(wpm as i64 - prev.wpm as i64),
            signed(accuracy as i64 - prev.accuracy as i64) + "%",
        ),
        None => "first attempt on record".to_string(),
    };
    let comparison = match history.average_wpm(AVERAGE_OVER) {
        Some(avg) => format!("{comparison}   ·   {avg:.0} wpm average of last {AVERAGE_OVER}"),
        None => comparison,
    };
    Paragraph::new(Span::styled(comparison, italic_style))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    let summary = engine.missed_summary();
    let misses = if summary.is_empty() {
        "Perfect! No mistakes.".to_string()
    } else {
        let keys = summary
            .iter()
            .map(|&(c, n)| format!("{} x{n}", key_name(c)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("missed: {keys}")
    };
    Paragraph::new(misses)
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    let weakest = engine.mistakes().top_missed(WEAKEST_KEYS);
    if !weakest.is_empty() {
        let keys = weakest
            .iter()
            .map(|&(c, n)| format!("{} ({n})", key_name(c)))
            .collect::<Vec<_>>()
            .join("  ");
        Paragraph::new(Span::styled(
            format!("weakest keys: {keys}"),
            Style::default().add_modifier(Modifier::DIM),
        ))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);
    }

    if let Some(ref notice) = app.notice {
        Paragraph::new(Span::styled(
            notice.clone(),
            bold_style.fg(theme.error_color()),
        ))
        .alignment(Alignment::Center)
        .render(chunks[5], buf);
    }

    Paragraph::new(Span::styled("(r)etry / (m)ode / (t)heme / (l)ayout / (q)uit", italic_style)).render(chunks[6], buf);
}

fn signed(n: i64) -> String {
    if n > 0 {
        format!("+{n}")
    } else {
        n.to_string()
    }
}

fn key_name(c: char) -> String {
    match c {
        ' ' => "space".to_string(),
        c => format!("'{c}'"),
    }
}
