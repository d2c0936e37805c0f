use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::app::App;
use crate::models::{FocusArea, Level, SelectionState};
use crate::theme::Theme;
use crate::utils::centered_rect;

// Numbered entries in a recommendation, e.g. "1." or "**2.**"
static NUMBERED_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\*\*)?\d+\.").unwrap());

static THEME: Lazy<Theme> = Lazy::new(Theme::default);

pub const TRIGGER_IDLE: &str = "Get Recommendation";
pub const TRIGGER_BUSY: &str = "Getting Recommendations...";

/// Highlights the numbered lines of a recommendation text.
fn render_result_text(text: &str) -> Vec<Line<'static>> {
    text.lines()
        .map(|line| {
            if NUMBERED_REGEX.is_match(line) {
                Line::from(Span::styled(line.to_owned(), THEME.list_number))
            } else {
                Line::from(line.to_owned())
            }
        })
        .collect()
}

fn border_style(focus: FocusArea, area: FocusArea) -> Style {
    if focus == area { THEME.focus_border } else { THEME.blurred_border }
}

fn selection_list<'a>(
    title: &'a str,
    options: Vec<&'a str>,
    chosen: &str,
    cursor: usize,
    focused: bool,
    disabled: bool,
) -> (List<'a>, ListState) {
    let items: Vec<ListItem> = options
        .iter()
        .map(|option| {
            let style = if disabled {
                THEME.disabled
            } else if *option == chosen {
                THEME.chosen
            } else {
                THEME.text
            };
            let marker = if *option == chosen { "● " } else { "  " };
            ListItem::new(Line::from(vec![Span::raw(marker), Span::styled(*option, style)]))
        })
        .collect();
    let border = if disabled {
        THEME.disabled
    } else if focused {
        THEME.focus_border
    } else {
        THEME.blurred_border
    };
    let mut state = ListState::default();
    if !options.is_empty() && !disabled {
        state.select(Some(cursor.min(options.len() - 1)));
    }
    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL).style(border))
        .highlight_symbol("→")
        .highlight_style(if focused { THEME.selection } else { Style::default() });
    (list, state)
}

/// Renders the whole recommender view.
pub fn render(f: &mut Frame, app: &App) {
    let state = app.store.lock().clone();
    let area = f.area();
    let error_height = if state.last_error.is_some() { 1 } else { 0 };
    let vertical_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),            // title
            Constraint::Length(10),           // selection lists
            Constraint::Length(3),            // trigger
            Constraint::Length(error_height), // error
            Constraint::Min(3),               // results
            Constraint::Length(3),            // footer
        ])
        .split(area);

    let title = Paragraph::new("📚 AI Book Recommender").style(THEME.title);
    f.render_widget(title, vertical_chunks[0]);

    render_selection(f, app, &state, vertical_chunks[1]);
    render_trigger(f, &state, vertical_chunks[2]);

    if let Some(error) = &state.last_error {
        let line = Paragraph::new(format!("Error: {}", error)).style(THEME.error);
        f.render_widget(line, vertical_chunks[3]);
    }

    render_results(f, app, &state, vertical_chunks[4]);

    // footer
    let help = "Tab/Shift+Tab Focus | ↑/↓ or j/k Move | Enter Choose/Expand | g Get | PgUp/PgDn Scroll | c Copy | R Reset | K API key | q Quit";
    let footer_text = match &app.status {
        Some(status) => format!("{} | {}", status, help),
        None => help.to_string(),
    };
    let footer = Paragraph::new(footer_text)
        .block(Block::default().borders(Borders::ALL))
        .style(THEME.footer);
    f.render_widget(footer, vertical_chunks[5]);

    if app.key_prompt.visible {
        render_key_prompt(f, app);
    }
}

fn render_selection(f: &mut Frame, app: &App, state: &SelectionState, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(35), Constraint::Percentage(25)])
        .split(area);

    let genres: Vec<&str> = app.catalog.genres().collect();
    let (list, mut list_state) = selection_list(
        "Genre", genres, &state.genre, app.genre_cursor, app.focus == FocusArea::Genre, false,
    );
    f.render_stateful_widget(list, columns[0], &mut list_state);

    let moods: Vec<&str> = app.catalog.moods_for(&state.genre).iter().map(String::as_str).collect();
    let mood_title = if state.genre.is_empty() { "Mood (choose a genre)" } else { "Mood" };
    let (list, mut list_state) = selection_list(
        mood_title, moods, &state.mood, app.mood_cursor, app.focus == FocusArea::Mood, state.genre.is_empty(),
    );
    f.render_stateful_widget(list, columns[1], &mut list_state);

    let levels: Vec<&str> = Level::ALL.iter().map(|l| l.as_str()).collect();
    let chosen_level = state.level.map(Level::as_str).unwrap_or("");
    let (list, mut list_state) = selection_list(
        "Level", levels, chosen_level, app.level_cursor, app.focus == FocusArea::Level, false,
    );
    f.render_stateful_widget(list, columns[2], &mut list_state);
}

fn render_trigger(f: &mut Frame, state: &SelectionState, area: Rect) {
    let (label, style) = if state.loading {
        (TRIGGER_BUSY, THEME.button_busy)
    } else if state.can_fetch() {
        (TRIGGER_IDLE, THEME.button)
    } else {
        (TRIGGER_IDLE, THEME.button_disabled)
    };
    let button = Paragraph::new(format!(" [g] {} ", label))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL))
        .style(style);
    f.render_widget(button, area);
}

fn render_results(f: &mut Frame, app: &App, state: &SelectionState, area: Rect) {
    let border = border_style(app.focus, FocusArea::Results);
    if state.results.is_empty() {
        let placeholder = Paragraph::new("No recommendations yet. Choose genre, mood and level, then press 'g'.")
            .block(Block::default().title("Recommendations").borders(Borders::ALL).style(border))
            .alignment(Alignment::Center)
            .style(THEME.disabled);
        f.render_widget(placeholder, area);
        return;
    }

    let expanded = app.results.expanded.and_then(|i| state.results.get(i).map(|r| (i, r)));
    let chunks = if expanded.is_some() {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(area)
    } else {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1)])
            .split(area)
    };

    let items: Vec<ListItem> = state
        .results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            let arrow = if Some(i) == app.results.expanded { "▾ " } else { "▸ " };
            ListItem::new(Line::from(vec![
                Span::raw(arrow),
                Span::styled(result.summary(i), THEME.result_summary),
                Span::raw("  "),
                Span::styled(result.timestamp_iso(), THEME.result_timestamp),
            ]))
        })
        .collect();
    let mut list_state = ListState::default();
    list_state.select(Some(app.results.cursor.min(state.results.len() - 1)));
    let list = List::new(items)
        .block(Block::default().title(format!("Recommendations ({})", state.results.len())).borders(Borders::ALL).style(border))
        .highlight_style(if app.focus == FocusArea::Results { THEME.selection } else { Style::default() });
    f.render_stateful_widget(list, chunks[0], &mut list_state);

    if let Some((i, result)) = expanded {
        let detail_area = chunks[1];
        f.render_widget(Clear, detail_area);
        let block = Block::default()
            .title(result.summary(i))
            .borders(Borders::ALL)
            .style(THEME.popup_border);
        let inner = block.inner(detail_area);
        let text = render_result_text(&result.text);
        let wrapped = Paragraph::new(text.clone()).wrap(Wrap { trim: false }).line_count(inner.width);
        let max_scroll = u16::try_from(wrapped.saturating_sub(inner.height as usize)).unwrap_or(u16::MAX);
        app.results.max_scroll.set(max_scroll);
        let scroll = app.results.scroll.min(max_scroll);
        let para = Paragraph::new(text)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0))
            .style(THEME.popup_text);
        f.render_widget(para, detail_area);
        let mut sb = ScrollbarState::default()
            .position(scroll as usize)
            .content_length(max_scroll as usize + 1);
        f.render_stateful_widget(
            Scrollbar::default().orientation(ScrollbarOrientation::VerticalRight),
            detail_area,
            &mut sb,
        );
    }
}

fn render_key_prompt(f: &mut Frame, app: &App) {
    let popup_area = centered_rect(60, 30, f.area());
    f.render_widget(Clear, popup_area);
    let masked = "*".repeat(app.key_prompt.buffer.chars().count());
    let save = if app.key_prompt.save { "[x]" } else { "[ ]" };
    let lines = vec![
        Line::from("No Gemini API key configured. Paste one to enable recommendations."),
        Line::from(""),
        Line::from(vec![Span::raw("Key: "), Span::styled(masked, THEME.selection)]),
        Line::from(""),
        Line::from(format!("{} Save to user config (Tab)", save)),
        Line::from(Span::styled("Enter confirm | Esc skip | Ctrl+D never ask again", THEME.footer)),
    ];
    let para = Paragraph::new(lines)
        .block(Block::default().title("Gemini API key").borders(Borders::ALL).style(THEME.popup_border))
        .wrap(Wrap { trim: true })
        .style(THEME.popup_text);
    f.render_widget(para, popup_area);
}
