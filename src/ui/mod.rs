use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use regex::Regex;
use time::{macros::format_description, OffsetDateTime};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::render::{
    CardView, FavoritesView, GridView, PaginationView, Screen, CATALOG_FAILED_MESSAGE,
    DELETE_NOTE_LABEL, NO_FAVORITES_PLACEHOLDER,
};
use crate::app::{Focus, StatusMessage, GRID_COLUMNS, PAGE_SIZE};
use crate::highlight::match_ranges;

pub mod prompt;

pub use prompt::TerminalPrompt;

/// Everything one frame needs: the cached region descriptions plus UI-only state.
pub struct Chrome<'a> {
    pub screen: &'a Screen,
    pub focus: Focus,
    pub drawer_open: bool,
    pub card_cursor: usize,
    pub favorite_cursor: usize,
    pub search_input: &'a str,
    pub search_pending: bool,
    pub highlight: Option<&'a Regex>,
    pub status: Option<&'a StatusMessage>,
}

pub fn draw_app(frame: &mut Frame, chrome: &Chrome) {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.size());

    draw_search_bar(frame, chrome, vertical[0]);

    let body = if chrome.drawer_open && chrome.screen.favorites.is_some() {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(vertical[1]);
        if let Some(favorites) = &chrome.screen.favorites {
            draw_favorites(frame, chrome, favorites, columns[1]);
        }
        columns[0]
    } else {
        vertical[1]
    };

    draw_grid(frame, chrome, body);
    if let Some(pagination) = &chrome.screen.pagination {
        draw_pagination(frame, pagination, vertical[2]);
    }
    frame.render_widget(Paragraph::new(build_status_line(chrome)), vertical[3]);
}

fn draw_search_bar(frame: &mut Frame, chrome: &Chrome, area: Rect) {
    let active = chrome.focus == Focus::Search;
    let border_style = if active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let mut spans = vec![Span::styled("/ ", Style::default().fg(Color::Gray))];
    if chrome.search_input.is_empty() && !active {
        spans.push(Span::styled(
            "Search clubs by name",
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        spans.push(Span::styled(
            chrome.search_input.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    }
    if active {
        spans.push(Span::styled("▌", Style::default().fg(Color::Cyan)));
    }
    if chrome.search_pending {
        spans.push(Span::styled(" …", Style::default().fg(Color::DarkGray)));
    }
    let search = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title("Search")
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    frame.render_widget(search, area);
}

fn draw_grid(frame: &mut Frame, chrome: &Chrome, area: Rect) {
    let cards = match &chrome.screen.grid {
        GridView::Loading => {
            let loading = Paragraph::new("Loading clubs…")
                .style(Style::default().fg(Color::Gray))
                .block(Block::default().title("Clubs").borders(Borders::ALL));
            frame.render_widget(loading, area);
            return;
        }
        GridView::Failed { reason } => {
            let failed = Paragraph::new(vec![
                Line::from(Span::styled(
                    CATALOG_FAILED_MESSAGE,
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(reason.clone(), Style::default().fg(Color::Red))),
            ])
            .wrap(Wrap { trim: false })
            .block(Block::default().title("Clubs").borders(Borders::ALL));
            frame.render_widget(failed, area);
            return;
        }
        GridView::Cards(cards) => cards,
    };

    if cards.is_empty() {
        let empty = Paragraph::new("No clubs match your search.")
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().title("Clubs").borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    }

    let rows = PAGE_SIZE.div_ceil(GRID_COLUMNS);
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, rows as u32); rows])
        .split(area);
    for (row_idx, row_area) in row_areas.iter().enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, GRID_COLUMNS as u32); GRID_COLUMNS])
            .split(*row_area);
        for (col_idx, cell) in cells.iter().enumerate() {
            let idx = row_idx * GRID_COLUMNS + col_idx;
            if let Some(card) = cards.get(idx) {
                let selected = chrome.focus == Focus::Grid && idx == chrome.card_cursor;
                draw_card(frame, card, selected, chrome.highlight, *cell);
            }
        }
    }
}

fn draw_card(
    frame: &mut Frame,
    card: &CardView,
    selected: bool,
    highlight: Option<&Regex>,
    area: Rect,
) {
    let inner_width = area.width.saturating_sub(2) as usize;
    let mut lines = Vec::new();
    lines.push(Line::from(Span::styled(
        truncate_to_width(&card.image, inner_width),
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(card.description.clone()));
    if let Some(note) = &card.note {
        lines.push(Line::from(Span::styled(
            format!("✎ {note}"),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
        )));
    }
    lines.push(Line::from(""));

    let favorite_style = if card.favorite {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let mut buttons = vec![
        Span::styled(format!("[{}]", card.favorite_label()), favorite_style),
        Span::raw(" "),
        Span::styled(
            format!("[{}]", card.note_label()),
            Style::default().fg(Color::Yellow),
        ),
    ];
    if card.shows_delete_note() {
        buttons.push(Span::raw(" "));
        buttons.push(Span::styled(
            format!("[{DELETE_NOTE_LABEL}]"),
            Style::default().fg(Color::Magenta),
        ));
    }
    lines.push(Line::from(buttons));

    let border_style = if selected {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let title = Line::from(highlight_spans(
        &card.name,
        highlight,
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    let paragraph = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border_style),
        );
    frame.render_widget(paragraph, area);
}

fn draw_pagination(frame: &mut Frame, pagination: &PaginationView, area: Rect) {
    let enabled = Style::default().add_modifier(Modifier::BOLD);
    let disabled = Style::default().fg(Color::DarkGray);
    let mut spans = vec![Span::styled(
        "◀ Prev",
        if pagination.prev_enabled { enabled } else { disabled },
    )];
    for button in &pagination.pages {
        spans.push(Span::raw(" "));
        let style = if button.active {
            Style::default()
                .bg(Color::Blue)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        spans.push(Span::styled(format!(" {} ", button.number), style));
    }
    spans.push(Span::raw(" "));
    spans.push(Span::styled(
        "Next ▶",
        if pagination.next_enabled { enabled } else { disabled },
    ));
    let noun = if pagination.filtered_count == 1 { "club" } else { "clubs" };
    spans.push(Span::styled(
        format!("   {} {noun}", pagination.filtered_count),
        Style::default().fg(Color::Gray),
    ));
    let bar = Paragraph::new(Line::from(spans))
        .block(Block::default().title("Pages").borders(Borders::ALL));
    frame.render_widget(bar, area);
}

fn draw_favorites(frame: &mut Frame, chrome: &Chrome, favorites: &FavoritesView, area: Rect) {
    let focused = chrome.focus == Focus::Favorites;
    let block = Block::default()
        .title("Favorites")
        .borders(Borders::ALL)
        .border_style(if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        });

    let entries = match favorites {
        FavoritesView::Placeholder => {
            let placeholder = Paragraph::new(NO_FAVORITES_PLACEHOLDER)
                .style(Style::default().fg(Color::Gray))
                .block(block);
            frame.render_widget(placeholder, area);
            return;
        }
        FavoritesView::Entries(entries) => entries,
    };

    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = entries
        .iter()
        .map(|entry| {
            let mut lines = vec![
                Line::from(Span::styled(
                    truncate_to_width(&entry.name, width),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    truncate_to_width(&entry.image, width),
                    Style::default().fg(Color::DarkGray),
                )),
            ];
            if let Some(note) = &entry.note {
                lines.push(Line::from(Span::styled(
                    truncate_to_width(&format!("✎ {note}"), width),
                    Style::default().fg(Color::Cyan),
                )));
            }
            lines.push(Line::from(Span::styled(
                "[e] Edit Note  [d] Remove",
                Style::default().fg(Color::Gray),
            )));
            ListItem::new(lines)
        })
        .collect();

    let mut state = ListState::default();
    if focused {
        state.select(Some(chrome.favorite_cursor));
    }
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::Black))
        .highlight_symbol("▸ ");
    frame.render_stateful_widget(list, area, &mut state);
}

fn build_status_line(chrome: &Chrome) -> Text<'static> {
    let mut spans = Vec::new();
    if let Some(status) = chrome.status {
        spans.push(Span::styled(
            format_time_short(status.at),
            Style::default().fg(Color::Gray),
        ));
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            status.text.clone(),
            Style::default().fg(Color::Cyan),
        ));
    }

    let keys = match chrome.focus {
        Focus::Grid => concat!(
            "h/j/k/l move • [/] page • digits go to page • f favorite • n note • ",
            "x delete note • / search • Tab favorites • q quit"
        ),
        Focus::Search => "type to filter • Enter search now • Ctrl-u clear • Esc back",
        Focus::Favorites => "j/k move • e edit note • d remove • Esc close",
    };
    Text::from(vec![
        Line::from(spans),
        Line::from(vec![
            Span::styled(
                "Keys: ",
                Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
            ),
            Span::styled(keys, Style::default().fg(Color::DarkGray)),
        ]),
    ])
}

fn format_time_short(dt: OffsetDateTime) -> String {
    dt.format(&format_description!("[hour]:[minute]:[second]"))
        .unwrap_or_else(|_| dt.unix_timestamp().to_string())
}

fn highlight_spans(
    text: &str,
    regex: Option<&Regex>,
    highlight_style: Style,
    base_style: Style,
) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut last = 0;
    for (start, end) in match_ranges(text, regex) {
        if start > last {
            spans.push(Span::styled(text[last..start].to_string(), base_style));
        }
        spans.push(Span::styled(text[start..end].to_string(), highlight_style));
        last = end;
    }
    if last < text.len() {
        spans.push(Span::styled(text[last..].to_string(), base_style));
    }
    spans
}

/// Cuts `text` to at most `max` terminal columns, marking the cut with `…`.
pub fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(vertical[1])[1]
}
