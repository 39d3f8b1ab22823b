use chrono::{DateTime, FixedOffset, Timelike};
use peron_core::{
    clock,
    model::{DayType, DayTypePolicy, Departure},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
};

use crate::app::App;

/// Human-readable direction labels, falling back to the raw key for
/// directions the UI does not know about.
fn direction_label(key: &str) -> &str {
    match key {
        "to_south" => "to Botanicheskaya",
        "to_north" => "to Prospekt Kosmonavtov",
        other => other,
    }
}

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let now = clock::now();
    let area = frame.area();

    // Outer layout: header with clock, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    draw_header(frame, app, now, *header_area);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(34), Constraint::Percentage(66)])
        .split(*content_area);

    let content = content_chunks.as_ref();
    let [picker_area, board_area] = content else {
        return;
    };

    draw_picker(frame, app, *picker_area);
    draw_board(frame, app, now, *board_area);
    draw_status(frame, app, *status_area);
}

fn draw_header(frame: &mut Frame<'_>, app: &App, now: DateTime<FixedOffset>, area: Rect) {
    let clock_line = Line::from(vec![
        Span::styled(
            now.format("%H:%M:%S").to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  Yekaterinburg time (UTC+5)"),
    ]);
    let hint_line = Line::from(day_hint(now, app.policy));

    let header = Paragraph::new(vec![clock_line, hint_line])
        .block(Block::default().borders(Borders::ALL).title("Peron"));
    frame.render_widget(header, area);
}

fn day_hint(now: DateTime<FixedOffset>, policy: DayTypePolicy) -> String {
    let day_name = now.format("%A");
    match policy {
        DayTypePolicy::ForcedWeekday => format!("{day_name}: weekday timetable forced."),
        DayTypePolicy::ForcedWeekend => format!("{day_name}: weekend timetable forced."),
        DayTypePolicy::Auto => {
            let day_type = peron_core::resolve_day_type(now, policy);
            format!("{day_name}: using the {day_type} timetable automatically.")
        }
    }
}

fn draw_picker(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let picker_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(4),
            Constraint::Length(5),
        ])
        .split(area);

    let chunks = picker_chunks.as_ref();
    let [stations_area, directions_area, policy_area] = chunks else {
        return;
    };

    draw_stations(frame, app, *stations_area);
    draw_directions(frame, app, *directions_area);
    draw_policy(frame, app, *policy_area);
}

fn draw_stations(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let items = if app.stations.is_empty() {
        vec![ListItem::new("No stations loaded.")]
    } else {
        app.stations
            .iter()
            .map(|name| {
                let marker = if Some(name.as_str()) == app.selected_station.as_deref() {
                    "● "
                } else {
                    "  "
                };
                ListItem::new(format!("{marker}{name}"))
            })
            .collect()
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Station (↑/↓, Enter)"),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if !app.stations.is_empty() {
        state.select(Some(app.station_list_index));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_directions(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let lines: Vec<Line<'_>> = if app.selected_station.is_none() {
        vec![Line::from("Select a station first.")]
    } else if app.directions.is_empty() {
        vec![Line::from("No directions for this station.")]
    } else {
        app.directions
            .iter()
            .enumerate()
            .map(|(idx, key)| {
                let active = idx == app.direction_index;
                let dot = if active { "(●) " } else { "( ) " };
                let style = if active {
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Line::styled(format!("{dot}{}", direction_label(key)), style)
            })
            .collect()
    };

    let directions = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Direction (←/→)"),
    );
    frame.render_widget(directions, area);
}

fn draw_policy(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let modes = [
        (DayTypePolicy::Auto, "a", "auto (by calendar)"),
        (DayTypePolicy::ForcedWeekday, "w", "force weekday"),
        (DayTypePolicy::ForcedWeekend, "e", "force weekend"),
    ];

    let lines: Vec<Line<'_>> = modes
        .into_iter()
        .map(|(mode, key, label)| {
            let active = app.policy == mode;
            let dot = if active { "(●)" } else { "( )" };
            let style = if active {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::styled(format!("{dot} {key}  {label}"), style)
        })
        .collect();

    let policy = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Day type"));
    frame.render_widget(policy, area);
}

fn draw_board(frame: &mut Frame<'_>, app: &App, now: DateTime<FixedOffset>, area: Rect) {
    let board_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(6),
            Constraint::Min(0),
        ])
        .split(area);

    let chunks = board_chunks.as_ref();
    let [countdown_area, meta_area, table_area] = chunks else {
        return;
    };

    let selection_complete =
        app.selected_station.is_some() && app.selected_direction().is_some();
    let next = if selection_complete {
        app.next_departure(now)
    } else {
        None
    };

    draw_countdown(frame, app, now, next, selection_complete, *countdown_area);
    draw_meta(frame, app, next, *meta_area);
    draw_timetable(frame, app, now, next, *table_area);
}

fn draw_countdown(
    frame: &mut Frame<'_>,
    app: &App,
    now: DateTime<FixedOffset>,
    next: Option<Departure>,
    selection_complete: bool,
    area: Rect,
) {
    let (display, eta) = if app.is_loading {
        ("--:--".to_owned(), "Loading schedule…".to_owned())
    } else if app.load_error.is_some() {
        ("--:--".to_owned(), "No schedule available.".to_owned())
    } else if app.timetable.is_none() || !selection_complete {
        (
            "--:--".to_owned(),
            "Select a station and direction.".to_owned(),
        )
    } else if let Some(departure) = next {
        let remaining = (departure.departure - now).num_seconds();
        (
            format_countdown_compact(remaining),
            format_countdown_long(remaining),
        )
    } else {
        (
            "--:--".to_owned(),
            "No further departures today or tomorrow.".to_owned(),
        )
    };

    let lines = vec![
        Line::styled(
            display,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Line::from(eta),
    ];

    let countdown = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Next departure"),
    );
    frame.render_widget(countdown, area);
}

fn draw_meta(frame: &mut Frame<'_>, app: &App, next: Option<Departure>, area: Rect) {
    let station = app.selected_station.as_deref().unwrap_or("—");
    let direction = app
        .selected_direction()
        .map_or("—".to_owned(), |key| direction_label(key).to_owned());

    let (departure, day_type) = match next {
        Some(info) => {
            let suffix = if info.is_tomorrow { " (tomorrow)" } else { "" };
            (
                format!("{}{suffix}", info.departure.format("%H:%M")),
                info.day_type.to_string(),
            )
        }
        None => ("—".to_owned(), "—".to_owned()),
    };

    let lines = vec![
        Line::from(format!("Station:    {station}")),
        Line::from(format!("Direction:  {direction}")),
        Line::from(format!("Departure:  {departure}")),
        Line::from(format!("Timetable:  {day_type}")),
    ];

    let meta = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Details"))
        .wrap(Wrap { trim: true });
    frame.render_widget(meta, area);
}

fn draw_timetable(
    frame: &mut Frame<'_>,
    app: &App,
    now: DateTime<FixedOffset>,
    next: Option<Departure>,
    area: Rect,
) {
    // The table always shows today's day-type, even when the resolved
    // departure already belongs to tomorrow.
    let day_type = app.displayed_day_type(now);
    let title = timetable_title(app, day_type);

    if let Some(message) = app.load_error.as_deref() {
        let paragraph = Paragraph::new(message)
            .style(Style::default().fg(Color::Red))
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let Some(table_data) = app.displayed_table(now) else {
        let message = if app.selected_station.is_none() || app.selected_direction().is_none() {
            "Select a station and direction to see the timetable."
        } else {
            "No timetable for the selected day type."
        };
        let paragraph = Paragraph::new(message)
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    };

    // Highlight only applies to today's result; tomorrow's slot is not in
    // the displayed table.
    let highlight = next.filter(|info| !info.is_tomorrow).map(|info| {
        (info.departure.hour(), info.departure.minute())
    });

    let rows = table_data.hours.iter().map(|(hour, minutes)| {
        let hour_matches = highlight.is_some_and(|(mark_hour, _)| mark_hour == u32::from(*hour));

        let spans: Vec<Span<'_>> = minutes
            .iter()
            .flat_map(|minute| {
                let matched = hour_matches
                    && highlight.is_some_and(|(_, mark_minute)| {
                        mark_minute == u32::from(*minute)
                    });
                let style = if matched {
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Gray)
                };
                [Span::styled(format!("{minute:02}"), style), Span::raw(" ")]
            })
            .collect();

        let row_style = if hour_matches
            && highlight.is_some_and(|(_, mark_minute)| {
                minutes.iter().any(|minute| u32::from(*minute) == mark_minute)
            }) {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };

        Row::new(vec![
            Cell::from(format!("{hour:02}")),
            Cell::from(Line::from(spans)),
        ])
        .style(row_style)
    });

    let column_widths = [Constraint::Length(6), Constraint::Min(20)];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec!["Hour", "Minutes"]).style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .column_spacing(1);

    frame.render_widget(table, area);
}

fn timetable_title(app: &App, day_type: DayType) -> String {
    match (app.selected_station.as_deref(), app.selected_direction()) {
        (Some(station), Some(direction)) => {
            format!(
                "Timetable: {day_type}, {station}, {}",
                direction_label(direction)
            )
        }
        _ => "Timetable".to_owned(),
    }
}

fn draw_status(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let nav_hint = "↑/↓ station · Enter select · ←/→ direction · a/w/e day type · q/Ctrl-C quit";

    let status_text = if app.is_loading {
        format!("Loading… · {nav_hint}")
    } else if let Some(msg) = &app.load_error {
        format!("{msg} · {nav_hint}")
    } else {
        nav_hint.to_owned()
    };

    let status_style = if app.load_error.is_some() {
        Style::default().fg(Color::Red)
    } else if app.is_loading {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, area);
}

/// Compact `mm:ss` countdown; clamps to `00:00` once the departure is due.
fn format_countdown_compact(total_secs: i64) -> String {
    if total_secs <= 0 {
        return "00:00".to_owned();
    }
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    format!("{minutes:02}:{seconds:02}")
}

/// Long-form countdown, hours and minutes omitted when zero.
fn format_countdown_long(total_secs: i64) -> String {
    if total_secs <= 0 {
        return "departing right now".to_owned();
    }

    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{hours} h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes} min"));
    }
    parts.push(format!("{seconds} s"));

    format!("in {}", parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::{direction_label, format_countdown_compact, format_countdown_long};

    #[test]
    fn compact_countdown_clamps_and_pads() {
        assert_eq!(format_countdown_compact(-3), "00:00");
        assert_eq!(format_countdown_compact(0), "00:00");
        assert_eq!(format_countdown_compact(65), "01:05");
        // Minutes keep counting past an hour, like a platform display.
        assert_eq!(format_countdown_compact(3 * 3600), "180:00");
    }

    #[test]
    fn long_countdown_drops_zero_parts() {
        assert_eq!(format_countdown_long(0), "departing right now");
        assert_eq!(format_countdown_long(42), "in 42 s");
        assert_eq!(format_countdown_long(62), "in 1 min 2 s");
        assert_eq!(format_countdown_long(3723), "in 1 h 2 min 3 s");
        assert_eq!(format_countdown_long(3600), "in 1 h 0 s");
    }

    #[test]
    fn unknown_direction_keys_fall_back_to_the_raw_key() {
        assert_eq!(direction_label("to_south"), "to Botanicheskaya");
        assert_eq!(direction_label("to_north"), "to Prospekt Kosmonavtov");
        assert_eq!(direction_label("to_depot"), "to_depot");
    }
}
