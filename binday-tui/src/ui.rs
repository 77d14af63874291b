use binday_core::{
    events,
    model::{BinKind, Countdown, Freshness, Resolution, Severity},
};
use chrono::{DateTime, FixedOffset};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
};

use crate::app::{App, Screen};

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    // Title / header
    let header = Paragraph::new(format!(
        "Bin Day Brain - {}",
        app.service.municipality().name
    ))
    .block(Block::default().borders(Borders::ALL).title("binday"));
    frame.render_widget(header, *header_area);

    // Main screen
    match app.screen {
        Screen::Setup => draw_setup(frame, app, *content_area),
        Screen::Dashboard => draw_dashboard(frame, app, *content_area),
        Screen::WhichBin => draw_which_bin(frame, app, *content_area),
    }

    // Status bar
    let nav_hint = match app.screen {
        Screen::Setup => "Type to filter · ↑/↓ move · Enter select · Esc back · Ctrl-C quit",
        Screen::Dashboard => "r refresh · e export calendar · w which bin · c change address · q quit",
        Screen::WhichBin => "Type an item · Enter search · ↑/↓ move · Esc back · Ctrl-C quit",
    };

    let status_text = if app.is_loading {
        format!("Loading… · {nav_hint}")
    } else if let Some(msg) = &app.error_message {
        format!("{msg} · {nav_hint}")
    } else if let Some(msg) = &app.notice {
        format!("{msg} · {nav_hint}")
    } else if app.screen == Screen::Dashboard
        && let Some(freshness) = freshness_text(app.resolution.as_ref())
    {
        format!("{freshness} · {nav_hint}")
    } else {
        nav_hint.to_owned()
    };

    let status_style = if app.error_message.is_some() {
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

    frame.render_widget(status, *status_area);
}

fn freshness_text(resolution: Option<&Resolution>) -> Option<String> {
    let resolution = resolution?;
    let at = resolution.cached_at?.format("%d %b %H:%M");
    match resolution.freshness {
        Freshness::Fresh => Some(format!("Updated {at}")),
        Freshness::Cached => Some(format!("Cached schedule from {at}")),
        Freshness::Unavailable => None,
    }
}

fn draw_setup(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // filter
            Constraint::Min(0),    // choices
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [input_area, list_area] = chunks else {
        return;
    };

    let trail = [app.locality.as_ref(), app.street.as_ref()]
        .into_iter()
        .flatten()
        .map(|choice| choice.name.as_str())
        .collect::<Vec<_>>()
        .join(" › ");
    let title = if trail.is_empty() {
        format!("{} (type to filter)", app.setup_step.title())
    } else {
        format!("{trail} › {} (type to filter)", app.setup_step.title())
    };

    let input = Paragraph::new(app.filter.as_str())
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: true });
    frame.render_widget(input, *input_area);

    let visible = app.visible_choices();
    let items = if visible.is_empty() && !app.is_loading {
        vec![ListItem::new("Nothing matches. Backspace to widen the filter.")]
    } else {
        visible
            .iter()
            .map(|choice| ListItem::new(choice.name.clone()))
            .collect()
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Choose {} (↑/↓, Enter)", app.setup_step.title())),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if !visible.is_empty() {
        state.select(Some(app.list_index));
    }
    frame.render_stateful_widget(list, *list_area, &mut state);
}

fn draw_dashboard(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // bin cards
            Constraint::Length(4), // weather
            Constraint::Length(3), // events
            Constraint::Min(0),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [cards_area, weather_area, event_area, _rest] = chunks else {
        return;
    };

    let now = app.service.now();
    draw_bin_cards(frame, app.resolution.as_ref(), now, *cards_area);

    let weather = if app.advisories.is_empty() {
        Paragraph::new("No weather concerns for the next collection.")
    } else {
        let lines = app
            .advisories
            .iter()
            .map(|advisory| {
                let color = match advisory.severity {
                    Severity::Warning => Color::Red,
                    Severity::Info => Color::Yellow,
                };
                Line::styled(advisory.message.clone(), Style::default().fg(color))
            })
            .collect::<Vec<_>>();
        Paragraph::new(lines)
    };
    frame.render_widget(
        weather
            .block(Block::default().borders(Borders::ALL).title("Weather"))
            .wrap(Wrap { trim: true }),
        *weather_area,
    );

    let today = now.date_naive();
    let event_text = match &app.event {
        Some(event) => match event.start_date {
            Some(start) => format!("{}: {}", events::relative_label(start, today), event.title),
            None => event.title.clone(),
        },
        None => "No council events in the next month.".to_owned(),
    };
    let event = Paragraph::new(event_text)
        .block(Block::default().borders(Borders::ALL).title("Upcoming event"))
        .wrap(Wrap { trim: true });
    frame.render_widget(event, *event_area);
}

fn draw_bin_cards(
    frame: &mut Frame<'_>,
    resolution: Option<&Resolution>,
    now: DateTime<FixedOffset>,
    area: Rect,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let stale = resolution.is_none_or(|resolution| resolution.freshness != Freshness::Fresh);

    for (kind, card_area) in BinKind::ALL.into_iter().zip(columns.iter()) {
        let next = resolution.and_then(|resolution| resolution.schedule.get(kind));
        let countdown = Countdown::until(next, now);
        let date = next.map_or_else(
            || "-".to_owned(),
            |next| next.date.format("%a %d %b").to_string(),
        );

        let mut countdown_style = Style::default().add_modifier(Modifier::BOLD);
        if countdown == Countdown::Today {
            countdown_style = countdown_style.fg(Color::Red);
        }

        let mut title = kind.title().to_owned();
        if stale && next.is_some() {
            title.push_str(" (cached)");
        }

        let card = Paragraph::new(vec![
            Line::from(Span::styled(countdown.to_string(), countdown_style)),
            Line::from(date),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(bin_color(kind)))
                .title(title),
        )
        .alignment(Alignment::Center);
        frame.render_widget(card, *card_area);
    }
}

fn draw_which_bin(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // query
            Constraint::Min(0),    // results
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [input_area, results_area] = chunks else {
        return;
    };

    let input = Paragraph::new(app.query.as_str())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Which bin does it go in? (Enter to search)"),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(input, *input_area);

    if app.materials.is_empty() {
        let paragraph = Paragraph::new("No results yet. Try \"pizza box\" or \"batteries\".")
            .block(Block::default().borders(Borders::ALL).title("A-Z guide"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, *results_area);
        return;
    }

    let rows = app.materials.iter().enumerate().map(|(idx, material)| {
        let mut style = Style::default();
        if idx == app.material_index {
            style = style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
        }
        Row::new(vec![
            Cell::from(material.title.clone()),
            Cell::from(material.bin.display_name().to_owned()),
            Cell::from(material.keywords.clone().unwrap_or_default()),
        ])
        .style(style)
    });

    let column_widths = [
        Constraint::Length(28),
        Constraint::Length(28),
        Constraint::Min(20),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec!["Item", "Bin", "Also known as"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("A-Z guide ({} matches)", app.materials.len())),
        )
        .column_spacing(1);

    frame.render_widget(table, *results_area);
}

fn bin_color(kind: BinKind) -> Color {
    match kind {
        BinKind::Organic => Color::Green,
        BinKind::Recycling => Color::Yellow,
        BinKind::Landfill => Color::Red,
    }
}
