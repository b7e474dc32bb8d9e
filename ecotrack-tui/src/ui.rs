use ecotrack_core::{Bin, BinStatus, BinType, CollectionRoute, RouteSource, UserRole, View, classify};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, Tabs, Wrap},
};

use crate::app::{App, Screen};

/// Width of the textual fill bar in the analytics view.
const FILL_BAR_WIDTH: usize = 30;

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

    match app.screen {
        Screen::Login => {
            let header = Paragraph::new("EcoTrack AI – smarter cities start with smarter waste")
                .block(Block::default().borders(Borders::ALL).title("EcoTrack"));
            frame.render_widget(header, *header_area);
            draw_login(frame, app, *content_area);
        }
        Screen::Main => {
            draw_tabs(frame, app, *header_area);
            match app.current_view() {
                View::Dashboard => draw_dashboard(frame, app, *content_area),
                View::Bins => draw_bins(frame, app, *content_area),
                View::Routes => draw_routes(frame, app, *content_area),
                View::Analytics => draw_analytics(frame, app, *content_area),
            }
        }
    }

    // Status bar
    let nav_hint = match (app.screen, app.current_view()) {
        (Screen::Login, _) => "↑/↓ move · Enter/Space sign in · q/Ctrl-C quit",
        (Screen::Main, _) if app.is_searching => "Type to filter · Enter/Esc done",
        (Screen::Main, View::Dashboard) => "Tab/→ next view · l sign out · q quit",
        (Screen::Main, View::Bins) => {
            "↑/↓ move · / search · e empty · p predict · Tab/→ next view · l sign out · q quit"
        }
        (Screen::Main, View::Routes) => {
            "g generate route · ↑/↓ browse history · Tab/→ next view · l sign out · q quit"
        }
        (Screen::Main, View::Analytics) => "r reset simulation · Tab/→ next view · l sign out · q quit",
    };

    let status_text = if app.is_loading {
        format!("Asking the AI… · {nav_hint}")
    } else if let Some(msg) = app.error_message.as_ref().or(app.status_message.as_ref()) {
        format!("{msg} · {nav_hint}")
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

fn draw_login(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let items = UserRole::ALL
        .iter()
        .enumerate()
        .map(|(idx, role)| {
            let prefix = if idx == app.role_list_index {
                "> "
            } else {
                "  "
            };
            ListItem::new(format!(
                "{prefix}{:<10} {}",
                role.to_string(),
                role_description(*role)
            ))
        })
        .collect::<Vec<ListItem<'_>>>();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Sign in as (↑/↓, Enter)"),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    state.select(Some(app.role_list_index));
    frame.render_stateful_widget(list, area, &mut state);
}

fn role_description(role: UserRole) -> &'static str {
    match role {
        UserRole::Admin => "Full system access and analytics",
        UserRole::Collector => "Optimized routes and bin status",
        UserRole::Citizen => "Nearby bin status overview",
    }
}

fn draw_tabs(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let user_label = app
        .service
        .user()
        .map_or_else(|| "<signed out>".to_owned(), |user| format!("{} ({})", user.name, user.role));

    let titles = app.views.iter().map(|view| view.label()).collect::<Vec<_>>();
    let tabs = Tabs::new(titles)
        .select(app.view_index)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("EcoTrack AI · {user_label}")),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn draw_dashboard(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [stats_area, alerts_area] = chunks else {
        return;
    };

    let stats = app.service.stats();
    let counters = Paragraph::new(format!(
        "Total bins: {} · Critical: {} · Warning: {} · Avg fill: {}%",
        stats.total_bins, stats.critical_bins, stats.warning_bins, stats.average_fill
    ))
    .block(Block::default().borders(Borders::ALL).title("Overview"))
    .wrap(Wrap { trim: true });
    frame.render_widget(counters, *stats_area);

    let critical: Vec<Bin> = app
        .service
        .snapshot()
        .into_iter()
        .filter(|bin| classify(bin.fill_level) == BinStatus::Critical)
        .collect();

    let items = if critical.is_empty() {
        vec![ListItem::new("No critical alerts. Good job!")]
    } else {
        critical
            .iter()
            .map(|bin| {
                ListItem::new(format!(
                    "{:>3}%  {} · {} waste · {}",
                    bin.fill_level, bin.location_name, bin.kind, bin.id
                ))
                .style(Style::default().fg(Color::Red))
            })
            .collect()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Critical alerts (≥ 80% full)"),
    );
    frame.render_widget(list, *alerts_area);
}

fn draw_bins(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // search
            Constraint::Min(0),    // table
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [search_area, table_area] = chunks else {
        return;
    };

    let search_title = if app.is_searching {
        "Search bins (typing…)"
    } else {
        "Search bins (/ to edit, Esc to clear)"
    };
    let search = Paragraph::new(app.search_input.as_str())
        .block(Block::default().borders(Borders::ALL).title(search_title));
    frame.render_widget(search, *search_area);

    let bins = app.visible_bins();
    let rows = bins.iter().enumerate().map(|(idx, bin)| {
        let status = classify(bin.fill_level);
        let mut style = Style::default();
        if idx == app.bin_list_index {
            style = style.add_modifier(Modifier::REVERSED);
        }

        Row::new(vec![
            Cell::from(bin.id.to_string()),
            Cell::from(bin.location_name.clone()),
            Cell::from(bin.kind.label()).style(Style::default().fg(type_color(bin.kind))),
            Cell::from(format!("{:>3}%", bin.fill_level)),
            Cell::from(status.to_string()).style(Style::default().fg(status_color(status))),
            Cell::from(bin.last_collected.format("%d.%m.%Y %H:%M").to_string()),
            Cell::from(
                bin.predicted_overflow
                    .as_deref()
                    .map_or_else(|| "–".to_owned(), |when| format!("Full by {when}")),
            ),
        ])
        .style(style)
    });

    let column_widths = [
        Constraint::Length(9),
        Constraint::Min(18),
        Constraint::Length(8),
        Constraint::Length(5),
        Constraint::Length(9),
        Constraint::Length(17),
        Constraint::Min(20),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec![
                "Bin ID",
                "Location",
                "Type",
                "Fill",
                "Status",
                "Last collected",
                "AI prediction",
            ])
            .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Bins ({} shown)", bins.len())),
        )
        .column_spacing(1);

    frame.render_widget(table, *table_area);
}

fn draw_routes(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [history_area, detail_area] = chunks else {
        return;
    };

    let routes = app.service.routes();
    let items = if routes.is_empty() {
        vec![ListItem::new("No routes generated yet. Press g.")]
    } else {
        routes
            .iter()
            .map(|route| {
                ListItem::new(format!(
                    "{} · {} · {} stops · {} · {}",
                    route.id,
                    route.status,
                    route.stops.len(),
                    route.total_distance,
                    route.estimated_time
                ))
            })
            .collect()
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Route history (newest first)"),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if !routes.is_empty() {
        state.select(Some(app.route_list_index));
    }
    frame.render_stateful_widget(list, *history_area, &mut state);

    draw_route_detail(frame, routes.get(app.route_list_index), *detail_area);
}

fn draw_route_detail(frame: &mut Frame<'_>, route: Option<&CollectionRoute>, area: Rect) {
    let Some(route) = route else {
        let paragraph = Paragraph::new("Bins above 50% fill are sent to the AI planner.")
            .block(Block::default().borders(Borders::ALL).title("Route"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    };

    let origin = match route.source {
        RouteSource::Ai => "AI optimized",
        RouteSource::Fallback => "default order (AI unavailable)",
    };

    let mut lines = vec![
        Line::from(format!(
            "Driver: {} · Vehicle: {}",
            route.driver_name, route.vehicle_id
        )),
        Line::from(format!("Ordering: {origin}")),
        Line::from("Depot (0, 0)"),
    ];
    lines.extend(route.stops.iter().enumerate().map(|(idx, bin)| {
        Line::from(format!(
            "{:>2}. {} – {} ({:.0}, {:.0}) · {}%",
            idx + 1,
            bin.id,
            bin.location_name,
            bin.coordinates.x,
            bin.coordinates.y,
            bin.fill_level
        ))
    }));
    lines.push(Line::from("Depot (0, 0)"));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Route {}", route.id)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn draw_analytics(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(5)])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [fill_area, types_area] = chunks else {
        return;
    };

    let lines = app
        .service
        .snapshot()
        .iter()
        .map(|bin| {
            let filled = usize::from(bin.fill_level) * FILL_BAR_WIDTH / 100;
            let bar = format!(
                "{}{}",
                "█".repeat(filled),
                "░".repeat(FILL_BAR_WIDTH.saturating_sub(filled))
            );
            Line::from(vec![
                Span::raw(format!("{:<20} ", bin.location_name)),
                Span::styled(bar, Style::default().fg(status_color(classify(bin.fill_level)))),
                Span::raw(format!(" {:>3}%", bin.fill_level)),
            ])
        })
        .collect::<Vec<_>>();

    let fill = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Real-time fill levels"),
    );
    frame.render_widget(fill, *fill_area);

    let distribution = app
        .service
        .type_distribution()
        .into_iter()
        .map(|(kind, count)| {
            Line::from(Span::styled(
                format!("{kind}: {count}"),
                Style::default().fg(type_color(kind)),
            ))
        })
        .collect::<Vec<_>>();

    let types = Paragraph::new(distribution).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Bins by type"),
    );
    frame.render_widget(types, *types_area);
}

fn status_color(status: BinStatus) -> Color {
    match status {
        BinStatus::Normal => Color::Green,
        BinStatus::Warning => Color::Yellow,
        BinStatus::Critical => Color::Red,
    }
}

fn type_color(kind: BinType) -> Color {
    match kind {
        BinType::General => Color::Gray,
        BinType::Recycle => Color::Blue,
        BinType::Organic => Color::Green,
    }
}
