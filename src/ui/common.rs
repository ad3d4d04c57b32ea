//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::history::{scale_levels, SPARKLINE_LEVELS};
use crate::data::{format_number, HealthStatus};

/// Sparkline glyphs, lowest level first.
const SPARKLINE_CHARS: [char; SPARKLINE_LEVELS] = [' ', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Above this many registries the header shows a count instead of URLs.
const MAX_LISTED_REGISTRIES: usize = 3;

/// Render the header bar with cluster totals.
///
/// Displays: worst status, clock, registries, depth, in-flight, channel count,
/// node coverage and the in-flight trend.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let clock = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let Some(ref data) = app.data else {
        let line = Line::from(vec![
            Span::styled(" NSQTOP ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("│ {} │ {} │ Waiting for first cycle...", clock, app.source_description())),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let (_, warning, critical) = data.status_counts(&app.thresholds);
    let worst = if critical > 0 {
        HealthStatus::Critical
    } else if warning > 0 {
        HealthStatus::Warning
    } else {
        HealthStatus::Healthy
    };

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let coverage_style = if data.reporting_nodes() < data.nodes.len() {
        app.theme.status_style(HealthStatus::Warning)
    } else {
        Style::default()
    };

    // whatever width is left after the text goes to the sparkline
    let mut spans = vec![
        Span::styled(" ● ", app.theme.status_style(worst)),
        Span::styled("NSQTOP ", bold),
        Span::raw(format!("│ {} │ {} │ depth ", clock, registries_label(&data.registries))),
        Span::styled(
            format_number(data.total_depth),
            app.theme.status_style(app.thresholds.status_for_depth(data.total_depth)),
        ),
        Span::raw(" │ in-flight "),
        Span::styled(format_number(data.total_in_flight), bold),
        Span::raw(format!(" │ {} channels │ nodes ", format_number(data.channels.len() as u64))),
        Span::styled(format!("{}/{}", data.reporting_nodes(), data.nodes.len()), coverage_style),
        Span::raw(" │ "),
    ];
    let used: usize = spans.iter().map(|s| s.width()).sum();
    let room = (area.width as usize).saturating_sub(used + 1);
    spans.push(Span::styled(
        render_sparkline(&data.trend, room),
        Style::default().fg(app.theme.highlight),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Registry list for the header: URLs when few, a count otherwise.
pub fn registries_label(registries: &[String]) -> String {
    if registries.len() > MAX_LISTED_REGISTRIES {
        format!("{} servers", registries.len())
    } else {
        registries
            .iter()
            .map(|r| r.trim_start_matches("http://"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Render the newest samples that fit in `width` cells, scaled against the
/// maximum of the whole window.
pub fn render_sparkline(samples: &[u64], width: usize) -> String {
    let levels = scale_levels(samples, SPARKLINE_LEVELS);
    let start = levels.len().saturating_sub(width);
    levels[start..]
        .iter()
        .map(|&level| SPARKLINE_CHARS[(level as usize).min(SPARKLINE_LEVELS - 1)])
        .collect()
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![Line::from(" 1:Channels "), Line::from(" 2:Nodes ")];

    let selected = match app.current_view {
        View::Channels => 0,
        View::Nodes => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Filter indicator for table titles.
pub fn filter_info(app: &App) -> String {
    if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    }
}

/// Scroll position for table titles.
pub fn position_info(selected: usize, len: usize) -> String {
    if len == 0 {
        String::new()
    } else {
        format!(" [{}/{}]", selected + 1, len)
    }
}

/// Render the status bar at the bottom.
///
/// A cycle error takes precedence over the regular line so a failing
/// registry is never missed; temporary messages come next.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let error = app
        .data
        .as_ref()
        .and_then(|d| d.error.as_deref())
        .or(app.load_error.as_deref());

    if let Some(err) = error {
        let updated = app
            .data
            .as_ref()
            .filter(|d| !d.channels.is_empty() || !d.nodes.is_empty())
            .map(|d| format!(" | showing data from {:.1}s ago", d.last_updated.elapsed().as_secs_f64()))
            .unwrap_or_default();
        let paragraph = Paragraph::new(format!(" Error: {}{} | q:quit", err, updated))
            .style(app.theme.status_style(HealthStatus::Critical));
        frame.render_widget(paragraph, area);
        return;
    }

    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = if let Some(ref data) = app.data {
        let controls = if app.filter_active {
            "Type to search | Enter:apply Esc:cancel"
        } else {
            "/:search s:sort S:reverse Tab:switch e:export ?:help q:quit"
        };

        format!(
            " {} | cycle {} | Updated {:.1}s ago | {}",
            app.current_view.label(),
            data.cycle,
            data.last_updated.elapsed().as_secs_f64(),
            controls,
        )
    } else {
        " Loading... | q:quit".to_string()
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(" Navigation", Style::default().add_modifier(Modifier::BOLD))]),
        Line::from("  Tab ←/→     Switch views"),
        Line::from("  1/2         Channels / Nodes"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from(""),
        Line::from(vec![Span::styled(" Tables", Style::default().add_modifier(Modifier::BOLD))]),
        Line::from("  /         Start filter/search"),
        Line::from("  c         Clear filter"),
        Line::from("  s         Cycle sort column"),
        Line::from("  S         Toggle sort direction"),
        Line::from(""),
        Line::from(vec![Span::styled(" General", Style::default().add_modifier(Modifier::BOLD))]),
        Line::from("  e         Export to JSON"),
        Line::from("  q Ctrl-C  Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 22u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
