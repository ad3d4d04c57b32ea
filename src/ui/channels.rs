//! Channels view rendering.
//!
//! Displays every topic/channel pair merged across the cluster with its
//! backlog, in-flight count, throughput and health.

use std::cmp::Ordering;

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::{App, View};
use crate::data::format::{format_rate_per_minute, format_rate_per_second};
use crate::data::{format_number, ChannelMetric};

/// Column to sort by in the Channels view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelSortColumn {
    /// Sort by combined depth.
    #[default]
    Depth,
    /// Sort by "topic/channel".
    Name,
    InFlight,
    /// Sort by messages per second; channels without a rate sort lowest.
    Rate,
    /// Sort by number of nodes hosting the channel.
    Nodes,
}

impl ChannelSortColumn {
    /// Cycle to the next sort column.
    pub fn next(self) -> Self {
        match self {
            ChannelSortColumn::Depth => ChannelSortColumn::Name,
            ChannelSortColumn::Name => ChannelSortColumn::InFlight,
            ChannelSortColumn::InFlight => ChannelSortColumn::Rate,
            ChannelSortColumn::Rate => ChannelSortColumn::Nodes,
            ChannelSortColumn::Nodes => ChannelSortColumn::Depth,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChannelSortColumn::Depth => "depth",
            ChannelSortColumn::Name => "name",
            ChannelSortColumn::InFlight => "in-flight",
            ChannelSortColumn::Rate => "rate",
            ChannelSortColumn::Nodes => "nodes",
        }
    }
}

/// Render the Channels view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let total = app.data.as_ref().map(|d| d.channels.len()).unwrap_or(0);
    let channels = app.visible_channels();

    let header = Row::new(vec![
        Cell::from(format_header("Topic/Channel", ChannelSortColumn::Name, app)),
        Cell::from(format_header("Depth", ChannelSortColumn::Depth, app)),
        Cell::from(format_header("In-Flight", ChannelSortColumn::InFlight, app)),
        Cell::from(format_header("Rate/sec", ChannelSortColumn::Rate, app)),
        Cell::from(format_header("Rate/min", ChannelSortColumn::Rate, app)),
        Cell::from(format_header("Nodes", ChannelSortColumn::Nodes, app)),
        Cell::from("Status"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = channels
        .iter()
        .map(|m| {
            let status = app.thresholds.status_for_depth(m.snapshot.depth);
            let status_style = app.theme.status_style(status);

            Row::new(vec![
                Cell::from(m.key().to_string()),
                Cell::from(format_number(m.snapshot.depth)).style(status_style),
                Cell::from(format_number(m.snapshot.in_flight)),
                Cell::from(format_rate_per_second(m.rate)),
                Cell::from(format_rate_per_minute(m.rate)),
                Cell::from(m.snapshot.node_count.to_string()),
                Cell::from(status.symbol()).style(status_style),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(3), // Topic/Channel
        Constraint::Fill(1), // Depth
        Constraint::Fill(1), // In-Flight
        Constraint::Fill(1), // Rate/sec
        Constraint::Fill(1), // Rate/min
        Constraint::Min(6),  // Nodes
        Constraint::Min(6),  // Status
    ];

    let selected = app.selected_channel_index.min(channels.len().saturating_sub(1));
    let sort_dir = if app.channel_sort_ascending { "↑" } else { "↓" };

    let title = format!(
        " Channels ({}/{}) [s:sort {}{}]{}{} ",
        channels.len(),
        total,
        app.channel_sort_column.label(),
        sort_dir,
        super::common::filter_info(app),
        super::common::position_info(selected, channels.len()),
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default().with_offset(app.scroll_offset(View::Channels));
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
    app.set_scroll_offset(View::Channels, state.offset());
}

fn format_header(name: &str, col: ChannelSortColumn, app: &App) -> Span<'static> {
    if app.channel_sort_column == col {
        let arrow = if app.channel_sort_ascending { "↑" } else { "↓" };
        Span::raw(format!("{}{}", name, arrow))
    } else {
        Span::raw(name.to_string())
    }
}

/// Sort channels by the given column and direction.
///
/// Depth ties keep their incoming order, so the default view matches the
/// order the aggregator produced.
pub fn sort_channels_by(channels: &mut [&ChannelMetric], column: ChannelSortColumn, ascending: bool) {
    channels.sort_by(|a, b| {
        let primary = match column {
            ChannelSortColumn::Depth => a.snapshot.depth.cmp(&b.snapshot.depth),
            ChannelSortColumn::Name => a.key().cmp(b.key()),
            ChannelSortColumn::InFlight => a.snapshot.in_flight.cmp(&b.snapshot.in_flight),
            ChannelSortColumn::Rate => {
                let a_rate = a.rate.map(|r| r.per_second).unwrap_or(-1.0);
                let b_rate = b.rate.map(|r| r.per_second).unwrap_or(-1.0);
                a_rate.total_cmp(&b_rate)
            }
            ChannelSortColumn::Nodes => a.snapshot.node_count.cmp(&b.snapshot.node_count),
        };

        let primary = if ascending {
            primary
        } else {
            primary.reverse()
        };

        if primary == Ordering::Equal && column != ChannelSortColumn::Depth {
            a.key().cmp(b.key())
        } else {
            primary
        }
    });
}
