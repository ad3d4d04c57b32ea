//! Nodes view rendering.
//!
//! One row per discovered data node. Nodes that did not answer this cycle
//! stay listed with dashes so coverage gaps are visible.

use std::cmp::Ordering;

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::{App, View};
use crate::data::format::NO_DATA;
use crate::data::{format_number, HealthStatus, NodeSummary};

/// Column to sort by in the Nodes view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeSortColumn {
    /// Sort by "address:port".
    #[default]
    Address,
    Depth,
    InFlight,
    Channels,
}

impl NodeSortColumn {
    pub fn next(self) -> Self {
        match self {
            NodeSortColumn::Address => NodeSortColumn::Depth,
            NodeSortColumn::Depth => NodeSortColumn::InFlight,
            NodeSortColumn::InFlight => NodeSortColumn::Channels,
            NodeSortColumn::Channels => NodeSortColumn::Address,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NodeSortColumn::Address => "address",
            NodeSortColumn::Depth => "depth",
            NodeSortColumn::InFlight => "in-flight",
            NodeSortColumn::Channels => "channels",
        }
    }
}

/// Render the Nodes view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let total = app.data.as_ref().map(|d| d.nodes.len()).unwrap_or(0);
    let nodes = app.visible_nodes();

    let header = Row::new(vec![
        Cell::from(format_header("Node", NodeSortColumn::Address, app)),
        Cell::from("Topics"),
        Cell::from(format_header("Channels", NodeSortColumn::Channels, app)),
        Cell::from(format_header("Depth", NodeSortColumn::Depth, app)),
        Cell::from(format_header("In-Flight", NodeSortColumn::InFlight, app)),
        Cell::from("Status"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = nodes
        .iter()
        .map(|n| match n.totals {
            Some(totals) => {
                let status_style =
                    app.theme.status_style(app.thresholds.status_for_depth(totals.depth));
                Row::new(vec![
                    Cell::from(n.node.to_string()),
                    Cell::from(format_number(totals.topics as u64)),
                    Cell::from(format_number(totals.channels as u64)),
                    Cell::from(format_number(totals.depth)).style(status_style),
                    Cell::from(format_number(totals.in_flight)),
                    Cell::from("up").style(app.theme.status_style(HealthStatus::Healthy)),
                ])
            }
            None => Row::new(vec![
                Cell::from(n.node.to_string()),
                Cell::from(NO_DATA),
                Cell::from(NO_DATA),
                Cell::from(NO_DATA),
                Cell::from(NO_DATA),
                Cell::from("no data").style(app.theme.status_style(HealthStatus::Critical)),
            ])
            .style(Style::default().add_modifier(Modifier::DIM)),
        })
        .collect();

    let widths = [
        Constraint::Fill(3), // Node
        Constraint::Fill(1), // Topics
        Constraint::Fill(1), // Channels
        Constraint::Fill(1), // Depth
        Constraint::Fill(1), // In-Flight
        Constraint::Min(8),  // Status
    ];

    let selected = app.selected_node_index.min(nodes.len().saturating_sub(1));
    let sort_dir = if app.node_sort_ascending { "↑" } else { "↓" };
    let reporting = nodes.iter().filter(|n| n.is_reporting()).count();

    let title = format!(
        " Nodes ({}/{}, {} reporting) [s:sort {}{}]{}{} ",
        nodes.len(),
        total,
        reporting,
        app.node_sort_column.label(),
        sort_dir,
        super::common::filter_info(app),
        super::common::position_info(selected, nodes.len()),
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

    let mut state = TableState::default().with_offset(app.scroll_offset(View::Nodes));
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
    app.set_scroll_offset(View::Nodes, state.offset());
}

fn format_header(name: &str, col: NodeSortColumn, app: &App) -> Span<'static> {
    if app.node_sort_column == col {
        let arrow = if app.node_sort_ascending { "↑" } else { "↓" };
        Span::raw(format!("{}{}", name, arrow))
    } else {
        Span::raw(name.to_string())
    }
}

/// Sort nodes by the given column and direction.
///
/// Silent nodes compare below every reporting node on numeric columns.
pub fn sort_nodes_by(nodes: &mut [&NodeSummary], column: NodeSortColumn, ascending: bool) {
    nodes.sort_by(|a, b| {
        let primary = match column {
            NodeSortColumn::Address => by_address(a, b),
            NodeSortColumn::Depth => a.totals.map(|t| t.depth).cmp(&b.totals.map(|t| t.depth)),
            NodeSortColumn::InFlight => {
                a.totals.map(|t| t.in_flight).cmp(&b.totals.map(|t| t.in_flight))
            }
            NodeSortColumn::Channels => {
                a.totals.map(|t| t.channels).cmp(&b.totals.map(|t| t.channels))
            }
        };

        let primary = if ascending {
            primary
        } else {
            primary.reverse()
        };

        if primary == Ordering::Equal {
            by_address(a, b)
        } else {
            primary
        }
    });
}

fn by_address(a: &NodeSummary, b: &NodeSummary) -> Ordering {
    a.node.address.cmp(&b.node.address).then(a.node.port.cmp(&b.node.port))
}
