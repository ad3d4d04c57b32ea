//! Application state and navigation logic.

use std::cell::Cell;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::data::{ChannelMetric, ClusterData, NodeSummary, Thresholds};
use crate::source::DataSource;
use crate::ui::channels::{self, ChannelSortColumn};
use crate::ui::nodes::{self, NodeSortColumn};
use crate::ui::Theme;

/// How long a status message stays in the status bar.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Aggregated channels across the cluster.
    Channels,
    /// Discovered data nodes and their per-node totals.
    Nodes,
}

impl View {
    pub fn next(self) -> Self {
        match self {
            View::Channels => View::Nodes,
            View::Nodes => View::Channels,
        }
    }

    pub fn prev(self) -> Self {
        // two views, so both directions land on the other one
        self.next()
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Channels => "Channels",
            View::Nodes => "Nodes",
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    // Data source
    source: Box<dyn DataSource>,
    pub data: Option<ClusterData>,
    pub load_error: Option<String>,
    pub thresholds: Thresholds,

    // Navigation state (visual row in the filtered, sorted list)
    pub selected_channel_index: usize,
    pub selected_node_index: usize,

    // First visible row of each table, written back by the renderer
    channel_scroll: Cell<usize>,
    node_scroll: Cell<usize>,

    // Sorting (Channels view)
    pub channel_sort_column: ChannelSortColumn,
    pub channel_sort_ascending: bool,

    // Sorting (Nodes view)
    pub node_sort_column: NodeSortColumn,
    pub node_sort_ascending: bool,

    // Search/filter
    pub filter_text: String,
    pub filter_active: bool,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App, detecting the theme from the terminal background.
    pub fn new(source: Box<dyn DataSource>, thresholds: Thresholds) -> Self {
        Self::with_theme(source, thresholds, Theme::auto_detect())
    }

    pub fn with_theme(source: Box<dyn DataSource>, thresholds: Thresholds, theme: Theme) -> Self {
        Self {
            running: true,
            current_view: View::Channels,
            show_help: false,
            source,
            data: None,
            load_error: None,
            thresholds,
            selected_channel_index: 0,
            selected_node_index: 0,
            channel_scroll: Cell::new(0),
            node_scroll: Cell::new(0),
            channel_sort_column: ChannelSortColumn::default(),
            channel_sort_ascending: false, // deepest backlog first
            node_sort_column: NodeSortColumn::default(),
            node_sort_ascending: true,
            filter_text: String::new(),
            filter_active: false,
            theme,
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < STATUS_MESSAGE_TTL => Some(msg),
            _ => None,
        }
    }

    /// Poll the data source for a newly completed cycle.
    ///
    /// Returns true if new data was received.
    pub fn reload_data(&mut self) -> bool {
        if let Some(data) = self.source.poll() {
            self.data = Some(data);
            self.load_error = None;
            self.clamp_selection();
            return true;
        }

        if let Some(err) = self.source.error() {
            self.load_error = Some(err.to_string());
        }
        false
    }

    fn clamp_selection(&mut self) {
        let channels = self.visible_channels().len();
        let nodes = self.visible_nodes().len();
        self.selected_channel_index = self.selected_channel_index.min(channels.saturating_sub(1));
        self.selected_node_index = self.selected_node_index.min(nodes.saturating_sub(1));
    }

    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Channels after filtering and sorting, in display order.
    pub fn visible_channels(&self) -> Vec<&ChannelMetric> {
        let Some(ref data) = self.data else {
            return Vec::new();
        };
        let mut visible: Vec<&ChannelMetric> = data
            .channels
            .iter()
            .filter(|m| self.matches_filter(&m.key().to_string()))
            .collect();
        channels::sort_channels_by(&mut visible, self.channel_sort_column, self.channel_sort_ascending);
        visible
    }

    /// Nodes after filtering and sorting, in display order.
    pub fn visible_nodes(&self) -> Vec<&NodeSummary> {
        let Some(ref data) = self.data else {
            return Vec::new();
        };
        let mut visible: Vec<&NodeSummary> = data
            .nodes
            .iter()
            .filter(|n| self.matches_filter(&n.node.to_string()))
            .collect();
        nodes::sort_nodes_by(&mut visible, self.node_sort_column, self.node_sort_ascending);
        visible
    }

    fn visible_count(&self) -> usize {
        match self.current_view {
            View::Channels => self.visible_channels().len(),
            View::Nodes => self.visible_nodes().len(),
        }
    }

    fn selection_mut(&mut self) -> &mut usize {
        match self.current_view {
            View::Channels => &mut self.selected_channel_index,
            View::Nodes => &mut self.selected_node_index,
        }
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.visible_count().saturating_sub(1);
        let selected = self.selection_mut();
        *selected = (*selected + n).min(max);
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        let selected = self.selection_mut();
        *selected = selected.saturating_sub(n);
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        *self.selection_mut() = 0;
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        let last = self.visible_count().saturating_sub(1);
        *self.selection_mut() = last;
    }

    /// Select a visual row if it exists (mouse clicks).
    pub fn select_row(&mut self, row: usize) {
        if row < self.visible_count() {
            *self.selection_mut() = row;
        }
    }

    /// Select the item shown on the given row of the table body, counting
    /// from the first row currently scrolled into view.
    pub fn select_visible_row(&mut self, row: usize) {
        let first = self.scroll_offset(self.current_view);
        self.select_row(first.saturating_add(row));
    }

    /// Index of the first row the table for `view` last rendered.
    pub fn scroll_offset(&self, view: View) -> usize {
        match view {
            View::Channels => self.channel_scroll.get(),
            View::Nodes => self.node_scroll.get(),
        }
    }

    pub fn set_scroll_offset(&self, view: View, offset: usize) {
        match view {
            View::Channels => self.channel_scroll.set(offset),
            View::Nodes => self.node_scroll.set(offset),
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Cycle to the next sort column for the current view.
    pub fn cycle_sort(&mut self) {
        match self.current_view {
            View::Channels => self.channel_sort_column = self.channel_sort_column.next(),
            View::Nodes => self.node_sort_column = self.node_sort_column.next(),
        }
    }

    /// Toggle sort direction between ascending and descending.
    pub fn toggle_sort_direction(&mut self) {
        match self.current_view {
            View::Channels => self.channel_sort_ascending = !self.channel_sort_ascending,
            View::Nodes => self.node_sort_ascending = !self.node_sort_ascending,
        }
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Clear the filter text and exit filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
    }

    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
        self.clamp_selection();
    }

    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
    }

    /// Case-insensitive substring match against the current filter.
    pub fn matches_filter(&self, name: &str) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        name.to_lowercase().contains(&self.filter_text.to_lowercase())
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the displayed cycle to a JSON file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let Some(ref data) = self.data else {
            anyhow::bail!("No data to export");
        };
        write_export(data, path)
    }
}

/// Write a cycle as pretty-printed JSON.
pub fn write_export(data: &ClusterData, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&data.to_json())?;
    std::fs::write(path, json)?;
    Ok(())
}
