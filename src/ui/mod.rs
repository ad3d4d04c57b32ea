//! Terminal UI rendering using ratatui.
//!
//! Each view lives in its own submodule with a `render` function.
//!
//! ## Submodules
//!
//! - [`channels`]: cluster-wide channel table with depth, rates and health
//! - [`nodes`]: per-node totals, including nodes that did not report
//! - [`common`]: header, tabs, status bar and help overlay
//! - [`theme`]: light/dark theme support with terminal auto-detection
//!
//! ## Layout
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Tabs (common::render_tabs)           │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ View Content                         │
//! │ (channels/nodes::render)             │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    common::render_help drawn on top
//! ```

pub mod channels;
pub mod common;
pub mod nodes;
pub mod theme;

pub use channels::ChannelSortColumn;
pub use nodes::NodeSortColumn;
pub use theme::Theme;
