//! Light and dark palettes with terminal background detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::HealthStatus;

/// Color and style theme for the TUI.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent for the trend sparkline, help border and status messages.
    pub highlight: Color,
    /// Depth at or above the warning threshold.
    pub warning: Color,
    /// Depth at or above the critical threshold.
    pub critical: Color,
    pub healthy: Color,
    pub border: Color,
    pub header: Style,
    pub selected: Style,
    pub tab_active: Style,
    pub tab_inactive: Style,
    pub border_type: BorderType,
}

impl Theme {
    pub fn dark() -> Self {
        Self::with_accent(Color::Cyan, Color::Gray, Color::DarkGray)
    }

    pub fn light() -> Self {
        Self::with_accent(Color::Blue, Color::DarkGray, Color::LightBlue)
    }

    fn with_accent(accent: Color, muted: Color, selection: Color) -> Self {
        Self {
            highlight: accent,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: muted,
            header: Style::default().fg(accent).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(selection).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(accent).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(muted),
            border_type: BorderType::Rounded,
        }
    }

    /// Pick light or dark from the terminal's background luminance.
    ///
    /// Falls back to dark when the terminal does not answer.
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Style for a backlog severity; critical is also bold.
    pub fn status_style(&self, status: HealthStatus) -> Style {
        match status {
            HealthStatus::Healthy => Style::default().fg(self.healthy),
            HealthStatus::Warning => Style::default().fg(self.warning),
            HealthStatus::Critical => {
                Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
            }
        }
    }
}
