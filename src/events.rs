use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, View};

/// Rows moved by PgUp/PgDn.
const PAGE_SIZE: usize = 10;

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Export file name for the `e` key, stamped with local time.
pub fn export_path() -> PathBuf {
    PathBuf::from(chrono::Local::now().format("nsqtop-%Y%m%d-%H%M%S.json").to_string())
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    if app.filter_active {
        handle_filter_input(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),

        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),

        KeyCode::Char('1') => app.set_view(View::Channels),
        KeyCode::Char('2') => app.set_view(View::Nodes),

        // up/down for rows, left/right for tabs
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),
        KeyCode::PageUp => app.select_prev_n(PAGE_SIZE),
        KeyCode::PageDown => app.select_next_n(PAGE_SIZE),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        KeyCode::Char('?') => app.toggle_help(),

        KeyCode::Char('s') => app.cycle_sort(),
        KeyCode::Char('S') => app.toggle_sort_direction(),

        KeyCode::Char('/') => app.start_filter(),
        KeyCode::Char('c') | KeyCode::Esc => {
            if !app.filter_text.is_empty() {
                app.clear_filter();
            }
        }

        KeyCode::Char('e') => {
            let path = export_path();
            match app.export_state(&path) {
                Ok(()) => app.set_status_message(format!("Exported to {}", path.display())),
                Err(e) => app.set_status_message(format!("Export failed: {}", e)),
            }
        }

        _ => {}
    }
}

/// Handle key input while filter is active
fn handle_filter_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.filter_active = false,

        // keep the text, stop capturing
        KeyCode::Esc => app.cancel_filter(),

        KeyCode::Backspace => {
            app.filter_pop();
            if app.filter_text.is_empty() {
                app.filter_active = false;
            }
        }

        KeyCode::Char(c) => app.filter_push(c),

        _ => {}
    }
}

/// Handle mouse events
///
/// `content_start_row` is the screen row of the table header.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, content_start_row: u16) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),

        MouseEventKind::Down(MouseButton::Left) => {
            let clicked_row = mouse.row;

            if clicked_row > content_start_row {
                app.select_visible_row((clicked_row - content_start_row - 1) as usize);
            }

            // Tab bar is row 1: " 1:Channels " | " 2:Nodes "
            if clicked_row == 1 {
                if mouse.column < 13 {
                    app.set_view(View::Channels);
                } else if mouse.column < 23 {
                    app.set_view(View::Nodes);
                }
            }
        }

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ChannelKey, ChannelMetric, ChannelSnapshot, ClusterData, Thresholds};
    use crate::source::ChannelSource;
    use crate::ui::Theme;

    fn app() -> App {
        app_with_channels(3)
    }

    fn app_with_channels(count: u64) -> App {
        let (tx, source) = ChannelSource::create("test");
        let mut data = ClusterData::empty(vec![]);
        data.channels = (0..count)
            .map(|i| ChannelMetric {
                snapshot: ChannelSnapshot {
                    key: ChannelKey::new("t", format!("c{}", i)),
                    depth: 100 - i,
                    in_flight: 0,
                    message_count: 0,
                    node_count: 1,
                },
                rate: None,
            })
            .collect();
        tx.send(Some(data)).unwrap();

        let mut app = App::with_theme(Box::new(source), Thresholds::default(), Theme::dark());
        app.reload_data();
        app
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_quit_keys() {
        let mut a = app();
        press(&mut a, KeyCode::Char('q'));
        assert!(!a.running);

        let mut b = app();
        handle_key_event(&mut b, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!b.running);
    }

    #[test]
    fn test_ctrl_c_quits_while_filtering() {
        let mut a = app();
        press(&mut a, KeyCode::Char('/'));
        assert!(a.filter_active);
        handle_key_event(&mut a, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!a.running);
    }

    #[test]
    fn test_filter_typing() {
        let mut a = app();
        press(&mut a, KeyCode::Char('/'));
        press(&mut a, KeyCode::Char('c'));
        press(&mut a, KeyCode::Char('1'));
        assert_eq!(a.filter_text, "c1");
        // typed keys do not trigger commands
        assert_eq!(a.current_view, View::Channels);

        press(&mut a, KeyCode::Enter);
        assert!(!a.filter_active);
        assert_eq!(a.visible_channels().len(), 1);

        press(&mut a, KeyCode::Char('c'));
        assert!(a.filter_text.is_empty());
    }

    #[test]
    fn test_navigation_keys() {
        let mut a = app();
        press(&mut a, KeyCode::End);
        assert_eq!(a.selected_channel_index, 2);
        press(&mut a, KeyCode::PageUp);
        assert_eq!(a.selected_channel_index, 0);
        press(&mut a, KeyCode::Down);
        assert_eq!(a.selected_channel_index, 1);

        press(&mut a, KeyCode::Tab);
        assert_eq!(a.current_view, View::Nodes);
        press(&mut a, KeyCode::Left);
        assert_eq!(a.current_view, View::Channels);
        press(&mut a, KeyCode::Char('2'));
        assert_eq!(a.current_view, View::Nodes);
    }

    #[test]
    fn test_help_swallows_next_key() {
        let mut a = app();
        press(&mut a, KeyCode::Char('?'));
        assert!(a.show_help);
        press(&mut a, KeyCode::Char('q'));
        assert!(!a.show_help);
        assert!(a.running);
    }

    #[test]
    fn test_mouse_click_selects_row_and_tab() {
        let mut a = app();
        let click = |row, column| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        };

        handle_mouse_event(&mut a, click(5, 4), 3);
        assert_eq!(a.selected_channel_index, 1);

        // out-of-range rows leave the selection alone
        handle_mouse_event(&mut a, click(40, 4), 3);
        assert_eq!(a.selected_channel_index, 1);

        handle_mouse_event(&mut a, click(1, 15), 3);
        assert_eq!(a.current_view, View::Nodes);
    }

    #[test]
    fn test_mouse_click_accounts_for_scroll() {
        let mut a = app_with_channels(30);
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 4,
            row: 5,
            modifiers: KeyModifiers::NONE,
        };

        // table scrolled so that item 20 is the first body row
        a.set_scroll_offset(View::Channels, 20);
        handle_mouse_event(&mut a, click, 3);
        assert_eq!(a.selected_channel_index, 21);

        // the other view keeps its own offset
        a.set_view(View::Nodes);
        assert_eq!(a.scroll_offset(View::Nodes), 0);
    }

    #[test]
    fn test_sort_keys() {
        let mut a = app();
        press(&mut a, KeyCode::Char('s'));
        assert_eq!(a.channel_sort_column, crate::ui::ChannelSortColumn::Name);
        press(&mut a, KeyCode::Char('S'));
        assert!(a.channel_sort_ascending);
    }
}
