use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use peron_core::model::DayTypePolicy;

use crate::app::App;

#[derive(Debug, Clone, Copy)]
pub(crate) enum Action {
    None,
    Quit,
}

/// Map a key event to state mutations. Every selection or policy change
/// takes effect on the next frame, which recomputes the departure.
pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Char, Down, Enter, Left, Right, Tab, Up};

    // Global quit shortcuts
    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }
    if key.code == Char('q') && key.modifiers.is_empty() {
        return Action::Quit;
    }

    match key.code {
        Up | Char('k') => {
            if app.station_list_index > 0 {
                app.station_list_index -= 1;
            }
        }
        Down | Char('j') => {
            if app.station_list_index + 1 < app.stations.len() {
                app.station_list_index += 1;
            }
        }
        Enter | Char(' ') => {
            app.select_current_station();
        }
        Right | Tab => {
            app.next_direction();
        }
        Left => {
            app.previous_direction();
        }
        Char('a') => {
            app.set_policy(DayTypePolicy::Auto);
        }
        Char('w') => {
            app.set_policy(DayTypePolicy::ForcedWeekday);
        }
        Char('e') => {
            app.set_policy(DayTypePolicy::ForcedWeekend);
        }
        _ => {}
    }

    Action::None
}
