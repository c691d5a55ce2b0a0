// File: ./src/tui/input.rs
use crate::controller::Dialog;
use crate::model::Child;
use crate::tui::action::Action;
use crate::tui::state::AppState;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Applies a key press. Dialog bookkeeping happens here; store work is
/// returned as an `Action` for the worker.
pub fn handle_key(state: &mut AppState, key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        state.should_quit = true;
        return None;
    }

    let controller = state.controller.clone();
    match controller.snapshot().dialog {
        Dialog::Remove { .. } => match key.code {
            KeyCode::Char('y') | KeyCode::Enter => Some(Action::ConfirmRemove),
            KeyCode::Char('n') | KeyCode::Esc => {
                controller.cancel_remove();
                None
            }
            _ => None,
        },
        Dialog::Reset { .. } => match key.code {
            KeyCode::Esc => {
                controller.cancel_reset();
                None
            }
            KeyCode::Enter => {
                if controller.reset_input_valid() {
                    Some(Action::ConfirmReset)
                } else {
                    state.message = "Type RESET exactly to confirm".to_string();
                    None
                }
            }
            KeyCode::Backspace => {
                controller.pop_reset_char();
                None
            }
            KeyCode::Char(c) => {
                controller.push_reset_char(c);
                None
            }
            _ => None,
        },
        Dialog::Celebration => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                controller.close_celebration();
            }
            None
        }
        Dialog::None => match key.code {
            KeyCode::Char('q') => {
                state.should_quit = true;
                None
            }
            KeyCode::Char('1') => toggle(state, Child::A),
            KeyCode::Char('2') => toggle(state, Child::B),
            KeyCode::Up | KeyCode::Char('k') => {
                state.move_cursor(-1, 0);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                state.move_cursor(1, 0);
                None
            }
            KeyCode::Left | KeyCode::Char('h') => {
                state.move_cursor(0, -1);
                None
            }
            KeyCode::Right | KeyCode::Char('l') => {
                state.move_cursor(0, 1);
                None
            }
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('d') => {
                if !controller.request_remove(state.cursor) {
                    state.message = "That slot is still empty".to_string();
                }
                None
            }
            KeyCode::Char('R') => {
                controller.open_reset();
                None
            }
            _ => None,
        },
    }
}

fn toggle(state: &mut AppState, child: Child) -> Option<Action> {
    if state.controller.is_toggle_disabled(child) {
        state.message = format!("Still saving {}'s star...", state.child_name(child));
        return None;
    }
    Some(Action::Toggle(child))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::controller::Controller;
    use crate::model::ConnectionMode;
    use crate::storage::LocalStorage;
    use crate::store::EventStore;

    fn press(state: &mut AppState, code: KeyCode) -> Option<Action> {
        handle_key(state, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn app_state(dir: &tempfile::TempDir) -> AppState {
        let store = EventStore::new(None, LocalStorage::new(dir.path().join("stars.json")));
        AppState::new(
            Controller::new(store),
            Config::default(),
            ConnectionMode::Local,
        )
    }

    #[test]
    fn number_keys_toggle_children() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = app_state(&dir);
        assert_eq!(press(&mut state, KeyCode::Char('1')), Some(Action::Toggle(Child::A)));
        assert_eq!(press(&mut state, KeyCode::Char('2')), Some(Action::Toggle(Child::B)));
        assert_eq!(press(&mut state, KeyCode::Char('3')), None);
    }

    #[test]
    fn reset_dialog_captures_typing() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = app_state(&dir);

        press(&mut state, KeyCode::Char('R'));
        assert_eq!(press(&mut state, KeyCode::Enter), None);
        for c in "RESETq".chars() {
            press(&mut state, KeyCode::Char(c));
        }
        press(&mut state, KeyCode::Backspace);
        // 'q' is text here, not quit.
        assert!(!state.should_quit);
        assert_eq!(press(&mut state, KeyCode::Enter), Some(Action::ConfirmReset));

        press(&mut state, KeyCode::Esc);
        assert_eq!(state.controller.snapshot().dialog, Dialog::None);
    }

    #[test]
    fn empty_slot_does_not_open_removal() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = app_state(&dir);
        assert_eq!(press(&mut state, KeyCode::Enter), None);
        assert_eq!(state.controller.snapshot().dialog, Dialog::None);
        assert_eq!(state.message, "That slot is still empty");
    }

    #[test]
    fn q_and_ctrl_c_quit() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = app_state(&dir);
        press(&mut state, KeyCode::Char('q'));
        assert!(state.should_quit);

        let mut state = app_state(&dir);
        handle_key(
            &mut state,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(state.should_quit);
    }
}
