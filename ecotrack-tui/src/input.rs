use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ecotrack_core::{UserRole, View};

use crate::app::{App, Screen};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    Quit,
    Login(UserRole),
    Logout,
    /// Run `service.empty_bin`(...) for the selected bin
    EmptySelectedBin,
    /// Run `service.predict_overflow`(...) for the selected bin
    PredictSelectedBin,
    /// Run `service.optimize_route`()
    OptimizeRoute,
    ResetSimulation,
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Backspace, Char, Down, Enter, Esc, Left, Right, Tab, Up};

    // Global quit shortcut
    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    // Search box swallows plain characters
    if app.is_searching {
        match key.code {
            Char(character)
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT) =>
            {
                app.search_input.push(character);
                app.bin_list_index = 0;
            }
            Backspace => {
                app.search_input.pop();
                app.bin_list_index = 0;
            }
            Enter | Esc => app.is_searching = false,
            _ => {}
        }
        return Action::None;
    }

    if key.code == Char('q') && key.modifiers.is_empty() {
        return Action::Quit;
    }

    match app.screen {
        Screen::Login => match key.code {
            Up | Char('k') => {
                app.role_list_index = app.role_list_index.saturating_sub(1);
                Action::None
            }
            Down | Char('j') => {
                if app.role_list_index + 1 < UserRole::ALL.len() {
                    app.role_list_index += 1;
                }
                Action::None
            }
            Enter | Char(' ') => Action::Login(app.selected_role()),
            _ => Action::None,
        },

        Screen::Main => match key.code {
            Tab | Right => {
                app.next_view();
                Action::None
            }
            Left => {
                app.previous_view();
                Action::None
            }
            Char('l') => Action::Logout,
            _ => handle_view_key(key.code, app),
        },
    }
}

fn handle_view_key(code: KeyCode, app: &mut App) -> Action {
    use KeyCode::{Char, Down, Esc, Up};

    match (app.current_view(), code) {
        (View::Bins, Up | Char('k')) => {
            app.bin_list_index = app.bin_list_index.saturating_sub(1);
            Action::None
        }
        (View::Bins, Down | Char('j')) => {
            app.bin_list_index += 1;
            app.clamp_selection();
            Action::None
        }
        (View::Bins, Char('/')) => {
            app.is_searching = true;
            Action::None
        }
        (View::Bins, Esc) => {
            app.search_input.clear();
            app.bin_list_index = 0;
            Action::None
        }
        (View::Bins, Char('e')) => Action::EmptySelectedBin,
        (View::Bins, Char('p')) => Action::PredictSelectedBin,

        (View::Routes, Up | Char('k')) => {
            app.route_list_index = app.route_list_index.saturating_sub(1);
            Action::None
        }
        (View::Routes, Down | Char('j')) => {
            app.route_list_index += 1;
            app.clamp_selection();
            Action::None
        }
        (View::Routes, Char('g')) => Action::OptimizeRoute,

        (View::Analytics, Char('r')) => Action::ResetSimulation,

        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::offline_app;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn enter_on_login_picks_highlighted_role() {
        let mut app = offline_app();
        assert_eq!(handle_key_event(press(KeyCode::Down), &mut app), Action::None);
        assert_eq!(
            handle_key_event(press(KeyCode::Enter), &mut app),
            Action::Login(UserRole::Collector)
        );
    }

    #[tokio::test]
    async fn search_mode_captures_q() {
        let mut app = offline_app();
        app.login(UserRole::Admin);
        handle_key_event(press(KeyCode::Tab), &mut app);
        assert_eq!(app.current_view(), View::Bins);

        handle_key_event(press(KeyCode::Char('/')), &mut app);
        assert_eq!(handle_key_event(press(KeyCode::Char('q')), &mut app), Action::None);
        assert_eq!(app.search_input, "q");

        handle_key_event(press(KeyCode::Enter), &mut app);
        assert_eq!(handle_key_event(press(KeyCode::Char('q')), &mut app), Action::Quit);
    }

    #[tokio::test]
    async fn view_actions_depend_on_view() {
        let mut app = offline_app();
        app.login(UserRole::Admin);
        // Dashboard ignores the route key
        assert_eq!(handle_key_event(press(KeyCode::Char('g')), &mut app), Action::None);

        handle_key_event(press(KeyCode::Tab), &mut app);
        handle_key_event(press(KeyCode::Tab), &mut app);
        assert_eq!(app.current_view(), View::Routes);
        assert_eq!(
            handle_key_event(press(KeyCode::Char('g')), &mut app),
            Action::OptimizeRoute
        );
    }
}
