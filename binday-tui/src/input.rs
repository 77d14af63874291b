use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Screen};

#[derive(Debug, Clone, Copy)]
pub(crate) enum Action {
    None,
    Quit,
    /// Advance the setup chain with the highlighted row
    Pick,
    /// Go one setup step up
    Back,
    /// Re-fetch the schedule unless a refresh is already running
    Refresh,
    /// Write the schedule to the calendar file
    Export,
    /// Run `service.which_bin`(...) for the typed query
    SearchMaterials,
    /// Restart setup from the suburb list
    ChangeAddress,
}

fn is_text(key: &KeyEvent) -> bool {
    !key.modifiers.contains(KeyModifiers::CONTROL) && !key.modifiers.contains(KeyModifiers::ALT)
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Backspace, Char, Down, Enter, Esc, Up};

    // Global quit shortcut
    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    let mut action = Action::None;

    match app.screen {
        Screen::Setup => match key.code {
            Up => {
                app.list_index = app.list_index.saturating_sub(1);
            }
            Down => {
                if app.list_index + 1 < app.visible_choices().len() {
                    app.list_index += 1;
                }
            }
            Char(character) if is_text(&key) => {
                app.filter.push(character);
                app.list_index = 0;
            }
            Backspace => {
                app.filter.pop();
                app.list_index = 0;
            }
            Enter => {
                action = Action::Pick;
            }
            Esc => {
                if app.filter.is_empty() {
                    action = Action::Back;
                } else {
                    app.filter.clear();
                    app.list_index = 0;
                }
            }
            _ => {}
        },

        Screen::Dashboard => match key.code {
            Char('q') => action = Action::Quit,
            Char('r') => action = Action::Refresh,
            Char('e') => action = Action::Export,
            Char('c') => action = Action::ChangeAddress,
            Char('w') => {
                app.screen = Screen::WhichBin;
                app.error_message = None;
            }
            _ => {}
        },

        Screen::WhichBin => match key.code {
            Up => {
                app.material_index = app.material_index.saturating_sub(1);
            }
            Down => {
                if app.material_index + 1 < app.materials.len() {
                    app.material_index += 1;
                }
            }
            Char(character) if is_text(&key) => {
                app.query.push(character);
            }
            Backspace => {
                app.query.pop();
            }
            Enter => {
                action = Action::SearchMaterials;
            }
            Esc => {
                app.screen = Screen::Dashboard;
            }
            _ => {}
        },
    }
    action
}
