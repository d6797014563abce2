// SPDX-License-Identifier: GPL-3.0-only

//! Key bindings
//!
//! | Screen          | Key                      | Action                 |
//! |-----------------|--------------------------|------------------------|
//! | any             | `Ctrl+C`, `q`            | quit                   |
//! | any             | `Esc`, `Backspace`       | back                   |
//! | scanner         | `Tab`, `→`               | next activity          |
//! | scanner         | `Shift+Tab`, `←`         | previous activity      |
//! | scanner         | `1`..`9`                 | select activity        |
//! | embedded view   | `o`                      | open in system browser |
//! | embedded view   | `r`                      | reload                 |
//! | embedded view   | `↑` `↓` `PgUp` `PgDn`    | scroll                 |

use crate::app::{AppModel, Message, Screen};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Lines scrolled by one page key
const PAGE_STEP: i32 = 10;

/// What a key press asks for
#[derive(Debug, Clone)]
pub enum Action {
    /// Leave immediately
    Quit,
    /// Feed a message to the model
    App(Message),
    /// Scroll the page view by this many lines
    Scroll(i32),
}

/// Map a key press on the current screen to an action
pub fn map_key(model: &AppModel, key: KeyEvent) -> Option<Action> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Action::Quit);
    }

    match key.code {
        KeyCode::Esc | KeyCode::Backspace => return Some(Action::App(Message::Back)),
        KeyCode::Char('q') => return Some(Action::Quit),
        _ => {}
    }

    match model.screen() {
        Screen::Scanner => scanner_key(model, key),
        Screen::EmbeddedView => embedded_key(key),
        Screen::RequestingPermission | Screen::NoCameraAccess => None,
    }
}

fn scanner_key(model: &AppModel, key: KeyEvent) -> Option<Action> {
    let message = match key.code {
        KeyCode::Tab | KeyCode::Right => Message::SelectNextActivity,
        KeyCode::BackTab | KeyCode::Left => Message::SelectPreviousActivity,
        KeyCode::Char(c @ '1'..='9') => {
            let position = c.to_digit(10)? as usize - 1;
            Message::SelectActivity(model.config().activity_index(position)?)
        }
        _ => return None,
    };
    Some(Action::App(message))
}

fn embedded_key(key: KeyEvent) -> Option<Action> {
    let action = match key.code {
        KeyCode::Char('o') => Action::App(Message::OpenPageExternally),
        KeyCode::Char('r') => Action::App(Message::ReloadPage),
        KeyCode::Up => Action::Scroll(-1),
        KeyCode::Down => Action::Scroll(1),
        KeyCode::PageUp => Action::Scroll(-PAGE_STEP),
        KeyCode::PageDown | KeyCode::Char(' ') => Action::Scroll(PAGE_STEP),
        _ => return None,
    };
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use std::time::Instant;

    const CONFIG: &str = r#"{"t":"_bc2w-conf","a":[
        {"n":"A","u":"https://a.example/"},
        {"n":"B","u":"https://b.example/"}
    ]}"#;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn scanner_model() -> AppModel {
        let config = Configuration::from_json(CONFIG).expect("valid json");
        let mut model = AppModel::with_configuration(Some(config));
        model.update(Message::PermissionResolved { granted: true });
        model
    }

    #[test]
    fn test_ctrl_c_always_quits() {
        let model = AppModel::default();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(matches!(map_key(&model, ctrl_c), Some(Action::Quit)));
    }

    #[test]
    fn test_digits_select_existing_activities_only() {
        let model = scanner_model();
        match map_key(&model, key(KeyCode::Char('2'))) {
            Some(Action::App(Message::SelectActivity(index))) => assert_eq!(index.get(), 1),
            other => panic!("Expected SelectActivity, got {:?}", other),
        }
        assert!(map_key(&model, key(KeyCode::Char('3'))).is_none());
    }

    #[test]
    fn test_tab_cycles_activities() {
        let model = scanner_model();
        assert!(matches!(
            map_key(&model, key(KeyCode::Tab)),
            Some(Action::App(Message::SelectNextActivity))
        ));
        assert!(matches!(
            map_key(&model, key(KeyCode::BackTab)),
            Some(Action::App(Message::SelectPreviousActivity))
        ));
    }

    #[test]
    fn test_page_keys_only_in_embedded_view() {
        let mut model = scanner_model();
        assert!(map_key(&model, key(KeyCode::Char('o'))).is_none());

        model.update(Message::Scanned {
            data: "x".to_string(),
            at: Instant::now(),
        });
        assert_eq!(model.screen(), Screen::EmbeddedView);
        assert!(matches!(
            map_key(&model, key(KeyCode::Char('o'))),
            Some(Action::App(Message::OpenPageExternally))
        ));
        assert!(matches!(
            map_key(&model, key(KeyCode::PageDown)),
            Some(Action::Scroll(PAGE_STEP))
        ));
        assert!(matches!(
            map_key(&model, key(KeyCode::Esc)),
            Some(Action::App(Message::Back))
        ));
    }
}
