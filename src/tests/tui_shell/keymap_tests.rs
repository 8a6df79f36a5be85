use super::*;

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

#[test]
fn navigation_keys() {
    assert_eq!(map_key(key(KeyCode::Up)), UiCommand::Up);
    assert_eq!(map_key(key(KeyCode::Char('k'))), UiCommand::Up);
    assert_eq!(map_key(key(KeyCode::Down)), UiCommand::Down);
    assert_eq!(map_key(key(KeyCode::Char('j'))), UiCommand::Down);
    assert_eq!(map_key(key(KeyCode::Enter)), UiCommand::Activate);
    assert_eq!(map_key(key(KeyCode::Char(' '))), UiCommand::Activate);
    assert_eq!(map_key(key(KeyCode::Esc)), UiCommand::Back);
    assert_eq!(map_key(key(KeyCode::Backspace)), UiCommand::Back);
    assert_eq!(map_key(key(KeyCode::Tab)), UiCommand::NextButton);
    assert_eq!(map_key(key(KeyCode::BackTab)), UiCommand::PrevButton);
    assert_eq!(map_key(key(KeyCode::Char('r'))), UiCommand::Poll);
    assert_eq!(map_key(key(KeyCode::Char('x'))), UiCommand::None);
}

#[test]
fn quit_keys() {
    assert_eq!(map_key(key(KeyCode::Char('q'))), UiCommand::Quit);
    assert_eq!(
        map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        UiCommand::Quit
    );
    assert_eq!(map_key(key(KeyCode::Char('c'))), UiCommand::None);
}
