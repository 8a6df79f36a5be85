use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum UiCommand {
    None,
    Quit,
    Up,
    Down,
    Activate,
    Back,
    PrevButton,
    NextButton,
    Poll,
}

pub(super) fn map_key(key: KeyEvent) -> UiCommand {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return UiCommand::Quit;
    }
    match key.code {
        KeyCode::Char('q') => UiCommand::Quit,
        KeyCode::Up | KeyCode::Char('k') => UiCommand::Up,
        KeyCode::Down | KeyCode::Char('j') => UiCommand::Down,
        KeyCode::Enter | KeyCode::Char(' ') => UiCommand::Activate,
        KeyCode::Esc | KeyCode::Backspace => UiCommand::Back,
        KeyCode::Left | KeyCode::BackTab => UiCommand::PrevButton,
        KeyCode::Right | KeyCode::Tab => UiCommand::NextButton,
        KeyCode::Char('r') => UiCommand::Poll,
        _ => UiCommand::None,
    }
}

#[cfg(test)]
#[path = "../tests/tui_shell/keymap_tests.rs"]
mod tests;
