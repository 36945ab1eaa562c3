use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Save,
    Cancel,
    NextTab,
    PrevTab,
    NextRow,
    PrevRow,
    AddItem,
    RemoveItem,
    Upload,
    Cycle(i32),
    Enter,
    Backspace,
    Insert(char),
    None,
}

pub fn classify(key: &KeyEvent) -> KeyCommand {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('s') | KeyCode::Char('S') => KeyCommand::Save,
            KeyCode::Char('c') | KeyCode::Char('C') => KeyCommand::Cancel,
            KeyCode::Char('n') | KeyCode::Char('N') => KeyCommand::AddItem,
            KeyCode::Char('d') | KeyCode::Char('D') => KeyCommand::RemoveItem,
            KeyCode::Char('u') | KeyCode::Char('U') => KeyCommand::Upload,
            KeyCode::Right => KeyCommand::NextTab,
            KeyCode::Left => KeyCommand::PrevTab,
            _ => KeyCommand::None,
        };
    }

    match key.code {
        KeyCode::Tab | KeyCode::Down => KeyCommand::NextRow,
        KeyCode::BackTab | KeyCode::Up => KeyCommand::PrevRow,
        KeyCode::Left => KeyCommand::Cycle(-1),
        KeyCode::Right => KeyCommand::Cycle(1),
        KeyCode::Esc => KeyCommand::Cancel,
        KeyCode::Enter => KeyCommand::Enter,
        KeyCode::Backspace => KeyCommand::Backspace,
        KeyCode::Char(ch) => KeyCommand::Insert(ch),
        _ => KeyCommand::None,
    }
}
