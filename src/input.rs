use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// A keystroke the session engine scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keystroke {
    Char(char),
    Backspace,
}

impl From<char> for Keystroke {
    /// `'\u{8}'` and DEL map to backspace, everything else is printable.
    fn from(c: char) -> Self {
        match c {
            '\u{8}' | '\u{7f}' => Keystroke::Backspace,
            c => Keystroke::Char(c),
        }
    }
}

/// Everything the host reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(Keystroke),
    /// abandon the attempt and start a fresh one
    Restart,
    /// switch to the next mode and restart
    NextMode,
    /// switch to the next colour theme
    NextTheme,
    /// switch the on-screen keyboard layout
    NextLayout,
    Quit,
}

impl InputEvent {
    pub fn from_key_event(key: KeyEvent) -> Option<Self> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(InputEvent::Quit)
            }
            KeyCode::Esc => Some(InputEvent::Quit),
            KeyCode::Tab => Some(InputEvent::Restart),
            KeyCode::BackTab => Some(InputEvent::NextMode),
            KeyCode::F(2) => Some(InputEvent::NextTheme),
            KeyCode::F(3) => Some(InputEvent::NextLayout),
            KeyCode::Backspace => Some(InputEvent::Key(Keystroke::Backspace)),
            // editor shortcuts such as Ctrl+W or Alt+B are not text
            KeyCode::Char(_) if is_shortcut(key.modifiers) => None,
            KeyCode::Char(c) if c.is_control() => None,
            KeyCode::Char(c) => Some(InputEvent::Key(Keystroke::Char(c))),
            _ => None,
        }
    }
}

/// Control or Alt alone. Both together is how AltGr arrives on some
/// platforms, and AltGr produces ordinary characters.
fn is_shortcut(modifiers: KeyModifiers) -> bool {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    let alt = modifiers.contains(KeyModifiers::ALT);
    ctrl != alt
}
