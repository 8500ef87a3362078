use crate::error::KeyParseError;
use std::str::FromStr;

/// Keys the engine reacts to. Text input goes through
/// [`crate::MindMapSession::update_draft`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Tab,
    Enter,
    Escape,
    Backspace,
    Delete,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arrow {
    Up,
    Down,
    Left,
    Right,
}

impl Key {
    pub fn arrow(self) -> Option<Arrow> {
        match self {
            Key::ArrowUp => Some(Arrow::Up),
            Key::ArrowDown => Some(Arrow::Down),
            Key::ArrowLeft => Some(Arrow::Left),
            Key::ArrowRight => Some(Arrow::Right),
            _ => None,
        }
    }
}

impl FromStr for Key {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tab" => Ok(Key::Tab),
            "enter" | "return" => Ok(Key::Enter),
            "escape" | "esc" => Ok(Key::Escape),
            "backspace" => Ok(Key::Backspace),
            "delete" | "del" => Ok(Key::Delete),
            "up" | "arrowup" => Ok(Key::ArrowUp),
            "down" | "arrowdown" => Ok(Key::ArrowDown),
            "left" | "arrowleft" => Ok(Key::ArrowLeft),
            "right" | "arrowright" => Ok(Key::ArrowRight),
            _ => Err(KeyParseError(s.to_string())),
        }
    }
}
