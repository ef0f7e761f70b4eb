// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Logical key events produced by the decoder.

use std::fmt;

/// Keyboard modifiers attached to a [`Key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyModifiers {
    pub shift: bool,
    pub alt: bool,
    pub ctrl: bool,
}

/// Logical key codes: a printable character, or one of the non-character keys
/// of the VT repertoire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// Regular printable character.
    Char(char),
    /// Function keys F1–F12.
    Function(u8),
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Insert,
    Delete,
    PageUp,
    PageDown,
    Tab,
    Enter,
    Backspace,
}

/// One logical key event: a key code plus the modifier set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl Key {
    #[must_use]
    pub fn plain(code: KeyCode) -> Key {
        Key { code, modifiers: KeyModifiers::default() }
    }

    /// Ctrl-chord on a character, e.g. `Key::ctrl('A')` for `^A`.
    #[must_use]
    pub fn ctrl(ch: char) -> Key {
        Key {
            code: KeyCode::Char(ch),
            modifiers: KeyModifiers { ctrl: true, ..KeyModifiers::default() },
        }
    }

    /// Alt-chord on a character, e.g. `Key::alt('f')` for `ESC f`.
    #[must_use]
    pub fn alt(ch: char) -> Key {
        Key {
            code: KeyCode::Char(ch),
            modifiers: KeyModifiers { alt: true, ..KeyModifiers::default() },
        }
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCode::Char(ch) => write!(f, "{ch}"),
            KeyCode::Function(n) => write!(f, "F{n}"),
            KeyCode::Up => write!(f, "Up"),
            KeyCode::Down => write!(f, "Down"),
            KeyCode::Left => write!(f, "Left"),
            KeyCode::Right => write!(f, "Right"),
            KeyCode::Home => write!(f, "Home"),
            KeyCode::End => write!(f, "End"),
            KeyCode::Insert => write!(f, "Insert"),
            KeyCode::Delete => write!(f, "Delete"),
            KeyCode::PageUp => write!(f, "PageUp"),
            KeyCode::PageDown => write!(f, "PageDown"),
            KeyCode::Tab => write!(f, "Tab"),
            KeyCode::Enter => write!(f, "Enter"),
            KeyCode::Backspace => write!(f, "Backspace"),
        }
    }
}

impl fmt::Display for Key {
    /// Human-readable chord, e.g. `Ctrl+Alt+X` or `Shift+F5`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.ctrl {
            write!(f, "Ctrl+")?;
        }
        if self.modifiers.alt {
            write!(f, "Alt+")?;
        }
        if self.modifiers.shift {
            write!(f, "Shift+")?;
        }
        write!(f, "{}", self.code)
    }
}
