use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::document::commands::KeyCommand;
use crate::shortcut::ShortcutKey;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    WordLeft,
    WordRight,
    Up,
    Down,
    LineStart,
    LineEnd,
    DocumentStart,
    DocumentEnd,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyBinding {
    Command(KeyCommand),
    Insert(char),
    Move { motion: Motion, extend: bool },
    Save,
    Dismiss,
    Quit,
    Unbound,
}

/// Maps a terminal key press to what the editor should do with it.
pub fn default_key_binding(event: &KeyEvent) -> KeyBinding {
    let modifiers = event.modifiers;
    let control = modifiers.contains(KeyModifiers::CONTROL);
    let alt = modifiers.contains(KeyModifiers::ALT);
    let extend = modifiers.contains(KeyModifiers::SHIFT);

    match event.code {
        KeyCode::Char(ch) if control => match ch.to_ascii_lowercase() {
            'q' | 'c' => KeyBinding::Quit,
            's' => KeyBinding::Save,
            'b' => KeyBinding::Command(KeyCommand::Bold),
            't' => KeyBinding::Command(KeyCommand::Italic),
            'u' => KeyBinding::Command(KeyCommand::Underline),
            'k' => KeyBinding::Command(KeyCommand::Code),
            'x' => KeyBinding::Command(KeyCommand::Strikethrough),
            'j' => KeyBinding::Insert('\n'),
            'a' => KeyBinding::Move {
                motion: Motion::LineStart,
                extend: false,
            },
            'e' => KeyBinding::Move {
                motion: Motion::LineEnd,
                extend: false,
            },
            _ => KeyBinding::Unbound,
        },
        KeyCode::Char(_) if alt => KeyBinding::Unbound,
        KeyCode::Char(ch) => KeyBinding::Insert(ch),
        KeyCode::Tab => KeyBinding::Insert('\t'),
        KeyCode::Enter if extend || control => KeyBinding::Insert('\n'),
        KeyCode::Enter => KeyBinding::Command(KeyCommand::SplitBlock),
        KeyCode::Backspace => KeyBinding::Command(KeyCommand::Backspace),
        KeyCode::Delete => KeyBinding::Command(KeyCommand::Delete),
        KeyCode::Esc => KeyBinding::Dismiss,
        KeyCode::Left => KeyBinding::Move {
            motion: if control {
                Motion::WordLeft
            } else {
                Motion::Left
            },
            extend,
        },
        KeyCode::Right => KeyBinding::Move {
            motion: if control {
                Motion::WordRight
            } else {
                Motion::Right
            },
            extend,
        },
        KeyCode::Up if !control => KeyBinding::Move {
            motion: Motion::Up,
            extend,
        },
        KeyCode::Down if !control => KeyBinding::Move {
            motion: Motion::Down,
            extend,
        },
        KeyCode::Home => KeyBinding::Move {
            motion: if control {
                Motion::DocumentStart
            } else {
                Motion::LineStart
            },
            extend,
        },
        KeyCode::End => KeyBinding::Move {
            motion: if control {
                Motion::DocumentEnd
            } else {
                Motion::LineEnd
            },
            extend,
        },
        _ => KeyBinding::Unbound,
    }
}

/// The symbol the shortcut detector sees for a key press. Chords and
/// non-character keys all read as [`ShortcutKey::Other`].
pub fn shortcut_key(event: &KeyEvent) -> ShortcutKey {
    let chord = event
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
    match event.code {
        KeyCode::Char(ch) if !chord => ShortcutKey::Char(ch),
        _ => ShortcutKey::Other,
    }
}
