use super::transform::{backspace, delete, split_block, toggle_inline_style};
use super::{EditorState, InlineStyle};

/// Editing commands the document engine knows how to carry out on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyCommand {
    Bold,
    Italic,
    Underline,
    Code,
    Strikethrough,
    Backspace,
    Delete,
    SplitBlock,
}

impl KeyCommand {
    pub fn inline_style(self) -> Option<InlineStyle> {
        match self {
            KeyCommand::Bold => Some(InlineStyle::Bold),
            KeyCommand::Italic => Some(InlineStyle::Italic),
            KeyCommand::Underline => Some(InlineStyle::Underline),
            KeyCommand::Code => Some(InlineStyle::Code),
            KeyCommand::Strikethrough => Some(InlineStyle::Strikethrough),
            KeyCommand::Backspace | KeyCommand::Delete | KeyCommand::SplitBlock => None,
        }
    }
}

/// Runs a built-in command. `None` means the command had nothing to act on
/// and the caller should fall back to its default handling.
pub fn handle_key_command(state: &EditorState, command: KeyCommand) -> Option<EditorState> {
    if let Some(style) = command.inline_style() {
        return Some(toggle_inline_style(state, style));
    }
    match command {
        KeyCommand::Backspace => backspace(state),
        KeyCommand::Delete => delete(state),
        KeyCommand::SplitBlock => Some(split_block(state)),
        _ => None,
    }
}
