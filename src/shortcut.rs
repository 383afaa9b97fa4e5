//! Detection of markdown-like typing shortcuts.
//!
//! The detector is a small state machine fed with every key press and the
//! caret offset at the moment of the press (before the key is inserted).
//! Pressing space while a sequence is pending completes it; the caller then
//! strips the trigger text and applies the mapped style.

use crate::document::{BlockType, InlineStyle};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Sequence {
    #[default]
    Empty,
    Hash,
    Star1,
    Star2,
    Star3,
    Tick1,
    Tick2,
    Tick3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShortcutKey {
    Char(char),
    /// Any non-character key: arrows, Enter, Backspace, chords.
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShortcutStyle {
    Block(BlockType),
    Inline(InlineStyle),
}

const STYLE_MAP: [(Sequence, ShortcutStyle); 6] = [
    (Sequence::Hash, ShortcutStyle::Block(BlockType::HeaderOne)),
    (Sequence::Star1, ShortcutStyle::Inline(InlineStyle::Bold)),
    (Sequence::Star2, ShortcutStyle::Inline(InlineStyle::Bold)),
    (Sequence::Star3, ShortcutStyle::Inline(InlineStyle::Underline)),
    (Sequence::Tick1, ShortcutStyle::Inline(InlineStyle::Code)),
    (Sequence::Tick3, ShortcutStyle::Block(BlockType::CodeBlock)),
];

impl Sequence {
    pub fn is_empty(self) -> bool {
        self == Sequence::Empty
    }

    /// The literal characters the user typed to reach this state.
    pub fn trigger(self) -> &'static str {
        match self {
            Sequence::Empty => "",
            Sequence::Hash => "#",
            Sequence::Star1 => "*",
            Sequence::Star2 => "**",
            Sequence::Star3 => "***",
            Sequence::Tick1 => "`",
            Sequence::Tick2 => "``",
            Sequence::Tick3 => "```",
        }
    }

    pub fn style(self) -> Option<ShortcutStyle> {
        STYLE_MAP
            .iter()
            .find(|(sequence, _)| *sequence == self)
            .map(|(_, style)| *style)
    }
}

/// Advances the sequence for one key press at caret `offset`.
pub fn transition(state: Sequence, key: ShortcutKey, offset: usize) -> Sequence {
    match key {
        ShortcutKey::Char('#') if offset == 0 => Sequence::Hash,
        ShortcutKey::Char('*') => match (state, offset) {
            (Sequence::Star1, 1) => Sequence::Star2,
            (Sequence::Star2, 2) => Sequence::Star3,
            (_, 0) => Sequence::Star1,
            _ => Sequence::Empty,
        },
        ShortcutKey::Char('`') => match state {
            Sequence::Tick1 => Sequence::Tick2,
            Sequence::Tick2 => Sequence::Tick3,
            _ => Sequence::Tick1,
        },
        _ => Sequence::Empty,
    }
}

#[derive(Clone, Debug, Default)]
pub struct ShortcutDetector {
    sequence: Sequence,
}

impl ShortcutDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sequence(&self) -> Sequence {
        self.sequence
    }

    /// Feeds one key press. Returns the completed sequence when `key` is a
    /// space and a sequence was pending; the detector is reset in that case.
    pub fn observe(&mut self, key: ShortcutKey, offset: usize) -> Option<Sequence> {
        if key == ShortcutKey::Char(' ') && !self.sequence.is_empty() {
            return Some(std::mem::take(&mut self.sequence));
        }
        self.sequence = transition(self.sequence, key, offset);
        None
    }

    pub fn reset(&mut self) {
        self.sequence = Sequence::Empty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(keys: &[(char, usize)]) -> Sequence {
        keys.iter().fold(Sequence::Empty, |state, (ch, offset)| {
            transition(state, ShortcutKey::Char(*ch), *offset)
        })
    }

    #[test]
    fn hash_only_at_line_start() {
        assert_eq!(feed(&[('#', 0)]), Sequence::Hash);
        assert_eq!(feed(&[('#', 3)]), Sequence::Empty);
        assert_eq!(feed(&[('#', 0), ('#', 1)]), Sequence::Empty);
    }

    #[test]
    fn stars_chain_with_matching_offsets() {
        assert_eq!(feed(&[('*', 0)]), Sequence::Star1);
        assert_eq!(feed(&[('*', 0), ('*', 1)]), Sequence::Star2);
        assert_eq!(feed(&[('*', 0), ('*', 1), ('*', 2)]), Sequence::Star3);
    }

    #[test]
    fn stars_reset_on_unexpected_offsets() {
        assert_eq!(feed(&[('*', 4)]), Sequence::Empty);
        assert_eq!(feed(&[('*', 0), ('*', 5)]), Sequence::Empty);
        assert_eq!(feed(&[('*', 0), ('*', 1), ('*', 7)]), Sequence::Empty);
        // A fourth star at offset 3 matches no rule.
        assert_eq!(
            feed(&[('*', 0), ('*', 1), ('*', 2), ('*', 3)]),
            Sequence::Empty
        );
        // Caret moved back to the line start restarts the chain.
        assert_eq!(feed(&[('*', 0), ('*', 0)]), Sequence::Star1);
    }

    #[test]
    fn backticks_chain_regardless_of_offset() {
        assert_eq!(feed(&[('`', 9)]), Sequence::Tick1);
        assert_eq!(feed(&[('`', 9), ('`', 10)]), Sequence::Tick2);
        assert_eq!(feed(&[('`', 0), ('`', 4), ('`', 2)]), Sequence::Tick3);
        assert_eq!(
            feed(&[('`', 0), ('`', 1), ('`', 2), ('`', 3)]),
            Sequence::Tick1
        );
    }

    #[test]
    fn other_keys_reset() {
        assert_eq!(
            transition(Sequence::Star2, ShortcutKey::Char('a'), 2),
            Sequence::Empty
        );
        assert_eq!(
            transition(Sequence::Tick2, ShortcutKey::Other, 2),
            Sequence::Empty
        );
    }

    #[test]
    fn space_completes_pending_sequence() {
        let mut detector = ShortcutDetector::new();
        assert_eq!(detector.observe(ShortcutKey::Char('*'), 0), None);
        assert_eq!(detector.observe(ShortcutKey::Char('*'), 1), None);
        assert_eq!(
            detector.observe(ShortcutKey::Char(' '), 2),
            Some(Sequence::Star2)
        );
        assert_eq!(detector.sequence(), Sequence::Empty);
    }

    #[test]
    fn space_without_sequence_does_nothing() {
        let mut detector = ShortcutDetector::new();
        assert_eq!(detector.observe(ShortcutKey::Char(' '), 0), None);
        assert_eq!(detector.sequence(), Sequence::Empty);
    }

    #[test]
    fn reset_drops_pending_sequence() {
        let mut detector = ShortcutDetector::new();
        detector.observe(ShortcutKey::Char('#'), 0);
        assert_eq!(detector.sequence(), Sequence::Hash);
        detector.reset();
        assert_eq!(detector.observe(ShortcutKey::Char(' '), 1), None);
    }

    #[test]
    fn style_mapping() {
        assert_eq!(
            Sequence::Hash.style(),
            Some(ShortcutStyle::Block(BlockType::HeaderOne))
        );
        assert_eq!(
            Sequence::Star2.style(),
            Some(ShortcutStyle::Inline(InlineStyle::Bold))
        );
        assert_eq!(
            Sequence::Tick3.style(),
            Some(ShortcutStyle::Block(BlockType::CodeBlock))
        );
        assert_eq!(Sequence::Tick2.style(), None);
        assert_eq!(Sequence::Empty.style(), None);
        assert_eq!(Sequence::Star3.trigger(), "***");
    }
}
