//! In-memory rich-text document model.
//!
//! An [`EditorState`] is an ordered list of [`Block`]s plus a [`Selection`]
//! and a pending inline style override. Every transform in [`transform`],
//! [`cursor`] and [`commands`] takes a state by reference and returns a new
//! one; nothing is edited in place behind the caller's back.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod commands;
pub mod cursor;
pub mod raw;
pub mod transform;

mod content;

pub(crate) use content::{char_to_byte_idx, split_text};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockKey(String);

impl BlockKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockType {
    #[default]
    Unstyled,
    HeaderOne,
    HeaderTwo,
    HeaderThree,
    CodeBlock,
    Blockquote,
    UnorderedListItem,
    OrderedListItem,
}

impl BlockType {
    pub fn label(self) -> &'static str {
        match self {
            BlockType::Unstyled => "Text",
            BlockType::HeaderOne => "Heading 1",
            BlockType::HeaderTwo => "Heading 2",
            BlockType::HeaderThree => "Heading 3",
            BlockType::CodeBlock => "Code",
            BlockType::Blockquote => "Quote",
            BlockType::UnorderedListItem => "Bullet List",
            BlockType::OrderedListItem => "Numbered List",
        }
    }

    /// Whether pressing Enter inside a block of this type continues the type
    /// in the new block.
    pub fn continues_on_split(self) -> bool {
        matches!(
            self,
            BlockType::CodeBlock | BlockType::UnorderedListItem | BlockType::OrderedListItem
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InlineStyle {
    Bold,
    Italic,
    Underline,
    Code,
    Strikethrough,
}

impl InlineStyle {
    pub const ALL: [InlineStyle; 5] = [
        InlineStyle::Bold,
        InlineStyle::Italic,
        InlineStyle::Underline,
        InlineStyle::Code,
        InlineStyle::Strikethrough,
    ];

    fn bit(self) -> u8 {
        match self {
            InlineStyle::Bold => 1,
            InlineStyle::Italic => 1 << 1,
            InlineStyle::Underline => 1 << 2,
            InlineStyle::Code => 1 << 3,
            InlineStyle::Strikethrough => 1 << 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InlineStyle::Bold => "Bold",
            InlineStyle::Italic => "Italic",
            InlineStyle::Underline => "Underline",
            InlineStyle::Code => "Code",
            InlineStyle::Strikethrough => "Strikethrough",
        }
    }
}

/// Set of inline styles applied to a single character.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StyleSet(u8);

impl StyleSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn of(styles: &[InlineStyle]) -> Self {
        styles
            .iter()
            .fold(Self::empty(), |set, style| set.with(*style))
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, style: InlineStyle) -> bool {
        self.0 & style.bit() != 0
    }

    pub fn with(self, style: InlineStyle) -> Self {
        Self(self.0 | style.bit())
    }

    pub fn without(self, style: InlineStyle) -> Self {
        Self(self.0 & !style.bit())
    }

    pub fn toggled(self, style: InlineStyle) -> Self {
        if self.contains(style) {
            self.without(style)
        } else {
            self.with(style)
        }
    }

    pub fn iter(self) -> impl Iterator<Item = InlineStyle> {
        InlineStyle::ALL
            .into_iter()
            .filter(move |style| self.contains(*style))
    }
}

/// A paragraph-like unit of the document.
///
/// `styles` always holds exactly one entry per character of `text`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    key: BlockKey,
    kind: BlockType,
    text: String,
    styles: Vec<StyleSet>,
}

impl Block {
    pub fn new(key: BlockKey, kind: BlockType, text: impl Into<String>) -> Self {
        let text = text.into();
        let styles = vec![StyleSet::empty(); text.chars().count()];
        Self {
            key,
            kind,
            text,
            styles,
        }
    }

    /// Builds a block from text and per-character styles. Returns `None` when
    /// the style count does not match the character count.
    pub fn with_styles(
        key: BlockKey,
        kind: BlockType,
        text: impl Into<String>,
        styles: Vec<StyleSet>,
    ) -> Option<Self> {
        let text = text.into();
        if text.chars().count() != styles.len() {
            return None;
        }
        Some(Self {
            key,
            kind,
            text,
            styles,
        })
    }

    pub fn key(&self) -> &BlockKey {
        &self.key
    }

    pub fn kind(&self) -> BlockType {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn styles(&self) -> &[StyleSet] {
        &self.styles
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn style_at(&self, offset: usize) -> StyleSet {
        self.styles.get(offset).copied().unwrap_or_default()
    }

    pub(crate) fn set_kind(&mut self, kind: BlockType) {
        self.kind = kind;
    }

    /// Replaces the characters in `start..end` with `text`, every inserted
    /// character carrying `style`.
    pub(crate) fn splice(&mut self, start: usize, end: usize, text: &str, style: StyleSet) {
        let len = self.len();
        let end = end.min(len);
        let start = start.min(end);
        let start_byte = char_to_byte_idx(&self.text, start);
        let end_byte = char_to_byte_idx(&self.text, end);
        self.text.replace_range(start_byte..end_byte, text);
        let inserted = text.chars().count();
        self.styles
            .splice(start..end, std::iter::repeat_n(style, inserted));
    }

    /// Splits off everything from `offset` onwards, returning the tail text
    /// and styles.
    pub(crate) fn split_off(&mut self, offset: usize) -> (String, Vec<StyleSet>) {
        let offset = offset.min(self.len());
        let (head, tail) = split_text(&self.text, offset);
        self.text = head;
        let tail_styles = self.styles.split_off(offset);
        (tail, tail_styles)
    }

    pub(crate) fn append(&mut self, text: &str, styles: &[StyleSet]) {
        self.text.push_str(text);
        self.styles.extend_from_slice(styles);
    }

    pub(crate) fn map_styles(
        &mut self,
        start: usize,
        end: usize,
        f: impl Fn(StyleSet) -> StyleSet,
    ) -> bool {
        let end = end.min(self.len());
        let mut changed = false;
        for style in self.styles.iter_mut().take(end).skip(start) {
            let next = f(*style);
            if next != *style {
                *style = next;
                changed = true;
            }
        }
        changed
    }
}

/// A caret position: block key plus character offset within that block.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Point {
    pub key: BlockKey,
    pub offset: usize,
}

impl Point {
    pub fn new(key: BlockKey, offset: usize) -> Self {
        Self { key, offset }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
}

impl Selection {
    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

/// A selection in document order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Range {
    pub start: Point,
    pub end: Point,
}

impl Range {
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorState {
    blocks: Vec<Block>,
    selection: Selection,
    inline_override: Option<StyleSet>,
    next_key: u64,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorState {
    /// An empty document: a single unstyled block with the caret in it.
    pub fn new() -> Self {
        Self::from_blocks(Vec::new())
    }

    /// Builds a state from blocks, placing the caret at the start of the first
    /// block. An empty block list yields an empty document.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let mut state = Self {
            blocks,
            selection: Selection::collapsed(Point::new(BlockKey::new(""), 0)),
            inline_override: None,
            next_key: 0,
        };
        if state.blocks.is_empty() {
            let key = state.generate_key();
            state
                .blocks
                .push(Block::new(key, BlockType::Unstyled, String::new()));
        }
        let first = state.blocks[0].key().clone();
        state.selection = Selection::collapsed(Point::new(first, 0));
        state
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn inline_override(&self) -> Option<StyleSet> {
        self.inline_override
    }

    pub fn block_index(&self, key: &BlockKey) -> Option<usize> {
        self.blocks.iter().position(|block| block.key() == key)
    }

    pub fn block_for_key(&self, key: &BlockKey) -> Option<&Block> {
        self.blocks.iter().find(|block| block.key() == key)
    }

    pub fn focus_block(&self) -> Option<&Block> {
        self.block_for_key(&self.selection.focus.key)
    }

    /// The selection ordered by document position.
    pub fn selection_range(&self) -> Range {
        let anchor = &self.selection.anchor;
        let focus = &self.selection.focus;
        if self.compare_points(anchor, focus) == std::cmp::Ordering::Greater {
            Range {
                start: focus.clone(),
                end: anchor.clone(),
            }
        } else {
            Range {
                start: anchor.clone(),
                end: focus.clone(),
            }
        }
    }

    pub fn is_selection_backward(&self) -> bool {
        self.compare_points(&self.selection.anchor, &self.selection.focus)
            == std::cmp::Ordering::Greater
    }

    pub fn compare_points(&self, a: &Point, b: &Point) -> std::cmp::Ordering {
        let a_idx = self.block_index(&a.key).unwrap_or(0);
        let b_idx = self.block_index(&b.key).unwrap_or(0);
        a_idx.cmp(&b_idx).then(a.offset.cmp(&b.offset))
    }

    /// Whether the document holds a single empty block.
    pub fn is_empty(&self) -> bool {
        self.blocks.len() == 1 && self.blocks[0].is_empty()
    }

    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Compares block content (keys, types, text and styles), ignoring the
    /// selection.
    pub fn content_eq(&self, other: &EditorState) -> bool {
        self.blocks == other.blocks
    }

    /// Clamps a point into the document. Unknown keys map to the start of the
    /// first block.
    pub fn clamp_point(&self, point: &Point) -> Point {
        match self.block_for_key(&point.key) {
            Some(block) => Point::new(point.key.clone(), point.offset.min(block.len())),
            None => Point::new(self.blocks[0].key().clone(), 0),
        }
    }

    pub fn with_selection(&self, selection: Selection) -> EditorState {
        let mut next = self.clone();
        next.selection = Selection::new(
            self.clamp_point(&selection.anchor),
            self.clamp_point(&selection.focus),
        );
        next.inline_override = None;
        next
    }

    pub(crate) fn blocks_mut(&mut self) -> &mut Vec<Block> {
        &mut self.blocks
    }

    pub(crate) fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }

    pub(crate) fn set_inline_override(&mut self, style: Option<StyleSet>) {
        self.inline_override = style;
    }

    pub(crate) fn generate_key(&mut self) -> BlockKey {
        loop {
            self.next_key += 1;
            let candidate = BlockKey::new(format!("b{}", self.next_key));
            if self.block_index(&candidate).is_none() {
                return candidate;
            }
        }
    }
}
