use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use unicode_width::UnicodeWidthChar;

use crate::document::{Block, BlockKey, BlockType, EditorState, InlineStyle, Point, StyleSet};
use crate::theme::Theme;

pub const PLACEHOLDER: &str = "Start typing...";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorVisualPosition {
    pub line: usize,
    pub column: u16,
}

#[derive(Debug)]
pub struct RenderResult {
    pub lines: Vec<Line<'static>>,
    pub cursor: Option<CursorVisualPosition>,
    pub total_lines: usize,
    pub cursor_map: Vec<(Point, CursorVisualPosition)>,
}

pub fn render_state(state: &EditorState, width: usize, theme: &Theme) -> RenderResult {
    let mut renderer = Renderer::new(width.max(1), state, theme);
    renderer.render_document();
    renderer.finish()
}

struct Renderer<'a> {
    wrap_width: usize,
    state: &'a EditorState,
    theme: &'a Theme,
    cursor: Option<CursorVisualPosition>,
    cursor_map: Vec<(Point, CursorVisualPosition)>,
    lines: Vec<Line<'static>>,
    current_line_index: usize,
}

impl<'a> Renderer<'a> {
    fn new(wrap_width: usize, state: &'a EditorState, theme: &'a Theme) -> Self {
        Self {
            wrap_width,
            state,
            theme,
            cursor: None,
            cursor_map: Vec::new(),
            lines: Vec::new(),
            current_line_index: 0,
        }
    }

    fn render_document(&mut self) {
        let blocks = self.state.blocks();
        if self.state.is_empty() && blocks[0].kind() == BlockType::Unstyled {
            self.render_placeholder(&blocks[0]);
            return;
        }

        let mut ordinal = 0usize;
        for (idx, block) in blocks.iter().enumerate() {
            let kind = block.kind();
            let previous = idx.checked_sub(1).map(|prev| blocks[prev].kind());
            let next = blocks.get(idx + 1).map(Block::kind);

            if idx > 0 && !joins_previous(previous, kind) {
                self.push_blank_line();
            }

            ordinal = if kind == BlockType::OrderedListItem {
                if previous == Some(BlockType::OrderedListItem) {
                    ordinal + 1
                } else {
                    1
                }
            } else {
                0
            };

            match kind {
                BlockType::Unstyled => self.render_text_block(block, "", ""),
                BlockType::HeaderOne => self.render_header(block, HeaderLevel::One),
                BlockType::HeaderTwo => self.render_header(block, HeaderLevel::Two),
                BlockType::HeaderThree => self.render_header(block, HeaderLevel::Three),
                BlockType::CodeBlock => self.render_code_block(
                    block,
                    previous != Some(BlockType::CodeBlock),
                    next != Some(BlockType::CodeBlock),
                ),
                BlockType::Blockquote => self.render_text_block(block, "| ", "| "),
                BlockType::UnorderedListItem => self.render_text_block(block, "• ", "  "),
                BlockType::OrderedListItem => {
                    let label = format!("{ordinal}. ");
                    let continuation = " ".repeat(label.chars().count());
                    self.render_text_block(block, &label, &continuation);
                }
            }
        }
    }

    fn render_placeholder(&mut self, block: &Block) {
        let position = CursorVisualPosition {
            line: self.current_line_index,
            column: 0,
        };
        self.cursor = Some(position);
        self.cursor_map
            .push((Point::new(block.key().clone(), 0), position));
        let span = Span::styled(PLACEHOLDER, self.theme.placeholder_style());
        self.lines.push(Line::from(vec![span]));
        self.current_line_index += 1;
    }

    fn render_text_block(&mut self, block: &Block, first_prefix: &str, continuation_prefix: &str) {
        let fragments = self.collect_fragments(block, Style::default());
        let lines = wrap_fragments(
            &fragments,
            first_prefix,
            continuation_prefix,
            self.wrap_width,
        );
        self.consume_lines(block.key(), lines);
    }

    fn render_header(&mut self, block: &Block, level: HeaderLevel) {
        let base = Style::default().add_modifier(Modifier::BOLD);
        let fragments = self.collect_fragments(block, base);
        let lines = wrap_fragments(&fragments, "", "", self.wrap_width);
        self.consume_lines(block.key(), lines);

        let underline_char = match level {
            HeaderLevel::One => '=',
            HeaderLevel::Two => '-',
            HeaderLevel::Three => return,
        };
        let width = self.lines.last().map(|line| line_width(line)).unwrap_or(0);
        self.push_plain_line(&underline_string(width, underline_char));
    }

    fn render_code_block(&mut self, block: &Block, open_fence: bool, close_fence: bool) {
        let fence = self.code_block_fence();
        if open_fence {
            self.push_plain_line(&fence);
        }

        let fragments = self.collect_fragments(block, self.theme.code_style());
        let lines = wrap_fragments(&fragments, "", "", usize::MAX / 4);
        self.consume_lines(block.key(), lines);

        if close_fence {
            self.push_plain_line(&fence);
        }
    }

    fn collect_fragments(&self, block: &Block, base: Style) -> Vec<FragmentItem> {
        let selection = self.selected_span(block);
        let focus = &self.state.selection().focus;
        let cursor_offset = (focus.key == *block.key()).then_some(focus.offset);

        let mut fragments = Vec::new();
        let mut builder: Option<TokenBuilder> = None;
        let mut pending_events: Vec<TextEvent> = Vec::new();

        for (idx, ch) in block.text().chars().enumerate() {
            pending_events.push(TextEvent {
                offset: 0,
                kind: TextEventKind::Position(idx),
            });
            if cursor_offset == Some(idx) {
                pending_events.push(TextEvent {
                    offset: 0,
                    kind: TextEventKind::Cursor,
                });
            }

            if ch == '\r' {
                continue;
            }
            let mut style = merge_style(base, block.style_at(idx), self.theme);
            if selection.is_some_and(|(start, end)| idx >= start && idx < end) {
                style = style.patch(self.theme.selection_style());
            }
            if ch == '\n' {
                if let Some(mut token) = builder.take() {
                    token.add_events(&mut pending_events);
                    fragments.push(FragmentItem::Token(token.finish()));
                } else if !pending_events.is_empty() {
                    fragments.push(FragmentItem::Token(Fragment::empty(
                        style,
                        pending_events.drain(..).collect(),
                    )));
                }
                fragments.push(FragmentItem::LineBreak);
                continue;
            }

            let (actual, repeat) = if ch == '\t' { (' ', 4) } else { (ch, 1) };
            for _ in 0..repeat {
                let is_whitespace = actual.is_whitespace();
                if builder
                    .as_ref()
                    .map(|existing| existing.matches(is_whitespace, style))
                    .unwrap_or(false)
                {
                    if let Some(current) = builder.as_mut() {
                        current.add_events(&mut pending_events);
                        current.push_char(actual);
                    }
                } else {
                    if let Some(existing) = builder.take() {
                        fragments.push(FragmentItem::Token(existing.finish()));
                    }
                    let mut new_builder = TokenBuilder::new(style, is_whitespace);
                    new_builder.add_events(&mut pending_events);
                    new_builder.push_char(actual);
                    builder = Some(new_builder);
                }
            }
        }

        pending_events.push(TextEvent {
            offset: 0,
            kind: TextEventKind::Position(block.len()),
        });
        if cursor_offset == Some(block.len()) {
            pending_events.push(TextEvent {
                offset: 0,
                kind: TextEventKind::Cursor,
            });
        }
        if let Some(mut token) = builder {
            token.add_events(&mut pending_events);
            fragments.push(FragmentItem::Token(token.finish()));
        } else {
            fragments.push(FragmentItem::Token(Fragment::empty(base, pending_events)));
        }
        fragments
    }

    /// Character range of `block` covered by a non-empty selection.
    fn selected_span(&self, block: &Block) -> Option<(usize, usize)> {
        let range = self.state.selection_range();
        if range.is_collapsed() {
            return None;
        }
        let idx = self.state.block_index(block.key())?;
        let start_idx = self.state.block_index(&range.start.key)?;
        let end_idx = self.state.block_index(&range.end.key)?;
        if idx < start_idx || idx > end_idx {
            return None;
        }
        let start = if idx == start_idx { range.start.offset } else { 0 };
        let end = if idx == end_idx {
            range.end.offset
        } else {
            block.len()
        };
        Some((start, end))
    }

    fn push_blank_line(&mut self) {
        self.lines.push(Line::from(""));
        self.current_line_index += 1;
    }

    fn push_plain_line(&mut self, content: &str) {
        let span = Span::raw(content.to_string());
        self.lines.push(Line::from(vec![span]));
        self.current_line_index += 1;
    }

    fn code_block_fence(&self) -> String {
        const MIN_FENCE_WIDTH: usize = 4;
        "-".repeat(self.wrap_width.max(MIN_FENCE_WIDTH))
    }

    fn consume_lines(&mut self, key: &BlockKey, outputs: Vec<LineOutput>) {
        for output in outputs {
            let spans: Vec<Span<'static>> = output
                .spans
                .into_iter()
                .map(|segment| Span::styled(segment.text, segment.style))
                .collect();
            for event in output.events {
                let position = CursorVisualPosition {
                    line: self.current_line_index,
                    column: event.column,
                };
                match event.kind {
                    TextEventKind::Cursor => {
                        self.cursor = Some(position);
                    }
                    TextEventKind::Position(offset) => {
                        self.cursor_map
                            .push((Point::new(key.clone(), offset), position));
                    }
                }
            }
            self.lines.push(Line::from(spans));
            self.current_line_index += 1;
        }
    }

    fn finish(mut self) -> RenderResult {
        if self.lines.is_empty() {
            self.lines.push(Line::from(""));
        }
        let total_lines = self.lines.len();
        RenderResult {
            lines: self.lines,
            cursor: self.cursor,
            total_lines,
            cursor_map: self.cursor_map,
        }
    }
}

/// Consecutive code, list and quote blocks render without a blank line
/// between them.
fn joins_previous(previous: Option<BlockType>, kind: BlockType) -> bool {
    previous == Some(kind)
        && matches!(
            kind,
            BlockType::CodeBlock
                | BlockType::Blockquote
                | BlockType::UnorderedListItem
                | BlockType::OrderedListItem
        )
}

fn merge_style(base: Style, styles: StyleSet, theme: &Theme) -> Style {
    styles.iter().fold(base, |style, inline| match inline {
        InlineStyle::Bold => style.add_modifier(Modifier::BOLD),
        InlineStyle::Italic => style.add_modifier(Modifier::ITALIC),
        InlineStyle::Underline => style.add_modifier(Modifier::UNDERLINED),
        InlineStyle::Strikethrough => style.add_modifier(Modifier::CROSSED_OUT),
        InlineStyle::Code => style.patch(theme.code_style()),
    })
}

#[derive(Copy, Clone)]
enum HeaderLevel {
    One,
    Two,
    Three,
}

#[derive(Clone)]
struct LineSegment {
    text: String,
    style: Style,
}

#[derive(Clone)]
struct LineOutput {
    spans: Vec<LineSegment>,
    events: Vec<LocatedEvent>,
}

#[derive(Clone, Copy)]
struct LocatedEvent {
    column: u16,
    kind: TextEventKind,
}

#[derive(Clone)]
struct Fragment {
    text: String,
    style: Style,
    kind: FragmentKind,
    width: usize,
    events: Vec<TextEvent>,
}

impl Fragment {
    fn empty(style: Style, events: Vec<TextEvent>) -> Self {
        Self {
            text: String::new(),
            style,
            kind: FragmentKind::Word,
            width: 0,
            events,
        }
    }
}

#[derive(Clone, Copy)]
enum FragmentKind {
    Word,
    Whitespace,
}

#[derive(Clone)]
enum FragmentItem {
    Token(Fragment),
    LineBreak,
}

#[derive(Clone)]
struct TextEvent {
    offset: usize,
    kind: TextEventKind,
}

#[derive(Clone, Copy)]
enum TextEventKind {
    Position(usize),
    Cursor,
}

struct TokenBuilder {
    text: String,
    style: Style,
    kind: FragmentKind,
    width: usize,
    events: Vec<TextEvent>,
}

impl TokenBuilder {
    fn new(style: Style, is_whitespace: bool) -> Self {
        Self {
            text: String::new(),
            style,
            kind: if is_whitespace {
                FragmentKind::Whitespace
            } else {
                FragmentKind::Word
            },
            width: 0,
            events: Vec::new(),
        }
    }

    fn matches(&self, is_whitespace: bool, style: Style) -> bool {
        self.style == style
            && matches!(
                (self.kind, is_whitespace),
                (FragmentKind::Whitespace, true) | (FragmentKind::Word, false)
            )
    }

    fn add_events(&mut self, pending: &mut Vec<TextEvent>) {
        for mut event in pending.drain(..) {
            event.offset = self.width;
            self.events.push(event);
        }
    }

    fn push_char(&mut self, ch: char) {
        self.text.push(ch);
        self.width += UnicodeWidthChar::width(ch).unwrap_or(0);
    }

    fn finish(self) -> Fragment {
        Fragment {
            text: self.text,
            style: self.style,
            kind: self.kind,
            width: self.width,
            events: self.events,
        }
    }
}

fn wrap_fragments(
    fragments: &[FragmentItem],
    first_prefix: &str,
    continuation_prefix: &str,
    width: usize,
) -> Vec<LineOutput> {
    let mut outputs = Vec::new();
    let mut builder = LineBuilder::new(first_prefix);
    let mut pending_whitespace: Vec<Fragment> = Vec::new();

    for fragment in fragments {
        match fragment {
            FragmentItem::LineBreak => {
                builder.consume_pending(&mut pending_whitespace);
                outputs.push(builder.build_line());
                builder = LineBuilder::new(continuation_prefix);
            }
            FragmentItem::Token(token) => match token.kind {
                FragmentKind::Whitespace => {
                    pending_whitespace.push(token.clone());
                }
                FragmentKind::Word => {
                    let whitespace_width: usize =
                        pending_whitespace.iter().map(|item| item.width).sum();
                    if builder.current_width() > builder.prefix_width
                        && token.width > 0
                        && builder.current_width() + whitespace_width + token.width > width
                    {
                        builder.consume_pending(&mut pending_whitespace);
                        outputs.push(builder.build_line());
                        builder = LineBuilder::new(continuation_prefix);
                    }

                    builder.append_with_pending(token.clone(), &mut pending_whitespace);
                }
            },
        }
    }

    builder.consume_pending(&mut pending_whitespace);
    outputs.push(builder.build_line());
    outputs
}

struct LineBuilder {
    segments: Vec<LineSegment>,
    events: Vec<LocatedEvent>,
    width: usize,
    prefix_width: usize,
}

impl LineBuilder {
    fn new(prefix: &str) -> Self {
        let prefix_width = visible_width(prefix);
        let mut segments = Vec::new();
        if !prefix.is_empty() {
            segments.push(LineSegment {
                text: prefix.to_string(),
                style: Style::default(),
            });
        }
        Self {
            segments,
            events: Vec::new(),
            width: prefix_width,
            prefix_width,
        }
    }

    fn current_width(&self) -> usize {
        self.width
    }

    fn append_with_pending(&mut self, token: Fragment, pending_whitespace: &mut Vec<Fragment>) {
        self.consume_pending(pending_whitespace);
        self.append_token(token);
    }

    fn consume_pending(&mut self, pending_whitespace: &mut Vec<Fragment>) {
        for fragment in pending_whitespace.drain(..) {
            self.append_token(fragment);
        }
    }

    fn append_token(&mut self, fragment: Fragment) {
        let start = self.width;
        if !fragment.text.is_empty() {
            self.segments.push(LineSegment {
                text: fragment.text,
                style: fragment.style,
            });
            self.width += fragment.width;
        }

        for event in fragment.events {
            let column = start + event.offset;
            self.events.push(LocatedEvent {
                column: column.min(u16::MAX as usize) as u16,
                kind: event.kind,
            });
        }
    }

    fn build_line(mut self) -> LineOutput {
        if self.segments.is_empty() {
            self.segments.push(LineSegment {
                text: String::new(),
                style: Style::default(),
            });
        }
        self.events.sort_by_key(|event| event.column);
        LineOutput {
            spans: self.segments,
            events: self.events,
        }
    }
}

fn visible_width(text: &str) -> usize {
    text.chars()
        .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
        .sum()
}

fn line_width(line: &Line<'_>) -> usize {
    line.spans
        .iter()
        .map(|span| visible_width(span.content.as_ref()))
        .sum()
}

fn underline_string(width: usize, ch: char) -> String {
    std::iter::repeat_n(ch, width.max(1)).collect()
}
