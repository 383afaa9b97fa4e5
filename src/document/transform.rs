use super::{BlockType, EditorState, InlineStyle, Point, Range, Selection, StyleSet};

/// Deletes the characters covered by `range`. A range spanning several
/// blocks merges the tail of the last block into the first one. The caret
/// collapses at the range start; the inline override is kept.
pub fn remove_range(state: &EditorState, range: &Range) -> EditorState {
    let mut next = state.clone();
    let (Some(start_idx), Some(end_idx)) = (
        state.block_index(&range.start.key),
        state.block_index(&range.end.key),
    ) else {
        return next;
    };
    if start_idx > end_idx {
        return next;
    }

    let blocks = next.blocks_mut();
    if start_idx == end_idx {
        blocks[start_idx].splice(
            range.start.offset,
            range.end.offset,
            "",
            StyleSet::empty(),
        );
    } else {
        let (tail_text, tail_styles) = blocks[end_idx].split_off(range.end.offset);
        let first = &mut blocks[start_idx];
        first.split_off(range.start.offset);
        first.append(&tail_text, &tail_styles);
        blocks.drain(start_idx + 1..=end_idx);
    }

    let caret = next.clamp_point(&range.start);
    next.set_selection(Selection::collapsed(caret));
    next
}

/// Replaces the selection with `text`. Inserted characters take the pending
/// override, else the style at the caret. Newlines stay inside the block as
/// soft line breaks.
pub fn insert_text(state: &EditorState, text: &str) -> EditorState {
    let mut next = if state.selection().is_collapsed() {
        state.clone()
    } else {
        remove_range(state, &state.selection_range())
    };
    if text.is_empty() {
        return next;
    }

    let style = current_inline_style(&next);
    let caret = next.selection().focus.clone();
    let Some(idx) = next.block_index(&caret.key) else {
        return next;
    };
    next.blocks_mut()[idx].splice(caret.offset, caret.offset, text, style);
    let offset = caret.offset + text.chars().count();
    next.set_selection(Selection::collapsed(Point::new(caret.key, offset)));
    next.set_inline_override(None);
    next
}

/// Splits the focused block at the caret, moving the caret to the start of
/// the new block.
pub fn split_block(state: &EditorState) -> EditorState {
    let mut next = if state.selection().is_collapsed() {
        state.clone()
    } else {
        remove_range(state, &state.selection_range())
    };
    let caret = next.selection().focus.clone();
    let Some(idx) = next.block_index(&caret.key) else {
        return next;
    };

    let key = next.generate_key();
    let blocks = next.blocks_mut();
    let kind = blocks[idx].kind();
    let (tail_text, tail_styles) = blocks[idx].split_off(caret.offset);
    let new_kind = if kind.continues_on_split() {
        kind
    } else {
        BlockType::Unstyled
    };
    let Some(block) = super::Block::with_styles(key.clone(), new_kind, tail_text, tail_styles)
    else {
        return state.clone();
    };
    blocks.insert(idx + 1, block);
    next.set_selection(Selection::collapsed(Point::new(key, 0)));
    next
}

/// Deletes backwards. Returns `None` when there is nothing to delete.
///
/// At the start of a styled block the block type is reset to unstyled
/// before any merge happens.
pub fn backspace(state: &EditorState) -> Option<EditorState> {
    if !state.selection().is_collapsed() {
        return Some(remove_range(state, &state.selection_range()));
    }
    let caret = &state.selection().focus;
    let idx = state.block_index(&caret.key)?;
    if caret.offset > 0 {
        let range = Range {
            start: Point::new(caret.key.clone(), caret.offset - 1),
            end: caret.clone(),
        };
        return Some(remove_range(state, &range));
    }

    let block = &state.blocks()[idx];
    if block.kind() != BlockType::Unstyled {
        let mut next = state.clone();
        next.blocks_mut()[idx].set_kind(BlockType::Unstyled);
        return Some(next);
    }
    if idx == 0 {
        return None;
    }
    let previous = &state.blocks()[idx - 1];
    let range = Range {
        start: Point::new(previous.key().clone(), previous.len()),
        end: caret.clone(),
    };
    Some(remove_range(state, &range))
}

/// Deletes forwards. Returns `None` when there is nothing to delete.
pub fn delete(state: &EditorState) -> Option<EditorState> {
    if !state.selection().is_collapsed() {
        return Some(remove_range(state, &state.selection_range()));
    }
    let caret = &state.selection().focus;
    let idx = state.block_index(&caret.key)?;
    let block = &state.blocks()[idx];
    if caret.offset < block.len() {
        let range = Range {
            start: caret.clone(),
            end: Point::new(caret.key.clone(), caret.offset + 1),
        };
        return Some(remove_range(state, &range));
    }
    let following = state.blocks().get(idx + 1)?;
    let range = Range {
        start: caret.clone(),
        end: Point::new(following.key().clone(), 0),
    };
    Some(remove_range(state, &range))
}

fn map_styles_in_range(
    state: &EditorState,
    range: &Range,
    f: impl Fn(StyleSet) -> StyleSet,
) -> EditorState {
    let mut next = state.clone();
    let (Some(start_idx), Some(end_idx)) = (
        state.block_index(&range.start.key),
        state.block_index(&range.end.key),
    ) else {
        return next;
    };
    for (idx, block) in next
        .blocks_mut()
        .iter_mut()
        .enumerate()
        .take(end_idx + 1)
        .skip(start_idx)
    {
        let start = if idx == start_idx { range.start.offset } else { 0 };
        let end = if idx == end_idx {
            range.end.offset
        } else {
            block.len()
        };
        if start < end {
            block.map_styles(start, end, &f);
        }
    }
    next
}

pub fn remove_inline_style(state: &EditorState, range: &Range, style: InlineStyle) -> EditorState {
    map_styles_in_range(state, range, |set| set.without(style))
}

pub fn add_inline_style(state: &EditorState, range: &Range, style: InlineStyle) -> EditorState {
    map_styles_in_range(state, range, |set| set.with(style))
}

/// Whether every character in `range` carries `style`. Empty ranges never do.
pub fn range_has_style(state: &EditorState, range: &Range, style: InlineStyle) -> bool {
    let (Some(start_idx), Some(end_idx)) = (
        state.block_index(&range.start.key),
        state.block_index(&range.end.key),
    ) else {
        return false;
    };
    let mut seen_any = false;
    for (idx, block) in state
        .blocks()
        .iter()
        .enumerate()
        .take(end_idx + 1)
        .skip(start_idx)
    {
        let start = if idx == start_idx { range.start.offset } else { 0 };
        let end = if idx == end_idx {
            range.end.offset.min(block.len())
        } else {
            block.len()
        };
        for set in block.styles().iter().take(end).skip(start) {
            if !set.contains(style) {
                return false;
            }
            seen_any = true;
        }
    }
    seen_any
}

/// The style the next inserted character would get: the pending override if
/// one is set, otherwise the style of the character before the caret (or the
/// first character when the caret sits at the block start).
pub fn current_inline_style(state: &EditorState) -> StyleSet {
    if let Some(style) = state.inline_override() {
        return style;
    }
    let range = state.selection_range();
    let point = if range.is_collapsed() {
        &range.end
    } else {
        &range.start
    };
    let Some(block) = state.block_for_key(&point.key) else {
        return StyleSet::empty();
    };
    if !range.is_collapsed() {
        return block.style_at(point.offset);
    }
    if point.offset > 0 {
        block.style_at(point.offset - 1)
    } else {
        block.style_at(0)
    }
}

/// Toggles an inline style. A collapsed selection flips the style in the
/// pending override; a range loses the style if every character has it and
/// gains it otherwise.
pub fn toggle_inline_style(state: &EditorState, style: InlineStyle) -> EditorState {
    let range = state.selection_range();
    if range.is_collapsed() {
        let mut next = state.clone();
        let current = current_inline_style(state);
        next.set_inline_override(Some(current.toggled(style)));
        return next;
    }
    let mut next = if range_has_style(state, &range, style) {
        remove_inline_style(state, &range, style)
    } else {
        add_inline_style(state, &range, style)
    };
    next.set_inline_override(None);
    next
}

/// Sets every block touched by the selection to `kind`, or back to unstyled
/// when the first touched block already has that type.
pub fn toggle_block_type(state: &EditorState, kind: BlockType) -> EditorState {
    let range = state.selection_range();
    let mut next = state.clone();
    let (Some(start_idx), Some(end_idx)) = (
        state.block_index(&range.start.key),
        state.block_index(&range.end.key),
    ) else {
        return next;
    };
    let target = if state.blocks()[start_idx].kind() == kind {
        BlockType::Unstyled
    } else {
        kind
    };
    for block in next
        .blocks_mut()
        .iter_mut()
        .take(end_idx + 1)
        .skip(start_idx)
    {
        block.set_kind(target);
    }
    next
}

#[cfg(test)]
#[path = "transform_tests.rs"]
mod transform_tests;
