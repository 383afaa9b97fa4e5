use super::content::{next_word_boundary, previous_word_boundary};
use super::{EditorState, Point, Selection};

/// Moves the focus to `point`. With `extend` the anchor stays put, producing
/// a range; otherwise the selection collapses at `point`.
pub fn move_to(state: &EditorState, point: &Point, extend: bool) -> EditorState {
    let point = state.clamp_point(point);
    let selection = if extend {
        Selection::new(state.selection().anchor.clone(), point)
    } else {
        Selection::collapsed(point)
    };
    state.with_selection(selection)
}

pub fn move_left(state: &EditorState, extend: bool) -> EditorState {
    if !extend && !state.selection().is_collapsed() {
        let start = state.selection_range().start;
        return move_to(state, &start, false);
    }
    let focus = &state.selection().focus;
    let target = if focus.offset > 0 {
        Some(Point::new(focus.key.clone(), focus.offset - 1))
    } else {
        previous_block_end(state, focus)
    };
    match target {
        Some(point) => move_to(state, &point, extend),
        None => state.clone(),
    }
}

pub fn move_right(state: &EditorState, extend: bool) -> EditorState {
    if !extend && !state.selection().is_collapsed() {
        let end = state.selection_range().end;
        return move_to(state, &end, false);
    }
    let focus = &state.selection().focus;
    let len = state.block_for_key(&focus.key).map_or(0, |block| block.len());
    let target = if focus.offset < len {
        Some(Point::new(focus.key.clone(), focus.offset + 1))
    } else {
        next_block_start(state, focus)
    };
    match target {
        Some(point) => move_to(state, &point, extend),
        None => state.clone(),
    }
}

pub fn move_word_left(state: &EditorState, extend: bool) -> EditorState {
    let focus = &state.selection().focus;
    let Some(block) = state.block_for_key(&focus.key) else {
        return state.clone();
    };
    if focus.offset == 0 {
        return move_left(state, extend);
    }
    let offset = previous_word_boundary(block.text(), focus.offset);
    move_to(state, &Point::new(focus.key.clone(), offset), extend)
}

pub fn move_word_right(state: &EditorState, extend: bool) -> EditorState {
    let focus = &state.selection().focus;
    let Some(block) = state.block_for_key(&focus.key) else {
        return state.clone();
    };
    if focus.offset >= block.len() {
        return move_right(state, extend);
    }
    let offset = next_word_boundary(block.text(), focus.offset);
    move_to(state, &Point::new(focus.key.clone(), offset), extend)
}

pub fn move_to_block_start(state: &EditorState, extend: bool) -> EditorState {
    let key = state.selection().focus.key.clone();
    move_to(state, &Point::new(key, 0), extend)
}

pub fn move_to_block_end(state: &EditorState, extend: bool) -> EditorState {
    let focus = &state.selection().focus;
    let len = state.block_for_key(&focus.key).map_or(0, |block| block.len());
    move_to(state, &Point::new(focus.key.clone(), len), extend)
}

pub fn move_to_document_start(state: &EditorState, extend: bool) -> EditorState {
    let first = state.blocks()[0].key().clone();
    move_to(state, &Point::new(first, 0), extend)
}

pub fn move_to_document_end(state: &EditorState, extend: bool) -> EditorState {
    let Some(last) = state.blocks().last() else {
        return state.clone();
    };
    move_to(state, &Point::new(last.key().clone(), last.len()), extend)
}

fn previous_block_end(state: &EditorState, point: &Point) -> Option<Point> {
    let idx = state.block_index(&point.key)?;
    let previous = state.blocks().get(idx.checked_sub(1)?)?;
    Some(Point::new(previous.key().clone(), previous.len()))
}

fn next_block_start(state: &EditorState, point: &Point) -> Option<Point> {
    let idx = state.block_index(&point.key)?;
    let following = state.blocks().get(idx + 1)?;
    Some(Point::new(following.key().clone(), 0))
}

#[cfg(test)]
#[path = "cursor_tests.rs"]
mod cursor_tests;
