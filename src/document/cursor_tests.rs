use super::*;
use crate::document::{Block, BlockKey, BlockType};

fn two_blocks() -> EditorState {
    EditorState::from_blocks(vec![
        Block::new(BlockKey::new("a"), BlockType::Unstyled, "alpha"),
        Block::new(BlockKey::new("b"), BlockType::Unstyled, "beta gamma"),
    ])
}

fn at(name: &str, offset: usize) -> Point {
    Point::new(BlockKey::new(name), offset)
}

#[test]
fn move_right_crosses_block_boundary() {
    let state = move_to(&two_blocks(), &at("a", 5), false);
    let next = move_right(&state, false);
    assert_eq!(next.selection().focus, at("b", 0));
}

#[test]
fn move_left_at_document_start_stays() {
    let state = two_blocks();
    let next = move_left(&state, false);
    assert_eq!(next.selection().focus, at("a", 0));
}

#[test]
fn move_left_collapses_range_to_start() {
    let state = move_to(&two_blocks(), &at("a", 1), false);
    let extended = move_to(&state, &at("b", 3), true);
    assert!(!extended.selection().is_collapsed());
    let collapsed = move_left(&extended, false);
    assert_eq!(collapsed.selection(), &Selection::collapsed(at("a", 1)));
}

#[test]
fn shift_movement_extends_selection() {
    let state = move_to(&two_blocks(), &at("b", 0), false);
    let next = move_left(&move_left(&state, true), true);
    assert_eq!(next.selection().anchor, at("b", 0));
    assert_eq!(next.selection().focus, at("a", 4));
    assert!(next.is_selection_backward());
}

#[test]
fn word_movement_within_block() {
    let state = move_to(&two_blocks(), &at("b", 0), false);
    let next = move_word_right(&state, false);
    assert_eq!(next.selection().focus, at("b", 5));
    let back = move_word_left(&next, false);
    assert_eq!(back.selection().focus, at("b", 0));
}

#[test]
fn block_and_document_edges() {
    let state = move_to(&two_blocks(), &at("b", 3), false);
    assert_eq!(move_to_block_start(&state, false).selection().focus, at("b", 0));
    assert_eq!(move_to_block_end(&state, false).selection().focus, at("b", 10));
    assert_eq!(move_to_document_start(&state, false).selection().focus, at("a", 0));
    assert_eq!(move_to_document_end(&state, false).selection().focus, at("b", 10));
}

#[test]
fn move_to_clamps_out_of_range_offsets() {
    let next = move_to(&two_blocks(), &at("a", 99), false);
    assert_eq!(next.selection().focus, at("a", 5));
}
