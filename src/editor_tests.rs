use super::*;
use crate::document::{Block, BlockKey, BlockType, Selection, StyleSet};
use crate::store::MemoryStore;
use crossterm::event::KeyModifiers;
use std::{io, path::PathBuf};

const TOAST: Duration = Duration::from_secs(4);

fn editor() -> NoteEditor<MemoryStore> {
    NoteEditor::new(EditorState::new(), MemoryStore::new(), TOAST)
}

fn press(editor: &mut NoteEditor<MemoryStore>, code: KeyCode) -> KeyOutcome {
    editor
        .handle_key(&KeyEvent::new(code, KeyModifiers::NONE))
        .expect("key handled")
}

fn select(editor: &mut NoteEditor<MemoryStore>, code: KeyCode) {
    editor
        .handle_key(&KeyEvent::new(code, KeyModifiers::SHIFT))
        .expect("selection extended");
}

fn editor_with(text: &str) -> NoteEditor<MemoryStore> {
    let state = EditorState::from_blocks(vec![Block::new(
        BlockKey::new("a"),
        BlockType::Unstyled,
        text,
    )]);
    NoteEditor::new(state, MemoryStore::new(), TOAST)
}

fn type_text(editor: &mut NoteEditor<MemoryStore>, text: &str) {
    for ch in text.chars() {
        press(editor, KeyCode::Char(ch));
    }
}

fn first_block(editor: &NoteEditor<MemoryStore>) -> &Block {
    &editor.state().blocks()[0]
}

#[test]
fn hash_space_turns_empty_block_into_header() {
    let mut editor = editor();
    type_text(&mut editor, "# ");
    assert_eq!(first_block(&editor).kind(), BlockType::HeaderOne);
    assert_eq!(first_block(&editor).text(), "");

    type_text(&mut editor, "Groceries");
    assert_eq!(first_block(&editor).text(), "Groceries");
    assert_eq!(first_block(&editor).kind(), BlockType::HeaderOne);
}

#[test]
fn hash_mid_line_never_triggers() {
    let mut editor = editor();
    type_text(&mut editor, "a# ");
    assert_eq!(first_block(&editor).text(), "a# ");
    assert_eq!(first_block(&editor).kind(), BlockType::Unstyled);
}

#[test]
fn double_star_space_bolds_following_text() {
    let mut editor = editor();
    type_text(&mut editor, "** bold");
    let block = first_block(&editor);
    assert_eq!(block.text(), "bold");
    assert!(
        block
            .styles()
            .iter()
            .all(|set| *set == StyleSet::empty().with(InlineStyle::Bold))
    );
}

#[test]
fn single_star_space_bolds() {
    let mut editor = editor();
    type_text(&mut editor, "* x");
    assert_eq!(first_block(&editor).text(), "x");
    assert_eq!(
        first_block(&editor).style_at(0),
        StyleSet::empty().with(InlineStyle::Bold)
    );
}

#[test]
fn triple_star_space_underlines() {
    let mut editor = editor();
    type_text(&mut editor, "*** u");
    assert_eq!(first_block(&editor).text(), "u");
    assert_eq!(
        first_block(&editor).style_at(0),
        StyleSet::empty().with(InlineStyle::Underline)
    );
}

#[test]
fn triple_backtick_space_makes_code_block() {
    let mut editor = editor();
    type_text(&mut editor, "``` ");
    assert_eq!(first_block(&editor).kind(), BlockType::CodeBlock);
    assert_eq!(first_block(&editor).text(), "");
}

#[test]
fn single_backtick_mid_line_starts_inline_code() {
    let mut editor = editor();
    type_text(&mut editor, "run ` ls");
    let block = first_block(&editor);
    assert_eq!(block.text(), "run ls");
    assert!(!block.style_at(3).contains(InlineStyle::Code));
    assert!(block.style_at(4).contains(InlineStyle::Code));
    assert!(block.style_at(5).contains(InlineStyle::Code));
}

#[test]
fn unmapped_double_backtick_inserts_space() {
    let mut editor = editor();
    type_text(&mut editor, "`` ");
    assert_eq!(first_block(&editor).text(), "`` ");
    assert_eq!(editor.sequence(), Sequence::Empty);
}

#[test]
fn keystrokes_without_space_only_insert_text() {
    let mut editor = editor();
    type_text(&mut editor, "**ab");
    let block = first_block(&editor);
    assert_eq!(block.text(), "**ab");
    assert!(block.styles().iter().all(|set| set.is_empty()));
    assert_eq!(block.kind(), BlockType::Unstyled);
}

#[test]
fn pending_sequence_is_tracked_until_space() {
    let mut editor = editor();
    type_text(&mut editor, "**");
    assert_eq!(editor.sequence(), Sequence::Star2);
    type_text(&mut editor, " ");
    assert_eq!(editor.sequence(), Sequence::Empty);
}

#[test]
fn arrow_keys_reset_the_sequence() {
    let mut editor = editor();
    type_text(&mut editor, "*");
    press(&mut editor, KeyCode::Left);
    assert_eq!(editor.sequence(), Sequence::Empty);
}

#[test]
fn hash_typed_over_forward_selection_makes_header() {
    let mut editor = editor_with("abc");
    select(&mut editor, KeyCode::End);
    assert!(!editor.state().selection().is_collapsed());

    type_text(&mut editor, "# Title");
    assert_eq!(first_block(&editor).kind(), BlockType::HeaderOne);
    assert_eq!(first_block(&editor).text(), "Title");
}

#[test]
fn stars_typed_over_backward_selection_bold() {
    let mut editor = editor_with("abc");
    press(&mut editor, KeyCode::End);
    select(&mut editor, KeyCode::Home);
    assert!(editor.state().is_selection_backward());

    type_text(&mut editor, "** x");
    let block = first_block(&editor);
    assert_eq!(block.text(), "x");
    assert_eq!(block.style_at(0), StyleSet::empty().with(InlineStyle::Bold));
}

#[test]
fn backticks_typed_over_selection_make_code_block() {
    let mut editor = editor_with("old code");
    select(&mut editor, KeyCode::End);

    type_text(&mut editor, "``` ");
    assert_eq!(first_block(&editor).kind(), BlockType::CodeBlock);
    assert_eq!(first_block(&editor).text(), "");
}

#[test]
fn backtick_typed_over_mid_line_selection_starts_inline_code() {
    let mut editor = editor_with("run abc");
    editor.move_to(&Point::new(BlockKey::new("a"), 4), false);
    select(&mut editor, KeyCode::End);

    type_text(&mut editor, "` ls");
    let block = first_block(&editor);
    assert_eq!(block.text(), "run ls");
    assert!(!block.style_at(3).contains(InlineStyle::Code));
    assert!(block.style_at(4).contains(InlineStyle::Code));
}

#[test]
fn missing_trigger_text_is_a_no_op() {
    let state = EditorState::from_blocks(vec![Block::new(
        BlockKey::new("a"),
        BlockType::Unstyled,
        "hello",
    )])
    .with_selection(Selection::collapsed(Point::new(BlockKey::new("a"), 5)));
    assert!(apply_shortcut(&state, Sequence::Star2).is_none());
    assert!(apply_shortcut(&state, Sequence::Hash).is_none());
}

#[test]
fn shortcut_clears_compounding_styles_at_caret() {
    let bold_italic = StyleSet::of(&[InlineStyle::Bold, InlineStyle::Italic]);
    let block = Block::with_styles(
        BlockKey::new("a"),
        BlockType::Unstyled,
        "***",
        vec![bold_italic; 3],
    )
    .expect("aligned styles");
    let state = EditorState::from_blocks(vec![block])
        .with_selection(Selection::collapsed(Point::new(BlockKey::new("a"), 3)));

    let next = apply_shortcut(&state, Sequence::Star3).expect("applied");
    assert_eq!(next.blocks()[0].text(), "");
    assert_eq!(
        next.inline_override(),
        Some(StyleSet::of(&[InlineStyle::Italic, InlineStyle::Underline]))
    );
}

#[test]
fn shortcut_on_header_toggles_back_to_text() {
    let mut editor = editor();
    type_text(&mut editor, "# ");
    type_text(&mut editor, "# ");
    assert_eq!(first_block(&editor).kind(), BlockType::Unstyled);
    assert_eq!(first_block(&editor).text(), "");
}

#[test]
fn save_then_reload_round_trips() {
    let mut editor = editor();
    type_text(&mut editor, "# Notes");
    press(&mut editor, KeyCode::Enter);
    type_text(&mut editor, "** milk");
    assert_eq!(editor.state().plain_text(), "Notes\nmilk");
    assert!(editor.is_dirty());

    editor.save().expect("saved");
    assert!(!editor.is_dirty());
    assert!(editor.notification().is_visible());

    let (reopened, warning) = NoteEditor::open(editor.store().clone(), TOAST);
    assert!(warning.is_none());
    assert!(reopened.state().content_eq(editor.state()));
    assert_eq!(reopened.state().blocks()[0].kind(), BlockType::HeaderOne);
    assert_eq!(reopened.state().blocks()[1].text(), "milk");
}

#[test]
fn malformed_draft_falls_back_to_empty_with_warning() {
    let store = MemoryStore::new().with_entry(DRAFT_KEY, "{\"blocks\": [");
    let (editor, warning) = NoteEditor::open(store, TOAST);
    assert!(matches!(warning, Some(LoadError::Invalid(_))));
    assert!(editor.state().is_empty());
    assert!(!editor.is_dirty());
}

#[test]
fn unreadable_draft_is_backed_up_before_next_save() {
    let broken = "{\"blocks\": [";
    let store = MemoryStore::new().with_entry(DRAFT_KEY, broken);
    let (mut editor, warning) = NoteEditor::open(store, TOAST);
    assert!(warning.is_some());
    assert_eq!(
        editor.store().get(DRAFT_BACKUP_KEY).expect("readable").as_deref(),
        Some(broken)
    );

    type_text(&mut editor, "fresh");
    editor.save().expect("saved");
    assert_eq!(
        editor.store().get(DRAFT_BACKUP_KEY).expect("readable").as_deref(),
        Some(broken)
    );
    let (reopened, warning) = NoteEditor::open(editor.store().clone(), TOAST);
    assert!(warning.is_none());
    assert_eq!(reopened.state().plain_text(), "fresh");
}

#[test]
fn missing_draft_leaves_no_backup() {
    let (editor, _) = NoteEditor::open(MemoryStore::new(), TOAST);
    assert_eq!(editor.store().get(DRAFT_BACKUP_KEY).expect("readable"), None);
}

#[test]
fn invalid_shape_falls_back_to_empty_with_warning() {
    let store = MemoryStore::new().with_entry(DRAFT_KEY, "{\"blocks\": []}");
    let (editor, warning) = NoteEditor::open(store, TOAST);
    assert!(matches!(
        warning,
        Some(LoadError::Invalid(RawError::NoBlocks))
    ));
    assert!(editor.state().is_empty());
}

#[test]
fn missing_draft_starts_empty_without_warning() {
    let (editor, warning) = NoteEditor::open(MemoryStore::new(), TOAST);
    assert!(warning.is_none());
    assert!(editor.state().is_empty());
}

#[test]
fn dismissing_notification_leaves_document_alone() {
    let mut editor = editor();
    type_text(&mut editor, "keep me");
    let start = Instant::now();
    editor.save_at(start).expect("saved");
    let before = editor.state().clone();

    assert_eq!(press(&mut editor, KeyCode::Esc), KeyOutcome::Handled);
    assert!(!editor.notification().is_visible());
    assert_eq!(editor.state(), &before);

    editor.save_at(start).expect("saved again");
    assert!(editor.tick(start + TOAST + Duration::from_millis(1)));
    assert!(!editor.notification().is_visible());
    assert_eq!(editor.state(), &before);
}

#[test]
fn escape_without_toast_is_not_handled() {
    let mut editor = editor();
    assert_eq!(press(&mut editor, KeyCode::Esc), KeyOutcome::NotHandled);
}

#[test]
fn key_command_falls_back_when_nothing_to_do() {
    let mut editor = editor();
    assert_eq!(
        editor.handle_key_command(KeyCommand::Backspace),
        CommandOutcome::NotHandled
    );
    type_text(&mut editor, "ab");
    assert_eq!(
        editor.handle_key_command(KeyCommand::Backspace),
        CommandOutcome::Handled
    );
    assert_eq!(first_block(&editor).text(), "a");
}

#[test]
fn control_b_toggles_bold_for_next_characters() {
    let mut editor = editor();
    editor
        .handle_key(&KeyEvent::new(KeyCode::Char('b'), KeyModifiers::CONTROL))
        .expect("handled");
    type_text(&mut editor, "hi");
    assert!(first_block(&editor).style_at(1).contains(InlineStyle::Bold));
}

#[test]
fn vertical_motion_is_delegated() {
    let mut editor = editor();
    assert_eq!(
        press(&mut editor, KeyCode::Down),
        KeyOutcome::Vertical {
            delta: 1,
            extend: false
        }
    );
}

#[test]
fn cursor_movement_does_not_mark_dirty() {
    let state = EditorState::from_blocks(vec![Block::new(
        BlockKey::new("a"),
        BlockType::Unstyled,
        "text",
    )]);
    let mut editor = NoteEditor::new(state, MemoryStore::new(), TOAST);
    press(&mut editor, KeyCode::End);
    assert_eq!(editor.state().selection().focus.offset, 4);
    assert!(!editor.is_dirty());
}

#[test]
fn release_events_are_ignored() {
    let mut editor = editor();
    let mut event = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
    event.kind = KeyEventKind::Release;
    assert_eq!(
        editor.handle_key(&event).expect("ignored"),
        KeyOutcome::NotHandled
    );
    assert!(editor.state().is_empty());
}

struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    fn set(&mut self, key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Write {
            path: PathBuf::from(key),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
        })
    }
}

#[test]
fn failed_save_keeps_dirty_flag_and_hides_toast() {
    let mut editor = NoteEditor::new(EditorState::new(), FailingStore, TOAST);
    editor.on_change(transform::insert_text(editor.state(), "x"));
    assert!(matches!(editor.save(), Err(EditorError::Store(_))));
    assert!(editor.is_dirty());
    assert!(!editor.notification().is_visible());
}
