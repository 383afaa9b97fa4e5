use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use log::{debug, error, info, warn};
use thiserror::Error;

use crate::document::{
    EditorState, InlineStyle, Point, Range,
    commands::{self, KeyCommand},
    cursor,
    raw::{self, RawError},
    transform,
};
use crate::shortcut::{Sequence, ShortcutDetector, ShortcutStyle};
use crate::store::{KeyValueStore, StoreError};

mod keys;
mod notification;

pub use keys::{KeyBinding, Motion, default_key_binding, shortcut_key};
pub use notification::Notification;

/// Store key the draft is saved under.
pub const DRAFT_KEY: &str = "draft";

/// Store key an unreadable draft is copied to before anything can
/// overwrite it.
pub const DRAFT_BACKUP_KEY: &str = "draft-backup";

/// Inline styles stripped at the caret before a shortcut is applied, so that
/// consecutive shortcuts do not pile styles on top of each other.
const CLEARED_STYLES: [InlineStyle; 3] = [
    InlineStyle::Bold,
    InlineStyle::Underline,
    InlineStyle::Code,
];

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Raw(#[from] RawError),
}

/// Reason a stored draft could not be restored. Never fatal: the editor
/// starts from an empty document instead.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read stored draft: {0}")]
    Store(#[from] StoreError),
    #[error("stored draft is invalid: {0}")]
    Invalid(#[from] RawError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    Handled,
    NotHandled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    NotHandled,
    /// Vertical movement depends on the wrapped layout, which only the
    /// surface drawing the document knows.
    Vertical {
        delta: i32,
        extend: bool,
    },
    Quit,
}

pub fn load_state<S: KeyValueStore>(store: &S) -> Result<Option<EditorState>, LoadError> {
    match store.get(DRAFT_KEY)? {
        Some(json) => Ok(Some(raw::from_json(&json)?)),
        None => Ok(None),
    }
}

/// Turns a completed trigger sequence into formatting: strips the trigger
/// characters before the caret and applies the mapped block or inline style.
/// Returns `None` (document unchanged) when the sequence has no mapping or
/// the trigger text is not in the block.
pub fn apply_shortcut(state: &EditorState, sequence: Sequence) -> Option<EditorState> {
    let style = sequence.style()?;
    let trigger = sequence.trigger();

    let cleared = clear_inline_styles(state);
    let end = cleared.selection_range().end;
    let block = cleared.block_for_key(&end.key)?;
    if !block.text().contains(trigger) {
        return None;
    }
    let start = end.offset.checked_sub(trigger.chars().count())?;
    let range = Range {
        start: Point::new(end.key.clone(), start),
        end,
    };
    let stripped = transform::remove_range(&cleared, &range);

    Some(match style {
        ShortcutStyle::Block(kind) => transform::toggle_block_type(&stripped, kind),
        ShortcutStyle::Inline(inline) => transform::toggle_inline_style(&stripped, inline),
    })
}

fn clear_inline_styles(state: &EditorState) -> EditorState {
    let range = state.selection_range();
    if range.is_collapsed() {
        let current = transform::current_inline_style(state);
        let cleared = CLEARED_STYLES
            .iter()
            .fold(current, |set, style| set.without(*style));
        let mut next = state.clone();
        next.set_inline_override(Some(cleared));
        return next;
    }
    CLEARED_STYLES.iter().fold(state.clone(), |acc, style| {
        transform::remove_inline_style(&acc, &range, *style)
    })
}

fn back_up_unreadable_draft<S: KeyValueStore>(store: &mut S) {
    let json = match store.get(DRAFT_KEY) {
        Ok(Some(json)) => json,
        Ok(None) => return,
        Err(err) => {
            error!("Could not re-read unreadable draft for backup: {err}");
            return;
        }
    };
    match store.set(DRAFT_BACKUP_KEY, &json) {
        Ok(()) => warn!("Kept a copy of the unreadable draft under {DRAFT_BACKUP_KEY:?}"),
        Err(err) => error!("Could not back up unreadable draft: {err}"),
    }
}

/// Owns the canonical document and everything around it: shortcut
/// detection, persistence and the saved toast.
pub struct NoteEditor<S: KeyValueStore> {
    state: EditorState,
    detector: ShortcutDetector,
    notification: Notification,
    store: S,
    dirty: bool,
}

impl<S: KeyValueStore> NoteEditor<S> {
    pub fn new(state: EditorState, store: S, toast_timeout: Duration) -> Self {
        Self {
            state,
            detector: ShortcutDetector::new(),
            notification: Notification::new(toast_timeout),
            store,
            dirty: false,
        }
    }

    /// Restores the draft from `store`. Missing drafts start empty; broken
    /// ones start empty too, are copied to [`DRAFT_BACKUP_KEY`] and hand back
    /// the reason as a warning.
    pub fn open(mut store: S, toast_timeout: Duration) -> (Self, Option<LoadError>) {
        let (state, warning) = match load_state(&store) {
            Ok(Some(state)) => {
                debug!("Restored draft with {} blocks", state.blocks().len());
                (state, None)
            }
            Ok(None) => {
                debug!("No stored draft, starting with an empty document");
                (EditorState::new(), None)
            }
            Err(err) => {
                warn!("{err}; starting with an empty document");
                if matches!(err, LoadError::Invalid(_)) {
                    back_up_unreadable_draft(&mut store);
                }
                (EditorState::new(), Some(err))
            }
        };
        (Self::new(state, store, toast_timeout), warning)
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sequence(&self) -> Sequence {
        self.detector.sequence()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn notification(&self) -> &Notification {
        &self.notification
    }

    /// Adopts a new document value unconditionally.
    pub fn on_change(&mut self, next: EditorState) {
        if !next.content_eq(&self.state) {
            self.dirty = true;
        }
        self.state = next;
    }

    pub fn handle_key_command(&mut self, command: KeyCommand) -> CommandOutcome {
        match commands::handle_key_command(&self.state, command) {
            Some(next) => {
                self.on_change(next);
                CommandOutcome::Handled
            }
            None => CommandOutcome::NotHandled,
        }
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> Result<KeyOutcome, EditorError> {
        if event.kind != KeyEventKind::Press || matches!(event.code, KeyCode::Modifier(_)) {
            return Ok(KeyOutcome::NotHandled);
        }

        // A typed character replaces any selection and lands at its start.
        let offset = self.state.selection_range().start.offset;
        if let Some(sequence) = self.detector.observe(shortcut_key(event), offset) {
            if let Some(next) = apply_shortcut(&self.state, sequence) {
                debug!("Applied {:?} shortcut", sequence.trigger());
                self.on_change(next);
                return Ok(KeyOutcome::Handled);
            }
        }

        let outcome = match default_key_binding(event) {
            KeyBinding::Command(command) => match self.handle_key_command(command) {
                CommandOutcome::Handled => KeyOutcome::Handled,
                CommandOutcome::NotHandled => KeyOutcome::NotHandled,
            },
            KeyBinding::Insert(ch) => {
                let mut buffer = [0u8; 4];
                let next = transform::insert_text(&self.state, ch.encode_utf8(&mut buffer));
                self.on_change(next);
                KeyOutcome::Handled
            }
            KeyBinding::Move { motion, extend } => self.apply_motion(motion, extend),
            KeyBinding::Save => {
                self.save()?;
                KeyOutcome::Handled
            }
            KeyBinding::Dismiss => {
                if self.notification.is_visible() {
                    self.dismiss_notification();
                    KeyOutcome::Handled
                } else {
                    KeyOutcome::NotHandled
                }
            }
            KeyBinding::Quit => KeyOutcome::Quit,
            KeyBinding::Unbound => KeyOutcome::NotHandled,
        };
        Ok(outcome)
    }

    fn apply_motion(&mut self, motion: Motion, extend: bool) -> KeyOutcome {
        let state = &self.state;
        let next = match motion {
            Motion::Up => return KeyOutcome::Vertical { delta: -1, extend },
            Motion::Down => return KeyOutcome::Vertical { delta: 1, extend },
            Motion::Left => cursor::move_left(state, extend),
            Motion::Right => cursor::move_right(state, extend),
            Motion::WordLeft => cursor::move_word_left(state, extend),
            Motion::WordRight => cursor::move_word_right(state, extend),
            Motion::LineStart => cursor::move_to_block_start(state, extend),
            Motion::LineEnd => cursor::move_to_block_end(state, extend),
            Motion::DocumentStart => cursor::move_to_document_start(state, extend),
            Motion::DocumentEnd => cursor::move_to_document_end(state, extend),
        };
        self.on_change(next);
        KeyOutcome::Handled
    }

    pub fn move_to(&mut self, point: &Point, extend: bool) {
        let next = cursor::move_to(&self.state, point, extend);
        self.on_change(next);
    }

    /// Serializes the document to the store and raises the saved toast.
    pub fn save(&mut self) -> Result<(), EditorError> {
        self.save_at(Instant::now())
    }

    pub fn save_at(&mut self, now: Instant) -> Result<(), EditorError> {
        let json = raw::to_json(&self.state)?;
        self.store.set(DRAFT_KEY, &json)?;
        self.dirty = false;
        self.notification.show(now);
        info!(
            "Saved draft ({} blocks, {} bytes)",
            self.state.blocks().len(),
            json.len()
        );
        Ok(())
    }

    pub fn dismiss_notification(&mut self) {
        self.notification.dismiss();
    }

    /// Auto-hides the toast once its timeout has passed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.notification.tick(now)
    }
}

#[cfg(test)]
#[path = "editor_tests.rs"]
mod editor_tests;
