//! Raw JSON interchange for documents.
//!
//! The layout follows the familiar draft "raw content" shape: a list of
//! blocks with their text, type and inline style ranges, plus an (unused)
//! entity map. Offsets and lengths count characters. Documents carry a
//! `version` tag; a missing tag reads as version 1.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::{Block, BlockKey, BlockType, EditorState, InlineStyle, StyleSet};

pub const RAW_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum RawError {
    #[error("malformed document JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported document version {found} (newest supported is {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("document has no blocks")]
    NoBlocks,
    #[error("block {index} has an empty key")]
    EmptyKey { index: usize },
    #[error("duplicate block key {0:?}")]
    DuplicateKey(String),
    #[error(
        "style range {offset}+{length} exceeds the {len} characters of block {key:?}"
    )]
    StyleRangeOutOfBounds {
        key: String,
        offset: usize,
        length: usize,
        len: usize,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    pub blocks: Vec<RawBlock>,
    #[serde(default)]
    pub entity_map: Map<String, Value>,
}

fn default_version() -> u32 {
    1
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBlock {
    pub key: String,
    pub text: String,
    #[serde(rename = "type", default)]
    pub kind: BlockType,
    #[serde(default)]
    pub depth: u32,
    #[serde(default)]
    pub inline_style_ranges: Vec<RawStyleRange>,
    #[serde(default)]
    pub entity_ranges: Vec<Value>,
    #[serde(default)]
    pub data: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStyleRange {
    pub offset: usize,
    pub length: usize,
    pub style: InlineStyle,
}

pub fn convert_to_raw(state: &EditorState) -> RawDocument {
    RawDocument {
        version: RAW_FORMAT_VERSION,
        blocks: state.blocks().iter().map(block_to_raw).collect(),
        entity_map: Map::new(),
    }
}

fn block_to_raw(block: &Block) -> RawBlock {
    let mut ranges = Vec::new();
    for style in InlineStyle::ALL {
        let mut run_start: Option<usize> = None;
        for (idx, set) in block.styles().iter().enumerate() {
            match (set.contains(style), run_start) {
                (true, None) => run_start = Some(idx),
                (false, Some(start)) => {
                    ranges.push(RawStyleRange {
                        offset: start,
                        length: idx - start,
                        style,
                    });
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            ranges.push(RawStyleRange {
                offset: start,
                length: block.len() - start,
                style,
            });
        }
    }
    ranges.sort_by_key(|range| (range.offset, range.style));

    RawBlock {
        key: block.key().as_str().to_string(),
        text: block.text().to_string(),
        kind: block.kind(),
        depth: 0,
        inline_style_ranges: ranges,
        entity_ranges: Vec::new(),
        data: Map::new(),
    }
}

/// Validates a raw document and builds editor state from it. The caret is
/// placed at the start of the first block.
pub fn convert_from_raw(raw: RawDocument) -> Result<EditorState, RawError> {
    if raw.version > RAW_FORMAT_VERSION {
        return Err(RawError::UnsupportedVersion {
            found: raw.version,
            supported: RAW_FORMAT_VERSION,
        });
    }
    if raw.blocks.is_empty() {
        return Err(RawError::NoBlocks);
    }

    let mut seen = HashSet::new();
    let mut blocks = Vec::with_capacity(raw.blocks.len());
    for (index, raw_block) in raw.blocks.into_iter().enumerate() {
        if raw_block.key.is_empty() {
            return Err(RawError::EmptyKey { index });
        }
        if !seen.insert(raw_block.key.clone()) {
            return Err(RawError::DuplicateKey(raw_block.key));
        }
        blocks.push(block_from_raw(raw_block)?);
    }
    Ok(EditorState::from_blocks(blocks))
}

fn block_from_raw(raw: RawBlock) -> Result<Block, RawError> {
    let len = raw.text.chars().count();
    let mut styles = vec![StyleSet::empty(); len];
    for range in &raw.inline_style_ranges {
        let end = range.offset.checked_add(range.length);
        match end {
            Some(end) if end <= len => {
                for set in &mut styles[range.offset..end] {
                    *set = set.with(range.style);
                }
            }
            _ => {
                return Err(RawError::StyleRangeOutOfBounds {
                    key: raw.key.clone(),
                    offset: range.offset,
                    length: range.length,
                    len,
                });
            }
        }
    }
    Block::with_styles(BlockKey::new(raw.key.clone()), raw.kind, raw.text, styles).ok_or(
        RawError::StyleRangeOutOfBounds {
            key: raw.key,
            offset: 0,
            length: 0,
            len,
        },
    )
}

pub fn to_json(state: &EditorState) -> Result<String, RawError> {
    Ok(serde_json::to_string(&convert_to_raw(state))?)
}

pub fn from_json(json: &str) -> Result<EditorState, RawError> {
    let raw: RawDocument = serde_json::from_str(json)?;
    convert_from_raw(raw)
}
