//! Errors for sequence loading and evaluation.

use thiserror::Error;
use vizij_api_core::{PathError, ValueKind};

use crate::blend_type::BlendType;
use crate::ids::SequenceId;

#[derive(Debug, Error)]
pub enum SequencerError {
    #[error("unknown sequence {0:?}")]
    UnknownSequence(SequenceId),
    #[error("section range {start}..{end} ends before it starts")]
    InvalidSectionRange { start: f32, end: f32 },
    #[error("track '{track}' animates {expected:?} but section holds {found:?} data")]
    SectionKindMismatch {
        track: String,
        expected: ValueKind,
        found: ValueKind,
    },
    #[error("track '{track}' does not support {blend_type:?} blending")]
    UnsupportedBlendType { track: String, blend_type: BlendType },
    #[error("track '{track}': {source}")]
    InvalidProperty {
        track: String,
        #[source]
        source: PathError,
    },
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
