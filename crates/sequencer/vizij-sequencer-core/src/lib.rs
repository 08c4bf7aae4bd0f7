//! Vizij Sequencer Core (engine-agnostic)
//!
//! Keyed curves, section easing and multi-channel blending for sequences of
//! property animations. An [`Engine`] evaluates a loaded [`Sequence`] at a
//! time: every contributing section samples its curves, weights the result by
//! its easing and blends it into an accumulator cell per property; the cells
//! are then resolved into a `WriteBatch` for the host to apply.

pub mod accumulate;
pub mod binding;
pub mod blend_type;
pub mod blendable;
pub mod channels;
pub mod config;
pub mod curve;
pub mod easing;
pub mod engine;
pub mod error;
pub mod ids;
pub mod section;
pub mod sequence;
pub mod store;
pub mod template;
pub mod track;

// Re-exports for consumers (adapters)
pub use accumulate::{Accumulator, BlendableToken, ChannelValues};
pub use binding::{BindingResolver, Operand, PropertyValueSource, StaticBindings};
pub use blend_type::{BlendType, BlendTypeField};
pub use blendable::{MaskedBlendable, PropertyChannels};
pub use channels::{ChannelScalar, MultiChannelValue};
pub use config::Config;
pub use curve::{
    Extrapolation, InterpMode, KeyHandle, RichCurve, RichCurveKey, StepCurve, TangentMode,
    TangentWeightMode,
};
pub use easing::{BuiltInEasing, EasingFunction, EasingSettings};
pub use engine::Engine;
pub use error::SequencerError;
pub use ids::{BindingId, SequenceId};
pub use section::{Section, SectionData, TransformMask};
pub use sequence::{parse_sequence_json, ObjectBinding, Sequence};
pub use store::PropertyStore;
pub use template::{EvaluationContext, PropertyTemplate, SectionTemplate};
pub use track::PropertyTrack;
pub use vizij_api_core::{TypedPath, Value, ValueKind, WriteBatch, WriteOp};
