//! Core configuration for vizij-sequencer-core.

use serde::{Deserialize, Serialize};

use crate::blend_type::BlendType;

/// Engine-wide evaluation settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tension applied when auto tangents are recomputed at compile time.
    pub auto_tangent_tension: f32,

    /// Blend type of sections that do not name one.
    pub default_blend_type: BlendType,

    /// Log a warning when a binding resolves to no objects.
    pub warn_on_unresolved_bindings: bool,

    /// Initial capacity hint for the per-evaluation accumulator.
    pub scratch_paths: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_tangent_tension: 0.0,
            default_blend_type: BlendType::Absolute,
            warn_on_unresolved_bindings: true,
            scratch_paths: 64,
        }
    }
}
