//! Keyed curves sampled by section templates.

pub mod interp;
pub mod rich;
pub mod step;

pub use rich::{
    Extrapolation, InterpMode, KeyHandle, RichCurve, RichCurveKey, TangentMode,
    TangentWeightMode, KEY_TIME_TOLERANCE, UNSET_DEFAULT_VALUE,
};
pub use step::{StepCurve, StepKey};
