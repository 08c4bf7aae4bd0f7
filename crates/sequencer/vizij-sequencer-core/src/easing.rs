//! Section ease-in / ease-out weighting.

use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

use crate::curve::RichCurve;

/// Closed set of built-in easing shapes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltInEasing {
    Linear,
    SinIn,
    SinOut,
    #[default]
    SinInOut,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    QuartIn,
    QuartOut,
    QuartInOut,
    QuintIn,
    QuintOut,
    QuintInOut,
    ExpoIn,
    ExpoOut,
    ExpoInOut,
    CircIn,
    CircOut,
    CircInOut,
}

#[derive(Copy, Clone)]
enum Family {
    Sin,
    Pow(i32),
    Expo,
    Circ,
}

impl Family {
    fn ease_in(self, t: f32) -> f32 {
        match self {
            Family::Sin => 1.0 - Family::Sin.ease_out(1.0 - t),
            Family::Pow(p) => t.powi(p),
            Family::Expo => {
                if t == 0.0 {
                    0.0
                } else {
                    2f32.powf(10.0 * (t - 1.0))
                }
            }
            Family::Circ => 1.0 - (1.0 - t * t).max(0.0).sqrt(),
        }
    }

    fn ease_out(self, t: f32) -> f32 {
        match self {
            Family::Sin => (FRAC_PI_2 * t).sin(),
            other => 1.0 - other.ease_in(1.0 - t),
        }
    }

    fn ease_in_out(self, t: f32) -> f32 {
        if t < 0.5 {
            self.ease_in(t * 2.0) * 0.5
        } else {
            self.ease_out(t * 2.0 - 1.0) * 0.5 + 0.5
        }
    }
}

impl BuiltInEasing {
    /// Map `t` in [0, 1] through the easing shape.
    pub fn evaluate(self, t: f32) -> f32 {
        use BuiltInEasing::*;
        let (family, shape) = match self {
            Linear => return t,
            SinIn => (Family::Sin, 0),
            SinOut => (Family::Sin, 1),
            SinInOut => (Family::Sin, 2),
            QuadIn => (Family::Pow(2), 0),
            QuadOut => (Family::Pow(2), 1),
            QuadInOut => (Family::Pow(2), 2),
            CubicIn => (Family::Pow(3), 0),
            CubicOut => (Family::Pow(3), 1),
            CubicInOut => (Family::Pow(3), 2),
            QuartIn => (Family::Pow(4), 0),
            QuartOut => (Family::Pow(4), 1),
            QuartInOut => (Family::Pow(4), 2),
            QuintIn => (Family::Pow(5), 0),
            QuintOut => (Family::Pow(5), 1),
            QuintInOut => (Family::Pow(5), 2),
            ExpoIn => (Family::Expo, 0),
            ExpoOut => (Family::Expo, 1),
            ExpoInOut => (Family::Expo, 2),
            CircIn => (Family::Circ, 0),
            CircOut => (Family::Circ, 1),
            CircInOut => (Family::Circ, 2),
        };
        match shape {
            0 => family.ease_in(t),
            1 => family.ease_out(t),
            _ => family.ease_in_out(t),
        }
    }
}

/// Easing applied over an ease window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingFunction {
    BuiltIn(BuiltInEasing),
    /// User curve sampled over [0, 1].
    Curve(RichCurve),
}

impl Default for EasingFunction {
    fn default() -> Self {
        EasingFunction::BuiltIn(BuiltInEasing::default())
    }
}

impl EasingFunction {
    pub fn evaluate(&self, t: f32) -> f32 {
        match self {
            EasingFunction::BuiltIn(e) => e.evaluate(t),
            EasingFunction::Curve(curve) => curve.eval(t.clamp(0.0, 1.0), 0.0),
        }
    }
}

/// Per-section easing configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EasingSettings {
    /// Derived from overlapping sections by `PropertyTrack::update_easing`.
    pub auto_ease_in_time: f32,
    pub auto_ease_out_time: f32,
    pub manual_ease_in: Option<f32>,
    pub manual_ease_out: Option<f32>,
    pub ease_in: EasingFunction,
    pub ease_out: EasingFunction,
}

impl EasingSettings {
    pub fn ease_in_duration(&self) -> f32 {
        self.manual_ease_in.unwrap_or(self.auto_ease_in_time)
    }

    pub fn ease_out_duration(&self) -> f32 {
        self.manual_ease_out.unwrap_or(self.auto_ease_out_time)
    }

    /// Weight at `time` for a section spanning `[start, end]`; `None` bounds
    /// are infinite.
    pub fn evaluate(&self, start: Option<f32>, end: Option<f32>, time: f32) -> f32 {
        if let (Some(s), Some(e)) = (start, end) {
            if e <= s {
                return 1.0;
            }
        }

        let mut ease_in_value = 1.0;
        let ease_in = self.ease_in_duration();
        if let Some(start) = start.filter(|_| ease_in > 0.0) {
            let interp = (time - start) / ease_in;
            ease_in_value = if interp <= 0.0 {
                0.0
            } else if interp >= 1.0 {
                1.0
            } else {
                self.ease_in.evaluate(interp)
            };
        }

        let mut ease_out_value = 1.0;
        let ease_out = self.ease_out_duration();
        if let Some(end) = end.filter(|_| ease_out > 0.0) {
            let interp = (time - (end - ease_out)) / ease_out;
            ease_out_value = if interp <= 0.0 {
                1.0
            } else if interp >= 1.0 {
                0.0
            } else {
                1.0 - self.ease_out.evaluate(interp)
            };
        }

        ease_in_value * ease_out_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32, eps: f32) {
        assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
    }

    #[test]
    fn builtins_hit_endpoints() {
        use BuiltInEasing::*;
        for e in [
            Linear, SinIn, SinOut, SinInOut, QuadIn, QuadOut, QuadInOut, CubicIn, CubicOut,
            CubicInOut, QuartIn, QuartOut, QuartInOut, QuintIn, QuintOut, QuintInOut, ExpoOut,
            ExpoInOut, CircIn, CircOut, CircInOut,
        ] {
            approx(e.evaluate(0.0), 0.0, 1e-3);
            approx(e.evaluate(1.0), 1.0, 1e-5);
        }
        assert_eq!(ExpoIn.evaluate(0.0), 0.0);
        approx(ExpoIn.evaluate(1.0), 1.0, 1e-6);
    }

    #[test]
    fn in_out_is_symmetric() {
        approx(BuiltInEasing::QuadInOut.evaluate(0.25), 0.125, 1e-6);
        approx(BuiltInEasing::QuadInOut.evaluate(0.75), 0.875, 1e-6);
        approx(BuiltInEasing::SinInOut.evaluate(0.5), 0.5, 1e-6);
        approx(BuiltInEasing::CubicIn.evaluate(0.5), 0.125, 1e-6);
        approx(BuiltInEasing::CubicOut.evaluate(0.5), 0.875, 1e-6);
    }

    #[test]
    fn curve_easing_clamps_input() {
        let f = EasingFunction::Curve(RichCurve::linear(&[(0.0, 0.0), (1.0, 2.0)]));
        approx(f.evaluate(0.5), 1.0, 1e-6);
        approx(f.evaluate(3.0), 2.0, 1e-6);
    }

    #[test]
    fn window_weights() {
        let settings = EasingSettings {
            manual_ease_in: Some(2.0),
            manual_ease_out: Some(2.0),
            ease_in: EasingFunction::BuiltIn(BuiltInEasing::Linear),
            ease_out: EasingFunction::BuiltIn(BuiltInEasing::Linear),
            ..Default::default()
        };
        let (s, e) = (Some(0.0), Some(10.0));
        assert_eq!(settings.evaluate(s, e, 0.0), 0.0);
        approx(settings.evaluate(s, e, 1.0), 0.5, 1e-6);
        assert_eq!(settings.evaluate(s, e, 5.0), 1.0);
        approx(settings.evaluate(s, e, 9.0), 0.5, 1e-6);
        assert_eq!(settings.evaluate(s, e, 10.0), 0.0);
        // Infinite and degenerate ranges never ease.
        assert_eq!(settings.evaluate(None, None, 0.0), 1.0);
        assert_eq!(settings.evaluate(Some(3.0), Some(3.0), 3.0), 1.0);
    }

    #[test]
    fn manual_overrides_auto() {
        let settings = EasingSettings {
            auto_ease_in_time: 4.0,
            manual_ease_in: Some(1.0),
            ..Default::default()
        };
        assert_eq!(settings.ease_in_duration(), 1.0);
        assert_eq!(settings.ease_out_duration(), 0.0);
    }
}
