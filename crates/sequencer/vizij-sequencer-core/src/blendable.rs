//! Masked blendables: per-channel running totals for one property in one
//! evaluation pass, plus the marshalling between property values and channels.
//!
//! Contributions are folded in with [`MaskedBlendable::blend`] in any order and
//! combined once with [`MaskedBlendable::resolve`]:
//! - Absolute: weighted average of every absolute contribution.
//! - Relative: like absolute, but each value is an offset from the initial value.
//! - Additive: weighted sum layered on top of the absolute result (or on the
//!   initial value when nothing absolute touched the channel).
//!
//! Channels nobody touched keep the property's current value.

use vizij_api_core::{Value, ValueKind};

use crate::blend_type::BlendType;
use crate::channels::{ChannelScalar, MultiChannelValue};

#[derive(Clone, Debug)]
pub struct MaskedBlendable<T, const N: usize> {
    absolute_weights: [f32; N],
    absolute: MultiChannelValue<T, N>,
    additive: MultiChannelValue<T, N>,
    initial_value: Option<MultiChannelValue<T, N>>,
}

impl<T: ChannelScalar, const N: usize> Default for MaskedBlendable<T, N> {
    fn default() -> Self {
        Self {
            absolute_weights: [0.0; N],
            absolute: MultiChannelValue::new(),
            additive: MultiChannelValue::new(),
            initial_value: None,
        }
    }
}

impl<T: ChannelScalar, const N: usize> MaskedBlendable<T, N> {
    pub fn new() -> Self {
        Self::default()
    }

    fn initial(&mut self, initial_fn: impl FnOnce() -> [T; N]) -> MultiChannelValue<T, N> {
        *self
            .initial_value
            .get_or_insert_with(|| MultiChannelValue::from_array(initial_fn()))
    }

    /// Fold a single channel contribution.
    pub fn blend_value(
        &mut self,
        channel: usize,
        value: T,
        weight: f32,
        blend_type: BlendType,
        initial_fn: impl FnOnce() -> [T; N],
    ) {
        if channel >= N {
            debug_assert!(false, "channel {channel} out of range for {N} channels");
            return;
        }
        let w = T::from(weight);
        match blend_type {
            BlendType::Absolute => {
                self.absolute.increment(channel, value * w);
                self.absolute_weights[channel] += weight;
            }
            BlendType::Relative => {
                let initial = self.initial(initial_fn);
                self.absolute.increment(channel, (initial.get(channel) + value) * w);
                self.absolute_weights[channel] += weight;
            }
            BlendType::Additive => {
                self.additive.increment(channel, value * w);
            }
        }
    }

    /// Fold every set channel of `value`.
    pub fn blend(
        &mut self,
        value: &MultiChannelValue<T, N>,
        blend_type: BlendType,
        weight: f32,
        initial_fn: impl FnOnce() -> [T; N],
    ) {
        if blend_type == BlendType::Relative && !value.is_empty() {
            self.initial(initial_fn);
        }
        for (channel, v) in value.iter_set() {
            // Any initial value needed below is cached by now.
            self.blend_value(channel, v, weight, blend_type, || [T::default(); N]);
        }
    }

    /// Combine all contributions into a full channel value.
    pub fn resolve(
        &mut self,
        initial_fn: impl FnOnce() -> [T; N],
        current_fn: impl FnOnce() -> [T; N],
    ) -> MultiChannelValue<T, N> {
        let mut initial_fn = Some(initial_fn);
        let mut current_fn = Some(current_fn);
        let mut current: Option<[T; N]> = None;
        let mut result = MultiChannelValue::new();

        for channel in 0..N {
            let has_absolute = self.absolute.is_set(channel);
            let has_additive = self.additive.is_set(channel);
            let weight = self.absolute_weights[channel];

            let use_initial = (has_absolute && weight == 0.0) || (!has_absolute && has_additive);
            if use_initial {
                let initial = self.initial(|| {
                    initial_fn
                        .take()
                        .map(|f| f())
                        .unwrap_or([T::default(); N])
                });
                result.set(channel, initial.get(channel));
            } else if has_absolute {
                result.set(channel, self.absolute.get(channel) / T::from(weight));
            }

            if has_additive {
                result.increment(channel, self.additive.get(channel));
            }

            if !result.is_set(channel) {
                if current.is_none() {
                    current = current_fn.take().map(|f| f());
                }
                result.set(channel, current.map(|c| c[channel]).unwrap_or_default());
            }
        }

        debug_assert!(result.is_full(), "resolved blendable left channels unset");
        result
    }
}

/// Conversion between a property value and its blend channels.
pub trait PropertyChannels<T: ChannelScalar, const N: usize> {
    const KIND: ValueKind;

    /// `None` when `value` is not of [`Self::KIND`].
    fn to_channels(value: &Value) -> Option<[T; N]>;

    fn from_channels(channels: [T; N]) -> Value;

    /// Channels of the kind's neutral value.
    fn neutral() -> [T; N] {
        Self::to_channels(&Value::default_for(Self::KIND)).unwrap_or([T::default(); N])
    }
}

pub struct FloatChannels;
pub struct IntegerChannels;
pub struct Vec2Channels;
pub struct Vec3Channels;
pub struct Vec4Channels;
pub struct ColorChannels;
pub struct MarginChannels;
pub struct TransformChannels;
pub struct WidgetTransformChannels;

impl PropertyChannels<f32, 1> for FloatChannels {
    const KIND: ValueKind = ValueKind::Float;

    fn to_channels(value: &Value) -> Option<[f32; 1]> {
        match value {
            Value::Float(v) => Some([*v]),
            _ => None,
        }
    }

    fn from_channels(c: [f32; 1]) -> Value {
        Value::Float(c[0])
    }
}

impl PropertyChannels<f64, 1> for IntegerChannels {
    const KIND: ValueKind = ValueKind::Integer;

    fn to_channels(value: &Value) -> Option<[f64; 1]> {
        match value {
            Value::Integer(v) => Some([f64::from(*v)]),
            _ => None,
        }
    }

    fn from_channels(c: [f64; 1]) -> Value {
        let rounded = c[0].round().clamp(f64::from(i32::MIN), f64::from(i32::MAX));
        Value::Integer(rounded as i32)
    }
}

impl PropertyChannels<f32, 2> for Vec2Channels {
    const KIND: ValueKind = ValueKind::Vec2;

    fn to_channels(value: &Value) -> Option<[f32; 2]> {
        match value {
            Value::Vec2(v) => Some(*v),
            _ => None,
        }
    }

    fn from_channels(c: [f32; 2]) -> Value {
        Value::Vec2(c)
    }
}

impl PropertyChannels<f32, 3> for Vec3Channels {
    const KIND: ValueKind = ValueKind::Vec3;

    fn to_channels(value: &Value) -> Option<[f32; 3]> {
        match value {
            Value::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    fn from_channels(c: [f32; 3]) -> Value {
        Value::Vec3(c)
    }
}

impl PropertyChannels<f32, 4> for Vec4Channels {
    const KIND: ValueKind = ValueKind::Vec4;

    fn to_channels(value: &Value) -> Option<[f32; 4]> {
        match value {
            Value::Vec4(v) => Some(*v),
            _ => None,
        }
    }

    fn from_channels(c: [f32; 4]) -> Value {
        Value::Vec4(c)
    }
}

impl PropertyChannels<f32, 4> for ColorChannels {
    const KIND: ValueKind = ValueKind::ColorRgba;

    fn to_channels(value: &Value) -> Option<[f32; 4]> {
        match value {
            Value::ColorRgba(v) => Some(*v),
            _ => None,
        }
    }

    fn from_channels(c: [f32; 4]) -> Value {
        Value::ColorRgba(c)
    }
}

impl PropertyChannels<f32, 4> for MarginChannels {
    const KIND: ValueKind = ValueKind::Margin;

    fn to_channels(value: &Value) -> Option<[f32; 4]> {
        match value {
            Value::Margin {
                left,
                top,
                right,
                bottom,
            } => Some([*left, *top, *right, *bottom]),
            _ => None,
        }
    }

    fn from_channels(c: [f32; 4]) -> Value {
        Value::margin(c[0], c[1], c[2], c[3])
    }
}

/// Translation xyz, rotation roll/pitch/yaw (degrees), scale xyz.
impl PropertyChannels<f32, 9> for TransformChannels {
    const KIND: ValueKind = ValueKind::Transform;

    fn to_channels(value: &Value) -> Option<[f32; 9]> {
        match value {
            Value::Transform {
                translation: t,
                rotation: r,
                scale: s,
            } => Some([t[0], t[1], t[2], r[0], r[1], r[2], s[0], s[1], s[2]]),
            _ => None,
        }
    }

    fn from_channels(c: [f32; 9]) -> Value {
        Value::transform([c[0], c[1], c[2]], [c[3], c[4], c[5]], [c[6], c[7], c[8]])
    }
}

/// Translation xy, scale xy, shear xy, angle.
impl PropertyChannels<f32, 7> for WidgetTransformChannels {
    const KIND: ValueKind = ValueKind::WidgetTransform;

    fn to_channels(value: &Value) -> Option<[f32; 7]> {
        match value {
            Value::WidgetTransform {
                translation: t,
                scale: s,
                shear: h,
                angle,
            } => Some([t[0], t[1], s[0], s[1], h[0], h[1], *angle]),
            _ => None,
        }
    }

    fn from_channels(c: [f32; 7]) -> Value {
        Value::WidgetTransform {
            translation: [c[0], c[1]],
            scale: [c[2], c[3]],
            shear: [c[4], c[5]],
            angle: c[6],
        }
    }
}
