//! Property section templates: compiled, immutable evaluators that sample a
//! section's curves and push the result into the accumulator.

use vizij_api_core::{TypedPath, Value};

use crate::accumulate::{Accumulator, BlendableToken, ChannelValues};
use crate::binding::PropertyValueSource;
use crate::blend_type::BlendType;
use crate::channels::MultiChannelValue;
use crate::curve::{RichCurve, StepCurve};
use crate::easing::EasingSettings;
use crate::section::{Section, SectionData, TransformMask};

/// Everything a template needs to know about the current evaluation.
pub struct EvaluationContext<'a> {
    pub time: f32,
    /// Fully resolved property path the template writes to.
    pub path: &'a TypedPath,
    pub source: &'a dyn PropertyValueSource,
}

/// Per-kind sampling logic compiled from [`SectionData`].
#[derive(Clone, Debug)]
pub enum PropertyTemplate {
    Bool(StepCurve<bool>),
    Byte(StepCurve<u8>),
    Enum(StepCurve<i64>),
    Text(StepCurve<String>),
    Integer(StepCurve<i32>),
    Float(RichCurve),
    Vec2([RichCurve; 2]),
    Vec3([RichCurve; 3]),
    Vec4([RichCurve; 4]),
    Color([RichCurve; 4]),
    Margin([RichCurve; 4]),
    WidgetTransform([RichCurve; 7]),
    Transform {
        curves: [RichCurve; 9],
        mask: TransformMask,
        weight: RichCurve,
    },
}

/// Sample every curve with data into a channel value.
fn sample_curves<const N: usize>(
    curves: &[RichCurve; N],
    time: f32,
    include: impl Fn(usize) -> bool,
) -> MultiChannelValue<f32, N> {
    let mut out = MultiChannelValue::new();
    for (channel, curve) in curves.iter().enumerate() {
        if include(channel) && curve.has_any_data() {
            out.set(channel, curve.eval(time, 0.0));
        }
    }
    out
}

fn any_data(curves: &[RichCurve]) -> bool {
    curves.iter().any(RichCurve::has_any_data)
}

impl PropertyTemplate {
    /// Compile a template; auto tangents of rich curves are refreshed with `tension`.
    pub fn compile(data: &SectionData, tension: f32) -> Self {
        fn prepared<const N: usize>(curves: &[RichCurve; N], tension: f32) -> [RichCurve; N] {
            let mut out = curves.clone();
            for curve in &mut out {
                curve.auto_set_tangents(tension);
            }
            out
        }

        match data {
            SectionData::Bool { curve } => PropertyTemplate::Bool(curve.clone()),
            SectionData::Byte { curve } => PropertyTemplate::Byte(curve.clone()),
            SectionData::Enum { curve } => PropertyTemplate::Enum(curve.clone()),
            SectionData::Text { curve } => PropertyTemplate::Text(curve.clone()),
            SectionData::Integer { curve } => PropertyTemplate::Integer(curve.clone()),
            SectionData::Float { curve } => {
                let [curve] = prepared(&[curve.clone()], tension);
                PropertyTemplate::Float(curve)
            }
            SectionData::Vec2 { curves } => PropertyTemplate::Vec2(prepared(curves, tension)),
            SectionData::Vec3 { curves } => PropertyTemplate::Vec3(prepared(curves, tension)),
            SectionData::Vec4 { curves } => PropertyTemplate::Vec4(prepared(curves, tension)),
            SectionData::ColorRgba { curves } => PropertyTemplate::Color(prepared(curves, tension)),
            SectionData::Margin { curves } => PropertyTemplate::Margin(prepared(curves, tension)),
            SectionData::WidgetTransform { curves } => {
                PropertyTemplate::WidgetTransform(prepared(curves, tension))
            }
            SectionData::Transform {
                curves,
                mask,
                weight,
            } => {
                let [weight] = prepared(&[weight.clone()], tension);
                PropertyTemplate::Transform {
                    curves: prepared(curves, tension),
                    mask: *mask,
                    weight,
                }
            }
        }
    }

    /// Sample at `ctx.time` and push the contribution. `weight` is the
    /// section's easing weight.
    pub fn evaluate(
        &self,
        ctx: &EvaluationContext<'_>,
        weight: f32,
        blend_type: BlendType,
        accumulator: &mut Accumulator,
    ) {
        let t = ctx.time;
        let values = match self {
            PropertyTemplate::Bool(c) => return assign_step(c, t, Value::Bool, ctx, accumulator),
            PropertyTemplate::Byte(c) => return assign_step(c, t, Value::Byte, ctx, accumulator),
            PropertyTemplate::Enum(c) => return assign_step(c, t, Value::Enum, ctx, accumulator),
            PropertyTemplate::Text(c) => return assign_step(c, t, Value::Text, ctx, accumulator),
            PropertyTemplate::Integer(curve) => {
                if !curve.has_any_data() {
                    return;
                }
                let mut v = MultiChannelValue::new();
                if let Some(i) = curve.eval(t, None) {
                    v.set(0, f64::from(i));
                }
                ChannelValues::Integer(v)
            }
            PropertyTemplate::Float(curve) => {
                if !curve.has_any_data() {
                    return;
                }
                ChannelValues::Float(MultiChannelValue::from_array([curve.eval(t, 0.0)]))
            }
            PropertyTemplate::Vec2(c) if any_data(c) => {
                ChannelValues::Vec2(sample_curves(c, t, |_| true))
            }
            PropertyTemplate::Vec3(c) if any_data(c) => {
                ChannelValues::Vec3(sample_curves(c, t, |_| true))
            }
            PropertyTemplate::Vec4(c) if any_data(c) => {
                ChannelValues::Vec4(sample_curves(c, t, |_| true))
            }
            PropertyTemplate::Color(c) if any_data(c) => {
                ChannelValues::Color(sample_curves(c, t, |_| true))
            }
            PropertyTemplate::Margin(c) if any_data(c) => {
                ChannelValues::Margin(sample_curves(c, t, |_| true))
            }
            PropertyTemplate::WidgetTransform(c) if any_data(c) => {
                ChannelValues::WidgetTransform(sample_curves(c, t, |_| true))
            }
            PropertyTemplate::Transform {
                curves,
                mask,
                weight: weight_curve,
            } => {
                if !any_data(curves) {
                    return;
                }
                let values = sample_curves(curves, t, |ch| mask.has_channel(ch));
                if values.is_empty() {
                    return;
                }
                let weight = if mask.has_weight() {
                    weight * weight_curve.eval(t, 1.0)
                } else {
                    weight
                };
                let token = BlendableToken {
                    values: ChannelValues::Transform(values),
                    blend_type,
                    weight,
                };
                accumulator.blend(ctx.path, token, ctx.source);
                return;
            }
            _ => return,
        };

        if values.is_empty() {
            return;
        }
        accumulator.blend(
            ctx.path,
            BlendableToken {
                values,
                blend_type,
                weight,
            },
            ctx.source,
        );
    }
}

fn assign_step<V: Clone>(
    curve: &StepCurve<V>,
    time: f32,
    wrap: impl FnOnce(V) -> Value,
    ctx: &EvaluationContext<'_>,
    accumulator: &mut Accumulator,
) {
    if let Some(v) = curve.eval(time, None) {
        accumulator.assign(ctx.path, wrap(v));
    }
}

/// A compiled section: range and easing plus its property template.
#[derive(Clone, Debug)]
pub struct SectionTemplate {
    range: Option<(f32, f32)>,
    is_active: bool,
    easing: EasingSettings,
    blend_type: BlendType,
    property: PropertyTemplate,
}

impl SectionTemplate {
    pub fn compile(section: &Section, default_blend_type: BlendType, tension: f32) -> Self {
        Self {
            range: section.get_range(),
            is_active: section.is_active,
            easing: section.easing.clone(),
            blend_type: section.blend_type.unwrap_or(default_blend_type),
            property: PropertyTemplate::compile(&section.data, tension),
        }
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Same rule as [`Section::is_time_within`].
    pub fn is_time_within(&self, time: f32) -> bool {
        match self.range {
            None => true,
            Some((start, end)) if start == end => time == start,
            Some((start, end)) => start <= time && time < end,
        }
    }

    pub fn evaluate_easing(&self, time: f32) -> f32 {
        match self.range {
            Some((start, end)) => self.easing.evaluate(Some(start), Some(end), time),
            None => self.easing.evaluate(None, None, time),
        }
    }

    pub fn evaluate(&self, ctx: &EvaluationContext<'_>, accumulator: &mut Accumulator) {
        let weight = self.evaluate_easing(ctx.time);
        self.property
            .evaluate(ctx, weight, self.blend_type, accumulator);
    }
}
