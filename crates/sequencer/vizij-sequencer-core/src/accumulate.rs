//! Accumulation of per-property contributions and resolution into final Values.
//!
//! Evaluation is two-phase: every section template pushes its tokens first,
//! then [`Accumulator::resolve_and_apply`] turns each cell into one `WriteOp`.
//! Cells are keyed by the fully resolved property path and emitted in the
//! order they were first touched.

use hashbrown::HashMap;
use log::warn;
use vizij_api_core::{TypedPath, Value, ValueKind, WriteBatch, WriteOp};

use crate::binding::{current_or_initial, initial_or_current, PropertyValueSource};
use crate::blend_type::BlendType;
use crate::blendable::{
    ColorChannels, FloatChannels, IntegerChannels, MarginChannels, MaskedBlendable,
    PropertyChannels, TransformChannels, Vec2Channels, Vec3Channels, Vec4Channels,
    WidgetTransformChannels,
};
use crate::channels::{ChannelScalar, MultiChannelValue};

/// Channel values of one blendable contribution, tagged by property kind.
#[derive(Clone, Debug, PartialEq)]
pub enum ChannelValues {
    Float(MultiChannelValue<f32, 1>),
    Integer(MultiChannelValue<f64, 1>),
    Vec2(MultiChannelValue<f32, 2>),
    Vec3(MultiChannelValue<f32, 3>),
    Vec4(MultiChannelValue<f32, 4>),
    Color(MultiChannelValue<f32, 4>),
    Margin(MultiChannelValue<f32, 4>),
    WidgetTransform(MultiChannelValue<f32, 7>),
    Transform(MultiChannelValue<f32, 9>),
}

impl ChannelValues {
    pub fn kind(&self) -> ValueKind {
        match self {
            ChannelValues::Float(_) => ValueKind::Float,
            ChannelValues::Integer(_) => ValueKind::Integer,
            ChannelValues::Vec2(_) => ValueKind::Vec2,
            ChannelValues::Vec3(_) => ValueKind::Vec3,
            ChannelValues::Vec4(_) => ValueKind::Vec4,
            ChannelValues::Color(_) => ValueKind::ColorRgba,
            ChannelValues::Margin(_) => ValueKind::Margin,
            ChannelValues::WidgetTransform(_) => ValueKind::WidgetTransform,
            ChannelValues::Transform(_) => ValueKind::Transform,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ChannelValues::Float(v) => v.is_empty(),
            ChannelValues::Integer(v) => v.is_empty(),
            ChannelValues::Vec2(v) => v.is_empty(),
            ChannelValues::Vec3(v) => v.is_empty(),
            ChannelValues::Vec4(v) | ChannelValues::Color(v) | ChannelValues::Margin(v) => {
                v.is_empty()
            }
            ChannelValues::WidgetTransform(v) => v.is_empty(),
            ChannelValues::Transform(v) => v.is_empty(),
        }
    }
}

/// One weighted contribution to a blended property.
#[derive(Clone, Debug, PartialEq)]
pub struct BlendableToken {
    pub values: ChannelValues,
    pub blend_type: BlendType,
    pub weight: f32,
}

/// Per-property cell. Blendable kinds keep running totals; step kinds keep
/// the last assignment.
#[derive(Clone, Debug)]
enum ActuatorEntry {
    Float(MaskedBlendable<f32, 1>),
    Integer(MaskedBlendable<f64, 1>),
    Vec2(MaskedBlendable<f32, 2>),
    Vec3(MaskedBlendable<f32, 3>),
    Vec4(MaskedBlendable<f32, 4>),
    Color(MaskedBlendable<f32, 4>),
    Margin(MaskedBlendable<f32, 4>),
    WidgetTransform(MaskedBlendable<f32, 7>),
    Transform(MaskedBlendable<f32, 9>),
    Direct(Value),
}

impl ActuatorEntry {
    fn for_kind(kind: ValueKind) -> Option<Self> {
        Some(match kind {
            ValueKind::Float => ActuatorEntry::Float(MaskedBlendable::new()),
            ValueKind::Integer => ActuatorEntry::Integer(MaskedBlendable::new()),
            ValueKind::Vec2 => ActuatorEntry::Vec2(MaskedBlendable::new()),
            ValueKind::Vec3 => ActuatorEntry::Vec3(MaskedBlendable::new()),
            ValueKind::Vec4 => ActuatorEntry::Vec4(MaskedBlendable::new()),
            ValueKind::ColorRgba => ActuatorEntry::Color(MaskedBlendable::new()),
            ValueKind::Margin => ActuatorEntry::Margin(MaskedBlendable::new()),
            ValueKind::WidgetTransform => ActuatorEntry::WidgetTransform(MaskedBlendable::new()),
            ValueKind::Transform => ActuatorEntry::Transform(MaskedBlendable::new()),
            ValueKind::Bool | ValueKind::Byte | ValueKind::Enum | ValueKind::Text => return None,
        })
    }

    fn kind(&self) -> ValueKind {
        match self {
            ActuatorEntry::Float(_) => ValueKind::Float,
            ActuatorEntry::Integer(_) => ValueKind::Integer,
            ActuatorEntry::Vec2(_) => ValueKind::Vec2,
            ActuatorEntry::Vec3(_) => ValueKind::Vec3,
            ActuatorEntry::Vec4(_) => ValueKind::Vec4,
            ActuatorEntry::Color(_) => ValueKind::ColorRgba,
            ActuatorEntry::Margin(_) => ValueKind::Margin,
            ActuatorEntry::WidgetTransform(_) => ValueKind::WidgetTransform,
            ActuatorEntry::Transform(_) => ValueKind::Transform,
            ActuatorEntry::Direct(v) => v.kind(),
        }
    }

    /// Fold `token` in. Returns false when the token's kind does not match.
    fn add_token(
        &mut self,
        path: &TypedPath,
        token: &BlendableToken,
        source: &dyn PropertyValueSource,
    ) -> bool {
        let (bt, w) = (token.blend_type, token.weight);
        match (self, &token.values) {
            (ActuatorEntry::Float(b), ChannelValues::Float(v)) => {
                b.blend(v, bt, w, || initial_channels::<FloatChannels, _, 1>(path, source))
            }
            (ActuatorEntry::Integer(b), ChannelValues::Integer(v)) => {
                b.blend(v, bt, w, || initial_channels::<IntegerChannels, _, 1>(path, source))
            }
            (ActuatorEntry::Vec2(b), ChannelValues::Vec2(v)) => {
                b.blend(v, bt, w, || initial_channels::<Vec2Channels, _, 2>(path, source))
            }
            (ActuatorEntry::Vec3(b), ChannelValues::Vec3(v)) => {
                b.blend(v, bt, w, || initial_channels::<Vec3Channels, _, 3>(path, source))
            }
            (ActuatorEntry::Vec4(b), ChannelValues::Vec4(v)) => {
                b.blend(v, bt, w, || initial_channels::<Vec4Channels, _, 4>(path, source))
            }
            (ActuatorEntry::Color(b), ChannelValues::Color(v)) => {
                b.blend(v, bt, w, || initial_channels::<ColorChannels, _, 4>(path, source))
            }
            (ActuatorEntry::Margin(b), ChannelValues::Margin(v)) => {
                b.blend(v, bt, w, || initial_channels::<MarginChannels, _, 4>(path, source))
            }
            (ActuatorEntry::WidgetTransform(b), ChannelValues::WidgetTransform(v)) => b.blend(
                v,
                bt,
                w,
                || initial_channels::<WidgetTransformChannels, _, 7>(path, source),
            ),
            (ActuatorEntry::Transform(b), ChannelValues::Transform(v)) => {
                b.blend(v, bt, w, || initial_channels::<TransformChannels, _, 9>(path, source))
            }
            _ => return false,
        }
        true
    }

    fn finalize(self, path: &TypedPath, source: &dyn PropertyValueSource) -> Value {
        match self {
            ActuatorEntry::Float(b) => resolve_cell::<FloatChannels, _, 1>(b, path, source),
            ActuatorEntry::Integer(b) => resolve_cell::<IntegerChannels, _, 1>(b, path, source),
            ActuatorEntry::Vec2(b) => resolve_cell::<Vec2Channels, _, 2>(b, path, source),
            ActuatorEntry::Vec3(b) => resolve_cell::<Vec3Channels, _, 3>(b, path, source),
            ActuatorEntry::Vec4(b) => resolve_cell::<Vec4Channels, _, 4>(b, path, source),
            ActuatorEntry::Color(b) => resolve_cell::<ColorChannels, _, 4>(b, path, source),
            ActuatorEntry::Margin(b) => resolve_cell::<MarginChannels, _, 4>(b, path, source),
            ActuatorEntry::WidgetTransform(b) => {
                resolve_cell::<WidgetTransformChannels, _, 7>(b, path, source)
            }
            ActuatorEntry::Transform(b) => resolve_cell::<TransformChannels, _, 9>(b, path, source),
            ActuatorEntry::Direct(v) => v,
        }
    }
}

/// Initial channels of `path`: initial value, then current value, then the
/// kind's neutral value.
fn initial_channels<C, T, const N: usize>(
    path: &TypedPath,
    source: &dyn PropertyValueSource,
) -> [T; N]
where
    C: PropertyChannels<T, N>,
    T: ChannelScalar,
{
    initial_or_current(source, path)
        .and_then(|v| C::to_channels(&v))
        .unwrap_or_else(C::neutral)
}

fn current_channels<C, T, const N: usize>(
    path: &TypedPath,
    source: &dyn PropertyValueSource,
) -> [T; N]
where
    C: PropertyChannels<T, N>,
    T: ChannelScalar,
{
    current_or_initial(source, path)
        .and_then(|v| C::to_channels(&v))
        .unwrap_or_else(C::neutral)
}

fn resolve_cell<C, T, const N: usize>(
    mut blendable: MaskedBlendable<T, N>,
    path: &TypedPath,
    source: &dyn PropertyValueSource,
) -> Value
where
    C: PropertyChannels<T, N>,
    T: ChannelScalar,
{
    let resolved = blendable.resolve(
        || initial_channels::<C, T, N>(path, source),
        || current_channels::<C, T, N>(path, source),
    );
    C::from_channels(resolved.into_array())
}

/// Accumulates tokens for one evaluation pass.
#[derive(Debug, Default)]
pub struct Accumulator {
    index: HashMap<TypedPath, usize>,
    cells: Vec<(TypedPath, ActuatorEntry)>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            index: HashMap::with_capacity(capacity),
            cells: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.cells.clear();
    }

    /// Cell for `path`, created with `make` when missing. A cell whose kind
    /// differs from `kind` is reported as `None`.
    fn cell_mut(
        &mut self,
        path: &TypedPath,
        kind: ValueKind,
        make: impl FnOnce() -> Option<ActuatorEntry>,
    ) -> Option<&mut ActuatorEntry> {
        let idx = match self.index.get(path) {
            Some(&idx) => idx,
            None => {
                let entry = make()?;
                self.cells.push((path.clone(), entry));
                self.index.insert(path.clone(), self.cells.len() - 1);
                self.cells.len() - 1
            }
        };
        let entry = &mut self.cells[idx].1;
        if entry.kind() != kind {
            warn!(
                "dropping {:?} contribution to '{}': property already accumulates {:?}",
                kind,
                path,
                entry.kind()
            );
            return None;
        }
        Some(entry)
    }

    /// Fold a blendable token into the cell for `path`.
    pub fn blend(
        &mut self,
        path: &TypedPath,
        token: BlendableToken,
        source: &dyn PropertyValueSource,
    ) {
        let kind = token.values.kind();
        if let Some(entry) = self.cell_mut(path, kind, || ActuatorEntry::for_kind(kind)) {
            let folded = entry.add_token(path, &token, source);
            debug_assert!(folded, "cell kind checked above");
        }
    }

    /// Assign a step value to `path`; the last assignment of a pass wins.
    pub fn assign(&mut self, path: &TypedPath, value: Value) {
        let kind = value.kind();
        let make = || Some(ActuatorEntry::Direct(value.clone()));
        if let Some(entry) = self.cell_mut(path, kind, make) {
            match entry {
                ActuatorEntry::Direct(slot) => *slot = value,
                _ => warn!("dropping direct assignment to blended property '{path}'"),
            }
        }
    }

    /// Resolve every cell and emit one write per property.
    pub fn resolve_and_apply(&mut self, source: &dyn PropertyValueSource) -> WriteBatch {
        self.index.clear();
        let mut batch = WriteBatch::with_capacity(self.cells.len());
        for (path, entry) in self.cells.drain(..) {
            let value = entry.finalize(&path, source);
            batch.push(WriteOp::new(path, value));
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoValues;

    impl PropertyValueSource for NoValues {
        fn initial_value(&self, _: &TypedPath) -> Option<Value> {
            None
        }
        fn current_value(&self, _: &TypedPath) -> Option<Value> {
            None
        }
    }

    fn float_token(v: f32, blend_type: BlendType, weight: f32) -> BlendableToken {
        BlendableToken {
            values: ChannelValues::Float(MultiChannelValue::from_array([v])),
            blend_type,
            weight,
        }
    }

    #[test]
    fn cells_emit_in_first_touch_order() {
        let a = TypedPath::parse("stage/A.Opacity").unwrap();
        let b = TypedPath::parse("stage/B.Opacity").unwrap();
        let mut acc = Accumulator::new();
        acc.blend(&b, float_token(1.0, BlendType::Absolute, 1.0), &NoValues);
        acc.blend(&a, float_token(2.0, BlendType::Absolute, 1.0), &NoValues);
        acc.blend(&b, float_token(3.0, BlendType::Absolute, 1.0), &NoValues);
        let batch = acc.resolve_and_apply(&NoValues);
        let paths: Vec<String> = batch.iter().map(|op| op.path.to_string()).collect();
        assert_eq!(paths, vec!["stage/B.Opacity", "stage/A.Opacity"]);
        assert_eq!(batch.get(&b), Some(&Value::Float(2.0)));
        assert!(acc.is_empty());
    }

    #[test]
    fn mismatched_kind_is_dropped() {
        let p = TypedPath::parse("stage/A.Opacity").unwrap();
        let mut acc = Accumulator::new();
        acc.blend(&p, float_token(4.0, BlendType::Absolute, 1.0), &NoValues);
        acc.blend(
            &p,
            BlendableToken {
                values: ChannelValues::Vec2(MultiChannelValue::from_array([1.0, 1.0])),
                blend_type: BlendType::Absolute,
                weight: 1.0,
            },
            &NoValues,
        );
        acc.assign(&p, Value::Bool(true));
        let batch = acc.resolve_and_apply(&NoValues);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.get(&p), Some(&Value::Float(4.0)));
    }

    #[test]
    fn direct_assignment_last_wins() {
        let p = TypedPath::parse("ui/Label.Text").unwrap();
        let mut acc = Accumulator::new();
        acc.assign(&p, Value::Text("a".into()));
        acc.assign(&p, Value::Text("b".into()));
        let batch = acc.resolve_and_apply(&NoValues);
        assert_eq!(batch.into_vec(), vec![WriteOp::new(p, Value::Text("b".into()))]);
    }

    #[test]
    fn integer_rounds_after_blend() {
        let p = TypedPath::parse("stage/A.Count").unwrap();
        let mut acc = Accumulator::new();
        for v in [1.0, 2.0] {
            acc.blend(
                &p,
                BlendableToken {
                    values: ChannelValues::Integer(MultiChannelValue::from_array([v])),
                    blend_type: BlendType::Absolute,
                    weight: 0.5,
                },
                &NoValues,
            );
        }
        let batch = acc.resolve_and_apply(&NoValues);
        assert_eq!(batch.get(&p), Some(&Value::Integer(2)));
    }
}
