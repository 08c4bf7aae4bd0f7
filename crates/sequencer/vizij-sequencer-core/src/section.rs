//! Sections: time ranges of keyed data on a track, with placement, trimming,
//! splitting and easing.

use log::debug;
use serde::{Deserialize, Serialize};
use vizij_api_core::ValueKind;

use crate::blend_type::BlendType;
use crate::curve::{RichCurve, StepCurve};
use crate::easing::EasingSettings;

/// Which transform channels a transform section animates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransformMask(pub u16);

impl TransformMask {
    pub const TRANSLATION_X: u16 = 1 << 0;
    pub const TRANSLATION_Y: u16 = 1 << 1;
    pub const TRANSLATION_Z: u16 = 1 << 2;
    pub const ROTATION_X: u16 = 1 << 3;
    pub const ROTATION_Y: u16 = 1 << 4;
    pub const ROTATION_Z: u16 = 1 << 5;
    pub const SCALE_X: u16 = 1 << 6;
    pub const SCALE_Y: u16 = 1 << 7;
    pub const SCALE_Z: u16 = 1 << 8;
    pub const WEIGHT: u16 = 1 << 9;

    pub const TRANSLATION: u16 = Self::TRANSLATION_X | Self::TRANSLATION_Y | Self::TRANSLATION_Z;
    pub const ROTATION: u16 = Self::ROTATION_X | Self::ROTATION_Y | Self::ROTATION_Z;
    pub const SCALE: u16 = Self::SCALE_X | Self::SCALE_Y | Self::SCALE_Z;
    pub const ALL_TRANSFORM: u16 = Self::TRANSLATION | Self::ROTATION | Self::SCALE;
    pub const ALL: u16 = Self::ALL_TRANSFORM | Self::WEIGHT;

    /// Whether transform channel `index` (0..9) is animated.
    pub fn has_channel(self, index: usize) -> bool {
        index < 9 && self.0 & (1 << index) != 0
    }

    pub fn has_weight(self) -> bool {
        self.0 & Self::WEIGHT != 0
    }
}

impl Default for TransformMask {
    fn default() -> Self {
        TransformMask(Self::ALL_TRANSFORM)
    }
}

/// Keyed data of a section, one variant per property kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionData {
    Bool { curve: StepCurve<bool> },
    Byte { curve: StepCurve<u8> },
    Enum { curve: StepCurve<i64> },
    Integer { curve: StepCurve<i32> },
    Text { curve: StepCurve<String> },
    Float { curve: RichCurve },
    Vec2 { curves: [RichCurve; 2] },
    Vec3 { curves: [RichCurve; 3] },
    Vec4 { curves: [RichCurve; 4] },
    /// Red, green, blue, alpha.
    ColorRgba { curves: [RichCurve; 4] },
    /// Left, top, right, bottom.
    Margin { curves: [RichCurve; 4] },
    /// Translation xyz, rotation roll/pitch/yaw, scale xyz.
    Transform {
        curves: [RichCurve; 9],
        #[serde(default)]
        mask: TransformMask,
        /// Manual blend weight, sampled when the mask includes the weight bit.
        #[serde(default)]
        weight: RichCurve,
    },
    /// Translation xy, scale xy, shear xy, angle.
    WidgetTransform { curves: [RichCurve; 7] },
}

impl SectionData {
    pub fn kind(&self) -> ValueKind {
        match self {
            SectionData::Bool { .. } => ValueKind::Bool,
            SectionData::Byte { .. } => ValueKind::Byte,
            SectionData::Enum { .. } => ValueKind::Enum,
            SectionData::Integer { .. } => ValueKind::Integer,
            SectionData::Text { .. } => ValueKind::Text,
            SectionData::Float { .. } => ValueKind::Float,
            SectionData::Vec2 { .. } => ValueKind::Vec2,
            SectionData::Vec3 { .. } => ValueKind::Vec3,
            SectionData::Vec4 { .. } => ValueKind::Vec4,
            SectionData::ColorRgba { .. } => ValueKind::ColorRgba,
            SectionData::Margin { .. } => ValueKind::Margin,
            SectionData::Transform { .. } => ValueKind::Transform,
            SectionData::WidgetTransform { .. } => ValueKind::WidgetTransform,
        }
    }

    /// Empty curves for `kind`.
    pub fn empty(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Bool => SectionData::Bool { curve: StepCurve::new() },
            ValueKind::Byte => SectionData::Byte { curve: StepCurve::new() },
            ValueKind::Enum => SectionData::Enum { curve: StepCurve::new() },
            ValueKind::Integer => SectionData::Integer { curve: StepCurve::new() },
            ValueKind::Text => SectionData::Text { curve: StepCurve::new() },
            ValueKind::Float => SectionData::Float { curve: RichCurve::new() },
            ValueKind::Vec2 => SectionData::Vec2 { curves: Default::default() },
            ValueKind::Vec3 => SectionData::Vec3 { curves: Default::default() },
            ValueKind::Vec4 => SectionData::Vec4 { curves: Default::default() },
            ValueKind::ColorRgba => SectionData::ColorRgba { curves: Default::default() },
            ValueKind::Margin => SectionData::Margin { curves: Default::default() },
            ValueKind::Transform => SectionData::Transform {
                curves: Default::default(),
                mask: TransformMask::default(),
                weight: RichCurve::new(),
            },
            ValueKind::WidgetTransform => SectionData::WidgetTransform {
                curves: Default::default(),
            },
        }
    }

    /// Every rich curve of the section, including a transform weight curve.
    pub fn rich_curves_mut(&mut self) -> Vec<&mut RichCurve> {
        match self {
            SectionData::Float { curve } => vec![curve],
            SectionData::Vec2 { curves } => curves.iter_mut().collect(),
            SectionData::Vec3 { curves } => curves.iter_mut().collect(),
            SectionData::Vec4 { curves }
            | SectionData::ColorRgba { curves }
            | SectionData::Margin { curves } => curves.iter_mut().collect(),
            SectionData::WidgetTransform { curves } => curves.iter_mut().collect(),
            SectionData::Transform { curves, weight, .. } => {
                curves.iter_mut().chain(std::iter::once(weight)).collect()
            }
            SectionData::Bool { .. }
            | SectionData::Byte { .. }
            | SectionData::Enum { .. }
            | SectionData::Integer { .. }
            | SectionData::Text { .. } => Vec::new(),
        }
    }

    fn shift_keys(&mut self, delta: f32) {
        match self {
            SectionData::Bool { curve } => curve.shift(delta),
            SectionData::Byte { curve } => curve.shift(delta),
            SectionData::Enum { curve } => curve.shift(delta),
            SectionData::Integer { curve } => curve.shift(delta),
            SectionData::Text { curve } => curve.shift(delta),
            _ => {
                for curve in self.rich_curves_mut() {
                    curve.shift_curve(delta, None);
                }
            }
        }
    }

    fn scale_keys(&mut self, origin: f32, factor: f32) {
        match self {
            SectionData::Bool { curve } => curve.scale(origin, factor),
            SectionData::Byte { curve } => curve.scale(origin, factor),
            SectionData::Enum { curve } => curve.scale(origin, factor),
            SectionData::Integer { curve } => curve.scale(origin, factor),
            SectionData::Text { curve } => curve.scale(origin, factor),
            _ => {
                for curve in self.rich_curves_mut() {
                    curve.scale_curve(origin, factor, None);
                }
            }
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub start_time: f32,
    pub end_time: f32,
    #[serde(default)]
    pub row_index: u32,
    /// Editor ordering hint; evaluation always runs sections in stored order.
    #[serde(default)]
    pub overlap_priority: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_locked: bool,
    /// Unbounded on both sides; the stored range is ignored for evaluation.
    #[serde(default)]
    pub is_infinite: bool,
    #[serde(default)]
    pub pre_roll_time: f32,
    #[serde(default)]
    pub post_roll_time: f32,
    /// Falls back to the engine's default blend type when `None`.
    #[serde(default)]
    pub blend_type: Option<BlendType>,
    #[serde(default)]
    pub easing: EasingSettings,
    pub data: SectionData,
}

impl Section {
    pub fn new(start_time: f32, end_time: f32, data: SectionData) -> Self {
        Self {
            start_time,
            end_time,
            row_index: 0,
            overlap_priority: 0,
            is_active: true,
            is_locked: false,
            is_infinite: false,
            pre_roll_time: 0.0,
            post_roll_time: 0.0,
            blend_type: None,
            easing: EasingSettings::default(),
            data,
        }
    }

    pub fn infinite(data: SectionData) -> Self {
        Self {
            is_infinite: true,
            ..Self::new(0.0, 0.0, data)
        }
    }

    pub fn with_blend_type(mut self, blend_type: BlendType) -> Self {
        self.blend_type = Some(blend_type);
        self
    }

    pub fn kind(&self) -> ValueKind {
        self.data.kind()
    }

    /// `(start, end)`, or `None` for infinite sections.
    pub fn get_range(&self) -> Option<(f32, f32)> {
        (!self.is_infinite).then_some((self.start_time, self.end_time))
    }

    fn bounds(&self) -> (f32, f32) {
        if self.is_infinite {
            (f32::NEG_INFINITY, f32::INFINITY)
        } else {
            (self.start_time, self.end_time)
        }
    }

    pub fn set_range(&mut self, start_time: f32, end_time: f32) {
        debug_assert!(start_time <= end_time, "section range {start_time}..{end_time}");
        self.start_time = start_time;
        self.end_time = end_time.max(start_time);
    }

    /// Whether the section is evaluated at `time`: `start <= time < end`,
    /// or exactly `start` for zero-length sections.
    pub fn is_time_within(&self, time: f32) -> bool {
        if self.is_infinite {
            return true;
        }
        if self.start_time == self.end_time {
            return time == self.start_time;
        }
        self.start_time <= time && time < self.end_time
    }

    pub fn pre_roll_range(&self) -> Option<(f32, f32)> {
        (!self.is_infinite && self.pre_roll_time > 0.0)
            .then(|| (self.start_time - self.pre_roll_time, self.start_time))
    }

    pub fn post_roll_range(&self) -> Option<(f32, f32)> {
        (!self.is_infinite && self.post_roll_time > 0.0)
            .then(|| (self.end_time, self.end_time + self.post_roll_time))
    }

    /// Exclusive-bounds overlap on the same row.
    pub fn overlaps(&self, other: &Section) -> bool {
        if self.row_index != other.row_index {
            return false;
        }
        let (a0, a1) = self.bounds();
        let (b0, b1) = other.bounds();
        a0 < b1 && b0 < a1
    }

    /// First section in `sections` that overlaps this one.
    pub fn overlaps_with_sections<'a>(&self, sections: &'a [Section]) -> Option<&'a Section> {
        sections.iter().find(|other| self.overlaps(other))
    }

    /// Place the section at `[start, end]` without overlapping `existing`:
    /// either on the first free row or, with a single row, pushed later
    /// until it fits.
    pub fn initial_placement(
        &mut self,
        existing: &[Section],
        start_time: f32,
        end_time: f32,
        allow_multiple_rows: bool,
    ) {
        debug_assert!(start_time <= end_time);
        let duration = (end_time - start_time).max(0.0);
        self.is_infinite = false;
        self.set_range(start_time, start_time + duration);

        if allow_multiple_rows {
            self.row_index = 0;
            while self.overlaps_with_sections(existing).is_some() {
                self.row_index += 1;
            }
        } else {
            while let Some(other) = self.overlaps_with_sections(existing) {
                if other.is_infinite {
                    debug!("cannot place section past an infinite section; leaving overlap");
                    break;
                }
                let start = other.end_time;
                self.set_range(start, start + duration);
            }
        }
    }

    /// Shift the section and its keys by `delta`.
    pub fn move_section(&mut self, delta: f32) -> bool {
        if self.is_locked {
            debug!("refusing to move locked section");
            return false;
        }
        self.start_time += delta;
        self.end_time += delta;
        self.data.shift_keys(delta);
        true
    }

    /// Scale the section and its keys about `origin`.
    pub fn dilate_section(&mut self, factor: f32, origin: f32) -> bool {
        if self.is_locked {
            debug!("refusing to dilate locked section");
            return false;
        }
        if !(factor > 0.0) {
            debug!("refusing to dilate section by non-positive factor {factor}");
            return false;
        }
        self.start_time = (self.start_time - origin) * factor + origin;
        self.end_time = (self.end_time - origin) * factor + origin;
        self.data.scale_keys(origin, factor);
        true
    }

    /// Cut the section at `time` when it lies strictly inside; this section
    /// keeps `[start, time]` and the returned one covers `[time, end]`.
    pub fn split_section(&mut self, time: f32) -> Option<Section> {
        if self.is_locked {
            debug!("refusing to split locked section");
            return None;
        }
        if self.is_infinite || !(self.start_time < time && time < self.end_time) {
            return None;
        }
        let mut right = self.clone();
        right.start_time = time;
        right.easing.manual_ease_in = None;
        right.easing.auto_ease_in_time = 0.0;

        self.end_time = time;
        self.easing.manual_ease_out = None;
        self.easing.auto_ease_out_time = 0.0;
        Some(right)
    }

    /// Trim to `time` when it lies strictly inside. `trim_left` keeps
    /// `[time, end]`, otherwise `[start, time]`.
    pub fn trim_section(&mut self, time: f32, trim_left: bool) -> bool {
        if self.is_locked {
            debug!("refusing to trim locked section");
            return false;
        }
        if self.is_infinite || !(self.start_time < time && time < self.end_time) {
            return false;
        }
        if trim_left {
            self.start_time = time;
        } else {
            self.end_time = time;
        }
        true
    }

    /// Ease weight at `time`, in [0, 1].
    pub fn evaluate_easing(&self, time: f32) -> f32 {
        match self.get_range() {
            Some((start, end)) => self.easing.evaluate(Some(start), Some(end), time),
            None => self.easing.evaluate(None, None, time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn float_section(start: f32, end: f32) -> Section {
        Section::new(
            start,
            end,
            SectionData::Float {
                curve: RichCurve::linear(&[(start, 0.0), (end, 1.0)]),
            },
        )
    }

    #[test]
    fn split_outside_is_rejected() {
        let mut s = float_section(0.0, 10.0);
        assert!(s.split_section(0.0).is_none());
        assert!(s.split_section(10.0).is_none());
        assert!(s.split_section(12.0).is_none());
        assert_eq!((s.start_time, s.end_time), (0.0, 10.0));
    }

    #[test]
    fn split_inside_partitions_range() {
        let mut s = float_section(0.0, 10.0);
        let right = s.split_section(4.0).unwrap();
        assert_eq!((s.start_time, s.end_time), (0.0, 4.0));
        assert_eq!((right.start_time, right.end_time), (4.0, 10.0));
    }

    #[test]
    fn trim_only_inside() {
        let mut s = float_section(0.0, 10.0);
        assert!(!s.trim_section(11.0, true));
        assert!(s.trim_section(2.0, true));
        assert_eq!(s.start_time, 2.0);
        assert!(s.trim_section(8.0, false));
        assert_eq!(s.end_time, 8.0);
    }

    #[test]
    fn abutting_sections_do_not_overlap() {
        let a = float_section(0.0, 5.0);
        let b = float_section(5.0, 8.0);
        assert!(!a.overlaps(&b));
        let c = float_section(4.0, 6.0);
        assert!(a.overlaps(&c));
        let mut d = float_section(4.0, 6.0);
        d.row_index = 1;
        assert!(!a.overlaps(&d));
    }

    #[test]
    fn placement_rows_and_push() {
        let existing = vec![float_section(0.0, 5.0), float_section(5.0, 10.0)];
        let mut s = float_section(0.0, 0.0);
        s.initial_placement(&existing, 3.0, 6.0, true);
        assert_eq!(s.row_index, 1);
        assert_eq!((s.start_time, s.end_time), (3.0, 6.0));

        let mut s = float_section(0.0, 0.0);
        s.initial_placement(&existing, 3.0, 6.0, false);
        assert_eq!(s.row_index, 0);
        assert_eq!((s.start_time, s.end_time), (10.0, 13.0));
    }

    #[test]
    fn locked_sections_refuse_edits() {
        let mut s = float_section(0.0, 10.0);
        s.is_locked = true;
        assert!(!s.move_section(1.0));
        assert!(!s.dilate_section(2.0, 0.0));
        assert!(!s.trim_section(5.0, true));
        assert!(s.split_section(5.0).is_none());
        assert_eq!((s.start_time, s.end_time), (0.0, 10.0));
    }

    #[test]
    fn move_and_dilate_carry_keys() {
        let mut s = float_section(0.0, 10.0);
        assert!(s.move_section(5.0));
        assert_eq!((s.start_time, s.end_time), (5.0, 15.0));
        if let SectionData::Float { curve } = &s.data {
            assert_eq!(curve.time_range(), Some((5.0, 15.0)));
        }
        assert!(s.dilate_section(2.0, 5.0));
        assert_eq!((s.start_time, s.end_time), (5.0, 25.0));
        if let SectionData::Float { curve } = &s.data {
            assert_eq!(curve.time_range(), Some((5.0, 25.0)));
        }
    }

    #[test]
    fn time_within_and_rolls() {
        let mut s = float_section(2.0, 4.0);
        assert!(s.is_time_within(2.0));
        assert!(!s.is_time_within(4.0));
        s.pre_roll_time = 1.0;
        assert_eq!(s.pre_roll_range(), Some((1.0, 2.0)));
        assert_eq!(s.post_roll_range(), None);
        let zero = float_section(3.0, 3.0);
        assert!(zero.is_time_within(3.0));
        let inf = Section::infinite(SectionData::empty(ValueKind::Float));
        assert!(inf.is_time_within(-1e9));
        assert_eq!(inf.get_range(), None);
    }

    #[test]
    fn easing_boundaries() {
        let mut s = float_section(0.0, 10.0);
        s.easing.manual_ease_in = Some(5.0);
        assert_eq!(s.evaluate_easing(0.0), 0.0);
        assert_eq!(s.evaluate_easing(5.0), 1.0);
        assert_eq!(s.evaluate_easing(7.0), 1.0);
    }

    #[test]
    fn section_json_defaults() {
        let json = r#"{
            "start_time": 0.0,
            "end_time": 2.0,
            "data": { "kind": "float", "curve": { "keys": [{ "time": 0.0, "value": 1.0 }] } }
        }"#;
        let s: Section = serde_json::from_str(json).unwrap();
        assert!(s.is_active);
        assert_eq!(s.blend_type, None);
        assert_eq!(s.kind(), ValueKind::Float);
    }
}
