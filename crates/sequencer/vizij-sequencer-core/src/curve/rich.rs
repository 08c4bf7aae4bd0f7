//! Keyed scalar curve with per-key interpolation and infinity extrapolation.
//!
//! Keys live in a time-sorted `Vec`; callers address them through stable
//! [`KeyHandle`]s. Every structural edit (insert, delete, move) rebuilds the
//! handle → index map so handles never dangle and indices never go stale.

use hashbrown::HashMap;
use serde::{Deserialize, Deserializer, Serialize};

use super::interp::{bezier_interp, cycle_time, lerp_f32, unwind_degrees};

/// Default tolerance used to decide that two key times are the same key.
pub const KEY_TIME_TOLERANCE: f32 = 1e-4;

/// Sentinel stored in [`RichCurve::default_value`] while no default is set.
pub const UNSET_DEFAULT_VALUE: f32 = f32::MAX;

/// Interpolation from a key towards the next one.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpMode {
    Constant,
    #[default]
    Linear,
    Cubic,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TangentMode {
    /// Tangents are recomputed by [`RichCurve::auto_set_tangents`].
    #[default]
    Auto,
    /// User tangents, arrive and leave kept equal.
    User,
    /// User tangents, arrive and leave independent.
    Break,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TangentWeightMode {
    #[default]
    None,
    Arrive,
    Leave,
    Both,
}

/// Behaviour of a curve before its first key and after its last key.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extrapolation {
    Cycle,
    CycleWithOffset,
    Oscillate,
    Linear,
    #[default]
    Constant,
}

impl Extrapolation {
    #[inline]
    fn remaps_time(self) -> bool {
        matches!(
            self,
            Extrapolation::Cycle | Extrapolation::CycleWithOffset | Extrapolation::Oscillate
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RichCurveKey {
    pub time: f32,
    pub value: f32,
    #[serde(default)]
    pub interp_mode: InterpMode,
    #[serde(default)]
    pub tangent_mode: TangentMode,
    #[serde(default)]
    pub tangent_weight_mode: TangentWeightMode,
    #[serde(default)]
    pub arrive_tangent: f32,
    #[serde(default)]
    pub arrive_tangent_weight: f32,
    #[serde(default)]
    pub leave_tangent: f32,
    #[serde(default)]
    pub leave_tangent_weight: f32,
}

impl RichCurveKey {
    /// Linear key with auto tangents.
    pub fn new(time: f32, value: f32) -> Self {
        Self {
            time,
            value,
            interp_mode: InterpMode::Linear,
            tangent_mode: TangentMode::Auto,
            tangent_weight_mode: TangentWeightMode::None,
            arrive_tangent: 0.0,
            arrive_tangent_weight: 0.0,
            leave_tangent: 0.0,
            leave_tangent_weight: 0.0,
        }
    }

    pub fn with_interp(mut self, mode: InterpMode) -> Self {
        self.interp_mode = mode;
        self
    }

    /// Cubic key with explicit (user) tangents.
    pub fn cubic(time: f32, value: f32, arrive_tangent: f32, leave_tangent: f32) -> Self {
        Self {
            interp_mode: InterpMode::Cubic,
            tangent_mode: TangentMode::User,
            arrive_tangent,
            leave_tangent,
            ..Self::new(time, value)
        }
    }
}

/// Opaque, stable identifier of one key in one curve.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyHandle(u32);

#[derive(Clone, Debug, Serialize)]
pub struct RichCurve {
    keys: Vec<RichCurveKey>,
    #[serde(skip)]
    handles: Vec<KeyHandle>,
    #[serde(skip)]
    index_of: HashMap<KeyHandle, usize>,
    #[serde(skip)]
    next_handle: u32,
    /// Value returned when the curve has no keys; [`UNSET_DEFAULT_VALUE`] means unset.
    pub default_value: f32,
    pub pre_infinity_extrap: Extrapolation,
    pub post_infinity_extrap: Extrapolation,
}

#[derive(Deserialize)]
struct RichCurveRecord {
    #[serde(default)]
    keys: Vec<RichCurveKey>,
    #[serde(default = "unset_default")]
    default_value: f32,
    #[serde(default)]
    pre_infinity_extrap: Extrapolation,
    #[serde(default)]
    post_infinity_extrap: Extrapolation,
}

fn unset_default() -> f32 {
    UNSET_DEFAULT_VALUE
}

impl<'de> Deserialize<'de> for RichCurve {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let record = RichCurveRecord::deserialize(deserializer)?;
        let mut curve = RichCurve::from_keys(record.keys);
        curve.default_value = record.default_value;
        curve.pre_infinity_extrap = record.pre_infinity_extrap;
        curve.post_infinity_extrap = record.post_infinity_extrap;
        Ok(curve)
    }
}

impl Default for RichCurve {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            handles: Vec::new(),
            index_of: HashMap::new(),
            next_handle: 0,
            default_value: UNSET_DEFAULT_VALUE,
            pre_infinity_extrap: Extrapolation::Constant,
            post_infinity_extrap: Extrapolation::Constant,
        }
    }
}

impl PartialEq for RichCurve {
    fn eq(&self, other: &Self) -> bool {
        self.keys == other.keys
            && self.default_value == other.default_value
            && self.pre_infinity_extrap == other.pre_infinity_extrap
            && self.post_infinity_extrap == other.post_infinity_extrap
    }
}

impl RichCurve {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a curve from keys in any order; they are sorted by time.
    pub fn from_keys(mut keys: Vec<RichCurveKey>) -> Self {
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        let mut curve = Self::default();
        curve.handles = (0..keys.len() as u32).map(KeyHandle).collect();
        curve.next_handle = keys.len() as u32;
        curve.keys = keys;
        curve.rebuild_index();
        curve
    }

    /// Convenience: linear keys from `(time, value)` pairs.
    pub fn linear(points: &[(f32, f32)]) -> Self {
        Self::from_keys(points.iter().map(|&(t, v)| RichCurveKey::new(t, v)).collect())
    }

    /// Constant curve: no keys, only a default value.
    pub fn constant(value: f32) -> Self {
        Self {
            default_value: value,
            ..Self::default()
        }
    }

    pub fn with_extrapolation(mut self, pre: Extrapolation, post: Extrapolation) -> Self {
        self.pre_infinity_extrap = pre;
        self.post_infinity_extrap = post;
        self
    }

    fn rebuild_index(&mut self) {
        self.index_of.clear();
        for (idx, handle) in self.handles.iter().enumerate() {
            self.index_of.insert(*handle, idx);
        }
    }

    fn alloc_handle(&mut self) -> KeyHandle {
        let handle = KeyHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        handle
    }

    /// Insert before the first key whose time is not earlier than `key.time`.
    fn insert_sorted(&mut self, key: RichCurveKey, handle: KeyHandle) -> usize {
        let index = self.keys.partition_point(|k| k.time < key.time);
        self.keys.insert(index, key);
        self.handles.insert(index, handle);
        self.rebuild_index();
        index
    }

    // ----- queries -------------------------------------------------------

    pub fn keys(&self) -> &[RichCurveKey] {
        &self.keys
    }

    pub fn num_keys(&self) -> usize {
        self.keys.len()
    }

    pub fn key_handles(&self) -> impl Iterator<Item = KeyHandle> + '_ {
        self.handles.iter().copied()
    }

    pub fn is_key_handle_valid(&self, handle: KeyHandle) -> bool {
        self.index_of.contains_key(&handle)
    }

    pub fn key_index(&self, handle: KeyHandle) -> Option<usize> {
        self.index_of.get(&handle).copied()
    }

    pub fn key_handle(&self, index: usize) -> Option<KeyHandle> {
        self.handles.get(index).copied()
    }

    pub fn get_key(&self, handle: KeyHandle) -> Option<RichCurveKey> {
        self.key_index(handle).map(|idx| self.keys[idx])
    }

    /// Time of a key; 0 for an invalid handle.
    pub fn get_key_time(&self, handle: KeyHandle) -> f32 {
        self.get_key(handle).map(|k| k.time).unwrap_or(0.0)
    }

    /// Value of a key; 0 for an invalid handle.
    pub fn get_key_value(&self, handle: KeyHandle) -> f32 {
        self.get_key(handle).map(|k| k.value).unwrap_or(0.0)
    }

    pub fn first_key(&self) -> Option<&RichCurveKey> {
        self.keys.first()
    }

    pub fn last_key(&self) -> Option<&RichCurveKey> {
        self.keys.last()
    }

    /// Handle of the key closest to `time`, if any.
    pub fn find_key(&self, time: f32, tolerance: f32) -> Option<KeyHandle> {
        self.keys
            .iter()
            .position(|k| (k.time - time).abs() <= tolerance)
            .map(|idx| self.handles[idx])
    }

    /// `(first key time, last key time)`.
    pub fn time_range(&self) -> Option<(f32, f32)> {
        Some((self.keys.first()?.time, self.keys.last()?.time))
    }

    /// `(min key value, max key value)`.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        let first = self.keys.first()?.value;
        Some(self.keys.iter().fold((first, first), |(lo, hi), k| {
            (lo.min(k.value), hi.max(k.value))
        }))
    }

    pub fn has_default_value(&self) -> bool {
        self.default_value != UNSET_DEFAULT_VALUE
    }

    /// Keys or a default value: something worth sampling.
    pub fn has_any_data(&self) -> bool {
        !self.keys.is_empty() || self.has_default_value()
    }

    // ----- evaluation ----------------------------------------------------

    /// Map `time` back into the keyed range for cycling extrapolation,
    /// returning the remapped time and the value offset to add.
    fn remap_time(&self, time: f32) -> (f32, f32) {
        let n = self.keys.len();
        if n < 2 {
            return (time, 0.0);
        }
        let first = &self.keys[0];
        let last = &self.keys[n - 1];
        let (mode, delta) = if time <= first.time {
            (self.pre_infinity_extrap, first.value - last.value)
        } else if time >= last.time {
            (self.post_infinity_extrap, last.value - first.value)
        } else {
            return (time, 0.0);
        };
        if !mode.remaps_time() {
            return (time, 0.0);
        }

        let (min_time, max_time) = (first.time, last.time);
        let (mut cycled, cycles) = cycle_time(min_time, max_time, time);
        let mut offset = 0.0;
        match mode {
            Extrapolation::CycleWithOffset => offset = delta * cycles as f32,
            Extrapolation::Oscillate if cycles % 2 == 1 => {
                cycled = min_time + (max_time - cycled);
            }
            _ => {}
        }
        (cycled, offset)
    }

    /// Value between two adjacent keys, honouring the left key's interpolation.
    fn eval_segment(left: &RichCurveKey, right: &RichCurveKey, time: f32) -> f32 {
        let diff = right.time - left.time;
        if diff > 0.0 && left.interp_mode != InterpMode::Constant {
            let alpha = (time - left.time) / diff;
            let p0 = left.value;
            let p3 = right.value;
            if left.interp_mode == InterpMode::Linear {
                lerp_f32(p0, p3, alpha)
            } else {
                let one_third = 1.0 / 3.0;
                let p1 = p0 + left.leave_tangent * diff * one_third;
                let p2 = p3 - right.arrive_tangent * diff * one_third;
                bezier_interp(p0, p1, p2, p3, alpha)
            }
        } else {
            left.value
        }
    }

    /// Evaluate the curve at `time`; `default_if_empty` is used for key-less
    /// curves that also have no default value of their own.
    pub fn eval(&self, time: f32, default_if_empty: f32) -> f32 {
        let (time, cycle_offset) = self.remap_time(time);
        let n = self.keys.len();

        let value = if n == 0 {
            if self.has_default_value() {
                self.default_value
            } else {
                default_if_empty
            }
        } else if n < 2 || time <= self.keys[0].time {
            let first = &self.keys[0];
            if self.pre_infinity_extrap == Extrapolation::Linear && n > 1 {
                let second = &self.keys[1];
                let dt = second.time - first.time;
                if dt.abs() <= f32::EPSILON {
                    first.value
                } else {
                    let slope = (second.value - first.value) / dt;
                    slope * (time - first.time) + first.value
                }
            } else {
                first.value
            }
        } else if time < self.keys[n - 1].time {
            // First key strictly after `time`; never 0 because time > keys[0].time.
            let right = self.keys.partition_point(|k| k.time <= time);
            Self::eval_segment(&self.keys[right - 1], &self.keys[right], time)
        } else {
            let last = &self.keys[n - 1];
            if self.post_infinity_extrap == Extrapolation::Linear {
                let prev = &self.keys[n - 2];
                let dt = prev.time - last.time;
                if dt.abs() <= f32::EPSILON {
                    last.value
                } else {
                    let slope = (prev.value - last.value) / dt;
                    slope * (time - last.time) + last.value
                }
            } else {
                last.value
            }
        };

        value + cycle_offset
    }

    /// Evaluate with a zero fallback.
    #[inline]
    pub fn sample(&self, time: f32) -> f32 {
        self.eval(time, 0.0)
    }

    // ----- key edits -----------------------------------------------------

    /// Add a key, keeping the time order. With `unwind_rotation` the value is
    /// shifted by whole turns to stay within ±180° of the previous key.
    pub fn add_key(&mut self, time: f32, value: f32, unwind_rotation: bool) -> KeyHandle {
        let handle = self.alloc_handle();
        let index = self.insert_sorted(RichCurveKey::new(time, value), handle);
        if unwind_rotation && index > 0 {
            let previous = self.keys[index - 1].value;
            self.keys[index].value = unwind_degrees(previous, value);
        }
        handle
    }

    /// Insert a fully specified key.
    pub fn add_key_struct(&mut self, key: RichCurveKey) -> KeyHandle {
        let handle = self.alloc_handle();
        self.insert_sorted(key, handle);
        handle
    }

    /// Update the value of the key within `tolerance` of `time`, or add one.
    pub fn update_or_add_key(
        &mut self,
        time: f32,
        value: f32,
        unwind_rotation: bool,
        tolerance: f32,
    ) -> KeyHandle {
        for (idx, key) in self.keys.iter_mut().enumerate() {
            if (key.time - time).abs() <= tolerance {
                key.value = value;
                return self.handles[idx];
            }
            if key.time > time {
                break;
            }
        }
        self.add_key(time, value, unwind_rotation)
    }

    /// Remove a key; invalid handles are ignored.
    pub fn delete_key(&mut self, handle: KeyHandle) {
        if let Some(idx) = self.key_index(handle) {
            self.keys.remove(idx);
            self.handles.remove(idx);
            self.rebuild_index();
        }
    }

    /// Move a key in time, keeping its handle. Returns the key's new index,
    /// or `None` for an invalid handle.
    pub fn set_key_time(&mut self, handle: KeyHandle, time: f32) -> Option<usize> {
        let idx = self.key_index(handle)?;
        let mut key = self.keys.remove(idx);
        self.handles.remove(idx);
        key.time = time;
        Some(self.insert_sorted(key, handle))
    }

    pub fn set_key_value(&mut self, handle: KeyHandle, value: f32, auto_set_tangents: bool) {
        if let Some(idx) = self.key_index(handle) {
            self.keys[idx].value = value;
            if auto_set_tangents {
                self.auto_set_tangents(0.0);
            }
        }
    }

    pub fn set_key_interp_mode(&mut self, handle: KeyHandle, mode: InterpMode) {
        if let Some(idx) = self.key_index(handle) {
            self.keys[idx].interp_mode = mode;
            self.auto_set_tangents(0.0);
        }
    }

    pub fn set_key_tangent_mode(&mut self, handle: KeyHandle, mode: TangentMode) {
        if let Some(idx) = self.key_index(handle) {
            self.keys[idx].tangent_mode = mode;
            self.auto_set_tangents(0.0);
        }
    }

    /// Set explicit tangents; an auto key becomes a user key.
    pub fn set_key_tangents(&mut self, handle: KeyHandle, arrive: f32, leave: f32) {
        if let Some(idx) = self.key_index(handle) {
            let key = &mut self.keys[idx];
            key.arrive_tangent = arrive;
            key.leave_tangent = leave;
            if key.tangent_mode == TangentMode::Auto {
                key.tangent_mode = TangentMode::User;
            }
        }
    }

    /// Remove all keys. Handles issued so far become invalid.
    pub fn reset(&mut self) {
        self.keys.clear();
        self.handles.clear();
        self.index_of.clear();
    }

    /// Recompute tangents of auto keys (Catmull-Rom style, scaled by `1 - tension`).
    pub fn auto_set_tangents(&mut self, tension: f32) {
        let n = self.keys.len();
        for idx in 0..n {
            let mut arrive = self.keys[idx].arrive_tangent;
            let mut leave = self.keys[idx].leave_tangent;
            let key = self.keys[idx];

            if idx == 0 {
                if n > 1 && key.tangent_mode == TangentMode::Auto {
                    leave = 0.0;
                }
            } else if idx < n - 1 {
                let prev = self.keys[idx - 1];
                if key.interp_mode == InterpMode::Cubic && key.tangent_mode == TangentMode::Auto {
                    let next = self.keys[idx + 1];
                    let span = (next.time - prev.time).max(KEY_TIME_TOLERANCE);
                    arrive = (1.0 - tension) * (next.value - prev.value) / span;
                    leave = arrive;
                } else if prev.interp_mode == InterpMode::Constant
                    || key.interp_mode == InterpMode::Constant
                {
                    if prev.interp_mode != InterpMode::Cubic {
                        arrive = 0.0;
                    }
                    leave = 0.0;
                }
            } else if key.interp_mode == InterpMode::Cubic && key.tangent_mode == TangentMode::Auto {
                arrive = 0.0;
            }

            self.keys[idx].arrive_tangent = arrive;
            self.keys[idx].leave_tangent = leave;
        }
    }

    fn selected_handles(&self, subset: Option<&[KeyHandle]>) -> Vec<KeyHandle> {
        match subset {
            Some(handles) => handles
                .iter()
                .copied()
                .filter(|h| self.is_key_handle_valid(*h))
                .collect(),
            None => self.handles.clone(),
        }
    }

    /// Move every key (or only `subset`) by `delta`.
    pub fn shift_curve(&mut self, delta: f32, subset: Option<&[KeyHandle]>) {
        for handle in self.selected_handles(subset) {
            let time = self.get_key_time(handle);
            self.set_key_time(handle, time + delta);
        }
    }

    /// Scale key times about `origin` by `factor`.
    pub fn scale_curve(&mut self, origin: f32, factor: f32, subset: Option<&[KeyHandle]>) {
        for handle in self.selected_handles(subset) {
            let time = self.get_key_time(handle);
            self.set_key_time(handle, (time - origin) * factor + origin);
        }
    }

    /// Insert a key every `sample_rate` seconds strictly inside `[first, last]`
    /// (defaults to the keyed range). Samples are taken before any key is added.
    pub fn bake_curve(&mut self, sample_rate: f32, first: Option<f32>, last: Option<f32>) {
        if !(sample_rate > 0.0) {
            return;
        }
        let Some((key_first, key_last)) = self.time_range() else {
            return;
        };
        let first = first.unwrap_or(key_first);
        let last = last.unwrap_or(key_last);

        let mut baked = Vec::new();
        let mut prev = first;
        for step in 1u32.. {
            let time = first + step as f32 * sample_rate;
            // Stop once the step no longer moves time forward at this magnitude.
            if time >= last || time <= prev {
                break;
            }
            baked.push((time, self.sample(time)));
            prev = time;
        }
        for (time, value) in baked {
            self.update_or_add_key(time, value, false, KEY_TIME_TOLERANCE);
        }
    }

    /// Drop inner keys in `[first, last]` whose value is reproduced within
    /// `tolerance` by the segment from the last kept key to the following key.
    pub fn remove_redundant_keys(&mut self, tolerance: f32, first: Option<f32>, last: Option<f32>) {
        if self.keys.len() < 3 {
            return;
        }
        let first = first.unwrap_or(f32::MIN);
        let last = last.unwrap_or(f32::MAX);

        let mut start_keep = None;
        let mut end_keep = None;
        for (idx, key) in self.keys.iter().enumerate() {
            if key.time <= first {
                start_keep = Some(idx);
            }
            if key.time >= last {
                end_keep = Some(idx);
                break;
            }
        }
        // Open-ended ranges keep the boundary keys.
        let start_keep = start_keep.unwrap_or(0);
        let end_keep = end_keep.unwrap_or(self.keys.len() - 1);
        if start_keep >= end_keep {
            return;
        }

        let mut kept_keys = Vec::with_capacity(self.keys.len());
        let mut kept_handles = Vec::with_capacity(self.keys.len());
        for idx in 0..=start_keep {
            kept_keys.push(self.keys[idx]);
            kept_handles.push(self.handles[idx]);
        }
        let mut last_kept = start_keep;
        for idx in (start_keep + 1)..end_keep {
            let without =
                Self::eval_segment(&self.keys[last_kept], &self.keys[idx + 1], self.keys[idx].time);
            if (without - self.keys[idx].value).abs() > tolerance {
                last_kept = idx;
                kept_keys.push(self.keys[idx]);
                kept_handles.push(self.handles[idx]);
            }
        }
        for idx in end_keep..self.keys.len() {
            kept_keys.push(self.keys[idx]);
            kept_handles.push(self.handles[idx]);
        }

        self.keys = kept_keys;
        self.handles = kept_handles;
        self.rebuild_index();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32, eps: f32) {
        assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
    }

    #[test]
    fn empty_curve_uses_defaults() {
        let c = RichCurve::new();
        assert_eq!(c.eval(3.0, 7.0), 7.0);
        assert!(!c.has_any_data());
        let c = RichCurve::constant(2.5);
        assert_eq!(c.eval(3.0, 7.0), 2.5);
        assert!(c.has_any_data());
    }

    #[test]
    fn linear_keys_and_extrapolation() {
        let mut c = RichCurve::linear(&[(0.0, 0.0), (10.0, 100.0)]);
        approx(c.sample(5.0), 50.0, 1e-5);
        assert_eq!(c.sample(-5.0), 0.0);
        assert_eq!(c.sample(15.0), 100.0);
        c.post_infinity_extrap = Extrapolation::Linear;
        c.pre_infinity_extrap = Extrapolation::Linear;
        approx(c.sample(15.0), 150.0, 1e-4);
        approx(c.sample(-5.0), -50.0, 1e-4);
    }

    #[test]
    fn constant_interp_holds_left_value() {
        let c = RichCurve::from_keys(vec![
            RichCurveKey::new(0.0, 1.0).with_interp(InterpMode::Constant),
            RichCurveKey::new(1.0, 5.0),
        ]);
        assert_eq!(c.sample(0.99), 1.0);
        assert_eq!(c.sample(1.0), 5.0);
    }

    #[test]
    fn cubic_with_flat_tangents_is_smoothstep_like() {
        let c = RichCurve::from_keys(vec![
            RichCurveKey::cubic(0.0, 0.0, 0.0, 0.0),
            RichCurveKey::cubic(1.0, 1.0, 0.0, 0.0),
        ]);
        approx(c.sample(0.5), 0.5, 1e-6);
        assert!(c.sample(0.25) < 0.25);
        assert!(c.sample(0.75) > 0.75);
    }

    #[test]
    fn cubic_with_linear_tangents_matches_line() {
        let c = RichCurve::from_keys(vec![
            RichCurveKey::cubic(0.0, 0.0, 2.0, 2.0),
            RichCurveKey::cubic(2.0, 4.0, 2.0, 2.0),
        ]);
        approx(c.sample(0.5), 1.0, 1e-5);
        approx(c.sample(1.5), 3.0, 1e-5);
    }

    #[test]
    fn cycle_modes() {
        let base = RichCurve::linear(&[(0.0, 0.0), (10.0, 10.0)]);

        let cycle = base
            .clone()
            .with_extrapolation(Extrapolation::Cycle, Extrapolation::Cycle);
        approx(cycle.sample(15.0), 5.0, 1e-5);
        approx(cycle.sample(-3.0), 7.0, 1e-5);

        let offset = base
            .clone()
            .with_extrapolation(Extrapolation::CycleWithOffset, Extrapolation::CycleWithOffset);
        approx(offset.sample(15.0), 15.0, 1e-5);
        approx(offset.sample(25.0), 25.0, 1e-4);
        approx(offset.sample(-3.0), -3.0, 1e-5);

        let osc = base.with_extrapolation(Extrapolation::Oscillate, Extrapolation::Oscillate);
        approx(osc.sample(12.0), 8.0, 1e-5);
        approx(osc.sample(22.0), 2.0, 1e-5);
    }

    #[test]
    fn keys_stay_sorted_and_handles_stable() {
        let mut c = RichCurve::new();
        let h2 = c.add_key(2.0, 20.0, false);
        let h0 = c.add_key(0.0, 0.0, false);
        let h1 = c.add_key(1.0, 10.0, false);
        let times: Vec<f32> = c.keys().iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 1.0, 2.0]);
        assert_eq!(c.get_key_value(h1), 10.0);

        c.set_key_time(h0, 3.0);
        assert_eq!(c.key_index(h0), Some(2));
        assert_eq!(c.key_index(h2), Some(1));

        c.delete_key(h1);
        assert!(!c.is_key_handle_valid(h1));
        assert_eq!(c.get_key_value(h1), 0.0);
        assert_eq!(c.get_key_time(h1), 0.0);
        // Invalid handles are no-ops.
        c.delete_key(h1);
        c.set_key_value(h1, 5.0, true);
        assert_eq!(c.num_keys(), 2);
    }

    #[test]
    fn update_or_add_uses_tolerance() {
        let mut c = RichCurve::linear(&[(0.0, 0.0), (1.0, 1.0)]);
        let h = c.update_or_add_key(1.00005, 3.0, false, KEY_TIME_TOLERANCE);
        assert_eq!(c.num_keys(), 2);
        assert_eq!(c.get_key_value(h), 3.0);
        c.update_or_add_key(0.5, 9.0, false, KEY_TIME_TOLERANCE);
        assert_eq!(c.num_keys(), 3);
    }

    #[test]
    fn add_key_unwinds_rotation() {
        let mut c = RichCurve::new();
        c.add_key(0.0, 170.0, true);
        let h = c.add_key(1.0, -170.0, true);
        assert_eq!(c.get_key_value(h), 190.0);
    }

    #[test]
    fn auto_tangents_catmull_rom() {
        let mut c = RichCurve::from_keys(vec![
            RichCurveKey::new(0.0, 0.0).with_interp(InterpMode::Cubic),
            RichCurveKey::new(1.0, 1.0).with_interp(InterpMode::Cubic),
            RichCurveKey::new(2.0, 4.0).with_interp(InterpMode::Cubic),
        ]);
        c.keys[0].leave_tangent = 9.0;
        c.keys[2].arrive_tangent = 9.0;
        c.auto_set_tangents(0.0);
        assert_eq!(c.keys()[0].leave_tangent, 0.0);
        approx(c.keys()[1].arrive_tangent, 2.0, 1e-6);
        approx(c.keys()[1].leave_tangent, 2.0, 1e-6);
        assert_eq!(c.keys()[2].arrive_tangent, 0.0);

        c.auto_set_tangents(0.5);
        approx(c.keys()[1].arrive_tangent, 1.0, 1e-6);
    }

    #[test]
    fn constant_neighbours_flatten_tangents() {
        let mut c = RichCurve::from_keys(vec![
            RichCurveKey::new(0.0, 0.0).with_interp(InterpMode::Constant),
            RichCurveKey {
                tangent_mode: TangentMode::User,
                arrive_tangent: 3.0,
                leave_tangent: 3.0,
                ..RichCurveKey::new(1.0, 1.0)
            },
            RichCurveKey::new(2.0, 4.0),
        ]);
        c.auto_set_tangents(0.0);
        assert_eq!(c.keys()[1].arrive_tangent, 0.0);
        assert_eq!(c.keys()[1].leave_tangent, 0.0);
    }

    #[test]
    fn shift_and_scale() {
        let mut c = RichCurve::linear(&[(0.0, 0.0), (2.0, 2.0)]);
        c.shift_curve(1.0, None);
        assert_eq!(c.time_range(), Some((1.0, 3.0)));
        c.scale_curve(1.0, 2.0, None);
        assert_eq!(c.time_range(), Some((1.0, 5.0)));

        let last = c.key_handle(1).unwrap();
        c.shift_curve(-10.0, Some(&[last]));
        assert_eq!(c.time_range(), Some((-5.0, 1.0)));
        assert_eq!(c.key_index(last), Some(0));
    }

    #[test]
    fn bake_then_reduce() {
        let mut c = RichCurve::linear(&[(0.0, 0.0), (1.0, 1.0)]);
        c.bake_curve(0.25, None, None);
        let times: Vec<f32> = c.keys().iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        approx(c.sample(0.5), 0.5, 1e-6);

        c.remove_redundant_keys(1e-4, None, None);
        assert_eq!(c.num_keys(), 2);
        approx(c.sample(0.5), 0.5, 1e-6);
    }

    #[test]
    fn reduce_keeps_needed_keys() {
        let mut c = RichCurve::linear(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0), (3.0, -1.0)]);
        c.remove_redundant_keys(1e-4, None, None);
        let times: Vec<f32> = c.keys().iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 1.0, 3.0]);
    }

    #[test]
    fn serde_regenerates_handles() {
        let c = RichCurve::linear(&[(1.0, 2.0), (0.0, 1.0)])
            .with_extrapolation(Extrapolation::Linear, Extrapolation::Cycle);
        let json = serde_json::to_string(&c).unwrap();
        let back: RichCurve = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
        assert_eq!(back.key_handles().count(), 2);

        let sparse: RichCurve =
            serde_json::from_str(r#"{ "keys": [{ "time": 1.0, "value": 3.0 }, { "time": 0.0, "value": 1.0 }] }"#)
                .unwrap();
        assert_eq!(sparse.keys()[0].time, 0.0);
        assert!(!sparse.has_default_value());
    }
}
