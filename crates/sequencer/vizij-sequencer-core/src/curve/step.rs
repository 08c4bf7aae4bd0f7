//! Step-only keyed curve for integral, boolean and text data.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepKey<V> {
    pub time: f32,
    pub value: V,
}

/// Sorted `(time, value)` keys; evaluation holds the last key at or before the time.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StepCurve<V> {
    keys: Vec<StepKey<V>>,
    pub default_value: Option<V>,
}

#[derive(Deserialize)]
struct StepCurveRecord<V> {
    #[serde(default = "Vec::new")]
    keys: Vec<StepKey<V>>,
    #[serde(default = "Option::default")]
    default_value: Option<V>,
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for StepCurve<V> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let record = StepCurveRecord::<V>::deserialize(deserializer)?;
        let mut curve = StepCurve {
            keys: record.keys,
            default_value: record.default_value,
        };
        curve.keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(curve)
    }
}

impl<V> Default for StepCurve<V> {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            default_value: None,
        }
    }
}

impl<V: Clone> StepCurve<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_keys(keys: impl IntoIterator<Item = (f32, V)>) -> Self {
        let mut curve = Self::default();
        for (time, value) in keys {
            curve.add_key(time, value);
        }
        curve
    }

    pub fn keys(&self) -> &[StepKey<V>] {
        &self.keys
    }

    pub fn num_keys(&self) -> usize {
        self.keys.len()
    }

    pub fn has_any_data(&self) -> bool {
        !self.keys.is_empty() || self.default_value.is_some()
    }

    /// Insert after any keys at the same time; returns the key index.
    pub fn add_key(&mut self, time: f32, value: V) -> usize {
        let index = self.keys.partition_point(|k| k.time <= time);
        self.keys.insert(index, StepKey { time, value });
        index
    }

    pub fn update_or_add_key(&mut self, time: f32, value: V, tolerance: f32) -> usize {
        if let Some(index) = self
            .keys
            .iter()
            .position(|k| (k.time - time).abs() <= tolerance)
        {
            self.keys[index].value = value;
            return index;
        }
        self.add_key(time, value)
    }

    pub fn delete_key_at_index(&mut self, index: usize) -> Option<StepKey<V>> {
        (index < self.keys.len()).then(|| self.keys.remove(index))
    }

    /// Value at `time`; `default_if_empty` covers key-less curves without a default.
    pub fn eval(&self, time: f32, default_if_empty: Option<V>) -> Option<V> {
        let Some(first) = self.keys.first() else {
            return self.default_value.clone().or(default_if_empty);
        };
        let after = self.keys.partition_point(|k| k.time <= time);
        if after == 0 {
            Some(first.value.clone())
        } else {
            Some(self.keys[after - 1].value.clone())
        }
    }

    pub fn shift(&mut self, delta: f32) {
        for key in &mut self.keys {
            key.time += delta;
        }
    }

    pub fn scale(&mut self, origin: f32, factor: f32) {
        for key in &mut self.keys {
            key.time = (key.time - origin) * factor + origin;
        }
        if factor < 0.0 {
            self.keys.reverse();
        }
    }

    pub fn time_range(&self) -> Option<(f32, f32)> {
        Some((self.keys.first()?.time, self.keys.last()?.time))
    }
}
