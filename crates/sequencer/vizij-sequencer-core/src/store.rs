//! In-memory property store for hosts and tests.
//!
//! Holds current property values and snapshots the pre-animation value of a
//! property the first time a write batch touches it, so animated properties
//! can be restored afterwards.

use hashbrown::HashMap;
use vizij_api_core::{TypedPath, Value, WriteBatch};

use crate::binding::PropertyValueSource;

#[derive(Clone, Debug, Default)]
pub struct PropertyStore {
    current: HashMap<TypedPath, Value>,
    /// `None` when the property had no value before it was animated.
    initial: HashMap<TypedPath, Option<Value>>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value outside of animation (does not touch snapshots).
    pub fn set(&mut self, path: TypedPath, value: Value) {
        self.current.insert(path, value);
    }

    pub fn get(&self, path: &TypedPath) -> Option<&Value> {
        self.current.get(path)
    }

    pub fn is_animated(&self, path: &TypedPath) -> bool {
        self.initial.contains_key(path)
    }

    /// Apply a batch, snapshotting untouched properties first.
    pub fn apply(&mut self, batch: &WriteBatch) {
        for op in batch.iter() {
            if !self.initial.contains_key(&op.path) {
                let before = self.current.get(&op.path).cloned();
                self.initial.insert(op.path.clone(), before);
            }
            self.current.insert(op.path.clone(), op.value.clone());
        }
    }

    /// Put every animated property back to its snapshot and forget the snapshots.
    pub fn restore_initial(&mut self) {
        for (path, before) in self.initial.drain() {
            match before {
                Some(value) => {
                    self.current.insert(path, value);
                }
                None => {
                    self.current.remove(&path);
                }
            }
        }
    }
}

impl PropertyValueSource for PropertyStore {
    fn initial_value(&self, path: &TypedPath) -> Option<Value> {
        match self.initial.get(path) {
            Some(before) => before.clone(),
            None => self.current.get(path).cloned(),
        }
    }

    fn current_value(&self, path: &TypedPath) -> Option<Value> {
        self.current.get(path).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vizij_api_core::WriteOp;

    #[test]
    fn snapshot_on_first_touch() {
        let p = TypedPath::parse("stage/A.Opacity").unwrap();
        let q = TypedPath::parse("stage/A.Tint").unwrap();
        let mut store = PropertyStore::new();
        store.set(p.clone(), Value::Float(1.0));

        let mut batch = WriteBatch::new();
        batch.push(WriteOp::new(p.clone(), Value::Float(0.2)));
        batch.push(WriteOp::new(q.clone(), Value::ColorRgba([1.0; 4])));
        store.apply(&batch);
        store.apply(&WriteBatch(vec![WriteOp::new(p.clone(), Value::Float(0.4))]));

        assert_eq!(store.initial_value(&p), Some(Value::Float(1.0)));
        assert_eq!(store.current_value(&p), Some(Value::Float(0.4)));
        assert_eq!(store.initial_value(&q), None);
        assert!(store.is_animated(&q));

        store.restore_initial();
        assert_eq!(store.get(&p), Some(&Value::Float(1.0)));
        assert_eq!(store.get(&q), None);
        assert!(!store.is_animated(&p));
    }
}
