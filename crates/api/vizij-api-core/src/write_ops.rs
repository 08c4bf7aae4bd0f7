//! Write operations produced by an evaluation pass, describing property
//! assignments on bound objects.
//!
//! WriteOp serializes to JSON as:
//!   { "path": "stage/Door.RelativeTransform", "value": { "type": "transform", "data": { ... } } }
//!
//! WriteBatch is an ordered Vec<WriteOp>; later ops win when a host applies it.

use crate::{typed_path::TypedPath, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteOp {
    pub path: TypedPath,
    pub value: Value,
}

impl WriteOp {
    pub fn new(path: TypedPath, value: Value) -> Self {
        Self { path, value }
    }
}

/// A batch of write operations. The sequencer emits one per evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteBatch(pub Vec<WriteOp>);

impl WriteBatch {
    pub fn new() -> Self {
        WriteBatch(Vec::new())
    }

    pub fn with_capacity(cap: usize) -> Self {
        WriteBatch(Vec::with_capacity(cap))
    }

    pub fn push(&mut self, op: WriteOp) {
        self.0.push(op);
    }

    pub fn extend(&mut self, other: impl IntoIterator<Item = WriteOp>) {
        self.0.extend(other);
    }

    pub fn into_vec(self) -> Vec<WriteOp> {
        self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &WriteOp> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value of the last op targeting `path`, i.e. what a host ends up with.
    pub fn get(&self, path: &TypedPath) -> Option<&Value> {
        self.0
            .iter()
            .rev()
            .find(|op| &op.path == path)
            .map(|op| &op.value)
    }

    pub fn append(&mut self, mut other: WriteBatch) {
        self.0.append(&mut other.0)
    }
}

impl IntoIterator for WriteBatch {
    type Item = WriteOp;
    type IntoIter = std::vec::IntoIter<WriteOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let val = serde_json::to_string(&self.value).map_err(|_| fmt::Error)?;
        write!(f, "{{ path: {}, value: {} }}", self.path, val)
    }
}
