//! Identifiers and simple allocators for core entities.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Handle of a sequence loaded into an [`Engine`](crate::Engine).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SequenceId(pub u32);

/// Persistent identity of an object binding inside a sequence.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BindingId(pub Uuid);

impl BindingId {
    pub fn new_v4() -> Self {
        BindingId(Uuid::new_v4())
    }
}

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Monotonic allocator for SequenceId.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_sequence: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_sequence(&mut self) -> SequenceId {
        let id = SequenceId(self.next_sequence);
        self.next_sequence = self.next_sequence.wrapping_add(1);
        id
    }
}
