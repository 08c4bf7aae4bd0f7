//! Binding resolution and property value lookup traits.
//!
//! Hosts implement [`BindingResolver`] to map an object binding onto the
//! objects it animates, and [`PropertyValueSource`] to expose property values
//! the blender falls back on. Both are passed into `Engine::evaluate`.

use hashbrown::HashMap;
use vizij_api_core::{TypedPath, Value};

use crate::ids::{BindingId, SequenceId};

/// One object binding of one loaded sequence.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Operand {
    pub sequence: SequenceId,
    pub binding: BindingId,
}

impl Operand {
    pub fn new(sequence: SequenceId, binding: BindingId) -> Self {
        Self { sequence, binding }
    }
}

/// Resolve an operand to the object paths it is bound to (possibly none).
pub trait BindingResolver {
    fn resolve(&mut self, operand: &Operand) -> Vec<TypedPath>;
}

/// Read access to property values outside the sequencer.
pub trait PropertyValueSource {
    /// Value before any animation touched the property.
    fn initial_value(&self, path: &TypedPath) -> Option<Value>;

    /// Value the property holds right now.
    fn current_value(&self, path: &TypedPath) -> Option<Value>;
}

/// Fixed binding table keyed by binding id, shared by every sequence.
#[derive(Clone, Debug, Default)]
pub struct StaticBindings {
    rows: HashMap<BindingId, Vec<TypedPath>>,
}

impl StaticBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `object` to the objects bound by `binding`.
    pub fn bind(&mut self, binding: BindingId, object: TypedPath) {
        let row = self.rows.entry(binding).or_default();
        if !row.contains(&object) {
            row.push(object);
        }
    }

    pub fn unbind(&mut self, binding: BindingId) {
        self.rows.remove(&binding);
    }
}

impl BindingResolver for StaticBindings {
    fn resolve(&mut self, operand: &Operand) -> Vec<TypedPath> {
        self.rows.get(&operand.binding).cloned().unwrap_or_default()
    }
}

/// Initial value, then current value.
pub(crate) fn initial_or_current(
    source: &dyn PropertyValueSource,
    path: &TypedPath,
) -> Option<Value> {
    source
        .initial_value(path)
        .or_else(|| source.current_value(path))
}

/// Current value, then initial value.
pub(crate) fn current_or_initial(
    source: &dyn PropertyValueSource,
    path: &TypedPath,
) -> Option<Value> {
    source
        .current_value(path)
        .or_else(|| source.initial_value(path))
}
