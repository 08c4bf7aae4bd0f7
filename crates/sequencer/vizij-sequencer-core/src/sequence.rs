//! Sequence model: object bindings owning property tracks, plus JSON loading.
//!
//! JSON layout:
//! ```json
//! {
//!   "name": "DoorOpen",
//!   "bindings": [{
//!     "id": "6f1c...", "name": "Door",
//!     "tracks": [{ "name": "Transform", "property": "Transform", "kind": "transform",
//!                  "sections": [ ... ] }]
//!   }]
//! }
//! ```

use serde::{Deserialize, Serialize};
use vizij_api_core::TypedPath;

use crate::error::SequencerError;
use crate::ids::BindingId;
use crate::track::PropertyTrack;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectBinding {
    pub id: BindingId,
    pub name: String,
    #[serde(default)]
    pub tracks: Vec<PropertyTrack>,
}

impl ObjectBinding {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: BindingId::new_v4(),
            name: name.into(),
            tracks: Vec::new(),
        }
    }

    pub fn add_track(&mut self, track: PropertyTrack) -> usize {
        self.tracks.push(track);
        self.tracks.len() - 1
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    pub name: String,
    #[serde(default)]
    pub bindings: Vec<ObjectBinding>,
}

impl Sequence {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bindings: Vec::new(),
        }
    }

    /// Add a binding and return its id.
    pub fn add_binding(&mut self, binding: ObjectBinding) -> BindingId {
        let id = binding.id;
        self.bindings.push(binding);
        id
    }

    pub fn binding(&self, id: BindingId) -> Option<&ObjectBinding> {
        self.bindings.iter().find(|b| b.id == id)
    }

    pub fn binding_mut(&mut self, id: BindingId) -> Option<&mut ObjectBinding> {
        self.bindings.iter_mut().find(|b| b.id == id)
    }

    /// Check every track's property path and sections.
    pub fn validate(&self) -> Result<(), SequencerError> {
        let probe = TypedPath::new(Vec::new(), "probe", Vec::new());
        for binding in &self.bindings {
            for track in &binding.tracks {
                probe
                    .with_property(&track.property)
                    .map_err(|source| SequencerError::InvalidProperty {
                        track: track.name.clone(),
                        source,
                    })?;
                track.validate()?;
            }
        }
        Ok(())
    }

    /// Recompute auto easing on every track.
    pub fn update_easing(&mut self) {
        for binding in &mut self.bindings {
            for track in &mut binding.tracks {
                track.update_easing();
            }
        }
    }
}

/// Parse and validate a sequence from JSON.
pub fn parse_sequence_json(s: &str) -> Result<Sequence, SequencerError> {
    let mut sequence: Sequence = serde_json::from_str(s)?;
    sequence.validate()?;
    sequence.update_easing();
    Ok(sequence)
}
