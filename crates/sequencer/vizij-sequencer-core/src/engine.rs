//! Engine: owns loaded sequences and evaluates them into write batches.
//!
//! Methods:
//! - new, load_sequence, unload_sequence, sequence, sequence_mut
//! - evaluate (compile if needed → accumulate every contributing section → resolve)

use log::{debug, warn};
use vizij_api_core::{TypedPath, WriteBatch};

use crate::accumulate::Accumulator;
use crate::binding::{BindingResolver, Operand, PropertyValueSource};
use crate::config::Config;
use crate::error::SequencerError;
use crate::ids::{BindingId, IdAllocator, SequenceId};
use crate::sequence::Sequence;
use crate::template::{EvaluationContext, SectionTemplate};

#[derive(Debug)]
struct CompiledTrack {
    name: String,
    property: String,
    sections: Vec<SectionTemplate>,
}

#[derive(Debug)]
struct CompiledBinding {
    id: BindingId,
    tracks: Vec<CompiledTrack>,
}

#[derive(Debug)]
struct LoadedSequence {
    id: SequenceId,
    sequence: Sequence,
    /// Rebuilt lazily after load or mutable access.
    compiled: Option<Vec<CompiledBinding>>,
}

fn compile(sequence: &Sequence, cfg: &Config) -> Result<Vec<CompiledBinding>, SequencerError> {
    sequence.validate()?;
    let bindings = sequence
        .bindings
        .iter()
        .map(|binding| CompiledBinding {
            id: binding.id,
            tracks: binding
                .tracks
                .iter()
                .map(|track| CompiledTrack {
                    name: track.name.clone(),
                    property: track.property.clone(),
                    sections: track
                        .sections
                        .iter()
                        .map(|s| {
                            SectionTemplate::compile(
                                s,
                                cfg.default_blend_type,
                                cfg.auto_tangent_tension,
                            )
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();
    Ok(bindings)
}

#[derive(Debug, Default)]
pub struct Engine {
    cfg: Config,
    ids: IdAllocator,
    sequences: Vec<LoadedSequence>,
}

impl Engine {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            ids: IdAllocator::new(),
            sequences: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Validate and store a sequence.
    pub fn load_sequence(&mut self, sequence: Sequence) -> Result<SequenceId, SequencerError> {
        let compiled = compile(&sequence, &self.cfg)?;
        let id = self.ids.alloc_sequence();
        self.sequences.push(LoadedSequence {
            id,
            sequence,
            compiled: Some(compiled),
        });
        Ok(id)
    }

    pub fn unload_sequence(&mut self, id: SequenceId) -> Option<Sequence> {
        let idx = self.sequences.iter().position(|s| s.id == id)?;
        Some(self.sequences.remove(idx).sequence)
    }

    pub fn sequence(&self, id: SequenceId) -> Option<&Sequence> {
        self.sequences
            .iter()
            .find(|s| s.id == id)
            .map(|s| &s.sequence)
    }

    /// Mutable access; auto easing is refreshed and the sequence recompiled on
    /// its next evaluation.
    pub fn sequence_mut(&mut self, id: SequenceId) -> Option<&mut Sequence> {
        let loaded = self.sequences.iter_mut().find(|s| s.id == id)?;
        loaded.compiled = None;
        Some(&mut loaded.sequence)
    }

    /// Evaluate sequence `id` at `time`.
    ///
    /// Every active section containing `time` contributes to the property it
    /// animates on each object its binding resolves to. Blends are resolved
    /// only after all sections were accumulated.
    pub fn evaluate(
        &mut self,
        id: SequenceId,
        time: f32,
        resolver: &mut dyn BindingResolver,
        source: &dyn PropertyValueSource,
    ) -> Result<WriteBatch, SequencerError> {
        let cfg = &self.cfg;
        let loaded = self
            .sequences
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(SequencerError::UnknownSequence(id))?;

        if loaded.compiled.is_none() {
            loaded.sequence.update_easing();
            loaded.compiled = Some(compile(&loaded.sequence, cfg)?);
        }
        let Some(bindings) = loaded.compiled.as_ref() else {
            return Ok(WriteBatch::new());
        };

        let mut accumulator = Accumulator::with_capacity(cfg.scratch_paths);
        for binding in bindings {
            let operand = Operand::new(id, binding.id);
            let objects = resolver.resolve(&operand);
            if objects.is_empty() {
                if cfg.warn_on_unresolved_bindings {
                    warn!("binding {} of sequence {:?} resolved to no objects", binding.id, id);
                }
                continue;
            }

            for track in &binding.tracks {
                let paths: Vec<TypedPath> = objects
                    .iter()
                    .filter_map(|object| match object.with_property(&track.property) {
                        Ok(path) => Some(path),
                        Err(err) => {
                            warn!("track '{}': {err}", track.name);
                            None
                        }
                    })
                    .collect();

                for (idx, section) in track.sections.iter().enumerate() {
                    if !section.is_active() {
                        debug!("track '{}': section {idx} inactive, skipped", track.name);
                        continue;
                    }
                    if !section.is_time_within(time) {
                        continue;
                    }
                    for path in &paths {
                        let ctx = EvaluationContext {
                            time,
                            path,
                            source,
                        };
                        section.evaluate(&ctx, &mut accumulator);
                    }
                }
            }
        }

        Ok(accumulator.resolve_and_apply(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::StaticBindings;
    use crate::curve::RichCurve;
    use crate::section::{Section, SectionData};
    use crate::sequence::ObjectBinding;
    use crate::store::PropertyStore;
    use crate::track::PropertyTrack;
    use vizij_api_core::{Value, ValueKind};

    fn opacity_sequence() -> (Sequence, BindingId) {
        let mut track = PropertyTrack::new("Opacity", "Opacity", ValueKind::Float);
        track
            .add_section(Section::new(
                0.0,
                10.0,
                SectionData::Float {
                    curve: RichCurve::linear(&[(0.0, 0.0), (10.0, 1.0)]),
                },
            ))
            .unwrap();
        let mut binding = ObjectBinding::new("Panel");
        binding.add_track(track);
        let mut seq = Sequence::new("fade");
        let id = seq.add_binding(binding);
        (seq, id)
    }

    #[test]
    fn unknown_sequence_errors() {
        let mut engine = Engine::new(Config::default());
        let store = PropertyStore::new();
        let mut bindings = StaticBindings::new();
        assert!(matches!(
            engine.evaluate(SequenceId(3), 0.0, &mut bindings, &store),
            Err(SequencerError::UnknownSequence(SequenceId(3)))
        ));
    }

    #[test]
    fn evaluates_bound_objects() {
        let (seq, binding) = opacity_sequence();
        let mut engine = Engine::new(Config::default());
        let id = engine.load_sequence(seq).unwrap();
        let mut bindings = StaticBindings::new();
        bindings.bind(binding, TypedPath::parse("ui/Panel").unwrap());
        let store = PropertyStore::new();

        let batch = engine.evaluate(id, 5.0, &mut bindings, &store).unwrap();
        let path = TypedPath::parse("ui/Panel.Opacity").unwrap();
        assert_eq!(batch.get(&path), Some(&Value::Float(0.5)));

        // Past the end nothing contributes.
        let batch = engine.evaluate(id, 10.0, &mut bindings, &store).unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn mutation_recompiles() {
        let (seq, binding) = opacity_sequence();
        let mut engine = Engine::new(Config::default());
        let id = engine.load_sequence(seq).unwrap();
        let mut bindings = StaticBindings::new();
        bindings.bind(binding, TypedPath::parse("ui/Panel").unwrap());
        let store = PropertyStore::new();

        engine.sequence_mut(id).unwrap().bindings[0].tracks[0].sections[0].is_active = false;
        let batch = engine.evaluate(id, 5.0, &mut bindings, &store).unwrap();
        assert!(batch.is_empty());
        assert!(engine.unload_sequence(id).is_some());
        assert!(engine.sequence(id).is_none());
    }
}
