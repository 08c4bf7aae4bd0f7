//! Property tracks: ordered sections animating one property of a binding.

use serde::{Deserialize, Serialize};
use vizij_api_core::ValueKind;

use crate::blend_type::{BlendType, BlendTypeField};
use crate::error::SequencerError;
use crate::section::Section;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyTrack {
    pub name: String,
    /// Dotted property path appended to each bound object ("Transform", "Style.Opacity").
    pub property: String,
    pub kind: ValueKind,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default = "BlendTypeField::all")]
    pub supported_blend_types: BlendTypeField,
}

impl PropertyTrack {
    /// Blendable kinds support every blend type; step kinds only absolute.
    pub fn new(name: impl Into<String>, property: impl Into<String>, kind: ValueKind) -> Self {
        let supported_blend_types = if kind.is_blendable() {
            BlendTypeField::all()
        } else {
            BlendType::Absolute.into()
        };
        Self {
            name: name.into(),
            property: property.into(),
            kind,
            sections: Vec::new(),
            supported_blend_types,
        }
    }

    /// Check that `section` could live on this track.
    pub fn validate_section(&self, section: &Section) -> Result<(), SequencerError> {
        if !section.is_infinite && section.start_time > section.end_time {
            return Err(SequencerError::InvalidSectionRange {
                start: section.start_time,
                end: section.end_time,
            });
        }
        if section.kind() != self.kind {
            return Err(SequencerError::SectionKindMismatch {
                track: self.name.clone(),
                expected: self.kind,
                found: section.kind(),
            });
        }
        if let Some(blend_type) = section.blend_type {
            let step_only = !self.kind.is_blendable() && blend_type != BlendType::Absolute;
            if step_only || !self.supported_blend_types.contains(blend_type) {
                return Err(SequencerError::UnsupportedBlendType {
                    track: self.name.clone(),
                    blend_type,
                });
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SequencerError> {
        self.sections
            .iter()
            .try_for_each(|section| self.validate_section(section))
    }

    /// Append a section and refresh auto easing; returns its index.
    pub fn add_section(&mut self, section: Section) -> Result<usize, SequencerError> {
        self.validate_section(&section)?;
        self.sections.push(section);
        self.update_easing();
        Ok(self.sections.len() - 1)
    }

    pub fn remove_section(&mut self, index: usize) -> Option<Section> {
        if index >= self.sections.len() {
            return None;
        }
        let removed = self.sections.remove(index);
        self.update_easing();
        Some(removed)
    }

    /// Split section `index` at `time`; the new right half is appended and its
    /// index returned.
    pub fn split_section(&mut self, index: usize, time: f32) -> Option<usize> {
        let right = self.sections.get_mut(index)?.split_section(time)?;
        self.sections.push(right);
        self.update_easing();
        Some(self.sections.len() - 1)
    }

    pub fn max_row_index(&self) -> u32 {
        self.sections.iter().map(|s| s.row_index).max().unwrap_or(0)
    }

    /// Active sections evaluated at `time`, in stored order.
    pub fn sections_at(&self, time: f32) -> impl Iterator<Item = &Section> + '_ {
        self.sections
            .iter()
            .filter(move |s| s.is_active && s.is_time_within(time))
    }

    /// Recompute automatic ease times from overlaps with other sections on
    /// the same row. When the ease-in and ease-out times together exceed the
    /// section length both are scaled down proportionally.
    pub fn update_easing(&mut self) {
        let ranges: Vec<(u32, Option<(f32, f32)>)> = self
            .sections
            .iter()
            .map(|s| (s.row_index, s.get_range()))
            .collect();

        for (idx, section) in self.sections.iter_mut().enumerate() {
            let Some((start, end)) = ranges[idx].1 else {
                section.easing.auto_ease_in_time = 0.0;
                section.easing.auto_ease_out_time = 0.0;
                continue;
            };
            let mut ease_in: f32 = 0.0;
            let mut ease_out: f32 = 0.0;

            for (other_idx, (row, range)) in ranges.iter().enumerate() {
                if other_idx == idx || *row != ranges[idx].0 {
                    continue;
                }
                let Some((other_start, other_end)) = *range else {
                    continue;
                };
                // Entirely underlapped: the other section covers this one.
                if other_start <= start && other_end >= end {
                    continue;
                }
                if other_start < start && start < other_end {
                    ease_in = ease_in.max(other_end - start);
                }
                if other_start < end && end < other_end {
                    ease_out = ease_out.max(end - other_start);
                }
            }

            let length = end - start;
            let total = ease_in + ease_out;
            if total > length && total > 0.0 {
                let scale = length / total;
                ease_in *= scale;
                ease_out *= scale;
            }
            section.easing.auto_ease_in_time = ease_in;
            section.easing.auto_ease_out_time = ease_out;
        }
    }
}
