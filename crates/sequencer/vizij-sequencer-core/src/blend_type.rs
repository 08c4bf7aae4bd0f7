//! Blend types and a compact flag set over them.

use serde::{Deserialize, Serialize};

/// How a section's value combines with other contributions to the same property.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendType {
    /// Weighted average with other absolute contributions.
    Absolute,
    /// Weighted offset layered on top of the absolute result.
    Additive,
    /// Offset from the property's initial value, blended like absolute.
    Relative,
}

impl BlendType {
    pub const ALL: [BlendType; 3] = [BlendType::Absolute, BlendType::Additive, BlendType::Relative];

    #[inline]
    const fn bit(self) -> u8 {
        match self {
            BlendType::Absolute => 0x1,
            BlendType::Additive => 0x2,
            BlendType::Relative => 0x4,
        }
    }
}

const ALL_BITS: u8 = 0x7;

/// Set of [`BlendType`]s stored as a 3-bit field.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<BlendType>", into = "Vec<BlendType>")]
pub struct BlendTypeField(u8);

impl BlendTypeField {
    pub const fn none() -> Self {
        Self(0)
    }

    pub const fn all() -> Self {
        Self(ALL_BITS)
    }

    pub fn add(&mut self, blend_type: BlendType) {
        self.0 |= blend_type.bit();
    }

    pub fn add_field(&mut self, other: BlendTypeField) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, blend_type: BlendType) {
        self.0 &= !blend_type.bit();
    }

    pub fn remove_field(&mut self, other: BlendTypeField) {
        self.0 &= !other.0;
    }

    pub fn contains(&self, blend_type: BlendType) -> bool {
        self.0 & blend_type.bit() != 0
    }

    pub fn num(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Complement within the three known blend types.
    pub fn invert(&self) -> Self {
        Self(!self.0 & ALL_BITS)
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    /// Set types in increasing bit order (Absolute, Additive, Relative).
    pub fn iter(&self) -> impl Iterator<Item = BlendType> + '_ {
        BlendType::ALL.into_iter().filter(move |t| self.contains(*t))
    }
}

impl From<BlendType> for BlendTypeField {
    fn from(blend_type: BlendType) -> Self {
        Self(blend_type.bit())
    }
}

impl FromIterator<BlendType> for BlendTypeField {
    fn from_iter<I: IntoIterator<Item = BlendType>>(iter: I) -> Self {
        let mut field = Self::none();
        for blend_type in iter {
            field.add(blend_type);
        }
        field
    }
}

impl From<Vec<BlendType>> for BlendTypeField {
    fn from(types: Vec<BlendType>) -> Self {
        types.into_iter().collect()
    }
}

impl From<BlendTypeField> for Vec<BlendType> {
    fn from(field: BlendTypeField) -> Self {
        field.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_remove_contains() {
        let mut f = BlendTypeField::none();
        f.add(BlendType::Absolute);
        f.add(BlendType::Relative);
        assert!(f.contains(BlendType::Absolute));
        assert!(!f.contains(BlendType::Additive));
        assert_eq!(f.num(), 2);
        f.remove(BlendType::Absolute);
        assert!(!f.contains(BlendType::Absolute));
        assert!(f.contains(BlendType::Relative));
        // Removing an absent type leaves the field unchanged.
        f.remove(BlendType::Additive);
        assert_eq!(f.bits(), 0x4);
    }

    #[test]
    fn invert_stays_in_universe() {
        assert_eq!(BlendTypeField::none().invert(), BlendTypeField::all());
        assert_eq!(BlendTypeField::all().invert(), BlendTypeField::none());
        let f = BlendTypeField::from(BlendType::Additive).invert();
        assert_eq!(f.bits(), 0x5);
    }

    #[test]
    fn iterates_in_bit_order() {
        let f: BlendTypeField = [BlendType::Relative, BlendType::Absolute].into_iter().collect();
        assert_eq!(f.iter().collect::<Vec<_>>(), vec![BlendType::Absolute, BlendType::Relative]);
        let mut g = BlendTypeField::all();
        g.remove_field(f);
        assert_eq!(g.iter().collect::<Vec<_>>(), vec![BlendType::Additive]);
    }

    #[test]
    fn serializes_as_list() {
        let f: BlendTypeField = [BlendType::Absolute, BlendType::Additive].into_iter().collect();
        let json = serde_json::to_value(f).unwrap();
        assert_eq!(json, serde_json::json!(["absolute", "additive"]));
        let back: BlendTypeField = serde_json::from_value(json).unwrap();
        assert_eq!(back, f);
    }
}
