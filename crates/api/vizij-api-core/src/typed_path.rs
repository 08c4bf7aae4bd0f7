//! TypedPath parsing and formatting.
//!
//! Grammar:
//!   namespace/.../target.field.subfield
//! - '/' separates namespace segments
//! - the last segment holds the `target` and optional '.'-separated fields
//!
//! Examples:
//!   "stage/Door.RelativeTransform" -> namespaces=["stage"], target="Door", fields=["RelativeTransform"]
//!   "ui/Panel.RenderTransform"     -> namespaces=["ui"], target="Panel", fields=["RenderTransform"]
//!   "Camera"                       -> namespaces=[], target="Camera", fields=[]
//!
//! The sequencer uses the target part to address a bound object and the fields
//! to address one property on it; accumulator cells are keyed by the full path.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("empty path")]
    Empty,
    #[error("invalid typed path '{path}': empty {segment} segment")]
    EmptySegment { path: String, segment: &'static str },
    #[error("invalid typed path '{path}': whitespace in {segment}")]
    Whitespace { path: String, segment: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypedPath {
    /// Namespace segments preceding the target (may be empty)
    pub namespaces: Vec<String>,
    /// Target object name
    pub target: String,
    /// Ordered property selectors on the target (may be empty)
    pub fields: Vec<String>,
}

fn check_segment(path: &str, seg: &str, segment: &'static str) -> Result<(), PathError> {
    if seg.is_empty() {
        return Err(PathError::EmptySegment {
            path: path.to_string(),
            segment,
        });
    }
    if seg.chars().any(char::is_whitespace) {
        return Err(PathError::Whitespace {
            path: path.to_string(),
            segment,
        });
    }
    Ok(())
}

impl TypedPath {
    pub fn new(namespaces: Vec<String>, target: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            namespaces,
            target: target.into(),
            fields,
        }
    }

    /// Parse a path string according to the grammar described above.
    pub fn parse(s: &str) -> Result<Self, PathError> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }
        let (head, last) = match s.rsplit_once('/') {
            Some((head, last)) => (Some(head), last),
            None => (None, s),
        };

        let mut namespaces = Vec::new();
        if let Some(head) = head {
            for seg in head.split('/') {
                check_segment(s, seg, "namespace")?;
                namespaces.push(seg.to_string());
            }
        }

        let mut parts = last.split('.');
        let target = parts.next().unwrap_or_default();
        check_segment(s, target, "target")?;

        let mut fields = Vec::new();
        for seg in parts {
            check_segment(s, seg, "field")?;
            fields.push(seg.to_string());
        }

        Ok(TypedPath {
            namespaces,
            target: target.to_string(),
            fields,
        })
    }

    /// Return a copy of this path addressing `property` on the same target.
    /// `property` may itself be dotted ("Transform.Translation").
    pub fn with_property(&self, property: &str) -> Result<Self, PathError> {
        let mut out = self.clone();
        for seg in property.split('.') {
            check_segment(property, seg, "field")?;
            out.fields.push(seg.to_string());
        }
        Ok(out)
    }

    /// Path of the bound object without any property selectors.
    pub fn object_path(&self) -> TypedPath {
        TypedPath {
            namespaces: self.namespaces.clone(),
            target: self.target.clone(),
            fields: Vec::new(),
        }
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.iter().map(|s| s.as_str())
    }

    pub fn target_name(&self) -> &str {
        &self.target
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|s| s.as_str())
    }
}

impl fmt::Display for TypedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ns in &self.namespaces {
            write!(f, "{ns}/")?;
        }
        f.write_str(&self.target)?;
        for field in &self.fields {
            write!(f, ".{field}")?;
        }
        Ok(())
    }
}

impl FromStr for TypedPath {
    type Err = PathError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypedPath::parse(s)
    }
}

// Serialized as its string form.
impl Serialize for TypedPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypedPath {
    fn deserialize<D>(deserializer: D) -> Result<TypedPath, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TypedPath::parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_object_and_property() {
        let p = TypedPath::parse("stage/props/Door.RelativeTransform").unwrap();
        assert_eq!(p.namespaces, vec!["stage".to_string(), "props".to_string()]);
        assert_eq!(p.target, "Door");
        assert_eq!(p.fields, vec!["RelativeTransform".to_string()]);
        assert_eq!(p.to_string(), "stage/props/Door.RelativeTransform");
    }

    #[test]
    fn parse_only_target() {
        let p = TypedPath::parse("Camera").unwrap();
        assert!(p.namespaces.is_empty());
        assert_eq!(p.target, "Camera");
        assert!(p.fields.is_empty());
    }

    #[test]
    fn with_property_appends_fields() {
        let obj = TypedPath::parse("ui/Panel").unwrap();
        let prop = obj.with_property("RenderTransform.Angle").unwrap();
        assert_eq!(prop.to_string(), "ui/Panel.RenderTransform.Angle");
        assert_eq!(prop.object_path(), obj);
        assert!(obj.with_property("Bad..Field").is_err());
    }

    #[test]
    fn parse_rejects_bad_segments() {
        assert_eq!(TypedPath::parse(""), Err(PathError::Empty));
        assert!(TypedPath::parse("a path").is_err());
        assert!(TypedPath::parse("stage//Door").is_err());
        assert!(TypedPath::parse("stage/").is_err());
        assert!(TypedPath::parse("Door.").is_err());
    }

    #[test]
    fn serde_as_string() {
        let p = TypedPath::parse("stage/Door.Opacity").unwrap();
        let s = serde_json::to_string(&p).unwrap();
        assert_eq!(s, "\"stage/Door.Opacity\"");
        let back: TypedPath = serde_json::from_str(&s).unwrap();
        assert_eq!(back, p);
    }
}
