//! Value: runtime instances of every animatable property kind.
//! Float-like data is f32; integral kinds keep their native width.

use serde::{Deserialize, Serialize};

/// Lightweight kind tag used for dispatch and validation.
///
/// The set is closed: sequencer tracks, templates and accumulator cells all
/// switch over it instead of registering types at runtime.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Bool,
    Byte,
    Enum,
    Integer,
    Text,
    Float,
    Vec2,
    Vec3,
    Vec4,
    ColorRgba,
    Transform,
    Margin,
    WidgetTransform,
}

impl ValueKind {
    /// Whether values of this kind go through weighted blending.
    /// Step kinds are assigned directly (last writer wins).
    #[inline]
    pub fn is_blendable(self) -> bool {
        !matches!(
            self,
            ValueKind::Bool | ValueKind::Byte | ValueKind::Enum | ValueKind::Text
        )
    }

    /// Number of scalar channels a blendable kind decomposes into.
    /// Step kinds report 0.
    pub fn channel_count(self) -> usize {
        match self {
            ValueKind::Bool | ValueKind::Byte | ValueKind::Enum | ValueKind::Text => 0,
            ValueKind::Integer | ValueKind::Float => 1,
            ValueKind::Vec2 => 2,
            ValueKind::Vec3 => 3,
            ValueKind::Vec4 | ValueKind::ColorRgba | ValueKind::Margin => 4,
            ValueKind::WidgetTransform => 7,
            ValueKind::Transform => 9,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Value {
    /// Boolean (step)
    Bool(bool),

    /// Unsigned byte (step)
    Byte(u8),

    /// Enum discriminant (step)
    Enum(i64),

    /// Signed integer; blended as f64 and rounded back
    Integer(i32),

    /// Text / string; step-only
    Text(String),

    /// Scalar float
    Float(f32),

    /// 2D vector
    Vec2([f32; 2]),

    /// 3D vector
    Vec3([f32; 3]),

    /// 4D vector
    Vec4([f32; 4]),

    /// RGBA color (linear by convention)
    ColorRgba([f32; 4]),

    /// Transform with translation, euler rotation in degrees
    /// (roll, pitch, yaw about X, Y, Z) and scale.
    Transform {
        translation: [f32; 3],
        rotation: [f32; 3],
        scale: [f32; 3],
    },

    /// Widget padding
    Margin {
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
    },

    /// 2D render transform of a widget; angle in degrees.
    WidgetTransform {
        translation: [f32; 2],
        scale: [f32; 2],
        shear: [f32; 2],
        angle: f32,
    },
}

impl Value {
    /// Return the coarse kind of this value.
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Byte(_) => ValueKind::Byte,
            Value::Enum(_) => ValueKind::Enum,
            Value::Integer(_) => ValueKind::Integer,
            Value::Text(_) => ValueKind::Text,
            Value::Float(_) => ValueKind::Float,
            Value::Vec2(_) => ValueKind::Vec2,
            Value::Vec3(_) => ValueKind::Vec3,
            Value::Vec4(_) => ValueKind::Vec4,
            Value::ColorRgba(_) => ValueKind::ColorRgba,
            Value::Transform { .. } => ValueKind::Transform,
            Value::Margin { .. } => ValueKind::Margin,
            Value::WidgetTransform { .. } => ValueKind::WidgetTransform,
        }
    }

    /// Neutral value for a kind: zero for numbers, identity scale for transforms,
    /// empty text, false.
    pub fn default_for(kind: ValueKind) -> Value {
        match kind {
            ValueKind::Bool => Value::Bool(false),
            ValueKind::Byte => Value::Byte(0),
            ValueKind::Enum => Value::Enum(0),
            ValueKind::Integer => Value::Integer(0),
            ValueKind::Text => Value::Text(String::new()),
            ValueKind::Float => Value::Float(0.0),
            ValueKind::Vec2 => Value::Vec2([0.0; 2]),
            ValueKind::Vec3 => Value::Vec3([0.0; 3]),
            ValueKind::Vec4 => Value::Vec4([0.0; 4]),
            ValueKind::ColorRgba => Value::ColorRgba([0.0; 4]),
            ValueKind::Transform => Value::transform([0.0; 3], [0.0; 3], [1.0; 3]),
            ValueKind::Margin => Value::margin(0.0, 0.0, 0.0, 0.0),
            ValueKind::WidgetTransform => Value::WidgetTransform {
                translation: [0.0; 2],
                scale: [1.0; 2],
                shear: [0.0; 2],
                angle: 0.0,
            },
        }
    }

    /// Convenience constructors
    pub fn f(v: f32) -> Self {
        Value::Float(v)
    }

    pub fn vec3(x: f32, y: f32, z: f32) -> Self {
        Value::Vec3([x, y, z])
    }

    pub fn transform(translation: [f32; 3], rotation: [f32; 3], scale: [f32; 3]) -> Self {
        Value::Transform {
            translation,
            rotation,
            scale,
        }
    }

    pub fn margin(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Value::Margin {
            left,
            top,
            right,
            bottom,
        }
    }
}
