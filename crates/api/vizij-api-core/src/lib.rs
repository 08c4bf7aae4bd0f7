//! vizij-api-core: shared property value vocabulary (core, engine-agnostic)

pub mod typed_path;
pub mod value;
pub mod write_ops;

pub use typed_path::{PathError, TypedPath};
pub use value::{Value, ValueKind};
pub use write_ops::{WriteBatch, WriteOp};
