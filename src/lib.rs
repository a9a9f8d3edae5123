//! Structural deep-copy engine: maps one struct's fields onto another's by
//! name (with alias support), widening or narrowing scalars as needed,
//! merging only non-zero source fields, and bridging wall-clock time with
//! its protocol-timestamp forms.

pub mod engine;
pub mod error;
pub mod field;
pub mod record;
pub mod reflect;
pub mod timestamp;
pub mod value;

pub use engine::{deep_copy, deep_copy_dynamic, dereference, Destination};
pub use error::CopyError;
pub use field::{FieldDescriptor, FIELD_ALIAS_ATTR};
pub use reflect::{Opaque, Reflect, ReflectDefault, ReflectMut};
pub use timestamp::{ProtoTimestamp, ProtoTimestampHandle};
pub use value::{Kind, OpaqueHandle, RecordValue, Value};
