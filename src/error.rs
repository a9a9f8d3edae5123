// Error taxonomy. Every variant corresponds 1:1 to a failure mode in the
// error handling design: an unaddressable destination, an unsettable
// sub-slot, a shape mismatch, or a coercion the table does not permit.
// Messages are part of the observable contract, not an implementation
// detail — do not reword them without checking the test suite.

use thiserror::Error;

use crate::value::Value;

#[derive(Debug, Error)]
pub enum CopyError {
    #[error("expected pointer for arg1 {value} but received {kind}")]
    DestinationNotAddressable { value: String, kind: &'static str },

    /// Mirrors a reflection-only failure mode of the original engine (a
    /// destination sub-slot reached via an unusual path that cannot be
    /// written, e.g. an unexported field surfaced despite the visibility
    /// check). The visibility check runs before any destination field is
    /// even considered a candidate in this crate's trait-based matcher, so
    /// this variant is not constructed internally; it is kept so `CopyError`
    /// matches the taxonomy in full and so callers implementing their own
    /// `ReflectMut` can report it for destination kinds this crate does not
    /// itself define.
    #[error("unable to convert {value} (type {src_type}) to type {dst_type}: cannot set field {field}")]
    DestinationUnsettable {
        value: String,
        src_type: String,
        dst_type: String,
        field: String,
    },

    #[error("unable to convert {value} (type {src_type}) to type {dst_type}")]
    ShapeMismatch {
        value: String,
        src_type: String,
        dst_type: String,
    },

    #[error("unable to convert {value} (type {src_type}) to type {dst_type}")]
    CoercionFailed {
        value: String,
        src_type: String,
        dst_type: String,
    },
}

impl CopyError {
    pub fn destination_not_addressable(value: &Value) -> Self {
        CopyError::DestinationNotAddressable {
            value: value.display(),
            kind: value.reflect_kind_name(),
        }
    }

    pub fn coercion_failed(value: &Value, dst_type: impl Into<String>) -> Self {
        CopyError::CoercionFailed {
            value: value.display(),
            src_type: value.type_name(),
            dst_type: dst_type.into(),
        }
    }

    pub fn shape_mismatch(value: &Value, dst_type: impl Into<String>) -> Self {
        CopyError::ShapeMismatch {
            value: value.display(),
            src_type: value.type_name(),
            dst_type: dst_type.into(),
        }
    }

    pub fn destination_unsettable(
        value: &Value,
        dst_type: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        CopyError::DestinationUnsettable {
            value: value.display(),
            src_type: value.type_name(),
            dst_type: dst_type.into(),
            field: field.into(),
        }
    }
}
