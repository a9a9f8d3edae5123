// The engine's type-erased value tree. Every structural comparison, zero
// check, and coercion the engine performs operates on `Value`, not on the
// concrete Rust types the caller's records are made of.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::field::FieldDescriptor;
use crate::timestamp::ProtoTimestamp;

/// A cheaply-cloned handle to an opaque value (mapping, fixed-length array,
/// interface-typed or callable value). Carrying this as `Arc<dyn Any>` rather
/// than cloning the pointee is what makes opaque copies aliased instead of
/// deep-cloned (see the idempotence property in the crate's test suite).
#[derive(Clone)]
pub struct OpaqueHandle(pub Arc<dyn Any + Send + Sync>);

impl fmt::Debug for OpaqueHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<opaque>")
    }
}

impl OpaqueHandle {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn ptr_eq(&self, other: &OpaqueHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// A record value: an ordered list of (field descriptor, field value) pairs,
/// in the declaration order of the type that produced it.
#[derive(Debug, Clone)]
pub struct RecordValue {
    pub type_name: &'static str,
    pub fields: Vec<(FieldDescriptor, Value)>,
}

/// The engine's runtime classification of a value, realizing the taxonomy in
/// the data model: scalars, sequences, opaque containers, records, the
/// source-only optional wrapper, and the two distinguished timestamp forms.
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Str(String),
    Seq(Vec<Value>),
    Opaque(OpaqueHandle),
    Record(RecordValue),
    /// Source-only: an optional/pointer wrapper around another value, or
    /// absence. Never produced as the *destination's* observed kind; a
    /// destination that is itself optional has its own `Kind::Optional`.
    Optional(Option<Box<Value>>),
    WallClock(DateTime<Utc>),
    ProtoTimestamp(ProtoTimestamp),
    ProtoTimestampHandle(Arc<ProtoTimestamp>),
}

/// The destination-side classifier the dispatcher routes on. Kept separate
/// from `Value` because a destination slot is classified before it holds a
/// value worth inspecting (an empty `Vec`, a zeroed record).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Str,
    Seq,
    Array(usize),
    Opaque,
    Record(&'static str),
    Optional,
    WallClock,
    ProtoTimestamp,
    ProtoTimestampHandle,
}

impl Kind {
    pub fn type_name(&self) -> String {
        match self {
            Kind::Bool => "bool".into(),
            Kind::I8 => "int8".into(),
            Kind::I16 => "int16".into(),
            Kind::I32 => "int32".into(),
            Kind::I64 => "int64".into(),
            Kind::U8 => "uint8".into(),
            Kind::U16 => "uint16".into(),
            Kind::U32 => "uint32".into(),
            Kind::U64 => "uint64".into(),
            Kind::F32 => "float32".into(),
            Kind::F64 => "float64".into(),
            Kind::Str => "string".into(),
            Kind::Seq => "slice".into(),
            Kind::Array(n) => format!("[{n}]array"),
            Kind::Opaque => "opaque".into(),
            Kind::Record(name) => (*name).into(),
            Kind::Optional => "optional".into(),
            Kind::WallClock => "time.Time".into(),
            Kind::ProtoTimestamp => "Timestamp".into(),
            Kind::ProtoTimestampHandle => "*Timestamp".into(),
        }
    }
}

/// A numeric value collapsed into one of the three representations the
/// coercion table widens/narrows between. Using `i128`/`u128` as the common
/// integer currency means every signed/unsigned width up to 64 bits round
/// trips through the conversion without an intermediate floating point step
/// (which would lose precision for large `i64`/`u64` values).
enum NumericRepr {
    SInt(i128),
    UInt(u128),
    Float(f64),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Bool(_) => Kind::Bool,
            Value::I8(_) => Kind::I8,
            Value::I16(_) => Kind::I16,
            Value::I32(_) => Kind::I32,
            Value::I64(_) => Kind::I64,
            Value::U8(_) => Kind::U8,
            Value::U16(_) => Kind::U16,
            Value::U32(_) => Kind::U32,
            Value::U64(_) => Kind::U64,
            Value::F32(_) => Kind::F32,
            Value::F64(_) => Kind::F64,
            Value::Str(_) => Kind::Str,
            Value::Seq(_) => Kind::Seq,
            Value::Opaque(_) => Kind::Opaque,
            Value::Record(r) => Kind::Record(r.type_name),
            Value::Optional(_) => Kind::Optional,
            Value::WallClock(_) => Kind::WallClock,
            Value::ProtoTimestamp(_) => Kind::ProtoTimestamp,
            Value::ProtoTimestampHandle(_) => Kind::ProtoTimestampHandle,
        }
    }

    pub fn type_name(&self) -> String {
        self.kind().type_name()
    }

    /// The Go-ish `reflect.Kind` spelling used only by the entry-point error
    /// message (`"expected pointer for arg1 4 but received int"`), which
    /// does not distinguish integer widths the way the rest of the engine
    /// does.
    pub fn reflect_kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::I8(_) | Value::I16(_) | Value::I32(_) | Value::I64(_) => "int",
            Value::U8(_) | Value::U16(_) | Value::U32(_) | Value::U64(_) => "uint",
            Value::F32(_) | Value::F64(_) => "float64",
            Value::Str(_) => "string",
            Value::Seq(_) => "slice",
            Value::Opaque(_) => "interface",
            Value::Record(_) => "struct",
            Value::Optional(_) => "ptr",
            Value::WallClock(_) => "struct",
            Value::ProtoTimestamp(_) => "struct",
            Value::ProtoTimestampHandle(_) => "ptr",
        }
    }

    /// A human-readable rendering used to fill the `<value>` slot of error
    /// messages. Best-effort; not meant to be a faithful `Debug` dump.
    pub fn display(&self) -> String {
        match self {
            Value::Bool(b) => b.to_string(),
            Value::I8(v) => v.to_string(),
            Value::I16(v) => v.to_string(),
            Value::I32(v) => v.to_string(),
            Value::I64(v) => v.to_string(),
            Value::U8(v) => v.to_string(),
            Value::U16(v) => v.to_string(),
            Value::U32(v) => v.to_string(),
            Value::U64(v) => v.to_string(),
            Value::F32(v) => v.to_string(),
            Value::F64(v) => v.to_string(),
            Value::Str(s) => s.clone(),
            Value::Seq(items) => format!("[{} items]", items.len()),
            Value::Opaque(_) => "<opaque>".into(),
            Value::Record(r) => format!("{{{}}}", r.type_name),
            Value::Optional(None) => "<nil>".into(),
            Value::Optional(Some(inner)) => inner.display(),
            Value::WallClock(t) => t.to_rfc3339(),
            Value::ProtoTimestamp(t) => format!("seconds:{} nanos:{}", t.seconds, t.nanos),
            Value::ProtoTimestampHandle(t) => format!("seconds:{} nanos:{}", t.seconds, t.nanos),
        }
    }

    /// "Equal to the zero value for its type", deep-structurally for
    /// records. Presence through an optional wrapper is decided purely by
    /// whether the wrapper itself is `None` — a `Some(0)` is *not* zero,
    /// mirroring a non-nil pointer to a zero int in the original engine.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Bool(b) => !*b,
            Value::I8(v) => *v == 0,
            Value::I16(v) => *v == 0,
            Value::I32(v) => *v == 0,
            Value::I64(v) => *v == 0,
            Value::U8(v) => *v == 0,
            Value::U16(v) => *v == 0,
            Value::U32(v) => *v == 0,
            Value::U64(v) => *v == 0,
            Value::F32(v) => *v == 0.0,
            Value::F64(v) => *v == 0.0,
            Value::Str(s) => s.is_empty(),
            Value::Seq(items) => items.is_empty(),
            Value::Opaque(_) => false,
            Value::Record(r) => r.fields.iter().all(|(_, v)| v.is_zero()),
            Value::Optional(o) => o.is_none(),
            Value::WallClock(_) => false,
            Value::ProtoTimestamp(_) => false,
            Value::ProtoTimestampHandle(_) => false,
        }
    }

    fn numeric_repr(&self) -> Option<NumericRepr> {
        Some(match self {
            Value::I8(v) => NumericRepr::SInt(*v as i128),
            Value::I16(v) => NumericRepr::SInt(*v as i128),
            Value::I32(v) => NumericRepr::SInt(*v as i128),
            Value::I64(v) => NumericRepr::SInt(*v as i128),
            Value::U8(v) => NumericRepr::UInt(*v as u128),
            Value::U16(v) => NumericRepr::UInt(*v as u128),
            Value::U32(v) => NumericRepr::UInt(*v as u128),
            Value::U64(v) => NumericRepr::UInt(*v as u128),
            Value::F32(v) => NumericRepr::Float(*v as f64),
            Value::F64(v) => NumericRepr::Float(*v),
            _ => return None,
        })
    }

    pub fn is_numeric(&self) -> bool {
        self.numeric_repr().is_some()
    }

    /// Widen/narrow this numeric value into the target numeric kind. Lossy
    /// on truncation or sign change, by design (documented in the coercion
    /// table); never panics (integer casts truncate, float-to-int casts
    /// saturate per Rust's `as` semantics).
    pub fn coerce_numeric(&self, target: Kind) -> Option<Value> {
        let repr = self.numeric_repr()?;
        Some(match target {
            Kind::I8 => Value::I8(match repr {
                NumericRepr::SInt(v) => v as i8,
                NumericRepr::UInt(v) => v as i8,
                NumericRepr::Float(v) => v as i8,
            }),
            Kind::I16 => Value::I16(match repr {
                NumericRepr::SInt(v) => v as i16,
                NumericRepr::UInt(v) => v as i16,
                NumericRepr::Float(v) => v as i16,
            }),
            Kind::I32 => Value::I32(match repr {
                NumericRepr::SInt(v) => v as i32,
                NumericRepr::UInt(v) => v as i32,
                NumericRepr::Float(v) => v as i32,
            }),
            Kind::I64 => Value::I64(match repr {
                NumericRepr::SInt(v) => v as i64,
                NumericRepr::UInt(v) => v as i64,
                NumericRepr::Float(v) => v as i64,
            }),
            Kind::U8 => Value::U8(match repr {
                NumericRepr::SInt(v) => v as u8,
                NumericRepr::UInt(v) => v as u8,
                NumericRepr::Float(v) => v as u8,
            }),
            Kind::U16 => Value::U16(match repr {
                NumericRepr::SInt(v) => v as u16,
                NumericRepr::UInt(v) => v as u16,
                NumericRepr::Float(v) => v as u16,
            }),
            Kind::U32 => Value::U32(match repr {
                NumericRepr::SInt(v) => v as u32,
                NumericRepr::UInt(v) => v as u32,
                NumericRepr::Float(v) => v as u32,
            }),
            Kind::U64 => Value::U64(match repr {
                NumericRepr::SInt(v) => v as u64,
                NumericRepr::UInt(v) => v as u64,
                NumericRepr::Float(v) => v as u64,
            }),
            Kind::F32 => Value::F32(match repr {
                NumericRepr::SInt(v) => v as f32,
                NumericRepr::UInt(v) => v as f32,
                NumericRepr::Float(v) => v as f32,
            }),
            Kind::F64 => Value::F64(match repr {
                NumericRepr::SInt(v) => v as f64,
                NumericRepr::UInt(v) => v as f64,
                NumericRepr::Float(v) => v as f64,
            }),
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrowing_truncates_rather_than_fails() {
        let v = Value::I32(300);
        match v.coerce_numeric(Kind::I8) {
            Some(Value::I8(out)) => assert_eq!(out, 300i32 as i8),
            other => panic!("expected a truncated I8, got {other:?}"),
        }
    }

    #[test]
    fn signed_to_unsigned_changes_sign_rather_than_fails() {
        let v = Value::I32(-1);
        match v.coerce_numeric(Kind::U32) {
            Some(Value::U32(out)) => assert_eq!(out, -1i32 as u32),
            other => panic!("expected a sign-changed U32, got {other:?}"),
        }
    }

    #[test]
    fn widening_is_exact() {
        let v = Value::I8(-5);
        match v.coerce_numeric(Kind::I64) {
            Some(Value::I64(out)) => assert_eq!(out, -5),
            other => panic!("expected an exact I64 widen, got {other:?}"),
        }
    }

    #[test]
    fn float_to_int_saturates_rather_than_panics() {
        let v = Value::F64(1e30);
        match v.coerce_numeric(Kind::I32) {
            Some(Value::I32(out)) => assert_eq!(out, i32::MAX),
            other => panic!("expected a saturated I32, got {other:?}"),
        }
    }

    #[test]
    fn unsigned_to_signed_narrowing_wraps() {
        let v = Value::U64(u64::MAX);
        match v.coerce_numeric(Kind::I8) {
            Some(Value::I8(out)) => assert_eq!(out, u64::MAX as i8),
            other => panic!("expected a wrapped I8, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_source_has_no_numeric_representation() {
        assert!(Value::Str("5".into()).coerce_numeric(Kind::I32).is_none());
        assert!(Value::Bool(true).coerce_numeric(Kind::I32).is_none());
    }

    #[test]
    fn is_zero_is_deep_structural_for_records() {
        let zero_record = Value::Record(RecordValue {
            type_name: "Z",
            fields: vec![
                (FieldDescriptor::new("a", None, true), Value::I32(0)),
                (FieldDescriptor::new("b", None, true), Value::Str(String::new())),
            ],
        });
        assert!(zero_record.is_zero());

        let non_zero_record = Value::Record(RecordValue {
            type_name: "Z",
            fields: vec![(FieldDescriptor::new("a", None, true), Value::I32(1))],
        });
        assert!(!non_zero_record.is_zero());
    }
}
