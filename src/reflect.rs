// The two traits every type participating in a `deep_copy` call implements:
// `Reflect` for the source role (produce a `Value`), `ReflectMut` for the
// destination role (classify itself, then accept a `Value`). Scalars,
// `String`, `Vec<T>`, `Option<T>`, fixed-size arrays, `Opaque<T>`, and the
// timestamp types are implemented here; record types get their impls from
// the `reflect_record!` macro in `record.rs`.

use std::any::Any;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use tracing::trace;

use crate::error::CopyError;
use crate::timestamp::{self, ProtoTimestamp, ProtoTimestampHandle};
use crate::value::{Kind, OpaqueHandle, Value};

/// The source role: extract this value into the engine's tagged-value tree.
pub trait Reflect {
    fn to_value(&self) -> Value;
}

/// The destination role: classify this slot, then accept a `Value` into it.
pub trait ReflectMut: Reflect {
    fn kind(&self) -> Kind;
    fn set_value(&mut self, value: Value) -> Result<(), CopyError>;
}

/// A type that can materialize a placeholder instance of itself so the
/// engine can recurse into a fresh element before the caller's value is
/// known. A blanket impl covers every `Default` type; timestamp types that
/// do not implement `Default` upstream get a manual impl.
pub trait ReflectDefault: ReflectMut + Sized {
    fn reflect_default() -> Self;
}

impl<T: ReflectMut + Default> ReflectDefault for T {
    fn reflect_default() -> Self {
        T::default()
    }
}

macro_rules! impl_scalar {
    ($ty:ty, $variant:ident, $kind:ident) => {
        impl Reflect for $ty {
            fn to_value(&self) -> Value {
                Value::$variant(*self)
            }
        }

        impl ReflectMut for $ty {
            fn kind(&self) -> Kind {
                Kind::$kind
            }

            fn set_value(&mut self, value: Value) -> Result<(), CopyError> {
                *self = crate::engine::coerce_scalar(value, Kind::$kind)?;
                Ok(())
            }
        }
    };
}

impl_scalar!(bool, Bool, Bool);
impl_scalar!(i8, I8, I8);
impl_scalar!(i16, I16, I16);
impl_scalar!(i32, I32, I32);
impl_scalar!(i64, I64, I64);
impl_scalar!(u8, U8, U8);
impl_scalar!(u16, U16, U16);
impl_scalar!(u32, U32, U32);
impl_scalar!(u64, U64, U64);
impl_scalar!(f32, F32, F32);
impl_scalar!(f64, F64, F64);

impl Reflect for String {
    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }
}

impl ReflectMut for String {
    fn kind(&self) -> Kind {
        Kind::Str
    }

    fn set_value(&mut self, value: Value) -> Result<(), CopyError> {
        match value {
            Value::Str(s) => {
                *self = s;
                Ok(())
            }
            other => Err(CopyError::coercion_failed(&other, Kind::Str.type_name())),
        }
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn to_value(&self) -> Value {
        Value::Seq(self.iter().map(Reflect::to_value).collect())
    }
}

impl<T: ReflectDefault> ReflectMut for Vec<T> {
    fn kind(&self) -> Kind {
        Kind::Seq
    }

    fn set_value(&mut self, value: Value) -> Result<(), CopyError> {
        match value {
            Value::Seq(items) => {
                trace!(dispatch = "sequence", len = items.len());
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    let mut elem = T::reflect_default();
                    elem.set_value(crate::engine::dereference(item))?;
                    out.push(elem);
                }
                *self = out;
                Ok(())
            }
            other => Err(CopyError::shape_mismatch(&other, "slice")),
        }
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn to_value(&self) -> Value {
        Value::Seq(self.iter().map(Reflect::to_value).collect())
    }
}

impl<T: ReflectDefault + Copy, const N: usize> ReflectMut for [T; N] {
    fn kind(&self) -> Kind {
        Kind::Array(N)
    }

    fn set_value(&mut self, value: Value) -> Result<(), CopyError> {
        match value {
            Value::Seq(items) if items.len() >= N => {
                trace!(dispatch = "array", len = items.len(), capacity = N);
                for (slot, item) in self.iter_mut().zip(items.into_iter()) {
                    slot.set_value(crate::engine::dereference(item))?;
                }
                Ok(())
            }
            other => Err(CopyError::coercion_failed(&other, Kind::Array(N).type_name())),
        }
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn to_value(&self) -> Value {
        Value::Optional(self.as_ref().map(|v| Box::new(v.to_value())))
    }
}

impl<T: ReflectDefault> ReflectMut for Option<T> {
    fn kind(&self) -> Kind {
        Kind::Optional
    }

    fn set_value(&mut self, value: Value) -> Result<(), CopyError> {
        let value = crate::engine::dereference(value);
        if let Value::Optional(None) = value {
            trace!(dispatch = "optional", present = false);
            *self = None;
            return Ok(());
        }
        trace!(dispatch = "optional", present = true);
        let mut inner = T::reflect_default();
        inner.set_value(value)?;
        *self = Some(inner);
        Ok(())
    }
}

/// Wraps a mapping, fixed-length-array-like collection, or interface-typed
/// value so it is copied as a shared, opaque handle rather than walked
/// structurally — the Rust realization of the data model's "Mapping" /
/// "Fixed-length array" / "Opaque callable" entries, which in the host
/// language are always reference-like and so need no explicit wrapper.
pub struct Opaque<T: Send + Sync + 'static>(pub Arc<T>);

impl<T: Send + Sync + 'static> Opaque<T> {
    pub fn new(value: T) -> Self {
        Self(Arc::new(value))
    }
}

// Hand-written rather than `#[derive(Clone)]`: the derive would add a
// spurious `T: Clone` bound even though cloning an `Arc<T>` never needs one.
impl<T: Send + Sync + 'static> Clone for Opaque<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: Send + Sync + 'static> Reflect for Opaque<T> {
    fn to_value(&self) -> Value {
        Value::Opaque(OpaqueHandle(Arc::clone(&self.0) as Arc<dyn Any + Send + Sync>))
    }
}

impl<T: Send + Sync + Default + 'static> ReflectMut for Opaque<T> {
    fn kind(&self) -> Kind {
        Kind::Opaque
    }

    fn set_value(&mut self, value: Value) -> Result<(), CopyError> {
        match value {
            Value::Opaque(handle) => match handle.0.downcast::<T>() {
                Ok(arc) => {
                    trace!(dispatch = "opaque", action = "aliased");
                    self.0 = arc;
                    Ok(())
                }
                Err(_) => Err(CopyError::coercion_failed(
                    &Value::Opaque(handle),
                    Kind::Opaque.type_name(),
                )),
            },
            other => Err(CopyError::shape_mismatch(&other, Kind::Opaque.type_name())),
        }
    }
}

impl<T: Send + Sync + Default + 'static> Default for Opaque<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl Reflect for DateTime<Utc> {
    fn to_value(&self) -> Value {
        Value::WallClock(*self)
    }
}

impl ReflectMut for DateTime<Utc> {
    fn kind(&self) -> Kind {
        Kind::WallClock
    }

    fn set_value(&mut self, value: Value) -> Result<(), CopyError> {
        trace!(dispatch = "timestamp_bridge", destination = "wall_clock", source = ?value.kind());
        *self = timestamp::to_wall_clock(value)?;
        Ok(())
    }
}

// `DateTime<Utc>` has no `std::default::Default` impl upstream, so it falls
// outside the blanket `ReflectDefault` impl and needs this placeholder
// directly; recursion into a fresh element always overwrites it immediately
// via `set_value` before it is observed.
impl ReflectDefault for DateTime<Utc> {
    fn reflect_default() -> Self {
        Utc.timestamp_opt(0, 0).single().expect("epoch is always a valid timestamp")
    }
}

impl Reflect for ProtoTimestamp {
    fn to_value(&self) -> Value {
        Value::ProtoTimestamp(*self)
    }
}

impl ReflectMut for ProtoTimestamp {
    fn kind(&self) -> Kind {
        Kind::ProtoTimestamp
    }

    fn set_value(&mut self, value: Value) -> Result<(), CopyError> {
        // Unlike the handle form, a bare protocol-timestamp destination
        // only accepts a same-type source — matching the original engine's
        // struct-kind branch, which sets the field directly only when the
        // source is itself a (non-pointer) protocol-timestamp value.
        match value {
            Value::ProtoTimestamp(pt) => {
                *self = pt;
                Ok(())
            }
            other => Err(CopyError::coercion_failed(&other, Kind::ProtoTimestamp.type_name())),
        }
    }
}

impl Reflect for ProtoTimestampHandle {
    fn to_value(&self) -> Value {
        Value::ProtoTimestampHandle(Arc::clone(&self.0))
    }
}

impl ReflectMut for ProtoTimestampHandle {
    fn kind(&self) -> Kind {
        Kind::ProtoTimestampHandle
    }

    fn set_value(&mut self, value: Value) -> Result<(), CopyError> {
        *self = match value {
            Value::ProtoTimestampHandle(arc) => {
                trace!(dispatch = "timestamp_bridge", action = "share_handle");
                ProtoTimestampHandle(arc)
            }
            Value::WallClock(dt) => {
                trace!(dispatch = "timestamp_bridge", action = "wall_clock_to_handle");
                ProtoTimestampHandle::new(ProtoTimestamp::from_datetime(dt))
            }
            Value::ProtoTimestamp(pt) => {
                trace!(dispatch = "timestamp_bridge", action = "value_to_handle");
                ProtoTimestampHandle::new(pt)
            }
            other => {
                return Err(CopyError::coercion_failed(
                    &other,
                    Kind::ProtoTimestampHandle.type_name(),
                ))
            }
        };
        Ok(())
    }
}
