// The entry points (typed and dynamic), the dereferencer, and scalar
// coercion (numeric widening/narrowing plus the string-parsing fallback
// row of the coercion table).

use tracing::{debug, trace};

use crate::error::CopyError;
use crate::reflect::{Reflect, ReflectMut};
use crate::value::{Kind, Value};

/// Peels away source-side `Optional(Some(_))` wrappers until it reaches a
/// concrete value or an absent (`Optional(None)`) one. Stops on its own at
/// `ProtoTimestampHandle` and any other non-`Optional` value, since those
/// never produce a nested `Value::Optional` from their own `Reflect` impl.
pub fn dereference(value: Value) -> Value {
    match value {
        Value::Optional(Some(inner)) => dereference(*inner),
        other => other,
    }
}

/// A scalar type's ability to be read out of (or parsed into from a string)
/// a coerced `Value`. Backs the blanket `set_value` logic every scalar
/// `ReflectMut` impl shares through `coerce_scalar`.
pub trait ScalarExtract: Sized {
    fn extract(value: &Value) -> Option<Self>;
    fn parse_str(s: &str) -> Option<Self>;
}

macro_rules! impl_scalar_extract {
    ($ty:ty, $variant:ident) => {
        impl ScalarExtract for $ty {
            fn extract(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(*v),
                    _ => None,
                }
            }

            fn parse_str(s: &str) -> Option<Self> {
                s.trim().parse::<$ty>().ok()
            }
        }
    };
}

impl_scalar_extract!(i8, I8);
impl_scalar_extract!(i16, I16);
impl_scalar_extract!(i32, I32);
impl_scalar_extract!(i64, I64);
impl_scalar_extract!(u8, U8);
impl_scalar_extract!(u16, U16);
impl_scalar_extract!(u32, U32);
impl_scalar_extract!(u64, U64);
impl_scalar_extract!(f32, F32);
impl_scalar_extract!(f64, F64);

impl ScalarExtract for bool {
    fn extract(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn parse_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "1" | "t" | "true" => Some(true),
            "0" | "f" | "false" => Some(false),
            _ => None,
        }
    }
}

/// Coerces `value` into `T`: same-kind values pass through, numeric values
/// widen/narrow through the shared numeric table, and strings parse using
/// `T`'s own textual grammar. Anything else is a coercion failure.
pub fn coerce_scalar<T: ScalarExtract>(value: Value, target: Kind) -> Result<T, CopyError> {
    if let Some(direct) = T::extract(&value) {
        return Ok(direct);
    }
    if value.is_numeric() {
        if let Some(coerced) = value.coerce_numeric(target) {
            if let Some(v) = T::extract(&coerced) {
                return Ok(v);
            }
        }
    }
    if let Value::Str(s) = &value {
        if let Some(v) = T::parse_str(s) {
            return Ok(v);
        }
    }
    Err(CopyError::coercion_failed(&value, target.type_name()))
}

/// The typed entry point: copies `src` into `dst` field by field. The
/// destination is always a real `&mut D`, so the not-addressable error is
/// unreachable here by construction — see [`deep_copy_dynamic`] for the
/// path that keeps it reachable.
///
/// `src` is assumed acyclic: a source graph with a cycle recurses
/// unboundedly and will overflow the stack. This is a precondition, not a
/// checked error — the engine does not track visited pointers.
pub fn deep_copy<S, D>(src: &S, dst: &mut D) -> Result<(), CopyError>
where
    S: Reflect,
    D: ReflectMut,
{
    debug!(
        src = std::any::type_name::<S>(),
        dst = std::any::type_name::<D>(),
        "deep_copy"
    );
    let value = dereference(src.to_value());
    trace!(?value, "dereferenced source value");
    dst.set_value(value)
}

/// A destination slot for [`deep_copy_dynamic`]: either a real, settable
/// reference, or a value that was never behind a pointer at all. The typed
/// `deep_copy` can never construct the latter; callers working from an
/// untyped source (a dynamic config loader, a plugin boundary) can.
pub enum Destination<'a> {
    Handle(&'a mut dyn ReflectMut),
    NotAddressable(Value),
}

/// The dynamic entry point: same algorithm as [`deep_copy`], but the
/// destination's addressability is a runtime fact rather than a type-level
/// one, so an unaddressable destination surfaces as a normal error instead
/// of being impossible to express.
pub fn deep_copy_dynamic(src: &dyn Reflect, dst: Destination<'_>) -> Result<(), CopyError> {
    match dst {
        Destination::Handle(handle) => {
            debug!(dst = handle.kind().type_name(), "deep_copy_dynamic");
            let value = dereference(src.to_value());
            handle.set_value(value)
        }
        Destination::NotAddressable(value) => Err(CopyError::destination_not_addressable(&value)),
    }
}
