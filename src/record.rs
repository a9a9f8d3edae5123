// The record matcher: copying one record's exported, non-zero fields into
// another record's matching exported fields, and the `reflect_record!`
// macro that generates `Reflect`/`ReflectMut` impls for a plain struct
// without a proc-macro.

use tracing::trace;

use crate::error::CopyError;
use crate::field::{names_match, FieldDescriptor};
use crate::reflect::ReflectMut;
use crate::value::RecordValue;

/// One destination slot a `reflect_record!`-generated `set_value` exposes to
/// the matcher: its descriptor, and a reborrowed `&mut dyn ReflectMut` onto
/// the concrete field.
pub struct DestField<'a> {
    pub descriptor: FieldDescriptor,
    pub slot: &'a mut dyn ReflectMut,
}

/// Copies `record`'s exported, non-zero fields into the first
/// name-matching exported field of `dest_fields`, in the source's
/// declaration order. A source field with no matching destination field is
/// silently dropped; a matched field that fails coercion or a shape check
/// propagates its error unwrapped — the matcher does not add field-path
/// context of its own.
pub fn copy_record_into(record: RecordValue, dest_fields: &mut [DestField]) -> Result<(), CopyError> {
    for (src_desc, value) in record.fields {
        if !src_desc.exported {
            trace!(field = src_desc.name, "skip: unexported source field");
            continue;
        }
        if value.is_zero() {
            trace!(field = src_desc.name, "skip: zero-valued source field");
            continue;
        }
        match dest_fields
            .iter_mut()
            .find(|d| d.descriptor.exported && names_match(&src_desc, &d.descriptor))
        {
            Some(dest) => {
                trace!(
                    src_field = src_desc.name,
                    dst_field = dest.descriptor.name,
                    "matched"
                );
                dest.slot.set_value(crate::engine::dereference(value))?;
            }
            None => trace!(field = src_desc.name, "skip: no matching destination field"),
        }
    }
    Ok(())
}

/// Generates a plain struct plus `Reflect`/`ReflectMut` impls that expose
/// its fields to the copy engine in declaration order. A field tagged
/// `#[alias = "..."]` additionally matches a differently-named field on the
/// other side; a field tagged `#[private]` is carried on the struct but
/// never read from or written to by the engine, mirroring an unexported
/// struct field in the source this crate's algorithm is modeled on.
#[macro_export]
macro_rules! reflect_record {
    (
        $(#[$smeta:meta])*
        $svis:vis struct $name:ident {
            $(
                $(#[$fattr:meta])?
                pub $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$smeta])*
        $svis struct $name {
            $(pub $field: $ty),*
        }

        impl $crate::reflect::Reflect for $name {
            fn to_value(&self) -> $crate::value::Value {
                let mut fields = Vec::new();
                $(
                    {
                        let (alias, exported) = reflect_record!(@parts $($fattr)?);
                        let descriptor = $crate::field::FieldDescriptor::new(stringify!($field), alias, exported);
                        fields.push((descriptor, $crate::reflect::Reflect::to_value(&self.$field)));
                    }
                )*
                $crate::value::Value::Record($crate::value::RecordValue {
                    type_name: stringify!($name),
                    fields,
                })
            }
        }

        impl $crate::reflect::ReflectMut for $name {
            fn kind(&self) -> $crate::value::Kind {
                $crate::value::Kind::Record(stringify!($name))
            }

            fn set_value(&mut self, value: $crate::value::Value) -> ::std::result::Result<(), $crate::error::CopyError> {
                match value {
                    $crate::value::Value::Record(record) => {
                        let mut dest_fields = Vec::new();
                        $(
                            {
                                let (alias, exported) = reflect_record!(@parts $($fattr)?);
                                let descriptor = $crate::field::FieldDescriptor::new(stringify!($field), alias, exported);
                                dest_fields.push($crate::record::DestField {
                                    descriptor,
                                    slot: &mut self.$field,
                                });
                            }
                        )*
                        $crate::record::copy_record_into(record, &mut dest_fields)
                    }
                    other => Err($crate::error::CopyError::shape_mismatch(&other, stringify!($name))),
                }
            }
        }
    };

    (@parts) => { (None, true) };
    (@parts private) => { (None, false) };
    (@parts alias = $lit:literal) => { (Some($lit), true) };
}
