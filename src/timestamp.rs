// The two distinguished timestamp representations and the conversions
// between them and `chrono`'s wall-clock time. `ProtoTimestamp` is
// field-for-field identical to `prost_types::Timestamp`; keeping it as a
// local type (rather than re-exporting the prost one) lets the engine
// implement `Reflect`/`ReflectMut` on it without an orphan-rule conflict,
// while `from_prost`/`to_prost` make the two interchangeable at the call
// site of a generated gRPC client.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use crate::error::CopyError;
use crate::value::{Kind, Value};

/// Seconds and nanoseconds since the Unix epoch, matching
/// `google.protobuf.Timestamp`'s wire representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProtoTimestamp {
    pub seconds: i64,
    pub nanos: i32,
}

impl ProtoTimestamp {
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        ProtoTimestamp {
            seconds: dt.timestamp(),
            nanos: dt.timestamp_subsec_nanos() as i32,
        }
    }

    pub fn to_datetime(self) -> Result<DateTime<Utc>, CopyError> {
        Utc.timestamp_opt(self.seconds, self.nanos.max(0) as u32)
            .single()
            .ok_or_else(|| {
                CopyError::coercion_failed(
                    &Value::ProtoTimestamp(self),
                    Kind::WallClock.type_name(),
                )
            })
    }

    pub fn from_prost(t: prost_types::Timestamp) -> Self {
        ProtoTimestamp {
            seconds: t.seconds,
            nanos: t.nanos,
        }
    }

    pub fn to_prost(self) -> prost_types::Timestamp {
        prost_types::Timestamp {
            seconds: self.seconds,
            nanos: self.nanos,
        }
    }
}

/// An owning handle to a `ProtoTimestamp`, modeling the original engine's
/// `*timestamppb.Timestamp` pointer. Cloning a handle clones the `Arc`, not
/// the pointee — the timestamp-handle-to-timestamp-handle row of the bridge
/// table shares the handle rather than copying it.
#[derive(Debug, Clone)]
pub struct ProtoTimestampHandle(pub Arc<ProtoTimestamp>);

impl ProtoTimestampHandle {
    pub fn new(ts: ProtoTimestamp) -> Self {
        Self(Arc::new(ts))
    }
}

impl Default for ProtoTimestampHandle {
    fn default() -> Self {
        Self::new(ProtoTimestamp::default())
    }
}

/// Converts any value the bridge recognizes as a timestamp source into a
/// wall-clock instant. Used by `DateTime<Utc>`'s `ReflectMut` impl and by
/// `Option<DateTime<Utc>>` through the generic optional-destination path.
pub fn to_wall_clock(value: Value) -> Result<DateTime<Utc>, CopyError> {
    match value {
        Value::WallClock(dt) => Ok(dt),
        Value::ProtoTimestamp(pt) => pt.to_datetime(),
        Value::ProtoTimestampHandle(arc) => (*arc).to_datetime(),
        other => Err(CopyError::coercion_failed(&other, Kind::WallClock.type_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_to_nanosecond_precision() {
        let original = Utc.with_ymd_and_hms(2024, 3, 14, 1, 2, 3).unwrap()
            + chrono::Duration::nanoseconds(123_456_789);
        let pt = ProtoTimestamp::from_datetime(original);
        let back = pt.to_datetime().unwrap();
        assert_eq!(original, back);
    }

    #[test]
    fn interchangeable_with_prost_types() {
        let pt = ProtoTimestamp {
            seconds: 5,
            nanos: 6,
        };
        let prost = pt.to_prost();
        assert_eq!(prost.seconds, 5);
        assert_eq!(prost.nanos, 6);
        assert_eq!(ProtoTimestamp::from_prost(prost), pt);
    }
}
