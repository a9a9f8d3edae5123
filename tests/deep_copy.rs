use std::sync::Arc;

use chrono::{TimeZone, Utc};
use structural_copy::{
    deep_copy, deep_copy_dynamic, reflect_record, CopyError, Destination, Opaque, ProtoTimestamp,
    ProtoTimestampHandle, Reflect,
};

reflect_record! {
    #[derive(Debug, Clone)]
    pub struct SourceProfile {
        pub id: i32,
        pub name: String,
        pub nickname: String,
        #[private]
        pub internal_cache: u8,
        pub created_at: chrono::DateTime<chrono::Utc>,
        pub tags: Vec<String>,
    }
}

reflect_record! {
    #[derive(Debug, Clone, Default)]
    pub struct DestProfile {
        #[alias = "id"]
        pub identifier: i64,
        pub name: String,
        #[alias = "nickname"]
        pub nick: String,
        pub internal_cache: u8,
        pub created_at: ProtoTimestampHandle,
        pub tags: Vec<String>,
    }
}

reflect_record! {
    #[derive(Debug, Clone, Default)]
    pub struct TimestampValueDest {
        pub created_at: ProtoTimestamp,
    }
}

reflect_record! {
    #[derive(Debug, Clone, Default)]
    pub struct AmbiguousDest {
        pub first: i32,
        pub second: i32,
    }
}

reflect_record! {
    #[derive(Debug, Clone)]
    pub struct AmbiguousSource {
        #[alias = "first"]
        pub value: i32,
    }
}

fn sample_source() -> SourceProfile {
    SourceProfile {
        id: 7,
        name: "Ada".into(),
        nickname: "A".into(),
        internal_cache: 99,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        tags: vec!["admin".into(), "staff".into()],
    }
}

#[test]
fn copies_aliased_fields_and_widens_numerics() {
    let src = sample_source();
    let mut dst = DestProfile::default();

    deep_copy(&src, &mut dst).unwrap();

    assert_eq!(dst.identifier, 7);
    assert_eq!(dst.name, "Ada");
    assert_eq!(dst.nick, "A");
    assert_eq!(dst.tags, vec!["admin".to_string(), "staff".to_string()]);
    assert_eq!(dst.created_at.0.seconds, src.created_at.timestamp());
}

#[test]
fn unexported_field_never_crosses() {
    let src = sample_source();
    let mut dst = DestProfile::default();
    dst.internal_cache = 5;

    deep_copy(&src, &mut dst).unwrap();

    assert_eq!(dst.internal_cache, 5, "private source field must not be copied");
}

#[test]
fn zero_valued_fields_do_not_overwrite_existing_destination_state() {
    let mut src = sample_source();
    src.name = String::new();
    src.tags = Vec::new();

    let mut dst = DestProfile::default();
    dst.name = "kept".into();
    dst.tags = vec!["kept-tag".into()];

    deep_copy(&src, &mut dst).unwrap();

    assert_eq!(dst.name, "kept");
    assert_eq!(dst.tags, vec!["kept-tag".to_string()]);
    assert_eq!(dst.identifier, src.id as i64);
}

#[test]
fn first_declared_matching_field_wins() {
    let src = AmbiguousSource { value: 42 };
    let mut dst = AmbiguousDest::default();

    deep_copy(&src, &mut dst).unwrap();

    assert_eq!(dst.first, 42);
    assert_eq!(dst.second, 0);
}

#[test]
fn bare_timestamp_destination_rejects_wall_clock_source() {
    let src = sample_source();
    let mut dst = TimestampValueDest::default();

    let err = deep_copy(&src, &mut dst).unwrap_err();
    assert!(matches!(err, CopyError::CoercionFailed { .. }));
}

#[test]
fn string_source_flexibly_parses_into_scalar_destination() {
    reflect_record! {
        #[derive(Debug, Clone)]
        pub struct StringCodeSource {
            pub code: String,
        }
    }
    reflect_record! {
        #[derive(Debug, Clone, Default)]
        pub struct IntCodeDest {
            pub code: i32,
        }
    }

    let src = StringCodeSource { code: "42".into() };
    let mut dst = IntCodeDest::default();

    deep_copy(&src, &mut dst).unwrap();

    assert_eq!(dst.code, 42);
}

#[test]
fn non_timestamp_scalar_into_bare_timestamp_destination_reports_coercion_error() {
    reflect_record! {
        #[derive(Debug, Clone)]
        pub struct BadConversionSource {
            pub created_at: i32,
        }
    }

    let src = BadConversionSource { created_at: 12 };
    let mut dst = TimestampValueDest::default();

    let err = deep_copy(&src, &mut dst).unwrap_err();
    let message = err.to_string();
    assert!(
        message.contains("unable to convert 12 (type int32) to type"),
        "unexpected message: {message}"
    );
    assert!(matches!(err, CopyError::CoercionFailed { .. }));
}

#[test]
fn dynamic_entry_point_reports_not_addressable() {
    let src = sample_source();
    let err = deep_copy_dynamic(&src, Destination::NotAddressable(src.to_value())).unwrap_err();
    match err {
        CopyError::DestinationNotAddressable { kind, .. } => assert_eq!(kind, "struct"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn opaque_handles_alias_rather_than_clone() {
    #[derive(Default)]
    struct Blob(Vec<u8>);

    reflect_record! {
        #[derive(Clone)]
        pub struct HoldsOpaqueSrc {
            pub payload: Opaque<Blob>,
        }
    }
    reflect_record! {
        #[derive(Default)]
        pub struct HoldsOpaqueDst {
            pub payload: Opaque<Blob>,
        }
    }

    let payload = Opaque::new(Blob(vec![1, 2, 3]));
    let src = HoldsOpaqueSrc {
        payload: payload.clone(),
    };
    let mut dst = HoldsOpaqueDst::default();

    deep_copy(&src, &mut dst).unwrap();

    assert!(Arc::ptr_eq(&payload.0, &dst.payload.0));
}

#[test]
fn timestamp_handle_round_trips_through_protocol_timestamp() {
    let direct = ProtoTimestampHandle::new(ProtoTimestamp {
        seconds: 123,
        nanos: 456,
    });

    reflect_record! {
        #[derive(Clone)]
        pub struct HandleSrc {
            pub at: ProtoTimestampHandle,
        }
    }
    reflect_record! {
        #[derive(Default)]
        pub struct HandleDst {
            pub at: ProtoTimestampHandle,
        }
    }

    let src = HandleSrc { at: direct.clone() };
    let mut dst = HandleDst::default();
    deep_copy(&src, &mut dst).unwrap();

    assert!(Arc::ptr_eq(&direct.0, &dst.at.0));
}
