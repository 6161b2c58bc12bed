use super::*;
use crate::context::CancelContext;
use chrono::TimeZone;
use std::io;

#[test]
#[allow(clippy::approx_constant)]
fn test_float_round_trip_is_bit_exact() {
    let field = Field::float64("ratio", 3.14);
    assert_eq!(field.kind(), FieldKind::Float64);
    assert_eq!(field.value().as_f64(), Some(3.14));

    let tiny = Field::float64("tiny", f64::MIN_POSITIVE);
    assert_eq!(tiny.value().as_f64().map(f64::to_bits), Some(f64::MIN_POSITIVE.to_bits()));
}

#[test]
fn test_render_modes() {
    let field = Field::string("user", "alice");
    assert_eq!(field.render(FieldFormat::Quote), "\"alice\"");
    assert_eq!(field.render(FieldFormat::Compact), "[user: alice]");
    assert_eq!(field.render(FieldFormat::Struct), "{Key: user, Value: alice}");
    assert_eq!(
        field.render(FieldFormat::StructWithType),
        "{Key: user, Type: String, Value: alice}"
    );
    assert_eq!(field.render(FieldFormat::Verbose), "{user: \"alice\"}");
}

#[test]
fn test_display_uses_struct_modes() {
    let field = Field::int64("attempt", 3);
    assert_eq!(field.to_string(), "{Key: attempt, Value: 3}");
    assert_eq!(format!("{:#}", field), "{Key: attempt, Type: Int64, Value: 3}");
}

#[test]
fn test_value_texts() {
    assert_eq!(Field::bool("ok", true).render(FieldFormat::Quote), "\"true\"");
    assert_eq!(
        Field::binary("raw", vec![1u8, 2, 3]).render(FieldFormat::Compact),
        "[raw: [1 2 3]]"
    );
    assert_eq!(Field::byte_string("text", "héllo").render(FieldFormat::Compact), "[text: héllo]");
    assert_eq!(
        Field::duration("took", Duration::from_millis(1500)).render(FieldFormat::Compact),
        "[took: 1.5s]"
    );
    assert_eq!(
        Field::error(Arc::new(io::Error::other("denied"))).render(FieldFormat::Compact),
        "[error: denied]"
    );
    assert_eq!(Field::nil("gone").render(FieldFormat::Compact), "[gone: <nil>]");
}

#[test]
fn test_bool_and_duration_values() {
    assert_eq!(Field::bool("b", false).value().as_bool(), Some(false));
    assert_eq!(
        Field::duration("d", Duration::from_secs(2)).value().as_duration(),
        Some(Duration::from_secs(2))
    );
    assert_eq!(
        Field::duration("max", Duration::MAX).value().as_duration(),
        Some(Duration::from_nanos(i64::MAX as u64))
    );
}

#[test]
fn test_time_in_range_keeps_offset() {
    let offset = FixedOffset::east_opt(2 * 3600).unwrap();
    let when = offset.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap();

    let field = Field::time("at", when);
    assert_eq!(field.kind(), FieldKind::Time);
    let value = field.value().as_time().unwrap();
    assert_eq!(value, when);
    assert_eq!(value.offset(), &offset);
}

#[test]
fn test_time_out_of_range_is_full() {
    let when = Utc.with_ymd_and_hms(2500, 1, 1, 0, 0, 0).unwrap();
    let field = Field::time("far", when);
    assert_eq!(field.kind(), FieldKind::TimeFull);
    assert_eq!(field.value().as_time(), Some(when.fixed_offset()));
}

#[test]
fn test_any_dispatch() {
    assert_eq!(Field::any("s", String::from("x")).kind(), FieldKind::String);
    assert_eq!(Field::any("s", "x").kind(), FieldKind::String);
    assert_eq!(Field::any("n", 7i32).value().as_i64(), Some(7));
    assert_eq!(Field::any("n", 7isize).kind(), FieldKind::Int64);
    assert_eq!(Field::any("n", 7i64).kind(), FieldKind::Int64);
    assert_eq!(Field::any("f", 0.5f64).value().as_f64(), Some(0.5));
    assert_eq!(Field::any("b", vec![0u8, 1]).kind(), FieldKind::Binary);
    assert_eq!(Field::any("ok", true).kind(), FieldKind::Bool);
    assert_eq!(Field::any("t", Utc::now()).kind(), FieldKind::Time);
    assert_eq!(Field::any("d", Duration::from_secs(1)).kind(), FieldKind::Duration);

    let err: SharedError = Arc::new(io::Error::other("e"));
    assert_eq!(Field::any("e", err).kind(), FieldKind::Error);
    assert_eq!(Field::any("c", CancelContext::background()).kind(), FieldKind::Context);
}

#[test]
fn test_any_nil_and_reflect() {
    let nil = Field::any("nothing", ());
    assert!(nil.is_nil());
    assert!(is_nil_field(&nil));

    #[derive(Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    let field = Field::any("point", Point { x: 1, y: 2 });
    assert_eq!(field.kind(), FieldKind::Reflect);
    assert!(!field.is_nil());
    assert_eq!(field.value().downcast_ref::<Point>(), Some(&Point { x: 1, y: 2 }));
    assert_eq!(field.render(FieldFormat::Compact), "[point: Point { x: 1, y: 2 }]");
}

#[test]
fn test_zero_field() {
    let field = Field::default();
    assert_eq!(field.key(), "");
    assert!(field.is_kind(FieldKind::Unknown));
    assert!(field.value().is_nil());
    assert!(!field.is_nil());
}

#[test]
fn test_equality() {
    assert_eq!(Field::string("k", "v"), Field::string("k", "v"));
    assert_ne!(Field::string("k", "v"), Field::string("k", "w"));
    assert_ne!(Field::string("k", "1"), Field::int64("k", 1));

    let err: SharedError = Arc::new(io::Error::other("e"));
    assert_eq!(Field::error(err.clone()), Field::error(err));
    assert_ne!(
        Field::error(Arc::new(io::Error::other("e"))),
        Field::error(Arc::new(io::Error::other("e")))
    );
}

#[test]
fn test_context_field() {
    let ctx = CancelContext::background();
    let field = Field::context(ctx.clone());
    assert_eq!(field.key(), "ctx");
    assert!(field.value().as_context().unwrap().same_as(&ctx));
}

#[test]
fn test_stack_field_is_string() {
    let field = Field::stack_depth("stack", 3);
    assert_eq!(field.kind(), FieldKind::String);
    assert!(!field.value().as_str().unwrap_or_default().is_empty());
}

#[test]
fn test_serialize() {
    let json = serde_json::to_value(Field::int64("retries", 4)).unwrap();
    assert_eq!(json, serde_json::json!({"key": "retries", "type": "Int64", "value": 4}));

    let json = serde_json::to_value(Field::nil("missing")).unwrap();
    assert_eq!(json, serde_json::json!({"key": "missing", "type": "Reflect", "value": null}));

    let json = serde_json::to_value(Field::duration("d", Duration::from_millis(250))).unwrap();
    assert_eq!(json["value"], "250ms");
}
