use dbug::{format, Arg};
use serde_json::json;

fn args(values: &[Arg]) -> &[Arg] {
    values
}

#[test]
fn plain_strings_pass_through() {
    assert_eq!(format("", &[]), "");
    assert_eq!(format("test", &[]), "test");
}

#[test]
fn trailing_arguments_are_appended() {
    assert_eq!(
        format("foo", args(&["bar".into(), "baz".into()])),
        "foo bar baz"
    );
    assert_eq!(
        format("%s:%s", args(&["foo".into(), "bar".into(), "baz".into()])),
        "foo:bar baz"
    );
    assert_eq!(format("x", args(&[json!({ "a": 1 }).into()])), "x { a: 1 }");
}

#[test]
fn numeric_coercion() {
    assert_eq!(format("%d", args(&[42.0.into()])), "42");
    assert_eq!(format("%d", args(&[42.into()])), "42");
    assert_eq!(format("%d", args(&["42.0".into()])), "42");
    assert_eq!(format("%d", args(&["42".into()])), "42");
    assert_eq!(format("%d", args(&["not a number".into()])), "NaN");
    assert_eq!(format("%d", args(&[2.5.into()])), "2.5");
}

#[test]
fn string_coercion() {
    assert_eq!(format("%s", args(&[42.into()])), "42");
    assert_eq!(format("%s", args(&["42".into()])), "42");
    assert_eq!(format("%s", args(&[true.into()])), "true");
    assert_eq!(format("%s", args(&[().into()])), "null");
}

#[test]
fn json_coercion() {
    assert_eq!(format("%j", args(&[42.into()])), "42");
    assert_eq!(format("%j", args(&["42".into()])), "\"42\"");
    assert_eq!(
        format("%j", args(&[json!({ "a": [1, 2] }).into()])),
        r#"{"a":[1,2]}"#
    );
}

#[test]
fn unserializable_structures_degrade_to_circular() {
    // The runaway nesting a cyclic structure would produce.
    let mut value = json!(0);
    for _ in 0..300 {
        value = json!([value]);
    }
    assert_eq!(format("%j", args(&[value.into()])), "[Circular]");
}

#[test]
fn escaped_percent_consumes_nothing() {
    assert_eq!(format("%%s%s", args(&["foo".into()])), "%sfoo");
    assert_eq!(format("%%%s%%", args(&["hi".into()])), "%hi%");
    assert_eq!(format("%%%s%%%%", args(&["hi".into()])), "%hi%%");
}

#[test]
fn missing_arguments_leave_directives_verbatim() {
    assert_eq!(format("%s", &[]), "%s");
    assert_eq!(format("%s:%s", &[]), "%s:%s");
    assert_eq!(format("%s:%s", args(&["foo".into()])), "foo:%s");
    assert_eq!(format("%s:%s", args(&["foo".into(), "bar".into()])), "foo:bar");
}

#[test]
fn unknown_directives_are_literal() {
    assert_eq!(format("%x %s", args(&["foo".into()])), "%x foo");
    assert_eq!(format("100%", &[]), "100%");
}

#[test]
fn inspection_renders_bare_keys() {
    assert_eq!(format("%O", args(&[json!({}).into()])), "{}");
    // serde_json maps iterate in key order; non-identifier keys stay quoted.
    assert_eq!(
        format("%o", args(&[json!({ "pool": 4, "db host": "x" }).into()])),
        "{ \"db host\": \"x\", pool: 4 }"
    );
    assert_eq!(
        format("%O", args(&[json!([1, "two", null]).into()])),
        "[1, \"two\", null]"
    );
}

#[test]
fn inspection_depth_is_capped() {
    let deep = json!({ "a": { "b": { "c": { "d": { "e": 1 } } } } });
    let rendered = format("%O", args(&[deep.into()]));
    assert!(rendered.contains("[Object]"), "got: {}", rendered);
}

#[test]
fn error_arguments_render_their_description() {
    use std::fmt;

    #[derive(Debug)]
    struct Broken;

    impl fmt::Display for Broken {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            "it broke".fmt(f)
        }
    }

    impl std::error::Error for Broken {}

    let arg = Arg::error(&Broken);
    assert_eq!(format("%s", args(&[arg])), "it broke");
}
