//! `#[derive(Describe)]` field conventions.

#![allow(non_snake_case, dead_code)]

use std::borrow::Cow;
use std::sync::Arc;

use casebook::case::{is_debugging, is_skipping, name_or_default};
use casebook::{Describe, Plain};

#[derive(Describe)]
struct Lower {
    name: String,
    debug: bool,
    skip: bool,
}

#[derive(Describe)]
struct Upper {
    Name: &'static str,
    Debug: bool,
    Skip: bool,
}

#[derive(Describe)]
struct Scenario {
    scenario: Cow<'static, str>,
}

#[derive(Describe)]
struct Both {
    name: Arc<str>,
    scenario: String,
}

#[derive(Describe)]
struct WrongTypes {
    name: u32,
    debug: Option<bool>,
    skip: &'static str,
}

#[derive(Describe)]
struct Generic<T> {
    name: String,
    input: T,
}

#[derive(Describe)]
struct Tuple(String, bool);

#[derive(Describe)]
enum Kind {
    A,
    B { name: String },
}

#[test]
fn lowercase_fields() {
    let value = Lower {
        name: " add ".into(),
        debug: true,
        skip: false,
    };
    assert_eq!(value.case_name(), Some("add"));
    assert!(is_debugging(&value));
    assert!(!is_skipping(&value));
}

#[test]
fn capitalized_fields() {
    let value = Upper {
        Name: "upper",
        Debug: false,
        Skip: true,
    };
    assert_eq!(name_or_default(&value, "", 1), "upper");
    assert!(!is_debugging(&value));
    assert!(is_skipping(&value));
}

#[test]
fn scenario_is_a_name() {
    let value = Scenario {
        scenario: Cow::Borrowed("from scenario"),
    };
    assert_eq!(name_or_default(&value, "", 4), "from scenario");
}

#[test]
fn blank_name_falls_through_to_scenario() {
    let value = Both {
        name: Arc::from("  "),
        scenario: "fallback".into(),
    };
    assert_eq!(value.case_name(), Some("fallback"));

    let value = Both {
        name: Arc::from("primary"),
        scenario: "fallback".into(),
    };
    assert_eq!(value.case_name(), Some("primary"));
}

#[test]
fn non_string_and_non_bool_fields_are_ignored() {
    let value = WrongTypes {
        name: 7,
        debug: Some(true),
        skip: "yes",
    };
    assert_eq!(value.case_name(), None);
    assert!(!is_debugging(&value));
    assert!(!is_skipping(&value));
    assert_eq!(name_or_default(&value, "", 12), "testcase-012");
}

#[test]
fn generic_records() {
    let value = Generic {
        name: "generic".into(),
        input: vec![1, 2, 3],
    };
    assert_eq!(value.case_name(), Some("generic"));
}

#[test]
fn non_records_describe_nothing() {
    assert_eq!(Tuple("tuple".into(), true).case_name(), None);
    assert_eq!(Kind::B { name: "variant".into() }.case_name(), None);
    assert_eq!(name_or_default(&Kind::A, "", 3), "testcase-003");
}

#[test]
fn references_and_boxes_are_transparent() {
    let value = Lower {
        name: "boxed".into(),
        debug: false,
        skip: true,
    };
    assert_eq!(name_or_default(&&value, "", 1), "boxed");
    let boxed = Box::new(value);
    assert!(is_skipping(&boxed));
    assert_eq!(Some(&*boxed).case_name(), Some("boxed"));
}

#[test]
fn hint_wins_over_payload_name() {
    let value = Lower {
        name: "payload".into(),
        debug: false,
        skip: false,
    };
    assert_eq!(name_or_default(&value, " hint ", 1), "hint");
    assert_eq!(name_or_default(&Plain(value), "", 2), "testcase-002");
}
