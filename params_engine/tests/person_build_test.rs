//! Integration tests for the build engine.
//!
//! End-to-end scenarios over a realistic schema: pipelines, requiredness,
//! authorized keys, defaults, resolution directives and domain constraints.

use params_core::{
    AutoGenerator, BuildError, ErrorEntry, ErrorReport, FieldValidator, TypeTag, Value, ValueMap,
    Verdict,
};
use params_engine::Builder;
use params_parser::{FieldSpecBuilder, SchemaBuilder};

fn person_schema() -> SchemaBuilder {
    SchemaBuilder::new("person")
        .field(
            FieldSpecBuilder::new("name", TypeTag::String)
                .derive("sanitize(trim, upcase) validate(not_empty, max_len=20)")
                .build(),
        )
        .field(FieldSpecBuilder::new("mandatoryInt", TypeTag::Integer).build())
        .field(
            FieldSpecBuilder::new("role", TypeTag::String)
                .default("user")
                .build(),
        )
}

fn input(pairs: &[(&str, Value)]) -> ValueMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn report_of(err: BuildError) -> ErrorReport {
    err.report().clone()
}

#[test]
fn test_minimal_valid_input_applies_default() {
    let builder = Builder::new(person_schema().build());
    let built = builder
        .build(input(&[
            ("name", Value::String("mishka".into())),
            ("mandatoryInt", Value::Int(3)),
        ]))
        .unwrap();

    assert_eq!(built.get("name"), Some(&Value::String("MISHKA".into())));
    assert_eq!(built.get("role"), Some(&Value::String("user".into())));
}

#[test]
fn test_missing_required_fields_short_circuit() {
    let builder = Builder::new(person_schema().build());
    let err = builder
        .build(input(&[("name", Value::String("mishka".into()))]))
        .unwrap_err();

    assert_eq!(
        report_of(err),
        ErrorReport::RequiredFields(vec!["mandatoryInt".to_string()])
    );
}

#[test]
fn test_unauthorized_keys_rejected() {
    let builder = Builder::new(person_schema().authorized_only(true).build());
    let err = builder
        .build(input(&[
            ("name", Value::String("mishka".into())),
            ("mandatoryInt", Value::Int(3)),
            ("extra", Value::Bool(true)),
        ]))
        .unwrap_err();

    assert_eq!(
        report_of(err),
        ErrorReport::AuthorizedFields(vec!["extra".to_string()])
    );
}

#[test]
fn test_undeclared_keys_pass_through_by_default() {
    let builder = Builder::new(person_schema().build());
    let built = builder
        .build(input(&[
            ("name", Value::String("mishka".into())),
            ("mandatoryInt", Value::Int(3)),
            ("extra", Value::Bool(true)),
        ]))
        .unwrap();

    assert_eq!(built.get("extra"), Some(&Value::Bool(true)));
}

#[test]
fn test_sanitize_runs_before_validate() {
    let builder = Builder::new(person_schema().build());

    // Whitespace padding trims away before upcasing.
    let built = builder
        .build(input(&[
            ("name", Value::String(" mishka ".into())),
            ("mandatoryInt", Value::Int(3)),
        ]))
        .unwrap();
    assert_eq!(built.get("name"), Some(&Value::String("MISHKA".into())));

    // A whitespace-only value trims to empty and fails not_empty.
    let err = builder
        .build(input(&[
            ("name", Value::String("   ".into())),
            ("mandatoryInt", Value::Int(3)),
        ]))
        .unwrap_err();
    match report_of(err) {
        ErrorReport::BadParameters(entries) => {
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].field(), "name");
            assert_eq!(entries[0].action(), Some("not_empty"));
        }
        other => panic!("expected bad parameters, got {other:?}"),
    }
}

#[test]
fn test_type_mismatch_is_a_bad_parameter() {
    let builder = Builder::new(person_schema().build());
    let err = builder
        .build(input(&[
            ("name", Value::String("mishka".into())),
            ("mandatoryInt", Value::String("three".into())),
        ]))
        .unwrap_err();

    match report_of(err) {
        ErrorReport::BadParameters(entries) => {
            assert_eq!(entries[0].field(), "mandatoryInt");
            assert_eq!(entries[0].action(), Some("type"));
        }
        other => panic!("expected bad parameters, got {other:?}"),
    }
}

#[test]
fn test_every_failing_check_is_collected() {
    let schema = SchemaBuilder::new("doc")
        .field(
            FieldSpecBuilder::new("code", TypeTag::String)
                .derive("validate(min_len=5, pattern='^[a-z]+$')")
                .build(),
        )
        .build();

    let err = Builder::new(schema)
        .build(input(&[("code", Value::String("AB".into()))]))
        .unwrap_err();

    match report_of(err) {
        ErrorReport::BadParameters(entries) => {
            let actions: Vec<_> = entries.iter().filter_map(ErrorEntry::action).collect();
            assert_eq!(actions, vec!["min_len", "pattern"]);
        }
        other => panic!("expected bad parameters, got {other:?}"),
    }
}

#[test]
fn test_colon_prefixed_keys_normalize() {
    let builder = Builder::new(person_schema().build());
    let built = builder
        .build(input(&[
            (":name", Value::String("mishka".into())),
            (":mandatoryInt", Value::Int(3)),
        ]))
        .unwrap();

    assert_eq!(built.get("name"), Some(&Value::String("MISHKA".into())));
    assert!(!built.contains_key(":name"));
}

#[test]
fn test_domain_clause_mismatch_and_missing_key() {
    let schema = SchemaBuilder::new("request")
        .field(
            FieldSpecBuilder::new("payload", TypeTag::Any)
                .domain("!auth.action=In[admin, user]")
                .build(),
        )
        .enforce_all(false)
        .build();
    let builder = Builder::new(schema);

    // Bound path, non-member value.
    let err = builder
        .build(input(&[
            ("payload", Value::Int(1)),
            (
                "auth",
                Value::Map(input(&[("action", Value::String("guest".into()))])),
            ),
        ]))
        .unwrap_err();
    match report_of(err) {
        ErrorReport::DomainParameters(entries) => {
            let json = serde_json::to_value(&entries[0]).unwrap();
            assert_eq!(json["field_path"], "auth.action");
            assert_eq!(json["message"], "does not satisfy In[admin, user]");
        }
        other => panic!("expected domain parameters, got {other:?}"),
    }

    // Unbound path on a required clause.
    let err = builder
        .build(input(&[("payload", Value::Int(1))]))
        .unwrap_err();
    match report_of(err) {
        ErrorReport::DomainParameters(entries) => {
            let json = serde_json::to_value(&entries[0]).unwrap();
            assert_eq!(
                json["message"],
                "does not satisfy In[admin, user] and required key is missing"
            );
        }
        other => panic!("expected domain parameters, got {other:?}"),
    }
}

#[test]
fn test_edit_skips_required_but_checks_present() {
    let builder = Builder::new(person_schema().build());

    // Absent enforced fields are fine in an edit.
    let built = builder
        .edit(input(&[("name", Value::String(" mishka ".into()))]))
        .unwrap();
    assert_eq!(built.get("name"), Some(&Value::String("MISHKA".into())));

    // Present fields are still checked.
    let err = builder
        .edit(input(&[("mandatoryInt", Value::String("nope".into()))]))
        .unwrap_err();
    assert!(matches!(report_of(err), ErrorReport::BadParameters(_)));
}

#[test]
fn test_auto_from_on_resolution() {
    let schema = SchemaBuilder::new("ticket")
        .field(
            FieldSpecBuilder::new("id", TypeTag::String)
                .auto(AutoGenerator::new(|_| Value::String("t-001".into())))
                .build(),
        )
        .field(
            FieldSpecBuilder::new("owner", TypeTag::String)
                .from("reporter")
                .build(),
        )
        .field(FieldSpecBuilder::new("reporter", TypeTag::String).build())
        .field(
            FieldSpecBuilder::new("reason", TypeTag::String)
                .enforce(false)
                .on("rejected")
                .build(),
        )
        .build();
    let builder = Builder::new(schema);

    let built = builder
        .build(input(&[("reporter", Value::String("mishka".into()))]))
        .unwrap();
    assert_eq!(built.get("id"), Some(&Value::String("t-001".into())));
    assert_eq!(built.get("owner"), Some(&Value::String("mishka".into())));

    // `reason` without its `rejected` dependency is a dependent-key error.
    let err = builder
        .build(input(&[
            ("reporter", Value::String("mishka".into())),
            ("reason", Value::String("dup".into())),
        ]))
        .unwrap_err();
    match report_of(err) {
        ErrorReport::DependentKeys(entries) => {
            assert_eq!(entries[0].field(), "reason");
        }
        other => panic!("expected dependent keys, got {other:?}"),
    }
}

#[test]
fn test_fn_op_applies_validator_transform() {
    let schema = SchemaBuilder::new("account")
        .field(
            FieldSpecBuilder::new("handle", TypeTag::String)
                .derive("sanitize(trim) validate(fn, not_empty)")
                .validator(FieldValidator::new(|_, value| match value.as_str() {
                    Some(s) => Verdict::Pass(Value::String(format!("@{s}"))),
                    None => Verdict::Fail("expected a string handle".to_string()),
                }))
                .build(),
        )
        .build();
    let builder = Builder::new(schema);

    // The passing validator's replacement value reaches the built tree,
    // and the remaining pipeline checks run against the replacement.
    let built = builder
        .build(input(&[("handle", Value::String(" mishka ".into()))]))
        .unwrap();
    assert_eq!(built.get("handle"), Some(&Value::String("@mishka".into())));

    let err = builder
        .build(input(&[("handle", Value::Int(7))]))
        .unwrap_err();
    match report_of(err) {
        ErrorReport::BadParameters(entries) => {
            assert!(entries.iter().any(|e| e.action() == Some("fn")));
        }
        other => panic!("expected bad parameters, got {other:?}"),
    }
}

#[test]
fn test_null_values_count_as_absent() {
    let builder = Builder::new(person_schema().build());
    let err = builder
        .build(input(&[
            ("name", Value::String("mishka".into())),
            ("mandatoryInt", Value::Null),
        ]))
        .unwrap_err();

    assert_eq!(
        report_of(err),
        ErrorReport::RequiredFields(vec!["mandatoryInt".to_string()])
    );
}
