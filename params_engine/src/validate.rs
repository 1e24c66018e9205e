//! Validator stage registry.
//!
//! Named, pure value checks. Every operation in a field's validate stage
//! runs and every failure is collected, with no short-circuit, each
//! producing one error entry with the operation's name as its `action`.
//! An unrecognized operation name is a no-op, mirroring sanitize leniency.
//! The `fn` operation is not dispatched here: the engine invokes the bound
//! validator itself so a passing validator can replace the working value.

use params_core::{ErrorEntry, FieldSpec, Op, OpArg, TypeTag, Value};
use regex::Regex;
use uuid::Uuid;
use validator::ValidateUrl;

const BOOL_WORDS: [&str; 8] = ["true", "false", "yes", "no", "on", "off", "1", "0"];

/// Checks a present, non-null value against its field's declared type tag.
///
/// Returns a failure message on mismatch; `Any` always passes.
pub fn type_check(tag: TypeTag, value: &Value) -> Option<String> {
    let ok = match tag {
        TypeTag::Any => true,
        TypeTag::String => matches!(value, Value::String(_)),
        TypeTag::Integer => matches!(value, Value::Int(_)),
        TypeTag::Float => matches!(value, Value::Float(_) | Value::Int(_)),
        TypeTag::Boolean => matches!(value, Value::Bool(_)),
        TypeTag::Symbol => matches!(value, Value::Symbol(_)),
        TypeTag::Map => matches!(value, Value::Map(_)),
        TypeTag::List => matches!(value, Value::List(_)),
        TypeTag::Uid => is_uid(value),
        TypeTag::Timestamp => is_timestamp(value),
        TypeTag::Url => is_url(value),
    };

    if ok {
        None
    } else {
        Some(format!("expected {tag}, found {}", value.type_name()))
    }
}

/// Applies a single validate operation, returning an entry on failure.
pub fn apply(op: &Op, spec: &FieldSpec, value: &Value) -> Option<ErrorEntry> {
    let field = spec.name.as_str();
    let failure = |message: String| Some(ErrorEntry::leaf(field, &op.name, message));

    match op.name.as_str() {
        "is_string" => type_failure(TypeTag::String, value).and_then(failure),
        "is_integer" => type_failure(TypeTag::Integer, value).and_then(failure),
        "is_float" => type_failure(TypeTag::Float, value).and_then(failure),
        "is_boolean" => type_failure(TypeTag::Boolean, value).and_then(failure),
        "is_symbol" => type_failure(TypeTag::Symbol, value).and_then(failure),
        "is_map" => type_failure(TypeTag::Map, value).and_then(failure),
        "is_uid" => type_failure(TypeTag::Uid, value).and_then(failure),
        "is_timestamp" => type_failure(TypeTag::Timestamp, value).and_then(failure),
        "is_url" => type_failure(TypeTag::Url, value).and_then(failure),

        "pattern" => {
            let raw = arg_text(&op.arg)?;
            let Some(text) = value.as_str() else {
                return failure(format!("expected string, found {}", value.type_name()));
            };
            match Regex::new(raw) {
                Ok(re) if re.is_match(text) => None,
                Ok(_) => failure(format!("'{text}' does not match pattern '{raw}'")),
                Err(_) => failure(format!("invalid pattern '{raw}'")),
            }
        }

        "not_empty" => {
            if is_blank(value) {
                failure("must not be empty".to_string())
            } else {
                None
            }
        }

        "min_len" => {
            let min = arg_int(&op.arg)?;
            match length_of(value) {
                Some(len) if (len as i64) < min => {
                    failure(format!("length {len} is below the minimum of {min}"))
                }
                Some(_) => None,
                None => failure(format!("length check on {}", value.type_name())),
            }
        }

        "max_len" => {
            let max = arg_int(&op.arg)?;
            match length_of(value) {
                Some(len) if (len as i64) > max => {
                    failure(format!("length {len} exceeds the maximum of {max}"))
                }
                Some(_) => None,
                None => failure(format!("length check on {}", value.type_name())),
            }
        }

        "min" => {
            let min = arg_int(&op.arg)?;
            match value.as_float() {
                Some(n) if n < min as f64 => failure(format!("{n} is below the minimum of {min}")),
                Some(_) => None,
                None => failure(format!("range check on {}", value.type_name())),
            }
        }

        "max" => {
            let max = arg_int(&op.arg)?;
            match value.as_float() {
                Some(n) if n > max as f64 => failure(format!("{n} exceeds the maximum of {max}")),
                Some(_) => None,
                None => failure(format!("range check on {}", value.type_name())),
            }
        }

        "one_of" => {
            let OpArg::Set(members) = &op.arg else {
                return None;
            };
            if members.iter().any(|m| m.matches(value)) {
                None
            } else {
                let joined: Vec<String> = members.iter().map(ToString::to_string).collect();
                failure(format!("not one of [{}]", joined.join(", ")))
            }
        }

        "bool_str" => {
            let recognized = value
                .as_str()
                .map(|s| BOOL_WORDS.contains(&s.to_lowercase().as_str()))
                .unwrap_or(false);
            if recognized {
                None
            } else {
                failure("not a recognizable boolean string".to_string())
            }
        }

        // `fn` is dispatched by the engine, which threads the validator's
        // replacement value back into the working tree.
        _ => None,
    }
}

fn type_failure(tag: TypeTag, value: &Value) -> Option<String> {
    type_check(tag, value)
}

fn is_uid(value: &Value) -> bool {
    value
        .as_str()
        .map(|s| Uuid::parse_str(s).is_ok())
        .unwrap_or(false)
}

fn is_timestamp(value: &Value) -> bool {
    match value {
        Value::Int(_) => true,
        Value::String(s) => {
            chrono::DateTime::parse_from_rfc3339(s).is_ok()
                || (!s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))
        }
        _ => false,
    }
}

fn is_url(value: &Value) -> bool {
    value.as_str().map(|s| s.validate_url()).unwrap_or(false)
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::String(s) => s.trim().is_empty(),
        _ => value.is_empty(),
    }
}

fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::List(l) => Some(l.len()),
        _ => None,
    }
}

fn arg_text(arg: &OpArg) -> Option<&str> {
    match arg {
        OpArg::Str(s) | OpArg::Tag(s) => Some(s),
        _ => None,
    }
}

fn arg_int(arg: &OpArg) -> Option<i64> {
    match arg {
        OpArg::Int(i) => Some(*i),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use params_core::SetMember;
    use pretty_assertions::assert_eq;

    fn spec() -> FieldSpec {
        FieldSpec::new("field", TypeTag::Any)
    }

    fn check(op: Op, value: Value) -> Option<ErrorEntry> {
        apply(&op, &spec(), &value)
    }

    #[test]
    fn test_type_checks() {
        assert!(check(Op::bare("is_string"), Value::Int(1)).is_some());
        assert!(check(Op::bare("is_string"), Value::String("x".into())).is_none());
        assert!(check(Op::bare("is_integer"), Value::Int(1)).is_none());
        assert!(check(Op::bare("is_boolean"), Value::Bool(true)).is_none());
        assert!(check(Op::bare("is_symbol"), Value::Symbol("tag".into())).is_none());
    }

    #[test]
    fn test_float_coerces_integer() {
        assert_eq!(type_check(TypeTag::Float, &Value::Int(3)), None);
    }

    #[test]
    fn test_uid_check() {
        let uid = Value::String("67e55044-10b1-426f-9247-bb680e5fe0c8".into());
        assert!(check(Op::bare("is_uid"), uid).is_none());
        assert!(check(Op::bare("is_uid"), Value::String("nope".into())).is_some());
    }

    #[test]
    fn test_timestamp_check() {
        assert!(check(
            Op::bare("is_timestamp"),
            Value::String("2024-01-15T10:30:00Z".into())
        )
        .is_none());
        assert!(check(Op::bare("is_timestamp"), Value::String("1705318200".into())).is_none());
        assert!(check(Op::bare("is_timestamp"), Value::String("soon".into())).is_some());
    }

    #[test]
    fn test_url_check() {
        assert!(check(
            Op::bare("is_url"),
            Value::String("https://example.com".into())
        )
        .is_none());
        assert!(check(Op::bare("is_url"), Value::String("not-a-url".into())).is_some());
    }

    #[test]
    fn test_pattern() {
        let op = Op::with_arg("pattern", OpArg::Str("^[a-z]+$".to_string()));
        assert!(apply(&op, &spec(), &Value::String("abc".into())).is_none());
        assert!(apply(&op, &spec(), &Value::String("ABC".into())).is_some());
    }

    #[test]
    fn test_invalid_pattern_is_a_failure() {
        let op = Op::with_arg("pattern", OpArg::Str("[unclosed".to_string()));
        let entry = apply(&op, &spec(), &Value::String("x".into())).unwrap();
        assert_eq!(entry.action(), Some("pattern"));
    }

    #[test]
    fn test_not_empty() {
        assert!(check(Op::bare("not_empty"), Value::String("   ".into())).is_some());
        assert!(check(Op::bare("not_empty"), Value::String("x".into())).is_none());
        assert!(check(Op::bare("not_empty"), Value::List(vec![])).is_some());
    }

    #[test]
    fn test_length_bounds() {
        let min = Op::with_arg("min_len", OpArg::Int(3));
        let max = Op::with_arg("max_len", OpArg::Int(5));
        assert!(apply(&min, &spec(), &Value::String("ab".into())).is_some());
        assert!(apply(&min, &spec(), &Value::String("abc".into())).is_none());
        assert!(apply(&max, &spec(), &Value::String("abcdef".into())).is_some());
        assert!(apply(&max, &spec(), &Value::List(vec![Value::Int(1)])).is_none());
    }

    #[test]
    fn test_numeric_range() {
        let min = Op::with_arg("min", OpArg::Int(0));
        let max = Op::with_arg("max", OpArg::Int(120));
        assert!(apply(&min, &spec(), &Value::Int(-1)).is_some());
        assert!(apply(&max, &spec(), &Value::Int(121)).is_some());
        assert!(apply(&max, &spec(), &Value::Int(25)).is_none());
        assert!(apply(&max, &spec(), &Value::Float(25.5)).is_none());
    }

    #[test]
    fn test_one_of_membership() {
        let op = Op::with_arg(
            "one_of",
            OpArg::Set(vec![
                SetMember::Tag("admin".to_string()),
                SetMember::Tag("user".to_string()),
            ]),
        );
        assert!(apply(&op, &spec(), &Value::String("admin".into())).is_none());
        let entry = apply(&op, &spec(), &Value::String("guest".into())).unwrap();
        assert_eq!(entry.action(), Some("one_of"));
    }

    #[test]
    fn test_bool_str() {
        assert!(check(Op::bare("bool_str"), Value::String("Yes".into())).is_none());
        assert!(check(Op::bare("bool_str"), Value::String("0".into())).is_none());
        assert!(check(Op::bare("bool_str"), Value::String("maybe".into())).is_some());
    }

    #[test]
    fn test_unknown_op_is_noop() {
        assert!(check(Op::bare("no_such_check"), Value::Int(1)).is_none());
    }
}
