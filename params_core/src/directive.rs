//! Parsed forms of the per-field directive mini-languages.
//!
//! This module holds the *model* side only: the ordered operation lists a
//! derive pipeline parses into, and the clause/combinator tree a domain
//! constraint string parses into. The grammars themselves live in
//! `params_parser`; the evaluators live in `params_engine`.

use crate::path::Path;
use crate::value::Value;
use serde::Serialize;
use std::fmt;

/// One operation inside a `sanitize(...)` or `validate(...)` stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Op {
    /// Operation name (e.g. `trim`, `max_len`)
    pub name: String,
    /// Optional argument (`max_len=20` carries `Int(20)`)
    pub arg: OpArg,
}

impl Op {
    /// Creates a bare operation with no argument.
    pub fn bare(name: impl Into<String>) -> Self {
        Op {
            name: name.into(),
            arg: OpArg::None,
        }
    }

    /// Creates an operation carrying an argument.
    pub fn with_arg(name: impl Into<String>, arg: OpArg) -> Self {
        Op {
            name: name.into(),
            arg,
        }
    }
}

/// Argument attached to an operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum OpArg {
    /// No argument (bare operation name)
    None,
    /// Integer literal
    Int(i64),
    /// Bare symbolic tag
    Tag(String),
    /// Quoted string literal
    Str(String),
    /// Ordered list of arguments, possibly nested operations
    List(Vec<OpArg>),
    /// Enumeration set (`{admin, user}` or quoted members)
    Set(Vec<SetMember>),
    /// Function-reference pair (`Module.function`)
    FuncRef(String, String),
    /// Nested `name=value` operation, valid inside lists
    Assoc(String, Box<OpArg>),
}

/// A member of an enumeration set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SetMember {
    /// Quoted string member
    Str(String),
    /// Bare symbolic tag member
    Tag(String),
    /// Structural entry member (`role:admin` matches a map containing it)
    Entry(String, String),
}

impl SetMember {
    /// Returns true when a value belongs to this member.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            SetMember::Str(s) => value.as_str() == Some(s.as_str()),
            SetMember::Tag(t) => {
                // Bare tags accept either spelling of the same word.
                value.as_symbol() == Some(t.as_str()) || value.as_str() == Some(t.as_str())
            }
            SetMember::Entry(key, expected) => value
                .as_map()
                .and_then(|m| m.get(key))
                .map(|v| {
                    v.as_str() == Some(expected.as_str())
                        || v.as_symbol() == Some(expected.as_str())
                })
                .unwrap_or(false),
        }
    }
}

impl fmt::Display for SetMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetMember::Str(s) => write!(f, "'{s}'"),
            SetMember::Tag(t) => write!(f, "{t}"),
            SetMember::Entry(k, v) => write!(f, "{k}:{v}"),
        }
    }
}

/// The parsed derive pipeline of one field: ordered sanitize operations
/// followed by ordered validate operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Pipeline {
    /// Ordered value transforms
    pub sanitize: Vec<Op>,
    /// Ordered value checks
    pub validate: Vec<Op>,
}

impl Pipeline {
    /// Returns true if neither stage carries any operation.
    pub fn is_empty(&self) -> bool {
        self.sanitize.is_empty() && self.validate.is_empty()
    }
}

/// One parsed clause of a domain constraint string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainClause {
    /// `!` clauses require the referenced path when the owning field is
    /// present; `?` clauses are skipped when the path is absent.
    pub required: bool,
    /// The referenced dotted path, resolved within the owning tree
    pub path: Path,
    /// The condition the resolved value must satisfy
    pub combinator: Combinator,
}

/// Condition applied to a resolved domain path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Combinator {
    /// Membership in a declared set
    OneOf(Vec<SetMember>),
    /// Equality with another resolved path's value
    Equals(Path),
    /// First matching sub-combinator wins
    Either(Vec<Combinator>),
    /// The owning field's bound domain predicate
    Predicate,
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combinator::OneOf(members) => {
                let joined: Vec<String> = members.iter().map(ToString::to_string).collect();
                write!(f, "In[{}]", joined.join(", "))
            }
            Combinator::Equals(path) => write!(f, "Eq({path})"),
            Combinator::Either(subs) => {
                let joined: Vec<String> = subs.iter().map(ToString::to_string).collect();
                write!(f, "Any[{}]", joined.join(", "))
            }
            Combinator::Predicate => write!(f, "Fn"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueMap;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_member_matching() {
        assert!(SetMember::Str("admin".into()).matches(&Value::String("admin".into())));
        assert!(!SetMember::Str("admin".into()).matches(&Value::Symbol("admin".into())));
        assert!(SetMember::Tag("admin".into()).matches(&Value::Symbol("admin".into())));
        assert!(SetMember::Tag("admin".into()).matches(&Value::String("admin".into())));

        let mut m = ValueMap::new();
        m.insert("role".to_string(), Value::String("admin".into()));
        assert!(SetMember::Entry("role".into(), "admin".into()).matches(&Value::Map(m.clone())));
        assert!(!SetMember::Entry("role".into(), "user".into()).matches(&Value::Map(m)));
    }

    #[test]
    fn test_combinator_display() {
        let c = Combinator::OneOf(vec![
            SetMember::Tag("admin".into()),
            SetMember::Str("user".into()),
        ]);
        assert_eq!(c.to_string(), "In[admin, 'user']");

        let c = Combinator::Either(vec![c, Combinator::Equals(Path::parse("auth.role"))]);
        assert_eq!(c.to_string(), "Any[In[admin, 'user'], Eq(auth.role)]");
    }

    #[test]
    fn test_pipeline_empty() {
        assert!(Pipeline::default().is_empty());
        let p = Pipeline {
            sanitize: vec![Op::bare("trim")],
            validate: vec![],
        };
        assert!(!p.is_empty());
    }
}
