//! Domain constraint parser.
//!
//! Parses `::`-joined clause strings such as
//! `!auth.action=In[admin, user]::?meta.kind=Eq(other.kind)` into
//! [`DomainClause`] values. Each clause conditions the owning field's
//! acceptability on a sibling/nested path:
//!
//! ```text
//! constraint := clause ('::' clause)*
//! clause     := ('!' | '?') dotted-path '=' combinator
//! combinator := 'In' '[' member, ... ']' | 'Eq' '(' dotted-path ')'
//!             | 'Any' '[' combinator, ... ']' | 'Fn'
//! ```

use crate::pipeline::parse_member;
use crate::scan::{ParseError, ParseResult, Scanner};
use params_core::{Combinator, DomainClause, Path};

/// Parses a domain constraint string, leniently.
///
/// Malformed clauses are skipped individually; well-formed siblings survive.
pub fn parse_domain(input: &str) -> Vec<DomainClause> {
    input
        .split("::")
        .map(str::trim)
        .filter(|clause| !clause.is_empty())
        .filter_map(|clause| match try_parse_clause(clause) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                tracing::warn!(clause, %err, "skipping malformed domain clause");
                None
            }
        })
        .collect()
}

/// Parses a single clause, surfacing grammar violations.
pub fn try_parse_clause(input: &str) -> ParseResult<DomainClause> {
    let mut scanner = Scanner::new(input);
    scanner.skip_ws();

    let required = match scanner.bump() {
        Some('!') => true,
        Some('?') => false,
        Some(c) => return Err(ParseError::Unexpected { found: c, at: 0 }),
        None => {
            return Err(ParseError::Eof {
                expected: "'!' or '?'",
            })
        }
    };

    let path = parse_path(&mut scanner)?;
    scanner.expect('=')?;
    let combinator = parse_combinator(&mut scanner)?;

    scanner.skip_ws();
    if let Some(c) = scanner.peek() {
        return Err(ParseError::Unexpected {
            found: c,
            at: input.len(),
        });
    }

    Ok(DomainClause {
        required,
        path,
        combinator,
    })
}

fn parse_path(scanner: &mut Scanner) -> ParseResult<Path> {
    let mut raw = scanner.ident()?;
    while scanner.peek() == Some('.') {
        scanner.bump();
        raw.push('.');
        raw.push_str(&scanner.ident()?);
    }
    Ok(Path::parse(&raw))
}

fn parse_combinator(scanner: &mut Scanner) -> ParseResult<Combinator> {
    scanner.skip_ws();
    let head = scanner.ident()?;

    match head.as_str() {
        "In" => {
            scanner.expect('[')?;
            let mut members = Vec::new();
            loop {
                scanner.skip_ws();
                if scanner.peek() == Some(']') {
                    scanner.bump();
                    return Ok(Combinator::OneOf(members));
                }
                members.push(parse_member(scanner)?);
                scanner.skip_ws();
                if scanner.peek() == Some(',') {
                    scanner.bump();
                }
            }
        }
        "Eq" => {
            scanner.expect('(')?;
            scanner.skip_ws();
            let path = parse_path(scanner)?;
            scanner.skip_ws();
            scanner.expect(')')?;
            Ok(Combinator::Equals(path))
        }
        "Any" => {
            scanner.expect('[')?;
            let mut subs = Vec::new();
            loop {
                scanner.skip_ws();
                if scanner.peek() == Some(']') {
                    scanner.bump();
                    return Ok(Combinator::Either(subs));
                }
                subs.push(parse_combinator(scanner)?);
                scanner.skip_ws();
                if scanner.peek() == Some(',') {
                    scanner.bump();
                }
            }
        }
        "Fn" => Ok(Combinator::Predicate),
        _ => Err(ParseError::BadLiteral {
            kind: "combinator",
            text: head,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use params_core::SetMember;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_required_membership_clause() {
        let clauses = parse_domain("!auth.action=In[admin, user]");
        assert_eq!(clauses.len(), 1);

        let clause = &clauses[0];
        assert!(clause.required);
        assert_eq!(clause.path, Path::parse("auth.action"));
        assert_eq!(
            clause.combinator,
            Combinator::OneOf(vec![
                SetMember::Tag("admin".to_string()),
                SetMember::Tag("user".to_string()),
            ])
        );
    }

    #[test]
    fn test_optional_clause() {
        let clauses = parse_domain("?meta.kind=In['a', 'b']");
        assert_eq!(clauses.len(), 1);
        assert!(!clauses[0].required);
        assert_eq!(
            clauses[0].combinator,
            Combinator::OneOf(vec![
                SetMember::Str("a".to_string()),
                SetMember::Str("b".to_string()),
            ])
        );
    }

    #[test]
    fn test_equality_clause() {
        let clauses = parse_domain("!confirm=Eq(password)");
        assert_eq!(
            clauses[0].combinator,
            Combinator::Equals(Path::parse("password"))
        );
    }

    #[test]
    fn test_either_of_clause() {
        let clauses = parse_domain("!kind=Any[In[a, b], Eq(other.kind)]");
        assert_eq!(
            clauses[0].combinator,
            Combinator::Either(vec![
                Combinator::OneOf(vec![
                    SetMember::Tag("a".to_string()),
                    SetMember::Tag("b".to_string()),
                ]),
                Combinator::Equals(Path::parse("other.kind")),
            ])
        );
    }

    #[test]
    fn test_predicate_clause() {
        let clauses = parse_domain("!payload=Fn");
        assert_eq!(clauses[0].combinator, Combinator::Predicate);
    }

    #[test]
    fn test_joined_clauses() {
        let clauses = parse_domain("!auth.action=In[admin]::?auth.scope=Eq(scope)");
        assert_eq!(clauses.len(), 2);
        assert!(clauses[0].required);
        assert!(!clauses[1].required);
    }

    #[test]
    fn test_structural_members() {
        let clauses = parse_domain("!meta=In[role:admin, role:owner]");
        assert_eq!(
            clauses[0].combinator,
            Combinator::OneOf(vec![
                SetMember::Entry("role".to_string(), "admin".to_string()),
                SetMember::Entry("role".to_string(), "owner".to_string()),
            ])
        );
    }

    #[test]
    fn test_malformed_clause_skipped() {
        // Second clause lacks its marker; the first survives.
        let clauses = parse_domain("!a=In[x]::b=In[y]");
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].path, Path::parse("a"));

        assert!(parse_domain("!a=NotACombinator[x]").is_empty());
        assert!(parse_domain("").is_empty());
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        assert!(try_parse_clause("!a=In[x] extra").is_err());
    }
}
