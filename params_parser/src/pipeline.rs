//! Derive pipeline parser.
//!
//! Parses per-field pipeline strings such as
//! `sanitize(trim, upcase) validate(not_empty, max_len=20)` into ordered
//! [`Op`] lists per stage. The grammar is fixed and narrow:
//!
//! ```text
//! pipeline := stage*
//! stage    := ident '(' op (',' op)* ')'
//! op       := ident ('=' arg)?
//! arg      := int | tag | 'quoted' | '[' arg, ... ']' | '{' member, ... '}'
//!           | ident '.' ident | ident '=' arg
//! ```
//!
//! Malformed input is non-fatal: [`parse_pipeline`] yields an empty pipeline
//! for the field, meaning the derive pipeline is simply skipped.

use crate::scan::{ParseResult, Scanner};
use params_core::{Op, OpArg, Pipeline, SetMember};

/// Parses a derive pipeline string, leniently.
///
/// Any grammar violation yields `Pipeline::default()`, meaning the field
/// simply has no pipeline. Stage names other than `sanitize`/`validate` are
/// ignored.
pub fn parse_pipeline(input: &str) -> Pipeline {
    match try_parse_pipeline(input) {
        Ok(pipeline) => pipeline,
        Err(err) => {
            tracing::warn!(directive = input, %err, "discarding malformed derive pipeline");
            Pipeline::default()
        }
    }
}

/// Parses a derive pipeline string, surfacing grammar violations.
pub fn try_parse_pipeline(input: &str) -> ParseResult<Pipeline> {
    let mut scanner = Scanner::new(input);
    let mut pipeline = Pipeline::default();

    loop {
        scanner.skip_ws();
        if scanner.at_end() {
            return Ok(pipeline);
        }

        let stage = scanner.ident()?;
        scanner.skip_ws();
        scanner.expect('(')?;
        let ops = parse_ops(&mut scanner)?;

        match stage.as_str() {
            "sanitize" => pipeline.sanitize.extend(ops),
            "validate" => pipeline.validate.extend(ops),
            _ => {}
        }
    }
}

/// Parses comma-separated operations up to the closing parenthesis.
fn parse_ops(scanner: &mut Scanner) -> ParseResult<Vec<Op>> {
    let mut ops = Vec::new();

    loop {
        scanner.skip_ws();
        if scanner.peek() == Some(')') {
            scanner.bump();
            return Ok(ops);
        }

        let name = scanner.ident()?;
        scanner.skip_ws();

        let arg = if scanner.peek() == Some('=') {
            scanner.bump();
            parse_arg(scanner)?
        } else {
            OpArg::None
        };
        ops.push(Op::with_arg(name, arg));

        scanner.skip_ws();
        match scanner.peek() {
            Some(',') => {
                scanner.bump();
            }
            Some(')') => {}
            _ => {
                // Force the error path with a precise position.
                scanner.expect(')')?;
                return Ok(ops);
            }
        }
    }
}

fn parse_arg(scanner: &mut Scanner) -> ParseResult<OpArg> {
    scanner.skip_ws();
    match scanner.peek() {
        Some('[') => parse_list(scanner),
        Some('{') => parse_set(scanner),
        Some('\'') | Some('"') => Ok(OpArg::Str(scanner.quoted()?)),
        Some(c) if c.is_ascii_digit() || c == '-' => Ok(OpArg::Int(scanner.integer()?)),
        _ => {
            let word = scanner.ident()?;
            match scanner.peek() {
                // Function-reference pair: `Module.function`
                Some('.') => {
                    scanner.bump();
                    Ok(OpArg::FuncRef(word, scanner.ident()?))
                }
                // Nested operation: `name=value`, recursively re-parsed
                Some('=') => {
                    scanner.bump();
                    Ok(OpArg::Assoc(word, Box::new(parse_arg(scanner)?)))
                }
                _ => Ok(OpArg::Tag(word)),
            }
        }
    }
}

fn parse_list(scanner: &mut Scanner) -> ParseResult<OpArg> {
    scanner.expect('[')?;
    let mut items = Vec::new();

    loop {
        scanner.skip_ws();
        if scanner.peek() == Some(']') {
            scanner.bump();
            return Ok(OpArg::List(items));
        }

        items.push(parse_arg(scanner)?);

        scanner.skip_ws();
        match scanner.peek() {
            Some(',') => {
                scanner.bump();
            }
            Some(']') => {}
            _ => {
                scanner.expect(']')?;
                return Ok(OpArg::List(items));
            }
        }
    }
}

fn parse_set(scanner: &mut Scanner) -> ParseResult<OpArg> {
    scanner.expect('{')?;
    let mut members = Vec::new();

    loop {
        scanner.skip_ws();
        if scanner.peek() == Some('}') {
            scanner.bump();
            return Ok(OpArg::Set(members));
        }

        members.push(parse_member(scanner)?);

        scanner.skip_ws();
        match scanner.peek() {
            Some(',') => {
                scanner.bump();
            }
            Some('}') => {}
            _ => {
                scanner.expect('}')?;
                return Ok(OpArg::Set(members));
            }
        }
    }
}

/// Parses a set member: quoted string, bare tag, or `key:value` entry.
pub(crate) fn parse_member(scanner: &mut Scanner) -> ParseResult<SetMember> {
    scanner.skip_ws();
    if matches!(scanner.peek(), Some('\'') | Some('"')) {
        return Ok(SetMember::Str(scanner.quoted()?));
    }

    let word = scanner.ident()?;
    if scanner.peek() == Some(':') {
        scanner.bump();
        scanner.skip_ws();
        let value = if matches!(scanner.peek(), Some('\'') | Some('"')) {
            scanner.quoted()?
        } else {
            scanner.ident()?
        };
        Ok(SetMember::Entry(word, value))
    } else {
        Ok(SetMember::Tag(word))
    }
}
