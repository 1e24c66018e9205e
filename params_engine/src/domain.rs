//! Domain constraint evaluation.
//!
//! Domain clauses are cross-field conditions scoped to the whole input
//! tree, evaluated strictly after every field pipeline has run so that
//! referenced paths see sanitized values. A field's clauses apply only
//! while the field itself is present; `!` clauses additionally fail when
//! their referenced path is missing, `?` clauses are skipped.

use params_core::{
    Combinator, DomainClause, ErrorEntry, FieldDecl, FieldSpec, SchemaNode, Value, ValueMap,
};

/// Evaluates every domain clause declared on a node against the resolved
/// working tree, collecting one entry per violated clause.
pub fn evaluate(node: &SchemaNode, tree: &ValueMap) -> Vec<ErrorEntry> {
    let mut errors = Vec::new();

    for decl in &node.fields {
        let FieldDecl::Single(spec) = decl else {
            continue;
        };
        if spec.constraints.is_empty() {
            continue;
        }
        // Constraints only bind while their owning field participates.
        let present = tree.get(&spec.name).map(|v| !v.is_null()).unwrap_or(false);
        if !present {
            continue;
        }

        for clause in &spec.constraints {
            if let Some(entry) = check_clause(spec, clause, tree) {
                errors.push(entry);
            }
        }
    }

    errors
}

fn check_clause(spec: &FieldSpec, clause: &DomainClause, tree: &ValueMap) -> Option<ErrorEntry> {
    let mismatch = format!("does not satisfy {}", clause.combinator);

    match clause.path.resolve(tree) {
        Some(value) => {
            if satisfies(&clause.combinator, value, spec, tree) {
                None
            } else {
                Some(ErrorEntry::domain(
                    &spec.name,
                    clause.path.to_string(),
                    mismatch,
                ))
            }
        }
        None if clause.required => Some(ErrorEntry::domain(
            &spec.name,
            clause.path.to_string(),
            format!("{mismatch} and required key is missing"),
        )),
        None => None,
    }
}

fn satisfies(combinator: &Combinator, value: &Value, spec: &FieldSpec, tree: &ValueMap) -> bool {
    match combinator {
        Combinator::OneOf(members) => members.iter().any(|m| m.matches(value)),
        Combinator::Equals(other) => other.resolve(tree).map(|v| v == value).unwrap_or(false),
        Combinator::Either(subs) => subs.iter().any(|sub| satisfies(sub, value, spec, tree)),
        Combinator::Predicate => spec
            .predicate
            .as_ref()
            .map(|p| p.call(value))
            .unwrap_or(false),
    }
}
