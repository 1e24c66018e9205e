//! The recursive build engine.
//!
//! A build walks one schema node over one input tree: keys are normalized,
//! undeclared keys are rejected on authorized-only nodes, enforced fields
//! are checked for presence, then each declared field is resolved,
//! sanitized, checked, and recursed into. Failures aggregate into a single
//! report per node; a raise-on-error node converts its report into a fault
//! that aborts every enclosing aggregation immediately.

use std::sync::Arc;

use params_core::{
    BuildError, Candidate, ErrorEntry, ErrorReport, FieldDecl, FieldSpec, Nested, NodeVerdict,
    Result, SchemaNode, Selection, Value, ValueMap, Verdict,
};
use tracing::debug;

use crate::domain;
use crate::resolve::{self, Resolution};
use crate::sanitize;
use crate::validate;

/// Whether enforced-field presence is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    /// Full construction: enforced fields must be present or resolvable.
    Create,
    /// Partial update: absent fields are left alone, present ones are
    /// checked exactly as in a create.
    Edit,
}

/// A reusable build entry point bound to one schema.
#[derive(Debug, Clone)]
pub struct Builder {
    schema: Arc<SchemaNode>,
}

impl Builder {
    pub fn new(schema: SchemaNode) -> Self {
        Builder {
            schema: Arc::new(schema),
        }
    }

    pub fn from_arc(schema: Arc<SchemaNode>) -> Self {
        Builder { schema }
    }

    /// Builds a full tree; enforced fields must be present or resolvable.
    pub fn build(&self, input: ValueMap) -> Result<ValueMap> {
        build(&self.schema, input, BuildMode::Create)
    }

    /// Checks a partial update; absent fields are not required.
    pub fn edit(&self, input: ValueMap) -> Result<ValueMap> {
        build(&self.schema, input, BuildMode::Edit)
    }
}

/// Builds one input tree against a schema node.
pub fn build(schema: &SchemaNode, input: ValueMap, mode: BuildMode) -> Result<ValueMap> {
    match build_node(schema, input, mode) {
        Err(BuildError::Fault { node, report }) if !schema.raise_on_error => {
            // A fault from a nested node surfaces at the top as a plain
            // invalid result once there is nothing left to abort.
            Err(BuildError::Invalid { node, report })
        }
        other => other,
    }
}

fn build_node(node: &SchemaNode, input: ValueMap, mode: BuildMode) -> Result<ValueMap> {
    debug!(node = %node.name, keys = input.len(), "building node");

    let mut tree = normalize_keys(input);

    if node.authorized_only {
        let mut intruders: Vec<String> = tree
            .keys()
            .filter(|k| !node.declares(k))
            .cloned()
            .collect();
        if !intruders.is_empty() {
            intruders.sort();
            return Err(fail(node, ErrorReport::AuthorizedFields(intruders)));
        }
    }

    if mode == BuildMode::Create {
        let missing: Vec<String> = node
            .required()
            .iter()
            .filter(|name| !is_present(&tree, name))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(fail(node, ErrorReport::RequiredFields(missing)));
        }
    }

    let mut bad: Vec<ErrorEntry> = Vec::new();
    let mut dependent: Vec<ErrorEntry> = Vec::new();

    for decl in &node.fields {
        match decl {
            FieldDecl::Single(spec) => match resolve::resolve_field(spec, &mut tree) {
                Resolution::Skip => {}
                Resolution::Dependent(entry) => dependent.push(entry),
                Resolution::Proceed => {
                    let Some(value) = tree.get(&spec.name).cloned() else {
                        continue;
                    };
                    let (value, mut entries) = run_field(node, spec, value, mode)?;
                    tree.insert(spec.name.clone(), value);
                    bad.append(&mut entries);
                }
            },
            FieldDecl::Alternatives(group) => {
                let Some(value) = tree.get(&group.name).cloned() else {
                    continue;
                };
                if value.is_null() {
                    continue;
                }
                match select_candidate(node, group, value, mode)? {
                    Ok(chosen) => {
                        tree.insert(group.name.clone(), chosen);
                    }
                    Err(mut entries) => bad.append(&mut entries),
                }
            }
        }
    }

    // Domain clauses run strictly after every pipeline so referenced paths
    // see sanitized, defaulted values.
    let domain_errors = domain::evaluate(node, &tree);

    if let Some(report) = assemble_report(bad, domain_errors, dependent) {
        return Err(fail(node, report));
    }

    if let Some(main) = &node.main_validator {
        match main.call(tree) {
            NodeVerdict::Pass(validated) => tree = validated,
            NodeVerdict::Fail(entries) => {
                return Err(fail(node, ErrorReport::BadParameters(entries)));
            }
        }
    }

    Ok(tree)
}

/// Runs one resolved field through its pipeline, type check, custom
/// validator, and composite recursion. Faults propagate; everything else
/// is collected.
fn run_field(
    node: &SchemaNode,
    spec: &FieldSpec,
    value: Value,
    mode: BuildMode,
) -> Result<(Value, Vec<ErrorEntry>)> {
    let mut entries = Vec::new();

    let mut value = spec
        .pipeline
        .sanitize
        .iter()
        .fold(value, |v, op| sanitize::apply(op, v));

    // Composite fields are typed by their sub-schema, not a scalar tag.
    if spec.nested.is_none() {
        if let Some(message) = validate::type_check(spec.type_tag, &value) {
            entries.push(ErrorEntry::leaf(&spec.name, "type", message));
        }
    }

    // The bound validator runs once, in pipeline position when the field
    // declares an explicit `fn` operation, otherwise after the pipeline.
    // Either way a passing validator may replace the working value.
    let mut ran_custom = false;
    for op in &spec.pipeline.validate {
        if op.name == "fn" {
            if let Some(validator) = spec.validator.as_ref() {
                ran_custom = true;
                match validator.call(&spec.name, &value) {
                    Verdict::Pass(transformed) => value = transformed,
                    Verdict::Fail(message) => {
                        entries.push(ErrorEntry::leaf(&spec.name, "fn", message));
                    }
                }
                continue;
            }
        }
        if let Some(entry) = validate::apply(op, spec, &value) {
            entries.push(entry);
        }
    }

    if !ran_custom {
        let validator = spec.validator.as_ref().or(node.dispatcher.as_ref());
        if let Some(validator) = validator {
            match validator.call(&spec.name, &value) {
                Verdict::Pass(transformed) => value = transformed,
                Verdict::Fail(message) => {
                    entries.push(ErrorEntry::leaf(&spec.name, "fn", message));
                }
            }
        }
    }

    match &spec.nested {
        None => {}
        Some(Nested::One(sub)) => match value {
            // A failing composite keeps its original slot so domain paths
            // evaluated afterwards still resolve through it.
            Value::Map(map) => match build_node(sub, map.clone(), mode) {
                Ok(built) => value = Value::Map(built),
                Err(fault @ BuildError::Fault { .. }) => return Err(fault),
                Err(invalid) => {
                    entries.push(ErrorEntry::nested(&spec.name, invalid.report().clone()));
                    value = Value::Map(map);
                }
            },
            other => {
                entries.push(ErrorEntry::leaf(
                    &spec.name,
                    "type",
                    format!("expected map, found {}", other.type_name()),
                ));
                value = other;
            }
        },
        Some(Nested::Many(sub)) => match value {
            Value::List(elements) => {
                let mut built = Vec::with_capacity(elements.len());
                for (idx, element) in elements.into_iter().enumerate() {
                    let slot = format!("{}[{idx}]", spec.name);
                    match element {
                        Value::Map(map) => match build_node(sub, map.clone(), mode) {
                            Ok(out) => built.push(Value::Map(out)),
                            Err(fault @ BuildError::Fault { .. }) => return Err(fault),
                            Err(invalid) => {
                                entries
                                    .push(ErrorEntry::nested(slot, invalid.report().clone()));
                                built.push(Value::Map(map));
                            }
                        },
                        other => {
                            entries.push(ErrorEntry::leaf(
                                slot,
                                "type",
                                format!("expected map, found {}", other.type_name()),
                            ));
                            built.push(other);
                        }
                    }
                }
                value = Value::List(built);
            }
            other => {
                entries.push(ErrorEntry::leaf(
                    &spec.name,
                    "type",
                    format!("expected list, found {}", other.type_name()),
                ));
                value = other;
            }
        },
    }

    Ok((value, entries))
}

/// Tries an alternatives group: a bound discriminator runs first and may
/// normalize the value or reject it outright; candidates then run in
/// declared order against the (possibly normalized) value and the first
/// success wins. When every candidate fails, the last candidate's failure
/// is surfaced.
fn select_candidate(
    node: &SchemaNode,
    group: &params_core::AlternativesGroup,
    value: Value,
    mode: BuildMode,
) -> Result<std::result::Result<Value, Vec<ErrorEntry>>> {
    let value = match &group.discriminator {
        Some(discriminator) => match discriminator.call(&value) {
            Selection::Accept(normalized) => normalized,
            Selection::Reject(report) => {
                return Ok(Err(vec![ErrorEntry::nested(&group.name, report)]));
            }
        },
        None => value,
    };

    let mut last_failure: Vec<ErrorEntry> = vec![ErrorEntry::leaf(
        &group.name,
        "alternatives",
        "no candidate shapes declared",
    )];

    for candidate in &group.candidates {
        match candidate {
            Candidate::Leaf(spec) => {
                let (checked, entries) = run_field(node, spec, value.clone(), mode)?;
                if entries.is_empty() {
                    return Ok(Ok(checked));
                }
                last_failure = entries;
            }
            Candidate::Shape(sub) => match value.clone() {
                Value::Map(map) => match build_node(sub, map, mode) {
                    Ok(built) => return Ok(Ok(Value::Map(built))),
                    Err(fault @ BuildError::Fault { .. }) => return Err(fault),
                    Err(invalid) => {
                        last_failure =
                            vec![ErrorEntry::nested(&group.name, invalid.report().clone())];
                    }
                },
                other => {
                    last_failure = vec![ErrorEntry::leaf(
                        &group.name,
                        "type",
                        format!("expected map, found {}", other.type_name()),
                    )];
                }
            },
        }
    }

    Ok(Err(last_failure))
}

/// Collapses the three buckets into at most one report. A higher-precedence
/// bucket absorbs the lower ones so a build returns a single payload.
fn assemble_report(
    mut bad: Vec<ErrorEntry>,
    mut domain_errors: Vec<ErrorEntry>,
    mut dependent: Vec<ErrorEntry>,
) -> Option<ErrorReport> {
    if !bad.is_empty() {
        bad.append(&mut domain_errors);
        bad.append(&mut dependent);
        return Some(ErrorReport::BadParameters(bad));
    }
    if !domain_errors.is_empty() {
        domain_errors.append(&mut dependent);
        return Some(ErrorReport::DomainParameters(domain_errors));
    }
    if !dependent.is_empty() {
        return Some(ErrorReport::DependentKeys(dependent));
    }
    None
}

fn fail(node: &SchemaNode, report: ErrorReport) -> BuildError {
    if node.raise_on_error {
        BuildError::Fault {
            node: node.name.clone(),
            report,
        }
    } else {
        BuildError::Invalid {
            node: node.name.clone(),
            report,
        }
    }
}

/// Strips the leading `:` some callers prefix onto keys.
fn normalize_keys(input: ValueMap) -> ValueMap {
    input
        .into_iter()
        .map(|(key, value)| match key.strip_prefix(':') {
            Some(stripped) => (stripped.to_string(), value),
            None => (key, value),
        })
        .collect()
}

fn is_present(tree: &ValueMap, name: &str) -> bool {
    tree.get(name).map(|v| !v.is_null()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_leading_colon() {
        let mut input = ValueMap::new();
        input.insert(":name".to_string(), Value::Int(1));
        input.insert("age".to_string(), Value::Int(2));

        let normalized = normalize_keys(input);
        assert!(normalized.contains_key("name"));
        assert!(normalized.contains_key("age"));
        assert!(!normalized.contains_key(":name"));
    }

    #[test]
    fn test_report_precedence() {
        let leaf = ErrorEntry::leaf("f", "a", "m");
        let dom = ErrorEntry::domain("f", "p", "m");
        let dep = ErrorEntry::leaf("g", "on", "m");

        let report = assemble_report(vec![leaf.clone()], vec![dom.clone()], vec![dep.clone()]);
        assert!(matches!(report, Some(ErrorReport::BadParameters(e)) if e.len() == 3));

        let report = assemble_report(vec![], vec![dom], vec![dep.clone()]);
        assert!(matches!(report, Some(ErrorReport::DomainParameters(e)) if e.len() == 2));

        let report = assemble_report(vec![], vec![], vec![dep]);
        assert!(matches!(report, Some(ErrorReport::DependentKeys(e)) if e.len() == 1));

        assert!(assemble_report(vec![], vec![], vec![]).is_none());
    }
}
