//! Schema introspection.
//!
//! Declared and required field names, optionally expanded recursively for
//! composite fields, as a nested structure mirroring composite nesting.

use crate::schema::{Candidate, FieldDecl, Nested, SchemaNode};
use serde::Serialize;

/// One introspected key: a plain name or a composite with child keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum KeyEntry {
    /// A scalar field name
    Leaf(String),
    /// A composite field with its sub-schema's keys
    Node {
        field: String,
        keys: Vec<KeyEntry>,
    },
}

/// Returns the declared field names in declaration order.
///
/// With `deep`, composite fields expand into [`KeyEntry::Node`] entries
/// mirroring the schema nesting; alternatives groups expand through their
/// first composite candidate.
pub fn keys(schema: &SchemaNode, deep: bool) -> Vec<KeyEntry> {
    schema
        .fields
        .iter()
        .map(|decl| entry_for(decl, deep))
        .collect()
}

/// Returns the required field names, per the node's fixed required set.
///
/// With `deep`, composite fields expand into their sub-schema's required
/// keys; a composite field itself appears only when it is required or when
/// its expansion is non-empty.
pub fn required_keys(schema: &SchemaNode, deep: bool) -> Vec<KeyEntry> {
    schema
        .fields
        .iter()
        .filter_map(|decl| {
            let name = decl.name();
            let is_required = schema.required().iter().any(|r| r == name);

            if !deep {
                return is_required.then(|| KeyEntry::Leaf(name.to_string()));
            }

            match nested_of(decl) {
                Some(child) => {
                    let child_keys = required_keys(child, true);
                    (is_required || !child_keys.is_empty()).then(|| KeyEntry::Node {
                        field: name.to_string(),
                        keys: child_keys,
                    })
                }
                None => is_required.then(|| KeyEntry::Leaf(name.to_string())),
            }
        })
        .collect()
}

fn entry_for(decl: &FieldDecl, deep: bool) -> KeyEntry {
    if deep {
        if let Some(child) = nested_of(decl) {
            return KeyEntry::Node {
                field: decl.name().to_string(),
                keys: keys(child, true),
            };
        }
    }
    KeyEntry::Leaf(decl.name().to_string())
}

fn nested_of(decl: &FieldDecl) -> Option<&SchemaNode> {
    match decl {
        FieldDecl::Single(spec) => match &spec.nested {
            Some(Nested::One(node)) | Some(Nested::Many(node)) => Some(node),
            None => None,
        },
        FieldDecl::Alternatives(group) => group.candidates.iter().find_map(|c| match c {
            Candidate::Shape(node) => Some(node.as_ref()),
            Candidate::Leaf(_) => None,
        }),
    }
}
