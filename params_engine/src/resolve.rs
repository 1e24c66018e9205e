//! Field presence resolution.
//!
//! Before a field's pipeline runs, its directives decide whether the field
//! participates at all and where its value comes from. Order is fixed:
//! `on` gates participation, `auto` generates, `from` copies, `default`
//! fills. Each later step only fires when the earlier ones left the slot
//! unresolved.

use params_core::{ErrorEntry, FieldSpec, ValueMap};

/// Outcome of resolving one field slot against the working tree.
#[derive(Debug)]
pub enum Resolution {
    /// The field holds a value (possibly freshly written) and proceeds
    /// through its pipeline.
    Proceed,
    /// The field is absent and optional; skip its pipeline entirely.
    Skip,
    /// The field's `on` dependency is unsatisfied.
    Dependent(ErrorEntry),
}

/// Applies a field's resolution directives, mutating the working tree in
/// place when a value is generated, copied, or defaulted.
pub fn resolve_field(spec: &FieldSpec, tree: &mut ValueMap) -> Resolution {
    // `on`: the field is only accepted while its dependency path resolves.
    if let Some(dependency) = &spec.on {
        if dependency.resolve(tree).is_none() {
            if present(spec, tree) {
                return Resolution::Dependent(ErrorEntry::leaf(
                    &spec.name,
                    "on",
                    format!("requires '{dependency}' to be present"),
                ));
            }
            return Resolution::Skip;
        }
    }

    // `auto`: generate when absent or empty, never overwrite real content.
    if let Some(auto) = &spec.auto {
        let vacant = tree
            .get(&spec.name)
            .map(|v| v.is_null() || v.is_empty())
            .unwrap_or(true);
        if vacant {
            let generated = auto.generator.call(auto.arg.as_ref());
            tree.insert(spec.name.clone(), generated);
            return Resolution::Proceed;
        }
    }

    if present(spec, tree) {
        return Resolution::Proceed;
    }

    // `from`: copy another path's resolved value when this slot is absent.
    if let Some(source) = &spec.from {
        if let Some(value) = source.resolve(tree).cloned() {
            tree.insert(spec.name.clone(), value);
            return Resolution::Proceed;
        }
    }

    if let Some(default) = &spec.default {
        tree.insert(spec.name.clone(), default.clone());
        return Resolution::Proceed;
    }

    Resolution::Skip
}

fn present(spec: &FieldSpec, tree: &ValueMap) -> bool {
    tree.get(&spec.name).map(|v| !v.is_null()).unwrap_or(false)
}
