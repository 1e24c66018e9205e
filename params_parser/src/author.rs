//! Fluent schema authoring.
//!
//! Builders that assemble the immutable schema model, parsing derive
//! pipelines and domain constraint strings once, at authoring time. A schema
//! is built at process start and shared across builds; no per-schema code is
//! generated.

use crate::domain::parse_domain;
use crate::pipeline::parse_pipeline;
use params_core::{
    AlternativesGroup, AutoGenerator, AutoRule, Candidate, Discriminator, DomainPredicate,
    FieldDecl, FieldSpec, FieldValidator, MainValidator, Nested, NodeOptions, Path, SchemaNode,
    TypeTag, Value,
};
use std::sync::Arc;

/// Builder for a single [`FieldSpec`].
///
/// # Example
///
/// ```rust
/// use params_parser::FieldSpecBuilder;
/// use params_core::TypeTag;
///
/// let field = FieldSpecBuilder::new("name", TypeTag::String)
///     .derive("sanitize(trim) validate(not_empty)")
///     .enforce(true)
///     .build();
/// assert_eq!(field.pipeline.sanitize.len(), 1);
/// ```
#[derive(Debug)]
pub struct FieldSpecBuilder {
    spec: FieldSpec,
}

impl FieldSpecBuilder {
    /// Creates a builder for a field with the given name and type tag.
    pub fn new(name: impl Into<String>, type_tag: TypeTag) -> Self {
        FieldSpecBuilder {
            spec: FieldSpec::new(name, type_tag),
        }
    }

    /// Overrides the node-level requiredness default for this field.
    pub fn enforce(mut self, enforce: bool) -> Self {
        self.spec.enforce = Some(enforce);
        self
    }

    /// Sets the default value applied when the field is absent.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.spec.default = Some(value.into());
        self
    }

    /// Attaches a derive pipeline, parsed now. Malformed input leaves the
    /// field without a pipeline (documented leniency).
    pub fn derive(mut self, pipeline: &str) -> Self {
        self.spec.pipeline = parse_pipeline(pipeline);
        self
    }

    /// Attaches domain constraint clauses, parsed now. Malformed clauses are
    /// skipped individually.
    pub fn domain(mut self, constraint: &str) -> Self {
        self.spec.constraints = parse_domain(constraint);
        self
    }

    /// Binds a custom validator, overriding the node dispatcher.
    pub fn validator(mut self, validator: FieldValidator) -> Self {
        self.spec.validator = Some(validator);
        self
    }

    /// Binds the predicate referenced by this field's `Fn` combinator.
    pub fn predicate(mut self, predicate: DomainPredicate) -> Self {
        self.spec.predicate = Some(predicate);
        self
    }

    /// Binds a generate-if-absent generator.
    pub fn auto(mut self, generator: AutoGenerator) -> Self {
        self.spec.auto = Some(AutoRule {
            generator,
            arg: None,
        });
        self
    }

    /// Binds a generate-if-absent generator with a fixed argument.
    pub fn auto_with(mut self, generator: AutoGenerator, arg: impl Into<Value>) -> Self {
        self.spec.auto = Some(AutoRule {
            generator,
            arg: Some(arg.into()),
        });
        self
    }

    /// Makes the field's acceptance conditional on another path's presence.
    pub fn on(mut self, path: &str) -> Self {
        self.spec.on = Some(Path::parse(path));
        self
    }

    /// Copies the field's value from another path when absent.
    pub fn from(mut self, path: &str) -> Self {
        self.spec.from = Some(Path::parse(path));
        self
    }

    /// Validates the field against a nested sub-schema.
    pub fn nested(mut self, schema: SchemaNode) -> Self {
        self.spec.nested = Some(Nested::One(Arc::new(schema)));
        self
    }

    /// Validates each element of a list against a nested sub-schema.
    pub fn nested_list(mut self, schema: SchemaNode) -> Self {
        self.spec.nested = Some(Nested::Many(Arc::new(schema)));
        self
    }

    /// Finishes the field.
    pub fn build(self) -> FieldSpec {
        self.spec
    }
}

/// Builder for an [`AlternativesGroup`]: one field name with candidate
/// shapes tried in declared order.
#[derive(Debug)]
pub struct AlternativesBuilder {
    name: String,
    candidates: Vec<Candidate>,
    discriminator: Option<Discriminator>,
}

impl AlternativesBuilder {
    /// Creates a builder for a group under the given field name.
    pub fn new(name: impl Into<String>) -> Self {
        AlternativesBuilder {
            name: name.into(),
            candidates: Vec::new(),
            discriminator: None,
        }
    }

    /// Adds a scalar candidate.
    pub fn leaf(mut self, spec: FieldSpec) -> Self {
        self.candidates.push(Candidate::Leaf(spec));
        self
    }

    /// Adds a composite candidate.
    pub fn shape(mut self, schema: SchemaNode) -> Self {
        self.candidates.push(Candidate::Shape(Arc::new(schema)));
        self
    }

    /// Binds a discriminator consulted before candidates are tried.
    pub fn discriminator(mut self, discriminator: Discriminator) -> Self {
        self.discriminator = Some(discriminator);
        self
    }

    /// Finishes the group.
    pub fn build(self) -> AlternativesGroup {
        AlternativesGroup {
            name: self.name,
            candidates: self.candidates,
            discriminator: self.discriminator,
        }
    }
}

/// Builder for a [`SchemaNode`].
///
/// Nodes default to enforce-all: every declared field is required unless the
/// field opts out, carries a default, or is resolvable via a directive.
///
/// # Example
///
/// ```rust
/// use params_parser::{FieldSpecBuilder, SchemaBuilder};
/// use params_core::TypeTag;
///
/// let schema = SchemaBuilder::new("person")
///     .field(FieldSpecBuilder::new("name", TypeTag::String).build())
///     .field(
///         FieldSpecBuilder::new("title", TypeTag::String)
///             .default("untitled")
///             .build(),
///     )
///     .build();
/// assert_eq!(schema.required(), &["name".to_string()]);
/// ```
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    fields: Vec<FieldDecl>,
    options: NodeOptions,
}

impl SchemaBuilder {
    /// Creates a builder for a node with the given diagnostic name.
    pub fn new(name: impl Into<String>) -> Self {
        SchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
            options: NodeOptions {
                enforce_all: true,
                ..Default::default()
            },
        }
    }

    /// Declares a field.
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(FieldDecl::Single(spec));
        self
    }

    /// Declares an alternatives group.
    pub fn alternatives(mut self, group: AlternativesGroup) -> Self {
        self.fields.push(FieldDecl::Alternatives(group));
        self
    }

    /// Sets the enforce-all default (on unless disabled here).
    pub fn enforce_all(mut self, enforce_all: bool) -> Self {
        self.options.enforce_all = enforce_all;
        self
    }

    /// Rejects input keys not declared on this node.
    pub fn authorized_only(mut self, authorized_only: bool) -> Self {
        self.options.authorized_only = authorized_only;
        self
    }

    /// Converts this node's failure into an immediately-propagated fault.
    pub fn raise_on_error(mut self, raise: bool) -> Self {
        self.options.raise_on_error = raise;
        self
    }

    /// Binds the schema-level cross-field validator.
    pub fn main_validator(mut self, validator: MainValidator) -> Self {
        self.options.main_validator = Some(validator);
        self
    }

    /// Binds the node-level per-field validator fallback.
    pub fn dispatcher(mut self, dispatcher: FieldValidator) -> Self {
        self.options.dispatcher = Some(dispatcher);
        self
    }

    /// Assembles the immutable node, fixing its required-field set.
    pub fn build(self) -> SchemaNode {
        SchemaNode::assemble(self.name, self.fields, self.options)
    }
}
