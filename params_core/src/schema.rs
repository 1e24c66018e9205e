//! Schema model types.
//!
//! This module contains the immutable descriptor tree consumed by the build
//! engine: field specifications, nested composites, alternatives groups, and
//! node-level options. A schema is assembled once at startup and shared
//! (via `Arc`) across any number of concurrent builds.

use crate::directive::{DomainClause, Pipeline};
use crate::error::{ErrorEntry, ErrorReport};
use crate::path::Path;
use crate::value::{Value, ValueMap};
use std::fmt;
use std::sync::Arc;

/// Declared type tag of a field.
///
/// A present, non-null value is checked against its field's tag before the
/// validate stage runs; `Any` always passes. The string/format-shaped tags
/// (`Uid`, `Timestamp`, `Url`) are checked by the engine's validate registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    /// No implicit type check
    Any,
    /// String value
    String,
    /// Integer value
    Integer,
    /// Float value (integers coerce)
    Float,
    /// Boolean value
    Boolean,
    /// Bare symbolic tag
    Symbol,
    /// Nested map value
    Map,
    /// List value
    List,
    /// Unique identifier (UUID string)
    Uid,
    /// Timestamp (RFC 3339 or epoch seconds)
    Timestamp,
    /// URL string
    Url,
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeTag::Any => "any",
            TypeTag::String => "string",
            TypeTag::Integer => "integer",
            TypeTag::Float => "float",
            TypeTag::Boolean => "boolean",
            TypeTag::Symbol => "symbol",
            TypeTag::Map => "map",
            TypeTag::List => "list",
            TypeTag::Uid => "uid",
            TypeTag::Timestamp => "timestamp",
            TypeTag::Url => "url",
        };
        write!(f, "{name}")
    }
}

/// Outcome of a field-level custom validator.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Accept, possibly replacing the value
    Pass(Value),
    /// Reject with a message
    Fail(String),
}

/// Outcome of an alternatives-group discriminator.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Accept, possibly normalizing the value before candidates are tried
    Accept(Value),
    /// Explicit rejection carrying a full report
    Reject(ErrorReport),
}

/// Outcome of a schema-level cross-field validator.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeVerdict {
    /// Accept, possibly transforming the whole value
    Pass(ValueMap),
    /// Reject with field entries
    Fail(Vec<ErrorEntry>),
}

/// Per-field custom validator: `(field_name, value) -> Verdict`.
#[derive(Clone)]
pub struct FieldValidator(Arc<dyn Fn(&str, &Value) -> Verdict + Send + Sync>);

impl FieldValidator {
    /// Wraps a closure as a shareable function reference.
    pub fn new(f: impl Fn(&str, &Value) -> Verdict + Send + Sync + 'static) -> Self {
        FieldValidator(Arc::new(f))
    }

    /// Invokes the validator.
    pub fn call(&self, field: &str, value: &Value) -> Verdict {
        (self.0)(field, value)
    }
}

impl fmt::Debug for FieldValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldValidator(..)")
    }
}

/// Generator bound via `auto`; receives the fixed argument, if any.
#[derive(Clone)]
pub struct AutoGenerator(Arc<dyn Fn(Option<&Value>) -> Value + Send + Sync>);

impl AutoGenerator {
    /// Wraps a closure as a shareable function reference.
    pub fn new(f: impl Fn(Option<&Value>) -> Value + Send + Sync + 'static) -> Self {
        AutoGenerator(Arc::new(f))
    }

    /// Invokes the generator. Never cached; called fresh on every build.
    pub fn call(&self, arg: Option<&Value>) -> Value {
        (self.0)(arg)
    }
}

impl fmt::Debug for AutoGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AutoGenerator(..)")
    }
}

/// Predicate bound to a field's `Fn` domain combinator.
#[derive(Clone)]
pub struct DomainPredicate(Arc<dyn Fn(&Value) -> bool + Send + Sync>);

impl DomainPredicate {
    /// Wraps a closure as a shareable function reference.
    pub fn new(f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        DomainPredicate(Arc::new(f))
    }

    /// Invokes the predicate.
    pub fn call(&self, value: &Value) -> bool {
        (self.0)(value)
    }
}

impl fmt::Debug for DomainPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DomainPredicate(..)")
    }
}

/// Alternatives-group discriminator.
#[derive(Clone)]
pub struct Discriminator(Arc<dyn Fn(&Value) -> Selection + Send + Sync>);

impl Discriminator {
    /// Wraps a closure as a shareable function reference.
    pub fn new(f: impl Fn(&Value) -> Selection + Send + Sync + 'static) -> Self {
        Discriminator(Arc::new(f))
    }

    /// Invokes the discriminator.
    pub fn call(&self, value: &Value) -> Selection {
        (self.0)(value)
    }
}

impl fmt::Debug for Discriminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Discriminator(..)")
    }
}

/// Schema-level cross-field validator, run once on the resolved tree.
#[derive(Clone)]
pub struct MainValidator(Arc<dyn Fn(ValueMap) -> NodeVerdict + Send + Sync>);

impl MainValidator {
    /// Wraps a closure as a shareable function reference.
    pub fn new(f: impl Fn(ValueMap) -> NodeVerdict + Send + Sync + 'static) -> Self {
        MainValidator(Arc::new(f))
    }

    /// Invokes the validator on the fully-resolved tree.
    pub fn call(&self, tree: ValueMap) -> NodeVerdict {
        (self.0)(tree)
    }
}

impl fmt::Debug for MainValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MainValidator(..)")
    }
}

/// Generate-if-absent rule: a generator plus an optional fixed argument.
#[derive(Debug, Clone)]
pub struct AutoRule {
    /// The bound generator, invoked fresh on every build
    pub generator: AutoGenerator,
    /// Fixed argument passed to every invocation
    pub arg: Option<Value>,
}

/// Nested composite reference: a single sub-shape or a list of elements.
#[derive(Debug, Clone)]
pub enum Nested {
    /// One nested map validated by the sub-schema
    One(Arc<SchemaNode>),
    /// A list of maps, each validated independently by the sub-schema
    Many(Arc<SchemaNode>),
}

/// A single field declaration.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Field name, unique within its node
    pub name: String,
    /// Declared type tag
    pub type_tag: TypeTag,
    /// Per-field requiredness override (falls back to the node default)
    pub enforce: Option<bool>,
    /// Default value applied when the field is absent
    pub default: Option<Value>,
    /// Pre-parsed derive pipeline
    pub pipeline: Pipeline,
    /// Pre-parsed domain constraint clauses
    pub constraints: Vec<DomainClause>,
    /// Custom validator (overrides the node dispatcher)
    pub validator: Option<FieldValidator>,
    /// Predicate bound to this field's `Fn` domain combinator
    pub predicate: Option<DomainPredicate>,
    /// Generate-if-absent rule
    pub auto: Option<AutoRule>,
    /// Conditional-requirement path: accept this field only when present
    pub on: Option<Path>,
    /// Copy-if-absent source path
    pub from: Option<Path>,
    /// Nested composite sub-schema
    pub nested: Option<Nested>,
}

impl FieldSpec {
    /// Creates a minimal field spec; the authoring layer fills the rest in.
    pub fn new(name: impl Into<String>, type_tag: TypeTag) -> Self {
        FieldSpec {
            name: name.into(),
            type_tag,
            enforce: None,
            default: None,
            pipeline: Pipeline::default(),
            constraints: Vec::new(),
            validator: None,
            predicate: None,
            auto: None,
            on: None,
            from: None,
            nested: None,
        }
    }
}

/// One candidate shape of an alternatives group.
#[derive(Debug, Clone)]
pub enum Candidate {
    /// A scalar candidate, checked by its own pipeline and type tag
    Leaf(FieldSpec),
    /// A composite candidate, built against a sub-schema
    Shape(Arc<SchemaNode>),
}

/// One field name mapped to an ordered list of candidate shapes: a tagged
/// union over shapes, tried in declared order until one validates.
#[derive(Debug, Clone)]
pub struct AlternativesGroup {
    /// The shared field name
    pub name: String,
    /// Candidates in declared order
    pub candidates: Vec<Candidate>,
    /// Optional discriminator, consulted before candidates are tried
    pub discriminator: Option<Discriminator>,
}

/// A field slot on a schema node: either a single spec or an alternatives
/// group sharing one name.
#[derive(Debug, Clone)]
pub enum FieldDecl {
    /// A single field
    Single(FieldSpec),
    /// A group of alternative shapes under one name
    Alternatives(AlternativesGroup),
}

impl FieldDecl {
    /// The declared field name.
    pub fn name(&self) -> &str {
        match self {
            FieldDecl::Single(spec) => &spec.name,
            FieldDecl::Alternatives(group) => &group.name,
        }
    }
}

/// Node-level options, separated out so `SchemaNode::assemble` stays narrow.
#[derive(Debug, Clone, Default)]
pub struct NodeOptions {
    /// Require every field unless a spec overrides (`enforce: Some(false)`)
    pub enforce_all: bool,
    /// Reject input keys not declared on this node
    pub authorized_only: bool,
    /// Convert this node's failure into an immediately-propagated fault
    pub raise_on_error: bool,
    /// Schema-level cross-field validator
    pub main_validator: Option<MainValidator>,
    /// Node-level per-field validator, used when a field declares none
    pub dispatcher: Option<FieldValidator>,
}

/// An immutable schema node: ordered field declarations plus options.
#[derive(Debug, Clone)]
pub struct SchemaNode {
    /// Diagnostic name, surfaced in build errors
    pub name: String,
    /// Field declarations in order
    pub fields: Vec<FieldDecl>,
    /// Require every field unless a spec overrides
    pub enforce_all: bool,
    /// Reject undeclared input keys
    pub authorized_only: bool,
    /// Convert this node's failure into a fault
    pub raise_on_error: bool,
    /// Schema-level cross-field validator
    pub main_validator: Option<MainValidator>,
    /// Node-level per-field validator fallback
    pub dispatcher: Option<FieldValidator>,
    /// Required-field set, computed once at assembly and fixed thereafter
    required: Vec<String>,
}

impl SchemaNode {
    /// Assembles a node, computing its fixed required-field set.
    ///
    /// A single field is required when its `enforce` override (or the node
    /// default) holds and it carries no `default`, `auto`, `from` or `on`
    /// directive; those directives all make absence legitimate. Alternatives
    /// groups are never required.
    pub fn assemble(name: impl Into<String>, fields: Vec<FieldDecl>, options: NodeOptions) -> Self {
        let required = fields
            .iter()
            .filter_map(|decl| match decl {
                FieldDecl::Single(spec) => {
                    let enforced = spec.enforce.unwrap_or(options.enforce_all);
                    let resolvable = spec.default.is_some()
                        || spec.auto.is_some()
                        || spec.from.is_some()
                        || spec.on.is_some();
                    (enforced && !resolvable).then(|| spec.name.clone())
                }
                FieldDecl::Alternatives(_) => None,
            })
            .collect();

        SchemaNode {
            name: name.into(),
            fields,
            enforce_all: options.enforce_all,
            authorized_only: options.authorized_only,
            raise_on_error: options.raise_on_error,
            main_validator: options.main_validator,
            dispatcher: options.dispatcher,
            required,
        }
    }

    /// The node's fixed required-field set, in declaration order.
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Looks up a declaration by name.
    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|decl| decl.name() == name)
    }

    /// Returns true if `name` is declared on this node.
    pub fn declares(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}
