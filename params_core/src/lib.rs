//! # Params Core
//!
//! Core model types for the Params Engine: the immutable schema descriptor
//! tree, the dynamically-typed value tree, parsed directive forms, and the
//! structured error payloads a build aggregates into.
//!
//! A schema describes a composite value's shape: fields, nested sub-shapes,
//! per-field sanitize/validate pipelines, cross-field domain constraints and
//! conditional alternatives. The authoring layer lives in `params_parser`;
//! the recursive build engine lives in `params_engine`.
//!
//! ## Example
//!
//! ```rust
//! use params_core::{FieldDecl, FieldSpec, NodeOptions, SchemaNode, TypeTag};
//!
//! let schema = SchemaNode::assemble(
//!     "person",
//!     vec![FieldDecl::Single(FieldSpec::new("name", TypeTag::String))],
//!     NodeOptions {
//!         enforce_all: true,
//!         ..Default::default()
//!     },
//! );
//! assert_eq!(schema.required(), &["name".to_string()]);
//! ```

pub mod directive;
pub mod error;
pub mod introspect;
pub mod path;
pub mod permit;
pub mod schema;
pub mod value;

pub use directive::*;
pub use error::*;
pub use introspect::*;
pub use path::*;
pub use permit::*;
pub use schema::*;
pub use value::*;
