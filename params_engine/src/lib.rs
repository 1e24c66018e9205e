//! # Params Engine
//!
//! The recursive build engine: takes a schema assembled by `params_parser`
//! (or by hand from `params_core` types) and an input value tree, and
//! produces either the sanitized, resolved output tree or one aggregated
//! error report per failing node.
//!
//! A build runs in a fixed order per node: key normalization, the
//! authorized-keys gate, the required-fields gate, field resolution
//! (`on`/`auto`/`from`/`default`), per-field sanitize and validate
//! pipelines, composite recursion, domain constraint evaluation, and
//! finally the schema-level main validator.
//!
//! ## Example
//!
//! ```rust
//! use params_core::{TypeTag, Value, ValueMap};
//! use params_engine::Builder;
//! use params_parser::{FieldSpecBuilder, SchemaBuilder};
//!
//! let schema = SchemaBuilder::new("person")
//!     .field(
//!         FieldSpecBuilder::new("name", TypeTag::String)
//!             .derive("sanitize(trim)")
//!             .build(),
//!     )
//!     .field(
//!         FieldSpecBuilder::new("role", TypeTag::String)
//!             .default("user")
//!             .build(),
//!     )
//!     .build();
//!
//! let mut input = ValueMap::new();
//! input.insert("name".to_string(), Value::String(" mishka ".into()));
//!
//! let built = Builder::new(schema).build(input).unwrap();
//! assert_eq!(built.get("name"), Some(&Value::String("mishka".into())));
//! assert_eq!(built.get("role"), Some(&Value::String("user".into())));
//! ```

pub mod domain;
pub mod engine;
pub mod resolve;
pub mod sanitize;
pub mod validate;

pub use engine::{build, BuildMode, Builder};
pub use resolve::Resolution;
