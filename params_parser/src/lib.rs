//! # Params Parser
//!
//! Mini-language parsers and schema authoring for the Params Engine.
//!
//! Two fixed, narrow grammars are parsed here, once, at schema-authoring
//! time: derive pipelines (`sanitize(trim) validate(not_empty, max_len=20)`)
//! and domain constraints (`!auth.action=In[admin, user]`). The fluent
//! builders assemble `params_core` model values carrying the pre-parsed
//! directive forms, so the build engine never touches raw directive text.
//!
//! ## Example
//!
//! ```rust
//! use params_parser::{FieldSpecBuilder, SchemaBuilder};
//! use params_core::TypeTag;
//!
//! let schema = SchemaBuilder::new("person")
//!     .field(
//!         FieldSpecBuilder::new("name", TypeTag::String)
//!             .derive("sanitize(trim) validate(not_empty)")
//!             .build(),
//!     )
//!     .build();
//! assert_eq!(schema.required(), &["name".to_string()]);
//! ```

mod author;
mod domain;
mod pipeline;
mod scan;

pub use author::*;
pub use domain::*;
pub use pipeline::*;
pub use scan::{ParseError, ParseResult};
