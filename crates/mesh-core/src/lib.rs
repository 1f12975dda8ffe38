//! Mesh Core - field validation and transformation engine
//!
//! This crate runs the values of a record through per-field pipelines of
//! filters, format and rule checks, and callbacks, then reports either the
//! cleaned record or a per-field error list with resolvable messages.
//!
//! # Main Components
//!
//! - **Predicate Registry**: name-based dispatch to filters, formats, rules and callbacks
//! - **Field**: one ordered pipeline plus its validation state
//! - **Form**: a record plus its fields; aggregates results and merges clean values
//! - **Messages**: template lookup through a fallback chain, substitution and translation
//! - **Definitions**: forms described as JSON/YAML data
//!
//! # Example
//!
//! ```
//! use mesh_core::{Field, FieldValue, Form, Record};
//!
//! fn example() -> mesh_core::Result<()> {
//!     let mut record = Record::new();
//!     record.insert("email".into(), FieldValue::from("a@b.com"));
//!
//!     let mut form = Form::new(record);
//!     form.field(Field::new("email").rule("not_empty").format("email"))?;
//!
//!     assert!(form.check()?);
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod debug;
pub mod definition;
pub mod error;
pub mod field;
pub mod form;
pub mod message;
pub mod registry;
pub mod types;

// Re-export main types for convenience
pub use debug::{FieldTrace, FormTrace, StepTrace, TraceStatus};
pub use definition::{FieldDefinition, FormDefinition, StepDefinition};
pub use error::{Error, Result};
pub use field::Field;
pub use form::{Form, ValuesMode};
pub use message::{
    MessageCatalog, MessageOptions, MessageSource, NoMessages, TranslationTable, Translator,
};
pub use registry::{MxResolver, PredicateRegistry, Registry};
pub use types::{FieldError, FieldValue, PipelineStep, Record, StepKind, TraceEntry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
