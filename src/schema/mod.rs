//! Annotated JSON Schema subsystem
//!
//! The RDAP schemas are draft-07 documents annotated with unprocessed
//! keywords (`errorCode`, `validationName`, `duplicateKeys`, ...). This
//! subsystem loads them once, compiles them for structural validation, and
//! exposes a navigable tree used to translate generic validation failures
//! back into ICANN-coded results.
//!
//! # Design principles
//!
//! - The store and its compiled validators are immutable after
//!   construction
//! - A malformed schema resource is a construction-time fault, never a
//!   validation finding
//! - Tree traversal is bounded even on self-recursive schemas

mod dupkeys;
mod errors;
mod loader;
mod tree;
mod validator;

pub use dupkeys::find_duplicate_key;
pub use errors::{SchemaError, SchemaResult};
pub use loader::SchemaStore;
pub use tree::{AnnotationNotFound, JsonPointers, SchemaNode, SchemaNodeKind, ValidationNode};
pub use validator::SchemaValidator;
