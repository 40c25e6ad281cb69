//! Failure taxonomy and coded exception parsers
//!
//! Structural validation reports generic failures; this subsystem turns
//! them into ICANN-coded results. Every leaf failure is fanned out across
//! the whole parser registry: parsers are independent, never short-circuit
//! each other, and more than one may emit for the same leaf. A shared
//! wrapper pass then adds one "does not pass X validation" result per
//! annotated ancestor group.

mod parsers;
mod types;

pub use parsers::{parse_leaves, ExceptionParseContext, ExceptionParser, SENTINEL_CODE};
pub use types::{leaves_from, ExceptionCategory, ExceptionNode};

pub(crate) use parsers::parse_error_code;
