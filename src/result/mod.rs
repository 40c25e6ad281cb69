//! Validation results and their accumulator
//!
//! Every conformance finding is a coded result. Codes are stable negative
//! integers assigned by the ICANN profiles; `-999` is reserved for schema
//! sets that are out of sync with the engine.

mod accumulator;
mod types;

pub use accumulator::RdapValidatorResults;
pub use types::RdapValidationResult;
