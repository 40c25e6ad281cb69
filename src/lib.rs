//! rdapval - RDAP conformance validation engine
//!
//! Validates RDAP (RFC 7480-7484) responses against the ICANN RDAP Response
//! Profile and Technical Implementation Guide. Structural conformance is
//! checked with annotated JSON Schemas; each failure is translated into a
//! stable ICANN-assigned error code by walking the schema tree. Profile
//! checks that need more than the document shape (EPP ROID registry, CORS
//! headers, query/label consistency) run afterwards and append to the same
//! result set.
//!
//! The HTTP client, dataset refresh, CLI and report serialization live
//! outside this crate; it consumes a captured response, a frozen dataset
//! service and a configuration value, and produces an ordered, deduplicated
//! sequence of coded results.

pub mod config;
pub mod dataset;
pub mod engine;
pub mod exception;
pub mod formats;
pub mod httpdata;
pub mod pointer;
pub mod profile;
pub mod result;
pub mod schema;

pub use config::{QueryType, RdapValidatorConfig};
pub use engine::RdapValidationEngine;
pub use httpdata::HttpData;
pub use result::{RdapValidationResult, RdapValidatorResults};
pub use schema::{SchemaStore, SchemaValidator};
