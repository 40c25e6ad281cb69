//! Validation engine: one run, one target
//!
//! Drives the pipeline for a single captured response: structural schema
//! validation first, then the profile check registry, all appending into
//! one accumulator. Engines are cheap to build per run and safe to build
//! per thread; runs never share an accumulator.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::config::{QueryType, RdapValidatorConfig};
use crate::dataset::RdapDatasetService;
use crate::httpdata::HttpData;
use crate::profile::{self, ProfileContext};
use crate::result::RdapValidatorResults;
use crate::schema::{SchemaError, SchemaStore, SchemaValidator};

/// Construction-time faults of a validation run.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The configured URI does not look like any RDAP query
    #[error("The query URI does not map to a known RDAP query type: {0}")]
    UnknownQueryType(String),
}

/// Validates one RDAP response against the schema set and the profiles.
pub struct RdapValidationEngine {
    store: Arc<SchemaStore>,
    datasets: Arc<dyn RdapDatasetService>,
    config: RdapValidatorConfig,
}

impl RdapValidationEngine {
    pub fn new(
        store: Arc<SchemaStore>,
        datasets: Arc<dyn RdapDatasetService>,
        config: RdapValidatorConfig,
    ) -> Self {
        Self {
            store,
            datasets,
            config,
        }
    }

    /// Schema resource validating responses of the given query type.
    pub fn schema_name_for(query_type: QueryType) -> &'static str {
        match query_type {
            QueryType::Domain => "rdap_domain.json",
            QueryType::Nameserver => "rdap_nameserver.json",
            QueryType::Nameservers => "rdap_nameservers.json",
            QueryType::Entity => "rdap_entity.json",
            QueryType::Help => "rdap_help.json",
        }
    }

    /// Runs the full pipeline over one captured response.
    ///
    /// Results arrive in structural-validation order first, then profile
    /// checks in registration order. Checks over the parsed document are
    /// skipped when the body is not JSON; the structural phase has already
    /// coded that condition.
    pub fn validate_response(&self, http: &HttpData) -> Result<RdapValidatorResults, EngineError> {
        let query_type = self
            .config
            .query_type()
            .ok_or_else(|| EngineError::UnknownQueryType(self.config.uri().to_string()))?;

        let validator = SchemaValidator::new(
            Arc::clone(&self.store),
            Self::schema_name_for(query_type),
            Arc::clone(&self.datasets),
        )?;

        let mut results = RdapValidatorResults::new();
        validator.validate(http.body(), &mut results);

        let document: Option<Value> = serde_json::from_str(http.body()).ok();
        let cx = ProfileContext {
            document: document.as_ref(),
            config: &self.config,
            query_type,
            datasets: &self.datasets,
            http,
            store: &self.store,
        };
        let checks = profile::registry(&cx);
        profile::run_all(&checks, &mut results);

        Ok(results)
    }
}
