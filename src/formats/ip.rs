//! Dataset-aware IP address formats
//!
//! An address must parse for its family and must not belong to the IANA
//! special-purpose registry for that family (loopback, documentation
//! ranges, and friends are not acceptable registration data).

use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

use crate::dataset::{DatasetKind, RdapDatasetService};

use super::FormatValidator;

/// `ipv4-validation` format.
pub struct Ipv4FormatValidator {
    datasets: Arc<dyn RdapDatasetService>,
}

impl Ipv4FormatValidator {
    pub fn new(datasets: Arc<dyn RdapDatasetService>) -> Self {
        Self { datasets }
    }

    /// Diagnostic used when the address sits in the special registry.
    pub fn special_registry_error(&self) -> String {
        "The IPv4 address is part of the specialIPv4Addresses registry.".to_string()
    }
}

impl FormatValidator for Ipv4FormatValidator {
    fn format_name(&self) -> &'static str {
        "ipv4-validation"
    }

    fn validate(&self, value: &str) -> Option<String> {
        if value.parse::<Ipv4Addr>().is_err() {
            return Some(format!("[{}] is not a valid ipv4 address", value));
        }
        if self
            .datasets
            .get(DatasetKind::SpecialIpv4Addresses)
            .is_invalid(value)
        {
            return Some(self.special_registry_error());
        }
        None
    }
}

/// `ipv6-validation` format.
pub struct Ipv6FormatValidator {
    datasets: Arc<dyn RdapDatasetService>,
}

impl Ipv6FormatValidator {
    pub fn new(datasets: Arc<dyn RdapDatasetService>) -> Self {
        Self { datasets }
    }

    pub fn special_registry_error(&self) -> String {
        "The IPv6 address is part of the specialIPv6Addresses registry.".to_string()
    }
}

impl FormatValidator for Ipv6FormatValidator {
    fn format_name(&self) -> &'static str {
        "ipv6-validation"
    }

    fn validate(&self, value: &str) -> Option<String> {
        if value.parse::<Ipv6Addr>().is_err() {
            return Some(format!("[{}] is not a valid ipv6 address", value));
        }
        if self
            .datasets
            .get(DatasetKind::SpecialIpv6Addresses)
            .is_invalid(value)
        {
            return Some(self.special_registry_error());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{InvalidValuesSet, RegistrySet, StaticDatasetService};

    fn service_with_special_v4(addr: &str) -> Arc<dyn RdapDatasetService> {
        Arc::new(StaticDatasetService::new(
            RegistrySet::permissive(),
            InvalidValuesSet::new(vec![addr.to_string()]),
            InvalidValuesSet::default(),
        ))
    }

    fn permissive() -> Arc<dyn RdapDatasetService> {
        Arc::new(StaticDatasetService::permissive())
    }

    #[test]
    fn test_ipv4_ok() {
        let validator = Ipv4FormatValidator::new(permissive());
        assert!(validator.validate("203.0.113.9").is_none());
    }

    #[test]
    fn test_ipv4_not_an_address() {
        let validator = Ipv4FormatValidator::new(permissive());
        assert_eq!(
            validator.validate("999.0.0.1"),
            Some("[999.0.0.1] is not a valid ipv4 address".to_string())
        );
    }

    #[test]
    fn test_ipv4_in_special_registry() {
        let validator = Ipv4FormatValidator::new(service_with_special_v4("192.0.2.1"));
        assert_eq!(
            validator.validate("192.0.2.1"),
            Some(validator.special_registry_error())
        );
    }

    #[test]
    fn test_ipv6_ok_and_invalid() {
        let validator = Ipv6FormatValidator::new(permissive());
        assert!(validator.validate("2001:db8::1").is_none());
        assert!(validator.validate("not-an-ip").is_some());
    }

    #[test]
    fn test_format_names() {
        assert_eq!(
            Ipv4FormatValidator::new(permissive()).format_name(),
            "ipv4-validation"
        );
        assert_eq!(
            Ipv6FormatValidator::new(permissive()).format_name(),
            "ipv6-validation"
        );
    }
}
