//! Dataset service and the two membership polarities
//!
//! A registry dataset (EPP ROID) rejects values *absent* from it; a
//! special-purpose dataset (IANA special addresses) rejects values
//! *present* in it. Both reduce to the same capability: `is_invalid`.

use std::collections::BTreeSet;
use std::fmt;

/// Frozen membership predicate over one dataset.
pub trait DatasetValidator: Send + Sync {
    /// True iff `value` must be rejected according to this dataset.
    fn is_invalid(&self, value: &str) -> bool;
}

/// The datasets the engine consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    /// EPP Repository Object Identifiers registered with IANA
    EppRoid,
    /// IANA IPv4 Special-Purpose Address Registry
    SpecialIpv4Addresses,
    /// IANA IPv6 Special-Purpose Address Registry
    SpecialIpv6Addresses,
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DatasetKind::EppRoid => "eppRoid",
            DatasetKind::SpecialIpv4Addresses => "specialIPv4Addresses",
            DatasetKind::SpecialIpv6Addresses => "specialIPv6Addresses",
        };
        write!(f, "{}", name)
    }
}

/// Name-keyed access to the frozen datasets of one run.
pub trait RdapDatasetService: Send + Sync {
    fn get(&self, kind: DatasetKind) -> &dyn DatasetValidator;
}

/// Registry polarity: values NOT in the set are invalid.
#[derive(Debug, Default)]
pub struct RegistrySet {
    members: BTreeSet<String>,
    /// An empty registry rejects everything; a permissive one accepts
    /// everything. Embedders that freeze datasets elsewhere use permissive.
    permissive: bool,
}

impl RegistrySet {
    pub fn new(members: impl IntoIterator<Item = String>) -> Self {
        Self {
            members: members.into_iter().collect(),
            permissive: false,
        }
    }

    pub fn permissive() -> Self {
        Self {
            members: BTreeSet::new(),
            permissive: true,
        }
    }
}

impl DatasetValidator for RegistrySet {
    fn is_invalid(&self, value: &str) -> bool {
        !self.permissive && !self.members.contains(value)
    }
}

/// Special-purpose polarity: values IN the set are invalid.
#[derive(Debug, Default)]
pub struct InvalidValuesSet {
    members: BTreeSet<String>,
}

impl InvalidValuesSet {
    pub fn new(members: impl IntoIterator<Item = String>) -> Self {
        Self {
            members: members.into_iter().collect(),
        }
    }
}

impl DatasetValidator for InvalidValuesSet {
    fn is_invalid(&self, value: &str) -> bool {
        self.members.contains(value)
    }
}

/// In-memory dataset service. Ships for tests and for embedders that load
/// the IANA files through their own refresh machinery.
pub struct StaticDatasetService {
    epp_roid: RegistrySet,
    special_ipv4: InvalidValuesSet,
    special_ipv6: InvalidValuesSet,
}

impl StaticDatasetService {
    pub fn new(
        epp_roid: RegistrySet,
        special_ipv4: InvalidValuesSet,
        special_ipv6: InvalidValuesSet,
    ) -> Self {
        Self {
            epp_roid,
            special_ipv4,
            special_ipv6,
        }
    }

    /// A service that rejects nothing. Useful when a test targets a single
    /// dataset and the others should stay quiet.
    pub fn permissive() -> Self {
        Self {
            epp_roid: RegistrySet::permissive(),
            special_ipv4: InvalidValuesSet::default(),
            special_ipv6: InvalidValuesSet::default(),
        }
    }
}

impl RdapDatasetService for StaticDatasetService {
    fn get(&self, kind: DatasetKind) -> &dyn DatasetValidator {
        match kind {
            DatasetKind::EppRoid => &self.epp_roid,
            DatasetKind::SpecialIpv4Addresses => &self.special_ipv4,
            DatasetKind::SpecialIpv6Addresses => &self.special_ipv6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_polarity() {
        let registry = RegistrySet::new(vec!["EXMP".to_string()]);
        assert!(!registry.is_invalid("EXMP"));
        assert!(registry.is_invalid("BADROID"));
    }

    #[test]
    fn test_permissive_registry_accepts_everything() {
        let registry = RegistrySet::permissive();
        assert!(!registry.is_invalid("ANYTHING"));
    }

    #[test]
    fn test_special_polarity() {
        let special = InvalidValuesSet::new(vec!["192.0.2.1".to_string()]);
        assert!(special.is_invalid("192.0.2.1"));
        assert!(!special.is_invalid("203.0.113.9"));
    }

    #[test]
    fn test_service_routing() {
        let service = StaticDatasetService::new(
            RegistrySet::new(vec!["EXMP".to_string()]),
            InvalidValuesSet::new(vec!["192.0.2.1".to_string()]),
            InvalidValuesSet::default(),
        );
        assert!(service.get(DatasetKind::EppRoid).is_invalid("OTHER"));
        assert!(service
            .get(DatasetKind::SpecialIpv4Addresses)
            .is_invalid("192.0.2.1"));
        assert!(!service
            .get(DatasetKind::SpecialIpv6Addresses)
            .is_invalid("2001:db8::1"));
    }
}
