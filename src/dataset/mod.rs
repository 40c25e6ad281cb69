//! Reference dataset capability interface
//!
//! Profile checks consult IANA-derived datasets (EPP ROID registry,
//! special-purpose address registries). Downloading and refreshing them is
//! an external concern; the engine sees each dataset as a frozen predicate.

mod service;

pub use service::{
    DatasetKind, DatasetValidator, InvalidValuesSet, RdapDatasetService, RegistrySet,
    StaticDatasetService,
};
