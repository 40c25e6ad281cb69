//! Schema store: loads and compiles the schema resource set
//!
//! Schemas are addressed by file name. Cross-file `$ref`s are written as
//! sibling-relative references (`rdap_common.json#/definitions/link`) and
//! resolved in memory: every loaded document is served to the compiler by
//! file name, so no resolution ever touches the network or the filesystem
//! after construction.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use jsonschema::{Draft, Retrieve, Uri, Validator};
use serde_json::Value;

use crate::dataset::RdapDatasetService;
use crate::formats::apply_custom_formats;

use super::errors::{SchemaError, SchemaResult};

/// Base URI assigned to schemas that do not declare their own `$id`.
const SCHEMA_ID_BASE: &str = "https://rdap.example.net/json-schema/";

/// In-memory registry of every schema document, keyed by file name.
#[derive(Debug)]
pub struct SchemaStore {
    documents: BTreeMap<String, Value>,
}

impl SchemaStore {
    /// Loads every `*.json` file under `dir`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if the directory cannot be read or any schema
    /// file is not valid JSON. The engine must not come up on a broken
    /// schema set.
    pub fn load(dir: &Path) -> SchemaResult<Self> {
        let entries = fs::read_dir(dir).map_err(|e| SchemaError::DirectoryUnreadable {
            dir: dir.display().to_string(),
            source: e,
        })?;

        let mut documents = BTreeMap::new();
        for entry in entries {
            let entry = entry.map_err(|e| SchemaError::DirectoryUnreadable {
                dir: dir.display().to_string(),
                source: e,
            })?;
            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };
            let text = fs::read_to_string(&path).map_err(|e| SchemaError::Malformed {
                file: name.clone(),
                reason: e.to_string(),
            })?;
            let document: Value =
                serde_json::from_str(&text).map_err(|e| SchemaError::Malformed {
                    file: name.clone(),
                    reason: e.to_string(),
                })?;
            documents.insert(name, document);
        }

        Ok(Self { documents })
    }

    /// Builds a store from already-parsed documents. Used by tests and by
    /// embedders that bundle schemas their own way.
    pub fn from_documents(documents: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            documents: documents.into_iter().collect(),
        }
    }

    /// The parsed schema document registered under `name`.
    pub fn document(&self, name: &str) -> SchemaResult<&Value> {
        self.documents
            .get(name)
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))
    }

    /// Like [`SchemaStore::document`], but also yields the store-owned name.
    pub(crate) fn document_entry(&self, name: &str) -> SchemaResult<(&str, &Value)> {
        self.documents
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))
    }

    /// Registered schema names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    /// Resolves a `$ref` written inside document `current`.
    ///
    /// Returns the target value together with the name of the document it
    /// lives in. `#/...` stays in `current`; `other.json#/...` and
    /// absolute forms address the named sibling file.
    pub(crate) fn resolve_ref<'s>(
        &'s self,
        current: &str,
        reference: &str,
    ) -> Option<(&'s str, &'s Value)> {
        let (file_part, fragment) = match reference.split_once('#') {
            Some((file, fragment)) => (file, Some(fragment)),
            None => (reference, None),
        };
        let name = if file_part.is_empty() {
            current
        } else {
            file_part.rsplit('/').next().unwrap_or(file_part)
        };
        let (name, document) = self.documents.get_key_value(name)?;
        let target = match fragment {
            None | Some("") => document,
            Some(path) => document.pointer(path)?,
        };
        Some((name.as_str(), target))
    }

    /// Compiles the named schema into a draft-07 validator with the custom
    /// RDAP formats registered.
    pub fn compile(
        &self,
        name: &str,
        datasets: &Arc<dyn RdapDatasetService>,
    ) -> SchemaResult<Validator> {
        let document = self.document(name)?.clone();
        self.compile_value(name, document, datasets)
    }

    /// Compiles a schema fragment extracted from document `origin`.
    ///
    /// The fragment gets a synthetic `$id` one path level below the base so
    /// sibling-relative `$ref`s keep resolving through the retriever
    /// without shadowing the full document's own URI.
    pub fn compile_fragment(
        &self,
        origin: &str,
        fragment: &Value,
        datasets: &Arc<dyn RdapDatasetService>,
    ) -> SchemaResult<Validator> {
        self.compile_value(&format!("fragments/{}", origin), fragment.clone(), datasets)
    }

    fn compile_value(
        &self,
        origin: &str,
        mut schema: Value,
        datasets: &Arc<dyn RdapDatasetService>,
    ) -> SchemaResult<Validator> {
        if let Some(object) = schema.as_object_mut() {
            object
                .entry("$id")
                .or_insert_with(|| Value::String(format!("{}{}", SCHEMA_ID_BASE, origin)));
        }
        let mut binding = jsonschema::options();
        let options = binding
            .with_draft(Draft::Draft7)
            .with_retriever(StoreRetriever {
                documents: self.documents.clone(),
            });
        apply_custom_formats(options, datasets)
            .build(&schema)
            .map_err(|e| SchemaError::Compile {
                file: origin.to_string(),
                reason: e.to_string(),
            })
    }
}

/// Serves `$ref` targets to the compiler by file name, whatever base URI
/// the reference was resolved against.
struct StoreRetriever {
    documents: BTreeMap<String, Value>,
}

impl Retrieve for StoreRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let raw = uri.as_str();
        let name = raw
            .split('#')
            .next()
            .unwrap_or(raw)
            .rsplit('/')
            .next()
            .unwrap_or(raw);
        self.documents
            .get(name)
            .cloned()
            .ok_or_else(|| format!("Schema not found: {}", raw).into())
    }
}
