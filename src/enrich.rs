//! Path-info enrichment from narinfo descriptors.
//!
//! Each record gains `registrationTime` and `path`, both taken from the
//! descriptor named by the hash embedded in the record's identifier. All
//! other keys pass through untouched and keep their order.
use crate::error::EnrichError;
use crate::hash::extract_hash;
use crate::narinfo::{narinfo_path, read_store_path, registration_time};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};

pub const REGISTRATION_TIME_KEY: &str = "registrationTime";
pub const PATH_KEY: &str = "path";

/// Opaque path-info attributes keyed by name.
pub type MetadataRecord = Map<String, Value>;

/// Identifier-to-record mapping as read from the input document.
pub type InputDocument = Map<String, Value>;

/// Resolves descriptors relative to an explicit narinfo directory.
#[derive(Debug, Clone)]
pub struct Enricher {
    base_dir: PathBuf,
}

impl Enricher {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Add `registrationTime` and `path` to `record`, overwriting any
    /// existing values.
    pub fn enrich(
        &self,
        identifier: &str,
        mut record: MetadataRecord,
    ) -> Result<MetadataRecord, EnrichError> {
        let hash = extract_hash(identifier)?;
        let descriptor = narinfo_path(&self.base_dir, hash);
        let store_path = read_store_path(&descriptor)?;
        let registered = registration_time(&descriptor)?;
        tracing::debug!(
            hash,
            path = %store_path,
            registration_time = registered,
            "enriched path info"
        );

        record.insert(REGISTRATION_TIME_KEY.to_string(), Value::from(registered));
        record.insert(PATH_KEY.to_string(), Value::String(store_path));
        Ok(record)
    }

    /// Enrich every entry in document order, stopping at the first failure.
    pub fn enrich_document(
        &self,
        document: InputDocument,
    ) -> Result<Vec<MetadataRecord>, EntryError> {
        let mut enriched = Vec::with_capacity(document.len());
        for (identifier, value) in document {
            let record = match value {
                Value::Object(record) => record,
                other => {
                    return Err(EntryError {
                        identifier,
                        kind: EntryErrorKind::NotAnObject(json_type_name(&other)),
                    })
                }
            };
            match self.enrich(&identifier, record) {
                Ok(record) => enriched.push(record),
                Err(err) => {
                    return Err(EntryError {
                        identifier,
                        kind: EntryErrorKind::Enrich(err),
                    })
                }
            }
        }
        Ok(enriched)
    }
}

/// A failure tied to the input entry that caused it.
#[derive(Debug)]
pub struct EntryError {
    pub identifier: String,
    pub kind: EntryErrorKind,
}

#[derive(Debug)]
pub enum EntryErrorKind {
    NotAnObject(&'static str),
    Enrich(EnrichError),
}

impl fmt::Display for EntryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            EntryErrorKind::NotAnObject(found) => write!(
                f,
                "entry {:?}: expected a metadata object, found {found}",
                self.identifier
            ),
            EntryErrorKind::Enrich(_) => write!(f, "enrich entry {:?}", self.identifier),
        }
    }
}

impl std::error::Error for EntryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            EntryErrorKind::NotAnObject(_) => None,
            EntryErrorKind::Enrich(err) => Some(err),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
