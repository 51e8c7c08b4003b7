//! # Mote store
//!
//! The narrow interface the commit engine and the speaker resolver consume.
//! A store holds schemas and motes (schema-validated JSON documents) plus a
//! set of pending, not yet flushed, changes per mote. The "working copy" is
//! the stored data with pending changes applied.

pub mod memory;

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::schema::Schema;

pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Mote not found: {0}")]
    UnknownMote(MoteId),
    #[error("Pointer must start with 'data/': {0}")]
    InvalidPointer(MoteDataPointer),
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid store file {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Opaque identifier of a mote.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoteId(pub String);

impl MoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Slash-delimited path to a field of a mote, e.g. `data/name/text`.
///
/// Pointers are opaque to the commit engine; the store decides validity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoteDataPointer(String);

impl MoteDataPointer {
    pub const DATA_ROOT: &'static str = "data";

    pub fn new(pointer: impl Into<String>) -> Self {
        Self(pointer.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Appends one segment.
    #[must_use]
    pub fn join(&self, segment: &str) -> Self {
        Self(format!("{}/{}", self.0.trim_end_matches('/'), segment))
    }

    /// Segments below `data/`, or `None` if the pointer is not data-rooted.
    pub fn data_segments(&self) -> Option<Vec<&str>> {
        let mut segments = self.segments();
        (segments.next() == Some(Self::DATA_ROOT)).then(|| segments.collect())
    }

    /// Reads the value this pointer addresses inside a mote's `data`.
    pub fn lookup<'a>(&self, data: &'a Value) -> Option<&'a Value> {
        self.data_segments()?
            .into_iter()
            .try_fold(data, |value, segment| value.get(segment))
    }

    /// Writes (or with `None`, deletes) the addressed value inside `data`.
    ///
    /// Writes create intermediate objects as needed. Deletes remove every
    /// parent object the delete leaves empty, so a field that was written and
    /// later deleted leaves no trace behind.
    pub fn apply(&self, data: &mut Value, value: Option<Value>) -> Result<(), StoreError> {
        let segments = self
            .data_segments()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| StoreError::InvalidPointer(self.clone()))?;

        let Some(value) = value else {
            remove_pruning(data, &segments);
            return Ok(());
        };

        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| StoreError::InvalidPointer(self.clone()))?;
        let mut node = data;
        for segment in parents {
            node = object_mut(node)
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
        object_mut(node).insert(last.to_string(), value);
        Ok(())
    }
}

/// Removes the value at `segments` below `node`, then drops each parent
/// object left empty on the way back up. Missing paths are a no-op.
fn remove_pruning(node: &mut Value, segments: &[&str]) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    let Some(object) = node.as_object_mut() else {
        return;
    };
    if rest.is_empty() {
        object.remove(*first);
        return;
    }
    if let Some(child) = object.get_mut(*first) {
        remove_pruning(child, rest);
        if child.as_object().is_some_and(Map::is_empty) {
            object.remove(*first);
        }
    }
}

/// Coerces `value` into an object, replacing any scalar in the way.
fn object_mut(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced with an object"),
    }
}

impl fmt::Display for MoteDataPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MoteDataPointer {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A schema-validated document instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mote {
    pub id: MoteId,
    pub schema_id: String,
    #[serde(default = "empty_object")]
    pub data: Value,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

impl Mote {
    pub fn new(id: MoteId, schema_id: impl Into<String>) -> Self {
        Self {
            id,
            schema_id: schema_id.into(),
            data: empty_object(),
        }
    }
}

/// The document/schema store consumed by the parser and the commit engine.
pub trait MoteStore {
    /// Schema from the working copy.
    fn schema(&self, schema_id: &str) -> Option<&Schema>;

    /// Working copy of one mote (stored data plus pending changes).
    fn working_mote(&self, id: &MoteId) -> Option<Mote>;

    /// Working copies of every mote whose schema is one of `schema_ids`.
    fn list_motes_by_schema(&self, schema_ids: &[String]) -> Vec<Mote>;

    /// Drops every pending change for `id`.
    fn clear_mote_changes(&mut self, id: &MoteId);

    /// Queues a write (`Some`) or delete (`None`) of one field.
    fn update_mote_data(
        &mut self,
        id: &MoteId,
        pointer: &MoteDataPointer,
        value: Option<Value>,
    ) -> Result<(), StoreError>;

    /// Flushes all pending changes to persistent storage.
    fn write_changes(&mut self) -> Result<(), StoreError>;
}
