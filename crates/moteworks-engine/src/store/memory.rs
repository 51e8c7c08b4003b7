use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::Schema;

use super::{Mote, MoteDataPointer, MoteId, MoteStore, StoreError};

/// On-disk layout of a file-backed [`MemoryStore`].
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    schemas: Vec<Schema>,
    #[serde(default)]
    motes: Vec<Mote>,
}

/// One queued field write; `None` deletes.
pub type PendingChange = (MoteDataPointer, Option<Value>);

/// In-memory [`MoteStore`], optionally persisted to a JSON file on flush.
///
/// Pending changes are kept per mote in the order they were queued and are
/// replayed in that order, so a delete of a subtree followed by writes below
/// it yields just the new writes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    schemas: BTreeMap<String, Schema>,
    motes: BTreeMap<MoteId, Mote>,
    changes: BTreeMap<MoteId, Vec<PendingChange>>,
    path: Option<PathBuf>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a store backed by `path`. A missing file yields an empty store
    /// that will be created on the first flush.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let mut store = Self {
            path: Some(path.to_path_buf()),
            ..Self::default()
        };
        if !path.exists() {
            log::debug!("store file {} not found, starting empty", path.display());
            return Ok(store);
        }

        let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: StoreFile =
            serde_json::from_str(&content).map_err(|source| StoreError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        for schema in file.schemas {
            store.insert_schema(schema);
        }
        for mote in file.motes {
            store.insert_mote(mote);
        }
        Ok(store)
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.insert_schema(schema);
        self
    }

    pub fn with_mote(mut self, mote: Mote) -> Self {
        self.insert_mote(mote);
        self
    }

    pub fn insert_schema(&mut self, schema: Schema) {
        self.schemas.insert(schema.id.clone(), schema);
    }

    pub fn insert_mote(&mut self, mote: Mote) {
        self.motes.insert(mote.id.clone(), mote);
    }

    /// Stored (flushed) state of a mote, without pending changes.
    pub fn mote(&self, id: &MoteId) -> Option<&Mote> {
        self.motes.get(id)
    }

    pub fn motes(&self) -> impl Iterator<Item = &Mote> {
        self.motes.values()
    }

    pub fn pending_changes(&self, id: &MoteId) -> &[PendingChange] {
        self.changes.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    fn apply_changes(mote: &mut Mote, changes: &[PendingChange]) -> Result<(), StoreError> {
        for (pointer, value) in changes {
            pointer.apply(&mut mote.data, value.clone())?;
        }
        Ok(())
    }

    fn save(&self, path: &Path) -> Result<(), StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let file = StoreFile {
            schemas: self.schemas.values().cloned().collect(),
            motes: self.motes.values().cloned().collect(),
        };
        let content = serde_json::to_string_pretty(&file).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)
    }
}

impl MoteStore for MemoryStore {
    fn schema(&self, schema_id: &str) -> Option<&Schema> {
        self.schemas.get(schema_id)
    }

    fn working_mote(&self, id: &MoteId) -> Option<Mote> {
        let mut mote = self.motes.get(id)?.clone();
        // Pending changes were validated when queued.
        Self::apply_changes(&mut mote, self.pending_changes(id)).ok()?;
        Some(mote)
    }

    fn list_motes_by_schema(&self, schema_ids: &[String]) -> Vec<Mote> {
        self.motes
            .values()
            .filter(|m| schema_ids.contains(&m.schema_id))
            .filter_map(|m| self.working_mote(&m.id))
            .collect()
    }

    fn clear_mote_changes(&mut self, id: &MoteId) {
        self.changes.remove(id);
    }

    fn update_mote_data(
        &mut self,
        id: &MoteId,
        pointer: &MoteDataPointer,
        value: Option<Value>,
    ) -> Result<(), StoreError> {
        if !self.motes.contains_key(id) {
            return Err(StoreError::UnknownMote(id.clone()));
        }
        if pointer.data_segments().is_none_or(|s| s.is_empty()) {
            return Err(StoreError::InvalidPointer(pointer.clone()));
        }
        self.changes
            .entry(id.clone())
            .or_default()
            .push((pointer.clone(), value));
        Ok(())
    }

    fn write_changes(&mut self) -> Result<(), StoreError> {
        let changes = std::mem::take(&mut self.changes);
        for (id, pending) in &changes {
            let mote = self
                .motes
                .get_mut(id)
                .ok_or_else(|| StoreError::UnknownMote(id.clone()))?;
            Self::apply_changes(mote, pending)?;
            log::debug!("flushed {} change(s) to mote {id}", pending.len());
        }
        if let Some(path) = &self.path {
            self.save(path)?;
        }
        Ok(())
    }
}
