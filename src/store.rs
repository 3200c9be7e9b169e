//! The document: an ordered, write-through collection of [`Shape`] records.
//!
//! Every mutating call re-serializes the full collection and writes it under a single storage
//! key before returning. If that write fails the in-memory collection is restored, so memory and
//! storage never disagree.

use log::{debug, info, warn};

use crate::error::StoreError;
use crate::shape::{FieldUpdate, Shape, ShapeId};
use crate::storage::KeyValueStorage;

/// Key used when no other is configured
pub const DEFAULT_STORAGE_KEY: &str = "shapes";

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

pub struct ShapeStore {
    storage: Box<dyn KeyValueStorage>,
    key: String,
    shapes: Vec<Shape>,
}

impl std::fmt::Debug for ShapeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapeStore")
            .field("key", &self.key)
            .field("shapes", &self.shapes.len())
            .finish()
    }
}

/// Decode each record on its own, dropping the ones that do not describe a shape
fn parse_records(records: Vec<serde_json::Value>) -> Vec<Shape> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<Shape>(record) {
            Ok(shape) => Some(shape),
            Err(err) => {
                warn!("Skipping unreadable shape record #{index}: {err}");
                None
            }
        })
        .collect()
}

impl ShapeStore {
    /// Load the collection stored under `key`.
    ///
    /// Absent or malformed data yields an empty document, and records that cannot be read are
    /// skipped so the rest of the document survives; nothing is written.
    pub fn load(storage: Box<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        let key = key.into();
        let shapes = match storage.get(&key) {
            None => {
                debug!("No stored shapes under `{key}`");
                Vec::new()
            }
            Some(json) => match serde_json::from_str::<Vec<serde_json::Value>>(&json) {
                Ok(records) => {
                    let total = records.len();
                    let shapes = parse_records(records);
                    info!("Loaded {} of {total} shapes from `{key}`", shapes.len());
                    shapes
                }
                Err(err) => {
                    warn!("Discarding unreadable shapes under `{key}`: {err}");
                    Vec::new()
                }
            },
        };
        Self { storage, key, shapes }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|shape| shape.id == id)
    }

    /// Position of `id` in z-order
    pub fn index_of(&self, id: ShapeId) -> Option<usize> {
        self.shapes.iter().position(|shape| shape.id == id)
    }

    /// Next free id: one past the largest id in the document
    pub fn next_id(&self) -> StoreResult<ShapeId> {
        match self.shapes.iter().map(|shape| shape.id).max() {
            None => Ok(1),
            Some(max) => max.checked_add(1).ok_or(StoreError::IdsExhausted(max)),
        }
    }

    /// Run `mutate` against the collection, then persist it; on a failed write the previous
    /// collection is restored
    fn write_through<T>(
        &mut self,
        mutate: impl FnOnce(&mut Vec<Shape>) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let snapshot = self.shapes.clone();
        let result = mutate(&mut self.shapes)?;
        if let Err(err) = self.persist() {
            warn!("Rolling back store after failed write: {err}");
            self.shapes = snapshot;
            return Err(err);
        }
        Ok(result)
    }

    fn persist(&mut self) -> StoreResult<()> {
        let json = serde_json::to_string(&self.shapes)?;
        self.storage.set(&self.key, &json)?;
        debug!("Persisted {} shapes to `{}`", self.shapes.len(), self.key);
        Ok(())
    }

    /// Append a record at the top of the z-order
    pub fn append(&mut self, shape: Shape) -> StoreResult<()> {
        self.write_through(|shapes| {
            shapes.push(shape);
            Ok(())
        })
    }

    /// Remove the most recently added record. Popping an empty store is a no-op.
    pub fn pop(&mut self) -> StoreResult<Option<Shape>> {
        if self.shapes.is_empty() {
            return Ok(None);
        }
        self.write_through(|shapes| Ok(shapes.pop()))
    }

    pub fn remove_at(&mut self, index: usize) -> StoreResult<Shape> {
        self.write_through(|shapes| {
            let len = shapes.len();
            if index >= len {
                return Err(StoreError::IndexOutOfRange { index, len });
            }
            Ok(shapes.remove(index))
        })
    }

    /// Keep only records matching `keep`; returns how many were removed
    pub fn retain(&mut self, mut keep: impl FnMut(&Shape) -> bool) -> StoreResult<usize> {
        self.write_through(|shapes| {
            let before = shapes.len();
            shapes.retain(|shape| keep(shape));
            Ok(before - shapes.len())
        })
    }

    pub fn remove_by_id(&mut self, id: ShapeId) -> StoreResult<Shape> {
        let index = self.index_of(id).ok_or(StoreError::NotFound(id))?;
        self.remove_at(index)
    }

    /// Apply one field-level mutation to the record with `id`
    pub fn update_field(&mut self, id: ShapeId, update: FieldUpdate) -> StoreResult<&Shape> {
        debug!("Updating `{}` of shape {id}", update.name());
        self.update(id, |shape| {
            shape.apply(&update);
            Ok(())
        })
    }

    /// Mutate the record with `id` through `edit`. The id and type are kept as they were.
    pub fn update(
        &mut self,
        id: ShapeId,
        edit: impl FnOnce(&mut Shape) -> StoreResult<()>,
    ) -> StoreResult<&Shape> {
        let index = self.index_of(id).ok_or(StoreError::NotFound(id))?;
        self.write_through(|shapes| {
            let shape = &mut shapes[index];
            let kind = shape.kind();
            let mut edited = shape.clone();
            edit(&mut edited)?;
            edited.id = id;
            if edited.kind() != kind {
                warn!("Ignoring attempt to change shape {id} from {kind} to {}", edited.kind());
                edited.geometry = shape.geometry.clone();
            }
            *shape = edited;
            Ok(())
        })?;
        Ok(&self.shapes[index])
    }

    /// Remove the storage key and empty the document
    pub fn clear(&mut self) -> StoreResult<()> {
        self.storage.remove(&self.key)?;
        self.shapes.clear();
        info!("Cleared stored shapes under `{}`", self.key);
        Ok(())
    }
}
