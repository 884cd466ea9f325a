use std::sync::{Arc, Mutex, MutexGuard};

use arc_swap::ArcSwap;
use bson::oid::ObjectId;
use bson::{Bson, DateTime, Document};
use imbl::OrdMap;
use tours_query::{Expression, Query, parse_filter};

use crate::error::StoreError;
use crate::exec;

type Records = OrdMap<[u8; 12], Document>;

pub const ID_FIELD: &str = "_id";
pub const CREATED_AT_FIELD: &str = "createdAt";
pub const VERSION_FIELD: &str = "__v";

/// An in-memory document collection.
///
/// Readers work on a snapshot, which is cheap thanks to `imbl` structural
/// sharing. Writers serialize on a mutex and publish a new snapshot.
pub struct Collection {
    name: String,
    records: ArcSwap<Records>,
    write_lock: Mutex<()>,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: ArcSwap::new(Arc::new(OrdMap::new())),
            write_lock: Mutex::new(()),
        }
    }

    /// Insert a document, stamping `_id`, `createdAt` (when absent) and `__v`.
    /// A caller-supplied `_id` is replaced.
    pub fn insert(&self, doc: Document) -> Result<Document, StoreError> {
        let _guard = self.lock()?;
        let stored = stamp_new(doc);
        let key = id_key(&stored)?;
        let mut records = (**self.records.load()).clone();
        records.insert(key, stored.clone());
        self.records.store(Arc::new(records));
        tracing::debug!(collection = %self.name, id = %hex(&key), "inserted document");
        Ok(stored)
    }

    pub fn insert_many(&self, docs: Vec<Document>) -> Result<Vec<Document>, StoreError> {
        let _guard = self.lock()?;
        let mut records = (**self.records.load()).clone();
        let mut inserted = Vec::with_capacity(docs.len());
        for doc in docs {
            let stored = stamp_new(doc);
            records.insert(id_key(&stored)?, stored.clone());
            inserted.push(stored);
        }
        self.records.store(Arc::new(records));
        tracing::debug!(collection = %self.name, count = inserted.len(), "inserted documents");
        Ok(inserted)
    }

    pub fn get(&self, id: &str) -> Result<Document, StoreError> {
        let key = parse_id(id)?;
        self.records
            .load()
            .get(&key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Run a query: filter, sort, skip/take, then project.
    pub fn find(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        let predicate = query.predicate()?;
        let projection = query.projection()?;
        let snapshot = self.records.load_full();

        let mut matched: Vec<Document> = snapshot
            .values()
            .filter(|doc| exec::matches(&predicate, doc))
            .cloned()
            .collect();
        exec::sort_documents(&mut matched, query.sort_spec());

        let page = matched
            .into_iter()
            .skip(query.skip_count())
            .take(query.take_count().unwrap_or(usize::MAX));
        let results: Vec<Document> = match projection {
            Some(projection) => page.map(|doc| exec::project(doc, &projection)).collect(),
            None => page.collect(),
        };

        tracing::debug!(collection = %self.name, results = results.len(), "find");
        Ok(results)
    }

    pub fn count(&self, filter: &Document) -> Result<u64, StoreError> {
        let predicate = parse_filter(filter).map_err(tours_query::QueryError::from)?;
        Ok(self.count_matching(&predicate))
    }

    fn count_matching(&self, predicate: &Expression) -> u64 {
        self.records
            .load()
            .values()
            .filter(|doc| exec::matches(predicate, doc))
            .count() as u64
    }

    pub fn len(&self) -> usize {
        self.records.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Merge top-level fields into a document and return the updated version.
    /// `_id` in the patch is ignored.
    pub fn update(&self, id: &str, patch: Document) -> Result<Document, StoreError> {
        let key = parse_id(id)?;
        let _guard = self.lock()?;
        let mut records = (**self.records.load()).clone();
        let existing = records
            .get_mut(&key)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        for (field, value) in patch {
            if field != ID_FIELD {
                existing.insert(field, value);
            }
        }
        let updated = existing.clone();
        self.records.store(Arc::new(records));
        tracing::debug!(collection = %self.name, id, "updated document");
        Ok(updated)
    }

    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        let key = parse_id(id)?;
        let _guard = self.lock()?;
        let mut records = (**self.records.load()).clone();
        if records.remove(&key).is_none() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.records.store(Arc::new(records));
        tracing::debug!(collection = %self.name, id, "deleted document");
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.write_lock.lock().map_err(|_| StoreError::Poisoned)
    }
}

fn stamp_new(doc: Document) -> Document {
    let mut stored = Document::new();
    stored.insert(ID_FIELD, ObjectId::new());
    for (field, value) in doc {
        if field != ID_FIELD {
            stored.insert(field, value);
        }
    }
    if !stored.contains_key(CREATED_AT_FIELD) {
        stored.insert(CREATED_AT_FIELD, DateTime::now());
    }
    stored.insert(VERSION_FIELD, 0_i32);
    stored
}

fn id_key(doc: &Document) -> Result<[u8; 12], StoreError> {
    match doc.get(ID_FIELD) {
        Some(Bson::ObjectId(oid)) => Ok(oid.bytes()),
        other => Err(StoreError::InvalidId(format!("{other:?}"))),
    }
}

fn parse_id(id: &str) -> Result<[u8; 12], StoreError> {
    ObjectId::parse_str(id)
        .map(|oid| oid.bytes())
        .map_err(|_| StoreError::InvalidId(id.to_string()))
}

fn hex(key: &[u8; 12]) -> String {
    ObjectId::from_bytes(*key).to_hex()
}
