//! The document-store boundary.
//!
//! Everything the application core needs from its backend is expressed by
//! [`DocumentStore`]: create/put/get/update over JSON documents in named
//! collections, one-shot queries, and live queries that re-deliver the full
//! matching result set after every change. Two implementations ship with the
//! crate: [`memory::MemoryBackend`] for tests and demos, and
//! [`redis_store::RedisBackend`] for a real deployment.

mod live;
pub mod memory;
pub mod redis_store;

use std::cmp::Ordering;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

pub use live::{Live, LiveQuery, WatchGuard};

use crate::{
    errors::StoreError,
    types::{DocPayload, FieldOps, FilterCondition, OrderBy, Query, Record, SortOrder},
};

/// Backend contract for a collection-of-documents store with live queries.
///
/// Documents are JSON objects carrying their own `"id"` field. Timestamps
/// written through `WriteValue::ServerTime`/`FieldOp::SetServerTime` are
/// assigned by the backend and are strictly increasing per backend instance.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Insert a new document with a store-assigned id. Returns the id.
    async fn create(&self, collection: &str, payload: DocPayload) -> Result<String, StoreError>;

    /// Insert (or replace) a document under a caller-chosen id.
    async fn put(&self, collection: &str, doc_id: &str, payload: DocPayload) -> Result<(), StoreError>;

    /// Fetch one raw document, or `None` if absent.
    async fn get_raw(&self, collection: &str, doc_id: &str) -> Result<Option<Value>, StoreError>;

    /// Apply named-field operations to an existing document.
    async fn update(&self, collection: &str, doc_id: &str, ops: FieldOps) -> Result<(), StoreError>;

    /// One-shot filtered, optionally ordered fetch.
    async fn query_raw(&self, query: &Query) -> Result<Vec<Value>, StoreError>;

    /// Live query: the returned handle holds the current result set and is
    /// refreshed after every change to the collection until cancelled.
    async fn watch_raw(&self, query: Query) -> Result<LiveQuery, StoreError>;
}

/// Cloneable handle over a backend, the main entry point for callers.
///
/// Typed access goes through [`Store::collection`]:
///
/// ```ignore
/// let posts = store.collection::<Post>();
/// let post = posts.get_or_error(&post_id).await?;
/// ```
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn DocumentStore>,
}

impl Store {
    pub fn new(backend: impl DocumentStore) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Get a typed handle for the record's collection.
    pub fn collection<T: Record>(&self) -> Collection<T> {
        Collection {
            backend: Arc::clone(&self.backend),
            _marker: PhantomData,
        }
    }

    pub async fn create(&self, collection: &str, payload: DocPayload) -> Result<String, StoreError> {
        self.backend.create(collection, payload).await
    }

    pub async fn put(&self, collection: &str, doc_id: &str, payload: DocPayload) -> Result<(), StoreError> {
        self.backend.put(collection, doc_id, payload).await
    }

    pub async fn get_raw(&self, collection: &str, doc_id: &str) -> Result<Option<Value>, StoreError> {
        self.backend.get_raw(collection, doc_id).await
    }

    pub async fn update(&self, collection: &str, doc_id: &str, ops: FieldOps) -> Result<(), StoreError> {
        self.backend.update(collection, doc_id, ops).await
    }

    pub async fn query_raw(&self, query: &Query) -> Result<Vec<Value>, StoreError> {
        self.backend.query_raw(query).await
    }

    pub async fn watch_raw(&self, query: Query) -> Result<LiveQuery, StoreError> {
        self.backend.watch_raw(query).await
    }
}

/// Type-safe accessor for one collection.
pub struct Collection<T> {
    backend: Arc<dyn DocumentStore>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> Collection<T> {
    /// Start a query against this collection.
    pub fn query(&self) -> Query {
        Query::collection(T::COLLECTION)
    }

    pub async fn get(&self, doc_id: &str) -> Result<Option<T>, StoreError> {
        match self.backend.get_raw(T::COLLECTION, doc_id).await? {
            Some(raw) => {
                let record = serde_json::from_value(raw).map_err(StoreError::codec)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    pub async fn get_or_error(&self, doc_id: &str) -> Result<T, StoreError> {
        self.get(doc_id).await?.ok_or_else(|| StoreError::NotFound {
            doc_id: Some(doc_id.to_string()),
        })
    }

    pub async fn create(&self, payload: DocPayload) -> Result<String, StoreError> {
        self.backend.create(T::COLLECTION, payload).await
    }

    pub async fn put(&self, doc_id: &str, payload: DocPayload) -> Result<(), StoreError> {
        self.backend.put(T::COLLECTION, doc_id, payload).await
    }

    pub async fn update(&self, doc_id: &str, ops: FieldOps) -> Result<(), StoreError> {
        self.backend.update(T::COLLECTION, doc_id, ops).await
    }

    /// Fetch all matching records, skipping documents that fail to decode.
    pub async fn find_many(&self, query: Query) -> Result<Vec<T>, StoreError> {
        let raw = self.backend.query_raw(&query).await?;
        Ok(decode_documents(&raw))
    }

    /// Subscribe to a live, typed view of the matching records.
    pub async fn watch(&self, query: Query) -> Result<Live<T>, StoreError> {
        let live = self.backend.watch_raw(query).await?;
        Ok(Live::new(live))
    }
}

/// Decode raw documents into records, dropping (and logging) any document
/// that does not fit the record shape rather than failing the whole set.
pub(crate) fn decode_documents<T: Record>(raw: &[Value]) -> Vec<T> {
    let mut records = Vec::with_capacity(raw.len());
    for doc in raw {
        match serde_json::from_value::<T>(doc.clone()) {
            Ok(record) => records.push(record),
            Err(err) => {
                log::warn!(
                    "dropping malformed {} document {}: {err}",
                    T::COLLECTION,
                    doc.get("id").and_then(Value::as_str).unwrap_or("<no id>"),
                );
            }
        }
    }
    records
}

/// Whether a raw document satisfies every filter of a query.
pub(crate) fn matches_filters(doc: &Value, filters: &[FilterCondition]) -> bool {
    filters.iter().all(|filter| match filter {
        FilterCondition::Eq { field, value } => doc.get(field) == Some(value),
        FilterCondition::ArrayContains { field, value } => doc
            .get(field)
            .and_then(Value::as_array)
            .is_some_and(|items| items.contains(value)),
    })
}

/// Order documents per the query's `order_by`, tie-breaking on document id
/// so the result is deterministic for any backend iteration order. Without
/// an explicit order, documents sort by id alone.
pub(crate) fn sort_documents(docs: &mut [Value], order_by: Option<&OrderBy>) {
    docs.sort_by(|a, b| {
        let by_field = match order_by {
            Some(OrderBy { field, order }) => {
                let ordering = compare_field(a.get(field), b.get(field));
                match order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            }
            None => Ordering::Equal,
        };
        by_field.then_with(|| compare_field(a.get("id"), b.get("id")))
    });
}

/// Total order over optional JSON field values: missing/null, then booleans,
/// numbers, strings, and finally composites (compared only by kind).
fn compare_field(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(Value::Array(_)) => 4,
            Some(Value::Object(_)) => 5,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
