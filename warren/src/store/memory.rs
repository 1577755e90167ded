//! In-process reference backend.
//!
//! Collections are plain JSON maps behind an async `RwLock`; every write
//! publishes the collection name on a broadcast channel, and each live query
//! recomputes its result set from a fresh snapshot when its collection is
//! announced. Server timestamps are strictly increasing per backend
//! instance so `created_at` ordering is total.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock, broadcast, watch};

use crate::{
    errors::StoreError,
    id::generate_doc_id,
    types::{DocPayload, FieldOp, FieldOps, Query},
};

use super::{DocumentStore, LiveQuery, WatchGuard, matches_filters, sort_documents};

type Collections = HashMap<String, BTreeMap<String, Value>>;

#[derive(Clone)]
pub struct MemoryBackend {
    state: Arc<RwLock<Collections>>,
    changes: broadcast::Sender<String>,
    last_stamp: Arc<Mutex<i64>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(256);
        Self {
            state: Arc::new(RwLock::new(HashMap::new())),
            changes,
            last_stamp: Arc::new(Mutex::new(0)),
        }
    }

    /// Number of live-query watchers currently attached to this backend.
    pub fn watcher_count(&self) -> usize {
        self.changes.receiver_count()
    }

    /// Next server timestamp in epoch milliseconds, bumped past the last
    /// assigned one so no two writes ever share a timestamp.
    async fn next_stamp(&self) -> i64 {
        let mut last = self.last_stamp.lock().await;
        let now = Utc::now().timestamp_millis();
        let stamp = now.max(*last + 1);
        *last = stamp;
        stamp
    }

    fn announce(&self, collection: &str) {
        // No receivers is fine; nobody is watching.
        let _ = self.changes.send(collection.to_owned());
    }

    async fn insert(&self, collection: &str, doc_id: String, payload: DocPayload) -> Result<(), StoreError> {
        let stamp = self.next_stamp().await;
        let mut object = payload.resolve(stamp);
        object.insert("id".to_owned(), Value::from(doc_id.clone()));
        {
            let mut state = self.state.write().await;
            state
                .entry(collection.to_owned())
                .or_default()
                .insert(doc_id.clone(), Value::Object(object));
        }
        log::debug!("memory store: wrote {collection}/{doc_id}");
        self.announce(collection);
        Ok(())
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryBackend {
    async fn create(&self, collection: &str, payload: DocPayload) -> Result<String, StoreError> {
        let doc_id = generate_doc_id();
        self.insert(collection, doc_id.clone(), payload).await?;
        Ok(doc_id)
    }

    async fn put(&self, collection: &str, doc_id: &str, payload: DocPayload) -> Result<(), StoreError> {
        self.insert(collection, doc_id.to_owned(), payload).await
    }

    async fn get_raw(&self, collection: &str, doc_id: &str) -> Result<Option<Value>, StoreError> {
        let state = self.state.read().await;
        Ok(state.get(collection).and_then(|docs| docs.get(doc_id)).cloned())
    }

    async fn update(&self, collection: &str, doc_id: &str, ops: FieldOps) -> Result<(), StoreError> {
        let stamp = self.next_stamp().await;
        {
            let mut state = self.state.write().await;
            let doc = state
                .get_mut(collection)
                .and_then(|docs| docs.get_mut(doc_id))
                .ok_or_else(|| StoreError::NotFound {
                    doc_id: Some(doc_id.to_owned()),
                })?;
            let object = doc.as_object_mut().ok_or_else(|| StoreError::Other {
                message: format!("document {collection}/{doc_id} is not an object").into(),
            })?;
            for (field, op) in ops {
                apply_op(object, &field, op, stamp);
            }
        }
        log::debug!("memory store: updated {collection}/{doc_id}");
        self.announce(collection);
        Ok(())
    }

    async fn query_raw(&self, query: &Query) -> Result<Vec<Value>, StoreError> {
        let state = self.state.read().await;
        let mut docs: Vec<Value> = state
            .get(&query.collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| matches_filters(doc, &query.filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        drop(state);
        sort_documents(&mut docs, query.order_by.as_ref());
        Ok(docs)
    }

    async fn watch_raw(&self, query: Query) -> Result<LiveQuery, StoreError> {
        // Subscribe before the initial snapshot so a write landing in
        // between still triggers a refresh.
        let mut changes = self.changes.subscribe();
        let initial = self.query_raw(&query).await?;
        let (tx, rx) = watch::channel(initial);
        let backend = self.clone();
        let handle = tokio::spawn(async move {
            loop {
                let refresh = match changes.recv().await {
                    Ok(collection) => collection == query.collection,
                    // Dropped announcements: we cannot know which
                    // collections changed, so recompute unconditionally.
                    Err(broadcast::error::RecvError::Lagged(_)) => true,
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                if !refresh {
                    continue;
                }
                match backend.query_raw(&query).await {
                    Ok(docs) => {
                        if tx.send(docs).is_err() {
                            break;
                        }
                    }
                    Err(err) => log::warn!("live query on {} failed to refresh: {err}", query.collection),
                }
            }
        });
        Ok(LiveQuery::new(rx, WatchGuard::new(handle)))
    }
}

fn apply_op(object: &mut serde_json::Map<String, Value>, field: &str, op: FieldOp, stamp: i64) {
    match op {
        FieldOp::Set(value) => {
            object.insert(field.to_owned(), value);
        }
        FieldOp::SetServerTime => {
            object.insert(field.to_owned(), Value::from(stamp));
        }
        FieldOp::ArrayUnion(value) => match object.get_mut(field).and_then(Value::as_array_mut) {
            Some(items) => {
                if !items.contains(&value) {
                    items.push(value);
                }
            }
            None => {
                object.insert(field.to_owned(), Value::Array(vec![value]));
            }
        },
        FieldOp::ArrayRemove(value) => match object.get_mut(field).and_then(Value::as_array_mut) {
            Some(items) => items.retain(|item| item != &value),
            None => {
                object.insert(field.to_owned(), Value::Array(Vec::new()));
            }
        },
        FieldOp::Increment(delta) => {
            let current = object.get(field).and_then(Value::as_i64).unwrap_or(0);
            object.insert(field.to_owned(), Value::from(current + delta));
        }
    }
}
