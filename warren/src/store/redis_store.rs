//! Redis-backed document store.
//!
//! Documents are RedisJSON values under namespaced keys with a per-collection
//! id index set. Field updates run through a Lua script so a batch of
//! operations lands atomically. Every successful write publishes on the
//! collection's pub/sub channel, which drives live-query refreshes.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use futures::StreamExt;
use redis::{Script, aio::ConnectionManager, cmd};
use serde_json::{Value, json};
use tokio::sync::{Mutex, watch};

use crate::{
    config::Config,
    errors::StoreError,
    id::generate_doc_id,
    keys::KeyContext,
    types::{DocPayload, FieldOp, FieldOps, Query},
};

use super::{DocumentStore, LiveQuery, WatchGuard, matches_filters, sort_documents};

const DOC_PUT_SCRIPT_BODY: &str = include_str!("../../lua/doc_put.lua");
const DOC_UPDATE_SCRIPT_BODY: &str = include_str!("../../lua/doc_update.lua");

static DOC_PUT_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(DOC_PUT_SCRIPT_BODY));
static DOC_UPDATE_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(DOC_UPDATE_SCRIPT_BODY));

#[derive(Clone)]
pub struct RedisBackend {
    client: redis::Client,
    conn: ConnectionManager,
    keys: KeyContext,
    last_stamp: Arc<Mutex<i64>>,
}

impl RedisBackend {
    pub async fn connect(config: &Config) -> Result<Self, StoreError> {
        let client = redis::Client::open(config.redis_url.as_str())?;
        let conn = client.get_connection_manager().await?;
        Ok(Self {
            client,
            conn,
            keys: KeyContext::new(config.namespace.clone()),
            last_stamp: Arc::new(Mutex::new(0)),
        })
    }

    /// Server timestamp in epoch milliseconds from redis `TIME`, bumped past
    /// the last stamp handed out by this instance.
    async fn server_time_millis(&self) -> Result<i64, StoreError> {
        let mut conn = self.conn.clone();
        let (secs, micros): (i64, i64) = cmd("TIME").query_async(&mut conn).await?;
        let now = secs * 1_000 + micros / 1_000;
        let mut last = self.last_stamp.lock().await;
        let stamp = now.max(*last + 1);
        *last = stamp;
        Ok(stamp)
    }

    /// Delete every key in this backend's namespace (for test cleanup).
    ///
    /// Uses SCAN + DEL so the server is never blocked by one huge delete.
    pub async fn cleanup_namespace(&self) -> Result<u64, StoreError> {
        const SCAN_COUNT: usize = 1000;
        let pattern = self.keys.namespace_pattern();
        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;
        let mut total_deleted: u64 = 0;

        loop {
            let (next_cursor, batch): (u64, Vec<String>) = cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await?;

            if !batch.is_empty() {
                let deleted: u64 = cmd("DEL").arg(&batch).query_async(&mut conn).await?;
                total_deleted += deleted;
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        Ok(total_deleted)
    }

    async fn publish(&self, collection: &str, doc_id: &str) {
        let mut conn = self.conn.clone();
        let channel = self.keys.channel(collection);
        let result: Result<i64, redis::RedisError> =
            cmd("PUBLISH").arg(&channel).arg(doc_id).query_async(&mut conn).await;
        if let Err(err) = result {
            log::warn!("failed to announce change on {channel}: {err}");
        }
    }

    async fn write_document(&self, collection: &str, doc_id: &str, payload: DocPayload) -> Result<(), StoreError> {
        let stamp = self.server_time_millis().await?;
        let mut object = payload.resolve(stamp);
        object.insert("id".to_owned(), Value::from(doc_id));
        let body = serde_json::to_string(&Value::Object(object)).map_err(StoreError::codec)?;

        let mut conn = self.conn.clone();
        let _: String = DOC_PUT_SCRIPT
            .prepare_invoke()
            .key(self.keys.document(collection, doc_id))
            .key(self.keys.index(collection))
            .arg(doc_id)
            .arg(body)
            .invoke_async(&mut conn)
            .await?;

        log::debug!("redis store: wrote {collection}/{doc_id}");
        self.publish(collection, doc_id).await;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for RedisBackend {
    async fn create(&self, collection: &str, payload: DocPayload) -> Result<String, StoreError> {
        let doc_id = generate_doc_id();
        self.write_document(collection, &doc_id, payload).await?;
        Ok(doc_id)
    }

    async fn put(&self, collection: &str, doc_id: &str, payload: DocPayload) -> Result<(), StoreError> {
        self.write_document(collection, doc_id, payload).await
    }

    async fn get_raw(&self, collection: &str, doc_id: &str) -> Result<Option<Value>, StoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = cmd("JSON.GET")
            .arg(self.keys.document(collection, doc_id))
            .query_async(&mut conn)
            .await?;
        match raw {
            Some(body) => Ok(Some(serde_json::from_str(&body).map_err(StoreError::codec)?)),
            None => Ok(None),
        }
    }

    async fn update(&self, collection: &str, doc_id: &str, ops: FieldOps) -> Result<(), StoreError> {
        let stamp = self.server_time_millis().await?;
        let encoded = encode_ops(ops, stamp)?;

        let mut conn = self.conn.clone();
        let raw: String = DOC_UPDATE_SCRIPT
            .prepare_invoke()
            .key(self.keys.document(collection, doc_id))
            .arg(encoded)
            .invoke_async(&mut conn)
            .await?;
        let response: Value = serde_json::from_str(&raw).map_err(StoreError::codec)?;
        if response.get("err").and_then(Value::as_str) == Some("not_found") {
            return Err(StoreError::NotFound {
                doc_id: Some(doc_id.to_owned()),
            });
        }

        log::debug!("redis store: updated {collection}/{doc_id}");
        self.publish(collection, doc_id).await;
        Ok(())
    }

    async fn query_raw(&self, query: &Query) -> Result<Vec<Value>, StoreError> {
        let mut conn = self.conn.clone();
        let ids: Vec<String> = cmd("SMEMBERS")
            .arg(self.keys.index(&query.collection))
            .query_async(&mut conn)
            .await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipe = redis::pipe();
        for doc_id in &ids {
            pipe.cmd("JSON.GET").arg(self.keys.document(&query.collection, doc_id));
        }
        let bodies: Vec<Option<String>> = pipe.query_async(&mut conn).await?;

        let mut docs = Vec::with_capacity(bodies.len());
        for body in bodies.into_iter().flatten() {
            let doc: Value = serde_json::from_str(&body).map_err(StoreError::codec)?;
            if matches_filters(&doc, &query.filters) {
                docs.push(doc);
            }
        }
        sort_documents(&mut docs, query.order_by.as_ref());
        Ok(docs)
    }

    async fn watch_raw(&self, query: Query) -> Result<LiveQuery, StoreError> {
        // Subscribe before the initial snapshot so a write landing in
        // between still triggers a refresh.
        let channel = self.keys.channel(&query.collection);
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(&channel).await?;

        let initial = self.query_raw(&query).await?;
        let (tx, rx) = watch::channel(initial);

        let backend = self.clone();
        let handle = tokio::spawn(async move {
            let mut messages = pubsub.on_message();
            while messages.next().await.is_some() {
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

/// Resolve server-time ops against the given stamp and encode the batch for
/// the update script. Set/array values are pre-encoded to JSON text because
/// the script passes them straight into RedisJSON commands.
fn encode_ops(ops: FieldOps, stamp: i64) -> Result<String, StoreError> {
    let mut encoded = Vec::with_capacity(ops.len());
    for (field, op) in ops {
        let entry = match op {
            FieldOp::Set(value) => json!({
                "field": field,
                "kind": "set",
                "value": serde_json::to_string(&value).map_err(StoreError::codec)?,
            }),
            FieldOp::SetServerTime => json!({
                "field": field,
                "kind": "set",
                "value": stamp.to_string(),
            }),
            FieldOp::ArrayUnion(value) => json!({
                "field": field,
                "kind": "array_union",
                "value": serde_json::to_string(&value).map_err(StoreError::codec)?,
            }),
            FieldOp::ArrayRemove(value) => json!({
                "field": field,
                "kind": "array_remove",
                "value": serde_json::to_string(&value).map_err(StoreError::codec)?,
            }),
            FieldOp::Increment(delta) => json!({
                "field": field,
                "kind": "increment",
                "value": delta,
            }),
        };
        encoded.push(entry);
    }
    serde_json::to_string(&Value::Array(encoded)).map_err(StoreError::codec)
}
