//! Shared vocabulary for talking to a document store: write payloads,
//! field operations, queries, and the [`Record`] trait binding a Rust type
//! to its collection.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// A value written into a document field. `ServerTime` is a placeholder the
/// store resolves to its own clock at write time; clients never supply
/// creation timestamps themselves.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteValue {
    Json(Value),
    ServerTime,
}

/// Field payload for `create`/`put`, built up in declaration order.
///
/// ```ignore
/// let payload = DocPayload::new()
///     .set("content", json!("hello"))
///     .server_time("created_at");
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocPayload {
    fields: Vec<(String, WriteValue)>,
}

impl DocPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: Value) -> Self {
        self.fields.push((field.into(), WriteValue::Json(value)));
        self
    }

    pub fn server_time(mut self, field: impl Into<String>) -> Self {
        self.fields.push((field.into(), WriteValue::ServerTime));
        self
    }

    /// Resolve the payload into a concrete JSON object, substituting the
    /// store-assigned timestamp (epoch milliseconds) for every `ServerTime`
    /// field.
    pub(crate) fn resolve(self, server_now_millis: i64) -> Map<String, Value> {
        let mut object = Map::new();
        for (field, value) in self.fields {
            let resolved = match value {
                WriteValue::Json(value) => value,
                WriteValue::ServerTime => Value::from(server_now_millis),
            };
            object.insert(field, resolved);
        }
        object
    }
}

/// A single named-field operation applied by `update`.
///
/// `ArrayUnion`/`ArrayRemove` are idempotent set-membership operations:
/// union appends only if the element is absent, remove deletes every
/// occurrence. Concurrent toggles therefore converge instead of
/// duplicating.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOp {
    Set(Value),
    SetServerTime,
    ArrayUnion(Value),
    ArrayRemove(Value),
    Increment(i64),
}

/// Named-field operations for a single `update` call.
pub type FieldOps = Vec<(String, FieldOp)>;

/// Filter over one document field.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterCondition {
    /// Field equals the given value.
    Eq { field: String, value: Value },
    /// Field is an array containing the given value.
    ArrayContains { field: String, value: Value },
}

/// Sort direction for ordered queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub order: SortOrder,
}

/// A query over one collection: zero or more filters plus an optional order.
/// Results with an order are tie-broken by document id so they are
/// deterministic regardless of backend iteration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<FilterCondition>,
    pub order_by: Option<OrderBy>,
}

impl Query {
    pub fn collection(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
            order_by: None,
        }
    }

    pub fn filter_eq(mut self, field: impl Into<String>, value: Value) -> Self {
        self.filters.push(FilterCondition::Eq {
            field: field.into(),
            value,
        });
        self
    }

    pub fn filter_array_contains(mut self, field: impl Into<String>, value: Value) -> Self {
        self.filters.push(FilterCondition::ArrayContains {
            field: field.into(),
            value,
        });
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            order,
        });
        self
    }
}

/// A Rust type stored as documents of one collection.
pub trait Record: DeserializeOwned + Send + 'static {
    /// The collection this record lives in.
    const COLLECTION: &'static str;

    /// The id of this record instance.
    fn record_id(&self) -> &str;
}
