/// Key-construction helpers for the Redis backend.
///
/// All keys live under a caller-chosen namespace prefix so several
/// deployments (or test runs) can share one Redis instance.
#[derive(Debug, Clone)]
pub struct KeyContext {
    prefix: String,
}

impl KeyContext {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    /// Key holding a single document: `{prefix}:{collection}:{id}`.
    pub fn document(&self, collection: &str, doc_id: &str) -> String {
        format!("{}:{}:{}", self.prefix, collection, doc_id)
    }

    /// Set of all document ids in a collection: `{prefix}:{collection}:ids`.
    pub fn index(&self, collection: &str) -> String {
        format!("{}:{}:ids", self.prefix, collection)
    }

    /// Pub/sub channel notified after every write to a collection.
    pub fn channel(&self, collection: &str) -> String {
        format!("{}:{}:changed", self.prefix, collection)
    }

    /// SCAN pattern matching every key in the namespace.
    pub fn namespace_pattern(&self) -> String {
        format!("{}:*", self.prefix)
    }
}
