/// Runtime configuration for the Redis backend, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Redis connection URL (`WARREN_REDIS_URL`).
    pub redis_url: String,
    /// Key namespace prefix (`WARREN_NAMESPACE`), so several deployments can
    /// share one Redis instance.
    pub namespace: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            redis_url: std::env::var("WARREN_REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".to_string()),
            namespace: std::env::var("WARREN_NAMESPACE").unwrap_or_else(|_| "warren".to_string()),
        }
    }

    pub fn new(redis_url: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            redis_url: redis_url.into(),
            namespace: namespace.into(),
        }
    }
}
