pub(crate) use serde_json::json;
pub(crate) use warren::{
    DocPayload, MemoryBackend, Store, UserProfile, actions,
};

pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Fresh in-memory store plus a handle on its backend for introspection.
pub(crate) fn test_store() -> (Store, MemoryBackend) {
    init_logging();
    let backend = MemoryBackend::new();
    (Store::new(backend.clone()), backend)
}

/// Write a profile document directly, bypassing the auth flow.
pub(crate) async fn seed_profile(store: &Store, id: &str, username: &str) -> UserProfile {
    let profiles = store.collection::<UserProfile>();
    profiles
        .put(
            id,
            DocPayload::new()
                .set("email", json!(format!("{username}@example.com")))
                .set("username", json!(username))
                .set("bio", json!(""))
                .set("followers", json!([]))
                .set("following", json!([]))
                .set("posts_count", json!(0))
                .server_time("created_at"),
        )
        .await
        .expect("seed profile");
    profiles.get_or_error(id).await.expect("read seeded profile")
}

/// Reload a profile after mutations.
pub(crate) async fn reload_profile(store: &Store, id: &str) -> UserProfile {
    store
        .collection::<UserProfile>()
        .get_or_error(id)
        .await
        .expect("reload profile")
}
