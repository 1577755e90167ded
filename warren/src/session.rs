//! Session store: the current authenticated identity plus its profile
//! document, kept in sync by a background watcher.
//!
//! The watcher is the sole writer of the profile slot. It re-derives the
//! profile whenever the identity changes or a refresh is requested (after
//! sign-up writes the profile document), so observers always converge on
//! store state rather than on locally patched values. A missing profile
//! document leaves the slot empty; it never fails the session.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::{Notify, watch};

use crate::{
    auth::AuthGateway,
    errors::{AuthError, ValidationError},
    models::UserProfile,
    store::{Store, WatchGuard},
    types::DocPayload,
};

pub struct Session {
    auth: Arc<dyn AuthGateway>,
    store: Store,
    profile_rx: watch::Receiver<Option<UserProfile>>,
    refresh: Arc<Notify>,
    _watcher: WatchGuard,
}

impl Session {
    pub fn new(auth: Arc<dyn AuthGateway>, store: Store) -> Self {
        let (tx, profile_rx) = watch::channel(None);
        let refresh = Arc::new(Notify::new());

        let mut identity_rx = auth.identity_changes();
        let watcher_store = store.clone();
        let watcher_refresh = Arc::clone(&refresh);
        let handle = tokio::spawn(async move {
            loop {
                let identity = identity_rx.borrow_and_update().clone();
                let profile = match identity {
                    Some(user) => load_profile(&watcher_store, &user.id).await,
                    None => None,
                };
                if tx.send(profile).is_err() {
                    break;
                }
                tokio::select! {
                    changed = identity_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    _ = watcher_refresh.notified() => {}
                }
            }
        });

        Self {
            auth,
            store,
            profile_rx,
            refresh,
            _watcher: WatchGuard::new(handle),
        }
    }

    /// Register an account, write its profile document, and sign in.
    pub async fn sign_up(&self, email: &str, password: &str, username: &str) -> Result<UserProfile, AuthError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ValidationError::single("username", "validation.required", "username is required").into());
        }

        let user = self.auth.sign_up(email, password).await?;
        let profiles = self.store.collection::<UserProfile>();
        profiles
            .put(
                &user.id,
                DocPayload::new()
                    .set("email", json!(user.email))
                    .set("username", json!(username))
                    .set("bio", json!(""))
                    .set("followers", json!([]))
                    .set("following", json!([]))
                    .set("posts_count", json!(0))
                    .server_time("created_at"),
            )
            .await?;
        self.refresh.notify_one();

        let profile = profiles.get_or_error(&user.id).await?;
        Ok(profile)
    }

    /// Sign in to an existing account. The profile slot is populated by the
    /// watcher once the identity change lands.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), AuthError> {
        self.auth.sign_in(email, password).await?;
        Ok(())
    }

    pub async fn sign_out(&self) {
        self.auth.sign_out().await;
    }

    /// Watchable profile slot; `None` while signed out or when the signed-in
    /// identity has no profile document.
    pub fn profile(&self) -> watch::Receiver<Option<UserProfile>> {
        self.profile_rx.clone()
    }

    pub fn current_profile(&self) -> Option<UserProfile> {
        self.profile_rx.borrow().clone()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }
}

async fn load_profile(store: &Store, user_id: &str) -> Option<UserProfile> {
    match store.collection::<UserProfile>().get(user_id).await {
        Ok(Some(profile)) => Some(profile),
        Ok(None) => {
            log::debug!("no profile document for identity {user_id}");
            None
        }
        Err(err) => {
            log::warn!("failed to load profile for {user_id}: {err}");
            None
        }
    }
}
