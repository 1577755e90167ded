//! Authentication boundary.
//!
//! [`AuthGateway`] is the minimal surface the session layer needs from an
//! auth provider: account creation, sign in/out, and a watchable stream of
//! the current identity. [`MemoryAuth`] is the in-process implementation
//! used by tests and demos; it hashes passwords with Argon2id and never
//! stores plaintext.

use std::collections::HashMap;
use std::sync::Arc;

use argon2::Argon2;
use async_trait::async_trait;
use email_address::EmailAddress;
use tokio::sync::{RwLock, watch};

use crate::{errors::AuthError, id::generate_doc_id};

/// Minimum accepted password length.
const MIN_PASSWORD_LEN: usize = 6;

/// The authenticated identity, as the auth provider knows it. Profile data
/// lives in the document store, keyed by `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

#[async_trait]
pub trait AuthGateway: Send + Sync + 'static {
    /// Create an account and sign it in.
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    /// Sign in to an existing account.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    /// Sign the current identity out.
    async fn sign_out(&self);

    /// Watchable stream of the current identity; `None` when signed out.
    fn identity_changes(&self) -> watch::Receiver<Option<AuthUser>>;
}

struct Account {
    id: String,
    email: String,
    password_hash: [u8; 32],
    password_salt: [u8; 32],
}

/// In-process auth gateway. One instance models one device's auth session:
/// the current identity is per-instance state, the account table is shared
/// between clones.
#[derive(Clone)]
pub struct MemoryAuth {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
    identity: Arc<watch::Sender<Option<AuthUser>>>,
}

impl MemoryAuth {
    pub fn new() -> Self {
        let (identity, _) = watch::channel(None);
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
            identity: Arc::new(identity),
        }
    }
}

impl Default for MemoryAuth {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthGateway for MemoryAuth {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        if !EmailAddress::is_valid(email) {
            return Err(AuthError::InvalidEmail);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword {
                minimum: MIN_PASSWORD_LEN,
            });
        }

        let key = email.to_lowercase();
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&key) {
            return Err(AuthError::EmailTaken);
        }

        let password_salt: [u8; 32] = rand::random();
        let password_hash = hash_password(password, &password_salt)?;
        let account = Account {
            id: generate_doc_id(),
            email: email.to_owned(),
            password_hash,
            password_salt,
        };
        let user = AuthUser {
            id: account.id.clone(),
            email: account.email.clone(),
        };
        accounts.insert(key, account);
        drop(accounts);

        log::debug!("auth: registered {}", user.email);
        let _ = self.identity.send(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let key = email.to_lowercase();
        let accounts = self.accounts.read().await;
        let account = accounts.get(&key).ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(password, &account.password_hash, &account.password_salt)? {
            return Err(AuthError::InvalidCredentials);
        }
        let user = AuthUser {
            id: account.id.clone(),
            email: account.email.clone(),
        };
        drop(accounts);

        let _ = self.identity.send(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) {
        let _ = self.identity.send(None);
    }

    fn identity_changes(&self) -> watch::Receiver<Option<AuthUser>> {
        self.identity.subscribe()
    }
}

/// Hash a password with Argon2id using the provided salt.
fn hash_password(password: &str, salt: &[u8]) -> Result<[u8; 32], AuthError> {
    let mut hash = [0u8; 32];
    Argon2::default()
        .hash_password_into(password.as_bytes(), salt, &mut hash)
        .map_err(|err| AuthError::Hash {
            message: err.to_string(),
        })?;
    Ok(hash)
}

/// Verify a password against a stored hash and salt.
fn verify_password(password: &str, stored_hash: &[u8; 32], salt: &[u8]) -> Result<bool, AuthError> {
    let computed = hash_password(password, salt)?;
    Ok(computed == *stored_hash)
}
