use std::borrow::Cow;

use thiserror::Error;

/// Top-level error type returned by document-store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Validation failed for one or more fields.
    #[error("validation failed")]
    Validation(#[from] ValidationError),

    /// Target document was not found when performing a mutation or lookup.
    #[error("document not found")]
    NotFound { doc_id: Option<String> },

    /// Invalid input supplied to a store operation.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// Underlying Redis command failed.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A document could not be encoded or decoded.
    #[error("codec error: {message}")]
    Codec { message: String },

    /// Anything that does not fit the variants above.
    #[error("{message}")]
    Other { message: Cow<'static, str> },
}

impl StoreError {
    pub(crate) fn codec(err: impl std::fmt::Display) -> Self {
        Self::Codec {
            message: err.to_string(),
        }
    }
}

/// Errors surfaced by the auth gateway and session store.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The supplied email address is not syntactically valid.
    #[error("invalid email address")]
    InvalidEmail,

    /// An account already exists for this email address.
    #[error("email already in use")]
    EmailTaken,

    /// Password does not meet the minimum length requirement.
    #[error("password must be at least {minimum} characters")]
    WeakPassword { minimum: usize },

    /// Unknown email or wrong password. Deliberately does not say which.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password hashing failed.
    #[error("password hashing failed: {message}")]
    Hash { message: String },

    /// Validation failed for one or more fields (e.g. empty display name).
    #[error("validation failed")]
    Validation(#[from] ValidationError),

    /// A store operation performed on behalf of the session failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Collection of validation issues encountered while preparing a mutation.
#[derive(Debug, Error)]
#[error("validation errors: {issues:?}")]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn new<I>(issues: I) -> Self
    where
        I: IntoIterator<Item = ValidationIssue>,
    {
        Self {
            issues: issues.into_iter().collect(),
        }
    }

    /// Convenience helper for constructing a single-field validation error.
    pub fn single(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new([ValidationIssue::new(field, code, message)])
    }
}

/// Detailed validation failure for a single field.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}
