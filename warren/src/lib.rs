//! Warren: a headless client core for a small social network.
//!
//! Posts, likes, comments, follows, direct messages, and profile editing,
//! backed by a pluggable document store with live queries. The crate has no
//! UI; each screen of the application is a view model that subscribes to a
//! live query and projects the record stream into UI-ready state:
//!
//! - [`Session`] tracks the authenticated identity and its profile.
//! - [`views::FeedView`], [`views::DiscoveryView`], [`views::CommentsView`],
//!   and [`views::MessagesView`] are the per-screen view models.
//! - [`actions`] holds the fire-and-forget mutations (create post, toggle
//!   like/follow, send message, edit bio).
//! - [`store::MemoryBackend`] is the in-process backend for tests and
//!   demos; [`store::RedisBackend`] stores documents in RedisJSON with
//!   pub/sub-driven live queries.
//!
//! View-model state is derived exclusively from live-query deliveries:
//! actions never patch local state, so the store remains the single source
//! of truth.

pub mod actions;
pub mod auth;
pub mod config;
pub mod errors;
pub mod filters;
pub mod id;
pub mod keys;
pub mod models;
pub mod session;
pub mod store;
pub mod types;
pub mod views;

pub use auth::{AuthGateway, AuthUser, MemoryAuth};
pub use config::Config;
pub use errors::{AuthError, StoreError, ValidationError, ValidationIssue};
pub use models::{Comment, DirectMessage, Post, Reminder, UserProfile};
pub use session::Session;
pub use store::{
    Collection, DocumentStore, Live, LiveQuery, Store, WatchGuard, memory::MemoryBackend,
    redis_store::RedisBackend,
};
pub use types::{DocPayload, FieldOp, FieldOps, FilterCondition, OrderBy, Query, Record, SortOrder, WriteValue};
pub use views::{
    CommentsView, Conversation, DiscoveredUser, DiscoveryView, FeedPost, FeedView, MessagesView,
    relative_time,
};
