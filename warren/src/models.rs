//! Document models for the four backing collections. Array and counter
//! fields default when absent so partially written or legacy documents
//! still deserialize.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Record;

/// A registered user's public profile (`users` collection). The document id
/// equals the auth identity id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub bio: String,
    /// Ids of users following this profile.
    #[serde(default)]
    pub followers: Vec<String>,
    /// Ids of users this profile follows.
    #[serde(default)]
    pub following: Vec<String>,
    #[serde(default)]
    pub posts_count: i64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Record for UserProfile {
    const COLLECTION: &'static str = "users";

    fn record_id(&self) -> &str {
        &self.id
    }
}

/// An optional dated reminder attached to a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub title: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
}

/// A post (`posts` collection). Posts are never edited or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub author_id: String,
    /// Author display name snapshotted at creation time.
    pub author_username: String,
    pub content: String,
    /// Ids of users who liked this post.
    #[serde(default)]
    pub likes: Vec<String>,
    /// Embedded comment list. Written empty and never appended to; real
    /// comments live in the `comments` collection.
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder: Option<Reminder>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Record for Post {
    const COLLECTION: &'static str = "posts";

    fn record_id(&self) -> &str {
        &self.id
    }
}

/// A comment on a post (`comments` collection). Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    pub author_username: String,
    pub content: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Record for Comment {
    const COLLECTION: &'static str = "comments";

    fn record_id(&self) -> &str {
        &self.id
    }
}

/// A direct message between two users (`messages` collection). Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectMessage {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    /// Sender display name snapshotted at send time.
    pub sender_username: String,
    pub content: String,
    /// Both party ids, kept denormalized so "messages involving user X"
    /// is a single array-contains query.
    pub participants: Vec<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Record for DirectMessage {
    const COLLECTION: &'static str = "messages";

    fn record_id(&self) -> &str {
        &self.id
    }
}
