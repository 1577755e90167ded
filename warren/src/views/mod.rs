//! Live view models: one per screen of the original application.
//!
//! Each view model owns a live query and projects the raw record stream
//! into UI-ready state. Projections are pure functions over the delivered
//! set; nothing is patched locally when a mutation completes, so the live
//! query remains the single source of truth. Dropping a view model tears
//! its subscription down.

pub mod chat;
pub mod comments;
pub mod discovery;
pub mod feed;

use chrono::{DateTime, Duration, Utc};

pub use chat::{Conversation, MessagesView, latest_per_counterpart};
pub use comments::CommentsView;
pub use discovery::{DiscoveredUser, DiscoveryView};
pub use feed::{FeedPost, FeedView};

/// Human-readable relative timestamp ("5m ago"), falling back to a plain
/// date for anything older than a week.
pub fn relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(timestamp);
    if elapsed < Duration::minutes(1) {
        "just now".to_string()
    } else if elapsed < Duration::hours(1) {
        format!("{}m ago", elapsed.num_minutes())
    } else if elapsed < Duration::days(1) {
        format!("{}h ago", elapsed.num_hours())
    } else if elapsed < Duration::days(7) {
        format!("{}d ago", elapsed.num_days())
    } else {
        timestamp.format("%b %d, %Y").to_string()
    }
}
