//! Messages view model and the chat-list aggregation it is built on.
//!
//! The aggregation folds the viewer's flat direct-message stream into one
//! conversation per counterpart, keeping only the latest message. Ordering
//! contract: a stored message is replaced iff the candidate is strictly
//! newer, or equally old with a smaller id; conversations are returned
//! newest first, tie-broken by counterpart id. Both rules make the output
//! deterministic for any input order.

use std::collections::{HashMap, hash_map::Entry};

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::{
    errors::StoreError,
    models::{DirectMessage, UserProfile},
    store::{Live, Store},
};

/// One entry of the chat list: the counterpart plus the latest message
/// exchanged with them. Derived state; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub counterpart_id: String,
    pub counterpart_username: String,
    pub last_message_id: String,
    pub last_content: String,
    pub last_at: DateTime<Utc>,
}

/// Fold messages down to the latest one per counterpart, from the viewer's
/// perspective. Messages the viewer is not a party to are skipped. The
/// result is ordered newest first, counterpart id ascending on ties.
pub fn latest_per_counterpart<'a>(
    viewer_id: &str,
    messages: &'a [DirectMessage],
) -> Vec<(&'a str, &'a DirectMessage)> {
    let mut latest: HashMap<&str, &DirectMessage> = HashMap::new();
    for message in messages {
        let counterpart = if message.sender_id == viewer_id {
            message.receiver_id.as_str()
        } else if message.receiver_id == viewer_id {
            message.sender_id.as_str()
        } else {
            continue;
        };
        match latest.entry(counterpart) {
            Entry::Occupied(mut entry) => {
                if supersedes(message, entry.get()) {
                    entry.insert(message);
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(message);
            }
        }
    }

    let mut entries: Vec<(&str, &DirectMessage)> = latest.into_iter().collect();
    entries.sort_by(|(id_a, msg_a), (id_b, msg_b)| {
        msg_b
            .created_at
            .cmp(&msg_a.created_at)
            .then_with(|| id_a.cmp(id_b))
    });
    entries
}

/// Replacement rule for the stored latest message: strictly newer wins; on
/// equal timestamps the smaller message id wins.
fn supersedes(candidate: &DirectMessage, current: &DirectMessage) -> bool {
    candidate.created_at > current.created_at
        || (candidate.created_at == current.created_at && candidate.id < current.id)
}

/// Live chat list for one viewer.
///
/// Counterpart display names come from a secondary lookup against the
/// profile collection, cached per counterpart. A counterpart whose profile
/// is missing or unreadable is skipped rather than failing the whole list.
pub struct MessagesView {
    viewer_id: String,
    store: Store,
    live: Live<DirectMessage>,
    usernames: HashMap<String, String>,
}

impl MessagesView {
    pub async fn subscribe(store: &Store, viewer_id: &str) -> Result<Self, StoreError> {
        let messages = store.collection::<DirectMessage>();
        let live = messages
            .watch(messages.query().filter_array_contains("participants", json!(viewer_id)))
            .await?;
        Ok(Self {
            viewer_id: viewer_id.to_owned(),
            store: store.clone(),
            live,
            usernames: HashMap::new(),
        })
    }

    /// The chat list derived from the most recent delivery.
    pub async fn conversations(&mut self) -> Vec<Conversation> {
        let messages = self.live.snapshot();
        self.project(&messages).await
    }

    /// Wait for the next delivery and return the re-derived chat list.
    pub async fn changed(&mut self) -> Option<Vec<Conversation>> {
        let messages = self.live.changed().await?;
        Some(self.project(&messages).await)
    }

    pub fn cancel(self) {}

    async fn project(&mut self, messages: &[DirectMessage]) -> Vec<Conversation> {
        let mut conversations = Vec::new();
        for (counterpart_id, message) in latest_per_counterpart(&self.viewer_id, messages) {
            let Some(counterpart_username) = self.username_for(counterpart_id).await else {
                continue;
            };
            conversations.push(Conversation {
                counterpart_id: counterpart_id.to_owned(),
                counterpart_username,
                last_message_id: message.id.clone(),
                last_content: message.content.clone(),
                last_at: message.created_at,
            });
        }
        conversations
    }

    async fn username_for(&mut self, user_id: &str) -> Option<String> {
        if let Some(username) = self.usernames.get(user_id) {
            return Some(username.clone());
        }
        match self.store.collection::<UserProfile>().get(user_id).await {
            Ok(Some(profile)) => {
                self.usernames.insert(user_id.to_owned(), profile.username.clone());
                Some(profile.username)
            }
            Ok(None) => {
                log::debug!("skipping conversation with unknown user {user_id}");
                None
            }
            Err(err) => {
                log::warn!("profile lookup for {user_id} failed: {err}");
                None
            }
        }
    }
}
