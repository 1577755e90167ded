//! Mutation actions: thin, fire-and-forget writes against the store.
//!
//! Callers never patch view state from an action's result; the owning live
//! query reports the change. Validation is limited to presence and length
//! checks. Like/follow use the store's idempotent array operations so
//! concurrent toggles from several devices converge instead of duplicating.

use serde_json::json;

use crate::{
    errors::{StoreError, ValidationError},
    models::{Comment, DirectMessage, Post, Reminder, UserProfile},
    store::Store,
    types::{DocPayload, FieldOp},
};

/// Maximum post body length in characters, after trimming.
pub const MAX_POST_LEN: usize = 500;

/// Maximum bio length in characters, after trimming.
pub const MAX_BIO_LEN: usize = 150;

/// Opening message sent when starting a chat from discovery.
const CHAT_GREETING: &str = "Hi! I'd like to connect with you.";

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(ValidationError::single(
            field,
            "validation.required",
            format!("{field} is required"),
        ))
    } else {
        Ok(())
    }
}

fn bounded(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        Err(ValidationError::single(
            field,
            "validation.length",
            format!("{field} must be at most {max} characters"),
        ))
    } else {
        Ok(())
    }
}

/// Create a post authored by `author`, then bump the author's post counter.
///
/// The two writes are independent: if the counter update fails the post
/// stays, the failure is logged, and the error is returned.
pub async fn create_post(
    store: &Store,
    author: &UserProfile,
    content: &str,
    reminder: Option<Reminder>,
) -> Result<String, StoreError> {
    let content = content.trim();
    require("content", content)?;
    bounded("content", content, MAX_POST_LEN)?;

    let mut payload = DocPayload::new()
        .set("content", json!(content))
        .set("author_id", json!(author.id))
        .set("author_username", json!(author.username))
        .set("likes", json!([]))
        .set("comments", json!([]))
        .server_time("created_at");
    if let Some(reminder) = reminder {
        payload = payload.set("reminder", serde_json::to_value(&reminder).map_err(StoreError::codec)?);
    }
    let post_id = store.collection::<Post>().create(payload).await?;

    let counter = store
        .collection::<UserProfile>()
        .update(&author.id, vec![("posts_count".to_owned(), FieldOp::Increment(1))])
        .await;
    if let Err(err) = counter {
        log::warn!("post {post_id} created but posts_count update for {} failed: {err}", author.id);
        return Err(err);
    }
    Ok(post_id)
}

/// Like or unlike a post, depending on the viewer's current state.
pub async fn toggle_like(
    store: &Store,
    viewer_id: &str,
    post_id: &str,
    currently_liked: bool,
) -> Result<(), StoreError> {
    let op = if currently_liked {
        FieldOp::ArrayRemove(json!(viewer_id))
    } else {
        FieldOp::ArrayUnion(json!(viewer_id))
    };
    store
        .collection::<Post>()
        .update(post_id, vec![("likes".to_owned(), op)])
        .await
}

/// Follow or unfollow `target_id`, depending on the actor's current state.
///
/// Two independent record updates with no atomicity: the target's follower
/// set first, then the actor's following set. A failure of the second leg
/// leaves the relation asymmetric; it is logged and returned, never
/// swallowed.
pub async fn toggle_follow(
    store: &Store,
    actor_id: &str,
    target_id: &str,
    currently_following: bool,
) -> Result<(), StoreError> {
    let (target_op, actor_op) = if currently_following {
        (
            FieldOp::ArrayRemove(json!(actor_id)),
            FieldOp::ArrayRemove(json!(target_id)),
        )
    } else {
        (
            FieldOp::ArrayUnion(json!(actor_id)),
            FieldOp::ArrayUnion(json!(target_id)),
        )
    };

    let profiles = store.collection::<UserProfile>();
    profiles
        .update(target_id, vec![("followers".to_owned(), target_op)])
        .await?;
    if let Err(err) = profiles
        .update(actor_id, vec![("following".to_owned(), actor_op)])
        .await
    {
        log::warn!("follow toggle left {actor_id} -> {target_id} asymmetric: {err}");
        return Err(err);
    }
    Ok(())
}

/// Send a direct message from `sender` to `receiver_id`.
pub async fn send_message(
    store: &Store,
    sender: &UserProfile,
    receiver_id: &str,
    content: &str,
) -> Result<String, StoreError> {
    let content = content.trim();
    require("content", content)?;

    store
        .collection::<DirectMessage>()
        .create(
            DocPayload::new()
                .set("sender_id", json!(sender.id))
                .set("receiver_id", json!(receiver_id))
                .set("sender_username", json!(sender.username))
                .set("content", json!(content))
                .set("participants", json!([sender.id, receiver_id]))
                .server_time("created_at"),
        )
        .await
}

/// Open a conversation from discovery by sending the canned greeting.
pub async fn start_chat(store: &Store, sender: &UserProfile, receiver_id: &str) -> Result<String, StoreError> {
    send_message(store, sender, receiver_id, CHAT_GREETING).await
}

/// Append a comment to a post's thread.
pub async fn add_comment(
    store: &Store,
    author: &UserProfile,
    post_id: &str,
    content: &str,
) -> Result<String, StoreError> {
    let content = content.trim();
    require("content", content)?;

    store
        .collection::<Comment>()
        .create(
            DocPayload::new()
                .set("post_id", json!(post_id))
                .set("author_id", json!(author.id))
                .set("author_username", json!(author.username))
                .set("content", json!(content))
                .server_time("created_at"),
        )
        .await
}

/// Replace the user's bio. An empty bio is allowed (it clears the field).
pub async fn update_bio(store: &Store, user_id: &str, bio: &str) -> Result<(), StoreError> {
    let bio = bio.trim();
    bounded("bio", bio, MAX_BIO_LEN)?;

    store
        .collection::<UserProfile>()
        .update(user_id, vec![("bio".to_owned(), FieldOp::Set(json!(bio)))])
        .await
}
