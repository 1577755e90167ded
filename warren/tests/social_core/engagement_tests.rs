use super::support::*;
use warren::{CommentsView, FeedView, Post, StoreError};

#[tokio::test]
async fn like_toggled_twice_restores_membership() {
    let (store, _backend) = test_store();
    let alice = seed_profile(&store, "alice", "alice").await;
    seed_profile(&store, "bob", "bob").await;

    let post_id = actions::create_post(&store, &alice, "hello world", None)
        .await
        .expect("create post");

    actions::toggle_like(&store, "bob", &post_id, false).await.expect("like");
    let post = store.collection::<Post>().get_or_error(&post_id).await.expect("post");
    assert_eq!(post.likes, vec!["bob".to_string()]);

    actions::toggle_like(&store, "bob", &post_id, true).await.expect("unlike");
    let post = store.collection::<Post>().get_or_error(&post_id).await.expect("post");
    assert!(post.likes.is_empty());
}

#[tokio::test]
async fn liking_twice_never_duplicates() {
    let (store, _backend) = test_store();
    let alice = seed_profile(&store, "alice", "alice").await;

    let post_id = actions::create_post(&store, &alice, "idempotent", None)
        .await
        .expect("create post");

    // Two devices racing the same "like" both issue a union.
    actions::toggle_like(&store, "bob", &post_id, false).await.expect("like");
    actions::toggle_like(&store, "bob", &post_id, false).await.expect("like again");

    let post = store.collection::<Post>().get_or_error(&post_id).await.expect("post");
    assert_eq!(post.likes, vec!["bob".to_string()]);
}

#[tokio::test]
async fn create_post_validates_content() {
    let (store, _backend) = test_store();
    let alice = seed_profile(&store, "alice", "alice").await;

    let empty = actions::create_post(&store, &alice, "   ", None).await;
    assert!(matches!(empty, Err(StoreError::Validation(_))));

    let oversized = "x".repeat(501);
    let too_long = actions::create_post(&store, &alice, &oversized, None).await;
    assert!(matches!(too_long, Err(StoreError::Validation(_))));

    let exactly_max = "x".repeat(500);
    actions::create_post(&store, &alice, &exactly_max, None)
        .await
        .expect("500 chars is allowed");
}

#[tokio::test]
async fn create_post_snapshots_author_and_bumps_counter() {
    let (store, _backend) = test_store();
    let alice = seed_profile(&store, "alice", "alice").await;

    let post_id = actions::create_post(&store, &alice, "  first!  ", None)
        .await
        .expect("create post");

    let post = store.collection::<Post>().get_or_error(&post_id).await.expect("post");
    assert_eq!(post.content, "first!");
    assert_eq!(post.author_id, "alice");
    assert_eq!(post.author_username, "alice");
    assert!(post.likes.is_empty());
    assert!(post.comments.is_empty());

    let alice = reload_profile(&store, "alice").await;
    assert_eq!(alice.posts_count, 1);
}

#[tokio::test]
async fn feed_reflects_likes_through_the_live_query() {
    let (store, _backend) = test_store();
    let alice = seed_profile(&store, "alice", "alice").await;
    seed_profile(&store, "bob", "bob").await;

    let post_id = actions::create_post(&store, &alice, "like me", None)
        .await
        .expect("create post");

    let mut feed = FeedView::subscribe(&store, "bob").await.expect("subscribe");
    let initial = feed.current();
    assert_eq!(initial.len(), 1);
    assert!(!initial[0].liked_by_viewer);

    actions::toggle_like(&store, "bob", &post_id, false).await.expect("like");
    let updated = feed.changed().await.expect("delivery");
    assert!(updated[0].liked_by_viewer);
    assert_eq!(updated[0].likes_count, 1);
}

#[tokio::test]
async fn comments_thread_is_live_and_newest_first() {
    let (store, _backend) = test_store();
    let alice = seed_profile(&store, "alice", "alice").await;
    let bob = seed_profile(&store, "bob", "bob").await;

    let post_id = actions::create_post(&store, &alice, "discuss", None)
        .await
        .expect("create post");

    let mut thread = CommentsView::subscribe(&store, &post_id).await.expect("subscribe");
    assert!(thread.current().is_empty());

    actions::add_comment(&store, &bob, &post_id, "great post").await.expect("comment");
    let after_first = thread.changed().await.expect("delivery");
    assert_eq!(after_first.len(), 1);

    actions::add_comment(&store, &alice, &post_id, "thanks!").await.expect("comment");
    let after_second = thread.changed().await.expect("delivery");
    assert_eq!(after_second.len(), 2);
    assert_eq!(after_second[0].content, "thanks!");
    assert_eq!(after_second[1].content, "great post");
    assert_eq!(after_second[1].author_username, "bob");

    // The embedded list on the post stays the always-empty placeholder, so
    // the feed's comment counter does not move.
    let feed = FeedView::subscribe(&store, "bob").await.expect("subscribe");
    assert_eq!(feed.current()[0].comments_count, 0);
}

#[tokio::test]
async fn empty_comments_are_rejected() {
    let (store, _backend) = test_store();
    let alice = seed_profile(&store, "alice", "alice").await;
    let post_id = actions::create_post(&store, &alice, "quiet", None)
        .await
        .expect("create post");

    let result = actions::add_comment(&store, &alice, &post_id, "  ").await;
    assert!(matches!(result, Err(StoreError::Validation(_))));
}
