use std::time::Duration;

use super::support::*;
use warren::{FeedView, Post, Query, SortOrder, StoreError};

#[tokio::test]
async fn subscribing_delivers_the_current_set_immediately() {
    let (store, _backend) = test_store();
    let alice = seed_profile(&store, "alice", "alice").await;
    actions::create_post(&store, &alice, "already here", None).await.expect("post");

    let feed = FeedView::subscribe(&store, "viewer").await.expect("subscribe");
    let current = feed.current();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].post.content, "already here");
}

#[tokio::test]
async fn raw_watch_delivers_after_every_write() {
    let (store, _backend) = test_store();
    let alice = seed_profile(&store, "alice", "alice").await;

    let query = Query::collection("posts").order_by("created_at", SortOrder::Desc);
    let mut live = store.watch_raw(query).await.expect("watch");
    assert!(live.snapshot().is_empty());

    actions::create_post(&store, &alice, "one", None).await.expect("post");
    let first = live.changed().await.expect("delivery");
    assert_eq!(first.len(), 1);

    actions::create_post(&store, &alice, "two", None).await.expect("post");
    let second = live.changed().await.expect("delivery");
    assert_eq!(second.len(), 2);
    assert_eq!(second[0]["content"], "two");
}

#[tokio::test]
async fn dropping_a_view_tears_its_watcher_down() {
    let (store, backend) = test_store();

    let feed = FeedView::subscribe(&store, "viewer").await.expect("subscribe");
    assert_eq!(backend.watcher_count(), 1);

    feed.cancel();
    // Abort is asynchronous; poll until the watcher is gone.
    for _ in 0..100 {
        if backend.watcher_count() == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(backend.watcher_count(), 0);
}

#[tokio::test]
async fn server_timestamps_strictly_increase_across_writes() {
    let (store, _backend) = test_store();
    let alice = seed_profile(&store, "alice", "alice").await;

    for n in 0..5 {
        actions::create_post(&store, &alice, &format!("post {n}"), None)
            .await
            .expect("post");
    }

    let posts = store
        .collection::<Post>()
        .find_many(Query::collection("posts").order_by("created_at", SortOrder::Asc))
        .await
        .expect("query");
    assert_eq!(posts.len(), 5);
    for pair in posts.windows(2) {
        assert!(pair[0].created_at < pair[1].created_at);
    }
}

#[tokio::test]
async fn updating_a_missing_document_is_not_found() {
    let (store, _backend) = test_store();
    let result = actions::toggle_like(&store, "viewer", "no-such-post", false).await;
    assert!(matches!(result, Err(StoreError::NotFound { .. })));
}
