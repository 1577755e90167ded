//! Feed view model: all posts, newest first, with per-viewer like state.

use crate::{
    errors::StoreError,
    models::Post,
    store::{Live, Store},
    types::SortOrder,
};

/// A post joined with the viewing user's relationship to it.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedPost {
    pub post: Post,
    pub liked_by_viewer: bool,
    pub likes_count: usize,
    pub comments_count: usize,
}

/// Project raw posts into feed entries for the given viewer. Counts come
/// from the document's own collections and default to zero when those are
/// absent (the models deserialize missing arrays as empty).
pub fn project_posts(viewer_id: &str, posts: Vec<Post>) -> Vec<FeedPost> {
    posts
        .into_iter()
        .map(|post| FeedPost {
            liked_by_viewer: post.likes.iter().any(|id| id == viewer_id),
            likes_count: post.likes.len(),
            comments_count: post.comments.len(),
            post,
        })
        .collect()
}

pub struct FeedView {
    viewer_id: String,
    live: Live<Post>,
}

impl FeedView {
    pub async fn subscribe(store: &Store, viewer_id: &str) -> Result<Self, StoreError> {
        let posts = store.collection::<Post>();
        let live = posts
            .watch(posts.query().order_by("created_at", SortOrder::Desc))
            .await?;
        Ok(Self {
            viewer_id: viewer_id.to_owned(),
            live,
        })
    }

    /// The most recently delivered feed.
    pub fn current(&self) -> Vec<FeedPost> {
        project_posts(&self.viewer_id, self.live.snapshot())
    }

    /// Wait for the next delivery and return the re-projected feed.
    pub async fn changed(&mut self) -> Option<Vec<FeedPost>> {
        let posts = self.live.changed().await?;
        Some(project_posts(&self.viewer_id, posts))
    }

    pub fn cancel(self) {}
}
