//! Comments view model: the live comment thread of one post, newest first.

use serde_json::json;

use crate::{
    errors::StoreError,
    models::Comment,
    store::{Live, Store},
    types::SortOrder,
};

pub struct CommentsView {
    live: Live<Comment>,
}

impl CommentsView {
    pub async fn subscribe(store: &Store, post_id: &str) -> Result<Self, StoreError> {
        let comments = store.collection::<Comment>();
        let live = comments
            .watch(
                comments
                    .query()
                    .filter_eq("post_id", json!(post_id))
                    .order_by("created_at", SortOrder::Desc),
            )
            .await?;
        Ok(Self { live })
    }

    pub fn current(&self) -> Vec<Comment> {
        self.live.snapshot()
    }

    pub async fn changed(&mut self) -> Option<Vec<Comment>> {
        self.live.changed().await
    }

    pub fn cancel(self) {}
}
