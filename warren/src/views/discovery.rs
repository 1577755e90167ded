//! Discovery view model: browse/search other users and all posts.
//!
//! Search happens entirely on the client over the live result sets. A
//! profile matches on username or email, a post on content, author name,
//! or reminder title.

use crate::{
    errors::StoreError,
    filters::{contains_fold, normalize_query},
    models::{Post, UserProfile},
    store::{Live, Store},
    types::SortOrder,
};

use super::feed::{FeedPost, project_posts};

/// Another user's profile joined with the viewer's follow state.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredUser {
    pub profile: UserProfile,
    pub followed_by_viewer: bool,
    pub followers_count: usize,
}

/// Project raw profiles for the given viewer, excluding the viewer's own
/// record.
pub fn project_profiles(viewer_id: &str, profiles: Vec<UserProfile>) -> Vec<DiscoveredUser> {
    profiles
        .into_iter()
        .filter(|profile| profile.id != viewer_id)
        .map(|profile| DiscoveredUser {
            followed_by_viewer: profile.followers.iter().any(|id| id == viewer_id),
            followers_count: profile.followers.len(),
            profile,
        })
        .collect()
}

/// Keep the profiles matching the query; an empty query keeps everything,
/// in the original order.
pub fn search_profiles(profiles: Vec<DiscoveredUser>, raw_query: &str) -> Vec<DiscoveredUser> {
    let Some(query) = normalize_query(raw_query) else {
        return profiles;
    };
    profiles
        .into_iter()
        .filter(|user| contains_fold(&user.profile.username, &query) || contains_fold(&user.profile.email, &query))
        .collect()
}

/// Keep the posts matching the query; an empty query keeps everything, in
/// the original order.
pub fn search_posts(posts: Vec<FeedPost>, raw_query: &str) -> Vec<FeedPost> {
    let Some(query) = normalize_query(raw_query) else {
        return posts;
    };
    posts
        .into_iter()
        .filter(|entry| {
            contains_fold(&entry.post.content, &query)
                || contains_fold(&entry.post.author_username, &query)
                || entry
                    .post
                    .reminder
                    .as_ref()
                    .is_some_and(|reminder| contains_fold(&reminder.title, &query))
        })
        .collect()
}

pub struct DiscoveryView {
    viewer_id: String,
    users: Live<UserProfile>,
    posts: Live<Post>,
}

impl DiscoveryView {
    pub async fn subscribe(store: &Store, viewer_id: &str) -> Result<Self, StoreError> {
        let profiles = store.collection::<UserProfile>();
        let posts = store.collection::<Post>();
        Ok(Self {
            viewer_id: viewer_id.to_owned(),
            users: profiles.watch(profiles.query()).await?,
            posts: posts
                .watch(posts.query().order_by("created_at", SortOrder::Desc))
                .await?,
        })
    }

    /// Current users tab content for the given search query.
    pub fn users(&self, raw_query: &str) -> Vec<DiscoveredUser> {
        search_profiles(project_profiles(&self.viewer_id, self.users.snapshot()), raw_query)
    }

    /// Current posts tab content for the given search query.
    pub fn posts(&self, raw_query: &str) -> Vec<FeedPost> {
        search_posts(project_posts(&self.viewer_id, self.posts.snapshot()), raw_query)
    }

    /// Wait until either live set delivers again. Returns `None` when the
    /// awaited subscription has gone away.
    pub async fn changed(&mut self) -> Option<()> {
        tokio::select! {
            users = self.users.changed() => users.map(|_| ()),
            posts = self.posts.changed() => posts.map(|_| ()),
        }
    }

    pub fn cancel(self) {}
}
