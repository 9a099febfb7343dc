use std::future::Future;

use crate::api::types::{Collections, Comment, Post, User};
use crate::api::{ApiClientError, FeedClient};

/// A remote source of the three feed collections.
///
/// Every call returns the full collection; the source takes no filter or
/// paging parameters.
pub trait FeedSource {
    fn posts(&self) -> impl Future<Output = Result<Vec<Post>, ApiClientError>> + Send;
    fn users(&self) -> impl Future<Output = Result<Vec<User>, ApiClientError>> + Send;
    fn comments(&self) -> impl Future<Output = Result<Vec<Comment>, ApiClientError>> + Send;
}

impl FeedSource for FeedClient {
    async fn posts(&self) -> Result<Vec<Post>, ApiClientError> {
        self.get("posts").await
    }

    async fn users(&self) -> Result<Vec<User>, ApiClientError> {
        self.get("users").await
    }

    async fn comments(&self) -> Result<Vec<Comment>, ApiClientError> {
        self.get("comments").await
    }
}

/// Fetch posts, users and comments concurrently.
///
/// All three must succeed; the first failure fails the whole fetch and no
/// partial collections are returned.
pub async fn fetch_collections<S: FeedSource + ?Sized>(
    source: &S,
) -> Result<Collections, ApiClientError> {
    let result = tokio::try_join!(source.posts(), source.users(), source.comments());

    match result {
        Ok((posts, users, comments)) => {
            tracing::info!(
                posts = posts.len(),
                users = users.len(),
                comments = comments.len(),
                "collections loaded"
            );
            Ok(Collections {
                posts,
                users,
                comments,
            })
        }
        Err(e) => {
            tracing::error!("error fetching collections: {e}");
            Err(e)
        }
    }
}
