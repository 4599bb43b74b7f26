use crate::{PostId, responses};
use reqwest::StatusCode;

type ReqwestResult = Result<reqwest::Response, reqwest::Error>;

/// An API client for the posts/users JSON backend.
#[derive(Debug, Clone)]
pub struct APIClient {
    pub address: String,
    pub inner_client: reqwest::Client,
}

/// Helper methods for http actions
impl APIClient {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into().trim_end_matches('/').to_string(),
            inner_client: reqwest::Client::new(),
        }
    }

    fn format_url(&self, path: &str) -> String {
        format!("{}/{path}", &self.address)
    }

    fn format_limited_url(&self, path: &str, limit: Option<usize>) -> String {
        match limit {
            Some(limit) => format!("{}?_limit={limit}", self.format_url(path)),
            None => self.format_url(path),
        }
    }

    async fn empty_get(&self, url: String) -> ReqwestResult {
        self.inner_client.get(url).send().await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
    ) -> Result<T, ClientError> {
        let response = self.empty_get(url).await?;
        ok_body(response).await
    }
}

/// Methods on the backend API
impl APIClient {
    /// URL of the post listing, optionally limited to the first `limit`.
    ///
    /// Also what a polling fetcher should be pointed at.
    pub fn posts_url(&self, limit: Option<usize>) -> String {
        self.format_limited_url("posts", limit)
    }

    pub fn post_url(&self, post_id: &PostId) -> String {
        self.format_url(&format!("posts/{post_id}"))
    }

    pub fn users_url(&self, limit: Option<usize>) -> String {
        self.format_limited_url("users", limit)
    }

    pub async fn get_posts(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<responses::Post>, ClientError> {
        self.get_json(self.posts_url(limit))
            .await
            .inspect_err(|e| tracing::error!("Error fetching posts: {e}"))
    }

    pub async fn get_post(
        &self,
        post_id: &PostId,
    ) -> Result<responses::Post, ClientError> {
        self.get_json(self.post_url(post_id)).await.inspect_err(|e| {
            tracing::error!("Error fetching post with id {post_id}: {e}")
        })
    }

    pub async fn get_users(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<responses::User>, ClientError> {
        self.get_json(self.users_url(limit))
            .await
            .inspect_err(|e| tracing::error!("Error fetching users: {e}"))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// An unhandled API error to display, containing response text.
    #[error("{1}")]
    APIError(StatusCode, String),
    #[error("Network error. Please check your connection.")]
    Network(#[from] reqwest::Error),
}

/// Deserialize a successful request into the desired type, or return an
/// appropriate error.
pub async fn ok_body<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    if !response.status().is_success() {
        return Err(ClientError::APIError(
            response.status(),
            response.text().await?,
        ));
    }
    Ok(response.json::<T>().await?)
}
