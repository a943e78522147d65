//! External lookup capabilities used by the title resolver
//!
//! The resolver only sees these traits, so tests can substitute fakes and the
//! HTTP clients stay replaceable:
//! - [`IdTranslator`]: AniList id → MyAnimeList id
//! - [`TitleCatalog`]: title search and episode listing keyed by MyAnimeList id

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the external catalog clients
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure (connect, timeout, body read)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status or service-reported error
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    /// Response body did not have the expected shape
    #[error("Unexpected response shape: {0}")]
    ResponseShape(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::ResponseShape(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

/// Candidate returned by a title search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogMatch {
    /// MyAnimeList id
    pub mal_id: i64,
    pub title: Option<String>,
}

/// One entry of an ordered episode listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEpisode {
    /// Episode number as reported by the service, if any
    pub number: Option<i64>,
    pub title: Option<String>,
}

/// Translates an AniList id into a MyAnimeList id
#[async_trait]
pub trait IdTranslator: Send + Sync {
    /// `Ok(None)` when the service knows the show but has no MyAnimeList id for it
    async fn translate(&self, anilist_id: i64) -> Result<Option<i64>, ClientError>;

    /// Service name for logging
    fn name(&self) -> &'static str;
}

/// Title search and episode listing keyed by MyAnimeList id
#[async_trait]
pub trait TitleCatalog: Send + Sync {
    /// Ordered candidates for a free-text title; first match is the best
    async fn search(&self, title: &str) -> Result<Vec<CatalogMatch>, ClientError>;

    /// Ordered episode list; list order defines episode position
    async fn episodes(&self, mal_id: i64) -> Result<Vec<CatalogEpisode>, ClientError>;

    /// Service name for logging
    fn name(&self) -> &'static str;
}
