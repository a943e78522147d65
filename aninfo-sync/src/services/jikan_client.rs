//! Jikan (unofficial MyAnimeList) API client
//!
//! Title search and episode listing. Requests are paced with a token bucket at
//! the public Jikan quota; episode listings are followed across pages.

use crate::types::{CatalogEpisode, CatalogMatch, ClientError, TitleCatalog};
use aninfo_common::config::HttpConfig;
use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct JikanList<T> {
    data: Option<Vec<T>>,
    pagination: Option<JikanPagination>,
}

#[derive(Debug, Deserialize)]
struct JikanPagination {
    #[serde(default)]
    has_next_page: bool,
}

#[derive(Debug, Deserialize)]
struct JikanAnime {
    mal_id: i64,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JikanEpisode {
    mal_id: Option<i64>,
    title: Option<String>,
}

/// Jikan API client
pub struct JikanClient {
    http_client: reqwest::Client,
    base_url: String,
    max_episode_pages: u32,
    rate_limiter: RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl JikanClient {
    /// Create a client against `base_url` (e.g. `https://api.jikan.moe/v4`)
    pub fn new(
        base_url: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
        requests_per_second: u32,
        max_episode_pages: u32,
    ) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let per_second = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_episode_pages: max_episode_pages.max(1),
            rate_limiter: RateLimiter::direct(Quota::per_second(per_second)),
        })
    }

    pub fn from_config(http: &HttpConfig) -> Result<Self, ClientError> {
        Self::new(
            http.jikan_url.clone(),
            &http.user_agent,
            http.timeout(),
            http.jikan_requests_per_second,
            http.jikan_max_episode_pages,
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, ?query, "Querying Jikan");

        let response = self.http_client.get(&url).query(query).send().await?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(ClientError::NotFound(url));
        }
        if status.as_u16() == 429 {
            return Err(ClientError::RateLimited);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::ResponseShape(e.to_string()))
    }

    /// Search anime by title; results in Jikan's relevance order
    pub async fn search_anime(&self, title: &str) -> Result<Vec<CatalogMatch>, ClientError> {
        let body: JikanList<JikanAnime> = self
            .get_json("/anime", &[("q", title.to_string())])
            .await?;

        let data = body
            .data
            .ok_or_else(|| ClientError::ResponseShape("search response missing `data`".to_string()))?;

        Ok(data
            .into_iter()
            .map(|anime| CatalogMatch {
                mal_id: anime.mal_id,
                title: anime.title,
            })
            .collect())
    }

    /// Fetch the complete episode list, following pagination up to the page cap
    pub async fn list_episodes(&self, mal_id: i64) -> Result<Vec<CatalogEpisode>, ClientError> {
        let path = format!("/anime/{}/episodes", mal_id);
        let mut episodes = Vec::new();
        let mut page: u32 = 1;

        loop {
            let body: JikanList<JikanEpisode> =
                self.get_json(&path, &[("page", page.to_string())]).await?;

            let data = body.data.ok_or_else(|| {
                ClientError::ResponseShape("episode response missing `data`".to_string())
            })?;
            episodes.extend(data.into_iter().map(|ep| CatalogEpisode {
                number: ep.mal_id,
                title: ep.title,
            }));

            let has_next = body.pagination.map(|p| p.has_next_page).unwrap_or(false);
            if !has_next {
                break;
            }
            if page >= self.max_episode_pages {
                tracing::warn!(
                    mal_id,
                    pages = page,
                    "Episode listing truncated at page cap"
                );
                break;
            }
            page += 1;
        }

        tracing::info!(mal_id, count = episodes.len(), "Retrieved episode list from Jikan");
        Ok(episodes)
    }
}

#[async_trait]
impl TitleCatalog for JikanClient {
    async fn search(&self, title: &str) -> Result<Vec<CatalogMatch>, ClientError> {
        self.search_anime(title).await
    }

    async fn episodes(&self, mal_id: i64) -> Result<Vec<CatalogEpisode>, ClientError> {
        self.list_episodes(mal_id).await
    }

    fn name(&self) -> &'static str {
        "Jikan"
    }
}
