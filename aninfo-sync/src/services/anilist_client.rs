//! AniList GraphQL client
//!
//! Translates an AniList media id into its MyAnimeList id. AniList enforces a
//! tight per-minute quota; pacing is the caller's job (see the title resolver's
//! translation cooldown), this client never retries.

use crate::types::{ClientError, IdTranslator};
use aninfo_common::config::HttpConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const MAL_ID_QUERY: &str = "query($id: Int){Media(id: $id){idMal}}";

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: MediaVariables,
}

#[derive(Debug, Serialize)]
struct MediaVariables {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<MediaData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct MediaData {
    #[serde(rename = "Media")]
    media: Option<MediaIds>,
}

#[derive(Debug, Deserialize)]
struct MediaIds {
    #[serde(rename = "idMal")]
    id_mal: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
    status: Option<u16>,
}

/// AniList API client
pub struct AniListClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl AniListClient {
    pub fn new(
        endpoint: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(http: &HttpConfig) -> Result<Self, ClientError> {
        Self::new(http.anilist_url.clone(), &http.user_agent, http.timeout())
    }

    /// Look up the MyAnimeList id for an AniList media id
    ///
    /// `Ok(None)` when AniList has the media but no `idMal` for it.
    pub async fn lookup_mal_id(&self, anilist_id: i64) -> Result<Option<i64>, ClientError> {
        let request = GraphQlRequest {
            query: MAL_ID_QUERY,
            variables: MediaVariables { id: anilist_id },
        };

        tracing::debug!(anilist_id, endpoint = %self.endpoint, "Querying AniList");

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let parsed: Option<GraphQlResponse> = serde_json::from_str(&body).ok();

        if let Some(first) = parsed.as_ref().and_then(|p| p.errors.first()) {
            let code = first.status.unwrap_or(status.as_u16());
            return Err(match code {
                404 => ClientError::NotFound(format!("AniList media {}", anilist_id)),
                429 => ClientError::RateLimited,
                _ => ClientError::Api {
                    status: code,
                    message: first.message.clone(),
                },
            });
        }

        if status.as_u16() == 429 {
            return Err(ClientError::RateLimited);
        }

        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed = parsed.ok_or_else(|| {
            ClientError::ResponseShape("AniList response is not a GraphQL document".to_string())
        })?;

        let media = parsed
            .data
            .ok_or_else(|| ClientError::ResponseShape("missing `data`".to_string()))?
            .media
            .ok_or_else(|| ClientError::ResponseShape("missing `data.Media`".to_string()))?;

        tracing::info!(anilist_id, mal_id = ?media.id_mal, "AniList id translated");

        Ok(media.id_mal)
    }
}

#[async_trait]
impl IdTranslator for AniListClient {
    async fn translate(&self, anilist_id: i64) -> Result<Option<i64>, ClientError> {
        self.lookup_mal_id(anilist_id).await
    }

    fn name(&self) -> &'static str {
        "AniList"
    }
}
