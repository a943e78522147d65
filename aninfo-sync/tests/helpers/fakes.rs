//! In-process fakes for the external lookup traits
//!
//! Both fakes record every call with the (possibly paused) tokio clock, so
//! tests can assert on call order and on the spacing between requests.

use aninfo_sync::{CatalogEpisode, CatalogMatch, ClientError, IdTranslator, TitleCatalog};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

/// AniList stand-in
#[derive(Default)]
pub struct FakeTranslator {
    mal_ids: HashMap<i64, i64>,
    failing: bool,
    calls: Mutex<Vec<(i64, Instant)>>,
}

impl FakeTranslator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Translator that knows the given AniList → MyAnimeList pairs
    pub fn with_ids(pairs: &[(i64, i64)]) -> Arc<Self> {
        Arc::new(Self {
            mal_ids: pairs.iter().copied().collect(),
            ..Self::default()
        })
    }

    /// Translator whose every call fails with a network error
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            failing: true,
            ..Self::default()
        })
    }

    pub fn calls(&self) -> Vec<i64> {
        self.calls.lock().unwrap().iter().map(|(id, _)| *id).collect()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }
}

#[async_trait]
impl IdTranslator for FakeTranslator {
    async fn translate(&self, anilist_id: i64) -> Result<Option<i64>, ClientError> {
        self.calls.lock().unwrap().push((anilist_id, Instant::now()));
        if self.failing {
            return Err(ClientError::Network("connection refused".to_string()));
        }
        Ok(self.mal_ids.get(&anilist_id).copied())
    }

    fn name(&self) -> &'static str {
        "FakeAniList"
    }
}

/// Jikan stand-in
#[derive(Default)]
pub struct FakeCatalog {
    search_hits: HashMap<String, Vec<i64>>,
    episode_lists: HashMap<i64, Vec<Option<String>>>,
    failing_search: bool,
    failing_episodes: bool,
    searches: Mutex<Vec<(String, Instant)>>,
    episode_requests: Mutex<Vec<i64>>,
}

impl FakeCatalog {
    pub fn builder() -> FakeCatalogBuilder {
        FakeCatalogBuilder::default()
    }

    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn searches(&self) -> Vec<String> {
        self.searches
            .lock()
            .unwrap()
            .iter()
            .map(|(q, _)| q.clone())
            .collect()
    }

    pub fn search_times(&self) -> Vec<Instant> {
        self.searches.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }

    pub fn episode_requests(&self) -> Vec<i64> {
        self.episode_requests.lock().unwrap().clone()
    }
}

#[derive(Default)]
pub struct FakeCatalogBuilder {
    catalog: FakeCatalog,
}

impl FakeCatalogBuilder {
    /// Search results (MyAnimeList ids, best first) for an exact title
    pub fn search(mut self, title: &str, mal_ids: &[i64]) -> Self {
        self.catalog
            .search_hits
            .insert(title.to_string(), mal_ids.to_vec());
        self
    }

    /// Ordered episode titles for a MyAnimeList id
    pub fn episodes(mut self, mal_id: i64, titles: &[Option<&str>]) -> Self {
        self.catalog.episode_lists.insert(
            mal_id,
            titles.iter().map(|t| t.map(str::to_string)).collect(),
        );
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.catalog.failing_search = true;
        self
    }

    pub fn failing_episodes(mut self) -> Self {
        self.catalog.failing_episodes = true;
        self
    }

    pub fn build(self) -> Arc<FakeCatalog> {
        Arc::new(self.catalog)
    }
}

#[async_trait]
impl TitleCatalog for FakeCatalog {
    async fn search(&self, title: &str) -> Result<Vec<CatalogMatch>, ClientError> {
        self.searches
            .lock()
            .unwrap()
            .push((title.to_string(), Instant::now()));
        if self.failing_search {
            return Err(ClientError::Api {
                status: 500,
                message: "internal error".to_string(),
            });
        }
        Ok(self
            .search_hits
            .get(title)
            .map(|ids| {
                ids.iter()
                    .map(|&mal_id| CatalogMatch {
                        mal_id,
                        title: Some(title.to_string()),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn episodes(&self, mal_id: i64) -> Result<Vec<CatalogEpisode>, ClientError> {
        self.episode_requests.lock().unwrap().push(mal_id);
        if self.failing_episodes {
            return Err(ClientError::RateLimited);
        }
        let titles = self
            .episode_lists
            .get(&mal_id)
            .ok_or_else(|| ClientError::NotFound(format!("anime {}", mal_id)))?;
        Ok(titles
            .iter()
            .enumerate()
            .map(|(i, title)| CatalogEpisode {
                number: Some(i as i64 + 1),
                title: title.clone(),
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "FakeJikan"
    }
}
