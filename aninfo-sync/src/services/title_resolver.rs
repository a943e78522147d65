//! Episode title resolution for a show
//!
//! Two-stage lookup:
//! 1. AniList id (from `tvshow.nfo`) → MyAnimeList id, followed by a mandatory
//!    cooldown to stay inside the AniList quota
//! 2. Title search on Jikan; a hit replaces the id from step 1
//!
//! The resulting MyAnimeList id selects the episode listing. Every failure is
//! logged and degrades to less data; `resolve` itself cannot fail.

use crate::models::{NfoRecord, TitleMapping};
use crate::types::{IdTranslator, TitleCatalog};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Where the MyAnimeList id used for the episode listing came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSource {
    Translation,
    TitleSearch,
}

/// Resolves a show record into an episode title mapping
pub struct TitleResolver {
    translator: Arc<dyn IdTranslator>,
    catalog: Arc<dyn TitleCatalog>,
    translation_cooldown: Duration,
}

impl TitleResolver {
    pub fn new(
        translator: Arc<dyn IdTranslator>,
        catalog: Arc<dyn TitleCatalog>,
        translation_cooldown: Duration,
    ) -> Self {
        Self {
            translator,
            catalog,
            translation_cooldown,
        }
    }

    pub fn translation_cooldown(&self) -> Duration {
        self.translation_cooldown
    }

    /// Build the title mapping for a show; empty when nothing could be resolved
    pub async fn resolve(&self, show: &NfoRecord) -> TitleMapping {
        let title = match show.title().map(str::trim).filter(|t| !t.is_empty()) {
            Some(title) => title,
            None => {
                debug!("Show record has no title, skipping title resolution");
                return TitleMapping::new();
            }
        };

        let mut resolved: Option<(i64, IdSource)> = None;

        if let Some(anilist_id) = show.anilist_id() {
            match self.translator.translate(anilist_id).await {
                Ok(Some(mal_id)) => resolved = Some((mal_id, IdSource::Translation)),
                Ok(None) => debug!(
                    show = %title,
                    anilist_id,
                    "{} has no MyAnimeList id for show",
                    self.translator.name()
                ),
                Err(e) => warn!(
                    show = %title,
                    anilist_id,
                    "{} id translation failed: {}",
                    self.translator.name(),
                    e
                ),
            }
            self.cool_down().await;
        } else if let Some(raw) = show.anilist_id_text() {
            warn!(show = %title, anilistid = %raw, "Ignoring non-numeric anilistid");
        }

        // A search hit takes priority over the translated id
        match self.catalog.search(title).await {
            Ok(matches) => {
                if let Some(best) = matches.first() {
                    resolved = Some((best.mal_id, IdSource::TitleSearch));
                } else {
                    debug!(show = %title, "{} search returned no matches", self.catalog.name());
                }
            }
            Err(e) => warn!(
                show = %title,
                "{} title search failed: {}",
                self.catalog.name(),
                e
            ),
        }

        let (mal_id, source) = match resolved {
            Some(found) => found,
            None => {
                info!(show = %title, "No catalog id resolved, using filename titles");
                return TitleMapping::new();
            }
        };

        match self.catalog.episodes(mal_id).await {
            Ok(episodes) => {
                let mapping = TitleMapping::from_ordered(episodes.into_iter().map(|ep| ep.title));
                info!(
                    show = %title,
                    mal_id,
                    ?source,
                    titles = mapping.len(),
                    "Retrieved titles for show"
                );
                mapping
            }
            Err(e) => {
                error!(show = %title, mal_id, "Error fetching episode titles: {}", e);
                TitleMapping::new()
            }
        }
    }

    async fn cool_down(&self) {
        debug!(
            "Waiting {:?} after {} request",
            self.translation_cooldown,
            self.translator.name()
        );
        tokio::time::sleep(self.translation_cooldown).await;
    }
}
