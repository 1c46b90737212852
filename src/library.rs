//! Consumer-facing operations over the lyrics collection.
//!
//! Every read goes through the shared [`LyricsCache`] under the `lyrics:`
//! prefix, so a regeneration drops all of them at once.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::cache::{keys, LyricsCache};
use crate::catalog::CorpusIngestor;
use crate::config::Config;
use crate::error::{LyricsError, Result};
use crate::models::{Collection, CollectionStats, FuzzyMatch, SearchResult, Song};
use crate::search::{fuzzy::FuzzyMatcher, relevance};
use crate::storage::CollectionStore;

/// How many tags [`CollectionStats::top_tags`] lists
const TOP_TAGS: usize = 5;

pub struct LyricsLibrary {
    store: CollectionStore,
    cache: LyricsCache,
    ttl: Duration,
    matcher: FuzzyMatcher,
}

impl LyricsLibrary {
    pub fn new(store: CollectionStore, cache: LyricsCache, ttl: Duration, matcher: FuzzyMatcher) -> Self {
        Self {
            store,
            cache,
            ttl,
            matcher,
        }
    }

    /// Wires the filesystem ingestor, store and cache from configuration.
    pub fn from_config(config: &Config) -> Self {
        let cache = LyricsCache::new();
        let ingestor = CorpusIngestor::new(&config.source_dir, &config.collection_path);
        let store = CollectionStore::new(Arc::new(ingestor), &config.collection_path, cache.clone());

        Self::new(store, cache, config.cache_ttl, config.fuzzy_matcher())
    }

    pub fn cache(&self) -> &LyricsCache {
        &self.cache
    }

    pub fn store(&self) -> &CollectionStore {
        &self.store
    }

    pub async fn collection(&self) -> Result<Arc<Collection>> {
        self.cached(keys::COLLECTION, || self.store.load()).await
    }

    pub async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Song>> {
        self.cached(&keys::search(query, max_results), || async {
            let collection = self.collection().await?;
            Ok::<_, LyricsError>(relevance::search(&collection, query, max_results))
        })
        .await
    }

    /// Like [`search`](Self::search) but keeps scores and matched terms.
    /// Not cached.
    pub async fn search_scored(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let collection = self.collection().await?;
        Ok(relevance::search_scored(&collection, query, max_results))
    }

    pub async fn song(&self, id: &str) -> Result<Song> {
        self.cached(&keys::song(id), || async {
            let collection = self.collection().await?;
            collection
                .find(id)
                .cloned()
                .ok_or_else(|| LyricsError::SongNotFound(id.to_string()))
        })
        .await
    }

    pub async fn artists(&self) -> Result<Vec<String>> {
        self.cached(keys::ARTISTS, || async {
            Ok::<_, LyricsError>(self.collection().await?.artist_names())
        })
        .await
    }

    pub async fn albums(&self) -> Result<Vec<String>> {
        self.cached(keys::ALBUMS, || async {
            Ok::<_, LyricsError>(self.collection().await?.album_names())
        })
        .await
    }

    pub async fn stats(&self) -> Result<CollectionStats> {
        self.cached(keys::STATS, || async {
            Ok::<_, LyricsError>(collection_stats(&*self.collection().await?))
        })
        .await
    }

    /// "Did you mean" over the collection's titles
    pub async fn suggest_titles(&self, query: &str) -> Result<Vec<FuzzyMatch>> {
        let collection = self.collection().await?;
        Ok(self.matcher.find_matches(query, &collection.titles()))
    }

    /// Forces a rebuild from the source directory. Cached views are
    /// invalidated by the store.
    pub async fn regenerate(&self) -> Result<Arc<Collection>> {
        let collection = self.store.regenerate().await?;
        info!("📚 Biblioteca actualizada: {} canciones", collection.total_songs);
        Ok(collection)
    }

    /// Cache-aside over the store. A value computed while the store
    /// published a new collection may be stale, so it is not kept.
    ///
    /// The generation is re-checked after inserting: a regenerate that
    /// publishes before that check is caught here, one that publishes
    /// after it invalidates the prefix after our insert.
    async fn cached<T, F, Fut>(&self, key: &str, factory: F) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(value) = self.cache.get::<T>(key) {
            return Ok(value);
        }

        let generation = self.store.generation();
        let value = factory().await?;

        if self.store.generation() == generation {
            self.cache.insert(key, value.clone(), self.ttl);
            if self.store.generation() != generation {
                self.cache.remove(key);
            }
        } else {
            debug!("Collection replaced while computing {}, not caching", key);
        }
        Ok(value)
    }
}

pub fn collection_stats(collection: &Collection) -> CollectionStats {
    let total_words: usize = collection.songs.iter().map(|s| s.word_count).sum();
    let average_words = if collection.songs.is_empty() {
        0.0
    } else {
        total_words as f64 / collection.songs.len() as f64
    };

    let mut tag_counts: HashMap<&str, usize> = HashMap::new();
    for tag in collection.songs.iter().flat_map(|s| s.tags.iter()) {
        *tag_counts.entry(tag.as_str()).or_insert(0) += 1;
    }
    let mut top_tags: Vec<(String, usize)> = tag_counts
        .into_iter()
        .map(|(tag, count)| (tag.to_string(), count))
        .collect();
    top_tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top_tags.truncate(TOP_TAGS);

    CollectionStats {
        version: collection.version.clone(),
        generated_at: collection.generated_at,
        total_songs: collection.total_songs,
        total_artists: collection.artists.len(),
        total_albums: collection.albums.len(),
        total_words,
        average_words,
        top_tags,
    }
}
