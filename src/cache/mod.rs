//! # Cache Module
//!
//! Time-boxed memoization for reads derived from the lyrics collection.
//!
//! ## Features
//!
//! - **Get-or-create**: a miss runs the caller's factory and stores the result
//! - **TTL Support**: every entry carries an absolute expiry
//! - **Prefix Invalidation**: one call drops every view derived from the
//!   collection, since they all share the [`LYRICS_PREFIX`] key prefix
//! - **Thread Safety**: backed by a concurrent map, safe to share across tasks
//! - **Metrics**: hit/miss/invalidation counters
//!
//! Factory failures are never cached. Two tasks missing the same key at the
//! same time may both run their factory; only the collection store's own
//! load is single-flight.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use lyrics_index::cache::{keys, LyricsCache};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), String> {
//! let cache = LyricsCache::new();
//! let artists: Vec<String> = cache
//!     .get_or_create(keys::ARTISTS, Duration::from_secs(600), || async {
//!         Ok::<_, String>(vec!["GZA".to_string()])
//!     })
//!     .await?;
//!
//! cache.remove_by_prefix(lyrics_index::cache::LYRICS_PREFIX);
//! # Ok(())
//! # }
//! ```

pub mod ttl_cache;

pub use ttl_cache::{CacheMetrics, TtlCache};

use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

/// Shared cache for collection-derived views
pub type LyricsCache = TtlCache;

/// Prefix shared by every key derived from the collection store
pub const LYRICS_PREFIX: &str = "lyrics:";

/// Cache keys for the collection and its derived views
pub mod keys {
    pub const COLLECTION: &str = "lyrics:collection";
    pub const ARTISTS: &str = "lyrics:artists";
    pub const ALBUMS: &str = "lyrics:albums";
    pub const STATS: &str = "lyrics:stats";

    pub fn song(id: &str) -> String {
        format!("lyrics:song:{}", id.to_lowercase())
    }

    pub fn search(query: &str, max_results: usize) -> String {
        format!("lyrics:search:{}:{}", max_results, query.trim().to_lowercase())
    }
}

impl TtlCache {
    /// Removes expired entries and logs how many went.
    ///
    /// Lookups only evict the key they read, so entries for one-off search
    /// queries stay in the map until this runs.
    pub fn cleanup_old_entries(&self) -> usize {
        let removed = self.cleanup_expired();
        if removed > 0 {
            info!("🧹 Cache cleanup: removed {} expired entries", removed);
        }
        removed
    }

    /// Runs [`cleanup_old_entries`](Self::cleanup_old_entries) every
    /// `every` (at least one second) until the returned handle is aborted.
    pub fn spawn_cleanup_task(&self, every: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        let every = every.max(Duration::from_secs(1));

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                cache.cleanup_old_entries();
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_share_prefix() {
        for key in [
            keys::COLLECTION.to_string(),
            keys::ARTISTS.to_string(),
            keys::ALBUMS.to_string(),
            keys::STATS.to_string(),
            keys::song("Cream"),
            keys::search("Cream", 10),
        ] {
            assert!(key.starts_with(LYRICS_PREFIX), "{key}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_task_evicts_unique_search_keys() {
        let cache = LyricsCache::new();
        for i in 0..1000 {
            cache.insert(&keys::search(&format!("query {i}"), 20), i, Duration::from_secs(1));
        }
        cache.insert(keys::ARTISTS, vec!["GZA".to_string()], Duration::from_secs(3600));

        let task = cache.spawn_cleanup_task(Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(61)).await;
        task.abort();

        assert_eq!(cache.len(), 1);
        assert!(cache.contains_key(keys::ARTISTS));
        assert_eq!(cache.metrics().expired_removals, 1000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_old_entries_reports_removed() {
        let cache = LyricsCache::new();
        cache.insert(keys::STATS, 1u8, Duration::from_secs(1));
        assert_eq!(cache.cleanup_old_entries(), 0);

        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(cache.cleanup_old_entries(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_song_key_is_case_insensitive() {
        assert_eq!(keys::song("CREAM"), keys::song("cream"));
        assert_eq!(keys::search(" Cream ", 5), "lyrics:search:5:cream");
    }
}
