use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::{fs, sync::Mutex};
use tracing::{debug, info};

use crate::cache::{LyricsCache, LYRICS_PREFIX};
use crate::catalog::CollectionSource;
use crate::error::{LyricsError, Result};
use crate::models::Collection;

/// Where the store is in its load lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Empty,
    Loading,
    Loaded,
}

/// Owner of the authoritative in-memory [`Collection`].
///
/// The collection is populated lazily on the first [`load`](Self::load):
/// from the persisted JSON file when it exists, otherwise by asking the
/// [`CollectionSource`] to regenerate it. The whole
/// check -> read-or-regenerate -> publish sequence runs under one async
/// mutex, so concurrent first callers trigger exactly one load and all
/// receive the same `Arc`.
///
/// A published collection is never mutated; regeneration swaps in a new
/// `Arc` and drops every cache entry under [`LYRICS_PREFIX`].
pub struct CollectionStore {
    source: Arc<dyn CollectionSource>,
    collection_path: PathBuf,
    cache: LyricsCache,
    current: RwLock<Option<Arc<Collection>>>,
    generation: AtomicU64,
    load_gate: Mutex<()>,
}

impl CollectionStore {
    pub fn new(
        source: Arc<dyn CollectionSource>,
        collection_path: impl Into<PathBuf>,
        cache: LyricsCache,
    ) -> Self {
        let collection_path = collection_path.into();
        info!("📁 Collection store en: {}", collection_path.display());

        Self {
            source,
            collection_path,
            cache,
            current: RwLock::new(None),
            generation: AtomicU64::new(0),
            load_gate: Mutex::new(()),
        }
    }

    pub fn collection_path(&self) -> &Path {
        &self.collection_path
    }

    /// A held gate means a load or regenerate is running, even when an
    /// older collection is still being served.
    pub fn state(&self) -> StoreState {
        if self.load_gate.try_lock().is_err() {
            StoreState::Loading
        } else if self.current().is_some() {
            StoreState::Loaded
        } else {
            StoreState::Empty
        }
    }

    /// Returns the collection, loading it on first use.
    ///
    /// Once loaded, calls return the held instance with no I/O.
    pub async fn load(&self) -> Result<Arc<Collection>> {
        if let Some(collection) = self.current() {
            return Ok(collection);
        }

        let _gate = self.load_gate.lock().await;

        // Another caller may have finished the load while we waited
        if let Some(collection) = self.current() {
            return Ok(collection);
        }

        let collection = if fs::try_exists(&self.collection_path).await? {
            self.read_persisted().await?
        } else {
            info!(
                "Archivo de colección ausente ({}), regenerando",
                self.collection_path.display()
            );
            self.source.regenerate().await?
        };

        Ok(self.publish(collection))
    }

    /// Rebuilds the collection unconditionally, replaces the held instance
    /// and invalidates every derived cache entry.
    ///
    /// On failure the previously held collection and cache are kept.
    pub async fn regenerate(&self) -> Result<Arc<Collection>> {
        let _gate = self.load_gate.lock().await;

        let collection = self.source.regenerate().await?;
        let collection = self.publish(collection);
        self.generation.fetch_add(1, Ordering::SeqCst);

        let removed = self.cache.remove_by_prefix(LYRICS_PREFIX);
        info!(
            "🔄 Colección regenerada: {} canciones, {} entradas de caché invalidadas",
            collection.total_songs, removed
        );

        Ok(collection)
    }

    /// Bumped by every successful [`regenerate`](Self::regenerate). Views
    /// computed across a change of generation may come from the replaced
    /// collection.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn current(&self) -> Option<Arc<Collection>> {
        self.current.read().clone()
    }

    fn publish(&self, collection: Collection) -> Arc<Collection> {
        let collection = Arc::new(collection);
        *self.current.write() = Some(collection.clone());
        collection
    }

    async fn read_persisted(&self) -> Result<Collection> {
        let content = fs::read(&self.collection_path).await?;
        let collection: Collection =
            serde_json::from_slice(&content).map_err(|source| LyricsError::Deserialization {
                path: self.collection_path.clone(),
                source,
            })?;

        debug!(
            "📂 Cargadas {} canciones desde {}",
            collection.total_songs,
            self.collection_path.display()
        );
        Ok(collection)
    }
}
