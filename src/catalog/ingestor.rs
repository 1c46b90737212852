use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use super::inferencer;
use crate::error::{LyricsError, Result};
use crate::models::{Collection, Song};

/// Anything that can rebuild the collection from scratch.
///
/// The collection store only depends on this trait, so the filesystem
/// ingestor can be swapped for a double in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CollectionSource: Send + Sync {
    /// Rebuilds and persists the collection, returning the new instance.
    async fn regenerate(&self) -> Result<Collection>;
}

/// Builds a [`Collection`] from a flat directory of `*.txt` lyrics files
/// and writes it as pretty JSON to `output_path`.
#[derive(Debug, Clone)]
pub struct CorpusIngestor {
    source_dir: PathBuf,
    output_path: PathBuf,
}

impl CorpusIngestor {
    pub fn new(source_dir: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_path: output_path.into(),
        }
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Lists the `.txt` files directly inside the source directory,
    /// sorted by path so duplicate ids resolve the same way every run.
    async fn list_text_files(&self) -> Result<Vec<PathBuf>> {
        if !fs::try_exists(&self.source_dir).await.unwrap_or(false) {
            return Err(LyricsError::SourceNotFound(self.source_dir.clone()));
        }

        let mut entries = fs::read_dir(&self.source_dir).await?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_text = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));

            if is_text && entry.file_type().await?.is_file() {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    async fn persist(&self, collection: &Collection) -> Result<()> {
        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let content = serde_json::to_string_pretty(collection)?;
        fs::write(&self.output_path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl CollectionSource for CorpusIngestor {
    async fn regenerate(&self) -> Result<Collection> {
        info!("📚 Regenerando colección desde: {}", self.source_dir.display());

        let files = self.list_text_files().await?;
        let mut songs: Vec<Song> = Vec::with_capacity(files.len());
        let mut skipped = 0;

        for path in &files {
            match parse_song_file(path).await {
                Ok(song) => {
                    if songs.iter().any(|s| s.id == song.id) {
                        warn!("Id duplicado '{}' en {}, se omite", song.id, path.display());
                        skipped += 1;
                        continue;
                    }
                    debug!("🎤 {} -> {} ({})", path.display(), song.title, song.artist);
                    songs.push(song);
                }
                Err(e) => {
                    warn!("Error procesando archivo de letras: {}", e);
                    skipped += 1;
                }
            }
        }

        let collection = Collection::new(songs, Utc::now());
        self.persist(&collection).await?;

        info!(
            "✅ Colección generada: {} canciones, {} artistas, {} álbumes ({} omitidos) -> {}",
            collection.total_songs,
            collection.artists.len(),
            collection.albums.len(),
            skipped,
            self.output_path.display()
        );

        Ok(collection)
    }
}

/// Reads one lyrics file and infers its song record.
pub async fn parse_song_file(path: &Path) -> Result<Song> {
    let parse_error = |reason: String| LyricsError::FileParse {
        path: path.to_path_buf(),
        reason,
    };

    let stem = path
        .file_stem()
        .ok_or_else(|| parse_error("file has no name".to_string()))?
        .to_str()
        .ok_or_else(|| parse_error("file name is not valid UTF-8".to_string()))?;
    if stem.trim().is_empty() {
        return Err(parse_error("file name is blank".to_string()));
    }

    let bytes = fs::read(path).await.map_err(|e| parse_error(e.to_string()))?;
    let content = String::from_utf8(bytes).map_err(|e| parse_error(e.to_string()))?;

    let (created_at, updated_at) = file_timestamps(path).await;
    Ok(build_song(stem, content, created_at, updated_at))
}

/// Assembles a song from a file stem and its lyrics text.
pub fn build_song(
    file_stem: &str,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Song {
    let metadata = inferencer::infer(file_stem, &content);
    let description = inferencer::describe(&metadata);

    Song {
        id: file_stem.to_lowercase(),
        title: metadata.title,
        artist: metadata.artist,
        album: metadata.album,
        genre: inferencer::GENRE.to_string(),
        content,
        word_count: metadata.word_count,
        tags: metadata.tags,
        description,
        created_at,
        updated_at,
    }
}

async fn file_timestamps(path: &Path) -> (DateTime<Utc>, DateTime<Utc>) {
    let now = Utc::now();
    match fs::metadata(path).await {
        Ok(meta) => {
            let modified = meta.modified().map(DateTime::<Utc>::from).unwrap_or(now);
            let created = meta.created().map(DateTime::<Utc>::from).unwrap_or(modified);
            (created, modified)
        }
        Err(_) => (now, now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    async fn write(dir: &Path, name: &str, content: &[u8]) {
        fs::write(dir.join(name), content).await.unwrap();
    }

    async fn corpus() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "protect_ya_neck.txt", b"So what's up man, cooling man, chilling chilling").await;
        write(dir.path(), "cream.txt", b"Cash rules everything around me, dollar dollar bill y'all").await;
        write(dir.path(), "liquid_swords_gza.txt", b"When the MCs came, to live out the name").await;
        write(dir.path(), "notes.md", b"not lyrics").await;
        dir
    }

    #[tokio::test]
    async fn test_regenerate_builds_sorted_collection() {
        let dir = corpus().await;
        let output = dir.path().join("out").join("collection.json");
        let ingestor = CorpusIngestor::new(dir.path(), &output);

        let collection = ingestor.regenerate().await.unwrap();

        assert_eq!(collection.total_songs, 3);
        assert_eq!(collection.titles(), vec!["Cream", "Liquid Swords GZA", "Protect Ya Neck"]);
        assert!(collection.artists.contains("GZA"));
        assert!(collection.artists.contains(inferencer::DEFAULT_ARTIST));
        assert!(collection.albums.contains("Liquid Swords"));
        for song in &collection.songs {
            assert!(collection.artists.contains(&song.artist));
            assert!(collection.albums.contains(&song.album));
            assert_eq!(song.word_count, inferencer::count_words(&song.content));
        }
    }

    #[tokio::test]
    async fn test_regenerate_persists_pretty_json() {
        let dir = corpus().await;
        let output = dir.path().join("collection.json");
        let ingestor = CorpusIngestor::new(dir.path(), &output);

        let collection = ingestor.regenerate().await.unwrap();
        let written = fs::read_to_string(&output).await.unwrap();
        let restored: Collection = serde_json::from_str(&written).unwrap();

        assert!(written.contains('\n'));
        assert_eq!(restored, collection);
    }

    #[tokio::test]
    async fn test_regenerate_is_idempotent() {
        let dir = corpus().await;
        let ingestor = CorpusIngestor::new(dir.path(), dir.path().join("collection.json"));

        let first = ingestor.regenerate().await.unwrap();
        let second = ingestor.regenerate().await.unwrap();

        let summary = |c: &Collection| {
            c.songs
                .iter()
                .map(|s| (s.id.clone(), s.title.clone(), s.tags.clone()))
                .collect::<Vec<_>>()
        };
        assert_eq!(summary(&first), summary(&second));
    }

    #[tokio::test]
    async fn test_invalid_file_is_skipped() {
        let dir = corpus().await;
        write(dir.path(), "broken.txt", &[0xff, 0xfe, 0x00, 0xc3]).await;
        let ingestor = CorpusIngestor::new(dir.path(), dir.path().join("collection.json"));

        let collection = ingestor.regenerate().await.unwrap();

        assert_eq!(collection.total_songs, 3);
        assert!(collection.find("broken").is_none());
    }

    #[tokio::test]
    async fn test_all_files_failing_yields_empty_collection() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "broken.txt", &[0xff, 0xff]).await;
        let ingestor = CorpusIngestor::new(dir.path(), dir.path().join("collection.json"));

        let collection = ingestor.regenerate().await.unwrap();

        assert_eq!(collection.total_songs, 0);
        assert!(collection.songs.is_empty());
    }

    #[tokio::test]
    async fn test_blank_file_name_is_reported_as_blank() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "   .txt", b"some lyrics").await;

        let err = parse_song_file(&dir.path().join("   .txt")).await.unwrap_err();

        match err {
            LyricsError::FileParse { reason, .. } => assert_eq!(reason, "file name is blank"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_source_dir() {
        let dir = TempDir::new().unwrap();
        let ingestor = CorpusIngestor::new(dir.path().join("nope"), dir.path().join("c.json"));

        let err = ingestor.regenerate().await.unwrap_err();

        assert!(matches!(err, LyricsError::SourceNotFound(_)));
        assert!(!dir.path().join("c.json").exists());
    }

    #[tokio::test]
    async fn test_duplicate_ids_keep_first() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Cream.txt", b"first").await;
        write(dir.path(), "cream.TXT", b"second").await;
        let ingestor = CorpusIngestor::new(dir.path(), dir.path().join("collection.json"));

        let collection = ingestor.regenerate().await.unwrap();

        assert_eq!(collection.total_songs, 1);
        assert_eq!(collection.songs[0].id, "cream");
        assert_eq!(collection.songs[0].content, "first");
    }

    #[test]
    fn test_build_song_fields() {
        let now = Utc::now();
        let song = build_song("Ice_Cream", "Cream get the money".to_string(), now, now);

        assert_eq!(song.id, "ice_cream");
        assert_eq!(song.title, "Ice Cream");
        assert_eq!(song.album, "Only Built 4 Cuban Linx...");
        assert_eq!(song.genre, "Hip-Hop");
        assert_eq!(song.word_count, 4);
        assert!(song.tags.contains(&"money".to_string()));
        assert!(song.description.starts_with("Ice Cream by Wu-Tang Clan"));
    }
}
