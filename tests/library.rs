use lyrics_index::cache::keys;
use lyrics_index::config::Config;
use lyrics_index::{LyricsError, LyricsLibrary};
use pretty_assertions::assert_eq;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

fn library(dir: &TempDir) -> LyricsLibrary {
    let source = dir.path().join("lyrics");
    std::fs::create_dir_all(&source).unwrap();
    write(&source, "cream.txt", "Cash rules everything around me, C.R.E.A.M. get the money");
    write(&source, "protect_ya_neck.txt", "Shaolin shadowboxing and the Wu-Tang sword style");
    write(&source, "liquid_swords_gza.txt", "When the MCs came, to live out the name");
    write(&source, "ice_cream.txt", "French vanilla, butter pecan, chocolate deluxe");

    let config = Config {
        source_dir: source,
        collection_path: dir.path().join("data").join("collection.json"),
        cache_ttl: Duration::from_secs(600),
        ..Config::default()
    };
    LyricsLibrary::from_config(&config)
}

#[tokio::test]
async fn test_first_load_regenerates_and_persists() {
    let dir = TempDir::new().unwrap();
    let library = library(&dir);

    let collection = library.collection().await.unwrap();

    assert_eq!(collection.total_songs, 4);
    assert!(dir.path().join("data").join("collection.json").exists());
}

#[tokio::test]
async fn test_search_ranks_title_matches_first() {
    let dir = TempDir::new().unwrap();
    let library = library(&dir);

    let results = library.search("cream", 10).await.unwrap();
    let titles: Vec<&str> = results.iter().map(|s| s.title.as_str()).collect();

    // both score 10 on the title; ties keep title order
    assert_eq!(titles, vec!["Cream", "Ice Cream"]);
    assert!(library.cache().contains_key(&keys::search("cream", 10)));
}

#[tokio::test]
async fn test_song_lookup_and_not_found() {
    let dir = TempDir::new().unwrap();
    let library = library(&dir);

    let song = library.song("PROTECT_YA_NECK").await.unwrap();
    assert_eq!(song.title, "Protect Ya Neck");
    assert!(song.tags.contains(&"martial-arts".to_string()));

    let err = library.song("missing").await.unwrap_err();
    assert!(matches!(err, LyricsError::SongNotFound(_)));
    assert!(!library.cache().contains_key(&keys::song("missing")));
}

#[tokio::test]
async fn test_artists_albums_and_stats() {
    let dir = TempDir::new().unwrap();
    let library = library(&dir);

    assert_eq!(library.artists().await.unwrap(), vec!["GZA", "Wu-Tang Clan"]);
    assert_eq!(
        library.albums().await.unwrap(),
        vec![
            "Enter the Wu-Tang (36 Chambers)",
            "Liquid Swords",
            "Only Built 4 Cuban Linx..."
        ]
    );

    let stats = library.stats().await.unwrap();
    assert_eq!(stats.total_songs, 4);
    assert_eq!(stats.total_artists, 2);
    assert_eq!(stats.total_albums, 3);
}

#[tokio::test]
async fn test_suggest_titles() {
    let dir = TempDir::new().unwrap();
    let library = library(&dir);

    let suggestions = library.suggest_titles("protekt").await.unwrap();

    assert_eq!(suggestions.first().map(|m| m.text.as_str()), Some("Protect Ya Neck"));
}

#[tokio::test]
async fn test_regenerate_picks_up_new_files_and_invalidates() {
    let dir = TempDir::new().unwrap();
    let library = library(&dir);

    assert_eq!(library.collection().await.unwrap().total_songs, 4);
    library.artists().await.unwrap();
    library.cache().insert("other:c", 1u8, Duration::from_secs(600));

    write(&dir.path().join("lyrics"), "triumph_inspectah.txt", "I bomb atomically");
    // Persisted snapshot is trusted until an explicit regenerate
    assert_eq!(library.collection().await.unwrap().total_songs, 4);

    let collection = library.regenerate().await.unwrap();

    assert_eq!(collection.total_songs, 5);
    assert!(!library.cache().contains_key(keys::ARTISTS));
    assert!(library.cache().contains_key("other:c"));
    assert_eq!(library.collection().await.unwrap().total_songs, 5);
    assert!(library
        .artists()
        .await
        .unwrap()
        .contains(&"Inspectah Deck".to_string()));
}

#[tokio::test]
async fn test_malformed_snapshot_is_fatal() {
    let dir = TempDir::new().unwrap();
    let library = library(&dir);
    std::fs::create_dir_all(dir.path().join("data")).unwrap();
    write(&dir.path().join("data"), "collection.json", "[1, 2");

    let err = library.search("cream", 5).await.unwrap_err();

    assert!(matches!(err, LyricsError::Deserialization { .. }));
}
