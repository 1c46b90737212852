use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Format version written into every generated collection
pub const COLLECTION_VERSION: &str = "1.0";

/// A single song, immutable once the ingestor has built it.
///
/// `id` is the lowercased filename stem and is unique within a
/// [`Collection`]. `word_count` always equals the whitespace-tokenized
/// length of `content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub genre: String,
    pub content: String,
    pub word_count: usize,
    pub tags: Vec<String>,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The full structured corpus plus its artist and album indexes.
///
/// Persisted as a single JSON snapshot. The artist and album sets are
/// written as self-mapping objects (`{"name": "name"}`) to stay compatible
/// with existing collection files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub total_songs: usize,
    pub songs: Vec<Song>,
    #[serde(with = "name_set")]
    pub artists: BTreeSet<String>,
    #[serde(with = "name_set")]
    pub albums: BTreeSet<String>,
}

impl Collection {
    /// Builds a collection from loose songs: sorts them by title (ordinal,
    /// stable) and derives the artist/album indexes and song count.
    pub fn new(mut songs: Vec<Song>, generated_at: DateTime<Utc>) -> Self {
        songs.sort_by(|a, b| a.title.cmp(&b.title));

        let artists = songs.iter().map(|s| s.artist.clone()).collect();
        let albums = songs.iter().map(|s| s.album.clone()).collect();

        Self {
            version: COLLECTION_VERSION.to_string(),
            generated_at,
            total_songs: songs.len(),
            songs,
            artists,
            albums,
        }
    }

    /// Looks a song up by id, ignoring case.
    pub fn find(&self, id: &str) -> Option<&Song> {
        let id = id.to_lowercase();
        self.songs.iter().find(|s| s.id == id)
    }

    pub fn titles(&self) -> Vec<String> {
        self.songs.iter().map(|s| s.title.clone()).collect()
    }

    pub fn artist_names(&self) -> Vec<String> {
        self.artists.iter().cloned().collect()
    }

    pub fn album_names(&self) -> Vec<String> {
        self.albums.iter().cloned().collect()
    }
}

/// A song paired with its relevance for one query. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub song: Song,
    pub relevance_score: f64,
    pub matched_terms: Vec<String>,
}

/// One candidate string scored against a fuzzy query.
///
/// `text` is the candidate exactly as supplied. `match_indices` are char
/// positions in `text` aligned greedily with the query, for highlighting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuzzyMatch {
    pub text: String,
    pub score: f64,
    pub match_indices: Vec<usize>,
}

/// Summary numbers over the current collection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStats {
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub total_songs: usize,
    pub total_artists: usize,
    pub total_albums: usize,
    pub total_words: usize,
    pub average_words: f64,
    pub top_tags: Vec<(String, usize)>,
}

impl std::fmt::Display for CollectionStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use num_format::{Locale, ToFormattedString};

        write!(
            f,
            "Collection v{} (generated {})\n  \
             Songs: {}\n  \
             Artists: {}\n  \
             Albums: {}\n  \
             Words: {} ({:.1} per song)",
            self.version,
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.total_songs.to_formatted_string(&Locale::en),
            self.total_artists,
            self.total_albums,
            self.total_words.to_formatted_string(&Locale::en),
            self.average_words
        )
    }
}

/// Serializes a name set as `{"name": "name", ...}` and accepts either that
/// object shape or a plain array when reading.
mod name_set {
    use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
    use serde::ser::{SerializeMap, Serializer};
    use std::collections::BTreeSet;
    use std::fmt;

    pub fn serialize<S>(set: &BTreeSet<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(set.len()))?;
        for name in set {
            map.serialize_entry(name, name)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(NameSetVisitor)
    }

    struct NameSetVisitor;

    impl<'de> Visitor<'de> for NameSetVisitor {
        type Value = BTreeSet<String>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an object of names or an array of names")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut set = BTreeSet::new();
            while let Some((key, _value)) = access.next_entry::<String, de::IgnoredAny>()? {
                set.insert(key);
            }
            Ok(set)
        }

        fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut set = BTreeSet::new();
            while let Some(name) = access.next_element::<String>()? {
                set.insert(name);
            }
            Ok(set)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn song(id: &str, title: &str, artist: &str, album: &str) -> Song {
        let now = Utc::now();
        Song {
            id: id.to_string(),
            title: title.to_string(),
            artist: artist.to_string(),
            album: album.to_string(),
            genre: "Hip-Hop".to_string(),
            content: "bring da ruckus".to_string(),
            word_count: 3,
            tags: vec!["hip-hop".to_string()],
            description: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_collection_new_sorts_and_indexes() {
        let collection = Collection::new(
            vec![
                song("shame", "Shame On A Nigga", "Wu-Tang Clan", "36 Chambers"),
                song("cream", "C.R.E.A.M.", "Wu-Tang Clan", "36 Chambers"),
                song("liquid", "Liquid Swords", "GZA", "Liquid Swords"),
            ],
            Utc::now(),
        );

        assert_eq!(collection.total_songs, 3);
        assert_eq!(collection.version, COLLECTION_VERSION);
        assert_eq!(
            collection.titles(),
            vec!["C.R.E.A.M.", "Liquid Swords", "Shame On A Nigga"]
        );
        assert_eq!(collection.artist_names(), vec!["GZA", "Wu-Tang Clan"]);
        assert_eq!(collection.album_names(), vec!["36 Chambers", "Liquid Swords"]);
    }

    #[test]
    fn test_find_ignores_case() {
        let collection = Collection::new(vec![song("cream", "C.R.E.A.M.", "a", "b")], Utc::now());
        assert!(collection.find("CREAM").is_some());
        assert!(collection.find("missing").is_none());
    }

    #[test]
    fn test_json_round_trip() {
        let collection = Collection::new(
            vec![song("a", "A", "GZA", "Liquid Swords"), song("b", "B", "RZA", "Bobby Digital")],
            Utc::now(),
        );

        let json = serde_json::to_string_pretty(&collection).unwrap();
        let restored: Collection = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, collection);
        assert_eq!(restored.total_songs, restored.songs.len());
    }

    #[test]
    fn test_name_sets_serialize_as_self_mapping_objects() {
        let collection = Collection::new(vec![song("a", "A", "GZA", "Liquid Swords")], Utc::now());
        let value = serde_json::to_value(&collection).unwrap();

        assert_eq!(value["artists"], serde_json::json!({ "GZA": "GZA" }));
        assert_eq!(value["albums"], serde_json::json!({ "Liquid Swords": "Liquid Swords" }));
        assert_eq!(value["totalSongs"], serde_json::json!(1));
        assert!(value["songs"][0].get("wordCount").is_some());
    }

    #[test]
    fn test_name_sets_accept_arrays() {
        let json = serde_json::json!({
            "version": "1.0",
            "generatedAt": "2024-01-01T00:00:00Z",
            "totalSongs": 0,
            "songs": [],
            "artists": ["RZA", "GZA"],
            "albums": {}
        });

        let collection: Collection = serde_json::from_value(json).unwrap();
        assert_eq!(collection.artist_names(), vec!["GZA", "RZA"]);
        assert!(collection.albums.is_empty());
    }
}
