//! Metadata inference from a lyrics filename and its text.
//!
//! Every function here is pure and total: unmatched input falls back to
//! the documented defaults instead of failing.
//!
//! Filename rules match against a *key*: the lowercased stem with `-` and
//! spaces folded to `_`, so `Protect-Ya-Neck` and `protect ya neck` both
//! become `protect_ya_neck`.

/// Artist used when no keyword matches
pub const DEFAULT_ARTIST: &str = "Wu-Tang Clan";
/// Album used when no rule matches
pub const DEFAULT_ALBUM: &str = "Wu-Tang Collection";
pub const GENRE: &str = "Hip-Hop";

/// Words that keep a fixed spelling in titles instead of being title-cased
const KNOWN_WORDS: &[(&str, &str)] = &[
    ("gza", "GZA"),
    ("rza", "RZA"),
    ("odb", "ODB"),
    ("dj", "DJ"),
    ("mc", "MC"),
    ("nyc", "NYC"),
    ("ii", "II"),
    ("iii", "III"),
    ("iv", "IV"),
    ("wu", "Wu"),
];

/// Keyword -> canonical artist. Checked top to bottom, first hit wins, so
/// more specific keywords sit above the ones they contain.
const ARTIST_KEYWORDS: &[(&str, &str)] = &[
    ("ghostface", "Ghostface Killah"),
    ("raekwon", "Raekwon"),
    ("method_man", "Method Man"),
    ("inspectah", "Inspectah Deck"),
    ("masta_killa", "Masta Killa"),
    ("u_god", "U-God"),
    ("cappadonna", "Cappadonna"),
    ("dirty", "Ol' Dirty Bastard"),
    ("odb", "Ol' Dirty Bastard"),
    ("genius", "GZA"),
    ("gza", "GZA"),
    ("rza", "RZA"),
];

/// Filename predicates -> album, top to bottom, first hit wins.
/// `ice_cream` must be tested before the rule containing `cream`.
const ALBUM_RULES: &[(&[&str], &str)] = &[
    (&["cuban", "ice_cream", "incarcerated"], "Only Built 4 Cuban Linx..."),
    (&["forever", "triumph", "reunited"], "Wu-Tang Forever"),
    (&["liquid", "cold_world", "shadowboxin"], "Liquid Swords"),
    (&["ironman", "daytona"], "Ironman"),
    (&["tical", "bring_the_pain"], "Tical"),
    (
        &["36_chambers", "cream", "protect", "ruckus", "tearz", "shame", "mystery"],
        "Enter the Wu-Tang (36 Chambers)",
    ),
];

/// Tags every song carries
const BASE_TAGS: &[&str] = &["hip-hop", "rap", "wu-tang"];

/// Substring of lowercased content -> tag
const CONTENT_TAGS: &[(&str, &str)] = &[
    ("money", "money"),
    ("cash", "money"),
    ("dollar", "money"),
    ("street", "street"),
    ("hood", "street"),
    ("kung fu", "martial-arts"),
    ("shaolin", "martial-arts"),
    ("sword", "martial-arts"),
    ("knowledge", "spiritual"),
    ("god", "spiritual"),
    ("love", "love"),
    ("gun", "violence"),
    ("murder", "violence"),
    ("police", "police"),
    ("cops", "police"),
    ("chess", "chess"),
];

/// Substring of the filename key -> tag
const FILENAME_TAGS: &[(&str, &str)] = &[
    ("remix", "remix"),
    ("live", "live"),
    ("interlude", "interlude"),
    ("skit", "skit"),
    ("intro", "intro"),
    ("outro", "outro"),
    ("feat", "collaboration"),
    ("instrumental", "instrumental"),
];

/// Everything inferred for one lyrics file
#[derive(Debug, Clone, PartialEq)]
pub struct SongMetadata {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub tags: Vec<String>,
    pub word_count: usize,
}

/// Infers all metadata for a file stem (no extension) and its text.
pub fn infer(file_stem: &str, content: &str) -> SongMetadata {
    SongMetadata {
        title: infer_title(file_stem),
        artist: infer_artist(file_stem),
        album: infer_album(file_stem),
        tags: infer_tags(file_stem, content),
        word_count: count_words(content),
    }
}

pub fn infer_title(file_stem: &str) -> String {
    file_stem
        .replace(['_', '-'], " ")
        .split_whitespace()
        .map(normalize_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn normalize_word(word: &str) -> String {
    let lower = word.to_lowercase();
    if let Some((_, fixed)) = KNOWN_WORDS.iter().find(|(k, _)| *k == lower) {
        return fixed.to_string();
    }

    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn infer_artist(file_stem: &str) -> String {
    let key = filename_key(file_stem);
    ARTIST_KEYWORDS
        .iter()
        .find(|(keyword, _)| key.contains(keyword))
        .map_or(DEFAULT_ARTIST, |(_, artist)| artist)
        .to_string()
}

pub fn infer_album(file_stem: &str) -> String {
    let key = filename_key(file_stem);
    ALBUM_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| key.contains(n)))
        .map_or(DEFAULT_ALBUM, |(_, album)| album)
        .to_string()
}

/// Union of base, content and filename tags, deduplicated in rule order.
pub fn infer_tags(file_stem: &str, content: &str) -> Vec<String> {
    let key = filename_key(file_stem);
    let content = content.to_lowercase();

    let content_tags = CONTENT_TAGS
        .iter()
        .filter(|(keyword, _)| content.contains(keyword))
        .map(|(_, tag)| *tag);
    let filename_tags = FILENAME_TAGS
        .iter()
        .filter(|(keyword, _)| key.contains(keyword))
        .map(|(_, tag)| *tag);

    let mut tags: Vec<String> = Vec::new();
    for tag in BASE_TAGS.iter().copied().chain(content_tags).chain(filename_tags) {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

pub fn count_words(content: &str) -> usize {
    content
        .split([' ', '\t', '\r', '\n'])
        .filter(|token| !token.is_empty())
        .count()
}

/// One-line summary stored on each song
pub fn describe(metadata: &SongMetadata) -> String {
    let mut description = format!(
        "{} by {} from {}. {} words.",
        metadata.title, metadata.artist, metadata.album, metadata.word_count
    );

    // Distinctive tags first; the base tags only fill remaining slots
    let (base, distinctive): (Vec<&str>, Vec<&str>) = metadata
        .tags
        .iter()
        .map(String::as_str)
        .partition(|tag| BASE_TAGS.contains(tag));
    let highlights: Vec<&str> = distinctive.into_iter().chain(base).take(3).collect();
    if !highlights.is_empty() {
        description.push_str(&format!(" Tags: {}.", highlights.join(", ")));
    }
    description
}

fn filename_key(file_stem: &str) -> String {
    file_stem.to_lowercase().replace(['-', ' '], "_")
}
