use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use tracing::info;

use super::corpus::load_template_corpus;
use super::json::{load_catalog, load_genre_map, JSONCatalog, JSONGenreMap};
use crate::config::DataPaths;
use crate::error::LoadError;
use crate::parsers::template_parser::{Segment, UtteranceTemplate};
use crate::simulator::goal::{Intent, Slot};

/// Music catalog the random goals are drawn from.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub artists: Vec<String>,
    pub tracks: Vec<String>,
    pub genres: Vec<String>,
    pub genre_map: JSONGenreMap,
    track_artist: HashMap<String, String>,
}

impl Catalog {
    pub fn load(catalog_path: &Path, genre_map_path: &Path) -> Result<Self, LoadError> {
        let nested = load_catalog(catalog_path)?;
        let catalog = Catalog::from_nested(nested, load_genre_map(genre_map_path)?)?;
        info!(
            artists = catalog.artists.len(),
            tracks = catalog.tracks.len(),
            genres = catalog.genres.len(),
            "catalog loaded"
        );
        return Ok(catalog);
    }

    /// Flattens artist -> album -> tracks. Every track must belong to exactly one artist.
    pub fn from_nested(nested: JSONCatalog, genre_map: JSONGenreMap) -> Result<Self, LoadError> {
        let mut artists = Vec::new();
        let mut tracks = Vec::new();
        let mut track_artist: HashMap<String, String> = HashMap::new();

        for (artist, albums) in nested.into_iter() {
            for track in albums.into_values().flatten() {
                match track_artist.get(&track) {
                    Some(owner) if owner != &artist => {
                        return Err(LoadError::AmbiguousTrack {
                            track,
                            first: owner.clone(),
                            second: artist,
                        });
                    }
                    Some(_) => {}, // same track on another album
                    None => {
                        track_artist.insert(track.clone(), artist.clone());
                        tracks.push(track);
                    }
                }
            }
            artists.push(artist);
        }

        if tracks.is_empty() {
            return Err(LoadError::EmptyCatalog);
        }
        if genre_map.is_empty() {
            return Err(LoadError::EmptyGenres);
        }
        let genres = genre_map.keys().cloned().collect();

        return Ok(Catalog { artists, tracks, genres, genre_map, track_artist });
    }

    pub fn artist_of(&self, track: &str) -> Option<&str> {
        self.track_artist.get(track).map(String::as_str)
    }
}

/// One utterance pattern, parsed once at load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub text: String,
    segments: Vec<Segment>,
    placeholders: BTreeSet<Slot>,
}

impl Template {
    pub fn parse(text: &str) -> Result<Self, LoadError> {
        let segments = UtteranceTemplate::segments(text)
            .map_err(|reason| LoadError::MalformedTemplate { template: text.to_string(), reason })?;
        let placeholders = segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Placeholder(slot) => Some(*slot),
                Segment::Text(_) => None,
            })
            .collect();
        return Ok(Template { text: text.to_string(), segments, placeholders });
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn mentions(&self, slot: Slot) -> bool {
        self.placeholders.contains(&slot)
    }

    pub fn placeholders(&self) -> &BTreeSet<Slot> {
        &self.placeholders
    }
}

/// Read-only, intent keyed template corpus. Shared between simulator instances.
#[derive(Debug, Clone)]
pub struct TemplateIndex {
    by_intent: HashMap<Intent, Vec<Template>>,
}

impl TemplateIndex {
    pub fn load(template_dir: &Path) -> Result<Self, LoadError> {
        let index = TemplateIndex::from_corpus(load_template_corpus(template_dir)?)?;
        for intent in Intent::ALL {
            let templates = index.for_intent(intent).len();
            info!(intent = intent.as_str(), templates, "templates loaded");
        }
        return Ok(index);
    }

    /// Every intent needs at least one template. Duplicate lines keep only their first position.
    pub fn from_corpus(corpus: HashMap<Intent, Vec<String>>) -> Result<Self, LoadError> {
        let mut by_intent = HashMap::new();
        for intent in Intent::ALL {
            let mut seen = HashSet::new();
            let mut templates = Vec::new();
            for text in corpus.get(&intent).into_iter().flatten() {
                if seen.insert(text.as_str()) {
                    templates.push(Template::parse(text)?);
                }
            }
            if templates.is_empty() {
                return Err(LoadError::EmptyTemplates { intent });
            }
            by_intent.insert(intent, templates);
        }
        return Ok(TemplateIndex { by_intent });
    }

    pub fn for_intent(&self, intent: Intent) -> &[Template] {
        self.by_intent.get(&intent).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Catalog and templates loaded together from `DataPaths`.
pub fn load_resources(paths: &DataPaths) -> Result<(Catalog, TemplateIndex), LoadError> {
    let catalog = Catalog::load(&paths.catalog, &paths.genre_map)?;
    let templates = TemplateIndex::load(&paths.template_dir)?;
    return Ok((catalog, templates));
}


#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::fs;

    use crate::data::types::*;

    fn genre_map() -> JSONGenreMap {
        BTreeMap::from([(String::from("搖滾"), String::from("rock"))])
    }

    #[test]
    fn test_flatten_catalog() {
        let nested = BTreeMap::from([
            (String::from("A"), BTreeMap::from([
                (String::from("album1"), vec![String::from("t1"), String::from("t2")]),
                (String::from("album2"), vec![String::from("t2"), String::from("t3")]),
            ])),
            (
                String::from("B"),
                BTreeMap::from([(String::from("album3"), vec![String::from("t4")])]),
            ),
        ]);
        let catalog = Catalog::from_nested(nested, genre_map()).unwrap();
        assert_eq!(catalog.artists, vec!["A", "B"]);
        assert_eq!(catalog.tracks, vec!["t1", "t2", "t3", "t4"]);
        assert_eq!(catalog.artist_of("t3"), Some("A"));
        assert_eq!(catalog.artist_of("t4"), Some("B"));
        assert_eq!(catalog.genres, vec!["搖滾"]);
    }

    #[test]
    fn test_track_under_two_artists_is_rejected() {
        let nested = BTreeMap::from([
            (String::from("A"), BTreeMap::from([(String::from("x"), vec![String::from("t1")])])),
            (String::from("B"), BTreeMap::from([(String::from("y"), vec![String::from("t1")])])),
        ]);
        let result = Catalog::from_nested(nested, genre_map());
        assert!(matches!(result, Err(LoadError::AmbiguousTrack { .. })));
    }

    #[test]
    fn test_empty_catalog_and_genres_are_rejected() {
        let result = Catalog::from_nested(BTreeMap::new(), genre_map());
        assert!(matches!(result, Err(LoadError::EmptyCatalog)));

        let album = BTreeMap::from([(String::from("x"), vec![String::from("t1")])]);
        let nested = BTreeMap::from([(String::from("A"), album)]);
        let result = Catalog::from_nested(nested, BTreeMap::new());
        assert!(matches!(result, Err(LoadError::EmptyGenres)));
    }

    #[test]
    fn test_template_placeholders() {
        let template = Template::parse("推薦[s]的[g]歌").unwrap();
        assert!(template.mentions(Slot::Artist));
        assert!(template.mentions(Slot::Genre));
        assert!(!template.mentions(Slot::Track));
    }

    #[test]
    fn test_template_index_requires_every_intent() {
        let corpus = HashMap::from([
            (Intent::Search, vec![String::from("播放[t]"), String::from("播放[t]")]),
            (Intent::Recommend, vec![String::from("推薦[g]")]),
        ]);
        let result = TemplateIndex::from_corpus(corpus);
        assert!(matches!(result, Err(LoadError::EmptyTemplates { intent: Intent::Info })));
    }

    #[test]
    fn test_template_index_dedupes() {
        let corpus = HashMap::from([
            (Intent::Search, vec![String::from("播放[t]"), String::from("播放[t]")]),
            (Intent::Recommend, vec![String::from("推薦[g]")]),
            (Intent::Info, vec![String::from("[s]是誰")]),
        ]);
        let index = TemplateIndex::from_corpus(corpus).unwrap();
        assert_eq!(index.for_intent(Intent::Search).len(), 1);
    }

    #[test]
    fn test_load_resources() {
        let dir = tempfile::tempdir().unwrap();
        let template_dir = dir.path().join("template");
        fs::create_dir(&template_dir).unwrap();
        let search = "sentence\n播放[s]的[t]\n播放[t]\n播放[s]的[t]\n";
        fs::write(template_dir.join("search.csv"), search).unwrap();
        fs::write(template_dir.join("recommend.csv"), "sentence\n推薦[g]\n").unwrap();
        fs::write(template_dir.join("info.csv"), "sentence\n[s]是誰\n").unwrap();
        fs::write(dir.path().join("catalog.json"), r#"{"A": {"x": ["t1"]}}"#).unwrap();
        fs::write(dir.path().join("genre_map.json"), r#"{"搖滾": "rock"}"#).unwrap();

        let paths = DataPaths {
            template_dir,
            catalog: dir.path().join("catalog.json"),
            genre_map: dir.path().join("genre_map.json"),
        };
        let (catalog, templates) = load_resources(&paths).unwrap();
        assert_eq!(catalog.tracks, vec!["t1"]);
        assert_eq!(templates.for_intent(Intent::Info)[0].text, "[s]是誰");
        let search: Vec<&str> =
            templates.for_intent(Intent::Search).iter().map(|t| t.text.as_str()).collect();
        assert_eq!(search, vec!["播放[s]的[t]", "播放[t]"]);
    }
}
