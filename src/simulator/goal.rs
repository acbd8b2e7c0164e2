use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

use crate::data::types::Catalog;
use crate::error::SimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Search,
    Recommend,
    Info,
}

impl Intent {
    pub const ALL: [Intent; 3] = [Intent::Search, Intent::Recommend, Intent::Info];

    pub fn as_str(&self) -> &'static str {
        return match self {
            Intent::Search => "search",
            Intent::Recommend => "recommend",
            Intent::Info => "info",
        };
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        return match s.trim() {
            "search" => Ok(Intent::Search),
            "recommend" => Ok(Intent::Recommend),
            "info" => Ok(Intent::Info),
            other => Err(SimError::UnknownIntent(other.to_string())),
        };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Artist,
    Track,
    Genre,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::Artist, Slot::Track, Slot::Genre];

    pub fn as_str(&self) -> &'static str {
        return match self {
            Slot::Artist => "artist",
            Slot::Track => "track",
            Slot::Genre => "genre",
        };
    }

    /// Placeholder token marking this slot inside a template.
    pub fn token(&self) -> &'static str {
        return match self {
            Slot::Artist => "[s]",
            Slot::Track => "[t]",
            Slot::Genre => "[g]",
        };
    }

    pub fn all() -> BTreeSet<Slot> {
        Slot::ALL.into_iter().collect()
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Removes every whitespace character, the normal form used for all value comparisons.
pub fn normalize(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

pub fn normalize_opt(value: Option<&str>) -> Option<String> {
    value.map(normalize)
}

/// Goal values typed in by hand: empty or whitespace-only strings read as absent.
pub fn blank_as_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotValues {
    pub artist: Option<String>,
    pub track: Option<String>,
    pub genre: Option<String>,
}

impl SlotValues {
    pub fn get(&self, slot: Slot) -> Option<&str> {
        return match slot {
            Slot::Artist => self.artist.as_deref(),
            Slot::Track => self.track.as_deref(),
            Slot::Genre => self.genre.as_deref(),
        };
    }

    pub fn set(&mut self, slot: Slot, value: Option<String>) {
        match slot {
            Slot::Artist => self.artist = value,
            Slot::Track => self.track = value,
            Slot::Genre => self.genre = value,
        }
    }

    /// Slots holding a value.
    pub fn filled(&self) -> BTreeSet<Slot> {
        Slot::ALL.into_iter().filter(|slot| self.get(*slot).is_some()).collect()
    }
}

/// The hidden target the simulated user tries to get across in one dialogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Goal {
    pub intent: Intent,
    pub slots: SlotValues,
}

impl Goal {
    /// Builds a goal verbatim. Only `recommend` goals keep a genre.
    pub fn new(
        intent: Intent,
        artist: Option<String>,
        track: Option<String>,
        genre: Option<String>,
    ) -> Self {
        let genre = if intent == Intent::Recommend { genre } else { None };
        return Goal {
            intent,
            slots: SlotValues { artist, track, genre },
        };
    }

    /// Draws intent and track uniformly, derives the artist from the track.
    /// `recommend` goals also get a genre; `info` goals drop either the track or the artist.
    pub fn random<R: Rng + ?Sized>(catalog: &Catalog, rng: &mut R) -> Result<Self, SimError> {
        let intent = *Intent::ALL.choose(rng).ok_or(SimError::EmptyDrawPool("intents"))?;
        let track = catalog.tracks.choose(rng).ok_or(SimError::EmptyDrawPool("tracks"))?.clone();
        let artist = catalog
            .artist_of(&track)
            .ok_or_else(|| SimError::UnmappedTrack(track.clone()))?
            .to_string();

        let mut slots = SlotValues {
            artist: Some(artist),
            track: Some(track),
            genre: None,
        };
        if intent == Intent::Recommend {
            let genre = catalog.genres.choose(rng).ok_or(SimError::EmptyDrawPool("genres"))?;
            slots.genre = Some(genre.clone());
        }
        if intent == Intent::Info {
            if rng.gen_bool(0.5) {
                slots.track = None;
            } else {
                slots.artist = None;
            }
        }
        return Ok(Goal { intent, slots });
    }

    pub fn slot(&self, slot: Slot) -> Option<&str> {
        self.slots.get(slot)
    }

    pub fn active_slots(&self) -> BTreeSet<Slot> {
        self.slots.filled()
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "intent:[{}], artist:[{}], track:[{}], genre:[{}]",
            self.intent,
            self.slots.artist.as_deref().unwrap_or("-"),
            self.slots.track.as_deref().unwrap_or("-"),
            self.slots.genre.as_deref().unwrap_or("-"),
        )
    }
}
