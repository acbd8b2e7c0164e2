//! Error types for the user simulator.
//!
//! Construction-time problems with the catalog, the template corpus or the
//! configuration are `LoadError`s and abort building a simulator. Problems during
//! a dialogue are `SimError`s and are handed back to whoever drives the turns.

use std::path::PathBuf;

use thiserror::Error;

use crate::simulator::goal::Intent;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read template corpus {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("template corpus for intent '{intent}' is empty")]
    EmptyTemplates {
        intent: Intent,
    },

    #[error("template '{template}' is malformed: {reason}")]
    MalformedTemplate {
        template: String,
        reason: String,
    },

    #[error("catalog contains no tracks")]
    EmptyCatalog,

    #[error("genre map is empty")]
    EmptyGenres,

    #[error("track '{track}' is listed under both '{first}' and '{second}'")]
    AmbiguousTrack {
        track: String,
        first: String,
        second: String,
    },

    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error("no user goal has been set")]
    NoGoal,

    #[error("dialogue has already ended, set a new goal first")]
    DialogueEnded,

    #[error("no '{intent}' template voices {asked:?} (strict: {strict})")]
    NoMatchingTemplate {
        intent: Intent,
        asked: Vec<String>,
        strict: bool,
    },

    #[error("goal has no value for slot '{slot}'")]
    MissingSlotValue {
        slot: String,
    },

    #[error("invalid action frame: {0}")]
    InvalidFrame(#[source] serde_json::Error),

    #[error("invalid belief state: {0}")]
    InvalidBelief(#[source] serde_json::Error),

    #[error("unknown intent '{0}'")]
    UnknownIntent(String),

    #[error("nothing to draw from: {0} is empty")]
    EmptyDrawPool(&'static str),

    #[error("track '{0}' has no artist in the catalog")]
    UnmappedTrack(String),
}
