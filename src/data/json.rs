use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::LoadError;

/// artist -> album -> tracks
pub type JSONCatalog = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// genre name -> english genre name
pub type JSONGenreMap = BTreeMap<String, String>;


pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let data_str = fs::read_to_string(path)
        .map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
    return serde_json::from_str(&data_str)
        .map_err(|source| LoadError::Json { path: path.to_path_buf(), source });
}

pub fn load_catalog(path: &Path) -> Result<JSONCatalog, LoadError> {
    return read_json(path);
}

pub fn load_genre_map(path: &Path) -> Result<JSONGenreMap, LoadError> {
    return read_json(path);
}
