use std::collections::HashMap;
use std::path::Path;

use crate::error::LoadError;
use crate::simulator::goal::Intent;

/// Reads the first column of `<template_dir>/<intent>.csv` for every intent.
/// The header row is skipped and blank cells are dropped. Rows come back in file order.
pub fn load_template_corpus(
    template_dir: &Path,
) -> Result<HashMap<Intent, Vec<String>>, LoadError> {
    let mut corpus = HashMap::new();
    for intent in Intent::ALL {
        let path = template_dir.join(format!("{}.csv", intent.as_str()));
        corpus.insert(intent, load_template_file(&path)?);
    }
    return Ok(corpus);
}

pub fn load_template_file(path: &Path) -> Result<Vec<String>, LoadError> {
    let csv_err = |source| LoadError::Csv { path: path.to_path_buf(), source };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let mut templates = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        match record.get(0) {
            Some(cell) if !cell.trim().is_empty() => templates.push(cell.to_string()),
            _ => {} // blank row
        }
    }
    return Ok(templates);
}
