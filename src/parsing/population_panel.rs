
use anyhow::Context;
use log::debug;
use rustc_hash::FxHashSet as HashSet;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::parsing::table_io::{open_input, ColumnIndex, TableError};

/// Required sample column, after lower-casing the header
pub const SAMPLE_COLUMN: &str = "sample";
/// Accepted spellings of the super-population column, after lower-casing the header
pub const SUPER_POPULATION_COLUMNS: [&str; 2] = ["super_pop", "super_population"];

/// One sample from a population panel file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanelSample {
    /// Sample identifier as it appears in VCF headers
    pub sample: String,
    /// Super-population label, e.g. "EUR"
    pub super_population: String
}

/// Loads a whitespace-separated population panel with a header row.
/// Header names are compared case-insensitively; the super-population column may be named
/// `super_pop` or `super_population`.
/// # Arguments
/// * `filename` - path to the panel file, optionally gzipped
/// # Errors
/// * if the file cannot be read
/// * if the sample or super-population column is missing, the error lists the actual columns
pub fn load_population_panel(filename: &Path) -> anyhow::Result<Vec<PanelSample>> {
    debug!("Loading population panel from {filename:?}...");
    let reader = BufReader::new(open_input(filename)?);
    let mut lines = reader.lines().enumerate()
        .filter(|(_i, l)| l.as_ref().map(|s| !s.trim().is_empty()).unwrap_or(true));

    let header = match lines.next() {
        Some((_i, line)) => line.with_context(|| format!("Error while reading {filename:?}:"))?,
        None => return Ok(vec![])
    };
    let header_fields: Vec<String> = header.split_whitespace()
        .map(|h| h.to_lowercase())
        .collect();
    let index = ColumnIndex::new(header_fields.iter().map(|s| s.as_str()));

    let sample_index = index.require(SAMPLE_COLUMN)
        .with_context(|| format!("Invalid population panel {filename:?}:"))?;
    let (sp_column, sp_index) = index.find_any(&SUPER_POPULATION_COLUMNS)
        .ok_or_else(|| TableError::MissingColumn {
            column: SUPER_POPULATION_COLUMNS.join(" or "),
            available: index.columns()
        })
        .with_context(|| format!("Can't find a super-population column in {filename:?}:"))?;
    debug!("Using super-population column {sp_column:?}");

    let mut samples = vec![];
    for (line_index, line) in lines {
        let line = line.with_context(|| format!("Error while reading {filename:?}:"))?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        let line_number = line_index as u64 + 1;
        let sample = fields.get(sample_index)
            .ok_or_else(|| TableError::MissingField { column: SAMPLE_COLUMN.to_string(), line: line_number })?;
        let super_population = fields.get(sp_index)
            .ok_or_else(|| TableError::MissingField { column: sp_column.to_string(), line: line_number })?;
        samples.push(PanelSample {
            sample: sample.to_string(),
            super_population: super_population.to_string()
        });
    }
    debug!("Loaded {} panel samples.", samples.len());
    Ok(samples)
}

/// Loads the first whitespace-separated column of a file as a set of sample identifiers.
/// There is no header handling; a header token simply never matches a real sample.
/// # Arguments
/// * `filename` - path to the related-individuals file, optionally gzipped
pub fn load_sample_set(filename: &Path) -> anyhow::Result<HashSet<String>> {
    let reader = BufReader::new(open_input(filename)?);
    let mut samples: HashSet<String> = Default::default();
    for line in reader.lines() {
        let line = line.with_context(|| format!("Error while reading {filename:?}:"))?;
        if let Some(first) = line.split_whitespace().next() {
            samples.insert(first.trim().to_string());
        }
    }
    Ok(samples)
}
