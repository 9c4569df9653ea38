/*!
# Table Inspector
Quick look at a tab-separated table: its columns, its shape, and the first few rows.
*/
use anyhow::Context;
use log::info;
use serde::Serialize;
use std::path::Path;

use crate::parsing::table_io::{open_tsv, ColumnIndex};
use crate::util::json_io::save_json;

/// Shape and preview of a table
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    /// Header names in file order
    pub columns: Vec<String>,
    /// Number of data rows, header excluded
    pub rows: u64,
    /// The first data rows, field by field
    pub head: Vec<Vec<String>>
}

impl TableSummary {
    /// (rows, columns)
    pub fn shape(&self) -> (u64, usize) {
        (self.rows, self.columns.len())
    }
}

/// Reads the whole table, keeping the header, the row count, and the first `head_rows` rows.
/// # Arguments
/// * `filename` - path to the .tsv(.gz) file
/// * `head_rows` - number of leading rows to keep for the preview
pub fn summarize_table(filename: &Path, head_rows: usize) -> anyhow::Result<TableSummary> {
    let mut reader = open_tsv(filename)?;
    let index = ColumnIndex::from_reader(&mut reader)
        .with_context(|| format!("Error while reading header of {filename:?}:"))?;

    let mut summary = TableSummary {
        columns: index.columns(),
        ..Default::default()
    };
    for result in reader.records() {
        let row = result.with_context(|| format!("Error while reading {filename:?}:"))?;
        if summary.head.len() < head_rows {
            summary.head.push(row.iter().map(|s| s.to_string()).collect());
        }
        summary.rows += 1;
    }
    Ok(summary)
}

/// Logs the summary of a table, optionally saving it as JSON too.
/// # Arguments
/// * `filename` - path to the .tsv(.gz) file
/// * `head_rows` - number of leading rows to show
/// * `json_fn` - optional JSON output
pub fn run_table_inspector(filename: &Path, head_rows: usize, json_fn: Option<&Path>) -> anyhow::Result<TableSummary> {
    info!("Loading table from {filename:?}...");
    let summary = summarize_table(filename, head_rows)?;
    let (rows, columns) = summary.shape();
    info!("Columns: {:?}", summary.columns);
    info!("Shape: ({rows}, {columns})");
    for row in summary.head.iter() {
        info!("\t{}", row.join("\t"));
    }

    if let Some(json_fn) = json_fn {
        info!("Saving table summary to {json_fn:?}...");
        save_json(&summary, json_fn)?;
    }
    Ok(summary)
}
