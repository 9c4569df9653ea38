/*!
# GWAS Merger
Left-joins a formatted GWAS table with the annotated reference panel on the variant identifier alone.
The reference is collapsed to one row per identifier first (first occurrence wins) so the join cannot multiply rows.
Unmatched GWAS rows are kept with empty reference fields and their identifiers are reported separately.
*/
use itertools::Itertools;
use log::{info, warn};
use rustc_hash::FxHashMap as HashMap;
use std::path::Path;

use crate::data_types::gwas::{GwasRecord, MergedGwasRecord};
use crate::data_types::merge_summary::{MergeReport, MergeSummary};
use crate::data_types::variants::ReferenceRecord;
use crate::parsing::tables::{load_gwas_table, load_reference_panel};
use crate::util::json_io::save_json;
use crate::writers::gwas_tables::write_merged_gwas;
use crate::writers::id_list::write_id_list;

/// Everything produced by a merge
#[derive(Debug)]
pub struct MergeOutcome {
    /// One row per GWAS row, in GWAS order
    pub rows: Vec<MergedGwasRecord>,
    /// Distinct unmatched identifiers in first-occurrence order
    pub unmatched_ids: Vec<String>,
    /// Counters for reporting
    pub summary: MergeSummary
}

/// Collapses the reference panel to one row per identifier, keeping the first occurrence.
/// Returns the lookup and the number of rows dropped.
pub fn dedup_reference_by_id(reference: Vec<ReferenceRecord>) -> (HashMap<String, ReferenceRecord>, u64) {
    let mut lookup: HashMap<String, ReferenceRecord> = HashMap::default();
    lookup.reserve(reference.len());
    let mut duplicates = 0;
    for record in reference.into_iter() {
        let id = record.key().id().to_string();
        if lookup.contains_key(&id) {
            duplicates += 1;
        } else {
            lookup.insert(id, record);
        }
    }
    (lookup, duplicates)
}

/// Joins the GWAS rows to the reference by identifier.
/// Identifiers on both sides are already trimmed and lower-cased by their constructors.
/// # Arguments
/// * `gwas` - left side of the join; the output has exactly this many rows
/// * `reference` - right side of the join; duplicated identifiers are tolerated
pub fn merge_gwas_with_reference(gwas: Vec<GwasRecord>, reference: Vec<ReferenceRecord>) -> MergeOutcome {
    let (lookup, duplicate_reference_ids) = dedup_reference_by_id(reference);
    if duplicate_reference_ids > 0 {
        warn!("Reference has {duplicate_reference_ids} duplicate rsIDs; keeping the first occurrence.");
    }

    let rows: Vec<MergedGwasRecord> = gwas.into_iter()
        .map(|record| {
            let reference = lookup.get(record.snp()).cloned();
            MergedGwasRecord::new(record, reference)
        })
        .collect();

    let unmatched_ids: Vec<String> = rows.iter()
        .filter(|r| !r.is_matched())
        .map(|r| r.gwas().snp())
        .unique()
        .map(|s| s.to_string())
        .collect();

    let summary = MergeSummary {
        total_rows: rows.len() as u64,
        matched_rows: rows.iter().filter(|r| r.is_matched()).count() as u64,
        duplicate_reference_ids,
        unmatched_ids: unmatched_ids.len() as u64
    };
    MergeOutcome { rows, unmatched_ids, summary }
}

/// Formats the operator-facing match line, e.g. "Matched to reference: 1/2 (50.0%)"
pub fn format_match_rate(summary: &MergeSummary) -> String {
    let rate = match summary.match_rate() {
        Some(r) => format!("{r:.1}%"),
        None => "n/a".to_string()
    };
    format!("Matched to reference: {}/{} ({rate})", summary.matched_rows, summary.total_rows)
}

/// Output locations for a merge run
#[derive(Clone, Copy, Debug)]
pub struct MergeOutputs<'a> {
    /// Merged table, gzipped if it ends in .gz
    pub merged_fn: &'a Path,
    /// Plain list of unmatched identifiers
    pub unmatched_fn: &'a Path,
    /// Optional JSON summary
    pub summary_fn: Option<&'a Path>
}

/// Loads the GWAS and reference tables, merges them, and writes all outputs.
/// # Arguments
/// * `gwas_fn` - formatted GWAS table
/// * `reference_fn` - annotated reference panel
/// * `af_column` - frequency column name in the reference, carried into the output
/// * `outputs` - where to write results
pub fn run_gwas_merger(gwas_fn: &Path, reference_fn: &Path, af_column: &str, outputs: MergeOutputs) -> anyhow::Result<MergeSummary> {
    info!("Loading GWAS from {gwas_fn:?}...");
    let gwas = load_gwas_table(gwas_fn)?;
    info!("Loading reference panel from {reference_fn:?}...");
    let reference = load_reference_panel(reference_fn, af_column)?;

    let outcome = merge_gwas_with_reference(gwas, reference);
    info!("{}", format_match_rate(&outcome.summary));

    info!("Saving merged table to {:?}...", outputs.merged_fn);
    write_merged_gwas(outputs.merged_fn, af_column, &outcome.rows)?;

    let unmatched_count = write_id_list(outputs.unmatched_fn, &outcome.unmatched_ids)?;
    info!("Unmatched rsIDs written to {:?}: {unmatched_count}", outputs.unmatched_fn);

    if let Some(summary_fn) = outputs.summary_fn {
        info!("Saving merge summary to {summary_fn:?}...");
        save_json(&MergeReport::from(outcome.summary), summary_fn)?;
    }
    Ok(outcome.summary)
}
