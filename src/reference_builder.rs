/*!
# Reference Builder
Left-joins the core variant table with an allele-frequency table on the full
(chromosome, position, identifier, reference, alternate) key.
Every core row is preserved in order; rows without a frequency match get a null frequency.
*/
use indexmap::IndexMap;
use log::{debug, info, warn};
use std::path::Path;

use crate::data_types::merge_summary::{ReferenceReport, ReferenceSummary};
use crate::data_types::variants::{FrequencyRecord, ReferenceRecord, VariantKey};
use crate::parsing::tables::{load_core_variants, load_frequency_table};
use crate::util::json_io::save_json;
use crate::writers::reference_panel::write_reference_panel;

/// Collapses the frequency table to one value per key, keeping the first occurrence.
/// Returns the lookup and the number of duplicate rows that were dropped.
pub fn dedup_frequencies(frequencies: Vec<FrequencyRecord>) -> (IndexMap<VariantKey, Option<f64>>, u64) {
    let mut lookup: IndexMap<VariantKey, Option<f64>> = IndexMap::with_capacity(frequencies.len());
    let mut duplicates = 0;
    for record in frequencies.into_iter() {
        let (key, frequency) = record.into_parts();
        match lookup.entry(key) {
            indexmap::map::Entry::Occupied(entry) => {
                debug!("Duplicate frequency key dropped: {:?}", entry.key());
                duplicates += 1;
            },
            indexmap::map::Entry::Vacant(entry) => {
                entry.insert(frequency);
            }
        }
    }
    (lookup, duplicates)
}

/// Builds the annotated reference panel.
/// The output has exactly one row per core row, in core order.
/// # Arguments
/// * `core` - the core variants, left side of the join
/// * `frequencies` - the frequency rows, right side of the join; duplicates are tolerated
pub fn build_reference_panel(core: Vec<VariantKey>, frequencies: Vec<FrequencyRecord>) -> (Vec<ReferenceRecord>, ReferenceSummary) {
    let frequency_rows = frequencies.len() as u64;
    let (lookup, duplicate_frequency_keys) = dedup_frequencies(frequencies);
    if duplicate_frequency_keys > 0 {
        warn!("Frequency table has {duplicate_frequency_keys} duplicate keys; keeping the first occurrence.");
    }

    let core_rows = core.len() as u64;
    let panel: Vec<ReferenceRecord> = core.into_iter()
        .map(|key| {
            let frequency = lookup.get(&key).copied().flatten();
            ReferenceRecord::new(key, frequency)
        })
        .collect();
    let annotated_rows = panel.iter().filter(|r| r.frequency().is_some()).count() as u64;

    let summary = ReferenceSummary {
        core_rows,
        frequency_rows,
        duplicate_frequency_keys,
        annotated_rows
    };
    (panel, summary)
}

/// Output locations for a reference build
#[derive(Clone, Copy, Debug)]
pub struct ReferenceOutputs<'a> {
    /// Reference panel, gzipped if it ends in .gz
    pub panel_fn: &'a Path,
    /// Optional JSON summary
    pub summary_fn: Option<&'a Path>
}

/// Loads both input tables, builds the panel, and writes it out.
/// # Arguments
/// * `core_fn` - core variant table (CHROM, POS, ID, REF, ALT)
/// * `frequency_fn` - frequency table (CHROM, POS, ID, REF, ALT, `af_column`)
/// * `af_column` - frequency column name, carried through to the output header
/// * `outputs` - where to write results
pub fn run_reference_builder(core_fn: &Path, frequency_fn: &Path, af_column: &str, outputs: ReferenceOutputs) -> anyhow::Result<ReferenceSummary> {
    info!("Loading core variants from {core_fn:?}...");
    let core = load_core_variants(core_fn)?;
    info!("Loading allele frequencies from {frequency_fn:?}...");
    let frequencies = load_frequency_table(frequency_fn, af_column)?;

    let (panel, summary) = build_reference_panel(core, frequencies);
    info!("Rows: {}", summary.core_rows);
    info!("Frequency rows: {}", summary.frequency_rows);
    info!("Duplicate frequency keys removed: {}", summary.duplicate_frequency_keys);
    info!("{af_column} non-missing: {}", summary.annotated_rows);

    info!("Saving reference panel to {:?}...", outputs.panel_fn);
    write_reference_panel(outputs.panel_fn, af_column, &panel)?;

    if let Some(summary_fn) = outputs.summary_fn {
        info!("Saving reference summary to {summary_fn:?}...");
        save_json(&ReferenceReport::from(summary), summary_fn)?;
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_row_scenario() {
        let core = vec![
            VariantKey::new("1", 100, "rs1", "A", "G"),
            VariantKey::new("1", 200, "rs2", "C", "T"),
        ];
        let frequencies = vec![
            FrequencyRecord::new(VariantKey::new("1", 100, "rs1", "A", "G"), Some(0.3)),
        ];
        let (panel, summary) = build_reference_panel(core, frequencies);
        assert_eq!(panel.len(), 2);
        assert_eq!(panel[0].key().id(), "rs1");
        assert_eq!(panel[0].frequency(), Some(0.3));
        assert_eq!(panel[1].key().id(), "rs2");
        assert_eq!(panel[1].frequency(), None);
        assert_eq!(summary, ReferenceSummary { core_rows: 2, frequency_rows: 1, duplicate_frequency_keys: 0, annotated_rows: 1 });
    }

    #[test]
    fn test_full_key_required() {
        let core = vec![
            VariantKey::new("1", 100, "rs1", "A", "G"),
        ];
        // same id, but the alleles are swapped, so no match
        let frequencies = vec![
            FrequencyRecord::new(VariantKey::new("1", 100, "rs1", "G", "A"), Some(0.7)),
        ];
        let (panel, _summary) = build_reference_panel(core, frequencies);
        assert_eq!(panel[0].frequency(), None);
    }

    #[test]
    fn test_case_insensitive_keys() {
        let core = vec![VariantKey::new("1", 100, "RS1", "a", "g")];
        let frequencies = vec![FrequencyRecord::new(VariantKey::new("1", 100, "rs1", "A", "G"), Some(0.3))];
        let (panel, _summary) = build_reference_panel(core, frequencies);
        assert_eq!(panel[0].frequency(), Some(0.3));
    }

    #[test]
    fn test_duplicate_frequencies_keep_first() {
        let core = vec![
            VariantKey::new("1", 100, "rs1", "A", "G"),
            VariantKey::new("1", 100, "rs1", "A", "G"),
            VariantKey::new("2", 5, "rs7", "T", "C"),
        ];
        let frequencies = vec![
            FrequencyRecord::new(VariantKey::new("1", 100, "rs1", "A", "G"), Some(0.3)),
            FrequencyRecord::new(VariantKey::new("1", 100, "RS1", "A", "G"), Some(0.9)),
            FrequencyRecord::new(VariantKey::new("2", 5, "rs7", "T", "C"), None),
        ];
        let (panel, summary) = build_reference_panel(core, frequencies);
        // no row multiplication, and duplicates in the core itself are preserved
        assert_eq!(panel.len(), 3);
        assert_eq!(panel[0].frequency(), Some(0.3));
        assert_eq!(panel[1].frequency(), Some(0.3));
        assert_eq!(panel[2].frequency(), None);
        assert_eq!(summary.duplicate_frequency_keys, 1);
        assert_eq!(summary.annotated_rows, 2);
    }

    #[test]
    fn test_run_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let core_fn = tmp.path().join("ref_core.tsv");
        std::fs::write(&core_fn, "CHROM\tPOS\tID\tREF\tALT\n1\t100\trs1\tA\tG\n1\t200\trs2\tC\tT\n").unwrap();
        let af_fn = tmp.path().join("ref_eur_af.tsv");
        std::fs::write(&af_fn, "CHROM\tPOS\tID\tREF\tALT\tAF_EUR\n1\t100\tRS1\tA\tG\t0.3\n").unwrap();

        let out1 = tmp.path().join("ref_panel_1.tsv.gz");
        let out2 = tmp.path().join("ref_panel_2.tsv.gz");
        let summary = run_reference_builder(&core_fn, &af_fn, "AF_EUR", ReferenceOutputs { panel_fn: &out1, summary_fn: None }).unwrap();
        run_reference_builder(&core_fn, &af_fn, "AF_EUR", ReferenceOutputs { panel_fn: &out2, summary_fn: None }).unwrap();
        assert_eq!(summary.core_rows, 2);
        assert_eq!(std::fs::read(&out1).unwrap(), std::fs::read(&out2).unwrap());

        let panel = crate::parsing::tables::load_reference_panel(&out1, "AF_EUR").unwrap();
        assert_eq!(panel, vec![
            ReferenceRecord::new(VariantKey::new("1", 100, "rs1", "A", "G"), Some(0.3)),
            ReferenceRecord::new(VariantKey::new("1", 200, "rs2", "C", "T"), None),
        ]);
    }

    #[test]
    fn test_run_writes_summary() {
        let tmp = tempfile::tempdir().unwrap();
        let core_fn = tmp.path().join("ref_core.tsv");
        std::fs::write(&core_fn, "CHROM\tPOS\tID\tREF\tALT\n1\t100\trs1\tA\tG\n1\t200\trs2\tC\tT\n").unwrap();
        let af_fn = tmp.path().join("ref_eur_af.tsv");
        std::fs::write(&af_fn, "CHROM\tPOS\tID\tREF\tALT\tAF_EUR\n1\t100\trs1\tA\tG\t0.3\n1\t100\trs1\tA\tG\t0.9\n").unwrap();

        let panel_fn = tmp.path().join("ref_panel.tsv.gz");
        let summary_fn = tmp.path().join("reference_summary.json");
        let summary = run_reference_builder(&core_fn, &af_fn, "AF_EUR", ReferenceOutputs {
            panel_fn: &panel_fn,
            summary_fn: Some(summary_fn.as_path())
        }).unwrap();
        assert_eq!(summary, ReferenceSummary { core_rows: 2, frequency_rows: 2, duplicate_frequency_keys: 1, annotated_rows: 1 });

        let report: serde_json::Value = crate::util::json_io::load_json(&summary_fn).unwrap();
        assert_eq!(report["core_rows"], 2);
        assert_eq!(report["frequency_rows"], 2);
        assert_eq!(report["duplicate_frequency_keys"], 1);
        assert_eq!(report["annotated_rows"], 1);
        assert_eq!(report["annotated_fraction"], 0.5);
    }
}
