/*!
# Auxiliary lists
Small derived outputs that feed external tools: the filtered sample list, the per-chromosome region files,
and the de-duplicated rsID list.
*/
use itertools::Itertools;
use log::{debug, info};
use rustc_hash::FxHashSet as HashSet;
use std::path::{Path, PathBuf};

use crate::data_types::variants::{is_rsid, normalize_id};
use crate::parsing::population_panel::{load_population_panel, load_sample_set, PanelSample};
use crate::parsing::tables::{load_core_variants, load_identifier_column};
use crate::writers::id_list::write_id_list;
use crate::writers::region_lists::write_region_lists;

/// Selects the samples in one super-population (case-insensitive), minus any excluded samples.
/// Order follows the panel.
/// # Arguments
/// * `panel` - all samples in the panel
/// * `super_population` - the label to keep, e.g. "EUR"
/// * `excluded` - optional set of samples to drop, such as related individuals
pub fn select_samples(panel: &[PanelSample], super_population: &str, excluded: Option<&HashSet<String>>) -> Vec<String> {
    let target = super_population.to_uppercase();
    panel.iter()
        .filter(|s| s.super_population.to_uppercase() == target)
        .filter(|s| !excluded.is_some_and(|ex| ex.contains(&s.sample)))
        .map(|s| s.sample.clone())
        .collect()
}

/// Builds and writes the sample list.
/// A missing related-individuals file is not an error; the list is written without exclusions.
/// # Arguments
/// * `panel_fn` - population panel file
/// * `related_fn` - optional related-individuals file
/// * `super_population` - the label to keep
/// * `output_fn` - plain list output, one sample per line
pub fn run_sample_list(panel_fn: &Path, related_fn: Option<&Path>, super_population: &str, output_fn: &Path) -> anyhow::Result<Vec<String>> {
    info!("Loading population panel from {panel_fn:?}...");
    let panel = load_population_panel(panel_fn)?;

    let excluded = match related_fn {
        Some(filename) if filename.exists() => {
            let related = load_sample_set(filename)?;
            info!("Excluding {} related individuals listed in {filename:?}", related.len());
            Some(related)
        },
        Some(filename) => {
            info!("No related list found at {filename:?}; keeping all {super_population} samples.");
            None
        },
        None => {
            info!("No related list provided; keeping all {super_population} samples.");
            None
        }
    };

    let samples = select_samples(&panel, super_population, excluded.as_ref());
    write_id_list(output_fn, &samples)?;
    info!("Wrote {output_fn:?}");
    info!("# {super_population} samples: {}", samples.len());
    debug!("First few: {:?}", &samples[..samples.len().min(5)]);
    Ok(samples)
}

/// Writes one region file per autosome from the core variant table.
/// # Arguments
/// * `core_fn` - core variant table
/// * `output_folder` - destination folder for the `chr{N}.regions.txt` files
pub fn run_region_lists(core_fn: &Path, output_folder: &Path) -> anyhow::Result<Vec<PathBuf>> {
    info!("Loading core variants from {core_fn:?}...");
    let core = load_core_variants(core_fn)?;
    let written = write_region_lists(output_folder, &core)?;
    info!("Wrote {} per-chromosome region files to {output_folder:?}", written.len());
    Ok(written)
}

/// Normalizes identifiers and keeps the distinct canonical rsIDs, in first-occurrence order.
/// Returns the kept identifiers and the number of distinct identifiers that were dropped.
pub fn extract_rsids(identifiers: &[String]) -> (Vec<String>, usize) {
    let (kept, dropped): (Vec<String>, Vec<String>) = identifiers.iter()
        .map(|id| normalize_id(id))
        .unique()
        .partition(|id| is_rsid(id));
    if !dropped.is_empty() {
        debug!("Dropped identifiers (first few): {:?}", &dropped[..dropped.len().min(5)]);
    }
    (kept, dropped.len())
}

/// Reads the identifier column of the formatted GWAS and writes the rsID list.
/// # Arguments
/// * `gwas_fn` - formatted GWAS table
/// * `column` - identifier column name, normally "SNP"
/// * `output_fn` - plain list output, one rsID per line
pub fn run_rsid_list(gwas_fn: &Path, column: &str, output_fn: &Path) -> anyhow::Result<Vec<String>> {
    info!("Loading identifiers from {gwas_fn:?}...");
    let identifiers = load_identifier_column(gwas_fn, column)?;
    let (rsids, dropped) = extract_rsids(&identifiers);
    info!("Total unique rsIDs: {}", rsids.len());
    info!("Dropped non-rsID identifiers: {dropped}");
    write_id_list(output_fn, &rsids)?;
    info!("Wrote {output_fn:?}");
    Ok(rsids)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(name: &str, super_population: &str) -> PanelSample {
        PanelSample { sample: name.to_string(), super_population: super_population.to_string() }
    }

    #[test]
    fn test_select_samples() {
        let panel = vec![sample("A", "EUR"), sample("B", "AFR"), sample("C", "eur"), sample("D", "EUR")];
        assert_eq!(select_samples(&panel, "EUR", None), vec!["A", "C", "D"]);

        let mut excluded: HashSet<String> = Default::default();
        excluded.insert("C".to_string());
        assert_eq!(select_samples(&panel, "eur", Some(&excluded)), vec!["A", "D"]);
    }

    #[test]
    fn test_run_sample_list_without_related() {
        let tmp = tempfile::tempdir().unwrap();
        let panel_fn = tmp.path().join("all.panel");
        std::fs::write(&panel_fn, "sample\tpop\tsuper_pop\tgender\nHG1\tGBR\tEUR\tmale\nHG2\tYRI\tAFR\tmale\nHG3\tTSI\tEUR\tfemale\n").unwrap();
        let output_fn = tmp.path().join("EUR.unrelated.samples");

        // missing related list degrades gracefully
        let missing = tmp.path().join("does_not_exist.txt");
        let samples = run_sample_list(&panel_fn, Some(missing.as_path()), "EUR", &output_fn).unwrap();
        assert_eq!(samples, vec!["HG1", "HG3"]);
        assert_eq!(std::fs::read_to_string(&output_fn).unwrap(), "HG1\nHG3\n");

        // and with a related list, the listed sample is removed
        let related_fn = tmp.path().join("related.txt");
        std::fs::write(&related_fn, "HG3 TSI\n").unwrap();
        let samples = run_sample_list(&panel_fn, Some(related_fn.as_path()), "EUR", &output_fn).unwrap();
        assert_eq!(samples, vec!["HG1"]);
    }

    #[test]
    fn test_extract_rsids() {
        let identifiers: Vec<String> = [" RS1", "rs2", "rs1", "1:12345:A:G", "rs3a", "rs2", "kgp123"]
            .iter().map(|s| s.to_string()).collect();
        let (kept, dropped) = extract_rsids(&identifiers);
        assert_eq!(kept, vec!["rs1", "rs2"]);
        assert_eq!(dropped, 3);
    }

    #[test]
    fn test_run_rsid_list() {
        let tmp = tempfile::tempdir().unwrap();
        let gwas_fn = tmp.path().join("formatted.tsv");
        std::fs::write(&gwas_fn, "SNP\tA1\nrs10\tA\nchr1:5\tC\nRS10\tG\nrs4\tT\n").unwrap();
        let output_fn = tmp.path().join("rsids.txt");
        let rsids = run_rsid_list(&gwas_fn, "SNP", &output_fn).unwrap();
        assert_eq!(rsids, vec!["rs10", "rs4"]);
        assert_eq!(std::fs::read_to_string(&output_fn).unwrap(), "rs10\nrs4\n");
    }

    #[test]
    fn test_run_region_lists() {
        let tmp = tempfile::tempdir().unwrap();
        let core_fn = tmp.path().join("ref_core.tsv");
        std::fs::write(&core_fn, "CHROM\tPOS\tID\tREF\tALT\n2\t300\trs1\tA\tG\n2\t100\trs2\tC\tT\nX\t5\trs3\tA\tC\n").unwrap();
        let folder = tmp.path().join("regions");
        let written = run_region_lists(&core_fn, &folder).unwrap();
        assert_eq!(written, vec![folder.join("chr2.regions.txt")]);
        assert_eq!(std::fs::read_to_string(&written[0]).unwrap(), "2\t100\n2\t300\n");
    }
}
