
use anyhow::Context;
use log::debug;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::data_types::variants::{autosome_number, VariantKey};
use crate::parsing::table_io::OutputHandle;

/// File name used for a single chromosome's region list
pub fn region_filename(chrom: &str) -> String {
    format!("chr{chrom}.regions.txt")
}

/// Groups the autosomal variants by chromosome number, with positions sorted ascending.
/// Non-autosomal chromosomes (X, Y, MT, contigs) are dropped.
pub fn group_autosome_positions(variants: &[VariantKey]) -> BTreeMap<u8, Vec<u64>> {
    let mut grouped: BTreeMap<u8, Vec<u64>> = Default::default();
    for variant in variants.iter() {
        if let Some(chrom_number) = autosome_number(variant.chrom()) {
            grouped.entry(chrom_number).or_default().push(variant.position());
        }
    }
    for positions in grouped.values_mut() {
        positions.sort_unstable();
    }
    grouped
}

/// Writes one region file per autosome present in the input, each with two tab-separated
/// columns (chromosome, position) and no header.
/// # Arguments
/// * `output_folder` - destination folder, created if needed
/// * `variants` - the core variants to pull positions from
/// # Errors
/// * if the folder or any of the files cannot be written
pub fn write_region_lists(output_folder: &Path, variants: &[VariantKey]) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_folder)
        .with_context(|| format!("Error while creating {output_folder:?}:"))?;

    let grouped = group_autosome_positions(variants);
    let mut written = vec![];
    for (chrom_number, positions) in grouped.iter() {
        let chrom = chrom_number.to_string();
        let filename = output_folder.join(region_filename(&chrom));
        debug!("Writing {} positions to {filename:?}...", positions.len());

        let mut handle = OutputHandle::create(&filename)?;
        for position in positions.iter() {
            writeln!(handle, "{chrom}\t{position}")
                .with_context(|| format!("Error while writing to {filename:?}:"))?;
        }
        handle.finish()
            .with_context(|| format!("Error while finalizing {filename:?}:"))?;
        written.push(filename);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(chrom: &str, position: u64) -> VariantKey {
        VariantKey::new(chrom, position, "rs1", "A", "G")
    }

    #[test]
    fn test_group_autosomes() {
        let variants = vec![
            variant("2", 500), variant("1", 300), variant("X", 10),
            variant("2", 100), variant("22", 7), variant("MT", 3)
        ];
        let grouped = group_autosome_positions(&variants);
        assert_eq!(grouped.keys().copied().collect::<Vec<u8>>(), vec![1, 2, 22]);
        assert_eq!(grouped[&2], vec![100, 500]);
        assert_eq!(grouped[&22], vec![7]);
    }

    #[test]
    fn test_write_region_lists() {
        let tmp = tempfile::tempdir().unwrap();
        let folder = tmp.path().join("regions");
        let variants = vec![variant("3", 30), variant("3", 10), variant("Y", 5), variant("10", 1)];
        let written = write_region_lists(&folder, &variants).unwrap();
        assert_eq!(written, vec![folder.join("chr3.regions.txt"), folder.join("chr10.regions.txt")]);
        assert_eq!(std::fs::read_to_string(folder.join("chr3.regions.txt")).unwrap(), "3\t10\n3\t30\n");
        assert!(!folder.join("chrY.regions.txt").exists());
    }
}
