
use log::debug;
use std::path::Path;

use crate::data_types::annotation::VariantAnnotation;
use crate::parsing::fields::{format_optional, format_optional_f64};
use crate::parsing::table_io::TableWriter;

/// Prefix for the population frequency columns
const AF_COLUMN_PREFIX: &str = "AF_1KG_";

/// Header of the annotation table for the given population labels
pub fn annotation_header(overall_population: &str, sub_population: &str) -> Vec<String> {
    let mut header: Vec<String> = ["SNP", "chr", "pos", "ref", "alt", "strand"].iter()
        .map(|s| s.to_string())
        .collect();
    header.push(format!("{AF_COLUMN_PREFIX}{overall_population}"));
    header.push(format!("{AF_COLUMN_PREFIX}{sub_population}"));
    header
}

/// Writes the flat annotation table, one row per annotation in order.
/// # Arguments
/// * `filename` - output path, gzipped if it ends in .gz
/// * `overall_population` - label for the overall frequency column, e.g. "ALL"
/// * `sub_population` - label for the sub-population frequency column, e.g. "EUR"
/// * `annotations` - the rows to write
pub fn write_annotations(
    filename: &Path, overall_population: &str, sub_population: &str,
    annotations: &[VariantAnnotation]
) -> anyhow::Result<u64> {
    debug!("Writing {} annotations to {filename:?}...", annotations.len());
    let header = annotation_header(overall_population, sub_population);
    let mut writer = TableWriter::new(filename, &header)?;
    for annotation in annotations.iter() {
        writer.write_row([
            annotation.snp.clone(),
            annotation.chrom.clone().unwrap_or_default(),
            format_optional(annotation.position),
            annotation.ref_allele.clone().unwrap_or_default(),
            annotation.alt_allele.clone().unwrap_or_default(),
            format_optional(annotation.strand),
            format_optional_f64(annotation.af_overall),
            format_optional_f64(annotation.af_subpopulation)
        ])?;
    }
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_annotations() {
        let tmp = tempfile::tempdir().unwrap();
        let filename = tmp.path().join("annotations.tsv");
        let annotations = vec![
            VariantAnnotation {
                snp: "rs1".to_string(),
                chrom: Some("1".to_string()),
                position: Some(100),
                ref_allele: Some("A".to_string()),
                alt_allele: Some("G".to_string()),
                strand: Some(1),
                af_overall: Some(0.25),
                af_subpopulation: Some(0.3)
            },
            VariantAnnotation::empty("rs2")
        ];
        assert_eq!(write_annotations(&filename, "ALL", "EUR", &annotations).unwrap(), 2);
        let content = std::fs::read_to_string(&filename).unwrap();
        assert_eq!(content, "SNP\tchr\tpos\tref\talt\tstrand\tAF_1KG_ALL\tAF_1KG_EUR\nrs1\t1\t100\tA\tG\t1\t0.25\t0.3\nrs2\t\t\t\t\t\t\t\n");
    }
}
