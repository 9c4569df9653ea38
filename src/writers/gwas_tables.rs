
use log::debug;
use std::path::Path;

use crate::data_types::gwas::{GwasRecord, MergedGwasRecord};
use crate::parsing::fields::{format_optional, format_optional_f64};
use crate::parsing::table_io::TableWriter;
use crate::parsing::tables::{ALT_COLUMN, CHROM_COLUMN, GWAS_COLUMNS, POS_COLUMN, REF_COLUMN};

/// Formats the eight GWAS columns of a record in output order
fn gwas_fields(record: &GwasRecord) -> [String; 8] {
    [
        record.snp().to_string(),
        record.a1().to_string(),
        record.a2().to_string(),
        format_optional_f64(record.freq()),
        format_optional_f64(record.b()),
        format_optional_f64(record.se()),
        format_optional_f64(record.p()),
        format_optional(record.n())
    ]
}

/// Writes a formatted GWAS table: SNP, A1, A2, freq, b, se, p, n.
/// # Arguments
/// * `filename` - output path, gzipped if it ends in .gz
/// * `records` - the rows, written in order
pub fn write_formatted_gwas(filename: &Path, records: &[GwasRecord]) -> anyhow::Result<u64> {
    debug!("Writing {} formatted GWAS rows to {filename:?}...", records.len());
    let mut writer = TableWriter::new(filename, &GWAS_COLUMNS)?;
    for record in records.iter() {
        writer.write_row(gwas_fields(record))?;
    }
    writer.finish()
}

/// Header of the merged table; the identifier column of the reference side is not carried over
pub fn merged_header(af_column: &str) -> Vec<String> {
    GWAS_COLUMNS.iter()
        .chain([CHROM_COLUMN, POS_COLUMN, REF_COLUMN, ALT_COLUMN].iter())
        .map(|s| s.to_string())
        .chain(std::iter::once(af_column.to_string()))
        .collect()
}

/// Writes the merged GWAS + reference table with a fixed column order:
/// SNP, A1, A2, freq, b, se, p, n, CHROM, POS, REF, ALT, and the frequency column.
/// Unmatched rows have empty reference fields.
/// # Arguments
/// * `filename` - output path, gzipped if it ends in .gz
/// * `af_column` - header label for the reference frequency column
/// * `records` - the merged rows, written in order
pub fn write_merged_gwas(filename: &Path, af_column: &str, records: &[MergedGwasRecord]) -> anyhow::Result<u64> {
    debug!("Writing {} merged rows to {filename:?}...", records.len());
    let mut writer = TableWriter::new(filename, &merged_header(af_column))?;
    for record in records.iter() {
        let reference_fields: [String; 5] = match record.reference() {
            Some(reference) => {
                let key = reference.key();
                [
                    key.chrom().to_string(),
                    key.position().to_string(),
                    key.ref_allele().to_string(),
                    key.alt_allele().to_string(),
                    format_optional_f64(reference.frequency())
                ]
            },
            None => Default::default()
        };
        writer.write_row(gwas_fields(record.gwas()).into_iter().chain(reference_fields))?;
    }
    writer.finish()
}
