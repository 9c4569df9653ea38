
use log::debug;
use std::path::Path;

use crate::data_types::variants::{ReferenceRecord, VariantKey};
use crate::parsing::fields::format_optional_f64;
use crate::parsing::table_io::TableWriter;
use crate::parsing::tables::KEY_COLUMNS;

/// Formats the five key columns of a variant in output order
pub fn key_fields(key: &VariantKey) -> [String; 5] {
    [
        key.chrom().to_string(),
        key.position().to_string(),
        key.id().to_string(),
        key.ref_allele().to_string(),
        key.alt_allele().to_string()
    ]
}

/// Writes the annotated reference panel: CHROM, POS, ID, REF, ALT, and the frequency column.
/// # Arguments
/// * `filename` - output path, gzipped if it ends in .gz
/// * `af_column` - header label for the frequency column
/// * `records` - the rows, written in order
pub fn write_reference_panel(filename: &Path, af_column: &str, records: &[ReferenceRecord]) -> anyhow::Result<u64> {
    debug!("Writing {} reference rows to {filename:?}...", records.len());
    let mut header: Vec<&str> = KEY_COLUMNS.to_vec();
    header.push(af_column);

    let mut writer = TableWriter::new(filename, &header)?;
    for record in records.iter() {
        let [chrom, pos, id, ref_allele, alt_allele] = key_fields(record.key());
        writer.write_row([
            chrom, pos, id, ref_allele, alt_allele,
            format_optional_f64(record.frequency())
        ])?;
    }
    writer.finish()
}
