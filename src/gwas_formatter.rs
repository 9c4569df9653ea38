/*!
# GWAS Formatter
Converts a raw author-provided summary statistics file into the formatted GWAS table.
Author column names are mapped onto the standard ones, coordinates are dropped, numeric columns are
coerced (anything unparseable becomes null), and the sample size is attached.
*/
use anyhow::{bail, Context};
use log::{debug, info, warn};
use std::path::Path;

use crate::data_types::gwas::GwasRecord;
use crate::parsing::fields::{coerce_f64, parse_optional_count};
use crate::parsing::table_io::{get_field, open_tsv, record_line, ColumnIndex};
use crate::writers::gwas_tables::write_formatted_gwas;

/// Raw column names in the author file
pub const RAW_SNP_COLUMN: &str = "MarkerName";
pub const RAW_A1_COLUMN: &str = "A1";
pub const RAW_A2_COLUMN: &str = "A2";
pub const RAW_FREQ_COLUMN: &str = "EAF";
pub const RAW_BETA_COLUMN: &str = "Beta";
pub const RAW_SE_COLUMN: &str = "SE";
pub const RAW_P_COLUMN: &str = "Pval";
/// Optional per-row sample size column in the author file
pub const RAW_N_COLUMN: &str = "N";

/// Counts of values that failed numeric coercion, per output column
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CoercionCounts {
    pub freq: u64,
    pub b: u64,
    pub se: u64,
    pub p: u64
}

impl CoercionCounts {
    pub fn total(&self) -> u64 {
        self.freq + self.b + self.se + self.p
    }
}

/// Where the sample size comes from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleSize {
    /// Same value on every row
    Constant(u64),
    /// Read per row from the `N` column of the raw file
    FromColumn
}

/// Coerces one raw numeric field, counting it if a non-empty value failed to parse
fn coerce_counted(value: &str, counter: &mut u64) -> Option<f64> {
    let result = coerce_f64(value);
    if result.is_none() && !crate::parsing::fields::is_missing(value) {
        *counter += 1;
    }
    result
}

/// Loads and reformats the raw author GWAS file.
/// # Arguments
/// * `filename` - raw tab-separated file, optionally gzipped
/// * `sample_size` - a constant sample size; if None, the raw file must have an `N` column
/// # Errors
/// * if a required raw column is missing
/// * if no sample size constant is given and there is no `N` column
pub fn load_raw_gwas(filename: &Path, sample_size: Option<u64>) -> anyhow::Result<(Vec<GwasRecord>, CoercionCounts)> {
    let mut reader = open_tsv(filename)?;
    let index = ColumnIndex::from_reader(&mut reader)
        .with_context(|| format!("Error while reading header of {filename:?}:"))?;
    debug!("Raw columns: {:?}", index.columns());

    let required = [RAW_SNP_COLUMN, RAW_A1_COLUMN, RAW_A2_COLUMN, RAW_FREQ_COLUMN, RAW_BETA_COLUMN, RAW_SE_COLUMN, RAW_P_COLUMN];
    let columns: Vec<usize> = required.iter()
        .map(|c| index.require(c))
        .collect::<Result<_, _>>()
        .with_context(|| format!("Invalid raw GWAS file {filename:?}:"))?;

    let sample_size = match (sample_size, index.get(RAW_N_COLUMN)) {
        (Some(n), _) => SampleSize::Constant(n),
        (None, Some(_)) => SampleSize::FromColumn,
        (None, None) => bail!("No sample size provided and {filename:?} has no {RAW_N_COLUMN:?} column; columns are: {:?}", index.columns())
    };
    let n_index = index.get(RAW_N_COLUMN);

    let mut counts = CoercionCounts::default();
    let mut records = vec![];
    for result in reader.records() {
        let row = result.with_context(|| format!("Error while reading {filename:?}:"))?;
        let field = |i: usize| get_field(&row, columns[i], required[i]);
        let n = match (sample_size, n_index) {
            (SampleSize::Constant(n), _) => Some(n),
            (SampleSize::FromColumn, Some(ni)) => parse_optional_count(get_field(&row, ni, RAW_N_COLUMN)?, RAW_N_COLUMN, record_line(&row))?,
            (SampleSize::FromColumn, None) => None
        };
        records.push(GwasRecord::new(
            field(0)?, field(1)?, field(2)?,
            coerce_counted(field(3)?, &mut counts.freq),
            coerce_counted(field(4)?, &mut counts.b),
            coerce_counted(field(5)?, &mut counts.se),
            coerce_counted(field(6)?, &mut counts.p),
            n
        ));
    }
    Ok((records, counts))
}

/// Reformats the raw author file and writes the formatted GWAS table.
/// # Arguments
/// * `raw_fn` - the raw author file
/// * `sample_size` - constant sample size, or None to read the `N` column
/// * `output_fn` - formatted output, gzipped if it ends in .gz
pub fn run_gwas_formatter(raw_fn: &Path, sample_size: Option<u64>, output_fn: &Path) -> anyhow::Result<u64> {
    info!("Loading raw GWAS from {raw_fn:?}...");
    let (records, counts) = load_raw_gwas(raw_fn, sample_size)?;
    if counts.total() > 0 {
        warn!("Coerced non-numeric values to missing: freq={}, b={}, se={}, p={}", counts.freq, counts.b, counts.se, counts.p);
    }
    info!("Formatted rows: {}", records.len());

    info!("Saving formatted GWAS to {output_fn:?}...");
    write_formatted_gwas(output_fn, &records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "MarkerName\tCHR\tPOS\tA1\tA2\tEAF\tBeta\tSE\tPval\nrs1\t1\t100\ta\tg\t0.2\t0.01\t0.002\t1e-8\nRS2\t1\t200\tC\tT\tNA\tbad\t0.003\t0.5\n";

    #[test]
    fn test_constant_sample_size() {
        let tmp = tempfile::tempdir().unwrap();
        let raw_fn = tmp.path().join("GWAS_CP_all.txt");
        std::fs::write(&raw_fn, RAW).unwrap();

        let (records, counts) = load_raw_gwas(&raw_fn, Some(257841)).unwrap();
        assert_eq!(records, vec![
            GwasRecord::new("rs1", "A", "G", Some(0.2), Some(0.01), Some(0.002), Some(1e-8), Some(257841)),
            GwasRecord::new("rs2", "C", "T", None, None, Some(0.003), Some(0.5), Some(257841)),
        ]);
        // "NA" is a missing token, "bad" is a coercion
        assert_eq!(counts, CoercionCounts { freq: 0, b: 1, se: 0, p: 0 });
    }

    #[test]
    fn test_sample_size_column() {
        let tmp = tempfile::tempdir().unwrap();
        let raw_fn = tmp.path().join("raw.tsv");
        std::fs::write(&raw_fn, "MarkerName\tA1\tA2\tEAF\tBeta\tSE\tPval\tN\nrs1\tA\tG\t0.2\t0.01\t0.002\t0.1\t5000\n").unwrap();
        let (records, _counts) = load_raw_gwas(&raw_fn, None).unwrap();
        assert_eq!(records[0].n(), Some(5000));

        // a constant overrides the column
        let (records, _counts) = load_raw_gwas(&raw_fn, Some(10)).unwrap();
        assert_eq!(records[0].n(), Some(10));

        // float-typed sample sizes are accepted when integral
        std::fs::write(&raw_fn, "MarkerName\tA1\tA2\tEAF\tBeta\tSE\tPval\tN\nrs1\tA\tG\t0.2\t0.01\t0.002\t0.1\t257841.0\n").unwrap();
        let (records, _counts) = load_raw_gwas(&raw_fn, None).unwrap();
        assert_eq!(records[0].n(), Some(257841));
    }

    #[test]
    fn test_missing_sample_size() {
        let tmp = tempfile::tempdir().unwrap();
        let raw_fn = tmp.path().join("raw.tsv");
        std::fs::write(&raw_fn, RAW).unwrap();
        let err = load_raw_gwas(&raw_fn, None).unwrap_err();
        assert!(err.to_string().contains("No sample size provided"));
    }

    #[test]
    fn test_missing_raw_column() {
        let tmp = tempfile::tempdir().unwrap();
        let raw_fn = tmp.path().join("raw.tsv");
        std::fs::write(&raw_fn, "SNP\tA1\tA2\tEAF\tBeta\tSE\tPval\nrs1\tA\tG\t0.2\t0.01\t0.002\t0.1\n").unwrap();
        let err = load_raw_gwas(&raw_fn, Some(1)).unwrap_err();
        assert!(format!("{err:#}").contains("MarkerName"));
    }

    #[test]
    fn test_run_formatter() {
        let tmp = tempfile::tempdir().unwrap();
        let raw_fn = tmp.path().join("raw.tsv");
        std::fs::write(&raw_fn, RAW).unwrap();
        let out_fn = tmp.path().join("author_formatted.tsv");
        assert_eq!(run_gwas_formatter(&raw_fn, Some(100), &out_fn).unwrap(), 2);
        let content = std::fs::read_to_string(&out_fn).unwrap();
        assert_eq!(content, "SNP\tA1\tA2\tfreq\tb\tse\tp\tn\nrs1\tA\tG\t0.2\t0.01\t0.002\t1e-8\t100\nrs2\tC\tT\t\t\t0.003\t0.5\t100\n");
    }
}
