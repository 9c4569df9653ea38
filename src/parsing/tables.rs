
use anyhow::Context;
use log::debug;
use std::path::Path;

use crate::data_types::gwas::GwasRecord;
use crate::data_types::variants::{FrequencyRecord, ReferenceRecord, VariantKey};
use crate::parsing::fields::{is_missing, parse_optional_count, parse_optional_f64, parse_u64};
use crate::parsing::table_io::{get_field, open_tsv, record_line, ColumnIndex, TableError};

/// Column names shared by the core, frequency, and reference tables
pub const CHROM_COLUMN: &str = "CHROM";
pub const POS_COLUMN: &str = "POS";
pub const ID_COLUMN: &str = "ID";
pub const REF_COLUMN: &str = "REF";
pub const ALT_COLUMN: &str = "ALT";
pub const KEY_COLUMNS: [&str; 5] = [CHROM_COLUMN, POS_COLUMN, ID_COLUMN, REF_COLUMN, ALT_COLUMN];

/// Column names of the formatted GWAS table, in output order
pub const GWAS_COLUMNS: [&str; 8] = ["SNP", "A1", "A2", "freq", "b", "se", "p", "n"];

/// Resolved indices of the five key columns for one table
#[derive(Clone, Copy, Debug)]
struct KeyColumns {
    chrom: usize,
    pos: usize,
    id: usize,
    ref_allele: usize,
    alt_allele: usize
}

impl KeyColumns {
    /// Resolves all five key columns, failing on the first one missing
    fn resolve(index: &ColumnIndex) -> Result<Self, TableError> {
        Ok(Self {
            chrom: index.require(CHROM_COLUMN)?,
            pos: index.require(POS_COLUMN)?,
            id: index.require(ID_COLUMN)?,
            ref_allele: index.require(REF_COLUMN)?,
            alt_allele: index.require(ALT_COLUMN)?
        })
    }

    /// Parses a normalized key out of a row; missing allele tokens become the empty allele
    fn parse(&self, row: &csv::StringRecord) -> Result<VariantKey, TableError> {
        let line = record_line(row);
        let position = parse_u64(get_field(row, self.pos, POS_COLUMN)?, POS_COLUMN, line)?;
        Ok(VariantKey::new(
            get_field(row, self.chrom, CHROM_COLUMN)?,
            position,
            get_field(row, self.id, ID_COLUMN)?,
            get_allele(row, self.ref_allele, REF_COLUMN)?,
            get_allele(row, self.alt_allele, ALT_COLUMN)?
        ))
    }
}

/// Pulls an allele out of a row, a missing token becomes the empty allele
fn get_allele<'a>(row: &'a csv::StringRecord, index: usize, column: &str) -> Result<&'a str, TableError> {
    let value = get_field(row, index, column)?;
    Ok(if is_missing(value) { "" } else { value })
}

/// Loads a core variant table (CHROM, POS, ID, REF, ALT); extra columns are ignored.
/// # Arguments
/// * `filename` - path to the .tsv(.gz) file
/// # Errors
/// * if the file cannot be opened or a key column is missing
/// * if a position fails to parse
pub fn load_core_variants(filename: &Path) -> anyhow::Result<Vec<VariantKey>> {
    debug!("Loading core variants from {filename:?}...");
    let mut reader = open_tsv(filename)?;
    let index = ColumnIndex::from_reader(&mut reader)
        .with_context(|| format!("Error while reading header of {filename:?}:"))?;
    let key_columns = KeyColumns::resolve(&index)
        .with_context(|| format!("Invalid core variant table {filename:?}:"))?;

    let mut variants = vec![];
    for result in reader.records() {
        let row = result.with_context(|| format!("Error while reading {filename:?}:"))?;
        let key = key_columns.parse(&row)
            .with_context(|| format!("Error while parsing {filename:?}:"))?;
        variants.push(key);
    }
    debug!("Loaded {} core variants.", variants.len());
    Ok(variants)
}

/// Loads a table that has the five key columns plus one frequency column.
/// Shared by the frequency table and the reference panel, which only differ in meaning.
fn load_keyed_frequencies(filename: &Path, af_column: &str) -> anyhow::Result<Vec<(VariantKey, Option<f64>)>> {
    let mut reader = open_tsv(filename)?;
    let index = ColumnIndex::from_reader(&mut reader)
        .with_context(|| format!("Error while reading header of {filename:?}:"))?;
    let key_columns = KeyColumns::resolve(&index)
        .with_context(|| format!("Invalid table {filename:?}:"))?;
    let af_index = index.require(af_column)
        .with_context(|| format!("Invalid table {filename:?}:"))?;

    let mut rows = vec![];
    for result in reader.records() {
        let row = result.with_context(|| format!("Error while reading {filename:?}:"))?;
        let key = key_columns.parse(&row)
            .with_context(|| format!("Error while parsing {filename:?}:"))?;
        let frequency = parse_optional_f64(get_field(&row, af_index, af_column)?, af_column, record_line(&row))
            .with_context(|| format!("Error while parsing {filename:?}:"))?;
        rows.push((key, frequency));
    }
    Ok(rows)
}

/// Loads an allele-frequency table (CHROM, POS, ID, REF, ALT, and the named frequency column).
/// # Arguments
/// * `filename` - path to the .tsv(.gz) file
/// * `af_column` - name of the frequency column, e.g. "AF_EUR"
pub fn load_frequency_table(filename: &Path, af_column: &str) -> anyhow::Result<Vec<FrequencyRecord>> {
    debug!("Loading allele frequencies from {filename:?}...");
    let records: Vec<FrequencyRecord> = load_keyed_frequencies(filename, af_column)?
        .into_iter()
        .map(|(key, frequency)| FrequencyRecord::new(key, frequency))
        .collect();
    debug!("Loaded {} frequency rows.", records.len());
    Ok(records)
}

/// Loads an annotated reference panel as written by the reference builder.
/// # Arguments
/// * `filename` - path to the .tsv(.gz) file
/// * `af_column` - name of the frequency column, e.g. "AF_EUR"
pub fn load_reference_panel(filename: &Path, af_column: &str) -> anyhow::Result<Vec<ReferenceRecord>> {
    debug!("Loading reference panel from {filename:?}...");
    let records: Vec<ReferenceRecord> = load_keyed_frequencies(filename, af_column)?
        .into_iter()
        .map(|(key, frequency)| ReferenceRecord::new(key, frequency))
        .collect();
    debug!("Loaded {} reference rows.", records.len());
    Ok(records)
}

/// Loads a formatted GWAS table (SNP, A1, A2, freq, b, se, p, n).
/// # Arguments
/// * `filename` - path to the .tsv(.gz) file
/// # Errors
/// * if any of the eight columns is missing
/// * if a numeric field is present but does not parse
pub fn load_gwas_table(filename: &Path) -> anyhow::Result<Vec<GwasRecord>> {
    debug!("Loading formatted GWAS from {filename:?}...");
    let mut reader = open_tsv(filename)?;
    let index = ColumnIndex::from_reader(&mut reader)
        .with_context(|| format!("Error while reading header of {filename:?}:"))?;
    let columns: Vec<usize> = GWAS_COLUMNS.iter()
        .map(|c| index.require(c))
        .collect::<Result<_, _>>()
        .with_context(|| format!("Invalid GWAS table {filename:?}:"))?;

    let mut records = vec![];
    for result in reader.records() {
        let row = result.with_context(|| format!("Error while reading {filename:?}:"))?;
        let record = parse_gwas_row(&row, &columns)
            .with_context(|| format!("Error while parsing {filename:?}:"))?;
        records.push(record);
    }
    debug!("Loaded {} GWAS rows.", records.len());
    Ok(records)
}

/// Parses one GWAS row given the indices of the columns in `GWAS_COLUMNS` order
fn parse_gwas_row(row: &csv::StringRecord, columns: &[usize]) -> Result<GwasRecord, TableError> {
    let line = record_line(row);
    let field = |i: usize| get_field(row, columns[i], GWAS_COLUMNS[i]);
    let float = |i: usize| -> Result<Option<f64>, TableError> {
        parse_optional_f64(field(i)?, GWAS_COLUMNS[i], line)
    };
    Ok(GwasRecord::new(
        field(0)?, field(1)?, field(2)?,
        float(3)?, float(4)?, float(5)?, float(6)?,
        parse_optional_count(field(7)?, GWAS_COLUMNS[7], line)?
    ))
}

/// Loads a single column of identifiers from a table, in file order and without any normalization.
/// # Arguments
/// * `filename` - path to the .tsv(.gz) file
/// * `column` - the identifier column name, e.g. "SNP"
pub fn load_identifier_column(filename: &Path, column: &str) -> anyhow::Result<Vec<String>> {
    let mut reader = open_tsv(filename)?;
    let index = ColumnIndex::from_reader(&mut reader)
        .with_context(|| format!("Error while reading header of {filename:?}:"))?;
    let id_index = index.require(column)
        .with_context(|| format!("Invalid table {filename:?}:"))?;

    let mut identifiers = vec![];
    for result in reader.records() {
        let row = result.with_context(|| format!("Error while reading {filename:?}:"))?;
        identifiers.push(get_field(&row, id_index, column)?.to_string());
    }
    Ok(identifiers)
}
