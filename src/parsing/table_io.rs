
use anyhow::{anyhow, Context};
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use indexmap::IndexMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Problems with the shape or content of a delimited table
#[derive(thiserror::Error, Debug)]
pub enum TableError {
    #[error("missing required column {column:?}; columns are: [{}]", .available.join(", "))]
    MissingColumn { column: String, available: Vec<String> },
    #[error("line {line}: missing value for column {column:?}")]
    MissingField { column: String, line: u64 },
    #[error("line {line}: column {column:?} has invalid integer value {value:?}")]
    InvalidInteger { column: String, line: u64, value: String },
    #[error("line {line}: column {column:?} has invalid numeric value {value:?}")]
    InvalidFloat { column: String, line: u64, value: String },
}

/// Returns true if the path looks gzip compressed, based only on the extension
pub fn is_gzip(filename: &Path) -> bool {
    filename.extension().unwrap_or_default() == "gz"
}

/// Opens a file for reading, transparently decompressing `.gz` files.
/// # Arguments
/// * `filename` - the file path to open
/// # Errors
/// * if the file does not open
pub fn open_input(filename: &Path) -> anyhow::Result<Box<dyn Read>> {
    let file = File::open(filename)
        .with_context(|| format!("Error while opening {filename:?}:"))?;
    let reader: Box<dyn Read> = if is_gzip(filename) {
        Box::new(MultiGzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(reader)
}

/// Output handle that is either a plain buffered file or a gzip stream.
/// Use `finish()` to make sure the gzip trailer is written and any error is surfaced.
pub enum OutputHandle {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>)
}

impl OutputHandle {
    /// Creates the output file, compressing if the extension is `.gz`
    /// # Arguments
    /// * `filename` - the file path to create, any existing file is truncated
    pub fn create(filename: &Path) -> anyhow::Result<Self> {
        let file = BufWriter::new(
            File::create(filename)
                .with_context(|| format!("Error while creating {filename:?}:"))?
        );
        let handle = if is_gzip(filename) {
            // default compression = 6; the mtime in the header is left at 0 so output is reproducible
            Self::Gzip(GzEncoder::new(file, flate2::Compression::default()))
        } else {
            Self::Plain(file)
        };
        Ok(handle)
    }

    /// Flushes everything, writing the gzip trailer if needed
    pub fn finish(self) -> std::io::Result<()> {
        match self {
            Self::Plain(mut w) => w.flush(),
            Self::Gzip(gz) => {
                let mut inner = gz.finish()?;
                inner.flush()
            }
        }
    }
}

impl Write for OutputHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Self::Plain(w) => w.write(buf),
            Self::Gzip(w) => w.write(buf)
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Self::Plain(w) => w.flush(),
            Self::Gzip(w) => w.flush()
        }
    }
}

/// Opens a tab-delimited table with a header row.
/// # Arguments
/// * `filename` - path to the .tsv(.gz) file
pub fn open_tsv(filename: &Path) -> anyhow::Result<csv::Reader<Box<dyn Read>>> {
    let reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_reader(open_input(filename)?);
    Ok(reader)
}

/// Tab-delimited output table with a fixed header.
pub struct TableWriter {
    /// Handle on the writer
    csv_writer: csv::Writer<OutputHandle>,
    /// Retained for error messages
    filename: PathBuf,
    /// Number of data rows written so far
    rows_written: u64
}

impl TableWriter {
    /// Creates the file and writes the header row.
    /// # Arguments
    /// * `filename` - the output path; `.gz` is compressed
    /// * `header` - the column names, in output order
    pub fn new<S: AsRef<str>>(filename: &Path, header: &[S]) -> anyhow::Result<Self> {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_writer(OutputHandle::create(filename)?);
        csv_writer.write_record(header.iter().map(|h| h.as_ref()))
            .with_context(|| format!("Error while writing header to {filename:?}:"))?;
        Ok(Self {
            csv_writer,
            filename: filename.to_path_buf(),
            rows_written: 0
        })
    }

    /// Writes one data row; the caller is responsible for matching the header width
    pub fn write_row<I, T>(&mut self, fields: I) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>
    {
        self.csv_writer.write_record(fields)
            .with_context(|| format!("Error while writing row to {:?}:", self.filename))?;
        self.rows_written += 1;
        Ok(())
    }

    /// Flushes and closes the output, returning the number of data rows written
    pub fn finish(mut self) -> anyhow::Result<u64> {
        self.csv_writer.flush()
            .with_context(|| format!("Error while flushing output to {:?}:", self.filename))?;
        let handle = self.csv_writer.into_inner()
            .map_err(|e| anyhow!("Error while closing {:?}: {}", self.filename, e.error()))?;
        handle.finish()
            .with_context(|| format!("Error while finalizing {:?}:", self.filename))?;
        Ok(self.rows_written)
    }
}

/// Lookup from column name to column index for one header row.
/// This is how every loader validates its schema before touching any data row.
#[derive(Clone, Debug)]
pub struct ColumnIndex {
    /// Column name to index, in header order
    lookup: IndexMap<String, usize>
}

impl ColumnIndex {
    /// Builds the lookup from a header record; on duplicated names the first one wins
    pub fn new<'a, I: IntoIterator<Item = &'a str>>(headers: I) -> Self {
        let mut lookup: IndexMap<String, usize> = Default::default();
        for (i, name) in headers.into_iter().enumerate() {
            lookup.entry(name.trim().to_string()).or_insert(i);
        }
        Self { lookup }
    }

    /// Reads the header row of a csv reader into a lookup
    pub fn from_reader<R: Read>(reader: &mut csv::Reader<R>) -> csv::Result<Self> {
        let headers = reader.headers()?;
        Ok(Self::new(headers.iter()))
    }

    /// Returns the index of a column that must be present
    /// # Errors
    /// * if the column is missing, the error lists all available columns
    pub fn require(&self, column: &str) -> Result<usize, TableError> {
        self.lookup.get(column).copied()
            .ok_or_else(|| TableError::MissingColumn {
                column: column.to_string(),
                available: self.columns()
            })
    }

    /// Returns the index of a column if present
    pub fn get(&self, column: &str) -> Option<usize> {
        self.lookup.get(column).copied()
    }

    /// Returns the first of the candidate names that is present, along with its index
    pub fn find_any<'a>(&self, candidates: &[&'a str]) -> Option<(&'a str, usize)> {
        candidates.iter()
            .find_map(|&c| self.get(c).map(|i| (c, i)))
    }

    /// All column names in header order
    pub fn columns(&self) -> Vec<String> {
        self.lookup.keys().cloned().collect()
    }
}

/// Line number of a record for error reporting, 0 if unknown
pub fn record_line(row: &csv::StringRecord) -> u64 {
    row.position().map(|p| p.line()).unwrap_or(0)
}

/// Pulls a field out of a row by index, erroring if the row is too short
pub fn get_field<'a>(row: &'a csv::StringRecord, index: usize, column: &str) -> Result<&'a str, TableError> {
    row.get(index)
        .ok_or_else(|| TableError::MissingField {
            column: column.to_string(),
            line: record_line(row)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_index() {
        let index = ColumnIndex::new(["CHROM", "POS", " ID ", "POS"]);
        assert_eq!(index.columns(), vec!["CHROM", "POS", "ID"]);
        assert_eq!(index.require("CHROM").unwrap(), 0);
        assert_eq!(index.require("ID").unwrap(), 2);
        // the first duplicate wins
        assert_eq!(index.require("POS").unwrap(), 1);
        assert_eq!(index.find_any(&["super_pop", "POS"]), Some(("POS", 1)));
        assert_eq!(index.find_any(&["super_pop"]), None);
    }

    #[test]
    fn test_missing_column_lists_columns() {
        let index = ColumnIndex::new(["sample", "pop", "gender"]);
        let err = index.require("super_pop").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("super_pop"));
        assert!(message.contains("sample, pop, gender"));
    }

    #[test]
    fn test_gzip_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["table.tsv", "table.tsv.gz"] {
            let filename = tmp.path().join(name);
            let mut writer = TableWriter::new(&filename, &["A", "B"]).unwrap();
            writer.write_row(["1", "x"]).unwrap();
            writer.write_row(["2", ""]).unwrap();
            assert_eq!(writer.finish().unwrap(), 2);

            let mut reader = open_tsv(&filename).unwrap();
            let index = ColumnIndex::from_reader(&mut reader).unwrap();
            assert_eq!(index.columns(), vec!["A".to_string(), "B".to_string()]);
            let rows: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>().unwrap();
            assert_eq!(rows.len(), 2);
            assert_eq!(get_field(&rows[0], 1, "B").unwrap(), "x");
            assert_eq!(get_field(&rows[1], 1, "B").unwrap(), "");
            assert!(get_field(&rows[1], 2, "C").is_err());
        }
    }
}
