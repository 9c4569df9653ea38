
use serde::Serialize;

/// Counts from joining a GWAS table to the reference panel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    /// Number of GWAS rows, which is also the number of output rows
    pub total_rows: u64,
    /// Number of GWAS rows that found a reference row
    pub matched_rows: u64,
    /// Number of reference rows dropped because their identifier was already seen
    pub duplicate_reference_ids: u64,
    /// Number of distinct identifiers written to the unmatched report
    pub unmatched_ids: u64
}

impl MergeSummary {
    /// Number of rows without a reference match
    pub fn unmatched_rows(&self) -> u64 {
        self.total_rows - self.matched_rows
    }

    /// Percentage of rows that matched, None if there are no rows
    pub fn match_rate(&self) -> Option<f64> {
        if self.total_rows > 0 {
            Some(100.0 * self.matched_rows as f64 / self.total_rows as f64)
        } else {
            None
        }
    }
}

/// Counts from building the annotated reference panel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceSummary {
    /// Number of rows in the core variant table, also the number of output rows
    pub core_rows: u64,
    /// Number of rows in the frequency table as loaded
    pub frequency_rows: u64,
    /// Number of frequency rows dropped because the full key was already seen
    pub duplicate_frequency_keys: u64,
    /// Number of output rows with a non-missing frequency
    pub annotated_rows: u64
}

impl ReferenceSummary {
    /// Fraction of core rows with a frequency attached, None if the core table is empty
    pub fn annotated_fraction(&self) -> Option<f64> {
        if self.core_rows > 0 {
            Some(self.annotated_rows as f64 / self.core_rows as f64)
        } else {
            None
        }
    }
}

/// Serialized form of the merge report, includes the derived match rate
#[derive(Debug, Serialize)]
pub struct MergeReport {
    #[serde(flatten)]
    pub summary: MergeSummary,
    /// Percentage of GWAS rows that matched
    pub match_rate: Option<f64>
}

impl From<MergeSummary> for MergeReport {
    fn from(summary: MergeSummary) -> Self {
        Self {
            summary,
            match_rate: summary.match_rate()
        }
    }
}

/// Serialized form of the reference build report, includes the derived annotated fraction
#[derive(Debug, Serialize)]
pub struct ReferenceReport {
    #[serde(flatten)]
    pub summary: ReferenceSummary,
    /// Fraction of core rows with a frequency attached
    pub annotated_fraction: Option<f64>
}

impl From<ReferenceSummary> for ReferenceReport {
    fn from(summary: ReferenceSummary) -> Self {
        Self {
            summary,
            annotated_fraction: summary.annotated_fraction()
        }
    }
}
