
use crate::data_types::variants::{normalize_allele, normalize_id, ReferenceRecord};

/// One row of a formatted GWAS summary statistics table.
/// The identifier and alleles are normalized on construction.
#[derive(Clone, Debug, PartialEq)]
pub struct GwasRecord {
    /// Variant identifier, lower-case
    snp: String,
    /// Effect allele, upper-case
    a1: String,
    /// Other allele, upper-case
    a2: String,
    /// Effect-allele frequency
    freq: Option<f64>,
    /// Effect size
    b: Option<f64>,
    /// Standard error of the effect size
    se: Option<f64>,
    /// Association p-value
    p: Option<f64>,
    /// Sample size
    n: Option<u64>
}

impl GwasRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        snp: &str, a1: &str, a2: &str,
        freq: Option<f64>, b: Option<f64>, se: Option<f64>, p: Option<f64>,
        n: Option<u64>
    ) -> Self {
        Self {
            snp: normalize_id(snp),
            a1: normalize_allele(a1),
            a2: normalize_allele(a2),
            freq, b, se, p, n
        }
    }

    pub fn snp(&self) -> &str {
        &self.snp
    }

    pub fn a1(&self) -> &str {
        &self.a1
    }

    pub fn a2(&self) -> &str {
        &self.a2
    }

    pub fn freq(&self) -> Option<f64> {
        self.freq
    }

    pub fn b(&self) -> Option<f64> {
        self.b
    }

    pub fn se(&self) -> Option<f64> {
        self.se
    }

    pub fn p(&self) -> Option<f64> {
        self.p
    }

    pub fn n(&self) -> Option<u64> {
        self.n
    }
}

/// A GWAS row after the left-join against the reference panel
#[derive(Clone, Debug, PartialEq)]
pub struct MergedGwasRecord {
    /// The original GWAS row
    gwas: GwasRecord,
    /// The matching reference row, if the identifier was found
    reference: Option<ReferenceRecord>
}

impl MergedGwasRecord {
    pub fn new(gwas: GwasRecord, reference: Option<ReferenceRecord>) -> Self {
        Self { gwas, reference }
    }

    pub fn gwas(&self) -> &GwasRecord {
        &self.gwas
    }

    pub fn reference(&self) -> Option<&ReferenceRecord> {
        self.reference.as_ref()
    }

    /// A row counts as matched when a non-empty reference allele was attached.
    /// A reference row found by ID but with no REF is still unmatched.
    pub fn is_matched(&self) -> bool {
        self.reference.as_ref()
            .is_some_and(|r| !r.key().ref_allele().is_empty())
    }
}
