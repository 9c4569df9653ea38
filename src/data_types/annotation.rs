
/// Flat annotation for a single identifier pulled from the variant service.
/// Every annotation field is optional; a failed lookup still produces a record with only `snp` set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VariantAnnotation {
    /// The identifier exactly as it was queried
    pub snp: String,
    /// Chromosome from the target assembly mapping
    pub chrom: Option<String>,
    /// Start coordinate from the target assembly mapping, 1-based
    pub position: Option<u64>,
    /// Reference allele, left side of the "REF/ALT" allele string
    pub ref_allele: Option<String>,
    /// Alternate allele, right side of the "REF/ALT" allele string
    pub alt_allele: Option<String>,
    /// Mapping strand, 1 or -1
    pub strand: Option<i64>,
    /// Frequency of the alternate allele in the overall population
    pub af_overall: Option<f64>,
    /// Frequency of the alternate allele in the selected sub-population
    pub af_subpopulation: Option<f64>
}

impl VariantAnnotation {
    /// Creates the placeholder record for an identifier that could not be annotated
    pub fn empty(snp: &str) -> Self {
        Self {
            snp: snp.to_string(),
            ..Default::default()
        }
    }

    /// Returns true if a target-assembly mapping was found for this identifier
    pub fn is_mapped(&self) -> bool {
        self.chrom.is_some()
    }
}
