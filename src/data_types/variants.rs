
/// Normalizes a variant identifier into the join form: trimmed and lower-case.
/// dbSNP identifiers are canonically `rs<digits>`, so `" RS123"` becomes `"rs123"`.
pub fn normalize_id(id: &str) -> String {
    id.trim().to_lowercase()
}

/// Normalizes an allele string into the join form: trimmed and upper-case.
pub fn normalize_allele(allele: &str) -> String {
    allele.trim().to_uppercase()
}

/// Normalizes a chromosome label; these are compared as plain strings ("1".."22", "X", "Y").
pub fn normalize_chrom(chrom: &str) -> String {
    chrom.trim().to_string()
}

/// Returns true if the identifier is a canonical rsID, i.e. "rs" followed by at least one digit.
/// The check is case-sensitive, so identifiers should be normalized first.
pub fn is_rsid(id: &str) -> bool {
    match id.strip_prefix("rs") {
        Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
        None => false
    }
}

/// The full identity of a variant in the reference panel.
/// All fields are normalized on construction, so two keys are equal exactly when they would match in a join.
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct VariantKey {
    /// Chromosome label, e.g. "1" or "X"
    chrom: String,
    /// Coordinate of the variant, 1-based
    position: u64,
    /// Variant identifier, lower-case
    id: String,
    /// Reference allele, upper-case
    ref_allele: String,
    /// Alternate allele, upper-case
    alt_allele: String
}

impl VariantKey {
    /// Creates a new key, normalizing every field.
    /// # Arguments
    /// * `chrom` - the chromosome label
    /// * `position` - the 1-based coordinate
    /// * `id` - the variant identifier, typically an rsID
    /// * `ref_allele` - the reference allele
    /// * `alt_allele` - the alternate allele
    pub fn new(chrom: &str, position: u64, id: &str, ref_allele: &str, alt_allele: &str) -> Self {
        Self {
            chrom: normalize_chrom(chrom),
            position,
            id: normalize_id(id),
            ref_allele: normalize_allele(ref_allele),
            alt_allele: normalize_allele(alt_allele)
        }
    }

    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn ref_allele(&self) -> &str {
        &self.ref_allele
    }

    pub fn alt_allele(&self) -> &str {
        &self.alt_allele
    }
}

/// Parses an autosome label ("1".."22") into its number, returning None for anything else.
pub fn autosome_number(chrom: &str) -> Option<u8> {
    match chrom.parse::<u8>() {
        Ok(v) if (1..=22).contains(&v) && !chrom.starts_with('0') => Some(v),
        _ => None
    }
}

/// A single row of an allele-frequency table
#[derive(Clone, Debug, PartialEq)]
pub struct FrequencyRecord {
    /// The variant this frequency belongs to
    key: VariantKey,
    /// The observed frequency, None if there was no observation
    frequency: Option<f64>
}

impl FrequencyRecord {
    pub fn new(key: VariantKey, frequency: Option<f64>) -> Self {
        Self { key, frequency }
    }

    pub fn key(&self) -> &VariantKey {
        &self.key
    }

    pub fn frequency(&self) -> Option<f64> {
        self.frequency
    }

    /// Splits this record into the key and the frequency
    pub fn into_parts(self) -> (VariantKey, Option<f64>) {
        (self.key, self.frequency)
    }
}

/// A single row of the annotated reference panel: a core variant plus the (possibly missing) frequency.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceRecord {
    /// The core variant
    key: VariantKey,
    /// Sub-population frequency from the frequency table, None if unmatched
    frequency: Option<f64>
}

impl ReferenceRecord {
    pub fn new(key: VariantKey, frequency: Option<f64>) -> Self {
        Self { key, frequency }
    }

    pub fn key(&self) -> &VariantKey {
        &self.key
    }

    pub fn frequency(&self) -> Option<f64> {
        self.frequency
    }
}
