
/// Flat per-identifier annotation from the variant service
pub mod annotation;
/// GWAS summary statistic rows, before and after the reference merge
pub mod gwas;
/// Counters and derived rates reported by the join stages
pub mod merge_summary;
/// Variant keys, frequency rows, reference rows, and the normalization shared by all joins
pub mod variants;
