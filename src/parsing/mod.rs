/*!
# Parsing module
Contains the logic for parsing input tables into typed records.
Every loader validates its header against the columns it needs before any data row is parsed.
*/
/// Missing-value handling, numeric parsing, and output formatting for single fields
pub mod fields;
/// Whitespace-separated population panel and sample list parsing
pub mod population_panel;
/// Loaders for the core, frequency, reference, and GWAS tables
pub mod tables;
/// Shared gzip-aware readers and writers, plus header validation
pub mod table_io;
