
/// Resolves variant identifiers into coordinates and population frequencies
pub mod annotator;
/// Sample, region, and rsID list builders
pub mod auxiliary_lists;
/// Command line interface functionality
pub mod cli;
/// Contains various shared data types
pub mod data_types;
/// Reformats raw author summary statistics
pub mod gwas_formatter;
/// Joins a GWAS with the reference panel on rsID
pub mod gwas_merger;
/// Tooling for parsing input files into meaningful structs / data
pub mod parsing;
/// Joins core variants with allele frequencies on the full variant key
pub mod reference_builder;
/// Column, shape, and preview reporting for any table
pub mod table_inspector;
/// Various utility functions that tend to be very generic
pub mod util;
/// HTTP client for the remote variant annotation service
pub mod variant_service;
/// All output writers
pub mod writers;
