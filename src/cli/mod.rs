/*!
# CLI module
Command line interface functionality that is specific to gwasmerge.
*/

/// The main CLI module that contains the top-level CLI parser and help text
pub mod core;
/// The annotate CLI subcommand
pub mod annotate;
/// The sample-list, region-lists, and rsid-list CLI subcommands
pub mod auxiliary;
/// The build-reference CLI subcommand
pub mod build_reference;
/// The format-gwas CLI subcommand
pub mod format_gwas;
/// The inspect CLI subcommand
pub mod inspect;
/// The merge-gwas CLI subcommand
pub mod merge_gwas;
