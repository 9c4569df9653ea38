
use anyhow::bail;
use clap::{Parser, Subcommand};
use chrono::Datelike;
use lazy_static::lazy_static;
use std::path::Path;

use crate::cli::annotate::AnnotateSettings;
use crate::cli::auxiliary::{RegionListSettings, RsidListSettings, SampleListSettings};
use crate::cli::build_reference::BuildReferenceSettings;
use crate::cli::format_gwas::FormatGwasSettings;
use crate::cli::inspect::InspectSettings;
use crate::cli::merge_gwas::MergeGwasSettings;

lazy_static! {
    /// Stores the full version string we plan to use, which is generated in build.rs
    /// # Examples
    /// * `0.3.1-6bb9635-dirty` - while on a dirty branch
    /// * `0.3.1-6bb9635` - with a fresh commit
    pub static ref FULL_VERSION: String = format!("{}-{}", env!("CARGO_PKG_VERSION"), env!("VERGEN_GIT_DESCRIBE"));

    /// Shared after help string containing the legalese.
    pub static ref AFTER_HELP: String = format!("Copyright (C) 2023-{}     The gwasmerge authors
This program comes with ABSOLUTELY NO WARRANTY; it is intended for
research use only.", chrono::Utc::now().year());
}

#[derive(Parser)]
#[clap(author,
    version = &**FULL_VERSION,
    about,
    after_help = &**AFTER_HELP)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

/// gwasmerge, a tool for lining up GWAS summary statistics with a reference panel.
/// Select a subcommand to see more usage information:
#[derive(Subcommand)]
pub enum Commands {
    /// Annotates variant identifiers with coordinates and 1000 Genomes frequencies from Ensembl
    Annotate(Box<AnnotateSettings>),
    /// Joins the core variant table with an allele frequency table
    BuildReference(Box<BuildReferenceSettings>),
    /// Joins a formatted GWAS with the reference panel on rsID
    MergeGwas(Box<MergeGwasSettings>),
    /// Reformats raw author summary statistics into the standard GWAS table
    FormatGwas(Box<FormatGwasSettings>),
    /// Writes the samples of one super-population, minus related individuals
    SampleList(Box<SampleListSettings>),
    /// Writes one position list per autosome from the core variant table
    RegionLists(Box<RegionListSettings>),
    /// Writes the distinct rsIDs of a formatted GWAS
    RsidList(Box<RsidListSettings>),
    /// Shows the columns, shape, and first rows of a table
    Inspect(Box<InspectSettings>)
}

pub fn get_cli() -> Cli {
    Cli::parse()
}

/// Checks if a file exists and will otherwise exit
/// # Arguments
/// * `filename` - the file path to check for
/// * `label` - the label to use for error messages
pub fn check_required_filename(filename: &Path, label: &str) -> anyhow::Result<()> {
    if !filename.exists() {
        bail!("{} does not exist: \"{}\"", label, filename.display());
    }

    // file exists
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_check_filenames() {
        let tmp = tempfile::tempdir().unwrap();
        let present = tmp.path().join("present.tsv");
        std::fs::write(&present, "x\n").unwrap();
        let absent = tmp.path().join("absent.tsv");

        assert!(check_required_filename(&present, "Table").is_ok());
        let err = check_required_filename(&absent, "Table").unwrap_err();
        assert!(err.to_string().starts_with("Table does not exist"));
    }

    #[test]
    fn test_parse_merge_gwas() {
        let cli = Cli::try_parse_from([
            "gwasmerge", "merge-gwas", "-g", "gwas.tsv", "-r", "ref_panel.tsv.gz",
            "-o", "merged.tsv.gz", "-u", "unmatched.txt"
        ]).unwrap();
        match cli.command {
            Commands::MergeGwas(settings) => {
                assert_eq!(settings.af_column, "AF_EUR");
                assert!(settings.output_summary_filename.is_none());
            },
            _ => panic!("wrong subcommand")
        }
    }

    #[test]
    fn test_parse_build_reference() {
        let cli = Cli::try_parse_from([
            "gwasmerge", "build-reference", "-c", "ref_core.tsv", "-f", "ref_eur_af.tsv",
            "-o", "ref_panel.tsv.gz", "--output-summary", "reference_summary.json"
        ]).unwrap();
        match cli.command {
            Commands::BuildReference(settings) => {
                assert_eq!(settings.af_column, "AF_EUR");
                assert_eq!(settings.output_summary_filename, Some(std::path::PathBuf::from("reference_summary.json")));
            },
            _ => panic!("wrong subcommand")
        }
    }
}
