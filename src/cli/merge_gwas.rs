
use anyhow::ensure;
use clap::Args;
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::core::{check_required_filename, AFTER_HELP, FULL_VERSION};

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct MergeGwasSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    gwasmerge_version: String,

    /// Formatted GWAS table (TSV)
    #[clap(required = true)]
    #[clap(short = 'g')]
    #[clap(long = "gwas")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub gwas_filename: PathBuf,

    /// Reference panel from build-reference (TSV)
    #[clap(required = true)]
    #[clap(short = 'r')]
    #[clap(long = "reference")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub reference_filename: PathBuf,

    /// Output merged table (TSV, gzipped if it ends in .gz)
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_filename: PathBuf,

    /// Output list of unmatched rsIDs, one per line
    #[clap(required = true)]
    #[clap(short = 'u')]
    #[clap(long = "output-unmatched")]
    #[clap(value_name = "TXT")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_unmatched_filename: PathBuf,

    /// Optional output merge summary (JSON)
    #[clap(long = "output-summary")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_summary_filename: Option<PathBuf>,

    /// Name of the allele frequency column in the reference panel
    #[clap(long = "af-column")]
    #[clap(value_name = "COLUMN")]
    #[clap(default_value = "AF_EUR")]
    #[clap(help_heading = Some("Merge parameters"))]
    pub af_column: String,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_merge_gwas_settings(mut settings: MergeGwasSettings) -> anyhow::Result<MergeGwasSettings> {
    // hard code the version in
    settings.gwasmerge_version = FULL_VERSION.clone();
    info!("gwasmerge version: {:?}", &settings.gwasmerge_version);
    info!("Sub-command: merge-gwas");
    info!("Inputs:");

    check_required_filename(&settings.gwas_filename, "GWAS table")?;
    info!("\tGWAS: {:?}", &settings.gwas_filename);
    check_required_filename(&settings.reference_filename, "Reference panel")?;
    info!("\tReference panel: {:?}", &settings.reference_filename);

    info!("Outputs:");
    info!("\tMerged table: {:?}", &settings.output_filename);
    info!("\tUnmatched rsIDs: {:?}", &settings.output_unmatched_filename);
    info!("\tSummary: {:?}", &settings.output_summary_filename);

    info!("Merge parameters:");
    ensure!(!settings.af_column.trim().is_empty(), "--af-column must not be empty");
    info!("\tAF column: {}", settings.af_column);

    Ok(settings)
}
