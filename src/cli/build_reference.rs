
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
pub struct BuildReferenceSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    gwasmerge_version: String,

    /// Core variant table with CHROM, POS, ID, REF, ALT (TSV)
    #[clap(required = true)]
    #[clap(short = 'c')]
    #[clap(long = "core")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub core_filename: PathBuf,

    /// Allele frequency table with CHROM, POS, ID, REF, ALT and the AF column (TSV)
    #[clap(required = true)]
    #[clap(short = 'f')]
    #[clap(long = "frequencies")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub frequency_filename: PathBuf,

    /// Output reference panel (TSV, gzipped if it ends in .gz)
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_filename: PathBuf,

    /// Optional output build summary (JSON)
    #[clap(long = "output-summary")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_summary_filename: Option<PathBuf>,

    /// Name of the allele frequency column
    #[clap(long = "af-column")]
    #[clap(value_name = "COLUMN")]
    #[clap(default_value = "AF_EUR")]
    #[clap(help_heading = Some("Reference parameters"))]
    pub af_column: String,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_build_reference_settings(mut settings: BuildReferenceSettings) -> anyhow::Result<BuildReferenceSettings> {
    // hard code the version in
    settings.gwasmerge_version = FULL_VERSION.clone();
    info!("gwasmerge version: {:?}", &settings.gwasmerge_version);
    info!("Sub-command: build-reference");
    info!("Inputs:");

    check_required_filename(&settings.core_filename, "Core variant table")?;
    info!("\tCore variants: {:?}", &settings.core_filename);
    check_required_filename(&settings.frequency_filename, "Frequency table")?;
    info!("\tFrequencies: {:?}", &settings.frequency_filename);

    info!("Outputs:");
    info!("\tReference panel: {:?}", &settings.output_filename);
    info!("\tSummary: {:?}", &settings.output_summary_filename);

    info!("Reference parameters:");
    ensure!(!settings.af_column.trim().is_empty(), "--af-column must not be empty");
    info!("\tAF column: {}", settings.af_column);

    Ok(settings)
}
