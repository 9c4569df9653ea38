
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
pub struct FormatGwasSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    gwasmerge_version: String,

    /// Raw author summary statistics with MarkerName, A1, A2, EAF, Beta, SE, Pval (TSV)
    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "input")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub raw_filename: PathBuf,

    /// Output formatted GWAS (TSV, gzipped if it ends in .gz)
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_filename: PathBuf,

    /// Constant sample size for every row [default: read the N column]
    #[clap(short = 'n')]
    #[clap(long = "sample-size")]
    #[clap(value_name = "INT")]
    #[clap(help_heading = Some("Format parameters"))]
    pub sample_size: Option<u64>,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_format_gwas_settings(mut settings: FormatGwasSettings) -> anyhow::Result<FormatGwasSettings> {
    // hard code the version in
    settings.gwasmerge_version = FULL_VERSION.clone();
    info!("gwasmerge version: {:?}", &settings.gwasmerge_version);
    info!("Sub-command: format-gwas");
    info!("Inputs:");

    check_required_filename(&settings.raw_filename, "Raw GWAS")?;
    info!("\tRaw GWAS: {:?}", &settings.raw_filename);

    info!("Outputs:");
    info!("\tFormatted GWAS: {:?}", &settings.output_filename);

    info!("Format parameters:");
    if let Some(n) = settings.sample_size {
        ensure!(n > 0, "--sample-size must be >0");
        info!("\tSample size: {n}");
    } else {
        info!("\tSample size: from N column");
    }

    Ok(settings)
}
