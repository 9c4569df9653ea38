
use clap::Args;
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::core::{check_required_filename, AFTER_HELP, FULL_VERSION};

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct InspectSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    gwasmerge_version: String,

    /// Table to inspect (TSV, optionally gzipped)
    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "input")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub input_filename: PathBuf,

    /// Optional output table summary (JSON)
    #[clap(long = "output-json")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_json_filename: Option<PathBuf>,

    /// Number of leading rows to show
    #[clap(long = "head")]
    #[clap(value_name = "ROWS")]
    #[clap(default_value = "4")]
    pub head_rows: usize,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_inspect_settings(mut settings: InspectSettings) -> anyhow::Result<InspectSettings> {
    // hard code the version in
    settings.gwasmerge_version = FULL_VERSION.clone();
    info!("gwasmerge version: {:?}", &settings.gwasmerge_version);
    info!("Sub-command: inspect");

    check_required_filename(&settings.input_filename, "Input table")?;
    info!("\tInput table: {:?}", &settings.input_filename);
    info!("\tJSON summary: {:?}", &settings.output_json_filename);
    info!("\tHead rows: {}", settings.head_rows);

    Ok(settings)
}
