
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
pub struct SampleListSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    gwasmerge_version: String,

    /// Population panel with sample and super_pop columns (whitespace separated)
    #[clap(required = true)]
    #[clap(short = 'p')]
    #[clap(long = "panel")]
    #[clap(value_name = "PANEL")]
    #[clap(help_heading = Some("Input/Output"))]
    pub panel_filename: PathBuf,

    /// Related individuals to exclude, first column; skipped if the file does not exist
    #[clap(short = 'r')]
    #[clap(long = "related")]
    #[clap(value_name = "TXT")]
    #[clap(help_heading = Some("Input/Output"))]
    pub related_filename: Option<PathBuf>,

    /// Output sample list, one per line
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output")]
    #[clap(value_name = "TXT")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_filename: PathBuf,

    /// Super-population to keep (case-insensitive)
    #[clap(long = "super-population")]
    #[clap(value_name = "POP")]
    #[clap(default_value = "EUR")]
    #[clap(help_heading = Some("Sample parameters"))]
    pub super_population: String,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_sample_list_settings(mut settings: SampleListSettings) -> anyhow::Result<SampleListSettings> {
    // hard code the version in
    settings.gwasmerge_version = FULL_VERSION.clone();
    info!("gwasmerge version: {:?}", &settings.gwasmerge_version);
    info!("Sub-command: sample-list");
    info!("Inputs:");

    check_required_filename(&settings.panel_filename, "Population panel")?;
    info!("\tPopulation panel: {:?}", &settings.panel_filename);
    // a missing related list is tolerated downstream
    info!("\tRelated individuals: {:?}", &settings.related_filename);

    info!("Outputs:");
    info!("\tSample list: {:?}", &settings.output_filename);

    info!("Sample parameters:");
    ensure!(!settings.super_population.trim().is_empty(), "--super-population must not be empty");
    info!("\tSuper-population: {}", settings.super_population);

    Ok(settings)
}

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct RegionListSettings {
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

    /// Output folder for the chr{N}.regions.txt files
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-folder")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_folder: PathBuf,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_region_list_settings(mut settings: RegionListSettings) -> anyhow::Result<RegionListSettings> {
    // hard code the version in
    settings.gwasmerge_version = FULL_VERSION.clone();
    info!("gwasmerge version: {:?}", &settings.gwasmerge_version);
    info!("Sub-command: region-lists");
    info!("Inputs:");

    check_required_filename(&settings.core_filename, "Core variant table")?;
    info!("\tCore variants: {:?}", &settings.core_filename);

    info!("Outputs:");
    info!("\tRegion folder: {:?}", &settings.output_folder);

    Ok(settings)
}

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct RsidListSettings {
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

    /// Column holding the identifiers
    #[clap(long = "id-column")]
    #[clap(value_name = "COLUMN")]
    #[clap(default_value = "SNP")]
    #[clap(help_heading = Some("Input/Output"))]
    pub id_column: String,

    /// Output rsID list, one per line
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output")]
    #[clap(value_name = "TXT")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_filename: PathBuf,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_rsid_list_settings(mut settings: RsidListSettings) -> anyhow::Result<RsidListSettings> {
    // hard code the version in
    settings.gwasmerge_version = FULL_VERSION.clone();
    info!("gwasmerge version: {:?}", &settings.gwasmerge_version);
    info!("Sub-command: rsid-list");
    info!("Inputs:");

    check_required_filename(&settings.gwas_filename, "GWAS table")?;
    info!("\tGWAS: {:?}", &settings.gwas_filename);
    info!("\tIdentifier column: {:?}", &settings.id_column);

    info!("Outputs:");
    info!("\trsID list: {:?}", &settings.output_filename);

    Ok(settings)
}
