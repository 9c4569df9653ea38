
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
pub struct AnnotateSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    gwasmerge_version: String,

    /// Table containing the variant identifiers, typically the formatted GWAS (TSV)
    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "input")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub input_filename: PathBuf,

    /// Column holding the identifiers
    #[clap(long = "id-column")]
    #[clap(value_name = "COLUMN")]
    #[clap(default_value = "SNP")]
    #[clap(help_heading = Some("Input/Output"))]
    pub id_column: String,

    /// Output annotation table (TSV, gzipped if it ends in .gz)
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_filename: PathBuf,

    /// Base URL of the Ensembl REST server
    #[clap(long = "server")]
    #[clap(value_name = "URL")]
    #[clap(default_value = "https://grch37.rest.ensembl.org")]
    #[clap(help_heading = Some("Service"))]
    pub server: String,

    /// Batch endpoint on the server
    #[clap(long = "endpoint")]
    #[clap(value_name = "PATH")]
    #[clap(default_value = "/variation/homo_sapiens")]
    #[clap(help_heading = Some("Service"))]
    pub endpoint: String,

    /// Maximum identifiers per request
    #[clap(long = "batch-size")]
    #[clap(value_name = "INT")]
    #[clap(default_value = "200")]
    #[clap(help_heading = Some("Service"))]
    pub batch_size: usize,

    /// Per-request timeout in seconds
    #[clap(long = "timeout")]
    #[clap(value_name = "SECONDS")]
    #[clap(default_value = "60")]
    #[clap(help_heading = Some("Service"))]
    pub timeout_secs: u64,

    /// Genome assembly whose mapping supplies the coordinates
    #[clap(long = "assembly")]
    #[clap(value_name = "NAME")]
    #[clap(default_value = "GRCh37")]
    #[clap(help_heading = Some("Annotation"))]
    pub assembly: String,

    /// Population suffix for the overall frequency column
    #[clap(long = "overall-population")]
    #[clap(value_name = "POP")]
    #[clap(default_value = "ALL")]
    #[clap(help_heading = Some("Annotation"))]
    pub overall_population: String,

    /// Population suffix for the sub-population frequency column
    #[clap(long = "sub-population")]
    #[clap(value_name = "POP")]
    #[clap(default_value = "EUR")]
    #[clap(help_heading = Some("Annotation"))]
    pub sub_population: String,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_annotate_settings(mut settings: AnnotateSettings) -> anyhow::Result<AnnotateSettings> {
    // hard code the version in
    settings.gwasmerge_version = FULL_VERSION.clone();
    info!("gwasmerge version: {:?}", &settings.gwasmerge_version);
    info!("Sub-command: annotate");
    info!("Inputs:");

    check_required_filename(&settings.input_filename, "Identifier table")?;
    info!("\tIdentifier table: {:?}", &settings.input_filename);
    info!("\tIdentifier column: {:?}", &settings.id_column);

    info!("Outputs:");
    info!("\tAnnotations: {:?}", &settings.output_filename);

    info!("Service parameters:");
    info!("\tServer: {}", settings.server);
    info!("\tEndpoint: {}", settings.endpoint);
    ensure!(settings.batch_size > 0, "--batch-size must be >0");
    info!("\tBatch size: {}", settings.batch_size);
    ensure!(settings.timeout_secs > 0, "--timeout must be >0");
    info!("\tTimeout: {}s", settings.timeout_secs);

    info!("Annotation parameters:");
    ensure!(!settings.assembly.is_empty(), "--assembly must not be empty");
    info!("\tAssembly: {}", settings.assembly);
    ensure!(!settings.overall_population.is_empty(), "--overall-population must not be empty");
    info!("\tOverall population: {}", settings.overall_population);
    ensure!(!settings.sub_population.is_empty(), "--sub-population must not be empty");
    info!("\tSub-population: {}", settings.sub_population);

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_settings(input: PathBuf) -> AnnotateSettings {
        AnnotateSettings {
            input_filename: input,
            id_column: "SNP".to_string(),
            output_filename: PathBuf::from("annot.tsv.gz"),
            server: "https://grch37.rest.ensembl.org".to_string(),
            endpoint: "/variation/homo_sapiens".to_string(),
            batch_size: 200,
            timeout_secs: 60,
            assembly: "GRCh37".to_string(),
            overall_population: "ALL".to_string(),
            sub_population: "EUR".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_check_annotate_settings() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("gwas.tsv");
        std::fs::write(&input, "SNP\nrs1\n").unwrap();

        let settings = check_annotate_settings(base_settings(input.clone())).unwrap();
        assert_eq!(settings.gwasmerge_version, *FULL_VERSION);

        let mut bad = base_settings(input);
        bad.batch_size = 0;
        assert!(check_annotate_settings(bad).is_err());

        let missing = base_settings(tmp.path().join("nope.tsv"));
        assert!(check_annotate_settings(missing).is_err());
    }
}
