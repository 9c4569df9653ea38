
use log::{LevelFilter, error, info};
use std::time::{Duration, Instant};

use gwasmerge::annotator::{AnnotatorConfigBuilder, run_annotator};
use gwasmerge::auxiliary_lists::{run_region_lists, run_rsid_list, run_sample_list};
use gwasmerge::cli::annotate::{AnnotateSettings, check_annotate_settings};
use gwasmerge::cli::auxiliary::{
    RegionListSettings, RsidListSettings, SampleListSettings,
    check_region_list_settings, check_rsid_list_settings, check_sample_list_settings
};
use gwasmerge::cli::build_reference::{BuildReferenceSettings, check_build_reference_settings};
use gwasmerge::cli::core::{Commands, get_cli};
use gwasmerge::cli::format_gwas::{FormatGwasSettings, check_format_gwas_settings};
use gwasmerge::cli::inspect::{InspectSettings, check_inspect_settings};
use gwasmerge::cli::merge_gwas::{MergeGwasSettings, check_merge_gwas_settings};
use gwasmerge::gwas_merger::{MergeOutputs, run_gwas_merger};
use gwasmerge::gwas_formatter::run_gwas_formatter;
use gwasmerge::reference_builder::{ReferenceOutputs, run_reference_builder};
use gwasmerge::table_inspector::run_table_inspector;
use gwasmerge::variant_service::{EnsemblClient, ServiceConfigBuilder, ServiceError};

/// Sets up logging before we check the other settings
fn init_logging(verbosity: u8) {
    let filter_level: LevelFilter = match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();
}

fn run_annotate(settings: AnnotateSettings) {
    // start the timer
    let start_time = Instant::now();
    init_logging(settings.verbosity);

    let settings = match check_annotate_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    // build our configurations
    let service_config = match ServiceConfigBuilder::default()
        .server(settings.server.clone())
        .endpoint(settings.endpoint.clone())
        .timeout(Duration::from_secs(settings.timeout_secs))
        .build() {
        Ok(sc) => sc,
        Err(e) => {
            error!("Error while building service config: {e:?}");
            std::process::exit(exitcode::SOFTWARE);
        }
    };

    let annotator_config = match AnnotatorConfigBuilder::default()
        .batch_size(settings.batch_size)
        .assembly(settings.assembly.clone())
        .overall_population(settings.overall_population.clone())
        .sub_population(settings.sub_population.clone())
        .build() {
        Ok(ac) => ac,
        Err(e) => {
            error!("Error while building annotator config: {e:?}");
            std::process::exit(exitcode::SOFTWARE);
        }
    };

    let client = match EnsemblClient::new(&service_config) {
        Ok(c) => c,
        Err(e) => {
            error!("Error while building HTTP client: {e:#}");
            std::process::exit(exitcode::SOFTWARE);
        }
    };

    if let Err(e) = run_annotator(
        &settings.input_filename, &settings.id_column, &client, &annotator_config, &settings.output_filename
    ) {
        error!("Error while annotating variants: {e:#}");
        if e.downcast_ref::<ServiceError>().is_some() {
            std::process::exit(exitcode::UNAVAILABLE);
        }
        std::process::exit(exitcode::IOERR);
    }

    info!("Annotation completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn run_build_reference(settings: BuildReferenceSettings) {
    // start the timer
    let start_time = Instant::now();
    init_logging(settings.verbosity);

    let settings = match check_build_reference_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    let outputs = ReferenceOutputs {
        panel_fn: &settings.output_filename,
        summary_fn: settings.output_summary_filename.as_deref()
    };
    if let Err(e) = run_reference_builder(&settings.core_filename, &settings.frequency_filename, &settings.af_column, outputs) {
        error!("Error while building reference panel: {e:#}");
        std::process::exit(exitcode::IOERR);
    }

    info!("Reference build completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn run_merge_gwas(settings: MergeGwasSettings) {
    // start the timer
    let start_time = Instant::now();
    init_logging(settings.verbosity);

    let settings = match check_merge_gwas_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    let outputs = MergeOutputs {
        merged_fn: &settings.output_filename,
        unmatched_fn: &settings.output_unmatched_filename,
        summary_fn: settings.output_summary_filename.as_deref()
    };
    if let Err(e) = run_gwas_merger(&settings.gwas_filename, &settings.reference_filename, &settings.af_column, outputs) {
        error!("Error while merging GWAS with reference: {e:#}");
        std::process::exit(exitcode::IOERR);
    }

    info!("Merge completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn run_format_gwas(settings: FormatGwasSettings) {
    // start the timer
    let start_time = Instant::now();
    init_logging(settings.verbosity);

    let settings = match check_format_gwas_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    if let Err(e) = run_gwas_formatter(&settings.raw_filename, settings.sample_size, &settings.output_filename) {
        error!("Error while formatting GWAS: {e:#}");
        std::process::exit(exitcode::IOERR);
    }

    info!("Formatting completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn run_sample_list_cmd(settings: SampleListSettings) {
    init_logging(settings.verbosity);

    let settings = match check_sample_list_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    if let Err(e) = run_sample_list(
        &settings.panel_filename, settings.related_filename.as_deref(), &settings.super_population, &settings.output_filename
    ) {
        error!("Error while building sample list: {e:#}");
        std::process::exit(exitcode::IOERR);
    }
}

fn run_region_lists_cmd(settings: RegionListSettings) {
    init_logging(settings.verbosity);

    let settings = match check_region_list_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    if let Err(e) = run_region_lists(&settings.core_filename, &settings.output_folder) {
        error!("Error while writing region lists: {e:#}");
        std::process::exit(exitcode::IOERR);
    }
}

fn run_rsid_list_cmd(settings: RsidListSettings) {
    init_logging(settings.verbosity);

    let settings = match check_rsid_list_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    if let Err(e) = run_rsid_list(&settings.gwas_filename, &settings.id_column, &settings.output_filename) {
        error!("Error while writing rsID list: {e:#}");
        std::process::exit(exitcode::IOERR);
    }
}

fn run_inspect(settings: InspectSettings) {
    init_logging(settings.verbosity);

    let settings = match check_inspect_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    if let Err(e) = run_table_inspector(&settings.input_filename, settings.head_rows, settings.output_json_filename.as_deref()) {
        error!("Error while inspecting table: {e:#}");
        std::process::exit(exitcode::IOERR);
    }
}

fn main() {
    let cli = get_cli();
    match cli.command {
        Commands::Annotate(settings) => {
            run_annotate(*settings);
        },
        Commands::BuildReference(settings) => {
            run_build_reference(*settings);
        },
        Commands::MergeGwas(settings) => {
            run_merge_gwas(*settings);
        },
        Commands::FormatGwas(settings) => {
            run_format_gwas(*settings);
        },
        Commands::SampleList(settings) => {
            run_sample_list_cmd(*settings);
        },
        Commands::RegionLists(settings) => {
            run_region_lists_cmd(*settings);
        },
        Commands::RsidList(settings) => {
            run_rsid_list_cmd(*settings);
        },
        Commands::Inspect(settings) => {
            run_inspect(*settings);
        }
    }

    info!("Process finished successfully.");
}
