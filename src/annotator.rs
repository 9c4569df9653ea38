/*!
# Variant Annotator
Resolves a list of variant identifiers into flat annotation records using a `VariantService`.
Identifiers are de-duplicated, split into fixed-size batches, and queried strictly in order.
Every unique identifier produces exactly one output record, whether or not the service knew about it.
*/
use derive_builder::Builder;
use indicatif::ProgressBar;
use itertools::Itertools;
use log::{debug, info};
use serde::Deserialize;
use std::path::Path;

use crate::data_types::annotation::VariantAnnotation;
use crate::parsing::tables::load_identifier_column;
use crate::util::progress_bar::get_progress_style;
use crate::variant_service::{ServiceError, VariantService};
use crate::writers::annotation_table::write_annotations;

/// Controls how identifiers are batched and which mapping / populations are extracted
#[derive(Builder, Clone, Debug)]
#[builder(default, build_fn(validate = "Self::validate"))]
pub struct AnnotatorConfig {
    /// Maximum identifiers per request, must not exceed the service limit
    batch_size: usize,
    /// Genome assembly whose mapping supplies the coordinates
    #[builder(setter(into))]
    assembly: String,
    /// Population label suffix for the overall frequency, e.g. "ALL"
    #[builder(setter(into))]
    overall_population: String,
    /// Population label suffix for the sub-population frequency, e.g. "EUR"
    #[builder(setter(into))]
    sub_population: String
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            batch_size: 200,
            assembly: "GRCh37".to_string(),
            overall_population: "ALL".to_string(),
            sub_population: "EUR".to_string()
        }
    }
}

impl AnnotatorConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(0) = self.batch_size {
            return Err("batch_size must be >0".to_string());
        }
        Ok(())
    }
}

impl AnnotatorConfig {
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn assembly(&self) -> &str {
        &self.assembly
    }

    pub fn overall_population(&self) -> &str {
        &self.overall_population
    }

    pub fn sub_population(&self) -> &str {
        &self.sub_population
    }
}

/// The subset of a variant payload we read
#[derive(Debug, Default, Deserialize)]
struct VariantPayload {
    #[serde(default)]
    mappings: Vec<Mapping>,
    #[serde(default)]
    populations: Vec<PopulationFrequency>
}

/// One genome-build mapping of a variant
#[derive(Debug, Deserialize)]
struct Mapping {
    assembly_name: Option<String>,
    seq_region_name: Option<String>,
    start: Option<u64>,
    strand: Option<i64>,
    allele_string: Option<String>
}

/// One population frequency entry
#[derive(Debug, Deserialize)]
struct PopulationFrequency {
    population: Option<String>,
    allele: Option<String>,
    frequency: Option<f64>
}

/// Returns true if the raw payload is an error marker instead of an annotation.
/// Non-objects count as errors, as does any object with a truthy `error` member.
/// Null, false, zero, and empty strings, arrays, or objects are not truthy.
fn is_error_marker(value: &serde_json::Value) -> bool {
    use serde_json::Value;
    let Some(object) = value.as_object() else {
        return true;
    };
    match object.get("error") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty()
    }
}

/// Splits a "REF/ALT" allele string on the first '/', upper-casing both sides.
/// Anything after the first '/' stays in the alternate, so "A/G/T" gives ("A", "G/T").
pub fn split_allele_string(allele_string: &str) -> Option<(String, String)> {
    allele_string.split_once('/')
        .map(|(r, a)| (r.to_uppercase(), a.to_uppercase()))
}

/// Converts one decoded payload into a flat record.
/// Coordinates come from the first mapping on the target assembly; population frequencies are those
/// of the alternate allele, and when several entries match the last non-null one wins.
fn parse_payload(snp: &str, payload: &VariantPayload, config: &AnnotatorConfig) -> VariantAnnotation {
    let mut annotation = VariantAnnotation::empty(snp);

    if let Some(mapping) = payload.mappings.iter()
        .find(|m| m.assembly_name.as_deref() == Some(config.assembly())) {
        annotation.chrom = mapping.seq_region_name.clone();
        annotation.position = mapping.start;
        annotation.strand = mapping.strand;
        if let Some((ref_allele, alt_allele)) = mapping.allele_string.as_deref().and_then(split_allele_string) {
            annotation.ref_allele = Some(ref_allele);
            annotation.alt_allele = Some(alt_allele);
        }
    }

    let overall_suffix = format!(":{}", config.overall_population());
    let sub_suffix = format!(":{}", config.sub_population());
    if let Some(alt_allele) = annotation.alt_allele.as_deref() {
        for entry in payload.populations.iter() {
            let population = entry.population.as_deref().unwrap_or_default();
            let is_alt = entry.allele.as_deref().map(|a| a.to_uppercase()).as_deref() == Some(alt_allele);
            if !is_alt {
                continue;
            }
            // overwrite on every match so the last entry wins; null frequencies never overwrite
            if population.ends_with(&overall_suffix) {
                annotation.af_overall = entry.frequency.or(annotation.af_overall);
            }
            if population.ends_with(&sub_suffix) {
                annotation.af_subpopulation = entry.frequency.or(annotation.af_subpopulation);
            }
        }
    }

    annotation
}

/// Converts the raw payload for one identifier, which may be missing or an error marker
pub fn annotate_identifier(snp: &str, raw: Option<&serde_json::Value>, config: &AnnotatorConfig) -> VariantAnnotation {
    let Some(value) = raw else {
        debug!("{snp}: missing from response");
        return VariantAnnotation::empty(snp);
    };
    if is_error_marker(value) {
        debug!("{snp}: service returned an error marker");
        return VariantAnnotation::empty(snp);
    }
    match VariantPayload::deserialize(value) {
        Ok(payload) => parse_payload(snp, &payload, config),
        Err(e) => {
            debug!("{snp}: failed to decode payload: {e}");
            VariantAnnotation::empty(snp)
        }
    }
}

/// Annotates every unique identifier, querying the service one batch at a time.
/// Output order follows the first occurrence of each identifier in the input.
/// # Arguments
/// * `identifiers` - the identifiers to resolve, duplicates are allowed
/// * `service` - the backing service
/// * `config` - batching and extraction settings
/// # Errors
/// * any service error other than a single rate-limit aborts the whole run; no partial result is returned
pub fn annotate_variants<S: VariantService>(
    identifiers: &[String], service: &S, config: &AnnotatorConfig
) -> Result<Vec<VariantAnnotation>, ServiceError> {
    let unique_ids: Vec<String> = identifiers.iter().unique().cloned().collect();
    let num_batches = unique_ids.len().div_ceil(config.batch_size());
    info!("Unique identifiers: {} in {num_batches} batches", unique_ids.len());

    let progress_bar = ProgressBar::new(num_batches as u64)
        .with_style(get_progress_style());
    let mut annotations: Vec<VariantAnnotation> = Vec::with_capacity(unique_ids.len());
    for (batch_index, chunk) in unique_ids.chunks(config.batch_size()).enumerate() {
        let payload = service.fetch_batch(chunk)?;
        annotations.extend(
            chunk.iter().map(|snp| annotate_identifier(snp, payload.get(snp), config))
        );
        debug!("Batch {}/{num_batches} done", batch_index + 1);
        progress_bar.inc(1);
    }
    progress_bar.finish();

    let mapped = annotations.iter().filter(|a| a.is_mapped()).count();
    info!("Mapped to {}: {mapped}/{}", config.assembly(), annotations.len());
    Ok(annotations)
}

/// Reads the identifiers from a table, annotates them against the service, and writes the annotation table.
/// # Arguments
/// * `input_fn` - table holding the identifiers, typically the formatted GWAS
/// * `id_column` - identifier column name, normally "SNP"
/// * `service` - the backing service
/// * `config` - batching and extraction settings
/// * `output_fn` - annotation table output, gzipped if it ends in .gz
/// # Errors
/// * service errors are returned as `ServiceError` wrapped in the anyhow chain, so callers can downcast them
pub fn run_annotator<S: VariantService>(
    input_fn: &Path, id_column: &str, service: &S, config: &AnnotatorConfig, output_fn: &Path
) -> anyhow::Result<u64> {
    info!("Loading identifiers from {input_fn:?}...");
    let identifiers = load_identifier_column(input_fn, id_column)?;

    let annotations = annotate_variants(&identifiers, service, config)?;

    info!("Saving annotations to {output_fn:?}...");
    write_annotations(output_fn, config.overall_population(), config.sub_population(), &annotations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant_service::BatchResponse;
    use serde_json::json;
    use std::cell::RefCell;

    /// Answers every identifier it knows and records each batch it was sent
    struct MockService {
        known: BatchResponse,
        batches: RefCell<Vec<Vec<String>>>,
        fail_on_batch: Option<usize>
    }

    impl MockService {
        fn new(known: BatchResponse) -> Self {
            Self { known, batches: RefCell::new(vec![]), fail_on_batch: None }
        }
    }

    impl VariantService for MockService {
        fn fetch_batch(&self, ids: &[String]) -> Result<BatchResponse, ServiceError> {
            let mut batches = self.batches.borrow_mut();
            batches.push(ids.to_vec());
            if self.fail_on_batch == Some(batches.len()) {
                return Err(ServiceError::Status { status: 503, body: "unavailable".to_string() });
            }
            Ok(ids.iter()
                .filter_map(|id| self.known.get(id).map(|v| (id.clone(), v.clone())))
                .collect())
        }
    }

    fn example_payload() -> serde_json::Value {
        json!({
            "name": "rs1",
            "mappings": [
                {"assembly_name": "GRCh38", "seq_region_name": "1", "start": 999, "strand": 1, "allele_string": "C/T"},
                {"assembly_name": "GRCh37", "seq_region_name": "1", "start": 100, "strand": -1, "allele_string": "a/g"}
            ],
            "populations": [
                {"population": "1000GENOMES:phase_3:ALL", "allele": "G", "frequency": 0.2},
                {"population": "1000GENOMES:phase_3:ALL", "allele": "A", "frequency": 0.8},
                {"population": "1000GENOMES:phase_3:EUR", "allele": "g", "frequency": 0.3},
                {"population": "gnomADg:EUR", "allele": "G", "frequency": 0.35},
                {"population": "gnomADg:EUR", "allele": "G", "frequency": null},
                {"population": "1000GENOMES:phase_3:EUR_X", "allele": "G", "frequency": 0.9}
            ]
        })
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_payload() {
        let config = AnnotatorConfig::default();
        let annotation = annotate_identifier("rs1", Some(&example_payload()), &config);
        assert_eq!(annotation, VariantAnnotation {
            snp: "rs1".to_string(),
            chrom: Some("1".to_string()),
            position: Some(100),
            ref_allele: Some("A".to_string()),
            alt_allele: Some("G".to_string()),
            strand: Some(-1),
            af_overall: Some(0.2),
            // last non-null matching entry wins
            af_subpopulation: Some(0.35)
        });
    }

    #[test]
    fn test_missing_assembly() {
        let config = AnnotatorConfig::default();
        let payload = json!({
            "mappings": [{"assembly_name": "GRCh38", "seq_region_name": "1", "start": 999, "allele_string": "C/T"}],
            "populations": [{"population": "1000GENOMES:phase_3:ALL", "allele": "T", "frequency": 0.2}]
        });
        let annotation = annotate_identifier("rs1", Some(&payload), &config);
        // no target mapping means no alt allele, which means no frequencies either
        assert_eq!(annotation, VariantAnnotation::empty("rs1"));
    }

    #[test]
    fn test_allele_string() {
        assert_eq!(split_allele_string("A/G"), Some(("A".to_string(), "G".to_string())));
        assert_eq!(split_allele_string("a/g/t"), Some(("A".to_string(), "G/T".to_string())));
        assert_eq!(split_allele_string("-/AT"), Some(("-".to_string(), "AT".to_string())));
        assert_eq!(split_allele_string("A"), None);

        let config = AnnotatorConfig::default();
        let payload = json!({"mappings": [{"assembly_name": "GRCh37", "seq_region_name": "2", "start": 5}]});
        let annotation = annotate_identifier("rs9", Some(&payload), &config);
        assert_eq!(annotation.chrom.as_deref(), Some("2"));
        assert_eq!(annotation.position, Some(5));
        assert!(annotation.ref_allele.is_none());
        assert!(annotation.alt_allele.is_none());
    }

    #[test]
    fn test_error_markers() {
        let config = AnnotatorConfig::default();
        assert_eq!(annotate_identifier("rs1", None, &config), VariantAnnotation::empty("rs1"));
        assert_eq!(annotate_identifier("rs1", Some(&json!({"error": "not found"})), &config), VariantAnnotation::empty("rs1"));
        assert_eq!(annotate_identifier("rs1", Some(&json!("bad")), &config), VariantAnnotation::empty("rs1"));
        assert_eq!(annotate_identifier("rs1", Some(&json!({"mappings": "bad"})), &config), VariantAnnotation::empty("rs1"));

        // an empty error member is not an error
        let payload = json!({"error": "", "mappings": [{"assembly_name": "GRCh37", "seq_region_name": "3", "start": 7}]});
        assert!(annotate_identifier("rs1", Some(&payload), &config).is_mapped());

        // falsy error members of other types
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!([]), json!({})] {
            let marker = json!({"error": falsy});
            assert!(!is_error_marker(&marker), "{marker}");
        }
        for truthy in [json!(true), json!(1), json!(-2.5), json!(["x"]), json!({"code": 1}), json!("x")] {
            let marker = json!({"error": truthy});
            assert!(is_error_marker(&marker), "{marker}");
        }
        let payload = json!({"error": 0, "mappings": [{"assembly_name": "GRCh37", "seq_region_name": "3", "start": 7}]});
        assert!(annotate_identifier("rs1", Some(&payload), &config).is_mapped());
    }

    #[test]
    fn test_cardinality_and_order() {
        let mut known = BatchResponse::default();
        known.insert("rs1".to_string(), example_payload());
        known.insert("rs3".to_string(), json!({"error": "Variant feature not found"}));
        let service = MockService::new(known);
        let config = AnnotatorConfigBuilder::default().batch_size(2).build().unwrap();

        let input = ids(&["rs4", "rs1", "rs3", "rs1", "rs2"]);
        let annotations = annotate_variants(&input, &service, &config).unwrap();
        let output_ids: Vec<&str> = annotations.iter().map(|a| a.snp.as_str()).collect();
        assert_eq!(output_ids, vec!["rs4", "rs1", "rs3", "rs2"]);
        assert!(annotations[1].is_mapped());
        assert!(!annotations[0].is_mapped());
        assert!(!annotations[2].is_mapped());
        assert_eq!(*service.batches.borrow(), vec![ids(&["rs4", "rs1"]), ids(&["rs3", "rs2"])]);
    }

    #[test]
    fn test_batch_boundary() {
        let config = AnnotatorConfig::default();

        // exactly the limit is a single request
        let input: Vec<String> = (0..200).map(|i| format!("rs{i}")).collect();
        let service = MockService::new(BatchResponse::default());
        let annotations = annotate_variants(&input, &service, &config).unwrap();
        assert_eq!(annotations.len(), 200);
        assert_eq!(service.batches.borrow().len(), 1);

        // one more splits without dropping or duplicating anything
        let input: Vec<String> = (0..201).map(|i| format!("rs{i}")).collect();
        let service = MockService::new(BatchResponse::default());
        let annotations = annotate_variants(&input, &service, &config).unwrap();
        assert_eq!(annotations.len(), 201);
        let batches = service.batches.borrow();
        assert_eq!(batches.iter().map(|b| b.len()).collect::<Vec<usize>>(), vec![200, 1]);
        let sent: Vec<String> = batches.iter().flatten().cloned().collect();
        assert_eq!(sent, input);
    }

    #[test]
    fn test_service_error_aborts() {
        let mut service = MockService::new(BatchResponse::default());
        service.fail_on_batch = Some(2);
        let config = AnnotatorConfigBuilder::default().batch_size(1).build().unwrap();
        let result = annotate_variants(&ids(&["rs1", "rs2", "rs3"]), &service, &config);
        assert!(matches!(result, Err(ServiceError::Status { status: 503, .. })));
        // the third batch is never attempted
        assert_eq!(service.batches.borrow().len(), 2);
    }

    #[test]
    fn test_empty_input() {
        let service = MockService::new(BatchResponse::default());
        let annotations = annotate_variants(&[], &service, &AnnotatorConfig::default()).unwrap();
        assert!(annotations.is_empty());
        assert!(service.batches.borrow().is_empty());
    }

    #[test]
    fn test_run_annotator() {
        let tmp = tempfile::tempdir().unwrap();
        let gwas_fn = tmp.path().join("author_formatted.tsv");
        std::fs::write(&gwas_fn, "SNP\tA1\nrs1\tA\nrs7\tC\nrs1\tA\n").unwrap();
        let output_fn = tmp.path().join("annotations.tsv.gz");

        let mut known = BatchResponse::default();
        known.insert("rs1".to_string(), example_payload());
        let service = MockService::new(known);
        let written = run_annotator(&gwas_fn, "SNP", &service, &AnnotatorConfig::default(), &output_fn).unwrap();
        assert_eq!(written, 2);

        let mut reader = crate::parsing::table_io::open_tsv(&output_fn).unwrap();
        let header: Vec<String> = reader.headers().unwrap().iter().map(|s| s.to_string()).collect();
        assert_eq!(header, crate::writers::annotation_table::annotation_header("ALL", "EUR"));
        let rows: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows.iter().map(|r| r.iter().collect::<Vec<&str>>()).collect::<Vec<_>>(), vec![
            vec!["rs1", "1", "100", "A", "G", "-1", "0.2", "0.35"],
            vec!["rs7", "", "", "", "", "", "", ""]
        ]);
    }

    #[test]
    fn test_config_validation() {
        assert!(AnnotatorConfigBuilder::default().batch_size(0).build().is_err());
        let config = AnnotatorConfigBuilder::default().sub_population("AFR").build().unwrap();
        assert_eq!(config.sub_population(), "AFR");
        assert_eq!(config.batch_size(), 200);
    }
}
