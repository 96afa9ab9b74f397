use bankloans_lib::{AnalysisSnapshot, BankResult, LoanValue, Selection, Selector};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("CLI crate should be inside workspace")
        .to_path_buf()
}

fn load_json(path: PathBuf) -> Value {
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("read {}: {}", path.display(), e));
    serde_json::from_str(&text).expect("file is valid JSON")
}

fn load_schema(name: &str) -> Value {
    load_json(workspace_root().join("schema").join(name))
}

fn time_series_fixture() -> Value {
    load_json(workspace_root().join("callreport_api/tests/fixtures/time_series.json"))
}

fn snapshot_fixture() -> Value {
    load_json(workspace_root().join("bankloans_lib/tests/fixtures/snapshot.json"))
}

fn validator(name: &str) -> jsonschema::Validator {
    jsonschema::draft202012::new(&load_schema(name))
        .unwrap_or_else(|e| panic!("{name} compiles: {e}"))
}

// ---------------------------------------------------------------------------
// Positive validation
// ---------------------------------------------------------------------------

#[test]
fn test_time_series_fixture_conforms_to_schema() {
    let data = time_series_fixture();
    let result = validator("metric_sample.schema.json").validate(&data);
    if let Err(e) = &result {
        panic!("time series fixture failed validation: {e}");
    }
}

#[test]
fn test_snapshot_fixture_conforms_to_schema() {
    let data = snapshot_fixture();
    let result = validator("analysis_snapshot.schema.json").validate(&data);
    if let Err(e) = &result {
        panic!("snapshot fixture failed validation: {e}");
    }
}

#[test]
fn test_snapshot_fixture_loads() {
    let snapshot: AnalysisSnapshot =
        serde_json::from_value(snapshot_fixture()).expect("fixture deserializes");
    assert_eq!(snapshot.reporting_period, "6/30/2024");
    assert_eq!(snapshot.selection.county, Selector::value("Travis"));
    assert_eq!(snapshot.results[0].total, LoanValue::Amount(20_000));
    assert!(snapshot.results[1].is_error());
}

#[test]
fn test_serialized_snapshot_conforms_to_schema() {
    let snapshot = AnalysisSnapshot::new(
        "3/31/2024",
        Selection::new(Selector::value("LA"), Selector::All, Selector::All),
        vec![BankResult {
            bank_name: "Bayou Community Bank".to_string(),
            city: "Baton Rouge".to_string(),
            state: "LA".to_string(),
            county: "East Baton Rouge".to_string(),
            residential: LoanValue::Amount(0),
            other: LoanValue::Amount(30_000),
            total: LoanValue::Amount(30_000),
        }],
    );
    let value = serde_json::to_value(&snapshot).unwrap();
    assert!(validator("analysis_snapshot.schema.json").is_valid(&value));
}

// ---------------------------------------------------------------------------
// Negative validation
// ---------------------------------------------------------------------------

#[test]
fn test_time_series_schema_rejects_missing_code() {
    let mut data = time_series_fixture();
    data[0].as_object_mut().unwrap().remove("mdrm");
    assert!(!validator("metric_sample.schema.json").is_valid(&data));
}

#[test]
fn test_time_series_schema_rejects_string_amount() {
    let mut data = time_series_fixture();
    data[1]["int_data"] = json!("12");
    assert!(!validator("metric_sample.schema.json").is_valid(&data));
}

#[test]
fn test_snapshot_schema_rejects_unknown_marker() {
    let mut data = snapshot_fixture();
    data["results"][1]["Total Construction Loans"] = json!("N/A");
    assert!(!validator("analysis_snapshot.schema.json").is_valid(&data));
}

#[test]
fn test_snapshot_schema_rejects_missing_column() {
    let mut data = snapshot_fixture();
    data["results"][0]
        .as_object_mut()
        .unwrap()
        .remove("Total Construction Loans");
    assert!(!validator("analysis_snapshot.schema.json").is_valid(&data));
}

#[test]
fn test_snapshot_schema_rejects_additional_properties() {
    let mut data = snapshot_fixture();
    data["metric"] = json!("total");
    assert!(!validator("analysis_snapshot.schema.json").is_valid(&data));
}

#[test]
fn test_empty_results_conform() {
    let mut data = snapshot_fixture();
    data["results"] = json!([]);
    assert!(validator("analysis_snapshot.schema.json").is_valid(&data));
    assert!(validator("metric_sample.schema.json").is_valid(&json!([])));
}
