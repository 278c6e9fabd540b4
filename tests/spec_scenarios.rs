// Drives the regression harness against the end-to-end scenario fixture.
// No database involved — pure scoring over synthetic bundles.

use std::path::PathBuf;

use claims_engine::config::Config;
use claims_engine::regression::{self, RegressionCase};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
}

fn load_cases(name: &str) -> Vec<RegressionCase> {
    let text = std::fs::read_to_string(fixture_path(name)).expect("read fixture");
    serde_json::from_str(&text).expect("parse fixture")
}

#[test]
fn all_spec_scenarios_pass() {
    let config = Config::load_default().expect("load default config");
    let cases = load_cases("spec_scenarios.json");
    let report = regression::run_cases(&config, &cases, config.reference_date());

    for case in &report.cases {
        assert!(
            case.passed,
            "scenario {} failed: missing={:?} forbidden_found={:?}",
            case.name, case.missing_expected, case.found_forbidden
        );
    }
}
