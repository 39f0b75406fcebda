use assert_matches::assert_matches;
use bidbook_mcp::ReportError;
use bidbook_mcp::resolve::resolve_latest;
use std::path::Path;

mod support;

use support::{TestWorkspace, touch_file};

#[test]
fn empty_directory_resolves_to_none() {
    let workspace = TestWorkspace::new();
    let resolved = resolve_latest(workspace.root(), "*.xlsx").expect("resolve");
    assert!(resolved.is_none());
}

#[test]
fn undated_set_falls_back_to_lexicographic_max() {
    let workspace = TestWorkspace::new();
    touch_file(&workspace.path("aaa_report.xlsx"));
    touch_file(&workspace.path("mmm_report.xlsx"));
    touch_file(&workspace.path("zzz_report.xlsx"));

    let resolved = resolve_latest(workspace.root(), "*.xlsx")
        .expect("resolve")
        .expect("candidate");
    assert_eq!(resolved.file_name().unwrap(), "zzz_report.xlsx");
}

#[test]
fn a_single_dated_file_beats_any_undated_name() {
    let workspace = TestWorkspace::new();
    touch_file(&workspace.path("zzz_report.xlsx"));
    touch_file(&workspace.path("report_2020-01-01.xlsx"));

    let resolved = resolve_latest(workspace.root(), "*.xlsx")
        .expect("resolve")
        .expect("candidate");
    assert_eq!(resolved.file_name().unwrap(), "report_2020-01-01.xlsx");
}

#[test]
fn latest_filename_date_wins() {
    let workspace = TestWorkspace::new();
    touch_file(&workspace.path("bids_2025-09-19.xlsx"));
    touch_file(&workspace.path("bids_2025-10-01.xlsx"));
    touch_file(&workspace.path("bids_2024-12-31.xlsx"));

    let resolved = resolve_latest(workspace.root(), "*.xlsx")
        .expect("resolve")
        .expect("candidate");
    assert_eq!(resolved.file_name().unwrap(), "bids_2025-10-01.xlsx");
}

#[test]
fn calendar_invalid_date_counts_as_undated() {
    let workspace = TestWorkspace::new();
    touch_file(&workspace.path("bids_2025-13-40.xlsx"));
    touch_file(&workspace.path("bids_2020-01-01.xlsx"));

    let resolved = resolve_latest(workspace.root(), "*.xlsx")
        .expect("resolve")
        .expect("candidate");
    assert_eq!(resolved.file_name().unwrap(), "bids_2020-01-01.xlsx");
}

#[test]
fn pattern_filters_candidates_before_ranking() {
    let workspace = TestWorkspace::new();
    touch_file(&workspace.path("public_bids_received_2025-09-19.xlsx"));
    touch_file(&workspace.path("archive_2099-01-01.xlsx"));
    touch_file(&workspace.path("notes.txt"));

    let resolved = resolve_latest(workspace.root(), "public_bids_received_*.xlsx")
        .expect("resolve")
        .expect("candidate");
    assert_eq!(
        resolved.file_name().unwrap(),
        "public_bids_received_2025-09-19.xlsx"
    );
}

#[test]
fn subdirectories_are_not_scanned() {
    let workspace = TestWorkspace::new();
    touch_file(&workspace.path("nested/bids_2099-01-01.xlsx"));
    touch_file(&workspace.path("bids_2020-01-01.xlsx"));

    let resolved = resolve_latest(workspace.root(), "*.xlsx")
        .expect("resolve")
        .expect("candidate");
    assert_eq!(resolved.file_name().unwrap(), "bids_2020-01-01.xlsx");
}

#[test]
fn missing_directory_is_a_no_matching_file_condition() {
    let error = resolve_latest(Path::new("/definitely/not/here"), "*.xlsx")
        .expect_err("missing directory");
    assert_matches!(error, ReportError::NoMatchingFile { .. });
}

#[test]
fn malformed_glob_is_an_invalid_pattern_condition() {
    let workspace = TestWorkspace::new();
    let error = resolve_latest(workspace.root(), "[").expect_err("bad pattern");
    assert_matches!(error, ReportError::InvalidPattern { .. });
    assert!(error.to_string().contains('['));
}
