use bidbook_mcp::{CliArgs, ServerConfig, TransportKind};
use std::path::PathBuf;

mod support;

use support::TestWorkspace;

#[test]
fn defaults_apply_when_nothing_is_provided() {
    let config = ServerConfig::from_args(CliArgs::default()).expect("config");
    assert_eq!(config.report_dir, PathBuf::from("."));
    assert_eq!(config.report_pattern, "public_bids_received_*.xlsx");
    assert_eq!(config.export_dir, PathBuf::from(".").join("exports"));
    assert_eq!(config.transport, TransportKind::Stdio);
    assert!(config.enabled_tools.is_none());
}

#[test]
fn cli_values_override_config_file_values() {
    let workspace = TestWorkspace::new();
    let config_path = workspace.path("bidbook.yaml");
    std::fs::write(
        &config_path,
        "report_pattern: \"from_file_*.xlsx\"\ntransport: http\n",
    )
    .expect("write config");

    let args = CliArgs {
        config: Some(config_path),
        report_pattern: Some("from_cli_*.xlsx".to_string()),
        ..Default::default()
    };
    let config = ServerConfig::from_args(args).expect("config");
    assert_eq!(config.report_pattern, "from_cli_*.xlsx");
    // the file still fills in what the CLI left unset
    assert_eq!(config.transport, TransportKind::Http);
}

#[test]
fn relative_export_dir_resolves_under_report_dir() {
    let args = CliArgs {
        report_dir: Some(PathBuf::from("/data/reports")),
        export_dir: Some(PathBuf::from("out")),
        ..Default::default()
    };
    let config = ServerConfig::from_args(args).expect("config");
    assert_eq!(config.export_dir, PathBuf::from("/data/reports/out"));
}

#[test]
fn unsupported_config_extension_is_rejected() {
    let workspace = TestWorkspace::new();
    let config_path = workspace.path("bidbook.toml");
    std::fs::write(&config_path, "report_pattern = \"x\"").expect("write config");

    let args = CliArgs {
        config: Some(config_path),
        ..Default::default()
    };
    let error = ServerConfig::from_args(args).expect_err("bad extension");
    assert!(error.to_string().contains("unsupported config extension"));
}

#[test]
fn empty_pattern_is_rejected_fail_fast() {
    let args = CliArgs {
        report_pattern: Some("   ".to_string()),
        ..Default::default()
    };
    assert!(ServerConfig::from_args(args).is_err());
}

#[test]
fn tool_gating_is_case_insensitive() {
    let args = CliArgs {
        enabled_tools: Some(vec!["Latest_Report".to_string(), "list_sheets".to_string()]),
        ..Default::default()
    };
    let config = ServerConfig::from_args(args).expect("config");
    assert!(config.is_tool_enabled("latest_report"));
    assert!(config.is_tool_enabled("LIST_SHEETS"));
    assert!(!config.is_tool_enabled("export_sheet_csv"));
}

#[test]
fn missing_report_dir_fails_validation() {
    let args = CliArgs {
        report_dir: Some(PathBuf::from("/definitely/not/here")),
        ..Default::default()
    };
    let config = ServerConfig::from_args(args).expect("config");
    assert!(config.ensure_report_dir().is_err());
}
