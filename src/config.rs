use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

const DEFAULT_REPORT_PATTERN: &str = "public_bids_received_*.xlsx";
const DEFAULT_EXPORT_DIR: &str = "exports";
const DEFAULT_HTTP_BIND: &str = "127.0.0.1:8079";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[value(alias = "stream-http", alias = "stream_http")]
    #[serde(alias = "stream-http", alias = "stream_http")]
    Http,
    Stdio,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Http => write!(f, "http"),
            TransportKind::Stdio => write!(f, "stdio"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory scanned for bid workbooks on every render cycle.
    pub report_dir: PathBuf,
    /// Shell-style glob matched against filenames in `report_dir`.
    pub report_pattern: String,
    /// Where `export_sheet_csv` drops its `<sheet_name>.csv` files.
    pub export_dir: PathBuf,
    pub enabled_tools: Option<HashSet<String>>,
    pub transport: TransportKind,
    pub http_bind_address: SocketAddr,
}

impl ServerConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            report_dir: cli_report_dir,
            report_pattern: cli_report_pattern,
            export_dir: cli_export_dir,
            enabled_tools: cli_enabled_tools,
            transport: cli_transport,
            http_bind: cli_http_bind,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            report_dir: file_report_dir,
            report_pattern: file_report_pattern,
            export_dir: file_export_dir,
            enabled_tools: file_enabled_tools,
            transport: file_transport,
            http_bind: file_http_bind,
        } = file_config;

        let report_dir = cli_report_dir
            .or(file_report_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        let report_pattern = cli_report_pattern
            .or(file_report_pattern)
            .unwrap_or_else(|| DEFAULT_REPORT_PATTERN.to_string());
        anyhow::ensure!(
            !report_pattern.trim().is_empty(),
            "report pattern must not be empty"
        );

        let export_dir = cli_export_dir
            .or(file_export_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_DIR));
        let export_dir = if export_dir.is_absolute() {
            export_dir
        } else {
            report_dir.join(export_dir)
        };

        let enabled_tools = cli_enabled_tools
            .or(file_enabled_tools)
            .map(|tools| {
                tools
                    .into_iter()
                    .map(|tool| tool.to_ascii_lowercase())
                    .filter(|tool| !tool.is_empty())
                    .collect::<HashSet<_>>()
            })
            .filter(|set| !set.is_empty());

        let transport = cli_transport
            .or(file_transport)
            .unwrap_or(TransportKind::Stdio);

        let http_bind_address = cli_http_bind.or(file_http_bind).unwrap_or_else(|| {
            DEFAULT_HTTP_BIND
                .parse()
                .expect("default bind address valid")
        });

        Ok(Self {
            report_dir,
            report_pattern,
            export_dir,
            enabled_tools,
            transport,
            http_bind_address,
        })
    }

    pub fn ensure_report_dir(&self) -> Result<()> {
        anyhow::ensure!(
            self.report_dir.exists(),
            "report directory {:?} does not exist",
            self.report_dir
        );
        anyhow::ensure!(
            self.report_dir.is_dir(),
            "report directory {:?} is not a directory",
            self.report_dir
        );
        Ok(())
    }

    pub fn is_tool_enabled(&self, tool: &str) -> bool {
        match &self.enabled_tools {
            Some(set) => set.contains(&tool.to_ascii_lowercase()),
            None => true,
        }
    }
}

#[derive(Parser, Debug, Default, Clone)]
#[command(name = "bidbook-mcp", about = "Bid workbook review MCP server", version)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)",
        global = true
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "BIDBOOK_MCP_REPORT_DIR",
        value_name = "DIR",
        help = "Directory containing dated bid workbooks"
    )]
    pub report_dir: Option<PathBuf>,

    #[arg(
        long,
        env = "BIDBOOK_MCP_REPORT_PATTERN",
        value_name = "GLOB",
        help = "Filename glob selecting candidate workbooks"
    )]
    pub report_pattern: Option<String>,

    #[arg(
        long,
        env = "BIDBOOK_MCP_EXPORT_DIR",
        value_name = "DIR",
        help = "Directory for per-sheet CSV exports (relative paths resolve under the report directory)"
    )]
    pub export_dir: Option<PathBuf>,

    #[arg(
        long,
        env = "BIDBOOK_MCP_ENABLED_TOOLS",
        value_name = "TOOL",
        value_delimiter = ',',
        help = "Restrict execution to the provided tool names"
    )]
    pub enabled_tools: Option<Vec<String>>,

    #[arg(
        long,
        env = "BIDBOOK_MCP_TRANSPORT",
        value_enum,
        value_name = "TRANSPORT",
        help = "Transport to expose (http or stdio)"
    )]
    pub transport: Option<TransportKind>,

    #[arg(
        long,
        env = "BIDBOOK_MCP_HTTP_BIND",
        value_name = "ADDR",
        help = "HTTP bind address when using http transport"
    )]
    pub http_bind: Option<SocketAddr>,
}

#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    report_dir: Option<PathBuf>,
    report_pattern: Option<String>,
    export_dir: Option<PathBuf>,
    enabled_tools: Option<Vec<String>>,
    transport: Option<TransportKind>,
    http_bind: Option<SocketAddr>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}
