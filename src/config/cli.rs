use crate::config::ConfigOverrides;
use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "etl-api-dag")]
#[command(about = "Fetch a JSON API, validate it and flatten it to CSV as a four-task DAG run")]
pub struct CliConfig {
    /// API endpoint (overrides the futurama_api_url variable)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Root directory for raw/ and processed/ (overrides futurama_base_dir)
    #[arg(long)]
    pub base_dir: Option<String>,

    /// TOML file with [variables] and [source] tables
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Logical date of the run (RFC 3339 or YYYY-MM-DDTHH:MM:SS, UTC);
    /// defaults to the latest completed schedule interval
    #[arg(long)]
    pub execution_date: Option<String>,

    /// Explicit run id
    #[arg(long)]
    pub run_id: Option<String>,

    /// HTTP timeout for the extract task
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage after each task")]
    pub monitor: bool,

    /// Print the DAG and resolved configuration without running anything
    #[arg(long)]
    pub dry_run: bool,
}

impl CliConfig {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            api_url: self.api_url.clone(),
            base_dir: self.base_dir.clone(),
            timeout_seconds: self.timeout_seconds,
            config_file: self.config.clone(),
        }
    }

    pub fn parsed_execution_date(&self) -> Result<Option<DateTime<Utc>>> {
        self.execution_date
            .as_deref()
            .map(parse_execution_date)
            .transpose()
    }
}

pub fn parse_execution_date(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| EtlError::InvalidConfigValueError {
            field: "execution_date".to_string(),
            value: value.to_string(),
            reason: format!("Expected RFC 3339 or YYYY-MM-DDTHH:MM:SS: {}", e),
        })
}
