//! Configuration file handling

use miette::{IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::args::OutputFormat;

pub const CONFIG_FILE_NAME: &str = "sqlsift.toml";

/// Configuration for sqlsift
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Log file paths or glob patterns
    #[serde(default)]
    pub files: Vec<String>,

    /// Output format (human, json)
    #[serde(default)]
    pub format: Option<String>,

    /// Where to write the report (stdout when absent)
    #[serde(default)]
    pub report_file: Option<String>,

    /// Tolerate missing log files
    #[serde(default)]
    pub allow_missing: bool,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).into_diagnostic()?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).into_diagnostic()
    }

    /// Try to find and load sqlsift.toml in current directory or parent directories
    pub fn find_and_load() -> Result<Option<Self>> {
        let mut current_dir = std::env::current_dir().into_diagnostic()?;

        loop {
            let config_path = current_dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Ok(Some(Self::from_file(&config_path)?));
            }

            if !current_dir.pop() {
                break;
            }
        }

        Ok(None)
    }

    /// Merge CLI arguments into configuration
    /// CLI arguments take precedence over config file values
    pub fn merge_with_args(
        mut self,
        files: &[PathBuf],
        format: Option<OutputFormat>,
        output: &Option<PathBuf>,
        allow_missing: bool,
    ) -> Self {
        if !files.is_empty() {
            self.files = files.iter().map(|p| p.display().to_string()).collect();
        }

        if let Some(fmt) = format {
            self.format = Some(format!("{:?}", fmt).to_lowercase());
        }

        if output.is_some() {
            self.report_file = output.as_ref().map(|p| p.display().to_string());
        }

        if allow_missing {
            self.allow_missing = true;
        }

        self
    }

    pub fn output_format(&self) -> OutputFormat {
        match self.format.as_deref() {
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Human,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml() {
        let config = Config::from_toml(
            r#"
            files = ["logs/*.log"]
            format = "json"
            report_file = "target/sql-report.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.files, vec!["logs/*.log"]);
        assert_eq!(config.output_format(), OutputFormat::Json);
        assert_eq!(config.report_file.as_deref(), Some("target/sql-report.json"));
        assert!(!config.allow_missing);
    }

    #[test]
    fn test_cli_overrides_file() {
        let config = Config {
            files: vec!["a.log".to_string()],
            format: Some("json".to_string()),
            ..Config::default()
        };

        let merged = config.merge_with_args(
            &[PathBuf::from("b.log")],
            Some(OutputFormat::Human),
            &None,
            true,
        );
        assert_eq!(merged.files, vec!["b.log"]);
        assert_eq!(merged.output_format(), OutputFormat::Human);
        assert!(merged.allow_missing);
        assert!(merged.report_file.is_none());
    }

    #[test]
    fn test_empty_args_keep_file_values() {
        let config = Config {
            files: vec!["a.log".to_string()],
            ..Config::default()
        };
        let merged = config.clone().merge_with_args(&[], None, &None, false);
        assert_eq!(merged, config);
    }
}
