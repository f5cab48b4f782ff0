pub mod toml_config;

pub use toml_config::{CurriculumConfig, FieldOverride, ProgramConfig};

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "curriculum-etl")]
#[command(about = "Crawls a study-program service and writes curriculum JSON for the front-end")]
pub struct CliConfig {
    /// TOML file with programs and overrides; built-in defaults are used when omitted
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the service base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Override the output directory
    #[arg(long)]
    pub output_path: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log stage timings and memory usage")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Config file (or defaults) with command line overrides applied on top.
    pub fn resolve(&self) -> Result<CurriculumConfig> {
        let mut config = match &self.config {
            Some(path) => CurriculumConfig::from_file(path)?,
            None => CurriculumConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(output_path) = &self.output_path {
            config.output_path = output_path.clone();
        }

        Ok(config)
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_defaults() {
        let cli = CliConfig::parse_from([
            "curriculum-etl",
            "--base-url",
            "http://localhost:8080/",
            "--output-path",
            "out",
            "--verbose",
        ]);

        let config = cli.resolve().unwrap();

        assert!(cli.verbose);
        assert!(!cli.monitor);
        assert_eq!(config.base_url, "http://localhost:8080/");
        assert_eq!(config.output_path, "out");
        assert_eq!(config.programs, toml_config::default_programs());
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let cli = CliConfig::parse_from(["curriculum-etl", "--config", "/nonexistent/curriculum.toml"]);
        assert!(cli.resolve().is_err());
    }
}
