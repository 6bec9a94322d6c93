pub mod toml_config;

pub use toml_config::EnhancerConfig;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "ad-enhancer")]
#[command(about = "Enrich an ad request with demographics, publisher and geo data")]
pub struct CliConfig {
    #[arg(long, help = "Request JSON file (reads stdin when omitted)")]
    pub input: Option<PathBuf>,

    #[arg(long, help = "TOML configuration file (environment variables when omitted)")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Pretty-print the enriched request")]
    pub pretty: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn load_config(&self) -> Result<EnhancerConfig> {
        match &self.config {
            Some(path) => EnhancerConfig::from_file(path),
            None => EnhancerConfig::from_env(),
        }
    }

    pub fn read_input(&self) -> Result<String> {
        match &self.input {
            Some(path) => Ok(std::fs::read_to_string(path)?),
            None => Ok(std::io::read_to_string(std::io::stdin())?),
        }
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_cli_args() {
        let cli = CliConfig::parse_from([
            "ad-enhancer",
            "--input",
            "request.json",
            "--config",
            "enhancer.toml",
            "--verbose",
        ]);

        assert_eq!(cli.input, Some(PathBuf::from("request.json")));
        assert_eq!(cli.config, Some(PathBuf::from("enhancer.toml")));
        assert!(cli.verbose);
        assert!(!cli.pretty);
    }

    #[test]
    fn test_read_input_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(br#"{"site":{"id":"foo123"}}"#)
            .unwrap();

        let cli = CliConfig::parse_from([
            "ad-enhancer",
            "--input",
            temp_file.path().to_str().unwrap(),
        ]);

        assert_eq!(cli.read_input().unwrap(), r#"{"site":{"id":"foo123"}}"#);
    }
}
