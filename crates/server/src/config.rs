use std::path::PathBuf;

use clap::Parser;
use gleaner_core::FetchConfig;
use gleaner_core::store::DEFAULT_OUTPUT_DIR;

#[derive(Parser, Debug, Clone)]
#[command(name = "gleaner-server")]
#[command(about = "HTTP API for page extraction, CSV persistence and keyword statistics", long_about = None)]
pub struct Config {
    #[arg(long, env = "GLEANER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "GLEANER_PORT", default_value = "5100")]
    pub port: u16,

    /// Directory holding persisted CSV files
    #[arg(long, env = "GLEANER_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Upstream fetch timeout in seconds
    #[arg(long, env = "GLEANER_FETCH_TIMEOUT", default_value = "10")]
    pub fetch_timeout: u64,

    #[arg(long, env = "GLEANER_USER_AGENT")]
    pub user_agent: Option<String>,

    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn fetch_config(&self) -> FetchConfig {
        let defaults = FetchConfig::default();
        FetchConfig {
            timeout: self.fetch_timeout,
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["gleaner-server"]).unwrap();
        assert_eq!(config.port, 5100);
        assert_eq!(config.output_dir, PathBuf::from("crawled_data"));
        assert_eq!(config.fetch_config().timeout, 10);
    }

    #[test]
    fn test_overrides() {
        let config = Config::try_parse_from([
            "gleaner-server",
            "--port",
            "8080",
            "--output-dir",
            "/tmp/out",
            "--fetch-timeout",
            "3",
            "--user-agent",
            "probe/1.0",
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
        let fetch = config.fetch_config();
        assert_eq!(fetch.timeout, 3);
        assert_eq!(fetch.user_agent, "probe/1.0");
    }
}
