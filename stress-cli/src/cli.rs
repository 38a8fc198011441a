//! CLI argument parsing definitions

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "WiFi stress test tool - measure how your network holds up under sustained HTTP load",
    long_about = None,
    after_help = "Examples:\n  wifi-stress -i 80 -t 20          High intensity with 20 workers\n  wifi-stress -d 30 --json         30 second run, JSON summary\n  wifi-stress --list-urls          List target URLs and exit"
)]
pub struct Cli {
    /// Test intensity percentage (10-100)
    #[arg(short, long, value_name = "PERCENT")]
    pub intensity: Option<u32>,

    /// Number of concurrent workers (1-50)
    #[arg(short, long, value_name = "COUNT")]
    pub threads: Option<u32>,

    /// Base delay between a worker's requests in milliseconds (10-1000)
    #[arg(short = 'D', long, value_name = "MS")]
    pub delay: Option<u64>,

    /// Test duration in seconds; runs until Ctrl+C when omitted
    #[arg(short, long, value_name = "SECONDS")]
    pub duration: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<f64>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// List test URLs and exit
    #[arg(long)]
    pub list_urls: bool,

    /// Print a sample configuration file and exit
    #[arg(long)]
    pub sample_config: bool,

    /// Seed for random endpoint selection
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Walk the endpoints in order instead of picking at random
    #[arg(long)]
    pub round_robin: bool,

    /// Seconds between live statistics lines
    #[arg(long, value_name = "SECONDS", default_value_t = 2)]
    pub interval: u64,

    /// Print the final summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["wifi-stress"]).unwrap();
        assert_eq!(cli.intensity, None);
        assert_eq!(cli.interval, 2);
        assert!(!cli.json);
        assert!(!cli.round_robin);
    }

    #[test]
    fn test_short_and_long_flags() {
        let cli = Cli::try_parse_from([
            "wifi-stress",
            "-i",
            "80",
            "-t",
            "20",
            "-D",
            "50",
            "-d",
            "30",
            "--timeout",
            "2.5",
            "--seed",
            "9",
            "--round-robin",
            "--json",
        ])
        .unwrap();

        assert_eq!(cli.intensity, Some(80));
        assert_eq!(cli.threads, Some(20));
        assert_eq!(cli.delay, Some(50));
        assert_eq!(cli.duration, Some(30));
        assert_eq!(cli.timeout, Some(2.5));
        assert_eq!(cli.seed, Some(9));
        assert!(cli.round_robin);
        assert!(cli.json);
    }

    #[test]
    fn test_rejects_non_numeric_intensity() {
        assert!(Cli::try_parse_from(["wifi-stress", "--intensity", "high"]).is_err());
    }
}
