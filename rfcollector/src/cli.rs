//! Command-line interface definitions and parsing

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use rfcollector_core::DEFAULT_PORT;

use crate::config::SessionConfig;

#[derive(Parser, Debug)]
#[command(author, version, about = "Collect RFID tag reads from an LLRP reader", long_about = None)]
pub struct Cli {
    /// Reader host name or address
    #[arg(long, default_value = "Speedwayr-11-25-ab.local")]
    pub host: String,

    /// Reader LLRP port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Binary-encoded SET_READER_CONFIG message applied during bootstrap (not LTK-XML)
    #[arg(long, default_value = "reader_config.llrp")]
    pub reader_config: PathBuf,

    /// Binary-encoded ADD_ROSPEC message installed during bootstrap (not LTK-XML)
    #[arg(long, default_value = "rospec.llrp")]
    pub rospec: PathBuf,

    /// Directory for CSV output files
    #[arg(short, long, default_value = "./output")]
    pub output_dir: PathBuf,

    /// Seconds each interactive collection runs
    #[arg(short, long, default_value_t = 20)]
    pub duration_secs: u64,

    /// Listen for START/STOP/CLOSE datagrams on this UDP port
    #[arg(short, long)]
    pub udp_port: Option<u16>,

    /// Do not read commands from standard input
    #[arg(long)]
    pub no_interactive: bool,

    /// Per-transaction timeout in seconds
    #[arg(short, long)]
    pub timeout_secs: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn collection_duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }

    pub fn session_config(&self) -> SessionConfig {
        let config = SessionConfig::default();
        match self.timeout_secs {
            Some(secs) => config.with_transaction_timeout(Duration::from_secs(secs)),
            None => config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["rfcollector"]).unwrap();
        assert_eq!(cli.host, "Speedwayr-11-25-ab.local");
        assert_eq!(cli.port, 5084);
        assert_eq!(cli.output_dir, PathBuf::from("./output"));
        assert_eq!(cli.collection_duration(), Duration::from_secs(20));
        assert_eq!(cli.udp_port, None);
        assert!(!cli.no_interactive);
        assert_eq!(cli.session_config(), SessionConfig::default());
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "rfcollector",
            "--host",
            "10.0.0.5",
            "-u",
            "9000",
            "--timeout-secs",
            "3",
            "--no-interactive",
            "-d",
            "5",
        ])
        .unwrap();
        assert_eq!(cli.host, "10.0.0.5");
        assert_eq!(cli.udp_port, Some(9000));
        assert!(cli.no_interactive);
        assert_eq!(cli.collection_duration(), Duration::from_secs(5));
        assert_eq!(
            cli.session_config().transaction_timeout(),
            Duration::from_secs(3)
        );
    }
}
