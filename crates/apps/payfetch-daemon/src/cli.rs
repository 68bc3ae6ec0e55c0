//! Command-line interface for the provider daemon.

use clap::Parser;
use payfetch_types::DEFAULT_CHUNK_SIZE;
use std::path::PathBuf;

/// payfetch retrieval provider daemon.
///
/// Serves retrieval deals for content hosted under `--content-dir`, priced
/// by the configuration file. Send SIGHUP to reload the configuration.
#[derive(Debug, Parser)]
#[command(name = "payfetchd", version, about)]
pub struct Args {
    /// Address to listen on for requester connections
    #[arg(long, default_value = "127.0.0.1:6363", env = "PAYFETCH_LISTEN")]
    pub listen: String,

    /// Path to the provider configuration file (JSON)
    #[arg(long, env = "PAYFETCH_CONFIG")]
    pub config: PathBuf,

    /// Directory of hosted content files, named by content id
    #[arg(long, env = "PAYFETCH_CONTENT_DIR")]
    pub content_dir: PathBuf,

    /// Storage chunk size in bytes
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from([
            "payfetchd",
            "--config",
            "/tmp/provider.json",
            "--content-dir",
            "/tmp/content",
            "--listen",
            "0.0.0.0:7000",
        ]);
        assert_eq!(args.listen, "0.0.0.0:7000");
        assert_eq!(args.chunk_size, DEFAULT_CHUNK_SIZE);
    }
}
