// Runtime configuration: CLI flags for the server, environment variables
// for the assistant credentials.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::assistant::{DEFAULT_BASE_URL, DEFAULT_MODEL};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct ServerOptions {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "0.0.0.0:3001")]
    pub addr: SocketAddr,

    /// Path to the SQLite database file
    #[arg(long, default_value = "energy.db")]
    pub db: PathBuf,

    /// Skip seeding the demo energy centers on first start
    #[arg(long)]
    pub no_seed: bool,
}

/// Credentials and endpoint for the assistant upstream. The key never
/// comes from the command line; it is read from the environment only.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl AssistantConfig {
    /// Reads `GEMINI_API_KEY` (required), `GEMINI_BASE_URL` and
    /// `GEMINI_MODEL` (optional overrides). Returns `None` when no key is
    /// set, in which case the chat endpoint reports itself unavailable.
    pub fn from_env() -> Option<Self> {
        let api_key = non_empty_env("GEMINI_API_KEY")?;
        let base_url =
            non_empty_env("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = non_empty_env("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Some(AssistantConfig {
            api_key,
            base_url,
            model,
        })
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_the_demo_port() {
        let options = ServerOptions::parse_from(["voltgrid"]);
        assert_eq!(options.addr, "0.0.0.0:3001".parse().unwrap());
        assert_eq!(options.db, PathBuf::from("energy.db"));
        assert!(!options.no_seed);
    }

    #[test]
    fn flags_override_defaults() {
        let options = ServerOptions::parse_from([
            "voltgrid",
            "--addr",
            "127.0.0.1:8080",
            "--db",
            "/tmp/grid.db",
            "--no-seed",
        ]);
        assert_eq!(options.addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(options.db, PathBuf::from("/tmp/grid.db"));
        assert!(options.no_seed);
    }
}
