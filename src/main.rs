use std::path::PathBuf;

use clap::Parser;
use quay::config::Config;
use quay::server;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "quay", version, about = "Static file server")]
struct Cli {
    /// YAML config file; replaces the LISTEN/ROOT/MIN_SIZE_HINT environment
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to serve on (keeps the configured host)
    #[arg(short, long)]
    port: Option<u16>,

    /// Root directory of the file server
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Largest file, in bytes, sent as one buffered response
    #[arg(long)]
    min_size_hint: Option<u64>,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<Config> {
        let mut cfg = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::load(),
        };

        if let Some(port) = self.port {
            cfg.set_port(port);
        }
        if let Some(root) = self.root {
            cfg.root = root;
        }
        if let Some(hint) = self.min_size_hint {
            cfg.min_size_hint = hint;
        }

        Ok(cfg)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Cli::parse().into_config()?;
    cfg.validate()?;

    server::listener::run(&cfg, server::shutdown_signal()).await
}
