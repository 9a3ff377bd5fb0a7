use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use yc_vision_api::{config, server};

#[derive(Parser, Debug)]
#[command(
    name = "yc-vision-api",
    version,
    about = "HTTP gateway for Yandex Cloud Vision — text recognition, moderation and face detection"
)]
struct Cli {
    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Address to listen on (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = config::Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => config::Config::default_path()?,
        };
        println!("Default config written to {}", save_path.display());
        println!("Credentials come from iam_token, catalog_id and imgur_client_id (env or .env).");
        return Ok(());
    }

    let mut config = config::Config::load(cli.config.as_deref())?;
    config.apply_env();

    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    server::serve(&config).await
}
