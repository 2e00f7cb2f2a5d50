//! Web 服务器主程序入口

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use word_reader::{AppConfig, ReaderLibConfig, WebServer};

/// Word Reader Web Server
#[derive(Debug, Parser)]
#[command(name = "word-reader", version, about)]
struct Args {
    /// Bind address [default: from config, 127.0.0.1]
    #[arg(short, long)]
    bind: Option<String>,

    /// Port number [default: from config, 3000]
    #[arg(short, long)]
    port: Option<u16>,

    /// Configuration file, otherwise the default locations are searched
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write an example configuration file to this path and exit
    #[arg(long, value_name = "PATH")]
    generate_config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("word_reader=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    if let Some(path) = args.generate_config {
        ReaderLibConfig::generate_example_config(&path)?;
        println!("Example configuration written to {}", path.display());
        return Ok(());
    }

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.settings.server.bind_addr = bind;
    }
    if let Some(port) = args.port {
        config.settings.server.port = port;
    }

    WebServer::new(config).start().await?;

    Ok(())
}
