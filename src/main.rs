use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;

use badgery::config::Config;
use badgery::context::RequestContext;
use badgery::server::{self, BadgeService, Router};

#[derive(Parser)]
#[command(name = "badgery")]
#[command(version, about = "Badge server for registries, endpoints and remote documents")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve badges over HTTP (default)
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Resolve one badge, e.g. `/badge/build_passing?color=green`, and print its markup
    Render { target: String },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async {
            match cli.command {
                None => run_server(config).await,
                Some(Command::Serve { host, port }) => {
                    if host.is_some() {
                        config.server.host = host;
                    }
                    if let Some(port) = port {
                        config.server.port = port;
                    }
                    run_server(config).await
                }
                Some(Command::Render { target }) => render(&config, &target).await,
            }
        })
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    let _guard = badgery::logging::init(&config.log)?;

    let router = Router::from_config(&config)?;
    let addr = format!("{}:{}", config.bind_host(), config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(version = env!("CARGO_PKG_VERSION"), "Listening on {}", addr);

    server::serve(listener, BadgeService::new(router)).await
}

async fn render(config: &Config, target: &str) -> anyhow::Result<()> {
    let _guard = badgery::logging::init(&config.log)?;

    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    };
    let router = Router::from_config(config)?;
    let (markup, _) = router.render(&RequestContext::new(), path, query).await?;
    println!("{}", markup);
    Ok(())
}
