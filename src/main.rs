use anyhow::Result;
use clap::Parser;
use recserve::services::serving::create_router;
use recserve::{init_tracing, AppState, Config};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    if !std::path::Path::new(&args.config).exists() {
        info!("Config file {} not found, using default configuration", args.config);
    }
    let config = Config::from_file(&args.config)?;

    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.workers.max(1))
        .enable_all()
        .build()?
        .block_on(serve(config))
}

async fn serve(config: Config) -> Result<()> {
    info!(
        "Starting recommendation server with config: {:?}",
        config.server
    );

    let addr = config.server.socket_addr()?;
    let state = AppState::new(config)?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
