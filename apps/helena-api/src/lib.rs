pub mod routes;
pub mod state;

use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;
use tokio::net::TcpListener;

use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(
	version = helena_cli::VERSION,
	rename_all = "kebab",
	styles = helena_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = helena_config::load(&args.config)?;

	helena_cli::init_tracing(&config.service.log_level);

	let http_addr: SocketAddr = config.service.http_bind.parse()?;
	let state = AppState::new(config).await?;
	let app = routes::router(state);
	let listener = TcpListener::bind(http_addr).await?;

	tracing::info!(%http_addr, "HTTP server listening.");

	axum::serve(listener, app).await?;

	Ok(())
}
