use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = helena_api::Args::parse();

	helena_api::run(args).await
}
