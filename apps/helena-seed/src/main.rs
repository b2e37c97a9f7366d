use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = helena_seed::Args::parse();

	helena_seed::run(args).await
}
