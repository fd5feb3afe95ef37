use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = pricematch_api::Args::parse();
	pricematch_api::run(args).await
}
