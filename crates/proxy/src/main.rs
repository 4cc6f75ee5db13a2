use clap::Parser;
use simhub_proxy::{cli::Cli, logging, server};

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	if let Err(err) = server::run(cli).await {
		eprintln!("simhub: {err:#}");
		std::process::exit(1);
	}
}
