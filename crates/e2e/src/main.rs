use clap::Parser;
use collectivo_e2e::cli::{Cli, Command};
use collectivo_e2e::{commands, logging};

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	let result = match cli.command {
		Command::Status => commands::status().await,
		Command::Check => commands::check().await,
		Command::Config => commands::config().await,
	};

	if let Err(err) = result {
		eprintln!("error: {err:#}");
		std::process::exit(1);
	}
}
