use clap::{Parser, Subcommand};

/// Operational entry points for the end-to-end suite.
#[derive(Debug, Parser)]
#[command(name = "collectivo-e2e", version, about = "Operational checks for the collectivo end-to-end suite")]
pub struct Cli {
	/// Increase log verbosity (-v, -vv).
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	pub verbose: u8,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Probe the WebDriver hub status endpoint.
	Status,
	/// Open a session, load the application root, and report its title.
	Check,
	/// Print the resolved suite configuration as JSON.
	Config,
}

#[cfg(test)]
mod tests {
	use clap::CommandFactory;

	use super::*;

	#[test]
	fn cli_definition_is_consistent() {
		Cli::command().debug_assert();
	}

	#[test]
	fn verbosity_accumulates() {
		let cli = Cli::parse_from(["collectivo-e2e", "-vv", "status"]);
		assert_eq!(cli.verbose, 2);
		assert!(matches!(cli.command, Command::Status));
	}
}
