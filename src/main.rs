#![allow(missing_docs)]

use clap::{Parser, Subcommand};

mod cmd;
mod logging;

#[derive(Parser)]
#[command(name = "layoutwalk", about = "Layout snapshot inspection tools")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Print header, block statistics, and recorded roots.
	Info(cmd::info::Args),
	/// List catalog layouts or show one layout's fields.
	Layouts(cmd::layouts::Args),
	/// Visit a root record and print its value tree.
	Walk(cmd::walk::Args),
}

fn main() {
	let _logger = logging::init();

	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> layoutwalk::reflect::Result<()> {
	let cli = Cli::parse();

	match cli.command {
		Commands::Info(args) => cmd::info::run(args),
		Commands::Layouts(args) => cmd::layouts::run(args),
		Commands::Walk(args) => cmd::walk::run(args),
	}
}
