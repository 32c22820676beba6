use clap::Parser;
use cli::{Cli, Subcommand};
use std::env;

mod cli;
mod logger;
mod util;
mod version;

#[macro_export]
macro_rules! log {
	($level:tt, $patter:expr $(, $values:expr)* $(,)?) => {
		log::$level!(
			target: "atspi::cli",
			$patter $(, $values)*
		)
	};
}

pub fn main() -> Result<(), anyhow::Error> {
	let cli = Cli::parse();

	logger::init(cli.log_level);
	setup_panic_hook();

	match cli.subcommand {
		Subcommand::Inspect(inspect) => inspect.run(),
		Subcommand::Run(run) => run.run(),
		Subcommand::Call(call) => call.run(),
	}
}

fn setup_panic_hook() {
	let orig_hook = std::panic::take_hook();
	std::panic::set_hook(Box::new(move |panic_info| {
		eprintln!("\n============================================================");
		eprintln!("atspi has panicked. This is a bug in atspi or in the loaded plugin.");
		eprintln!("If you can reliably reproduce this panic, include the");
		eprintln!("reproduction steps and re-run with the RUST_BACKTRACE=1 env");
		eprintln!("var set and include the backtrace in your report.");
		eprintln!();
		eprintln!("Platform: {} {}", env::consts::OS, env::consts::ARCH);
		eprintln!("Version: {} ({})", version::atspi(), version::GIT_COMMIT_HASH);
		eprintln!("Args: {:?}", env::args().collect::<Vec<_>>());
		eprintln!();
		orig_hook(panic_info);
		std::process::exit(1);
	}));
}
