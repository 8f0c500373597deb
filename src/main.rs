use clap::Parser;

use propdiff::Settings;
use propdiff::cli::{Cli, Commands, commands};
use propdiff::logging;

fn main() {
    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        Settings::default()
    });

    logging::init_with_config(&settings.logging);

    match cli.command {
        Some(Commands::Init { force }) => commands::init::run_init(force),
        Some(Commands::Config) => commands::init::run_config(&settings),
        None => {
            let round = cli.round.map(usize::from);
            if let Err(e) = commands::run::run_calculator(&settings, round) {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    }
}
