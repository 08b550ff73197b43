//! Approval CLI - review scored invoice requests one at a time.

mod cli;
mod commands;
mod logging;
mod server;

use approval::PortalConfig;
use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = match PortalConfig::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Train {
            output,
            samples,
            seed,
            epochs,
        } => commands::train::run(&config, output, samples, seed, epochs),

        Commands::Generate {
            count,
            output_dir,
            seed,
        } => commands::generate::run(count, output_dir, seed),

        Commands::Review {
            input,
            fresh,
            format,
            seed,
        } => commands::review::run(&config, input, fresh, format, seed, cli.verbose),

        Commands::Serve { port } => commands::serve::run(config, port),

        Commands::Status { snapshot, json } => commands::status::run(&config, snapshot, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
