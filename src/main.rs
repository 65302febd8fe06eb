use anyhow::Result;
use clap::Parser;

mod brew;
mod cli;
mod config;
mod gui;
mod tags;
mod utils;

use cli::Cli;

fn main() -> Result<()> {
    if utils::is_root() {
        utils::print_error("Homebrew refuses to run as root; run brewdeck as a regular user");
        std::process::exit(1);
    }

    let args: Vec<String> = std::env::args().collect();

    // No arguments: open the GUI. Anything else goes through the CLI.
    if args.len() == 1 {
        match gui::run() {
            Ok(_) => Ok(()),
            Err(e) => {
                eprintln!("[ERROR] GUI failed: {:?}", e);
                Err(e.into())
            }
        }
    } else {
        Cli::parse().run()
    }
}
