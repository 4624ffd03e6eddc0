mod app;
mod args;
mod commands;

use anyhow::Result;
use clap::Parser;

use args::{Cli, Command};
use callkeep_core::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        callkeep_core::set_verbose(true);
    }

    let settings = Settings::load();

    match cli.command {
        Command::Login => commands::login::run_login(&settings).await,
        Command::Logout => commands::login::run_logout(),
        Command::Save(args) => commands::save::run(&settings, args),
        Command::List => commands::list::run(&settings),
        Command::Upload(args) => commands::upload::run(&settings, args).await,
        Command::Delete(args) => commands::delete::run(&settings, args),
        Command::Config(args) => commands::config::run(settings, args),
    }
}
