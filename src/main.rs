mod agents;
mod catalog;
mod cli;
mod config;
mod error;
#[cfg(test)]
mod test_support;
mod utils;
mod workflow;

use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use config::{ConfigOverrides, RepoConfig};
use std::process;

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        unsafe {
            std::env::set_var(utils::verbose::VERBOSE_ENV, "1");
        }
    }

    let overrides = ConfigOverrides {
        catalog_path: cli.catalog,
        ipa_dir: cli.ipa_dir,
        base_url: cli.base_url,
    };

    let result = RepoConfig::resolve(cli.config.as_deref(), overrides).and_then(|config| {
        match cli.command {
            None => workflow::execute_update(config, false),
            Some(Commands::Update { dry_run }) => workflow::execute_update(config, dry_run),
            Some(Commands::List) => workflow::execute_list(&config),
            Some(Commands::Inspect { archive }) => workflow::execute_inspect(&config, archive),
        }
    });

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}
