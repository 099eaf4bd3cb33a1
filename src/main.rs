use clap::Parser;

use crate::{
    cli::{Cli, Command},
    report::Reporter,
};

mod cli;
mod commands;
mod git;
mod locator;
mod notion;
mod openai;
mod page;
mod report;
#[cfg(test)]
mod testing;

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let reporter = Reporter::from_env();
    let config = &args.config;
    match args.command {
        Command::Candidates { locator } => commands::candidates(&locator),
        Command::Resolve => commands::resolve(config, &reporter)?,
        Command::Commit {
            repo,
            summarize,
            model,
            dry_run,
        } => commands::commit(config, &reporter, &repo, summarize, &model, dry_run)?,
        Command::Page {
            title,
            prompt,
            date,
            model,
        } => commands::page(config, &reporter, &title, &prompt, date.as_deref(), &model)?,
        Command::Health { model } => commands::health(config, &reporter, &model)?,
    }
    Ok(())
}
