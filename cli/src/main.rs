mod aws;
mod commands;
mod config;
mod error;
mod logger;
mod runner;
mod writer;

use crate::commands::stack::StackCommands;
use crate::commands::Commands;
use crate::config::{Config, Overrides};
use crate::error::Error;
use crate::logger::Logger;
use crate::runner::{Runnable, Runner};
use crate::writer::Writer;
use clap::{ArgAction, Parser};

#[derive(Parser)]
#[command(
    arg_required_else_help = true,
    name = "delambda",
    version,
    about = "Inspect Lambda functions deployed with CloudFormation",
    long_about = "Inspect Lambda functions deployed with CloudFormation.\n\nSettings are read from delambda.toml in the working directory, DELAMBDA_* env vars and the flags below, in that order of precedence."
)]
struct Cli {
    /// AWS region, overrides delambda.toml and DELAMBDA_REGION
    #[arg(long, global = true)]
    region: Option<String>,

    /// Named AWS profile, overrides delambda.toml and DELAMBDA_PROFILE
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Print JSON instead of human readable text
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Derive a runner from the command and run it
async fn run(command: &impl Runnable, writer: &Writer, config: &Config) -> Result<(), Error> {
    command.runner(writer, config).run().await
}

#[tokio::main]
async fn main() {
    Logger::init();
    let cli = Cli::parse();
    let writer = Writer::new(cli.json);

    let overrides = Overrides {
        region: cli.region,
        profile: cli.profile,
    };

    let result = match Config::load(&overrides) {
        Ok(config) => match &cli.command {
            Commands::Stack(StackCommands::Functions(cmd)) => run(cmd, &writer, &config).await,
        },

        Err(err) => Err(Error::from(err.wrap_err(Error::new(
            "Invalid configuration",
            Some("Check delambda.toml and DELAMBDA_* env vars."),
        )))),
    };

    if let Err(error) = result {
        if let Err(output_error) = writer.error(&error) {
            eprintln!("{output_error}");
        }

        std::process::exit(1);
    }
}
