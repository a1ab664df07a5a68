pub(crate) mod functions;

use crate::commands::stack::functions::FunctionsCommand;
use clap::Subcommand;

#[derive(Subcommand)]
pub(crate) enum StackCommands {
    /// List Lambda functions of a stack,
    /// with runtime, memory, timeout and last update time of each.
    Functions(FunctionsCommand),
}
