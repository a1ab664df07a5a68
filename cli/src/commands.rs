pub(crate) mod stack;

use clap::Subcommand;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Inspect deployed CloudFormation stacks
    #[clap(subcommand)]
    Stack(stack::StackCommands),
}
