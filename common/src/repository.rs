use crate::context::Context;
use crate::function::Function;
use crate::stack::StackName;
use async_trait::async_trait;

/// Maps a stack to the names of the functions deployed in it
#[async_trait]
pub trait StackInspector: Send + Sync {
    /// Every function name currently associated with the stack
    ///
    /// The order is up to the implementation and is kept by the callers.
    /// Fails if the stack does not exist or could not be listed.
    async fn list_functions(&self, ctx: &Context, stack: &StackName) -> eyre::Result<Vec<String>>;
}

/// Resolves a function name into the full record
#[async_trait]
pub trait FunctionRepository: Send + Sync {
    async fn find_by_name(&self, ctx: &Context, name: &str) -> eyre::Result<Function>;
}
