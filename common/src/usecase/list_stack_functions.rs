use crate::context::Context;
use crate::error::Error;
use crate::function::Function;
use crate::repository::{FunctionRepository, StackInspector};
use crate::stack::StackName;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;

/// Lists the Lambda functions of a CloudFormation stack together with their details
///
/// The stack inspector provides the names, then every name is resolved through the function
/// repository. The result keeps the order of the names. Any failure fails the whole call,
/// records resolved so far are thrown away.
#[derive(Clone)]
pub struct ListStackFunctions {
    functions: Arc<dyn FunctionRepository>,
    stacks: Arc<dyn StackInspector>,

    // Max number of lookups in flight
    concurrency: usize,
}

impl ListStackFunctions {
    pub fn new(functions: Arc<dyn FunctionRepository>, stacks: Arc<dyn StackInspector>) -> Self {
        ListStackFunctions {
            functions,
            stacks,
            concurrency: 1,
        }
    }

    /// Allow up to `concurrency` lookups at once
    ///
    /// The default of 1 resolves names strictly one after another. With more, the first lookup
    /// to fail ends the call even while earlier names are still being resolved.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub async fn execute(&self, ctx: &Context, stack: &StackName) -> Result<Vec<Function>, Error> {
        log::debug!("Listing functions in stack {stack}");

        let names = ctx
            .run(self.stacks.list_functions(ctx, stack))
            .await?
            .inspect_err(|err| log::debug!("Failed to list functions in stack {stack}: {err:?}"))
            .map_err(|source| Error::Enumerate {
                stack: stack.clone(),
                source,
            })?;

        if names.is_empty() {
            log::info!("No functions in stack {stack}");
            return Ok(vec![]);
        }

        log::info!("Found {} function(s) in stack {stack}", names.len());

        let slots: Vec<Option<Function>> = vec![None; names.len()];

        let lookups = names.into_iter().enumerate().map(|(index, name)| async move {
            let found = ctx.run(self.functions.find_by_name(ctx, &name)).await?;

            found
                .map(|function| (index, function))
                .inspect_err(|err| log::debug!("Failed to get function {name}: {err:?}"))
                .map_err(|source| Error::Resolve { name, source })
        });

        // Lookups complete in any order, each lands in the slot of its name.
        // The first error to complete stops the fold and drops whatever is still in flight.
        let slots = stream::iter(lookups)
            .buffer_unordered(self.concurrency)
            .try_fold(slots, |mut slots, (index, function)| async move {
                slots[index] = Some(function);
                Ok::<_, Error>(slots)
            })
            .await?;

        Ok(slots.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct NoStacks;

    #[async_trait]
    impl StackInspector for NoStacks {
        async fn list_functions(&self, _: &Context, _: &StackName) -> eyre::Result<Vec<String>> {
            Ok(vec![])
        }
    }

    struct NoFunctions;

    #[async_trait]
    impl FunctionRepository for NoFunctions {
        async fn find_by_name(&self, _: &Context, name: &str) -> eyre::Result<Function> {
            Err(eyre::eyre!("unexpected lookup of {name}"))
        }
    }

    #[test]
    fn zero_concurrency_falls_back_to_sequential() {
        let usecase = ListStackFunctions::new(Arc::new(NoFunctions), Arc::new(NoStacks));
        assert_eq!(usecase.concurrency(), 1);
        assert_eq!(usecase.with_concurrency(0).concurrency(), 1);
    }

    #[tokio::test]
    async fn empty_stack_does_not_touch_repository() {
        let usecase = ListStackFunctions::new(Arc::new(NoFunctions), Arc::new(NoStacks));
        let functions = usecase
            .execute(&Context::background(), &"empty-stack".into())
            .await
            .unwrap();

        assert!(functions.is_empty());
    }
}
