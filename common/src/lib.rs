pub mod context;
pub mod error;
pub mod function;
pub mod repository;
pub mod stack;
pub mod usecase;

pub use context::{CancelHandle, Cancellation, Context};
pub use error::Error;
pub use function::Function;
pub use repository::{FunctionRepository, StackInspector};
pub use stack::StackName;
pub use usecase::list_stack_functions::ListStackFunctions;
