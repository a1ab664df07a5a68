pub mod list_stack_functions;
