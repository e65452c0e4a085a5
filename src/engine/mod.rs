//! Execution engine: decides where a command runs and turns the process
//! outcome into a result

pub mod environment;
pub mod executor;
pub mod runner;

#[cfg(test)]
pub(crate) mod testing;

pub use environment::{Environment, CONTAINER_MARKER};
pub use executor::{
    select_executor, ContainerExecutor, ExecutionResult, Executor, NativeExecutor,
    CONTAINER_RUNTIME,
};
pub use runner::{ProcessOutput, ProcessRunner, SystemRunner};
