//! Command executors
//!
//! An [`Executor`] takes a rendered [`Command`] and returns its trimmed output.
//! There is one implementation per [`Environment`], picked once at startup
//! by [`select_executor`].

use tracing::debug;

use crate::command::Command;
use crate::engine::environment::Environment;
use crate::engine::runner::{ProcessOutput, ProcessRunner, SystemRunner};
use crate::error::{PgDockError, Result};

/// Container runtime binary used when provisioning.
pub const CONTAINER_RUNTIME: &str = "docker";

/// Trimmed output on success; exactly one of output or error.
pub type ExecutionResult = Result<String>;

pub trait Executor {
    fn run(&self, command: &Command) -> ExecutionResult;

    fn environment(&self) -> Environment;
}

impl<E: Executor + ?Sized> Executor for Box<E> {
    fn run(&self, command: &Command) -> ExecutionResult {
        (**self).run(command)
    }

    fn environment(&self) -> Environment {
        (**self).environment()
    }
}

/// Runs command lines directly through `sh -c`. Used when the process is
/// already inside a container that ships the client tools.
#[derive(Debug, Default)]
pub struct NativeExecutor<R = SystemRunner> {
    runner: R,
}

impl<R: ProcessRunner> NativeExecutor<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: ProcessRunner> Executor for NativeExecutor<R> {
    fn run(&self, command: &Command) -> ExecutionResult {
        let out = self.runner.run("sh", &shell_args(command.line()))?;
        interpret(out)
    }

    fn environment(&self) -> Environment {
        Environment::InsideContainer
    }
}

/// Pulls the configured image and runs each command line in a fresh
/// `--rm` container.
#[derive(Debug)]
pub struct ContainerExecutor<R = SystemRunner> {
    runner: R,
    runtime: String,
}

impl Default for ContainerExecutor<SystemRunner> {
    fn default() -> Self {
        Self::new(SystemRunner)
    }
}

impl<R: ProcessRunner> ContainerExecutor<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            runtime: CONTAINER_RUNTIME.to_string(),
        }
    }

    /// Use a different runtime binary, e.g. `podman`.
    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = runtime.into();
        self
    }

    fn pull(&self, image: &str) -> Result<()> {
        debug!(image, "pulling image");
        let out = self
            .runner
            .run(&self.runtime, &["pull".to_string(), "-q".to_string(), image.to_string()])?;
        if !out.success() {
            return Err(PgDockError::ImagePull {
                image: image.to_string(),
                output: out.lossy().trim().to_string(),
            });
        }
        Ok(())
    }
}

impl<R: ProcessRunner> Executor for ContainerExecutor<R> {
    fn run(&self, command: &Command) -> ExecutionResult {
        let config = command.config();
        self.pull(&config.image)?;

        let args = run_args(command, command.line());
        debug!(
            "raw container command:\n{} {}",
            self.runtime,
            run_args(command, &command.redacted()).join(" ")
        );
        let out = self.runner.run(&self.runtime, &args)?;
        interpret(out)
    }

    fn environment(&self) -> Environment {
        Environment::Host
    }
}

/// Pick the executor matching `env`, backed by real processes.
pub fn select_executor(env: Environment) -> Box<dyn Executor> {
    match env {
        Environment::InsideContainer => Box::new(NativeExecutor::new(SystemRunner)),
        Environment::Host => Box::new(ContainerExecutor::new(SystemRunner)),
    }
}

fn shell_args(line: &str) -> Vec<String> {
    vec!["-c".to_string(), line.to_string()]
}

/// `run --rm [--network=N] [--volume V] IMAGE sh -c LINE`
fn run_args(command: &Command, line: &str) -> Vec<String> {
    let config = command.config();
    let mut args = vec!["run".to_string(), "--rm".to_string()];
    if let Some(network) = config.network.as_deref().filter(|n| !n.is_empty()) {
        args.push(format!("--network={}", network));
    }
    if let Some(mount) = command.mount() {
        args.push("--volume".to_string());
        args.push(mount.to_string());
    }
    args.push(config.image.clone());
    args.push("sh".to_string());
    args.extend(shell_args(line));
    args
}

/// Map exit status and raw output onto the result shape every caller sees.
fn interpret(out: ProcessOutput) -> ExecutionResult {
    if !out.success() {
        return Err(PgDockError::CommandFailed {
            status: out.status,
            output: out.lossy().trim().to_string(),
        });
    }
    let text = String::from_utf8(out.output)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    Ok(text.trim().to_string())
}
