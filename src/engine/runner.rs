//! Process spawning
//!
//! The engine never touches `std::process` directly; it goes through a
//! [`ProcessRunner`] so tests can stand in for the shell and the container
//! runtime.

use std::io;
use std::process::{Command, Stdio};

/// Exit status plus everything the process wrote (stdout, then stderr).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, or -1 when the process was killed by a signal
    pub status: i32,
    pub output: Vec<u8>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }

    pub fn lossy(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

pub trait ProcessRunner {
    /// Run `program` with `args` to completion and capture its output.
    fn run(&self, program: &str, args: &[String]) -> io::Result<ProcessOutput>;
}

/// Runs processes for real, blocking until they exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> io::Result<ProcessOutput> {
        let out = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()?;

        let mut output = out.stdout;
        output.extend_from_slice(&out.stderr);

        Ok(ProcessOutput {
            status: out.status.code().unwrap_or(-1),
            output,
        })
    }
}
