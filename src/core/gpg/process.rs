//! Process invocation.
//!
//! Runs a binary with an argument vector (no shell), optionally feeding
//! stdin, and captures both output streams to completion.

use std::ffi::OsString;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, trace};

use crate::error::GpgError;

/// Everything a finished process left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captured {
    /// Exit code, `None` if terminated by a signal.
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl Captured {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Launches processes and locates executables.
pub trait Runner {
    /// Run `program` to completion.
    ///
    /// Blocks until the process exits and both streams are drained.
    fn run(
        &self,
        program: &Path,
        args: &[OsString],
        input: Option<&[u8]>,
    ) -> Result<Captured, GpgError>;

    /// Find an executable by name or path.
    fn locate(&self, name: &str) -> Option<PathBuf> {
        which::which(name).ok()
    }
}

impl<R: Runner + ?Sized> Runner for &R {
    fn run(
        &self,
        program: &Path,
        args: &[OsString],
        input: Option<&[u8]>,
    ) -> Result<Captured, GpgError> {
        (**self).run(program, args, input)
    }

    fn locate(&self, name: &str) -> Option<PathBuf> {
        (**self).locate(name)
    }
}

/// Runner backed by `std::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl Runner for SystemRunner {
    fn run(
        &self,
        program: &Path,
        args: &[OsString],
        input: Option<&[u8]>,
    ) -> Result<Captured, GpgError> {
        debug!(program = %program.display(), ?args, "invoking");

        let launch = |source| GpgError::Launch {
            program: program.display().to_string(),
            source,
        };

        let mut child = Command::new(program)
            .args(args)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(launch)?;

        // stdin is fed from its own thread so a child that fills its stdout
        // pipe before consuming all input cannot deadlock us.
        let stdin = child.stdin.take();
        let (output, written) = std::thread::scope(|scope| {
            let writer = match (stdin, input) {
                (Some(mut pipe), Some(bytes)) => Some(scope.spawn(move || {
                    // dropping the pipe at the end of the closure closes it
                    pipe.write_all(bytes)
                })),
                _ => None,
            };
            let output = child.wait_with_output();
            let written = writer.map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")))
            });
            (output, written)
        });

        let output = output.map_err(launch)?;
        match written {
            // the child may exit before reading everything; its streams say why
            Some(Err(e)) if e.kind() != ErrorKind::BrokenPipe => return Err(launch(e)),
            _ => {}
        }

        trace!(
            code = ?output.status.code(),
            stdout_len = output.stdout.len(),
            stderr_len = output.stderr.len(),
            "process finished"
        );

        Ok(Captured {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
