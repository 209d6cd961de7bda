//! `svn` Command Execution
//!
//! Runs `svn info` and `svn status` against the context's directory with a
//! fixed locale, a bounded wait and cooperative cancellation.

use std::{
    fmt,
    io::Read,
    process::{Child, Command, Stdio},
    sync::mpsc::{self, RecvTimeoutError, Sender},
    thread,
    time::{Duration, Instant},
};

use tracing::{debug, warn};

use crate::{context::SegmentContext, errors::SvnError};

/// Default `svn` executable.
pub const DEFAULT_SVN_BINARY: &str = "svn";

/// Default upper bound on a single `svn` invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Locale variables forced on every `svn` invocation so messages are in
/// untranslated English.
pub const LOCALE_OVERRIDES: [(&str, &str); 2] = [("LANG", "C"), ("LC_MESSAGES", "C")];

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// The `svn` subcommands this crate runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SvnSubcommand {
    Info,
    Status,
}

impl SvnSubcommand {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Status => "status",
        }
    }
}

impl fmt::Display for SvnSubcommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Captured output of one command, split into lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

fn split_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::to_string)
        .collect()
}

/// Runs `svn` subcommands for a context.
///
/// A context without a usable directory yields an empty output and no
/// subprocess.
#[cfg_attr(test, mockall::automock)]
pub trait SvnRunner: Send + Sync {
    /// Runs `subcommand` against the context's directory.
    ///
    /// # Errors
    /// * If the command cannot be spawned, times out, or is cancelled
    fn run(&self, subcommand: SvnSubcommand, ctx: &SegmentContext) -> Result<CommandOutput, SvnError>;
}

/// Runs `svn info` for the context's directory.
///
/// # Errors
/// * If the command cannot be spawned, times out, or is cancelled
pub fn execute_info(runner: &dyn SvnRunner, ctx: &SegmentContext) -> Result<CommandOutput, SvnError> {
    runner.run(SvnSubcommand::Info, ctx)
}

/// Runs `svn status` for the context's directory.
///
/// # Errors
/// * If the command cannot be spawned, times out, or is cancelled
pub fn execute_status(runner: &dyn SvnRunner, ctx: &SegmentContext) -> Result<CommandOutput, SvnError> {
    runner.run(SvnSubcommand::Status, ctx)
}

/// [`SvnRunner`] backed by the `svn` command line client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvnCli {
    program: String,
    timeout: Duration,
}

impl SvnCli {
    #[must_use]
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Returns the error ending the wait if the render was cancelled or the
    /// deadline has passed.
    fn interrupted(&self, ctx: &SegmentContext, started: Instant, command: &str) -> Option<SvnError> {
        if ctx.cancel.is_cancelled() {
            debug!(command = %command, "svn cancelled, killing it");
            return Some(SvnError::Cancelled {
                command: command.to_string(),
            });
        }

        if started.elapsed() >= self.timeout {
            warn!(command = %command, timeout_ms = self.timeout.as_millis(), "svn timed out, killing it");
            return Some(SvnError::TimedOut {
                command: command.to_string(),
                timeout: self.timeout,
            });
        }

        None
    }
}

impl Default for SvnCli {
    fn default() -> Self {
        Self::new(DEFAULT_SVN_BINARY, DEFAULT_TIMEOUT)
    }
}

impl SvnRunner for SvnCli {
    fn run(&self, subcommand: SvnSubcommand, ctx: &SegmentContext) -> Result<CommandOutput, SvnError> {
        let Some(dir) = ctx.working_dir() else {
            debug!(%subcommand, "no working directory, skipping svn");
            return Ok(CommandOutput::default());
        };

        let command = format!("{} {subcommand} {}", self.program, dir.display());

        if ctx.cancel.is_cancelled() {
            return Err(SvnError::Cancelled { command });
        }

        debug!(command = %command, timeout_ms = self.timeout.as_millis(), "running svn");

        let mut cmd = Command::new(&self.program);
        cmd.arg(subcommand.as_str())
            .arg(dir)
            .env_clear()
            .envs(&ctx.environ)
            .envs(LOCALE_OVERRIDES)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Own process group, so helpers svn starts (e.g. an ssh tunnel) die with it
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let mut child = cmd.spawn().map_err(|source| SvnError::Spawn {
            command: command.clone(),
            source,
        })?;

        let started = Instant::now();
        let (sender, receiver) = mpsc::channel();
        let mut pending = 0;

        if let Some(pipe) = child.stdout.take() {
            drain(pipe, Stream::Stdout, sender.clone());
            pending += 1;
        }
        if let Some(pipe) = child.stderr.take() {
            drain(pipe, Stream::Stderr, sender.clone());
            pending += 1;
        }
        drop(sender);

        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    debug!(
                        command = %command,
                        status = %status,
                        elapsed_ms = started.elapsed().as_millis(),
                        "svn finished"
                    );
                    break;
                }
                Ok(None) => {
                    if let Some(err) = self.interrupted(ctx, started, &command) {
                        kill(&mut child);
                        return Err(err);
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(source) => {
                    kill(&mut child);
                    return Err(SvnError::Wait { command, source });
                }
            }
        }

        // The pipes stay open as long as anything svn started still holds them
        let mut output = CommandOutput::default();
        while pending > 0 {
            match receiver.recv_timeout(POLL_INTERVAL) {
                Ok((Stream::Stdout, bytes)) => {
                    output.stdout = split_lines(&bytes);
                    pending -= 1;
                }
                Ok((Stream::Stderr, bytes)) => {
                    output.stderr = split_lines(&bytes);
                    pending -= 1;
                }
                Err(RecvTimeoutError::Timeout) => {
                    if let Some(err) = self.interrupted(ctx, started, &command) {
                        kill(&mut child);
                        return Err(err);
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        Ok(output)
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Reads a child pipe to the end on its own thread so a full pipe never
/// blocks the child while we poll it.
fn drain<R: Read + Send + 'static>(mut pipe: R, stream: Stream, sender: Sender<(Stream, Vec<u8>)>) {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        let _ = pipe.read_to_end(&mut buffer);
        // The receiver is gone once the run gave up on this command
        let _ = sender.send((stream, buffer));
    });
}

/// Kills the child with its whole process group, then reaps it.
fn kill(child: &mut Child) {
    kill_group(child.id());
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(unix)]
fn kill_group(pid: u32) {
    let Ok(pgid) = i32::try_from(pid) else {
        return;
    };
    // SAFETY: kill(2) has no memory effects; a negative pid targets the
    // group the child leads since it was spawned with process_group(0).
    unsafe {
        libc::kill(-pgid, libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_group(_pid: u32) {}
