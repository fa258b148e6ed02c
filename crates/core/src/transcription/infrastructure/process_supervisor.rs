use std::ffi::OsString;
use std::fmt;
use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use thiserror::Error;

use crate::shared::constants::{
    PIPE_DRAIN_TIMEOUT, PROCESS_POLL_INTERVAL, WHISPER_PROBE_FLAG, WHISPER_PROGRAM,
};
use crate::transcription::domain::cancellation::CancellationToken;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to wait for child process: {0}")]
    Wait(#[source] std::io::Error),
    #[error("{status}")]
    Exited { status: ExitStatus, stderr: String },
    /// Deadline elapsed or cancellation was requested; the child was killed.
    #[error("deadline exceeded")]
    TimedOut,
}

/// Program plus any fixed arguments placed before the per-call arguments,
/// e.g. `python3 -m whisper`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: OsString,
    pub leading_args: Vec<OsString>,
}

impl ToolCommand {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    pub fn with_leading_arg(mut self, arg: impl Into<OsString>) -> Self {
        self.leading_args.push(arg.into());
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args);
        cmd
    }
}

impl Default for ToolCommand {
    fn default() -> Self {
        Self::new(WHISPER_PROGRAM)
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.leading_args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Captured output of a child that exited successfully.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

/// Launches the tool and waits for it under a deadline.
///
/// The wait polls the child, the deadline and the cancellation token every
/// `poll_interval`. Whichever of the deadline and cancellation fires first
/// kills and reaps the child and yields [`ProcessError::TimedOut`].
/// stdout and stderr are drained on background threads so a chatty child
/// can never block on a full pipe.
#[derive(Debug, Clone)]
pub struct ProcessSupervisor {
    command: ToolCommand,
    poll_interval: Duration,
    echo_stdout: bool,
}

impl ProcessSupervisor {
    pub fn new(command: ToolCommand) -> Self {
        Self {
            command,
            poll_interval: PROCESS_POLL_INTERVAL,
            echo_stdout: false,
        }
    }

    /// Log each stdout line of the child as it arrives.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo_stdout = echo;
        self
    }

    pub fn command(&self) -> &ToolCommand {
        &self.command
    }

    /// Run the tool's help flag to check that it can be launched at all.
    pub fn probe(&self) -> Result<(), ProcessError> {
        let status = self
            .command
            .command()
            .arg(WHISPER_PROBE_FLAG)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| self.spawn_error(e))?;
        if status.success() {
            Ok(())
        } else {
            Err(ProcessError::Exited {
                status,
                stderr: String::new(),
            })
        }
    }

    pub fn run(
        &self,
        args: &[OsString],
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<ProcessOutput, ProcessError> {
        let start = Instant::now();
        // None when the timeout is too large to represent: wait indefinitely.
        let deadline = start.checked_add(timeout);

        let mut child = self
            .command
            .command()
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let stdout_rx = drain(child.stdout.take(), self.echo_stdout);
        let stderr_rx = drain(child.stderr.take(), false);

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(e) => {
                    terminate(&mut child);
                    return Err(ProcessError::Wait(e));
                }
            }

            let now = Instant::now();
            if cancel.is_cancelled() || deadline.is_some_and(|d| now >= d) {
                terminate(&mut child);
                log::debug!("Killed {} after {:?}", self.command, start.elapsed());
                return Err(ProcessError::TimedOut);
            }

            let nap = deadline.map_or(self.poll_interval, |d| {
                self.poll_interval.min(d.saturating_duration_since(now))
            });
            thread::sleep(nap);
        };

        let stdout = collect(&stdout_rx);
        let stderr = collect(&stderr_rx);
        let elapsed = start.elapsed();

        if !status.success() {
            return Err(ProcessError::Exited { status, stderr });
        }

        Ok(ProcessOutput {
            stdout,
            stderr,
            elapsed,
        })
    }

    fn spawn_error(&self, source: std::io::Error) -> ProcessError {
        ProcessError::Spawn {
            program: self.command.to_string(),
            source,
        }
    }
}

impl Default for ProcessSupervisor {
    fn default() -> Self {
        Self::new(ToolCommand::default())
    }
}

fn terminate(child: &mut Child) {
    // Either call fails only if the child is already gone.
    let _ = child.kill();
    let _ = child.wait();
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>, echo: bool) -> Receiver<String> {
    let (tx, rx) = crossbeam_channel::bounded(1);
    let Some(pipe) = pipe else {
        return rx;
    };

    thread::spawn(move || {
        let mut reader = BufReader::new(pipe);
        let mut captured = Vec::new();
        let mut line = Vec::new();
        loop {
            line.clear();
            match reader.read_until(b'\n', &mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    if echo {
                        log::info!("[whisper] {}", String::from_utf8_lossy(&line).trim_end());
                    }
                    captured.extend_from_slice(&line);
                }
            }
        }
        let _ = tx.send(String::from_utf8_lossy(&captured).into_owned());
    });

    rx
}

fn collect(rx: &Receiver<String>) -> String {
    rx.recv_timeout(PIPE_DRAIN_TIMEOUT).unwrap_or_default()
}

/// Render arguments for log output.
pub fn join_args(args: &[OsString]) -> String {
    args.iter()
        .map(|a| a.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}
