//! External tool invocation
//!
//! Every external command (the build tool, the container tool) goes through a
//! [`CommandRunner`]. The system runner streams both output pipes line by line
//! into the debug log and keeps only a bounded tail of each stream.

use crate::error::{PipelineError, Result};
use serde::Serialize;
use std::collections::VecDeque;
use std::env;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use tracing::{debug, warn};

const READ_CHUNK: usize = 8 * 1024;

/// Longest line forwarded to the debug log, the rest is elided
const MAX_LOG_LINE: usize = 4 * 1024;

/// A command line to run, resolved against `PATH` at run time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
        }
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Command line as the operator would type it
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Outcome of one external command
#[derive(Debug, Clone, Serialize)]
pub struct BuildResult {
    pub command: String,
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// Earlier output was dropped to respect the capture limit
    pub truncated: bool,
}

impl BuildResult {
    pub fn status_description(&self) -> String {
        match self.exit_code {
            Some(code) => format!("exit code {}", code),
            None => "termination by signal".to_string(),
        }
    }

    /// Turn a failed result into [`PipelineError::ToolFailed`]
    pub fn into_error(self, step: &'static str) -> PipelineError {
        PipelineError::ToolFailed {
            step,
            status: self.status_description(),
            command: self.command,
            stderr: self.stderr,
        }
    }
}

pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> Result<BuildResult>;
}

/// Runs commands as child processes, blocking until they exit
pub struct SystemRunner {
    output_limit: usize,
}

impl SystemRunner {
    pub fn new(output_limit: usize) -> Self {
        Self { output_limit }
    }

    /// Relative paths like `./mvnw` resolve against the invocation's directory
    fn resolve(&self, invocation: &Invocation) -> Result<PathBuf> {
        let program = &invocation.program;
        let resolved = match &invocation.cwd {
            Some(cwd) => which::which_in(program, env::var_os("PATH"), cwd),
            None => which::which(program),
        };
        resolved.map_err(|source| PipelineError::ToolNotFound {
            tool: program.to_string(),
            source,
        })
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<BuildResult> {
        let program = self.resolve(invocation)?;
        let command_line = invocation.display();
        debug!("Running `{}` ({})", command_line, program.display());

        let spawn_error = |source: io::Error| PipelineError::Spawn {
            command: command_line.clone(),
            source,
        };

        let mut command = Command::new(&program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(cwd) = &invocation.cwd {
            command.current_dir(cwd);
        }

        let mut child = command.spawn().map_err(spawn_error)?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let limit = self.output_limit;

        // Both pipes are drained at once so a chatty stderr cannot block the child
        let (stdout, stderr) = thread::scope(|scope| {
            let out = scope.spawn(move || drain(stdout, limit, "stdout"));
            let err = drain(stderr, limit, "stderr");
            let out = out
                .join()
                .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::Other, "stdout reader panicked")));
            (out, err)
        });
        let (stdout, stderr) = match (stdout, stderr) {
            (Ok(stdout), Ok(stderr)) => (stdout, stderr),
            (Err(e), _) | (_, Err(e)) => {
                reap(&mut child);
                return Err(spawn_error(e));
            }
        };

        let status = child.wait().map_err(spawn_error)?;
        Ok(finish(command_line, status, stdout, stderr))
    }
}

/// Kills and waits for a child whose output can no longer be read
fn reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!("Failed to kill child {}: {}", child.id(), e);
    }
    if let Err(e) = child.wait() {
        warn!("Failed to wait for child {}: {}", child.id(), e);
    }
}

fn finish(command: String, status: ExitStatus, stdout: TailBuffer, stderr: TailBuffer) -> BuildResult {
    let truncated = stdout.truncated() || stderr.truncated();
    BuildResult {
        command,
        success: status.success(),
        exit_code: status.code(),
        stdout: stdout.into_string(),
        stderr: stderr.into_string(),
        truncated,
    }
}

fn drain<R: Read>(pipe: Option<R>, limit: usize, stream: &'static str) -> io::Result<TailBuffer> {
    let mut buffer = TailBuffer::new(limit);
    let Some(mut pipe) = pipe else {
        return Ok(buffer);
    };

    let mut lines = LineLogger::new(stream);
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let read = match pipe.read(&mut chunk) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        buffer.push(&chunk[..read]);
        lines.feed(&chunk[..read]);
    }
    lines.finish();
    Ok(buffer)
}

/// Reassembles chunks into lines for the debug log, holding at most
/// `MAX_LOG_LINE` bytes of the current line
struct LineLogger {
    stream: &'static str,
    line: Vec<u8>,
    elided: bool,
}

impl LineLogger {
    fn new(stream: &'static str) -> Self {
        Self {
            stream,
            line: Vec::new(),
            elided: false,
        }
    }

    fn feed(&mut self, data: &[u8]) {
        for segment in data.split_inclusive(|byte| *byte == b'\n') {
            let (body, complete) = match segment.split_last() {
                Some((&b'\n', body)) => (body, true),
                _ => (segment, false),
            };

            let room = MAX_LOG_LINE.saturating_sub(self.line.len());
            if body.len() > room {
                self.elided = true;
            }
            self.line.extend_from_slice(&body[..body.len().min(room)]);

            if complete {
                self.emit();
            }
        }
    }

    fn finish(&mut self) {
        if !self.line.is_empty() || self.elided {
            self.emit();
        }
    }

    fn emit(&mut self) {
        let text = String::from_utf8_lossy(&self.line);
        let text = text.trim_end();
        if self.elided {
            debug!(stream = self.stream, "{} [...]", text);
        } else {
            debug!(stream = self.stream, "{}", text);
        }
        self.line.clear();
        self.elided = false;
    }
}

/// Keeps the last `limit` bytes written to it
#[derive(Debug)]
pub struct TailBuffer {
    limit: usize,
    bytes: VecDeque<u8>,
    dropped: usize,
}

impl TailBuffer {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            bytes: VecDeque::new(),
            dropped: 0,
        }
    }

    pub fn push(&mut self, data: &[u8]) {
        if data.len() >= self.limit {
            self.dropped += self.bytes.len() + data.len() - self.limit;
            self.bytes.clear();
            self.bytes.extend(&data[data.len() - self.limit..]);
            return;
        }

        let excess = (self.bytes.len() + data.len()).saturating_sub(self.limit);
        self.bytes.drain(..excess);
        self.dropped += excess;
        self.bytes.extend(data);
    }

    pub fn truncated(&self) -> bool {
        self.dropped > 0
    }

    pub fn into_string(self) -> String {
        let bytes: Vec<u8> = self.bytes.into();
        let text = String::from_utf8_lossy(&bytes).into_owned();
        if self.dropped > 0 {
            format!("[... {} bytes truncated ...]\n{}", self.dropped, text)
        } else {
            text
        }
    }
}
