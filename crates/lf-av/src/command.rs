//! Builder for executing external tool commands.
//!
//! Two modes: [`ToolCommand::execute`] captures output under a timeout (for
//! short probes), and [`ToolCommand::run_streaming`] runs without a timeout,
//! streams stderr line by line and honours a [`CancellationToken`] (for
//! encodes).

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Default timeout for [`ToolCommand::execute`]: 5 minutes.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

/// How a streamed run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The process exited on its own.
    Exited(ExitStatus),
    /// The token fired first; the process was killed and reaped.
    Cancelled,
}

/// A builder for constructing and executing external tool invocations.
///
/// # Example
///
/// ```no_run
/// use lf_av::ToolCommand;
/// use std::path::PathBuf;
///
/// # async fn example() -> lf_core::Result<()> {
/// let output = ToolCommand::new(PathBuf::from("ffprobe"))
///     .args(["-v", "error", "-show_streams"])
///     .arg("/path/to/video.mp4")
///     .execute()
///     .await?;
/// println!("{}", output.stdout);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Set the maximum execution time for [`ToolCommand::execute`].
    pub fn timeout(&mut self, d: Duration) -> &mut Self {
        self.timeout = d;
        self
    }

    fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Execute the command, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// Returns [`lf_core::PipelineError::Tool`] if spawning fails, the
    /// process times out, or it exits with a non-zero status.
    pub async fn execute(&self) -> lf_core::Result<ToolOutput> {
        let program_name = self.program_name();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| {
            lf_core::PipelineError::tool(&program_name, format!("failed to spawn: {e}"))
        })?;

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let tool_output = ToolOutput {
                    status: output.status,
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                };

                if !output.status.success() {
                    return Err(lf_core::PipelineError::tool(
                        program_name,
                        format!(
                            "exited with status {}: {}",
                            output.status,
                            tool_output.stderr.trim()
                        ),
                    ));
                }

                Ok(tool_output)
            }
            Ok(Err(e)) => Err(lf_core::PipelineError::tool(
                program_name,
                format!("I/O error waiting for process: {e}"),
            )),
            // The child future is dropped here and kill_on_drop reaps it.
            Err(_elapsed) => Err(lf_core::PipelineError::tool(
                program_name,
                format!("timed out after {:?}", self.timeout),
            )),
        }
    }

    /// Run the command to completion with no timeout, passing each stderr
    /// line to `on_stderr` as it arrives.
    ///
    /// Lines end at `\n` or `\r` (ffmpeg's progress updates) and are decoded
    /// lossily, so no stderr content can fail the run. If `cancel` fires
    /// first the child is killed and reaped before returning
    /// [`RunOutcome::Cancelled`]. A non-zero exit is not an error here;
    /// callers inspect the status.
    pub async fn run_streaming(
        &self,
        cancel: &CancellationToken,
        mut on_stderr: impl FnMut(&str) + Send,
    ) -> std::io::Result<RunOutcome> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn()?;
        let stderr = child.stderr.take();

        let finished = {
            let wait = async {
                if let Some(stderr) = stderr {
                    pump_lines(BufReader::new(stderr), &mut on_stderr).await;
                }
                child.wait().await
            };

            tokio::select! {
                status = wait => Some(status),
                _ = cancel.cancelled() => None,
            }
        };

        match finished {
            Some(status) => Ok(RunOutcome::Exited(status?)),
            None => {
                child.start_kill()?;
                child.wait().await?;
                Ok(RunOutcome::Cancelled)
            }
        }
    }
}

/// Feed `reader` to `on_line` one line at a time until EOF.
///
/// A read error ends the stream quietly; the caller still waits for the
/// process, whose exit status is what counts.
async fn pump_lines<R>(mut reader: R, on_line: &mut (impl FnMut(&str) + Send))
where
    R: AsyncBufRead + Unpin,
{
    let mut line: Vec<u8> = Vec::new();

    loop {
        let consumed = match reader.fill_buf().await {
            Ok([]) => break,
            Ok(buf) => {
                let mut start = 0;
                for (i, &b) in buf.iter().enumerate() {
                    if b == b'\n' || b == b'\r' {
                        line.extend_from_slice(&buf[start..i]);
                        emit_line(&mut line, on_line);
                        start = i + 1;
                    }
                }
                line.extend_from_slice(&buf[start..]);
                buf.len()
            }
            Err(e) => {
                tracing::debug!("Stopped reading stderr: {e}");
                break;
            }
        };
        reader.consume(consumed);
    }

    emit_line(&mut line, on_line);
}

fn emit_line(line: &mut Vec<u8>, on_line: &mut (impl FnMut(&str) + Send)) {
    if !line.is_empty() {
        on_line(&String::from_utf8_lossy(line));
        line.clear();
    }
}
