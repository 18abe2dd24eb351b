//! Subprocess launcher

use super::{EngineError, EngineInvocation, EngineLauncher, EngineRun};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

/// Runs the engine as a child process.
///
/// stdout and stderr are read concurrently into one line stream that is
/// drained until both reach end-of-stream; the child is then reaped. The exit
/// status is logged, never checked: a failed run shows up later as missing
/// result tables.
#[derive(Debug, Clone, Default)]
pub struct ProcessLauncher {
    working_dir: Option<PathBuf>,
    echo: bool,
}

impl ProcessLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the engine from `dir` instead of the current directory
    pub fn with_working_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }

    /// Log engine output at info level instead of trace
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }
}

#[async_trait]
impl EngineLauncher for ProcessLauncher {
    async fn launch(&self, invocation: &EngineInvocation) -> Result<EngineRun, EngineError> {
        let program = invocation.program();
        let args = invocation.args();

        let mut command = Command::new(program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        tracing::info!(program = %program.display(), args = ?args, "Launching engine");

        let mut child = command.spawn().map_err(|source| EngineError::Spawn {
            program: program.to_path_buf(),
            source,
        })?;

        let stdout = child.stdout.take().ok_or(EngineError::MissingPipe("stdout"))?;
        let stderr = child.stderr.take().ok_or(EngineError::MissingPipe("stderr"))?;

        let (tx, mut rx) = mpsc::channel::<String>(1024);
        let stdout_task = tokio::spawn(forward_lines(stdout, tx.clone()));
        let stderr_task = tokio::spawn(forward_lines(stderr, tx));

        let mut lines = 0;
        while let Some(line) = rx.recv().await {
            lines += 1;
            if self.echo {
                tracing::info!(target: "engine", "{}", line);
            } else {
                tracing::trace!(target: "engine", "{}", line);
            }
        }

        stdout_task.await??;
        stderr_task.await??;

        let status = child.wait().await?;
        if status.success() {
            tracing::info!(lines, "Engine finished");
        } else {
            tracing::warn!(lines, status = %status, "Engine exited with failure");
        }

        Ok(EngineRun {
            lines,
            exit_code: status.code(),
        })
    }
}

/// Send each line of `reader` to `tx`. Invalid UTF-8 is replaced.
async fn forward_lines<R>(reader: R, tx: mpsc::Sender<String>) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buf)
            .trim_end_matches(['\n', '\r'])
            .to_string();
        if tx.send(line).await.is_err() {
            return Ok(());
        }
    }
}
