use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;

use crate::result::{ExitReport, ResultSet};

/// One external tool call: program, arguments and the lines fed on stdin.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    pub tool: &'static str,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub stdin: Option<Vec<String>>,
}

impl ToolInvocation {
    pub fn new(tool: &'static str, program: PathBuf, args: Vec<String>) -> Self {
        Self { tool, program, args, stdin: None }
    }

    pub fn with_stdin(mut self, lines: &[String]) -> Self {
        self.stdin = Some(lines.to_vec());
        self
    }
}

/// Newline-terminated stdin payload, one target per line.
pub fn stdin_payload(lines: &[String]) -> String {
    let mut payload = lines.join("\n");
    payload.push('\n');
    payload
}

/// Spawn the invocation, stream stdout lines into `on_line` until end of
/// stream, then wait for the exit status. Blank lines are skipped.
///
/// Returns `Err` only when the process could not be spawned.
pub async fn stream_cmd_lines<F>(inv: &ToolInvocation, mut on_line: F) -> std::io::Result<ExitReport>
where
    F: FnMut(&str),
{
    tracing::debug!(tool = inv.tool, program = %inv.program.display(), args = ?inv.args, "spawning");

    let mut child = Command::new(&inv.program)
        .args(&inv.args)
        .stdin(if inv.stdin.is_some() { Stdio::piped() } else { Stdio::null() })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let writer = match (child.stdin.take(), inv.stdin.as_deref()) {
        (Some(mut stdin), Some(lines)) => {
            let payload = stdin_payload(lines);
            Some(tokio::spawn(async move {
                // The tool may exit before draining stdin; a broken pipe is not our failure.
                if let Err(e) = stdin.write_all(payload.as_bytes()).await {
                    tracing::debug!(error = %e, "stdin write interrupted");
                }
                let _ = stdin.shutdown().await;
            }))
        }
        _ => None,
    };

    let stderr_task = child.stderr.take().map(|mut stderr| {
        tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
            String::from_utf8_lossy(&buf).into_owned()
        })
    });

    if let Some(stdout) = child.stdout.take() {
        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    let line = line.trim();
                    if !line.is_empty() {
                        on_line(line);
                    }
                }
                Err(e) => {
                    tracing::warn!(tool = inv.tool, error = %e, "stdout read failed");
                    break;
                }
            }
        }
    }

    let status = child.wait().await?;
    if let Some(w) = writer {
        let _ = w.await;
    }
    let stderr = match stderr_task {
        Some(t) => t.await.unwrap_or_default(),
        None => String::new(),
    };

    Ok(ExitReport { code: status.code(), stderr })
}

/// Run one invocation to completion and fold its output into a result set.
/// `parse` is the tool's best-effort line parser; lines it rejects are dropped.
pub async fn run_tool<R, I, F>(inv: ToolInvocation, parse: F) -> ResultSet<R>
where
    F: Fn(&str) -> I,
    I: IntoIterator<Item = R>,
{
    let mut entries = Vec::new();
    let mut dropped = 0usize;
    let outcome = stream_cmd_lines(&inv, |line| {
        let before = entries.len();
        entries.extend(parse(line));
        if entries.len() == before {
            dropped += 1;
        }
    })
    .await;

    match outcome {
        Ok(exit) => {
            if dropped > 0 {
                tracing::debug!(tool = inv.tool, dropped, "skipped unparseable lines");
            }
            ResultSet::complete(inv.tool, entries, exit)
        }
        Err(e) => {
            tracing::warn!(tool = inv.tool, error = %e, "failed to launch");
            ResultSet::launch_failure(inv.tool, e)
        }
    }
}
