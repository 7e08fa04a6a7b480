//! Single-invocation sandbox runner
//!
//! Runs exactly one (program, stdin) pair with a hard wall-clock bound,
//! independent of the target language. The child is placed in its own
//! process group; on timeout the whole group gets SIGTERM, then SIGKILL
//! after a grace period if it ignores termination. Output pipes are drained
//! concurrently so a chatty child can never deadlock the runner.

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::time::timeout;

use super::Scratch;

/// Default grace period between SIGTERM and SIGKILL
const DEFAULT_KILL_GRACE: Duration = Duration::from_millis(500);

/// Default cap on captured bytes per stream
const DEFAULT_MAX_OUTPUT_BYTES: u64 = 1024 * 1024;

/// One program invocation to execute inside a scratch directory
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Program to execute (interpreter or built artifact)
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: std::path::PathBuf,
}

impl Invocation {
    /// Create an invocation rooted in the given scratch directory
    pub fn new(program: impl Into<String>, scratch: &Scratch) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: scratch.path().to_path_buf(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// Result of one sandboxed invocation
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// The process was spawned at all; false means the OS refused
    pub started: bool,
    /// Exit code, `None` when the process was killed or never started
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// The process group was killed at the deadline
    pub timed_out: bool,
    pub wall_time: Duration,
}

impl RunOutcome {
    /// Clean zero-exit run
    pub fn success(&self) -> bool {
        self.started && !self.timed_out && self.exit_code == Some(0)
    }

    fn spawn_failure(error: std::io::Error, wall_time: Duration) -> Self {
        Self {
            started: false,
            exit_code: None,
            stdout: String::new(),
            stderr: format!("failed to spawn process: {}", error),
            timed_out: false,
            wall_time,
        }
    }
}

/// Executes single invocations with a bounded wall clock
///
/// Wall time is guaranteed to stay below `timeout + grace` even for a
/// single-process infinite loop; side effects are confined to the
/// invocation's working directory.
#[derive(Debug, Clone)]
pub struct SandboxRunner {
    grace: Duration,
    max_output_bytes: u64,
}

impl Default for SandboxRunner {
    fn default() -> Self {
        Self {
            grace: DEFAULT_KILL_GRACE,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }
}

impl SandboxRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the SIGTERM→SIGKILL grace period
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Override the per-stream capture cap
    pub fn with_max_output_bytes(mut self, max: u64) -> Self {
        self.max_output_bytes = max;
        self
    }

    /// Run one invocation, feeding `stdin` and enforcing `time_limit`
    pub async fn run(
        &self,
        invocation: &Invocation,
        stdin: &str,
        time_limit: Duration,
    ) -> RunOutcome {
        let start = Instant::now();

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // The child leads its own process group so the deadline kill
        // reaches every descendant it may have forked.
        #[cfg(unix)]
        unsafe {
            cmd.pre_exec(|| {
                libc::setpgid(0, 0);
                Ok(())
            });
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => return RunOutcome::spawn_failure(e, start.elapsed()),
        };
        let pid = child.id();

        // Feed stdin from a separate task; a child that never reads must
        // not block the runner.
        let stdin_text = stdin.to_string();
        let stdin_handle = child.stdin.take();
        let stdin_task = tokio::spawn(async move {
            if let Some(mut handle) = stdin_handle {
                let _ = handle.write_all(stdin_text.as_bytes()).await;
                let _ = handle.shutdown().await;
            }
        });

        let max_output = self.max_output_bytes;
        let stdout_handle = child.stdout.take();
        let stdout_task = tokio::spawn(async move {
            match stdout_handle {
                Some(stream) => read_capped(stream, max_output).await,
                None => String::new(),
            }
        });
        let stderr_handle = child.stderr.take();
        let stderr_task = tokio::spawn(async move {
            match stderr_handle {
                Some(stream) => read_capped(stream, max_output).await,
                None => String::new(),
            }
        });

        let (exit_code, timed_out) = match timeout(time_limit, child.wait()).await {
            Ok(Ok(status)) => (status.code(), false),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "waiting on sandboxed process failed");
                (None, false)
            }
            Err(_) => {
                tracing::debug!(pid = ?pid, limit = ?time_limit, "deadline reached, killing process group");
                self.kill_group(&mut child, pid).await;
                (None, true)
            }
        };

        stdin_task.abort();
        let stdout = stdout_task.await.unwrap_or_default();
        let stderr = stderr_task.await.unwrap_or_default();

        RunOutcome {
            started: true,
            exit_code,
            stdout,
            stderr,
            timed_out,
            wall_time: start.elapsed(),
        }
    }

    /// SIGTERM the group, give it `grace` to exit, then SIGKILL and reap
    #[cfg(unix)]
    async fn kill_group(&self, child: &mut Child, pid: Option<u32>) {
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        let Some(pid) = pid else {
            let _ = child.kill().await;
            return;
        };
        let pgid = Pid::from_raw(pid as i32);

        if killpg(pgid, Signal::SIGTERM).is_ok()
            && timeout(self.grace, child.wait()).await.is_ok()
        {
            return;
        }
        let _ = killpg(pgid, Signal::SIGKILL);
        let _ = child.wait().await;
    }

    #[cfg(not(unix))]
    async fn kill_group(&self, child: &mut Child, _pid: Option<u32>) {
        let _ = child.kill().await;
        let _ = child.wait().await;
    }
}

/// Drain a stream to a string, truncating past `max_bytes`
async fn read_capped<R: tokio::io::AsyncRead + Unpin>(reader: R, max_bytes: u64) -> String {
    let mut reader = BufReader::new(reader);
    let mut output = String::new();
    let mut total: u64 = 0;
    let mut truncated = false;

    loop {
        let mut line = String::new();
        match reader.read_line(&mut line).await {
            Ok(0) => break,
            Ok(n) => {
                total += n as u64;
                if total > max_bytes {
                    truncated = true;
                    // Keep draining so the child never blocks on a full pipe.
                    continue;
                }
                output.push_str(&line);
            }
            Err(_) => break,
        }
    }

    if truncated {
        output.push_str("\n... (output truncated)");
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(scratch: &Scratch, script: &str) -> Invocation {
        Invocation::new("sh", scratch).arg("-c").arg(script)
    }

    #[tokio::test]
    async fn test_simple_run() {
        let scratch = Scratch::new().unwrap();
        let outcome = SandboxRunner::new()
            .run(&sh(&scratch, "echo hello"), "", Duration::from_secs(5))
            .await;

        assert!(outcome.success());
        assert_eq!(outcome.stdout.trim(), "hello");
        assert!(!outcome.timed_out);
    }

    #[tokio::test]
    async fn test_stdin_is_fed() {
        let scratch = Scratch::new().unwrap();
        let outcome = SandboxRunner::new()
            .run(&sh(&scratch, "cat"), "1 2 3\n", Duration::from_secs(5))
            .await;

        assert!(outcome.success());
        assert_eq!(outcome.stdout, "1 2 3\n");
    }

    #[tokio::test]
    async fn test_nonzero_exit() {
        let scratch = Scratch::new().unwrap();
        let outcome = SandboxRunner::new()
            .run(&sh(&scratch, "exit 3"), "", Duration::from_secs(5))
            .await;

        assert!(outcome.started);
        assert!(!outcome.success());
        assert_eq!(outcome.exit_code, Some(3));
    }

    #[tokio::test]
    async fn test_stderr_capture() {
        let scratch = Scratch::new().unwrap();
        let outcome = SandboxRunner::new()
            .run(&sh(&scratch, "echo oops >&2"), "", Duration::from_secs(5))
            .await;

        assert!(outcome.success());
        assert!(outcome.stderr.contains("oops"));
    }

    #[tokio::test]
    async fn test_timeout_kills_sleeper() {
        let scratch = Scratch::new().unwrap();
        let outcome = SandboxRunner::new()
            .with_grace(Duration::from_millis(200))
            .run(&sh(&scratch, "sleep 30"), "", Duration::from_millis(100))
            .await;

        assert!(outcome.timed_out);
        assert_eq!(outcome.exit_code, None);
        // limit + grace + scheduling slack
        assert!(outcome.wall_time < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_timeout_kills_busy_loop() {
        let scratch = Scratch::new().unwrap();
        let outcome = SandboxRunner::new()
            .with_grace(Duration::from_millis(200))
            .run(
                &sh(&scratch, "while true; do :; done"),
                "",
                Duration::from_millis(100),
            )
            .await;

        assert!(outcome.timed_out);
        assert!(outcome.wall_time < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_spawn_failure_is_reported_not_raised() {
        let scratch = Scratch::new().unwrap();
        let invocation = Invocation::new("definitely-not-a-real-binary", &scratch);
        let outcome = SandboxRunner::new()
            .run(&invocation, "", Duration::from_secs(1))
            .await;

        assert!(!outcome.started);
        assert_eq!(outcome.exit_code, None);
        assert!(outcome.stderr.contains("failed to spawn"));
    }

    #[tokio::test]
    async fn test_large_output_does_not_deadlock() {
        let scratch = Scratch::new().unwrap();
        let outcome = SandboxRunner::new()
            .with_max_output_bytes(4096)
            .run(&sh(&scratch, "seq 1 100000"), "", Duration::from_secs(30))
            .await;

        assert!(outcome.started);
        assert!(outcome.stdout.contains("(output truncated)"));
        assert!(outcome.stdout.len() < 8192);
    }

    #[tokio::test]
    async fn test_working_directory_is_scratch() {
        let scratch = Scratch::new().unwrap();
        scratch.write_file("marker.txt", "here").await.unwrap();
        let outcome = SandboxRunner::new()
            .run(&sh(&scratch, "cat marker.txt"), "", Duration::from_secs(5))
            .await;

        assert!(outcome.success());
        assert_eq!(outcome.stdout, "here");
    }
}
