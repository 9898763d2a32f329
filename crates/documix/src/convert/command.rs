//! External converter invocation.
//!
//! Every external tool runs through [`run_tool`]: piped stdout/stderr, a
//! bounded timeout, and stderr classification that separates format errors
//! (the document is bad) from system errors (the tool is broken). A missing
//! binary surfaces as `MissingDependency` so the dispatch can move on to
//! the next attempt in the chain.

use crate::error::{DocumixError, Result};
use std::ffi::OsStr;
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{Duration, timeout};

/// Captured output of a successful tool run.
#[derive(Debug)]
pub struct ToolOutput {
    pub stdout: Vec<u8>,
    pub stderr: String,
}

impl ToolOutput {
    /// Stdout decoded as UTF-8, replacing invalid sequences.
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

/// Run one external tool with a timeout, returning its captured output.
///
/// Errors:
/// - `MissingDependency` — the binary could not be spawned (not installed).
/// - `Timeout` — the tool exceeded `timeout_seconds`; the child is killed
///   on drop, the run continues.
/// - `Conversion` — non-zero exit; the message carries the captured stderr.
pub async fn run_tool<S: AsRef<OsStr>>(program: &str, args: &[S], timeout_seconds: u64) -> Result<ToolOutput> {
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DocumixError::MissingDependency(program.to_string())
            } else {
                DocumixError::Io(e)
            }
        })?;

    let output = match timeout(Duration::from_secs(timeout_seconds), child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return Err(DocumixError::conversion_with_source(
                format!("failed to wait for {program}"),
                e,
            ));
        }
        Err(_) => {
            return Err(DocumixError::Timeout {
                tool: program.to_string(),
                seconds: timeout_seconds,
            });
        }
    };

    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        let detail = if stderr.trim().is_empty() {
            String::from_utf8_lossy(&output.stdout).into_owned()
        } else {
            stderr
        };
        return Err(DocumixError::conversion(format!(
            "{program} exited with {}: {}",
            output.status,
            detail.trim()
        )));
    }

    Ok(ToolOutput {
        stdout: output.stdout,
        stderr,
    })
}

/// True for errors that should fall through to the next attempt in a
/// format's conversion chain rather than abort it.
pub fn is_fallback_worthy(error: &DocumixError) -> bool {
    matches!(
        error,
        DocumixError::MissingDependency(_)
            | DocumixError::Timeout { .. }
            | DocumixError::Conversion { .. }
            | DocumixError::Parse { .. }
            | DocumixError::Io(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_missing_dependency() {
        let result = run_tool("documix-no-such-binary", &["--version"], 5).await;
        assert!(matches!(result.unwrap_err(), DocumixError::MissingDependency(_)));
    }

    #[tokio::test]
    async fn test_captures_stdout() {
        let output = run_tool("sh", &["-c", "echo converted"], 5).await.unwrap();
        assert_eq!(output.stdout_text().trim(), "converted");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_conversion_error() {
        let result = run_tool("sh", &["-c", "echo broken >&2; exit 3"], 5).await;
        let err = result.unwrap_err();
        assert!(matches!(err, DocumixError::Conversion { .. }));
        assert!(err.to_string().contains("broken"));
    }

    #[tokio::test]
    async fn test_timeout_kills_and_reports() {
        let result = run_tool("sh", &["-c", "sleep 30"], 1).await;
        assert!(matches!(result.unwrap_err(), DocumixError::Timeout { .. }));
    }

    #[test]
    fn test_fallback_worthy_classification() {
        assert!(is_fallback_worthy(&DocumixError::MissingDependency("pandoc".into())));
        assert!(is_fallback_worthy(&DocumixError::conversion("bad input")));
        assert!(!is_fallback_worthy(&DocumixError::validation("bad config")));
    }
}
