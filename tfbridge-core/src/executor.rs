//! Subprocess execution against the external version-control client.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::CommandResult;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Mutex;
use std::time::Instant;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// Environment variable carrying the detected collection URL into tool
/// subprocesses.
pub const COLLECTION_URL_VAR: &str = "TFVC_COLLECTION_URL";

/// Marker variable telling the tool to use the ambient credential store.
pub const INTEGRATED_AUTH_VAR: &str = "TFVC_INTEGRATED_AUTH";

/// Install-directory style variables forwarded (and reported by diagnostics)
/// when integrated credentials are enabled.
pub const CREDENTIAL_MARKER_VARS: &[&str] = &[INTEGRATED_AUTH_VAR, "VS_TOOLS_INSTALL_DIR"];

/// Spawns the external tool with a given argument list in the workspace root
/// and captures its output. Owns no persistent state beyond the detected
/// collection URL; each invocation is independent.
///
/// There is deliberately no timeout and no cancellation: a spawned process
/// runs to completion, and a hung tool blocks that one logical operation.
pub struct CommandExecutor {
    tool_path: String,
    workspace_root: PathBuf,
    use_integrated_credentials: bool,
    collection_url: Mutex<Option<String>>,
}

impl CommandExecutor {
    pub fn new(config: &Config, workspace_root: PathBuf) -> Self {
        Self {
            tool_path: config.tool_path.clone(),
            workspace_root,
            use_integrated_credentials: config.use_integrated_credentials,
            collection_url: Mutex::new(None),
        }
    }

    pub fn workspace_root(&self) -> &PathBuf {
        &self.workspace_root
    }

    /// Remembers a detected collection URL so later invocations inherit it.
    pub fn set_collection_url(&self, url: impl Into<String>) {
        *self.collection_url.lock().unwrap() = Some(url.into());
    }

    /// Display form of an invocation, used for history recording.
    pub fn command_line(&self, args: &[&str]) -> String {
        let mut line = self.tool_path.clone();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// Runs the tool to completion, accumulating stdout and stderr.
    ///
    /// Exit code 0, or any outcome under `suppress_errors`, resolves with the
    /// captured result; probe callers rely on a suppressed spawn failure
    /// resolving with an empty exit-code −1 result instead of an error.
    pub async fn execute(&self, args: &[&str], suppress_errors: bool) -> Result<CommandResult> {
        let mut command = Command::new(&self.tool_path);
        command
            .args(args)
            .current_dir(&self.workspace_root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if self.use_integrated_credentials {
            command.env(INTEGRATED_AUTH_VAR, "1");
            if let Some(url) = self.collection_url.lock().unwrap().as_ref() {
                command.env(COLLECTION_URL_VAR, url);
            }
        }

        debug!(tool = %self.tool_path, ?args, "spawning external tool");
        let started = Instant::now();

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) if suppress_errors => {
                debug!(tool = %self.tool_path, error = %e, "suppressed spawn failure");
                return Ok(CommandResult::not_spawned());
            }
            Err(e) => {
                warn!(tool = %self.tool_path, ?args, error = %e, "failed to spawn external tool");
                return Err(Error::command(&self.tool_path, args, -1, e.to_string()));
            }
        };

        let mut stdout = String::new();
        let mut stderr = String::new();
        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();

        let (out_read, err_read, status) = tokio::join!(
            async {
                match stdout_pipe {
                    Some(mut pipe) => pipe.read_to_string(&mut stdout).await.map(|_| ()),
                    None => Ok(()),
                }
            },
            async {
                match stderr_pipe {
                    Some(mut pipe) => pipe.read_to_string(&mut stderr).await.map(|_| ()),
                    None => Ok(()),
                }
            },
            child.wait(),
        );
        out_read?;
        err_read?;
        let status = status?;

        let exit_code = status.code().unwrap_or(-1);
        let elapsed = started.elapsed();
        let result = CommandResult {
            stdout,
            stderr,
            exit_code,
        };

        if exit_code == 0 || suppress_errors {
            debug!(
                tool = %self.tool_path,
                ?args,
                exit_code,
                elapsed_ms = elapsed.as_millis() as u64,
                "external tool finished"
            );
            return Ok(result);
        }

        let output = if result.stderr.trim().is_empty() {
            result.stdout.clone()
        } else {
            result.stderr.clone()
        };
        let err = Error::command(&self.tool_path, args, exit_code, output);
        if err.is_authentication_failure() {
            warn!(
                tool = %self.tool_path,
                ?args,
                exit_code,
                elapsed_ms = elapsed.as_millis() as u64,
                "external tool reported an authentication failure"
            );
        } else {
            warn!(
                tool = %self.tool_path,
                ?args,
                exit_code,
                elapsed_ms = elapsed.as_millis() as u64,
                "external tool failed"
            );
        }
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executor_for(tool_path: &str) -> CommandExecutor {
        let config = Config {
            tool_path: tool_path.to_string(),
            ..Config::default()
        };
        CommandExecutor::new(&config, std::env::temp_dir())
    }

    #[tokio::test]
    async fn test_suppressed_spawn_failure_resolves() {
        let executor = executor_for("tfbridge-no-such-tool");
        let result = executor.execute(&["status"], true).await.unwrap();

        assert_eq!(result.exit_code, -1);
        assert!(result.stdout.is_empty());
        assert!(result.stderr.is_empty());
    }

    #[tokio::test]
    async fn test_unsuppressed_spawn_failure_fails() {
        let executor = executor_for("tfbridge-no-such-tool");
        let err = executor.execute(&["status"], false).await.unwrap_err();

        match err {
            Error::Command {
                command, exit_code, ..
            } => {
                assert_eq!(command, "tfbridge-no-such-tool");
                assert_eq!(exit_code, -1);
            }
            other => panic!("expected command error, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_captures_stdout_on_success() {
        let config = Config {
            tool_path: "echo".to_string(),
            ..Config::default()
        };
        let executor = CommandExecutor::new(&config, std::env::temp_dir());
        let result = executor.execute(&["edit", "foo.txt"], false).await.unwrap();

        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout.trim(), "edit foo.txt");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_a_command_error() {
        let config = Config {
            tool_path: "false".to_string(),
            ..Config::default()
        };
        let executor = CommandExecutor::new(&config, std::env::temp_dir());
        let err = executor.execute(&["anything"], false).await.unwrap_err();

        assert!(matches!(err, Error::Command { exit_code: 1, .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_suppressed_nonzero_exit_resolves() {
        let config = Config {
            tool_path: "false".to_string(),
            ..Config::default()
        };
        let executor = CommandExecutor::new(&config, std::env::temp_dir());
        let result = executor.execute(&[], true).await.unwrap();

        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn test_command_line_display() {
        let executor = executor_for("tf");
        assert_eq!(
            executor.command_line(&["status", "/format:detailed"]),
            "tf status /format:detailed"
        );
    }
}
