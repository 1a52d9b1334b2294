//! Command execution utilities
//!
//! Provides helper functions for executing external commands with consistent
//! error handling, output capture and an upper bound on run time.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Result of a command execution
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code of the command
    pub exit_code: i32,
    /// Standard output (stdout)
    pub stdout: String,
    /// Standard error (stderr)
    pub stderr: String,
}

impl CommandResult {
    /// Check if the command succeeded (exit code 0)
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Why a command produced no [`CommandResult`]
#[derive(Debug)]
pub enum CommandFailure {
    /// The program could not be started
    Spawn(std::io::Error),
    /// The program was killed after running longer than allowed
    TimedOut(Duration),
}

impl std::fmt::Display for CommandFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandFailure::Spawn(e) => write!(f, "{}", e),
            CommandFailure::TimedOut(d) => write!(f, "timed out after {}s", d.as_secs()),
        }
    }
}

/// Execute a command, capture its output and kill it if it outlives `timeout`
///
/// # Arguments
/// * `program` - The program to execute
/// * `args` - Arguments to pass to the program
/// * `envs` - Extra environment variables for the child only
/// * `working_dir` - Optional working directory
/// * `timeout` - Maximum run time
pub async fn execute_command<I, S>(
    program: &str,
    args: I,
    envs: &[(&str, &str)],
    working_dir: Option<&Path>,
    timeout: Duration,
) -> Result<CommandResult, CommandFailure>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    for (key, value) in envs {
        cmd.env(key, value);
    }

    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }

    let child = cmd.spawn().map_err(CommandFailure::Spawn)?;

    // Dropping the pending future on timeout kills the child.
    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(CommandFailure::Spawn)?,
        Err(_) => return Err(CommandFailure::TimedOut(timeout)),
    };

    Ok(CommandResult {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}
