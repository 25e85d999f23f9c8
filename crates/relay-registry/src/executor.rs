use std::process::Stdio;

use crate::docker::DockerError;

/// Runs `docker` subcommands.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
/// Implementations must keep the process's stdout free of docker output:
/// relay prints values pipelines capture (such as the released version) on
/// stdout, so progress from long-running builds, pushes and pulls goes to
/// stderr.
#[allow(async_fn_in_trait)]
pub trait ImageExecutor: Send + Sync {
    /// Run a short command (`tag`, `version`, `info`, `logout`) and return
    /// its captured stdout.
    async fn exec(&self, args: &[String]) -> Result<String, DockerError>;

    /// Run a long command (`build`, `push`, `pull`) with its stdout and
    /// stderr both forwarded to relay's stderr.
    async fn exec_streaming(&self, args: &[String]) -> Result<(), DockerError>;

    /// Run a command that reads a secret from stdin (`login --password-stdin`).
    async fn exec_with_stdin(
        &self,
        args: &[String],
        stdin_data: &[u8],
    ) -> Result<String, DockerError>;
}

/// Runs the `docker` binary found on `PATH`.
pub struct RealExecutor;

fn docker(args: &[String]) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new("docker");
    cmd.args(args);
    cmd
}

/// Turn a finished, captured docker run into its stdout or a
/// [`DockerError::CommandFailed`] carrying the trimmed stderr.
fn captured(args: &[String], output: std::process::Output) -> Result<String, DockerError> {
    if !output.status.success() {
        return Err(DockerError::CommandFailed {
            args: args.to_vec(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        });
    }
    String::from_utf8(output.stdout).map_err(|e| DockerError::InvalidUtf8 { source: e })
}

impl ImageExecutor for RealExecutor {
    async fn exec(&self, args: &[String]) -> Result<String, DockerError> {
        tracing::debug!(args = %args.join(" "), "docker");
        let output = docker(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| DockerError::NotFound { source: e })?;
        captured(args, output)
    }

    async fn exec_streaming(&self, args: &[String]) -> Result<(), DockerError> {
        tracing::debug!(args = %args.join(" "), "docker (streaming)");
        let status = docker(args)
            .stdout(Stdio::from(std::io::stderr()))
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| DockerError::NotFound { source: e })?;

        if !status.success() {
            return Err(DockerError::CommandFailed {
                args: args.to_vec(),
                stderr: format!("exit code: {status}"),
            });
        }
        Ok(())
    }

    async fn exec_with_stdin(
        &self,
        args: &[String],
        stdin_data: &[u8],
    ) -> Result<String, DockerError> {
        use tokio::io::AsyncWriteExt;

        tracing::debug!(args = %args.join(" "), "docker (stdin)");
        let mut child = docker(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| DockerError::NotFound { source: e })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(stdin_data)
                .await
                .map_err(|e| DockerError::StdinWrite { source: e })?;
            // closing stdin ends `--password-stdin` input
            stdin
                .shutdown()
                .await
                .map_err(|e| DockerError::StdinWrite { source: e })?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| DockerError::NotFound { source: e })?;
        captured(args, output)
    }
}
