use std::fmt;
use std::path::Path;

use secrecy::ExposeSecret;

use crate::credentials::RegistryCredentials;
use crate::docker::DockerError;
use crate::executor::{ImageExecutor, RealExecutor};
use crate::operation::ImageOperation;

/// Image-tool client, parameterized over the executor for testability.
pub struct ImageClient<E: ImageExecutor = RealExecutor> {
    executor: E,
}

impl ImageClient<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor,
        }
    }
}

impl Default for ImageClient<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ImageExecutor> ImageClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    /// Run one operation. Login must go through [`Self::login`], which
    /// supplies the secret on stdin.
    pub async fn run(&self, op: &ImageOperation) -> Result<(), DockerError> {
        tracing::info!(command = %op, "running");
        match op {
            ImageOperation::Build { .. }
            | ImageOperation::Push { .. }
            | ImageOperation::Pull { .. } => {
                self.executor.exec_streaming(&op.args()).await
            }
            ImageOperation::Tag { .. }
            | ImageOperation::Login { .. }
            | ImageOperation::Logout { .. } => self.executor.exec(&op.args()).await.map(|_| ()),
        }
    }

    // ── Build ──

    pub async fn build(
        &self,
        dockerfile: &Path,
        context: &Path,
        tags: &[String],
        build_args: &[String],
    ) -> Result<(), DockerError> {
        self.run(&ImageOperation::Build {
            dockerfile: dockerfile.to_path_buf(),
            context: context.to_path_buf(),
            tags: tags.to_vec(),
            build_args: build_args.to_vec(),
        })
        .await
    }

    // ── Retag / transfer ──

    pub async fn tag(&self, source: &str, destination: &str) -> Result<(), DockerError> {
        self.run(&ImageOperation::tag(source, destination)).await
    }

    pub async fn push(&self, image: &str) -> Result<(), DockerError> {
        self.run(&ImageOperation::push(image)).await
    }

    pub async fn pull(&self, image: &str) -> Result<(), DockerError> {
        self.run(&ImageOperation::pull(image)).await
    }

    // ── Session ──

    pub async fn login(&self, credentials: &RegistryCredentials) -> Result<(), DockerError> {
        let op = ImageOperation::Login {
            registry: credentials.registry.clone(),
            username: credentials.username.clone(),
        };
        tracing::info!(command = %op, "running");
        self.executor
            .exec_with_stdin(&op.args(), credentials.password.expose_secret().as_bytes())
            .await
            .map(|_| ())
    }

    /// Best-effort: failures are logged, never returned.
    pub async fn logout(&self, registry: &str) {
        let op = ImageOperation::Logout {
            registry: registry.to_owned(),
        };
        if let Err(e) = self.run(&op).await {
            tracing::warn!(registry, error = %e, "docker logout failed");
        }
    }

    // ── Doctor ──

    /// Docker availability and daemon reachability.
    pub async fn doctor(&self) -> DoctorReport {
        let mut report = DoctorReport::default();

        match self
            .executor
            .exec(&args(["version", "--format", "{{.Client.Version}}"]))
            .await
        {
            Ok(v) => report.docker = CheckResult::ok(v.trim()),
            Err(e) => {
                report.docker = CheckResult::fail(&e.to_string());
                report.daemon = CheckResult::fail("skipped: docker CLI unavailable");
                return report;
            }
        }

        match self
            .executor
            .exec(&args(["info", "--format", "{{.ServerVersion}}"]))
            .await
        {
            Ok(v) if !v.trim().is_empty() => report.daemon = CheckResult::ok(v.trim()),
            _ => report.daemon = CheckResult::fail("docker daemon not reachable"),
        }

        report
    }
}

// ── Helper ──

fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}

// ── Doctor types ──

#[derive(Debug, Default)]
pub struct DoctorReport {
    pub docker: CheckResult,
    pub daemon: CheckResult,
    pub registry_credentials: CheckResult,
    pub gitlab: CheckResult,
    pub config_file: CheckResult,
}

impl DoctorReport {
    pub fn all_passed(&self) -> bool {
        self.checks().iter().all(|(_, c)| c.passed)
    }

    fn checks(&self) -> [(&'static str, &CheckResult); 5] {
        [
            ("docker CLI", &self.docker),
            ("docker daemon", &self.daemon),
            ("registry credentials", &self.registry_credentials),
            ("GitLab API", &self.gitlab),
            ("relay.toml", &self.config_file),
        ]
    }
}

impl fmt::Display for DoctorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, check) in self.checks() {
            writeln!(f, "  [{}] {label:<22} {}", check.icon(), check.detail)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct CheckResult {
    pub passed: bool,
    pub detail: String,
}

impl CheckResult {
    pub fn ok(detail: &str) -> Self {
        Self {
            passed: true,
            detail: detail.to_owned(),
        }
    }

    pub fn fail(detail: &str) -> Self {
        Self {
            passed: false,
            detail: detail.to_owned(),
        }
    }

    pub fn icon(&self) -> &'static str {
        if self.passed { "OK" } else { "NG" }
    }
}
