#[derive(Debug, thiserror::Error)]
pub enum DockerError {
    #[error("docker CLI not found; install Docker or put `docker` on PATH")]
    NotFound { source: std::io::Error },

    #[error("docker command failed: docker {}\n{stderr}", args.join(" "))]
    CommandFailed { args: Vec<String>, stderr: String },

    #[error("docker output was not valid UTF-8")]
    InvalidUtf8 { source: std::string::FromUtf8Error },

    #[error("failed to write to docker stdin")]
    StdinWrite { source: std::io::Error },
}
