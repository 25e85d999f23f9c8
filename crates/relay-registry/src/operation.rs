use std::fmt;
use std::path::PathBuf;

/// One image-tool invocation.
///
/// `Display` renders the equivalent `docker` command line so dry-run plans
/// can be replayed by hand. Secrets are never part of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOperation {
    Build {
        dockerfile: PathBuf,
        context: PathBuf,
        tags: Vec<String>,
        build_args: Vec<String>,
    },
    Tag {
        source: String,
        destination: String,
    },
    Push {
        image: String,
    },
    Pull {
        image: String,
    },
    Login {
        registry: String,
        username: String,
    },
    Logout {
        registry: String,
    },
}

impl ImageOperation {
    pub fn tag(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self::Tag {
            source: source.into(),
            destination: destination.into(),
        }
    }

    pub fn push(image: impl Into<String>) -> Self {
        Self::Push {
            image: image.into(),
        }
    }

    pub fn pull(image: impl Into<String>) -> Self {
        Self::Pull {
            image: image.into(),
        }
    }

    /// Arguments passed to `docker`.
    pub fn args(&self) -> Vec<String> {
        match self {
            Self::Build {
                dockerfile,
                context,
                tags,
                build_args,
            } => {
                let mut args = vec!["build".to_owned()];
                for tag in tags {
                    args.push("-t".to_owned());
                    args.push(tag.clone());
                }
                args.push("-f".to_owned());
                args.push(dockerfile.display().to_string());
                for arg in build_args {
                    args.push("--build-arg".to_owned());
                    args.push(arg.clone());
                }
                args.push(context.display().to_string());
                args
            }
            Self::Tag {
                source,
                destination,
            } => vec!["tag".to_owned(), source.clone(), destination.clone()],
            Self::Push { image } => vec!["push".to_owned(), image.clone()],
            Self::Pull { image } => vec!["pull".to_owned(), image.clone()],
            Self::Login { registry, username } => vec![
                "login".to_owned(),
                registry.clone(),
                "-u".to_owned(),
                username.clone(),
                "--password-stdin".to_owned(),
            ],
            Self::Logout { registry } => vec!["logout".to_owned(), registry.clone()],
        }
    }
}

impl fmt::Display for ImageOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "docker {}", self.args().join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_renders_tags_file_args_and_context() {
        let op = ImageOperation::Build {
            dockerfile: PathBuf::from("docker/Dockerfile"),
            context: PathBuf::from("."),
            tags: vec!["reg/app:abc".to_owned(), "reg/app:1.0.0".to_owned()],
            build_args: vec!["A=1".to_owned()],
        };
        assert_eq!(
            op.to_string(),
            "docker build -t reg/app:abc -t reg/app:1.0.0 -f docker/Dockerfile --build-arg A=1 ."
        );
    }

    #[test]
    fn login_never_carries_password() {
        let op = ImageOperation::Login {
            registry: "reg.example.com".to_owned(),
            username: "ci".to_owned(),
        };
        assert_eq!(
            op.to_string(),
            "docker login reg.example.com -u ci --password-stdin"
        );
    }

    #[test]
    fn retag_operations() {
        assert_eq!(
            ImageOperation::tag("reg:a", "reg:b").to_string(),
            "docker tag reg:a reg:b"
        );
        assert_eq!(ImageOperation::push("reg:b").to_string(), "docker push reg:b");
        assert_eq!(ImageOperation::pull("reg:a").to_string(), "docker pull reg:a");
    }
}
