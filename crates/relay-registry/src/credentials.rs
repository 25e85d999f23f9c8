use std::fmt;

use relay_core::SignalSource;
use relay_core::signals::keys;
use secrecy::SecretString;

/// Registry login material.
///
/// The password is passed to `docker login` on stdin and never rendered.
#[derive(Clone)]
pub struct RegistryCredentials {
    pub registry: String,
    pub username: String,
    pub password: SecretString,
}

impl fmt::Debug for RegistryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryCredentials")
            .field("registry", &self.registry)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl RegistryCredentials {
    /// `CI_REGISTRY`, `CI_REGISTRY_USER` and `CI_REGISTRY_PASSWORD`, with
    /// `CI_JOB_TOKEN` standing in for the password.
    ///
    /// # Errors
    ///
    /// [`relay_core::Error::MissingSignals`] naming every absent variable.
    pub fn from_signals(signals: &impl SignalSource) -> relay_core::Result<Self> {
        let registry = signals.non_empty(keys::REGISTRY);
        let username = signals.non_empty(keys::REGISTRY_USER);
        let password = signals
            .non_empty(keys::REGISTRY_PASSWORD)
            .or_else(|| signals.non_empty(keys::JOB_TOKEN));

        let mut missing = Vec::new();
        if registry.is_none() {
            missing.push(keys::REGISTRY.to_owned());
        }
        if username.is_none() {
            missing.push(keys::REGISTRY_USER.to_owned());
        }
        if password.is_none() {
            missing.push(format!("{} (or {})", keys::REGISTRY_PASSWORD, keys::JOB_TOKEN));
        }

        match (registry, username, password) {
            (Some(registry), Some(username), Some(password)) => Ok(Self {
                registry,
                username,
                password: SecretString::from(password),
            }),
            _ => Err(relay_core::Error::MissingSignals { names: missing }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    #[test]
    fn reads_all_three_values() {
        let signals = HashMap::from([
            ("CI_REGISTRY", "reg.example.com"),
            ("CI_REGISTRY_USER", "gitlab-ci-token"),
            ("CI_REGISTRY_PASSWORD", "s3cret"),
        ]);
        let creds = RegistryCredentials::from_signals(&signals).unwrap();
        assert_eq!(creds.registry, "reg.example.com");
        assert_eq!(creds.username, "gitlab-ci-token");
        assert_eq!(creds.password.expose_secret(), "s3cret");
    }

    #[test]
    fn job_token_is_password_fallback() {
        let signals = HashMap::from([
            ("CI_REGISTRY", "reg.example.com"),
            ("CI_REGISTRY_USER", "gitlab-ci-token"),
            ("CI_JOB_TOKEN", "job-token"),
        ]);
        let creds = RegistryCredentials::from_signals(&signals).unwrap();
        assert_eq!(creds.password.expose_secret(), "job-token");
    }

    #[test]
    fn every_missing_name_is_reported() {
        let signals: HashMap<&str, &str> = HashMap::new();
        let msg = RegistryCredentials::from_signals(&signals)
            .unwrap_err()
            .to_string();
        assert!(msg.contains("CI_REGISTRY,"), "got: {msg}");
        assert!(msg.contains("CI_REGISTRY_USER"), "got: {msg}");
        assert!(msg.contains("CI_REGISTRY_PASSWORD"), "got: {msg}");
    }

    #[test]
    fn debug_redacts_password() {
        let signals = HashMap::from([
            ("CI_REGISTRY", "reg"),
            ("CI_REGISTRY_USER", "u"),
            ("CI_REGISTRY_PASSWORD", "hunter2"),
        ]);
        let creds = RegistryCredentials::from_signals(&signals).unwrap();
        let debug = format!("{creds:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }
}
