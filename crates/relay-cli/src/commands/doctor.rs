use std::path::Path;

use relay_core::EnvSignals;
use relay_core::config::CONFIG_FILE;
use relay_registry::{CheckResult, ImageClient, RegistryCredentials};

pub async fn doctor() -> anyhow::Result<()> {
    let client = ImageClient::new();
    let mut report = client.doctor().await;

    report.registry_credentials = match RegistryCredentials::from_signals(&EnvSignals) {
        Ok(creds) => CheckResult::ok(&format!("{}@{}", creds.username, creds.registry)),
        Err(e) => CheckResult::fail(&e.to_string()),
    };

    report.gitlab = match super::gitlab() {
        Ok(gitlab) => match gitlab.project().await {
            Ok(project) => CheckResult::ok(&project.path_with_namespace),
            Err(e) => CheckResult::fail(&e.to_string()),
        },
        Err(e) => CheckResult::fail(&e.to_string()),
    };

    report.config_file = if Path::new(CONFIG_FILE).exists() {
        match super::load(false) {
            Ok(_) => CheckResult::ok("Found"),
            Err(e) => CheckResult::fail(&e.to_string()),
        }
    } else {
        CheckResult::ok("Not found, using defaults")
    };

    println!();
    println!("{report}");

    if !report.all_passed() {
        anyhow::bail!("some checks failed, see above for details");
    }

    Ok(())
}
