use relay_build::BuildPlan;
use relay_core::EnvSignals;
use relay_registry::{ImageClient, ImageOperation, RegistryCredentials};

pub async fn push(dry_run: bool) -> anyhow::Result<()> {
    let (config, ctx) = super::load(dry_run)?;
    let plan = BuildPlan::resolve(&ctx, &config, &EnvSignals)?;

    if !plan.should_push {
        println!(
            "Skipping push: {} images stay local (set RELAY_FORCE_PUSH=true to push)",
            plan.environment
        );
        return Ok(());
    }

    let credentials = RegistryCredentials::from_signals(&EnvSignals)?;

    if plan.dry_run {
        let login = ImageOperation::Login {
            registry: credentials.registry.clone(),
            username: credentials.username.clone(),
        };
        println!("[dry-run] {login}");
        for tag in &plan.tags {
            println!("[dry-run] {}", ImageOperation::push(tag));
        }
        let logout = ImageOperation::Logout {
            registry: credentials.registry.clone(),
        };
        println!("[dry-run] {logout}");
        return Ok(());
    }

    let client = ImageClient::new();
    client.login(&credentials).await?;

    let mut pushed = Ok(());
    for tag in &plan.tags {
        println!("Pushing {tag}...");
        if let Err(e) = client.push(tag).await {
            pushed = Err(e);
            break;
        }
    }
    client.logout(&credentials.registry).await;
    pushed?;

    println!("Pushed {} tag(s)", plan.tags.len());
    Ok(())
}
