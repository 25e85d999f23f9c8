use relay_core::Environment;
use relay_registry::{ImageClient, RollbackPlan, RollbackRequest};

pub async fn rollback(
    environment: Environment,
    tag: &str,
    from_environment: Option<Environment>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let (_, ctx) = super::load(dry_run)?;
    let request = RollbackRequest {
        environment,
        tag: tag.to_owned(),
        source_environment: from_environment,
        dry_run,
    };
    let plan = RollbackPlan::resolve(&ctx, &request)?;

    println!("Rolling back {environment} to {}", plan.source);
    let client = ImageClient::new();
    let operations = relay_registry::rollback(&client, &plan).await?;

    let prefix = if plan.dry_run { "[dry-run] " } else { "" };
    for op in &operations {
        println!("{prefix}{op}");
    }
    if !plan.dry_run {
        println!("{} now points at {}", plan.destination, plan.source);
    }
    Ok(())
}
