use relay_build::BuildPlan;
use relay_core::EnvSignals;
use relay_registry::{ImageClient, ImageOperation};

pub async fn build(dry_run: bool) -> anyhow::Result<()> {
    let (config, ctx) = super::load(dry_run)?;
    let plan = BuildPlan::resolve(&ctx, &config, &EnvSignals)?;

    println!("{}", ctx.describe());
    println!("Environment: {}", plan.environment);

    let op = ImageOperation::Build {
        dockerfile: plan.dockerfile.clone(),
        context: plan.context.clone(),
        tags: plan.tags.clone(),
        build_args: plan.extra_args.clone(),
    };

    if plan.dry_run {
        println!("[dry-run] {op}");
    } else {
        println!("Building {}...", plan.canonical_tag());
        ImageClient::new().run(&op).await?;
    }

    if let Some(path) = &plan.metadata_path {
        plan.metadata(&ctx).write(path)?;
        println!("Metadata written to {}", path.display());
    }

    Ok(())
}
