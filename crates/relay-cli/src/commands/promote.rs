use relay_registry::{ImageClient, PromotionReport, PromotionRequest, PromotionStrategy, Promoter};

pub async fn promote(
    from: &str,
    to: &str,
    latest: bool,
    strategy: PromotionStrategy,
    dry_run: bool,
) -> anyhow::Result<()> {
    let (_, ctx) = super::load(dry_run)?;
    let request = PromotionRequest::resolve(from, to, &ctx.registry_image, latest, dry_run)?
        .with_strategy(strategy);

    println!("Promoting {} -> {}", request.source, request.destination);
    let client = ImageClient::new();
    let report = Promoter::new(&client).promote(&request).await?;
    print_report(&report);
    Ok(())
}

pub async fn promote_sprint(dry_run: bool) -> anyhow::Result<()> {
    let (_, ctx) = super::load(dry_run)?;

    println!("Sprint promotion for {}", ctx.short_sha);
    let client = ImageClient::new();
    let report = Promoter::new(&client).sprint(&ctx).await?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &PromotionReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    for op in &report.operations {
        println!("{prefix}{op}");
    }
    if !report.dry_run {
        println!("Promotion complete");
    }
}
