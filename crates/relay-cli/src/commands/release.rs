use relay_core::release::{infer_bump, resolve_merge_request_id};
use relay_core::{ReleaseEngine, ReleaseRequest, VersionResolver};

pub async fn release_create(mut request: ReleaseRequest) -> anyhow::Result<()> {
    let (config, ctx) = super::load(request.dry_run)?;
    let client = super::gitlab()?;

    if request.bump.is_none() {
        request.merge_request_id =
            resolve_merge_request_id(&client, request.merge_request_id.as_deref(), &ctx).await?;
    }

    let engine = ReleaseEngine::new(&client, &client, &config.release);
    let outcome = engine.release(&ctx, &request).await?;

    println!("Current version: {}", outcome.current);
    println!("Bump:            {} ({})", outcome.bump, outcome.bump_source);
    println!("Name:            {}", outcome.name);
    if outcome.created {
        let kind = if request.tag_only { "Tag" } else { "Release" };
        println!("{kind} {} created", outcome.version());
    } else {
        println!("[dry-run] release {} not created", outcome.version());
    }
    println!("{}", outcome.version());
    Ok(())
}

pub async fn release_infer_bump(merge_request: Option<&str>, dry_run: bool) -> anyhow::Result<()> {
    let (_, ctx) = super::load(dry_run)?;
    let client = super::gitlab()?;

    let id = resolve_merge_request_id(&client, merge_request, &ctx).await?;
    let decision = infer_bump(&client, id.as_deref()).await;
    let (current, next) = VersionResolver::new(&client)
        .next_version(decision.kind)
        .await?;

    println!("Current version: {current}");
    println!("Bump:            {} ({})", decision.kind, decision.source);
    println!("{next}");
    Ok(())
}
