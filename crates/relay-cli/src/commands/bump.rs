use relay_core::release::{infer_bump, resolve_merge_request_id};

pub async fn bump(merge_request: Option<&str>, dry_run: bool) -> anyhow::Result<()> {
    let (_, ctx) = super::load(dry_run)?;
    let client = super::gitlab()?;

    let id = resolve_merge_request_id(&client, merge_request, &ctx).await?;
    let decision = infer_bump(&client, id.as_deref()).await;
    tracing::debug!(merge_request = ?id, source = %decision.source, "bump classified");

    println!("{}", decision.kind);
    Ok(())
}
