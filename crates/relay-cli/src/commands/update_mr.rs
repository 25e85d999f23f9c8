use relay_core::bump::{RELEASE_CHECKLIST, append_checklist};
use relay_core::release::resolve_merge_request_id;
use relay_core::{MergeRequestApi, WriteOutcome};

pub async fn update_mr(
    merge_request: Option<&str>,
    comment: bool,
    dry_run: bool,
) -> anyhow::Result<()> {
    let (_, ctx) = super::load(dry_run)?;
    let client = super::gitlab()?;

    let Some(id) = resolve_merge_request_id(&client, merge_request, &ctx).await? else {
        anyhow::bail!("no merge request to update: pass an IID or run in a merge request pipeline");
    };

    if comment {
        if dry_run {
            println!("[dry-run] would comment the release checklist on !{id}");
            return Ok(());
        }
        match client.create_comment(&id, RELEASE_CHECKLIST).await? {
            WriteOutcome::Created => println!("Release checklist commented on !{id}"),
            WriteOutcome::AlreadyPresent => {
                println!("!{id} already has the release checklist comment")
            }
        }
        return Ok(());
    }

    let description = client.description(&id).await?;
    let Some(updated) = append_checklist(&description) else {
        println!("!{id} already has the release checklist");
        return Ok(());
    };

    if dry_run {
        println!("[dry-run] would append the release checklist to !{id}");
        return Ok(());
    }
    client.update_description(&id, &updated).await?;
    println!("Release checklist added to !{id}");
    Ok(())
}
