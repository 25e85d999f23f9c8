use relay_core::{ReleaseApi, generate_tags, route};
use relay_gitlab::GitlabClient;

pub async fn context(dry_run: bool) -> anyhow::Result<()> {
    let (_, ctx) = super::load(dry_run)?;
    let environment = route(&ctx);

    println!("{}", ctx.describe());
    println!();
    println!("  mode:                {}", ctx.mode());
    println!("  pipeline source:     {}", ctx.pipeline_source);
    println!("  ref:                 {}", ctx.ref_name);
    println!("  sha:                 {}", ctx.sha);
    println!("  short sha:           {}", ctx.short_sha);
    println!("  tag:                 {}", ctx.tag);
    println!("  merge request:       {}", ctx.merge_request_id);
    println!("  merge target:        {}", ctx.merge_request_target);
    println!("  default branch:      {}", ctx.default_branch);
    println!("  integration branch:  {}", ctx.integration_branch);
    println!("  protected:           {}", ctx.is_protected);
    println!("  feature branch:      {}", ctx.is_feature_branch);
    println!("  registry image:      {}", ctx.registry_image);
    println!("  project:             {}", ctx.project_path);
    println!("  application:         {}", ctx.application_name);
    println!("  force push:          {}", ctx.force_push);
    println!("  dry run:             {}", ctx.dry_run);
    println!("  environment:         {environment}");

    match generate_tags(&ctx, environment, &ctx.application_name, &ctx.short_sha) {
        Ok(tags) => {
            println!("  tags:");
            for tag in &tags {
                println!("    {tag}");
            }
        }
        Err(e) => println!("  tags:                unavailable ({e})"),
    }

    println!("  latest release:      {}", latest_release().await);
    Ok(())
}

/// Best-effort summary; failures are reported inline.
async fn latest_release() -> String {
    let client = match super::gitlab() {
        Ok(client) => client,
        Err(e) => return format!("unavailable ({e})"),
    };
    describe_latest(&client).await
}

async fn describe_latest(client: &GitlabClient) -> String {
    match client.latest_release().await {
        Ok(Some(release)) => format!("{} ({})", release.tag_name, release.created_at),
        Ok(None) => "none".to_owned(),
        Err(e) => format!("unavailable ({e})"),
    }
}
