pub async fn protected_branches() -> anyhow::Result<()> {
    let client = super::gitlab()?;
    let branches = client.protected_branches().await?;

    if branches.is_empty() {
        println!("No protected branches");
    } else {
        for branch in &branches {
            println!("{}", branch.name);
        }
    }
    Ok(())
}
