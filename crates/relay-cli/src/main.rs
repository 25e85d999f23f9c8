mod commands;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use relay_core::{BumpKind, Environment};
use relay_registry::PromotionStrategy;

#[derive(Parser)]
#[command(name = "relay", about = "Build once, promote the same image through every environment")]
#[command(version)]
struct Cli {
    /// Print the planned operations without changing anything
    #[arg(long, global = true)]
    dry_run: bool,

    /// Load variables from a dotenv file before reading the pipeline context
    #[arg(long, global = true, value_name = "PATH")]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the resolved pipeline context, environment, and image tags
    Context,
    /// Build the image for this pipeline and write the metadata artifact
    Build,
    /// Push every image tag of this pipeline
    Push,
    /// Promote an existing image to another tag without rebuilding
    Promote {
        /// Source image or bare tag
        #[arg(long, required_unless_present = "sprint")]
        from: Option<String>,
        /// Destination image or bare tag
        #[arg(long, required_unless_present = "sprint")]
        to: Option<String>,
        /// Also publish the destination's -latest alias
        #[arg(long)]
        latest: bool,
        /// standard, blue-green, or canary
        #[arg(long, default_value = "standard")]
        strategy: PromotionStrategy,
        /// Run the end-of-sprint chain dev -> test -> int
        #[arg(long, conflicts_with_all = ["from", "to"])]
        sprint: bool,
    },
    /// Point an environment back at a previously published image
    Rollback {
        /// Environment to roll back
        #[arg(long, short = 'e')]
        environment: Environment,
        /// Tag of the known-good image
        #[arg(long, short = 't')]
        tag: String,
        /// Environment the known-good image was published under
        #[arg(long)]
        from_environment: Option<Environment>,
    },
    /// Create releases and inspect the next version
    Release {
        #[command(subcommand)]
        action: ReleaseAction,
    },
    /// Print the bump level selected in a merge request's checklist
    Bump {
        /// Merge request IID
        merge_request: Option<String>,
    },
    /// Add the release checklist to a merge request
    UpdateMr {
        /// Merge request IID
        merge_request: Option<String>,
        /// Post the checklist as a comment instead of editing the description
        #[arg(long)]
        comment: bool,
    },
    /// List the project's protected branches
    ProtectedBranches,
    /// Check docker, credentials, and configuration
    Doctor,
}

#[derive(Subcommand)]
enum ReleaseAction {
    /// Tag the next version and create a release
    Create {
        /// patch, minor, or major; read from the merge request when omitted
        #[arg(long)]
        bump: Option<BumpKind>,
        /// Commit, branch, or tag to release (default: pipeline commit)
        #[arg(long = "ref")]
        ref_name: Option<String>,
        /// Release name (default: the version)
        #[arg(long)]
        name: Option<String>,
        /// Release notes
        #[arg(long, default_value = "")]
        description: String,
        /// Merge request IID to read the bump from
        #[arg(long)]
        merge_request: Option<String>,
        /// Create only the tag, without a release entry
        #[arg(long)]
        tag_only: bool,
    },
    /// Print the current version, bump, and next version
    InferBump {
        /// Merge request IID
        merge_request: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Some(path) = &cli.env_file {
        dotenvy::from_path(path)
            .with_context(|| format!("failed to load env file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "env file loaded");
    }

    let dry_run = cli.dry_run;
    match cli.command {
        Commands::Context => commands::context(dry_run).await?,
        Commands::Build => commands::build(dry_run).await?,
        Commands::Push => commands::push(dry_run).await?,
        Commands::Promote {
            from,
            to,
            latest,
            strategy,
            sprint,
        } => {
            if sprint {
                commands::promote_sprint(dry_run).await?;
            } else {
                let (Some(from), Some(to)) = (from, to) else {
                    anyhow::bail!("--from and --to are required unless --sprint is given");
                };
                commands::promote(&from, &to, latest, strategy, dry_run).await?;
            }
        }
        Commands::Rollback {
            environment,
            tag,
            from_environment,
        } => commands::rollback(environment, &tag, from_environment, dry_run).await?,
        Commands::Release { action } => match action {
            ReleaseAction::Create {
                bump,
                ref_name,
                name,
                description,
                merge_request,
                tag_only,
            } => {
                let request = relay_core::ReleaseRequest {
                    bump,
                    ref_name,
                    name,
                    description,
                    merge_request_id: merge_request,
                    tag_only,
                    dry_run,
                };
                commands::release_create(request).await?;
            }
            ReleaseAction::InferBump { merge_request } => {
                commands::release_infer_bump(merge_request.as_deref(), dry_run).await?;
            }
        },
        Commands::Bump { merge_request } => {
            commands::bump(merge_request.as_deref(), dry_run).await?;
        }
        Commands::UpdateMr {
            merge_request,
            comment,
        } => commands::update_mr(merge_request.as_deref(), comment, dry_run).await?,
        Commands::ProtectedBranches => commands::protected_branches().await?,
        Commands::Doctor => commands::doctor().await?,
    }

    Ok(())
}
