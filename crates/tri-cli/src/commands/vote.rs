use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tri_config::TriConfig;

use crate::bootstrap;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::VoteArgs;
use crate::output;
use crate::session;

/// Handle `tri vote`.
pub async fn handle(args: &VoteArgs, config: &TriConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let conversation = session::load(&args.session)?;
    let engine = bootstrap::build_engine(config).await?;
    let response = engine
        .record_vote(args.vote, &conversation, &CancellationToken::new())
        .await
        .with_context(|| format!("cannot vote on session {}", args.session.display()))?;
    if !response.recorded {
        tracing::warn!("vote could not be written to the audit log");
    }
    output::output(&response, flags.format)
}
