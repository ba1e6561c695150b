use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tri_config::TriConfig;
use tri_core::entities::Conversation;
use tri_engine::AskRequest;

use crate::bootstrap;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::AskArgs;
use crate::commands::InterruptGuard;
use crate::output;
use crate::progress::Progress;
use crate::session;

/// Handle `tri ask`.
pub async fn handle(args: &AskArgs, config: &TriConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let engine = bootstrap::build_engine(config).await?;
    let conversation = match &args.session {
        Some(path) => session::load(path)?,
        None => Conversation::new(),
    };
    if args.follow_up && conversation.is_empty() {
        tracing::warn!("--follow-up given but the session has no earlier turns");
    }

    let request = AskRequest::new(&args.question)
        .with_filters(args.filters())
        .follow_up(args.follow_up);
    let cancel = CancellationToken::new();
    let _interrupt = InterruptGuard::watch(&cancel);

    let spinner = Progress::spinner("thinking");
    let result = engine.ask(&request, conversation, &cancel).await;
    spinner.finish_and_clear();
    let (response, conversation) = result.context("question could not be answered")?;

    if let Some(path) = &args.session {
        session::save(path, &conversation)?;
    }
    output::output_answer(&response, flags.format, config.engine.summary_preview_rows)
}
