use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use tri_config::TriConfig;
use tri_core::entities::Conversation;
use tri_engine::{AskRequest, EngineError};

use crate::bootstrap;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::ChatArgs;
use crate::commands::InterruptGuard;
use crate::output;
use crate::progress::Progress;
use crate::session;

const PROMPT: &[u8] = b"tri> ";

/// Handle `tri chat`.
///
/// Reads one question per line until EOF or `exit`. Ctrl-C cancels the
/// question in flight and keeps the session.
pub async fn handle(args: &ChatArgs, config: &TriConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let engine = bootstrap::build_engine(config).await?;
    let mut conversation = match &args.session {
        Some(path) => session::load(path)?,
        None => Conversation::new(),
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stderr = tokio::io::stderr();
    loop {
        if !flags.quiet {
            stderr.write_all(PROMPT).await?;
            stderr.flush().await?;
        }
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question, "exit" | "quit") {
            break;
        }

        let request = AskRequest::new(question).follow_up(!conversation.is_empty());
        let cancel = CancellationToken::new();
        let interrupt = InterruptGuard::watch(&cancel);
        let spinner = Progress::spinner("thinking");
        let result = engine.ask(&request, conversation.clone(), &cancel).await;
        spinner.finish_and_clear();
        drop(interrupt);

        match result {
            Ok((response, extended)) => {
                conversation = extended;
                if let Some(path) = &args.session {
                    session::save(path, &conversation)?;
                }
                output::output_answer(&response, flags.format, config.engine.summary_preview_rows)?;
            }
            Err(EngineError::Cancelled) => eprintln!("cancelled"),
            Err(error) => eprintln!("tri error: {error}"),
        }
    }
    Ok(())
}
