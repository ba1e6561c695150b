use tri_config::TriConfig;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, config: &TriConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Ask(args) => commands::ask::handle(&args, config, flags).await,
        Commands::Chat(args) => commands::chat::handle(&args, config, flags).await,
        Commands::Vote(args) => commands::vote::handle(&args, config, flags).await,
        Commands::Catalog(args) => commands::catalog::handle(&args, flags),
        Commands::CheckSql(args) => commands::check_sql::handle(&args, flags),
        Commands::Load(args) => commands::load::handle(&args, config, flags).await,
        Commands::Config => commands::config::handle(config, flags),
    }
}
