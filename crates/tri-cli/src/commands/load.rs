use anyhow::Context;
use tri_config::TriConfig;
use tri_core::responses::LoadResponse;

use crate::bootstrap;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::LoadArgs;
use crate::output;

/// Handle `tri load`.
pub async fn handle(args: &LoadArgs, config: &TriConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    if config.warehouse.is_in_memory() {
        anyhow::bail!("warehouse.path is not set; a table loaded into an in-memory warehouse is lost on exit");
    }
    let warehouse = bootstrap::open_warehouse(config)?;
    let table = args.table.clone();
    let csv = args.csv.clone();
    let rows_loaded = tokio::task::spawn_blocking(move || warehouse.load_csv(&table, &csv))
        .await
        .context("load task failed")?
        .with_context(|| format!("failed to load {}", args.csv.display()))?;

    output::output(
        &LoadResponse {
            table: args.table.clone(),
            rows_loaded,
        },
        flags.format,
    )
}
