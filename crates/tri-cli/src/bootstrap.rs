//! Configuration loading and port construction for command handlers.

use anyhow::Context;
use std::sync::Arc;
use tri_audit::AuditSink;
use tri_catalog::SchemaCatalog;
use tri_config::TriConfig;
use tri_engine::Engine;
use tri_llm::OpenAiClient;
use tri_warehouse::DuckDbWarehouse;

use crate::cli::GlobalFlags;

pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<TriConfig> {
    load_dotenv()?;
    TriConfig::load_from(flags.config.as_deref()).context("failed to load configuration")
}

fn load_dotenv() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let env_path = cwd.join(".env");
    if env_path.exists() {
        dotenvy::from_path(&env_path)
            .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
    }
    Ok(())
}

pub fn open_warehouse(config: &TriConfig) -> anyhow::Result<DuckDbWarehouse> {
    DuckDbWarehouse::open(&config.warehouse).context("failed to open warehouse")
}

pub async fn open_audit(config: &TriConfig) -> anyhow::Result<Arc<dyn AuditSink>> {
    tri_audit::open_sink(&config.audit)
        .await
        .context("failed to open audit sink")
}

/// Build the engine with live ports.
pub async fn build_engine(config: &TriConfig) -> anyhow::Result<Engine> {
    let llm = config
        .require_llm()
        .context("set llm.api_key, TRI_LLM__API_KEY, or OPENAI_API_KEY")?;
    let model = OpenAiClient::from_config(llm).context("failed to build language model client")?;
    let warehouse = open_warehouse(config)?;
    let audit = open_audit(config).await?;

    tracing::debug!(model = %llm.model, "engine ready");
    Ok(Engine::new(
        Arc::new(model),
        Arc::new(warehouse),
        audit,
        Arc::new(SchemaCatalog::triathlon()),
        config.engine.clone(),
    ))
}
