//! Conversation files: the CLI's persistence for multi-turn sessions.

use anyhow::Context;
use std::path::Path;
use tri_core::entities::Conversation;

/// Read a conversation, or start a new one if the file does not exist.
pub fn load(path: &Path) -> anyhow::Result<Conversation> {
    if !path.exists() {
        return Ok(Conversation::new());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read session file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid session file {}", path.display()))
}

/// Write a conversation, creating parent directories as needed.
pub fn save(path: &Path, conversation: &Conversation) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(conversation)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write session file {}", path.display()))
}
