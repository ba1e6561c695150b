use tri_config::TriConfig;

use crate::cli::GlobalFlags;
use crate::output;

/// Handle `tri config`.
pub fn handle(config: &TriConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    output::output(&config.redacted(), flags.format)
}
