use tri_core::responses::SafetyCheckResponse;
use tri_engine::safety;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::CheckSqlArgs;
use crate::output;

/// Handle `tri check-sql`. Exits non-zero when the query is refused.
pub fn handle(args: &CheckSqlArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let verdict = safety::check(&args.sql);
    let response = SafetyCheckResponse {
        query: args.sql.clone(),
        allowed: verdict.is_ok(),
        reason: verdict.as_ref().err().map(ToString::to_string),
    };
    output::output(&response, flags.format)?;
    if let Err(violation) = verdict {
        anyhow::bail!("query refused: {violation}");
    }
    Ok(())
}
