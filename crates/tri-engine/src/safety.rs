//! Read-only guard applied to every generated query before execution.
//!
//! The rules are intentionally coarse. The keyword scan is a substring
//! match, so identifiers such as `created_at` or `last_update` are rejected
//! too; a false refusal costs one answer, a false acceptance costs data.

/// Keywords that mark a statement as mutating.
pub const FORBIDDEN_KEYWORDS: [&str; 6] = ["insert", "update", "delete", "drop", "alter", "create"];

/// Why a query was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SafetyViolation {
    #[error("query contains forbidden keyword '{0}'")]
    ForbiddenKeyword(&'static str),

    #[error("query contains {0} statement terminators")]
    MultipleStatements(usize),

    #[error("statement terminator is not at the end of the query")]
    TrailingText,
}

/// Check `query` against the read-only rules.
///
/// # Errors
///
/// Returns the first rule the query breaks.
pub fn check(query: &str) -> Result<(), SafetyViolation> {
    let lowered = query.to_ascii_lowercase();
    if let Some(keyword) = FORBIDDEN_KEYWORDS.into_iter().find(|k| lowered.contains(k)) {
        return Err(SafetyViolation::ForbiddenKeyword(keyword));
    }

    let trimmed = query.trim();
    match trimmed.matches(';').count() {
        0 => Ok(()),
        1 if trimmed.ends_with(';') => Ok(()),
        1 => Err(SafetyViolation::TrailingText),
        n => Err(SafetyViolation::MultipleStatements(n)),
    }
}

#[must_use]
pub fn is_safe(query: &str) -> bool {
    check(query).is_ok()
}
