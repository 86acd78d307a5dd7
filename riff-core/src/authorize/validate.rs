//! Compound command validation.

use regex::Regex;

use super::decompose::{decompose, DecomposeError};

/// Whether any pattern compiles and matches the atomic command.
///
/// Entries that fail to compile are skipped so one bad pattern never aborts
/// evaluation of the rest.
pub(crate) fn matches_any_pattern(atomic_command: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|pattern| {
        Regex::new(pattern)
            .map(|re| re.is_match(atomic_command))
            .unwrap_or(false)
    })
}

/// Decide whether a full command string can run without asking the user.
///
/// The command is decomposed into every atomic invocation it performs; it is
/// authorized only if **every** atomic command matches at least one approved
/// pattern. A single unmatched command anywhere in the tree - a pipe stage, a
/// subshell, a command substitution - rejects the whole compound command.
///
/// A decomposition failure is returned as an error, never as approval.
///
/// ```rust
/// use riff_core::authorize::validate_compound_command;
///
/// let approved = vec!["^ls.*".to_string(), "^pwd.*".to_string(), "^echo.*".to_string()];
/// assert!(validate_compound_command("ls && echo $(pwd)", &approved).unwrap());
/// assert!(!validate_compound_command("ls && rm -rf /", &approved).unwrap());
/// ```
pub fn validate_compound_command(
    command: &str,
    approved_patterns: &[String],
) -> Result<bool, DecomposeError> {
    let atomics = decompose(command)?;
    Ok(atomics
        .iter()
        .all(|atomic| matches_any_pattern(atomic, approved_patterns)))
}
