//! Configuration surface for the authorization engine.
//!
//! Riff keeps its durable policy in one plain-text file under the user's
//! config directory and exposes two environment knobs: an override channel
//! for extra (filtered) patterns and a session-scoped switch that disables
//! confirmation entirely.

use std::path::PathBuf;

/// File name of the durable pattern store, one regex per line.
pub const AUTHORIZED_COMMANDS_FILE: &str = "authorized_commands";

/// Environment variable holding a JSON array of additional patterns.
///
/// Always passed through the dangerous-pattern filter before use.
pub const APPROVED_PATTERNS_ENV: &str = "RIFF_APPROVED_PATTERNS";

/// Environment variable that disables command confirmation for the session.
pub const SKIP_CONFIRMATION_ENV: &str = "RIFF_SKIP_COMMAND_CONFIRMATION";

/// The match-everything pattern handed out when confirmation is disabled.
///
/// This is the one deliberate bypass; it never goes through the filter and
/// is never persisted.
pub const UNIVERSAL_PATTERN: &str = ".*";

/// Riff's config directory (`~/.config/riff` on most systems).
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_default()
        .join("riff")
}

/// Default location of the authorized-commands file.
pub fn authorized_commands_path() -> PathBuf {
    config_dir().join(AUTHORIZED_COMMANDS_FILE)
}

/// Interpret a boolean-like environment value (`1`, `true`, `yes`).
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}
