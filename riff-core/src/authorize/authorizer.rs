//! Command authorization facade.
//!
//! [`CommandAuthorizer`] is the surface the agent/tool layer talks to: it
//! merges the durable pattern store with the filtered environment channel,
//! honors the session override, and answers whether a proposed command can
//! run without asking the user.

use std::sync::Arc;

use super::filter::{filter_dangerous_patterns, parse_extra_patterns};
use super::store::{CommandPatternStore, PatternStoreError};
use super::validate::validate_compound_command;
use crate::config;
use crate::error::Result;

/// Authorizes proposed commands against approved patterns.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use riff_core::authorize::{CommandAuthorizer, CommandPatternStore};
///
/// let dir = tempfile::tempdir().unwrap();
/// let store = Arc::new(CommandPatternStore::new(dir.path().join("authorized_commands")));
/// store.append("^ls.*").unwrap();
///
/// let auth = CommandAuthorizer::new(Arc::clone(&store));
/// assert!(auth.is_authorized("ls -la | ls").unwrap());
/// assert!(!auth.is_authorized("ls && rm -rf /").unwrap());
/// ```
pub struct CommandAuthorizer {
    store: Arc<CommandPatternStore>,
    extra_patterns: Vec<String>,
    skip_confirmations: bool,
}

impl CommandAuthorizer {
    /// Create an authorizer over a shared pattern store.
    pub fn new(store: Arc<CommandPatternStore>) -> Self {
        Self {
            store,
            extra_patterns: Vec::new(),
            skip_confirmations: false,
        }
    }

    /// Create an authorizer configured from the process environment.
    ///
    /// Reads the pattern override channel and the session skip switch; both
    /// degrade to their safe defaults when unset or malformed.
    pub fn from_env(store: Arc<CommandPatternStore>) -> Self {
        let extra = std::env::var(config::APPROVED_PATTERNS_ENV)
            .map(|raw| parse_extra_patterns(&raw))
            .unwrap_or_default();
        let skip = std::env::var(config::SKIP_CONFIRMATION_ENV)
            .map(|value| config::is_truthy(&value))
            .unwrap_or(false);

        Self::new(store)
            .with_extra_patterns(extra)
            .with_skip_confirmations(skip)
    }

    /// Add environment-channel patterns.
    ///
    /// The dangerous-pattern filter is applied here; patterns loaded from
    /// the file store never go through it.
    pub fn with_extra_patterns(mut self, patterns: Vec<String>) -> Self {
        self.extra_patterns = filter_dangerous_patterns(patterns);
        self
    }

    /// Disable confirmation for this session.
    ///
    /// Session-scoped only: nothing is persisted, and
    /// [`approved_patterns`](Self::approved_patterns) returns a single
    /// universal-match pattern while set.
    pub fn with_skip_confirmations(mut self, skip: bool) -> Self {
        self.skip_confirmations = skip;
        self
    }

    /// Whether the session override is active.
    pub fn skips_confirmations(&self) -> bool {
        self.skip_confirmations
    }

    /// The shared pattern store.
    pub fn store(&self) -> &Arc<CommandPatternStore> {
        &self.store
    }

    /// All patterns currently in force: stored patterns plus the filtered
    /// environment patterns, or the universal pattern under the session
    /// override.
    pub fn approved_patterns(&self) -> std::result::Result<Vec<String>, PatternStoreError> {
        if self.skip_confirmations {
            return Ok(vec![config::UNIVERSAL_PATTERN.to_string()]);
        }

        let mut patterns = self.store.load()?;
        patterns.extend(self.extra_patterns.iter().cloned());
        Ok(patterns)
    }

    /// Whether the full (possibly compound) command can run without asking.
    ///
    /// Decomposition failures surface as errors; callers must treat them as
    /// "requires interactive approval".
    pub fn is_authorized(&self, command: &str) -> Result<bool> {
        let patterns = self.approved_patterns()?;
        Ok(validate_compound_command(command, &patterns)?)
    }

    /// Append one pattern to the durable store.
    pub fn append_pattern(&self, pattern: &str) -> std::result::Result<(), PatternStoreError> {
        self.store.append(pattern)
    }

    /// Replace the durable store contents.
    pub fn replace_all_patterns(
        &self,
        patterns: &[String],
    ) -> std::result::Result<(), PatternStoreError> {
        self.store.replace_all(patterns)
    }

    /// Load the durable store contents.
    pub fn load_patterns(&self) -> std::result::Result<Vec<String>, PatternStoreError> {
        self.store.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authorizer_in(dir: &tempfile::TempDir) -> CommandAuthorizer {
        let store = Arc::new(CommandPatternStore::new(
            dir.path().join("authorized_commands"),
        ));
        CommandAuthorizer::new(store)
    }

    #[test]
    fn test_empty_store_denies() {
        let dir = tempfile::tempdir().unwrap();
        let auth = authorizer_in(&dir);
        assert!(!auth.is_authorized("ls").unwrap());
    }

    #[test]
    fn test_stored_pattern_authorizes() {
        let dir = tempfile::tempdir().unwrap();
        let auth = authorizer_in(&dir);
        auth.append_pattern("^ls.*").unwrap();

        assert!(auth.is_authorized("ls -la").unwrap());
        assert!(auth.is_authorized("ls | ls").unwrap());
        assert!(!auth.is_authorized("ls && pwd").unwrap());
    }

    #[test]
    fn test_extra_patterns_merge_with_store() {
        let dir = tempfile::tempdir().unwrap();
        let auth = authorizer_in(&dir).with_extra_patterns(vec!["^pwd.*".to_string()]);
        auth.append_pattern("^ls.*").unwrap();

        assert!(auth.is_authorized("ls && pwd").unwrap());
    }

    #[test]
    fn test_extra_patterns_are_filtered() {
        let dir = tempfile::tempdir().unwrap();
        // A blanket pattern through the environment channel must not grant
        // blanket approval.
        let auth = authorizer_in(&dir).with_extra_patterns(vec![".*".to_string()]);

        assert!(!auth.is_authorized("rm -rf /").unwrap());
        assert!(auth.approved_patterns().unwrap().is_empty());
    }

    #[test]
    fn test_stored_universal_pattern_is_honored() {
        let dir = tempfile::tempdir().unwrap();
        let auth = authorizer_in(&dir);
        // The file store is the trusted, explicitly-curated policy: even a
        // blanket pattern is honored when the user put it there.
        auth.append_pattern(".*").unwrap();

        assert!(auth.is_authorized("rm -rf /").unwrap());
    }

    #[test]
    fn test_skip_confirmations_returns_universal_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let auth = authorizer_in(&dir).with_skip_confirmations(true);

        assert_eq!(
            auth.approved_patterns().unwrap(),
            vec![config::UNIVERSAL_PATTERN.to_string()]
        );
        assert!(auth.is_authorized("rm -rf /").unwrap());
    }

    #[test]
    fn test_parse_failure_surfaces_as_error() {
        let dir = tempfile::tempdir().unwrap();
        let auth = authorizer_in(&dir);
        auth.append_pattern("^ls.*").unwrap();

        assert!(auth.is_authorized("ls &&").is_err());
    }

    #[test]
    fn test_store_passthroughs() {
        let dir = tempfile::tempdir().unwrap();
        let auth = authorizer_in(&dir);

        auth.append_pattern("^ls.*").unwrap();
        auth.append_pattern("^pwd.*").unwrap();
        assert_eq!(auth.load_patterns().unwrap(), vec!["^ls.*", "^pwd.*"]);

        auth.replace_all_patterns(&["^pwd.*".to_string()]).unwrap();
        assert_eq!(auth.load_patterns().unwrap(), vec!["^pwd.*"]);
    }
}
