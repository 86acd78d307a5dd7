//! Compound-command authorization.
//!
//! An LLM-proposed shell command may hide dangerous sub-commands inside
//! pipes, logical chains, subshells, or command substitutions, so execution
//! is never gated on the literal command text. Instead the command is
//! decomposed into every atomic invocation it performs and each one must be
//! independently covered by an approved pattern.
//!
//! # Overview
//!
//! - **[`decompose`]**: split a compound command into its atomic commands
//! - **Pattern generation**: [`loose_authorization_pattern`],
//!   [`exact_prefix_pattern`], [`preselection_pattern`],
//!   [`candidate_prefixes`]
//! - **[`CommandPatternStore`]**: durable, cached, deduplicated pattern file
//! - **[`filter_dangerous_patterns`]**: strips blanket patterns from the
//!   environment channel
//! - **[`validate_compound_command`]**: the all-or-nothing authorization
//!   decision
//! - **[`CommandAuthorizer`]**: the query API the agent/tool layer calls
//! - **[`PermissionsMenu`]** / **[`Confirmer`]**: the interactive approval
//!   workflow
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use riff_core::authorize::{CommandAuthorizer, CommandPatternStore};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let store = Arc::new(CommandPatternStore::new(dir.path().join("authorized_commands")));
//! let auth = CommandAuthorizer::new(Arc::clone(&store));
//!
//! // Nothing approved yet.
//! assert!(!auth.is_authorized("ls").unwrap());
//!
//! // Approving `ls` is not enough for the pipeline's other stage.
//! store.append("^ls.*").unwrap();
//! assert!(auth.is_authorized("ls -la").unwrap());
//! assert!(!auth.is_authorized("ls | rm -rf /").unwrap());
//! ```

mod authorizer;
mod decompose;
mod filter;
mod menu;
mod pattern;
mod store;
mod validate;

pub use authorizer::CommandAuthorizer;
pub use decompose::{decompose, DecomposeError};
pub use filter::{filter_dangerous_patterns, parse_extra_patterns};
pub use menu::{
    AutoDenyConfirmer, ConfirmationOutcome, Confirmer, PermissionAtom, PermissionsMenu,
};
pub use pattern::{
    candidate_prefixes, exact_prefix_pattern, loose_authorization_pattern, preselection_pattern,
};
pub use store::{CommandPatternStore, PatternStoreError};
pub use validate::validate_compound_command;
