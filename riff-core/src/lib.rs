//! # Riff Core
//!
//! The authorization engine behind riff, an interactive shell whose LLM
//! agent can propose commands for execution.
//!
//! A proposed command cannot be trusted by its literal text: `ls && rm -rf /`
//! contains an approved `ls` but must still be stopped. Riff decomposes every
//! proposal into the atomic commands it actually performs - across pipes,
//! `&&`/`||` chains, subshells, and command substitutions - and runs it
//! automatically only when *every* atomic command matches a pre-approved
//! pattern.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use riff_core::authorize::{CommandAuthorizer, CommandPatternStore};
//!
//! # let dir = tempfile::tempdir().unwrap();
//! # let store = Arc::new(CommandPatternStore::new(dir.path().join("authorized_commands")));
//! let auth = CommandAuthorizer::new(Arc::clone(&store));
//!
//! store.append("^git\\ status.*").unwrap();
//!
//! assert!(auth.is_authorized("git status --short").unwrap());
//! assert!(!auth.is_authorized("git status && git push").unwrap());
//! ```
//!
//! ## Approval Workflow
//!
//! When a command is not covered, the caller asks its injected
//! [`Confirmer`](authorize::Confirmer). A front end like `riff-cli` prompts
//! `y`/`n`/`m`; choosing `m` opens the [`PermissionsMenu`](authorize::PermissionsMenu),
//! which turns the decomposed atomic commands into toggleable prefixes and
//! persists the selection as durable authorization patterns.
//!
//! The engine is synchronous and side-effect free apart from the pattern
//! file; see the `authorize` module docs for the component breakdown.

pub mod authorize;
pub mod config;
pub mod error;

pub use authorize::{
    candidate_prefixes, decompose, exact_prefix_pattern, filter_dangerous_patterns,
    loose_authorization_pattern, parse_extra_patterns, preselection_pattern,
    validate_compound_command, AutoDenyConfirmer, CommandAuthorizer, CommandPatternStore,
    ConfirmationOutcome, Confirmer, DecomposeError, PatternStoreError, PermissionAtom,
    PermissionsMenu,
};
pub use error::{Error, Result};
