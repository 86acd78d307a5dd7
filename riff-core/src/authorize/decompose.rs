//! Shell command decomposition.
//!
//! A command proposed for execution may hide arbitrary sub-commands inside
//! pipes, `&&`/`||` chains, subshells, and command substitutions. Before any
//! authorization decision, the command is decomposed into every atomic
//! invocation it actually performs, so each one can be checked independently.

use thiserror::Error;
use tree_sitter::{Node, Parser};
use tree_sitter_bash::LANGUAGE;

/// Errors that can occur while decomposing a command string.
#[derive(Debug, Error)]
pub enum DecomposeError {
    /// The command is not valid shell syntax.
    ///
    /// Callers must treat this as "the whole string is one untrusted atomic
    /// command" - fail safe, never fail open.
    #[error("invalid shell syntax")]
    Syntax,

    /// The bash grammar could not be loaded into the parser.
    #[error("failed to load shell grammar: {0}")]
    Grammar(String),
}

/// Node kinds that represent one leaf command invocation.
///
/// Everything else (sequences, pipelines, and/or lists, subshells,
/// substitutions, redirections, loops) only *contains* commands and is
/// traversed, not collected.
const ATOMIC_KINDS: &[&str] = &[
    "command",
    "declaration_command",
    "unset_command",
    "test_command",
];

/// Decompose a (possibly compound) shell command into its atomic commands.
///
/// Atomic commands are returned in left-to-right, depth-first order, each
/// rendered as its literal source text with quoting preserved verbatim. A
/// command containing a substitution contributes both itself and the
/// substituted commands:
///
/// ```rust
/// use riff_core::authorize::decompose;
///
/// let atomics = decompose("ls -la | grep foo && echo $(pwd)").unwrap();
/// assert_eq!(atomics, vec!["ls -la", "grep foo", "echo $(pwd)", "pwd"]);
/// ```
///
/// An empty or whitespace-only command yields an empty list. Invalid shell
/// syntax yields [`DecomposeError::Syntax`].
pub fn decompose(command: &str) -> Result<Vec<String>, DecomposeError> {
    if command.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut parser = Parser::new();
    parser
        .set_language(&LANGUAGE.into())
        .map_err(|e| DecomposeError::Grammar(e.to_string()))?;

    let tree = parser.parse(command, None).ok_or(DecomposeError::Syntax)?;
    let root = tree.root_node();
    if root.has_error() {
        return Err(DecomposeError::Syntax);
    }

    let mut atomics = Vec::new();
    collect_atomics(root, command, &mut atomics);
    Ok(atomics)
}

fn collect_atomics(node: Node, source: &str, out: &mut Vec<String>) {
    if ATOMIC_KINDS.contains(&node.kind()) {
        let text = source[node.byte_range()].trim();
        if !text.is_empty() {
            out.push(text.to_string());
        }
        // The command's own words may still carry $(...) or backtick
        // substitutions whose inner commands must also be collected.
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_atomics(child, source, out);
    }
}
