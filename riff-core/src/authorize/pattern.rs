//! Authorization pattern generation.
//!
//! Patterns are anchored regular expressions derived from atomic commands.
//! Three flavors exist with deliberately different anchoring:
//!
//! - **Loose** patterns are what actually gets stored and matched at runtime.
//!   They anchor on the command name (plus subcommand when the second token
//!   looks like one) and end in a live `.*`.
//! - **Exact-prefix** patterns pin down one specific prefix for bookkeeping,
//!   so the menu can replace exactly the patterns it manages.
//! - **Preselection** patterns decide which menu prefixes show as already
//!   approved. They are compared by literal string equality against the
//!   store, never by regex matching, so a broad stored pattern cannot make
//!   an unrelated, more specific prefix appear pre-checked.

/// Longest second token still considered a subcommand.
const MAX_SUBCOMMAND_LEN: usize = 20;

/// Whether a token looks like a subcommand (`status` in `git status`).
///
/// A token qualifies when it is non-empty, does not start with `-`, is at
/// most 20 characters, consists only of ASCII letters/digits/`-`/`_`, and
/// starts with a letter. The thresholds are intentionally frozen: stored
/// patterns are coupled to them, so tools with e.g. numeric-leading
/// subcommands will anchor on the command name alone.
fn is_subcommand_token(token: &str) -> bool {
    let Some(first) = token.chars().next() else {
        return false;
    };
    if first == '-' || !first.is_ascii_alphabetic() || token.len() > MAX_SUBCOMMAND_LEN {
        return false;
    }
    token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Escape tokens and join them with an escaped space.
fn escape_tokens(tokens: &[&str]) -> String {
    tokens
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("\\ ")
}

/// Derive the loose authorization pattern stored for an atomic command.
///
/// Everything before the trailing `.*` is escaped literal text:
///
/// ```rust
/// use riff_core::authorize::loose_authorization_pattern;
///
/// assert_eq!(loose_authorization_pattern("ls -la /tmp"), "^ls.*");
/// assert_eq!(loose_authorization_pattern("git status"), "^git\\ status.*");
/// assert_eq!(loose_authorization_pattern(""), "^$");
/// ```
pub fn loose_authorization_pattern(atomic_command: &str) -> String {
    let tokens: Vec<&str> = atomic_command.split_whitespace().collect();
    match tokens.as_slice() {
        [] => "^$".to_string(),
        [only] => format!("^{}.*", regex::escape(only)),
        [first, second, ..] if is_subcommand_token(second) => {
            format!("^{}.*", escape_tokens(&[*first, *second]))
        }
        [first, ..] => format!("^{}.*", regex::escape(first)),
    }
}

/// Derive the exact-prefix pattern for a candidate prefix.
///
/// Single-token prefixes anchor at both ends; multi-token prefixes anchor
/// the full escaped prefix with a trailing wildcard.
pub fn exact_prefix_pattern(prefix: &str) -> String {
    let tokens: Vec<&str> = prefix.split_whitespace().collect();
    match tokens.as_slice() {
        [] => "^$".to_string(),
        [only] => format!("^{}$", regex::escape(only)),
        tokens => format!("^{}.*", escape_tokens(tokens)),
    }
}

/// Derive the pattern whose *literal* presence in the store pre-selects a
/// menu prefix.
///
/// Same token-count and subcommand branching as
/// [`loose_authorization_pattern`], but a multi-token prefix whose second
/// token does not qualify anchors the whole prefix instead of the first
/// token alone. A stored `^awk.*` therefore pre-selects the `awk` prefix but
/// not `awk -F'|'`.
pub fn preselection_pattern(prefix: &str) -> String {
    let tokens: Vec<&str> = prefix.split_whitespace().collect();
    match tokens.as_slice() {
        [] => "^$".to_string(),
        [only] => format!("^{}.*", regex::escape(only)),
        [first, second, ..] if is_subcommand_token(second) => {
            format!("^{}.*", escape_tokens(&[*first, *second]))
        }
        tokens => format!("^{}.*", escape_tokens(tokens)),
    }
}

/// Generate the prefixes offered in the permission menu for one atomic
/// command, most general first, at most three:
///
/// ```rust
/// use riff_core::authorize::candidate_prefixes;
///
/// assert_eq!(
///     candidate_prefixes("ls --foo bar baz"),
///     vec!["ls", "ls --foo", "ls --foo bar baz"]
/// );
/// ```
///
/// Tokenization is quote-aware (a quoted substring stays one token with its
/// quote characters intact) and falls back to naive whitespace splitting
/// when quoting is unbalanced.
pub fn candidate_prefixes(atomic_command: &str) -> Vec<String> {
    let trimmed = atomic_command.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let tokens = split_preserving_quotes(trimmed)
        .unwrap_or_else(|| trimmed.split_whitespace().map(String::from).collect());

    let mut prefixes = Vec::new();
    let Some(first) = tokens.first() else {
        return prefixes;
    };
    prefixes.push(first.clone());

    if tokens.len() >= 2 {
        prefixes.push(format!("{} {}", tokens[0], tokens[1]));
    }

    if tokens.len() >= 3 {
        let full = trimmed.to_string();
        if prefixes.last() != Some(&full) {
            prefixes.push(full);
        }
    }

    prefixes
}

/// Split on unquoted whitespace, keeping quote characters in the tokens.
///
/// Returns `None` when a quote or trailing escape is left open.
fn split_preserving_quotes(input: &str) -> Option<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in input.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' if quote != Some('\'') => {
                current.push(c);
                escaped = true;
            }
            '\'' | '"' => {
                current.push(c);
                match quote {
                    Some(q) if q == c => quote = None,
                    None => quote = Some(c),
                    Some(_) => {}
                }
            }
            c if c.is_whitespace() && quote.is_none() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }

    if escaped || quote.is_some() {
        return None;
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Some(tokens)
}
