//! Permission menu state machine and the confirmation seam.
//!
//! When a proposed command is not covered by the approved patterns, the user
//! is asked. A plain yes/no runs (or rejects) the command once; choosing to
//! *manage* opens the permission menu, which lists candidate prefixes for
//! every atomic command in the proposal and lets the user toggle which of
//! them become durable authorization patterns.
//!
//! The menu here is only the state machine - navigation, toggling, and the
//! commit semantics. Rendering and key handling live with the front end
//! driving it (see `riff-cli`).

use std::collections::HashSet;

use super::decompose::decompose;
use super::pattern::{
    candidate_prefixes, exact_prefix_pattern, loose_authorization_pattern, preselection_pattern,
};
use super::store::{CommandPatternStore, PatternStoreError};

/// One toggleable prefix in the permission menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionAtom {
    /// The candidate prefix, a literal shell token sequence with no
    /// unescaped operators.
    pub command: String,
    /// Whether the prefix is currently selected for authorization.
    pub enabled: bool,
    /// Whether the prefix was unapproved when the menu opened.
    pub is_new: bool,
}

/// Result of a confirmation, mirroring the `y`/`n`/`m` prompt contract.
///
/// Anything other than [`Approved`](ConfirmationOutcome::Approved) or
/// [`Managed`](ConfirmationOutcome::Managed) is a decline; a free-form
/// decline carries the user's text so callers can echo it back as the
/// reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    /// Run the command once; nothing durable was granted.
    Approved,
    /// Run the command once; the selected prefixes were persisted for
    /// future auto-approval.
    Managed,
    /// Do not run the command, with an optional free-form reason.
    Denied(Option<String>),
}

impl ConfirmationOutcome {
    /// Whether the command may be executed (once).
    pub fn allows_execution(&self) -> bool {
        matches!(self, Self::Approved | Self::Managed)
    }

    /// The response code of the menu contract: `"y"`, `"m"`, `"n"`, or the
    /// free-form decline text.
    pub fn response_code(&self) -> &str {
        match self {
            Self::Approved => "y",
            Self::Managed => "m",
            Self::Denied(Some(reason)) => reason,
            Self::Denied(None) => "n",
        }
    }

    /// The free-form decline reason, when one was given.
    pub fn decline_reason(&self) -> Option<&str> {
        match self {
            Self::Denied(Some(reason)) => Some(reason.as_str()),
            _ => None,
        }
    }
}

/// The interactive confirmation seam.
///
/// Injected wherever a command needs user sign-off so that front ends and
/// test doubles are explicit dependencies rather than global state. In
/// automated contexts use [`AutoDenyConfirmer`], which resolves without
/// blocking.
pub trait Confirmer: Send + Sync {
    /// Ask whether `command` may run, blocking on user input if interactive.
    ///
    /// Interruption must resolve to a denied outcome, never propagate.
    fn confirm_command(&self, command: &str) -> ConfirmationOutcome;
}

/// Confirmer for non-interactive contexts: denies everything immediately.
pub struct AutoDenyConfirmer;

impl Confirmer for AutoDenyConfirmer {
    fn confirm_command(&self, _command: &str) -> ConfirmationOutcome {
        ConfirmationOutcome::Denied(None)
    }
}

/// The permission menu: an ordered list of toggleable prefixes plus a
/// cursor.
///
/// A menu is opened, navigated and toggled, then applied or cancelled.
/// Each invocation is fully independent; applying or cancelling consumes
/// the menu's active state and nothing carries over to the next one.
#[derive(Debug)]
pub struct PermissionsMenu {
    atoms: Vec<PermissionAtom>,
    selected: usize,
    original_command: String,
    active: bool,
}

impl PermissionsMenu {
    /// Build the menu for a (possibly compound) command.
    ///
    /// The command is decomposed and every atomic command contributes its
    /// candidate prefixes, deduplicated in first-appearance order. A command
    /// that fails to parse is kept whole as a single untrusted atomic. Each
    /// atom is pre-selected only when its preselection pattern is stored
    /// *verbatim* - a broader stored pattern that merely matches the prefix
    /// does not pre-select it.
    pub fn open(
        command: &str,
        store: &CommandPatternStore,
    ) -> Result<Self, PatternStoreError> {
        let atomics = decompose(command).unwrap_or_else(|_| vec![command.trim().to_string()]);

        let mut seen = HashSet::new();
        let mut atoms = Vec::new();
        for atomic in &atomics {
            for prefix in candidate_prefixes(atomic) {
                if !seen.insert(prefix.clone()) {
                    continue;
                }
                let preselected =
                    store.is_pattern_literally_present(&preselection_pattern(&prefix))?;
                atoms.push(PermissionAtom {
                    command: prefix,
                    enabled: preselected,
                    is_new: !preselected,
                });
            }
        }

        Ok(Self {
            atoms,
            selected: 0,
            original_command: command.to_string(),
            active: true,
        })
    }

    /// The atoms in display order.
    pub fn atoms(&self) -> &[PermissionAtom] {
        &self.atoms
    }

    /// Index of the highlighted atom.
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// The command the menu was opened for.
    pub fn original_command(&self) -> &str {
        &self.original_command
    }

    /// Whether the menu is still accepting events.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Move the cursor up one atom. Bounded; no wraparound.
    pub fn select_previous(&mut self) {
        if self.active {
            self.selected = self.selected.saturating_sub(1);
        }
    }

    /// Move the cursor down one atom. Bounded; no wraparound.
    pub fn select_next(&mut self) {
        if self.active && self.selected + 1 < self.atoms.len() {
            self.selected += 1;
        }
    }

    /// Toggle the highlighted atom.
    pub fn toggle_selected(&mut self) {
        if self.active {
            if let Some(atom) = self.atoms.get_mut(self.selected) {
                atom.enabled = !atom.enabled;
            }
        }
    }

    /// Commit the menu: persist the selection and terminate.
    ///
    /// Stored patterns associated with *any* atom shown here (their loose or
    /// exact-prefix forms) are replaced by the loose pattern of each enabled
    /// atom; stored patterns outside that set are left untouched. Returns
    /// [`ConfirmationOutcome::Managed`] when at least one atom was enabled,
    /// otherwise a one-time [`ConfirmationOutcome::Approved`].
    pub fn apply(
        &mut self,
        store: &CommandPatternStore,
    ) -> Result<ConfirmationOutcome, PatternStoreError> {
        let managed: HashSet<String> = self
            .atoms
            .iter()
            .flat_map(|atom| {
                [
                    loose_authorization_pattern(&atom.command),
                    exact_prefix_pattern(&atom.command),
                ]
            })
            .collect();

        let mut result: Vec<String> = store
            .load()?
            .into_iter()
            .filter(|pattern| !managed.contains(pattern))
            .collect();

        let mut any_enabled = false;
        for atom in self.atoms.iter().filter(|atom| atom.enabled) {
            result.push(loose_authorization_pattern(&atom.command));
            any_enabled = true;
        }

        store.replace_all(&result)?;
        self.active = false;

        Ok(if any_enabled {
            ConfirmationOutcome::Managed
        } else {
            ConfirmationOutcome::Approved
        })
    }

    /// Abandon the menu without touching the store.
    pub fn cancel(&mut self) -> ConfirmationOutcome {
        self.active = false;
        ConfirmationOutcome::Denied(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> CommandPatternStore {
        CommandPatternStore::new(dir.path().join("authorized_commands"))
    }

    // ===== Outcome Tests =====

    #[test]
    fn test_outcome_allows_execution() {
        assert!(ConfirmationOutcome::Approved.allows_execution());
        assert!(ConfirmationOutcome::Managed.allows_execution());
        assert!(!ConfirmationOutcome::Denied(None).allows_execution());
        assert!(!ConfirmationOutcome::Denied(Some("use rg instead".into())).allows_execution());
    }

    #[test]
    fn test_outcome_response_codes() {
        assert_eq!(ConfirmationOutcome::Approved.response_code(), "y");
        assert_eq!(ConfirmationOutcome::Managed.response_code(), "m");
        assert_eq!(ConfirmationOutcome::Denied(None).response_code(), "n");
        assert_eq!(
            ConfirmationOutcome::Denied(Some("too risky".into())).response_code(),
            "too risky"
        );
    }

    #[test]
    fn test_outcome_decline_reason() {
        assert_eq!(ConfirmationOutcome::Approved.decline_reason(), None);
        assert_eq!(ConfirmationOutcome::Denied(None).decline_reason(), None);
        assert_eq!(
            ConfirmationOutcome::Denied(Some("use rg instead".into())).decline_reason(),
            Some("use rg instead")
        );
    }

    #[test]
    fn test_auto_deny_confirmer() {
        let confirmer = AutoDenyConfirmer;
        assert_eq!(
            confirmer.confirm_command("rm -rf /"),
            ConfirmationOutcome::Denied(None)
        );
    }

    // ===== Open / Seeding Tests =====

    #[test]
    fn test_open_generates_prefixes_for_each_atomic() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let menu = PermissionsMenu::open("git status | head -n 5", &store).unwrap();
        let commands: Vec<&str> = menu.atoms().iter().map(|a| a.command.as_str()).collect();
        assert_eq!(
            commands,
            vec!["git", "git status", "head", "head -n", "head -n 5"]
        );
        assert!(menu.atoms().iter().all(|a| !a.enabled && a.is_new));
        assert!(menu.is_active());
        assert_eq!(menu.original_command(), "git status | head -n 5");
    }

    #[test]
    fn test_open_dedupes_prefixes_across_atomics() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let menu = PermissionsMenu::open("ls && ls -la", &store).unwrap();
        let commands: Vec<&str> = menu.atoms().iter().map(|a| a.command.as_str()).collect();
        assert_eq!(commands, vec!["ls", "ls -la"]);
    }

    #[test]
    fn test_open_keeps_unparsable_command_whole() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let menu = PermissionsMenu::open("echo 'unterminated && rm", &store).unwrap();
        // No decomposition: the whole string is one untrusted atomic, so its
        // first candidate prefix is the bare first token.
        assert_eq!(menu.atoms()[0].command, "echo");
    }

    #[test]
    fn test_open_preselects_from_literal_presence() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.append("^git\\ status.*").unwrap();

        let menu = PermissionsMenu::open("git status", &store).unwrap();
        let status = menu
            .atoms()
            .iter()
            .find(|a| a.command == "git status")
            .unwrap();
        assert!(status.enabled);
        assert!(!status.is_new);

        let git = menu.atoms().iter().find(|a| a.command == "git").unwrap();
        assert!(!git.enabled);
        assert!(git.is_new);
    }

    #[test]
    fn test_broad_pattern_does_not_preselect_specific_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.append("^awk.*").unwrap();

        let menu = PermissionsMenu::open("awk -F'|' '{print $1}'", &store).unwrap();
        let bare = menu.atoms().iter().find(|a| a.command == "awk").unwrap();
        assert!(bare.enabled);

        let specific = menu
            .atoms()
            .iter()
            .find(|a| a.command == "awk -F'|'")
            .unwrap();
        assert!(!specific.enabled, "broad ^awk.* must not pre-check awk -F'|'");
    }

    // ===== Navigation Tests =====

    #[test]
    fn test_navigation_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut menu = PermissionsMenu::open("git status", &store).unwrap();
        assert_eq!(menu.atoms().len(), 2);

        assert_eq!(menu.selected_index(), 0);
        menu.select_previous();
        assert_eq!(menu.selected_index(), 0);

        menu.select_next();
        assert_eq!(menu.selected_index(), 1);
        menu.select_next();
        assert_eq!(menu.selected_index(), 1);
    }

    #[test]
    fn test_toggle_selected() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut menu = PermissionsMenu::open("ls", &store).unwrap();

        assert!(!menu.atoms()[0].enabled);
        menu.toggle_selected();
        assert!(menu.atoms()[0].enabled);
        menu.toggle_selected();
        assert!(!menu.atoms()[0].enabled);
    }

    // ===== Commit Tests =====

    #[test]
    fn test_apply_with_nothing_enabled_is_one_time_approval() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut menu = PermissionsMenu::open("ls -la", &store).unwrap();

        let outcome = menu.apply(&store).unwrap();
        assert_eq!(outcome, ConfirmationOutcome::Approved);
        assert!(!menu.is_active());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_apply_persists_loose_patterns_for_enabled_atoms() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut menu = PermissionsMenu::open("git status", &store).unwrap();

        // Enable the "git status" prefix.
        menu.select_next();
        menu.toggle_selected();

        let outcome = menu.apply(&store).unwrap();
        assert_eq!(outcome, ConfirmationOutcome::Managed);
        assert_eq!(store.load().unwrap(), vec!["^git\\ status.*"]);
    }

    #[test]
    fn test_apply_retains_unrelated_patterns() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.append("^cargo\\ build.*").unwrap();

        let mut menu = PermissionsMenu::open("ls", &store).unwrap();
        menu.toggle_selected();
        menu.apply(&store).unwrap();

        assert_eq!(
            store.load().unwrap(),
            vec!["^cargo\\ build.*", "^ls.*"]
        );
    }

    #[test]
    fn test_apply_removes_unchecked_managed_patterns() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.append("^git\\ status.*").unwrap();

        let mut menu = PermissionsMenu::open("git status", &store).unwrap();
        // The stored pattern pre-selects "git status"; unchecking it must
        // remove the pattern on apply.
        menu.select_next();
        assert!(menu.atoms()[1].enabled);
        menu.toggle_selected();

        let outcome = menu.apply(&store).unwrap();
        assert_eq!(outcome, ConfirmationOutcome::Approved);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_apply_deduplicates_enabled_atoms_sharing_a_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        // Both "ls" and "ls -la" generate the loose pattern ^ls.*.
        let mut menu = PermissionsMenu::open("ls -la", &store).unwrap();
        menu.toggle_selected();
        menu.select_next();
        menu.toggle_selected();

        menu.apply(&store).unwrap();
        assert_eq!(store.load().unwrap(), vec!["^ls.*"]);
    }

    #[test]
    fn test_cancel_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.append("^ls.*").unwrap();

        let mut menu = PermissionsMenu::open("ls && pwd", &store).unwrap();
        menu.toggle_selected();
        let outcome = menu.cancel();

        assert_eq!(outcome, ConfirmationOutcome::Denied(None));
        assert!(!menu.is_active());
        assert_eq!(store.load().unwrap(), vec!["^ls.*"]);
    }

    #[test]
    fn test_invocations_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let mut first = PermissionsMenu::open("ls", &store).unwrap();
        first.toggle_selected();
        first.cancel();

        // A cancelled menu leaves no trace in the next invocation.
        let second = PermissionsMenu::open("ls", &store).unwrap();
        assert!(!second.atoms()[0].enabled);
        assert!(second.is_active());
    }
}
