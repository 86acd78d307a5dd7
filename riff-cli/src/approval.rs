//! Command approval prompt for the terminal
//!
//! Presents an LLM-proposed command and offers:
//! - y: run once (don't remember)
//! - m: manage durable auto-approval via the permission menu
//! - n: deny
//! - anything else: deny, echoing the text back as the reason
//!
//! The permission menu lists the candidate prefixes of every atomic command
//! in the proposal; arrow keys move, space toggles, enter applies, esc
//! cancels. Interrupts and closed input always resolve to deny.

use std::io::{stdout, BufRead, IsTerminal, Write};
use std::sync::Arc;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::{cursor, event, terminal, QueueableCommand};

use riff_core::authorize::{
    CommandPatternStore, ConfirmationOutcome, Confirmer, PermissionAtom, PermissionsMenu,
};

// =============================================================================
// Terminal Confirmer
// =============================================================================

/// Interactive confirmer bound to the controlling terminal.
///
/// In non-interactive contexts (stdin is not a tty) it denies immediately
/// without blocking, so automated runs never hang on a prompt.
pub struct TerminalConfirmer {
    store: Arc<CommandPatternStore>,
}

impl TerminalConfirmer {
    /// Create a confirmer committing approvals to the given store.
    pub fn new(store: Arc<CommandPatternStore>) -> Self {
        Self { store }
    }

    fn run_menu(&self, command: &str) -> ConfirmationOutcome {
        let mut menu = match PermissionsMenu::open(command, &self.store) {
            Ok(menu) => menu,
            Err(_) => return ConfirmationOutcome::Denied(None),
        };
        if menu.atoms().is_empty() {
            return ConfirmationOutcome::Denied(None);
        }

        if terminal::enable_raw_mode().is_err() {
            return ConfirmationOutcome::Denied(None);
        }
        let outcome = menu_event_loop(&mut menu, &self.store);
        let _ = terminal::disable_raw_mode();
        println!();
        outcome
    }
}

impl Confirmer for TerminalConfirmer {
    fn confirm_command(&self, command: &str) -> ConfirmationOutcome {
        if !std::io::stdin().is_terminal() {
            return ConfirmationOutcome::Denied(None);
        }

        print_command_header(command);
        println!("  \x1b[1my\x1b[0m  run once");
        println!("  \x1b[1mm\x1b[0m  manage auto-approval");
        println!("  \x1b[1mn\x1b[0m  deny");

        loop {
            print!("\nAllow? [y/n/m] ");
            let _ = stdout().flush();

            // Closed stdin is an interrupt; interrupts always deny.
            let Some(input) = read_input() else {
                return ConfirmationOutcome::Denied(None);
            };

            match input.trim() {
                "y" | "yes" => {
                    print_confirmation("Running once");
                    return ConfirmationOutcome::Approved;
                }
                "n" | "no" => {
                    print_confirmation("Denied");
                    return ConfirmationOutcome::Denied(None);
                }
                "m" | "manage" => {
                    let outcome = self.run_menu(command);
                    if outcome.allows_execution() {
                        print_confirmation("Running once");
                    } else {
                        print_confirmation("Denied");
                    }
                    return outcome;
                }
                "" => continue,
                other => {
                    // Free-form text is a decline with a reason, not an error.
                    return ConfirmationOutcome::Denied(Some(other.to_string()));
                }
            }
        }
    }
}

// =============================================================================
// Permission Menu Front End
// =============================================================================

fn menu_event_loop(
    menu: &mut PermissionsMenu,
    store: &CommandPatternStore,
) -> ConfirmationOutcome {
    let mut lines_drawn = 0;
    loop {
        lines_drawn = redraw_menu(menu, lines_drawn);

        let key = match event::read() {
            // Windows reports key releases too; act on presses only.
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => key,
            Ok(_) => continue,
            Err(_) => return menu.cancel(),
        };

        match menu_action(key) {
            Some(MenuAction::Up) => menu.select_previous(),
            Some(MenuAction::Down) => menu.select_next(),
            Some(MenuAction::Toggle) => menu.toggle_selected(),
            Some(MenuAction::Apply) => {
                return menu
                    .apply(store)
                    .unwrap_or(ConfirmationOutcome::Denied(None));
            }
            Some(MenuAction::Cancel) => return menu.cancel(),
            None => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    Up,
    Down,
    Toggle,
    Apply,
    Cancel,
}

/// Map a key press to a menu action.
fn menu_action(key: KeyEvent) -> Option<MenuAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(MenuAction::Cancel);
    }
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(MenuAction::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(MenuAction::Down),
        KeyCode::Char(' ') => Some(MenuAction::Toggle),
        KeyCode::Enter => Some(MenuAction::Apply),
        KeyCode::Esc | KeyCode::Char('q') => Some(MenuAction::Cancel),
        _ => None,
    }
}

/// Redraw the menu in place, returning the number of lines it occupies.
fn redraw_menu(menu: &PermissionsMenu, previous_lines: u16) -> u16 {
    let mut out = stdout();
    if previous_lines > 0 {
        let _ = out.queue(cursor::MoveToPreviousLine(previous_lines));
        let _ = out.queue(terminal::Clear(terminal::ClearType::FromCursorDown));
    }

    // Raw mode needs explicit carriage returns.
    let _ = write!(
        out,
        "\x1b[33mSelect prefixes to auto-approve\x1b[0m \x1b[2m(space toggles, enter applies, esc cancels)\x1b[0m\r\n"
    );
    for (index, atom) in menu.atoms().iter().enumerate() {
        let _ = write!(
            out,
            "{}\r\n",
            format_atom_line(atom, index == menu.selected_index())
        );
    }
    let _ = out.flush();

    menu.atoms().len() as u16 + 1
}

/// Render one menu row: cursor, checkbox, prefix.
fn format_atom_line(atom: &PermissionAtom, selected: bool) -> String {
    let cursor = if selected { ">" } else { " " };
    let checkbox = if atom.enabled { "[x]" } else { "[ ]" };
    if selected {
        format!("{} {} \x1b[1m{}\x1b[0m", cursor, checkbox, atom.command)
    } else {
        format!("{} {} {}", cursor, checkbox, atom.command)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Print the proposed-command header.
pub fn print_command_header(command: &str) {
    println!("\n\x1b[33mCommand approval required:\x1b[0m");
    for line in command.lines() {
        println!("  \x1b[1m{}\x1b[0m", line);
    }
}

/// Read a line of input; `None` when stdin is closed or unreadable.
pub fn read_input() -> Option<String> {
    let stdin = std::io::stdin();
    let mut line = String::new();
    match stdin.lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line),
    }
}

/// Print a confirmation message.
pub fn print_confirmation(message: &str) {
    println!("  \x1b[32m✓\x1b[0m {}", message);
}
