//! Durable storage for authorization patterns.
//!
//! Patterns live one per line in a file owned exclusively by the current
//! user. The store keeps an in-memory cache keyed by the file's modification
//! time so repeated authorization checks do not re-read the file, and is safe
//! for concurrent callers without caller-side locking.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};
use std::time::SystemTime;

use super::validate::matches_any_pattern;
use crate::config;

/// Errors that can occur in pattern store operations.
#[derive(Debug, thiserror::Error)]
pub enum PatternStoreError {
    /// IO error during storage operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Cached view of the backing file.
struct PatternCache {
    patterns: Vec<String>,
    modified: SystemTime,
}

/// File-backed store of approved command patterns.
///
/// The store owns its cache state and locks; share one instance (behind an
/// `Arc` if needed) rather than creating several stores over the same path.
///
/// # Example
///
/// ```rust
/// use riff_core::authorize::CommandPatternStore;
///
/// let dir = tempfile::tempdir().unwrap();
/// let store = CommandPatternStore::new(dir.path().join("authorized_commands"));
///
/// store.append("^git\\ status.*").unwrap();
/// assert!(store.is_command_authorized("git status --short").unwrap());
/// assert!(!store.is_command_authorized("rm -rf /").unwrap());
/// ```
pub struct CommandPatternStore {
    path: PathBuf,
    cache: RwLock<Option<PatternCache>>,
    writer: Mutex<()>,
}

impl CommandPatternStore {
    /// Create a store over the given file path.
    ///
    /// The file does not need to exist - it is created with owner-only
    /// permissions on the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: RwLock::new(None),
            writer: Mutex::new(()),
        }
    }

    /// Create a store over the default `authorized_commands` location.
    pub fn open_default() -> Self {
        Self::new(config::authorized_commands_path())
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one pattern to the store.
    ///
    /// Ensures the parent directory exists with mode 0700 and the file with
    /// mode 0600, repairing permissions on an existing insecure location.
    pub fn append(&self, pattern: &str) -> Result<(), PatternStoreError> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            // Blank lines are never persisted.
            return Ok(());
        }

        let _guard = self.writer.lock().expect("Mutex poisoned");
        self.ensure_secure_location()?;

        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;
        file.write_all(pattern.as_bytes())?;
        file.write_all(b"\n")?;

        self.invalidate_cache();
        Ok(())
    }

    /// Load all stored patterns.
    ///
    /// A missing file is an empty list, not an error. The cached list is
    /// reused until the file's modification time advances past the cached
    /// timestamp.
    pub fn load(&self) -> Result<Vec<String>, PatternStoreError> {
        {
            let cache = self.cache.read().expect("RwLock poisoned");
            if let Some(entry) = cache.as_ref() {
                let modified = match fs::metadata(&self.path) {
                    Ok(meta) => meta.modified()?,
                    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
                    Err(e) => return Err(e.into()),
                };
                if modified <= entry.modified {
                    return Ok(entry.patterns.clone());
                }
            }
        }

        // Refresh path. Stat and read happen inside the write lock so a
        // writer's invalidation can never be clobbered by a stale entry.
        let mut cache = self.cache.write().expect("RwLock poisoned");
        let modified = match fs::metadata(&self.path) {
            Ok(meta) => meta.modified()?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                *cache = None;
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        if let Some(entry) = cache.as_ref() {
            // Another thread may have refreshed while we waited for the lock.
            if modified <= entry.modified {
                return Ok(entry.patterns.clone());
            }
        }

        let contents = fs::read_to_string(&self.path)?;
        let patterns = parse_pattern_lines(&contents);
        *cache = Some(PatternCache {
            patterns: patterns.clone(),
            modified,
        });
        Ok(patterns)
    }

    /// Replace the entire store contents.
    ///
    /// Entries are trimmed, blanks dropped, and duplicates removed keeping
    /// the first occurrence. The file is rewritten atomically via a
    /// temporary file in the same directory.
    pub fn replace_all(&self, patterns: &[String]) -> Result<(), PatternStoreError> {
        let deduped = dedupe_patterns(patterns);

        let _guard = self.writer.lock().expect("Mutex poisoned");
        self.ensure_secure_location()?;

        let tmp = self.path.with_extension("tmp");
        {
            let mut options = OpenOptions::new();
            options.create(true).write(true).truncate(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::OpenOptionsExt;
                options.mode(0o600);
            }
            let mut file = options.open(&tmp)?;
            for pattern in &deduped {
                writeln!(file, "{}", pattern)?;
            }
        }
        fs::rename(&tmp, &self.path)?;

        self.invalidate_cache();
        Ok(())
    }

    /// Whether `pattern` is stored verbatim, by exact string equality.
    ///
    /// Used only for menu pre-selection - runtime authorization always goes
    /// through regex matching instead.
    pub fn is_pattern_literally_present(&self, pattern: &str) -> Result<bool, PatternStoreError> {
        Ok(self.load()?.iter().any(|p| p == pattern))
    }

    /// Whether any stored pattern matches the given atomic command.
    ///
    /// Entries that fail to compile as regexes are skipped; they never abort
    /// the check.
    pub fn is_command_authorized(&self, atomic_command: &str) -> Result<bool, PatternStoreError> {
        let patterns = self.load()?;
        Ok(matches_any_pattern(atomic_command, &patterns))
    }

    /// Drop the cached patterns and tracked modification time.
    ///
    /// Only needed for test isolation; normal reads invalidate on their own
    /// when the file changes.
    pub fn reset_cache(&self) {
        self.invalidate_cache();
    }

    fn invalidate_cache(&self) {
        *self.cache.write().expect("RwLock poisoned") = None;
    }

    /// Create the parent directory and fix permissions on anything that
    /// already exists but is readable by others.
    #[cfg(unix)]
    fn ensure_secure_location(&self) -> io::Result<()> {
        use std::os::unix::fs::{DirBuilderExt, PermissionsExt};

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                if parent.exists() {
                    let mode = fs::metadata(parent)?.permissions().mode() & 0o777;
                    if mode & 0o077 != 0 {
                        fs::set_permissions(parent, fs::Permissions::from_mode(0o700))?;
                    }
                } else {
                    fs::DirBuilder::new().recursive(true).mode(0o700).create(parent)?;
                }
            }
        }

        if self.path.exists() {
            let mode = fs::metadata(&self.path)?.permissions().mode() & 0o777;
            if mode & 0o077 != 0 {
                fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
            }
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn ensure_secure_location(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// Split file contents into trimmed, non-empty pattern lines.
fn parse_pattern_lines(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Trim, drop blanks, and dedupe keeping first occurrence.
fn dedupe_patterns(patterns: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    patterns
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .filter(|p| seen.insert(p.to_string()))
        .map(String::from)
        .collect()
}
