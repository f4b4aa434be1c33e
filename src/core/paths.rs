//! Shared path manipulation utilities.

use std::env;
use std::path::{Component, Path, PathBuf};

use crate::core::errors::{KcmError, Result};

/// Placeholder substituted with the user's home directory in configured paths.
pub const HOME_PLACEHOLDER: &str = "$HOME";

/// Resolve the current user's home directory from `$HOME`.
pub fn home_dir() -> Result<PathBuf> {
    match env::var_os("HOME") {
        Some(home) if !home.is_empty() => Ok(PathBuf::from(home)),
        _ => Err(KcmError::HomeUnresolved {
            details: "HOME is not set".to_string(),
        }),
    }
}

/// Replace every `$HOME` occurrence in `path` with `home`.
///
/// Paths that are not valid UTF-8 cannot contain the placeholder in a form we
/// recognize, so they are returned unchanged.
#[must_use]
pub fn expand_home(path: &Path, home: &Path) -> PathBuf {
    match path.to_str() {
        Some(raw) if raw.contains(HOME_PLACEHOLDER) => {
            PathBuf::from(raw.replace(HOME_PLACEHOLDER, &home.to_string_lossy()))
        }
        _ => path.to_path_buf(),
    }
}

/// Resolve a path to an absolute, normalized path without following symlinks.
///
/// The active pointer is itself a symlink, so canonicalizing would resolve it
/// to its target. Normalization is purely syntactic.
pub fn resolve_absolute_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    };
    normalize_syntactic(&absolute)
}

fn normalize_syntactic(path: &Path) -> PathBuf {
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::Prefix(..) | Component::RootDir | Component::Normal(_) => {
                components.push(component);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if let Some(Component::Normal(_)) = components.last() {
                    components.pop();
                }
            }
        }
    }
    components.into_iter().collect()
}
