//! CLI helpers shared by the `kcm` binary's command paths.
#![allow(missing_docs)]

pub mod listing;

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::core::paths::resolve_absolute_path;

/// Relationship between `$KUBECONFIG` and the active pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KubeconfigEnv {
    /// Points at the pointer path; activations take effect immediately.
    Linked,
    /// Unset or empty; kubectl would ignore the pointer entirely.
    Unset,
    /// Set to something else.
    Elsewhere(PathBuf),
}

impl KubeconfigEnv {
    /// Classify a raw `$KUBECONFIG` value against `pointer`.
    ///
    /// Only the first entry of a colon-separated list is considered, since
    /// that is the file kubectl writes context changes to.
    #[must_use]
    pub fn classify(raw: Option<&OsStr>, pointer: &Path) -> Self {
        let Some(raw) = raw.filter(|v| !v.is_empty()) else {
            return Self::Unset;
        };
        let first = std::env::split_paths(raw).next().unwrap_or_default();
        if first.as_os_str().is_empty() {
            return Self::Unset;
        }
        if resolve_absolute_path(&first) == resolve_absolute_path(pointer) {
            Self::Linked
        } else {
            Self::Elsewhere(first)
        }
    }

    /// Read `$KUBECONFIG` from the process environment.
    #[must_use]
    pub fn from_env(pointer: &Path) -> Self {
        let raw = std::env::var_os("KUBECONFIG");
        Self::classify(raw.as_deref(), pointer)
    }
}

/// Shell line the user should add to their profile.
#[must_use]
pub fn export_hint(pointer: &Path) -> String {
    format!("export KUBECONFIG={}", pointer.display())
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use super::*;

    #[test]
    fn unset_and_empty_are_unset() {
        let pointer = Path::new("/home/u/.cluster");
        assert_eq!(KubeconfigEnv::classify(None, pointer), KubeconfigEnv::Unset);
        let empty = OsString::new();
        assert_eq!(
            KubeconfigEnv::classify(Some(&empty), pointer),
            KubeconfigEnv::Unset
        );
    }

    #[test]
    fn matching_path_is_linked() {
        let pointer = Path::new("/home/u/.cluster");
        let raw = OsString::from("/home/u/./.cluster");
        assert_eq!(
            KubeconfigEnv::classify(Some(&raw), pointer),
            KubeconfigEnv::Linked
        );
    }

    #[test]
    fn first_list_entry_decides() {
        let pointer = Path::new("/home/u/.cluster");
        let raw = OsString::from("/home/u/.kube/config:/home/u/.cluster");
        assert_eq!(
            KubeconfigEnv::classify(Some(&raw), pointer),
            KubeconfigEnv::Elsewhere(PathBuf::from("/home/u/.kube/config"))
        );
    }

    #[test]
    fn hint_names_pointer() {
        assert_eq!(
            export_hint(Path::new("/home/u/.cluster")),
            "export KUBECONFIG=/home/u/.cluster"
        );
    }
}
