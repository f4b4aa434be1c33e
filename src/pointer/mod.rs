//! The active pointer: a symlink whose target is the selected kubeconfig.
//!
//! Tools that honor `KUBECONFIG` follow the link, so switching clusters is a
//! matter of replacing the link. Read failures are not errors here; a
//! missing or unreadable link means nothing is active.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::core::errors::{KcmError, Result};
use crate::scanner::entry::Entry;

/// Handle on the pointer symlink path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePointer {
    link: PathBuf,
}

impl ActivePointer {
    #[must_use]
    pub fn new(link: impl Into<PathBuf>) -> Self {
        Self { link: link.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.link
    }

    /// Base name of the link target, or an empty string when the pointer is
    /// absent or not a symlink.
    #[must_use]
    pub fn read_active(&self) -> String {
        fs::read_link(&self.link)
            .ok()
            .and_then(|target| target.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_default()
    }

    /// Remove the pointer. An absent pointer is already clear.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.link) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(KcmError::io(&self.link, source)),
        }
    }

    /// Point the link at `entry`. Fails if anything already occupies the path.
    pub fn set(&self, entry: &Entry) -> Result<()> {
        if fs::symlink_metadata(&self.link).is_ok() {
            return Err(KcmError::PointerOccupied {
                path: self.link.clone(),
            });
        }
        if let Some(parent) = self.link.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| KcmError::io(parent, source))?;
        }
        symlink(&entry.path(), &self.link).map_err(|source| KcmError::io(&self.link, source))
    }
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}
