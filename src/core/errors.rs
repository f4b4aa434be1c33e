//! KCM-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, KcmError>;

/// Top-level error type for kcm.
#[derive(Debug, Error)]
pub enum KcmError {
    #[error("[KCM-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[KCM-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[KCM-1004] cannot resolve home directory: {details}")]
    HomeUnresolved { details: String },

    #[error("[KCM-2001] {name} does not match timestamp pattern {pattern:?}: {details}")]
    TimestampMismatch {
        name: String,
        pattern: String,
        details: String,
    },

    #[error("[KCM-2002] active pointer {path} already exists; clear it before setting")]
    PointerOccupied { path: PathBuf },

    #[error("[KCM-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[KCM-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[KCM-3003] channel closed in component {component}")]
    ChannelClosed { component: &'static str },

    #[error("[KCM-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl KcmError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "KCM-1001",
            Self::ConfigParse { .. } => "KCM-1003",
            Self::HomeUnresolved { .. } => "KCM-1004",
            Self::TimestampMismatch { .. } => "KCM-2001",
            Self::PointerOccupied { .. } => "KCM-2002",
            Self::Serialization { .. } => "KCM-2101",
            Self::Io { .. } => "KCM-3002",
            Self::ChannelClosed { .. } => "KCM-3003",
            Self::Runtime { .. } => "KCM-3900",
        }
    }

    /// Whether retrying might resolve the failure.
    ///
    /// A timestamp mismatch only goes away when the file is renamed or the
    /// pattern is fixed, so it is not retryable even though Refresh re-runs it.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Io { .. }
                | Self::ChannelClosed { .. }
                | Self::PointerOccupied { .. }
                | Self::Runtime { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for KcmError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for KcmError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

impl From<toml::ser::Error> for KcmError {
    fn from(value: toml::ser::Error) -> Self {
        Self::Serialization {
            context: "toml",
            details: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_variants() -> Vec<KcmError> {
        vec![
            KcmError::InvalidConfig {
                details: String::new(),
            },
            KcmError::ConfigParse {
                context: "",
                details: String::new(),
            },
            KcmError::HomeUnresolved {
                details: String::new(),
            },
            KcmError::TimestampMismatch {
                name: String::new(),
                pattern: String::new(),
                details: String::new(),
            },
            KcmError::PointerOccupied {
                path: PathBuf::new(),
            },
            KcmError::Serialization {
                context: "",
                details: String::new(),
            },
            KcmError::Io {
                path: PathBuf::new(),
                source: std::io::Error::other("test"),
            },
            KcmError::ChannelClosed { component: "" },
            KcmError::Runtime {
                details: String::new(),
            },
        ]
    }

    #[test]
    fn error_codes_are_unique() {
        let errors = all_variants();
        let codes: Vec<&str> = errors.iter().map(KcmError::code).collect();
        let unique: std::collections::HashSet<&&str> = codes.iter().collect();
        assert_eq!(
            codes.len(),
            unique.len(),
            "error codes must be unique: {codes:?}"
        );
    }

    #[test]
    fn error_codes_have_kcm_prefix() {
        for err in &all_variants() {
            assert!(
                err.code().starts_with("KCM-"),
                "code {} must start with KCM-",
                err.code()
            );
            assert!(
                err.to_string().contains(err.code()),
                "display should carry its code: {err}"
            );
        }
    }

    #[test]
    fn timestamp_mismatch_names_file_and_pattern() {
        let err = KcmError::TimestampMismatch {
            name: "cluster-bot-oops.kubeconfig.txt".to_string(),
            pattern: "cluster-bot-%Y.kubeconfig.txt".to_string(),
            details: "input contains invalid characters".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("cluster-bot-oops.kubeconfig.txt"));
        assert!(msg.contains("cluster-bot-%Y.kubeconfig.txt"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn retryable_errors_are_correct() {
        assert!(KcmError::io("/tmp/x", std::io::Error::other("test")).is_retryable());
        assert!(KcmError::ChannelClosed { component: "driver" }.is_retryable());
        assert!(
            KcmError::PointerOccupied {
                path: PathBuf::new()
            }
            .is_retryable()
        );

        assert!(
            !KcmError::InvalidConfig {
                details: String::new()
            }
            .is_retryable()
        );
        assert!(
            !KcmError::HomeUnresolved {
                details: String::new()
            }
            .is_retryable()
        );
    }

    #[test]
    fn io_convenience_constructor() {
        let err = KcmError::io(
            "/tmp/test.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.code(), "KCM-3002");
        assert!(err.to_string().contains("/tmp/test.txt"));
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: KcmError = json_err.into();
        assert_eq!(err.code(), "KCM-2101");
    }

    #[test]
    fn from_toml_error() {
        let toml_err = toml::from_str::<toml::Value>("= invalid").unwrap_err();
        let err: KcmError = toml_err.into();
        assert_eq!(err.code(), "KCM-1003");
    }
}
