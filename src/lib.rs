#![forbid(unsafe_code)]

//! KubeConfig Manager (kcm): keeps track of downloaded kubeconfig files and
//! activates one of them through a symlink that `KUBECONFIG` points at.
//!
//! Building blocks:
//! 1. **Scanner**: finds kubeconfigs in watched directories and parses the
//!    creation time out of their names
//! 2. **Ranking**: fresh before expired, newest first
//! 3. **Active pointer**: the symlink downstream tools read
//! 4. **Selector**: a pure Elm-style state machine plus the runtime that
//!    executes its commands
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust,no_run
//! use kubeconfig_manager::prelude::*;
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use kubeconfig_manager::core::config::Config;
//! use kubeconfig_manager::scanner::walker::EntryScanner;
//! ```

pub mod prelude;

#[cfg(feature = "cli")]
pub mod cli;
pub mod core;
pub mod logger;
pub mod pointer;
pub mod scanner;
#[cfg(feature = "tui")]
pub mod tui;
