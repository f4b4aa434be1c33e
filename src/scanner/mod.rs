//! Kubeconfig discovery: directory scanning, expiry policy, ranking.

pub mod entry;
pub mod ranking;
pub mod walker;
