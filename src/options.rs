//! Scan options configuration.
//!
//! This module provides the [`ScanOptions`] struct for configuring where
//! installables are searched for and which kinds are recognized.

use crate::InstallableKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration options for finding installables.
///
/// # Default Behavior
///
/// Searches `~/Downloads` for all five kinds, unsorted and unfiltered.
///
/// # Example
///
/// ```rust
/// use installable::{InstallableKind, ScanOptions};
///
/// // Only disk images, newest first
/// let opts = ScanOptions {
///     kinds: vec![InstallableKind::DiskImage],
///     newest_first: true,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Directories to search. A leading `~` is expanded to the home directory.
    ///
    /// Default: `["~/Downloads"]`
    pub paths: Vec<PathBuf>,

    /// Kinds to recognize.
    ///
    /// Default: all kinds
    pub kinds: Vec<InstallableKind>,

    /// Sort results by creation time, newest first.
    ///
    /// Default: `false` (directory order)
    pub newest_first: bool,

    /// Keep only results whose file name contains this text, ignoring case.
    ///
    /// Default: `None`
    pub query: Option<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            paths: vec![PathBuf::from("~/Downloads")],
            kinds: InstallableKind::all().collect(),
            newest_first: false,
            query: None,
        }
    }
}
