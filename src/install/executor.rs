//! Direct installation of a single path.
//!
//! This module provides [`install_path`], which classifies a path and
//! installs it in one step, and [`InstallSummary`], which describes the
//! result in the terms shown to a user.

use super::{InstallError, InstallOptions, InstallProgress, System};
use crate::{InstallOutcome, Installable};
use std::path::{Path, PathBuf};
use tracing::error;

/// What a direct installation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallSummary {
    /// The path that was installed.
    pub source: PathBuf,

    /// How many objects were installed from it.
    pub installed_count: usize,

    /// Whether the source was moved to the trash afterwards.
    pub removed: bool,
}

impl InstallSummary {
    /// A one-line, human-readable count of what was installed.
    ///
    /// # Example
    ///
    /// ```rust
    /// use installable::InstallSummary;
    /// use std::path::PathBuf;
    ///
    /// let summary = InstallSummary {
    ///     source: PathBuf::from("Tools.zip"),
    ///     installed_count: 3,
    ///     removed: false,
    /// };
    /// assert_eq!(summary.message(), "3 Apps were installed");
    /// ```
    pub fn message(&self) -> String {
        match self.installed_count {
            1 => "1 App was installed".to_string(),
            n => format!("{} Apps were installed", n),
        }
    }
}

/// Install the object at `path`.
///
/// This function:
/// 1. Classifies the path (inspecting archives)
/// 2. Installs it, reporting progress via callback
/// 3. Summarizes how many objects were installed
///
/// # Consent Model
///
/// Calling this function IS consent to install, and to trash the source
/// when `options.delete_source` is set. The caller's UI is responsible for
/// confirming with the user before calling.
///
/// # Errors
///
/// `UnrecognizedKind` when the path holds nothing installable, otherwise
/// whatever [`Installable::install`] reports.
///
/// # Example
///
/// ```rust,no_run
/// use installable::{install_path, HostSystem, InstallOptions};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let result = install_path(
///         "/Users/me/Downloads/Foo.dmg",
///         &InstallOptions::default(),
///         &HostSystem::new(),
///         |progress| println!("{:?}", progress),
///     )
///     .await;
///
///     match result {
///         Ok(summary) => println!("{}", summary.message()),
///         Err(e) => println!("Failed: {}. Fix: {}", e, e.fix_suggestion()),
///     }
/// }
/// ```
pub async fn install_path<S, F>(
    path: impl AsRef<Path>,
    options: &InstallOptions,
    system: &S,
    on_progress: F,
) -> Result<InstallSummary, InstallError>
where
    S: System,
    F: Fn(InstallProgress),
{
    let path = path.as_ref();
    let mut app = Installable::new(path).inspect_err(|e| {
        error!("Could not install {}: {}", path.display(), e);
    })?;

    match app.install(system, options, &on_progress).await? {
        InstallOutcome::Installed(source) => Ok(InstallSummary {
            source,
            installed_count: app.object_count(),
            removed: app.is_removed(),
        }),
        // A fresh object cannot have been removed yet.
        InstallOutcome::AlreadyRemoved => Ok(InstallSummary {
            source: app.path().to_path_buf(),
            installed_count: 0,
            removed: true,
        }),
    }
}
