//! Progress reporting types for installation operations.
//!
//! The [`InstallProgress`] enum represents the discrete steps of an
//! installation. Every install operation takes a callback that receives
//! these events, so the embedding program decides how to surface them.

use crate::InstallableKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Progress events during installation.
///
/// # Example
///
/// ```rust
/// use installable::InstallProgress;
///
/// fn on_progress(progress: InstallProgress) {
///     match &progress {
///         InstallProgress::Started { path, kind } => {
///             println!("Installing {} ({})", path.display(), kind.display_name());
///         }
///         InstallProgress::Completed { path, .. } => {
///             println!("Installed {}", path.display());
///         }
///         other => println!("{}", other.description()),
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InstallProgress {
    /// Installation of an object has started.
    Started {
        /// The object being installed.
        path: PathBuf,
        /// Its classified kind.
        kind: InstallableKind,
    },

    /// A disk image was attached.
    Mounted {
        /// The image file.
        image: PathBuf,
        /// Where its volume is mounted.
        mount_point: PathBuf,
    },

    /// An archive was extracted.
    Extracted {
        /// The archive file.
        archive: PathBuf,
        /// The temporary directory holding its contents.
        directory: PathBuf,
    },

    /// A bundle is being copied into place.
    Copying {
        /// The bundle being copied.
        source: PathBuf,
        /// The directory it is copied into.
        destination: PathBuf,
    },

    /// An object was moved to the trash.
    Trashed {
        /// The trashed path.
        path: PathBuf,
    },

    /// Moving an object to the trash failed; the object was left in place.
    TrashFailed {
        /// The path that could not be trashed.
        path: PathBuf,
        /// Why it failed.
        message: String,
    },

    /// A disk image was detached.
    Unmounted {
        /// The former mount point.
        mount_point: PathBuf,
    },

    /// Installation was skipped because the object was already removed.
    SkippedRemoved {
        /// The removed object.
        path: PathBuf,
    },

    /// Installation of an object completed successfully.
    Completed {
        /// The object that was installed.
        path: PathBuf,
        /// Its classified kind.
        kind: InstallableKind,
    },
}

impl InstallProgress {
    /// Get a human-readable description of this step.
    ///
    /// # Example
    ///
    /// ```rust
    /// use installable::InstallProgress;
    /// use std::path::PathBuf;
    ///
    /// let progress = InstallProgress::Unmounted { mount_point: PathBuf::from("/Volumes/Foo") };
    /// assert_eq!(progress.description(), "Unmounted disk image");
    /// ```
    pub fn description(&self) -> &'static str {
        match self {
            Self::Started { .. } => "Starting installation",
            Self::Mounted { .. } => "Mounted disk image",
            Self::Extracted { .. } => "Extracted archive",
            Self::Copying { .. } => "Copying application",
            Self::Trashed { .. } => "Moved to trash",
            Self::TrashFailed { .. } => "Could not move to trash",
            Self::Unmounted { .. } => "Unmounted disk image",
            Self::SkippedRemoved { .. } => "Already removed",
            Self::Completed { .. } => "Installation complete",
        }
    }

    /// Check if this event marks the end of an object's installation.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Options controlling where and how objects are installed.
///
/// Deserializes from partial configuration; missing fields take their defaults.
///
/// # Example
///
/// ```rust
/// use installable::InstallOptions;
/// use std::path::PathBuf;
///
/// let options = InstallOptions::default();
/// assert_eq!(options.destination, PathBuf::from("/Applications"));
/// assert!(options.overwrite);
/// assert!(!options.delete_source);
///
/// let options = InstallOptions {
///     destination: PathBuf::from("/Users/me/Applications"),
///     delete_source: true,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallOptions {
    /// Directory application bundles are copied into.
    ///
    /// Default: `/Applications`
    pub destination: PathBuf,

    /// Replace an existing bundle at the destination, trashing the old one.
    ///
    /// Default: `true`
    pub overwrite: bool,

    /// Move the source object to the trash after a successful install.
    ///
    /// Default: `false`
    pub delete_source: bool,

    /// Directory disk images are mounted under.
    ///
    /// Default: `/Volumes`
    pub volumes_root: PathBuf,
}

impl InstallOptions {
    /// The same options with source deletion turned off.
    ///
    /// Objects found inside an archive or disk image are never deleted on
    /// their own; only the outer container is.
    pub(crate) fn nested(&self) -> Self {
        Self {
            delete_source: false,
            ..self.clone()
        }
    }
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            destination: PathBuf::from("/Applications"),
            overwrite: true,
            delete_source: false,
            volumes_root: PathBuf::from("/Volumes"),
        }
    }
}
