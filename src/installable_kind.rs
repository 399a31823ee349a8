//! Installable kind enum identifying recognized artifact types.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// The type of an installable object, derived from its file extension.
///
/// The set is closed: a path whose extension does not map to one of these
/// variants is not installable.
///
/// # Example
///
/// ```rust
/// use installable::InstallableKind;
///
/// for kind in InstallableKind::all() {
///     println!("{}: .{}", kind.display_name(), kind.extension());
/// }
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum InstallableKind {
    /// A mountable disk image (`.dmg`).
    DiskImage,
    /// A zip archive that holds other installables (`.zip`).
    Archive,
    /// A macOS install package (`.pkg`).
    Package,
    /// An application bundle directory (`.app`).
    Bundle,
    /// A workflow archive handed to the default opener (`.alfredworkflow`).
    WorkflowArchive,
}

impl InstallableKind {
    /// The file extension for this kind, without the leading dot.
    ///
    /// # Example
    ///
    /// ```rust
    /// use installable::InstallableKind;
    ///
    /// assert_eq!(InstallableKind::DiskImage.extension(), "dmg");
    /// assert_eq!(InstallableKind::Bundle.extension(), "app");
    /// ```
    pub fn extension(&self) -> &'static str {
        match self {
            Self::DiskImage => "dmg",
            Self::Archive => "zip",
            Self::Package => "pkg",
            Self::Bundle => "app",
            Self::WorkflowArchive => "alfredworkflow",
        }
    }

    /// Human-readable name, suitable for chooser subtitles.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::DiskImage => "disk image",
            Self::Archive => "zip archive",
            Self::Package => "install package",
            Self::Bundle => "application",
            Self::WorkflowArchive => "workflow",
        }
    }

    /// Look up a kind by extension (without the leading dot).
    ///
    /// Matching is exact and case-sensitive.
    ///
    /// # Example
    ///
    /// ```rust
    /// use installable::InstallableKind;
    ///
    /// assert_eq!(InstallableKind::from_extension("zip"), Some(InstallableKind::Archive));
    /// assert_eq!(InstallableKind::from_extension("txt"), None);
    /// ```
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::all().find(|kind| kind.extension() == ext)
    }

    /// Whether this kind is a container that is never nested inside an archive.
    ///
    /// Archives do not look for other archives or disk images among their
    /// entries, and disk images are only searched for bundles and packages.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Archive | Self::DiskImage)
    }

    /// Iterator over all known kinds.
    pub fn all() -> impl Iterator<Item = Self> {
        <Self as IntoEnumIterator>::iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extensions() {
        assert_eq!(InstallableKind::DiskImage.extension(), "dmg");
        assert_eq!(InstallableKind::Archive.extension(), "zip");
        assert_eq!(InstallableKind::Package.extension(), "pkg");
        assert_eq!(InstallableKind::Bundle.extension(), "app");
        assert_eq!(InstallableKind::WorkflowArchive.extension(), "alfredworkflow");
    }

    #[test]
    fn test_from_extension_round_trips_every_kind() {
        for kind in InstallableKind::all() {
            assert_eq!(InstallableKind::from_extension(kind.extension()), Some(kind));
        }
    }

    #[test]
    fn test_from_extension_rejects_unknown() {
        assert_eq!(InstallableKind::from_extension(""), None);
        assert_eq!(InstallableKind::from_extension("tar"), None);
        assert_eq!(InstallableKind::from_extension("DMG"), None);
    }

    #[test]
    fn test_all_iterator() {
        let all: Vec<_> = InstallableKind::all().collect();
        assert_eq!(all.len(), 5);
        assert!(all.contains(&InstallableKind::WorkflowArchive));
    }

    #[test]
    fn test_containers() {
        let containers: Vec<_> = InstallableKind::all().filter(|k| k.is_container()).collect();
        assert_eq!(
            containers,
            vec![InstallableKind::DiskImage, InstallableKind::Archive]
        );
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&InstallableKind::DiskImage).unwrap();
        assert_eq!(json, "\"disk_image\"");
        let kind: InstallableKind = serde_json::from_str("\"workflow_archive\"").unwrap();
        assert_eq!(kind, InstallableKind::WorkflowArchive);
    }
}
