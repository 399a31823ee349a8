//! Zip archive inspection.
//!
//! Lists an archive's entries and picks out the top-level objects worth
//! installing, without extracting anything.

use crate::{InstallError, InstallableKind};
use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Component, Path};
use tracing::{debug, info};

/// Resource-fork directory added by the macOS archiver; never installable.
const METADATA_PREFIX: &str = "__MACOSX/";

/// Find the installable entries inside a zip archive.
///
/// Every entry is mapped through [`candidate_entry`] and the results are
/// collected into a set, so all members of one bundle collapse into a single
/// `Name.app/` entry. An empty set means the archive holds nothing installable.
///
/// Entries whose names would land outside the extraction directory (absolute
/// paths, `..` components) are skipped.
///
/// # Errors
///
/// `UnreadableArchive` if the file cannot be opened or is not a zip archive.
pub(crate) fn inspect(
    archive: &Path,
    candidates: &[InstallableKind],
) -> Result<BTreeSet<String>, InstallError> {
    let unreadable = |message: String| InstallError::UnreadableArchive {
        path: archive.to_path_buf(),
        message,
    };

    let file = File::open(archive).map_err(|e| unreadable(e.to_string()))?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| unreadable(e.to_string()))?;

    let mut entries = BTreeSet::new();
    for i in 0..zip.len() {
        let file = zip.by_index_raw(i).map_err(|e| unreadable(e.to_string()))?;
        if file.enclosed_name().is_none() {
            debug!("Skipping unsafe entry {} in {}", file.name(), archive.display());
            continue;
        }
        if let Some(entry) = candidate_entry(file.name(), candidates) {
            if entries.insert(entry) {
                info!("Found installable {} inside {}", file.name(), archive.display());
            }
        }
    }

    if entries.is_empty() {
        debug!("No installables in {}", archive.display());
    }
    Ok(entries)
}

/// Map one archive entry name to the installable root it belongs to.
///
/// The first path component whose extension is one of `candidates` decides:
/// the entry is accepted only if its `.<ext>/` marker occurs exactly once in
/// the whole name, and it is normalized to everything up to and including
/// that component. Flat files (`Foo.pkg` with no trailing separator) never
/// match, and neither do entries with the marker nested twice.
///
/// Entries under `__MACOSX/` are ignored, and so are names that are absolute
/// or climb out with `..`.
pub(crate) fn candidate_entry(name: &str, candidates: &[InstallableKind]) -> Option<String> {
    if name.starts_with(METADATA_PREFIX) || !is_enclosed(name) {
        return None;
    }

    let mut end = 0;
    for component in name.split('/') {
        end += component.len();

        let kind = Path::new(component)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(InstallableKind::from_extension)
            .filter(|kind| candidates.contains(kind));

        if let Some(kind) = kind {
            let marker = format!(".{}/", kind.extension());
            if end >= name.len() || name.matches(marker.as_str()).count() != 1 {
                return None;
            }
            return Some(name[..=end].to_string());
        }

        // separator
        end += 1;
    }

    None
}

/// Whether `name` stays inside whatever directory it is joined onto.
fn is_enclosed(name: &str) -> bool {
    !name.starts_with('\\')
        && Path::new(name)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
