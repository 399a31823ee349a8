//! Finding installables in directories.

use crate::detection::expand_home;
use crate::{InstallError, Installable, InstallableKind, ScanOptions};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, trace, warn};

/// Find every installable directly inside `paths`.
///
/// Each directory entry is classified with [`Installable::with_kinds`];
/// entries that are not installable are skipped. A search path that cannot
/// be read is logged and skipped too, so the scan always returns whatever
/// it could find. Within a directory, results are ordered by file name.
///
/// # Example
///
/// ```rust,no_run
/// use installable::{scan, InstallableKind};
/// use std::path::PathBuf;
///
/// let kinds: Vec<_> = InstallableKind::all().collect();
/// for app in scan(&[PathBuf::from("~/Downloads")], &kinds) {
///     println!("{} ({})", app, app.kind().display_name());
/// }
/// ```
pub fn scan(paths: &[PathBuf], kinds: &[InstallableKind]) -> Vec<Installable> {
    let mut found = Vec::new();
    for path in paths {
        let dir = expand_home(path);
        match scan_dir(&dir, kinds) {
            Ok(apps) => found.extend(apps),
            Err(e) => warn!("Skipping search path {}: {}", dir.display(), e),
        }
    }
    found
}

/// Find installables for an interactive chooser.
///
/// Runs [`scan`] over `options.paths`, keeps entries whose file name
/// contains `options.query` (case-insensitive), and sorts newest first when
/// `options.newest_first` is set.
pub fn find_installables(options: &ScanOptions) -> Vec<Installable> {
    let mut found = scan(&options.paths, &options.kinds);

    if let Some(query) = options.query.as_deref().filter(|q| !q.is_empty()) {
        let query = query.to_lowercase();
        found.retain(|app| app.to_string().to_lowercase().contains(&query));
    }

    if options.newest_first {
        sort_newest_first(&mut found);
    }
    found
}

/// Classify every entry of a single directory.
///
/// # Errors
///
/// `Io` if the directory itself cannot be read.
pub(crate) fn scan_dir(
    dir: &Path,
    kinds: &[InstallableKind],
) -> Result<Vec<Installable>, InstallError> {
    let read_err = |e| InstallError::io(format!("reading {}", dir.display()), e);

    let mut entries = std::fs::read_dir(dir)
        .map_err(read_err)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_err)?;
    entries.sort();

    let mut found = Vec::new();
    for path in entries {
        match Installable::with_kinds(&path, kinds) {
            Ok(app) => {
                info!("Found installable at {}", app.path().display());
                found.push(app);
            }
            Err(InstallError::UnrecognizedKind { .. }) => {
                trace!("No valid installable at {}", path.display());
            }
            Err(e) => debug!("Skipping {}: {}", path.display(), e),
        }
    }
    Ok(found)
}

/// Sort by creation time, newest first. Ties keep their scan order.
fn sort_newest_first(apps: &mut [Installable]) {
    apps.sort_by_cached_key(|app| std::cmp::Reverse(created_at(app.path())));
}

/// Birth time where the filesystem records one, modification time otherwise.
fn created_at(path: &Path) -> SystemTime {
    std::fs::metadata(path)
        .and_then(|meta| meta.created().or_else(|_| meta.modified()))
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn all() -> Vec<InstallableKind> {
        InstallableKind::all().collect()
    }

    #[test]
    fn test_scan_dir_skips_unrecognized() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Foo.dmg"), "x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        std::fs::write(dir.path().join("photo.jpg"), "x").unwrap();
        std::fs::create_dir(dir.path().join("Bar.app")).unwrap();

        let found = scan_dir(dir.path(), &all()).unwrap();
        let names: Vec<_> = found.iter().map(|a| a.to_string()).collect();
        assert_eq!(names, vec!["Bar.app", "Foo.dmg"]);
    }

    #[test]
    fn test_scan_dir_skips_broken_archives() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Broken.zip"), "not a zip").unwrap();
        std::fs::write(dir.path().join("Foo.pkg"), "x").unwrap();

        let found = scan_dir(dir.path(), &all()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind(), InstallableKind::Package);
    }

    #[test]
    fn test_scan_dir_restricts_kinds() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Foo.dmg"), "x").unwrap();
        std::fs::write(dir.path().join("Foo.pkg"), "x").unwrap();

        let found = scan_dir(dir.path(), &[InstallableKind::Package]).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind(), InstallableKind::Package);
    }

    #[test]
    fn test_scan_dir_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = scan_dir(&dir.path().join("nope"), &all());
        assert!(matches!(result, Err(InstallError::Io { .. })));
    }

    #[test]
    fn test_scan_skips_missing_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Foo.dmg"), "x").unwrap();

        let paths = vec![dir.path().join("nope"), dir.path().to_path_buf()];
        let found = scan(&paths, &all());
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_find_installables_query_ignores_case() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Firefox.dmg"), "x").unwrap();
        std::fs::write(dir.path().join("Slack.dmg"), "x").unwrap();

        let options = ScanOptions {
            paths: vec![dir.path().to_path_buf()],
            query: Some("fire".to_string()),
            ..Default::default()
        };
        let found = find_installables(&options);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].display_stem(), "Firefox");
    }

    #[test]
    fn test_find_installables_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["Old.dmg", "Mid.dmg", "New.dmg"] {
            std::fs::write(dir.path().join(name), "x").unwrap();
            std::thread::sleep(Duration::from_millis(20));
        }

        let options = ScanOptions {
            paths: vec![dir.path().to_path_buf()],
            newest_first: true,
            ..Default::default()
        };
        let names: Vec<_> = find_installables(&options)
            .iter()
            .map(|a| a.display_stem())
            .collect();
        assert_eq!(names, vec!["New", "Mid", "Old"]);
    }
}
