//! Recoverable deletion into a trash directory.

use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Move `path` into `trash_dir`, keeping its name when free.
///
/// When the trash already holds an entry with the same name, a counter is
/// inserted before the extension (`Foo 2.app`, `Foo 3.app`, ...). The move is
/// a rename, so it fails across filesystems.
pub(crate) fn move_to_trash(path: &Path, trash_dir: &Path) -> io::Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("cannot trash {}", path.display()),
        )
    })?;
    std::fs::symlink_metadata(path)?;
    std::fs::create_dir_all(trash_dir)?;

    let mut target = trash_dir.join(name);
    let mut n = 2;
    while target.symlink_metadata().is_ok() {
        target = trash_dir.join(numbered_name(path, n));
        n += 1;
    }

    std::fs::rename(path, &target)?;
    Ok(target)
}

/// Move `path` into `home_trash`, or into its own volume's trash when it
/// lives on a different filesystem.
///
/// A rename cannot cross volumes, so objects on an external disk go to
/// `<volume>/.Trashes/<uid>` the way Finder trashes them.
pub(crate) fn move_to_trash_on_volume(path: &Path, home_trash: &Path) -> io::Result<PathBuf> {
    match move_to_trash(path, home_trash) {
        Err(e) if e.raw_os_error() == Some(libc::EXDEV) => {
            let owner = std::fs::metadata(home_trash.parent().unwrap_or(home_trash))?.uid();
            let trash_dir = volume_trash(path, owner)?;
            debug!(
                "{} is on another volume, trashing into {}",
                path.display(),
                trash_dir.display()
            );
            move_to_trash(path, &trash_dir)
        }
        other => other,
    }
}

/// `<volume root>/.Trashes/<uid>` for the volume holding `path`.
pub(crate) fn volume_trash(path: &Path, uid: u32) -> io::Result<PathBuf> {
    Ok(volume_root(path)?.join(".Trashes").join(uid.to_string()))
}

/// The topmost ancestor of `path` that is still on the same device.
fn volume_root(path: &Path) -> io::Result<PathBuf> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let dir = std::fs::canonicalize(parent)?;
    let device = std::fs::metadata(&dir)?.dev();

    let mut root = dir.clone();
    for ancestor in dir.ancestors().skip(1) {
        if std::fs::metadata(ancestor)?.dev() != device {
            break;
        }
        root = ancestor.to_path_buf();
    }
    Ok(root)
}

fn numbered_name(path: &Path, n: u32) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match path.extension() {
        Some(ext) => format!("{} {}.{}", stem, n, ext.to_string_lossy()),
        None => format!("{} {}", stem, n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moves_file_into_trash() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Foo.dmg");
        std::fs::write(&file, "x").unwrap();

        let trash = dir.path().join(".Trash");
        let moved = move_to_trash(&file, &trash).unwrap();

        assert_eq!(moved, trash.join("Foo.dmg"));
        assert!(!file.exists());
        assert!(moved.exists());
    }

    #[test]
    fn test_name_collision_gets_counter() {
        let dir = tempfile::tempdir().unwrap();
        let trash = dir.path().join(".Trash");
        std::fs::create_dir_all(trash.join("Foo.app")).unwrap();
        std::fs::create_dir_all(trash.join("Foo 2.app")).unwrap();

        let bundle = dir.path().join("Foo.app");
        std::fs::create_dir(&bundle).unwrap();

        let moved = move_to_trash(&bundle, &trash).unwrap();
        assert_eq!(moved, trash.join("Foo 3.app"));
    }

    #[test]
    fn test_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = move_to_trash(&dir.path().join("nope.zip"), &dir.path().join(".Trash"));
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_same_volume_uses_home_trash() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Foo.zip");
        std::fs::write(&file, "x").unwrap();
        let trash = dir.path().join("home/.Trash");
        std::fs::create_dir_all(&trash).unwrap();

        let moved = move_to_trash_on_volume(&file, &trash).unwrap();
        assert_eq!(moved, trash.join("Foo.zip"));
    }

    #[test]
    fn test_volume_trash_is_per_user_on_volume_root() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Foo.dmg");
        std::fs::write(&file, "x").unwrap();

        let trash = volume_trash(&file, 501).unwrap();
        assert!(trash.ends_with(".Trashes/501"));

        let root = trash.parent().unwrap().parent().unwrap();
        let canonical = std::fs::canonicalize(dir.path()).unwrap();
        assert!(canonical.starts_with(root));
        assert_eq!(
            std::fs::metadata(root).unwrap().dev(),
            std::fs::metadata(&canonical).unwrap().dev()
        );
    }

    #[test]
    fn test_numbered_name_without_extension() {
        assert_eq!(numbered_name(Path::new("/tmp/README"), 2), "README 2");
    }
}
