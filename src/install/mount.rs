//! Attaching and detaching disk images.
//!
//! The mount point is derived from the image's file name alone, so two
//! images with the same name mount at the same place. Nothing here guards
//! against that.

use super::{InstallError, Operation, System};
use std::path::{Path, PathBuf};
use tracing::info;

/// Where `image` is mounted: `<volumes_root>/<file stem>`.
///
/// # Example
///
/// ```rust
/// use installable::mount_point;
/// use std::path::{Path, PathBuf};
///
/// let mp = mount_point(Path::new("/Users/me/Downloads/Foo-1.2.dmg"), Path::new("/Volumes"));
/// assert_eq!(mp, PathBuf::from("/Volumes/Foo-1.2"));
/// ```
pub fn mount_point(image: &Path, volumes_root: &Path) -> PathBuf {
    let stem = image.file_stem().unwrap_or(image.as_os_str());
    volumes_root.join(stem)
}

/// Attach `image` and return its mount point.
pub async fn mount<S: System>(
    system: &S,
    image: &Path,
    volumes_root: &Path,
) -> Result<PathBuf, InstallError> {
    let mount_point = mount_point(image, volumes_root);
    system
        .run(&Operation::Attach {
            image: image.to_path_buf(),
            mount_point: mount_point.clone(),
        })
        .await?;
    info!("Mounted {} at {}", image.display(), mount_point.display());
    Ok(mount_point)
}

/// Detach the volume at `mount_point`.
pub async fn unmount<S: System>(system: &S, mount_point: &Path) -> Result<(), InstallError> {
    system
        .run(&Operation::Detach {
            mount_point: mount_point.to_path_buf(),
        })
        .await?;
    info!("Unmounted {}", mount_point.display());
    Ok(())
}
