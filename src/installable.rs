//! The installable object and its install/remove state machine.

use crate::detect::scan_dir;
use crate::detection::inspect;
use crate::install::{mount, unmount};
use crate::{InstallError, InstallOptions, InstallProgress, InstallableKind, Operation, System};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Kinds searched for on a mounted disk image.
const VOLUME_KINDS: &[InstallableKind] = &[InstallableKind::Bundle, InstallableKind::Package];

/// Lifecycle of an [`Installable`].
///
/// `Created -> Installed -> Removed`. `Removed` is terminal. A forced
/// removal may also go straight from `Created` to `Removed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    /// Classified but not yet installed.
    Created,
    /// `install()` completed successfully.
    Installed,
    /// Moved to the trash.
    Removed {
        /// Whether the object had been installed before removal.
        was_installed: bool,
    },
}

/// Result of a call to [`Installable::install`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Installed; carries the object's original path.
    Installed(PathBuf),
    /// Nothing was done because the object had already been removed.
    AlreadyRemoved,
}

impl InstallOutcome {
    /// The installed object's path, if anything was installed.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Installed(path) => Some(path),
            Self::AlreadyRemoved => None,
        }
    }
}

/// Result of a call to [`Installable::remove`].
///
/// Failing to trash is reported here rather than as an error; the object
/// stays in place and keeps its state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveStatus {
    /// Moved to the trash.
    Removed {
        /// Where the object ended up.
        trashed_to: PathBuf,
    },
    /// Could not be trashed; left where it was.
    Kept {
        /// Why trashing failed.
        reason: String,
    },
}

/// A filesystem object that can be installed.
///
/// Construction classifies the path by extension and, for zip archives,
/// reads the archive to find what is inside. An `Installable` only exists
/// for paths that are actually installable.
///
/// # Example
///
/// ```rust,no_run
/// use installable::{HostSystem, InstallOptions, Installable};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), installable::InstallError> {
///     let mut app = Installable::new("/Users/me/Downloads/Foo.dmg")?;
///     let options = InstallOptions { delete_source: true, ..Default::default() };
///     app.install(&HostSystem::new(), &options, &|p| println!("{}", p.description()))
///         .await?;
///     assert!(app.is_removed());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Installable {
    path: PathBuf,
    kind: InstallableKind,
    contained: BTreeSet<String>,
    state: InstallState,
}

impl Installable {
    /// Classify `path`, accepting every kind.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, InstallError> {
        let all: Vec<_> = InstallableKind::all().collect();
        Self::with_kinds(path, &all)
    }

    /// Classify `path`, accepting only `kinds`.
    ///
    /// # Errors
    ///
    /// - `UnrecognizedKind` if the extension is not one of `kinds`, or the
    ///   path is an archive without installable entries
    /// - `NotFound` if the path does not exist
    /// - `UnreadableArchive` if an archive cannot be listed
    pub fn with_kinds(
        path: impl AsRef<Path>,
        kinds: &[InstallableKind],
    ) -> Result<Self, InstallError> {
        // Collecting components drops any trailing separator.
        let path: PathBuf = path.as_ref().components().collect();

        let kind = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(InstallableKind::from_extension)
            .filter(|kind| kinds.contains(kind))
            .ok_or_else(|| {
                debug!("{} is no valid installable object", path.display());
                InstallError::UnrecognizedKind { path: path.clone() }
            })?;

        if path.symlink_metadata().is_err() {
            return Err(InstallError::NotFound { path });
        }

        let contained = if kind == InstallableKind::Archive {
            let nested: Vec<_> = kinds.iter().copied().filter(|k| !k.is_container()).collect();
            let entries = inspect(&path, &nested)?;
            if entries.is_empty() {
                return Err(InstallError::UnrecognizedKind { path });
            }
            entries
        } else {
            BTreeSet::new()
        };

        Ok(Self {
            path,
            kind,
            contained,
            state: InstallState::Created,
        })
    }

    /// The object's path, without trailing separator.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The classified kind.
    pub fn kind(&self) -> InstallableKind {
        self.kind
    }

    /// Entry roots found inside an archive; empty for other kinds.
    pub fn contained_entries(&self) -> &BTreeSet<String> {
        &self.contained
    }

    /// Current lifecycle state.
    pub fn state(&self) -> InstallState {
        self.state
    }

    /// Whether `install()` has completed successfully.
    pub fn is_installed(&self) -> bool {
        matches!(
            self.state,
            InstallState::Installed
                | InstallState::Removed {
                    was_installed: true
                }
        )
    }

    /// Whether the object has been moved to the trash.
    pub fn is_removed(&self) -> bool {
        matches!(self.state, InstallState::Removed { .. })
    }

    /// Number of objects this will install: the archive's entries, or one.
    pub fn object_count(&self) -> usize {
        self.contained.len().max(1)
    }

    /// The file name without its extension, e.g. for a chooser title.
    pub fn display_stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Install the object.
    ///
    /// Bundles are copied into `options.destination`; packages run the
    /// system installer; archives are extracted and every contained entry is
    /// installed in turn; disk images are mounted, every bundle and package
    /// on the volume is installed, and the image is unmounted again even if
    /// one of those fails; workflows are handed to the default opener.
    ///
    /// Objects found inside an archive or disk image are installed with the
    /// same destination and overwrite setting but are never deleted on their
    /// own. When `options.delete_source` is set, this object is moved to the
    /// trash after a successful install.
    ///
    /// Calling this on a removed object does nothing and returns
    /// [`InstallOutcome::AlreadyRemoved`].
    ///
    /// # Errors
    ///
    /// Any failure leaves the state unchanged. `AlreadyExists` if a bundle
    /// is already at the destination and overwriting is disabled; the
    /// tool errors from [`System::run`] otherwise.
    pub async fn install<S, F>(
        &mut self,
        system: &S,
        options: &InstallOptions,
        on_progress: &F,
    ) -> Result<InstallOutcome, InstallError>
    where
        S: System,
        F: Fn(InstallProgress),
    {
        debug!(
            "Trying to install {} to {} with delete {} and overwrite {}",
            self.path.display(),
            options.destination.display(),
            options.delete_source,
            options.overwrite
        );
        if self.is_removed() {
            warn!("{} has been removed", self);
            on_progress(InstallProgress::SkippedRemoved {
                path: self.path.clone(),
            });
            return Ok(InstallOutcome::AlreadyRemoved);
        }

        on_progress(InstallProgress::Started {
            path: self.path.clone(),
            kind: self.kind,
        });

        match self.kind {
            InstallableKind::Bundle => self.install_bundle(system, options, on_progress).await?,
            InstallableKind::Package => {
                system
                    .run(&Operation::InstallPackage {
                        package: self.path.clone(),
                    })
                    .await?
            }
            InstallableKind::Archive => self.install_archive(system, options, on_progress).await?,
            InstallableKind::DiskImage => {
                self.install_disk_image(system, options, on_progress).await?
            }
            InstallableKind::WorkflowArchive => self.install_workflow(system, options).await?,
        }

        info!("Installed {} to {}", self, options.destination.display());
        self.state = InstallState::Installed;
        on_progress(InstallProgress::Completed {
            path: self.path.clone(),
            kind: self.kind,
        });

        if options.delete_source {
            self.remove_with(system, false, on_progress)?;
        }

        Ok(InstallOutcome::Installed(self.path.clone()))
    }

    /// Move the object to the trash.
    ///
    /// Reports progress through `tracing` only; see [`Installable::remove_with`]
    /// to receive progress events.
    pub fn remove<S: System>(&mut self, system: &S, force: bool) -> Result<RemoveStatus, InstallError> {
        self.remove_with(system, force, &|_: InstallProgress| {})
    }

    /// Move the object to the trash, reporting progress.
    ///
    /// # Errors
    ///
    /// `NotInstalled` if the object has not been installed and `force` is
    /// false. A failure to trash is returned as [`RemoveStatus::Kept`].
    pub fn remove_with<S, F>(
        &mut self,
        system: &S,
        force: bool,
        on_progress: &F,
    ) -> Result<RemoveStatus, InstallError>
    where
        S: System,
        F: Fn(InstallProgress),
    {
        if !self.is_installed() && !force {
            debug!("Can't remove {}: not installed", self);
            return Err(InstallError::NotInstalled {
                path: self.path.clone(),
            });
        }

        match system.trash(&self.path) {
            Ok(trashed_to) => {
                info!("Moved {} to trash", self);
                self.state = InstallState::Removed {
                    was_installed: self.is_installed(),
                };
                on_progress(InstallProgress::Trashed {
                    path: self.path.clone(),
                });
                Ok(RemoveStatus::Removed { trashed_to })
            }
            Err(e) => {
                warn!("Could not move {} to trash: {}", self.path.display(), e);
                on_progress(InstallProgress::TrashFailed {
                    path: self.path.clone(),
                    message: e.to_string(),
                });
                Ok(RemoveStatus::Kept {
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn install_bundle<S, F>(
        &self,
        system: &S,
        options: &InstallOptions,
        on_progress: &F,
    ) -> Result<(), InstallError>
    where
        S: System,
        F: Fn(InstallProgress),
    {
        let name = self.path.file_name().unwrap_or(self.path.as_os_str());
        let dest = options.destination.join(name);

        if dest.symlink_metadata().is_ok() {
            if !options.overwrite {
                warn!("File exists: {}", dest.display());
                return Err(InstallError::AlreadyExists { path: dest });
            }
            debug!("Trying to remove {}", dest.display());
            match system.trash(&dest) {
                Ok(_) => {
                    info!("Moved {} to trash", dest.display());
                    on_progress(InstallProgress::Trashed { path: dest });
                }
                Err(e) => {
                    warn!("Could not move {} to trash: {}", dest.display(), e);
                    on_progress(InstallProgress::TrashFailed {
                        path: dest,
                        message: e.to_string(),
                    });
                }
            }
        }

        on_progress(InstallProgress::Copying {
            source: self.path.clone(),
            destination: options.destination.clone(),
        });
        system
            .run(&Operation::Copy {
                source: self.path.clone(),
                destination: options.destination.clone(),
            })
            .await
    }

    async fn install_archive<S, F>(
        &self,
        system: &S,
        options: &InstallOptions,
        on_progress: &F,
    ) -> Result<(), InstallError>
    where
        S: System,
        F: Fn(InstallProgress),
    {
        // Kept on disk: a nested workflow may still be read by its opener
        // after this returns.
        let dir = temp_dir()?;
        system
            .run(&Operation::Extract {
                archive: self.path.clone(),
                destination: dir.clone(),
            })
            .await?;
        on_progress(InstallProgress::Extracted {
            archive: self.path.clone(),
            directory: dir.clone(),
        });

        let nested = options.nested();
        for entry in &self.contained {
            let mut inner = Installable::new(dir.join(entry))?;
            Box::pin(inner.install(system, &nested, on_progress)).await?;
        }
        Ok(())
    }

    async fn install_disk_image<S, F>(
        &self,
        system: &S,
        options: &InstallOptions,
        on_progress: &F,
    ) -> Result<(), InstallError>
    where
        S: System,
        F: Fn(InstallProgress),
    {
        let mount_point = mount(system, &self.path, &options.volumes_root).await?;
        on_progress(InstallProgress::Mounted {
            image: self.path.clone(),
            mount_point: mount_point.clone(),
        });

        let installed = install_volume(system, &mount_point, &options.nested(), on_progress).await;

        let unmounted = unmount(system, &mount_point).await;
        if unmounted.is_ok() {
            on_progress(InstallProgress::Unmounted {
                mount_point: mount_point.clone(),
            });
        }

        match (installed, unmounted) {
            (Err(e), Err(unmount_err)) => {
                warn!("Leaving {} mounted: {}", mount_point.display(), unmount_err);
                Err(e)
            }
            (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
            (Ok(()), Ok(())) => Ok(()),
        }
    }

    async fn install_workflow<S: System>(
        &self,
        system: &S,
        options: &InstallOptions,
    ) -> Result<(), InstallError> {
        // The opener reads the file after we return, so open a copy when
        // the original is about to be trashed.
        let path = if options.delete_source {
            let dir = temp_dir()?;
            system
                .run(&Operation::Copy {
                    source: self.path.clone(),
                    destination: dir.clone(),
                })
                .await?;
            dir.join(self.path.file_name().unwrap_or(self.path.as_os_str()))
        } else {
            self.path.clone()
        };

        system.run(&Operation::Open { path }).await
    }
}

async fn install_volume<S, F>(
    system: &S,
    mount_point: &Path,
    options: &InstallOptions,
    on_progress: &F,
) -> Result<(), InstallError>
where
    S: System,
    F: Fn(InstallProgress),
{
    for mut app in scan_dir(mount_point, VOLUME_KINDS)? {
        Box::pin(app.install(system, options, on_progress)).await?;
    }
    Ok(())
}

fn temp_dir() -> Result<PathBuf, InstallError> {
    tempfile::Builder::new()
        .prefix("installable-")
        .tempdir()
        .map(|dir| dir.keep())
        .map_err(|e| InstallError::io("creating temporary directory", e))
}

impl fmt::Display for Installable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.path.file_name().unwrap_or(self.path.as_os_str());
        write!(f, "{}", name.to_string_lossy())
    }
}
