//! Shared fixtures: a recording `System` that emulates the macOS tools
//! inside temporary directories.

#![allow(dead_code)]

use installable::{InstallError, InstallOptions, InstallProgress, Operation, System};
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

/// Emulates attach/detach/copy/extract and records every operation.
pub struct FakeSystem {
    /// Image path -> directory whose contents appear on the mounted volume.
    pub volumes: HashMap<PathBuf, PathBuf>,
    pub trash_dir: PathBuf,
    /// Operations whose program matches fail with exit code 1.
    pub fail_program: Option<&'static str>,
    pub trash_fails: bool,
    /// Only detaching fails, with exit code 16 (`EBUSY`).
    pub detach_fails: bool,
    calls: Mutex<Vec<Operation>>,
}

impl FakeSystem {
    pub fn new(trash_dir: impl Into<PathBuf>) -> Self {
        Self {
            volumes: HashMap::new(),
            trash_dir: trash_dir.into(),
            fail_program: None,
            trash_fails: false,
            detach_fails: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Operation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn trashed(&self) -> Vec<String> {
        let mut names: Vec<_> = match std::fs::read_dir(&self.trash_dir) {
            Ok(entries) => entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }
}

impl System for FakeSystem {
    async fn run(&self, operation: &Operation) -> Result<(), InstallError> {
        self.calls.lock().unwrap().push(operation.clone());

        let program = operation.command().program;
        if self.fail_program == Some(program.as_str()) {
            return Err(InstallError::CommandFailed {
                program,
                exit_code: Some(1),
                reason: "EPERM",
                stderr: None,
            });
        }

        if self.detach_fails && matches!(operation, Operation::Detach { .. }) {
            return Err(InstallError::CommandFailed {
                program,
                exit_code: Some(16),
                reason: "EBUSY",
                stderr: Some("resource busy".to_string()),
            });
        }

        let io = |e: std::io::Error| InstallError::Io {
            context: format!("{:?}", operation),
            source: e,
        };

        match operation {
            Operation::Attach { image, mount_point } => {
                let fixture = self.volumes.get(image).ok_or(InstallError::CommandFailed {
                    program: "hdiutil".to_string(),
                    exit_code: Some(1),
                    reason: "EPERM",
                    stderr: Some("no mountable file systems".to_string()),
                })?;
                copy_tree(fixture, mount_point).map_err(io)
            }
            Operation::Detach { mount_point } => std::fs::remove_dir_all(mount_point).map_err(io),
            Operation::Copy {
                source,
                destination,
            } => copy_tree(source, &destination.join(source.file_name().unwrap())).map_err(io),
            Operation::Extract {
                archive,
                destination,
            } => {
                let mut zip = zip::ZipArchive::new(File::open(archive).map_err(io)?).unwrap();
                zip.extract(destination).unwrap();
                Ok(())
            }
            Operation::InstallPackage { .. } | Operation::Open { .. } => Ok(()),
        }
    }

    fn trash(&self, path: &Path) -> std::io::Result<PathBuf> {
        if self.trash_fails {
            return Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "trash is not writable",
            ));
        }
        std::fs::create_dir_all(&self.trash_dir)?;
        let mut target = self.trash_dir.join(path.file_name().unwrap());
        let mut n = 2;
        while target.exists() {
            target = self.trash_dir.join(format!(
                "{} {}",
                path.file_name().unwrap().to_string_lossy(),
                n
            ));
            n += 1;
        }
        std::fs::rename(path, &target)?;
        Ok(target)
    }
}

/// Recursively copy a file or directory to `to`.
pub fn copy_tree(from: &Path, to: &Path) -> std::io::Result<()> {
    if from.is_dir() {
        std::fs::create_dir_all(to)?;
        for entry in std::fs::read_dir(from)? {
            let entry = entry?;
            copy_tree(&entry.path(), &to.join(entry.file_name()))?;
        }
        Ok(())
    } else {
        if let Some(parent) = to.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(from, to).map(|_| ())
    }
}

/// A temporary workspace with downloads, applications and volume roots.
pub struct Workspace {
    pub root: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        for dir in ["Downloads", "Applications", "Volumes", "fixtures"] {
            std::fs::create_dir(root.path().join(dir)).unwrap();
        }
        Self { root }
    }

    pub fn downloads(&self) -> PathBuf {
        self.root.path().join("Downloads")
    }

    pub fn applications(&self) -> PathBuf {
        self.root.path().join("Applications")
    }

    pub fn volumes(&self) -> PathBuf {
        self.root.path().join("Volumes")
    }

    pub fn fixtures(&self) -> PathBuf {
        self.root.path().join("fixtures")
    }

    pub fn trash(&self) -> PathBuf {
        self.root.path().join(".Trash")
    }

    pub fn system(&self) -> FakeSystem {
        FakeSystem::new(self.trash())
    }

    pub fn options(&self) -> InstallOptions {
        InstallOptions {
            destination: self.applications(),
            overwrite: true,
            delete_source: false,
            volumes_root: self.volumes(),
        }
    }

    /// Create `<dir>/<name>.app` with an `Info.plist` holding `marker`.
    pub fn bundle(&self, dir: &Path, name: &str, marker: &str) -> PathBuf {
        let bundle = dir.join(format!("{}.app", name));
        std::fs::create_dir_all(bundle.join("Contents")).unwrap();
        std::fs::write(bundle.join("Contents/Info.plist"), marker).unwrap();
        bundle
    }

    /// Create a disk image in Downloads whose volume holds `volume`'s contents.
    pub fn disk_image(&self, system: &mut FakeSystem, name: &str, volume: &Path) -> PathBuf {
        let image = self.downloads().join(format!("{}.dmg", name));
        std::fs::write(&image, "disk image").unwrap();
        system.volumes.insert(image.clone(), volume.to_path_buf());
        image
    }

    /// Create a zip archive in Downloads with the given entry names.
    pub fn archive(&self, name: &str, entries: &[&str]) -> PathBuf {
        let path = self.downloads().join(name);
        write_zip(&path, entries);
        path
    }

    pub fn read_plist(&self, app: &str) -> String {
        std::fs::read_to_string(self.applications().join(app).join("Contents/Info.plist"))
            .unwrap()
    }
}

pub fn write_zip(path: &Path, entries: &[&str]) {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    for name in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, SimpleFileOptions::default()).unwrap();
        } else {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(name.as_bytes()).unwrap();
        }
    }
    writer.finish().unwrap();
}

/// Collects progress events for later assertions.
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<InstallProgress>>,
}

impl Recorder {
    pub fn callback(&self) -> impl Fn(InstallProgress) + '_ {
        move |progress| self.events.lock().unwrap().push(progress)
    }

    pub fn events(&self) -> Vec<InstallProgress> {
        self.events.lock().unwrap().clone()
    }
}
