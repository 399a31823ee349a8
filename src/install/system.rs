//! The boundary between the installer and the host system.
//!
//! Every side effect an installation has on the machine goes through the
//! [`System`] trait: attaching disk images, copying bundles, extracting
//! archives, launching installers and moving things to the trash.
//! [`HostSystem`] performs these with the macOS command line tools.

use super::trash::move_to_trash_on_volume;
use super::InstallError;
use crate::detection::find_executable;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::io;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, error};

/// A side-effecting step performed by an external tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Attach a disk image at a fixed mount point.
    Attach {
        /// The image file.
        image: PathBuf,
        /// Where to mount its volume.
        mount_point: PathBuf,
    },
    /// Detach a mounted volume.
    Detach {
        /// The mount point to detach.
        mount_point: PathBuf,
    },
    /// Recursively copy `source` into `destination`, preserving attributes.
    Copy {
        /// The file or bundle to copy.
        source: PathBuf,
        /// The directory to copy into.
        destination: PathBuf,
    },
    /// Extract every entry of a zip archive into `destination`.
    Extract {
        /// The archive file.
        archive: PathBuf,
        /// The directory to extract into.
        destination: PathBuf,
    },
    /// Run the interactive package installer and wait for it to exit.
    InstallPackage {
        /// The package to install.
        package: PathBuf,
    },
    /// Hand a file to its default application.
    Open {
        /// The file to open.
        path: PathBuf,
    },
}

/// A program and its arguments, ready to execute.
///
/// # Example
///
/// ```rust
/// use installable::{Operation, StructuredCommand};
/// use std::path::PathBuf;
///
/// let cmd = Operation::Detach { mount_point: PathBuf::from("/Volumes/Foo") }.command();
/// assert_eq!(cmd.program, "hdiutil");
/// assert_eq!(cmd.args, vec!["detach".to_string(), "/Volumes/Foo".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredCommand {
    /// The program to execute (e.g., "hdiutil", "cp").
    pub program: String,

    /// Arguments to pass to the program.
    pub args: Vec<String>,

    /// Text written to the program's standard input; stdin is null when unset.
    pub stdin: Option<String>,
}

impl StructuredCommand {
    fn new(program: &str, args: Vec<String>) -> Self {
        Self {
            program: program.to_string(),
            args,
            stdin: None,
        }
    }

    fn with_stdin(mut self, input: &str) -> Self {
        self.stdin = Some(input.to_string());
        self
    }
}

fn arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

impl Operation {
    /// The command line that carries out this operation on macOS.
    pub fn command(&self) -> StructuredCommand {
        match self {
            Self::Attach { image, mount_point } => StructuredCommand::new(
                "hdiutil",
                vec![
                    "attach".to_string(),
                    "-mountpoint".to_string(),
                    arg(mount_point),
                    arg(image),
                ],
            )
            // Accepts the license agreement some images show before mounting.
            .with_stdin("Y\n"),
            Self::Detach { mount_point } => {
                StructuredCommand::new("hdiutil", vec!["detach".to_string(), arg(mount_point)])
            }
            Self::Copy {
                source,
                destination,
            } => StructuredCommand::new(
                "cp",
                vec!["-a".to_string(), arg(source), arg(destination)],
            ),
            Self::Extract {
                archive,
                destination,
            } => StructuredCommand::new(
                "unzip",
                vec![
                    "-u".to_string(),
                    "-o".to_string(),
                    arg(archive),
                    "-d".to_string(),
                    arg(destination),
                ],
            ),
            Self::InstallPackage { package } => {
                StructuredCommand::new("open", vec!["-W".to_string(), arg(package)])
            }
            Self::Open { path } => StructuredCommand::new("open", vec![arg(path)]),
        }
    }
}

/// Side effects an installation needs from the host.
///
/// Operations are awaited one at a time; implementations never see two
/// concurrent calls from a single installation.
pub trait System {
    /// Carry out an external operation, failing if the tool reports an error.
    fn run(&self, operation: &Operation) -> impl Future<Output = Result<(), InstallError>> + Send;

    /// Move `path` to a recoverable trash location, returning where it went.
    fn trash(&self, path: &Path) -> std::io::Result<PathBuf>;
}

/// [`System`] backed by the macOS command line tools.
///
/// # Example
///
/// ```rust
/// use installable::HostSystem;
/// use std::time::Duration;
///
/// // Wait for tools indefinitely (the default)
/// let system = HostSystem::new();
///
/// // Give up on any single tool after ten minutes
/// let system = HostSystem::new().with_timeout(Duration::from_secs(600));
/// ```
#[derive(Debug, Clone, Default)]
pub struct HostSystem {
    timeout: Option<Duration>,
    trash_dir: Option<PathBuf>,
}

impl HostSystem {
    /// A host system with no command timeout, trashing into `~/.Trash`.
    ///
    /// Objects on another volume are trashed into that volume's
    /// `.Trashes/<uid>` instead.
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort any external tool that runs longer than `duration`.
    pub fn with_timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Move trashed objects into `dir` instead of `~/.Trash`.
    pub fn with_trash_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.trash_dir = Some(dir.into());
        self
    }
}

impl System for HostSystem {
    async fn run(&self, operation: &Operation) -> Result<(), InstallError> {
        let cmd = operation.command();
        let program = find_executable(&cmd.program).ok_or_else(|| InstallError::ToolMissing {
            program: cmd.program.clone(),
        })?;
        debug!(program = %program.display(), args = ?cmd.args, "running external tool");

        let mut command = Command::new(&program);
        command
            .args(&cmd.args)
            .kill_on_drop(true)
            .stdin(if cmd.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = output_with_input(command, cmd.stdin.as_deref());
        let result = match self.timeout {
            Some(duration) => timeout(duration, output).await.map_err(|_| {
                InstallError::Timeout {
                    program: cmd.program.clone(),
                    duration,
                }
            })?,
            None => output.await,
        };
        let output =
            result.map_err(|e| InstallError::io(format!("failed to run {}", cmd.program), e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            let err = InstallError::command_failed(&cmd.program, output.status.code(), Some(stderr));
            error!("{}", err);
            return Err(err);
        }

        Ok(())
    }

    fn trash(&self, path: &Path) -> std::io::Result<PathBuf> {
        let trash_dir = match &self.trash_dir {
            Some(dir) => dir.clone(),
            None => dirs::home_dir()
                .ok_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::NotFound, "no home directory")
                })?
                .join(".Trash"),
        };
        move_to_trash_on_volume(path, &trash_dir)
    }
}

/// Spawn `command`, feed it `input`, and collect its output.
async fn output_with_input(mut command: Command, input: Option<&str>) -> io::Result<Output> {
    let mut child = command.spawn()?;
    if let (Some(input), Some(mut stdin)) = (input, child.stdin.take()) {
        // The tool may exit without reading it.
        if let Err(e) = stdin.write_all(input.as_bytes()).await {
            debug!("stdin not consumed: {}", e);
        }
    }
    child.wait_with_output().await
}
