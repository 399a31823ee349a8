//! Error types for classification and installation.
//!
//! Each variant carries enough context to report what went wrong, and
//! [`InstallError::fix_suggestion`] gives an actionable hint for resolving it.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while classifying or installing an object.
///
/// # Example
///
/// ```rust
/// use installable::InstallError;
///
/// fn handle_error(error: InstallError) {
///     eprintln!("Installation failed: {}", error);
///     eprintln!("To fix: {}", error.fix_suggestion());
/// }
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InstallError {
    /// The path's extension is not accepted, or an archive holds nothing installable.
    #[error("Not an installable object: {}", .path.display())]
    UnrecognizedKind {
        /// The rejected path.
        path: PathBuf,
    },

    /// The path does not exist on disk.
    #[error("No such file: {}", .path.display())]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// An archive could not be opened or listed.
    #[error("Cannot read archive {}: {message}", .path.display())]
    UnreadableArchive {
        /// The archive path.
        path: PathBuf,
        /// Description of the read failure.
        message: String,
    },

    /// The destination bundle exists and overwriting is disabled.
    #[error("File exists: {}", .path.display())]
    AlreadyExists {
        /// The occupied destination path.
        path: PathBuf,
    },

    /// `remove()` was called before a successful `install()` without force.
    #[error("Cannot remove {}: not installed", .path.display())]
    NotInstalled {
        /// The object that was not removed.
        path: PathBuf,
    },

    /// An external tool exited with a non-zero status.
    #[error("{program} failed with exit code {}: {reason}", .exit_code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    CommandFailed {
        /// The tool that was invoked.
        program: String,
        /// Numeric exit code, `None` if the process was killed by a signal.
        exit_code: Option<i32>,
        /// Symbolic errno-style name of the exit code.
        reason: &'static str,
        /// Standard error from the tool, if any was captured.
        stderr: Option<String>,
    },

    /// An external tool could not be found.
    #[error("Required tool not found: {program}")]
    ToolMissing {
        /// The tool that was looked up.
        program: String,
    },

    /// An external tool did not finish within the configured timeout.
    #[error("{program} timed out after {duration:?}")]
    Timeout {
        /// The tool that was invoked.
        program: String,
        /// How long it was allowed to run.
        duration: Duration,
    },

    /// A local filesystem or process operation failed.
    #[error("{context}: {source}")]
    Io {
        /// What was being attempted.
        context: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl InstallError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Build a [`InstallError::CommandFailed`] from a process exit code.
    pub(crate) fn command_failed(
        program: impl Into<String>,
        exit_code: Option<i32>,
        stderr: Option<String>,
    ) -> Self {
        Self::CommandFailed {
            program: program.into(),
            exit_code,
            reason: exit_code.map_or("SIGNAL", errno_name),
            stderr: stderr.filter(|s| !s.trim().is_empty()),
        }
    }

    /// Get an actionable suggestion for fixing this error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use installable::InstallError;
    /// use std::path::PathBuf;
    ///
    /// let error = InstallError::AlreadyExists { path: PathBuf::from("/Applications/Foo.app") };
    /// assert!(error.fix_suggestion().contains("overwrite"));
    /// ```
    pub fn fix_suggestion(&self) -> &str {
        match self {
            Self::UnrecognizedKind { .. } => {
                "Choose a .dmg, .zip, .pkg, .app or .alfredworkflow that contains an application"
            }
            Self::NotFound { .. } => "Check that the file still exists",
            Self::UnreadableArchive { .. } => "The archive may be incomplete; download it again",
            Self::AlreadyExists { .. } => {
                "Enable overwrite or move the existing application out of the way"
            }
            Self::NotInstalled { .. } => "Install the object first, or remove it with force",
            Self::CommandFailed { .. } => "See the tool output above for details",
            Self::ToolMissing { .. } => "Make sure the macOS command line tools are on PATH",
            Self::Timeout { .. } => "Try again with a longer timeout",
            Self::Io { .. } => "Check permissions on the source and destination",
        }
    }

    /// Whether the caller can reasonably skip this object and carry on.
    ///
    /// Fatal failures from external tools and local I/O are not recoverable
    /// for the operation in progress.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnrecognizedKind { .. }
                | Self::NotFound { .. }
                | Self::AlreadyExists { .. }
                | Self::NotInstalled { .. }
        )
    }
}

/// Map an exit code to its errno symbol, the way the tools report it.
pub(crate) fn errno_name(code: i32) -> &'static str {
    match code {
        0 => "OK",
        libc::EPERM => "EPERM",
        libc::ENOENT => "ENOENT",
        libc::ESRCH => "ESRCH",
        libc::EINTR => "EINTR",
        libc::EIO => "EIO",
        libc::ENXIO => "ENXIO",
        libc::E2BIG => "E2BIG",
        libc::ENOEXEC => "ENOEXEC",
        libc::EBADF => "EBADF",
        libc::ECHILD => "ECHILD",
        libc::EAGAIN => "EAGAIN",
        libc::ENOMEM => "ENOMEM",
        libc::EACCES => "EACCES",
        libc::EFAULT => "EFAULT",
        libc::EBUSY => "EBUSY",
        libc::EEXIST => "EEXIST",
        libc::EXDEV => "EXDEV",
        libc::ENODEV => "ENODEV",
        libc::ENOTDIR => "ENOTDIR",
        libc::EISDIR => "EISDIR",
        libc::EINVAL => "EINVAL",
        libc::ENFILE => "ENFILE",
        libc::EMFILE => "EMFILE",
        libc::ENOSPC => "ENOSPC",
        libc::EROFS => "EROFS",
        _ => "UNKNOWN",
    }
}
