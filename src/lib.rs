//! # installable
//!
//! Find and install macOS applications from the artifacts a browser leaves
//! in `~/Downloads`: disk images, zip archives, install packages,
//! application bundles and workflow archives.
//!
//! ## Features
//!
//! - `InstallableKind` enum classifying artifacts by extension
//! - `Installable` with an explicit `Created -> Installed -> Removed` state machine
//! - `scan()` and `find_installables()` for searching directories
//! - `install_path()` for installing a single path in one step
//! - A `System` trait isolating every external tool, with `HostSystem` for macOS
//!
//! ## Example
//!
//! ```rust,no_run
//! use installable::{find_installables, HostSystem, InstallOptions, ScanOptions};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let options = ScanOptions { newest_first: true, ..Default::default() };
//!     let mut found = find_installables(&options);
//!
//!     if let Some(app) = found.first_mut() {
//!         let system = HostSystem::new();
//!         let result = app.install(&system, &InstallOptions::default(), &|_| {}).await;
//!         match result {
//!             Ok(_) => println!("Installed {}", app),
//!             Err(e) => println!("Failed: {}", e),
//!         }
//!     }
//! }
//! ```

mod detect;
mod detection;
mod install;
mod installable;
mod installable_kind;
mod options;

pub use detect::{find_installables, scan};
pub use install::{
    install_path, mount, mount_point, unmount, HostSystem, InstallError, InstallOptions,
    InstallProgress, InstallSummary, Operation, StructuredCommand, System,
};
pub use installable::{InstallOutcome, InstallState, Installable, RemoveStatus};
pub use installable_kind::InstallableKind;
pub use options::ScanOptions;
