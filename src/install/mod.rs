//! Installing classified objects.
//!
//! This module holds everything with side effects: the error taxonomy,
//! progress events, the [`System`] boundary to the host and its macOS
//! implementation, disk image mounting, trashing, and the one-step
//! [`install_path`] entry point.
//!
//! # Example
//!
//! ```rust,no_run
//! use installable::{HostSystem, InstallOptions, Installable};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), installable::InstallError> {
//!     let mut app = Installable::new("/Users/me/Downloads/Tools.zip")?;
//!     app.install(&HostSystem::new(), &InstallOptions::default(), &|progress| {
//!         println!("{}", progress.description());
//!     })
//!     .await?;
//!     Ok(())
//! }
//! ```

mod errors;
mod executor;
mod mount;
mod progress;
mod system;
mod trash;

pub use errors::InstallError;
pub use executor::{install_path, InstallSummary};
pub use mount::{mount, mount_point, unmount};
pub use progress::{InstallOptions, InstallProgress};
pub use system::{HostSystem, Operation, StructuredCommand, System};
