//! Detection implementation submodule.
//!
//! Internal helpers used while classifying and scanning:
//!
//! - `inspect`: zip archive listing and installable-entry selection
//! - `find_executable`: PATH-based tool lookup with fallbacks
//! - `expand_home`: `~` expansion for search paths

mod archive;
mod path_finder;

pub(crate) use archive::inspect;
pub(crate) use path_finder::{expand_home, find_executable};
