//! The on-disk icon library.
//!
//! # Modules
//!
//! - [`location`]: icon kinds, modes and the directory they resolve to
//! - [`catalog`]: folder, icon, flag and infographic listings
//! - [`edit`]: recolor, greyscale, revert and read operations on one file
//! - [`backup`]: single-slot `.svg.backup` snapshots
//! - [`lock`]: in-process per-file edit locks
//! - [`error`]: [`IconError`], shared by every library operation

pub mod backup;
pub mod catalog;
pub mod edit;
mod error;
pub mod location;
pub mod lock;

pub use error::IconError;
pub use location::{
    IconKind, IconLocation, Mode, ROOT_FOLDER, icon_stem, normalize_icon_name, resolve,
    validate_segment,
};

use crate::config::LibraryConfig;
use lock::FileLocks;

/// Library directories plus the edit locks shared by all requests.
#[derive(Debug)]
pub struct Library {
    config: LibraryConfig,
    locks: FileLocks,
}

impl Library {
    pub fn new(config: LibraryConfig) -> Self {
        Self {
            config,
            locks: FileLocks::new(),
        }
    }

    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    pub fn locks(&self) -> &FileLocks {
        &self.locks
    }
}
