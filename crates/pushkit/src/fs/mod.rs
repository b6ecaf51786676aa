//! Filesystem capability for Pushkit
//!
//! Provides the async capability trait and implementations:
//! - `InMemoryFs`: every storage root held in memory
//! - `DiskFs`: storage roots mapped onto host directories

#[cfg(not(target_arch = "wasm32"))]
mod disk;
mod encoding;
mod memory;
pub mod path;
mod traits;

#[cfg(not(target_arch = "wasm32"))]
pub use disk::{DiskFs, DiskFsConfig};
pub use memory::InMemoryFs;
pub use traits::{Directory, Encoding, FileSystem, FileType, Metadata, PathRef, fs_errors};
