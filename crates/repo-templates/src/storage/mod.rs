//! Repository host implementations

pub mod memory;

pub use memory::MemoryRepositoryHost;

#[cfg(feature = "fs")]
pub mod filesystem;

#[cfg(feature = "fs")]
pub use filesystem::FsRepositoryHost;
