//! Filesystem primitives for the lint configuration engine
//!
//! Provides normalized path handling, locked atomic writes, content
//! checksums and the small amount of on-disk bookkeeping the engine needs
//! (cache directories, `.gitignore` entries, JSON/YAML documents).

pub mod checksum;
pub mod constants;
pub mod error;
pub mod gitignore;
pub mod io;
pub mod path;
pub mod store;

pub use constants::LintPath;
pub use error::{Error, Result};
pub use path::NormalizedPath;
pub use store::DocumentStore;
