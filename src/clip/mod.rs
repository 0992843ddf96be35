/// Supported audio formats and MIME handling
pub mod format;
/// Clip name validation
pub mod name;
/// Directory-backed clip storage
pub mod registry;
/// Age-based clip pruning
pub mod retention;

pub use format::{ClipFormat, SUPPORTED_MIME_TYPES};
pub use name::{ClipName, NameError};
pub use registry::{format_size, Clip, ClipMedia, ClipRegistry, SavedClip, StorageInfo};
pub use retention::prune_older_than;
