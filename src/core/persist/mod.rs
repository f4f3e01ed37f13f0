//! Durable retry storage
//!
//! Batches that could not be delivered are written here and later drained by the
//! retry scheduler.

pub mod file;
pub mod traits;

pub use file::FileSystemQueue;
pub use traits::{PersistentQueue, QueueStats};
