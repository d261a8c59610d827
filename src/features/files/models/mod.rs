mod file;

pub use file::{File, FileMetadata, NewFile};
