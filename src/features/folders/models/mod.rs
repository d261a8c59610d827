mod folder;

pub use folder::{Folder, FolderType, NewFolder};
