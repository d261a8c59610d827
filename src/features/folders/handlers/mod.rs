mod folder_handler;

pub use folder_handler::{__path_create_folder, __path_list_folders, create_folder, list_folders};
