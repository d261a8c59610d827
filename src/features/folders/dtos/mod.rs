mod folder_dto;

pub use folder_dto::{CreateFolderDto, CreateFolderResponseDto, FolderListResponseDto};
