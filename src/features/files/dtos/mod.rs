mod file_dto;

pub use file_dto::{
    DownloadUrlResponseDto, FileListParams, FileListQuery, FileListResponseDto, UploadFileDto,
    UploadResponseDto, UploadedFileDto, MAX_FILE_SIZE,
};
