//! Object storage for vault files
//!
//! `ObjectStore` is the seam services depend on; `S3ObjectStore` is the
//! production implementation.

mod object_store;
mod s3_client;

pub use object_store::{thumbnail_key, ObjectMetadata, ObjectStore, StorageError};
pub use s3_client::S3ObjectStore;
