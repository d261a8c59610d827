//! Modules layer - infrastructure shared by features
//!
//! Object storage and image processing.

pub mod imaging;
pub mod storage;
