/// Default page size for file listings
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// INGESTION CONSTANTS
// =============================================================================

/// Confidence above which a suggested name counts as AI-generated
pub const AI_NAME_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Confidence recorded when the model reply carries no confidence value
pub const DEFAULT_PARSED_CONFIDENCE: f64 = 0.5;

/// Confidence recorded when classification failed entirely
pub const FALLBACK_CONFIDENCE: f64 = 0.1;

/// Document type recorded when classification failed or gave no type
pub const UNKNOWN_DOCUMENT_TYPE: &str = "Unknown Document";

/// Last-resort display name when neither the model nor the filename yield one
pub const UNTITLED_DOCUMENT: &str = "Untitled Document";

/// Longest edge of generated thumbnails, in pixels
pub const THUMBNAIL_MAX_EDGE: u32 = 200;

/// JPEG quality for thumbnails
pub const THUMBNAIL_JPEG_QUALITY: u8 = 80;

/// JPEG quality for cropped document scans
pub const CROP_JPEG_QUALITY: u8 = 90;

// =============================================================================
// WHATSAPP CONSTANTS
// =============================================================================

/// Number of files shown by the `list` command
pub const WHATSAPP_LIST_LIMIT: i64 = 10;

/// Number of matches shown by the `find` command
pub const WHATSAPP_SEARCH_LIMIT: i64 = 5;

/// Expiry of links sent over WhatsApp, in seconds
pub const WHATSAPP_LINK_EXPIRY_SECS: u32 = 3600;

/// Domain of the placeholder email given to users created from WhatsApp
pub const WHATSAPP_PLACEHOLDER_EMAIL_DOMAIN: &str = "whatsapp.foundarv.com";
