mod classification;
mod line_parser;

pub use classification::{ClassificationReply, DocumentClassification};
pub use line_parser::parse_labeled_lines;
