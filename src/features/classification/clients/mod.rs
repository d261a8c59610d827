mod classifier;
mod openai_client;

pub use classifier::{ClassificationError, ClassificationInput, DocumentClassifier};
pub use openai_client::OpenAiClassifier;
