use std::sync::Arc;

use crate::features::classification::clients::{ClassificationInput, DocumentClassifier};
use crate::features::classification::models::DocumentClassification;

/// Classifies uploads. Never fails: any classifier error yields the fallback
/// classification.
pub struct ClassificationService {
    classifier: Arc<dyn DocumentClassifier>,
}

impl ClassificationService {
    pub fn new(classifier: Arc<dyn DocumentClassifier>) -> Self {
        Self { classifier }
    }

    pub async fn classify(&self, input: ClassificationInput<'_>) -> DocumentClassification {
        match self.classifier.classify(&input).await {
            Ok(reply) => {
                let classification = DocumentClassification::from_reply(reply, input.file_name);
                tracing::debug!(
                    "Classified {} as {} ({:.2})",
                    input.file_name,
                    classification.document_type,
                    classification.confidence
                );
                classification
            }
            Err(e) => {
                tracing::warn!("Classification of {} failed: {}", input.file_name, e);
                DocumentClassification::fallback(input.file_name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::classification::models::ClassificationReply;
    use crate::shared::test_helpers::FakeClassifier;

    fn input() -> ClassificationInput<'static> {
        ClassificationInput {
            file_name: "bank-statement.pdf",
            mime_type: "application/pdf",
            bytes: b"%PDF-1.4",
        }
    }

    #[tokio::test]
    async fn test_failure_yields_fallback() {
        let service = ClassificationService::new(Arc::new(FakeClassifier::failing()));

        let classification = service.classify(input()).await;

        assert_eq!(classification, DocumentClassification::fallback("bank-statement.pdf"));
    }

    #[tokio::test]
    async fn test_reply_is_resolved() {
        let service = ClassificationService::new(Arc::new(FakeClassifier::replying(
            ClassificationReply {
                document_type: Some("Bank Statement".to_string()),
                confidence: Some(0.95),
                suggested_name: Some("BCA Statement June".to_string()),
                tags: vec!["bank".to_string()],
            },
        )));

        let classification = service.classify(input()).await;

        assert_eq!(classification.document_type, "Bank Statement");
        assert_eq!(classification.suggested_name, "BCA Statement June");
        assert_eq!(classification.confidence, 0.95);
    }
}
