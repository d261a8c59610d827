//! Fallback parser for replies written as `Label: value` lines instead of JSON.

use super::ClassificationReply;

const TYPE_LABEL: &str = "document type:";
const CONFIDENCE_LABEL: &str = "confidence:";
const NAME_LABEL: &str = "suggested filename:";
const TAGS_LABEL: &str = "tags:";

/// Value following `label` on the first line containing it, labels matched
/// case-insensitively. Markdown emphasis and quotes around the value are dropped.
fn labeled_value(lines: &[&str], label: &str) -> Option<String> {
    lines.iter().find_map(|line| {
        let lower = line.to_ascii_lowercase();
        let start = lower.find(label)? + label.len();
        let value = line
            .get(start..)?
            .trim()
            .trim_matches(|c| c == '*' || c == '"' || c == '\'' || c == '`')
            .trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

fn leading_number(value: &str) -> Option<f64> {
    let end = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    value[..end].parse().ok()
}

/// Returns `None` when the reply carries none of the expected labels.
pub fn parse_labeled_lines(text: &str) -> Option<ClassificationReply> {
    let lines: Vec<&str> = text.lines().collect();

    let document_type = labeled_value(&lines, TYPE_LABEL);
    let confidence_raw = labeled_value(&lines, CONFIDENCE_LABEL);
    let suggested_name = labeled_value(&lines, NAME_LABEL);
    let tags_raw = labeled_value(&lines, TAGS_LABEL);

    if document_type.is_none()
        && confidence_raw.is_none()
        && suggested_name.is_none()
        && tags_raw.is_none()
    {
        return None;
    }

    let tags = tags_raw
        .map(|raw| {
            raw.trim_matches(|c| c == '[' || c == ']')
                .split(',')
                .map(|t| t.trim().trim_matches('"').trim().to_string())
                .filter(|t| !t.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Some(ClassificationReply {
        document_type,
        confidence: confidence_raw.as_deref().and_then(leading_number),
        suggested_name,
        tags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_markdown_reply() {
        let text = "Here is my analysis:\n\
                    1. **Document type:** Invoice\n\
                    2. **Confidence:** 0.92\n\
                    3. **Suggested filename:** Acme Invoice March 2024\n\
                    4. **Tags:** finance, invoice, acme";

        let reply = parse_labeled_lines(text).unwrap();

        assert_eq!(reply.document_type.as_deref(), Some("Invoice"));
        assert_eq!(reply.confidence, Some(0.92));
        assert_eq!(reply.suggested_name.as_deref(), Some("Acme Invoice March 2024"));
        assert_eq!(reply.tags, vec!["finance", "invoice", "acme"]);
    }

    #[test]
    fn test_unparseable_confidence_is_missing() {
        let reply = parse_labeled_lines("Document type: Contract\nConfidence: high").unwrap();

        assert_eq!(reply.document_type.as_deref(), Some("Contract"));
        assert_eq!(reply.confidence, None);
        assert!(reply.tags.is_empty());
    }

    #[test]
    fn test_reply_without_labels() {
        assert_eq!(parse_labeled_lines("I cannot see the document."), None);
    }
}
