use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use super::LlmResponse;

lazy_static! {
    /// `,` directly before a closing brace or bracket
    static ref TRAILING_COMMA_RE: Regex = Regex::new(r",(\s*[}\]])").unwrap();

    /// `"a" + "b"` style concatenation some models emit inside JSON
    static ref STRING_CONCAT_RE: Regex = Regex::new(r#""\s*\+\s*""#).unwrap();
}

#[derive(Debug, Error, PartialEq)]
pub enum LlmParseError {
    #[error("no JSON object found in model reply")]
    NoJson,

    #[error("model reply is not valid JSON: {0}")]
    Malformed(String),
}

/// Locate the JSON object inside a reply.
///
/// Accepts fenced ```json blocks, bare fenced blocks, a reply that is itself an
/// object, and an object embedded in prose (first `{` to last `}`).
pub fn extract_json_block(text: &str) -> Option<&str> {
    if let Some((_, rest)) = text.split_once("```json") {
        return rest.split("```").next().map(str::trim);
    }

    if let Some((_, rest)) = text.split_once("```") {
        // Skip an optional language tag on the fence line
        let body = rest.split_once('\n').map(|(_, b)| b).unwrap_or(rest);
        if let Some((block, _)) = body.split_once("```") {
            let block = block.trim();
            if block.starts_with('{') {
                return Some(block);
            }
        }
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn apply_quick_fixes(json_str: &str) -> String {
    let joined = STRING_CONCAT_RE.replace_all(json_str, "");
    TRAILING_COMMA_RE.replace_all(&joined, "$1").into_owned()
}

fn repair(json_str: &str) -> Option<String> {
    let options = llm_json::RepairOptions::default();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        llm_json::repair_json(json_str, &options)
    }));

    match result {
        Ok(Ok(repaired)) => Some(repaired),
        Ok(Err(e)) => {
            tracing::debug!("JSON repair failed: {:?}", e);
            None
        }
        Err(_) => {
            tracing::warn!("JSON repair panicked");
            None
        }
    }
}

/// Parse a model reply into `T`, escalating from a direct parse to quick
/// fixes and finally `llm_json` repair.
pub fn parse_structured<T>(text: &str) -> Result<T, LlmParseError>
where
    T: LlmResponse,
{
    let json_str = extract_json_block(text).ok_or(LlmParseError::NoJson)?;

    let direct_error = match serde_json::from_str::<T>(json_str) {
        Ok(parsed) => return Ok(parsed),
        Err(e) => e.to_string(),
    };

    if let Ok(parsed) = serde_json::from_str::<T>(&apply_quick_fixes(json_str)) {
        tracing::debug!("Model reply parsed after quick fixes");
        return Ok(parsed);
    }

    if let Some(parsed) = repair(json_str).and_then(|r| serde_json::from_str::<T>(&r).ok()) {
        tracing::debug!("Model reply parsed after llm_json repair");
        return Ok(parsed);
    }

    Err(LlmParseError::Malformed(direct_error))
}
