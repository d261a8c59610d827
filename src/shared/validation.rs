use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// E.164-style phone number, optional leading `+`, 8 to 15 digits
    /// - Valid: "+6281234567890", "14155550123"
    /// - Invalid: "0812-3456", "+62 812", "phone"
    pub static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[1-9][0-9]{7,14}$").unwrap();

    /// A WhatsApp reply consisting only of a result number, e.g. "2"
    pub static ref PICK_INDEX_REGEX: Regex = Regex::new(r"^[0-9]{1,3}$").unwrap();
}

/// Compare two byte strings without short-circuiting on the first mismatch
pub fn secure_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Escape `%`, `_` and `\` so user input matches literally inside a LIKE pattern
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
