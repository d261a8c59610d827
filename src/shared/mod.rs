pub mod constants;
pub mod format;
pub mod llm;
pub mod templates;
pub mod types;
pub mod validation;

#[cfg(test)]
pub mod test_helpers;
