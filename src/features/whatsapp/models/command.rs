/// Chat command parsed from an inbound text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Status,
    List,
    Find(String),
    Send(String),
    /// 1-based index into the last multi-hit search
    Pick(usize),
    Unknown,
}

impl Command {
    /// Keywords are case-insensitive; arguments keep their case and are trimmed.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let (keyword, argument) = match text.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (text, ""),
        };

        match (keyword.to_lowercase().as_str(), argument.is_empty()) {
            ("help", true) => Command::Help,
            ("status", true) => Command::Status,
            ("list", true) => Command::List,
            ("find" | "search", false) => Command::Find(argument.to_string()),
            ("send", false) => Command::Send(argument.to_string()),
            (digits, true) if crate::shared::validation::PICK_INDEX_REGEX.is_match(digits) => {
                match digits.parse::<usize>() {
                    Ok(n) if n > 0 => Command::Pick(n),
                    _ => Command::Unknown,
                }
            }
            _ => Command::Unknown,
        }
    }
}
