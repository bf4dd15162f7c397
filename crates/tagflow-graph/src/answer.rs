//! Answers to ask nodes.

use serde::{Deserialize, Serialize};

/// An answer to an ask node, keyed by its (trimmed) text.
///
/// `yes` / `no` are the recognized boolean pair (single-answer yes/no
/// nodes get the opposite edge implied at compile time), but any other
/// text is a valid answer too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Answer {
    text: String,
}

impl Answer {
    pub fn new(text: impl AsRef<str>) -> Self {
        Self {
            text: text.as_ref().trim().to_string(),
        }
    }

    pub fn yes() -> Self {
        Self::new("yes")
    }

    pub fn no() -> Self {
        Self::new("no")
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether this answer is the boolean "yes" or "no", ignoring case.
    pub fn is_boolean(&self) -> bool {
        let lower = self.text.to_lowercase();
        lower == "yes" || lower == "no"
    }
}

impl std::fmt::Display for Answer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_trims_text() {
        assert_eq!(Answer::new("  yes  "), Answer::yes());
        assert_eq!(Answer::new("maybe").text(), "maybe");
    }

    #[test]
    fn test_boolean_detection_is_case_insensitive() {
        assert!(Answer::new("Yes").is_boolean());
        assert!(Answer::new("NO").is_boolean());
        assert!(!Answer::new("sometimes").is_boolean());
    }
}
