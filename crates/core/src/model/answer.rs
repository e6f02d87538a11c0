use serde::{Deserialize, Serialize};

/// A candidate's answer to a single question.
///
/// The shape follows the question type: one option id, a set of option ids,
/// or free-typed numerical input kept exactly as entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    Single(String),
    Multiple(Vec<String>),
    Numerical(String),
}

impl Answer {
    /// Answer consisting of one selected option id.
    #[must_use]
    pub fn single(option: impl Into<String>) -> Self {
        Self::Single(option.into())
    }

    /// Answer consisting of several selected option ids.
    #[must_use]
    pub fn multiple<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Multiple(options.into_iter().map(Into::into).collect())
    }

    /// Free-typed numerical answer.
    #[must_use]
    pub fn numerical(value: impl Into<String>) -> Self {
        Self::Numerical(value.into())
    }

    /// True when the answer carries no usable content.
    ///
    /// A blank string or an empty option set must never count as answered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Answer::Single(option) => option.trim().is_empty(),
            Answer::Multiple(options) => options.is_empty(),
            Answer::Numerical(value) => value.trim().is_empty(),
        }
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_option_is_not_empty() {
        assert!(!Answer::single("opt-b").is_empty());
    }

    #[test]
    fn blank_single_option_is_empty() {
        assert!(Answer::single("   ").is_empty());
    }

    #[test]
    fn empty_option_set_is_empty() {
        assert!(Answer::multiple(Vec::<String>::new()).is_empty());
        assert!(!Answer::multiple(["opt-a", "opt-c"]).is_empty());
    }

    #[test]
    fn blank_numerical_input_is_empty() {
        assert!(Answer::numerical("").is_empty());
        assert!(!Answer::numerical("42.5").is_empty());
    }
}
