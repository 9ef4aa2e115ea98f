//! Binary class labels.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PhishError, Result};

/// Values mapped to [`Label::Phishing`].
pub const TRUTHY_LABELS: &[&str] = &["1", "true", "phishing", "yes", "1.0"];

/// Values mapped to [`Label::Safe`].
pub const FALSY_LABELS: &[&str] = &["0", "false", "safe", "legitimate", "no", "0.0", "ham"];

/// Class of an email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Safe = 0,
    Phishing = 1,
}

impl Label {
    /// Map a raw corpus value onto a label.
    ///
    /// Matching is case-insensitive after trimming. Values outside
    /// [`TRUTHY_LABELS`] and [`FALSY_LABELS`] are rejected.
    ///
    /// ```
    /// use phishnot::corpus::Label;
    ///
    /// assert_eq!(Label::parse(" Phishing ").unwrap(), Label::Phishing);
    /// assert_eq!(Label::parse("0").unwrap(), Label::Safe);
    /// assert!(Label::parse("maybe").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        let value = raw.trim().to_lowercase();
        if TRUTHY_LABELS.contains(&value.as_str()) {
            Ok(Label::Phishing)
        } else if FALSY_LABELS.contains(&value.as_str()) {
            Ok(Label::Safe)
        } else {
            Err(PhishError::corpus(format!("unrecognized label value {raw:?}")))
        }
    }

    /// 0 for safe, 1 for phishing.
    pub fn as_index(self) -> usize {
        self as usize
    }

    /// 0.0 for safe, 1.0 for phishing.
    pub fn as_target(self) -> f64 {
        self as usize as f64
    }

    pub fn is_phishing(self) -> bool {
        self == Label::Phishing
    }

    pub fn from_phishing(is_phishing: bool) -> Self {
        if is_phishing {
            Label::Phishing
        } else {
            Label::Safe
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Safe => write!(f, "safe"),
            Label::Phishing => write!(f, "phishing"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthy_values() {
        for raw in ["1", "TRUE", "phishing", "Yes", "1.0"] {
            assert_eq!(Label::parse(raw).unwrap(), Label::Phishing, "{raw}");
        }
    }

    #[test]
    fn test_falsy_values() {
        for raw in ["0", "false", "SAFE", "legitimate", "no", "0.0", "ham"] {
            assert_eq!(Label::parse(raw).unwrap(), Label::Safe, "{raw}");
        }
    }

    #[test]
    fn test_unrecognized_value_is_rejected() {
        assert!(matches!(Label::parse(""), Err(PhishError::Corpus(_))));
        assert!(matches!(Label::parse("2"), Err(PhishError::Corpus(_))));
    }

    #[test]
    fn test_numeric_views() {
        assert_eq!(Label::Phishing.as_index(), 1);
        assert_eq!(Label::Safe.as_target(), 0.0);
        assert_eq!(Label::from_phishing(true), Label::Phishing);
        assert_eq!(Label::Safe.to_string(), "safe");
    }
}
