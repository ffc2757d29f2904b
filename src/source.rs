//! # Sources
//!
//! Named sentiment channels that feed the aggregator. The dashboard knows three
//! (`stocks`, `news`, `social`); anything else parses into [`Source::Named`] so
//! configs can add channels without a code change.
//!
//! Parsing is forgiving: case-insensitive, punctuation/dashes collapse to
//! spaces, and a few aliases resolve to the canonical channel.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Source {
    Stocks,
    News,
    Social,
    /// Extension channel, stored in normalized form.
    Named(String),
}

impl Source {
    /// Parse any spelling into a source. Never fails; unknown names become
    /// [`Source::Named`].
    pub fn parse(raw: &str) -> Self {
        let s = normalize(raw);
        match s.as_str() {
            "stocks" | "stock" | "equities" | "equity" => Source::Stocks,
            "news" | "headlines" => Source::News,
            "social" | "community" => Source::Social,
            _ => Source::Named(s),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Source::Stocks => "stocks",
            Source::News => "news",
            Source::Social => "social",
            Source::Named(name) => name,
        }
    }
}

impl FromStr for Source {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Source::parse(s))
    }
}

impl From<String> for Source {
    fn from(s: String) -> Self {
        Source::parse(&s)
    }
}

impl From<&str> for Source {
    fn from(s: &str) -> Self {
        Source::parse(s)
    }
}

impl From<Source> for String {
    fn from(s: Source) -> Self {
        s.as_str().to_string()
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercase, turn separators into spaces, collapse runs of whitespace.
fn normalize(s: &str) -> String {
    let mut out = s.trim().to_ascii_lowercase();

    for ch in ['—', '–', '-', '_', '/', '\\'] {
        out = out.replace(ch, " ");
    }
    out = out.replace(['\n', '\r', '\t', '.', ',', '’', '\''], " ");

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names() {
        assert_eq!(Source::parse("stocks"), Source::Stocks);
        assert_eq!(Source::parse("news"), Source::News);
        assert_eq!(Source::parse("social"), Source::Social);
    }

    #[test]
    fn case_insensitive_and_trimmed() {
        assert_eq!(Source::parse("  STOCKS "), Source::Stocks);
        assert_eq!(Source::parse("News"), Source::News);
    }

    #[test]
    fn aliases_resolve() {
        assert_eq!(Source::parse("Equities"), Source::Stocks);
        assert_eq!(Source::parse("headlines"), Source::News);
        assert_eq!(Source::parse("Community"), Source::Social);
    }

    #[test]
    fn unknown_becomes_named_normalized() {
        assert_eq!(
            Source::parse("On-Chain_Flows"),
            Source::Named("on chain flows".to_string())
        );
        assert_eq!(Source::parse("On-Chain_Flows").to_string(), "on chain flows");
    }

    #[test]
    fn serde_uses_lowercase_name() {
        let v = serde_json::to_value(Source::Social).unwrap();
        assert_eq!(v, serde_json::json!("social"));
        let s: Source = serde_json::from_str("\"Headlines\"").unwrap();
        assert_eq!(s, Source::News);
    }
}
