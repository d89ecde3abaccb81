//! Parsing of `path=ref` requests from the command line.

use crate::constants::REF_SEPARATOR;

/// Ordered mapping from submodule path to the ref requested for it.
///
/// Entries keep the position at which their path first appeared. A repeated
/// path replaces the ref of the earlier entry (last write wins).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefRequests {
    entries: Vec<(String, String)>,
}

impl RefRequests {
    pub fn insert(&mut self, path: impl Into<String>, reference: impl Into<String>) {
        let path = path.into();
        let reference = reference.into();
        match self.entries.iter_mut().find(|(p, _)| *p == path) {
            Some(entry) => entry.1 = reference,
            None => self.entries.push((path, reference)),
        }
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, r)| r.as_str())
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, r)| (p.as_str(), r.as_str()))
    }
}

/// One positional argument as it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefToken {
    Request { path: String, reference: String },
    Rejected(String),
}

/// Result of parsing the positional arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRefs {
    pub requests: RefRequests,
    /// Every token in command-line order, for echoing back to the user.
    pub tokens: Vec<RefToken>,
}

impl ParsedRefs {
    /// Tokens without a separator, in the order they were given.
    pub fn rejected(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|token| match token {
            RefToken::Rejected(raw) => Some(raw.as_str()),
            RefToken::Request { .. } => None,
        })
    }
}

/// Splits each `path=ref` token on its first `=`.
///
/// Tokens without `=` are kept as [`RefToken::Rejected`] so the caller can
/// warn about them; they never abort parsing.
pub fn parse_refs<S: AsRef<str>>(tokens: &[S]) -> ParsedRefs {
    let mut parsed = ParsedRefs::default();
    for token in tokens {
        let token = token.as_ref();
        match token.split_once(REF_SEPARATOR) {
            Some((path, reference)) => {
                parsed.requests.insert(path, reference);
                parsed.tokens.push(RefToken::Request {
                    path: path.to_string(),
                    reference: reference.to_string(),
                });
            }
            None => parsed.tokens.push(RefToken::Rejected(token.to_string())),
        }
    }
    parsed
}
