//! Name filters applied while saving and loading.
//!
//! A filter list is a sequence of name prefixes. The literal `not` splits it
//! into accepted prefixes (before) and rejected prefixes (after), and a final
//! `true` or `false` toggles verbose logging for that one operation:
//!
//! ```text
//! console not console.colors true
//! ```

/// Accept/reject prefix lists for variable names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameFilter {
    accepted: Vec<String>,
    rejected: Vec<String>,
}

impl NameFilter {
    /// A filter that accepts every name.
    pub fn all() -> Self {
        Self::default()
    }

    /// Parse filter tokens, returning the filter and the verbosity toggle if
    /// the list ended with one.
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> (Self, Option<bool>) {
        let mut tokens: Vec<&str> = tokens
            .iter()
            .map(AsRef::as_ref)
            .filter(|token| !token.is_empty())
            .collect();

        let verbose = match tokens.last() {
            Some(&"true") => Some(true),
            Some(&"false") => Some(false),
            _ => None,
        };
        if verbose.is_some() {
            tokens.pop();
        }

        let mut filter = Self::default();
        let mut rejecting = false;
        for token in tokens {
            if token == "not" {
                rejecting = true;
            } else if rejecting {
                filter.rejected.push(token.to_string());
            } else {
                filter.accepted.push(token.to_string());
            }
        }

        (filter, verbose)
    }

    /// Add an accepted prefix.
    pub fn accept(mut self, prefix: impl Into<String>) -> Self {
        self.accepted.push(prefix.into());
        self
    }

    /// Add a rejected prefix.
    pub fn reject(mut self, prefix: impl Into<String>) -> Self {
        self.rejected.push(prefix.into());
        self
    }

    /// A name passes when it starts with any accepted prefix (or none are
    /// set) and with no rejected prefix.
    pub fn accepts(&self, name: &str) -> bool {
        let accepted = self.accepted.is_empty()
            || self.accepted.iter().any(|prefix| name.starts_with(prefix.as_str()));
        accepted && !self.rejected.iter().any(|prefix| name.starts_with(prefix.as_str()))
    }

    pub fn accepted(&self) -> &[String] {
        &self.accepted
    }

    pub fn rejected(&self) -> &[String] {
        &self.rejected
    }

    /// True when the filter passes every name.
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty() && self.rejected.is_empty()
    }
}
