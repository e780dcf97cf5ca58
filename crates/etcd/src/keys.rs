//! Mapping between logical keys and store keys.
//!
//! A store key is the configured prefix concatenated with the logical key.
//! This is plain string concatenation, not a path join: with prefix `app`
//! the logical keys `/x` under `app` and `x` under `app/` land on the same
//! store key. Choose prefixes that end in a separator.

/// Derives store keys from logical keys under one prefix.
#[derive(Debug, Clone)]
pub(crate) struct KeyMapper {
    prefix: String,
}

impl KeyMapper {
    pub(crate) fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub(crate) fn prefix(&self) -> &str {
        &self.prefix
    }

    pub(crate) fn full_key(&self, key: &str) -> String {
        let mut full = String::with_capacity(self.prefix.len() + key.len());
        full.push_str(&self.prefix);
        full.push_str(key);
        full
    }

    /// Recover the logical key. `None` for keys outside the prefix.
    pub(crate) fn logical_key<'a>(&self, full_key: &'a str) -> Option<&'a str> {
        full_key.strip_prefix(self.prefix.as_str())
    }
}
