// Copyright 2026 The Spry Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A commit hash, and the "short hash" prefixes users type on the command
//! line to name one.

use std::fmt;

/// A 40-character lowercase hexadecimal object id.
///
/// This is not a digest the engine computes itself: it is always the
/// identifier the VCS store handed back from `createCommit`/`rev-parse`, so
/// it's kept as a validated string rather than raw bytes.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommitHash(String);

impl CommitHash {
    pub fn new(hex: impl Into<String>) -> Option<Self> {
        let hex = hex.into();
        is_full_hash(&hex).then_some(Self(hex))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first 8 characters, used as a `single` unit's id when no
    /// `Spry-Commit-Id` trailer is present.
    pub fn short8(&self) -> &str {
        &self.0[..8]
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl fmt::Display for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CommitHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn is_full_hash(s: &str) -> bool {
    s.len() == 40 && is_short_hash(s)
}

/// A short hash is any non-empty hex prefix of a [`CommitHash`].
pub fn is_short_hash(s: &str) -> bool {
    !s.is_empty() && s.len() <= 40 && s.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_hash_requires_forty_lowercase_hex_chars() {
        assert!(CommitHash::new("a".repeat(40)).is_some());
        assert!(CommitHash::new("a".repeat(39)).is_none());
        assert!(CommitHash::new("A".repeat(40)).is_none());
        assert!(CommitHash::new("z".repeat(40)).is_none());
    }

    #[test]
    fn short8_takes_the_leading_chars() {
        let hash = CommitHash::new("abc1234500000000000000000000000000000000").unwrap();
        assert_eq!(hash.short8(), "abc12345");
    }

    #[test]
    fn short_hash_accepts_any_prefix_length() {
        assert!(is_short_hash("a"));
        assert!(is_short_hash("abc123"));
        assert!(!is_short_hash(""));
        assert!(!is_short_hash("xyz"));
    }
}
