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

//! Format validators for user-entered identifiers, branch names, and PR
//! titles (§4.3), and the commit-id generator (§4.3, §6.4).

use std::cell::Cell;

use regex::Regex;
use std::sync::LazyLock;

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[0-9a-f]{4,40}|[\w-]+-[0-9a-f]{4,})$").expect("valid regex"));

/// Nonempty, ≤100 chars, matching `^[0-9a-f]{4,40}$` or `^[\w-]+-[0-9a-f]{4,}$`.
pub fn is_valid_identifier(input: &str) -> bool {
    !input.is_empty() && input.len() <= 100 && IDENTIFIER_RE.is_match(input)
}

const FORBIDDEN_BRANCH_SUBSTRINGS: &[&str] = &["~", "^", ":", "?", "*", "[", "\\", "..", "@{"];

/// Nonempty, ≤255 chars; no spaces or control characters; none of
/// `~ ^ : ? * [ \ .. @{`; doesn't start or end with `/`, end with `.lock`,
/// or contain `//`.
pub fn is_valid_branch_name(name: &str) -> bool {
    if name.is_empty() || name.len() > 255 {
        return false;
    }
    if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }
    if FORBIDDEN_BRANCH_SUBSTRINGS.iter().any(|s| name.contains(s)) {
        return false;
    }
    if name.starts_with('/') || name.ends_with('/') {
        return false;
    }
    if name.ends_with(".lock") || name.contains("//") {
        return false;
    }
    true
}

/// After trimming, 1–500 chars; no control characters except `\n`/`\r`.
pub fn is_valid_pr_title(title: &str) -> bool {
    let trimmed = title.trim();
    if trimmed.is_empty() || trimmed.chars().count() > 500 {
        return false;
    }
    !trimmed.chars().any(|c| c.is_control() && c != '\n' && c != '\r')
}

/// Produces 8-hex-character commit ids, per §4.3/§6.4.
pub trait IdSource {
    fn next_id(&self) -> String;
}

/// A cryptographically random 32-bit value rendered as 8 hex digits.
pub struct RandomIdSource;

impl IdSource for RandomIdSource {
    fn next_id(&self) -> String {
        format!("{:08x}", rand::random::<u32>())
    }
}

/// A reproducible id source for tests: a per-process counter folded into a
/// hash of the configured seed, so the same seed plus the same number of
/// calls always produces the same sequence of ids. The exact seed format is
/// a test-only contract (see DESIGN.md), not a stability guarantee for
/// end users.
pub struct DeterministicIdSource {
    seed_hash: u64,
    counter: Cell<u64>,
}

impl DeterministicIdSource {
    pub fn from_seed(seed: &str) -> Self {
        Self {
            seed_hash: fnv1a(seed.as_bytes()),
            counter: Cell::new(0),
        }
    }
}

impl IdSource for DeterministicIdSource {
    fn next_id(&self) -> String {
        let n = self.counter.get();
        self.counter.set(n + 1);
        let mixed = self.seed_hash ^ n.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        format!("{:08x}", mixed as u32)
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// Environment variable that, when set, seeds a [`DeterministicIdSource`]
/// instead of cryptographically random ids (§6.4). Treated as a stable
/// contract for test harnesses only.
pub const DETERMINISTIC_ID_SEED_VAR: &str = "SPRY_DETERMINISTIC_ID_SEED";

/// Builds the id source this process should use: deterministic if
/// [`DETERMINISTIC_ID_SEED_VAR`] is set, otherwise cryptographically random.
pub fn id_source_from_env() -> Box<dyn IdSource> {
    match std::env::var(DETERMINISTIC_ID_SEED_VAR) {
        Ok(seed) => Box::new(DeterministicIdSource::from_seed(&seed)),
        Err(_) => Box::new(RandomIdSource),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_accepts_hex_and_named_forms() {
        assert!(is_valid_identifier("abcd"));
        assert!(is_valid_identifier("release-fe01a9"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("abc"));
        assert!(!is_valid_identifier(&"a".repeat(101)));
    }

    #[test]
    fn branch_name_rejects_reserved_forms() {
        assert!(is_valid_branch_name("feature/foo"));
        assert!(!is_valid_branch_name(""));
        assert!(!is_valid_branch_name("/leading"));
        assert!(!is_valid_branch_name("trailing/"));
        assert!(!is_valid_branch_name("a..b"));
        assert!(!is_valid_branch_name("a//b"));
        assert!(!is_valid_branch_name("branch.lock"));
        assert!(!is_valid_branch_name("has space"));
    }

    #[test]
    fn pr_title_allows_embedded_newlines_not_other_control_chars() {
        assert!(is_valid_pr_title("fix the thing\nmore detail"));
        assert!(!is_valid_pr_title("   "));
        assert!(!is_valid_pr_title("has\ttab"));
    }

    #[test]
    fn deterministic_source_is_reproducible_for_the_same_seed() {
        let a = DeterministicIdSource::from_seed("test-seed");
        let b = DeterministicIdSource::from_seed("test-seed");
        let ids_a: Vec<String> = (0..5).map(|_| a.next_id()).collect();
        let ids_b: Vec<String> = (0..5).map(|_| b.next_id()).collect();
        assert_eq!(ids_a, ids_b);
        assert_eq!(ids_a.iter().collect::<std::collections::HashSet<_>>().len(), 5);
    }

    #[test]
    fn random_source_produces_well_formed_ids() {
        let source = RandomIdSource;
        for _ in 0..20 {
            let id = source.next_id();
            assert_eq!(id.len(), 8);
            assert!(id.bytes().all(|b| b.is_ascii_hexdigit()));
        }
    }
}
