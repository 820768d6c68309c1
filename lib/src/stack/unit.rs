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

//! Grouping a commit sequence into review units: contiguous runs sharing a
//! `Spry-Group` trailer become a [`ReviewUnit::Group`], everything else is a
//! [`ReviewUnit::Single`].

use std::collections::HashMap;
use std::fmt;

use crate::commit::Commit;
use crate::hash::CommitHash;

/// The `Spry-Group` value a commit carries: hex, or `<name>-<hex>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(String);

impl GroupId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single commit that is not part of a group.
#[derive(Clone, Debug)]
pub struct SingleUnit {
    pub id: String,
    pub title: String,
    pub commit: CommitHash,
}

/// A contiguous run of commits sharing a `Spry-Group` trailer.
#[derive(Clone, Debug)]
pub struct GroupUnit {
    pub id: GroupId,
    /// Looked up from [`crate::refstore::GroupTitles`]; `None` if no title
    /// has ever been recorded for this group.
    pub title: Option<String>,
    pub commits: Vec<CommitHash>,
    pub subjects: Vec<String>,
}

/// One PR's worth of change: a single commit, or a contiguous group.
#[derive(Clone, Debug)]
pub enum ReviewUnit {
    Single(SingleUnit),
    Group(GroupUnit),
}

impl ReviewUnit {
    pub fn id(&self) -> &str {
        match self {
            Self::Single(s) => &s.id,
            Self::Group(g) => g.id.as_str(),
        }
    }

    pub fn commit_hashes(&self) -> impl Iterator<Item = &CommitHash> {
        match self {
            Self::Single(s) => std::slice::from_ref(&s.commit).iter(),
            Self::Group(g) => g.commits.iter(),
        }
    }
}

/// Walks `commits` oldest-first, grouping consecutive runs that share a
/// `Spry-Group` value. Does not validate contiguity across the whole
/// sequence — that's [`parse_stack`].
pub fn detect_pr_units(commits: &[Commit], titles: &HashMap<String, String>) -> Vec<ReviewUnit> {
    let mut units = Vec::new();
    let mut open: Option<GroupUnit> = None;

    for commit in commits {
        let trailers = commit.trailers();
        match trailers.group() {
            Some(group_id) if open.as_ref().is_some_and(|g| g.id.as_str() == group_id) => {
                let group = open.as_mut().expect("checked above");
                group.commits.push(commit.hash.clone());
                group.subjects.push(commit.subject().to_owned());
            }
            Some(group_id) => {
                if let Some(g) = open.take() {
                    units.push(ReviewUnit::Group(g));
                }
                open = Some(GroupUnit {
                    id: GroupId::new(group_id),
                    title: titles.get(group_id).cloned(),
                    commits: vec![commit.hash.clone()],
                    subjects: vec![commit.subject().to_owned()],
                });
            }
            None => {
                if let Some(g) = open.take() {
                    units.push(ReviewUnit::Group(g));
                }
                units.push(ReviewUnit::Single(SingleUnit {
                    id: trailers
                        .commit_id()
                        .map(str::to_owned)
                        .unwrap_or_else(|| commit.hash.short8().to_owned()),
                    title: commit.subject().to_owned(),
                    commit: commit.hash.clone(),
                }));
            }
        }
    }
    if let Some(g) = open.take() {
        units.push(ReviewUnit::Group(g));
    }
    units
}

/// A group whose commits were interrupted by one or more commits that don't
/// carry that group's trailer.
#[derive(Clone, Debug)]
pub struct SplitGroup {
    pub group: GroupId,
    pub interrupting_commits: Vec<CommitHash>,
}

/// Runs [`detect_pr_units`], additionally checking contiguity: every
/// group's first and last occurrence must bracket nothing but commits
/// carrying that same group's trailer. The commit ordering, not commit
/// ids, determines contiguity.
pub fn parse_stack(
    commits: &[Commit],
    titles: &HashMap<String, String>,
) -> Result<Vec<ReviewUnit>, SplitGroup> {
    let mut order: Vec<String> = Vec::new();
    let mut first_seen: HashMap<String, usize> = HashMap::new();
    let mut last_seen: HashMap<String, usize> = HashMap::new();
    for (i, commit) in commits.iter().enumerate() {
        if let Some(group_id) = commit.trailers().group() {
            if !first_seen.contains_key(group_id) {
                first_seen.insert(group_id.to_owned(), i);
                order.push(group_id.to_owned());
            }
            last_seen.insert(group_id.to_owned(), i);
        }
    }

    for group_id in order {
        let first = first_seen[&group_id];
        let last = last_seen[&group_id];
        let interrupting: Vec<CommitHash> = commits[first..=last]
            .iter()
            .filter(|c| c.trailers().group().as_deref() != Some(group_id.as_str()))
            .map(|c| c.hash.clone())
            .collect();
        if !interrupting.is_empty() {
            return Err(SplitGroup {
                group: GroupId::new(group_id),
                interrupting_commits: interrupting,
            });
        }
    }

    Ok(detect_pr_units(commits, titles))
}

/// Result of [`resolve_identifier`].
pub enum Resolution<'a> {
    Found(&'a ReviewUnit),
    Ambiguous(Vec<String>),
    NotFound,
}

/// Resolves a user-typed identifier against `units`, per §4.3: exact unit id,
/// then unit-id prefix, then commit-hash prefix.
pub fn resolve_identifier<'a>(input: &str, units: &'a [ReviewUnit], commits: &[Commit]) -> Resolution<'a> {
    if let Some(unit) = units.iter().find(|u| u.id() == input) {
        return Resolution::Found(unit);
    }

    let prefix_matches: Vec<&ReviewUnit> = units.iter().filter(|u| u.id().starts_with(input)).collect();
    match prefix_matches.len() {
        1 => return Resolution::Found(prefix_matches[0]),
        n if n > 1 => {
            return Resolution::Ambiguous(prefix_matches.iter().map(|u| u.id().to_owned()).collect());
        }
        _ => {}
    }

    let hash_matches: Vec<&Commit> = commits
        .iter()
        .filter(|c| c.hash.starts_with(input))
        .collect();
    match hash_matches.len() {
        0 => Resolution::NotFound,
        1 => {
            let hash = &hash_matches[0].hash;
            units
                .iter()
                .find(|u| u.commit_hashes().any(|h| h == hash))
                .map(Resolution::Found)
                .unwrap_or(Resolution::NotFound)
        }
        _ => Resolution::Ambiguous(hash_matches.iter().map(|c| c.hash.to_string()).collect()),
    }
}

/// All unit ids from the first unit up to and including the one `input`
/// resolves to, oldest-first.
pub fn resolve_up_to(input: &str, units: &[ReviewUnit], commits: &[Commit]) -> Option<Vec<String>> {
    let target_id = match resolve_identifier(input, units, commits) {
        Resolution::Found(unit) => unit.id().to_owned(),
        _ => return None,
    };
    let mut ids = Vec::new();
    for unit in units {
        ids.push(unit.id().to_owned());
        if unit.id() == target_id {
            return Some(ids);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;
    use maplit::hashmap;
    use test_case::test_case;

    use super::*;
    use crate::commit::Signature;
    use crate::commit::Timestamp;

    fn commit(hash: &str, body: &str) -> Commit {
        let sig = Signature {
            name: "Alice".into(),
            email: "alice@example.com".into(),
            timestamp: Timestamp {
                millis_since_epoch: 0,
                tz_offset_minutes: 0,
            },
        };
        Commit {
            hash: CommitHash::new(hash.repeat(40 / hash.len())).unwrap(),
            parents: vec![],
            tree: "b".repeat(40),
            body: body.to_owned(),
            author: sig.clone(),
            committer: sig,
        }
    }

    #[test]
    fn detects_singles_and_a_contiguous_group() {
        let commits = vec![
            commit("a", "first\n"),
            commit("b", "second\n\nSpry-Group: g1\n"),
            commit("c", "third\n\nSpry-Group: g1\n"),
            commit("d", "fourth\n"),
        ];
        let titles = HashMap::new();
        let units = detect_pr_units(&commits, &titles);
        assert_eq!(units.len(), 3);
        assert!(matches!(units[0], ReviewUnit::Single(_)));
        match &units[1] {
            ReviewUnit::Group(g) => assert_eq!(g.commits.len(), 2),
            ReviewUnit::Single(_) => panic!("expected a group"),
        }
        assert!(matches!(units[2], ReviewUnit::Single(_)));
    }

    #[test]
    fn detects_split_group() {
        let commits = vec![
            commit("a", "first\n\nSpry-Group: g1\n"),
            commit("b", "second\n"),
            commit("c", "third\n\nSpry-Group: g1\n"),
        ];
        let titles = HashMap::new();
        let result = parse_stack(&commits, &titles);
        let err = result.expect_err("split group should be rejected");
        assert_eq!(err.group.as_str(), "g1");
        assert_eq!(err.interrupting_commits.len(), 1);
    }

    #[test]
    fn resolves_exact_and_prefix_identifiers() {
        let commits = vec![commit("a", "first\n\nSpry-Commit-Id: abc12345\n")];
        let titles = HashMap::new();
        let units = detect_pr_units(&commits, &titles);

        assert!(matches!(
            resolve_identifier("abc12345", &units, &commits),
            Resolution::Found(_)
        ));
        assert!(matches!(
            resolve_identifier("abc", &units, &commits),
            Resolution::Found(_)
        ));
        assert!(matches!(
            resolve_identifier("zzz", &units, &commits),
            Resolution::NotFound
        ));
    }

    #[test_case("abc12345", true ; "exact commit id")]
    #[test_case("abc", true ; "unique id prefix")]
    #[test_case("deadbeef", true ; "unique commit hash prefix")]
    #[test_case("zzz", false ; "no match at all")]
    fn resolution_chain_finds_or_misses(input: &str, expect_found: bool) {
        let commits = vec![commit("deadbeefdeadbeefdeadbeefdeadbeefdeadbeef", "first\n\nSpry-Commit-Id: abc12345\n")];
        let titles = HashMap::new();
        let units = detect_pr_units(&commits, &titles);

        match resolve_identifier(input, &units, &commits) {
            Resolution::Found(_) => assert!(expect_found, "{input} unexpectedly resolved"),
            Resolution::NotFound => assert!(!expect_found, "{input} unexpectedly failed to resolve"),
            Resolution::Ambiguous(candidates) => panic!("{input} unexpectedly ambiguous: {candidates:?}"),
        }
    }

    #[test]
    fn ambiguous_prefix_reports_every_candidate() {
        let commits = vec![
            commit("a", "first\n\nSpry-Commit-Id: ab-one\n"),
            commit("b", "second\n\nSpry-Commit-Id: ab-two\n"),
        ];
        let titles = HashMap::new();
        let units = detect_pr_units(&commits, &titles);

        assert_matches!(
            resolve_identifier("ab-", &units, &commits),
            Resolution::Ambiguous(candidates) if candidates.len() == 2
        );
    }

    #[test]
    fn group_title_is_looked_up_from_titles_map() {
        let commits = vec![
            commit("a", "first\n\nSpry-Group: g1\n"),
            commit("b", "second\n\nSpry-Group: g1\n"),
        ];
        let titles = hashmap! { "g1".to_owned() => "Refactor the parser".to_owned() };
        let units = detect_pr_units(&commits, &titles);

        assert_matches!(
            &units[0],
            ReviewUnit::Group(g) if g.title.as_deref() == Some("Refactor the parser")
        );
    }
}
