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

//! The [`Commit`] record the rest of the engine operates on, and the
//! recognized trailer keys parsed out of its message.

use std::cmp::Ordering;
use std::hash::Hash;
use std::hash::Hasher;

use crate::hash::CommitHash;
use crate::trailer;

/// A point in time plus the offset of the identity's local clock, exactly as
/// the VCS store recorded it; the engine never normalizes this to UTC since
/// it must be preserved byte-for-byte across a rewrite.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timestamp {
    pub millis_since_epoch: i64,
    pub tz_offset_minutes: i32,
}

/// An author or committer identity: name, email, and the timestamp attached
/// to that identity's action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub timestamp: Timestamp,
}

/// An immutable record written by the VCS, as described in §3 of the stack
/// engine design: hash, parents, tree, subject/body, and both identities.
#[derive(Clone, Debug)]
pub struct Commit {
    pub hash: CommitHash,
    /// Empty for a root commit, one entry for a normal commit, two or more
    /// for a merge.
    pub parents: Vec<CommitHash>,
    pub tree: String,
    pub body: String,
    pub author: Signature,
    pub committer: Signature,
}

impl PartialEq for Commit {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Commit {}

impl Ord for Commit {
    fn cmp(&self, other: &Self) -> Ordering {
        self.hash.cmp(&other.hash)
    }
}

impl PartialOrd for Commit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for Commit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl Commit {
    /// The first line of [`Commit::body`].
    pub fn subject(&self) -> &str {
        self.body.lines().next().unwrap_or_default()
    }

    pub fn trailers(&self) -> CommitTrailers {
        CommitTrailers::parse(&self.body)
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() >= 2
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

/// The trailer keys the engine reads and writes, parsed out of a commit's
/// body. Legacy keys are accepted when resolving [`CommitTrailers::group`]
/// for backward compatibility, but the engine never writes them (see
/// DESIGN.md for the rationale).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitTrailers(trailer::CommitTrailers);

pub const SPRY_COMMIT_ID: &str = "Spry-Commit-Id";
pub const SPRY_GROUP: &str = "Spry-Group";

const LEGACY_GROUP_START: &str = "Spry-Group-Start";
const LEGACY_GROUP_TITLE: &str = "Spry-Group-Title";
const LEGACY_TASPR_GROUP: &str = "Taspr-Group";

impl CommitTrailers {
    pub fn parse(body: &str) -> Self {
        Self(trailer::parse_trailers(body))
    }

    /// The `Spry-Commit-Id` trailer, if present.
    pub fn commit_id(&self) -> Option<&str> {
        self.0.get(SPRY_COMMIT_ID)
    }

    /// The group this commit belongs to. Reads the current single-trailer
    /// encoding first; falls back to the legacy start/title markers so old
    /// stacks remain readable (never written, see §6.1 and the Open
    /// Questions in DESIGN.md).
    pub fn group(&self) -> Option<&str> {
        self.0
            .get(SPRY_GROUP)
            .or_else(|| self.0.get(LEGACY_GROUP_START))
            .or_else(|| self.0.get(LEGACY_TASPR_GROUP))
    }

    pub fn legacy_group_title(&self) -> Option<&str> {
        self.0.get(LEGACY_GROUP_TITLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(body: &str) -> Commit {
        Commit {
            hash: CommitHash::new("a".repeat(40)).unwrap(),
            parents: vec![],
            tree: "b".repeat(40),
            body: body.to_owned(),
            author: Signature {
                name: "Alice".into(),
                email: "alice@example.com".into(),
                timestamp: Timestamp {
                    millis_since_epoch: 0,
                    tz_offset_minutes: 0,
                },
            },
            committer: Signature {
                name: "Alice".into(),
                email: "alice@example.com".into(),
                timestamp: Timestamp {
                    millis_since_epoch: 0,
                    tz_offset_minutes: 0,
                },
            },
        }
    }

    #[test]
    fn subject_is_the_first_line() {
        let c = commit("first line\n\nrest of the body\n");
        assert_eq!(c.subject(), "first line");
    }

    #[test]
    fn trailers_expose_spry_commit_id() {
        let c = commit("subject\n\nSpry-Commit-Id: a1b2c3d4\n");
        assert_eq!(c.trailers().commit_id(), Some("a1b2c3d4"));
    }

    #[test]
    fn group_falls_back_to_legacy_start_marker() {
        let c = commit("subject\n\nSpry-Group-Start: g1\n");
        assert_eq!(c.trailers().group(), Some("g1"));
    }

    #[test]
    fn group_prefers_current_encoding_over_legacy() {
        let c = commit("subject\n\nSpry-Group-Start: old\nSpry-Group: new\n");
        assert_eq!(c.trailers().group(), Some("new"));
    }
}
