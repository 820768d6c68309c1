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

//! Error taxonomy for the stack engine.
//!
//! Every variant carries enough context (ids, file names, branch names) for a
//! downstream formatter to print a one-screen, action-oriented message
//! without consulting any other state.

use thiserror::Error;

use crate::stack::unit::GroupId;
use crate::vcs::subprocess::VcsError;

/// Errors that can be returned from any stack-engine operation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The target branch has no HEAD checked out (or the invoking worktree
    /// is in detached-HEAD state) where a commit rewrite needs one.
    #[error(
        "The branch is not checked out anywhere with an attached HEAD; run `git checkout <branch>` \
         before retrying"
    )]
    DetachedHead,

    /// A current-branch operation that needs to reset the working copy
    /// found uncommitted changes in the way.
    #[error("The working copy has uncommitted changes; commit or discard them first")]
    DirtyWorkingTree,

    /// A three-way merge (or the traditional-rebase fallback) produced a
    /// conflict.
    #[error("Conflict while rebasing {commit_hash} ({commit_subject:?}): {detail}")]
    Conflict {
        commit_hash: String,
        commit_subject: String,
        /// Files touched by the conflicting hunks, if known.
        files: Vec<String>,
        detail: String,
    },

    /// [`crate::stack::unit::parse_stack`] found a group whose commits are
    /// not contiguous.
    #[error(
        "Group {group} was split apart by {} intervening commit(s); re-run with fix-stack to \
         repair it",
        interrupting_commits.len()
    )]
    SplitGroup {
        group: GroupId,
        interrupting_commits: Vec<String>,
    },

    /// [`crate::stack::unit::resolve_identifier`] found no match.
    #[error("No commit or unit matches '{input}'")]
    NotFound { input: String },

    /// [`crate::stack::unit::resolve_identifier`] found more than one match.
    #[error("'{input}' is ambiguous; it matches: {}", candidates.join(", "))]
    Ambiguous { input: String, candidates: Vec<String> },

    /// A user-supplied identifier failed format validation (§4.3).
    #[error("'{0}' is not a valid commit or unit reference")]
    InvalidRef(String),

    /// A PR title failed format validation (§4.3).
    #[error("PR title is invalid: {0}")]
    InvalidTitle(String),

    /// A branch name failed format validation (§4.3).
    #[error("'{0}' is not a valid branch name")]
    InvalidBranchName(String),

    /// [`crate::ops::group::apply_group_spec`] found commits that are not
    /// contiguous after reordering.
    #[error("Group \"{name}\" has non-contiguous commits")]
    NonContiguousGroup { name: String },

    /// An unresolvable reference inside a group/reorder spec.
    #[error("Unknown commit reference in group \"{name}\": {reference}")]
    UnknownGroupRef { name: String, reference: String },

    /// Required configuration is absent and has no default.
    #[error("Missing required configuration: {0}")]
    ConfigMissing(String),

    /// The installed VCS binary is too old or missing a required feature.
    #[error("Unsupported VCS version: {0}")]
    UnsupportedVcsVersion(String),

    /// Any failure from the underlying VCS plumbing layer; always fatal.
    #[error(transparent)]
    Vcs(#[from] VcsError),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Maps an error onto the exit codes of §6.6: `0` success, `1` anything
    /// else.
    pub fn exit_code(&self) -> i32 {
        1
    }
}
