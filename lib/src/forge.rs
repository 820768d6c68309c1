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

//! The forge-client contract (§6.3): the capability set a hosted-forge
//! (GitHub-style) code-review API must provide for the engine to drive
//! pull requests. Consumed only — no implementation lives in this crate;
//! callers inject one.

use thiserror::Error;

/// Any failure talking to the forge; the engine treats every call as
/// fallible, possibly blocking, and not automatically retryable.
#[derive(Debug, Error)]
#[error("forge request failed: {0}")]
pub struct ForgeError(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrState {
    Open,
    Closed,
    Merged,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChecksStatus {
    Passing,
    Failing,
    Pending,
    None,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReviewStatus {
    Approved,
    ChangesRequested,
    ReviewRequired,
    None,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommentStatus {
    pub total: u32,
    pub resolved: u32,
}

/// Fields needed to open a new pull request.
#[derive(Clone, Debug)]
pub struct NewPr<'a> {
    pub title: &'a str,
    pub head: &'a str,
    pub base: &'a str,
    pub body: &'a str,
    pub repo: Option<&'a str>,
}

/// The capability set the stack engine depends on from a hosted-forge
/// code-review API. Implementations are injected by the caller; this crate
/// only ever holds a `&dyn Forge`.
pub trait Forge {
    fn find_pr_by_branch(&self, branch: &str) -> Result<Option<u64>, ForgeError>;
    fn find_prs_by_branches(&self, branches: &[&str]) -> Result<Vec<Option<u64>>, ForgeError>;
    fn create_pr(&self, pr: NewPr<'_>) -> Result<u64, ForgeError>;
    fn retarget_pr(&self, number: u64, new_base: &str) -> Result<(), ForgeError>;
    fn update_pr_body(&self, number: u64, body: &str) -> Result<(), ForgeError>;
    fn close_pr(&self, number: u64, comment: Option<&str>) -> Result<(), ForgeError>;
    fn get_pr_state(&self, number: u64) -> Result<PrState, ForgeError>;
    fn get_pr_body(&self, number: u64) -> Result<String, ForgeError>;
    fn get_pr_base_branch(&self, number: u64) -> Result<String, ForgeError>;
    fn get_pr_checks_status(&self, number: u64, repo: Option<&str>) -> Result<ChecksStatus, ForgeError>;
    fn get_pr_review_status(&self, number: u64, repo: Option<&str>) -> Result<ReviewStatus, ForgeError>;
    fn get_pr_comment_status(&self, number: u64, repo: Option<&str>) -> Result<CommentStatus, ForgeError>;
}
