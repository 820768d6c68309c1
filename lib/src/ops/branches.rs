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

//! Enumerating stack-owned local branches (§4.5.7).

use std::path::Path;
use std::path::PathBuf;

use crate::context::EngineContext;
use crate::error::EngineError;
use crate::ops::trunk_revision;

#[derive(Clone, Debug)]
pub struct StackBranchInfo {
    pub name: String,
    pub tip_sha: String,
    pub commit_count: usize,
    pub in_worktree: bool,
    pub worktree_path: Option<PathBuf>,
    pub has_missing_ids: bool,
}

/// Every local branch distinct from the default branch whose range against
/// `remote/defaultBranch` is nonempty and carries at least one
/// `Spry-Commit-Id`.
pub fn list_stack_local_branches(ctx: &EngineContext) -> Result<Vec<StackBranchInfo>, EngineError> {
    tracing::debug!("list_stack_local_branches starting");
    let trunk = trunk_revision(ctx)?;
    let trunk_sha = ctx.vcs().full_hash(&trunk)?;
    let default_branch_name = trunk.rsplit('/').next().unwrap_or(&trunk).to_owned();

    let worktrees = ctx.vcs().worktree_list()?;
    let mut infos = Vec::new();

    for branch in ctx.vcs().list_local_branches()? {
        if branch == default_branch_name {
            continue;
        }

        let merge_base = ctx.vcs().merge_base(&trunk_sha, &branch)?;
        let commits = ctx.vcs().commit_range(&merge_base, &branch)?;
        if commits.is_empty() {
            continue;
        }
        let has_any_id = commits.iter().any(|c| c.trailers().commit_id().is_some());
        if !has_any_id {
            continue;
        }
        let has_missing_ids = commits.iter().any(|c| c.trailers().commit_id().is_none());

        let target_ref = format!("refs/heads/{branch}");
        let worktree = worktrees
            .iter()
            .find(|w| w.branch_ref.as_deref() == Some(target_ref.as_str()));

        infos.push(StackBranchInfo {
            name: branch.clone(),
            tip_sha: ctx.vcs().full_hash(&branch)?,
            commit_count: commits.len(),
            in_worktree: worktree.is_some(),
            worktree_path: worktree.map(|w| realpath(&w.path)),
            has_missing_ids,
        });
    }

    tracing::debug!(count = infos.len(), "list_stack_local_branches finished");
    Ok(infos)
}

/// Resolves symlinks so two paths naming the same worktree compare equal;
/// falls back to the given path unchanged if it can't be canonicalized
/// (e.g. the worktree was removed from disk but its registration lingers).
fn realpath(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_owned())
}
