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

//! Rebasing a stack onto its trunk (§4.5.3).

use crate::context::EngineContext;
use crate::error::EngineError;
use crate::ops::Target;
use crate::ops::finalize_for_target;
use crate::ops::resolve_target;
use crate::ops::trunk_revision;
use crate::vcs::RebaseOutcome;
use crate::vcs::TraditionalRebaseOutcome;
use crate::vcs::rebase_plumbing;

pub struct RebaseReport {
    pub commit_count: usize,
    pub new_tip: String,
}

/// Rebases `branch` (or the current branch) onto `remote/defaultBranch`.
///
/// A conflict on the current branch falls back to a real working-copy
/// rebase so the user can resolve it in place with the ordinary
/// `rebase --continue`/`--abort` flow; a conflict on any other branch is
/// returned as-is, since nobody is sitting in that worktree to fix it.
pub fn rebase_onto_trunk(ctx: &EngineContext, branch: Option<&str>) -> Result<RebaseReport, EngineError> {
    let target = resolve_target(ctx.vcs(), branch)?;
    let span = tracing::info_span!("rebase_onto_trunk", branch = %target.branch);
    let _guard = span.enter();
    let result = rebase_onto_trunk_on_target(ctx, &target);
    match &result {
        Ok(report) => tracing::info!(
            commit_count = report.commit_count,
            new_tip = report.new_tip,
            "rebase_onto_trunk finished"
        ),
        Err(error) => tracing::info!(%error, "rebase_onto_trunk failed"),
    }
    result
}

fn rebase_onto_trunk_on_target(ctx: &EngineContext, target: &Target) -> Result<RebaseReport, EngineError> {
    let trunk = trunk_revision(ctx)?;
    let onto_sha = ctx.vcs().full_hash(&trunk)?;
    let merge_base = ctx.vcs().merge_base(&onto_sha, &target.branch)?;
    let commits = ctx.vcs().commit_range(&merge_base, &target.branch)?;

    if commits.is_empty() {
        return Ok(RebaseReport { commit_count: 0, new_tip: onto_sha });
    }

    let old_tip = commits.last().expect("checked non-empty above").hash.to_string();

    match rebase_plumbing(ctx.vcs(), &onto_sha, &commits)? {
        RebaseOutcome::Ok(result) => {
            finalize_for_target(ctx.vcs(), target, &old_tip, &result.new_tip)?;
            Ok(RebaseReport { commit_count: commits.len(), new_tip: result.new_tip })
        }
        RebaseOutcome::Conflict { conflict_commit, conflict_info } => {
            if !target.is_current {
                return Err(EngineError::Conflict {
                    commit_hash: conflict_commit.hash.to_string(),
                    commit_subject: conflict_commit.subject().to_owned(),
                    files: crate::ops::conflict_paths(&conflict_info),
                    detail: conflict_info,
                });
            }

            match ctx.vcs().traditional_rebase(&onto_sha)? {
                TraditionalRebaseOutcome::Ok => {
                    let new_tip = ctx
                        .vcs()
                        .current_branch()?
                        .ok_or(EngineError::DetachedHead)
                        .and_then(|b| ctx.vcs().full_hash(&b).map_err(EngineError::from))?;
                    Ok(RebaseReport { commit_count: commits.len(), new_tip })
                }
                TraditionalRebaseOutcome::Conflict { conflicting_files } => Err(EngineError::Conflict {
                    commit_hash: conflict_commit.hash.to_string(),
                    commit_subject: conflict_commit.subject().to_owned(),
                    files: conflicting_files,
                    detail: "resolve with `git status`, then `git rebase --continue` or `git rebase --abort`"
                        .to_owned(),
                }),
            }
        }
    }
}
