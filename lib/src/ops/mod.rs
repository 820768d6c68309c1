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

//! The stack engine proper (§4.5): the operations built on top of VCS
//! plumbing, the trailer codec, and the stack model.

pub mod branches;
pub mod conflict;
pub mod group;
pub mod inject;
pub mod rebase;
pub mod sync;

use crate::APP_NAME;
use crate::context::EngineContext;
use crate::error::EngineError;
use crate::vcs::GitContext;
use crate::vcs::Vcs;
use crate::vcs::WorktreeEntry;

/// Which branch an operation targets, resolved once up front so every
/// finalize path shares one notion of "is this the branch the user is
/// sitting on".
pub(crate) struct Target {
    pub branch: String,
    pub is_current: bool,
}

/// Resolves `branch` (or, if `None`, the current branch) and performs the
/// detached-HEAD check described in §4.5.2 step 1–2.
pub(crate) fn resolve_target(vcs: &Vcs, branch: Option<&str>) -> Result<Target, EngineError> {
    match branch {
        None => {
            let current = vcs.current_branch()?.ok_or(EngineError::DetachedHead)?;
            Ok(Target { branch: current, is_current: true })
        }
        Some(name) => {
            if let Some(worktree) = worktree_for_branch(vcs, name)? {
                let other = Vcs::new(GitContext::new(worktree.path.clone()));
                if other.is_head_detached()? {
                    return Err(EngineError::DetachedHead);
                }
            }
            let is_current = vcs.current_branch()?.as_deref() == Some(name);
            Ok(Target { branch: name.to_owned(), is_current })
        }
    }
}

/// The worktree entry, if any, that has `branch` checked out.
pub(crate) fn worktree_for_branch(vcs: &Vcs, branch: &str) -> Result<Option<WorktreeEntry>, crate::vcs::VcsError> {
    let target_ref = format!("refs/heads/{branch}");
    Ok(vcs
        .worktree_list()?
        .into_iter()
        .find(|w| w.branch_ref.as_deref() == Some(target_ref.as_str())))
}

/// Updates `refs/heads/<branch>` to `new_tip` and, per §4.5.2 step 6 / §9's
/// note that worktree resets must be enforced in one place, finalizes
/// exactly the right way for whichever of the three cases applies: the
/// current branch (hard-reset this worktree), another branch with no
/// worktree (ref update only), or another branch checked out elsewhere
/// (ref update plus a hard reset of that worktree).
pub(crate) fn finalize_for_target(
    vcs: &Vcs,
    target: &Target,
    old_tip: &str,
    new_tip: &str,
) -> Result<(), EngineError> {
    if target.is_current {
        crate::vcs::finalize_rewrite(vcs, &target.branch, old_tip, new_tip)?;
        return Ok(());
    }

    vcs.update_ref(&format!("refs/heads/{}", target.branch), new_tip, Some(old_tip))?;
    if let Some(worktree) = worktree_for_branch(vcs, &target.branch)? {
        let other = Vcs::new(GitContext::new(worktree.path));
        other.reset_to_commit(new_tip)?;
    }
    Ok(())
}

/// `remote/defaultBranch`, the trunk a stack rebases onto (§4.5.1, §6.5).
/// Falls back to auto-detecting the remote's default branch when
/// `<appname>.defaultBranch` isn't configured.
pub(crate) fn trunk_revision(ctx: &EngineContext) -> Result<String, EngineError> {
    let config = ctx.config()?;
    let branch = match &config.default_branch {
        Some(branch) => branch.clone(),
        None => ctx
            .vcs()
            .default_branch(&config.remote)?
            .ok_or_else(|| EngineError::ConfigMissing(format!("{APP_NAME}.defaultBranch")))?,
    };
    Ok(format!("{}/{branch}", config.remote))
}

/// Parses the `CONFLICT (<kind>): <reason> <path>` lines
/// [`crate::vcs::plumbing`] produces into a bare path list.
pub(crate) fn conflict_paths(conflict_info: &str) -> Vec<String> {
    conflict_info
        .lines()
        .filter_map(|line| line.strip_prefix("CONFLICT (")?.split_once(": "))
        .filter_map(|(_, rest)| rest.rsplit(' ').next().map(str::to_owned))
        .collect()
}
