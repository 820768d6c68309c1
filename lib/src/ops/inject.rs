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

//! Inject missing `Spry-Commit-Id` trailers (§4.5.2).

use std::collections::HashMap;

use crate::commit::SPRY_COMMIT_ID;
use crate::context::EngineContext;
use crate::error::EngineError;
use crate::ops::Target;
use crate::ops::finalize_for_target;
use crate::ops::resolve_target;
use crate::ops::trunk_revision;
use crate::trailer;
use crate::vcs::rewrite_commit_chain;

pub struct InjectResult {
    pub modified_count: usize,
    pub rebase_performed: bool,
}

/// For every commit in `branch`'s stack (or the current branch's, if
/// `None`) that lacks a `Spry-Commit-Id` trailer, generates one and rewrites
/// the full chain so parent linkage — and, critically, the relative order
/// of `fixup!`/`amend!`/`squash!` commits — is preserved exactly.
pub fn inject_missing_ids(ctx: &EngineContext, branch: Option<&str>) -> Result<InjectResult, EngineError> {
    let target = resolve_target(ctx.vcs(), branch)?;
    let span = tracing::info_span!("inject_missing_ids", branch = %target.branch);
    let _guard = span.enter();
    let result = inject_missing_ids_on_target(ctx, &target);
    match &result {
        Ok(r) => tracing::info!(
            modified_count = r.modified_count,
            rebase_performed = r.rebase_performed,
            "inject_missing_ids finished"
        ),
        Err(error) => tracing::info!(%error, "inject_missing_ids failed"),
    }
    result
}

fn inject_missing_ids_on_target(ctx: &EngineContext, target: &Target) -> Result<InjectResult, EngineError> {
    let trunk = trunk_revision(ctx)?;
    let trunk_sha = ctx.vcs().full_hash(&trunk)?;
    let merge_base = ctx.vcs().merge_base(&trunk_sha, &target.branch)?;
    let commits = ctx.vcs().commit_range(&merge_base, &target.branch)?;

    if commits.is_empty() {
        return Ok(InjectResult { modified_count: 0, rebase_performed: false });
    }

    let mut rewrites = HashMap::new();
    for commit in &commits {
        if commit.trailers().commit_id().is_none() {
            let id = ctx.generate_commit_id();
            let message = trailer::add_trailers(&commit.body, &[(SPRY_COMMIT_ID, &id)]);
            rewrites.insert(commit.hash.to_string(), message);
        }
    }

    if rewrites.is_empty() {
        return Ok(InjectResult { modified_count: 0, rebase_performed: false });
    }

    let old_tip = commits.last().expect("checked non-empty above").hash.to_string();
    let modified_count = rewrites.len();
    let result = rewrite_commit_chain(ctx.vcs(), &commits, &rewrites)?;
    finalize_for_target(ctx.vcs(), target, &old_tip, &result.new_tip)?;

    Ok(InjectResult { modified_count, rebase_performed: true })
}
