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

//! Syncing every stack-owned branch onto trunk in one pass (§4.5.8).

use crate::context::EngineContext;
use crate::error::EngineError;
use crate::ops::branches::list_stack_local_branches;
use crate::ops::conflict::PredictOutcome;
use crate::ops::conflict::predict_rebase_conflicts;
use crate::ops::inject::inject_missing_ids;
use crate::ops::rebase::rebase_onto_trunk;
use crate::ops::trunk_revision;
use crate::refstore::GroupTitles;
use crate::stack::unit::parse_stack;

#[derive(Clone, Debug)]
pub struct Rebased {
    pub branch: String,
    pub commit_count: usize,
    pub ids_injected: usize,
}

#[derive(Clone, Debug)]
pub enum SkipReason {
    SplitGroup { group: String },
    Conflict { files: Vec<String> },
    UpToDate,
}

#[derive(Clone, Debug)]
pub struct Skipped {
    pub branch: String,
    pub reason: SkipReason,
}

#[derive(Default)]
pub struct SyncReport {
    pub rebased: Vec<Rebased>,
    pub skipped: Vec<Skipped>,
}

/// Rebases every stack-owned branch onto `remote/defaultBranch`, processing
/// branches in an order that finalizes the current branch last so a failure
/// partway through never leaves the user's own branch mid-rewrite.
pub fn sync_all(ctx: &EngineContext) -> Result<SyncReport, EngineError> {
    let current = ctx.vcs().current_branch()?;
    let span = tracing::info_span!("sync_all", current_branch = current.as_deref().unwrap_or("<detached>"));
    let _guard = span.enter();
    let result = sync_all_impl(ctx, current);
    match &result {
        Ok(report) => tracing::info!(
            rebased_count = report.rebased.len(),
            skipped_count = report.skipped.len(),
            "sync_all finished"
        ),
        Err(error) => tracing::info!(%error, "sync_all failed"),
    }
    result
}

fn sync_all_impl(ctx: &EngineContext, current: Option<String>) -> Result<SyncReport, EngineError> {
    let mut branches = list_stack_local_branches(ctx)?;
    branches.sort_by_key(|b| current.as_deref() == Some(b.name.as_str()));

    let trunk = trunk_revision(ctx)?;
    let trunk_sha = ctx.vcs().full_hash(&trunk)?;

    let mut report = SyncReport::default();

    for info in &branches {
        let merge_base = ctx.vcs().merge_base(&trunk_sha, &info.name)?;
        let commits = ctx.vcs().commit_range(&merge_base, &info.name)?;
        let titles = GroupTitles::read(ctx.vcs(), ctx.user())?;
        if let Err(split) = parse_stack(&commits, titles.as_map()) {
            report.skipped.push(Skipped {
                branch: info.name.clone(),
                reason: SkipReason::SplitGroup { group: split.group.to_string() },
            });
            continue;
        }

        let mut ids_injected = 0;
        if info.has_missing_ids {
            let result = inject_missing_ids(ctx, Some(&info.name))?;
            ids_injected = result.modified_count;
        }

        match predict_rebase_conflicts(ctx, Some(&info.name), None)? {
            PredictOutcome::Conflict { files, .. } => {
                report.skipped.push(Skipped { branch: info.name.clone(), reason: SkipReason::Conflict { files } });
                continue;
            }
            PredictOutcome::Clean { .. } => {}
        }

        let merge_base_after_inject = ctx.vcs().merge_base(&trunk_sha, &info.name)?;
        if merge_base_after_inject == trunk_sha {
            report.skipped.push(Skipped { branch: info.name.clone(), reason: SkipReason::UpToDate });
            continue;
        }

        let rebase_result = rebase_onto_trunk(ctx, Some(&info.name))?;
        report.rebased.push(Rebased {
            branch: info.name.clone(),
            commit_count: rebase_result.commit_count,
            ids_injected,
        });
    }

    Ok(report)
}
