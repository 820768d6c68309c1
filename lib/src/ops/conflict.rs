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

//! Conflict prediction (§4.5.4): read-only previews of a rebase or reorder,
//! with no effect on refs or the working directory.

use std::collections::BTreeSet;
use std::collections::HashMap;

use crate::context::EngineContext;
use crate::error::EngineError;
use crate::ops::conflict_paths;
use crate::ops::resolve_target;
use crate::ops::trunk_revision;
use crate::vcs::MergeOutcome;
use crate::vcs::RebaseOutcome;
use crate::vcs::Vcs;
use crate::vcs::VcsError;
use crate::vcs::rebase_plumbing;

/// Outcome of [`predict_rebase_conflicts`].
pub enum PredictOutcome {
    Clean { commit_count: usize, new_tip: String },
    Conflict { commit_hash: String, commit_subject: String, files: Vec<String> },
}

/// Runs the rebase plumbing against `onto` (or `remote/defaultBranch` when
/// `None`) without finalizing anything: no ref is updated and no working
/// directory is touched, though objects written along a successful prefix
/// remain as harmless orphans.
pub fn predict_rebase_conflicts(
    ctx: &EngineContext,
    branch: Option<&str>,
    onto: Option<&str>,
) -> Result<PredictOutcome, EngineError> {
    let target = resolve_target(ctx.vcs(), branch)?;
    tracing::debug!(branch = %target.branch, "predict_rebase_conflicts starting");
    let onto_sha = match onto {
        Some(onto) => ctx.vcs().full_hash(onto)?,
        None => ctx.vcs().full_hash(&trunk_revision(ctx)?)?,
    };
    let merge_base = ctx.vcs().merge_base(&onto_sha, &target.branch)?;
    let commits = ctx.vcs().commit_range(&merge_base, &target.branch)?;

    let outcome = match rebase_plumbing(ctx.vcs(), &onto_sha, &commits)? {
        RebaseOutcome::Ok(result) => {
            PredictOutcome::Clean { commit_count: commits.len(), new_tip: result.new_tip }
        }
        RebaseOutcome::Conflict { conflict_commit, conflict_info } => PredictOutcome::Conflict {
            commit_hash: conflict_commit.hash.to_string(),
            commit_subject: conflict_commit.subject().to_owned(),
            files: conflict_paths(&conflict_info),
        },
    };
    match &outcome {
        PredictOutcome::Clean { commit_count, .. } => {
            tracing::debug!(commit_count, "predict_rebase_conflicts: clean");
        }
        PredictOutcome::Conflict { commit_hash, .. } => {
            tracing::debug!(commit_hash, "predict_rebase_conflicts: conflict");
        }
    }
    Ok(outcome)
}

/// Files changed by `a` and by `b`, each versus its own first parent,
/// intersected.
pub fn check_file_overlap(vcs: &Vcs, a: &str, b: &str) -> Result<BTreeSet<String>, VcsError> {
    let files_a = vcs.commit_files(a)?;
    let files_b = vcs.commit_files(b)?;
    Ok(files_a.intersection(&files_b).cloned().collect())
}

/// One pairwise simulation result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimulateOutcome {
    Clean,
    /// The pair touches the same files but the three-way merge didn't
    /// actually conflict.
    Warning { files: BTreeSet<String> },
    Conflict { conflict_info: String },
}

/// `mergeTree(base, a, b)`, classified against whether `a` and `b` share any
/// changed files.
pub fn simulate_merge(vcs: &Vcs, base: &str, a: &str, b: &str) -> Result<SimulateOutcome, VcsError> {
    let overlap = check_file_overlap(vcs, a, b)?;
    if overlap.is_empty() {
        return Ok(SimulateOutcome::Clean);
    }
    match vcs.merge_tree(base, a, b)? {
        MergeOutcome::Ok { .. } => Ok(SimulateOutcome::Warning { files: overlap }),
        MergeOutcome::Conflict { conflict_info } => Ok(SimulateOutcome::Conflict { conflict_info }),
    }
}

/// For every pair `(a, b)` in `new_order` (`i < j`) whose relative order is
/// reversed compared to `current_order`, simulates their merge against
/// `base` and keeps whichever results are not [`SimulateOutcome::Clean`],
/// keyed `"a:b"`.
pub fn check_reorder_conflicts(
    vcs: &Vcs,
    current_order: &[String],
    new_order: &[String],
    base: &str,
) -> Result<HashMap<String, SimulateOutcome>, VcsError> {
    let current_index: HashMap<&str, usize> =
        current_order.iter().enumerate().map(|(i, h)| (h.as_str(), i)).collect();

    let mut results = HashMap::new();
    for (j, b) in new_order.iter().enumerate() {
        for a in &new_order[..j] {
            let (Some(&ia), Some(&ib)) = (current_index.get(a.as_str()), current_index.get(b.as_str())) else {
                continue;
            };
            if ia < ib {
                // Order agrees with `current_order`; reordering didn't touch this pair.
                continue;
            }
            let outcome = simulate_merge(vcs, base, a, b)?;
            if outcome != SimulateOutcome::Clean {
                results.insert(format!("{a}:{b}"), outcome);
            }
        }
    }
    Ok(results)
}
