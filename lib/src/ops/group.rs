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

//! Applying group/reorder specs, and the derived dissolve/merge-split/fix
//! operations built on top of the same pipeline (§4.5.5, §4.5.6).

use std::collections::HashMap;
use std::collections::HashSet;

use crate::commit::Commit;
use crate::commit::SPRY_GROUP;
use crate::context::EngineContext;
use crate::error::EngineError;
use crate::hash::CommitHash;
use crate::ops::Target;
use crate::ops::finalize_for_target;
use crate::ops::resolve_target;
use crate::ops::trunk_revision;
use crate::refstore::GroupTitles;
use crate::stack::unit::ReviewUnit;
use crate::stack::unit::parse_stack;
use crate::trailer;
use crate::vcs::rewrite_commit_chain;

/// One named group in a [`GroupSpec`]: the refs (§4.3) that belong to it.
#[derive(Clone, Debug)]
pub struct GroupSpecEntry {
    pub commits: Vec<String>,
    pub name: String,
}

/// The shape described in §4.5.5: an optional full reordering plus the
/// groups to carve out of it.
#[derive(Clone, Debug, Default)]
pub struct GroupSpec {
    pub order: Option<Vec<String>>,
    pub groups: Vec<GroupSpecEntry>,
}

pub struct ApplyGroupResult {
    pub modified_count: usize,
    /// Spec group name → the freshly generated [`crate::stack::unit::GroupId`]
    /// it was assigned.
    pub group_ids: HashMap<String, String>,
}

/// Resolves `reference` (full/short hash or `Spry-Commit-Id`, per §4.3)
/// against `commits`.
fn resolve_commit_ref(commits: &[Commit], reference: &str) -> Option<CommitHash> {
    if let Some(commit) = commits.iter().find(|c| c.trailers().commit_id() == Some(reference)) {
        return Some(commit.hash.clone());
    }
    let matches: Vec<&Commit> = commits.iter().filter(|c| c.hash.starts_with(reference)).collect();
    match matches.len() {
        1 => Some(matches[0].hash.clone()),
        _ => None,
    }
}

fn slugify(name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let trimmed = slug.trim_matches('-');
    if trimmed.is_empty() { "group".to_owned() } else { trimmed.to_owned() }
}

/// Applies `spec` to the stack of `branch` (or the current branch).
pub fn apply_group_spec(
    ctx: &EngineContext,
    branch: Option<&str>,
    spec: &GroupSpec,
) -> Result<ApplyGroupResult, EngineError> {
    let target = resolve_target(ctx.vcs(), branch)?;
    let span = tracing::info_span!(
        "apply_group_spec",
        branch = %target.branch,
        groups = spec.groups.len()
    );
    let _guard = span.enter();
    let result = apply_group_spec_on_target(ctx, &target, spec);
    match &result {
        Ok(r) => tracing::info!(
            modified_count = r.modified_count,
            groups_assigned = r.group_ids.len(),
            "apply_group_spec finished"
        ),
        Err(error) => tracing::info!(%error, "apply_group_spec failed"),
    }
    result
}

fn apply_group_spec_on_target(
    ctx: &EngineContext,
    target: &Target,
    spec: &GroupSpec,
) -> Result<ApplyGroupResult, EngineError> {
    let trunk = trunk_revision(ctx)?;
    let trunk_sha = ctx.vcs().full_hash(&trunk)?;
    let merge_base = ctx.vcs().merge_base(&trunk_sha, &target.branch)?;
    let commits = ctx.vcs().commit_range(&merge_base, &target.branch)?;

    let resolve = |name: &str, reference: &str| -> Result<CommitHash, EngineError> {
        resolve_commit_ref(&commits, reference).ok_or_else(|| EngineError::UnknownGroupRef {
            name: name.to_owned(),
            reference: reference.to_owned(),
        })
    };

    // Step 1-2: resolve the full reorder, falling back to the stack's
    // existing order for anything unmentioned.
    let new_order: Vec<CommitHash> = match &spec.order {
        Some(order) => {
            let mut ordered = Vec::new();
            let mut seen = HashSet::new();
            for reference in order {
                let hash = resolve("<order>", reference)?;
                seen.insert(hash.clone());
                ordered.push(hash);
            }
            for commit in &commits {
                if !seen.contains(&commit.hash) {
                    ordered.push(commit.hash.clone());
                }
            }
            ordered
        }
        None => commits.iter().map(|c| c.hash.clone()).collect(),
    };
    let position: HashMap<&CommitHash, usize> =
        new_order.iter().enumerate().map(|(i, h)| (h, i)).collect();

    // Step 1, 3: resolve each group's commits and check contiguity against
    // `new_order`.
    let mut assignment: HashMap<CommitHash, String> = HashMap::new();
    let mut group_ids = HashMap::new();
    for entry in &spec.groups {
        let new_group_id = format!("{}-{}", slugify(&entry.name), ctx.generate_commit_id());
        let mut indices = Vec::new();
        for reference in &entry.commits {
            let hash = resolve(&entry.name, reference)?;
            indices.push(position[&hash]);
            assignment.insert(hash, new_group_id.clone());
        }
        indices.sort_unstable();
        let contiguous = indices.windows(2).all(|w| w[1] == w[0] + 1);
        if !contiguous {
            return Err(EngineError::NonContiguousGroup { name: entry.name.clone() });
        }
        group_ids.insert(entry.name.clone(), new_group_id);
    }

    // Step 4: build the new message for every commit, in `new_order`.
    let by_hash: HashMap<&CommitHash, &Commit> = commits.iter().map(|c| (&c.hash, c)).collect();
    let reordered_commits: Vec<Commit> =
        new_order.iter().map(|h| by_hash[h].clone()).collect();

    let mut rewrites = HashMap::new();
    let mut modified_count = 0;
    for commit in &reordered_commits {
        let stripped = trailer::remove_trailers(&commit.body, &[SPRY_GROUP]);
        let new_body = match assignment.get(&commit.hash) {
            Some(group_id) => trailer::add_trailers(&stripped, &[(SPRY_GROUP, group_id)]),
            None => stripped,
        };
        if new_body != commit.body {
            modified_count += 1;
        }
        rewrites.insert(commit.hash.to_string(), new_body);
    }

    let old_tip = commits.last().map(|c| c.hash.to_string()).unwrap_or_default();
    let result = rewrite_commit_chain(ctx.vcs(), &reordered_commits, &rewrites)?;
    finalize_for_target(ctx.vcs(), target, &old_tip, &result.new_tip)?;

    // Step 6: persist the new titles and drop any group id no longer used.
    let final_commits = ctx.vcs().commit_range(&merge_base, &target.branch)?;
    let mut titles = GroupTitles::read(ctx.vcs(), ctx.user())?;
    for (name, group_id) in &group_ids {
        titles.set(group_id.clone(), name.clone());
    }
    let live_ids: HashSet<String> = parse_stack(&final_commits, titles.as_map())
        .unwrap_or_default()
        .iter()
        .filter_map(|u| match u {
            ReviewUnit::Group(g) => Some(g.id.as_str().to_owned()),
            ReviewUnit::Single(_) => None,
        })
        .collect();
    titles.purge_orphaned(&live_ids);
    titles.write(ctx.vcs(), ctx.user())?;

    Ok(ApplyGroupResult { modified_count, group_ids })
}

pub struct DissolveResult {
    pub modified_count: usize,
}

/// Strips `Spry-Group: <group_id>` (and the legacy `Spry-Group-Title`) from
/// every commit carrying it. A no-op, not an error, if the id isn't present.
pub fn dissolve_group(ctx: &EngineContext, branch: Option<&str>, group_id: &str) -> Result<DissolveResult, EngineError> {
    let target = resolve_target(ctx.vcs(), branch)?;
    let span = tracing::info_span!("dissolve_group", branch = %target.branch, group_id);
    let _guard = span.enter();
    let result = dissolve_group_on_target(ctx, &target, group_id);
    match &result {
        Ok(r) => tracing::info!(modified_count = r.modified_count, "dissolve_group finished"),
        Err(error) => tracing::info!(%error, "dissolve_group failed"),
    }
    result
}

fn dissolve_group_on_target(ctx: &EngineContext, target: &Target, group_id: &str) -> Result<DissolveResult, EngineError> {
    let trunk = trunk_revision(ctx)?;
    let trunk_sha = ctx.vcs().full_hash(&trunk)?;
    let merge_base = ctx.vcs().merge_base(&trunk_sha, &target.branch)?;
    let commits = ctx.vcs().commit_range(&merge_base, &target.branch)?;

    let mut rewrites = HashMap::new();
    for commit in &commits {
        if commit.trailers().group() == Some(group_id) {
            let new_body = trailer::remove_trailers(&commit.body, &[SPRY_GROUP, "Spry-Group-Title"]);
            rewrites.insert(commit.hash.to_string(), new_body);
        }
    }

    if rewrites.is_empty() {
        return Ok(DissolveResult { modified_count: 0 });
    }

    let old_tip = commits.last().expect("non-empty: a matching commit was found").hash.to_string();
    let modified_count = rewrites.len();
    let result = rewrite_commit_chain(ctx.vcs(), &commits, &rewrites)?;
    finalize_for_target(ctx.vcs(), target, &old_tip, &result.new_tip)?;

    let final_commits = ctx.vcs().commit_range(&merge_base, &target.branch)?;
    let mut titles = GroupTitles::read(ctx.vcs(), ctx.user())?;
    let live_ids: HashSet<String> = parse_stack(&final_commits, titles.as_map())
        .unwrap_or_default()
        .iter()
        .filter_map(|u| match u {
            ReviewUnit::Group(g) => Some(g.id.as_str().to_owned()),
            ReviewUnit::Single(_) => None,
        })
        .collect();
    titles.purge_orphaned(&live_ids);
    titles.write(ctx.vcs(), ctx.user())?;

    Ok(DissolveResult { modified_count })
}

/// Reorders the stack so every commit carrying `Spry-Group: <group_id>`
/// becomes contiguous (the first one keeps its position; interrupting
/// commits move after the last group commit), then re-applies it through
/// [`apply_group_spec`] with the recorded title, falling back to the first
/// group commit's subject when no title was ever set.
pub fn merge_split_group(ctx: &EngineContext, branch: Option<&str>, group_id: &str) -> Result<ApplyGroupResult, EngineError> {
    let target = resolve_target(ctx.vcs(), branch)?;
    let span = tracing::info_span!("merge_split_group", branch = %target.branch, group_id);
    let _guard = span.enter();
    let result = merge_split_group_on_target(ctx, branch, &target, group_id);
    match &result {
        Ok(r) => tracing::info!(modified_count = r.modified_count, "merge_split_group finished"),
        Err(error) => tracing::info!(%error, "merge_split_group failed"),
    }
    result
}

fn merge_split_group_on_target(
    ctx: &EngineContext,
    branch: Option<&str>,
    target: &Target,
    group_id: &str,
) -> Result<ApplyGroupResult, EngineError> {
    let trunk = trunk_revision(ctx)?;
    let trunk_sha = ctx.vcs().full_hash(&trunk)?;
    let merge_base = ctx.vcs().merge_base(&trunk_sha, &target.branch)?;
    let commits = ctx.vcs().commit_range(&merge_base, &target.branch)?;

    let group_commits: Vec<&Commit> = commits.iter().filter(|c| c.trailers().group() == Some(group_id)).collect();
    let Some(first) = group_commits.first() else {
        return apply_group_spec(ctx, branch, &GroupSpec::default());
    };
    let first_index = commits.iter().position(|c| c.hash == first.hash).expect("found above");

    let mut order: Vec<String> = Vec::new();
    order.extend(commits[..first_index].iter().map(|c| c.hash.to_string()));
    order.extend(group_commits.iter().map(|c| c.hash.to_string()));
    order.extend(
        commits[first_index..]
            .iter()
            .filter(|c| c.trailers().group() != Some(group_id))
            .map(|c| c.hash.to_string()),
    );

    let titles = GroupTitles::read(ctx.vcs(), ctx.user())?;
    let name = titles
        .get(group_id)
        .map(str::to_owned)
        .unwrap_or_else(|| first.subject().to_owned());

    let spec = GroupSpec {
        order: Some(order),
        groups: vec![GroupSpecEntry {
            commits: group_commits.iter().map(|c| c.hash.to_string()).collect(),
            name,
        }],
    };
    apply_group_spec(ctx, branch, &spec)
}

/// Adds a single commit to `group_id`, recording `title` (§4.5.6).
pub fn add_group_trailers(
    ctx: &EngineContext,
    branch: Option<&str>,
    commit_ref: &str,
    group_id: &str,
    title: &str,
) -> Result<(), EngineError> {
    let target = resolve_target(ctx.vcs(), branch)?;
    let span = tracing::info_span!("add_group_trailers", branch = %target.branch, group_id, commit_ref);
    let _guard = span.enter();
    let result = add_group_trailers_on_target(ctx, &target, commit_ref, group_id, title);
    match &result {
        Ok(()) => tracing::info!("add_group_trailers finished"),
        Err(error) => tracing::info!(%error, "add_group_trailers failed"),
    }
    result
}

fn add_group_trailers_on_target(
    ctx: &EngineContext,
    target: &Target,
    commit_ref: &str,
    group_id: &str,
    title: &str,
) -> Result<(), EngineError> {
    let trunk = trunk_revision(ctx)?;
    let trunk_sha = ctx.vcs().full_hash(&trunk)?;
    let merge_base = ctx.vcs().merge_base(&trunk_sha, &target.branch)?;
    let commits = ctx.vcs().commit_range(&merge_base, &target.branch)?;

    let hash = resolve_commit_ref(&commits, commit_ref).ok_or_else(|| EngineError::NotFound {
        input: commit_ref.to_owned(),
    })?;
    let old_tip = commits.last().expect("resolved a commit above").hash.to_string();

    let mut rewrites = HashMap::new();
    for commit in &commits {
        if commit.hash == hash {
            let new_body = trailer::add_trailers(&commit.body, &[(SPRY_GROUP, group_id)]);
            rewrites.insert(commit.hash.to_string(), new_body);
        }
    }
    let result = rewrite_commit_chain(ctx.vcs(), &commits, &rewrites)?;
    finalize_for_target(ctx.vcs(), target, &old_tip, &result.new_tip)?;

    let mut titles = GroupTitles::read(ctx.vcs(), ctx.user())?;
    titles.set(group_id, title);
    titles.write(ctx.vcs(), ctx.user())?;
    Ok(())
}

/// Inverse of [`add_group_trailers`]: strips `Spry-Group` from one commit.
pub fn remove_group_trailers(ctx: &EngineContext, branch: Option<&str>, commit_ref: &str) -> Result<(), EngineError> {
    let target = resolve_target(ctx.vcs(), branch)?;
    let span = tracing::info_span!("remove_group_trailers", branch = %target.branch, commit_ref);
    let _guard = span.enter();
    let result = remove_group_trailers_on_target(ctx, &target, commit_ref);
    match &result {
        Ok(()) => tracing::info!("remove_group_trailers finished"),
        Err(error) => tracing::info!(%error, "remove_group_trailers failed"),
    }
    result
}

fn remove_group_trailers_on_target(ctx: &EngineContext, target: &Target, commit_ref: &str) -> Result<(), EngineError> {
    let trunk = trunk_revision(ctx)?;
    let trunk_sha = ctx.vcs().full_hash(&trunk)?;
    let merge_base = ctx.vcs().merge_base(&trunk_sha, &target.branch)?;
    let commits = ctx.vcs().commit_range(&merge_base, &target.branch)?;

    let hash = resolve_commit_ref(&commits, commit_ref).ok_or_else(|| EngineError::NotFound {
        input: commit_ref.to_owned(),
    })?;
    let old_tip = commits.last().expect("resolved a commit above").hash.to_string();

    let mut rewrites = HashMap::new();
    for commit in &commits {
        if commit.hash == hash {
            rewrites.insert(commit.hash.to_string(), trailer::remove_trailers(&commit.body, &[SPRY_GROUP]));
        }
    }
    let result = rewrite_commit_chain(ctx.vcs(), &commits, &rewrites)?;
    finalize_for_target(ctx.vcs(), target, &old_tip, &result.new_tip)?;
    Ok(())
}

/// How [`fix_stack`] repairs a split group: the non-interactive default
/// dissolves it, `MergeSplit` reassembles it instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FixMode {
    Dissolve,
    MergeSplit,
}

pub enum FixOutcome {
    /// The stack already parses cleanly; nothing to do.
    AlreadyValid,
    Dissolved(DissolveResult),
    MergeSplit(ApplyGroupResult),
}

/// Auto-repairs a split group. Idempotent: re-running after a fix finds a
/// valid stack and returns [`FixOutcome::AlreadyValid`].
pub fn fix_stack(ctx: &EngineContext, branch: Option<&str>, mode: FixMode) -> Result<FixOutcome, EngineError> {
    let target = resolve_target(ctx.vcs(), branch)?;
    let span = tracing::info_span!("fix_stack", branch = %target.branch, mode = ?mode);
    let _guard = span.enter();
    let result = fix_stack_on_target(ctx, branch, &target, mode);
    match &result {
        Ok(FixOutcome::AlreadyValid) => tracing::info!(outcome = "already_valid", "fix_stack finished"),
        Ok(FixOutcome::Dissolved(_)) => tracing::info!(outcome = "dissolved", "fix_stack finished"),
        Ok(FixOutcome::MergeSplit(_)) => tracing::info!(outcome = "merge_split", "fix_stack finished"),
        Err(error) => tracing::info!(%error, "fix_stack failed"),
    }
    result
}

fn fix_stack_on_target(
    ctx: &EngineContext,
    branch: Option<&str>,
    target: &Target,
    mode: FixMode,
) -> Result<FixOutcome, EngineError> {
    let trunk = trunk_revision(ctx)?;
    let trunk_sha = ctx.vcs().full_hash(&trunk)?;
    let merge_base = ctx.vcs().merge_base(&trunk_sha, &target.branch)?;
    let commits = ctx.vcs().commit_range(&merge_base, &target.branch)?;

    let titles = GroupTitles::read(ctx.vcs(), ctx.user())?;
    let split = match parse_stack(&commits, titles.as_map()) {
        Ok(_) => return Ok(FixOutcome::AlreadyValid),
        Err(split) => split,
    };

    match mode {
        FixMode::Dissolve => {
            dissolve_group(ctx, branch, split.group.as_str()).map(FixOutcome::Dissolved)
        }
        FixMode::MergeSplit => {
            merge_split_group(ctx, branch, split.group.as_str()).map(FixOutcome::MergeSplit)
        }
    }
}
