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

//! Typed wrappers over object-level Git operations (§4.1).
//!
//! Every operation here is plumbing: it reads or writes objects and refs,
//! and never touches a working directory except [`Vcs::reset_to_commit`].

use std::collections::BTreeSet;
use std::collections::HashMap;

use bstr::ByteSlice as _;

use crate::commit::Commit;
use crate::commit::Signature;
use crate::commit::Timestamp;
use crate::hash::CommitHash;
use crate::vcs::subprocess::GitContext;
use crate::vcs::subprocess::VcsError;
use crate::vcs::subprocess::stdout_string;

/// Result of a three-way merge into a tree object (§4.1).
pub enum MergeOutcome {
    Ok { tree: String },
    Conflict { conflict_info: String },
}

/// Outcome of [`Vcs::traditional_rebase`].
pub enum TraditionalRebaseOutcome {
    Ok,
    Conflict { conflicting_files: Vec<String> },
}

/// A Git worktree as reported by `git worktree list --porcelain` (§4.5.7).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorktreeEntry {
    pub path: std::path::PathBuf,
    pub branch_ref: Option<String>,
    pub head: String,
    pub is_main: bool,
}

pub struct Vcs {
    ctx: GitContext,
}

impl Vcs {
    pub fn new(ctx: GitContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &GitContext {
        &self.ctx
    }

    /// `getTree(commit) → hash`
    pub fn get_tree(&self, commit: &str) -> Result<String, VcsError> {
        let out = self.ctx.run(&["rev-parse", "--verify", &format!("{commit}^{{tree}}")])?;
        Ok(stdout_string(out)?.trim().to_owned())
    }

    /// `getParent(commit) → hash` (empty string for a root commit)
    pub fn get_parent(&self, commit: &str) -> Result<Option<String>, VcsError> {
        Ok(self.get_parents(commit)?.into_iter().next())
    }

    /// `getParents(commit) → hash[]` (empty for root, ≥2 for a merge). A
    /// root commit's `^@` prints nothing and still exits 0.
    pub fn get_parents(&self, commit: &str) -> Result<Vec<String>, VcsError> {
        let out = self.ctx.run(&["rev-parse", &format!("{commit}^@")])?;
        Ok(stdout_string(out)?
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_owned)
            .collect())
    }

    /// `getAuthorAndCommitterEnv(commit) → {authorName,email,date,
    /// committerName,email,date}`
    pub fn get_identity_env(&self, commit: &str) -> Result<(Signature, Signature), VcsError> {
        let format = "%an%x00%ae%x00%at%x00%aZ%x00%cn%x00%ce%x00%ct%x00%cZ";
        let out = self
            .ctx
            .run(&["show", "-s", &format!("--format={format}"), commit])?;
        let text = stdout_string(out)?;
        let fields: Vec<&str> = text.trim_end().split('\x00').collect();
        let [an, ae, at, az, cn, ce, ct, cz] = fields[..] else {
            return Err(VcsError::UnparsableOutput {
                subcommand: "show".to_owned(),
                reason: format!("expected 8 fields, got {}", fields.len()),
            });
        };
        Ok((
            Signature {
                name: an.to_owned(),
                email: ae.to_owned(),
                timestamp: parse_timestamp(at, az)?,
            },
            Signature {
                name: cn.to_owned(),
                email: ce.to_owned(),
                timestamp: parse_timestamp(ct, cz)?,
            },
        ))
    }

    /// Loads the full [`Commit`] record for `hash`.
    pub fn load_commit(&self, hash: &str) -> Result<Commit, VcsError> {
        let full_hash = self.full_hash(hash)?;
        let tree = self.get_tree(&full_hash)?;
        let parents = self.get_parents(&full_hash)?;
        let body_bytes = self.ctx.run(&["show", "-s", "--format=%B", &full_hash])?;
        let body = stdout_string(body_bytes)?;
        let (author, committer) = self.get_identity_env(&full_hash)?;
        Ok(Commit {
            hash: CommitHash::new(full_hash.clone()).ok_or_else(|| VcsError::UnparsableOutput {
                subcommand: "rev-parse".to_owned(),
                reason: format!("'{full_hash}' is not a 40-character hash"),
            })?,
            parents: parents
                .into_iter()
                .map(|p| {
                    CommitHash::new(p.clone()).ok_or_else(|| VcsError::UnparsableOutput {
                        subcommand: "rev-parse".to_owned(),
                        reason: format!("'{p}' is not a 40-character hash"),
                    })
                })
                .collect::<Result<_, _>>()?,
            tree,
            body,
            author,
            committer,
        })
    }

    pub fn full_hash(&self, rev: &str) -> Result<String, VcsError> {
        let out = self.ctx.run(&["rev-parse", "--verify", rev])?;
        Ok(stdout_string(out)?.trim().to_owned())
    }

    /// The stack of `branch`: `mergeBase(branch, trunkRef)..branch`,
    /// oldest-first (§4.5.1).
    pub fn commit_range(&self, merge_base: &str, branch: &str) -> Result<Vec<Commit>, VcsError> {
        let out = self.ctx.run(&[
            "rev-list",
            "--reverse",
            &format!("{merge_base}..{branch}"),
        ])?;
        stdout_string(out)?
            .lines()
            .filter(|l| !l.is_empty())
            .map(|hash| self.load_commit(hash))
            .collect()
    }

    pub fn merge_base(&self, a: &str, b: &str) -> Result<String, VcsError> {
        let out = self.ctx.run(&["merge-base", a, b])?;
        Ok(stdout_string(out)?.trim().to_owned())
    }

    /// `createCommit(tree, parents[], message, identityEnv) → hash`. Never
    /// updates a ref.
    pub fn create_commit(
        &self,
        tree: &str,
        parents: &[&str],
        message: &str,
        author: &Signature,
        committer: &Signature,
    ) -> Result<String, VcsError> {
        let mut args = vec!["commit-tree", tree];
        for parent in parents {
            args.push("-p");
            args.push(parent);
        }
        let env = [
            ("GIT_AUTHOR_NAME", author.name.as_str()),
            ("GIT_AUTHOR_EMAIL", author.email.as_str()),
            ("GIT_AUTHOR_DATE", &format_git_date(&author.timestamp)),
            ("GIT_COMMITTER_NAME", committer.name.as_str()),
            ("GIT_COMMITTER_EMAIL", committer.email.as_str()),
            ("GIT_COMMITTER_DATE", &format_git_date(&committer.timestamp)),
        ];
        let out = self.ctx.run_with_env(&args, &env, message.as_bytes())?;
        Ok(stdout_string(out)?.trim().to_owned())
    }

    /// `mergeTree(base, ours, theirs) → {ok,tree} | {ok:false,
    /// conflictInfo}`. Merges into a tree object only; no working directory
    /// is touched.
    ///
    /// Built from `read-tree -m` plus `write-tree` against a scratch index
    /// rather than `merge-tree --merge-base=`, which a number of Git
    /// versions in the wild still don't carry; `read-tree -m`'s three-tree
    /// form has taken an explicit base since Git's earliest days. A
    /// conflicting merge leaves unmerged stages in the scratch index, which
    /// `write-tree` refuses to flatten; `ls-files --unmerged` against it
    /// then lists exactly the conflicting paths.
    pub fn merge_tree(&self, base: &str, ours: &str, theirs: &str) -> Result<MergeOutcome, VcsError> {
        let index_path = self.scratch_index_path()?;
        let result = self.merge_tree_with_index(&index_path, base, ours, theirs);
        let _ = std::fs::remove_file(&index_path);
        result
    }

    /// A private index file alongside the real one, inside the git
    /// directory that actually belongs to this worktree (`--absolute-git-dir`,
    /// not a bare `.git` join: in a linked worktree `.git` is a file, not a
    /// directory).
    fn scratch_index_path(&self) -> Result<std::path::PathBuf, VcsError> {
        let out = self.ctx.run(&["rev-parse", "--absolute-git-dir"])?;
        let git_dir = stdout_string(out)?.trim().to_owned();
        let unique = rand::random::<u64>();
        Ok(std::path::PathBuf::from(git_dir).join(format!("spry-merge-{unique:016x}.index")))
    }

    fn merge_tree_with_index(
        &self,
        index_path: &std::path::Path,
        base: &str,
        ours: &str,
        theirs: &str,
    ) -> Result<MergeOutcome, VcsError> {
        let index_env = index_path.to_string_lossy().into_owned();
        let read_tree = self.ctx.run_with_env(
            &["read-tree", "-m", base, ours, theirs],
            &[("GIT_INDEX_FILE", index_env.as_str())],
            &[],
        );
        if let Err(e) = read_tree {
            return Err(e);
        }

        let write_tree = self.ctx.run_with_env(
            &["write-tree"],
            &[("GIT_INDEX_FILE", index_env.as_str())],
            &[],
        );
        match write_tree {
            Ok(bytes) => Ok(MergeOutcome::Ok {
                tree: stdout_string(bytes)?.trim().to_owned(),
            }),
            Err(VcsError::Failed { .. }) => {
                let unmerged = self.ctx.run_with_env(
                    &["ls-files", "--unmerged"],
                    &[("GIT_INDEX_FILE", index_env.as_str())],
                    &[],
                );
                let conflict_info = match unmerged {
                    Ok(bytes) => describe_conflicting_paths(&stdout_string(bytes)?),
                    Err(_) => "content conflict".to_owned(),
                };
                Ok(MergeOutcome::Conflict { conflict_info })
            }
            Err(e) => Err(e),
        }
    }

    /// `updateRef(ref, newSha, expectedOldSha?) → unit`. Compare-and-swap
    /// when `expected_old_sha` is given.
    pub fn update_ref(
        &self,
        reference: &str,
        new_sha: &str,
        expected_old_sha: Option<&str>,
    ) -> Result<(), VcsError> {
        let mut args = vec!["update-ref", reference, new_sha];
        if let Some(old) = expected_old_sha {
            args.push(old);
        }
        self.ctx.run(&args)?;
        Ok(())
    }

    pub fn delete_ref(&self, reference: &str) -> Result<(), VcsError> {
        match self.ctx.run(&["update-ref", "-d", reference]) {
            Ok(_) => Ok(()),
            Err(VcsError::Failed { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// `resetToCommit(commit)` — hard-reset the working directory of the
    /// invoking worktree.
    pub fn reset_to_commit(&self, commit: &str) -> Result<(), VcsError> {
        self.ctx.run(&["reset", "--hard", commit])?;
        Ok(())
    }

    pub fn is_working_tree_dirty(&self) -> Result<bool, VcsError> {
        let out = self.ctx.run(&["status", "--porcelain"])?;
        Ok(!stdout_string(out)?.trim().is_empty())
    }

    pub fn is_head_detached(&self) -> Result<bool, VcsError> {
        let out = self.ctx.run(&["symbolic-ref", "-q", "HEAD"]);
        Ok(out.is_err())
    }

    pub fn current_branch(&self) -> Result<Option<String>, VcsError> {
        let out = self.ctx.run(&["symbolic-ref", "-q", "--short", "HEAD"]);
        match out {
            Ok(bytes) => Ok(Some(stdout_string(bytes)?.trim().to_owned())),
            Err(_) => Ok(None),
        }
    }

    /// Files changed by `commit` versus its first parent.
    pub fn commit_files(&self, commit: &str) -> Result<BTreeSet<String>, VcsError> {
        let out = self
            .ctx
            .run(&["diff-tree", "--no-commit-id", "--name-only", "-r", commit])?;
        Ok(stdout_string(out)?
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_owned)
            .collect())
    }

    /// Every local branch name, in Git's own ref-storage order.
    pub fn list_local_branches(&self) -> Result<Vec<String>, VcsError> {
        let out = self
            .ctx
            .run(&["for-each-ref", "--format=%(refname:short)", "refs/heads/"])?;
        Ok(stdout_string(out)?
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_owned)
            .collect())
    }

    pub fn worktree_list(&self) -> Result<Vec<WorktreeEntry>, VcsError> {
        let out = self.ctx.run(&["worktree", "list", "--porcelain"])?;
        parse_worktree_porcelain(&stdout_string(out)?)
    }

    /// Replicate a private ref to/from `origin` with `+ref:ref`; missing
    /// refs are not an error (§4.4).
    pub fn push_ref(&self, remote: &str, reference: &str) -> Result<(), VcsError> {
        match self
            .ctx
            .run(&["push", remote, &format!("+{reference}:{reference}")])
        {
            Ok(_) => Ok(()),
            Err(VcsError::Failed { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub fn fetch_ref(&self, remote: &str, reference: &str) -> Result<(), VcsError> {
        match self
            .ctx
            .run(&["fetch", remote, &format!("+{reference}:{reference}")])
        {
            Ok(_) => Ok(()),
            Err(VcsError::Failed { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// `catFile(ref)` — the blob content of `ref`, or `None` if the ref is
    /// absent.
    pub fn cat_ref_blob(&self, reference: &str) -> Result<Option<Vec<u8>>, VcsError> {
        match self.ctx.run(&["cat-file", "blob", reference]) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(VcsError::Failed { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// `hashObject -w --stdin` then `updateRef`.
    pub fn write_ref_blob(&self, reference: &str, content: &[u8]) -> Result<(), VcsError> {
        let out = self
            .ctx
            .run_with_stdin(&["hash-object", "-w", "--stdin"], content)?;
        let blob_hash = stdout_string(out)?.trim().to_owned();
        self.update_ref(reference, &blob_hash, None)
    }

    /// `git config --get <key>`, `None` if the key is unset.
    pub fn config_get(&self, key: &str) -> Result<Option<String>, VcsError> {
        match self.ctx.run(&["config", "--get", key]) {
            Ok(bytes) => Ok(Some(stdout_string(bytes)?.trim().to_owned())),
            Err(VcsError::Failed { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Falls back to a real working-tree rebase (`git rebase`) when plumbing
    /// rebase hits a conflict on the branch the caller is actually sitting
    /// on, so the user lands in the familiar conflict-resolution flow
    /// (`git status`, `git rebase --continue`/`--abort`) rather than a
    /// half-rewritten stack with no working directory to fix it in.
    /// Deliberately does not abort on failure: the point is to hand control
    /// back to the user mid-rebase.
    pub fn traditional_rebase(&self, onto: &str) -> Result<TraditionalRebaseOutcome, VcsError> {
        let output = self.ctx.run_allow_failure(&["rebase", "--no-autosquash", onto])?;
        if output.status.success() {
            return Ok(TraditionalRebaseOutcome::Ok);
        }
        let status = self.ctx.run(&["status", "--porcelain"])?;
        let conflicting = parse_conflicting_paths(&stdout_string(status)?);
        Ok(TraditionalRebaseOutcome::Conflict { conflicting_files: conflicting })
    }

    /// §6.5: read `refs/remotes/<remote>/HEAD`, falling back to querying the
    /// remote directly.
    pub fn default_branch(&self, remote: &str) -> Result<Option<String>, VcsError> {
        let local = self
            .ctx
            .run(&["symbolic-ref", "-q", &format!("refs/remotes/{remote}/HEAD")]);
        if let Ok(bytes) = local {
            let text = stdout_string(bytes)?;
            let prefix = format!("refs/remotes/{remote}/");
            if let Some(name) = text.trim().strip_prefix(&prefix) {
                return Ok(Some(name.to_owned()));
            }
        }
        let remote_head = self.ctx.run(&["ls-remote", "--symref", remote, "HEAD"]);
        match remote_head {
            Ok(bytes) => Ok(parse_remote_head(&stdout_string(bytes)?)),
            Err(_) => Ok(None),
        }
    }
}

fn parse_timestamp(epoch_seconds: &str, tz: &str) -> Result<Timestamp, VcsError> {
    let secs: i64 = epoch_seconds
        .parse()
        .map_err(|_| VcsError::UnparsableOutput {
            subcommand: "show".to_owned(),
            reason: format!("'{epoch_seconds}' is not a valid timestamp"),
        })?;
    Ok(Timestamp {
        millis_since_epoch: secs * 1000,
        tz_offset_minutes: parse_git_tz_offset(tz),
    })
}

/// Parses a `+HHMM`/`-HHMM` Git timezone offset into minutes.
fn parse_git_tz_offset(tz: &str) -> i32 {
    let (sign, digits) = match tz.as_bytes().first() {
        Some(b'-') => (-1, &tz[1..]),
        Some(b'+') => (1, &tz[1..]),
        _ => (1, tz),
    };
    if digits.len() != 4 {
        return 0;
    }
    let hours: i32 = digits[0..2].parse().unwrap_or(0);
    let minutes: i32 = digits[2..4].parse().unwrap_or(0);
    sign * (hours * 60 + minutes)
}

fn format_git_date(ts: &Timestamp) -> String {
    let sign = if ts.tz_offset_minutes < 0 { '-' } else { '+' };
    let abs = ts.tz_offset_minutes.abs();
    format!(
        "{} {}{:02}{:02}",
        ts.millis_since_epoch / 1000,
        sign,
        abs / 60,
        abs % 60
    )
}

/// Classifies a conflict from the set of index stages present for a path
/// (1 = common ancestor, 2 = ours, 3 = theirs), per §4.1's conflict-kind
/// vocabulary.
fn classify_conflict_kind(stages: &BTreeSet<u8>) -> (&'static str, &'static str) {
    match (stages.contains(&1), stages.contains(&2), stages.contains(&3)) {
        (true, true, true) => ("content", "both sides modified"),
        (false, true, true) => ("add/add", "both sides added with no common ancestor"),
        (true, true, false) => ("modify/delete", "modified on one side, deleted on the other"),
        (true, false, true) => ("delete/modify", "deleted on one side, modified on the other"),
        (true, false, false) => ("delete/delete", "deleted on both sides"),
        (false, true, false) | (false, false, true) => ("add", "added with no counterpart"),
        (false, false, false) => ("unknown", "no stage information for"),
    }
}

/// Renders the paths `ls-files --unmerged` reports against a scratch index
/// left with unmerged stages. Each conflicting path appears on up to three
/// stage lines (`<mode> <sha> <stage>\t<path>`, stage 1/2/3 being the common
/// ancestor/ours/theirs); this collapses them to one
/// `CONFLICT (<kind>): <reason> <path>` line each, in first-seen order.
fn describe_conflicting_paths(stdout: &str) -> String {
    let mut order: Vec<String> = Vec::new();
    let mut stages: HashMap<String, BTreeSet<u8>> = HashMap::new();
    for line in stdout.lines() {
        let mut parts = line.splitn(2, '\t');
        let (Some(left), Some(path)) = (parts.next(), parts.next()) else {
            continue;
        };
        let Some(stage) = left.split_whitespace().nth(2).and_then(|s| s.parse::<u8>().ok()) else {
            continue;
        };
        if !order.iter().any(|p: &String| p == path) {
            order.push(path.to_owned());
        }
        stages.entry(path.to_owned()).or_default().insert(stage);
    }
    order
        .into_iter()
        .map(|path| {
            let (kind, reason) = classify_conflict_kind(stages.get(&path).expect("recorded above"));
            format!("CONFLICT ({kind}): {reason} {path}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Paths `git status --porcelain` marks unmerged: `UU`, `AA`, `DD`, or either
/// side alone (`AU`, `UA`, `DU`, `UD`).
fn parse_conflicting_paths(porcelain: &str) -> Vec<String> {
    const UNMERGED: &[&str] = &["UU", "AA", "DD", "AU", "UA", "DU", "UD"];
    porcelain
        .lines()
        .filter_map(|line| {
            let (code, path) = line.split_at_checked(2)?;
            UNMERGED.contains(&code).then(|| path.trim_start().to_owned())
        })
        .collect()
}

fn parse_worktree_porcelain(text: &str) -> Result<Vec<WorktreeEntry>, VcsError> {
    let mut entries = Vec::new();
    let mut path = None;
    let mut head = None;
    let mut branch_ref = None;
    let mut is_main = true;

    let flush = |path: &mut Option<String>,
                 head: &mut Option<String>,
                 branch_ref: &mut Option<String>,
                 is_main: &mut bool,
                 entries: &mut Vec<WorktreeEntry>| {
        if let (Some(p), Some(h)) = (path.take(), head.take()) {
            entries.push(WorktreeEntry {
                path: std::path::PathBuf::from(p),
                branch_ref: branch_ref.take(),
                head: h,
                is_main: *is_main,
            });
        }
        *is_main = false;
    };

    for line in text.lines() {
        if line.is_empty() {
            flush(&mut path, &mut head, &mut branch_ref, &mut is_main, &mut entries);
            continue;
        }
        if let Some(rest) = line.strip_prefix("worktree ") {
            path = Some(rest.to_owned());
        } else if let Some(rest) = line.strip_prefix("HEAD ") {
            head = Some(rest.to_owned());
        } else if let Some(rest) = line.strip_prefix("branch ") {
            branch_ref = Some(rest.to_owned());
        }
    }
    flush(&mut path, &mut head, &mut branch_ref, &mut is_main, &mut entries);
    Ok(entries)
}

fn parse_remote_head(text: &str) -> Option<String> {
    // `ls-remote --symref` prints: `ref: refs/heads/<name>\tHEAD`
    text.lines().find_map(|line| {
        let rest = line.strip_prefix("ref: refs/heads/")?;
        rest.split('\t').next().map(str::to_owned)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_and_negative_git_tz_offsets() {
        assert_eq!(parse_git_tz_offset("+0530"), 330);
        assert_eq!(parse_git_tz_offset("-0700"), -420);
        assert_eq!(parse_git_tz_offset("+0000"), 0);
    }

    #[test]
    fn parses_worktree_porcelain_output() {
        let text = "worktree /repo\nHEAD abc123\nbranch refs/heads/main\n\nworktree /repo/wt\nHEAD def456\nbranch refs/heads/feature\n";
        let entries = parse_worktree_porcelain(text).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].is_main);
        assert!(!entries[1].is_main);
        assert_eq!(entries[1].branch_ref.as_deref(), Some("refs/heads/feature"));
    }

    #[test]
    fn parses_remote_head_symref() {
        let text = "ref: refs/heads/main\tHEAD\nabcdef0000000000000000000000000000000000\tHEAD\n";
        assert_eq!(parse_remote_head(text), Some("main".to_owned()));
    }

    #[test]
    fn parses_unmerged_paths_from_porcelain_status() {
        let porcelain = "UU shared.txt\nM  clean.txt\nAA added.txt\n?? untracked.txt\n";
        assert_eq!(
            parse_conflicting_paths(porcelain),
            vec!["shared.txt".to_owned(), "added.txt".to_owned()]
        );
    }

    #[test]
    fn describes_conflicting_paths_one_per_line() {
        let stdout = concat!(
            "100644 aaaa 1\tshared.txt\n",
            "100644 bbbb 2\tshared.txt\n",
            "100644 cccc 3\tshared.txt\n",
            "100644 dddd 2\tnew.txt\n",
            "100644 eeee 3\tnew.txt\n",
        );
        assert_eq!(
            describe_conflicting_paths(stdout),
            "CONFLICT (content): both sides modified shared.txt\n\
             CONFLICT (add/add): both sides added with no common ancestor new.txt"
        );
    }

    #[test]
    fn classifies_modify_delete_conflicts() {
        let stdout = concat!(
            "100644 aaaa 1\tgone.txt\n",
            "100644 bbbb 2\tgone.txt\n",
        );
        assert_eq!(
            describe_conflicting_paths(stdout),
            "CONFLICT (modify/delete): modified on one side, deleted on the other gone.txt"
        );
    }
}
