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

//! End-to-end tests against real throwaway repositories (§4.7): the only
//! tests in this crate permitted to shell out to a real `git` binary.

use std::path::Path;
use std::process::Command;

use pretty_assertions::assert_eq;
use spry_core::context::EngineContext;
use spry_core::ops::branches::list_stack_local_branches;
use spry_core::ops::group::GroupSpec;
use spry_core::ops::group::GroupSpecEntry;
use spry_core::ops::group::apply_group_spec;
use spry_core::ops::inject::inject_missing_ids;
use spry_core::ops::rebase::rebase_onto_trunk;
use spry_core::ops::sync::sync_all;
use spry_core::vcs::GitContext;
use spry_core::vcs::Vcs;
use tempfile::TempDir;

/// A throwaway repository with a fake `origin/main` remote-tracking ref (no
/// real remote is ever contacted; the ref is written directly so
/// `trunk_revision` resolves without network I/O).
struct Repo {
    dir: TempDir,
}

impl Repo {
    fn init() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        git(dir.path(), &["init", "-q", "-b", "main"]);
        git(dir.path(), &["config", "user.name", "Test User"]);
        git(dir.path(), &["config", "user.email", "test@example.com"]);
        git(dir.path(), &["config", "spry.defaultBranch", "main"]);
        git(dir.path(), &["config", "spry.remote", "origin"]);
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn commit(&self, filename: &str, contents: &str, message: &str) -> String {
        std::fs::write(self.path().join(filename), contents).expect("write file");
        git(self.path(), &["add", filename]);
        git(self.path(), &["commit", "-q", "-m", message]);
        self.rev_parse("HEAD")
    }

    fn rev_parse(&self, rev: &str) -> String {
        String::from_utf8(git(self.path(), &["rev-parse", rev]).stdout)
            .expect("utf8")
            .trim()
            .to_owned()
    }

    /// Points `refs/remotes/origin/main` at `sha`, simulating a fetch.
    fn set_fake_trunk(&self, sha: &str) {
        git(self.path(), &["update-ref", "refs/remotes/origin/main", sha]);
    }

    fn checkout_new_branch(&self, name: &str) {
        git(self.path(), &["checkout", "-q", "-b", name]);
    }

    fn checkout(&self, name: &str) {
        git(self.path(), &["checkout", "-q", name]);
    }

    fn body_of(&self, rev: &str) -> String {
        String::from_utf8(git(self.path(), &["show", "-s", "--format=%B", rev]).stdout)
            .expect("utf8")
    }

    fn context(&self) -> EngineContext {
        EngineContext::new(Vcs::new(GitContext::new(self.path())))
    }
}

fn git(dir: &Path, args: &[&str]) -> std::process::Output {
    let output = Command::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .expect("spawn git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

#[test]
fn inject_missing_ids_adds_trailers_without_reordering() {
    let repo = Repo::init();
    let root = repo.commit("README.md", "root\n", "root commit");
    repo.set_fake_trunk(&root);
    repo.checkout_new_branch("feature");
    repo.commit("a.txt", "a\n", "first change");
    repo.commit("b.txt", "b\n", "second change");

    let ctx = repo.context();
    let result = inject_missing_ids(&ctx, None).expect("inject succeeds");
    assert_eq!(result.modified_count, 2);
    assert!(result.rebase_performed);

    let commits = ctx.vcs().commit_range(&root, "feature").expect("commit range");
    assert_eq!(commits.len(), 2);
    assert_eq!(commits[0].subject(), "first change");
    assert_eq!(commits[1].subject(), "second change");
    for commit in &commits {
        let id = commit.trailers().commit_id().expect("id was injected");
        assert_eq!(id.len(), 8);
        assert!(id.bytes().all(|b| b.is_ascii_hexdigit()));
    }
}

#[test]
fn inject_missing_ids_preserves_an_existing_id() {
    let repo = Repo::init();
    let root = repo.commit("README.md", "root\n", "root commit");
    repo.set_fake_trunk(&root);
    repo.checkout_new_branch("feature");
    repo.commit("a.txt", "a\n", "already tagged\n\nSpry-Commit-Id: abc12345");
    repo.commit("b.txt", "b\n", "needs a tag");

    let ctx = repo.context();
    let result = inject_missing_ids(&ctx, None).expect("inject succeeds");
    assert_eq!(result.modified_count, 1);

    let commits = ctx.vcs().commit_range(&root, "feature").expect("commit range");
    assert_eq!(commits[0].trailers().commit_id(), Some("abc12345"));
    assert_ne!(commits[1].trailers().commit_id(), Some("abc12345"));
    assert!(commits[1].trailers().commit_id().is_some());
}

#[test]
fn rebase_onto_trunk_replays_commits_on_top_of_the_new_trunk_tip() {
    let repo = Repo::init();
    let root = repo.commit("README.md", "root\n", "root commit");
    repo.set_fake_trunk(&root);
    repo.checkout_new_branch("feature");
    repo.commit("a.txt", "a\n", "feature change");

    repo.checkout("main");
    let new_main_tip = repo.commit("trunk.txt", "trunk\n", "trunk moved on");
    repo.set_fake_trunk(&new_main_tip);
    repo.checkout("feature");

    let ctx = repo.context();
    let report = rebase_onto_trunk(&ctx, None).expect("rebase succeeds");
    assert_eq!(report.commit_count, 1);

    let merge_base = ctx
        .vcs()
        .merge_base(&new_main_tip, &report.new_tip)
        .expect("merge base");
    assert_eq!(merge_base, new_main_tip);
}

#[test]
fn apply_group_spec_groups_two_commits_and_records_a_title() {
    let repo = Repo::init();
    let root = repo.commit("README.md", "root\n", "root commit");
    repo.set_fake_trunk(&root);
    repo.checkout_new_branch("feature");
    let first = repo.commit("a.txt", "a\n", "part one");
    let second = repo.commit("b.txt", "b\n", "part two");

    let ctx = repo.context();
    let spec = GroupSpec {
        order: None,
        groups: vec![GroupSpecEntry {
            commits: vec![first, second],
            name: "Two-part change".to_owned(),
        }],
    };
    let result = apply_group_spec(&ctx, None, &spec).expect("apply succeeds");
    assert_eq!(result.modified_count, 2);
    assert_eq!(result.group_ids.len(), 1);

    let group_id = result.group_ids.get("Two-part change").expect("group recorded");
    assert!(group_id.starts_with("two-part-change-"));

    let commits = ctx.vcs().commit_range(&root, "feature").expect("commit range");
    assert_eq!(commits[0].trailers().group(), Some(group_id.as_str()));
    assert_eq!(commits[1].trailers().group(), Some(group_id.as_str()));

    let titles = spry_core::refstore::GroupTitles::read(ctx.vcs(), ctx.user()).expect("read titles");
    assert_eq!(titles.get(group_id), Some("Two-part change"));
}

#[test]
fn list_stack_local_branches_skips_the_default_branch_and_untagged_branches() {
    let repo = Repo::init();
    let root = repo.commit("README.md", "root\n", "root commit");
    repo.set_fake_trunk(&root);

    repo.checkout_new_branch("untagged");
    repo.commit("u.txt", "u\n", "has no spry trailers at all");

    repo.checkout("main");
    repo.checkout_new_branch("feature");
    repo.commit("a.txt", "a\n", "feature change");
    let ctx = repo.context();
    inject_missing_ids(&ctx, None).expect("inject succeeds");

    let branches = list_stack_local_branches(&ctx).expect("list branches");
    let names: Vec<&str> = branches.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["feature"]);
    assert!(!branches[0].has_missing_ids);
}

#[test]
fn sync_all_rebases_a_behind_branch_and_leaves_current_branch_last() {
    let repo = Repo::init();
    let root = repo.commit("README.md", "root\n", "root commit");
    repo.set_fake_trunk(&root);

    repo.checkout_new_branch("feature");
    repo.commit("a.txt", "a\n", "feature change");

    repo.checkout("main");
    let new_main_tip = repo.commit("trunk.txt", "trunk\n", "trunk moved on");
    repo.set_fake_trunk(&new_main_tip);
    repo.checkout("feature");

    let ctx = repo.context();
    let report = sync_all(&ctx).expect("sync succeeds");
    assert_eq!(report.rebased.len(), 1);
    assert_eq!(report.rebased[0].branch, "feature");
    assert!(report.skipped.is_empty());

    assert_eq!(ctx.vcs().current_branch().unwrap().as_deref(), Some("feature"));
    let body = repo.body_of("feature");
    assert!(body.contains("Spry-Commit-Id"));
}
