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

//! Object-level VCS plumbing (§4.1): the subprocess runner, the typed
//! operations built on it, and the composite rewrite primitives.

pub mod plumbing;
pub mod rewrite;
pub mod subprocess;

pub use plumbing::MergeOutcome;
pub use plumbing::TraditionalRebaseOutcome;
pub use plumbing::Vcs;
pub use plumbing::WorktreeEntry;
pub use rewrite::CommitMapping;
pub use rewrite::RebaseOutcome;
pub use rewrite::RewriteResult;
pub use rewrite::finalize_rewrite;
pub use rewrite::rebase_plumbing;
pub use rewrite::rewrite_commit_chain;
pub use subprocess::GitContext;
pub use subprocess::VcsError;
