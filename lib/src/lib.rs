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

//! The stacked-pull-request workflow engine: parses a linear commit history
//! into review units, rebases and regroups it by pure VCS plumbing, and
//! drives a hosted forge's pull requests to match.
//!
//! The engine itself never talks to a forge or a terminal; [`forge::Forge`]
//! is a contract callers implement, and every operation in [`ops`] returns
//! plain data for a caller to render.

pub mod commit;
pub mod config;
pub mod context;
pub mod error;
pub mod forge;
pub mod hash;
pub mod ops;
pub mod refstore;
pub mod stack;
pub mod trailer;
pub mod vcs;

/// Namespaces private refs (`refs/<APP_NAME>/<user>/…`) and config keys
/// (`<APP_NAME>.<key>`).
pub const APP_NAME: &str = "spry";
