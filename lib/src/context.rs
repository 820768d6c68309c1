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

//! Per-process context (§9 design notes: "global mutable state → explicit
//! context"). Bundles the VCS handle with the two pieces of state the spec
//! allows to be memoized for the life of a process: the loaded [`Config`]
//! and the identity used to namespace private refs.

use std::cell::OnceCell;

use crate::config::Config;
use crate::stack::validate::IdSource;
use crate::stack::validate::id_source_from_env;
use crate::vcs::Vcs;
use crate::vcs::VcsError;

/// Everything a stack operation (§4.5) needs that isn't passed explicitly:
/// the VCS handle, lazily-loaded config, the identity namespacing private
/// refs, and the commit-id generator.
pub struct EngineContext {
    vcs: Vcs,
    config: OnceCell<Config>,
    user: OnceCell<String>,
    id_source: Box<dyn IdSource>,
}

impl EngineContext {
    pub fn new(vcs: Vcs) -> Self {
        Self {
            vcs,
            config: OnceCell::new(),
            user: OnceCell::new(),
            id_source: id_source_from_env(),
        }
    }

    pub fn vcs(&self) -> &Vcs {
        &self.vcs
    }

    /// Loads [`Config`] from the VCS's config store on first access and
    /// reuses it for the rest of the process.
    pub fn config(&self) -> Result<&Config, VcsError> {
        if self.config.get().is_none() {
            let loaded = Config::load(&self.vcs)?;
            let _ = self.config.set(loaded);
        }
        Ok(self.config.get().expect("just initialized above"))
    }

    /// The identity that namespaces this user's private refs (§4.4),
    /// resolved once per process from the OS account name.
    pub fn user(&self) -> &str {
        self.user.get_or_init(|| whoami::username())
    }

    pub fn generate_commit_id(&self) -> String {
        self.id_source.next_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcs::GitContext;

    #[test]
    fn generate_commit_id_yields_eight_hex_chars() {
        let ctx = EngineContext::new(Vcs::new(GitContext::new(std::env::temp_dir())));
        let id = ctx.generate_commit_id();
        assert_eq!(id.len(), 8);
        assert!(id.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn user_is_memoized_across_calls() {
        let ctx = EngineContext::new(Vcs::new(GitContext::new(std::env::temp_dir())));
        assert_eq!(ctx.user(), ctx.user());
    }
}
