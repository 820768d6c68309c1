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

//! Process configuration (§3, §6.4).
//!
//! Unlike a config file format with its own layered resolution, the
//! recognized options here are a fixed, flat set read straight out of the
//! VCS's own config store with `<appname>.<key>` keys — there is nothing to
//! parse or migrate, so loading is just a handful of `git config --get`
//! calls translated into a typed struct.

use crate::APP_NAME;
use crate::refstore::PrTemplateLocation;
use crate::vcs::Vcs;
use crate::vcs::VcsError;

/// Change-type prefixes the engine treats as not-yet-ready-for-review when
/// scanning a stack (§3 default: `WIP`, `fixup!`, `amend!`, `squash!`).
const DEFAULT_TEMP_COMMIT_PREFIXES: &[&str] = &["WIP", "fixup!", "amend!", "squash!"];

/// Process-wide configuration, read once per process and memoized by
/// [`crate::context::EngineContext`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub branch_prefix: String,
    pub default_branch: Option<String>,
    pub remote: String,
    pub temp_commit_prefixes: Vec<String>,
    pub show_stack_links: bool,
    pub include_pr_template: bool,
    pub pr_template_location: PrTemplateLocation,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            branch_prefix: APP_NAME.to_owned(),
            default_branch: None,
            remote: "origin".to_owned(),
            temp_commit_prefixes: DEFAULT_TEMP_COMMIT_PREFIXES.iter().map(|s| s.to_string()).collect(),
            show_stack_links: true,
            include_pr_template: true,
            pr_template_location: PrTemplateLocation::AfterBody,
        }
    }
}

impl Config {
    /// Reads every recognized `<appname>.*` key from the VCS's config
    /// store, falling back to the default for anything unset.
    pub fn load(vcs: &Vcs) -> Result<Self, VcsError> {
        let mut config = Self::default();

        if let Some(v) = get_string(vcs, "branchPrefix")? {
            config.branch_prefix = v;
        }
        config.default_branch = get_string(vcs, "defaultBranch")?;
        if let Some(v) = get_string(vcs, "remote")? {
            config.remote = v;
        }
        if let Some(v) = get_string(vcs, "tempCommitPrefixes")? {
            config.temp_commit_prefixes = v.split(',').map(|s| s.trim().to_owned()).collect();
        }
        if let Some(v) = get_bool(vcs, "showStackLinks")? {
            config.show_stack_links = v;
        }
        if let Some(v) = get_bool(vcs, "includePrTemplate")? {
            config.include_pr_template = v;
        }
        if let Some(v) = get_string(vcs, "prTemplateLocation")? {
            if let Some(location) = parse_template_location(&v) {
                config.pr_template_location = location;
            }
        }

        Ok(config)
    }
}

fn config_key(name: &str) -> String {
    format!("{APP_NAME}.{name}")
}

fn get_string(vcs: &Vcs, name: &str) -> Result<Option<String>, VcsError> {
    vcs.config_get(&config_key(name))
}

fn get_bool(vcs: &Vcs, name: &str) -> Result<Option<bool>, VcsError> {
    Ok(get_string(vcs, name)?.and_then(|v| match v.as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }))
}

fn parse_template_location(value: &str) -> Option<PrTemplateLocation> {
    match value {
        "prepend" => Some(PrTemplateLocation::Prepend),
        "afterBody" => Some(PrTemplateLocation::AfterBody),
        "afterStackLinks" => Some(PrTemplateLocation::AfterStackLinks),
        "append" => Some(PrTemplateLocation::Append),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let config = Config::default();
        assert_eq!(config.branch_prefix, "spry");
        assert_eq!(config.remote, "origin");
        assert_eq!(config.temp_commit_prefixes, vec!["WIP", "fixup!", "amend!", "squash!"]);
        assert!(config.show_stack_links);
        assert!(config.include_pr_template);
        assert_eq!(config.pr_template_location, PrTemplateLocation::AfterBody);
    }

    #[test]
    fn parses_recognized_template_locations() {
        assert_eq!(parse_template_location("prepend"), Some(PrTemplateLocation::Prepend));
        assert_eq!(parse_template_location("bogus"), None);
    }
}
