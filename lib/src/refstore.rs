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

//! The ref-storage side-channel (§4.4): group titles and per-stack settings
//! stored as JSON blobs under private refs, independent of commit trailers
//! so edits don't require a rebase.

use std::collections::HashMap;
use std::collections::HashSet;

use serde::Deserialize;
use serde::Serialize;

use crate::APP_NAME;
use crate::vcs::Vcs;
use crate::vcs::VcsError;

fn group_titles_ref(user: &str) -> String {
    format!("refs/{APP_NAME}/{user}/group-titles")
}

fn stack_settings_ref(user: &str) -> String {
    format!("refs/{APP_NAME}/{user}/stack-settings")
}

/// `{ [groupId]: title }`, stored at `refs/<appname>/<user>/group-titles`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupTitles(HashMap<String, String>);

impl GroupTitles {
    pub fn get(&self, group_id: &str) -> Option<&str> {
        self.0.get(group_id).map(String::as_str)
    }

    pub fn set(&mut self, group_id: impl Into<String>, title: impl Into<String>) {
        self.0.insert(group_id.into(), title.into());
    }

    pub fn as_map(&self) -> &HashMap<String, String> {
        &self.0
    }

    /// Deletes keys not present in `current_group_ids`; returns the ids
    /// removed.
    pub fn purge_orphaned(&mut self, current_group_ids: &HashSet<String>) -> Vec<String> {
        let purged: Vec<String> = self
            .0
            .keys()
            .filter(|id| !current_group_ids.contains(*id))
            .cloned()
            .collect();
        for id in &purged {
            self.0.remove(id);
        }
        purged
    }

    pub fn read(vcs: &Vcs, user: &str) -> Result<Self, VcsError> {
        let reference = group_titles_ref(user);
        match vcs.cat_ref_blob(&reference)? {
            Some(bytes) => Ok(Self(parse_json_object_or_empty(&bytes))),
            None => Ok(Self::default()),
        }
    }

    pub fn write(&self, vcs: &Vcs, user: &str) -> Result<(), VcsError> {
        let reference = group_titles_ref(user);
        vcs.write_ref_blob(&reference, &to_pretty_json(&self.0))
    }

    pub fn push(&self, vcs: &Vcs, remote: &str, user: &str) -> Result<(), VcsError> {
        vcs.push_ref(remote, &group_titles_ref(user))
    }

    pub fn fetch(vcs: &Vcs, remote: &str, user: &str) -> Result<(), VcsError> {
        vcs.fetch_ref(remote, &group_titles_ref(user))
    }
}

/// Placement of the injected PR-body boilerplate, per §3.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrTemplateLocation {
    Prepend,
    AfterBody,
    AfterStackLinks,
    Append,
}

/// Per-stack overrides of the process-wide [`crate::config::Config`], keyed
/// by the stack's root commit id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackConfig {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub show_stack_links: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub include_pr_template: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pr_template_location: Option<PrTemplateLocation>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct StackSettingsData {
    #[serde(default)]
    stacks: HashMap<String, StackConfig>,
    #[serde(default, rename = "contentHashes")]
    content_hashes: HashMap<String, String>,
}

/// Per-stack settings and per-unit content hashes, stored at
/// `refs/<appname>/<user>/stack-settings`.
#[derive(Clone, Debug, Default)]
pub struct StackSettings(StackSettingsData);

impl StackSettings {
    pub fn stack_config(&self, root_id: &str) -> Option<&StackConfig> {
        self.0.stacks.get(root_id)
    }

    pub fn set_stack_config(&mut self, root_id: impl Into<String>, config: StackConfig) {
        self.0.stacks.insert(root_id.into(), config);
    }

    pub fn content_hash(&self, unit_id: &str) -> Option<&str> {
        self.0.content_hashes.get(unit_id).map(String::as_str)
    }

    pub fn set_content_hash(&mut self, unit_id: impl Into<String>, hash: impl Into<String>) {
        self.0.content_hashes.insert(unit_id.into(), hash.into());
    }

    pub fn read(vcs: &Vcs, user: &str) -> Result<Self, VcsError> {
        let reference = stack_settings_ref(user);
        match vcs.cat_ref_blob(&reference)? {
            Some(bytes) => Ok(Self(parse_json_or_default(&bytes))),
            None => Ok(Self::default()),
        }
    }

    pub fn write(&self, vcs: &Vcs, user: &str) -> Result<(), VcsError> {
        let reference = stack_settings_ref(user);
        vcs.write_ref_blob(&reference, &to_pretty_json(&self.0))
    }

    pub fn push(&self, vcs: &Vcs, remote: &str, user: &str) -> Result<(), VcsError> {
        vcs.push_ref(remote, &stack_settings_ref(user))
    }

    pub fn fetch(vcs: &Vcs, remote: &str, user: &str) -> Result<(), VcsError> {
        vcs.fetch_ref(remote, &stack_settings_ref(user))
    }
}

/// Tolerant read: a missing ref, an empty blob, or a payload that isn't a
/// JSON object all fold to the empty map (§6.2).
fn parse_json_object_or_empty(bytes: &[u8]) -> HashMap<String, String> {
    serde_json::from_slice(bytes).unwrap_or_default()
}

fn parse_json_or_default<T: Default + for<'de> Deserialize<'de>>(bytes: &[u8]) -> T {
    serde_json::from_slice(bytes).unwrap_or_default()
}

/// Pretty-printed JSON with a trailing newline, for readable diffs (§6.2).
fn to_pretty_json<T: Serialize>(value: &T) -> Vec<u8> {
    let mut json = serde_json::to_vec_pretty(value).expect("value is always serializable");
    json.push(b'\n');
    json
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purge_orphaned_removes_absent_ids_and_returns_them() {
        let mut titles = GroupTitles::default();
        titles.set("g1", "First");
        titles.set("g2", "Second");
        let keep: HashSet<String> = ["g1".to_owned()].into_iter().collect();
        let mut purged = titles.purge_orphaned(&keep);
        purged.sort();
        assert_eq!(purged, vec!["g2".to_owned()]);
        assert_eq!(titles.get("g1"), Some("First"));
        assert_eq!(titles.get("g2"), None);
    }

    #[test]
    fn tolerant_read_folds_garbage_to_empty() {
        assert!(parse_json_object_or_empty(b"not json").is_empty());
        assert!(parse_json_object_or_empty(b"[1,2,3]").is_empty());
        assert!(parse_json_object_or_empty(b"").is_empty());
    }

    #[test]
    fn pretty_json_round_trips_group_titles() {
        let mut titles = GroupTitles::default();
        titles.set("g1", "Release train");
        let bytes = to_pretty_json(&titles.0);
        assert!(bytes.ends_with(b"\n"));
        let roundtripped = parse_json_object_or_empty(&bytes);
        assert_eq!(roundtripped.get("g1").map(String::as_str), Some("Release train"));
    }
}
