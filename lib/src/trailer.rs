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

//! Parsing and rewriting the trailer block at the end of a commit message.
//!
//! A trailer is a `Key: Value` line in the final paragraph of a message,
//! e.g.
//!
//! ```text
//! fix the thing
//!
//! Longer description of the change.
//!
//! Spry-Commit-Id: a1b2c3d4
//! Spry-Group: release-fe01a9
//! ```

use std::collections::HashMap;

use itertools::Itertools as _;

/// A single `Key: Value` pair found in a trailer block.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Trailer {
    pub key: String,
    pub value: String,
}

/// Parsed view of a commit message's trailer block: a mapping from trailer
/// key to its value, where the *last* occurrence of a repeated key wins.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommitTrailers(HashMap<String, String>);

impl CommitTrailers {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }
}

/// Extracts the final trailer block of `body` using standard trailer rules
/// (consecutive `Key: Value` lines, separated from the rest of the body by a
/// blank line or appearing alone at EOF) and folds it into a
/// [`CommitTrailers`] map, last occurrence winning.
pub fn parse_trailers(body: &str) -> CommitTrailers {
    let mut map = HashMap::new();
    for trailer in parse_trailer_lines(body) {
        map.insert(trailer.key, trailer.value);
    }
    CommitTrailers(map)
}

/// Low-level parse returning every trailer line in the block, in original
/// top-to-bottom order, duplicates included. This is the primitive
/// [`parse_trailers`] folds into a last-wins map, and the one rewriting code
/// uses when it needs to preserve or selectively drop individual lines.
pub fn parse_trailer_lines(body: &str) -> Vec<Trailer> {
    let (trailers, found_blank, found_git_trailer, non_trailer) = parse_trailer_paragraph(body);
    if !found_blank {
        // A single paragraph: nothing here could be a standalone trailer block.
        vec![]
    } else if non_trailer.is_some() && !found_git_trailer {
        vec![]
    } else {
        trailers
    }
}

fn parse_trailer_paragraph(body: &str) -> (Vec<Trailer>, bool, bool, Option<String>) {
    let (trailers, found_blank, found_git_trailer, non_trailer, _consumed) =
        parse_trailer_paragraph_with_span(body);
    (trailers, found_blank, found_git_trailer, non_trailer)
}

/// Like [`parse_trailer_paragraph`], but also returns the number of trailing
/// lines (of `body.trim_ascii_end().lines()`) that make up the trailer block
/// plus its separating blank line, so callers can slice off exactly the
/// block and nothing else.
fn parse_trailer_paragraph_with_span(body: &str) -> (Vec<Trailer>, bool, bool, Option<String>, usize) {
    // Trailers always sit at the end of the message. Scanning from the end
    // means we never mistake a colon inside the body for a trailer.
    let trimmed = body.trim_ascii_end();
    let lines = trimmed.lines().rev();
    let trailer_re =
        regex::Regex::new(r"^([a-zA-Z0-9-]+) *: *(.*)$").expect("trailer regex is valid");
    let mut trailers: Vec<Trailer> = Vec::new();
    let mut multiline_value: Vec<&str> = vec![];
    let mut found_blank = false;
    let mut found_git_trailer = false;
    let mut non_trailer_line = None;
    let mut consumed = 0usize;
    for line in lines {
        consumed += 1;
        if line.starts_with(' ') {
            multiline_value.push(line);
        } else if let Some(groups) = trailer_re.captures(line) {
            let key = groups[1].to_string();
            multiline_value.push(groups.get(2).unwrap().as_str());
            multiline_value[0] = multiline_value[0].trim_ascii_end();
            let value = multiline_value.iter().rev().join("\n");
            multiline_value.clear();
            if key == "Signed-off-by" {
                found_git_trailer = true;
            }
            trailers.push(Trailer { key, value });
        } else if line.starts_with("(cherry picked from commit ") {
            found_git_trailer = true;
            non_trailer_line = Some(line.to_owned());
            multiline_value.clear();
        } else if line.trim_ascii().is_empty() {
            found_blank = true;
            break;
        } else {
            multiline_value.clear();
            non_trailer_line = Some(line.to_owned());
        }
    }
    trailers.reverse();
    (trailers, found_blank, found_git_trailer, non_trailer_line, consumed)
}

/// Appends `edits` to `message`'s trailer block, replacing any existing
/// occurrence of each key rather than accumulating duplicates. An empty
/// `edits` list returns `message` unchanged.
///
/// Idempotent: `add_trailers(add_trailers(m, x), x) == add_trailers(m, x)`.
pub fn add_trailers(message: &str, edits: &[(&str, &str)]) -> String {
    if edits.is_empty() {
        return message.to_owned();
    }

    let trimmed = message.trim_ascii_end();
    let (trailers, found_blank, found_git_trailer, non_trailer, consumed) =
        parse_trailer_paragraph_with_span(trimmed);
    let had_block = found_blank && !(non_trailer.is_some() && !found_git_trailer);
    let existing = if had_block { trailers } else { vec![] };

    // `consumed` counts trailing lines from the end that the scan walked,
    // including the separating blank line; dropping those from the line
    // vector leaves just the head of the message.
    let head: String = if had_block {
        let lines: Vec<&str> = trimmed.lines().collect();
        let head_lines = lines.len() - consumed;
        lines[..head_lines].join("\n")
    } else {
        trimmed.to_owned()
    };

    let edit_keys: Vec<&str> = edits.iter().map(|(k, _)| *k).collect();
    let kept: Vec<Trailer> = existing
        .into_iter()
        .filter(|t| !edit_keys.contains(&t.key.as_str()))
        .collect();

    let mut out = head.trim_end().to_owned();
    out.push_str("\n\n");
    for trailer in &kept {
        out.push_str(&trailer.key);
        out.push_str(": ");
        out.push_str(&render_value(&trailer.value));
        out.push('\n');
    }
    for (key, value) in edits {
        out.push_str(key);
        out.push_str(": ");
        out.push_str(&render_value(value));
        out.push('\n');
    }
    out
}

fn render_value(value: &str) -> String {
    value.replace('\n', "\n ")
}

/// Strips every trailer whose key is in `keys`, without replacing them with
/// anything. Used to clear a trailer (e.g. `Spry-Group` on a commit leaving
/// its group) rather than retarget it.
pub fn remove_trailers(message: &str, keys: &[&str]) -> String {
    let trimmed = message.trim_ascii_end();
    let (trailers, found_blank, found_git_trailer, non_trailer, consumed) =
        parse_trailer_paragraph_with_span(trimmed);
    let had_block = found_blank && !(non_trailer.is_some() && !found_git_trailer);
    if !had_block {
        return trimmed.to_owned();
    }

    let lines: Vec<&str> = trimmed.lines().collect();
    let head_lines = lines.len() - consumed;
    let head = lines[..head_lines].join("\n");
    let kept: Vec<Trailer> = trailers.into_iter().filter(|t| !keys.contains(&t.key.as_str())).collect();

    if kept.is_empty() {
        return head.trim_end().to_owned();
    }

    let mut out = head.trim_end().to_owned();
    out.push_str("\n\n");
    for trailer in &kept {
        out.push_str(&trailer.key);
        out.push_str(": ");
        out.push_str(&render_value(&trailer.value));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_simple_trailers_last_wins() {
        let body = indoc! {r#"
            fix the thing

            Longer description.

            Spry-Commit-Id: a1b2c3d4
            Spry-Commit-Id: e5f6a7b8
        "#};
        let trailers = parse_trailers(body);
        assert_eq!(trailers.get("Spry-Commit-Id"), Some("e5f6a7b8"));
    }

    #[test]
    fn add_trailers_is_idempotent() {
        let message = "subject\n\nbody text\n";
        let once = add_trailers(message, &[("Spry-Commit-Id", "a1b2c3d4")]);
        let twice = add_trailers(&once, &[("Spry-Commit-Id", "a1b2c3d4")]);
        assert_eq!(once, twice);
    }

    #[test]
    fn add_trailers_replaces_rather_than_accumulates() {
        let message = "subject\n\nSpry-Commit-Id: aaaaaaaa\n";
        let updated = add_trailers(message, &[("Spry-Commit-Id", "bbbbbbbb")]);
        let trailers = parse_trailers(&updated);
        assert_eq!(trailers.get("Spry-Commit-Id"), Some("bbbbbbbb"));
        assert_eq!(updated.matches("Spry-Commit-Id").count(), 1);
    }

    #[test]
    fn add_trailers_with_empty_map_is_noop() {
        let message = "subject\n\nbody\n";
        assert_eq!(add_trailers(message, &[]), message);
    }

    #[test]
    fn add_trailers_creates_a_block_on_a_single_paragraph_message() {
        let message = "subject only";
        let updated = add_trailers(message, &[("Spry-Commit-Id", "a1b2c3d4")]);
        assert_eq!(
            parse_trailers(&updated).get("Spry-Commit-Id"),
            Some("a1b2c3d4")
        );
        assert!(updated.starts_with("subject only\n\n"));
    }

    #[test]
    fn remove_trailers_drops_only_the_named_keys() {
        let message = "subject\n\nSpry-Group: g1\nSpry-Commit-Id: a1b2c3d4\n";
        let updated = remove_trailers(message, &["Spry-Group"]);
        let trailers = parse_trailers(&updated);
        assert_eq!(trailers.get("Spry-Group"), None);
        assert_eq!(trailers.get("Spry-Commit-Id"), Some("a1b2c3d4"));
    }

    #[test]
    fn remove_trailers_collapses_an_emptied_block() {
        let message = "subject\n\nSpry-Group: g1\n";
        let updated = remove_trailers(message, &["Spry-Group"]);
        assert_eq!(updated, "subject");
    }

    #[test]
    fn roundtrip_law() {
        let message = "subject\n\nbody\n\nReviewed-by: Alice <alice@example.com>\n";
        let edits = [("Spry-Group", "release-fe01a9")];
        let updated = add_trailers(message, &edits);
        let parsed = parse_trailers(&updated);
        for (key, value) in edits {
            assert_eq!(parsed.get(key), Some(value));
        }
        // Pre-existing trailers survive the edit.
        assert_eq!(
            parse_trailers(&updated).get("Reviewed-by"),
            Some("Alice <alice@example.com>")
        );
    }

    #[test]
    fn trailer_block_survives_a_round_trip_through_add_and_remove() {
        let message = "subject\n\nbody\n\nSpry-Group: g1\nSpry-Commit-Id: a1b2c3d4\n";
        let updated = remove_trailers(message, &["Spry-Group"]);
        insta::assert_snapshot!(updated, @r"
        subject

        body

        Spry-Commit-Id: a1b2c3d4
        ");
    }

    #[test]
    fn multiline_trailer_value_is_rejoined_on_render() {
        let message = "subject\n\nbody\n\nSpry-Commit-Id: a1b2c3d4\n";
        let updated = add_trailers(message, &[("Note", "first line\nsecond line")]);
        insta::assert_snapshot!(updated, @r"
        subject

        body

        Spry-Commit-Id: a1b2c3d4
        Note: first line
         second line
        ");
    }

    #[test]
    fn a_non_trailer_final_line_blocks_the_whole_paragraph() {
        // No Git trailer (e.g. `Signed-off-by`) appears, so the paragraph
        // as a whole isn't treated as a trailer block.
        let body = "subject\n\nSpry-Commit-Id: a1b2c3d4\nnot a trailer line\n";
        assert_eq!(parse_trailer_lines(body), vec![]);
    }
}
