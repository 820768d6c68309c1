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

//! Minimal Git subprocess runner.
//!
//! Every operation in [`crate::vcs::plumbing`] is ultimately one or more of
//! these subprocess calls. Keeping the spawn/parse boundary in one small
//! module means the rest of the engine never has to think about process
//! environments, encodings, or exit codes.

use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;
use std::process::Stdio;

use bstr::ByteSlice as _;
use thiserror::Error;

/// Any failure from the underlying Git process. Per §4.1, this is always
/// fatal and surfaced upward — there is no retry.
#[derive(Error, Debug)]
pub enum VcsError {
    #[error("could not execute the git process, found in the OS path")]
    SpawnInPath(#[source] std::io::Error),

    #[error("could not execute git process at '{path}'")]
    Spawn {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    #[error("failed to wait for the git process")]
    Wait(#[source] std::io::Error),

    #[error("git {subcommand} failed: {stderr}")]
    Failed { subcommand: String, stderr: String },

    #[error("could not parse output of git {subcommand}: {reason}")]
    UnparsableOutput { subcommand: String, reason: String },
}

/// Context for spawning `git` subprocesses against a single working
/// directory. Every VCS-plumbing operation takes an optional working
/// directory so the engine never depends on the process's own cwd (§4.1).
pub struct GitContext {
    working_dir: PathBuf,
    git_executable: PathBuf,
}

impl GitContext {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            git_executable: PathBuf::from("git"),
        }
    }

    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.git_executable = path.into();
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.git_executable);
        cmd.current_dir(&self.working_dir)
            // Disable translation so stderr parsing is stable across locales.
            .env("LC_ALL", "C")
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    /// Runs `git <args>` with no stdin, returning stdout as bytes on
    /// success.
    pub fn run(&self, args: &[&str]) -> Result<Vec<u8>, VcsError> {
        let output = self.spawn_and_wait(&mut self.command(args))?;
        self.require_success(args[0], output).map(|o| o.stdout)
    }

    /// Runs `git <args>`, feeding `stdin` to the child, returning stdout as
    /// bytes on success. Used for `commit-tree` (message on stdin) and
    /// `hash-object -w --stdin` (blob content on stdin).
    pub fn run_with_stdin(&self, args: &[&str], stdin: &[u8]) -> Result<Vec<u8>, VcsError> {
        use std::io::Write as _;

        let mut cmd = self.command(args);
        cmd.stdin(Stdio::piped());
        let mut child = self.spawn(&mut cmd)?;
        child
            .stdin
            .take()
            .expect("stdin was requested")
            .write_all(stdin)
            .map_err(VcsError::Wait)?;
        let output = child.wait_with_output().map_err(VcsError::Wait)?;
        self.require_success(args[0], output).map(|o| o.stdout)
    }

    /// Runs `git <args>` with the given environment overlay (used to pin
    /// author/committer identity when creating a commit).
    pub fn run_with_env(
        &self,
        args: &[&str],
        env: &[(&str, &str)],
        stdin: &[u8],
    ) -> Result<Vec<u8>, VcsError> {
        use std::io::Write as _;

        let mut cmd = self.command(args);
        cmd.stdin(Stdio::piped());
        for (key, value) in env {
            cmd.env(key, value);
        }
        let mut child = self.spawn(&mut cmd)?;
        child
            .stdin
            .take()
            .expect("stdin was requested")
            .write_all(stdin)
            .map_err(VcsError::Wait)?;
        let output = child.wait_with_output().map_err(VcsError::Wait)?;
        self.require_success(args[0], output).map(|o| o.stdout)
    }

    /// Runs `git <args>` and returns the raw output (including a non-zero
    /// exit code) without translating it into [`VcsError::Failed`]. Used by
    /// callers that treat a non-zero exit as an ordinary result, such as
    /// `merge-tree` reporting conflicts.
    pub fn run_allow_failure(&self, args: &[&str]) -> Result<Output, VcsError> {
        self.spawn_and_wait(&mut self.command(args))
    }

    fn spawn(&self, cmd: &mut Command) -> Result<std::process::Child, VcsError> {
        tracing::debug!(?cmd, "spawning git subprocess");
        cmd.spawn().map_err(|error| {
            if self.git_executable.is_absolute() {
                VcsError::Spawn {
                    path: self.git_executable.clone(),
                    error,
                }
            } else {
                VcsError::SpawnInPath(error)
            }
        })
    }

    fn spawn_and_wait(&self, cmd: &mut Command) -> Result<Output, VcsError> {
        let child = self.spawn(cmd)?;
        child.wait_with_output().map_err(VcsError::Wait)
    }

    fn require_success(&self, subcommand: &str, output: Output) -> Result<Output, VcsError> {
        if output.status.success() {
            Ok(output)
        } else {
            Err(VcsError::Failed {
                subcommand: subcommand.to_owned(),
                stderr: output.stderr.to_str_lossy().into_owned(),
            })
        }
    }
}

pub(crate) fn stdout_string(bytes: Vec<u8>) -> Result<String, VcsError> {
    String::from_utf8(bytes).map_err(|e| VcsError::UnparsableOutput {
        subcommand: "<output>".to_owned(),
        reason: e.to_string(),
    })
}
