//! Capabilities a host provides to running jobs.

use std::{
    io,
    path::{Path, PathBuf},
};

/// Result of a directory picker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectorySelection {
    pub cancelled: bool,
    pub paths: Vec<PathBuf>,
}

impl DirectorySelection {
    pub fn cancelled() -> Self {
        Self { cancelled: true, paths: Vec::new() }
    }

    pub fn selected(path: impl Into<PathBuf>) -> Self {
        Self { cancelled: false, paths: vec![path.into()] }
    }
}

/// Interactive destination directory picker.
pub trait DestinationPrompt {
    /// Ask for a directory, starting at `start`. New directories may be chosen.
    fn prompt_directory(&self, start: &Path) -> io::Result<DirectorySelection>;
}

/// Progress and output sink of a job.
pub trait JobReporter: Sync {
    /// The job started working on a new stage, labelled with the format name.
    fn stage(&self, label: &str);

    fn progress(&self, total: usize, completed: usize);

    /// A file was written.
    fn output_file(&self, path: &Path);
}

/// Modifier keys held when the job was started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Forces the destination prompt.
    pub ctrl: bool,
}

/// A prompt for hosts that cannot ask; every request is cancelled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrompt;

impl DestinationPrompt for NoPrompt {
    fn prompt_directory(&self, _start: &Path) -> io::Result<DirectorySelection> {
        Ok(DirectorySelection::cancelled())
    }
}

/// A reporter that forwards everything to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl JobReporter for LogReporter {
    fn stage(&self, label: &str) {
        log::info!("Stage: {label}");
    }

    fn progress(&self, total: usize, completed: usize) {
        log::debug!("Progress: {completed}/{total}");
    }

    fn output_file(&self, path: &Path) {
        log::info!("Wrote {}", path.display());
    }
}
