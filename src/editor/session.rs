//! A running editor child process and the outcome file it will write

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use super::protocol::{self, EditorOutcome};
use crate::constants::paths;
use crate::kind::WidgetKind;

#[derive(Debug, PartialEq)]
pub enum SessionStatus {
    Running,
    /// Child exited; `None` means the user closed the editor without an action
    Finished(Option<EditorOutcome>),
}

#[derive(Debug)]
pub struct EditorSession {
    owner: PathBuf,
    child: Child,
    outcome_path: PathBuf,
}

/// Outcome file next to the config it belongs to
pub fn outcome_path_for(config_path: &Path) -> PathBuf {
    config_path.with_extension(paths::OUTCOME_EXTENSION)
}

fn remove_outcome(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove outcome file"),
    }
}

impl EditorSession {
    /// Open the settings editor for one widget
    pub fn spawn_widget(config_path: &Path, kind: WidgetKind) -> Result<Self> {
        let outcome_path = outcome_path_for(config_path);
        let exe_path = std::env::current_exe().context("Failed to resolve executable path")?;
        let mut command = Command::new(exe_path);
        command
            .arg("--edit-widget")
            .arg(config_path)
            .arg("--kind")
            .arg(kind.cli_name())
            .arg("--outcome")
            .arg(&outcome_path);
        Self::start(command, config_path.to_path_buf(), outcome_path)
    }

    /// Open the launch bar's app list editor
    pub fn spawn_launcher(config_path: &Path) -> Result<Self> {
        let outcome_path = outcome_path_for(config_path);
        let exe_path = std::env::current_exe().context("Failed to resolve executable path")?;
        let mut command = Command::new(exe_path);
        command
            .arg("--edit-launcher")
            .arg(config_path)
            .arg("--outcome")
            .arg(&outcome_path);
        Self::start(command, config_path.to_path_buf(), outcome_path)
    }

    pub(crate) fn start(mut command: Command, owner: PathBuf, outcome_path: PathBuf) -> Result<Self> {
        // A leftover from a crashed run must not be mistaken for this session's answer
        remove_outcome(&outcome_path);

        let child = command.spawn().context("Failed to spawn settings editor")?;
        info!(pid = child.id(), owner = %owner.display(), "Started settings editor");
        Ok(Self { owner, child, outcome_path })
    }

    /// Config file of the window that opened this editor
    pub fn owner(&self) -> &Path {
        &self.owner
    }

    /// Non-blocking check; reads and removes the outcome once the child is gone
    pub fn poll(&mut self) -> SessionStatus {
        match self.child.try_wait() {
            Ok(None) => SessionStatus::Running,
            Ok(Some(status)) => {
                if !status.success() {
                    warn!(pid = self.child.id(), exit = ?status.code(), "Settings editor exited with an error");
                }
                let outcome = match protocol::read_outcome(&self.outcome_path) {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        error!(error = %e, "Ignoring unreadable editor outcome");
                        None
                    }
                };
                remove_outcome(&self.outcome_path);
                SessionStatus::Finished(outcome)
            }
            Err(e) => {
                error!(pid = self.child.id(), error = %e, "Failed to query settings editor status");
                remove_outcome(&self.outcome_path);
                SessionStatus::Finished(None)
            }
        }
    }

    /// Kill the child on shutdown; its answer is discarded
    pub fn terminate(mut self) {
        info!(pid = self.child.id(), "Stopping settings editor");
        let _ = self.child.kill();
        let _ = self.child.wait();
        remove_outcome(&self.outcome_path);
    }
}
