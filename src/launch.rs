//! Starting what a launch bar button points at
//!
//! A command is either a URL or document, handed to the desktop opener,
//! or a program with arguments, started directly and left running.

use std::fs;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchCommand {
    /// URL, directory or document opened with the default handler
    Open(String),
    /// Program started as a detached child
    Spawn { program: String, args: Vec<String> },
}

impl LaunchCommand {
    /// Classify a configured command line; blank input yields `None`
    pub fn parse(command: &str) -> Option<Self> {
        let command = command.trim();
        if command.is_empty() {
            return None;
        }
        if is_url(command) || is_openable_path(Path::new(command)) {
            return Some(LaunchCommand::Open(command.to_string()));
        }

        let mut words = split_command_line(command).into_iter();
        let program = words.next()?;
        Some(LaunchCommand::Spawn { program, args: words.collect() })
    }

    pub fn run(&self) -> io::Result<()> {
        match self {
            LaunchCommand::Open(target) => open::that_detached(target),
            LaunchCommand::Spawn { program, args } => {
                let mut child = Command::new(program)
                    .args(args)
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .spawn()?;
                debug!(program, pid = child.id(), "Spawned application");

                // Reap the child when it exits so it never lingers as a zombie
                thread::Builder::new()
                    .name("launch-reaper".to_string())
                    .spawn(move || {
                        let _ = child.wait();
                    })?;
                Ok(())
            }
        }
    }
}

fn is_url(command: &str) -> bool {
    if command.starts_with("mailto:") {
        return true;
    }
    match command.split_once("://") {
        Some((scheme, rest)) => {
            !scheme.is_empty()
                && !rest.is_empty()
                && scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Existing directories and non-executable files go to the opener
fn is_openable_path(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => true,
        Ok(meta) => !is_executable(&meta),
        Err(_) => false,
    }
}

#[cfg(unix)]
fn is_executable(meta: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_meta: &fs::Metadata) -> bool {
    false
}

/// Split on whitespace, honoring single quotes, double quotes and backslash escapes
pub fn split_command_line(command: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = command.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_word = true;
                for quoted in chars.by_ref() {
                    if quoted == '\'' {
                        break;
                    }
                    current.push(quoted);
                }
            }
            '"' => {
                in_word = true;
                while let Some(quoted) = chars.next() {
                    match quoted {
                        '"' => break,
                        '\\' => match chars.next() {
                            Some(escaped @ ('"' | '\\')) => current.push(escaped),
                            Some(other) => {
                                current.push('\\');
                                current.push(other);
                            }
                            None => current.push('\\'),
                        },
                        _ => current.push(quoted),
                    }
                }
            }
            '\\' => {
                in_word = true;
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }
    if in_word {
        words.push(current);
    }
    words
}
