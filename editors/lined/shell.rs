//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Shell command execution.
//!
//! Every command runs as `sh -c command`, with stdin closed unless the
//! buffer is piped in, and stderr passed through to ours.

use crate::error::{EdError, EdResult};
use crate::file::read_lines;
use std::io::{self, Cursor, Write};
use std::process::{Command, Output, Stdio};
use std::thread;

const SHELL: &str = "sh";

/// A command line after `!` and `%` substitution.
#[derive(Debug, PartialEq, Eq)]
pub struct Expanded {
    pub command: String,
    /// True if anything was substituted
    pub changed: bool,
}

/// Expand a shell command line.
///
/// A leading `!` becomes the previous command, an unescaped `%` the
/// current filename.  `\%` is a literal `%`; other backslashes are left
/// for the shell.
pub fn expand(
    command: &str,
    previous: Option<&str>,
    filename: Option<&str>,
) -> EdResult<Expanded> {
    let mut out = String::with_capacity(command.len());
    let mut changed = false;

    let body = match command.strip_prefix('!') {
        Some(rest) => {
            out.push_str(previous.ok_or(EdError::NoPreviousCommand)?);
            changed = true;
            rest
        }
        None => command,
    };

    let mut chars = body.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' if chars.peek() == Some(&'%') => {
                chars.next();
                out.push('%');
            }
            '%' => {
                out.push_str(filename.ok_or(EdError::NoFilename)?);
                changed = true;
            }
            _ => out.push(ch),
        }
    }

    Ok(Expanded {
        command: out,
        changed,
    })
}

fn shell(command: &str) -> Command {
    log::debug!("sh -c {:?}", command);
    let mut cmd = Command::new(SHELL);
    cmd.arg("-c").arg(command).stderr(Stdio::inherit());
    cmd
}

fn capture(command: &str) -> io::Result<Output> {
    shell(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .output()
}

/// Run `command` for its side effect, copying its output to `out`.
pub fn run<W: Write>(command: &str, out: &mut W) -> EdResult<()> {
    let output = capture(command)?;
    if !output.status.success() {
        log::warn!("{:?} exited with {}", command, output.status);
    }
    out.write_all(&output.stdout)?;
    out.flush()?;
    Ok(())
}

/// Run `command` and return its output as buffer lines.
pub fn read(command: &str) -> EdResult<Vec<String>> {
    let output = capture(command)?;
    if !output.status.success() {
        log::warn!("{:?} exited with {}", command, output.status);
    }
    read_lines(Cursor::new(output.stdout))
}

/// Feed `input` to `command` and return what it prints.
///
/// The input is written from a second thread so a command that fills its
/// output pipe before draining stdin cannot deadlock us.
pub fn pipe(command: &str, input: &[u8]) -> EdResult<Vec<u8>> {
    let mut child = shell(command)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()?;
    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| io::Error::other("failed to open command input"))?;

    let output = thread::scope(|s| {
        let feeder = s.spawn(move || match stdin.write_all(input) {
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
            other => other,
        });
        let output = child.wait_with_output();
        let fed = feeder
            .join()
            .map_err(|_| io::Error::other("command input writer panicked"))?;
        fed?;
        output
    })?;

    if !output.status.success() {
        log::warn!("{:?} exited with {}", command, output.status);
    }
    Ok(output.stdout)
}
