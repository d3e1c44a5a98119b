//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Per-session state outside the buffer.

use crate::error::{EdError, EdResult};

/// Where the buffer contents came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Provenance {
    #[default]
    File,
    Shell,
}

#[derive(Debug, Default)]
pub struct Session {
    /// The remembered filename
    pub filename: Option<String>,
    /// Unsaved changes exist
    pub dirty: bool,
    /// Last command run by `!`, for `!!`
    pub last_shell: Option<String>,
    pub provenance: Provenance,
}

impl Session {
    pub fn new() -> Session {
        Session::default()
    }

    /// Record a buffer mutation.
    pub fn touch(&mut self) {
        self.dirty = true;
    }

    /// Record a load or a write that made the buffer match its file.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Refuse to discard unsaved changes unless forced.
    pub fn guard(&self, force: bool) -> EdResult<()> {
        if self.dirty && !force {
            return Err(EdError::UnsavedChanges);
        }
        Ok(())
    }

    /// Filename from the command, falling back to the remembered one.
    pub fn resolve_filename(&self, given: &str) -> EdResult<String> {
        let given = given.trim();
        if !given.is_empty() {
            return Ok(given.to_string());
        }
        self.filename.clone().ok_or(EdError::NoFilename)
    }
}
