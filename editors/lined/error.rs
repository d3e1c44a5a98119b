//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Error types for the line editor.

use std::collections::TryReserveError;
use std::io;

/// Errors that can abort a single command.
#[derive(Debug, thiserror::Error)]
pub enum EdError {
    /// Character after the address is not a command symbol
    #[error("Unknown command: {0}")]
    UnknownCommand(char),
    /// Command symbol reserved but never implemented (g, i, u)
    #[error("Unimplemented command: {0}")]
    Unimplemented(char),
    /// Address outside the buffer or malformed
    #[error("Invalid address")]
    InvalidAddress,
    /// Mark slot empty, or its line was deleted
    #[error("Mark not set: {0}")]
    MarkNotSet(char),
    /// Mark symbol missing or outside '!'..='~'
    #[error("Unacceptable or missing mark")]
    InvalidMark,
    /// Structural removal on an empty buffer
    #[error("Buffer is empty")]
    EmptyBuffer,
    /// Substitute without a search pattern
    #[error("No search pattern")]
    NoPattern,
    /// Pattern failed to compile
    #[error("Pattern syntax error: {0}")]
    PatternSyntax(String),
    /// Unknown substitute flag
    #[error("Invalid substitute suffix: {0}")]
    InvalidSuffix(char),
    /// No filename given and none remembered
    #[error("No current filename")]
    NoFilename,
    /// `!!` with no earlier shell command
    #[error("No previous command")]
    NoPreviousCommand,
    /// Guard refusal: dirty buffer and command not forced
    #[error("No write since last change")]
    UnsavedChanges,
    /// File or shell I/O failure
    #[error("{0}")]
    Io(#[from] io::Error),
    /// Could not allocate a line or substitution result
    #[error("Out of memory")]
    AllocationFailure,
}

impl EdError {
    /// Fatal errors end the session instead of returning to the prompt.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EdError::AllocationFailure)
    }
}

impl From<regex::Error> for EdError {
    /// Keep only the summary line of a multi-line parse error.
    fn from(e: regex::Error) -> Self {
        let msg = e.to_string();
        let summary = msg.lines().last().unwrap_or_default().trim();
        let summary = summary.strip_prefix("error: ").unwrap_or(summary);
        EdError::PatternSyntax(summary.to_string())
    }
}

impl From<TryReserveError> for EdError {
    fn from(_: TryReserveError) -> Self {
        EdError::AllocationFailure
    }
}

/// Result type for editor operations.
pub type EdResult<T> = Result<T, EdError>;
