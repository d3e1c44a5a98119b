//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! lined - a line-oriented text editor.
//!
//! The buffer is a linked sequence of lines with a current line ("dot").
//! Each command line names zero, one or two lines, then a command symbol,
//! then an argument: `1,$p`, `2d`, `s/old/new/g`, `w file`.

pub mod address;
pub mod buffer;
pub mod editor;
pub mod error;
pub mod file;
pub mod marks;
pub mod options;
pub mod parser;
pub mod session;
pub mod shell;
pub mod subst;

pub use editor::Editor;
pub use error::{EdError, EdResult};
pub use options::Options;

/// Text domain for translated messages.
pub const PROJECT_NAME: &str = "posixutils-rs";
