//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Runtime options, set from the command line.

#[derive(Clone, Debug, Default)]
pub struct Options {
    /// Prompt printed before each command, if any
    pub prompt: Option<String>,
    /// Suppress line-count reports
    pub silent: bool,
}

impl Options {
    pub fn new(prompt: Option<String>, silent: bool) -> Options {
        Options {
            prompt: prompt.filter(|p| !p.is_empty()),
            silent,
        }
    }
}
