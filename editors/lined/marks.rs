//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Line marks, one slot per printable non-space ASCII character.

use crate::buffer::{Buffer, LineId};
use crate::error::{EdError, EdResult};

const FIRST_MARK: u8 = b'!';
const LAST_MARK: u8 = b'~';
const MARK_SLOTS: usize = (LAST_MARK - FIRST_MARK + 1) as usize;

/// Marks hold non-owning line ids.  A mark whose line was deleted reads
/// back as unset.
#[derive(Debug)]
pub struct MarkTable {
    slots: [Option<LineId>; MARK_SLOTS],
}

impl MarkTable {
    pub fn new() -> MarkTable {
        MarkTable {
            slots: [None; MARK_SLOTS],
        }
    }

    /// True if `sym` can name a mark.
    pub fn is_valid(sym: char) -> bool {
        sym.is_ascii() && (FIRST_MARK..=LAST_MARK).contains(&(sym as u8))
    }

    fn index(sym: char) -> EdResult<usize> {
        if !Self::is_valid(sym) {
            return Err(EdError::InvalidMark);
        }
        Ok((sym as u8 - FIRST_MARK) as usize)
    }

    /// Register mark `sym` on `line`.
    pub fn set(&mut self, sym: char, line: LineId) -> EdResult<()> {
        let i = Self::index(sym)?;
        self.slots[i] = Some(line);
        Ok(())
    }

    /// Look up mark `sym`, checking that its line is still in `buf`.
    pub fn get(&self, sym: char, buf: &Buffer) -> EdResult<LineId> {
        let i = Self::index(sym)?;
        match self.slots[i] {
            Some(line) if buf.contains(line) => Ok(line),
            _ => Err(EdError::MarkNotSet(sym)),
        }
    }

    pub fn clear(&mut self) {
        self.slots = [None; MARK_SLOTS];
    }
}

impl Default for MarkTable {
    fn default() -> Self {
        Self::new()
    }
}
