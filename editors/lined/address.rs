//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Address resolution.
//!
//! Scans the address prefix of a command line left to right and resolves
//! each atom against the buffer as it goes:
//!
//! | syntax      | meaning                                        |
//! |-------------|------------------------------------------------|
//! | `.`         | current line                                   |
//! | `$`         | last line                                      |
//! | `N`         | line N                                         |
//! | `'x`        | line holding mark x                            |
//! | `+N` / `-N` | N lines after/before (N defaults to 1)         |
//! | `,`         | range separator; alone, the whole buffer       |
//! | `;`         | current line (or the preceding address) to `$` |
//! | `/re/`      | pattern literal, handed to the command         |
//!
//! `/re/` never moves the current line.

use crate::buffer::{Buffer, Direction, LineId};
use crate::error::{EdError, EdResult};
use crate::marks::MarkTable;

/// Result of scanning an address prefix.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AddressRange {
    /// First address, if one was given
    pub from: Option<LineId>,
    /// Second address, if one was given
    pub to: Option<LineId>,
    /// Pattern carried by a `/re/` address
    pub pattern: Option<String>,
    /// Current line requested by `;`
    pub rebase: Option<LineId>,
    /// True if any line address atom was present
    pub explicit: bool,
}

#[derive(Clone, Copy, PartialEq)]
enum Side {
    From,
    To,
}

impl AddressRange {
    fn set(&mut self, side: Side, line: LineId) {
        match side {
            Side::From => self.from = Some(line),
            Side::To => self.to = Some(line),
        }
    }
}

/// Byte cursor over the command line.
struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Scanner { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace()) {
            self.bump();
        }
    }

    fn number(&mut self) -> EdResult<usize> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        self.src[start..self.pos]
            .parse()
            .map_err(|_| EdError::InvalidAddress)
    }

    /// True if the next non-blank character starts a line address.
    fn at_address(&self) -> bool {
        let rest = self.src[self.pos..].trim_start();
        matches!(
            rest.chars().next(),
            Some('.' | '$' | '\'' | '+' | '-' | '0'..='9')
        )
    }
}

/// Split `s` at the first unescaped `delim`.
///
/// Returns the text before the delimiter, with `\delim` unescaped and
/// every other backslash pair kept as written, and the remainder after the
/// delimiter.  Without a closing delimiter the whole of `s` is taken.
pub fn split_delimited(s: &str, delim: char) -> (String, &str) {
    let mut out = String::new();
    let mut iter = s.char_indices();
    while let Some((i, ch)) = iter.next() {
        if ch == '\\' {
            match iter.next() {
                Some((_, next)) if next == delim => out.push(next),
                Some((_, next)) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            }
        } else if ch == delim {
            return (out, &s[i + ch.len_utf8()..]);
        } else {
            out.push(ch);
        }
    }
    (out, "")
}

/// Resolve the address prefix of `src`.
///
/// Returns the resolved addresses and the byte offset where the prefix
/// ends (the command character, if any).  Any atom that lands outside the
/// buffer is `InvalidAddress`.
pub fn resolve(src: &str, buf: &Buffer, marks: &MarkTable) -> EdResult<(AddressRange, usize)> {
    let mut sc = Scanner::new(src);
    let mut range = AddressRange::default();
    let mut dot = buf.dot();
    let mut side = Side::From;
    // address accumulated on the current side, base for +N/-N
    let mut current: Option<LineId> = None;

    loop {
        sc.skip_ws();
        let Some(ch) = sc.peek() else { break };
        match ch {
            '.' => {
                sc.bump();
                let line = dot.ok_or(EdError::InvalidAddress)?;
                current = Some(line);
                range.set(side, line);
                range.explicit = true;
            }
            '$' => {
                sc.bump();
                let line = buf.tail().ok_or(EdError::InvalidAddress)?;
                current = Some(line);
                range.set(side, line);
                range.explicit = true;
            }
            '0'..='9' => {
                let n = sc.number()?;
                let line = buf.at(n).ok_or(EdError::InvalidAddress)?;
                current = Some(line);
                range.set(side, line);
                range.explicit = true;
            }
            '\'' => {
                sc.bump();
                let sym = sc.bump().ok_or(EdError::InvalidMark)?;
                let line = marks.get(sym, buf)?;
                current = Some(line);
                range.set(side, line);
                range.explicit = true;
            }
            '+' | '-' => {
                sc.bump();
                let n = if sc.peek().is_some_and(|c| c.is_ascii_digit()) {
                    sc.number()?
                } else {
                    1
                };
                let dir = if ch == '+' {
                    Direction::Forward
                } else {
                    Direction::Backward
                };
                let base = current.or(dot).ok_or(EdError::InvalidAddress)?;
                let line = buf.offset(base, n, dir).ok_or(EdError::InvalidAddress)?;
                current = Some(line);
                range.set(side, line);
                range.explicit = true;
            }
            ',' => {
                sc.bump();
                range.explicit = true;
                if side == Side::From && range.from.is_none() && !sc.at_address() {
                    range.from = Some(buf.head().ok_or(EdError::InvalidAddress)?);
                    range.to = Some(buf.tail().ok_or(EdError::InvalidAddress)?);
                }
                side = Side::To;
                current = None;
            }
            ';' => {
                sc.bump();
                range.explicit = true;
                let from = range.from.or(dot).ok_or(EdError::InvalidAddress)?;
                dot = Some(from);
                range.rebase = Some(from);
                range.from = Some(from);
                range.to = Some(buf.tail().ok_or(EdError::InvalidAddress)?);
                side = Side::To;
                current = None;
            }
            '/' => {
                sc.bump();
                let (pattern, rest) = split_delimited(&src[sc.pos..], '/');
                range.pattern = Some(pattern);
                sc.pos = src.len() - rest.len();
                break;
            }
            _ => break,
        }
    }

    log::trace!("address {:?} -> {:?}", &src[..sc.pos], range);
    Ok((range, sc.pos))
}
