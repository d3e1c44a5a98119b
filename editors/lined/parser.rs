//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Command parsing.

use crate::address::{self, split_delimited};
use crate::buffer::{Buffer, LineId};
use crate::error::{EdError, EdResult};
use crate::marks::MarkTable;

/// Command symbols.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// (.)a - append text after line
    Append,
    /// (.,.)c - change lines
    Change,
    /// (.,.)d - delete lines
    Delete,
    /// e file - edit file, guarded
    Edit,
    /// E file - edit file unconditionally
    ForceEdit,
    /// (.)r file - read file after line
    Read,
    /// w [file|!cmd], wq [file]
    Write,
    /// W file - append buffer to file
    WriteAppend,
    /// (.,.)p - print lines
    Print,
    /// (.,.)n - print with line numbers
    Number,
    /// (.,.)s/re/replacement/[gp] - substitute
    Substitute,
    /// (.,.+1)j - join lines
    Join,
    /// (.)kx - mark line
    Mark,
    /// (.)= - print line
    Show,
    /// (.)# - select line, nothing else
    Comment,
    /// !command - shell escape
    Shell,
    /// q - quit, guarded
    Quit,
    /// Q - quit unconditionally
    ForceQuit,
    /// Address with no command: go to the line and print it
    Goto,
    /// Empty line
    Nothing,
}

/// How a command uses the address prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandClass {
    /// Operates on the resolved line or range
    Address,
    /// Operates on a filename or shell command; addresses are ignored
    File,
}

/// Symbols declared by the command set but never implemented.
const UNIMPLEMENTED: &str = "giu";

impl Command {
    pub fn from_symbol(ch: char) -> Option<Command> {
        let cmd = match ch {
            'a' => Command::Append,
            'c' => Command::Change,
            'd' => Command::Delete,
            'e' => Command::Edit,
            'E' => Command::ForceEdit,
            'r' => Command::Read,
            'w' => Command::Write,
            'W' => Command::WriteAppend,
            'p' => Command::Print,
            'n' => Command::Number,
            's' => Command::Substitute,
            'j' => Command::Join,
            'k' => Command::Mark,
            '=' => Command::Show,
            '#' => Command::Comment,
            '!' => Command::Shell,
            'q' => Command::Quit,
            'Q' => Command::ForceQuit,
            _ => return None,
        };
        Some(cmd)
    }

    pub fn class(self) -> CommandClass {
        match self {
            Command::Edit
            | Command::ForceEdit
            | Command::Write
            | Command::WriteAppend
            | Command::Shell
            | Command::Quit
            | Command::ForceQuit
            | Command::Nothing => CommandClass::File,
            _ => CommandClass::Address,
        }
    }
}

/// A parsed command line.  Built per input line and consumed by dispatch.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedCommand {
    pub command: Command,
    /// First line; defaults to the current line (None on an empty buffer)
    pub from: Option<LineId>,
    /// Second line, only when one was given
    pub to: Option<LineId>,
    /// Text after the command symbol
    pub rest: String,
    /// Search pattern from a `/re/` address or embedded in `rest`
    pub pattern: Option<String>,
    /// Mark symbol for `k`
    pub mark: Option<char>,
    /// Current line requested by a `;` address
    pub rebase: Option<LineId>,
}

/// Parse one command line (terminator already stripped).
pub fn parse(line: &str, buf: &Buffer, marks: &MarkTable) -> EdResult<ParsedCommand> {
    let (range, used) = address::resolve(line, buf, marks)?;
    let tail = line[used..].trim_start();

    let mut chars = tail.chars();
    let command = match chars.next() {
        None if range.explicit => Command::Goto,
        None => Command::Nothing,
        Some(ch) => match Command::from_symbol(ch) {
            Some(cmd) => cmd,
            None if UNIMPLEMENTED.contains(ch) => return Err(EdError::Unimplemented(ch)),
            None => return Err(EdError::UnknownCommand(ch)),
        },
    };
    let mut rest = chars.as_str().to_string();

    let mut pattern = range.pattern;
    if command == Command::Substitute {
        if let Some(body) = rest.trim_start().strip_prefix('/') {
            let (pat, remainder) = split_delimited(body, '/');
            pattern = Some(pat);
            rest = remainder.to_string();
        }
    }

    let mark = match command {
        Command::Mark => rest.trim_start().chars().next(),
        _ => None,
    };

    let dot = range.rebase.or(buf.dot());
    let parsed = ParsedCommand {
        command,
        from: range.from.or(dot),
        to: range.to,
        rest,
        pattern,
        mark,
        rebase: range.rebase,
    };
    log::debug!("parsed {:?} as {:?}", line, parsed.command);
    Ok(parsed)
}
