//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Command dispatch and the prompt loop.

use crate::address::split_delimited;
use crate::buffer::{Buffer, LineId};
use crate::error::{EdError, EdResult};
use crate::file;
use crate::marks::MarkTable;
use crate::options::Options;
use crate::parser::{self, Command, CommandClass, ParsedCommand};
use crate::session::{Provenance, Session};
use crate::shell;
use crate::subst::Substitutor;
use std::borrow::Cow;
use std::io::{self, BufRead, Write};

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Editor state: the buffer and everything that travels with it, plus the
/// streams commands are read from and written to.
pub struct Editor<R: BufRead, W: Write, E: Write> {
    pub buf: Buffer,
    pub marks: MarkTable,
    pub session: Session,
    pub options: Options,
    /// Commands and text blocks
    reader: R,
    /// Printed lines and reports
    writer: W,
    /// Diagnostics
    errors: E,
    pub should_quit: bool,
}

impl<R: BufRead, W: Write, E: Write> Editor<R, W, E> {
    pub fn new(reader: R, writer: W, errors: E, options: Options) -> Self {
        Editor {
            buf: Buffer::new(),
            marks: MarkTable::new(),
            session: Session::new(),
            options,
            reader,
            writer,
            errors,
            should_quit: false,
        }
    }

    fn print_prompt(&mut self) -> io::Result<()> {
        if let Some(prompt) = &self.options.prompt {
            write!(self.writer, "{}", prompt)?;
            self.writer.flush()?;
        }
        Ok(())
    }

    fn print_error(&mut self, err: &EdError) -> io::Result<()> {
        self.writer.flush()?;
        writeln!(self.errors, "{}", err)?;
        self.errors.flush()
    }

    /// Print a line-count report unless silenced.
    fn report(&mut self, msg: &str) -> io::Result<()> {
        if !self.options.silent {
            writeln!(self.writer, "{}", msg)?;
        }
        Ok(())
    }

    /// Read one input line.  Bytes that are not UTF-8 become U+FFFD, so a
    /// bad line is still a whole line and never desynchronizes commands
    /// from text blocks.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut raw = Vec::new();
        if self.reader.read_until(b'\n', &mut raw)? == 0 {
            return Ok(None);
        }
        match String::from_utf8(raw) {
            Ok(line) => Ok(Some(line)),
            Err(e) => {
                log::warn!("input line is not valid UTF-8");
                Ok(Some(String::from_utf8_lossy(e.as_bytes()).into_owned()))
            }
        }
    }

    /// Read a text block for `a`/`c`: up to a line holding only `.`, or EOF.
    fn read_block(&mut self) -> EdResult<Vec<String>> {
        let mut lines = Vec::new();
        while let Some(mut line) = self.read_line()? {
            if line.trim_end_matches('\n') == "." {
                break;
            }
            if !line.ends_with('\n') {
                line.try_reserve(1)?;
                line.push('\n');
            }
            lines.try_reserve(1)?;
            lines.push(line);
        }
        Ok(lines)
    }

    /// First addressed line; commands that need one fail on an empty buffer.
    fn first(&self, cmd: &ParsedCommand) -> EdResult<LineId> {
        cmd.from.ok_or(if self.buf.is_empty() {
            EdError::EmptyBuffer
        } else {
            EdError::InvalidAddress
        })
    }

    /// The addressed lines, inclusive.
    fn range(&self, cmd: &ParsedCommand) -> EdResult<Vec<LineId>> {
        let from = self.first(cmd)?;
        self.buf.span(from, cmd.to.unwrap_or(from))
    }

    /// Insert `lines` after `at` (at the start when None).  Returns the
    /// number inserted; the last one becomes the current line.
    fn insert_lines(&mut self, mut at: Option<LineId>, lines: Vec<String>) -> EdResult<usize> {
        let count = lines.len();
        for line in lines {
            at = Some(self.buf.insert_after(at, line)?);
        }
        if count > 0 {
            self.session.touch();
        }
        Ok(count)
    }

    /// Expand a shell command line, echoing it when anything changed, and
    /// remember it for `!!`.
    fn shell_command(&mut self, text: &str) -> EdResult<String> {
        let expanded = shell::expand(
            text,
            self.session.last_shell.as_deref(),
            self.session.filename.as_deref(),
        )?;
        if expanded.changed {
            writeln!(self.writer, "{}", expanded.command)?;
            self.writer.flush()?;
        }
        self.session.last_shell = Some(expanded.command.clone());
        Ok(expanded.command)
    }

    /// Discard the buffer and fill it with `lines`.
    fn replace_buffer(&mut self, lines: Vec<String>) -> EdResult<()> {
        self.buf.clear();
        self.marks.clear();
        for line in lines {
            self.buf.insert_before(None, line)?;
        }
        self.session.mark_saved();
        Ok(())
    }

    /// Load `path` as the buffer.  A missing file leaves an empty buffer
    /// that remembers the name.
    pub fn load_file(&mut self, path: &str) -> EdResult<()> {
        let lines = file::load(path)?;
        let count = lines.as_ref().map(Vec::len);
        self.replace_buffer(lines.unwrap_or_default())?;
        self.session.filename = Some(path.to_string());
        self.session.provenance = Provenance::File;
        if let Some(n) = count {
            self.report(&format!("{} line{} read from \"{}\"", n, plural(n), path))?;
        }
        Ok(())
    }

    fn edit(&mut self, arg: &str, force: bool) -> EdResult<()> {
        self.session.guard(force)?;
        let arg = arg.trim();
        match arg.strip_prefix('!') {
            Some(text) => {
                let command = self.shell_command(text)?;
                let lines = shell::read(&command)?;
                let n = lines.len();
                self.replace_buffer(lines)?;
                self.session.provenance = Provenance::Shell;
                self.report(&format!(
                    "{} line{} read from \"!{}\"",
                    n,
                    plural(n),
                    command
                ))?;
                Ok(())
            }
            None => {
                let name = self.session.resolve_filename(arg)?;
                self.load_file(&name)
            }
        }
    }

    fn read(&mut self, cmd: &ParsedCommand) -> EdResult<()> {
        let arg = cmd.rest.trim();
        let (lines, source) = match arg.strip_prefix('!') {
            Some(text) => {
                let command = self.shell_command(text)?;
                (shell::read(&command)?, format!("!{}", command))
            }
            None => {
                let name = self.session.resolve_filename(arg)?;
                (file::read(&name)?, name)
            }
        };
        let n = self.insert_lines(cmd.from, lines)?;
        self.report(&format!("{} line{} read from \"{}\"", n, plural(n), source))?;
        Ok(())
    }

    fn write(&mut self, cmd: &ParsedCommand) -> EdResult<()> {
        let (quit, arg) = match cmd.rest.strip_prefix('q') {
            Some(rest) => (true, rest.trim()),
            None => (false, cmd.rest.trim()),
        };

        match arg.strip_prefix('!') {
            Some(text) => {
                let command = self.shell_command(text)?;
                let mut input = Vec::new();
                for (_, line) in self.buf.iter() {
                    input.try_reserve(line.len())?;
                    input.extend_from_slice(line.as_bytes());
                }
                let output = shell::pipe(&command, &input)?;
                self.writer.write_all(&output)?;
            }
            None => {
                let name = self.session.resolve_filename(arg)?;
                let n = file::save(&self.buf, &name, false)?;
                if self.session.filename.is_none() {
                    self.session.filename = Some(name.clone());
                }
                self.session.mark_saved();
                self.report(&format!("{} line{} written to \"{}\"", n, plural(n), name))?;
            }
        }

        if quit {
            self.session.guard(false)?;
            self.should_quit = true;
        }
        Ok(())
    }

    fn write_append(&mut self, cmd: &ParsedCommand) -> EdResult<()> {
        let name = self.session.resolve_filename(&cmd.rest)?;
        let n = file::save(&self.buf, &name, true)?;
        self.session.mark_saved();
        self.report(&format!("{} line{} written to \"{}\"", n, plural(n), name))?;
        Ok(())
    }

    fn print(&mut self, cmd: &ParsedCommand, numbered: bool) -> EdResult<()> {
        let lines = self.range(cmd)?;
        let mut number = if numbered {
            self.buf.line_number(lines[0]).unwrap_or(1)
        } else {
            0
        };
        for &id in &lines {
            let text = self.buf.text(id).ok_or(EdError::InvalidAddress)?;
            if numbered {
                write!(self.writer, "{:<5} {}", number, text)?;
                number += 1;
            } else {
                self.writer.write_all(text.as_bytes())?;
            }
        }

        if let Some(&last) = lines.last() {
            let after = self.buf.next(last).unwrap_or(last);
            self.buf.set_dot(after)?;
        }
        Ok(())
    }

    fn delete(&mut self, cmd: &ParsedCommand) -> EdResult<()> {
        let lines = self.range(cmd)?;
        for id in lines {
            self.buf.remove(id)?;
        }
        self.session.touch();
        Ok(())
    }

    fn change(&mut self, cmd: &ParsedCommand) -> EdResult<()> {
        let lines = self.range(cmd)?;
        let block = self.read_block()?;

        let anchor = self.buf.prev(lines[0]);
        for id in lines {
            self.buf.remove(id)?;
        }
        self.session.touch();

        let n = self.insert_lines(anchor, block)?;
        self.report(&format!("{} line{} appended", n, plural(n)))?;
        Ok(())
    }

    fn append(&mut self, cmd: &ParsedCommand) -> EdResult<()> {
        let block = self.read_block()?;
        let n = self.insert_lines(cmd.from, block)?;
        self.report(&format!("{} line{} appended", n, plural(n)))?;
        Ok(())
    }

    fn substitute(&mut self, cmd: &ParsedCommand) -> EdResult<()> {
        let pattern = cmd.pattern.as_deref().ok_or(EdError::NoPattern)?;
        let (replacement, suffix) = split_delimited(&cmd.rest, '/');

        let mut global = false;
        let mut print = false;
        for ch in suffix.trim().chars() {
            match ch {
                'g' => global = true,
                'p' => print = true,
                _ => return Err(EdError::InvalidSuffix(ch)),
            }
        }

        let subst = Substitutor::new(pattern, &replacement, global)?;
        let lines = self.range(cmd)?;

        let mut last_changed = None;
        for id in lines {
            let text = self.buf.text(id).ok_or(EdError::InvalidAddress)?;
            let replaced = match subst.apply(text)? {
                Cow::Borrowed(_) => None,
                Cow::Owned(new) => Some(new),
            };
            if let Some(new) = replaced {
                self.buf.set_text(id, new)?;
                last_changed = Some(id);
            }
        }

        if let Some(id) = last_changed {
            self.session.touch();
            if print {
                if let Some(text) = self.buf.text(id) {
                    self.writer.write_all(text.as_bytes())?;
                }
            }
        }
        Ok(())
    }

    fn join(&mut self, cmd: &ParsedCommand) -> EdResult<()> {
        let from = self.first(cmd)?;
        let to = match cmd.to {
            Some(to) => to,
            None => match self.buf.next(from) {
                Some(next) => next,
                None => return Ok(()),
            },
        };
        let lines = self.buf.span(from, to)?;
        if lines.len() < 2 {
            return Ok(());
        }

        let last = lines.len() - 1;
        let mut size = 0;
        for (i, &id) in lines.iter().enumerate() {
            let text = self.buf.text(id).ok_or(EdError::InvalidAddress)?;
            size += if i == last {
                text.len()
            } else {
                text.trim_end_matches('\n').len()
            };
        }

        let mut merged = String::new();
        merged.try_reserve(size)?;
        for (i, &id) in lines.iter().enumerate() {
            let text = self.buf.text(id).ok_or(EdError::InvalidAddress)?;
            if i == last {
                merged.push_str(text);
            } else {
                merged.push_str(text.trim_end_matches('\n'));
            }
        }

        self.buf.set_text(from, merged)?;
        for &id in &lines[1..] {
            self.buf.remove(id)?;
        }
        self.buf.set_dot(from)?;
        self.session.touch();
        Ok(())
    }

    /// Parse and run one command line (terminator already stripped).
    pub fn execute_line(&mut self, line: &str) -> EdResult<()> {
        let cmd = parser::parse(line, &self.buf, &self.marks)?;
        if cmd.command.class() == CommandClass::Address {
            if let Some(line) = cmd.rebase {
                self.buf.set_dot(line)?;
            }
        }

        match cmd.command {
            Command::Append => self.append(&cmd)?,
            Command::Change => self.change(&cmd)?,
            Command::Delete => self.delete(&cmd)?,
            Command::Edit => self.edit(&cmd.rest, false)?,
            Command::ForceEdit => self.edit(&cmd.rest, true)?,
            Command::Read => self.read(&cmd)?,
            Command::Write => self.write(&cmd)?,
            Command::WriteAppend => self.write_append(&cmd)?,
            Command::Print => self.print(&cmd, false)?,
            Command::Number => self.print(&cmd, true)?,
            Command::Substitute => self.substitute(&cmd)?,
            Command::Join => self.join(&cmd)?,
            Command::Mark => {
                let line = self.first(&cmd)?;
                let sym = cmd.mark.ok_or(EdError::InvalidMark)?;
                self.marks.set(sym, line)?;
            }
            Command::Show => {
                let line = self.first(&cmd)?;
                let text = self.buf.text(line).ok_or(EdError::InvalidAddress)?;
                self.writer.write_all(text.as_bytes())?;
            }
            Command::Comment => {
                if let Some(line) = cmd.from {
                    self.buf.set_dot(line)?;
                }
            }
            Command::Shell => {
                let command = self.shell_command(cmd.rest.trim_start())?;
                shell::run(&command, &mut self.writer)?;
            }
            Command::Quit => {
                self.session.guard(false)?;
                self.should_quit = true;
            }
            Command::ForceQuit => self.should_quit = true,
            Command::Goto => {
                let line = self.first(&cmd)?;
                self.buf.set_dot(line)?;
                let text = self.buf.text(line).ok_or(EdError::InvalidAddress)?;
                self.writer.write_all(text.as_bytes())?;
            }
            Command::Nothing => {}
        }
        Ok(())
    }

    /// Run one line of input.  A failed command is reported and the
    /// session carries on; only a fatal error comes back as `Err`.
    pub fn process_line(&mut self, line: &str) -> EdResult<bool> {
        let line = line.strip_suffix('\n').unwrap_or(line);
        match self.execute_line(line) {
            Ok(()) => {}
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                log::debug!("{:?}: {}", line, e);
                self.print_error(&e)?;
            }
        }
        self.writer.flush()?;
        Ok(!self.should_quit)
    }

    /// Run the main editor loop until a quit command or end of input.
    pub fn run(&mut self) -> EdResult<()> {
        loop {
            self.print_prompt()?;

            let line = match self.read_line()? {
                Some(l) => l,
                None => break,
            };

            if !self.process_line(&line)? {
                break;
            }
        }

        self.writer.flush()?;
        Ok(())
    }
}
