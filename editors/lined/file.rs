//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! File load and save.

use crate::buffer::Buffer;
use crate::error::EdResult;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};

/// Read every line from `reader`, terminators included.
///
/// A final line without a terminator gets one.
pub fn read_lines<R: BufRead>(mut reader: R) -> EdResult<Vec<String>> {
    let mut lines = Vec::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
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

/// Open `path` for loading into a fresh buffer.
///
/// A file that does not exist is not an error: `Ok(None)` starts an empty
/// buffer.
pub fn load(path: &str) -> EdResult<Option<Vec<String>>> {
    match File::open(path) {
        Ok(file) => Ok(Some(read_lines(BufReader::new(file))?)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("{}: not found, starting empty", path);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Read `path` for insertion into the buffer.  The file must exist.
pub fn read(path: &str) -> EdResult<Vec<String>> {
    let file = File::open(path)?;
    read_lines(BufReader::new(file))
}

/// Write `lines` verbatim.  Returns how many were written.
pub fn write_lines<'a, W, I>(writer: &mut W, lines: I) -> io::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a str>,
{
    let mut count = 0;
    for line in lines {
        writer.write_all(line.as_bytes())?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}

/// Write the whole buffer to `path`, truncating it or appending to it.
pub fn save(buf: &Buffer, path: &str, append: bool) -> EdResult<usize> {
    let file = if append {
        OpenOptions::new().create(true).append(true).open(path)?
    } else {
        File::create(path)?
    };
    let mut writer = BufWriter::new(file);
    let count = write_lines(&mut writer, buf.iter().map(|(_, text)| text))?;
    log::debug!("{} lines to {} (append={})", count, path, append);
    Ok(count)
}
