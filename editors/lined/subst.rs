//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Pattern substitution.
//!
//! A substitution runs in two passes over one line: the first records the
//! span of every match, the second sizes the output exactly and builds it
//! from the unmatched text and the expanded replacement template.

use crate::error::EdResult;
use regex::Regex;
use std::borrow::Cow;
use std::ops::Range;

#[derive(Clone, Debug, PartialEq)]
enum Segment {
    Literal(String),
    Matched,
}

/// Replacement template: `&` is the matched text, `\&` a literal `&`,
/// everything else is copied as written.
#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    segments: Vec<Segment>,
    literal_len: usize,
    matched_refs: usize,
}

impl Template {
    pub fn parse(template: &str) -> Template {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '\\' if chars.peek() == Some(&'&') => {
                    chars.next();
                    literal.push('&');
                }
                '&' => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Matched);
                }
                _ => literal.push(ch),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        let literal_len = segments
            .iter()
            .map(|s| match s {
                Segment::Literal(text) => text.len(),
                Segment::Matched => 0,
            })
            .sum();
        let matched_refs = segments.iter().filter(|s| **s == Segment::Matched).count();

        Template {
            segments,
            literal_len,
            matched_refs,
        }
    }

    /// Length in bytes of the expansion for a match of `matched_len` bytes.
    pub fn expanded_len(&self, matched_len: usize) -> usize {
        self.literal_len + self.matched_refs * matched_len
    }

    fn expand_into(&self, out: &mut String, matched: &str) {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Matched => out.push_str(matched),
            }
        }
    }
}

/// Rewrite one line.
///
/// The terminator is kept out of the match so `$` anchors at end of line.
/// A line without matches comes back borrowed and unchanged.
pub fn substitute<'a>(
    line: &'a str,
    pattern: &Regex,
    template: &Template,
    replace_all: bool,
) -> EdResult<Cow<'a, str>> {
    let (content, terminator) = match line.strip_suffix('\n') {
        Some(content) => (content, "\n"),
        None => (line, ""),
    };

    // pass 1: record matches
    let mut matches: Vec<Range<usize>> = Vec::new();
    for m in pattern.find_iter(content) {
        matches.push(m.range());
        if !replace_all {
            break;
        }
    }
    if matches.is_empty() {
        return Ok(Cow::Borrowed(line));
    }

    let matched_total: usize = matches.iter().map(|m| m.len()).sum();
    let expanded_total: usize = matches
        .iter()
        .map(|m| template.expanded_len(m.len()))
        .sum();
    let out_len = line.len() - matched_total + expanded_total;

    // pass 2: build
    let mut out = String::new();
    out.try_reserve_exact(out_len)?;
    let mut copied = 0;
    for m in &matches {
        out.push_str(&content[copied..m.start]);
        template.expand_into(&mut out, &content[m.clone()]);
        copied = m.end;
    }
    out.push_str(&content[copied..]);
    out.push_str(terminator);
    debug_assert_eq!(out.len(), out_len);

    Ok(Cow::Owned(out))
}

/// Compiled substitute command, applied line by line.
#[derive(Debug)]
pub struct Substitutor {
    regex: Regex,
    template: Template,
    global: bool,
}

impl Substitutor {
    /// Compile `pattern`.  Fails with `PatternSyntax` before any line is
    /// touched.
    pub fn new(pattern: &str, replacement: &str, global: bool) -> EdResult<Self> {
        let regex = Regex::new(pattern)?;
        Ok(Substitutor {
            regex,
            template: Template::parse(replacement),
            global,
        })
    }

    pub fn apply<'a>(&self, line: &'a str) -> EdResult<Cow<'a, str>> {
        substitute(line, &self.regex, &self.template, self.global)
    }
}
