//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Line store for the editor.
//!
//! Lines live in a doubly-linked list threaded through an arena of slots.
//! Commands, marks and the current line refer to lines by [`LineId`], which
//! stays valid across unrelated inserts and deletes.  Removing a line bumps
//! its slot's generation, so an id kept past the removal no longer resolves.

use crate::error::{EdError, EdResult};

/// Stable handle to a line in a [`Buffer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LineId {
    slot: u32,
    generation: u32,
}

/// Walking direction for [`Buffer::offset`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

#[derive(Debug)]
struct Node {
    text: String,
    prev: Option<u32>,
    next: Option<u32>,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// The line buffer.
#[derive(Debug, Default)]
pub struct Buffer {
    slots: Vec<Slot>,
    free: Vec<u32>,
    head: Option<u32>,
    tail: Option<u32>,
    /// Current line ("dot"); None only when the buffer is empty
    dot: Option<u32>,
    len: usize,
}

impl Buffer {
    /// Create a new empty buffer.
    pub fn new() -> Buffer {
        Buffer::default()
    }

    /// Return the number of lines in the buffer.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn head(&self) -> Option<LineId> {
        self.head.map(|s| self.id_of(s))
    }

    pub fn tail(&self) -> Option<LineId> {
        self.tail.map(|s| self.id_of(s))
    }

    /// The current line.
    pub fn dot(&self) -> Option<LineId> {
        self.dot.map(|s| self.id_of(s))
    }

    /// Move the current line.
    pub fn set_dot(&mut self, id: LineId) -> EdResult<()> {
        if !self.contains(id) {
            return Err(EdError::InvalidAddress);
        }
        self.dot = Some(id.slot);
        Ok(())
    }

    /// True if `id` names a line currently in the buffer.
    pub fn contains(&self, id: LineId) -> bool {
        self.node(id).is_some()
    }

    /// Text of a line, including its terminator.
    pub fn text(&self, id: LineId) -> Option<&str> {
        self.node(id).map(|n| n.text.as_str())
    }

    /// Replace a line's text in place, returning the old text.
    pub fn set_text(&mut self, id: LineId, text: String) -> EdResult<String> {
        let node = self.node_mut(id).ok_or(EdError::InvalidAddress)?;
        Ok(std::mem::replace(&mut node.text, text))
    }

    pub fn next(&self, id: LineId) -> Option<LineId> {
        self.node(id)?.next.map(|s| self.id_of(s))
    }

    pub fn prev(&self, id: LineId) -> Option<LineId> {
        self.node(id)?.prev.map(|s| self.id_of(s))
    }

    /// Insert `text` before `at`, or at the end when `at` is None.
    /// The new line becomes the current line.
    pub fn insert_before(&mut self, at: Option<LineId>, text: String) -> EdResult<LineId> {
        let (prev, next) = match at {
            None => (self.tail, None),
            Some(id) => {
                let node = self.node(id).ok_or(EdError::InvalidAddress)?;
                (node.prev, Some(id.slot))
            }
        };

        let slot = self.alloc(Node { text, prev, next })?;
        match prev {
            Some(p) => self.link_mut(p).next = Some(slot),
            None => self.head = Some(slot),
        }
        match next {
            Some(n) => self.link_mut(n).prev = Some(slot),
            None => self.tail = Some(slot),
        }

        self.len += 1;
        self.dot = Some(slot);
        log::trace!("insert slot {} ({} lines)", slot, self.len);
        Ok(self.id_of(slot))
    }

    /// Insert `text` after `at`, or at the start when `at` is None.
    /// The new line becomes the current line, so repeated calls that feed
    /// back the returned id build a run of lines in order.
    pub fn insert_after(&mut self, at: Option<LineId>, text: String) -> EdResult<LineId> {
        let before = match at {
            None => self.head(),
            Some(id) => {
                if !self.contains(id) {
                    return Err(EdError::InvalidAddress);
                }
                self.next(id)
            }
        };
        self.insert_before(before, text)
    }

    /// Unlink and free a line.  The current line moves to its successor,
    /// or to the new tail when the removed line was last.
    pub fn remove(&mut self, id: LineId) -> EdResult<Option<LineId>> {
        if self.len == 0 {
            return Err(EdError::EmptyBuffer);
        }
        let node = self.node(id).ok_or(EdError::InvalidAddress)?;
        let (prev, next) = (node.prev, node.next);

        match prev {
            Some(p) => self.link_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.link_mut(n).prev = prev,
            None => self.tail = prev,
        }

        self.release(id.slot);
        self.len -= 1;
        self.dot = next.or(self.tail);
        log::trace!("remove slot {} ({} lines)", id.slot, self.len);
        Ok(next.map(|s| self.id_of(s)))
    }

    /// Return the nth line (1-indexed).
    pub fn at(&self, n: usize) -> Option<LineId> {
        if n == 0 || n > self.len {
            return None;
        }
        self.iter().nth(n - 1).map(|(id, _)| id)
    }

    /// Walk `n` lines from `id`.  None if the walk runs off either end.
    pub fn offset(&self, id: LineId, n: usize, dir: Direction) -> Option<LineId> {
        let mut cur = self.node(id).map(|_| id.slot)?;
        for _ in 0..n {
            let node = self.slots[cur as usize].node.as_ref()?;
            cur = match dir {
                Direction::Forward => node.next?,
                Direction::Backward => node.prev?,
            };
        }
        Some(self.id_of(cur))
    }

    /// 1-indexed position of a line.
    pub fn line_number(&self, id: LineId) -> Option<usize> {
        self.iter().position(|(l, _)| l == id).map(|i| i + 1)
    }

    /// Lines from `first` through `last`, inclusive.
    pub fn span(&self, first: LineId, last: LineId) -> EdResult<Vec<LineId>> {
        let mut ids = Vec::new();
        let mut cur = Some(first);
        while let Some(id) = cur {
            if !self.contains(id) {
                break;
            }
            ids.push(id);
            if id == last {
                return Ok(ids);
            }
            cur = self.next(id);
        }
        Err(EdError::InvalidAddress)
    }

    /// Remove every line.  All outstanding ids become stale.
    pub fn clear(&mut self) {
        for slot in 0..self.slots.len() {
            if self.slots[slot].node.is_some() {
                self.release(slot as u32);
            }
        }
        self.head = None;
        self.tail = None;
        self.dot = None;
        self.len = 0;
    }

    /// Iterate lines head to tail.
    pub fn iter(&self) -> Lines<'_> {
        Lines {
            buf: self,
            cur: self.head,
            remaining: self.len,
        }
    }

    /// Check the structural invariants: forward and backward traversals
    /// agree with each other, with `len`, and with head/tail, and the
    /// current line is a member (or None exactly when empty).
    pub fn is_consistent(&self) -> bool {
        let mut forward = Vec::with_capacity(self.len);
        let mut cur = self.head;
        let mut prev = None;
        while let Some(slot) = cur {
            if forward.len() > self.len {
                return false;
            }
            let Some(node) = self.slots.get(slot as usize).and_then(|s| s.node.as_ref()) else {
                return false;
            };
            if node.prev != prev {
                return false;
            }
            forward.push(slot);
            prev = Some(slot);
            cur = node.next;
        }
        if forward.len() != self.len || forward.last().copied() != self.tail {
            return false;
        }

        let mut backward = Vec::with_capacity(self.len);
        let mut cur = self.tail;
        while let Some(slot) = cur {
            if backward.len() > self.len {
                return false;
            }
            backward.push(slot);
            cur = self.slots[slot as usize].node.as_ref().and_then(|n| n.prev);
        }
        backward.reverse();
        if backward != forward {
            return false;
        }

        match self.dot {
            None => self.len == 0,
            Some(d) => forward.contains(&d),
        }
    }

    fn id_of(&self, slot: u32) -> LineId {
        LineId {
            slot,
            generation: self.slots[slot as usize].generation,
        }
    }

    fn node(&self, id: LineId) -> Option<&Node> {
        let slot = self.slots.get(id.slot as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    fn node_mut(&mut self, id: LineId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.slot as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    // Neighbour links always point at occupied slots.
    fn link_mut(&mut self, slot: u32) -> &mut Node {
        match self.slots[slot as usize].node.as_mut() {
            Some(node) => node,
            None => unreachable!("dangling link to slot {slot}"),
        }
    }

    fn alloc(&mut self, node: Node) -> EdResult<u32> {
        if let Some(slot) = self.free.pop() {
            self.slots[slot as usize].node = Some(node);
            return Ok(slot);
        }
        let slot = u32::try_from(self.slots.len()).map_err(|_| EdError::AllocationFailure)?;
        self.slots.try_reserve(1)?;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        Ok(slot)
    }

    fn release(&mut self, slot: u32) {
        let entry = &mut self.slots[slot as usize];
        entry.node = None;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(slot);
    }
}

/// Iterator over `(id, text)` pairs, head to tail.
pub struct Lines<'a> {
    buf: &'a Buffer,
    cur: Option<u32>,
    remaining: usize,
}

impl<'a> Iterator for Lines<'a> {
    type Item = (LineId, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let slot = self.cur?;
        let node = self.buf.slots[slot as usize].node.as_ref()?;
        self.cur = node.next;
        self.remaining -= 1;
        Some((self.buf.id_of(slot), node.text.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
