// Copyright 2023 Strixpyrr
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod memory;

use std::collections::VecDeque;
use crate::SEGMENT_SIZE;
use crate::error::{Error, Result};
pub(crate) use memory::Block;
use memory::Memory;

/// A fixed-capacity byte block with a read cursor, a write cursor, and
/// sharing/ownership state. See §3 and §4.1 of the design notes.
pub struct Segment {
	mem: Memory,
	/// `true` iff this handle is permitted to append to its block. Exactly
	/// one handle per block carries this; a [`share`](Self::share)d copy
	/// never does, even after the original handle is dropped.
	owner: bool,
}

impl Default for Segment {
	fn default() -> Self { Self::empty() }
}

impl Clone for Segment {
	/// Equivalent to [`share_all`](Self::share_all): cloning a segment never
	/// copies bytes, only aliases the same block read-only.
	fn clone(&self) -> Self { self.share_all() }
}

impl Segment {
	/// Returns a new, empty, owned segment.
	pub fn empty() -> Self {
		Self { mem: Memory::default(), owner: true }
	}

	/// Wraps a freshly claimed block as a new, empty, owned segment.
	pub(crate) fn from_block(block: Box<Block>) -> Self {
		Self { mem: Memory::from_block(block), owner: true }
	}

	/// Returns `true` if there are no readable bytes.
	pub fn is_empty(&self) -> bool { self.mem.len() == 0 }
	/// Returns `true` if there is no room left to write.
	pub fn is_full(&self) -> bool { self.mem.room() == 0 }
	/// Returns the number of readable bytes.
	pub fn len(&self) -> usize { self.mem.len() }
	/// Returns the number of bytes that can still be written.
	pub fn room(&self) -> usize { self.mem.room() }
	/// Returns the read position, `[0,SEGMENT_SIZE]`.
	pub fn pos(&self) -> usize { self.mem.pos() }
	/// Returns the write limit, `[0,SEGMENT_SIZE]`.
	pub fn limit(&self) -> usize { self.mem.limit() }

	/// Returns `true` if this block is aliased by another segment or a
	/// [`ByteString`](crate::ByteString) snapshot.
	pub fn is_shared(&self) -> bool { self.mem.is_shared() }
	/// Returns `true` if this handle is the block's sole writer.
	pub fn is_owner(&self) -> bool { self.owner }

	fn require_writable(&self) -> Result {
		if !self.owner { return Err(Error::sharing()) }
		Ok(())
	}

	/// Returns a new segment sharing this one's entire readable range. Does
	/// not copy bytes; marks the block shared. The returned segment is not
	/// the owner.
	pub fn share_all(&self) -> Self {
		Self { mem: self.mem.share_all(), owner: false }
	}

	/// Returns a new segment sharing at most `byte_count` bytes of this
	/// one's readable range, from the current position. The returned segment
	/// is not the owner.
	pub fn share(&self, byte_count: usize) -> Self {
		Self { mem: self.mem.share(byte_count), owner: false }
	}

	/// Consumes `n` bytes after reading.
	pub fn consume(&mut self, n: usize) { self.mem.consume(n) }

	/// Shifts readable data back to start at position `0`, reclaiming
	/// consumed space. Only meaningful (and only mutates in place) when the
	/// segment is the owner; otherwise it is a read-only alias and shifting
	/// it would desynchronize it from the block it aliases, so it is a
	/// no-op.
	pub fn shift(&mut self) {
		if self.owner { self.mem.shift() }
	}

	/// Copies the byte at readable offset `i`, or `None` if out of range.
	pub fn get(&self, i: usize) -> Option<u8> { self.mem.get(i) }

	/// Returns a copy of the readable range as an owned vector.
	pub fn to_vec(&self) -> Vec<u8> { self.mem.to_vec() }

	/// Copies up to `dst.len()` readable bytes into `dst` without consuming
	/// them. Returns the number of bytes copied.
	pub fn peek_into(&self, dst: &mut [u8]) -> usize { self.mem.peek_into(dst) }

	/// Pushes one byte. Fails with a sharing violation if this segment isn't
	/// the owner, and silently writes nothing if there's no room (callers
	/// check [`room`](Self::room) first).
	pub fn push(&mut self, byte: u8) -> Result<bool> {
		self.require_writable()?;
		Ok(self.mem.push(byte))
	}

	/// Pops one byte from the front, if any.
	pub fn pop(&mut self) -> Option<u8> { self.mem.pop() }

	/// Writes as many bytes of `src` as fit, returning the count written.
	pub fn push_slice(&mut self, src: &[u8]) -> Result<usize> {
		self.require_writable()?;
		Ok(self.mem.push_slice(src))
	}

	/// Reads as many bytes into `dst` as available, returning the count read.
	pub fn pop_into_slice(&mut self, dst: &mut [u8]) -> usize { self.mem.pop_into_slice(dst) }

	/// Moves `byte_count` bytes from this segment into `other`'s writable
	/// tail, returning the number of bytes moved. `other` must be the owner
	/// of its block and not shared.
	pub fn write_to(&mut self, other: &mut Self, byte_count: usize) -> Result<usize> {
		other.require_writable()?;
		if other.is_shared() {
			return Err(Error::sharing());
		}
		if other.room() < byte_count {
			other.mem.shift();
		}
		Ok(self.mem.move_into(&mut other.mem, byte_count))
	}

	/// Splits off the first `n` readable bytes into a new segment linked
	/// immediately before this one, per the split policy of §4.1: prefixes
	/// of at least `share_threshold` bytes are zero-copy shares of this
	/// block, smaller prefixes are copied into a freshly taken segment.
	/// This segment keeps the suffix. `n` must be in `[1,len()]`.
	pub fn split(&mut self, n: usize, share_threshold: usize, fresh: impl FnOnce() -> Self) -> Self {
		debug_assert!(n >= 1 && n <= self.len());

		if n >= share_threshold {
			let prefix = self.share(n);
			self.mem.consume(n);
			prefix
		} else {
			let mut prefix = fresh();
			let moved = self.mem.move_into(&mut prefix.mem, n);
			debug_assert_eq!(moved, n);
			prefix
		}
	}

	/// Returns the room a predecessor segment would have to absorb a
	/// successor via [`Segments::compact`]'s heuristic, accounting for the
	/// space reclaimed by shifting first when the predecessor isn't shared.
	/// Used by [`Segments::compact`] and by
	/// [`Buffer::transfer_from`](crate::Buffer::transfer_from)'s tail-absorb
	/// step, which both need the same "room after a reclaiming shift"
	/// accounting.
	pub(crate) fn available_room(predecessor: &Self) -> usize {
		if predecessor.is_shared() {
			SEGMENT_SIZE - predecessor.limit()
		} else {
			SEGMENT_SIZE - predecessor.limit() + predecessor.pos()
		}
	}

	/// Returns the absolute byte offset of the first occurrence of `byte`
	/// within `[start,end)` of this segment's readable range.
	pub fn index_of(&self, byte: u8, start: usize, end: usize) -> Option<usize> {
		self.mem.index_of(byte, start, end)
	}

	/// Returns the offset of the first full occurrence of `pattern` found
	/// entirely within this segment, starting at `start`. Used when the
	/// remainder of the segment is at least `pattern.len()`.
	pub fn index_of_slice_inbound(&self, pattern: &[u8], start: usize) -> Option<usize> {
		self.mem.index_of_slice(pattern, start)
	}

	/// Consumes the segment, returning its block if uniquely held, for
	/// recycling by a [`Pool`](crate::pool::Pool). Shared or non-owner
	/// segments yield `None` and are dropped by the caller.
	pub(crate) fn into_block(self) -> Option<Box<Block>> {
		if !self.owner { return None }
		self.mem.into_block()
	}
}

impl From<Box<Block>> for Segment {
	fn from(block: Box<Block>) -> Self { Self::from_block(block) }
}

/// A group of [`Segment`]s linked into a FIFO ring: readable segments at the
/// front, at most one partially-written (or empty) segment at the back.
/// Implements the doubly-linked chain of §3 as a `VecDeque`, one of the
/// interchangeable representations the design notes permit.
#[derive(Default)]
pub(crate) struct Segments {
	chain: VecDeque<Segment>,
	count: usize,
}

impl Segments {
	pub fn new() -> Self {
		Self { chain: VecDeque::new(), count: 0 }
	}

	/// Total readable byte count across all segments.
	pub fn count(&self) -> usize { self.count }
	/// Number of linked segments, readable or not.
	pub fn len(&self) -> usize { self.chain.len() }
	pub fn is_empty(&self) -> bool { self.chain.is_empty() }

	pub fn front(&self) -> Option<&Segment> { self.chain.front() }
	pub fn front_mut(&mut self) -> Option<&mut Segment> { self.chain.front_mut() }
	pub fn back(&self) -> Option<&Segment> { self.chain.back() }
	pub fn back_mut(&mut self) -> Option<&mut Segment> { self.chain.back_mut() }

	pub fn iter(&self) -> impl Iterator<Item = &Segment> { self.chain.iter() }

	/// Appends a segment at the tail of the chain.
	pub fn push_back(&mut self, seg: Segment) {
		self.count += seg.len();
		self.chain.push_back(seg);
	}

	/// Prepends a segment at the head of the chain.
	pub fn push_front(&mut self, seg: Segment) {
		self.count += seg.len();
		self.chain.push_front(seg);
	}

	/// Pops the head segment, if any.
	pub fn pop_front(&mut self) -> Option<Segment> {
		let seg = self.chain.pop_front()?;
		self.count -= seg.len();
		Some(seg)
	}

	/// Pops the tail segment, if any.
	pub fn pop_back(&mut self) -> Option<Segment> {
		let seg = self.chain.pop_back()?;
		self.count -= seg.len();
		Some(seg)
	}

	/// Adjusts the cached readable-byte count upward by `n`, for callers that
	/// wrote directly into a segment obtained via [`back_mut`](Self::back_mut).
	pub fn touch(&mut self, n: usize) { self.count += n; }

	/// Adjusts the cached readable-byte count downward by `n`, for callers
	/// that consumed directly from a segment obtained via
	/// [`front_mut`](Self::front_mut).
	pub fn touch_consumed(&mut self, n: usize) { self.count -= n; }

	/// Drops every segment reference, leaving the chain empty. Does not
	/// recycle; the caller decides where the segments go.
	pub fn drain(&mut self) -> impl Iterator<Item = Segment> + '_ {
		self.count = 0;
		self.chain.drain(..)
	}

	/// Opportunistically absorbs adjacent half-full segments in place, per
	/// §4.1's compact heuristic: a non-head segment whose predecessor has
	/// enough reclaimable room absorbs into it and is recycled. Segments
	/// popped during absorption are handed to `recycle`.
	pub fn compact(&mut self, mut recycle: impl FnMut(Segment)) {
		let slice = self.chain.make_contiguous();
		if slice.len() < 2 { return }

		let mut prev = 0;
		let mut to_recycle = Vec::new();
		for curr in 1..slice.len() {
			let curr_len = slice[curr].len();
			let room = Segment::available_room(&slice[prev]);
			if curr_len == 0 || curr_len > room {
				prev = curr;
				continue;
			}

			let (left, right) = slice.split_at_mut(curr);
			let prev_seg = &mut left[prev];
			let curr_seg = &mut right[0];

			if !prev_seg.is_shared() { prev_seg.shift(); }
			let moved = curr_seg.write_to(prev_seg, curr_len).unwrap_or(0);

			if moved == curr_len {
				to_recycle.push(curr);
			} else {
				prev = curr;
			}
		}

		for idx in to_recycle.into_iter().rev() {
			if let Some(seg) = self.chain.remove(idx) {
				recycle(seg);
			}
		}
	}
}
