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

use std::cell::RefCell;
use std::cmp::min;
use std::rc::Rc;
use crate::SEGMENT_SIZE;

pub(crate) type Block = [u8; SEGMENT_SIZE];

/// A sharable, fixed-size chunk of memory for [`Segment`](super::Segment).
/// Memory is copy-on-write when shared (`Rc::strong_count > 1`), directly
/// mutable in place when uniquely held. Blocks are heap-allocated so cloning
/// a [`Memory`] handle (via [`share`](Self::share)/[`share_all`](Self::share_all))
/// never moves or copies bytes, only the cursor window and a reference count.
pub(crate) struct Memory {
	block: Rc<RefCell<Block>>,
	pos: usize,
	limit: usize,
}

impl Clone for Memory {
	fn clone(&self) -> Self {
		Self { block: self.block.clone(), pos: self.pos, limit: self.limit }
	}
}

impl Default for Memory {
	fn default() -> Self {
		Self::from_block(Box::new([0; SEGMENT_SIZE]))
	}
}

impl Memory {
	pub fn from_block(block: Box<Block>) -> Self {
		Self { block: Rc::new(RefCell::new(*block)), pos: 0, limit: 0 }
	}

	/// Returns `true` if this block is referenced by more than one handle.
	pub fn is_shared(&self) -> bool { Rc::strong_count(&self.block) > 1 }

	/// Returns the read position, `[0,SEGMENT_SIZE]`.
	pub fn pos(&self) -> usize { self.pos }
	/// Returns the write limit, `[0,SEGMENT_SIZE]`.
	pub fn limit(&self) -> usize { self.limit }
	/// Returns the number of readable bytes.
	pub fn len(&self) -> usize { self.limit - self.pos }
	/// Returns the number of bytes that can still be written.
	pub fn room(&self) -> usize { SEGMENT_SIZE - self.limit }

	/// Returns a new handle over the same block and the same cursor window.
	/// Marks the block shared.
	pub fn share_all(&self) -> Self { self.clone() }

	/// Returns a new handle over the same block truncated to `byte_count`
	/// readable bytes from the current position.
	pub fn share(&self, byte_count: usize) -> Self {
		let mut mem = self.share_all();
		mem.limit = min(mem.pos + byte_count, mem.limit);
		mem
	}

	/// Copies the readable range into a freshly allocated block if this
	/// memory is shared. Returns `true` if a copy was made.
	pub fn fork(&mut self) -> bool {
		if !self.is_shared() { return false }

		let mut fresh = [0; SEGMENT_SIZE];
		fresh[self.pos..self.limit].copy_from_slice(&self.block.borrow()[self.pos..self.limit]);
		self.block = Rc::new(RefCell::new(fresh));
		true
	}

	/// Consumes the handle, returning its block if this handle is the block's
	/// sole owner, or `None` if the block is still shared (the caller should
	/// drop it in that case; see §4.2's pool contract).
	pub fn into_block(self) -> Option<Box<Block>> {
		Rc::try_unwrap(self.block).ok().map(|cell| Box::new(cell.into_inner()))
	}

	/// Returns a copy of the readable range `[pos,limit)`.
	pub fn to_vec(&self) -> Vec<u8> {
		self.block.borrow()[self.pos..self.limit].to_vec()
	}

	/// Copies up to `dst.len()` readable bytes into `dst`, returning the
	/// number of bytes copied. Does not consume.
	pub fn peek_into(&self, dst: &mut [u8]) -> usize {
		let n = min(dst.len(), self.len());
		dst[..n].copy_from_slice(&self.block.borrow()[self.pos..self.pos + n]);
		n
	}

	/// Returns the byte at readable offset `i`, or `None` if out of range.
	pub fn get(&self, i: usize) -> Option<u8> {
		(i < self.len()).then(|| self.block.borrow()[self.pos + i])
	}

	/// Consumes `n` bytes from the front after reading.
	pub fn consume(&mut self, n: usize) {
		debug_assert!(n <= self.len());
		self.pos += n;
	}

	/// Shifts the readable range back to start at `0`, reclaiming consumed
	/// space. Forks first if shared (forking already shifts, since only the
	/// live range is copied).
	pub fn shift(&mut self) {
		if self.fork() { return }
		if self.pos == 0 { return }

		self.block.borrow_mut().copy_within(self.pos..self.limit, 0);
		self.limit -= self.pos;
		self.pos = 0;
	}

	/// Pushes one byte, returning `true` if there was room. Forks first if
	/// shared.
	pub fn push(&mut self, byte: u8) -> bool {
		if self.room() == 0 { return false }
		self.fork();
		self.block.borrow_mut()[self.limit] = byte;
		self.limit += 1;
		true
	}

	/// Pops one byte from the front, if any.
	pub fn pop(&mut self) -> Option<u8> {
		if self.len() == 0 { return None }
		let byte = self.block.borrow()[self.pos];
		self.pos += 1;
		Some(byte)
	}

	/// Writes as many bytes of `src` as fit, returning the count written.
	/// Forks first if shared.
	pub fn push_slice(&mut self, src: &[u8]) -> usize {
		let n = min(self.room(), src.len());
		if n == 0 { return 0 }

		self.fork();
		self.block.borrow_mut()[self.limit..self.limit + n].copy_from_slice(&src[..n]);
		self.limit += n;
		n
	}

	/// Reads as many bytes into `dst` as available, returning the count read.
	pub fn pop_into_slice(&mut self, dst: &mut [u8]) -> usize {
		let n = self.peek_into(dst);
		self.pos += n;
		n
	}

	/// Moves up to `byte_count` bytes from this memory into `other`,
	/// returning the number of bytes moved.
	pub fn move_into(&mut self, other: &mut Self, byte_count: usize) -> usize {
		let n = min(self.len(), byte_count);
		let src = self.block.borrow()[self.pos..self.pos + n].to_vec();
		let written = other.push_slice(&src);
		self.pos += written;
		written
	}

	/// Returns the index in `[0,len())` of the first occurrence of `byte` in
	/// `[start,end)`, or `None`.
	pub fn index_of(&self, byte: u8, start: usize, end: usize) -> Option<usize> {
		let end = min(end, self.len());
		if start >= end { return None }

		let block = self.block.borrow();
		block[self.pos + start..self.pos + end]
			.iter()
			.position(|&b| b == byte)
			.map(|i| i + start)
	}

	/// Returns the index in `[0,len())` of the first full occurrence of
	/// `pattern` found entirely within this memory's readable range, starting
	/// the search at `start`, or `None`.
	pub fn index_of_slice(&self, pattern: &[u8], start: usize) -> Option<usize> {
		let len = self.len();
		if pattern.is_empty() || start + pattern.len() > len { return None }

		let block = self.block.borrow();
		let haystack = &block[self.pos + start..self.pos + len];
		haystack
			.windows(pattern.len())
			.position(|window| window == pattern)
			.map(|i| i + start)
	}
}
