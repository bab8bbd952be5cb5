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

mod options;

use std::cmp::min;
pub use options::BufferOptions;
use crate::byte_str::ByteString;
use crate::error::{Error, Result};
use crate::pool::{LocalPool, Pool};
use crate::segment::{Segment, Segments};
use crate::SEGMENT_SIZE;

/// A FIFO byte queue backed by a chain of pooled [`Segment`]s. See §3 and
/// §4.3 of the design notes: appends obtain or allocate an owner-writable
/// tail, consumes advance the head and recycle exhausted segments, and
/// [`transfer_from`](Self::transfer_from) relinks whole segments between
/// buffers instead of copying.
pub struct Buffer<P: Pool = LocalPool> {
	pool: P,
	segments: Segments,
	options: BufferOptions,
	closed: bool,
}

impl<P: Pool + Default> Default for Buffer<P> {
	fn default() -> Self { Self::new(P::default()) }
}

impl<P: Pool> Drop for Buffer<P> {
	fn drop(&mut self) { let _ = self.clear(); }
}

impl<P: Pool> Buffer<P> {
	/// Creates an empty buffer claiming segments from `pool`.
	pub fn new(pool: P) -> Self {
		Self { pool, segments: Segments::new(), options: BufferOptions::default(), closed: false }
	}

	/// Creates an empty buffer with custom tuning.
	pub fn with_options(pool: P, options: BufferOptions) -> Self {
		Self { pool, segments: Segments::new(), options, closed: false }
	}

	/// Total readable byte count.
	pub fn count(&self) -> usize { self.segments.count() }
	/// `true` iff there are no readable bytes.
	pub fn is_empty(&self) -> bool { self.count() == 0 }

	fn ensure_open(&self) -> Result {
		if self.closed { Err(Error::closed()) } else { Ok(()) }
	}

	fn require(&self, byte_count: usize) -> Result {
		if self.count() < byte_count { Err(Error::bounds()) } else { Ok(()) }
	}

	/// Drops every readable byte, recycling segments to the pool. Does not
	/// close the buffer; a cleared buffer can still be appended to.
	pub fn clear(&mut self) -> Result {
		let segs: Vec<_> = self.segments.drain().collect();
		self.pool.recycle(segs)
	}

	/// Closes the buffer, clearing it. Idempotent.
	pub fn close(&mut self) -> Result {
		if self.closed { return Ok(()) }
		self.closed = true;
		self.clear()
	}

	/// Runs housekeeping after a mutation: drops exhausted, unshared head
	/// segments back to the pool, and opportunistically compacts
	/// fragmentation above the configured threshold.
	fn tidy(&mut self) -> Result {
		while matches!(self.segments.front(), Some(seg) if seg.is_empty() && !seg.is_shared()) {
			if let Some(seg) = self.segments.pop_front() {
				self.pool.recycle_one(seg)?;
			}
		}

		if self.fragmentation() >= self.options.compact_threshold {
			let pool = &self.pool;
			let mut to_recycle = Vec::new();
			self.segments.compact(|seg| to_recycle.push(seg));
			pool.recycle(to_recycle)?;
		}

		Ok(())
	}

	/// Sum of reclaimable room across every segment but the tail: bytes
	/// already consumed (or never written) that a shift/compact could
	/// reclaim.
	fn fragmentation(&self) -> usize {
		let mut segs = self.segments.iter().peekable();
		let mut total = 0;
		while let Some(seg) = segs.next() {
			if segs.peek().is_none() { break } // exclude the tail
			total += SEGMENT_SIZE - seg.len();
		}
		total
	}

	/// Returns a mutable reference to a writable tail segment with room for
	/// at least one more byte, claiming a fresh one from the pool if the
	/// current tail is missing, full, shared, or not the owner.
	fn writable_tail(&mut self) -> Result<&mut Segment> {
		let need_fresh = match self.segments.back() {
			None => true,
			Some(seg) => seg.is_full() || seg.is_shared() || !seg.is_owner(),
		};
		if need_fresh {
			let seg = self.pool.claim_one()?;
			self.segments.push_back(seg);
		}
		Ok(self.segments.back_mut().expect("a tail segment was just ensured"))
	}

	/// Appends a single byte.
	pub fn write_u8(&mut self, value: u8) -> Result {
		self.ensure_open()?;
		self.writable_tail()?.push(value)?;
		self.segments.touch(1);
		self.tidy()
	}

	/// Appends as many bytes of `src` as needed, claiming fresh tail
	/// segments as each fills.
	pub fn write_slice(&mut self, mut src: &[u8]) -> Result {
		self.ensure_open()?;
		while !src.is_empty() {
			let tail = self.writable_tail()?;
			let n = tail.push_slice(src)?;
			self.segments.touch(n);
			src = &src[n..];
		}
		self.tidy()
	}

	/// Unbound tail-filling operation: claims a tail with at least
	/// `min_capacity` free bytes, hands its writable range to `producer`,
	/// and commits however many bytes `producer` reports having written.
	/// Used to bridge external readers that fill a raw buffer, such as an
	/// OS stream.
	pub fn with_contained_tail(
		&mut self,
		min_capacity: usize,
		producer: impl FnOnce(&mut [u8]) -> Result<usize>,
	) -> Result<usize> {
		self.ensure_open()?;

		let min_capacity = min_capacity.min(SEGMENT_SIZE);
		let need_fresh = match self.segments.back() {
			Some(seg) => seg.is_full() || seg.is_shared() || !seg.is_owner() || seg.room() < min_capacity,
			None => true,
		};
		if need_fresh {
			let seg = self.pool.claim_one()?;
			self.segments.push_back(seg);
		}

		let tail = self.segments.back_mut().expect("a tail segment was just ensured");
		let mut scratch = vec![0u8; tail.room()];
		let written = producer(&mut scratch)?;
		debug_assert!(written <= scratch.len());
		let pushed = tail.push_slice(&scratch[..written])?;
		self.segments.touch(pushed);
		self.tidy()?;
		Ok(pushed)
	}

	/// Reads a single byte.
	pub fn read_u8(&mut self) -> Result<u8> {
		self.require(1)?;
		let byte = self.segments.front_mut().and_then(Segment::pop).expect(
			"a readable byte after a successful bounds check",
		);
		self.segments.touch_consumed(1);
		self.tidy()?;
		Ok(byte)
	}

	/// Reads exactly `dst.len()` bytes, failing with a bounds violation if
	/// fewer are available.
	pub fn read_into_slice_exact(&mut self, dst: &mut [u8]) -> Result {
		self.require(dst.len())?;
		let mut off = 0;
		while off < dst.len() {
			let Some(seg) = self.segments.front_mut() else { break };
			let n = seg.pop_into_slice(&mut dst[off..]);
			self.segments.touch_consumed(n);
			off += n;
			self.tidy_front()?;
		}
		debug_assert_eq!(off, dst.len());
		Ok(())
	}

	/// Reads up to `dst.len()` bytes, returning the count actually read.
	pub fn read_into_slice(&mut self, dst: &mut [u8]) -> Result<usize> {
		let n = min(dst.len(), self.count());
		self.read_into_slice_exact(&mut dst[..n])?;
		Ok(n)
	}

	/// Produces a zero-copy snapshot of every readable byte. Shares each
	/// live segment (including the tail) rather than copying, which marks
	/// the tail shared: subsequent appends to this buffer must fork a fresh
	/// block before writing, so the snapshot can never observe
	/// written-past-snapshot bytes.
	pub fn peek(&self) -> ByteString {
		ByteString::from_segments(self.segments.iter().map(Segment::share_all).collect())
	}

	/// Returns a copy of the next `byte_count` readable bytes without
	/// consuming them.
	pub fn peek_to_vec(&self, byte_count: usize) -> Vec<u8> {
		let n = min(byte_count, self.count());
		let mut out = Vec::with_capacity(n);
		let mut remaining = n;
		for seg in self.segments.iter() {
			if remaining == 0 { break }
			let take = min(remaining, seg.len());
			let mut chunk = vec![0u8; take];
			seg.peek_into(&mut chunk);
			out.extend_from_slice(&chunk);
			remaining -= take;
		}
		out
	}

	/// Skips `byte_count` readable bytes, failing with a bounds violation if
	/// fewer are available.
	pub fn skip(&mut self, byte_count: usize) -> Result {
		self.require(byte_count)?;
		let mut remaining = byte_count;
		while remaining > 0 {
			let Some(seg) = self.segments.front_mut() else { break };
			let n = min(remaining, seg.len());
			seg.consume(n);
			self.segments.touch_consumed(n);
			remaining -= n;
			self.tidy_front()?;
		}
		Ok(())
	}

	/// Drops the front segment if it's now empty and unshared, without
	/// running a compact pass. Used inside consume loops that already pay
	/// for one `tidy` at the end.
	fn tidy_front(&mut self) -> Result {
		while matches!(self.segments.front(), Some(seg) if seg.is_empty() && !seg.is_shared()) {
			if let Some(seg) = self.segments.pop_front() {
				self.pool.recycle_one(seg)?;
			}
		}
		Ok(())
	}

	/// Moves up to `count` bytes from the front of `src` into the tail of
	/// `self`, relinking whole segments and splitting only the last partial
	/// one (by sharing when at least `share_threshold` bytes, by copy
	/// otherwise). Returns the number of bytes actually moved.
	pub fn transfer_from(&mut self, src: &mut Buffer<impl Pool>, count: usize) -> Result<usize> {
		self.ensure_open()?;
		src.ensure_open()?;

		let mut remaining = min(count, src.count());
		let mut moved = 0;
		let threshold = self.options.share_threshold;

		while remaining > 0 {
			let Some(mut seg) = src.segments.pop_front() else { break };
			let len = seg.len();

			if len <= remaining {
				// Per §4.3 step 4: before splicing a whole source-head
				// segment onto our tail, try absorbing it in place instead,
				// the same way Segments::compact would. This avoids piling
				// up short segments when the caller alternates small
				// transfers into an already partially-filled tail.
				if let Some(seg) = self.tail_absorb(seg, len)? {
					self.segments.push_back(seg);
				}
				moved += len;
				remaining -= len;
			} else {
				let pool = &self.pool;
				let prefix = seg.split(remaining, threshold, || {
					pool.claim_one().unwrap_or_else(|_| Segment::empty())
				});
				self.segments.push_back(prefix);
				src.segments.push_front(seg);
				moved += remaining;
				remaining = 0;
			}
		}

		self.tidy()?;
		src.tidy()?;
		Ok(moved)
	}

	/// Attempts to absorb `seg` (`len` readable bytes) into this buffer's
	/// current tail in place, recycling `seg` on success. Returns `Some(seg)`,
	/// handing the segment back untouched, when there's no tail, the tail
	/// isn't an unshared owner, or it doesn't have enough reclaimable room;
	/// returns `None` once absorbed and recycled.
	fn tail_absorb(&mut self, mut seg: Segment, len: usize) -> Result<Option<Segment>> {
		let can_absorb = match self.segments.back() {
			Some(tail) => tail.is_owner() && !tail.is_shared() && Segment::available_room(tail) >= len,
			None => false,
		};
		if !can_absorb {
			return Ok(Some(seg));
		}

		let tail = self.segments.back_mut().expect("tail presence checked above");
		let moved = seg.write_to(tail, len)?;
		if moved != len {
			return Ok(Some(seg));
		}

		self.segments.touch(len);
		self.pool.recycle_one(seg)?;
		Ok(None)
	}

	/// Returns the byte at readable offset `i`, without consuming.
	pub fn get(&self, i: usize) -> Option<u8> {
		let mut off = i;
		for seg in self.segments.iter() {
			if off < seg.len() { return seg.get(off) }
			off -= seg.len();
		}
		None
	}

	/// Returns the absolute offset of the first occurrence of `byte` at or
	/// after `from`, or `None`.
	pub fn index_of_byte(&self, byte: u8, from: usize) -> Option<usize> {
		let mut base = 0;
		let mut skip = from;
		for seg in self.segments.iter() {
			let len = seg.len();
			if skip >= len {
				skip -= len;
				base += len;
				continue;
			}
			if let Some(i) = seg.index_of(byte, skip, len) {
				return Some(base + i);
			}
			base += len;
			skip = 0;
		}
		None
	}

	/// Returns the absolute offset of the first occurrence of `pattern` at
	/// or after `from`, searching across segment boundaries, or `None`.
	pub fn index_of_bytes(&self, pattern: &[u8], from: usize) -> Option<usize> {
		if pattern.is_empty() { return Some(min(from, self.count())) }
		if from + pattern.len() > self.count() { return None }

		let segs: Vec<&Segment> = self.segments.iter().collect();

		let mut base = 0;
		let mut seg_idx = 0;
		let mut offset = from;
		while seg_idx < segs.len() && offset >= segs[seg_idx].len() {
			offset -= segs[seg_idx].len();
			base += segs[seg_idx].len();
			seg_idx += 1;
		}

		while seg_idx < segs.len() {
			let seg = segs[seg_idx];
			let len = seg.len();
			let remainder = len - offset;

			if remainder >= pattern.len() {
				if let Some(i) = seg.index_of_slice_inbound(pattern, offset) {
					return Some(base + offset + i);
				}
			}

			let straddle_start = offset.max(len.saturating_sub(pattern.len() - 1));
			for cand in straddle_start..len {
				if Self::match_straddling(&segs, seg_idx, cand, pattern) {
					return Some(base + cand);
				}
			}

			base += len;
			offset = 0;
			seg_idx += 1;
		}

		None
	}

	fn match_straddling(segs: &[&Segment], mut seg_idx: usize, mut pos: usize, pattern: &[u8]) -> bool {
		for &want in pattern {
			loop {
				let Some(seg) = segs.get(seg_idx) else { return false };
				if pos < seg.len() {
					match seg.get(pos) {
						Some(b) if b == want => { pos += 1; break }
						_ => return false,
					}
				} else {
					seg_idx += 1;
					pos = 0;
				}
			}
		}
		true
	}
}

macro_rules! gen_int_writes {
	($($name:ident $le_name:ident $ty:ident),+) => {
		$(
		/// Appends big-endian.
		pub fn $name(&mut self, value: $ty) -> Result {
			self.write_slice(&value.to_be_bytes())
		}
		/// Appends little-endian.
		pub fn $le_name(&mut self, value: $ty) -> Result {
			self.write_slice(&value.to_le_bytes())
		}
		)+
	};
}

macro_rules! gen_int_reads {
	($($s_name:ident $s_le_name:ident $s_ty:ident $u_name:ident $u_le_name:ident $u_ty:ident $width:literal),+) => {
		$(
		/// Consumes and returns a big-endian signed value.
		pub fn $s_name(&mut self) -> Result<$s_ty> {
			self.$u_name().map(|n| n as $s_ty)
		}
		/// Consumes and returns a little-endian signed value.
		pub fn $s_le_name(&mut self) -> Result<$s_ty> {
			self.$u_le_name().map(|n| n as $s_ty)
		}
		/// Consumes and returns a big-endian unsigned value.
		pub fn $u_name(&mut self) -> Result<$u_ty> {
			let mut buf = [0u8; $width];
			self.read_into_slice_exact(&mut buf)?;
			Ok($u_ty::from_be_bytes(buf))
		}
		/// Consumes and returns a little-endian unsigned value.
		pub fn $u_le_name(&mut self) -> Result<$u_ty> {
			let mut buf = [0u8; $width];
			self.read_into_slice_exact(&mut buf)?;
			Ok($u_ty::from_le_bytes(buf))
		}
		)+
	};
}

impl<P: Pool> Buffer<P> {
	gen_int_writes! {
		write_i16 write_i16_le i16,
		write_u16 write_u16_le u16,
		write_i32 write_i32_le i32,
		write_u32 write_u32_le u32,
		write_i64 write_i64_le i64,
		write_u64 write_u64_le u64
	}

	gen_int_reads! {
		read_i16 read_i16_le i16 read_u16 read_u16_le u16 2,
		read_i32 read_i32_le i32 read_u32 read_u32_le u32 4,
		read_i64 read_i64_le i64 read_u64 read_u64_le u64 8
	}
}
