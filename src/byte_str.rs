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

use std::fmt;
use crate::segment::Segment;

/// An immutable, zero-copy snapshot of a [`Buffer`](crate::Buffer)'s
/// readable bytes at the moment it was taken. Pins a share of every segment
/// live in the buffer at snapshot time (see [`Buffer::peek`](crate::Buffer::peek)),
/// so later writes to the buffer can't be observed through it — any tail
/// segment a snapshot shares becomes read-only until the writer forks a
/// fresh block for it.
///
/// This is deliberately narrow: higher-level concerns like UTF-8 decoding,
/// base64/hex encoding, and hashing are external collaborators that read
/// bytes through this type rather than features of it.
#[derive(Clone, Default)]
pub struct ByteString {
	segments: Vec<Segment>,
	len: usize,
}

impl ByteString {
	/// Builds a snapshot from already-shared segments.
	pub(crate) fn from_segments(segments: Vec<Segment>) -> Self {
		let len = segments.iter().map(Segment::len).sum();
		Self { segments, len }
	}

	/// Returns an empty snapshot.
	pub fn empty() -> Self { Self::default() }

	/// Total byte length.
	pub fn len(&self) -> usize { self.len }
	/// `true` iff the snapshot holds no bytes.
	pub fn is_empty(&self) -> bool { self.len == 0 }

	/// Returns the byte at `index`, or `None` if out of bounds.
	pub fn get(&self, mut index: usize) -> Option<u8> {
		for seg in &self.segments {
			if index < seg.len() { return seg.get(index) }
			index -= seg.len();
		}
		None
	}

	/// Copies the snapshot's bytes into a freshly allocated vector.
	pub fn to_vec(&self) -> Vec<u8> {
		let mut out = Vec::with_capacity(self.len);
		for seg in &self.segments {
			out.extend(seg.to_vec());
		}
		out
	}
}

impl PartialEq for ByteString {
	fn eq(&self, other: &Self) -> bool {
		self.len == other.len && self.to_vec() == other.to_vec()
	}
}

impl Eq for ByteString {}

impl fmt::Debug for ByteString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ByteString").field("len", &self.len).finish_non_exhaustive()
	}
}
