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

use crate::{SEGMENT_SIZE, SHARE_MINIMUM};

/// Tuning knobs for a [`Buffer`](super::Buffer).
///
/// # Share threshold
///
/// The minimum prefix size, in bytes, for [`Buffer::transfer_from`] to share
/// a partial segment's memory rather than copy it into a fresh one. Defaults
/// to [`SHARE_MINIMUM`]. A value at or above [`SEGMENT_SIZE`] means transfers
/// never share a partial segment, always copying instead.
///
/// # Compact threshold
///
/// The total fragmentation — bytes of reclaimable room spread across
/// non-tail segments — that triggers an opportunistic [`compact`](crate::segment::Segments::compact)
/// pass after a transfer or drain. Defaults to half of [`SEGMENT_SIZE`]. A
/// value of `0` means the buffer always compacts.
#[derive(Copy, Clone, Debug)]
#[non_exhaustive]
pub struct BufferOptions {
	pub share_threshold: usize,
	pub compact_threshold: usize,
}

impl Default for BufferOptions {
	fn default() -> Self {
		Self {
			share_threshold: SHARE_MINIMUM,
			compact_threshold: SEGMENT_SIZE / 2,
		}
	}
}

impl BufferOptions {
	/// A buffer that always shares splits and always compacts.
	pub fn lean() -> Self {
		Self { share_threshold: 0, compact_threshold: 0 }
	}

	pub fn share_threshold(&self) -> usize { self.share_threshold }
	pub fn compact_threshold(&self) -> usize { self.compact_threshold }

	pub fn set_share_threshold(mut self, value: usize) -> Self {
		self.share_threshold = value;
		self
	}

	pub fn set_compact_threshold(mut self, value: usize) -> Self {
		self.compact_threshold = value;
		self
	}
}
