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

#[cfg(feature = "shared-pool")]
use self::shared::Global;

use std::cell::RefCell;
use std::rc::Rc;
use crate::error::{Error, Result};
use crate::segment::{Block, Segment, Segments};
use crate::{GLOBAL_MAX_BYTES, PER_THREAD_MAX_BYTES, SEGMENT_SIZE};

/// Claims and recycles [`Segment`]s. See §4.2 of the design notes: a pool is
/// a free-list of blocks, not segments, since a claimed segment must be
/// usable for any lifetime and so can't itself be stored back as-is once
/// handed out.
pub trait Pool {
	/// Claims a single segment, allocating a fresh one if the pool is empty.
	fn claim_one(&self) -> Result<Segment>;

	/// Claims `count` segments into `segments`.
	fn claim_count(&self, segments: &mut Segments, count: usize) -> Result {
		for _ in 0..count {
			segments.push_back(self.claim_one()?);
		}
		Ok(())
	}

	/// Claims enough segments to hold at least `min_size` bytes.
	fn claim_size(&self, segments: &mut Segments, min_size: usize) -> Result {
		let count = min_size / SEGMENT_SIZE + (min_size % SEGMENT_SIZE > 0) as usize;
		self.claim_count(segments, count)
	}

	/// Recycles a single segment. Shared or non-owner segments are silently
	/// dropped rather than returned to the pool, per §4.2's sharing rule.
	fn recycle_one(&self, segment: Segment) -> Result;

	/// Recycles many segments.
	fn recycle(&self, segments: impl IntoIterator<Item = Segment>) -> Result {
		for seg in segments {
			self.recycle_one(seg)?;
		}
		Ok(())
	}

	/// Returns the number of bytes currently held free by this pool level
	/// (and any level it falls through to), for diagnostics and tests.
	fn pooled_bytes(&self) -> usize;
}

/// Configures the byte bounds of a pool's levels. The global level only
/// exists when the `shared-pool` feature is enabled; without it, only the
/// per-thread cache is used and `global_max_bytes` is ignored.
#[derive(Copy, Clone, Debug)]
pub struct PoolOptions {
	pub global_max_bytes: usize,
	pub per_thread_max_bytes: usize,
}

impl Default for PoolOptions {
	fn default() -> Self {
		Self { global_max_bytes: GLOBAL_MAX_BYTES, per_thread_max_bytes: PER_THREAD_MAX_BYTES }
	}
}

impl LocalPool {
	/// Builds a standalone local cache from `options`, not backed by the
	/// process-wide default. `global_max_bytes` is ignored here: the global
	/// level is a single process-wide structure bounded by the compile-time
	/// [`GLOBAL_MAX_BYTES`] constant, not something a standalone pool can
	/// resize for itself.
	pub fn with_options(options: PoolOptions) -> Self {
		Self::new(options.per_thread_max_bytes)
	}
}

thread_local! {
	static LOCAL_POOL: LocalPool = LocalPool::default_handle();
}

/// A thread-local cache of free blocks backed, when the `shared-pool`
/// feature is enabled, by a cross-thread free-list that absorbs overflow
/// and serves misses. Cloning a handle is cheap; all clones share the same
/// underlying cache.
#[derive(Clone)]
pub struct LocalPool {
	free: Rc<RefCell<Vec<Box<Block>>>>,
	max_bytes: usize,
	/// Whether a cache miss or overflow falls through to the process-wide
	/// [`Global`] level. Only the calling thread's default handle does; a
	/// standalone pool built with [`new`](Self::new) stays self-contained so
	/// tests can reason about its byte counts in isolation.
	use_global: bool,
}

impl LocalPool {
	fn default_handle() -> Self {
		Self { use_global: true, ..Self::new(PoolOptions::default().per_thread_max_bytes) }
	}

	/// Returns a handle to the calling thread's default local pool.
	pub fn get() -> Self { LOCAL_POOL.with(Clone::clone) }

	/// Builds a standalone local cache bounded by `max_bytes`, not backed by
	/// the process-wide default. Useful for tests that want an isolated,
	/// deterministically-sized pool.
	pub fn new(max_bytes: usize) -> Self {
		Self { free: Rc::new(RefCell::new(Vec::new())), max_bytes, use_global: false }
	}

	fn capacity(&self) -> usize { self.max_bytes / SEGMENT_SIZE }
}

impl Default for LocalPool {
	fn default() -> Self { Self::get() }
}

impl Pool for LocalPool {
	fn claim_one(&self) -> Result<Segment> {
		let mut free = self.free.try_borrow_mut().map_err(Error::pool_borrow)?;
		if let Some(block) = free.pop() {
			return Ok(Segment::from_block(block));
		}
		drop(free);

		#[cfg(feature = "shared-pool")]
		if self.use_global {
			if let Some(block) = Global::get().take()? {
				return Ok(Segment::from_block(block));
			}
		}

		Ok(Segment::empty())
	}

	fn recycle_one(&self, segment: Segment) -> Result {
		let Some(block) = segment.into_block() else { return Ok(()) };

		let mut free = self.free.try_borrow_mut().map_err(Error::pool_borrow)?;
		if free.len() < self.capacity() {
			free.push(block);
			return Ok(());
		}
		drop(free);

		#[cfg(feature = "shared-pool")]
		if self.use_global {
			return Global::get().recycle(block);
		}

		Ok(())
	}

	fn pooled_bytes(&self) -> usize {
		let local = self.free.borrow().len() * SEGMENT_SIZE;

		#[cfg(feature = "shared-pool")]
		if self.use_global {
			return local + Global::get().pooled_bytes();
		}

		local
	}
}

#[cfg(feature = "shared-pool")]
mod shared {
	use std::sync::{Arc, Mutex, OnceLock};
	use crate::error::{Error, Result};
	use crate::segment::Block;
	use crate::GLOBAL_MAX_BYTES;

	/// The process-wide free-list backing every thread's [`LocalPool`](super::LocalPool)
	/// once its own cache is exhausted or overflowing. Stores raw blocks, not
	/// segments: a [`Segment`](crate::Segment) wraps its block in an `Rc`,
	/// which isn't `Send`, so only the uniquely-owned block underneath a
	/// segment can ever cross a thread boundary.
	pub(super) struct Global {
		free: Arc<Mutex<Vec<Box<Block>>>>,
	}

	static GLOBAL: OnceLock<Global> = OnceLock::new();

	impl Global {
		pub fn get() -> Self {
			GLOBAL.get_or_init(|| Global { free: Arc::new(Mutex::new(Vec::new())) }).clone()
		}

		fn capacity() -> usize { GLOBAL_MAX_BYTES / crate::SEGMENT_SIZE }

		pub fn take(&self) -> Result<Option<Box<Block>>> {
			let mut free = self.free.lock().map_err(|_| Error::pool_poisoned())?;
			Ok(free.pop())
		}

		pub fn recycle(&self, block: Box<Block>) -> Result {
			let mut free = self.free.lock().map_err(|_| Error::pool_poisoned())?;
			if free.len() < Self::capacity() {
				free.push(block);
			}
			Ok(())
		}

		pub fn pooled_bytes(&self) -> usize {
			self.free.lock().map(|f| f.len() * crate::SEGMENT_SIZE).unwrap_or(0)
		}
	}

	impl Clone for Global {
		fn clone(&self) -> Self { Self { free: self.free.clone() } }
	}
}
