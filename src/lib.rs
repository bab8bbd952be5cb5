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

//! ## How it works
//!
//! Data is written to and read from reusable bits of memory called *segments*.
//! When a segment is consumed, it's returned to a *pool*. To write data,
//! segments are claimed from this pool. When the pool is exhausted, segments
//! are created up to a set limit. The pool is two-level: a process-global
//! free-list bounded by [`GLOBAL_MAX_BYTES`], behind a lock, backed by a
//! thread-local cache bounded by [`PER_THREAD_MAX_BYTES`] that absorbs the
//! common case without contention.
//!
//! ### Segments
//!
//! Segments are fixed-size chunks of memory linked into a ring buffer. The
//! memory within a segment can be owned or shared between segments and
//! snapshots, avoiding copies where possible: shared memory is copy-on-write,
//! readable from multiple segments at once, only copied when one of them
//! writes. Small amounts of data under [`SHARE_MINIMUM`] are copied rather
//! than shared, trading a cheap copy for a pool slot that can be recycled
//! immediately instead of staying pinned by a reference count.
//!
//! ### Buffers
//!
//! A [`Buffer`] is a FIFO byte queue backed by a chain of segments. Moving
//! bytes between two buffers prefers relinking whole segments over copying;
//! only a leading or trailing partial segment below the sharing threshold is
//! ever copied.

mod error;
mod pool;
mod segment;
mod buffer;
mod byte_str;
pub mod streams;

pub use error::{Error, ErrorKind, Result};
pub use buffer::{Buffer, BufferOptions};
pub use pool::{Pool, LocalPool, PoolOptions};
pub use segment::Segment;
pub use byte_str::ByteString;

/// The fixed capacity, in bytes, of a single [`Segment`]'s backing block.
pub const SEGMENT_SIZE: usize = 8192;
/// The minimum byte count for [`Segment::split`] to share the prefix's
/// memory rather than copy it into a fresh segment.
pub const SHARE_MINIMUM: usize = 1024;
/// Default bound on the total number of free bytes held by the pool's global
/// free-list.
pub const GLOBAL_MAX_BYTES: usize = 64 * SEGMENT_SIZE;
/// Default bound on the number of free bytes held by a single thread's local
/// pool cache.
pub const PER_THREAD_MAX_BYTES: usize = 4 * SEGMENT_SIZE;
