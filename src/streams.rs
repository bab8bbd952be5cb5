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

//! The minimal source/sink surface external bridges implement against. This
//! core only defines the trait boundary; buffered wrappers, codecs, and
//! OS-stream bridges are external collaborators that consume it.

use crate::error::Result;
use crate::Buffer;

/// A producer of bytes. Implemented by byte sources (files, sockets, other
/// buffers) that fill a [`Buffer`] on demand.
pub trait Source {
	/// Appends at most `max_bytes` to `sink`, returning the number of bytes
	/// read, or `Ok(0)` only if `max_bytes == 0` or the stream is at end.
	/// Callers distinguish end-of-stream from "try again" by checking
	/// whether `sink`'s count grew.
	fn read_at_most_to(&mut self, sink: &mut Buffer, max_bytes: usize) -> Result<usize>;

	/// Closes the source. Idempotent.
	fn close(&mut self) -> Result { Ok(()) }
}

/// A consumer of bytes. Implemented by byte sinks that drain a [`Buffer`].
pub trait Sink {
	/// Consumes exactly `bytes` from `source`'s head, advancing its cursor.
	fn write(&mut self, source: &mut Buffer, bytes: usize) -> Result;

	/// Flushes any buffered output to its underlying destination.
	fn flush(&mut self) -> Result { Ok(()) }

	/// Closes the sink after flushing. Idempotent.
	fn close(&mut self) -> Result { self.flush() }
}

impl Source for &[u8] {
	fn read_at_most_to(&mut self, sink: &mut Buffer, max_bytes: usize) -> Result<usize> {
		let n = max_bytes.min(self.len());
		sink.write_slice(&self[..n])?;
		*self = &self[n..];
		Ok(n)
	}
}
