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

use std::{error, result};
use amplify_derive::Display;

pub type Result<T = ()> = result::Result<T, Error>;

/// The taxonomy of failures the core can report. See §7 of the design notes:
/// bounds and sharing violations are precondition failures on the calling
/// operation, pool errors come from contention on the free-list, and I/O
/// errors are only ever constructed by source/sink bridges wrapping this
/// core, never by the core itself.
#[derive(Copy, Clone, Debug, Display)]
pub enum ErrorKind {
	#[display("read or skip past the end of the buffer")]
	BoundsViolation,
	#[display("attempted to mutate a shared segment")]
	SharingViolation,
	#[display("could not borrow the local segment pool, already in use")]
	PoolBorrow,
	#[display("the shared segment pool's lock was poisoned")]
	PoolPoisoned,
	#[display("operation on a closed stream")]
	Closed,
	#[display("I/O error")]
	Io,
}

#[derive(Debug, Display)]
#[display("{kind}")]
pub struct Error {
	kind: ErrorKind,
	source: Option<Box<dyn error::Error + Send + Sync>>,
}

impl error::Error for Error {
	fn source(&self) -> Option<&(dyn error::Error + 'static)> {
		self.source.as_ref().map(|s| s.as_ref() as &(dyn error::Error + 'static))
	}
}

impl Error {
	pub fn new(kind: ErrorKind, source: impl error::Error + Send + Sync + 'static) -> Self {
		Self { kind, source: Some(Box::new(source)) }
	}

	fn bare(kind: ErrorKind) -> Self {
		Self { kind, source: None }
	}

	/// Returns the kind of error that occurred.
	pub fn kind(&self) -> ErrorKind { self.kind }

	pub(crate) fn bounds() -> Self { Self::bare(ErrorKind::BoundsViolation) }
	pub(crate) fn sharing() -> Self { Self::bare(ErrorKind::SharingViolation) }
	pub(crate) fn closed() -> Self { Self::bare(ErrorKind::Closed) }

	pub(crate) fn pool_borrow(source: impl error::Error + Send + Sync + 'static) -> Self {
		Self::new(ErrorKind::PoolBorrow, source)
	}

	pub(crate) fn pool_poisoned() -> Self { Self::bare(ErrorKind::PoolPoisoned) }

	pub fn io(source: impl error::Error + Send + Sync + 'static) -> Self {
		Self::new(ErrorKind::Io, source)
	}
}
