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

use segbuf::{Buffer, LocalPool, Pool, SEGMENT_SIZE};

#[test]
fn claimed_segments_start_empty_and_owned() {
	let pool = LocalPool::new(SEGMENT_SIZE * 4);
	let seg = pool.claim_one().unwrap();

	assert!(seg.is_empty());
	assert!(seg.is_owner());
	assert!(!seg.is_shared());
}

#[test]
fn recycled_segments_are_claimed_again_rather_than_freshly_allocated() {
	let pool = LocalPool::new(SEGMENT_SIZE * 4);
	let mut seg = pool.claim_one().unwrap();
	seg.push_slice(b"stale data").unwrap();

	pool.recycle_one(seg).unwrap();
	assert_eq!(pool.pooled_bytes(), SEGMENT_SIZE);

	let seg = pool.claim_one().unwrap();
	assert!(seg.is_empty(), "a recycled segment must come back cleared");
	assert_eq!(pool.pooled_bytes(), 0);
}

#[test]
fn shared_segments_are_dropped_rather_than_pooled() {
	let pool = LocalPool::new(SEGMENT_SIZE * 4);
	let seg = pool.claim_one().unwrap();
	let alias = seg.share_all();

	pool.recycle_one(seg).unwrap();
	pool.recycle_one(alias).unwrap();

	assert_eq!(pool.pooled_bytes(), 0);
}

#[test]
fn a_cache_bounded_to_one_segment_spills_the_rest() {
	let pool = LocalPool::new(SEGMENT_SIZE);
	let a = pool.claim_one().unwrap();
	let b = pool.claim_one().unwrap();

	pool.recycle_one(a).unwrap();
	pool.recycle_one(b).unwrap();

	// Only one segment's worth of bytes fits in a pool bounded to
	// SEGMENT_SIZE; the rest is dropped rather than retained.
	assert_eq!(pool.pooled_bytes(), SEGMENT_SIZE);
}

#[test]
fn a_cache_bounded_to_zero_bytes_never_retains_anything() {
	let pool = LocalPool::new(0);
	let seg = pool.claim_one().unwrap();
	pool.recycle_one(seg).unwrap();
	assert_eq!(pool.pooled_bytes(), 0);
}
