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

use pretty_assertions::assert_eq;
use segbuf::Segment;

#[test]
fn push_pop_roundtrips_every_byte_value() {
	let mut seg = Segment::empty();
	for b in 0..=255u8 {
		seg.push(b).unwrap();
	}
	for b in 0..=255u8 {
		assert_eq!(seg.pop(), Some(b));
	}
	assert!(seg.is_empty());
}

#[test]
fn sharing_marks_both_handles_shared_and_the_alias_cant_append() {
	let mut seg = Segment::empty();
	seg.push_slice(b"hello").unwrap();

	let mut shared = seg.share_all();
	assert!(seg.is_shared());
	assert!(shared.is_shared());
	assert!(seg.is_owner());
	assert!(!shared.is_owner());
	assert!(shared.push(b'!').is_err());
}

#[test]
fn writing_through_the_owner_after_a_share_forks_rather_than_mutating_the_alias() {
	let mut seg = Segment::empty();
	seg.push_slice(b"hello").unwrap();
	let shared = seg.share_all();

	seg.push(b'!').unwrap();

	assert_eq!(shared.to_vec(), b"hello");
	assert_eq!(seg.to_vec(), b"hello!");
}

#[test]
fn split_shares_prefixes_at_or_above_the_threshold() {
	let data: Vec<u8> = (0..2000u32).map(|i| (i & 0xFF) as u8).collect();
	let mut seg = Segment::empty();
	seg.push_slice(&data).unwrap();

	let prefix = seg.split(1500, 1024, Segment::empty);

	assert_eq!(prefix.to_vec(), data[..1500]);
	assert_eq!(seg.to_vec(), data[1500..]);
	assert!(prefix.is_shared());
	assert!(seg.is_shared());
}

#[test]
fn split_copies_prefixes_below_the_threshold() {
	let data: Vec<u8> = (0..2000u32).map(|i| (i & 0xFF) as u8).collect();
	let mut seg = Segment::empty();
	seg.push_slice(&data).unwrap();

	let prefix = seg.split(500, 1024, Segment::empty);

	assert_eq!(prefix.to_vec(), data[..500]);
	assert_eq!(seg.to_vec(), data[500..]);
	assert!(!prefix.is_shared());
	assert!(!seg.is_shared());
}

#[test]
fn write_to_moves_bytes_between_segments() {
	let mut src = Segment::empty();
	src.push_slice(b"hello world").unwrap();
	let mut dst = Segment::empty();

	let moved = src.write_to(&mut dst, 5).unwrap();

	assert_eq!(moved, 5);
	assert_eq!(dst.to_vec(), b"hello");
	assert_eq!(src.to_vec(), b" world");
}

#[test]
fn write_to_a_shared_destination_is_a_sharing_violation() {
	let mut src = Segment::empty();
	src.push_slice(b"abc").unwrap();
	let mut dst = Segment::empty();
	dst.push_slice(b"xyz").unwrap();
	let _alias = dst.share_all();

	assert!(src.write_to(&mut dst, 1).is_err());
}

#[test]
fn index_of_finds_a_byte_within_bounds() {
	let mut seg = Segment::empty();
	seg.push_slice(b"abcabc").unwrap();

	assert_eq!(seg.index_of(b'c', 0, 6), Some(2));
	assert_eq!(seg.index_of(b'c', 3, 6), Some(5));
	assert_eq!(seg.index_of(b'z', 0, 6), None);
}

#[test]
fn index_of_slice_inbound_finds_a_pattern_fully_contained() {
	let mut seg = Segment::empty();
	seg.push_slice(b"helloworld").unwrap();

	assert_eq!(seg.index_of_slice_inbound(b"low", 0), Some(3));
	assert_eq!(seg.index_of_slice_inbound(b"xyz", 0), None);
}
