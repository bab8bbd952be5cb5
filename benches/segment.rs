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

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use segbuf::{Segment, SEGMENT_SIZE};

fn data() -> Vec<u8> {
	(0..SEGMENT_SIZE).map(|i| (i & 0xFF) as u8).collect()
}

fn push_slice(c: &mut Criterion) {
	let data = data();
	c.bench_function("push_slice full segment", |b| b.iter_batched(
		Segment::empty,
		|mut seg| seg.push_slice(&data).unwrap(),
		BatchSize::SmallInput,
	));
}

fn push_byte(c: &mut Criterion) {
	let data = data();
	c.bench_function("push byte-by-byte", |b| b.iter_batched(
		Segment::empty,
		|mut seg| {
			for &byte in &data {
				let _ = seg.push(byte);
			}
		},
		BatchSize::SmallInput,
	));
}

fn pop_into_slice(c: &mut Criterion) {
	let data = data();
	let mut target = vec![0u8; SEGMENT_SIZE];
	c.bench_function("pop_into_slice full segment", |b| b.iter_batched_ref(
		|| {
			let mut seg = Segment::empty();
			seg.push_slice(&data).unwrap();
			seg
		},
		|seg| seg.pop_into_slice(&mut target),
		BatchSize::SmallInput,
	));
}

fn share_vs_copy_split(c: &mut Criterion) {
	let data = data();
	let mut group = c.benchmark_group("split");

	group.bench_function("share (large prefix)", |b| b.iter_batched(
		|| {
			let mut seg = Segment::empty();
			seg.push_slice(&data).unwrap();
			seg
		},
		|mut seg| seg.split(4096, 1024, Segment::empty),
		BatchSize::SmallInput,
	));

	group.bench_function("copy (small prefix)", |b| b.iter_batched(
		|| {
			let mut seg = Segment::empty();
			seg.push_slice(&data).unwrap();
			seg
		},
		|mut seg| seg.split(512, 1024, Segment::empty),
		BatchSize::SmallInput,
	));
	group.finish();
}

criterion_group!(benches, push_slice, push_byte, pop_into_slice, share_vs_copy_split);
criterion_main!(benches);
