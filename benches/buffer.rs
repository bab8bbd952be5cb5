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

use std::mem;
use criterion::{BatchSize, Bencher, black_box, Criterion, criterion_group, criterion_main};
use segbuf::{Buffer, SEGMENT_SIZE};

fn data() -> Vec<u8> {
	(0..SEGMENT_SIZE * 4).map(|i| (i & 0xFF) as u8).collect()
}

fn write_slice(c: &mut Criterion) {
	let data = data();
	c.bench_function("write_slice", |b| b.iter(|| {
		let mut buf = Buffer::default();
		buf.write_slice(&data).unwrap();
		buf
	}));
}

fn write_numbers(c: &mut Criterion) {
	let mut group = c.benchmark_group("write_numbers");
	let mut buffer = Buffer::default();

	macro_rules! gen {
		($($fn:ident $ty:ident),+) => {
			$(
			group.bench_function(stringify!($fn), |b| b.iter(|| {
				for _ in 0..SEGMENT_SIZE / mem::size_of::<$ty>() {
					let _ = black_box(buffer.$fn($ty::MAX));
				}
				buffer.clear().unwrap();
			}));
			)+
		};
	}

	gen!(
		write_u16 u16,
		write_u16_le u16,
		write_u32 u32,
		write_u32_le u32,
		write_u64 u64,
		write_u64_le u64
	);
	group.finish();
}

#[inline(always)]
fn read_loop<R>(b: &mut Bencher, data: &[u8], mut read: impl FnMut(&mut Buffer) -> R) {
	b.iter_batched_ref(
		|| {
			let mut buf = Buffer::default();
			buf.write_slice(data).unwrap();
			buf
		},
		|buf| read(buf),
		BatchSize::SmallInput,
	);
}

fn read_slice(c: &mut Criterion) {
	let data = data();
	let mut target = vec![0u8; data.len()];
	c.bench_function("read_slice", |b|
		read_loop(b, &data, |buf| buf.read_into_slice_exact(&mut target))
	);
}

fn read_numbers(c: &mut Criterion) {
	let mut group = c.benchmark_group("read_numbers");
	let data = data();

	macro_rules! gen {
		($($fn:ident $ty:ident),+) => {
			$(
			group.bench_function(stringify!($fn), |b|
				read_loop(b, &data, |buf|
					for _ in 0..SEGMENT_SIZE / mem::size_of::<$ty>() {
						let _ = black_box(buf.$fn());
					}
				)
			);
			)+
		};
	}

	gen!(
		read_u16 u16,
		read_u16_le u16,
		read_u32 u32,
		read_u32_le u32,
		read_u64 u64,
		read_u64_le u64
	);
	group.finish();
}

fn skip(c: &mut Criterion) {
	let mut group = c.benchmark_group("skip");
	let data = data();

	group.bench_function("skip all", |b| read_loop(b, &data, |buf| buf.skip(data.len())));
	group.bench_function("skip partial", |b| read_loop(b, &data, |buf| buf.skip(4096)));
	group.finish();
}

fn find(c: &mut Criterion) {
	let mut group = c.benchmark_group("find");
	let data = data();
	let mut buffer = Buffer::default();
	buffer.write_slice(&data).unwrap();

	group.bench_function("index_of_byte", |b| b.iter(|| buffer.index_of_byte(b'\xFF', 0)));
	group.bench_function("index_of_bytes", |b| b.iter(|| buffer.index_of_bytes(&[0xFD, 0xFE, 0xFF], 0)));
	group.finish();
}

fn transfer(c: &mut Criterion) {
	let data = data();
	c.bench_function("transfer_from", |b| b.iter_batched(
		|| {
			let mut src = Buffer::default();
			src.write_slice(&data).unwrap();
			(src, Buffer::default())
		},
		|(mut src, mut dst)| dst.transfer_from(&mut src, data.len()).unwrap(),
		BatchSize::SmallInput,
	));
}

criterion_group!(benches, write_slice, write_numbers, read_slice, read_numbers, skip, find, transfer);
criterion_main!(benches);
