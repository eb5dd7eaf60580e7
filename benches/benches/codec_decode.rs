//! Benchmark suite for the hot decode paths
//!
//! Measures PackBits decompression and DC2 sprite decoding over
//! synthetic payloads with a realistic opcode mix.
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use relic_benches::{generate_dc2_data, generate_packbits_data, sizes};
use relic_types::codecs::packbits;
use relic_types::sprites::dark_castle;
use std::hint::black_box;

fn bench_packbits(c: &mut Criterion) {
	let mut group = c.benchmark_group("packbits_unpack");

	for (name, decoded_len) in
		[("small", sizes::SMALL), ("medium", sizes::MEDIUM), ("large", sizes::LARGE)]
	{
		let data = generate_packbits_data(decoded_len);
		group.throughput(Throughput::Bytes(decoded_len as u64));
		group.bench_with_input(BenchmarkId::new("unpack", name), &data, |b, data| {
			b.iter(|| {
				let result = packbits::unpack_bits(black_box(data));
				black_box(result)
			});
		});
	}

	group.finish();
}

fn bench_packbits_roundtrip(c: &mut Criterion) {
	let mut group = c.benchmark_group("packbits_pack");

	let data = generate_packbits_data(sizes::MEDIUM);
	let decoded = packbits::unpack_bits(&data).expect("generator produced valid data");
	group.throughput(Throughput::Bytes(decoded.len() as u64));
	group.bench_function("pack", |b| {
		b.iter(|| {
			let result = packbits::pack_bits(black_box(&decoded));
			black_box(result)
		});
	});

	group.finish();
}

fn bench_dc2(c: &mut Criterion) {
	let mut group = c.benchmark_group("dc2_decode");

	for (name, width, height) in [("64x64", 64i16, 64i16), ("256x256", 256, 256), ("512x342", 512, 342)]
	{
		let data = generate_dc2_data(width, height);
		group.throughput(Throughput::Elements(width as u64 * height as u64));
		group.bench_with_input(BenchmarkId::new("decode", name), &data, |b, data| {
			b.iter(|| {
				let result = dark_castle::decode_dc2(black_box(data));
				black_box(result)
			});
		});
	}

	group.finish();
}

criterion_group!(benches, bench_packbits, bench_packbits_roundtrip, bench_dc2);
criterion_main!(benches);
