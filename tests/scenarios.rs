//! End-to-end decode scenarios exercised through the public API.

use relic_rs::prelude::*;
use relic_rs::relic_types::codecs::{dinopark, macski, packbits, presage};
use relic_rs::relic_types::containers::{dark_castle, mohawk, resource_fork};
use relic_rs::relic_types::quickdraw::raster::decode_monochrome;

#[test]
fn packbits_scenario() {
	let input = [0x02, 0x41, 0x42, 0x43, 0xFE, 0x44];
	assert_eq!(packbits::unpack_bits(&input).unwrap(), b"ABCDDD");
}

#[test]
fn packbits_roundtrip_property() {
	let cases: &[&[u8]] = &[
		b"",
		b"Q",
		b"the quick brown fox",
		&[9; 1000],
		&[1, 1, 2, 2, 2, 3, 3, 3, 3, 0, 5],
	];
	for &case in cases {
		let packed = packbits::pack_bits(case);
		assert_eq!(packbits::unpack_bits(&packed).unwrap(), case);
	}
}

#[test]
fn run4_scenario() {
	// Declared size 6, but the stream supplies one repeat-3 command
	let input =
		[b'R', b'U', b'N', b'4', 0, 0, 0, 6, 0xC3, 0xC4, 0xC5, 0xCF, 0xC3, 0x41];
	assert_eq!(macski::decompress_run4(&input).unwrap(), b"AAA");
}

#[test]
fn presage_lzss_scenario() {
	// Three literals then a 3-byte backreference at distance 3
	let input = [0x00, 0x00, 0x00, 0x06, 0x08, 0x41, 0x42, 0x43, 0x00, 0x02];
	assert_eq!(presage::decompress_lzss(&input, None).unwrap(), b"ABCABC");
}

#[test]
fn monochrome_bitmap_scenario() {
	// One row, row_bytes 2: 0xAA alternates starting black, 0x00 is white
	let img = decode_monochrome(&[0xAA, 0x00], 16, 1, 2).unwrap();
	assert_eq!(img.height(), 1);
	for x in 0..16 {
		let expected = if x < 8 && x % 2 == 0 { Rgba::BLACK } else { Rgba::WHITE };
		assert_eq!(img.read(x, 0).unwrap(), expected, "pixel {x}");
	}
}

#[test]
fn resource_fork_scenario() {
	let text = fourcc(*b"TEXT");
	let bytes = resource_fork::build_fork(&[(text, 128, "hello", b"Hi!\n")]);
	let fork = ResourceFork::parse(bytes).unwrap();

	assert_eq!(fork.all_resources(), vec![(0x5445_5854, 128)]);
	assert_eq!(fork.resource_data(text, 128, false).unwrap().as_ref(), b"Hi!\n");
	assert_eq!(fork.get_resource_name(text, 128).unwrap(), "hello");
}

#[test]
fn dinopark_rle_scenario() {
	let mut input = b"RLE ".to_vec();
	input.extend_from_slice(&5u32.to_be_bytes());
	input.extend_from_slice(&8u32.to_be_bytes());
	input.extend_from_slice(&[0; 4]);
	input.extend_from_slice(&[0x01, 0x41, 0x42, 0xFE, 0x43]);
	assert_eq!(dinopark::decompress_rle(&input).unwrap(), b"ABCCC");
}

#[test]
fn enumeration_consistency_across_containers() {
	let tag_a = fourcc(*b"AAAA");
	let tag_b = fourcc(*b"BBBB");

	let fork = ResourceFork::parse(resource_fork::build_fork(&[
		(tag_a, 1, "", b"x"),
		(tag_a, 2, "", b"y"),
		(tag_b, -3, "", b"z"),
	]))
	.unwrap();
	let dc = DarkCastleFile::parse(dark_castle::build_file(&[
		(tag_a, 1, b"x"),
		(tag_a, 2, b"y"),
		(tag_b, -3, b"z"),
	]))
	.unwrap();
	let mohawk =
		MohawkArchive::parse(mohawk::build_archive(tag_a, &[(1, b"x"), (2, b"y")])).unwrap();

	let sources: [&dyn ResourceSource; 3] = [&fork, &dc, &mohawk];
	for source in sources {
		let mut walked = Vec::new();
		for t in source.all_types() {
			for id in source.all_resources_of_type(t) {
				walked.push((t, id));
			}
		}
		let mut all = source.all_resources();
		all.sort_unstable();
		walked.sort_unstable();
		assert_eq!(all, walked);

		for &(t, id) in &all {
			assert!(source.resource_exists(t, id));
			assert!(!source.get_resource_data(t, id).unwrap().is_empty());
		}
	}
}

#[test]
fn bmp_and_ppm_roundtrips() {
	let mut img = Image::new(5, 3).unwrap();
	img.write(0, 0, Rgba::new(10, 20, 30, 255)).unwrap();
	img.write(4, 2, Rgba::new(200, 100, 50, 255)).unwrap();

	for format in [ImageFormat::WindowsBitmap, ImageFormat::ColorPpm] {
		let bytes = img.save_to_vec(format).unwrap();
		let loaded = Image::load(&bytes).unwrap();
		assert_eq!(loaded, img);
		assert_eq!(loaded.save_to_vec(format).unwrap(), bytes);
	}
}

#[test]
fn decode_dispatch_end_to_end() {
	let text = fourcc(*b"TEXT");
	let icon = fourcc(*b"ICON");
	let fork = ResourceFork::parse(resource_fork::build_fork(&[
		(text, 128, "", b"one\rtwo"),
		(icon, 200, "", &[0xFF; 128]),
	]))
	.unwrap();

	let ctx = DecoderContext::default();
	match decode_resource(&fork, text, 128, &ctx).unwrap() {
		DecodedResource::Text(t) => assert_eq!(t, "one\ntwo"),
		other => panic!("wrong artifact: {other:?}"),
	}
	match decode_resource(&fork, icon, 200, &ctx).unwrap() {
		DecodedResource::Image(img) => {
			assert_eq!((img.width(), img.height()), (32, 32));
			assert_eq!(img.read(0, 0).unwrap(), Rgba::BLACK);
		}
		other => panic!("wrong artifact: {other:?}"),
	}
}
