//! Unit tests for archive scanning, extraction, and patching.

use std::collections::HashMap;

use image::{Rgba, RgbaImage};

use super::*;
use crate::file::gm::record::RecordKind;

/// One record to place in a synthetic archive.
struct Rec {
	name: &'static str,
	kind: RecordKind,
	x: u16,
	y: u16,
	w: u16,
	h: u16,
	page: u16,
}

impl Rec {
	fn sprite(name: &'static str, x: u16, y: u16, w: u16, h: u16, page: u16) -> Self {
		Self { name, kind: RecordKind::Sprite, x, y, w, h, page }
	}

	fn background(name: &'static str, x: u16, y: u16, w: u16, h: u16, page: u16) -> Self {
		Self { name, kind: RecordKind::Background, x, y, w, h, page }
	}
}

fn put_u32(buf: &mut [u8], offset: usize, value: u32) {
	buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn put_u16(buf: &mut [u8], offset: usize, value: u16) {
	buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

/// Builds a complete synthetic archive: STRG (names), TPAG (rects), SPRT,
/// BGND, and TXTR chunks with real PNG payloads. `txtr_first` moves the
/// TXTR chunk ahead of the table chunks to exercise chunk-order
/// independence.
fn build_archive(records: &[Rec], pages: &[Vec<u8>], txtr_first: bool) -> Vec<u8> {
	let sprites: Vec<usize> = (0..records.len())
		.filter(|&i| records[i].kind == RecordKind::Sprite)
		.collect();
	let bgnds: Vec<usize> = (0..records.len())
		.filter(|&i| records[i].kind == RecordKind::Background)
		.collect();

	let strg_size: usize = records.iter().map(|r| 4 + r.name.len()).sum();
	let tpag_size = records.len() * 22;
	let sprt_size = 4 + sprites.len() * (4 + 68);
	let bgnd_size = 4 + bgnds.len() * (4 + 20);
	let txtr_size = 4 + pages.len() * 12 + pages.iter().map(Vec::len).sum::<usize>();

	let seq: [([u8; 4], usize); 5] = if txtr_first {
		[
			(*b"STRG", strg_size),
			(*b"TPAG", tpag_size),
			(*b"TXTR", txtr_size),
			(*b"SPRT", sprt_size),
			(*b"BGND", bgnd_size),
		]
	} else {
		[
			(*b"STRG", strg_size),
			(*b"TPAG", tpag_size),
			(*b"SPRT", sprt_size),
			(*b"BGND", bgnd_size),
			(*b"TXTR", txtr_size),
		]
	};

	let mut offs: HashMap<[u8; 4], usize> = HashMap::new();
	let mut pos = 8;
	for (tag, size) in seq {
		offs.insert(tag, pos + 8);
		pos += 8 + size;
	}
	let total = pos;

	let mut buf = vec![0u8; total];
	buf[0..4].copy_from_slice(b"FORM");
	put_u32(&mut buf, 4, (total - 8) as u32);
	for (tag, size) in seq {
		let payload = offs[&tag];
		buf[payload - 8..payload - 4].copy_from_slice(&tag);
		put_u32(&mut buf, payload - 4, size as u32);
	}

	// String blob: [len: u32][bytes] per name; pointers address the bytes.
	let mut name_ptrs = Vec::with_capacity(records.len());
	let mut p = offs[b"STRG"];
	for rec in records {
		put_u32(&mut buf, p, rec.name.len() as u32);
		buf[p + 4..p + 4 + rec.name.len()].copy_from_slice(rec.name.as_bytes());
		name_ptrs.push(p + 4);
		p += 4 + rec.name.len();
	}

	// Texture page entries: 11 u16 values each.
	let tpag = offs[b"TPAG"];
	let mut rect_ptrs = Vec::with_capacity(records.len());
	for (i, rec) in records.iter().enumerate() {
		let r = tpag + i * 22;
		rect_ptrs.push(r);
		let fields = [
			rec.x, rec.y, rec.w, rec.h, 0, 0, rec.w, rec.h, rec.w, rec.h, rec.page,
		];
		for (j, v) in fields.iter().enumerate() {
			put_u16(&mut buf, r + j * 2, *v);
		}
	}

	// Sprite table: count, offsets, 68-byte records.
	let sprt = offs[b"SPRT"];
	put_u32(&mut buf, sprt, sprites.len() as u32);
	for (k, &ri) in sprites.iter().enumerate() {
		let rec_off = sprt + 4 + 4 * sprites.len() + 68 * k;
		put_u32(&mut buf, sprt + 4 + 4 * k, rec_off as u32);
		put_u32(&mut buf, rec_off, name_ptrs[ri] as u32);
		put_u32(&mut buf, rec_off + 4, u32::from(records[ri].w));
		put_u32(&mut buf, rec_off + 8, u32::from(records[ri].h));
		put_u32(&mut buf, rec_off + 15 * 4, rect_ptrs[ri] as u32);
	}

	// Background table: count, offsets, 20-byte records.
	let bgnd = offs[b"BGND"];
	put_u32(&mut buf, bgnd, bgnds.len() as u32);
	for (k, &ri) in bgnds.iter().enumerate() {
		let rec_off = bgnd + 4 + 4 * bgnds.len() + 20 * k;
		put_u32(&mut buf, bgnd + 4 + 4 * k, rec_off as u32);
		put_u32(&mut buf, rec_off, name_ptrs[ri] as u32);
		put_u32(&mut buf, rec_off + 4 * 4, rect_ptrs[ri] as u32);
	}

	// Texture pages: count, entry offsets, entries, PNG data.
	let txtr = offs[b"TXTR"];
	let m = pages.len();
	put_u32(&mut buf, txtr, m as u32);
	let mut data_off = txtr + 4 + 12 * m;
	for (i, page) in pages.iter().enumerate() {
		let entry = txtr + 4 + 4 * m + 8 * i;
		put_u32(&mut buf, txtr + 4 + 4 * i, entry as u32);
		put_u32(&mut buf, entry, 0xDEAD_0000 + i as u32);
		put_u32(&mut buf, entry + 4, data_off as u32);
		buf[data_off..data_off + page.len()].copy_from_slice(page);
		data_off += page.len();
	}

	buf
}

/// Walks the chunk headers of a built archive to find one payload's bounds.
fn chunk_bounds(data: &[u8], tag: &[u8; 4]) -> (usize, usize) {
	let mut pos = 8;
	while pos < data.len() {
		let size = u32::from_le_bytes([data[pos + 4], data[pos + 5], data[pos + 6], data[pos + 7]]) as usize;
		if &data[pos..pos + 4] == tag {
			return (pos + 8, pos + 8 + size);
		}
		pos += 8 + size;
	}
	panic!("chunk {} not in test archive", tag.escape_ascii());
}

fn png_gradient(width: u32, height: u32) -> Vec<u8> {
	let img = RgbaImage::from_fn(width, height, |x, y| {
		Rgba([
			(x * 17 % 256) as u8,
			(y * 29 % 256) as u8,
			((x + y) % 256) as u8,
			0xFF,
		])
	});
	let mut buf = std::io::Cursor::new(Vec::new());
	img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
	buf.into_inner()
}

fn png_solid(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
	let img = RgbaImage::from_pixel(width, height, Rgba(pixel));
	let mut buf = std::io::Cursor::new(Vec::new());
	img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
	buf.into_inner()
}

fn one_sprite_archive() -> Vec<u8> {
	build_archive(
		&[Rec::sprite("spr_box", 2, 3, 4, 4, 0)],
		&[png_gradient(10, 10)],
		false,
	)
}

#[test]
fn test_scan_minimal_archive() {
	let data = one_sprite_archive();
	let archive = Archive::from_bytes(&data).unwrap();

	assert_eq!(archive.len(), data.len());
	assert_eq!(archive.chunks().len(), 5);
	assert_eq!(archive.atlases().len(), 1);

	let entry = &archive.atlases()[0];
	assert_eq!(entry.index, 0);
	assert_eq!(entry.info.width, 10);
	assert_eq!(entry.info.height, 10);
	assert_eq!(archive.atlas_bytes(entry), &png_gradient(10, 10)[..]);

	let sprites = archive.index().sprites_on(0);
	assert_eq!(sprites.len(), 1);
	assert_eq!(sprites[0].name, "spr_box");
	assert_eq!(sprites[0].kind, RecordKind::Sprite);
	assert_eq!(
		(sprites[0].rect.x, sprites[0].rect.y, sprites[0].rect.width, sprites[0].rect.height),
		(2, 3, 4, 4)
	);
}

#[test]
fn test_backgrounds_resolve_too() {
	let data = build_archive(
		&[
			Rec::sprite("spr_a", 0, 0, 2, 2, 0),
			Rec::background("bg_title", 4, 4, 3, 3, 0),
		],
		&[png_gradient(8, 8)],
		false,
	);
	let archive = Archive::from_bytes(&data).unwrap();
	let sprites = archive.index().sprites_on(0);
	assert_eq!(sprites.len(), 2);
	let bg = sprites.iter().find(|s| s.name == "bg_title").unwrap();
	assert_eq!(bg.kind, RecordKind::Background);
	assert_eq!((bg.rect.x, bg.rect.y), (4, 4));
}

#[test]
fn test_bad_magic() {
	let mut data = one_sprite_archive();
	data[0] = b'X';
	assert!(matches!(Archive::from_bytes(&data), Err(GmError::BadMagic(_))));
}

#[test]
fn test_size_underflow_and_overflow() {
	let mut data = one_sprite_archive();
	let declared = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);

	put_u32(&mut data, 4, declared - 1);
	assert!(matches!(
		Archive::from_bytes(&data),
		Err(GmError::SizeUnderflow { .. })
	));

	put_u32(&mut data, 4, declared + 1);
	assert!(matches!(
		Archive::from_bytes(&data),
		Err(GmError::SizeOverflow { .. })
	));
}

#[test]
fn test_truncated_file_is_overflow() {
	let data = one_sprite_archive();
	assert!(matches!(
		Archive::from_bytes(&data[..data.len() - 1]),
		Err(GmError::SizeOverflow { .. })
	));
}

#[test]
fn test_duplicate_name_on_one_page() {
	let data = build_archive(
		&[
			Rec::sprite("spr_box", 0, 0, 2, 2, 0),
			Rec::sprite("spr_box", 4, 4, 2, 2, 0),
		],
		&[png_gradient(8, 8)],
		false,
	);
	assert!(matches!(
		Archive::from_bytes(&data),
		Err(GmError::DuplicateName { page: 0, .. })
	));
}

#[test]
fn test_same_name_on_two_pages_is_accepted() {
	let data = build_archive(
		&[
			Rec::sprite("spr_box", 0, 0, 2, 2, 0),
			Rec::sprite("spr_box", 0, 0, 2, 2, 1),
		],
		&[png_gradient(8, 8), png_gradient(8, 8)],
		false,
	);
	let archive = Archive::from_bytes(&data).unwrap();
	assert_eq!(archive.index().len(), 2);
}

#[test]
fn test_record_offset_outside_table_chunk() {
	let mut data = one_sprite_archive();
	let (payload, _) = chunk_bounds(&data, b"SPRT");
	// First offset-table entry now points before the chunk payload.
	put_u32(&mut data, payload + 4, 0);
	assert!(matches!(
		Archive::from_bytes(&data),
		Err(GmError::IllegalOffset { offset: 0, .. })
	));
}

#[test]
fn test_record_offset_past_table_chunk() {
	let mut data = one_sprite_archive();
	let (payload, payload_end) = chunk_bounds(&data, b"SPRT");
	// Record would start inside but run past the chunk end.
	put_u32(&mut data, payload + 4, (payload_end - 4) as u32);
	assert!(matches!(Archive::from_bytes(&data), Err(GmError::IllegalOffset { .. })));
}

#[test]
fn test_txtr_entry_offset_out_of_bounds() {
	let mut data = one_sprite_archive();
	let (payload, _) = chunk_bounds(&data, b"TXTR");
	put_u32(&mut data, payload + 4, 8);
	assert!(matches!(Archive::from_bytes(&data), Err(GmError::IllegalOffset { offset: 8, .. })));
}

#[test]
fn test_truncated_embedded_png_overflows() {
	let mut page = png_gradient(10, 10);
	page.truncate(page.len() - 4);
	let data = build_archive(&[Rec::sprite("spr_box", 2, 3, 4, 4, 0)], &[page], false);
	assert!(matches!(Archive::from_bytes(&data), Err(GmError::Overflow { .. })));
}

#[test]
fn test_bad_string_data() {
	let mut data = one_sprite_archive();
	let (payload, _) = chunk_bounds(&data, b"STRG");
	// Overwrite the first two name bytes with invalid UTF-8.
	data[payload + 4] = 0xFF;
	data[payload + 5] = 0xFE;
	assert!(matches!(Archive::from_bytes(&data), Err(GmError::BadString { .. })));
}

#[test]
fn test_chunk_order_does_not_matter() {
	let records = || {
		vec![
			Rec::sprite("spr_box", 2, 3, 4, 4, 0),
			Rec::background("bg_far", 0, 0, 6, 5, 1),
		]
	};
	let pages = vec![png_gradient(10, 10), png_gradient(12, 9)];

	let tables_first = Archive::from_bytes(&build_archive(&records(), &pages, false)).unwrap();
	let txtr_first = Archive::from_bytes(&build_archive(&records(), &pages, true)).unwrap();

	for archive in [&tables_first, &txtr_first] {
		assert_eq!(archive.atlases().len(), 2);
		assert_eq!(archive.index().sprites_on(0).len(), 1);
		assert_eq!(archive.index().sprites_on(1).len(), 1);
		assert_eq!(archive.index().sprites_on(1)[0].name, "bg_far");
	}
	assert_eq!(tables_first.index().sprites_on(0), txtr_first.index().sprites_on(0));
	assert_eq!(tables_first.index().sprites_on(1), txtr_first.index().sprites_on(1));
}

#[test]
fn test_section_tag_roundtrip() {
	let sections = [
		Section::Gen8,
		Section::Optn,
		Section::Extn,
		Section::Sond,
		Section::Sprt,
		Section::Bgnd,
		Section::Path,
		Section::Scpt,
		Section::Shdr,
		Section::Font,
		Section::Tmln,
		Section::Objt,
		Section::Room,
		Section::Dafl,
		Section::Tpag,
		Section::Code,
		Section::Vari,
		Section::Func,
		Section::Strg,
		Section::Txtr,
		Section::Audo,
	];
	for section in sections {
		assert_eq!(Section::from_tag(section.tag()), Some(section));
	}
	assert_eq!(Section::from_tag(*b"NOPE"), None);
}

#[test]
fn test_unknown_chunks_are_skipped_opaquely() {
	// Append an unrecognized chunk after the known ones; absolute pointers
	// elsewhere stay valid.
	let mut data = one_sprite_archive();
	let junk = *b"JUNKjunk";
	data.extend_from_slice(b"XXXX");
	data.extend_from_slice(&(junk.len() as u32).to_le_bytes());
	data.extend_from_slice(&junk);
	let new_declared = (data.len() - 8) as u32;
	put_u32(&mut data, 4, new_declared);

	let archive = Archive::from_bytes(&data).unwrap();
	assert_eq!(archive.chunks().len(), 6);
	let last = archive.chunks().last().unwrap();
	assert!(last.section.is_none());
	assert_eq!(last.tag, *b"XXXX");
	assert_eq!(archive.index().len(), 1);
}

#[test]
fn test_extract_crops_exact_pixels() {
	let data = one_sprite_archive();
	let archive = Archive::from_bytes(&data).unwrap();
	let outdir = tempfile::tempdir().unwrap();

	let summary = dump_sprites(&archive, outdir.path()).unwrap();
	assert_eq!(summary.atlases, 1);
	assert_eq!(summary.sprites, 1);

	let atlas_bytes = std::fs::read(outdir.path().join("00000.png")).unwrap();
	assert_eq!(atlas_bytes, png_gradient(10, 10));

	let source = image::load_from_memory(&atlas_bytes).unwrap().to_rgba8();
	let crop = image::open(outdir.path().join("00000").join("spr_box.png"))
		.unwrap()
		.to_rgba8();
	assert_eq!((crop.width(), crop.height()), (4, 4));
	for dy in 0..4 {
		for dx in 0..4 {
			assert_eq!(crop.get_pixel(dx, dy), source.get_pixel(2 + dx, 3 + dy));
		}
	}
}

#[test]
fn test_extract_skips_pages_without_records() {
	let data = build_archive(
		&[Rec::sprite("spr_box", 0, 0, 2, 2, 1)],
		&[png_gradient(6, 6), png_gradient(8, 8)],
		false,
	);
	let archive = Archive::from_bytes(&data).unwrap();
	let outdir = tempfile::tempdir().unwrap();

	let summary = dump_sprites(&archive, outdir.path()).unwrap();
	assert_eq!(summary.atlases, 1);
	assert!(!outdir.path().join("00000.png").exists());
	assert!(outdir.path().join("00001.png").exists());
}

#[test]
fn test_extract_rect_out_of_bounds() {
	let data = build_archive(
		&[Rec::sprite("spr_wide", 5, 5, 8, 8, 0)],
		&[png_gradient(10, 10)],
		false,
	);
	let archive = Archive::from_bytes(&data).unwrap();
	let outdir = tempfile::tempdir().unwrap();
	assert!(matches!(
		dump_sprites(&archive, outdir.path()),
		Err(GmError::RectOutOfBounds { page: 0, .. })
	));
}

#[test]
fn test_patch_roundtrip_reproduces_atlas_bytes() {
	let data = one_sprite_archive();
	let archive = Archive::from_bytes(&data).unwrap();
	let outdir = tempfile::tempdir().unwrap();
	dump_sprites(&archive, outdir.path()).unwrap();

	// Patch back the image that was just extracted.
	let replacements = Replacements::from_dir(outdir.path().join("00000")).unwrap();
	assert_eq!(replacements.len(), 1);
	let patches = build_patch_set(&archive, &replacements).unwrap();

	assert_eq!(patches.len(), 1);
	assert_eq!(patches[0].index, 0);
	assert_eq!((patches[0].width, patches[0].height), (10, 10));
	assert_eq!(patches[0].data, png_gradient(10, 10));
}

#[test]
fn test_patch_replaces_exactly_the_rectangle() {
	let data = one_sprite_archive();
	let archive = Archive::from_bytes(&data).unwrap();

	let dir = tempfile::tempdir().unwrap();
	std::fs::write(dir.path().join("spr_box.png"), png_solid(4, 4, [0, 0xFF, 0, 0xFF])).unwrap();

	let replacements = Replacements::from_dir(dir.path()).unwrap();
	let patches = build_patch_set(&archive, &replacements).unwrap();
	assert_eq!(patches.len(), 1);

	let patched = image::load_from_memory(&patches[0].data).unwrap().to_rgba8();
	let original = image::load_from_memory(&png_gradient(10, 10)).unwrap().to_rgba8();
	for y in 0..10 {
		for x in 0..10 {
			let inside = (2..6).contains(&x) && (3..7).contains(&y);
			if inside {
				assert_eq!(patched.get_pixel(x, y), &Rgba([0, 0xFF, 0, 0xFF]));
			} else {
				assert_eq!(patched.get_pixel(x, y), original.get_pixel(x, y));
			}
		}
	}
}

#[test]
fn test_patch_size_mismatch() {
	let data = one_sprite_archive();
	let archive = Archive::from_bytes(&data).unwrap();

	let dir = tempfile::tempdir().unwrap();
	std::fs::write(dir.path().join("spr_box.png"), png_solid(3, 4, [0, 0, 0, 0xFF])).unwrap();

	let replacements = Replacements::from_dir(dir.path()).unwrap();
	let err = build_patch_set(&archive, &replacements).unwrap_err();
	assert!(matches!(
		err,
		GmError::SizeMismatch {
			expected_width: 4,
			expected_height: 4,
			actual_width: 3,
			actual_height: 4,
			..
		}
	));
}

#[test]
fn test_patch_output_is_sparse() {
	let data = build_archive(
		&[
			Rec::sprite("spr_a", 0, 0, 2, 2, 0),
			Rec::sprite("spr_b", 0, 0, 2, 2, 1),
		],
		&[png_gradient(6, 6), png_gradient(6, 6)],
		false,
	);
	let archive = Archive::from_bytes(&data).unwrap();

	let dir = tempfile::tempdir().unwrap();
	std::fs::write(dir.path().join("spr_b.png"), png_solid(2, 2, [1, 2, 3, 0xFF])).unwrap();

	let replacements = Replacements::from_dir(dir.path()).unwrap();
	let patches = build_patch_set(&archive, &replacements).unwrap();
	assert_eq!(patches.len(), 1);
	assert_eq!(patches[0].index, 1);
}

#[test]
fn test_replacements_duplicate_stems() {
	let dir = tempfile::tempdir().unwrap();
	std::fs::create_dir(dir.path().join("a")).unwrap();
	std::fs::create_dir(dir.path().join("b")).unwrap();
	std::fs::write(dir.path().join("a").join("spr_box.png"), b"x").unwrap();
	std::fs::write(dir.path().join("b").join("spr_box.png"), b"y").unwrap();

	assert!(matches!(
		Replacements::from_dir(dir.path()),
		Err(GmError::DuplicateReplacement { .. })
	));
}

#[test]
fn test_replacement_stems_are_case_sensitive() {
	let dir = tempfile::tempdir().unwrap();
	std::fs::create_dir(dir.path().join("a")).unwrap();
	std::fs::create_dir(dir.path().join("b")).unwrap();
	std::fs::write(dir.path().join("a").join("spr_box.png"), b"x").unwrap();
	std::fs::write(dir.path().join("b").join("SPR_BOX.png"), b"y").unwrap();

	let replacements = Replacements::from_dir(dir.path()).unwrap();
	assert_eq!(replacements.len(), 2);
	assert!(replacements.get("spr_box").is_some());
	assert!(replacements.get("SPR_BOX").is_some());
	assert!(replacements.get("Spr_Box").is_none());
}

#[test]
fn test_write_patch_set_manifest() {
	let data = build_archive(
		&[
			Rec::sprite("spr_a", 0, 0, 2, 2, 0),
			Rec::sprite("spr_b", 0, 0, 2, 2, 1),
		],
		&[png_gradient(6, 6), png_gradient(7, 5)],
		false,
	);
	let archive = Archive::from_bytes(&data).unwrap();

	let dir = tempfile::tempdir().unwrap();
	std::fs::write(dir.path().join("spr_a.png"), png_solid(2, 2, [9, 9, 9, 0xFF])).unwrap();
	std::fs::write(dir.path().join("spr_b.png"), png_solid(2, 2, [7, 7, 7, 0xFF])).unwrap();

	let replacements = Replacements::from_dir(dir.path()).unwrap();
	let patches = build_patch_set(&archive, &replacements).unwrap();

	let build_dir = tempfile::tempdir().unwrap();
	let entries = write_patch_set(&patches, build_dir.path()).unwrap();

	assert_eq!(entries.len(), 2);
	assert_eq!(entries[0].index, 0);
	assert_eq!(entries[1].index, 1);
	assert_eq!((entries[1].width, entries[1].height), (7, 5));

	for (entry, patch) in entries.iter().zip(&patches) {
		let bytes = std::fs::read(build_dir.path().join(&entry.file)).unwrap();
		assert_eq!(bytes, patch.data);
		assert_eq!(entry.size, patch.data.len());
	}

	let manifest = std::fs::read_to_string(build_dir.path().join(emit::MANIFEST_NAME)).unwrap();
	let parsed: Vec<ManifestEntry> = serde_json::from_str(&manifest).unwrap();
	assert_eq!(parsed, entries);
}
