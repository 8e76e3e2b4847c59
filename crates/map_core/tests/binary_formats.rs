//! Binary terrain layouts against hand-built payloads.

use map_core::codec::BlockWriter;
use map_core::prelude::*;
use map_test_utils::determinism::strategies::arb_terrain_layout;
use map_test_utils::proptest::prelude::*;
use std::io::Write;

#[test]
fn sparse_records_set_and_blank_cells() {
    let mut map = MapGrid::standard();
    let other = map.size().cell_from_xy(9, 2);
    map.set_template(other, TemplateId(0), 3);

    let payload = [5u8, 5, 3, 7, 9, 2, 1, 0xFF];
    map.read_binary(BinaryLayout::from_tags(0, 1), &payload[..]).unwrap();

    let first = map.size().cell_from_xy(5, 5);
    assert_eq!(map.cell(first).unwrap().template(), TemplateId(3));
    assert_eq!(map.cell(first).unwrap().icon(), 7);
    assert_eq!(map.cell(other).unwrap().template(), TemplateId::NONE);
    assert_eq!(map.cell(other).unwrap().icon(), 0);

    let untouched = map
        .cells()
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != first)
        .all(|(_, cell)| cell.template() == TemplateId::NONE && cell.icon() == 0);
    assert!(untouched);
    assert_eq!(map.cell(first).unwrap().land(), LandType::Beach);
}

#[test]
fn sparse_template_none_byte_blanks() {
    let mut map = MapGrid::with_size(GridSize::LEGACY);
    map.read_binary(BinaryLayout::LegacySparse, &[1u8, 1, 0xFF, 4][..]).unwrap();
    let cell = map.size().cell_from_xy(1, 1);
    assert_eq!(map.cell(cell).unwrap().template(), TemplateId::NONE);
    assert_eq!(map.cell(cell).unwrap().icon(), 0);
}

#[test]
fn sparse_records_off_grid_are_skipped() {
    let mut map = MapGrid::with_size(GridSize::LEGACY);
    map.read_binary(BinaryLayout::LegacySparse, &[100u8, 1, 0, 0, 2, 2, 0, 1][..])
        .unwrap();
    assert_eq!(
        map.cell(map.size().cell_from_xy(2, 2)).unwrap().template(),
        TemplateId(0)
    );
}

#[test]
fn packed_layout_is_templates_then_icons() {
    let mut map = MapGrid::with_size(GridSize::new(8, 8).unwrap());
    map.set_template(1, TemplateId(0x0102), 9);

    let mut bytes = Vec::new();
    map.write_binary(&mut bytes).unwrap();

    let mut reader = map_core::codec::BlockReader::new(bytes.as_slice());
    let raw = reader.read_payload(64 * 3).unwrap();
    assert_eq!(&raw[0..2], &[0xFF, 0xFF]);
    assert_eq!(&raw[2..4], &[0x02, 0x01]);
    assert_eq!(raw[128], 0);
    assert_eq!(raw[129], 9);
}

#[test]
fn interleaved_v2_reads_like_v1() {
    let mut raw = Vec::new();
    for cell in 0..64u16 {
        raw.extend_from_slice(&(cell % 2).to_le_bytes());
        raw.push((cell % 4) as u8);
    }
    let mut writer = BlockWriter::new(Vec::new());
    writer.write_all(&raw).unwrap();
    let (bytes, _) = writer.finish().unwrap();

    let size = GridSize::new(8, 8).unwrap();
    let mut v1 = MapGrid::with_size(size);
    let mut v2 = MapGrid::with_size(size);
    v1.read_binary(BinaryLayout::PackedInterleavedV1, bytes.as_slice()).unwrap();
    v2.read_binary(BinaryLayout::PackedInterleavedV2, bytes.as_slice()).unwrap();
    assert_eq!(v1.state_hash(), v2.state_hash());
    assert_eq!(v1.cell(3).unwrap().template(), TemplateId(1));
    assert_eq!(v1.cell(3).unwrap().icon(), 3);
}

#[test]
fn corrupt_block_is_reported() {
    let mut map = MapGrid::with_size(GridSize::new(8, 8).unwrap());
    // Header claims 3 compressed bytes expanding to 192, payload is a bad relative copy.
    let bytes = [3u8, 0, 192, 0, 0x00, 0x10, 0x80];
    let err = map.read_binary(BinaryLayout::Packed, &bytes[..]);
    assert!(matches!(err, Err(MapError::CorruptBlock(_))));
}

proptest! {
    #[test]
    fn packed_round_trip(layout in arb_terrain_layout()) {
        let size = GridSize::new(16, 16).unwrap();
        let mut map = MapGrid::with_size(size);
        for (cell, (template, icon)) in layout.iter().enumerate() {
            map.set_template(cell, *template, *icon);
        }

        let mut bytes = Vec::new();
        map.write_binary(&mut bytes).unwrap();
        let mut copy = MapGrid::with_size(size);
        copy.read_binary(BinaryLayout::Packed, bytes.as_slice()).unwrap();

        for (a, b) in map.cells().iter().zip(copy.cells()) {
            prop_assert_eq!(a.template(), b.template());
            prop_assert_eq!(a.icon(), b.icon());
        }
    }
}
