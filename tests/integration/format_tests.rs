//! OIF container reader tests.
//!
//! Tests verify:
//! - Axis and shape discovery from plane file names
//! - Raw sample access for 8- and 16-bit planes
//! - Ancillary and unrecognized companion files are skipped
//! - Broken containers are rejected with specific errors

use std::fs;

use image::{GrayImage, Luma, Rgb, RgbImage};

use oif_extract::error::OifError;
use oif_extract::format::companion_dir;
use oif_extract::{Axis, OifReader, VolumeReader};

use super::test_utils::OifBuilder;

#[test]
fn test_axes_and_shape() {
    let dir = tempfile::tempdir().unwrap();
    let oif = OifBuilder::new("embryo", 2, 3).size(5, 4).build(dir.path());

    let reader = OifReader::open(&oif).unwrap();
    assert_eq!(reader.path(), oif.as_path());
    assert_eq!(reader.axis_order(), "XYCZT");
    assert_eq!(reader.axes().to_string(), "CZYX");
    assert_eq!(reader.shape(), &[2, 3, 4, 5]);
    assert_eq!(reader.plane_count(), 6);
    assert_eq!(reader.axis_len(Axis::Channel), Some(2));
    assert_eq!(reader.axis_len(Axis::Z), Some(3));
    assert_eq!(reader.axis_len(Axis::Time), None);
}

#[test]
fn test_metadata_is_typed() {
    let dir = tempfile::tempdir().unwrap();
    let oif = OifBuilder::new("embryo", 1, 1).build(dir.path());

    let reader = OifReader::open(&oif).unwrap();
    let metadata = reader.metadata();
    assert_eq!(
        metadata
            .get("Reference Image Parameter", "ValidBitCounts")
            .and_then(|v| v.as_i64()),
        Some(12)
    );
    assert_eq!(
        metadata
            .get("Reference Image Parameter", "HeightUnit")
            .and_then(|v| v.as_str()),
        Some("um")
    );
    assert!(metadata.has_section("Axis 3 Parameters Common"));
}

#[test]
fn test_read_plane_returns_raw_samples() {
    let dir = tempfile::tempdir().unwrap();
    let oif = OifBuilder::new("embryo", 2, 3).build(dir.path());

    let reader = OifReader::open(&oif).unwrap();
    let plane = reader.read_plane(&[1, 2]).unwrap();
    assert_eq!(plane.dimensions(), (4, 3));
    assert_eq!(plane.get_pixel(0, 0)[0], 1200);
    assert_eq!(plane.get_pixel(3, 2)[0], 1205);
}

#[test]
fn test_read_plane_out_of_bounds() {
    let dir = tempfile::tempdir().unwrap();
    let oif = OifBuilder::new("embryo", 2, 3).build(dir.path());

    let reader = OifReader::open(&oif).unwrap();
    assert!(matches!(
        reader.read_plane(&[2, 0]),
        Err(OifError::PlaneOutOfBounds { .. })
    ));
    assert!(matches!(
        reader.read_plane(&[0]),
        Err(OifError::PlaneOutOfBounds { .. })
    ));
}

#[test]
fn test_eight_bit_planes_are_not_stretched() {
    let dir = tempfile::tempdir().unwrap();
    let oif = OifBuilder::new("embryo", 1, 1).bits(8).build(dir.path());

    let plane_path = companion_dir(&oif).join("s_C001Z001.tif");
    GrayImage::from_pixel(4, 3, Luma([200u8]))
        .save(&plane_path)
        .unwrap();

    let reader = OifReader::open(&oif).unwrap();
    let plane = reader.read_plane(&[0, 0]).unwrap();
    assert_eq!(plane.get_pixel(2, 1)[0], 200);
}

#[test]
fn test_color_planes_are_converted() {
    let dir = tempfile::tempdir().unwrap();
    let oif = OifBuilder::new("embryo", 1, 1).build(dir.path());

    let plane_path = companion_dir(&oif).join("s_C001Z001.tif");
    RgbImage::from_pixel(4, 3, Rgb([0u8, 0, 0]))
        .save(&plane_path)
        .unwrap();

    let reader = OifReader::open(&oif).unwrap();
    let plane = reader.read_plane(&[0, 0]).unwrap();
    assert_eq!(plane.get_pixel(0, 0)[0], 0);
}

#[test]
fn test_unrecognized_files_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let oif = OifBuilder::new("embryo", 1, 2)
        .extra_file("thumbnail.jpg")
        .extra_file("s_notes.tif")
        .build(dir.path());

    let reader = OifReader::open(&oif).unwrap();
    assert_eq!(reader.plane_count(), 2);
}

#[test]
fn test_missing_plane_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let oif = OifBuilder::new("embryo", 2, 2).build(dir.path());
    fs::remove_file(companion_dir(&oif).join("s_C002Z001.tif")).unwrap();

    assert!(matches!(
        OifReader::open(&oif),
        Err(OifError::InconsistentLayout(_))
    ));
}

#[test]
fn test_plane_size_mismatch_is_rejected_on_read() {
    let dir = tempfile::tempdir().unwrap();
    let oif = OifBuilder::new("embryo", 1, 2).build(dir.path());

    let plane_path = companion_dir(&oif).join("s_C001Z002.tif");
    GrayImage::new(2, 2).save(&plane_path).unwrap();

    let reader = OifReader::open(&oif).unwrap();
    assert!(reader.read_plane(&[0, 0]).is_ok());
    assert!(matches!(
        reader.read_plane(&[0, 1]),
        Err(OifError::InconsistentLayout(_))
    ));
}

#[test]
fn test_missing_companion_directory() {
    let dir = tempfile::tempdir().unwrap();
    let oif = OifBuilder::new("embryo", 1, 1).build(dir.path());
    fs::remove_dir_all(companion_dir(&oif)).unwrap();

    assert!(matches!(
        OifReader::open(&oif),
        Err(OifError::MissingCompanion(_))
    ));
}

#[test]
fn test_missing_main_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        OifReader::open(dir.path().join("absent.oif")),
        Err(OifError::Io { .. })
    ));
}
