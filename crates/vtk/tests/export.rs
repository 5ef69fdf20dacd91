//! Integration tests for writing structured points files

use gridkit_array::{read, write, Array, SliceDirectives, ValueRange};
use gridkit_vtk::{array_to_vtk, write_vtk, ArrayToVtk, Quantizer, StoreBytes, VtkFormat};
use rstest::{fixture, rstest};
use tempfile::TempDir;

#[fixture]
fn scratch() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Values 0..24 as a 2x3x4 array
#[fixture]
fn cube() -> Array {
    Array::from_vec(vec![2, 3, 4], (0..24).map(|v| v as f64).collect()).unwrap()
}

#[rstest]
fn ascii_file_layout(scratch: TempDir, cube: Array) {
    let path = scratch.path().join("cube.vtk");
    let converter = ArrayToVtk::builder().store(StoreBytes::Ascii).build();
    let vtk = converter.convert("cube values", &cube).unwrap();
    write_vtk(vtk, &path, VtkFormat::LegacyAscii).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("STRUCTURED_POINTS"));
    assert!(text.contains("DIMENSIONS 2 3 4"));
    assert!(text.contains("POINT_DATA 24"));
    assert!(text.contains("cube-values"));
}

#[rstest]
#[case(StoreBytes::One)] // case 1
#[case(StoreBytes::Two)] // case 2
#[case(StoreBytes::Four)] // case 3
fn binary_files_written(scratch: TempDir, cube: Array, #[case] store: StoreBytes) {
    let path = scratch.path().join("cube.vtk");
    let converter = ArrayToVtk::builder().store(store).build();
    let vtk = converter.convert("cube", &cube).unwrap();
    write_vtk(vtk, &path, VtkFormat::LegacyBinary).unwrap();

    // header plus at least one value per point at the stored width
    let size = std::fs::metadata(&path).unwrap().len() as usize;
    assert!(size > 24 * store.count());
}

#[rstest]
fn two_byte_levels_are_big_endian(scratch: TempDir, cube: Array) {
    let path = scratch.path().join("cube.vtk");
    let converter = ArrayToVtk::builder().store(StoreBytes::Two).build();
    let vtk = converter.convert("cube", &cube).unwrap();
    write_vtk(vtk, &path, VtkFormat::LegacyBinary).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let marker = b"LOOKUP_TABLE default\n";
    let start = bytes
        .windows(marker.len())
        .position(|w| w == marker)
        .unwrap()
        + marker.len();
    let data = &bytes[start..start + 24 * 2];

    // x runs fastest, so the second point is cube[1, 0, 0] = 12
    assert_eq!(&data[..4], &[0x00, 0x00, 0x85, 0x90]);
    // cube[0, 2, 3] = 11 then the maximum cube[1, 2, 3] = 23
    assert_eq!(&data[44..], &[0x7a, 0x6f, 0xff, 0xff]);
}

#[rstest]
fn from_container(scratch: TempDir, cube: Array) {
    let npz = scratch.path().join("fields.npz");
    write(&cube, &npz, "density", false).unwrap();

    // a z plane of the stored cube
    let plane = read(&npz, Some("density"), &SliceDirectives::new().z(1)).unwrap();
    assert_eq!(plane.dims(), &[2, 3]);

    let path = scratch.path().join("plane.vtk");
    array_to_vtk(&plane, "density", &path).unwrap();
    assert!(path.exists());
}

#[test]
fn quantization_scenario() {
    let range = ValueRange::new(-3.0, 9.0);
    let quantizer = Quantizer::new(range, StoreBytes::One);
    assert_eq!(quantizer.quantize(-3.0), vec![0]);
    assert_eq!(quantizer.quantize(9.0), vec![255]);

    let inverted = Quantizer::new(ValueRange { invert: true, ..range }, StoreBytes::One);
    assert_eq!(inverted.quantize(-3.0), vec![255]);
}

#[rstest]
fn shared_window_for_combined_arrays(cube: Array) {
    let mut doubled = cube.clone();
    doubled.data_mut().iter_mut().for_each(|v| *v *= 2.0);

    let converter = ArrayToVtk::new();
    let range = converter
        .resolve_range(&[("a", &cube), ("b", &doubled)])
        .unwrap();
    assert_eq!((range.min, range.max), (0.0, 46.0));
}
