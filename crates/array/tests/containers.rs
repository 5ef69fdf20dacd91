//! Integration tests for reading and writing npz containers

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use gridkit_array::{
    read, read_rank, read_shape, write, Array, ContainerRead, ContainerWrite, Error, NpzFile,
    SliceDirectives,
};
use ndarray::{ArrayD, IxDyn};
use ndarray_npy::WriteNpyExt;
use rstest::{fixture, rstest};
use tempfile::TempDir;
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

/// Scratch directory removed when the test ends
#[fixture]
fn scratch() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Values 0..24 as a 2x3x4 array
#[fixture]
fn cube() -> Array {
    Array::from_vec(vec![2, 3, 4], (0..24).map(|v| v as f64).collect()).unwrap()
}

fn npz_path(dir: &TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

/// Write a single precision member the way numpy would
fn write_f32_member(path: &Path, name: &str, dims: &[usize], data: Vec<f32>) {
    let array = ArrayD::from_shape_vec(IxDyn(dims), data).unwrap();
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    zip.start_file(format!("{name}.npy"), FileOptions::default())
        .unwrap();
    array.write_npy(&mut zip).unwrap();
    zip.finish().unwrap();
}

#[rstest]
fn round_trip(scratch: TempDir, cube: Array) {
    let path = npz_path(&scratch, "cube.npz");
    write(&cube, &path, "cube", false).unwrap();

    let array = read(&path, Some("cube"), &SliceDirectives::new()).unwrap();
    assert_eq!(array.dims(), cube.dims());
    assert_eq!(array.data(), cube.data());
}

#[rstest]
fn no_slice_keeps_shape(scratch: TempDir) {
    let path = npz_path(&scratch, "vector.npz");
    let vector = Array::from_vec(vec![4], vec![0.0, 1.0, 2.0, 3.0]).unwrap();
    write(&vector, &path, "v", false).unwrap();

    let array = read(&path, None, &SliceDirectives::new()).unwrap();
    assert_eq!(array.dims(), &[4]);
    assert_eq!(array.data(), &[0.0, 1.0, 2.0, 3.0]);
    assert_eq!(array.range().unwrap(), (0.0, 3.0));
}

#[rstest]
#[case(SliceDirectives::new().x(1), vec![3, 4], 12.0)] // case 1
#[case(SliceDirectives::new().y(1), vec![2, 4], 4.0)] // case 2
#[case(SliceDirectives::new().z(3), vec![2, 3], 3.0)] // case 3
#[case(SliceDirectives::new().last(3), vec![2, 3], 3.0)] // case 4
#[case(SliceDirectives::new().y(0).centered(true), vec![2, 4], 4.0)] // case 5
#[case(SliceDirectives::new().x(0).y(2), vec![4], 8.0)] // case 6
#[case(SliceDirectives::new().x(1).y(2).z(3), vec![1], 23.0)] // case 7
fn sliced_reads(
    scratch: TempDir,
    cube: Array,
    #[case] directives: SliceDirectives,
    #[case] dims: Vec<usize>,
    #[case] first: f64,
) {
    let path = npz_path(&scratch, "cube.npz");
    write(&cube, &path, "cube", false).unwrap();

    let array = read(&path, None, &directives).unwrap();
    assert_eq!(array.dims(), dims.as_slice());
    assert_eq!(array.data()[0], first);
}

#[rstest]
fn middle_cross_section(scratch: TempDir, cube: Array) {
    let path = npz_path(&scratch, "cube.npz");
    write(&cube, &path, "cube", false).unwrap();

    let array = read(&path, None, &SliceDirectives::new().y(1)).unwrap();
    for i in 0..2 {
        for k in 0..4 {
            assert_eq!(array.get(&[i, k]), cube.get(&[i, 1, k]));
        }
    }
}

#[rstest]
#[case(SliceDirectives::new().x(-1))] // case 1
#[case(SliceDirectives::new().x(2))] // case 2
#[case(SliceDirectives::new().last(4))] // case 3
fn slice_bounds_rejected(scratch: TempDir, cube: Array, #[case] directives: SliceDirectives) {
    let path = npz_path(&scratch, "cube.npz");
    write(&cube, &path, "cube", false).unwrap();

    let result = read(&path, None, &directives);
    assert!(matches!(result, Err(Error::InvalidSlice { .. })));
}

#[rstest]
fn shape_without_data(scratch: TempDir, cube: Array) {
    let path = npz_path(&scratch, "cube.npz");
    write(&cube, &path, "cube", false).unwrap();

    assert_eq!(read_shape(&path, None).unwrap(), vec![2, 3, 4]);
    assert_eq!(read_rank(&path, Some("cube")).unwrap(), 3);
}

#[rstest]
fn append_and_replace(scratch: TempDir, cube: Array) {
    let path = npz_path(&scratch, "many.npz");
    write(&cube, &path, "first", false).unwrap();

    let vector = Array::from_vec(vec![2], vec![7.0, 8.0]).unwrap();
    write(&vector, &path, "second", true).unwrap();

    let mut file = NpzFile::open(&path).unwrap();
    assert_eq!(file.dataset_names().unwrap(), vec!["first", "second"]);
    drop(file);

    // replacing keeps the other dataset
    let scalar = Array::from_vec(vec![1], vec![1.0]).unwrap();
    write(&scalar, &path, "first", true).unwrap();

    let mut file = NpzFile::open(&path).unwrap();
    assert_eq!(file.dataset_names().unwrap(), vec!["second", "first"]);
    assert_eq!(file.shape("first").unwrap(), vec![1]);
    assert_eq!(file.shape("second").unwrap(), vec![2]);
}

#[rstest]
fn overwrite_without_append(scratch: TempDir, cube: Array) {
    let path = npz_path(&scratch, "single.npz");
    write(&cube, &path, "first", false).unwrap();
    write(&cube, &path, "second", false).unwrap();

    let mut file = NpzFile::open(&path).unwrap();
    assert_eq!(file.dataset_names().unwrap(), vec!["second"]);
}

#[rstest]
fn delete_dataset(scratch: TempDir, cube: Array) {
    let path = npz_path(&scratch, "many.npz");
    write(&cube, &path, "first", false).unwrap();
    write(&cube, &path, "second", true).unwrap();

    let mut file = NpzFile::create(&path, true).unwrap();
    assert!(file.delete_dataset("first").unwrap());
    assert!(!file.delete_dataset("missing").unwrap());
    file.flush().unwrap();
    drop(file);

    let mut file = NpzFile::open(&path).unwrap();
    assert_eq!(file.dataset_names().unwrap(), vec!["second"]);
}

#[rstest]
fn single_precision_members(scratch: TempDir) {
    let path = npz_path(&scratch, "single.npz");
    write_f32_member(&path, "f", &[2, 2], vec![0.5, 1.5, 2.5, 3.5]);

    let array = read(&path, Some("f"), &SliceDirectives::new().x(1)).unwrap();
    assert_eq!(array.dims(), &[2]);
    assert_eq!(array.data(), &[2.5, 3.5]);
}

#[rstest]
fn open_failures(scratch: TempDir, cube: Array) {
    let missing = npz_path(&scratch, "missing.npz");
    let result = read(&missing, None, &SliceDirectives::new());
    assert!(matches!(result, Err(Error::OpenFailed(_))));

    let not_zip = npz_path(&scratch, "text.npz");
    std::fs::write(&not_zip, "not an archive").unwrap();
    let result = read(&not_zip, None, &SliceDirectives::new());
    assert!(matches!(result, Err(Error::OpenFailed(_))));

    let path = npz_path(&scratch, "cube.npz");
    write(&cube, &path, "cube", false).unwrap();
    let result = read(&path, Some("other"), &SliceDirectives::new());
    assert!(matches!(result, Err(Error::DatasetOpenFailed(_))));
}

#[rstest]
fn other_members_are_not_datasets(scratch: TempDir) {
    let path = npz_path(&scratch, "mixed.npz");
    let array = ArrayD::from_shape_vec(IxDyn(&[3]), vec![1.0_f64, 2.0, 3.0]).unwrap();

    // a text file stored ahead of the only dataset
    let mut zip = ZipWriter::new(File::create(&path).unwrap());
    zip.start_file("README.txt", FileOptions::default()).unwrap();
    zip.write_all(b"not an array").unwrap();
    zip.start_file("data.npy", FileOptions::default()).unwrap();
    array.write_npy(&mut zip).unwrap();
    zip.finish().unwrap();

    let mut file = NpzFile::open(&path).unwrap();
    assert_eq!(file.dataset_names().unwrap(), vec!["data".to_string()]);

    let read_back = read(&path, None, &SliceDirectives::new()).unwrap();
    assert_eq!(read_back.data(), &[1.0, 2.0, 3.0]);

    // appending keeps the text member untouched
    let extra = Array::from_vec(vec![1], vec![7.0]).unwrap();
    write(&extra, &path, "extra", true).unwrap();
    let mut archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
    let mut text = String::new();
    archive
        .by_name("README.txt")
        .unwrap()
        .read_to_string(&mut text)
        .unwrap();
    assert_eq!(text, "not an array");
}

#[rstest]
fn empty_archive(scratch: TempDir) {
    let path = npz_path(&scratch, "empty.npz");
    NpzFile::create(&path, false).unwrap().flush().unwrap();

    let result = read(&path, None, &SliceDirectives::new());
    assert!(matches!(result, Err(Error::DatasetNotFound)));
}

#[test]
fn error_messages_are_fixed() {
    assert_eq!(
        Error::OpenFailed(PathBuf::from("a.npz")).to_string(),
        "error opening array container"
    );
    assert_eq!(
        Error::InvalidSlice { axis: 3, index: 9 }.to_string(),
        "invalid slice of array data"
    );
    assert_eq!(Error::EmptyArray.to_string(), "no elements in array");
}
