//! Integration tests for the text form and shared value ranges

use gridkit_array::{
    extract, global_range, read_text_file, write_text_file, Array, MemoryContainer,
    SliceDirectives, ValueRange,
};
use rstest::{fixture, rstest};

#[fixture]
fn frames() -> MemoryContainer {
    let mut container = MemoryContainer::new();
    for (i, name) in ["t0", "t1", "t2"].iter().enumerate() {
        let offset = i as f64;
        let data = (0..6).map(|v| v as f64 - offset * 2.0).collect();
        container.insert(*name, Array::from_vec(vec![2, 3], data).unwrap());
    }
    container
}

#[rstest]
#[case(",", false)] // case 1
#[case(" ", false)] // case 2
#[case("\t", true)] // case 3
fn text_file_round_trip(#[case] separator: &str, #[case] transpose: bool) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grid.txt");

    let original = Array::from_vec(vec![2, 3], vec![0.5, -1.0, 2.0, 1e-7, 3.25, 1e6]).unwrap();
    write_text_file(&original, &path, separator, transpose).unwrap();

    let mut array = read_text_file(&path, None).unwrap();
    if transpose {
        array.transpose().unwrap();
    }
    assert_eq!(array, original);
}

#[rstest]
fn two_pass_shared_range(mut frames: MemoryContainer) {
    let names = ["t0", "t1", "t2"];

    // first pass collects the range over every frame
    let (min, max) = global_range(names, |name| {
        extract(&mut frames, Some(name), &SliceDirectives::new())
    })
    .unwrap();
    assert_eq!((min, max), (-4.0, 5.0));

    // second pass renders every frame against the shared window
    let range = ValueRange::resolve((min, max), None, None, false, false);
    for name in names {
        let frame = extract(&mut frames, Some(name), &SliceDirectives::new().x(0)).unwrap();
        let first = range.normalize(frame.data()[0]);
        assert!((0.0..=1.0).contains(&first));
    }
}

#[rstest]
fn global_range_propagates_failure(mut frames: MemoryContainer) {
    let result = global_range(["t0", "missing"], |name| {
        extract(&mut frames, Some(name), &SliceDirectives::new())
    });
    assert!(result.is_err());
}
