//! Integration tests: write histogram files with `RootFileBuilder` and read
//! them back through `RootFile`.

use approx::assert_relative_eq;
use cp_core::{Axis, Histogram, Histogram1D, Histogram2D};
use cp_root::{Compression, Precision, RootError, RootFile, RootFileBuilder};

fn h1(name: &str, n: usize) -> Histogram1D {
    let axis = Axis::uniform(n, -5.0, 5.0).unwrap();
    let contents = (0..n).map(|i| (i % 7) as f64 + 0.5).collect();
    let mut h = Histogram1D::from_contents(name, "#Delta P_{e}", axis, contents).unwrap();
    h.underflow = 2.0;
    h.overflow = 3.0;
    h.entries = 1234.0;
    h
}

fn h2(name: &str) -> Histogram2D {
    let mut h = Histogram2D::new(
        name,
        "#theta_{e} vs #Delta P_{e}",
        Axis::uniform(4, 6.0, 12.0).unwrap(),
        Axis::uniform(3, -0.8, 0.8).unwrap(),
    );
    for ix in 1..=4 {
        for iy in 1..=3 {
            h.set_bin_content(ix, iy, (10 * ix + iy) as f64).unwrap();
        }
    }
    h.entries = 42.0;
    h
}

fn open(builder: &RootFileBuilder) -> RootFile {
    RootFile::from_bytes(builder.to_bytes().expect("serialize"), "memory.root").expect("parse")
}

#[test]
fn th1_round_trip_double() {
    let original = h1("histos_w_1", 50);
    let mut builder = RootFileBuilder::new();
    builder.add_h1(&original, Precision::Double);
    let f = open(&builder);

    let keys = f.list_keys().unwrap();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].name, "histos_w_1");
    assert_eq!(keys[0].class_name, "TH1D");

    let h = f.get_histogram("histos_w_1").unwrap();
    let h = h.as_h1().expect("1-D");
    assert_eq!(h.title, "#Delta P_{e}");
    assert_eq!(h.n_bins(), 50);
    assert_eq!(h.contents, original.contents);
    assert_eq!(h.underflow, 2.0);
    assert_eq!(h.overflow, 3.0);
    assert_eq!(h.entries, 1234.0);
    assert_relative_eq!(h.axis.x_min(), -5.0);
    assert_relative_eq!(h.axis.x_max(), 5.0);
    assert!(h.sumw2.is_none());
}

#[test]
fn th1_round_trip_float_with_sumw2() {
    let original = h1("h", 10).with_sumw2(vec![0.25; 10]).unwrap();
    let mut builder = RootFileBuilder::new();
    builder.add_h1(&original, Precision::Float);
    let f = open(&builder);

    assert_eq!(f.list_keys().unwrap()[0].class_name, "TH1F");
    let h = f.get_histogram("h").unwrap();
    let h = h.as_h1().unwrap();
    assert_eq!(h.contents, original.contents);
    assert_eq!(h.sumw2.as_deref(), Some(&[0.25; 10][..]));
    assert_relative_eq!(h.bin_error(3), 0.5);
}

#[test]
fn th1_variable_axis() {
    let axis = Axis::variable(vec![0.0, 0.5, 2.0, 10.0]).unwrap();
    let original = Histogram1D::from_contents("q2", "", axis, vec![1.0, 2.0, 3.0]).unwrap();
    let mut builder = RootFileBuilder::new();
    builder.add_h1(&original, Precision::Double);
    let f = open(&builder);

    let h = f.get_histogram("q2").unwrap();
    let h = h.as_h1().unwrap();
    assert!(!h.axis.is_uniform());
    assert_eq!(h.axis.edges(), vec![0.0, 0.5, 2.0, 10.0]);
    assert_eq!(h.contents, vec![1.0, 2.0, 3.0]);
}

#[test]
fn th2_round_trip() {
    for precision in [Precision::Float, Precision::Double] {
        let original = h2("histos_theta_electron_delta_p_electron_1");
        let mut builder = RootFileBuilder::new();
        builder.add_h2(&original, precision);
        let f = open(&builder);

        let h = f.get_histogram("histos_theta_electron_delta_p_electron_1").unwrap();
        let h = h.as_h2().expect("2-D");
        assert_eq!(h.x_axis.n_bins(), 4);
        assert_eq!(h.y_axis.n_bins(), 3);
        assert_eq!(h.bin_content(1, 1), 11.0);
        assert_eq!(h.bin_content(4, 3), 43.0);
        assert_eq!(h.bin_content(2, 3), 23.0);
        assert_eq!(h.contents, original.contents);
        assert_eq!(h.entries, 42.0);
        assert_relative_eq!(h.y_axis.x_min(), -0.8);
    }
}

#[test]
fn compressed_payloads_round_trip() {
    let big = h1("big", 2000);
    let mut builder = RootFileBuilder::new();
    builder
        .compression(Compression::Zlib)
        .add_h1(&big, Precision::Double)
        .add_h2(&h2("map"), Precision::Float);
    let compressed = builder.to_bytes().unwrap();

    let mut raw_builder = RootFileBuilder::new();
    raw_builder.add_h1(&big, Precision::Double).add_h2(&h2("map"), Precision::Float);
    let raw = raw_builder.to_bytes().unwrap();
    assert!(compressed.len() < raw.len());

    let f = RootFile::from_bytes(compressed, "z.root").unwrap();
    let map = f.histograms().unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map.get_h1("big").unwrap().contents, big.contents);
    assert_eq!(map.get_h2("map").unwrap().bin_content(3, 2), 32.0);
}

#[test]
fn histograms_in_subdirectory() {
    let mut builder = RootFileBuilder::new();
    builder
        .add(&Histogram::from(h1("top", 5)), Precision::Double)
        .add_in_dir("sector_1", &Histogram::from(h1("w", 5)), Precision::Double)
        .add_in_dir("sector_1", &Histogram::from(h2("w_q2")), Precision::Double);
    let f = open(&builder);

    let keys = f.list_keys().unwrap();
    let names: Vec<&str> = keys.iter().map(|k| k.name.as_str()).collect();
    assert_eq!(names, vec!["top", "sector_1"]);
    assert_eq!(keys[1].class_name, "TDirectoryFile");

    let w = f.get_histogram("sector_1/w").unwrap();
    assert_eq!(w.dimension(), 1);
    let w_q2 = f.get_histogram("sector_1/w_q2").unwrap();
    assert_eq!(w_q2.shape(), "4x3");

    // Only top-level histograms end up in the mapping.
    let map = f.histograms().unwrap();
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["top"]);
}

#[test]
fn missing_key_and_non_directory_path() {
    let mut builder = RootFileBuilder::new();
    builder.add_h1(&h1("a", 3), Precision::Double);
    let f = open(&builder);

    assert!(matches!(f.get_histogram("b"), Err(RootError::KeyNotFound(_))));
    assert!(matches!(f.get_histogram("nodir/a"), Err(RootError::KeyNotFound(_))));
    assert!(matches!(f.get_histogram("a/b"), Err(RootError::Deserialization(_))));
}

#[test]
fn write_and_open_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("histos.root");

    let mut builder = RootFileBuilder::new();
    builder.add_h1(&h1("histos_w_inclusive_3", 20), Precision::Float);
    builder.write(&path).unwrap();

    let map = cp_root::load_histograms(&path).unwrap();
    assert_eq!(map.len(), 1);
    let h = map.get_h1("histos_w_inclusive_3").unwrap();
    assert_eq!(h.n_bins(), 20);
    assert_eq!(h.entries, 1234.0);

    let f = RootFile::open(&path).unwrap();
    assert_eq!(f.path(), path.as_path());
}

#[test]
fn empty_file_has_no_keys() {
    let f = open(&RootFileBuilder::new());
    assert!(f.list_keys().unwrap().is_empty());
    assert!(f.histograms().unwrap().is_empty());
}
