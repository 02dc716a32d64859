use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_clasplot"))
}

fn run(args: &[&str]) -> Output {
    Command::new(bin_path())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to run {:?} {:?}: {}", bin_path(), args, e))
}

fn assert_success(out: &Output, what: &str) {
    assert!(out.status.success(), "{what} should succeed, stderr={}", String::from_utf8_lossy(&out.stderr));
}

fn dir_arg(dir: &Path) -> String {
    dir.to_string_lossy().into_owned()
}

#[test]
fn version_prints_package_version() {
    let out = run(&["version"]);
    assert_success(&out, "version");
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("clasplot "), "stdout={stdout}");
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn smoke_writes_root_file_and_svg() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(&["smoke", "--root", "--seed", "7", "--format", "svg", "--output-dir", &dir_arg(dir.path())]);
    assert_success(&out, "smoke --root");

    let svg = std::fs::read_to_string(dir.path().join("test.svg")).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(dir.path().join("test.root").exists());

    let root = dir.path().join("test.root");
    let out = run(&["keys", "-i", &dir_arg(&root)]);
    assert_success(&out, "keys");
    let keys: serde_json::Value = serde_json::from_slice(&out.stdout).expect("stdout should be valid JSON");
    let keys = keys.as_array().expect("keys should be an array");
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0]["name"], "hist");
    assert_eq!(keys[0]["class"], "TH1F");
}

#[test]
fn smoke_with_seed_is_reproducible() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    for dir in [&a, &b] {
        let out = run(&["smoke", "--seed", "42", "--format", "svg", "--output-dir", &dir_arg(dir.path())]);
        assert_success(&out, "smoke");
    }
    let svg_a = std::fs::read_to_string(a.path().join("test.svg")).unwrap();
    let svg_b = std::fs::read_to_string(b.path().join("test.svg")).unwrap();
    assert_eq!(svg_a, svg_b);
}

#[test]
fn smoke_default_output_is_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(&["smoke", "--seed", "1", "--output-dir", &dir_arg(dir.path())]);
    assert_success(&out, "smoke");
    let bytes = std::fs::read(dir.path().join("test.pdf")).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn bins_prints_quantile_edges() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("q2.csv");
    let values: Vec<String> = (1..=101).map(|v| format!("{}.0,", v)).collect();
    std::fs::write(&input, values.join(" ")).unwrap();

    let out = run(&[
        "bins",
        "-i",
        &dir_arg(&input),
        "--plot",
        "q2_bins",
        "--format",
        "svg",
        "--output-dir",
        &dir_arg(dir.path()),
    ]);
    assert_success(&out, "bins");

    let v: serde_json::Value = serde_json::from_slice(&out.stdout).expect("stdout should be valid JSON");
    assert_eq!(v["n_values"], 101);
    let edges = v["edges"].as_array().expect("edges should be array");
    assert_eq!(edges.len(), 11);
    assert_eq!(edges[0].as_f64(), Some(1.0));
    assert_eq!(edges[5].as_f64(), Some(51.0));
    assert_eq!(edges[10].as_f64(), Some(101.0));
    assert!(dir.path().join("q2_bins.svg").exists());
}

#[test]
fn bins_rejects_non_numeric_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.txt");
    std::fs::write(&input, "1.0 2.0 three").unwrap();
    let out = run(&["bins", "-i", &dir_arg(&input), "--output-dir", &dir_arg(dir.path())]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("three"));
}

#[test]
fn missing_input_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.root");
    let out = run(&["monitor", "-i", &dir_arg(&missing), "--output-dir", &dir_arg(dir.path())]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("nope.root"));
}

#[test]
fn unknown_format_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(&["smoke", "--format", "png", "--output-dir", &dir_arg(dir.path())]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("png"));
}
