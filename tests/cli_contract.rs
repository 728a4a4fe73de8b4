use std::fs;
use std::path::Path;
use std::process::Command;

use image::{ImageFormat, Rgba, RgbaImage};
use metapixel::hat_file::{read_hat, write_hat};
use metapixel::persistence::{blank_grid, META_COLUMN};
use serde_json::Value;
use tempfile::tempdir;

fn write_blank_hat(path: &Path) {
    write_hat(path, &blank_grid()).expect("hat should write");
}

fn run_metapixel(cwd: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_metapixel"))
        .current_dir(cwd)
        .args(args)
        .output()
        .expect("metapixel command should run")
}

fn parse_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("json should parse")
}

#[test]
fn types_json_lists_the_whole_catalog_in_id_order() {
    let dir = tempdir().expect("tempdir should create");
    let output = run_metapixel(dir.path(), &["types", "--json"]);
    assert!(output.status.success(), "types --json should succeed");

    let parsed = parse_json(&output);
    let types = parsed["types"].as_array().expect("types should be array");
    assert_eq!(types.len(), 35);
    let ids = types
        .iter()
        .map(|kind| kind["id"].as_u64().expect("id should be number"))
        .collect::<Vec<_>>();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);
    assert_eq!(types[0]["name"], "HatOffset");
    assert_eq!(types[0]["value_type"], "Vec2");
    assert_eq!(types[0]["value_color"], "Tan1");
    assert_eq!(types[0]["category_color"], "Gold");

    let special = types
        .iter()
        .find(|kind| kind["id"] == 102)
        .expect("RandomizeParameter should be listed");
    assert_eq!(special["value_color"], "SlateBlue");
    assert_eq!(special["category_color"], "HotPink");
}

#[test]
fn types_text_shows_value_and_category_colors() {
    let dir = tempdir().expect("tempdir should create");
    let output = run_metapixel(dir.path(), &["types"]);
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    let wet_lips = text
        .lines()
        .find(|line| line.contains("WetLips"))
        .expect("WetLips should be listed");
    assert!(wet_lips.contains("Snow2"));
    assert!(wet_lips.contains("Wheat1"));
}

#[test]
fn describe_accepts_names_and_ids() {
    let dir = tempdir().expect("tempdir should create");
    let by_name = run_metapixel(dir.path(), &["describe", "particlecount"]);
    let by_id = run_metapixel(dir.path(), &["describe", "34"]);
    assert!(by_name.status.success());
    assert_eq!(by_name.stdout, by_id.stdout);
    let text = String::from_utf8_lossy(&by_name.stdout);
    assert!(text.contains("The number of particles to emit."));
    assert!(text.contains("max value of 8"));
}

#[test]
fn add_set_and_show_round_trip_through_the_hat() {
    let dir = tempdir().expect("tempdir should create");
    write_blank_hat(&dir.path().join("hat.png"));

    let add = run_metapixel(dir.path(), &["add", "hat.png", "CapeOffset", "--in-place"]);
    assert!(add.status.success(), "add should succeed");
    let set = run_metapixel(
        dir.path(),
        &["set", "hat.png", "CapeOffset", "--value", "12", "-8", "--in-place"],
    );
    assert!(
        set.status.success(),
        "set should succeed: {}",
        String::from_utf8_lossy(&set.stderr)
    );

    let grid = read_hat(&dir.path().join("hat.png")).expect("hat should reread");
    assert_eq!(*grid.get_pixel(META_COLUMN, 0), Rgba([10, 140, 120, 255]));

    let show = run_metapixel(dir.path(), &["show", "hat.png", "--json"]);
    assert!(show.status.success());
    let parsed = parse_json(&show);
    let rows = parsed["metapixels"].as_array().expect("metapixels should be array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "CapeOffset");
    assert_eq!(rows[0]["g"], 140);
    assert_eq!(rows[0]["b"], 120);
    assert_eq!(rows[0]["value"], serde_json::json!([12.0, -8.0]));
    assert_eq!(rows[0]["help"], "Cape offset position in pixels");
    assert!(rows[0]["value_help"]
        .as_str()
        .expect("value_help should be text")
        .contains("range of 16"));
}

#[test]
fn output_flag_leaves_the_input_untouched() {
    let dir = tempdir().expect("tempdir should create");
    write_blank_hat(&dir.path().join("hat.png"));

    let add = run_metapixel(
        dir.path(),
        &["add", "hat.png", "WetLips", "-o", "edited.png"],
    );
    assert!(add.status.success(), "add should succeed");

    let original = read_hat(&dir.path().join("hat.png")).expect("input should reread");
    assert_eq!(*original.get_pixel(META_COLUMN, 0), Rgba([0, 0, 0, 0]));
    let edited = read_hat(&dir.path().join("edited.png")).expect("output should read");
    assert_eq!(*edited.get_pixel(META_COLUMN, 0), Rgba([70, 0, 0, 255]));
}

#[test]
fn edits_require_a_destination() {
    let dir = tempdir().expect("tempdir should create");
    write_blank_hat(&dir.path().join("hat.png"));

    let output = run_metapixel(dir.path(), &["add", "hat.png", "WetLips"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--in-place"));
}

#[test]
fn json_errors_carry_stable_codes() {
    let dir = tempdir().expect("tempdir should create");
    write_blank_hat(&dir.path().join("hat.png"));

    let unknown = run_metapixel(
        dir.path(),
        &["add", "hat.png", "Jetpack", "--in-place", "--json"],
    );
    assert!(!unknown.status.success());
    let parsed = parse_json(&unknown);
    assert_eq!(parsed["ok"], false);
    assert_eq!(parsed["error"]["code"], "UNKNOWN_TYPE_NAME");

    let missing = run_metapixel(dir.path(), &["up", "hat.png", "WetLips", "--in-place", "--json"]);
    assert!(!missing.status.success());
    assert_eq!(parse_json(&missing)["error"]["code"], "TYPE_NOT_PRESENT");

    run_metapixel(dir.path(), &["add", "hat.png", "WetLips", "--in-place"]);
    let duplicate = run_metapixel(
        dir.path(),
        &["add", "hat.png", "70", "--in-place", "--json"],
    );
    assert!(!duplicate.status.success());
    let parsed = parse_json(&duplicate);
    assert_eq!(parsed["error"]["code"], "DUPLICATE_TYPE");
    assert_eq!(parsed["error"]["details"]["id"], 70);
}

#[test]
fn wrong_sized_images_are_rejected() {
    let dir = tempdir().expect("tempdir should create");
    RgbaImage::new(32, 32)
        .save_with_format(dir.path().join("small.png"), ImageFormat::Png)
        .expect("png should write");

    let output = run_metapixel(dir.path(), &["show", "small.png", "--json"]);
    assert!(!output.status.success());
    assert_eq!(parse_json(&output)["error"]["code"], "GRID_SHAPE");
}

#[test]
fn apply_then_export_reproduces_the_manifest() {
    let dir = tempdir().expect("tempdir should create");
    write_blank_hat(&dir.path().join("hat.png"));
    fs::write(
        dir.path().join("hat.yaml"),
        r#"
version: 1
metapixels:
  - type: ParticleEmitShape
    value: [1, 2]
  - type: ParticleCount
    value: [6]
  - type: ParticleAnchor
"#,
    )
    .expect("manifest should write");

    let apply = run_metapixel(dir.path(), &["apply", "hat.png", "hat.yaml", "--in-place"]);
    assert!(
        apply.status.success(),
        "apply should succeed: {}",
        String::from_utf8_lossy(&apply.stderr)
    );

    let grid = read_hat(&dir.path().join("hat.png")).expect("hat should reread");
    assert_eq!(*grid.get_pixel(META_COLUMN, 0), Rgba([32, 1, 2, 255]));
    assert_eq!(*grid.get_pixel(META_COLUMN, 1), Rgba([34, 6, 0, 255]));
    assert_eq!(*grid.get_pixel(META_COLUMN, 2), Rgba([44, 0, 0, 255]));

    let export = run_metapixel(dir.path(), &["export", "hat.png"]);
    assert!(export.status.success());
    let yaml = String::from_utf8_lossy(&export.stdout);
    let order = ["ParticleEmitShape", "ParticleCount", "ParticleAnchor"]
        .iter()
        .map(|name| yaml.find(name).expect("type should be exported"))
        .collect::<Vec<_>>();
    assert!(order.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn malformed_rows_are_reported_by_show() {
    let dir = tempdir().expect("tempdir should create");
    let mut grid = blank_grid();
    grid.put_pixel(META_COLUMN, 0, Rgba([2, 0, 0, 255]));
    grid.put_pixel(META_COLUMN, 1, Rgba([9, 0, 0, 255]));
    write_hat(&dir.path().join("hat.png"), &grid).expect("hat should write");

    let output = run_metapixel(dir.path(), &["show", "hat.png", "--json"]);
    assert!(output.status.success());
    let parsed = parse_json(&output);
    assert_eq!(parsed["metapixels"].as_array().map(Vec::len), Some(1));
    assert_eq!(parsed["cleared_rows"][0]["code"], "UNKNOWN_TYPE_ID");
}

#[test]
fn clear_trailing_blanks_rows_left_by_removal() {
    let dir = tempdir().expect("tempdir should create");
    write_blank_hat(&dir.path().join("hat.png"));
    for name in ["HatOffset", "CapeOffset"] {
        let add = run_metapixel(dir.path(), &["add", "hat.png", name, "--in-place"]);
        assert!(add.status.success(), "add should succeed");
    }

    let keep = run_metapixel(
        dir.path(),
        &["remove", "hat.png", "CapeOffset", "-o", "kept.png"],
    );
    assert!(keep.status.success());
    let kept = read_hat(&dir.path().join("kept.png")).expect("hat should read");
    assert_eq!(kept.get_pixel(META_COLUMN, 1)[0], 10);

    let clear = run_metapixel(
        dir.path(),
        &["remove", "hat.png", "CapeOffset", "-o", "cleared.png", "--clear-trailing"],
    );
    assert!(clear.status.success());
    let cleared = read_hat(&dir.path().join("cleared.png")).expect("hat should read");
    assert_eq!(*cleared.get_pixel(META_COLUMN, 1), Rgba([0, 0, 0, 0]));
    assert_eq!(cleared.get_pixel(META_COLUMN, 0)[0], 1);
}

#[test]
fn show_json_output_is_stable() {
    let dir = tempdir().expect("tempdir should create");
    write_blank_hat(&dir.path().join("hat.png"));
    let set_up = run_metapixel(dir.path(), &["add", "hat.png", "ParticleVelocity", "--in-place"]);
    assert!(set_up.status.success());

    let first = run_metapixel(dir.path(), &["show", "hat.png", "--json"]);
    let second = run_metapixel(dir.path(), &["show", "hat.png", "--json"]);
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout, "json output should be stable");
}

#[test]
fn version_reports_the_package_version() {
    let dir = tempdir().expect("tempdir should create");
    let output = run_metapixel(dir.path(), &["--version"]);
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.starts_with("metapixel "));
    assert!(text.contains(env!("CARGO_PKG_VERSION")));
}
