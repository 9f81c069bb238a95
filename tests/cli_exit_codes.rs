//! Exit statuses of the `photo-similar` binary.

use assert_fs::prelude::*;
use image::{DynamicImage, ImageBuffer, Rgb};
use predicates::prelude::*;
use std::process::Command;

fn photo_similar() -> Command {
    Command::new(env!("CARGO_BIN_EXE_photo-similar"))
}

fn write_png(child: &assert_fs::fixture::ChildPath, vertical: bool) {
    child.touch().unwrap();
    let image = DynamicImage::ImageRgb8(ImageBuffer::from_fn(64, 64, |x, y| {
        let v = if (if vertical { x } else { y }) < 32 { 255u8 } else { 0 };
        Rgb([v, v, v])
    }));
    image.save(child.path()).unwrap();
}

#[test]
fn search_match_exits_zero_and_no_match_exits_one() {
    let temp = assert_fs::TempDir::new().unwrap();
    let query = temp.child("query.png");
    write_png(&query, true);
    write_png(&temp.child("library/copy.png"), true);
    write_png(&temp.child("other/unrelated.png"), false);

    let found = photo_similar()
        .args(["search", "--no-cache", "--format", "minimal"])
        .arg(query.path())
        .arg(temp.child("library").path())
        .output()
        .unwrap();
    assert_eq!(found.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&found.stdout).contains("copy.png"));

    let missing = photo_similar()
        .args(["search", "--no-cache"])
        .arg(query.path())
        .arg(temp.child("other").path())
        .output()
        .unwrap();
    assert_eq!(missing.status.code(), Some(1));
}

#[test]
fn out_of_range_threshold_exits_two() {
    let temp = assert_fs::TempDir::new().unwrap();
    let status = photo_similar()
        .args(["dedup", "--no-cache", "--threshold", "150"])
        .arg(temp.path())
        .current_dir(temp.path())
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(2));
    temp.child("results.csv").assert(predicate::path::missing());
}

#[test]
fn dedup_writes_the_csv_report() {
    let temp = assert_fs::TempDir::new().unwrap();
    write_png(&temp.child("photos/a/1.png"), false);
    write_png(&temp.child("photos/b/1.png"), false);
    let output = temp.child("out.csv");

    let status = photo_similar()
        .args(["dedup", "--no-cache", "--format", "json", "--output"])
        .arg(output.path())
        .arg(temp.child("photos").path())
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(0));
    output.assert(predicate::str::contains("filePath1,filePath2,similarity"));
    output.assert(predicate::str::contains("100%"));
}

#[test]
fn unsupported_hash_size_leaves_existing_report_alone() {
    let temp = assert_fs::TempDir::new().unwrap();
    write_png(&temp.child("photos/a/1.png"), false);
    let output = temp.child("results.csv");
    output.write_str("previous report\n").unwrap();

    let status = photo_similar()
        .args(["dedup", "--no-cache", "--hash-size", "1", "--output"])
        .arg(output.path())
        .arg(temp.child("photos").path())
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(2));
    output.assert("previous report\n");
}
