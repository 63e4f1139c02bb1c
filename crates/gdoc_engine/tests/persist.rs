use std::fs;

use gdoc_engine::{ensure_repository_dir, AtomicFileWriter};
use tempfile::TempDir;

#[test]
fn creates_missing_repository_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("repo");
    assert!(!new_dir.exists());
    ensure_repository_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn rejects_file_as_repository_dir() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();
    assert!(ensure_repository_dir(&file_path).is_err());
}

#[test]
fn atomic_write_replaces_existing() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("object.json", b"hello").unwrap();
    assert_eq!(first.file_name().unwrap(), "object.json");
    assert_eq!(fs::read(&first).unwrap(), b"hello");

    let second = writer.write("object.json", b"world").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read(&second).unwrap(), b"world");
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("object.json", b"data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("object.json").exists());
}
