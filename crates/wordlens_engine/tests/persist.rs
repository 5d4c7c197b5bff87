use std::fs;
use std::path::Path;

use tempfile::TempDir;
use wordlens_engine::{ensure_dir, AtomicFileWriter, PersistError};

#[test]
fn creates_missing_destination_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("dicts");
    assert!(!new_dir.exists());
    ensure_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing_dictionary() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("custom_dict.txt", "狗\n".as_bytes()).unwrap();
    assert_eq!(first.file_name().unwrap(), "custom_dict.txt");
    assert_eq!(fs::read_to_string(&first).unwrap(), "狗\n");

    let second = writer.write("custom_dict.txt", "猫\n".as_bytes()).unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "猫\n");
}

#[test]
fn destination_is_split_into_dir_and_name() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("out").join("dict.txt");
    let (writer, name) = AtomicFileWriter::for_destination(&dest).unwrap();
    assert_eq!(name, "dict.txt");
    assert_eq!(writer.write(&name, b"x").unwrap(), dest);

    let (_, name) = AtomicFileWriter::for_destination(Path::new("bare.txt")).unwrap();
    assert_eq!(name, "bare.txt");

    assert!(matches!(
        AtomicFileWriter::for_destination(Path::new("/")),
        Err(PersistError::NoFileName(_))
    ));
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("dict.txt", b"data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("dict.txt").exists());
}
