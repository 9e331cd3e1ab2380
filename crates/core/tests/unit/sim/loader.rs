//! # Loader Tests
//!
//! Flat binary images read back intact; missing files surface the I/O
//! error.

use std::io::Write;

use tempfile::NamedTempFile;
use vtsim_core::sim::loader;

#[test]
fn test_load_binary_round_trips_bytes() {
    let mut file = NamedTempFile::new().unwrap();
    let image: Vec<u8> = (0u8..64).collect();
    file.write_all(&image).unwrap();
    file.flush().unwrap();

    let loaded = loader::load_binary(file.path()).unwrap();

    assert_eq!(loaded, image);
}

#[test]
fn test_load_binary_missing_file_errors() {
    let result = loader::load_binary("/nonexistent/image.bin");

    assert!(result.is_err());
}
