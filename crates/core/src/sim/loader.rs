//! Flat-binary image loading.
//!
//! Programs are flat binary images placed at a caller-chosen physical
//! address; there is no object-format parsing in the simulator.

use std::fs;
use std::io;
use std::path::Path;

/// Reads a flat binary image from disk.
///
/// # Arguments
///
/// * `path` - Path to the image file.
///
/// # Returns
///
/// The image bytes, or the I/O error that prevented reading them.
pub fn load_binary<P: AsRef<Path>>(path: P) -> io::Result<Vec<u8>> {
    let data = fs::read(path)?;
    if data.is_empty() {
        log::warn!("loaded an empty binary image");
    }
    Ok(data)
}
