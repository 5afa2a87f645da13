//! Small helpers shared by the file store and config loading.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{PulseError, Result};

/// Maximum size of a single stored value or config file (4 MB).
///
/// Browser local storage caps a whole origin at about 5 MB, so anything
/// larger than this was not written by us.
pub const MAX_VALUE_SIZE: u64 = 4 * 1024 * 1024;

/// Read a file into a string, refusing files larger than `max_size` bytes.
pub fn read_to_string_with_limit(path: &Path, max_size: u64) -> Result<String> {
    let size = fs::metadata(path)
        .map_err(|e| PulseError::storage(path, e))?
        .len();

    if size > max_size {
        return Err(PulseError::storage(
            path,
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("file is too large ({} bytes, max {} bytes)", size, max_size),
            ),
        ));
    }

    fs::read_to_string(path).map_err(|e| PulseError::storage(path, e))
}

/// Read a file into a string with the default [`MAX_VALUE_SIZE`] limit.
pub fn read_to_string_limited(path: &Path) -> Result<String> {
    read_to_string_with_limit(path, MAX_VALUE_SIZE)
}
