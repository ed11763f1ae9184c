//! Filesystem utilities

use std::path::Path;

use log::trace;

/// Check if a path exists
pub fn path_exists<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    let exists = path.exists();
    trace!("path {} exists: {}", path.display(), exists);
    exists
}

/// Check if a path is a directory
pub fn is_directory<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().is_dir()
}
