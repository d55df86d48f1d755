//! Filesystem helpers for opening import inputs, built on `cap-std` and
//! `camino`.
#![forbid(unsafe_code)]

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8};
use std::io;

/// Open a UTF-8 file path for reading using ambient authority.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Open the parent directory of `path` and return it with the file name.
pub fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other("path should include a file name"))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Return whether a path names a regular file.
///
/// Missing files surface as [`io::ErrorKind::NotFound`] so callers can tell
/// them apart from directories.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.metadata(name.as_str()).map(|meta| meta.is_file())
}

/// Whether the final extension of `path` equals `extension`, ignoring case.
///
/// # Examples
/// ```
/// use camino::Utf8Path;
/// use waymark_fs::has_extension;
///
/// assert!(has_extension(Utf8Path::new("berlin.osm.BZ2"), "bz2"));
/// assert!(!has_extension(Utf8Path::new("berlin.osm"), "bz2"));
/// ```
#[must_use]
pub fn has_extension(path: &Utf8Path, extension: &str) -> bool {
    path.extension()
        .is_some_and(|found| found.eq_ignore_ascii_case(extension))
}
