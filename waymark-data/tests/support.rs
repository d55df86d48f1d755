use bzip2::{Compression, write::BzEncoder};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::{Builder, TempPath};

/// Directory containing the XML fixtures.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Read a fixture document as text.
pub fn read_fixture(dir: &Path, stem: &str) -> String {
    let path = dir.join(format!("{stem}.osm"));
    fs::read_to_string(&path).unwrap_or_else(|err| {
        panic!("failed to read fixture {path:?}: {err}");
    })
}

/// How a staged fixture is written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Plain,
    Bzip2,
    /// Two bzip2 streams back to back, as produced by parallel compressors.
    Bzip2Multistream,
}

fn bzip2(stem: &str, contents: &[u8]) -> Vec<u8> {
    let mut encoder = BzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(contents).unwrap_or_else(|err| {
        panic!("failed to compress fixture {stem}: {err}");
    });
    encoder.finish().unwrap_or_else(|err| {
        panic!("failed to finish compressing fixture {stem}: {err}");
    })
}

/// Copy a fixture into a temporary file using the requested encoding.
pub fn stage_fixture(dir: &Path, stem: &str, encoding: Encoding) -> TempPath {
    let contents = read_fixture(dir, stem).into_bytes();
    let bytes = match encoding {
        Encoding::Plain => contents,
        Encoding::Bzip2 => bzip2(stem, &contents),
        Encoding::Bzip2Multistream => {
            let (head, tail) = contents.split_at(contents.len() / 2);
            let mut bytes = bzip2(stem, head);
            bytes.extend(bzip2(stem, tail));
            bytes
        }
    };
    let suffix = if encoding == Encoding::Plain {
        ".osm"
    } else {
        ".osm.bz2"
    };
    let mut tempfile = Builder::new()
        .prefix(stem)
        .suffix(suffix)
        .tempfile()
        .unwrap_or_else(|err| {
            panic!("failed to create temporary fixture for {stem}: {err}");
        });
    tempfile.write_all(&bytes).unwrap_or_else(|err| {
        panic!("failed to write fixture for {stem}: {err}");
    });
    tempfile.flush().unwrap_or_else(|err| {
        panic!("failed to flush fixture for {stem}: {err}");
    });
    tempfile.into_temp_path()
}
