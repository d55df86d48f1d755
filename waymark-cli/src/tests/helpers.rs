//! Test helpers for staging OSM documents on disk.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

pub(super) const SMALL_DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6" generator="fixture">
  <bounds minlat="51.0" minlon="-0.5" maxlat="52.0" maxlon="0.5"/>
  <node id="1" version="1" lat="51.5" lon="-0.1"/>
  <way id="2" version="1">
    <nd ref="1"/>
    <nd ref="3"/>
    <tag k="highway" v="footway"/>
  </way>
  <relation id="4" version="1">
    <member type="way" ref="2" role="outer"/>
  </relation>
</osm>
"#;

pub(super) const DANGLING_DOCUMENT: &str = r#"<osm version="0.6">
  <way id="-2"><nd ref="-3"/></way>
</osm>
"#;

/// Temporary directory with UTF-8 paths.
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.root.join(name);
        write_utf8(&path, contents.as_bytes());
        path
    }
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path.as_std_path(), contents)
        .unwrap_or_else(|err| panic!("failed to write {path}: {err}"));
}
