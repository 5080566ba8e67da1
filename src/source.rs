//! Loading of Java source units from files, directories and source archives.

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::archive::read_java_entries;
use crate::error::SourceError;
use crate::scan::{is_source_archive, scan_java_files};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceUnit {
    /// File path, or `archive!/entry` for archive members.
    pub origin: String,
    #[serde(skip)]
    pub text: String,
    pub content_hash: String,
}

impl SourceUnit {
    pub fn new(origin: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let content_hash = hash_content(&text);
        Self {
            origin: origin.into(),
            text,
            content_hash,
        }
    }
}

pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Loads every input path in argument order. Directories are expanded to
/// their `.java` files; archives to their `.java` entries. Units whose
/// content was already seen are dropped.
pub fn load_sources(paths: &[PathBuf]) -> Result<Vec<SourceUnit>> {
    let mut units = Vec::new();
    for path in paths {
        let loaded = load_path(path).with_context(|| format!("failed to load {}", path.display()))?;
        units.extend(loaded);
    }

    let total = units.len();
    let units = dedup_units(units);
    info!(
        units = units.len(),
        duplicates = total - units.len(),
        "loaded source units"
    );
    Ok(units)
}

fn load_path(path: &Path) -> Result<Vec<SourceUnit>> {
    if path.is_dir() {
        let files = scan_java_files(path)?;
        debug!(dir = %path.display(), files = files.len(), "scanned directory");
        return files
            .par_iter()
            .map(|file| read_file(file).map_err(anyhow::Error::from))
            .collect();
    }

    if is_source_archive(path) {
        let archive = path.display().to_string();
        return Ok(read_java_entries(path)?
            .into_iter()
            .map(|entry| SourceUnit::new(format!("{archive}!/{}", entry.name), entry.text))
            .collect());
    }

    Ok(vec![read_file(path)?])
}

fn read_file(path: &Path) -> Result<SourceUnit, SourceError> {
    let bytes = std::fs::read(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let origin = path.display().to_string();
    let text = decode_source(&origin, bytes);
    Ok(SourceUnit::new(origin, text))
}

/// UTF-8 text of a source unit. Other encodings (legacy Latin-1 trees) are
/// decoded lossily rather than failing the whole load.
pub fn decode_source(origin: &str, bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!(origin, "source is not valid UTF-8, decoding lossily");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    }
}

fn dedup_units(units: Vec<SourceUnit>) -> Vec<SourceUnit> {
    let mut seen = HashSet::new();
    units
        .into_iter()
        .filter(|unit| {
            let fresh = seen.insert(unit.content_hash.clone());
            if !fresh {
                debug!(origin = %unit.origin, "skipping duplicate source unit");
            }
            fresh
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use zip::write::FileOptions;

    #[test]
    fn hash_is_stable_sha256_hex() {
        let h = hash_content("class A {}");
        assert_eq!(h.len(), 64);
        assert_eq!(h, hash_content("class A {}"));
        assert_ne!(h, hash_content("class B {}"));
    }

    #[test]
    fn loads_files_directories_and_archives_in_argument_order() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let single = dir.path().join("Single.java");
        fs::write(&single, "class Single {}")?;

        let tree = dir.path().join("tree");
        fs::create_dir_all(tree.join("pkg"))?;
        fs::write(tree.join("pkg/One.java"), "class One {}")?;
        fs::write(tree.join("pkg/Two.java"), "class Two {}")?;

        let archive = dir.path().join("bundle.zip");
        {
            let mut zip = zip::ZipWriter::new(fs::File::create(&archive)?);
            zip.start_file("x/Three.java", FileOptions::default())?;
            zip.write_all(b"class Three {}")?;
            zip.finish()?;
        }

        let units = load_sources(&[single, tree, archive.clone()])?;
        let texts: Vec<_> = units.iter().map(|u| u.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["class Single {}", "class One {}", "class Two {}", "class Three {}"]
        );
        assert_eq!(
            units[3].origin,
            format!("{}!/x/Three.java", archive.display())
        );
        Ok(())
    }

    #[test]
    fn identical_content_is_loaded_once() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let a = dir.path().join("A.java");
        let copy = dir.path().join("Copy.java");
        fs::write(&a, "class A {}")?;
        fs::write(&copy, "class A {}")?;

        let units = load_sources(&[a.clone(), copy])?;
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].origin, a.display().to_string());
        Ok(())
    }

    #[test]
    fn non_utf8_file_does_not_abort_directory_load() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("Good.java"), "class Good {}")?;
        fs::write(dir.path().join("Legacy.java"), b"class Legacy { String s = \"caf\xe9\"; }")?;

        let units = load_sources(&[dir.path().to_path_buf()])?;
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].text, "class Good {}");
        assert!(units[1].text.contains("caf\u{fffd}"));
        Ok(())
    }

    #[test]
    fn missing_path_reports_context() {
        let err = load_sources(&[PathBuf::from("/definitely/not/here/X.java")]).unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("failed to load /definitely/not/here/X.java"));
        assert!(chain.contains("failed to read"));
    }
}
