use memmap2::Mmap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

use crate::error::SourceError;
use crate::scan::is_java_file;
use crate::source::decode_source;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub text: String,
}

/// Reads every `.java` entry of a source archive in archive order.
pub fn read_java_entries(archive_path: &Path) -> Result<Vec<ArchiveEntry>, SourceError> {
    let io_error = |source| SourceError::Io {
        path: archive_path.to_path_buf(),
        source,
    };
    let archive_error = |e: zip::result::ZipError| SourceError::Archive {
        path: archive_path.to_path_buf(),
        message: e.to_string(),
    };

    let file = File::open(archive_path).map_err(io_error)?;
    // SAFETY: The file is opened read-only and remains valid for the lifetime of the mmap.
    // The mmap is dropped before the file, ensuring memory safety.
    let mmap = unsafe { Mmap::map(&file) }.map_err(io_error)?;
    let mut archive = ZipArchive::new(Cursor::new(&mmap[..])).map_err(archive_error)?;

    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(archive_error)?;
        if entry.is_dir() || !is_java_file(Path::new(entry.name())) {
            continue;
        }
        let name = entry.name().to_string();

        // The header size is untrusted; let the buffer grow with the real data.
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).map_err(io_error)?;
        let text = decode_source(&format!("{}!/{name}", archive_path.display()), bytes);
        entries.push(ArchiveEntry { name, text });
    }

    debug!(archive = %archive_path.display(), entries = entries.len(), "read source archive");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) -> anyhow::Result<()> {
        let file = File::create(path)?;
        let mut zip = zip::ZipWriter::new(file);
        let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        for (name, content) in entries {
            zip.start_file(*name, options)?;
            zip.write_all(content)?;
        }

        zip.finish()?;
        Ok(())
    }

    #[test]
    fn reads_only_java_entries() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let archive = dir.path().join("demo-sources.jar");
        write_zip(
            &archive,
            &[
                ("org/example/A.java", b"class A {}"),
                ("org/example/A.class", b"\xca\xfe\xba\xbe"),
                ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0"),
                ("org/example/B.java", b"class B {}"),
            ],
        )?;

        let entries = read_java_entries(&archive)?;
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["org/example/A.java", "org/example/B.java"]);
        assert_eq!(entries[1].text, "class B {}");
        Ok(())
    }

    #[test]
    fn latin1_entry_is_decoded_lossily() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let archive = dir.path().join("legacy.zip");
        write_zip(&archive, &[("Legacy.java", b"class Legacy { char c = '\xe9'; }")])?;

        let entries = read_java_entries(&archive)?;
        assert_eq!(entries[0].text, "class Legacy { char c = '\u{fffd}'; }");
        Ok(())
    }

    #[test]
    fn empty_archive_has_no_entries() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let archive = dir.path().join("empty.zip");
        write_zip(&archive, &[])?;
        assert!(read_java_entries(&archive)?.is_empty());
        Ok(())
    }

    #[test]
    fn corrupt_archive_is_an_archive_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let archive = dir.path().join("broken.zip");
        std::fs::write(&archive, b"not a zip at all")?;

        let err = read_java_entries(&archive).unwrap_err();
        assert!(matches!(err, SourceError::Archive { .. }));
        Ok(())
    }
}
