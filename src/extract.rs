use log::{debug, info};
use std::fs;
use std::io::{ErrorKind, Read};
use std::path::Path;
use zip::ZipArchive;

use crate::error::FetchError;

/// Largest archive the unpacker accepts; 32-bit zip size fields top out here.
pub const MAX_ARCHIVE_SIZE: u64 = u32::MAX as u64;

/// Local file header, empty archive and spanned archive signatures.
const ZIP_SIGNATURES: [&[u8; 4]; 3] = [b"PK\x03\x04", b"PK\x05\x06", b"PK\x07\x08"];

/// Checks whether the file at `path` starts with a zip container signature.
/// Files shorter than a signature are not archives.
pub fn is_zip_file(path: &Path) -> Result<bool, FetchError> {
    let mut file = fs::File::open(path)?;
    let mut magic = [0u8; 4];
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(ZIP_SIGNATURES.iter().any(|sig| **sig == magic)),
        Err(err) if err.kind() == ErrorKind::UnexpectedEof => Ok(false),
        Err(err) => Err(err.into()),
    }
}

/// Unpacks the zip archive at `archive_path` into `destination`, preserving
/// the archive's internal directory structure.
///
/// The destination directory is created (with intermediate directories) only
/// after the payload has passed the signature and size checks, so a rejected
/// payload leaves the filesystem untouched. Entry names go through the zip
/// codec's mangling, which strips `..` components and drive prefixes.
pub fn unpack(archive_path: &Path, destination: &Path) -> Result<(), FetchError> {
    if !is_zip_file(archive_path)? {
        return Err(FetchError::NotAZip);
    }

    let size = fs::metadata(archive_path)?.len();
    if size > MAX_ARCHIVE_SIZE {
        return Err(FetchError::ArchiveTooLarge { size });
    }

    info!("Unpacking archive to {}", destination.display());
    fs::create_dir_all(destination)?;

    let file = fs::File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let outpath = destination.join(entry.mangled_name());

        if entry.is_dir() {
            fs::create_dir_all(&outpath)?;
        } else {
            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut outfile = fs::File::create(&outpath)?;
            std::io::copy(&mut entry, &mut outfile).map_err(FetchError::entry_read)?;
            debug!("Extracted {}", outpath.display());
        }
    }

    info!("Unpacked {} entries", archive.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use zip::write::FileOptions;

    fn write_test_zip(dir: &Path, entries: &[(&str, &[u8])]) -> PathBuf {
        let zip_path = dir.join("test.zip");
        let file = fs::File::create(&zip_path).unwrap();
        let mut zip = zip::ZipWriter::new(file);

        let options = FileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, data) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
        zip_path
    }

    #[test]
    fn unpacks_entries_with_directory_structure() {
        let dir = TempDir::new().unwrap();
        let zip_path = write_test_zip(dir.path(), &[("a.txt", b"hello"), ("dir/b.txt", b"world")]);
        let dest = dir.path().join("out");

        unpack(&zip_path, &dest).unwrap();

        assert_eq!(fs::read_to_string(dest.join("a.txt")).unwrap(), "hello");
        assert_eq!(fs::read_to_string(dest.join("dir/b.txt")).unwrap(), "world");
    }

    #[test]
    fn creates_missing_destination_directories() {
        let dir = TempDir::new().unwrap();
        let zip_path = write_test_zip(dir.path(), &[("a.txt", b"hi")]);
        let dest = dir.path().join("deeply/nested/out");

        unpack(&zip_path, &dest).unwrap();

        assert_eq!(fs::read_to_string(dest.join("a.txt")).unwrap(), "hi");
    }

    #[test]
    fn rejects_non_zip_payload_without_touching_destination() {
        let dir = TempDir::new().unwrap();
        let payload = dir.path().join("payload.bin");
        fs::write(&payload, b"plain text, definitely not an archive").unwrap();
        let dest = dir.path().join("out");

        let err = unpack(&payload, &dest).unwrap_err();

        assert!(matches!(err, FetchError::NotAZip));
        assert!(!dest.exists());
    }

    #[test]
    fn truncated_archive_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let zip_path = write_test_zip(
            dir.path(),
            &[("a.txt", b"hello"), ("dir/b.txt", b"world")],
        );

        // Cut the archive in half: the local header signature survives but
        // the central directory is gone.
        let bytes = fs::read(&zip_path).unwrap();
        fs::write(&zip_path, &bytes[..bytes.len() / 2]).unwrap();

        let err = unpack(&zip_path, &dir.path().join("out")).unwrap_err();
        assert!(matches!(err, FetchError::CorruptArchive(_)));
    }

    #[test]
    fn unpacking_twice_yields_the_same_files() {
        let dir = TempDir::new().unwrap();
        let zip_path = write_test_zip(dir.path(), &[("a.txt", b"hello"), ("dir/b.txt", b"world")]);
        let dest = dir.path().join("out");

        unpack(&zip_path, &dest).unwrap();
        unpack(&zip_path, &dest).unwrap();

        assert_eq!(fs::read_to_string(dest.join("a.txt")).unwrap(), "hello");
        assert_eq!(fs::read_to_string(dest.join("dir/b.txt")).unwrap(), "world");
    }

    #[test]
    fn recognizes_zip_signatures() {
        let dir = TempDir::new().unwrap();
        let zip_path = write_test_zip(dir.path(), &[("a.txt", b"hi")]);
        assert!(is_zip_file(&zip_path).unwrap());

        let text_path = dir.path().join("notes.txt");
        fs::write(&text_path, b"hello world").unwrap();
        assert!(!is_zip_file(&text_path).unwrap());

        let empty_path = dir.path().join("empty");
        fs::write(&empty_path, b"").unwrap();
        assert!(!is_zip_file(&empty_path).unwrap());
    }

    #[test]
    fn missing_archive_is_file_not_found() {
        let dir = TempDir::new().unwrap();
        let err = unpack(&dir.path().join("vanished.zip"), &dir.path().join("out")).unwrap_err();
        assert!(matches!(err, FetchError::FileNotFound(_)));
    }
}
