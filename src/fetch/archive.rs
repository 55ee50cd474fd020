//! Zip archive reading.
//!
//! Entries are listed from the central directory; a body is decompressed only
//! when [`EntryBody::read`] is called, and never past the caller's byte limit.

use std::cell::RefCell;
use std::fmt;
use std::io::{Cursor, Read};
use std::rc::Rc;
use zip::ZipArchive;

use crate::domain::ArchiveEntry;

type SharedArchive = Rc<RefCell<ZipArchive<Cursor<Vec<u8>>>>>;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("not a readable zip archive: {0}")]
    Open(#[source] zip::result::ZipError),

    #[error("failed to open entry: {0}")]
    Entry(#[source] zip::result::ZipError),

    #[error("failed to read entry: {0}")]
    Read(#[source] std::io::Error),

    #[error("entry exceeds the {limit}-byte limit")]
    TooLarge { limit: u64 },
}

/// Body of an archive entry, read on demand.
pub enum EntryBody {
    /// Bytes already in memory, or the error hit while listing the entry
    Loaded(Result<Vec<u8>, ArchiveError>),

    /// Still compressed inside the archive at `index`
    Zipped { archive: SharedArchive, index: usize },
}

impl EntryBody {
    /// Read the whole body, failing with [`ArchiveError::TooLarge`] rather
    /// than reading more than `limit` bytes.
    pub fn read(self, limit: u64) -> Result<Vec<u8>, ArchiveError> {
        match self {
            EntryBody::Loaded(bytes) => {
                let bytes = bytes?;
                if bytes.len() as u64 > limit {
                    return Err(ArchiveError::TooLarge { limit });
                }
                Ok(bytes)
            }
            EntryBody::Zipped { archive, index } => read_zipped(&archive, index, limit),
        }
    }
}

impl fmt::Debug for EntryBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryBody::Loaded(bytes) => f.debug_tuple("Loaded").field(bytes).finish(),
            EntryBody::Zipped { index, .. } => {
                f.debug_struct("Zipped").field("index", index).finish_non_exhaustive()
            }
        }
    }
}

fn read_zipped(archive: &SharedArchive, index: usize, limit: u64) -> Result<Vec<u8>, ArchiveError> {
    let mut archive = archive.borrow_mut();
    let file = archive.by_index(index).map_err(ArchiveError::Entry)?;

    // Header sizes are untrusted: reject early, then bound the actual read too.
    if file.size() > limit {
        return Err(ArchiveError::TooLarge { limit });
    }
    let mut buf = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut buf).map_err(ArchiveError::Read)?;
    if buf.len() as u64 > limit {
        return Err(ArchiveError::TooLarge { limit });
    }
    Ok(buf)
}

/// Entries of a zip archive in central-directory order.
pub struct ZipEntries {
    archive: SharedArchive,
    next: usize,
    len: usize,
}

impl ZipEntries {
    fn entry_at(&self, index: usize) -> ArchiveEntry {
        let mut archive = self.archive.borrow_mut();
        let name = archive
            .name_for_index(index)
            .map(str::to_string)
            .unwrap_or_else(|| format!("<entry {index}>"));

        match archive.by_index_raw(index).map(|file| file.is_dir()) {
            Ok(true) => ArchiveEntry::directory(name),
            Ok(false) => ArchiveEntry {
                path: name,
                body: EntryBody::Zipped { archive: Rc::clone(&self.archive), index },
                is_directory: false,
            },
            Err(err) => ArchiveEntry {
                is_directory: name.ends_with('/'),
                path: name,
                body: EntryBody::Loaded(Err(ArchiveError::Entry(err))),
            },
        }
    }
}

impl Iterator for ZipEntries {
    type Item = ArchiveEntry;

    fn next(&mut self) -> Option<ArchiveEntry> {
        if self.next >= self.len {
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some(self.entry_at(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ZipEntries {}

/// Open `bytes` as a zip archive and list its entries.
///
/// Only a failure to open the archive itself is an error; an entry that cannot
/// be read reports that when its body is read.
pub fn read_zip_entries(bytes: Vec<u8>) -> Result<ZipEntries, ArchiveError> {
    let archive = ZipArchive::new(Cursor::new(bytes)).map_err(ArchiveError::Open)?;
    let len = archive.len();
    Ok(ZipEntries { archive: Rc::new(RefCell::new(archive)), next: 0, len })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    const LIMIT: u64 = 1024 * 1024;

    fn build_zip() -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        writer.add_directory("repo-main/", options).expect("dir");
        writer.add_directory("repo-main/src/", options).expect("dir");
        writer.start_file("repo-main/src/app.py", options).expect("file");
        writer.write_all(b"print('hi')\n").expect("write");
        writer.start_file("repo-main/README.md", options).expect("file");
        writer.write_all(b"# readme\n").expect("write");
        writer.finish().expect("finish").into_inner()
    }

    fn u16_at(bytes: &[u8], at: usize) -> usize {
        u16::from_le_bytes([bytes[at], bytes[at + 1]]) as usize
    }

    /// Rewrite the central-directory uncompressed size of the first entry so
    /// it claims about 2^62 bytes.
    fn inflate_declared_size(bytes: &mut [u8]) {
        let header = bytes
            .windows(4)
            .position(|w| w == [0x50, 0x4b, 0x01, 0x02])
            .expect("central directory header");
        let size_field = header + 24;
        if bytes[size_field..size_field + 4] != [0xff; 4] {
            bytes[size_field..size_field + 4].copy_from_slice(&0xffff_fff0u32.to_le_bytes());
            return;
        }

        // Sizes live in the zip64 extra field; uncompressed size comes first.
        let name_len = u16_at(bytes, header + 28);
        let extra_len = u16_at(bytes, header + 30);
        let mut at = header + 46 + name_len;
        let end = at + extra_len;
        while at + 4 <= end {
            let id = u16_at(bytes, at);
            let len = u16_at(bytes, at + 2);
            if id == 0x0001 {
                bytes[at + 4..at + 12].copy_from_slice(&(1u64 << 62).to_le_bytes());
                return;
            }
            at += 4 + len;
        }
        panic!("no zip64 extra field in central directory");
    }

    #[test]
    fn reads_entries_in_archive_order() {
        let entries: Vec<ArchiveEntry> = read_zip_entries(build_zip()).expect("readable").collect();
        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["repo-main/", "repo-main/src/", "repo-main/src/app.py", "repo-main/README.md"]
        );
        assert!(entries[0].is_directory);
        assert!(!entries[2].is_directory);

        let body = entries.into_iter().nth(2).expect("app.py").body;
        assert_eq!(body.read(LIMIT).expect("bytes"), b"print('hi')\n");
    }

    #[test]
    fn entries_report_exact_length() {
        let entries = read_zip_entries(build_zip()).expect("readable");
        assert_eq!(entries.len(), 4);
    }

    #[test]
    fn bodies_are_read_on_demand_in_any_order() {
        let mut entries = read_zip_entries(build_zip()).expect("readable").skip(2);
        let app = entries.next().expect("app.py");
        let readme = entries.next().expect("README.md");
        assert_eq!(readme.body.read(LIMIT).expect("readme"), b"# readme\n");
        assert_eq!(app.body.read(LIMIT).expect("app"), b"print('hi')\n");
    }

    #[test]
    fn body_over_limit_is_rejected() {
        let app = read_zip_entries(build_zip()).expect("readable").nth(2).expect("app.py");
        let err = app.body.read(4).expect_err("over limit");
        assert!(matches!(err, ArchiveError::TooLarge { limit: 4 }));
    }

    #[test]
    fn forged_entry_size_does_not_allocate() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .large_file(true);
        writer.start_file("repo-main/big.bin", options).expect("file");
        writer.write_all(b"tiny").expect("write");
        let mut bytes = writer.finish().expect("finish").into_inner();
        inflate_declared_size(&mut bytes);

        let entry = read_zip_entries(bytes).expect("readable").next().expect("one entry");
        assert!(!entry.is_directory);
        let err = entry.body.read(LIMIT).expect_err("declared size over limit");
        assert!(matches!(err, ArchiveError::TooLarge { .. }), "unexpected error {err}");
    }

    #[test]
    fn garbage_bytes_are_not_an_archive() {
        let err = read_zip_entries(b"definitely not a zip".to_vec()).err().expect("invalid");
        assert!(matches!(err, ArchiveError::Open(_)));
    }
}
