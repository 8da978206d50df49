//! Sector-addressed level archive container.
//!
//! The archive is a sequence of 2048-byte sectors. Sector 0 holds the
//! directory: a file count followed by fixed-width entries naming each
//! file's byte offset and size. File data regions start sector-aligned and
//! follow directory order; the slack between a file's declared size and the
//! next sector boundary belongs to the file and is preserved on rewrite.

use std::io::Cursor;

use crate::error::Error;
use crate::reader::LittleEndianReader;

pub const SECTOR_SIZE: usize = 2048;
pub const DIR_ENTRY_LEN: usize = 20;
pub const NAME_LEN: usize = 12;
/// Directory entries that fit in sector 0 after the count word.
pub const MAX_FILES: usize = (SECTOR_SIZE - 4) / DIR_ENTRY_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// One directory entry. `range` spans the declared file bytes; `padded`
/// additionally covers the slack up to the next file's region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub range: ByteRange,
    pub padded: ByteRange,
}

#[derive(Debug, Clone)]
pub struct LvlArchive {
    bytes: Vec<u8>,
    entries: Vec<FileEntry>,
}

fn sector_round_up(n: usize) -> usize {
    n.div_ceil(SECTOR_SIZE) * SECTOR_SIZE
}

impl LvlArchive {
    pub fn parse(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < SECTOR_SIZE || bytes.len() % SECTOR_SIZE != 0 {
            return Err(Error::malformed(format!(
                "archive length {} is not a positive multiple of the sector size",
                bytes.len()
            )));
        }

        let mut r = LittleEndianReader::new(Cursor::new(bytes));
        let file_count = r.read_u32()? as usize;
        if file_count == 0 || file_count > MAX_FILES {
            return Err(Error::malformed(format!(
                "directory holds {file_count} files, expected 1..={MAX_FILES}"
            )));
        }

        let mut entries = Vec::with_capacity(file_count);
        let mut previous_end = SECTOR_SIZE;
        for i in 0..file_count {
            let name = r.read_fixed_string(NAME_LEN)?;
            let offset = r.read_u32()? as usize;
            let size = r.read_u32()? as usize;

            if name.is_empty() {
                return Err(Error::malformed(format!("directory entry {i} has no name")));
            }
            if offset % SECTOR_SIZE != 0 {
                return Err(Error::malformed(format!(
                    "file '{name}' offset {offset} is not sector-aligned"
                )));
            }
            if offset < previous_end {
                return Err(Error::malformed(format!(
                    "file '{name}' at {offset} overlaps the preceding region ending at {previous_end}"
                )));
            }
            let end = offset.checked_add(size).filter(|&e| e <= bytes.len()).ok_or_else(
                || Error::malformed(format!("file '{name}' extends past the archive end")),
            )?;

            previous_end = sector_round_up(end);
            entries.push(FileEntry {
                name,
                range: ByteRange { start: offset, end },
                padded: ByteRange {
                    start: offset,
                    end: 0, // fixed up below
                },
            });
        }

        // Each file's padded region runs to the next file's start, the
        // last one to the end of the archive.
        for i in 0..entries.len() {
            let padded_end = match entries.get(i + 1) {
                Some(next) => next.range.start,
                None => bytes.len(),
            };
            entries[i].padded.end = padded_end;
        }

        Ok(Self {
            bytes: bytes.to_vec(),
            entries,
        })
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn file_named(&self, name: &str) -> Option<&FileEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn file_bytes(&self, entry: &FileEntry) -> &[u8] {
        &self.bytes[entry.range.start..entry.range.end]
    }

    /// Re-emit the archive with one file replaced. Every other file's
    /// padded region, and the unused tail of sector 0, are copied verbatim;
    /// only the directory words that actually changed are rewritten.
    pub fn rewrite_file(&self, name: &str, new_bytes: &[u8]) -> Result<Vec<u8>, Error> {
        let target = self
            .entries
            .iter()
            .position(|e| e.name == name)
            .ok_or_else(|| Error::malformed(format!("archive has no file named '{name}'")))?;

        // Lay out the data regions first so the directory can be written
        // with final offsets.
        let mut offsets = Vec::with_capacity(self.entries.len());
        let mut sizes = Vec::with_capacity(self.entries.len());
        let mut next_offset = SECTOR_SIZE;
        for (i, entry) in self.entries.iter().enumerate() {
            offsets.push(next_offset);
            let (size, padded) = if i == target {
                // The original padded region is reused while the data
                // fits; its slack bytes are copied below.
                let padded = if new_bytes.len() <= entry.padded.len() {
                    entry.padded.len()
                } else {
                    sector_round_up(new_bytes.len())
                };
                (new_bytes.len(), padded)
            } else {
                (entry.range.len(), entry.padded.len())
            };
            sizes.push(size);
            next_offset += padded;
        }

        let mut out = Vec::with_capacity(next_offset);
        out.extend_from_slice(&(self.entries.len() as u32).to_le_bytes());
        for (entry, (&offset, &size)) in self.entries.iter().zip(offsets.iter().zip(&sizes)) {
            let mut name_field = [0u8; NAME_LEN];
            name_field[..entry.name.len()].copy_from_slice(entry.name.as_bytes());
            out.extend_from_slice(&name_field);
            out.extend_from_slice(&(offset as u32).to_le_bytes());
            out.extend_from_slice(&(size as u32).to_le_bytes());
        }
        out.extend_from_slice(&self.bytes[out.len()..SECTOR_SIZE]);

        for (i, entry) in self.entries.iter().enumerate() {
            if i == target {
                out.extend_from_slice(new_bytes);
                let slack_from = entry.padded.start + new_bytes.len();
                if slack_from <= entry.padded.end {
                    out.extend_from_slice(&self.bytes[slack_from..entry.padded.end]);
                } else {
                    out.resize(sector_round_up(out.len()), 0);
                }
            } else {
                out.extend_from_slice(&self.bytes[entry.padded.start..entry.padded.end]);
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::{LvlArchive, MAX_FILES, SECTOR_SIZE};
    use crate::error::Error;

    // Nonzero fill byte for sector slack.
    const SLACK: u8 = 0xCC;

    fn archive(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut out = vec![0u8; SECTOR_SIZE];
        out[..4].copy_from_slice(&(files.len() as u32).to_le_bytes());

        let mut dir = 4;
        let mut offset = SECTOR_SIZE;
        for (name, data) in files {
            out[dir..dir + name.len()].copy_from_slice(name.as_bytes());
            out[dir + 12..dir + 16].copy_from_slice(&(offset as u32).to_le_bytes());
            out[dir + 16..dir + 20].copy_from_slice(&(data.len() as u32).to_le_bytes());
            dir += 20;

            out.extend_from_slice(data);
            out.resize(out.len().div_ceil(SECTOR_SIZE) * SECTOR_SIZE, SLACK);
            offset = out.len();
        }
        out
    }

    #[test]
    fn parse_exposes_declared_file_bytes() {
        let bytes = archive(&[("A.BND", b"alpha"), ("B.VH", b"bee")]);
        let lvl = LvlArchive::parse(&bytes).unwrap();

        assert_eq!(lvl.entries().len(), 2);
        let a = lvl.file_named("A.BND").unwrap();
        assert_eq!(lvl.file_bytes(a), b"alpha");
        assert_eq!(a.padded.len(), SECTOR_SIZE);
        assert!(lvl.file_named("MISSING").is_none());
    }

    #[test]
    fn same_size_rewrite_is_byte_identical() {
        let bytes = archive(&[("A.BND", b"alpha"), ("B.VH", b"bee")]);
        let lvl = LvlArchive::parse(&bytes).unwrap();
        let out = lvl.rewrite_file("A.BND", b"alpha").unwrap();
        assert_eq!(out, bytes);
    }

    #[test]
    fn rewrite_carries_target_slack_bytes_verbatim() {
        let bytes = archive(&[("A.BND", b"alpha"), ("B.VH", b"bee")]);
        let lvl = LvlArchive::parse(&bytes).unwrap();

        let out = lvl.rewrite_file("A.BND", b"bravo").unwrap();
        let relvl = LvlArchive::parse(&out).unwrap();
        let a = relvl.file_named("A.BND").unwrap();
        assert_eq!(relvl.file_bytes(a), b"bravo");
        assert!(out[a.range.end..a.padded.end].iter().all(|&b| b == SLACK));
        assert_eq!(out[SECTOR_SIZE + 5..], bytes[SECTOR_SIZE + 5..]);
    }

    #[test]
    fn grown_rewrite_shifts_later_files_and_keeps_their_bytes() {
        let bytes = archive(&[("A.BND", b"alpha"), ("B.VH", b"bee")]);
        let lvl = LvlArchive::parse(&bytes).unwrap();

        let grown = vec![0x42u8; SECTOR_SIZE + 1];
        let out = lvl.rewrite_file("A.BND", &grown).unwrap();
        let relvl = LvlArchive::parse(&out).unwrap();

        let a = relvl.file_named("A.BND").unwrap();
        assert_eq!(relvl.file_bytes(a), &grown[..]);
        let b = relvl.file_named("B.VH").unwrap();
        assert_eq!(b.range.start, SECTOR_SIZE + 2 * SECTOR_SIZE);
        assert_eq!(relvl.file_bytes(b), b"bee");
    }

    #[test]
    fn misaligned_offset_is_rejected() {
        let mut bytes = archive(&[("A.BND", b"alpha")]);
        bytes[16..20].copy_from_slice(&(SECTOR_SIZE as u32 + 4).to_le_bytes());
        assert!(matches!(
            LvlArchive::parse(&bytes),
            Err(Error::MalformedContainer { .. })
        ));
    }

    #[test]
    fn oversized_directory_is_rejected() {
        let mut bytes = archive(&[("A.BND", b"alpha")]);
        bytes[..4].copy_from_slice(&(MAX_FILES as u32 + 1).to_le_bytes());
        assert!(matches!(
            LvlArchive::parse(&bytes),
            Err(Error::MalformedContainer { .. })
        ));
    }
}
