//! Chunked resource bundle (.BND) codec.
//!
//! A bundle is a flat run of chunks with no alignment between them. Each
//! chunk is a 16-byte header (data size, fourcc, id, reserved word)
//! followed by the data bytes. The stream ends with an `End!` chunk of
//! size zero, which must be the last chunk in the bundle.

use std::io::Cursor;

use crate::error::Error;
use crate::reader::LittleEndianReader;

pub const CHUNK_HEADER_LEN: usize = 16;

pub const FOURCC_PATH: [u8; 4] = *b"Path";
pub const FOURCC_BITS: [u8; 4] = *b"Bits";
pub const FOURCC_FG1: [u8; 4] = *b"FG1 ";
pub const FOURCC_END: [u8; 4] = *b"End!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub data_size: u32,
    pub fourcc: [u8; 4],
    pub id: u32,
    pub reserved: u32,
}

impl ChunkHeader {
    fn emit_to_vec(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.data_size.to_le_bytes());
        out.extend_from_slice(&self.fourcc);
        out.extend_from_slice(&self.id.to_le_bytes());
        out.extend_from_slice(&self.reserved.to_le_bytes());
    }
}

/// One chunk's header plus its byte span within the bundle, header included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkEntry {
    pub header: ChunkHeader,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone)]
pub struct PathBundle {
    bytes: Vec<u8>,
    chunks: Vec<ChunkEntry>,
}

impl PathBundle {
    pub fn parse(bytes: &[u8]) -> Result<Self, Error> {
        let mut r = LittleEndianReader::new(Cursor::new(bytes));
        let mut chunks = Vec::new();
        let mut terminated = false;

        while (r.position()? as usize) < bytes.len() {
            let start = r.position()? as usize;
            if bytes.len() - start < CHUNK_HEADER_LEN {
                return Err(Error::malformed(format!(
                    "truncated chunk header at offset {start}"
                )));
            }
            let header = ChunkHeader {
                data_size: r.read_u32()?,
                fourcc: r.read_fourcc()?,
                id: r.read_u32()?,
                reserved: r.read_u32()?,
            };

            let end = start
                .checked_add(CHUNK_HEADER_LEN + header.data_size as usize)
                .filter(|&e| e <= bytes.len())
                .ok_or_else(|| {
                    Error::malformed(format!(
                        "chunk at offset {start} declares {} data bytes past the bundle end",
                        header.data_size
                    ))
                })?;
            r.skip(u64::from(header.data_size))?;
            chunks.push(ChunkEntry { header, start, end });

            if header.fourcc == FOURCC_END {
                if header.data_size != 0 {
                    return Err(Error::malformed("terminator chunk carries data"));
                }
                if end != bytes.len() {
                    return Err(Error::malformed("bytes follow the terminator chunk"));
                }
                terminated = true;
                break;
            }
        }

        if !terminated {
            return Err(Error::malformed("bundle has no terminator chunk"));
        }

        Ok(Self {
            bytes: bytes.to_vec(),
            chunks,
        })
    }

    pub fn chunks(&self) -> &[ChunkEntry] {
        &self.chunks
    }

    /// Ids of every path chunk, in bundle order.
    pub fn path_ids(&self) -> Vec<u32> {
        self.chunks
            .iter()
            .filter(|c| c.header.fourcc == FOURCC_PATH)
            .map(|c| c.header.id)
            .collect()
    }

    pub fn chunk(&self, fourcc: [u8; 4], id: u32) -> Option<&ChunkEntry> {
        self.chunks
            .iter()
            .find(|c| c.header.fourcc == fourcc && c.header.id == id)
    }

    pub fn chunk_data(&self, entry: &ChunkEntry) -> &[u8] {
        &self.bytes[entry.start + CHUNK_HEADER_LEN..entry.end]
    }

    /// Re-emit the bundle with one chunk's data replaced. All other chunks
    /// are copied verbatim, spans and order untouched; the target keeps its
    /// header words apart from the data size.
    pub fn rewrite_chunk(
        &self,
        fourcc: [u8; 4],
        id: u32,
        new_data: &[u8],
    ) -> Result<Vec<u8>, Error> {
        if !self
            .chunks
            .iter()
            .any(|c| c.header.fourcc == fourcc && c.header.id == id)
        {
            return Err(Error::malformed(format!(
                "bundle has no chunk {:?} id {id}",
                String::from_utf8_lossy(&fourcc)
            )));
        }

        let mut out = Vec::with_capacity(self.bytes.len());
        for chunk in &self.chunks {
            if chunk.header.fourcc == fourcc && chunk.header.id == id {
                let header = ChunkHeader {
                    data_size: new_data.len() as u32,
                    ..chunk.header
                };
                header.emit_to_vec(&mut out);
                out.extend_from_slice(new_data);
            } else {
                out.extend_from_slice(&self.bytes[chunk.start..chunk.end]);
            }
        }
        Ok(out)
    }
}
