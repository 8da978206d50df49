//! Path chunk payload codec: a small header followed by packed TLV records.
//!
//! Records whose tag the active game does not know are not an error; they
//! are carried through decode as raw bytes with their array position so an
//! encode can put them back exactly where they were. An unedited decode,
//! encode pair is byte-identical, foreign records included.

use std::io::Cursor;

use crate::error::Error;
use crate::factory::DecodeWarning;
use crate::games::GameTypes;
use crate::reader::LittleEndianReader;
use crate::tlv::{TLV_HEADER_LEN, TlvWrapper};

pub const PATH_HEADER_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathHeader {
    pub tlv_count: u32,
    pub tlv_data_size: u32,
    pub reserved: [u8; 8],
}

/// A record skipped during decode because its tag is not in the active
/// game's vocabulary. `array_index` is its position in the record array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTlv {
    pub array_index: usize,
    pub tag: u32,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
pub struct DecodedPath {
    pub header: PathHeader,
    pub tlvs: Vec<TlvWrapper>,
    pub skipped: Vec<SkippedTlv>,
    pub warnings: Vec<DecodeWarning>,
    trailing: Vec<u8>,
}

pub fn decode_path(chunk_data: &[u8], types: &GameTypes) -> Result<DecodedPath, Error> {
    if chunk_data.len() < PATH_HEADER_LEN {
        return Err(Error::malformed(format!(
            "path chunk of {} bytes is smaller than its header",
            chunk_data.len()
        )));
    }

    let mut r = LittleEndianReader::new(Cursor::new(chunk_data));
    let header = PathHeader {
        tlv_count: r.read_u32()?,
        tlv_data_size: r.read_u32()?,
        reserved: r.read_array::<8>()?,
    };

    let mut tlvs = Vec::new();
    let mut skipped = Vec::new();
    let mut warnings = Vec::new();
    let mut occurrences: Vec<(u32, i32)> = Vec::new();
    let mut at = PATH_HEADER_LEN;

    for array_index in 0..header.tlv_count as usize {
        if chunk_data.len() - at < TLV_HEADER_LEN {
            return Err(Error::malformed(
                "declared TLV count exceeds available bytes",
            ));
        }
        let length =
            u16::from_le_bytes([chunk_data[at + 2], chunk_data[at + 3]]) as usize;
        let tag = u32::from_le_bytes([
            chunk_data[at + 4],
            chunk_data[at + 5],
            chunk_data[at + 6],
            chunk_data[at + 7],
        ]);
        if length < TLV_HEADER_LEN || at + length > chunk_data.len() {
            return Err(Error::malformed(format!(
                "TLV record {array_index} declares length {length} past the chunk end"
            )));
        }
        let raw = &chunk_data[at..at + length];

        let instance = match occurrences.iter_mut().find(|(t, _)| *t == tag) {
            Some((_, count)) => {
                *count += 1;
                *count
            }
            None => {
                occurrences.push((tag, 0));
                0
            }
        };

        match types
            .factory()
            .make_by_tag(tag, Some(raw), instance)
            .map_err(|e| Error::malformed(e.to_string()))?
        {
            Some(wrapper) => tlvs.push(wrapper),
            None => {
                warnings.push(DecodeWarning::unknown_tag(array_index, tag));
                skipped.push(SkippedTlv {
                    array_index,
                    tag,
                    bytes: raw.to_vec(),
                });
            }
        }

        at += length;
    }

    let record_bytes = at - PATH_HEADER_LEN;
    if header.tlv_data_size as usize != record_bytes {
        return Err(Error::malformed(format!(
            "header declares {} TLV data bytes, records span {record_bytes}",
            header.tlv_data_size
        )));
    }

    Ok(DecodedPath {
        header,
        tlvs,
        skipped,
        warnings,
        trailing: chunk_data[at..].to_vec(),
    })
}

/// Pack TLVs back into chunk data. Skipped records from `original` are
/// re-inserted by their position relative to the decoded records around
/// them, so every one survives even when the caller added or removed
/// entries; an unedited list reproduces the original byte layout.
pub fn encode_path(tlvs: &[TlvWrapper], original: &DecodedPath) -> Vec<u8> {
    let mut records = Vec::new();
    // A skipped record's original slot, counted in decoded records only:
    // its array index minus the skipped records before it.
    let mut pending = original
        .skipped
        .iter()
        .enumerate()
        .map(|(i, s)| (s.array_index - i, s))
        .peekable();

    for (emitted, wrapper) in tlvs.iter().enumerate() {
        while let Some((_, skip)) = pending.next_if(|(before, _)| *before <= emitted) {
            records.extend_from_slice(&skip.bytes);
        }
        records.extend_from_slice(&wrapper.to_raw());
    }
    for (_, skip) in pending {
        records.extend_from_slice(&skip.bytes);
    }

    let total = tlvs.len() + original.skipped.len();
    let mut out = Vec::with_capacity(PATH_HEADER_LEN + records.len());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(records.len() as u32).to_le_bytes());
    out.extend_from_slice(&original.header.reserved);
    out.extend_from_slice(&records);
    out.extend_from_slice(&original.trailing);
    out
}
