use std::io::{self, Cursor};

use serde_json::Value as JsonValue;

use crate::document::TlvEntry;
use crate::error::Error;
use crate::reader::LittleEndianReader;
use crate::registry::TypeRegistry;

/// Shared record header carried by every TLV, 24 bytes on disk:
/// flags, total record length, kind tag, trigger rectangle, reserved tail.
pub const TLV_HEADER_LEN: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlvHeader {
    pub flags: u16,
    pub length: u16,
    pub tag: u32,
    pub x1: i16,
    pub y1: i16,
    pub x2: i16,
    pub y2: i16,
    pub reserved: [u8; 8],
}

impl TlvHeader {
    pub fn parse<R: io::Read + io::Seek>(r: &mut LittleEndianReader<R>) -> io::Result<Self> {
        Ok(Self {
            flags: r.read_u16()?,
            length: r.read_u16()?,
            tag: r.read_u32()?,
            x1: r.read_i16()?,
            y1: r.read_i16()?,
            x2: r.read_i16()?,
            y2: r.read_i16()?,
            reserved: r.read_array::<8>()?,
        })
    }

    pub fn emit_to_vec(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.flags.to_le_bytes());
        out.extend_from_slice(&self.length.to_le_bytes());
        out.extend_from_slice(&self.tag.to_le_bytes());
        out.extend_from_slice(&self.x1.to_le_bytes());
        out.extend_from_slice(&self.y1.to_le_bytes());
        out.extend_from_slice(&self.x2.to_le_bytes());
        out.extend_from_slice(&self.y2.to_le_bytes());
        out.extend_from_slice(&self.reserved);
    }
}

/// A bounded-integer field type, registered idempotently by every kind that
/// uses it.
#[derive(Debug, PartialEq, Eq)]
pub struct IntType {
    pub name: &'static str,
    pub min: i32,
    pub max: i32,
    pub width_bits: u8,
}

pub const INT16: IntType = IntType {
    name: "int16",
    min: i16::MIN as i32,
    max: i16::MAX as i32,
    width_bits: 16,
};

pub const UINT16: IntType = IntType {
    name: "uint16",
    min: 0,
    max: u16::MAX as i32,
    width_bits: 16,
};

pub const PERCENT: IntType = IntType {
    name: "percent",
    min: 0,
    max: 100,
    width_bits: 16,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Field interpreted through a registered enum type; serialized by label.
    Enum(&'static str),
    /// Field interpreted through a bounded-integer type; serialized as a number.
    Int(&'static IntType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
    pub default: i16,
}

impl FieldDef {
    pub const fn int16(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Int(&INT16),
            default: 0,
        }
    }

    pub const fn percent(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Int(&PERCENT),
            default: 0,
        }
    }

    pub const fn enumerated(name: &'static str, enum_name: &'static str, default: i16) -> Self {
        Self {
            name,
            kind: FieldKind::Enum(enum_name),
            default,
        }
    }
}

/// Static description of one TLV kind: its on-disk tag, display name, and
/// ordered payload fields (consecutive 16-bit words after the header).
#[derive(Debug, PartialEq, Eq)]
pub struct TlvKindDef {
    pub tag: u32,
    pub name: &'static str,
    pub fields: &'static [FieldDef],
}

impl TlvKindDef {
    pub fn payload_len(&self) -> usize {
        self.fields.len() * 2
    }

    pub fn record_len(&self) -> usize {
        TLV_HEADER_LEN + self.payload_len()
    }
}

// Header fields exposed alongside the kind payload in documents.
const BASE_FIELD_FLAGS: &str = "flags";
const BASE_FIELD_RECT: [&str; 4] = ["x1", "y1", "x2", "y2"];

/// The decoded, editable representation of one TLV record.
///
/// When built from binary the full original record is retained as a
/// template so that reserved and padding bytes the edit did not touch are
/// reproduced byte-for-byte on encode.
#[derive(Debug, Clone)]
pub struct TlvWrapper {
    def: &'static TlvKindDef,
    pub header: TlvHeader,
    values: Vec<i16>,
    instance: i32,
    template: Option<Vec<u8>>,
}

impl TlvWrapper {
    /// Build from one full on-disk record. `raw` must span exactly the
    /// record's declared length.
    pub fn from_raw(def: &'static TlvKindDef, raw: &[u8], instance: i32) -> io::Result<Self> {
        let mut r = LittleEndianReader::new(Cursor::new(raw));
        let header = TlvHeader::parse(&mut r)?;

        if header.length as usize != raw.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "{} record length {} does not match supplied bytes {}",
                    def.name,
                    header.length,
                    raw.len()
                ),
            ));
        }
        if raw.len() < def.record_len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "{} record too short: {} bytes, need {}",
                    def.name,
                    raw.len(),
                    def.record_len()
                ),
            ));
        }

        let mut values = Vec::with_capacity(def.fields.len());
        for _ in def.fields {
            values.push(r.read_i16()?);
        }

        Ok(Self {
            def,
            header,
            values,
            instance,
            template: Some(raw.to_vec()),
        })
    }

    /// Build the default instance with no backing record, used for schema
    /// export and for TLVs newly authored in a document.
    pub fn default_instance(def: &'static TlvKindDef) -> Self {
        Self {
            def,
            header: TlvHeader {
                flags: 0,
                length: def.record_len() as u16,
                tag: def.tag,
                x1: 0,
                y1: 0,
                x2: 0,
                y2: 0,
                reserved: [0; 8],
            },
            values: def.fields.iter().map(|f| f.default).collect(),
            instance: 0,
            template: None,
        }
    }

    pub fn def(&self) -> &'static TlvKindDef {
        self.def
    }

    pub fn kind_name(&self) -> &'static str {
        self.def.name
    }

    pub fn tag(&self) -> u32 {
        self.def.tag
    }

    pub fn instance(&self) -> i32 {
        self.instance
    }

    pub fn set_instance(&mut self, instance: i32) {
        self.instance = instance;
    }

    pub fn value(&self, field_name: &str) -> Option<i16> {
        self.def
            .fields
            .iter()
            .position(|f| f.name == field_name)
            .map(|i| self.values[i])
    }

    fn field_path(&self, field_name: &str) -> String {
        format!("{}.{}", self.def.name, field_name)
    }

    /// Serialize to a document entry. Enum-typed fields render as their
    /// registered labels; a binary value missing from its enum surfaces as
    /// `UnknownEnumValue`.
    pub fn to_entry(&self, registry: &TypeRegistry) -> Result<TlvEntry, Error> {
        let mut fields = serde_json::Map::new();
        fields.insert(BASE_FIELD_FLAGS.into(), JsonValue::from(self.header.flags));
        let rect = [self.header.x1, self.header.y1, self.header.x2, self.header.y2];
        for (name, value) in BASE_FIELD_RECT.iter().zip(rect) {
            fields.insert((*name).into(), JsonValue::from(value));
        }

        for (field, value) in self.def.fields.iter().zip(&self.values) {
            let rendered = match field.kind {
                FieldKind::Enum(enum_name) => {
                    let label = registry.name_from_value(enum_name, i32::from(*value))?;
                    JsonValue::from(label)
                }
                FieldKind::Int(_) => JsonValue::from(*value),
            };
            fields.insert(field.name.into(), rendered);
        }

        Ok(TlvEntry {
            kind: self.def.name.to_string(),
            instance: self.instance,
            fields,
        })
    }

    /// Apply a document entry's fields. Every declared field must be
    /// present and valid; violations are reported as `FieldValidation`
    /// naming the offending field, never clamped or skipped.
    pub fn apply_entry(&mut self, entry: &TlvEntry, registry: &TypeRegistry) -> Result<(), Error> {
        for key in entry.fields.keys() {
            let known = key == BASE_FIELD_FLAGS
                || BASE_FIELD_RECT.contains(&key.as_str())
                || self.def.fields.iter().any(|f| f.name == key);
            if !known {
                return Err(Error::field(
                    self.field_path(key),
                    "field is not part of this TLV kind",
                ));
            }
        }

        let flags = self.int_field(entry, BASE_FIELD_FLAGS, &UINT16)?;
        let mut rect = [0i16; 4];
        for (slot, name) in rect.iter_mut().zip(BASE_FIELD_RECT) {
            *slot = self.int_field(entry, name, &INT16)? as i16;
        }

        let mut values = Vec::with_capacity(self.def.fields.len());
        for field in self.def.fields {
            let raw = entry.fields.get(field.name).ok_or_else(|| {
                Error::field(self.field_path(field.name), "field is missing")
            })?;

            let value = match field.kind {
                FieldKind::Enum(enum_name) => {
                    let label = raw.as_str().ok_or_else(|| {
                        Error::field(
                            self.field_path(field.name),
                            format!("expected an enum name string for '{enum_name}'"),
                        )
                    })?;
                    registry.value_from_name(enum_name, label).map_err(|e| {
                        Error::field(self.field_path(field.name), e.to_string())
                    })?
                }
                FieldKind::Int(int_type) => {
                    self.checked_int(raw, field.name, int_type, registry)?
                }
            };

            values.push(value as i16);
        }

        self.header.flags = flags as u16;
        [self.header.x1, self.header.y1, self.header.x2, self.header.y2] = rect;
        self.values = values;
        self.instance = entry.instance;
        Ok(())
    }

    fn int_field(&self, entry: &TlvEntry, name: &str, int_type: &IntType) -> Result<i32, Error> {
        let raw = entry
            .fields
            .get(name)
            .ok_or_else(|| Error::field(self.field_path(name), "field is missing"))?;
        let value = raw
            .as_i64()
            .ok_or_else(|| Error::field(self.field_path(name), "expected an integer"))?;
        if value < i64::from(int_type.min) || value > i64::from(int_type.max) {
            return Err(Error::field(
                self.field_path(name),
                format!(
                    "value {value} outside '{}' range {}..={}",
                    int_type.name, int_type.min, int_type.max
                ),
            ));
        }
        Ok(value as i32)
    }

    fn checked_int(
        &self,
        raw: &JsonValue,
        field_name: &str,
        int_type: &IntType,
        registry: &TypeRegistry,
    ) -> Result<i32, Error> {
        let value = raw
            .as_i64()
            .ok_or_else(|| Error::field(self.field_path(field_name), "expected an integer"))?;

        // The registry descriptor is authoritative; the static IntType is
        // only its registration source (first registration wins).
        let descriptor = registry
            .bounded_int_descriptor(int_type.name)
            .copied()
            .unwrap_or(crate::registry::BoundedIntDescriptor {
                min: int_type.min,
                max: int_type.max,
                width_bits: int_type.width_bits,
            });

        if value < i64::from(descriptor.min) || value > i64::from(descriptor.max) {
            return Err(Error::field(
                self.field_path(field_name),
                format!(
                    "value {value} outside '{}' range {}..={}",
                    int_type.name, descriptor.min, descriptor.max
                ),
            ));
        }
        Ok(value as i32)
    }

    /// Pack back into the fixed binary layout. Bytes past the declared
    /// fields come from the original record when one exists.
    pub fn to_raw(&self) -> Vec<u8> {
        let mut out = match &self.template {
            Some(template) => template.clone(),
            None => vec![0u8; self.header.length as usize],
        };

        let mut head = Vec::with_capacity(TLV_HEADER_LEN);
        self.header.emit_to_vec(&mut head);
        out[..TLV_HEADER_LEN].copy_from_slice(&head);

        for (i, value) in self.values.iter().enumerate() {
            let at = TLV_HEADER_LEN + i * 2;
            out[at..at + 2].copy_from_slice(&value.to_le_bytes());
        }
        out
    }
}
