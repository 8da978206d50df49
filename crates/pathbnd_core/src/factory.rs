use std::collections::{BTreeMap, HashMap};
use std::io;

use serde_json::Value as JsonValue;

use crate::error::Error;
use crate::registry::TypeRegistry;
use crate::tlv::{FieldKind, INT16, TlvKindDef, TlvWrapper, UINT16};

/// A recoverable decode condition, recorded instead of logged so callers
/// decide what to do with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeWarning {
    pub array_index: usize,
    pub tag: u32,
    pub message: String,
}

impl DecodeWarning {
    pub fn unknown_tag(array_index: usize, tag: u32) -> Self {
        Self {
            array_index,
            tag,
            message: format!("TLV type {tag} unknown, record skipped"),
        }
    }
}

/// Per-game dispatch table mapping on-disk tags and display names to TLV
/// kind definitions. The two maps are filled from one pass over the kind
/// table, so they stay in lockstep by construction.
#[derive(Debug)]
pub struct TlvFactory {
    by_tag: BTreeMap<u32, &'static TlvKindDef>,
    by_name: HashMap<&'static str, &'static TlvKindDef>,
}

impl TlvFactory {
    /// Build the factory, registering every kind's field types into the
    /// shared registry. Bounded-integer types register idempotently; enum
    /// types must have been registered by the game's vocabulary already.
    pub fn new(
        kinds: &'static [TlvKindDef],
        registry: &mut TypeRegistry,
    ) -> Result<Self, Error> {
        // Header fields shared by every kind.
        registry.add_bounded_int(INT16.name, INT16.min, INT16.max, INT16.width_bits);
        registry.add_bounded_int(UINT16.name, UINT16.min, UINT16.max, UINT16.width_bits);

        let mut by_tag = BTreeMap::new();
        let mut by_name = HashMap::new();

        for kind in kinds {
            for field in kind.fields {
                match field.kind {
                    FieldKind::Int(int_type) => {
                        registry.add_bounded_int(
                            int_type.name,
                            int_type.min,
                            int_type.max,
                            int_type.width_bits,
                        );
                    }
                    FieldKind::Enum(enum_name) => {
                        if registry.enum_descriptor(enum_name).is_none() {
                            return Err(Error::UnknownEnumValue {
                                enum_name: enum_name.into(),
                                detail: format!(
                                    "referenced by {}.{} but never registered",
                                    kind.name, field.name
                                ),
                            });
                        }
                    }
                }
            }

            if by_tag.insert(kind.tag, kind).is_some() {
                return Err(Error::DuplicateTypeName {
                    name: format!("TLV tag {}", kind.tag),
                });
            }
            if by_name.insert(kind.name, kind).is_some() {
                return Err(Error::DuplicateTypeName {
                    name: kind.name.into(),
                });
            }
        }

        Ok(Self { by_tag, by_name })
    }

    pub fn kind_by_tag(&self, tag: u32) -> Option<&'static TlvKindDef> {
        self.by_tag.get(&tag).copied()
    }

    pub fn kind_by_name(&self, name: &str) -> Option<&'static TlvKindDef> {
        self.by_name.get(name).copied()
    }

    /// Registered kinds in tag order.
    pub fn kinds(&self) -> impl Iterator<Item = &'static TlvKindDef> + '_ {
        self.by_tag.values().copied()
    }

    /// Construct by on-disk tag. An unregistered tag is a soft failure
    /// (`Ok(None)`) so foreign records cannot abort a whole conversion; a
    /// record that fails to parse is a hard error. `None` raw bytes build
    /// the default instance.
    pub fn make_by_tag(
        &self,
        tag: u32,
        raw: Option<&[u8]>,
        instance: i32,
    ) -> io::Result<Option<TlvWrapper>> {
        let Some(def) = self.kind_by_tag(tag) else {
            return Ok(None);
        };
        self.make(def, raw, instance).map(Some)
    }

    /// Construct by display name, used when reading authored documents.
    pub fn make_by_name(&self, name: &str, raw: Option<&[u8]>) -> io::Result<Option<TlvWrapper>> {
        let Some(def) = self.kind_by_name(name) else {
            return Ok(None);
        };
        self.make(def, raw, 0).map(Some)
    }

    fn make(
        &self,
        def: &'static TlvKindDef,
        raw: Option<&[u8]>,
        instance: i32,
    ) -> io::Result<TlvWrapper> {
        match raw {
            Some(bytes) => TlvWrapper::from_raw(def, bytes, instance),
            None => Ok(TlvWrapper::default_instance(def)),
        }
    }

    /// One serialized default instance per registered kind, in tag order:
    /// the schema reference document, independent of any input file.
    pub fn defaults_document(&self, registry: &TypeRegistry) -> Result<JsonValue, Error> {
        let mut out = Vec::new();
        for def in self.kinds() {
            let entry = TlvWrapper::default_instance(def).to_entry(registry)?;
            let value = serde_json::to_value(entry).map_err(|e| Error::MalformedDocument {
                message: e.to_string(),
            })?;
            out.push(value);
        }
        Ok(JsonValue::Array(out))
    }
}
