use std::collections::HashMap;

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::error::Error;

/// Named metadata for one enumerated field type: an ordered, bijective
/// mapping between on-disk integer values and display labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    name: String,
    pairs: Vec<(i32, String)>,
}

impl EnumDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label_of(&self, value: i32) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(v, _)| *v == value)
            .map(|(_, label)| label.as_str())
    }

    pub fn value_of(&self, label: &str) -> Option<i32> {
        self.pairs
            .iter()
            .find(|(_, l)| l == label)
            .map(|(v, _)| *v)
    }
}

/// Named metadata for a bounded-integer field type: an inclusive native
/// range plus the on-disk storage width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedIntDescriptor {
    pub min: i32,
    pub max: i32,
    pub width_bits: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    Enum(EnumDescriptor),
    BoundedInt { name: String, descriptor: BoundedIntDescriptor },
}

impl TypeDescriptor {
    pub fn name(&self) -> &str {
        match self {
            Self::Enum(e) => e.name(),
            Self::BoundedInt { name, .. } => name,
        }
    }
}

/// Construction-time-only registry of field type descriptors.
///
/// Built once per game context, then shared read-only; there is no removal
/// operation and no mutation after the owning context finishes construction.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: Vec<TypeDescriptor>,
    index: HashMap<String, usize>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new enum type. Fails if the name is already taken or if
    /// any value or label repeats within `pairs`.
    pub fn add_enum(&mut self, name: &str, pairs: &[(i32, &str)]) -> Result<(), Error> {
        if self.index.contains_key(name) {
            return Err(Error::DuplicateTypeName { name: name.into() });
        }

        let mut owned = Vec::with_capacity(pairs.len());
        for (value, label) in pairs {
            if owned.iter().any(|(v, _): &(i32, String)| v == value) {
                return Err(Error::DuplicateTypeName {
                    name: format!("{name} value {value}"),
                });
            }
            if owned.iter().any(|(_, l): &(i32, String)| l == label) {
                return Err(Error::DuplicateTypeName {
                    name: format!("{name}::{label}"),
                });
            }
            owned.push((*value, (*label).to_string()));
        }

        self.index.insert(name.into(), self.types.len());
        self.types.push(TypeDescriptor::Enum(EnumDescriptor {
            name: name.into(),
            pairs: owned,
        }));
        Ok(())
    }

    /// Register a bounded-integer type. A repeat registration of the same
    /// name is a no-op: the first registration wins, so independent TLV
    /// kinds may all register the shared primitive types they use.
    pub fn add_bounded_int(&mut self, name: &str, min: i32, max: i32, width_bits: u8) {
        if self.index.contains_key(name) {
            return;
        }
        self.index.insert(name.into(), self.types.len());
        self.types.push(TypeDescriptor::BoundedInt {
            name: name.into(),
            descriptor: BoundedIntDescriptor {
                min,
                max,
                width_bits,
            },
        });
    }

    /// Metadata lookup; `None` signals "unregistered" and is never an error.
    pub fn name_of(&self, name: &str) -> Option<&str> {
        self.descriptor(name).map(TypeDescriptor::name)
    }

    pub fn descriptor(&self, name: &str) -> Option<&TypeDescriptor> {
        self.index.get(name).map(|&i| &self.types[i])
    }

    pub fn enum_descriptor(&self, name: &str) -> Option<&EnumDescriptor> {
        match self.descriptor(name) {
            Some(TypeDescriptor::Enum(e)) => Some(e),
            _ => None,
        }
    }

    pub fn bounded_int_descriptor(&self, name: &str) -> Option<&BoundedIntDescriptor> {
        match self.descriptor(name) {
            Some(TypeDescriptor::BoundedInt { descriptor, .. }) => Some(descriptor),
            _ => None,
        }
    }

    pub fn value_from_name(&self, enum_name: &str, label: &str) -> Result<i32, Error> {
        let descriptor = self
            .enum_descriptor(enum_name)
            .ok_or_else(|| Error::UnknownEnumValue {
                enum_name: enum_name.into(),
                detail: "enum type is not registered".into(),
            })?;
        descriptor
            .value_of(label)
            .ok_or_else(|| Error::UnknownEnumValue {
                enum_name: enum_name.into(),
                detail: format!("no value named '{label}'"),
            })
    }

    pub fn name_from_value(&self, enum_name: &str, value: i32) -> Result<&str, Error> {
        let descriptor = self
            .enum_descriptor(enum_name)
            .ok_or_else(|| Error::UnknownEnumValue {
                enum_name: enum_name.into(),
                detail: "enum type is not registered".into(),
            })?;
        descriptor
            .label_of(value)
            .ok_or_else(|| Error::UnknownEnumValue {
                enum_name: enum_name.into(),
                detail: format!("no name for value {value}"),
            })
    }

    /// One entry per registered enum, in registration order.
    pub fn enums_to_document(&self) -> JsonValue {
        let mut out = Vec::new();
        for t in &self.types {
            let TypeDescriptor::Enum(e) = t else {
                continue;
            };
            let values: Vec<JsonValue> = e
                .pairs
                .iter()
                .map(|(value, label)| {
                    let mut entry = JsonMap::new();
                    entry.insert("value".into(), JsonValue::from(*value));
                    entry.insert("name".into(), JsonValue::from(label.as_str()));
                    JsonValue::Object(entry)
                })
                .collect();
            let mut entry = JsonMap::new();
            entry.insert("name".into(), JsonValue::from(e.name.as_str()));
            entry.insert("values".into(), JsonValue::Array(values));
            out.push(JsonValue::Object(entry));
        }
        JsonValue::Array(out)
    }

    /// One entry per registered bounded-integer type, in registration order.
    pub fn bounded_ints_to_document(&self) -> JsonValue {
        let mut out = Vec::new();
        for t in &self.types {
            let TypeDescriptor::BoundedInt { name, descriptor } = t else {
                continue;
            };
            let mut entry = JsonMap::new();
            entry.insert("name".into(), JsonValue::from(name.as_str()));
            entry.insert("min".into(), JsonValue::from(descriptor.min));
            entry.insert("max".into(), JsonValue::from(descriptor.max));
            entry.insert("widthBits".into(), JsonValue::from(descriptor.width_bits));
            out.push(JsonValue::Object(entry));
        }
        JsonValue::Array(out)
    }
}
