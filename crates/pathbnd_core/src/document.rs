use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::error::Error;
use crate::games::Game;

/// Schema version written by this build.
pub const SCHEMA_VERSION: i32 = 2;
/// Oldest version `upgrade_document` can still migrate forward.
pub const OLDEST_SUPPORTED_SCHEMA_VERSION: i32 = 1;

/// Versioned envelope around one exported path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathDocument {
    #[serde(rename = "schemaVersion")]
    pub schema_version: i32,
    pub game: Game,
    pub tlvs: Vec<TlvEntry>,
}

/// One TLV in a document: kind name, per-kind occurrence index, and the
/// field map (enum labels as strings, bounded integers as numbers).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TlvEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub instance: i32,
    pub fields: JsonMap<String, JsonValue>,
}

/// Migrate an older document to the current schema, one version step at a
/// time. Already-current documents pass through unchanged, so applying the
/// upgrade twice is a no-op.
pub fn upgrade_document(mut value: JsonValue) -> Result<JsonValue, Error> {
    let mut version = schema_version_of(&value)?;
    if version < i64::from(OLDEST_SUPPORTED_SCHEMA_VERSION)
        || version > i64::from(SCHEMA_VERSION)
    {
        return Err(Error::UnsupportedSchemaVersion {
            found: version,
            oldest: OLDEST_SUPPORTED_SCHEMA_VERSION,
            current: SCHEMA_VERSION,
        });
    }

    while version < i64::from(SCHEMA_VERSION) {
        match version {
            1 => migrate_v1_to_v2(&mut value)?,
            _ => unreachable!("version already range-checked"),
        }
        version += 1;
        set_schema_version(&mut value, version)?;
    }

    Ok(value)
}

fn schema_version_of(value: &JsonValue) -> Result<i64, Error> {
    value
        .get("schemaVersion")
        .and_then(JsonValue::as_i64)
        .ok_or_else(|| Error::MalformedDocument {
            message: "missing or non-integer schemaVersion".into(),
        })
}

fn set_schema_version(value: &mut JsonValue, version: i64) -> Result<(), Error> {
    let object = value.as_object_mut().ok_or_else(|| Error::MalformedDocument {
        message: "document root is not an object".into(),
    })?;
    object.insert("schemaVersion".into(), JsonValue::from(version));
    Ok(())
}

/// v1 documents carried no per-entry `instance` field. Assign each entry
/// its occurrence index among entries of the same kind, in array order.
fn migrate_v1_to_v2(value: &mut JsonValue) -> Result<(), Error> {
    let tlvs = value
        .get_mut("tlvs")
        .and_then(JsonValue::as_array_mut)
        .ok_or_else(|| Error::MalformedDocument {
            message: "missing tlvs array".into(),
        })?;

    let mut seen: Vec<(String, i64)> = Vec::new();
    for entry in tlvs {
        let object = entry.as_object_mut().ok_or_else(|| Error::MalformedDocument {
            message: "tlvs entry is not an object".into(),
        })?;
        let kind = object
            .get("type")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| Error::MalformedDocument {
                message: "tlvs entry has no type name".into(),
            })?
            .to_string();

        let occurrence = match seen.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, count)) => {
                *count += 1;
                *count
            }
            None => {
                seen.push((kind, 0));
                0
            }
        };

        if !object.contains_key("instance") {
            object.insert("instance".into(), JsonValue::from(occurrence));
        }
    }
    Ok(())
}
