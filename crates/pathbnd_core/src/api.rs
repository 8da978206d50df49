//! Top-level conversion pipeline: enumerate, export, import, upgrade,
//! schema. Every operation works on whole in-memory containers and either
//! returns a complete result or an error, never partial output.

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::bnd::{FOURCC_BITS, FOURCC_FG1, FOURCC_PATH, PathBundle};
use crate::document::{PathDocument, SCHEMA_VERSION, upgrade_document};
use crate::error::Error;
use crate::factory::DecodeWarning;
use crate::games::{Game, GameTypes};
use crate::lvl::LvlArchive;
use crate::path::{DecodedPath, decode_path, encode_path};
use crate::tlv::TlvWrapper;

/// Version of this conversion surface, independent of the document schema.
pub const API_VERSION: i32 = 1;

pub fn api_version() -> i32 {
    API_VERSION
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumeratedPaths {
    pub bundle_name: Option<String>,
    pub path_ids: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// Leave camera (`Bits`) and overlay (`FG1 `) chunks untouched instead
    /// of substituting them from resource sources.
    pub skip_cameras_and_fg1: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            skip_cameras_and_fg1: true,
        }
    }
}

#[derive(Debug)]
pub struct ExportedPath {
    pub document: PathDocument,
    pub warnings: Vec<DecodeWarning>,
}

/// First `.BND` file in the archive that parses as a chunked bundle holding
/// at least one path chunk.
fn locate_path_bundle(lvl: &LvlArchive) -> Option<(String, PathBundle)> {
    for entry in lvl.entries() {
        if !entry.name.ends_with(".BND") {
            continue;
        }
        let Ok(bundle) = PathBundle::parse(lvl.file_bytes(entry)) else {
            continue;
        };
        if !bundle.path_ids().is_empty() {
            return Some((entry.name.clone(), bundle));
        }
    }
    None
}

/// List the path ids a container offers, without decoding any records.
pub fn enumerate_paths(container: &[u8]) -> Result<EnumeratedPaths, Error> {
    let lvl = LvlArchive::parse(container)?;
    Ok(match locate_path_bundle(&lvl) {
        Some((bundle_name, bundle)) => EnumeratedPaths {
            bundle_name: Some(bundle_name),
            path_ids: bundle.path_ids(),
        },
        None => EnumeratedPaths {
            bundle_name: None,
            path_ids: Vec::new(),
        },
    })
}

fn open_path_bundle(
    container: &[u8],
    path_id: u32,
) -> Result<(LvlArchive, String, PathBundle), Error> {
    let lvl = LvlArchive::parse(container)?;
    let (bundle_name, bundle) =
        locate_path_bundle(&lvl).ok_or(Error::PathNotFound { path_id })?;
    if bundle.chunk(FOURCC_PATH, path_id).is_none() {
        return Err(Error::PathNotFound { path_id });
    }
    Ok((lvl, bundle_name, bundle))
}

/// Decode under both variants and keep the one with fewer unknown-tag
/// warnings. An equal count means the data cannot distinguish the games,
/// which needs an explicit hint rather than a guess.
fn detect_game(chunk_data: &[u8]) -> Result<Game, Error> {
    let attempt = |game| -> Option<usize> {
        let types = GameTypes::new(game).ok()?;
        decode_path(chunk_data, &types).ok().map(|d| d.warnings.len())
    };

    match (attempt(Game::Ao), attempt(Game::Ae)) {
        (Some(ao), Some(ae)) if ao < ae => Ok(Game::Ao),
        (Some(ao), Some(ae)) if ae < ao => Ok(Game::Ae),
        (Some(_), Some(_)) => Err(Error::GameDetectionAmbiguous {
            message: "path decodes equally well as AO and AE, pass a game hint".into(),
        }),
        (Some(_), None) => Ok(Game::Ao),
        (None, Some(_)) => Ok(Game::Ae),
        (None, None) => Err(Error::malformed(
            "path does not decode under either game variant",
        )),
    }
}

/// Export one path to a versioned document. With no `game_hint` the variant
/// is auto-detected from the record tags.
pub fn export_path_to_json(
    container: &[u8],
    path_id: u32,
    game_hint: Option<Game>,
) -> Result<ExportedPath, Error> {
    let (_, _, bundle) = open_path_bundle(container, path_id)?;
    let chunk = bundle
        .chunk(FOURCC_PATH, path_id)
        .ok_or(Error::PathNotFound { path_id })?;
    let chunk_data = bundle.chunk_data(chunk);

    let game = match game_hint {
        Some(game) => game,
        None => detect_game(chunk_data)?,
    };
    let types = GameTypes::new(game)?;
    let decoded = decode_path(chunk_data, &types)?;

    let mut tlvs = Vec::with_capacity(decoded.tlvs.len());
    for wrapper in &decoded.tlvs {
        tlvs.push(wrapper.to_entry(types.registry())?);
    }

    Ok(ExportedPath {
        document: PathDocument {
            schema_version: SCHEMA_VERSION,
            game,
            tlvs,
        },
        warnings: decoded.warnings,
    })
}

/// Build the edited wrapper list for one document: each entry reuses the
/// matching original record as template (same kind, same per-kind
/// occurrence in authored order) so untouched bytes survive, and entries
/// beyond the original set start from kind defaults.
fn wrappers_from_document(
    document: &PathDocument,
    decoded: &DecodedPath,
    types: &GameTypes,
) -> Result<Vec<TlvWrapper>, Error> {
    let mut occurrences: Vec<(&str, usize)> = Vec::new();
    let mut out = Vec::with_capacity(document.tlvs.len());

    for entry in &document.tlvs {
        let occurrence = match occurrences.iter_mut().find(|(k, _)| *k == entry.kind) {
            Some((_, count)) => {
                *count += 1;
                *count
            }
            None => {
                occurrences.push((&entry.kind, 0));
                0
            }
        };

        let template = decoded
            .tlvs
            .iter()
            .filter(|w| w.kind_name() == entry.kind)
            .nth(occurrence);

        let mut wrapper = match template {
            Some(wrapper) => wrapper.clone(),
            None => types
                .factory()
                .make_by_name(&entry.kind, None)?
                .ok_or_else(|| {
                    Error::field(entry.kind.clone(), "not a TLV kind of this game")
                })?,
        };
        wrapper.apply_entry(entry, types.registry())?;
        out.push(wrapper);
    }

    Ok(out)
}

/// Apply an edited document back onto a container. The returned bytes are a
/// complete archive; any validation failure aborts before anything is built.
pub fn import_path_from_json(
    document: &str,
    container: &[u8],
    path_id: u32,
    resource_sources: &[&[u8]],
    options: &ImportOptions,
) -> Result<Vec<u8>, Error> {
    let value: JsonValue =
        serde_json::from_str(document).map_err(|e| Error::MalformedDocument {
            message: e.to_string(),
        })?;
    let value = upgrade_document(value)?;
    let document: PathDocument =
        serde_json::from_value(value).map_err(|e| Error::MalformedDocument {
            message: e.to_string(),
        })?;

    let (lvl, bundle_name, bundle) = open_path_bundle(container, path_id)?;
    let chunk = bundle
        .chunk(FOURCC_PATH, path_id)
        .ok_or(Error::PathNotFound { path_id })?;

    let types = GameTypes::new(document.game)?;
    let decoded = decode_path(bundle.chunk_data(chunk), &types)?;
    let wrappers = wrappers_from_document(&document, &decoded, &types)?;

    let mut new_bundle = bundle.rewrite_chunk(
        FOURCC_PATH,
        path_id,
        &encode_path(&wrappers, &decoded),
    )?;

    if !options.skip_cameras_and_fg1 {
        new_bundle = substitute_resources(&new_bundle, resource_sources)?;
    }

    lvl.rewrite_file(&bundle_name, &new_bundle)
}

/// Replace camera and overlay chunks with same-addressed chunks from the
/// supplied source bundles. Blobs are moved verbatim, never interpreted.
fn substitute_resources(bundle_bytes: &[u8], sources: &[&[u8]]) -> Result<Vec<u8>, Error> {
    let mut out = bundle_bytes.to_vec();
    for source_bytes in sources {
        let source = PathBundle::parse(source_bytes)?;
        for chunk in source.chunks() {
            let fourcc = chunk.header.fourcc;
            if fourcc != FOURCC_BITS && fourcc != FOURCC_FG1 {
                continue;
            }
            let target = PathBundle::parse(&out)?;
            if target.chunk(fourcc, chunk.header.id).is_some() {
                out = target.rewrite_chunk(fourcc, chunk.header.id, source.chunk_data(chunk))?;
            }
        }
    }
    Ok(out)
}

/// Migrate a document to the current schema and pretty-print it. Applying
/// the upgrade to an already-current document returns it unchanged.
pub fn upgrade_path_json(document: &str) -> Result<String, Error> {
    let value: JsonValue =
        serde_json::from_str(document).map_err(|e| Error::MalformedDocument {
            message: e.to_string(),
        })?;
    let upgraded = upgrade_document(value)?;
    serde_json::to_string_pretty(&upgraded).map_err(|e| Error::MalformedDocument {
        message: e.to_string(),
    })
}

/// Reference document for one game: enum vocabularies, bounded-integer
/// ranges, and one default instance per TLV kind. Needs no input container.
pub fn schema_document(game: Game) -> Result<JsonValue, Error> {
    let types = GameTypes::new(game)?;
    let mut out = JsonMap::new();
    out.insert("apiVersion".into(), JsonValue::from(API_VERSION));
    out.insert("game".into(), JsonValue::from(game.as_str()));
    out.insert("enums".into(), types.registry().enums_to_document());
    out.insert(
        "basicTypes".into(),
        types.registry().bounded_ints_to_document(),
    );
    out.insert(
        "tlvs".into(),
        types.factory().defaults_document(types.registry())?,
    );
    Ok(JsonValue::Object(out))
}

#[cfg(test)]
mod tests {
    use super::{API_VERSION, ImportOptions, api_version, schema_document};
    use crate::games::Game;

    #[test]
    fn api_version_is_stable() {
        assert_eq!(api_version(), API_VERSION);
    }

    #[test]
    fn import_defaults_leave_resources_alone() {
        assert!(ImportOptions::default().skip_cameras_and_fg1);
    }

    #[test]
    fn schema_document_carries_all_sections() {
        for game in [Game::Ao, Game::Ae] {
            let doc = schema_document(game).unwrap();
            assert_eq!(doc["apiVersion"], API_VERSION);
            assert_eq!(doc["game"], game.as_str());
            assert!(!doc["enums"].as_array().unwrap().is_empty());
            assert!(!doc["basicTypes"].as_array().unwrap().is_empty());
            assert!(!doc["tlvs"].as_array().unwrap().is_empty());
        }
    }
}
