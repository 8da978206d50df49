//! Round-trip editor core for AO/AE path resources: sector archive and
//! chunked bundle codecs, per-game TLV vocabularies, and a versioned JSON
//! export/import pipeline with byte-exact partial-rewrite guarantees.

pub mod ae;
pub mod ao;
pub mod api;
pub mod bnd;
pub mod document;
pub mod error;
pub mod factory;
pub mod games;
pub mod lvl;
pub mod path;
pub mod reader;
pub mod registry;
pub mod tlv;

pub use api::{
    API_VERSION, EnumeratedPaths, ExportedPath, ImportOptions, api_version, enumerate_paths,
    export_path_to_json, import_path_from_json, schema_document, upgrade_path_json,
};
pub use document::{PathDocument, SCHEMA_VERSION, TlvEntry};
pub use error::Error;
pub use factory::DecodeWarning;
pub use games::{Game, GameTypes};
