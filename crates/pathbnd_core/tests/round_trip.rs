//! End-to-end conversions over synthetic in-memory level containers.

use pathbnd_core::{
    Error, Game, ImportOptions, enumerate_paths, export_path_to_json, import_path_from_json,
    upgrade_path_json,
};
use serde_json::Value;

const SECTOR: usize = 2048;

fn tlv_record(tag: u32, rect: [i16; 4], payload: &[i16]) -> Vec<u8> {
    let length = 24 + payload.len() * 2;
    let mut out = Vec::new();
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&(length as u16).to_le_bytes());
    out.extend_from_slice(&tag.to_le_bytes());
    for v in rect {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out.extend_from_slice(&[0; 8]);
    for v in payload {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

fn path_chunk_data(records: &[Vec<u8>]) -> Vec<u8> {
    let data: Vec<u8> = records.concat();
    let mut out = Vec::new();
    out.extend_from_slice(&(records.len() as u32).to_le_bytes());
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(&[0; 8]);
    out.extend_from_slice(&data);
    out
}

fn chunk(fourcc: &[u8; 4], id: u32, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(fourcc);
    out.extend_from_slice(&id.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(data);
    out
}

fn bundle(chunks: &[Vec<u8>]) -> Vec<u8> {
    let mut out: Vec<u8> = chunks.concat();
    out.extend_from_slice(&chunk(b"End!", 0, b""));
    out
}

fn archive(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut out = vec![0u8; SECTOR];
    out[..4].copy_from_slice(&(files.len() as u32).to_le_bytes());

    let mut dir = 4;
    let mut offset = SECTOR;
    for (name, data) in files {
        out[dir..dir + name.len()].copy_from_slice(name.as_bytes());
        out[dir + 12..dir + 16].copy_from_slice(&(offset as u32).to_le_bytes());
        out[dir + 16..dir + 20].copy_from_slice(&(data.len() as u32).to_le_bytes());
        dir += 20;

        out.extend_from_slice(data);
        // Nonzero sector slack, as shipped containers carry.
        out.resize(out.len().div_ceil(SECTOR) * SECTOR, 0xCC);
        offset = out.len();
    }
    out
}

/// AO records: two ContinuePoints, an Edge, a Hoist, a Scrab, plus one
/// record with a tag no game knows.
fn ao_records_with_foreigner() -> Vec<Vec<u8>> {
    vec![
        tlv_record(0, [0, 0, 100, 100], &[0, 5]),
        tlv_record(3, [10, 0, 40, 8], &[2, 1, 0]),
        tlv_record(777, [0, 0, 0, 0], &[9, 9, 9, 9]),
        tlv_record(0, [100, 0, 200, 100], &[1, 6]),
        tlv_record(2, [50, 50, 60, 60], &[1, 0, 4, 1]),
        tlv_record(24, [0, 0, 0, 0], &[0, 30, 1, 1, 2, 3, 4, 25, 0, 1]),
    ]
}

fn ao_container() -> Vec<u8> {
    let bnd = bundle(&[
        chunk(b"Bits", 4, b"camera pixels"),
        chunk(b"Path", 4, &path_chunk_data(&ao_records_with_foreigner())),
        chunk(b"FG1 ", 4, b"overlay"),
    ]);
    archive(&[("R1.BND", &bnd), ("R1.VH", b"sound header bytes")])
}

#[test]
fn enumerate_reports_bundle_and_ids() {
    let container = ao_container();
    let paths = enumerate_paths(&container).unwrap();
    assert_eq!(paths.bundle_name.as_deref(), Some("R1.BND"));
    assert_eq!(paths.path_ids, [4]);
}

#[test]
fn enumerate_without_path_bundle_is_empty() {
    let container = archive(&[("R1.VH", b"sound header bytes")]);
    let paths = enumerate_paths(&container).unwrap();
    assert_eq!(paths.bundle_name, None);
    assert!(paths.path_ids.is_empty());
}

#[test]
fn export_decodes_known_records_and_warns_on_the_foreigner() {
    let container = ao_container();
    let exported = export_path_to_json(&container, 4, Some(Game::Ao)).unwrap();

    let kinds: Vec<&str> = exported
        .document
        .tlvs
        .iter()
        .map(|t| t.kind.as_str())
        .collect();
    assert_eq!(kinds, ["ContinuePoint", "Edge", "ContinuePoint", "Hoist", "Scrab"]);
    assert_eq!(exported.document.tlvs[2].instance, 1);

    assert_eq!(exported.warnings.len(), 1);
    assert_eq!(exported.warnings[0].tag, 777);
    assert_eq!(exported.warnings[0].array_index, 2);

    let edge = &exported.document.tlvs[1];
    assert_eq!(edge.fields["type"], "both");
    assert_eq!(edge.fields["can_grab"], "true");
    assert_eq!(edge.fields["x1"], 10);
}

#[test]
fn unedited_reimport_reproduces_the_container_exactly() {
    let container = ao_container();
    let exported = export_path_to_json(&container, 4, Some(Game::Ao)).unwrap();
    let json = serde_json::to_string(&exported.document).unwrap();

    let out = import_path_from_json(&json, &container, 4, &[], &ImportOptions::default()).unwrap();
    assert_eq!(out, container);
}

#[test]
fn deleting_an_entry_keeps_the_output_importable() {
    let container = ao_container();
    let mut exported = export_path_to_json(&container, 4, Some(Game::Ao)).unwrap();
    exported.document.tlvs.remove(1);
    let json = serde_json::to_string(&exported.document).unwrap();

    let out = import_path_from_json(&json, &container, 4, &[], &ImportOptions::default()).unwrap();

    let reexported = export_path_to_json(&out, 4, Some(Game::Ao)).unwrap();
    let kinds: Vec<&str> = reexported
        .document
        .tlvs
        .iter()
        .map(|t| t.kind.as_str())
        .collect();
    assert_eq!(kinds, ["ContinuePoint", "ContinuePoint", "Hoist", "Scrab"]);
    assert_eq!(reexported.warnings.len(), 1);
    assert_eq!(reexported.warnings[0].tag, 777);
}

#[test]
fn edit_touches_only_the_path_chunk() {
    let container = ao_container();
    let mut exported = export_path_to_json(&container, 4, Some(Game::Ao)).unwrap();
    exported.document.tlvs[4]
        .fields
        .insert("attack_delay".into(), 31.into());
    let json = serde_json::to_string(&exported.document).unwrap();

    let out = import_path_from_json(&json, &container, 4, &[], &ImportOptions::default()).unwrap();
    assert_ne!(out, container);
    assert_eq!(out.len(), container.len());

    // Second archive file untouched.
    assert_eq!(out[2 * SECTOR..], container[2 * SECTOR..]);

    let reexported = export_path_to_json(&out, 4, Some(Game::Ao)).unwrap();
    assert_eq!(reexported.document.tlvs[4].fields["attack_delay"], 31);
    assert_eq!(reexported.warnings.len(), 1);
}

#[test]
fn out_of_range_edit_aborts_with_the_field_named() {
    let container = ao_container();
    let mut exported = export_path_to_json(&container, 4, Some(Game::Ao)).unwrap();
    exported.document.tlvs[0]
        .fields
        .insert("scale".into(), "triple".into());
    let json = serde_json::to_string(&exported.document).unwrap();

    let err =
        import_path_from_json(&json, &container, 4, &[], &ImportOptions::default()).unwrap_err();
    match err {
        Error::FieldValidation { field, .. } => assert_eq!(field, "ContinuePoint.scale"),
        other => panic!("expected FieldValidation, got {other:?}"),
    }
}

#[test]
fn missing_path_id_is_reported() {
    let container = ao_container();
    let err = export_path_to_json(&container, 9, Some(Game::Ao)).unwrap_err();
    assert!(matches!(err, Error::PathNotFound { path_id: 9 }));
}

#[test]
fn game_is_detected_from_variant_specific_tags() {
    // Edge (tag 3) exists only in the AO vocabulary.
    let container = ao_container();
    let exported = export_path_to_json(&container, 4, None).unwrap();
    assert_eq!(exported.document.game, Game::Ao);
}

#[test]
fn shared_tags_alone_are_ambiguous() {
    let bnd = bundle(&[chunk(
        b"Path",
        1,
        &path_chunk_data(&[tlv_record(0, [0, 0, 0, 0], &[0, 1])]),
    )]);
    let container = archive(&[("R1.BND", &bnd)]);

    let err = export_path_to_json(&container, 1, None).unwrap_err();
    assert!(matches!(err, Error::GameDetectionAmbiguous { .. }));
    assert!(export_path_to_json(&container, 1, Some(Game::Ae)).is_ok());
}

#[test]
fn resource_sources_replace_camera_chunks_verbatim() {
    let container = ao_container();
    let exported = export_path_to_json(&container, 4, Some(Game::Ao)).unwrap();
    let json = serde_json::to_string(&exported.document).unwrap();

    let source = bundle(&[chunk(b"Bits", 4, b"fresh camera"), chunk(b"Bits", 9, b"??")]);
    let options = ImportOptions {
        skip_cameras_and_fg1: false,
    };
    let out = import_path_from_json(&json, &container, 4, &[&source], &options).unwrap();

    let window: &[u8] = b"fresh camera";
    assert!(out.windows(window.len()).any(|w| w == window));
    assert!(!out.windows(13).any(|w| w == b"camera pixels"));
}

#[test]
fn v1_documents_upgrade_then_import() {
    let container = ao_container();
    let exported = export_path_to_json(&container, 4, Some(Game::Ao)).unwrap();

    // Rewind the document to schema v1: no instance fields.
    let mut value = serde_json::to_value(&exported.document).unwrap();
    value["schemaVersion"] = 1.into();
    for entry in value["tlvs"].as_array_mut().unwrap() {
        entry.as_object_mut().unwrap().remove("instance");
    }
    let v1_json = serde_json::to_string(&value).unwrap();

    let upgraded = upgrade_path_json(&v1_json).unwrap();
    let parsed: Value = serde_json::from_str(&upgraded).unwrap();
    assert_eq!(parsed["schemaVersion"], 2);
    assert_eq!(parsed["tlvs"][2]["instance"], 1);

    let out =
        import_path_from_json(&v1_json, &container, 4, &[], &ImportOptions::default()).unwrap();
    assert_eq!(out, container);
}

#[test]
fn junk_document_is_rejected_before_any_decoding() {
    let container = ao_container();
    let err = import_path_from_json("{not json", &container, 4, &[], &ImportOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::MalformedDocument { .. }));

    let err = import_path_from_json(
        r#"{"schemaVersion": 2, "game": "AO", "tlvs": [], "extra": 1}"#,
        &container,
        4,
        &[],
        &ImportOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::MalformedDocument { .. }));
}
