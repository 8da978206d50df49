use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::Value;

const SECTOR: usize = 2048;

fn tlv_record(tag: u32, payload: &[i16]) -> Vec<u8> {
    let length = 24 + payload.len() * 2;
    let mut out = Vec::new();
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&(length as u16).to_le_bytes());
    out.extend_from_slice(&tag.to_le_bytes());
    out.extend_from_slice(&[0; 16]);
    for v in payload {
        out.extend_from_slice(&v.to_le_bytes());
    }
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

fn test_container() -> Vec<u8> {
    // One path chunk holding a single AO Edge record.
    let records = [tlv_record(3, &[0, 1, 0])];
    let data: Vec<u8> = records.concat();
    let mut path_data = Vec::new();
    path_data.extend_from_slice(&1u32.to_le_bytes());
    path_data.extend_from_slice(&(data.len() as u32).to_le_bytes());
    path_data.extend_from_slice(&[0; 8]);
    path_data.extend_from_slice(&data);

    let mut bnd = chunk(b"Path", 4, &path_data);
    bnd.extend_from_slice(&chunk(b"End!", 0, b""));

    let mut out = vec![0u8; SECTOR];
    out[..4].copy_from_slice(&1u32.to_le_bytes());
    out[4..10].copy_from_slice(b"R1.BND");
    out[16..20].copy_from_slice(&(SECTOR as u32).to_le_bytes());
    out[20..24].copy_from_slice(&(bnd.len() as u32).to_le_bytes());
    out.extend_from_slice(&bnd);
    out.resize(2 * SECTOR, 0);
    out
}

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pathbnd"))
        .args(args)
        .output()
        .expect("failed to run pathbnd CLI")
}

fn scratch_file(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("pathbnd-{}-{name}", std::process::id()))
}

#[test]
fn version_prints_the_api_version() {
    let output = run_cli(&["version"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "1");
}

#[test]
fn enumerate_lists_the_path_bundle() {
    let lvl = scratch_file("enum.lvl");
    fs::write(&lvl, test_container()).unwrap();

    let output = run_cli(&["enumerate", lvl.to_str().unwrap()]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, ["R1.BND", "  path 4"]);
}

#[test]
fn export_then_import_round_trips_through_files() {
    let container = test_container();
    let lvl = scratch_file("rt.lvl");
    let json = scratch_file("rt.json");
    let out = scratch_file("rt-out.lvl");
    fs::write(&lvl, &container).unwrap();

    let export = run_cli(&[
        "export",
        lvl.to_str().unwrap(),
        "--path-id",
        "4",
        "--game",
        "ao",
        "--output",
        json.to_str().unwrap(),
    ]);
    assert!(export.status.success());

    let document: Value = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(document["game"], "AO");
    assert_eq!(document["tlvs"][0]["type"], "Edge");
    assert_eq!(document["tlvs"][0]["can_grab"], Value::Null);
    assert_eq!(document["tlvs"][0]["fields"]["can_grab"], "true");

    let import = run_cli(&[
        "import",
        json.to_str().unwrap(),
        lvl.to_str().unwrap(),
        "--path-id",
        "4",
        "--output",
        out.to_str().unwrap(),
    ]);
    assert!(import.status.success());
    assert_eq!(fs::read(&out).unwrap(), container);
}

#[test]
fn missing_path_id_fails_with_a_message() {
    let lvl = scratch_file("miss.lvl");
    fs::write(&lvl, test_container()).unwrap();

    let output = run_cli(&["export", lvl.to_str().unwrap(), "--path-id", "9"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("path id 9 not found"));
}
