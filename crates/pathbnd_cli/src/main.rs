use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use pathbnd_core::{
    Game as CoreGame, ImportOptions, api_version, enumerate_paths, export_path_to_json,
    import_path_from_json, schema_document, upgrade_path_json,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum GameArg {
    Ao,
    Ae,
}

fn to_core_game(game: GameArg) -> CoreGame {
    match game {
        GameArg::Ao => CoreGame::Ao,
        GameArg::Ae => CoreGame::Ae,
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the path ids a level container offers.
    Enumerate {
        #[arg(value_name = "LEVEL.LVL")]
        container: PathBuf,
    },
    /// Export one path to a JSON document.
    Export {
        #[arg(value_name = "LEVEL.LVL")]
        container: PathBuf,
        #[arg(long = "path-id")]
        path_id: u32,
        /// Game variant; auto-detected from the data when omitted.
        #[arg(long)]
        game: Option<GameArg>,
        #[arg(long, value_name = "OUT.JSON")]
        output: Option<PathBuf>,
    },
    /// Apply an edited JSON document back onto a level container.
    Import {
        #[arg(value_name = "DOC.JSON")]
        document: PathBuf,
        #[arg(value_name = "LEVEL.LVL")]
        container: PathBuf,
        #[arg(long = "path-id")]
        path_id: u32,
        #[arg(long, value_name = "OUT.LVL")]
        output: PathBuf,
        /// Substitute camera and overlay chunks from these bundles.
        #[arg(long = "resource", value_name = "RES.BND")]
        resources: Vec<PathBuf>,
    },
    /// Migrate a JSON document to the current schema version.
    Upgrade {
        #[arg(value_name = "DOC.JSON")]
        document: PathBuf,
        #[arg(long, value_name = "OUT.JSON")]
        output: Option<PathBuf>,
    },
    /// Print the type reference document for a game.
    Schema {
        #[arg(long)]
        game: GameArg,
    },
    /// Print the conversion API version.
    Version,
}

fn read_file(path: &PathBuf) -> Vec<u8> {
    fs::read(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", path.display());
        process::exit(1);
    })
}

fn read_text(path: &PathBuf) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", path.display());
        process::exit(1);
    })
}

fn write_output(path: &PathBuf, bytes: &[u8]) {
    fs::write(path, bytes).unwrap_or_else(|e| {
        eprintln!("Error writing {}: {e}", path.display());
        process::exit(1);
    });
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Enumerate { container } => {
            let bytes = read_file(&container);
            let paths = enumerate_paths(&bytes).unwrap_or_else(|e| {
                eprintln!("Error reading container: {e}");
                process::exit(1);
            });
            match paths.bundle_name {
                Some(name) => {
                    println!("{name}");
                    for id in paths.path_ids {
                        println!("  path {id}");
                    }
                }
                None => println!("no path bundle found"),
            }
        }
        Command::Export {
            container,
            path_id,
            game,
            output,
        } => {
            let bytes = read_file(&container);
            let exported = export_path_to_json(&bytes, path_id, game.map(to_core_game))
                .unwrap_or_else(|e| {
                    eprintln!("Error exporting path {path_id}: {e}");
                    process::exit(1);
                });
            for warning in &exported.warnings {
                eprintln!(
                    "warning: record {}: {}",
                    warning.array_index, warning.message
                );
            }
            let json = serde_json::to_string_pretty(&exported.document).unwrap_or_else(|e| {
                eprintln!("Error serializing document: {e}");
                process::exit(1);
            });
            match output {
                Some(path) => write_output(&path, json.as_bytes()),
                None => println!("{json}"),
            }
        }
        Command::Import {
            document,
            container,
            path_id,
            output,
            resources,
        } => {
            let text = read_text(&document);
            let bytes = read_file(&container);
            let resource_bytes: Vec<Vec<u8>> = resources.iter().map(read_file).collect();
            let sources: Vec<&[u8]> = resource_bytes.iter().map(Vec::as_slice).collect();
            let options = ImportOptions {
                skip_cameras_and_fg1: resources.is_empty(),
            };

            let out = import_path_from_json(&text, &bytes, path_id, &sources, &options)
                .unwrap_or_else(|e| {
                    eprintln!("Error importing path {path_id}: {e}");
                    process::exit(1);
                });
            write_output(&output, &out);
        }
        Command::Upgrade { document, output } => {
            let text = read_text(&document);
            let upgraded = upgrade_path_json(&text).unwrap_or_else(|e| {
                eprintln!("Error upgrading document: {e}");
                process::exit(1);
            });
            match output {
                Some(path) => write_output(&path, upgraded.as_bytes()),
                None => println!("{upgraded}"),
            }
        }
        Command::Schema { game } => {
            let doc = schema_document(to_core_game(game)).unwrap_or_else(|e| {
                eprintln!("Error building schema document: {e}");
                process::exit(1);
            });
            match serde_json::to_string_pretty(&doc) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("Error serializing schema: {e}");
                    process::exit(1);
                }
            }
        }
        Command::Version => println!("{}", api_version()),
    }
}
