use std::env;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use tracker::{EntityKind, MarkerKind};
use tracker_cli::{run, CommandKind, DATA_DIR_ENV_VAR};

fn main() -> ExitCode {
    init_tracing();
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn run_cli() -> Result<(), String> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    if args.is_empty() {
        return Err(usage_text());
    }
    if args[0] == "-h" || args[0] == "--help" {
        print_usage();
        return Ok(());
    }

    let mut data_dir: Option<PathBuf> = None;
    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "--data-dir" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "missing value for --data-dir".to_string())?;
                data_dir = Some(PathBuf::from(value));
                index += 2;
            }
            _ => break,
        }
    }

    let data_dir = match data_dir {
        Some(dir) => dir,
        None => resolve_data_dir_from_env()?,
    };

    let command = args
        .get(index)
        .ok_or_else(|| "missing subcommand".to_string())?
        .as_str();
    let command_args = &args[(index + 1)..];

    let kind = match command {
        "compare" => {
            let (entity_kind, id) = parse_entity_args("compare", command_args)?;
            CommandKind::Compare {
                kind: entity_kind,
                id,
            }
        }
        "flag" => {
            let (entity_kind, id) = parse_entity_args("flag", command_args)?;
            CommandKind::Flag {
                kind: entity_kind,
                id,
            }
        }
        "compare-marker" => {
            let (map_id, marker_id, marker_kind) =
                parse_marker_args("compare-marker", command_args)?;
            CommandKind::CompareMarker {
                map_id,
                marker_id,
                kind: marker_kind,
            }
        }
        "flag-marker" => {
            let (map_id, marker_id, marker_kind) =
                parse_marker_args("flag-marker", command_args)?;
            CommandKind::FlagMarker {
                map_id,
                marker_id,
                kind: marker_kind,
            }
        }
        other => return Err(format!("unknown subcommand '{other}'\n\n{}", usage_text())),
    };

    let mut stdout = io::stdout();
    run(kind, &data_dir, &mut stdout)
}

fn parse_entity_args(command: &str, args: &[String]) -> Result<(EntityKind, String), String> {
    let [kind, id] = args else {
        return Err(format!("{command} takes exactly <kind> <id>"));
    };
    let entity_kind = EntityKind::parse(kind).ok_or_else(|| {
        format!("unknown entity kind '{kind}' (expected character|item|dialog|quest)")
    })?;
    Ok((entity_kind, id.clone()))
}

fn parse_marker_args(
    command: &str,
    args: &[String],
) -> Result<(String, String, MarkerKind), String> {
    let [map_id, marker_id, kind] = args else {
        return Err(format!(
            "{command} takes exactly <map-id> <marker-id> <marker-kind>"
        ));
    };
    let marker_kind = MarkerKind::parse(kind).ok_or_else(|| {
        format!("unknown marker kind '{kind}' (expected npc|item|map_change|quest)")
    })?;
    Ok((map_id.clone(), marker_id.clone(), marker_kind))
}

fn resolve_data_dir_from_env() -> Result<PathBuf, String> {
    match env::var(DATA_DIR_ENV_VAR) {
        Ok(value) if !value.trim().is_empty() => Ok(PathBuf::from(value)),
        _ => Err(format!(
            "no data directory: pass --data-dir or set {DATA_DIR_ENV_VAR}"
        )),
    }
}

fn usage_text() -> String {
    [
        "usage: tracker_cli [--data-dir <path>] <subcommand>",
        "",
        "subcommands:",
        "  compare <kind> <id>                          show drift since last implementation",
        "  flag <kind> <id>                             flag an entity as implemented",
        "  compare-marker <map-id> <marker-id> <kind>   show drift for one map marker",
        "  flag-marker <map-id> <marker-id> <kind>      flag a map marker as implemented",
        "",
        "entity kinds: character item dialog quest",
        "marker kinds: npc item map_change quest",
        "",
        concat!(
            "the data directory holds one JSON document per entity; ",
            "set TRACKER_DATA_DIR to avoid passing --data-dir"
        ),
    ]
    .join("\n")
}

fn print_usage() {
    println!("{}", usage_text());
}
