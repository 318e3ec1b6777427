use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use tracing::error;
use tracing_subscriber::EnvFilter;

use learnset_snapshot::{run, RunOptions, SnapshotConfig};

fn build_cli() -> Command {
    Command::new("learnset-snapshot")
        .about("Regenerate a generation-filtered learnset snapshot from the full learnset database")
        .arg(
            Arg::new("config")
                .long("config")
                .value_parser(value_parser!(PathBuf))
                .help("RON config file; flags override its values"),
        )
        .arg(
            Arg::new("database")
                .long("database")
                .value_parser(value_parser!(PathBuf))
                .help("Full learnset database (JSON)"),
        )
        .arg(
            Arg::new("species")
                .long("species")
                .value_parser(value_parser!(PathBuf))
                .help("Species metadata (RON)"),
        )
        .arg(
            Arg::new("prior")
                .long("prior")
                .value_parser(value_parser!(PathBuf))
                .help("Previously generated snapshot"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .value_parser(value_parser!(PathBuf))
                .help("Output path (default: the prior snapshot path)"),
        )
        .arg(
            Arg::new("generation")
                .long("generation")
                .value_parser(value_parser!(u8))
                .help("Generation digit the snapshot is restricted to"),
        )
        .arg(
            Arg::new("export-name")
                .long("export-name")
                .help("Name of the exported mapping literal"),
        )
        .arg(
            Arg::new("force")
                .long("force")
                .action(ArgAction::SetTrue)
                .help("Regenerate even if the output is up to date"),
        )
}

fn load_config(matches: &ArgMatches) -> Result<SnapshotConfig, learnset_snapshot::ConfigError> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => SnapshotConfig::from_file(path)?,
        None => SnapshotConfig::default(),
    };

    if let Some(path) = matches.get_one::<PathBuf>("database") {
        config.database = path.clone();
    }
    if let Some(path) = matches.get_one::<PathBuf>("species") {
        config.species = path.clone();
    }
    if let Some(path) = matches.get_one::<PathBuf>("prior") {
        config.prior = path.clone();
    }
    if let Some(path) = matches.get_one::<PathBuf>("output") {
        config.output = Some(path.clone());
    }
    if let Some(generation) = matches.get_one::<u8>("generation") {
        config.generation = *generation;
    }
    if let Some(name) = matches.get_one::<String>("export-name") {
        config.export_name = name.clone();
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let matches = build_cli().get_matches();
    let config = match load_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            println!("Error loading configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let options = RunOptions {
        force: matches.get_flag("force"),
        script: std::env::current_exe().ok(),
    };

    match run(&config, &options).await {
        Ok(outcome) => {
            println!("{}: {}", outcome.status_line(), display_path(config.output_path()));
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = ?e, "snapshot run failed");
            println!("Error generating {}: {}", display_path(config.output_path()), e);
            ExitCode::FAILURE
        }
    }
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}
