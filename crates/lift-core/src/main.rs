//! `lift-sim`: replay a JSON action script against a workout session
//!
//! `simulate` prints a text report, `summary` prints the final workout
//! summary (as JSON with `--json`).

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use lift_core::logging::init_tracing;
use lift_core::sim::{run_simulator, Script};
use lift_core::WorkoutConfig;
use std::path::Path;

fn main() -> anyhow::Result<()> {
    let script_arg = Arg::new("script")
        .long("script")
        .required(true)
        .help("Path to a JSON action script");
    let config_arg = Arg::new("config")
        .long("config")
        .help("Path to a TOML workout config");

    let cli = Command::new("lift-sim")
        .version(lift_core::VERSION)
        .about("Replay scripted workouts against the session store")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("simulate")
                .about("Run a script and print the report")
                .arg(script_arg.clone())
                .arg(config_arg.clone()),
        )
        .subcommand(
            Command::new("summary")
                .about("Run a script and print only the final workout")
                .arg(script_arg)
                .arg(config_arg)
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        );

    let matches = cli.get_matches();

    match matches.subcommand() {
        Some(("simulate", args)) => {
            let (script, config) = load(args)?;
            let report = run_simulator(&script, &config)?;
            print!("{}", report.generate_text());
        }
        Some(("summary", args)) => {
            let (script, config) = load(args)?;
            let report = run_simulator(&script, &config)?;
            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&report.summary)?);
            } else {
                let s = &report.summary;
                println!(
                    "{}: {}s, {} sets, volume {:.1}",
                    s.name, s.duration_secs, s.stats.completed_sets, s.stats.total_volume
                );
            }
        }
        _ => anyhow::bail!("unknown subcommand"),
    }

    Ok(())
}

fn load(args: &ArgMatches) -> anyhow::Result<(Script, WorkoutConfig)> {
    let config = match args.get_one::<String>("config") {
        Some(path) => {
            let raw = std::fs::read_to_string(path).with_context(|| format!("reading config {path}"))?;
            WorkoutConfig::from_toml_str(&raw)?
        }
        None => WorkoutConfig::default(),
    };
    init_tracing(&config);

    let path = args
        .get_one::<String>("script")
        .context("missing --script")?;
    let raw = std::fs::read_to_string(Path::new(path)).with_context(|| format!("reading script {path}"))?;
    let script = Script::from_json_str(&raw)?;
    tracing::debug!(steps = script.steps.len(), "script loaded");
    Ok((script, config))
}
