/*!
Lutris package removal hook

Drops the AppArmor user namespace profile shipped with the package and flags
the host for a reboot so the kernel unloads it.
*/

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Arg, ArgAction, Command};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::core::hook::{Outcome, RemovalHook, create_default_hook, create_hook_from_config_file};

mod core;

fn cli() -> Command {
    Command::new("lutris-postrm")
        .version(clap::crate_version!())
        .about("Removes the Lutris AppArmor user namespace profile on package removal")
        .arg(
            Arg::new("action")
                .help("Maintainer script action passed by the package manager (remove, purge, upgrade, ...)")
                .value_name("ACTION"),
        )
        .arg(
            Arg::new("args")
                .help("Additional arguments passed by the package manager")
                .value_name("ARGS")
                .num_args(0..)
                .trailing_var_arg(true)
                .allow_hyphen_values(true),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("TOML file overriding the built-in paths")
                .value_name("PATH")
                .env("LUTRIS_POSTRM_CONFIG"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the outcome as JSON on stdout")
                .action(ArgAction::SetTrue),
        )
}

fn build_hook(config_path: Option<&PathBuf>) -> anyhow::Result<RemovalHook> {
    match config_path {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            create_hook_from_config_file(path)
        }
        None => Ok(create_default_hook()),
    }
}

fn describe(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::SkippedNoFeature => "skipped: AppArmor user namespace restriction not in use",
        Outcome::SkippedOverridden => "skipped: administrator override present",
        Outcome::Removed { .. } => "removed: profiles deleted, reboot required",
    }
}

fn run(matches: &clap::ArgMatches) -> anyhow::Result<Outcome> {
    let action = matches
        .get_one::<String>("action")
        .map(String::as_str)
        .unwrap_or("remove");
    let extra: Vec<&String> = matches
        .get_many::<String>("args")
        .map(|values| values.collect())
        .unwrap_or_default();
    info!("Running removal hook (action: {}, args: {:?})", action, extra);

    let config_path = matches.get_one::<String>("config").map(PathBuf::from);
    let mut hook = build_hook(config_path.as_ref())?;
    let outcome = hook.run()?;
    info!("{}", describe(&outcome));
    Ok(outcome)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let matches = cli().get_matches();
    let json = matches.get_flag("json");

    match run(&matches) {
        Ok(outcome) => {
            if json {
                match serde_json::to_string_pretty(&outcome) {
                    Ok(out) => println!("{}", out),
                    Err(e) => error!("Failed to serialize outcome: {}", e),
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Removal hook failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
