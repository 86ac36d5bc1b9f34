//! Roadmap CLI
//!
//! Command-line access to a roadmap snapshot (the JSON dump of the row
//! store's tables):
//! - `roadmaps`: list roadmaps, newest first
//! - `flow <slug>`: render-ordered canvas nodes and edges
//! - `validate <slug>`: integrity audit of the stored graph
//! - `progress <slug>`: show, toggle or reset a viewer's completion

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod commands;

use anyhow::Result;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use commands::{ProgressAction, Sources};
use roadmap_model::NodeId;
use roadmap_progress::ViewerKey;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Command-line definition
#[must_use]
pub fn cli() -> Command {
    Command::new("roadmap")
        .version(VERSION)
        .about("Inspect roadmap graphs and track progress")
        .subcommand_required(true)
        .arg(
            Arg::new("snapshot")
                .long("snapshot")
                .short('s')
                .global(true)
                .default_value("roadmap.json")
                .value_parser(value_parser!(PathBuf))
                .help("JSON snapshot of the roadmap tables"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("progress-dir")
                .long("progress-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Directory holding progress records"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("roadmaps").about("List roadmaps").arg(
                Arg::new("published")
                    .long("published")
                    .action(ArgAction::SetTrue)
                    .help("Only published roadmaps"),
            ),
        )
        .subcommand(
            Command::new("flow")
                .about("Print canvas nodes and edges of a roadmap")
                .arg(Arg::new("slug").required(true)),
        )
        .subcommand(
            Command::new("validate")
                .about("Audit a stored roadmap for integrity problems")
                .arg(Arg::new("slug").required(true)),
        )
        .subcommand(
            Command::new("progress")
                .about("Show or change a viewer's progress on a roadmap")
                .arg(Arg::new("slug").required(true))
                .arg(
                    Arg::new("viewer")
                        .long("viewer")
                        .help("User id; anonymous when omitted"),
                )
                .arg(
                    Arg::new("toggle")
                        .long("toggle")
                        .value_name("NODE_ID")
                        .conflicts_with("reset")
                        .help("Flip completion of a node"),
                )
                .arg(
                    Arg::new("reset")
                        .long("reset")
                        .action(ArgAction::SetTrue)
                        .help("Clear progress on this roadmap"),
                ),
        )
}

/// Install the global subscriber; `RUST_LOG` overrides the `info` default
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    // Ignore a subscriber installed earlier (tests run many commands).
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

fn sources(matches: &ArgMatches) -> Sources {
    let snapshot = matches
        .get_one::<PathBuf>("snapshot")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("roadmap.json"));
    let mut sources = Sources::new(snapshot);
    if let Some(path) = matches.get_one::<PathBuf>("config") {
        sources = sources.with_config(path);
    }
    if let Some(dir) = matches.get_one::<PathBuf>("progress-dir") {
        sources = sources.with_progress_dir(dir);
    }
    sources
}

fn slug(args: &ArgMatches) -> Result<&str> {
    args.get_one::<String>("slug")
        .map(String::as_str)
        .ok_or_else(|| anyhow::anyhow!("missing roadmap slug"))
}

/// Run the parsed command, returning its JSON output
pub async fn run(matches: &ArgMatches) -> Result<serde_json::Value> {
    let service = sources(matches).open()?;

    let output = match matches.subcommand() {
        Some(("roadmaps", args)) => {
            serde_json::to_value(commands::list_roadmaps(&service, args.get_flag("published")).await?)?
        }
        Some(("flow", args)) => serde_json::to_value(commands::flow(&service, slug(args)?).await?)?,
        Some(("validate", args)) => {
            serde_json::to_value(commands::validate(&service, slug(args)?).await?)?
        }
        Some(("progress", args)) => {
            let viewer = ViewerKey::from_user_id(args.get_one::<String>("viewer").map(String::as_str));
            let action = if let Some(node) = args.get_one::<String>("toggle") {
                ProgressAction::Toggle(NodeId::from(node.as_str()))
            } else if args.get_flag("reset") {
                ProgressAction::Reset
            } else {
                ProgressAction::Show
            };
            serde_json::to_value(commands::progress(&service, slug(args)?, viewer, action).await?)?
        }
        Some((other, _)) => anyhow::bail!("unknown command '{other}'"),
        None => anyhow::bail!("no command given"),
    };
    Ok(output)
}
