#![warn(missing_docs)]
//! The `gnmi-path` CLI.
//!
//! Inspect how telemetry paths are parsed and how they turn into metric
//! names and tags.
//!
//! ```shell
//! gnmi-path parse '/interfaces/interface[name=eth0]/state/counters'
//! gnmi-path parse --origin DME '/sys/intf/phys-[eth1/1]'
//! gnmi-path render --config gnmi.yaml --prefix 'openconfig:/interfaces' /interface/state
//! gnmi-path aliases --config gnmi.yaml
//! ```
//!
//! Every command prints pretty JSON on stdout. Logging goes to stderr and
//! is controlled by `RUST_LOG` and `--structured`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gnmi_path::config::{AliasTable, RenderConfig};
use gnmi_path::{parse_path, PathRenderer, RenderedPath, TagSink};
use gnmi_path_trace::Output;
use serde::Serialize;

/// Describes all the possible CLI arguments for `gnmi-path`
#[derive(Debug, Parser)]
#[command(version, about = "Parse and render gNMI telemetry paths")]
pub struct Opt {
    /// Kind of log output written to stderr: Log, Compact, Json or None.
    #[arg(long, default_value = "Log")]
    pub structured: Output,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// `gnmi-path` subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse a path and print its elements.
    Parse {
        /// Origin of the path. `DME` selects the DME dialect.
        #[arg(long)]
        origin: Option<String>,

        /// Target recorded on the parsed path.
        #[arg(long)]
        target: Option<String>,

        /// The path to parse, e.g. `/interfaces/interface[name=eth0]`
        path: String,
    },

    /// Render a path into a metric identifier and tags.
    Render {
        /// Origin of the path. `DME` selects the DME dialect.
        #[arg(long)]
        origin: Option<String>,

        /// Identifier the rendered path is appended to, usually the
        /// rendered notification prefix.
        #[arg(long, default_value = "")]
        prefix: String,

        /// YAML config whose subscriptions and aliases are checked for a
        /// matching alias path.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Skip collecting key attributes as tags.
        #[arg(long)]
        no_tags: bool,

        /// The path to render
        path: String,
    },

    /// Print the alias table built from a config file.
    Aliases {
        /// YAML config to read
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Debug, Serialize)]
struct RenderOutput {
    #[serde(flatten)]
    rendered: RenderedPath,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<BTreeMap<String, String>>,
}

impl Opt {
    /// Run this command, returning what should be printed.
    pub fn run(self) -> anyhow::Result<String> {
        self.command.run()
    }
}

impl Command {
    /// Run this command, returning what should be printed.
    pub fn run(self) -> anyhow::Result<String> {
        match self {
            Self::Parse {
                origin,
                target,
                path,
            } => {
                let path = parse_path(origin.as_deref(), &path, target.as_deref())?;
                Ok(serde_json::to_string_pretty(&path)?)
            }
            Self::Render {
                origin,
                prefix,
                config,
                no_tags,
                path,
            } => {
                let aliases = match config {
                    Some(config) => load_aliases(&config)?,
                    None => AliasTable::new(),
                };
                let path = parse_path(origin.as_deref(), &path, None)?;

                let mut tags: BTreeMap<String, String> = BTreeMap::new();
                let sink: Option<&mut dyn TagSink> = if no_tags { None } else { Some(&mut tags) };
                let rendered = PathRenderer::new(&prefix)
                    .with_aliases(&aliases)
                    .render(&path, sink);

                let out = RenderOutput {
                    rendered,
                    tags: (!no_tags).then_some(tags),
                };
                Ok(serde_json::to_string_pretty(&out)?)
            }
            Self::Aliases { config } => Ok(serde_json::to_string_pretty(&load_aliases(&config)?)?),
        }
    }
}

fn load_aliases(config: &std::path::Path) -> anyhow::Result<AliasTable> {
    let table = RenderConfig::load_yaml(config)?.alias_table()?;
    tracing::debug!(config = %config.display(), aliases = table.len(), "loaded aliases");
    Ok(table)
}
