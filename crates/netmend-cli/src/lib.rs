//! netmend CLI library: exposes CLI parsing and execution for reuse in
//! tests and integrations
//!
//! All file I/O lives here; the engine itself only ever sees text.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use netmend_core::{
    parse_tag_rules, rollback, unified_diff, Config, Platform, RemediationWorkflow, UnionReport,
};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "netmend")]
#[command(about = "Network configuration remediation tool")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute the edits transitioning a running config into a generated one
    Remediate {
        /// Device platform, e.g. cisco_ios or juniper_junos
        #[arg(short, long)]
        platform: String,
        /// Path to the running configuration
        running: PathBuf,
        /// Path to the generated (target) configuration
        generated: PathBuf,
        /// YAML tag-rule file applied to the remediation before filtering
        #[arg(long)]
        tag_rules: Option<PathBuf>,
        /// Emit only lines tagged with any of these tags
        #[arg(long)]
        include: Vec<String>,
        /// Suppress lines tagged with any of these tags
        #[arg(long)]
        exclude: Vec<String>,
    },
    /// Compute the inverse edit set (running and generated swapped)
    Rollback {
        /// Device platform
        #[arg(short, long)]
        platform: String,
        /// Path to the running configuration
        running: PathBuf,
        /// Path to the generated (target) configuration
        generated: PathBuf,
    },
    /// Tree-aware unified diff between two configurations
    Diff {
        /// Device platform
        #[arg(short, long)]
        platform: String,
        /// Left-hand configuration
        left: PathBuf,
        /// Right-hand configuration
        right: PathBuf,
    },
    /// Parse and re-render a configuration in canonical form
    Render {
        /// Device platform
        #[arg(short, long)]
        platform: String,
        /// Path to the configuration
        config: PathBuf,
    },
    /// Render only the subtrees selected by tag rules
    Filter {
        /// Device platform
        #[arg(short, long)]
        platform: String,
        /// Path to the configuration
        config: PathBuf,
        /// YAML tag-rule file
        #[arg(long)]
        tag_rules: PathBuf,
        /// Emit only lines tagged with any of these tags
        #[arg(long)]
        include: Vec<String>,
        /// Suppress lines tagged with any of these tags
        #[arg(long)]
        exclude: Vec<String>,
    },
    /// Dump the parsed tree as JSON
    Dump {
        /// Device platform
        #[arg(short, long)]
        platform: String,
        /// Path to the configuration
        config: PathBuf,
    },
    /// Aggregate many device configs into a union report
    Report {
        /// Device platform shared by every config
        #[arg(short, long)]
        platform: String,
        /// Configuration files, one per device; the file stem names the
        /// device
        configs: Vec<PathBuf>,
        /// Emit JSON instead of annotated text
        #[arg(long)]
        json: bool,
    },
}

/// Execute a parsed [`Cli`], returning the text to print
///
/// # Errors
/// Returns an error for unreadable files, unknown platforms, malformed
/// configuration text, or malformed tag-rule files.
pub fn run_with(cli: &Cli) -> Result<String> {
    match &cli.command {
        Command::Remediate {
            platform,
            running,
            generated,
            tag_rules,
            include,
            exclude,
        } => {
            let platform = Platform::lookup(platform)?;
            let running = load_config(platform, running)?;
            let generated = load_config(platform, generated)?;
            let mut workflow = RemediationWorkflow::new(running, generated)?;
            if let Some(rules_path) = tag_rules {
                let rules = load_tag_rules(rules_path)?;
                workflow.apply_remediation_tag_rules(&rules);
            }
            if include.is_empty() && exclude.is_empty() {
                Ok(workflow.remediation_text())
            } else {
                Ok(workflow
                    .remediation_text_filtered(&to_set(include), &to_set(exclude)))
            }
        }
        Command::Rollback {
            platform,
            running,
            generated,
        } => {
            let platform = Platform::lookup(platform)?;
            let running = load_config(platform, running)?;
            let generated = load_config(platform, generated)?;
            Ok(rollback(&running, &generated)?.text())
        }
        Command::Diff {
            platform,
            left,
            right,
        } => {
            let platform = Platform::lookup(platform)?;
            let left = load_config(platform, left)?;
            let right = load_config(platform, right)?;
            let mut lines = unified_diff(&left, &right).join("\n");
            if !lines.is_empty() {
                lines.push('\n');
            }
            Ok(lines)
        }
        Command::Render { platform, config } => {
            let platform = Platform::lookup(platform)?;
            Ok(load_config(platform, config)?.text())
        }
        Command::Filter {
            platform,
            config,
            tag_rules,
            include,
            exclude,
        } => {
            let platform = Platform::lookup(platform)?;
            let mut config = load_config(platform, config)?;
            let rules = load_tag_rules(tag_rules)?;
            config.apply_tag_rules(&rules);
            Ok(config.filtered_text(&to_set(include), &to_set(exclude)))
        }
        Command::Dump { platform, config } => {
            let platform = Platform::lookup(platform)?;
            let config = load_config(platform, config)?;
            let mut json = config.dump_json()?;
            json.push('\n');
            Ok(json)
        }
        Command::Report {
            platform,
            configs,
            json,
        } => {
            let platform = Platform::lookup(platform)?;
            let mut report = UnionReport::new();
            for path in configs {
                let device = path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                report.add_device(&device, &load_config(platform, path)?)?;
            }
            if *json {
                let mut text = report.to_json()?;
                text.push('\n');
                Ok(text)
            } else {
                Ok(report.annotated_text())
            }
        }
    }
}

/// Parse CLI args, run, and return the output text
///
/// # Errors
/// Propagates [`run_with`] failures.
pub fn run<I, S>(args: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    run_with(&cli)
}

fn load_config(platform: Platform, path: &Path) -> Result<Config> {
    debug!(path = %path.display(), %platform, "loading configuration");
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    Config::parse(platform, &text).with_context(|| format!("parsing {}", path.display()))
}

fn load_tag_rules(path: &Path) -> Result<Vec<netmend_core::TagRule>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse_tag_rules(&text).with_context(|| format!("parsing tag rules in {}", path.display()))
}

fn to_set(tags: &[String]) -> BTreeSet<String> {
    tags.iter().cloned().collect()
}
