//! Icon Manager - backend and maintenance tools for an SVG icon library.

mod cli;
mod config;
mod core;
mod export;
mod feedback;
mod library;
mod logger;
mod svg;
mod utils;

use std::sync::Arc;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::maintenance::{self, ModeColors};
use cli::{Cli, Commands};
use config::AppConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = Arc::new(AppConfig::load(&cli)?);

    match &cli.command {
        Commands::Serve { .. } => cli::serve::bind_server(config)?.run(),
        Commands::Defaults {
            light,
            dark,
            group,
            dry,
        } => {
            let colors = ModeColors {
                light: light.clone(),
                dark: dark.clone(),
            };
            let summary = maintenance::set_defaults(&config.library, &colors, group, *dry);
            log!(
                "defaults";
                "{} file(s), {} updated, {} without {}, {} failed{}",
                summary.files,
                summary.updated,
                summary.missing_group,
                group,
                summary.failed,
                if *dry { " (dry run)" } else { "" }
            );
            Ok(())
        }
        Commands::Verify { light, dark } => {
            let expected = ModeColors {
                light: light.clone(),
                dark: dark.clone(),
            };
            for (mode, report) in maintenance::verify(&config.library, "Grey") {
                let want = expected.get(mode);
                let join = |set: &std::collections::BTreeSet<String>| {
                    set.iter().cloned().collect::<Vec<_>>().join(", ")
                };
                log!("verify"; "{}: {} file(s), {} without Grey group", mode, report.files, report.missing_group);
                log!("verify"; "{}: Grey group colors [{}]", mode, join(&report.group_colors));
                log!("verify"; "{}: single-color colors [{}]", mode, join(&report.single_colors));
                if report.matches(want) {
                    log!("verify"; "{}: all fills are {}", mode, want);
                } else {
                    log!("error"; "{}: expected only {}", mode, want);
                }
            }
            Ok(())
        }
        Commands::Groupify { dir, dry } => {
            let (grouped, skipped) = maintenance::groupify(dir, *dry)?;
            log!("groupify"; "grouped {}, skipped {}", grouped, skipped);
            Ok(())
        }
        Commands::Groups { file } => {
            for group in maintenance::file_groups(file)? {
                println!("{group}");
            }
            Ok(())
        }
    }
}
