//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Icon manager backend and library maintenance tools
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: icons.toml)
    #[arg(short = 'C', long, default_value = "icons.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Library root directory (overrides `[library] root`)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub root: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the HTTP backend
    #[command(visible_alias = "s")]
    Serve {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Number of request worker threads
        #[arg(short, long)]
        threads: Option<usize>,
    },

    /// Reset the Grey group and single-color fills of every light/dark icon
    Defaults {
        /// Fill for light mode icons
        #[arg(long, default_value = "#282828")]
        light: String,

        /// Fill for dark mode icons
        #[arg(long, default_value = "#D3D3D3")]
        dark: String,

        /// Group recolored in the regular icon trees
        #[arg(long, default_value = "Grey")]
        group: String,

        /// Report what would change without writing
        #[arg(short, long)]
        dry: bool,
    },

    /// Report the fill colors used per mode
    Verify {
        /// Expected light mode fill
        #[arg(long, default_value = "#282828")]
        light: String,

        /// Expected dark mode fill
        #[arg(long, default_value = "#D3D3D3")]
        dark: String,
    },

    /// Wrap loose shapes of every SVG in a directory into `<g id="main">`
    Groupify {
        /// Directory holding the SVG files
        #[arg(value_hint = clap::ValueHint::DirPath)]
        dir: PathBuf,

        /// Report what would change without writing
        #[arg(short, long)]
        dry: bool,
    },

    /// Print the leaf color groups of one SVG
    Groups {
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_flags() {
        let cli = Cli::parse_from(["icon-manager", "serve", "-p", "9000", "-i", "0.0.0.0"]);
        let Commands::Serve { port, interface, threads } = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(port, Some(9000));
        assert_eq!(interface, Some("0.0.0.0".parse().unwrap()));
        assert_eq!(threads, None);
        assert_eq!(cli.config, PathBuf::from("icons.toml"));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["icon-manager", "defaults", "--dry", "-v", "--root", "/lib"]);
        assert!(cli.verbose);
        assert_eq!(cli.root, Some(PathBuf::from("/lib")));
        let Commands::Defaults { light, dark, group, dry } = cli.command else {
            panic!("expected defaults");
        };
        assert_eq!((light.as_str(), dark.as_str(), group.as_str()), ("#282828", "#D3D3D3", "Grey"));
        assert!(dry);
    }
}
