//! CLI argument parsing using clap.
//!
//! Contains the Cli struct and the Commands enum. With no subcommand the
//! binary runs the interactive calculator.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Two-proportion z-test calculator
#[derive(Parser)]
#[command(
    name = "propdiff",
    version = env!("CARGO_PKG_VERSION"),
    about = "Two-proportion z-test and confidence interval calculator",
    long_about = "Interactive helper for the sampling distribution of the difference \
between two sample proportions: significance tests, confidence intervals, and the \
algebra connecting them, explained step by step.",
    styles = clap_cargo_style()
)]
pub struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Decimal places for displayed values (overrides config)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=9))]
    pub round: Option<u8>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a default configuration file
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration
    Config,
}
