//! CLI module for blobreap - command-line interface and subcommands.
//!
//! Without a subcommand the tool runs a cleanup pass, as a dry run unless
//! `--delete` is given.

pub mod commands;

pub use commands::Cli;
