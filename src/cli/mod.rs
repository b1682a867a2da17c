//! Command-line interface for foodloop.

mod commands;

use clap::{Parser, Subcommand};

/// foodloop - surplus food pickup marketplace
#[derive(Parser)]
#[command(name = "foodloop")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server (default)
    Serve,

    /// Create every table in the configured database
    InitDb,

    /// Fill an empty database with demo shops, foods and accounts
    Seed,

    /// Create an administrator account
    CreateAdmin {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
