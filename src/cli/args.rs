//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Organizational hierarchy engine: mentor forests, render trees, and chart geometry
#[derive(Parser, Debug)]
#[command(name = "orgtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub debug: u8,

    /// Directory holding .orgtree.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    /// JSON member document (overrides config)
    #[arg(short = 'f', long, global = true, env = "ORGTREE_MEMBERS_FILE", value_hint = ValueHint::FilePath)]
    pub members_file: Option<PathBuf>,

    /// Organization id (overrides config)
    #[arg(short = 'o', long, global = true)]
    pub organization: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the organization chart as a text tree
    Tree {
        /// Also list unassigned members
        #[arg(short, long)]
        unassigned: bool,
    },

    /// List members outside every founder hierarchy
    Unassigned,

    /// Print the render tree as JSON
    Render {
        /// Pretty-print the JSON
        #[arg(short, long)]
        pretty: bool,
    },

    /// Compute the fit-to-screen transform for a viewport
    Fit {
        /// Viewport width in pixels
        #[arg(long)]
        width: f64,
        /// Viewport height in pixels
        #[arg(long)]
        height: f64,
    },

    /// Assign or remove mentors
    Mentor {
        #[command(subcommand)]
        command: MentorCommands,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum MentorCommands {
    /// Set a member's mentor (interactive picker when no mentor is given)
    Assign {
        /// Member receiving the mentor
        member: String,
        /// Mentor member id
        mentor: Option<String>,
        /// Pre-filter for the picker
        #[arg(short, long, default_value = "")]
        query: String,
    },

    /// Clear a member's mentor
    Remove {
        /// Member losing the mentor
        member: String,
    },

    /// List possible mentors for a member
    Candidates {
        /// Member receiving the mentor
        member: String,
        /// Case-insensitive filter on name, role, designation or id
        #[arg(default_value = "")]
        query: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Show config file locations
    Path,
    /// Print a commented config template
    Template,
}
