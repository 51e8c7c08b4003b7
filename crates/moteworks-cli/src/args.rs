//! Command-line arguments and subcommands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "moteworks",
    version,
    about = "Parse comfort documents and commit them into a mote store."
)]
pub struct MoteworksArgs {
    /// Store file to use instead of the one named in the config file.
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse a comfort document and print diagnostics, hovers, completions,
    /// words, edits and the parsed record as JSON.
    Parse {
        /// The comfort document to parse.
        #[arg(required = true)]
        file: PathBuf,
        /// Skip collecting words for the spellchecker.
        #[arg(long)]
        no_spelling: bool,
    },
    /// Parse a comfort document and write the result into a mote.
    Commit {
        /// The comfort document to commit.
        #[arg(required = true)]
        file: PathBuf,
        /// Id of the comfort mote to replace.
        #[arg(long, required = true)]
        mote: String,
    },
    /// List the motes allowed as dialogue speakers.
    Speakers,
}
