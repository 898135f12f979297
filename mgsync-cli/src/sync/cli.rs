use clap::{Command, arg};

use crate::project::with_project_args;

pub const SYNC_CMD: &str = "sync";

pub fn create_sync_cli() -> Command {
    let command = Command::new(SYNC_CMD)
        .author("Databio")
        .about("Synchronize every chromosome and print meta-genome lengths and variant offsets")
        .arg_required_else_help(true)
        .arg(arg!(--json "Print the synchronization report as JSON instead of TSV"));

    with_project_args(command)
}
