use clap::{Command, arg, value_parser};

use crate::project::with_project_args;

pub const TRANSLATE_CMD: &str = "translate";

pub fn create_translate_cli() -> Command {
    let command = Command::new(TRANSLATE_CMD)
        .author("Databio")
        .about("Translate a position onto the meta-genome axis")
        .arg_required_else_help(true)
        .arg(arg!(-g --genome [genome] "Genome the position belongs to; reference coordinates when omitted"))
        .arg(arg!(-n --chromosome <chromosome> "Chromosome of the position"))
        .arg(arg!(-p --position <position> "Position to translate").value_parser(value_parser!(u64)));

    with_project_args(command)
}
