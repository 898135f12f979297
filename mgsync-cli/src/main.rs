mod project;
mod sync;
mod translate;

use anyhow::Result;
use clap::{ArgAction, Command, arg};
use log::LevelFilter;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "mgsync";
    pub const BIN_NAME: &str = "mgsync";

    pub const CONFIG_ARG: &str = "config";
    pub const RECORDS_ARG: &str = "records";
    pub const SIZES_ARG: &str = "sizes";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .author("Databio")
        .about("Synchronize the coordinates of many genomes called against one reference onto a shared meta-genome axis.")
        .subcommand_required(true)
        .arg(
            arg!(-v --verbose "Log debug messages")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(sync::cli::create_sync_cli())
        .subcommand(translate::cli::create_translate_cli())
}

fn init_logging(verbose: bool) {
    let level = match verbose {
        true => LevelFilter::Debug,
        false => LevelFilter::Info,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    init_logging(matches.get_flag("verbose"));

    match matches.subcommand() {
        //
        // SYNC
        //
        Some((sync::cli::SYNC_CMD, matches)) => {
            sync::handlers::run_sync(matches)?;
        }

        //
        // TRANSLATE
        //
        Some((translate::cli::TRANSLATE_CMD, matches)) => {
            translate::handlers::run_translate(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
