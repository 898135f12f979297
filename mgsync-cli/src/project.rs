use std::path::Path;

use anyhow::{Context, Result};
use clap::{ArgMatches, Command, arg};
use log::info;

use mgsync_core::utils::{read_chrom_sizes, read_variant_records};
use mgsync_engine::{MultiGenomeProject, SyncConfig};

use crate::consts::{CONFIG_ARG, RECORDS_ARG, SIZES_ARG};

/// Arguments every subcommand needs to build a project.
pub fn with_project_args(command: Command) -> Command {
    command
        .arg(arg!(-c --config <config> "Project configuration (.toml)"))
        .arg(arg!(-r --records <records> "Variant records, tab separated (genome, chromosome, position, kind, length); may be gzipped"))
        .arg(arg!(-s --sizes [sizes] "Chrom sizes file with additional reference chromosomes"))
}

pub fn load_project(matches: &ArgMatches) -> Result<MultiGenomeProject> {
    let config = matches
        .get_one::<String>(CONFIG_ARG)
        .context("A path to a project configuration is required.")?;
    let records = matches
        .get_one::<String>(RECORDS_ARG)
        .context("A path to a variant records file is required.")?;
    let sizes = matches.get_one::<String>(SIZES_ARG);

    build_project(
        Path::new(config),
        Path::new(records),
        sizes.map(Path::new),
    )
}

///
/// Build a project from files on disk.
///
/// # Arguments
/// - config: project configuration
/// - records: variant records
/// - sizes: optional chrom sizes file; its chromosomes are added to those of the config
pub fn build_project(
    config: &Path,
    records: &Path,
    sizes: Option<&Path>,
) -> Result<MultiGenomeProject> {
    let config = SyncConfig::try_from(config)
        .with_context(|| format!("Failed to load configuration from {:?}", config))?;
    let mut project = MultiGenomeProject::from_config(config);

    if let Some(sizes) = sizes {
        for (chromosome, length) in read_chrom_sizes(sizes)? {
            project.add_chromosome(&chromosome, length);
        }
    }

    let records = read_variant_records(records)?;
    let count = project.add_records(records)?;
    info!(
        "Loaded {} variants of {} genomes on {} chromosomes",
        count,
        project.genome_names().count(),
        project.chromosome_names().count()
    );

    Ok(project)
}
