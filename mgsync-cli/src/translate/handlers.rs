use anyhow::{Context, Result};
use clap::ArgMatches;

use mgsync_engine::MultiGenomeProject;

use crate::project::load_project;

pub fn run_translate(matches: &ArgMatches) -> Result<()> {
    let genome = matches.get_one::<String>("genome");
    let chromosome = matches
        .get_one::<String>("chromosome")
        .context("A chromosome is required.")?;
    let position = *matches
        .get_one::<u64>("position")
        .context("A position is required.")?;

    let mut project = load_project(matches)?;
    let meta_genome_position = translate(
        &mut project,
        genome.map(String::as_str),
        chromosome,
        position,
    )?;

    println!("{meta_genome_position}");

    Ok(())
}

///
/// Synchronize `chromosome` and translate `position` onto its meta-genome axis.
///
/// # Arguments
/// - genome: genome whose axis `position` is on; the reference axis when `None`
/// - chromosome: chromosome of the position
/// - position: position to translate
fn translate(
    project: &mut MultiGenomeProject,
    genome: Option<&str>,
    chromosome: &str,
    position: u64,
) -> Result<u64> {
    project
        .compute_chromosome(chromosome)
        .with_context(|| format!("Failed to synchronize {chromosome}"))?;

    let meta_genome_position = match genome {
        Some(genome) => project.translate_position(genome, chromosome, position)?,
        None => project.translate_reference_position(chromosome, position)?,
    };

    Ok(meta_genome_position)
}
