use std::collections::BTreeMap;
use std::io::{self, BufWriter, Write};

use anyhow::Result;
use clap::ArgMatches;
use log::warn;
use serde::Serialize;

use mgsync_engine::{MultiGenomeProject, ProjectReport};

use crate::project::load_project;

const LENGTHS_HEADER: &str = "#chromosome\treference_length\tmeta_genome_length\tstatus";
const VARIANTS_HEADER: &str = "#genome\tchromosome\tposition\tkind\tlength\textra_offset\tinitial_reference_offset\tinitial_meta_genome_offset\tnext_reference_offset\tnext_meta_genome_offset";

#[derive(Serialize)]
struct SyncSummary<'a> {
    report: &'a ProjectReport,
    meta_genome_lengths: BTreeMap<&'a str, u64>,
}

pub fn run_sync(matches: &ArgMatches) -> Result<()> {
    let json = matches.get_flag("json");

    let mut project = load_project(matches)?;
    let report = project.compute()?;
    if !report.failed.is_empty() {
        warn!(
            "{} chromosome(s) could not be synchronized",
            report.failed.len()
        );
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match json {
        true => write_json(&project, &report, &mut out)?,
        false => write_tsv(&project, &mut out)?,
    }
    out.flush()?;

    Ok(())
}

fn write_json<W: Write>(
    project: &MultiGenomeProject,
    report: &ProjectReport,
    out: &mut W,
) -> Result<()> {
    let meta_genome_lengths = project
        .chromosome_names()
        .filter_map(|chr| {
            project
                .get_meta_genome_length(chr)
                .ok()
                .map(|length| (chr, length))
        })
        .collect();

    let summary = SyncSummary {
        report,
        meta_genome_lengths,
    };
    serde_json::to_writer_pretty(&mut *out, &summary)?;
    writeln!(out)?;

    Ok(())
}

///
/// Write one line per chromosome with its lengths, then every variant of
/// every track (reference track last) with its offsets.
///
fn write_tsv<W: Write>(project: &MultiGenomeProject, out: &mut W) -> Result<()> {
    writeln!(out, "{LENGTHS_HEADER}")?;
    for chr in project.chromosome_names() {
        let state = project.chromosome_state(chr)?;
        let meta_genome_length = match project.get_meta_genome_length(chr) {
            Ok(length) => length.to_string(),
            Err(_) => "NA".to_string(),
        };
        writeln!(
            out,
            "{}\t{}\t{}\t{}",
            chr,
            state.reference_length(),
            meta_genome_length,
            state.status()
        )?;
    }

    writeln!(out, "{VARIANTS_HEADER}")?;
    for chr in project.chromosome_names() {
        let state = project.chromosome_state(chr)?;
        for track in state.tracks().chain(std::iter::once(state.reference_track())) {
            for variant in track {
                writeln!(out, "{variant}")?;
            }
        }
    }

    Ok(())
}
