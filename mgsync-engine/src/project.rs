//! The per-project context: genomes, chromosomes and their meta-genome coordinates.
//!
//! # Examples
//!
//! ```
//! use mgsync_core::models::Variant;
//! use mgsync_engine::MultiGenomeProject;
//!
//! let mut project = MultiGenomeProject::new("reference");
//! project.add_chromosome("chr1", 1000);
//! project.add_genome("B").unwrap();
//! project.add_variant(Variant::insertion("A", "chr1", 100, 4)).unwrap();
//!
//! let report = project.compute().unwrap();
//! assert!(report.failed.is_empty());
//!
//! assert_eq!(project.get_meta_genome_length("chr1").unwrap(), 1004);
//! assert_eq!(project.translate_position("A", "chr1", 150).unwrap(), 150);
//! // B's axis carries a blank of 4 at 100, the reference axis does not
//! assert_eq!(project.translate_position("B", "chr1", 150).unwrap(), 150);
//! assert_eq!(project.translate_reference_position("chr1", 150).unwrap(), 154);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};
use rayon::prelude::*;
use serde::{Serialize, Serializer};

use mgsync_core::models::{GenomeChromosomeTrack, Variant, VariantRecord};

use crate::chromosome::{ChromosomeState, ChromosomeStatus};
use crate::config::SyncConfig;
use crate::engine::{ChromosomeReport, SynchronizationEngine};
use crate::errors::{SyncError, SyncResult};
use crate::meta_length::MetaGenomeLength;

// positions past i64::MAX lie beyond any chromosome; reported saturated
fn to_signed(chromosome: &str, position: u64) -> SyncResult<i64> {
    i64::try_from(position).map_err(|_| SyncError::PositionOutOfRange {
        chromosome: chromosome.to_string(),
        position: i64::MAX,
    })
}

type PassOutcome = SyncResult<(ChromosomeState, MetaGenomeLength, ChromosomeReport)>;

fn serialize_display<S: Serializer>(error: &SyncError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// A chromosome whose pass failed.
#[derive(Debug, Clone, Serialize)]
pub struct ChromosomeFailure {
    pub chromosome: String,
    #[serde(serialize_with = "serialize_display")]
    pub error: SyncError,
}

/// Outcome of [MultiGenomeProject::compute].
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectReport {
    pub synchronized: Vec<ChromosomeReport>,
    pub failed: Vec<ChromosomeFailure>,
}

///
/// Owns everything about one multi-genome project: the registered genomes,
/// one [ChromosomeState] per reference chromosome, the meta-genome lengths and
/// the engine that synchronizes them.
///
#[derive(Debug, Clone)]
pub struct MultiGenomeProject {
    config: SyncConfig,
    engine: SynchronizationEngine,
    genomes: BTreeSet<String>,
    chromosomes: BTreeMap<String, ChromosomeState>,
    meta_lengths: MetaGenomeLength,
}

impl MultiGenomeProject {
    pub fn new(reference_genome: &str) -> Self {
        MultiGenomeProject::from_config(SyncConfig {
            reference_genome: reference_genome.to_string(),
            ..Default::default()
        })
    }

    /// Create a project with the reference chromosomes listed in `config`.
    pub fn from_config(config: SyncConfig) -> Self {
        if let (false, Some(threads)) = (config.parallel, config.threads) {
            warn!(
                "threads = {} has no effect unless parallel = true, synchronizing sequentially",
                threads
            );
        }
        let chromosomes = config.chromosomes.clone();
        let mut project = MultiGenomeProject {
            config,
            engine: SynchronizationEngine::new(),
            genomes: BTreeSet::new(),
            chromosomes: BTreeMap::new(),
            meta_lengths: MetaGenomeLength::new(),
        };
        for (name, length) in chromosomes {
            project.add_chromosome(&name, length);
        }
        project
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn reference_genome(&self) -> &str {
        &self.config.reference_genome
    }

    pub fn genome_names(&self) -> impl Iterator<Item = &str> {
        self.genomes.iter().map(String::as_str)
    }

    pub fn chromosome_names(&self) -> impl Iterator<Item = &str> {
        self.chromosomes.keys().map(String::as_str)
    }

    ///
    /// Register a reference chromosome. A chromosome that is already known
    /// keeps its length and variants.
    ///
    pub fn add_chromosome(&mut self, name: &str, reference_length: u64) {
        if self.chromosomes.contains_key(name) {
            warn!("Chromosome {} is already part of the project, ignoring", name);
            return;
        }

        let mut state = ChromosomeState::new(name, &self.config.reference_genome, reference_length);
        for genome in &self.genomes {
            state.add_genome(genome);
        }
        self.chromosomes.insert(name.to_string(), state);
        self.meta_lengths.initialize(name, reference_length);
    }

    /// Register a genome; it gets a track on every chromosome.
    pub fn add_genome(&mut self, name: &str) -> SyncResult<()> {
        if name == self.config.reference_genome {
            return Err(SyncError::ReservedGenomeName(name.to_string()));
        }
        if self.genomes.insert(name.to_string()) {
            for state in self.chromosomes.values_mut() {
                state.add_genome(name);
            }
        }
        Ok(())
    }

    ///
    /// Place a variant in its track. Unknown genomes are registered on the
    /// fly, unknown chromosomes are an error.
    ///
    pub fn add_variant(&mut self, variant: Variant) -> SyncResult<()> {
        if !self.chromosomes.contains_key(variant.chromosome()) {
            return Err(SyncError::UnknownChromosome(variant.chromosome().to_string()));
        }
        self.add_genome(variant.genome_name())?;

        let state = self
            .chromosomes
            .get_mut(variant.chromosome())
            .ok_or_else(|| SyncError::UnknownChromosome(variant.chromosome().to_string()))?;
        state.add_variant(variant)
    }

    /// Add upstream records in any order. Returns the number of records added.
    pub fn add_records<I>(&mut self, records: I) -> SyncResult<usize>
    where
        I: IntoIterator<Item = VariantRecord>,
    {
        let mut count = 0;
        for record in records {
            self.add_variant(Variant::from(record))?;
            count += 1;
        }
        debug!("Added {} variant records", count);
        Ok(count)
    }

    ///
    /// Synchronize every chromosome.
    ///
    /// Each chromosome is synchronized on a copy that replaces the published
    /// state only when its pass succeeds. A failed chromosome keeps its
    /// previous tracks, is marked [ChromosomeStatus::Failed] and is listed in
    /// the report; the others are unaffected.
    ///
    pub fn compute(&mut self) -> SyncResult<ProjectReport> {
        let outcomes: Vec<(String, PassOutcome)> = match (self.config.parallel, self.config.threads) {
            (true, Some(threads)) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| SyncError::ThreadPool(e.to_string()))?;
                pool.install(|| self.run_parallel())
            }
            (true, None) => self.run_parallel(),
            (false, _) => self
                .chromosomes
                .iter()
                .map(|(name, state)| (name.clone(), self.engine.synchronize_detached(state)))
                .collect(),
        };

        let mut report = ProjectReport::default();
        for (name, outcome) in outcomes {
            self.publish(&name, outcome, &mut report);
        }
        Ok(report)
    }

    fn run_parallel(&self) -> Vec<(String, PassOutcome)> {
        self.chromosomes
            .par_iter()
            .map(|(name, state)| (name.clone(), self.engine.synchronize_detached(state)))
            .collect()
    }

    /// Synchronize a single chromosome.
    pub fn compute_chromosome(&mut self, chromosome: &str) -> SyncResult<ChromosomeReport> {
        let state = self
            .chromosomes
            .get(chromosome)
            .ok_or_else(|| SyncError::UnknownChromosome(chromosome.to_string()))?;
        let outcome = self.engine.synchronize_detached(state);

        let mut report = ProjectReport::default();
        self.publish(chromosome, outcome, &mut report);

        match (report.synchronized.pop(), report.failed.pop()) {
            (Some(synchronized), _) => Ok(synchronized),
            (None, Some(failure)) => Err(failure.error),
            (None, None) => Err(SyncError::ChromosomeNotSynchronized(chromosome.to_string())),
        }
    }

    fn publish(&mut self, chromosome: &str, outcome: PassOutcome, report: &mut ProjectReport) {
        match outcome {
            Ok((mut state, lengths, chromosome_report)) => {
                state.set_status(ChromosomeStatus::Synchronized);
                self.meta_lengths.absorb(lengths);
                self.chromosomes.insert(chromosome.to_string(), state);
                report.synchronized.push(chromosome_report);
            }
            Err(error) => {
                warn!(
                    "Synchronization of {} failed, meta-genome coordinates are disabled for it: {}",
                    chromosome, error
                );
                if let Some(state) = self.chromosomes.get_mut(chromosome) {
                    state.set_status(ChromosomeStatus::Failed);
                }
                report.failed.push(ChromosomeFailure {
                    chromosome: chromosome.to_string(),
                    error,
                });
            }
        }
    }

    //
    // downstream queries
    //

    fn state(&self, chromosome: &str) -> SyncResult<&ChromosomeState> {
        self.chromosomes
            .get(chromosome)
            .ok_or_else(|| SyncError::UnknownChromosome(chromosome.to_string()))
    }

    fn synchronized_state(&self, chromosome: &str) -> SyncResult<&ChromosomeState> {
        let state = self.state(chromosome)?;
        match state.status() {
            ChromosomeStatus::Synchronized => Ok(state),
            _ => Err(SyncError::ChromosomeNotSynchronized(chromosome.to_string())),
        }
    }

    pub fn chromosome_status(&self, chromosome: &str) -> SyncResult<ChromosomeStatus> {
        Ok(self.state(chromosome)?.status())
    }

    pub fn chromosome_state(&self, chromosome: &str) -> SyncResult<&ChromosomeState> {
        self.state(chromosome)
    }

    ///
    /// Track of `genome` on `chromosome`. Tracks stay readable whatever the
    /// chromosome status is; the reference genome name gives its synthetic track.
    ///
    pub fn get_chromosome_track(
        &self,
        genome: &str,
        chromosome: &str,
    ) -> SyncResult<&GenomeChromosomeTrack> {
        self.state(chromosome)?
            .track(genome)
            .ok_or_else(|| SyncError::UnknownGenome(genome.to_string()))
    }

    ///
    /// Meta-genome length of a chromosome. Before the first pass this is the
    /// reference length.
    ///
    pub fn get_meta_genome_length(&self, chromosome: &str) -> SyncResult<u64> {
        let state = self.state(chromosome)?;
        if state.status() == ChromosomeStatus::Failed {
            return Err(SyncError::ChromosomeNotSynchronized(chromosome.to_string()));
        }
        Ok(self
            .meta_lengths
            .get(chromosome)
            .unwrap_or(state.reference_length()))
    }

    ///
    /// Map a position on `genome`'s own axis to the meta-genome.
    ///
    /// The variant starting at or before the position decides: inside its
    /// span (`[genome_position, genome_position + width]`) its initial offsets
    /// apply, past it the offsets it hands on. Positions before the first
    /// variant are unchanged.
    ///
    pub fn translate_position(
        &self,
        genome: &str,
        chromosome: &str,
        genome_local_position: u64,
    ) -> SyncResult<u64> {
        let state = self.synchronized_state(chromosome)?;
        let track = state
            .track(genome)
            .ok_or_else(|| SyncError::UnknownGenome(genome.to_string()))?;

        let position = to_signed(chromosome, genome_local_position)?;
        let meta = match track.variant_containing(genome_local_position) {
            None => position,
            Some(variant) => {
                let width = (variant.next_reference_position_offset()
                    - variant.initial_reference_offset())
                .max(0) as u64;
                if genome_local_position <= variant.genome_position().saturating_add(width) {
                    position
                        .saturating_sub(variant.initial_reference_offset())
                        .saturating_add(variant.initial_meta_genome_offset())
                } else {
                    position
                        .saturating_sub(variant.next_reference_position_offset())
                        .saturating_add(variant.next_meta_genome_position_offset())
                }
            }
        };

        self.check_meta_position(chromosome, meta)
    }

    /// Map a reference position to the meta-genome.
    pub fn translate_reference_position(
        &self,
        chromosome: &str,
        reference_position: u64,
    ) -> SyncResult<u64> {
        let state = self.synchronized_state(chromosome)?;
        let offset = match state.reference_track().variant_at_or_before(reference_position) {
            None => 0,
            Some(v) if v.reference_position() == reference_position => {
                v.initial_meta_genome_offset()
            }
            Some(v) => v.next_meta_genome_position_offset(),
        };

        let position = to_signed(chromosome, reference_position)?;
        self.check_meta_position(chromosome, position.saturating_add(offset))
    }

    fn check_meta_position(&self, chromosome: &str, meta: i64) -> SyncResult<u64> {
        let length = self.get_meta_genome_length(chromosome)?;
        match u64::try_from(meta) {
            Ok(position) if position < length => Ok(position),
            _ => Err(SyncError::PositionOutOfRange {
                chromosome: chromosome.to_string(),
                position: meta,
            }),
        }
    }
}
