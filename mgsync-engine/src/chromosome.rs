use std::collections::BTreeMap;
use std::fmt::{self, Display};

use mgsync_core::models::{GenomeChromosomeTrack, Variant};

use crate::clock::ReferenceClock;
use crate::engine::PassState;
use crate::errors::{SyncError, SyncResult};

/// Where a chromosome stands with respect to meta-genome coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChromosomeStatus {
    /// Variants changed since the last successful pass, or no pass ran yet.
    Pending,
    Synchronized,
    /// The last pass failed; only single-genome views are usable.
    Failed,
}

impl Display for ChromosomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            ChromosomeStatus::Pending => "pending",
            ChromosomeStatus::Synchronized => "synchronized",
            ChromosomeStatus::Failed => "failed",
        };
        write!(f, "{status}")
    }
}

///
/// Everything one chromosome's synchronization needs: a track per genome, the
/// synthetic track of the reference genome, and the reference clock.
///
/// Chromosomes share nothing, so each state can be synchronized on its own
/// worker.
///
#[derive(Debug, Clone)]
pub struct ChromosomeState {
    name: String,
    reference_length: u64,
    reference_track: GenomeChromosomeTrack,
    tracks: BTreeMap<String, GenomeChromosomeTrack>,
    clock: ReferenceClock,
    status: ChromosomeStatus,
}

impl ChromosomeState {
    pub fn new(name: &str, reference_genome: &str, reference_length: u64) -> Self {
        ChromosomeState {
            name: name.to_string(),
            reference_length,
            reference_track: GenomeChromosomeTrack::new(reference_genome, name),
            tracks: BTreeMap::new(),
            clock: ReferenceClock::new(),
            status: ChromosomeStatus::Pending,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reference_length(&self) -> u64 {
        self.reference_length
    }

    pub fn status(&self) -> ChromosomeStatus {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: ChromosomeStatus) {
        self.status = status;
    }

    /// Give `genome` an (empty) track on this chromosome if it has none yet.
    pub fn add_genome(&mut self, genome: &str) {
        if !self.tracks.contains_key(genome) {
            self.tracks
                .insert(genome.to_string(), GenomeChromosomeTrack::new(genome, &self.name));
            // the new track still needs its blanks
            self.status = ChromosomeStatus::Pending;
        }
    }

    ///
    /// Place a variant in its genome's track and register its position on the
    /// clock.
    ///
    pub fn add_variant(&mut self, variant: Variant) -> SyncResult<()> {
        let position = variant.reference_position();
        let track = self
            .tracks
            .get_mut(variant.genome_name())
            .ok_or_else(|| SyncError::UnknownGenome(variant.genome_name().to_string()))?;
        track.insert(variant)?;

        self.clock.add_chromosome_position(position);
        self.status = ChromosomeStatus::Pending;
        Ok(())
    }

    /// Track of `genome`; the reference genome resolves to its synthetic track.
    pub fn track(&self, genome: &str) -> Option<&GenomeChromosomeTrack> {
        if genome == self.reference_track.genome_name() {
            return Some(&self.reference_track);
        }
        self.tracks.get(genome)
    }

    pub fn reference_track(&self) -> &GenomeChromosomeTrack {
        &self.reference_track
    }

    /// Genome tracks in genome-name order, without the reference track.
    pub fn tracks(&self) -> impl Iterator<Item = &GenomeChromosomeTrack> {
        self.tracks.values()
    }

    pub fn clock(&self) -> &ReferenceClock {
        &self.clock
    }

    pub(crate) fn pass_state(&mut self) -> PassState<'_> {
        let tracks = self
            .tracks
            .values_mut()
            .chain(std::iter::once(&mut self.reference_track))
            .collect();
        PassState::new(&self.name, &mut self.clock, tracks)
    }
}
