use mgsync_core::VariantError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("Meta-genome length can only grow, got a delta of {delta} for {chromosome}")]
    InvalidLength { chromosome: String, delta: i64 },

    #[error("Unknown chromosome: {0}")]
    UnknownChromosome(String),

    #[error("Unknown genome: {0}")]
    UnknownGenome(String),

    #[error("{0} is the reference genome of the project and cannot be added as a genome")]
    ReservedGenomeName(String),

    #[error("Chromosome {0} has no synchronized meta-genome coordinates")]
    ChromosomeNotSynchronized(String),

    #[error(
        "Genomes disagree on the classification of the event at {chromosome}:{position} (insertion in {inserting}, deletion in {deleting})"
    )]
    AmbiguousVariantClassification {
        chromosome: String,
        position: u64,
        inserting: String,
        deleting: String,
    },

    #[error("Position {position} falls outside the meta-genome coordinates of {chromosome}")]
    PositionOutOfRange { chromosome: String, position: i64 },

    #[error("Failed to build thread pool: {0}")]
    ThreadPool(String),

    #[error(transparent)]
    Variant(#[from] VariantError),
}

pub type SyncResult<T> = std::result::Result<T, SyncError>;
