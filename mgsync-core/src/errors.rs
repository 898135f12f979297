use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VariantError {
    #[error("Extra offset can only grow, got a delta of {delta}")]
    InvalidOffset { delta: i64 },

    #[error("Genome {genome} already has a variant at {chromosome}:{position}")]
    DuplicatePosition {
        genome: String,
        chromosome: String,
        position: u64,
    },

    #[error("Variant for {genome}:{chromosome} cannot be placed in the track of {track_genome}:{track_chromosome}")]
    ForeignVariant {
        genome: String,
        chromosome: String,
        track_genome: String,
        track_chromosome: String,
    },

    #[error("Unknown variant kind: {0}")]
    UnknownKind(String),

    #[error("Error parsing variant record: {0}")]
    MalformedRecord(String),
}

pub type VariantResult<T> = std::result::Result<T, VariantError>;
