use fxhash::FxHashMap as HashMap;

use crate::errors::{SyncError, SyncResult};

///
/// Length of every chromosome on the meta-genome axis: the reference length
/// plus the width of every synchronized insertion.
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaGenomeLength {
    lengths: HashMap<String, u64>,
}

impl MetaGenomeLength {
    pub fn new() -> Self {
        MetaGenomeLength::default()
    }

    /// Start (or restart) a chromosome from its reference length.
    pub fn initialize(&mut self, chromosome: &str, reference_length: u64) {
        self.lengths.insert(chromosome.to_string(), reference_length);
    }

    ///
    /// Grow a chromosome.
    ///
    /// # Arguments
    /// - chromosome: an initialized chromosome
    /// - delta: width to add, must not be negative
    pub fn add(&mut self, chromosome: &str, delta: i64) -> SyncResult<()> {
        if delta < 0 {
            return Err(SyncError::InvalidLength {
                chromosome: chromosome.to_string(),
                delta,
            });
        }
        let length = self
            .lengths
            .get_mut(chromosome)
            .ok_or_else(|| SyncError::UnknownChromosome(chromosome.to_string()))?;
        *length += delta as u64;
        Ok(())
    }

    pub fn get(&self, chromosome: &str) -> Option<u64> {
        self.lengths.get(chromosome).copied()
    }

    /// Take over the lengths of every chromosome `other` knows about.
    pub fn absorb(&mut self, other: MetaGenomeLength) {
        self.lengths.extend(other.lengths);
    }

    pub fn chromosomes(&self) -> impl Iterator<Item = (&str, u64)> {
        self.lengths.iter().map(|(chr, len)| (chr.as_str(), *len))
    }
}
