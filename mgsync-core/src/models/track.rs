use std::collections::BTreeMap;

use crate::errors::{VariantError, VariantResult};
use crate::models::Variant;

///
/// Cursor of a track during a synchronization pass. It stores positions, not
/// references, so the track stays freely mutable while the cursor is set.
///
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackCursor {
    pub current: Option<u64>,
    pub previous: Option<u64>,
}

///
/// All variants of one genome on one chromosome, keyed by reference position.
///
#[derive(Debug, Clone)]
pub struct GenomeChromosomeTrack {
    genome_name: String,
    chromosome: String,
    variants: BTreeMap<u64, Variant>,
    cursor: TrackCursor,
    // (genome_position, reference_position), sorted; rebuilt after every pass
    genome_index: Vec<(u64, u64)>,
}

impl GenomeChromosomeTrack {
    pub fn new(genome_name: &str, chromosome: &str) -> Self {
        GenomeChromosomeTrack {
            genome_name: genome_name.to_string(),
            chromosome: chromosome.to_string(),
            variants: BTreeMap::new(),
            cursor: TrackCursor::default(),
            genome_index: Vec::new(),
        }
    }

    ///
    /// Build a track from unsorted variants.
    ///
    /// # Arguments
    /// - genome_name: genome the track belongs to
    /// - chromosome: chromosome the track belongs to
    /// - variants: variants of that genome and chromosome, in any order
    pub fn from_variants(
        genome_name: &str,
        chromosome: &str,
        variants: Vec<Variant>,
    ) -> VariantResult<Self> {
        let mut track = GenomeChromosomeTrack::new(genome_name, chromosome);
        for variant in variants {
            track.insert(variant)?;
        }
        Ok(track)
    }

    pub fn genome_name(&self) -> &str {
        &self.genome_name
    }

    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    ///
    /// Add a variant. A blank left by an earlier synchronization pass gives way
    /// to it; a second real variant at an occupied reference position is
    /// rejected, so is a variant of another genome or chromosome.
    ///
    pub fn insert(&mut self, variant: Variant) -> VariantResult<()> {
        if variant.genome_name() != self.genome_name || variant.chromosome() != self.chromosome {
            return Err(VariantError::ForeignVariant {
                genome: variant.genome_name().to_string(),
                chromosome: variant.chromosome().to_string(),
                track_genome: self.genome_name.clone(),
                track_chromosome: self.chromosome.clone(),
            });
        }

        let position = variant.reference_position();
        if self.variants.get(&position).is_some_and(|v| !v.is_blank()) {
            return Err(self.duplicate(position));
        }
        self.variants.insert(position, variant);
        Ok(())
    }

    ///
    /// Insert a placeholder of `length` at `reference_position` and make it the
    /// current variant.
    ///
    pub fn insert_blank(
        &mut self,
        reference_position: u64,
        length: i64,
    ) -> VariantResult<&mut Variant> {
        if self.variants.contains_key(&reference_position) {
            return Err(self.duplicate(reference_position));
        }

        let blank = Variant::blank(
            &self.genome_name,
            &self.chromosome,
            reference_position,
            length,
        );
        self.cursor.current = Some(reference_position);
        Ok(self.variants.entry(reference_position).or_insert(blank))
    }

    fn duplicate(&self, position: u64) -> VariantError {
        VariantError::DuplicatePosition {
            genome: self.genome_name.clone(),
            chromosome: self.chromosome.clone(),
            position,
        }
    }

    pub fn variant_at(&self, reference_position: u64) -> Option<&Variant> {
        self.variants.get(&reference_position)
    }

    /// The variant at `reference_position`, or the closest one before it.
    pub fn variant_at_or_before(&self, reference_position: u64) -> Option<&Variant> {
        self.variants
            .range(..=reference_position)
            .next_back()
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variant> {
        self.variants.values()
    }

    pub fn positions(&self) -> impl Iterator<Item = u64> + '_ {
        self.variants.keys().copied()
    }

    pub fn blank_count(&self) -> usize {
        self.variants.values().filter(|v| v.is_blank()).count()
    }

    /// Drop the blanks of a previous pass; returns how many were removed.
    pub fn remove_blanks(&mut self) -> usize {
        let before = self.variants.len();
        self.variants.retain(|_, v| !v.is_blank());
        before - self.variants.len()
    }

    /// Drop every offset assigned by a previous pass.
    pub fn clear_offsets(&mut self) {
        for variant in self.variants.values_mut() {
            variant.clear_offsets();
        }
        self.genome_index.clear();
    }

    //
    // cursor
    //

    pub fn cursor(&self) -> TrackCursor {
        self.cursor
    }

    ///
    /// Move the cursor to `reference_position`. The variant that was current
    /// before the move becomes the previous one; if this genome has no variant
    /// at the new position, there is no current variant.
    ///
    pub fn set_current_position(&mut self, reference_position: u64) {
        self.update_previous_position();
        self.cursor.current = self
            .variants
            .contains_key(&reference_position)
            .then_some(reference_position);
    }

    /// Remember the current variant as the previous one.
    pub fn update_previous_position(&mut self) {
        if self.cursor.current.is_some() {
            self.cursor.previous = self.cursor.current;
        }
    }

    pub fn current(&self) -> Option<&Variant> {
        self.cursor.current.and_then(|p| self.variants.get(&p))
    }

    pub fn current_mut(&mut self) -> Option<&mut Variant> {
        let position = self.cursor.current?;
        self.variants.get_mut(&position)
    }

    pub fn previous(&self) -> Option<&Variant> {
        self.cursor.previous.and_then(|p| self.variants.get(&p))
    }

    pub fn is_first_variant(&self) -> bool {
        match (self.cursor.current, self.variants.keys().next()) {
            (Some(current), Some(first)) => current == *first,
            _ => false,
        }
    }

    ///
    /// Offsets the current variant starts from: zero for the first variant,
    /// otherwise where the previous variant left off.
    ///
    pub fn inherited_offsets(&self) -> (i64, i64) {
        if self.is_first_variant() {
            return (0, 0);
        }
        self.previous()
            .map(|p| {
                (
                    p.next_reference_position_offset(),
                    p.next_meta_genome_position_offset(),
                )
            })
            .unwrap_or((0, 0))
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = TrackCursor::default();
    }

    //
    // lookups on the genome's own axis
    //

    /// Rebuild the genome-position lookup from the current offsets.
    pub fn rebuild_genome_index(&mut self) {
        self.genome_index = self
            .variants
            .values()
            .map(|v| (v.genome_position(), v.reference_position()))
            .collect();
        self.genome_index.sort_unstable();
    }

    ///
    /// Find the last variant starting at or before `genome_position` on this
    /// genome's axis. Requires [GenomeChromosomeTrack::rebuild_genome_index]
    /// to have run after the last pass.
    ///
    pub fn variant_containing(&self, genome_position: u64) -> Option<&Variant> {
        let idx = self
            .genome_index
            .partition_point(|(start, _)| *start <= genome_position);
        if idx == 0 {
            return None;
        }
        let (_, reference_position) = self.genome_index[idx - 1];
        self.variants.get(&reference_position)
    }
}

impl<'a> IntoIterator for &'a GenomeChromosomeTrack {
    type Item = &'a Variant;
    type IntoIter = std::collections::btree_map::Values<'a, u64, Variant>;

    fn into_iter(self) -> Self::IntoIter {
        self.variants.values()
    }
}
