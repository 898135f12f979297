//! The synchronization pass.
//!
//! A pass walks the [`ReferenceClock`] of one chromosome once. At every
//! reference position each track gets its offsets from the variant before it.
//! When any genome inserts at that position, all insertions there are widened
//! to the longest one and every genome without an event there receives a blank
//! of that width, so all tracks (the reference genome's own included) stay
//! parallel on the meta-genome axis.
//!
//! ```text
//! reference   ACGT----ACGT        ---- : blank of width 4
//! genome A    ACGTTTTTACGT        TTTT : insertion of 4 at position 3
//! genome B    ACGTGG--ACGT        GG-- : insertion of 2, extra offset 2
//! ```

use log::{debug, info, warn};
use serde::Serialize;

use mgsync_core::models::{GenomeChromosomeTrack, Variant, VariantKind};

use crate::chromosome::ChromosomeState;
use crate::clock::ReferenceClock;
use crate::errors::{SyncError, SyncResult};
use crate::meta_length::MetaGenomeLength;

/// What one chromosome pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChromosomeReport {
    pub chromosome: String,
    /// Reference positions visited by the clock
    pub positions_visited: usize,
    /// Reference positions at which at least one genome inserts
    pub insertion_positions: usize,
    pub blanks_inserted: usize,
    /// Width added to the meta-genome
    pub inserted_length: u64,
    pub ambiguous_positions: usize,
}

///
/// Per-pass state: the clock and a cursor-carrying handle on every track of
/// the chromosome. The step functions below move it from one reference
/// position to the next.
///
pub struct PassState<'a> {
    chromosome: &'a str,
    clock: &'a mut ReferenceClock,
    tracks: Vec<&'a mut GenomeChromosomeTrack>,
}

impl<'a> PassState<'a> {
    pub(crate) fn new(
        chromosome: &'a str,
        clock: &'a mut ReferenceClock,
        tracks: Vec<&'a mut GenomeChromosomeTrack>,
    ) -> Self {
        PassState {
            chromosome,
            clock,
            tracks,
        }
    }

    /// Start from the upstream variants only; blanks are derived again below.
    fn begin(&mut self) {
        self.clock.reset();
        for track in self.tracks.iter_mut() {
            track.reset_cursor();
            track.remove_blanks();
            track.clear_offsets();
        }
    }

    fn move_cursors(&mut self, reference_position: u64) {
        for track in self.tracks.iter_mut() {
            track.set_current_position(reference_position);
        }
    }

    ///
    /// Give every current variant the offsets its track has reached and
    /// collect the lengths of the insertions among them.
    ///
    fn assign_current_offsets(&mut self) -> Vec<i64> {
        let mut candidates = Vec::new();
        for track in self.tracks.iter_mut() {
            let (reference_offset, meta_genome_offset) = track.inherited_offsets();
            if let Some(variant) = track.current_mut() {
                variant.set_initial_offsets(reference_offset, meta_genome_offset);
                if variant.is_insertion() {
                    candidates.push(variant.length());
                }
            }
        }
        candidates
    }

    /// An SV called as an insertion in one genome and as a deletion in another.
    fn classification_conflict(&self, reference_position: u64) -> Option<SyncError> {
        let real = || {
            self.tracks
                .iter()
                .filter_map(|t| t.current())
                .filter(|v| !v.is_blank())
        };
        let inserting = real().find(|v| v.is_insertion())?;
        let deleting = real().find(|v| v.is_deletion())?;

        let structural = |v: &Variant| v.kind() == VariantKind::StructuralVariant;
        if !structural(inserting) && !structural(deleting) {
            return None;
        }

        Some(SyncError::AmbiguousVariantClassification {
            chromosome: self.chromosome.to_string(),
            position: reference_position,
            inserting: inserting.genome_name().to_string(),
            deleting: deleting.genome_name().to_string(),
        })
    }

    ///
    /// Make every track occupy `max_length` meta-genome positions at
    /// `reference_position`. Returns the number of blanks inserted.
    ///
    fn reconcile_insertions(&mut self, reference_position: u64, max_length: i64) -> SyncResult<usize> {
        let mut blanks = 0;
        for track in self.tracks.iter_mut() {
            if let Some(variant) = track.current_mut() {
                let missing = max_length - variant.length().max(0);
                if missing > 0 {
                    variant.add_extra_offset(missing)?;
                }
                continue;
            }

            track.insert_blank(reference_position, max_length)?;
            let (reference_offset, meta_genome_offset) = track.inherited_offsets();
            if let Some(blank) = track.current_mut() {
                blank.set_initial_offsets(reference_offset, meta_genome_offset);
            }
            blanks += 1;
        }
        Ok(blanks)
    }

    fn update_previous_positions(&mut self) {
        for track in self.tracks.iter_mut() {
            track.update_previous_position();
        }
    }

    fn finish(&mut self) {
        self.clock.reset();
        for track in self.tracks.iter_mut() {
            track.reset_cursor();
            track.rebuild_genome_index();
        }
    }
}

///
/// Runs synchronization passes. The engine holds no chromosome state itself,
/// so one instance can serve any number of chromosomes, in parallel.
///
#[derive(Debug, Clone, Default)]
pub struct SynchronizationEngine;

impl SynchronizationEngine {
    pub fn new() -> Self {
        SynchronizationEngine
    }

    ///
    /// Synchronize one chromosome in place.
    ///
    /// Offsets of every variant are recomputed from scratch, so running the
    /// pass again over an already synchronized chromosome gives the same
    /// result. On error the state is left partially updated; callers that
    /// publish results should run the pass on a copy (see
    /// [SynchronizationEngine::synchronize_detached]).
    ///
    /// # Arguments
    /// - state: the chromosome to synchronize
    /// - lengths: receives the meta-genome length of the chromosome
    pub fn synchronize(
        &self,
        state: &mut ChromosomeState,
        lengths: &mut MetaGenomeLength,
    ) -> SyncResult<ChromosomeReport> {
        let chromosome = state.name().to_string();
        lengths.initialize(&chromosome, state.reference_length());

        let mut report = ChromosomeReport {
            chromosome: chromosome.clone(),
            ..Default::default()
        };

        let mut pass = state.pass_state();
        debug!(
            "Synchronizing {} over {} tracks and {} reference positions",
            chromosome,
            pass.tracks.len(),
            pass.clock.len()
        );

        pass.begin();
        while let Some(reference_position) = pass.clock.current_position() {
            pass.move_cursors(reference_position);

            let candidates = pass.assign_current_offsets();
            if let Some(max_length) = candidates.into_iter().max() {
                if let Some(conflict) = pass.classification_conflict(reference_position) {
                    warn!("{}", conflict);
                    report.ambiguous_positions += 1;
                }

                report.blanks_inserted += pass.reconcile_insertions(reference_position, max_length)?;
                lengths.add(&chromosome, max_length)?;

                report.insertion_positions += 1;
                report.inserted_length += max_length as u64;
            }

            pass.update_previous_positions();
            pass.clock.advance();
            report.positions_visited += 1;
        }
        pass.finish();

        info!(
            "Synchronized {}: {} insertion positions, {} blanks, meta-genome length {}",
            chromosome,
            report.insertion_positions,
            report.blanks_inserted,
            lengths.get(&chromosome).unwrap_or_default()
        );

        Ok(report)
    }

    ///
    /// Synchronize a copy of `state`. Nothing is observable until the pass has
    /// completed; on failure the copy is simply dropped.
    ///
    pub fn synchronize_detached(
        &self,
        state: &ChromosomeState,
    ) -> SyncResult<(ChromosomeState, MetaGenomeLength, ChromosomeReport)> {
        let mut working = state.clone();
        let mut lengths = MetaGenomeLength::new();
        let report = self.synchronize(&mut working, &mut lengths)?;
        Ok((working, lengths, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn state_with(variants: Vec<Variant>, genomes: &[&str]) -> ChromosomeState {
        let mut state = ChromosomeState::new("chr1", "ref", 1000);
        for genome in genomes {
            state.add_genome(genome);
        }
        for variant in variants {
            state.add_variant(variant).unwrap();
        }
        state
    }

    fn offsets(state: &ChromosomeState, genome: &str, position: u64) -> (i64, i64, i64, i64) {
        let v = state.track(genome).unwrap().variant_at(position).unwrap();
        (
            v.initial_reference_offset(),
            v.initial_meta_genome_offset(),
            v.next_reference_position_offset(),
            v.next_meta_genome_position_offset(),
        )
    }

    #[rstest]
    fn test_single_insertion_scenario() {
        let mut state = state_with(vec![Variant::insertion("A", "chr1", 100, 4)], &["A", "B"]);
        let mut lengths = MetaGenomeLength::new();

        let report = SynchronizationEngine::new()
            .synchronize(&mut state, &mut lengths)
            .unwrap();

        assert_eq!(lengths.get("chr1"), Some(1004));
        assert_eq!(offsets(&state, "A", 100), (0, 0, 4, 4));
        assert_eq!(offsets(&state, "B", 100), (0, 0, 4, 4));
        assert_eq!(offsets(&state, "ref", 100), (0, 0, 4, 4));

        let blank = state.track("B").unwrap().variant_at(100).unwrap();
        assert_eq!(blank.kind(), VariantKind::Blank);
        assert_eq!(blank.length(), 4);

        assert_eq!(report.blanks_inserted, 2);
        assert_eq!(report.insertion_positions, 1);
        assert_eq!(report.inserted_length, 4);
    }

    #[rstest]
    fn test_widest_insertion_rule() {
        let mut state = state_with(
            vec![
                Variant::insertion("A", "chr1", 100, 5),
                Variant::insertion("B", "chr1", 100, 3),
            ],
            &["A", "B"],
        );
        let mut lengths = MetaGenomeLength::new();
        SynchronizationEngine::new()
            .synchronize(&mut state, &mut lengths)
            .unwrap();

        let a = state.track("A").unwrap().variant_at(100).unwrap();
        let b = state.track("B").unwrap().variant_at(100).unwrap();
        assert_eq!(a.extra_offset(), 0);
        assert_eq!(b.extra_offset(), 2);
        assert_eq!(
            a.next_meta_genome_position_offset(),
            b.next_meta_genome_position_offset()
        );
        assert_eq!(lengths.get("chr1"), Some(1005));
    }

    #[rstest]
    fn test_no_insertions_keeps_zero_offsets() {
        let mut state = state_with(
            vec![
                Variant::deletion("A", "chr1", 100, 3),
                Variant::snp("B", "chr1", 200),
            ],
            &["A", "B"],
        );
        let mut lengths = MetaGenomeLength::new();
        let report = SynchronizationEngine::new()
            .synchronize(&mut state, &mut lengths)
            .unwrap();

        assert_eq!(lengths.get("chr1"), Some(1000));
        assert_eq!(report.blanks_inserted, 0);
        for track in state.tracks() {
            for v in track {
                assert_eq!(v.initial_reference_offset(), 0);
                assert_eq!(v.initial_meta_genome_offset(), 0);
            }
        }
    }

    #[rstest]
    fn test_offsets_propagate_through_gaps() {
        let mut state = state_with(
            vec![
                Variant::insertion("A", "chr1", 100, 4),
                Variant::deletion("A", "chr1", 300, 2),
                Variant::insertion("B", "chr1", 200, 6),
                Variant::snp("B", "chr1", 400),
            ],
            &["A", "B"],
        );
        let mut lengths = MetaGenomeLength::new();
        SynchronizationEngine::new()
            .synchronize(&mut state, &mut lengths)
            .unwrap();

        // A: INS 4 @100, blank 6 @200, DEL 2 @300
        assert_eq!(offsets(&state, "A", 100), (0, 0, 4, 4));
        assert_eq!(offsets(&state, "A", 200), (4, 4, 10, 10));
        assert_eq!(offsets(&state, "A", 300), (10, 10, 8, 10));

        // B: blank 4 @100, INS 6 @200, SNP @400
        assert_eq!(offsets(&state, "B", 100), (0, 0, 4, 4));
        assert_eq!(offsets(&state, "B", 200), (4, 4, 10, 10));
        assert_eq!(offsets(&state, "B", 400), (10, 10, 10, 10));

        assert_eq!(lengths.get("chr1"), Some(1010));
    }

    #[rstest]
    fn test_deletion_colliding_with_insertion_gets_full_width() {
        let mut state = state_with(
            vec![
                Variant::insertion("A", "chr1", 100, 5),
                Variant::deletion("B", "chr1", 100, 3),
            ],
            &["A", "B"],
        );
        let mut lengths = MetaGenomeLength::new();
        let report = SynchronizationEngine::new()
            .synchronize(&mut state, &mut lengths)
            .unwrap();

        let b = state.track("B").unwrap().variant_at(100).unwrap();
        assert_eq!(b.extra_offset(), 5);
        assert_eq!(b.next_meta_genome_position_offset(), 5);
        assert_eq!(b.next_reference_position_offset(), 2);
        // plain insertion vs deletion is not a classification conflict
        assert_eq!(report.ambiguous_positions, 0);
    }

    #[rstest]
    fn test_structural_variant_disagreement_is_not_fatal() {
        let mut state = state_with(
            vec![
                Variant::structural_variant("A", "chr1", 100, 5),
                Variant::structural_variant("B", "chr1", 100, -5),
            ],
            &["A", "B"],
        );
        let mut lengths = MetaGenomeLength::new();
        let report = SynchronizationEngine::new()
            .synchronize(&mut state, &mut lengths)
            .unwrap();

        assert_eq!(report.ambiguous_positions, 1);
        assert!(state.track("A").unwrap().variant_at(100).unwrap().is_insertion());
        assert!(state.track("B").unwrap().variant_at(100).unwrap().is_deletion());
        assert_eq!(lengths.get("chr1"), Some(1005));
    }

    #[rstest]
    fn test_blank_before_first_variant() {
        let mut state = state_with(
            vec![
                Variant::insertion("A", "chr1", 100, 2),
                Variant::insertion("B", "chr1", 300, 3),
            ],
            &["A", "B"],
        );
        let mut lengths = MetaGenomeLength::new();
        SynchronizationEngine::new()
            .synchronize(&mut state, &mut lengths)
            .unwrap();

        // B's blank at 100 is now its first variant, its insertion follows
        assert_eq!(offsets(&state, "B", 100), (0, 0, 2, 2));
        assert_eq!(offsets(&state, "B", 300), (2, 2, 5, 5));
        assert_eq!(offsets(&state, "A", 300), (2, 2, 5, 5));
    }

    #[rstest]
    fn test_rerun_is_idempotent() {
        let mut state = state_with(
            vec![
                Variant::insertion("A", "chr1", 100, 5),
                Variant::insertion("B", "chr1", 100, 3),
                Variant::insertion("B", "chr1", 250, 1),
            ],
            &["A", "B", "C"],
        );
        let engine = SynchronizationEngine::new();

        let mut lengths = MetaGenomeLength::new();
        let first_report = engine.synchronize(&mut state, &mut lengths).unwrap();
        let first: Vec<String> = state
            .tracks()
            .flat_map(|t| t.iter().map(|v| v.to_string()))
            .collect();

        let mut again = MetaGenomeLength::new();
        let report = engine.synchronize(&mut state, &mut again).unwrap();
        let second: Vec<String> = state
            .tracks()
            .flat_map(|t| t.iter().map(|v| v.to_string()))
            .collect();

        assert_eq!(first, second);
        assert_eq!(lengths, again);
        assert_eq!(report, first_report);
    }

    #[rstest]
    fn test_rerun_after_new_variant_at_blank() {
        let mut state = state_with(vec![Variant::insertion("A", "chr1", 100, 4)], &["A", "B"]);
        let engine = SynchronizationEngine::new();
        engine
            .synchronize(&mut state, &mut MetaGenomeLength::new())
            .unwrap();
        assert!(state.track("B").unwrap().variant_at(100).unwrap().is_blank());

        state.add_variant(Variant::insertion("B", "chr1", 100, 2)).unwrap();
        let mut lengths = MetaGenomeLength::new();
        let report = engine.synchronize(&mut state, &mut lengths).unwrap();

        let b = state.track("B").unwrap().variant_at(100).unwrap();
        assert_eq!(b.kind(), VariantKind::Insertion);
        assert_eq!(b.extra_offset(), 2);
        assert_eq!(offsets(&state, "B", 100), (0, 0, 4, 4));
        assert_eq!(report.blanks_inserted, 1);
        assert_eq!(lengths.get("chr1"), Some(1004));
    }

    #[rstest]
    fn test_detached_pass_leaves_source_untouched() {
        let state = state_with(vec![Variant::insertion("A", "chr1", 100, 4)], &["A", "B"]);
        let (synced, lengths, _) = SynchronizationEngine::new()
            .synchronize_detached(&state)
            .unwrap();

        assert!(state.track("B").unwrap().is_empty());
        assert_eq!(synced.track("B").unwrap().len(), 1);
        assert_eq!(lengths.get("chr1"), Some(1004));
    }
}
