//! End-to-end synchronization through the public project API.
//!
//! Engine step functions are tested in src/engine.rs; these tests check the
//! properties every synchronized project must have.

use std::io::Write;

use pretty_assertions::assert_eq;
use rstest::*;
use tempfile::NamedTempFile;

use mgsync_core::VariantError;
use mgsync_core::models::{GenomeChromosomeTrack, Variant, VariantKind, VariantRecord};
use mgsync_core::utils::read_variant_records;
use mgsync_engine::{ChromosomeStatus, MultiGenomeProject, SyncConfig, SyncError};

const VARIANTS: &str = "\
# genome\tchromosome\tposition\tkind\tlength
A\tchr1\t100\tINS\t4
A\tchr1\t200\tDEL\t3
A\tchr1\t300\tSNP
A\tchr1\t500\tINS\t2
B\tchr1\t100\tINS\t6
B\tchr1\t250\tINS\t1
B\tchr1\t500\tSV\t5
C\tchr1\t150\tDEL\t10
C\tchr1\t500\tSNP
A\tchr2\t10\tINS\t3
C\tchr2\t400\tDEL\t2
";

fn records() -> Vec<VariantRecord> {
    VARIANTS
        .lines()
        .filter(|l| !l.starts_with('#'))
        .map(|l| l.parse().unwrap())
        .collect()
}

fn config(parallel: bool, threads: Option<usize>) -> SyncConfig {
    let mut config = SyncConfig {
        reference_genome: "ref".to_string(),
        parallel,
        threads,
        ..Default::default()
    };
    config.chromosomes.insert("chr1".to_string(), 1000);
    config.chromosomes.insert("chr2".to_string(), 800);
    config
}

#[fixture]
fn project() -> MultiGenomeProject {
    let mut project = MultiGenomeProject::from_config(config(false, None));
    project.add_records(records()).unwrap();
    project
}

#[fixture]
fn synchronized(mut project: MultiGenomeProject) -> MultiGenomeProject {
    let report = project.compute().unwrap();
    assert!(report.failed.is_empty());
    project
}

fn all_tracks<'a>(
    project: &'a MultiGenomeProject,
    chromosome: &str,
) -> Vec<&'a GenomeChromosomeTrack> {
    let state = project.chromosome_state(chromosome).unwrap();
    state
        .tracks()
        .chain(std::iter::once(state.reference_track()))
        .collect()
}

fn snapshot(project: &MultiGenomeProject) -> Vec<Variant> {
    project
        .chromosome_names()
        .flat_map(|chr| all_tracks(project, chr))
        .flat_map(|track| track.iter().cloned())
        .collect()
}

#[rstest]
fn test_single_insertion_scenario() {
    let mut project = MultiGenomeProject::new("ref");
    project.add_chromosome("chr1", 1000);
    project.add_genome("A").unwrap();
    project.add_genome("B").unwrap();
    project
        .add_variant(Variant::insertion("A", "chr1", 100, 4))
        .unwrap();

    project.compute().unwrap();

    assert_eq!(project.get_meta_genome_length("chr1").unwrap(), 1004);

    for genome in ["A", "B", "ref"] {
        let v = project
            .get_chromosome_track(genome, "chr1")
            .unwrap()
            .variant_at(100)
            .unwrap();
        assert_eq!(
            (
                v.initial_reference_offset(),
                v.initial_meta_genome_offset(),
                v.next_reference_position_offset(),
                v.next_meta_genome_position_offset(),
            ),
            (0, 0, 4, 4),
            "offsets of {genome}"
        );
    }

    let blank = project
        .get_chromosome_track("B", "chr1")
        .unwrap()
        .variant_at(100)
        .unwrap();
    assert_eq!(blank.kind(), VariantKind::Blank);
    assert_eq!(blank.length(), 4);

    assert_eq!(project.translate_position("A", "chr1", 150).unwrap(), 150);
    assert_eq!(project.translate_position("A", "chr1", 200).unwrap(), 200);
}

#[rstest]
#[case("chr1", 1012)]
#[case("chr2", 803)]
fn test_meta_genome_lengths(synchronized: MultiGenomeProject, #[case] chr: &str, #[case] len: u64) {
    assert_eq!(synchronized.get_meta_genome_length(chr).unwrap(), len);
    assert_eq!(
        synchronized.chromosome_status(chr).unwrap(),
        ChromosomeStatus::Synchronized
    );
}

#[rstest]
fn test_meta_genome_offsets_never_decrease(synchronized: MultiGenomeProject) {
    for chr in ["chr1", "chr2"] {
        for track in all_tracks(&synchronized, chr) {
            let mut last = 0;
            for v in track {
                assert!(v.initial_meta_genome_offset() >= last, "{v}");
                assert!(v.next_meta_genome_position_offset() >= v.initial_meta_genome_offset());
                last = v.next_meta_genome_position_offset();
            }
        }
    }
}

#[rstest]
fn test_tracks_are_parallel_at_insertion_positions(synchronized: MultiGenomeProject) {
    let tracks = all_tracks(&synchronized, "chr1");
    assert_eq!(tracks.len(), 4);

    for position in [100, 250, 500] {
        let at: Vec<&Variant> = tracks
            .iter()
            .map(|t| t.variant_at(position).unwrap())
            .collect();

        let widths: Vec<i64> = at.iter().map(|v| v.meta_genome_width()).collect();
        assert!(widths.iter().all(|w| *w == widths[0]), "{position}: {widths:?}");

        let next: Vec<i64> = at
            .iter()
            .map(|v| v.next_meta_genome_position_offset())
            .collect();
        assert!(next.iter().all(|n| *n == next[0]), "{position}: {next:?}");
    }
}

#[rstest]
fn test_widest_insertion_rule(synchronized: MultiGenomeProject) {
    let a = synchronized.get_chromosome_track("A", "chr1").unwrap();
    let b = synchronized.get_chromosome_track("B", "chr1").unwrap();

    // position 100: A inserts 4, B inserts 6
    assert_eq!(a.variant_at(100).unwrap().extra_offset(), 2);
    assert_eq!(b.variant_at(100).unwrap().extra_offset(), 0);

    // position 500: A inserts 2, B's SV inserts 5
    assert_eq!(a.variant_at(500).unwrap().extra_offset(), 3);
    assert_eq!(b.variant_at(500).unwrap().extra_offset(), 0);
}

#[rstest]
fn test_no_insertions_means_no_shift() {
    let mut project = MultiGenomeProject::new("ref");
    project.add_chromosome("chr1", 1000);
    project
        .add_variant(Variant::deletion("A", "chr1", 100, 5))
        .unwrap();
    project.add_variant(Variant::snp("B", "chr1", 300)).unwrap();

    let report = project.compute().unwrap();

    assert_eq!(project.get_meta_genome_length("chr1").unwrap(), 1000);
    assert_eq!(report.synchronized[0].blanks_inserted, 0);
    for track in all_tracks(&project, "chr1") {
        for v in track {
            assert_eq!(v.initial_meta_genome_offset(), 0);
            assert_eq!(v.next_meta_genome_position_offset(), 0);
        }
    }
    assert_eq!(project.translate_reference_position("chr1", 500).unwrap(), 500);
}

#[rstest]
fn test_compute_is_idempotent(mut synchronized: MultiGenomeProject) {
    let first = snapshot(&synchronized);
    let lengths: Vec<u64> = ["chr1", "chr2"]
        .iter()
        .map(|c| synchronized.get_meta_genome_length(c).unwrap())
        .collect();

    let report = synchronized.compute().unwrap();

    assert_eq!(snapshot(&synchronized), first);
    assert_eq!(
        ["chr1", "chr2"]
            .iter()
            .map(|c| synchronized.get_meta_genome_length(c).unwrap())
            .collect::<Vec<_>>(),
        lengths
    );
    // blanks are derived again, identically
    let chr1 = report
        .synchronized
        .iter()
        .find(|r| r.chromosome == "chr1")
        .unwrap();
    assert_eq!(chr1.blanks_inserted, 6);
}

fn single_insertion_project(extra: &[Variant]) -> MultiGenomeProject {
    let mut project = MultiGenomeProject::new("ref");
    project.add_chromosome("chr1", 1000);
    project.add_genome("B").unwrap();
    project
        .add_variant(Variant::insertion("A", "chr1", 100, 4))
        .unwrap();
    for variant in extra {
        project.add_variant(variant.clone()).unwrap();
    }
    project
}

#[rstest]
fn test_variant_added_where_a_blank_was_derived() {
    let mut project = single_insertion_project(&[]);
    project.compute().unwrap();
    assert!(
        project
            .get_chromosome_track("B", "chr1")
            .unwrap()
            .variant_at(100)
            .unwrap()
            .is_blank()
    );

    project
        .add_variant(Variant::insertion("B", "chr1", 100, 2))
        .unwrap();
    project.compute().unwrap();

    let b = project
        .get_chromosome_track("B", "chr1")
        .unwrap()
        .variant_at(100)
        .unwrap();
    assert_eq!(b.kind(), VariantKind::Insertion);
    assert_eq!(b.extra_offset(), 2);
    assert_eq!(b.next_meta_genome_position_offset(), 4);
    assert_eq!(project.get_meta_genome_length("chr1").unwrap(), 1004);

    // same result as loading everything before the first pass
    let mut upfront = single_insertion_project(&[Variant::insertion("B", "chr1", 100, 2)]);
    upfront.compute().unwrap();
    assert_eq!(snapshot(&project), snapshot(&upfront));
}

#[rstest]
fn test_reference_offsets_never_decrease_without_deletions() {
    let mut project = MultiGenomeProject::new("ref");
    project.add_chromosome("chr1", 1000);
    for variant in [
        Variant::insertion("A", "chr1", 100, 4),
        Variant::insertion("A", "chr1", 400, 1),
        Variant::insertion("B", "chr1", 100, 2),
        Variant::insertion("B", "chr1", 300, 3),
        Variant::structural_variant("C", "chr1", 200, 5),
        Variant::snp("C", "chr1", 350),
    ] {
        project.add_variant(variant).unwrap();
    }
    project.compute().unwrap();

    let tracks = all_tracks(&project, "chr1");
    assert_eq!(tracks.len(), 4);
    for track in tracks {
        let mut last = 0;
        for v in track {
            assert!(v.initial_reference_offset() >= last, "{v}");
            assert!(v.next_reference_position_offset() >= v.initial_reference_offset());
            last = v.next_reference_position_offset();
        }
        assert_eq!(track.iter().next().unwrap().initial_reference_offset(), 0);
    }
}

#[rstest]
#[case(None)]
#[case(Some(1))]
#[case(Some(3))]
fn test_parallel_matches_sequential(synchronized: MultiGenomeProject, #[case] threads: Option<usize>) {
    let mut parallel = MultiGenomeProject::from_config(config(true, threads));
    parallel.add_records(records()).unwrap();
    let report = parallel.compute().unwrap();

    assert_eq!(report.synchronized.len(), 2);
    assert_eq!(snapshot(&parallel), snapshot(&synchronized));
    assert_eq!(
        parallel.get_meta_genome_length("chr1").unwrap(),
        synchronized.get_meta_genome_length("chr1").unwrap()
    );
}

#[rstest]
fn test_report_counts(mut project: MultiGenomeProject) {
    let report = project.compute().unwrap();
    let chr1 = report
        .synchronized
        .iter()
        .find(|r| r.chromosome == "chr1")
        .unwrap();

    assert_eq!(chr1.insertion_positions, 3);
    assert_eq!(chr1.inserted_length, 12);
    // 100: C, ref; 250: A, C, ref; 500: ref
    assert_eq!(chr1.blanks_inserted, 6);
    assert_eq!(chr1.ambiguous_positions, 0);
}

#[rstest]
fn test_collision_rejection() {
    let result = GenomeChromosomeTrack::from_variants(
        "A",
        "chr1",
        vec![
            Variant::insertion("A", "chr1", 100, 4),
            Variant::deletion("A", "chr1", 100, 2),
        ],
    );
    assert!(matches!(
        result,
        Err(VariantError::DuplicatePosition { position: 100, .. })
    ));

    let mut project = MultiGenomeProject::new("ref");
    project.add_chromosome("chr1", 1000);
    project
        .add_variant(Variant::insertion("A", "chr1", 100, 4))
        .unwrap();
    assert!(matches!(
        project.add_variant(Variant::snp("A", "chr1", 100)),
        Err(SyncError::Variant(VariantError::DuplicatePosition { .. }))
    ));
}

#[rstest]
fn test_project_from_files() {
    let mut config_file = NamedTempFile::new().unwrap();
    writeln!(
        config_file,
        "reference_genome = \"ref\"\nparallel = true\nthreads = 2\n\n[chromosomes]\nchr1 = 1000\nchr2 = 800"
    )
    .unwrap();

    let mut variants_file = NamedTempFile::new().unwrap();
    write!(variants_file, "{VARIANTS}").unwrap();

    let config = SyncConfig::try_from(config_file.path()).unwrap();
    let mut project = MultiGenomeProject::from_config(config);
    let records = read_variant_records(variants_file.path()).unwrap();
    assert_eq!(project.add_records(records).unwrap(), 11);

    project.compute().unwrap();
    assert_eq!(project.get_meta_genome_length("chr1").unwrap(), 1012);
    assert_eq!(
        project.genome_names().collect::<Vec<_>>(),
        vec!["A", "B", "C"]
    );
}
