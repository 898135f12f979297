//! Meta-genome synchronization for genomes called against a shared reference.
//!
//! Every genome of a project is described by its variants relative to one
//! reference genome. Insertions make genomes disagree on how many positions
//! lie between two reference positions; this crate computes a common
//! "meta-genome" axis on which all genomes (and the reference) line up, and
//! translates positions onto it.
//!
//! ## Overview
//!
//! - [`MultiGenomeProject`](project::MultiGenomeProject): the per-project
//!   context. Register chromosomes and genomes, add variants, compute, query.
//! - [`SynchronizationEngine`](engine::SynchronizationEngine): the pass that
//!   assigns offsets and inserts blanks, one chromosome at a time.
//! - [`ReferenceClock`](clock::ReferenceClock): the ordered reference
//!   positions a pass visits.
//! - [`MetaGenomeLength`](meta_length::MetaGenomeLength): the meta-genome
//!   length of every chromosome.
//! - [`SyncConfig`](config::SyncConfig): project settings, read from TOML.
//!
//! Chromosomes are independent of each other, so [`MultiGenomeProject::compute`]
//! can synchronize them on a rayon pool (`parallel = true` in the config).
//!
//! ## Quick Start
//!
//! ```rust
//! use mgsync_core::models::Variant;
//! use mgsync_engine::{MultiGenomeProject, SyncConfig};
//!
//! let config: SyncConfig = "reference_genome = \"hg38\"\n[chromosomes]\nchr1 = 1000\n"
//!     .parse()
//!     .unwrap();
//! let mut project = MultiGenomeProject::from_config(config);
//!
//! project.add_variant(Variant::insertion("sample_a", "chr1", 100, 4)).unwrap();
//! project.add_variant(Variant::insertion("sample_b", "chr1", 100, 2)).unwrap();
//! project.compute().unwrap();
//!
//! assert_eq!(project.get_meta_genome_length("chr1").unwrap(), 1004);
//!
//! let track = project.get_chromosome_track("sample_b", "chr1").unwrap();
//! assert_eq!(track.variant_at(100).unwrap().extra_offset(), 2);
//! ```
pub mod chromosome;
pub mod clock;
pub mod config;
pub mod engine;
pub mod errors;
pub mod meta_length;
pub mod project;

pub use chromosome::{ChromosomeState, ChromosomeStatus};
pub use clock::ReferenceClock;
pub use config::{SyncConfig, SyncConfigError};
pub use engine::{ChromosomeReport, SynchronizationEngine};
pub use errors::{SyncError, SyncResult};
pub use meta_length::MetaGenomeLength;
pub use project::{ChromosomeFailure, MultiGenomeProject, ProjectReport};
