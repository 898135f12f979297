//! Core models for meta-genome synchronization.
//!
//! A project holds several genomes, each described by its variants against a
//! shared reference genome. This crate provides the pieces every other mgsync
//! crate builds on:
//!
//! - [`Variant`](models::Variant): one insertion, deletion, structural variant,
//!   SNP or synthetic blank, with the offsets a synchronization pass assigns
//! - [`GenomeChromosomeTrack`](models::GenomeChromosomeTrack): the ordered
//!   variants of one genome on one chromosome, with the cursor a pass moves
//! - [`VariantRecord`](models::VariantRecord): the row format handed over by
//!   the variant access layer
//!
//! # Example
//!
//! ```rust
//! use mgsync_core::models::{GenomeChromosomeTrack, Variant};
//!
//! let track = GenomeChromosomeTrack::from_variants(
//!     "sample_a",
//!     "chr1",
//!     vec![
//!         Variant::insertion("sample_a", "chr1", 300, 2),
//!         Variant::deletion("sample_a", "chr1", 100, 5),
//!     ],
//! )
//! .unwrap();
//!
//! assert_eq!(track.positions().collect::<Vec<_>>(), vec![100, 300]);
//! assert!(track.variant_at(100).unwrap().is_deletion());
//! ```
pub mod errors;
pub mod models;
pub mod utils;

pub use errors::{VariantError, VariantResult};
