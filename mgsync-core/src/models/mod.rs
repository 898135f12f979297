pub mod record;
pub mod track;
pub mod variant;

// re-export for cleaner imports
pub use self::record::VariantRecord;
pub use self::track::{GenomeChromosomeTrack, TrackCursor};
pub use self::variant::{Variant, VariantKind};
