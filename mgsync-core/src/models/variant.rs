use std::fmt::{self, Display};
use std::str::FromStr;

use crate::errors::{VariantError, VariantResult};

///
/// The kind of genomic event a [Variant] describes.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VariantKind {
    Insertion,
    Deletion,
    StructuralVariant,
    Snp,
    /// Placeholder created during synchronization where another genome inserts.
    Blank,
}

impl VariantKind {
    /// Whether the variant length moves the position on the genome's own axis.
    #[inline]
    pub fn has_reference_effect(self) -> bool {
        !matches!(self, VariantKind::Snp)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VariantKind::Insertion => "INS",
            VariantKind::Deletion => "DEL",
            VariantKind::StructuralVariant => "SV",
            VariantKind::Snp => "SNP",
            VariantKind::Blank => "BLANK",
        }
    }
}

impl FromStr for VariantKind {
    type Err = VariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ins" | "insertion" => Ok(VariantKind::Insertion),
            "del" | "deletion" => Ok(VariantKind::Deletion),
            "sv" | "structural_variant" | "structuralvariant" => {
                Ok(VariantKind::StructuralVariant)
            }
            "snp" | "snv" => Ok(VariantKind::Snp),
            // blanks are never read from upstream data
            _ => Err(VariantError::UnknownKind(s.to_string())),
        }
    }
}

impl Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

///
/// One genomic event on one genome and chromosome.
///
/// The position and length come from upstream data. The offsets are assigned by
/// the synchronization pass and describe how positions at and after this
/// variant shift on the genome's own axis (`reference` offsets) and on the
/// shared meta-genome axis (`meta_genome` offsets).
///
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variant {
    genome_name: String,
    chromosome: String,
    kind: VariantKind,
    reference_position: u64,
    length: i64,
    genome_position: u64,
    extra_offset: i64,
    initial_reference_offset: i64,
    initial_meta_genome_offset: i64,
}

impl Variant {
    ///
    /// Create a new variant. Deletion lengths are stored as negative values
    /// whatever sign they arrive with, SNPs always have a length of zero.
    ///
    pub fn new(
        genome_name: &str,
        chromosome: &str,
        kind: VariantKind,
        reference_position: u64,
        length: i64,
    ) -> Self {
        let length = match kind {
            VariantKind::Deletion => -length.abs(),
            VariantKind::Snp => 0,
            VariantKind::Insertion | VariantKind::Blank => length.abs(),
            VariantKind::StructuralVariant => length,
        };

        Variant {
            genome_name: genome_name.to_string(),
            chromosome: chromosome.to_string(),
            kind,
            reference_position,
            length,
            genome_position: reference_position,
            extra_offset: 0,
            initial_reference_offset: 0,
            initial_meta_genome_offset: 0,
        }
    }

    pub fn insertion(genome_name: &str, chromosome: &str, position: u64, length: i64) -> Self {
        Variant::new(genome_name, chromosome, VariantKind::Insertion, position, length)
    }

    pub fn deletion(genome_name: &str, chromosome: &str, position: u64, length: i64) -> Self {
        Variant::new(genome_name, chromosome, VariantKind::Deletion, position, length)
    }

    pub fn structural_variant(
        genome_name: &str,
        chromosome: &str,
        position: u64,
        length: i64,
    ) -> Self {
        Variant::new(
            genome_name,
            chromosome,
            VariantKind::StructuralVariant,
            position,
            length,
        )
    }

    pub fn snp(genome_name: &str, chromosome: &str, position: u64) -> Self {
        Variant::new(genome_name, chromosome, VariantKind::Snp, position, 0)
    }

    pub fn blank(genome_name: &str, chromosome: &str, position: u64, length: i64) -> Self {
        Variant::new(genome_name, chromosome, VariantKind::Blank, position, length)
    }

    pub fn genome_name(&self) -> &str {
        &self.genome_name
    }

    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    pub fn kind(&self) -> VariantKind {
        self.kind
    }

    pub fn reference_position(&self) -> u64 {
        self.reference_position
    }

    pub fn length(&self) -> i64 {
        self.length
    }

    pub fn genome_position(&self) -> u64 {
        self.genome_position
    }

    pub fn extra_offset(&self) -> i64 {
        self.extra_offset
    }

    pub fn initial_reference_offset(&self) -> i64 {
        self.initial_reference_offset
    }

    pub fn initial_meta_genome_offset(&self) -> i64 {
        self.initial_meta_genome_offset
    }

    #[inline]
    pub fn is_blank(&self) -> bool {
        self.kind == VariantKind::Blank
    }

    #[inline]
    pub fn is_insertion(&self) -> bool {
        self.length > 0
            && matches!(
                self.kind,
                VariantKind::Insertion | VariantKind::StructuralVariant | VariantKind::Blank
            )
    }

    #[inline]
    pub fn is_deletion(&self) -> bool {
        self.length < 0
            && matches!(
                self.kind,
                VariantKind::Deletion | VariantKind::StructuralVariant
            )
    }

    /// Number of meta-genome positions this variant opens after its reference position.
    #[inline]
    pub fn meta_genome_width(&self) -> i64 {
        self.length.max(0) + self.extra_offset
    }

    pub fn next_reference_position_offset(&self) -> i64 {
        let effect = match self.kind.has_reference_effect() {
            true => self.length,
            false => 0,
        };
        self.initial_reference_offset + effect + self.extra_offset
    }

    pub fn next_meta_genome_position_offset(&self) -> i64 {
        self.initial_meta_genome_offset + self.length.max(0) + self.extra_offset
    }

    ///
    /// Assign the offsets this variant starts from. The genome position follows
    /// from the reference position and the reference offset.
    ///
    pub fn set_initial_offsets(&mut self, reference_offset: i64, meta_genome_offset: i64) {
        self.initial_reference_offset = reference_offset;
        self.initial_meta_genome_offset = meta_genome_offset;
        self.genome_position = self
            .reference_position
            .saturating_add_signed(reference_offset);
    }

    ///
    /// Grow the slack of this variant.
    ///
    /// # Arguments
    /// - delta: amount to add, must not be negative
    pub fn add_extra_offset(&mut self, delta: i64) -> VariantResult<()> {
        if delta < 0 {
            return Err(VariantError::InvalidOffset { delta });
        }
        self.extra_offset += delta;
        Ok(())
    }

    /// Forget everything a previous synchronization pass assigned.
    pub fn clear_offsets(&mut self) {
        self.extra_offset = 0;
        self.initial_reference_offset = 0;
        self.initial_meta_genome_offset = 0;
        self.genome_position = self.reference_position;
    }
}

impl Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.genome_name,
            self.chromosome,
            self.reference_position,
            self.kind,
            self.length,
            self.extra_offset,
            self.initial_reference_offset,
            self.initial_meta_genome_offset,
            self.next_reference_position_offset(),
            self.next_meta_genome_position_offset(),
        )
    }
}
