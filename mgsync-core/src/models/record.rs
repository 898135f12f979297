use std::fmt::{self, Display};
use std::str::FromStr;

use crate::errors::VariantError;
use crate::models::{Variant, VariantKind};

///
/// One row handed over by the variant access layer: a single event of one
/// genome on one chromosome.
///
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VariantRecord {
    pub genome_name: String,
    pub chromosome: String,
    pub reference_position: u64,
    pub kind: VariantKind,
    pub length: i64,
}

impl VariantRecord {
    ///
    /// Parse a tab separated line: `genome chromosome position kind length`.
    /// The length column may be omitted for SNPs.
    ///
    pub fn from_line(line: &str) -> Result<Self, VariantError> {
        let mut fields = line.split('\t');

        let mut next_field = |name: &str| {
            fields
                .next()
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .ok_or_else(|| VariantError::MalformedRecord(format!("missing {name}: {line}")))
        };

        let genome_name = next_field("genome")?.to_string();
        let chromosome = next_field("chromosome")?.to_string();
        let reference_position = next_field("position")?
            .parse::<u64>()
            .map_err(|_| VariantError::MalformedRecord(format!("invalid position: {line}")))?;
        let kind = next_field("kind")?.parse::<VariantKind>()?;
        let length = match next_field("length") {
            Ok(length) => length
                .parse::<i64>()
                .map_err(|_| VariantError::MalformedRecord(format!("invalid length: {line}")))?,
            Err(_) if kind == VariantKind::Snp => 0,
            Err(e) => return Err(e),
        };

        Ok(VariantRecord {
            genome_name,
            chromosome,
            reference_position,
            kind,
            length,
        })
    }
}

impl FromStr for VariantRecord {
    type Err = VariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VariantRecord::from_line(s)
    }
}

impl From<VariantRecord> for Variant {
    fn from(value: VariantRecord) -> Self {
        Variant::new(
            &value.genome_name,
            &value.chromosome,
            value.kind,
            value.reference_position,
            value.length,
        )
    }
}

impl From<&VariantRecord> for Variant {
    fn from(value: &VariantRecord) -> Self {
        Variant::new(
            &value.genome_name,
            &value.chromosome,
            value.kind,
            value.reference_position,
            value.length,
        )
    }
}

impl Display for VariantRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.genome_name, self.chromosome, self.reference_position, self.kind, self.length
        )
    }
}
