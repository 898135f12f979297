use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use log::info;

use crate::models::VariantRecord;

///
/// Get a reader for either a gzip'd or a plain file.
///
/// # Arguments
/// - path: path to the file to read
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

///
/// Read variant records from a tab separated file. Empty lines and lines
/// starting with `#` are skipped.
///
pub fn read_variant_records<T: AsRef<Path>>(path: T) -> Result<Vec<VariantRecord>> {
    let path = path.as_ref();
    let reader = get_dynamic_reader(path)?;

    let mut records = Vec::new();
    for (line_number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let record = VariantRecord::from_line(&line)
            .with_context(|| format!("{}:{}", path.display(), line_number + 1))?;
        records.push(record);
    }

    info!("Read {} variant records from {:?}", records.len(), path);

    Ok(records)
}

///
/// Read a chrom sizes file (`name<whitespace>length` per line).
///
pub fn read_chrom_sizes<T: AsRef<Path>>(path: T) -> Result<BTreeMap<String, u64>> {
    let path = path.as_ref();
    let reader = get_dynamic_reader(path).with_context(|| "Failed to open chrom sizes file.")?;

    let mut chrom_sizes = BTreeMap::new();
    for line in reader.lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        let (Some(name), Some(size)) = (parts.next(), parts.next()) else {
            continue;
        };
        let size = size
            .parse::<u64>()
            .with_context(|| format!("Invalid chromosome size for {}: {}", name, size))?;
        chrom_sizes.insert(name.to_string(), size);
    }

    Ok(chrom_sizes)
}
