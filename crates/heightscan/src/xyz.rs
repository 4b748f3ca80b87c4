//! Import of tab-separated XYZ measurement files.
//!
//! Each line holds `x<TAB>y<TAB>z` in millimetres; extra columns are ignored.
//! Values are converted to metres on import.

use std::path::Path;

use heightscan_core::{Result, Sample};

/// Millimetres per metre.
const MM_PER_M: f32 = 1000.0;

/// Parses XYZ text into samples in metres.
///
/// Blank lines, lines with fewer than three fields, and lines whose first
/// three fields are not finite numbers are skipped.
pub fn parse_str(text: &str) -> Vec<Sample> {
    let mut skipped = 0usize;
    let samples: Vec<Sample> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let sample = parse_line(line);
            if sample.is_none() {
                skipped += 1;
            }
            sample
        })
        .collect();

    if skipped > 0 {
        log::debug!("skipped {skipped} malformed XYZ lines");
    }
    samples
}

fn parse_line(line: &str) -> Option<Sample> {
    let mut fields = line.split('\t').map(|f| f.trim().parse::<f32>().ok());
    let x = fields.next()??;
    let y = fields.next()??;
    let z = fields.next()??;
    if !(x.is_finite() && y.is_finite() && z.is_finite()) {
        return None;
    }
    Some(Sample::new(x / MM_PER_M, y / MM_PER_M, z / MM_PER_M))
}

/// Reads and parses an XYZ file.
///
/// Invalid UTF-8 is replaced rather than rejected; only the lines it lands on
/// are skipped.
pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<Sample>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let samples = parse_str(&String::from_utf8_lossy(&bytes));
    log::info!("read {} samples from {}", samples.len(), path.display());
    Ok(samples)
}
