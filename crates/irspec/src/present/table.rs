//! The line list as a spreadsheet-friendly table

use std::{io::Write, path::Path};

use qcreport::{SENTINEL_INTENSITY, SpectralLine};
use serde::Serialize;

use super::{PresentError, create};

/// written first so spreadsheet programs detect UTF-8
const BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Serialize)]
struct Row {
    #[serde(rename = "No.")]
    number: usize,
    #[serde(rename = "Frequency (cm-1)")]
    frequency: f64,
    #[serde(rename = "Intensity")]
    intensity: f64,
}

/// Write `lines` as CSV with 1-based row numbers. When every intensity is
/// zero the column carries no information, and [SENTINEL_INTENSITY] is written
/// in its place.
pub fn write_csv<W: Write>(
    mut w: W,
    lines: &[SpectralLine],
) -> Result<(), csv::Error> {
    w.write_all(BOM)?;
    let fill = lines.iter().all(|l| l.intensity == 0.0);
    let mut wtr = csv::Writer::from_writer(w);
    if lines.is_empty() {
        wtr.write_record(["No.", "Frequency (cm-1)", "Intensity"])?;
    }
    for (i, line) in lines.iter().enumerate() {
        wtr.serialize(Row {
            number: i + 1,
            frequency: line.frequency,
            intensity: if fill {
                SENTINEL_INTENSITY
            } else {
                line.intensity
            },
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_csv_file(
    path: &Path,
    lines: &[SpectralLine],
) -> Result<(), PresentError> {
    write_csv(create(path)?, lines)
        .map_err(|e| PresentError::Csv(path.display().to_string(), e))
}
