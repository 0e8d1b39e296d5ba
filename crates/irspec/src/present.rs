//! Turning a parsed report and its broadened spectrum into files for people
//! to look at. Nothing here re-derives the lines or the curve.

use std::{error::Error, fmt::Display, fs::File, io::BufWriter, path::Path};

use broaden::{Peak, Spectrum};
use qcreport::Report;
use serde::Serialize;

pub mod plot;
pub mod summary;
pub mod table;
pub mod view;

#[cfg(test)]
mod tests;

#[derive(Debug)]
pub enum PresentError {
    Io(String, std::io::Error),
    Csv(String, csv::Error),
    /// plotters errors carry the backend's error type, so only the message is
    /// kept
    Plot(String, String),
    Json(String, serde_json::Error),
}

impl Display for PresentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PresentError::Io(file, e) => {
                write!(f, "failed to write {file}: {e}")
            }
            PresentError::Csv(file, e) => {
                write!(f, "failed to write table {file}: {e}")
            }
            PresentError::Plot(file, e) => {
                write!(f, "failed to draw {file}: {e}")
            }
            PresentError::Json(file, e) => {
                write!(f, "failed to serialize {file}: {e}")
            }
        }
    }
}

impl Error for PresentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PresentError::Io(_, e) => Some(e),
            PresentError::Csv(_, e) => Some(e),
            PresentError::Plot(..) => None,
            PresentError::Json(_, e) => Some(e),
        }
    }
}

/// create `path` for writing, wrapped in a [BufWriter]
pub(crate) fn create(path: &Path) -> Result<BufWriter<File>, PresentError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| PresentError::Io(path.display().to_string(), e))
}

/// The machine-readable record of a run
#[derive(Debug, Serialize)]
pub struct Results<'a> {
    pub job: &'a str,
    pub version: &'a str,
    pub report: &'a Report,

    /// the lines with intensities normalized to the strongest one
    pub peaks: &'a [Peak],

    /// wavenumber of the tallest point of the broadened spectrum
    pub max_frequency: Option<f64>,
}

impl<'a> Results<'a> {
    pub fn new(
        job: &'a str,
        version: &'a str,
        report: &'a Report,
        spectrum: &'a Spectrum,
    ) -> Self {
        Self {
            job,
            version,
            report,
            peaks: &spectrum.peaks,
            max_frequency: spectrum.argmax(),
        }
    }

    /// write `self` to `path` as pretty-printed JSON
    pub fn write(&self, path: &Path) -> Result<(), PresentError> {
        use std::io::Write;
        let name = path.display().to_string();
        let mut f = create(path)?;
        serde_json::to_writer_pretty(&mut f, self)
            .map_err(|e| PresentError::Json(name.clone(), e))?;
        writeln!(f)
            .and_then(|_| f.flush())
            .map_err(|e| PresentError::Io(name, e))
    }
}
