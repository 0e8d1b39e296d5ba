use std::{error::Error, fmt::Display, path::Path};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    ChemicalShift, IrSource, RamanLine, SpectralLine, parse_energy, parse_ir,
    parse_raman, parse_shifts,
};

/// printed by ORCA as the last line of a complete run
const TERMINATED: &str = "ORCA TERMINATED NORMALLY";

#[derive(Debug, PartialEq, Eq)]
pub enum ReportError {
    FileNotFound(String),
    ReadFileError(String, std::io::ErrorKind),
}

impl Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportError::FileNotFound(file) => {
                write!(f, "report {file} not found")
            }
            ReportError::ReadFileError(file, kind) => {
                write!(f, "failed to read report {file}: {kind}")
            }
        }
    }
}

impl Error for ReportError {}

/// Everything extracted from a single report. Sections that are missing from
/// the report leave the corresponding field empty, and a missing energy is
/// `None`; neither is an error.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// vibrational lines in report order
    pub lines: Vec<SpectralLine>,

    /// which section `lines` came from
    pub source: IrSource,

    /// total energy in Hartree
    pub energy: Option<f64>,

    pub raman: Vec<RamanLine>,

    pub shifts: Vec<ChemicalShift>,

    /// whether the program's normal termination banner was found
    pub terminated: bool,
}

impl Report {
    pub fn parse(text: &str) -> Self {
        let (lines, source) = parse_ir(text);
        Self {
            lines,
            source,
            energy: parse_energy(text),
            raman: parse_raman(text),
            shifts: parse_shifts(text),
            terminated: text.contains(TERMINATED),
        }
    }

    /// Read and parse the report at `path`. Bytes that are not valid UTF-8
    /// are replaced rather than rejected.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                ReportError::FileNotFound(name.clone())
            }
            kind => ReportError::ReadFileError(name.clone(), kind),
        })?;
        let text = String::from_utf8_lossy(&bytes);
        let ret = Self::parse(&text);
        debug!(
            "{name}: {} lines from {:?}, energy {:?}",
            ret.lines.len(),
            ret.source,
            ret.energy
        );
        if !ret.terminated {
            warn!("{name} does not end in normal termination");
        }
        Ok(ret)
    }

    /// the `(frequency, intensity)` pairs of [Report::lines]
    pub fn pairs(&self) -> Vec<(f64, f64)> {
        self.lines.iter().map(|l| (l.frequency, l.intensity)).collect()
    }

    /// true if the intensities are placeholders rather than reported values
    pub fn synthetic_intensities(&self) -> bool {
        self.lines.iter().any(|l| l.synthetic)
    }
}
