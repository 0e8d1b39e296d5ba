use std::sync::LazyLock;

use log::{debug, trace};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    Blank, SENTINEL_INTENSITY, has_marker,
    number::{FLOAT, parse_float},
    section,
};

/// A single vibrational mode as listed in a report
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpectralLine {
    /// the mode number printed by the program, if any
    pub index: Option<usize>,

    /// harmonic frequency in cm⁻¹
    pub frequency: f64,

    /// the reported intensity, or [SENTINEL_INTENSITY] if `synthetic`
    pub intensity: f64,

    /// true if the report gave no intensity for this line and `intensity` is
    /// only a placeholder
    #[serde(default)]
    pub synthetic: bool,
}

impl SpectralLine {
    pub fn new(index: Option<usize>, frequency: f64, intensity: f64) -> Self {
        Self {
            index,
            frequency,
            intensity,
            synthetic: false,
        }
    }

    /// a line with only a frequency, carrying the sentinel intensity
    pub fn frequency_only(index: Option<usize>, frequency: f64) -> Self {
        Self {
            index,
            frequency,
            intensity: SENTINEL_INTENSITY,
            synthetic: true,
        }
    }
}

/// Which part of the report produced a set of [SpectralLine]s
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IrSource {
    /// the IR spectrum table with real intensities
    Intensities,
    /// the plain frequency listing, with sentinel intensities
    FrequenciesOnly,
    /// nothing recognizable was found
    #[default]
    None,
}

/// `<index>[:] <freq> <intensity>` at the start of a line
static IR_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\s*(\d+):?\s+{FLOAT}\s+{FLOAT}")).unwrap()
});

/// `<index>: <freq> cm**-1` anywhere in a line
static FREQ_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\s*(\d+):\s+{FLOAT}\s+cm\*\*-1")).unwrap()
});

/// Extract the vibrational lines from `text`, preferring the IR spectrum
/// table with intensities and falling back to the frequency-only listing.
/// Both are empty when neither section is present.
pub fn parse_ir(text: &str) -> (Vec<SpectralLine>, IrSource) {
    let lines = ir_spectrum(text);
    if !lines.is_empty() {
        debug!("read {} lines from the IR spectrum", lines.len());
        return (lines, IrSource::Intensities);
    }
    let lines = vibrational_frequencies(text);
    if !lines.is_empty() {
        debug!(
            "no IR intensities found, read {} bare frequencies",
            lines.len()
        );
        return (lines, IrSource::FrequenciesOnly);
    }
    (lines, IrSource::None)
}

fn ir_spectrum(text: &str) -> Vec<SpectralLine> {
    let mut ret = Vec::new();
    let mut sec =
        section(text, "IR SPECTRUM", Blank::AfterRows { heading: 1 }, |l| {
            has_marker(l, "RAMAN") || has_marker(l, "NORMAL MODES")
        });
    while let Some(line) = sec.next() {
        let Some(caps) = IR_ROW.captures(line) else {
            continue;
        };
        let (Ok(index), Some(freq), Some(inten)) = (
            caps[1].parse(),
            parse_float(&caps[2]),
            parse_float(&caps[3]),
        ) else {
            trace!("skipping malformed IR row `{line}`");
            continue;
        };
        sec.accept();
        ret.push(SpectralLine::new(Some(index), freq, inten));
    }
    ret
}

fn vibrational_frequencies(text: &str) -> Vec<SpectralLine> {
    let mut ret = Vec::new();
    let sec = section(text, "VIBRATIONAL FREQUENCIES", Blank::Ignore, |l| {
        has_marker(l, "NORMAL MODES")
    });
    for line in sec {
        let Some(caps) = FREQ_ROW.captures(line) else {
            continue;
        };
        let (Ok(index), Some(freq)) = (caps[1].parse(), parse_float(&caps[2]))
        else {
            trace!("skipping malformed frequency row `{line}`");
            continue;
        };
        ret.push(SpectralLine::frequency_only(Some(index), freq));
    }
    ret
}
