//! Tolerant extraction of vibrational lines, energies, and related listings
//! from the plain-text reports written by quantum chemistry programs, along
//! with the plumbing to produce those reports in the first place.

pub mod energy;
pub mod geom;
pub mod ir;
pub mod nmr;
pub mod number;
pub mod program;
pub mod raman;
pub mod report;

pub use energy::parse_energy;
pub use ir::{IrSource, SpectralLine, parse_ir};
pub use nmr::{ChemicalShift, parse_shifts};
pub use raman::{RamanLine, parse_raman};
pub use report::{Report, ReportError};

#[cfg(test)]
mod tests;

/// Intensity assigned to lines whose report gives only a frequency. This is a
/// placeholder for plotting, not a measured value; such lines are also marked
/// with [SpectralLine::synthetic].
pub const SENTINEL_INTENSITY: f64 = 1.0;

/// How a blank line inside a section is treated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Blank {
    /// blank lines never end the section
    Ignore,
    /// a blank line ends the section once a data row has been accepted.
    /// before that, up to `heading` blank lines are taken to be part of the
    /// section heading
    AfterRows { heading: usize },
}

/// Iterate over the lines of the section of `text` following the first line
/// containing `marker` (case-insensitive). Iteration stops at a line for
/// which `stop` returns true or at a blank line according to `blank`.
/// Callers report accepted data rows through [Section::accept].
pub(crate) fn section<'a, F>(
    text: &'a str,
    marker: &'static str,
    blank: Blank,
    stop: F,
) -> Section<'a, F>
where
    F: Fn(&str) -> bool,
{
    Section {
        lines: text.lines(),
        marker,
        blank,
        stop,
        started: false,
        done: false,
        rows: 0,
        blanks: 0,
    }
}

pub(crate) struct Section<'a, F> {
    lines: std::str::Lines<'a>,
    marker: &'static str,
    blank: Blank,
    stop: F,
    started: bool,
    done: bool,
    rows: usize,
    blanks: usize,
}

impl<F> Section<'_, F> {
    /// record that the caller accepted the last yielded line as a data row
    pub(crate) fn accept(&mut self) {
        self.rows += 1;
    }
}

impl<'a, F> Iterator for Section<'a, F>
where
    F: Fn(&str) -> bool,
{
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        for line in self.lines.by_ref() {
            if !self.started {
                self.started = has_marker(line, self.marker);
                continue;
            }
            let stop = if line.trim().is_empty() {
                match self.blank {
                    Blank::Ignore => false,
                    Blank::AfterRows { heading } => {
                        self.blanks += 1;
                        self.rows > 0 || self.blanks > heading
                    }
                }
            } else {
                (self.stop)(line)
            };
            if stop {
                break;
            }
            return Some(line);
        }
        self.done = true;
        None
    }
}

/// case-insensitive substring check for section markers
#[inline]
pub(crate) fn has_marker(line: &str, marker: &str) -> bool {
    line.to_ascii_uppercase().contains(marker)
}
