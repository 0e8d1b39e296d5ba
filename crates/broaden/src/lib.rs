//! Gaussian broadening of discrete vibrational lines into a continuous
//! spectrum for plotting.
//!
//! The width of each Gaussian is a display parameter, not a physical
//! linewidth.

use std::{error::Error, fmt::Display};

use log::debug;
use serde::{Deserialize, Serialize};


/// The sampled wavenumber domain and peak width
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// lowest wavenumber sampled, in cm⁻¹
    pub start: f64,

    /// highest wavenumber sampled, in cm⁻¹
    pub end: f64,

    /// number of samples, including both endpoints
    pub points: usize,

    /// standard deviation of each Gaussian, in cm⁻¹
    pub sigma: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start: 400.0,
            end: 4000.0,
            points: 3601,
            sigma: 15.0,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    TooFewPoints(usize),
    EmptyDomain { start: f64, end: f64 },
    BadWidth(f64),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::TooFewPoints(n) => {
                write!(f, "at least 2 points are required, got {n}")
            }
            ConfigError::EmptyDomain { start, end } => {
                write!(f, "start ({start}) must be less than end ({end})")
            }
            ConfigError::BadWidth(sigma) => {
                write!(f, "peak width must be positive, got {sigma}")
            }
        }
    }
}

impl Error for ConfigError {}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.points < 2 {
            return Err(ConfigError::TooFewPoints(self.points));
        }
        // also rejects NaN
        if !(self.start < self.end) {
            return Err(ConfigError::EmptyDomain {
                start: self.start,
                end: self.end,
            });
        }
        if !(self.sigma > 0.0) || !self.sigma.is_finite() {
            return Err(ConfigError::BadWidth(self.sigma));
        }
        Ok(())
    }

    /// the distance between adjacent samples
    pub fn spacing(&self) -> f64 {
        (self.end - self.start) / (self.points.max(2) - 1) as f64
    }
}

/// A line used to build a [Spectrum], with its intensity normalized to the
/// strongest line
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub frequency: f64,
    pub intensity: f64,
}

/// A broadened spectrum sampled on a fixed grid
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    /// wavenumbers, strictly increasing
    pub x: Vec<f64>,

    /// intensities at each `x`, with a maximum of 1 unless every sample is 0
    pub y: Vec<f64>,

    /// the input lines with normalized intensities, in input order
    pub peaks: Vec<Peak>,
}

impl Spectrum {
    /// the peaks whose normalized intensity exceeds `threshold`, for labeling
    pub fn significant_peaks(
        &self,
        threshold: f64,
    ) -> impl Iterator<Item = &Peak> {
        self.peaks.iter().filter(move |p| p.intensity > threshold)
    }

    /// the wavenumber of the largest sample, or `None` for an empty spectrum.
    /// the first of several equal maxima wins
    pub fn argmax(&self) -> Option<f64> {
        let mut best: Option<(f64, f64)> = None;
        for (&x, &y) in self.x.iter().zip(&self.y) {
            if best.is_none_or(|(_, by)| y > by) {
                best = Some((x, y));
            }
        }
        best.map(|(x, _)| x)
    }

    /// true if every sample is zero
    pub fn is_flat(&self) -> bool {
        self.y.iter().all(|&y| y == 0.0)
    }
}

/// Divide every intensity by the largest one, clamping negative results to 0.
/// If the largest intensity is not a positive, finite number there is nothing
/// meaningful to scale by, and every result is 0.
pub fn normalize(intensities: &[f64]) -> Vec<f64> {
    let max = intensities.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !(max > 0.0) || !max.is_finite() {
        return vec![0.0; intensities.len()];
    }
    intensities.iter().map(|i| (i / max).max(0.0)).collect()
}

/// `n` evenly spaced values from `start` to `end`, inclusive
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            let mut ret: Vec<f64> =
                (0..n).map(|i| start + step * i as f64).collect();
            // avoid accumulating rounding error at the far end
            ret[n - 1] = end;
            ret
        }
    }
}

/// Broaden `lines`, given as `(frequency, intensity)` pairs, into a
/// [Spectrum] on the grid described by `config`. Each line contributes
/// `I * exp(-(x - f)² / 2σ²)` with `I` normalized to the strongest line, and
/// the summed curve is scaled so its maximum is exactly 1. An empty or
/// all-zero input yields a curve of zeros.
pub fn synthesize(lines: &[(f64, f64)], config: &Config) -> Spectrum {
    let intensities: Vec<f64> = lines.iter().map(|&(_, i)| i).collect();
    let peaks: Vec<Peak> = lines
        .iter()
        .zip(normalize(&intensities))
        .map(|(&(frequency, _), intensity)| Peak {
            frequency,
            intensity,
        })
        .collect();

    let x = linspace(config.start, config.end, config.points);
    let two_s2 = 2.0 * config.sigma * config.sigma;
    let mut y: Vec<f64> = x
        .iter()
        .map(|&x| {
            peaks
                .iter()
                .map(|p| {
                    let d = x - p.frequency;
                    p.intensity * (-d * d / two_s2).exp()
                })
                .sum()
        })
        .collect();

    let max = y.iter().copied().fold(0.0, f64::max);
    if max > 0.0 {
        for v in &mut y {
            *v /= max;
        }
    } else {
        debug!("broadened spectrum is flat, skipping normalization");
    }

    Spectrum { x, y, peaks }
}
