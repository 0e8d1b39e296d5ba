//! Configuration settings for an irspec run

use std::{
    error::Error,
    fmt::Display,
    fs::read_to_string,
    path::{Path, PathBuf},
};

use qcreport::program::{DEFAULT_TEMPLATE, Engine};
use serde::{Deserialize, Serialize};


#[derive(Debug)]
pub enum ConfigError {
    ReadFile(String, std::io::ErrorKind),
    Parse(String, toml::de::Error),
    /// a `{ file = "..." }` template could not be read
    Template(String, std::io::ErrorKind),
    Spectrum(broaden::ConfigError),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadFile(file, kind) => {
                write!(f, "failed to read config file {file}: {kind}")
            }
            ConfigError::Parse(file, e) => {
                write!(f, "failed to deserialize config file {file}: {e}")
            }
            ConfigError::Template(file, kind) => {
                write!(f, "failed to locate template file {file}: {kind}")
            }
            ConfigError::Spectrum(e) => write!(f, "in [spectrum]: {e}"),
            ConfigError::Invalid(s) => f.write_str(s),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Parse(_, e) => Some(e),
            ConfigError::Spectrum(e) => Some(e),
            _ => None,
        }
    }
}

/// Templates can either be literal strings in the config file, or the name of
/// a file to be loaded
#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(untagged)]
enum TemplateSrc {
    Literal(String),
    File { file: String },
}

impl TryFrom<TemplateSrc> for String {
    type Error = ConfigError;

    fn try_from(value: TemplateSrc) -> Result<Self, Self::Error> {
        match value {
            TemplateSrc::Literal(s) => Ok(s),
            TemplateSrc::File { file } => read_to_string(&file)
                .map_err(|e| ConfigError::Template(file, e.kind())),
        }
    }
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    /// The template input file for the quantum chemistry program. The
    /// directives {{.geom}}, {{.charge}}, and {{.mult}} are replaced with the
    /// atom lines of the structure, the molecular charge, and the spin
    /// multiplicity.
    template: Option<TemplateSrc>,

    /// The molecular charge. Defaults to 0.
    charge: Option<isize>,

    /// The spin multiplicity. Defaults to 1.
    multiplicity: Option<usize>,

    /// The program to run on the input file, and any arguments to pass before
    /// the input file name. Defaults to `orca` with no arguments.
    engine: Option<Engine>,

    /// The directory under which each job's directory is created. Defaults to
    /// the current directory.
    outdir: Option<String>,

    /// The wavenumber grid and peak width used to broaden the lines.
    spectrum: Option<broaden::Config>,

    plot: Option<PlotConfig>,

    summary: Option<SummaryConfig>,
}

/// Settings for the rendered spectrum
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlotConfig {
    /// image width in pixels
    pub width: u32,

    /// image height in pixels
    pub height: u32,

    /// normalized intensity above which a peak is marked and labeled
    pub label_threshold: f64,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 600,
            label_threshold: 0.1,
        }
    }
}

/// Settings for the text summary
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SummaryConfig {
    /// number of spectral lines listed on each page
    pub page_lines: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self { page_lines: 40 }
    }
}

/// Construct a full `Config` using [Config::load] on a TOML file or use
/// [Config::default] and the Builder pattern
#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(try_from = "RawConfig")]
pub struct Config {
    /// the template to use for the quantum chemistry program
    pub template: String,

    pub charge: isize,

    pub multiplicity: usize,

    pub engine: Engine,

    pub outdir: PathBuf,

    pub spectrum: broaden::Config,

    pub plot: PlotConfig,

    pub summary: SummaryConfig,
}

impl Default for Config {
    /// A closed-shell neutral molecule run with `orca` and the default
    /// optimization and frequency template, written under the current
    /// directory
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_owned(),
            charge: 0,
            multiplicity: 1,
            engine: Engine::default(),
            outdir: PathBuf::from("."),
            spectrum: broaden::Config::default(),
            plot: PlotConfig::default(),
            summary: SummaryConfig::default(),
        }
    }
}

impl TryFrom<RawConfig> for Config {
    type Error = ConfigError;

    fn try_from(rc: RawConfig) -> Result<Self, Self::Error> {
        let d = Self::default();
        let ret = Self {
            template: match rc.template {
                Some(t) => t.try_into()?,
                None => d.template,
            },
            charge: rc.charge.unwrap_or(d.charge),
            multiplicity: rc.multiplicity.unwrap_or(d.multiplicity),
            engine: rc.engine.unwrap_or(d.engine),
            outdir: rc.outdir.map(PathBuf::from).unwrap_or(d.outdir),
            spectrum: rc.spectrum.unwrap_or(d.spectrum),
            plot: rc.plot.unwrap_or(d.plot),
            summary: rc.summary.unwrap_or(d.summary),
        };
        ret.validate()?;
        Ok(ret)
    }
}

impl Config {
    pub fn charge(mut self, charge: isize) -> Self {
        self.charge = charge;
        self
    }

    pub fn multiplicity(mut self, multiplicity: usize) -> Self {
        self.multiplicity = multiplicity;
        self
    }

    pub fn engine(mut self, engine: Engine) -> Self {
        self.engine = engine;
        self
    }

    pub fn outdir(mut self, outdir: impl Into<PathBuf>) -> Self {
        self.outdir = outdir.into();
        self
    }

    /// load a [Config] from the TOML file specified by `filename`
    pub fn load(filename: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let name = filename.as_ref().display().to_string();
        let contents = std::fs::read_to_string(&filename)
            .map_err(|e| ConfigError::ReadFile(name.clone(), e.kind()))?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(name, e))
    }

    /// check that the settings in `self` make any sense
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.spectrum.validate().map_err(ConfigError::Spectrum)?;
        if self.multiplicity == 0 {
            return Err(ConfigError::Invalid(
                "multiplicity must be at least 1".to_owned(),
            ));
        }
        if self.summary.page_lines == 0 {
            return Err(ConfigError::Invalid(
                "summary.page_lines must be at least 1".to_owned(),
            ));
        }
        if self.plot.width == 0 || self.plot.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "plot size {}x{} is empty",
                self.plot.width, self.plot.height
            )));
        }
        Ok(())
    }
}

impl Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Config {
            template,
            charge,
            multiplicity,
            engine,
            outdir,
            spectrum,
            plot,
            summary,
        } = self;
        write!(
            f,
            "
Configuration Options:
template = {{
{template}}}
charge = {charge}
multiplicity = {multiplicity}
engine = {} {}
outdir = {}
spectrum = {} to {} cm-1, {} points, sigma = {}
plot = {}x{}, labels above {}
page_lines = {}
",
            engine.command,
            engine.args.join(" "),
            outdir.display(),
            spectrum.start,
            spectrum.end,
            spectrum.points,
            spectrum.sigma,
            plot.width,
            plot.height,
            plot.label_threshold,
            summary.page_lines,
        )
    }
}
