//! Writing input files for the quantum chemistry program and running it

use std::{
    error::Error,
    fmt::Display,
    fs::File,
    io::Write,
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::geom::Structure;

/// The default input: an optimization followed by a frequency calculation
pub const DEFAULT_TEMPLATE: &str = "! B3LYP def2-SVP Opt Freq TightSCF

* xyz {{.charge}} {{.mult}}
{{.geom}}*
";

/// number of trailing output lines kept as the diagnostic for a failed run
const DIAGNOSTIC_LINES: usize = 20;

#[derive(Debug)]
pub enum EngineError {
    /// the input file could not be written
    WriteInput(String, std::io::Error),
    /// the program could not be started at all
    Spawn(String, std::io::Error),
    /// the program ran but exited unsuccessfully. `diagnostic` holds the end
    /// of its captured output
    Failed {
        command: String,
        status: ExitStatus,
        diagnostic: String,
    },
}

impl EngineError {
    /// Returns `true` if the program started and then failed
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::WriteInput(file, e) => {
                write!(f, "failed to write {file}: {e}")
            }
            EngineError::Spawn(cmd, e) => {
                write!(f, "failed to start `{cmd}`: {e}")
            }
            EngineError::Failed {
                command,
                status,
                diagnostic,
            } => write!(f, "`{command}` failed with {status}:\n{diagnostic}"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EngineError::WriteInput(_, e) | EngineError::Spawn(_, e) => Some(e),
            EngineError::Failed { .. } => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub header: String,
}

impl Template {
    pub fn from(s: &str) -> Self {
        Self {
            header: s.to_string(),
        }
    }
}

impl Default for Template {
    fn default() -> Self {
        Self::from(DEFAULT_TEMPLATE)
    }
}

/// An ORCA job: the input file to write and the output file it produces
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Orca {
    /// path to the input and output files, without an extension
    filename: String,
    template: Template,
    charge: isize,
    multiplicity: usize,
    geom: Structure,
}

impl Orca {
    pub fn new(
        filename: String,
        template: Template,
        charge: isize,
        multiplicity: usize,
        geom: Structure,
    ) -> Self {
        Self {
            filename,
            template,
            charge,
            multiplicity,
            geom,
        }
    }

    pub fn infile(&self) -> String {
        self.filename.clone() + ".inp"
    }

    pub fn outfile(&self) -> String {
        self.filename.clone() + ".out"
    }

    /// Fill in the template. `{{.geom}}` is replaced with the atom lines of
    /// the structure, `{{.charge}}` with the molecular charge, and `{{.mult}}`
    /// with the spin multiplicity.
    pub fn input(&self) -> String {
        self.template
            .header
            .replace("{{.geom}}", &self.geom.coords())
            .replace("{{.charge}}", &self.charge.to_string())
            .replace("{{.mult}}", &self.multiplicity.to_string())
    }

    /// write the input file to [Orca::infile]
    pub fn write_input(&self) -> Result<(), EngineError> {
        let infile = self.infile();
        let mut f = File::create(&infile)
            .map_err(|e| EngineError::WriteInput(infile.clone(), e))?;
        write!(f, "{}", self.input())
            .map_err(|e| EngineError::WriteInput(infile.clone(), e))?;
        debug!("wrote {infile}");
        Ok(())
    }
}

/// The external program that turns an input file into a report
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Engine {
    /// the executable, resolved through `PATH` if it is not a path
    pub command: String,

    /// extra arguments placed before the input file name
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new("orca")
    }
}

impl Engine {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
        }
    }

    pub fn args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Run the program on `job`'s input file, which must already be written.
    /// stdout and stderr both go to [Orca::outfile], whose path is returned
    /// on success. The program runs in the directory containing the input
    /// file, since it writes its scratch files next to it.
    pub fn run(&self, job: &Orca) -> Result<PathBuf, EngineError> {
        let infile = PathBuf::from(job.infile());
        let outfile = PathBuf::from(job.outfile());
        let command = std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .chain(std::iter::once(infile.to_str().unwrap_or_default()))
            .collect::<Vec<_>>()
            .join(" ");
        let spawn =
            |e: std::io::Error| EngineError::Spawn(command.clone(), e);

        let out = File::create(&outfile).map_err(spawn)?;
        let err = out.try_clone().map_err(spawn)?;
        let dir = match infile.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let name = infile.file_name().map(PathBuf::from).unwrap_or_default();

        // relative program paths would otherwise be resolved against `dir`
        let program = if self.command.contains(std::path::MAIN_SEPARATOR) {
            std::fs::canonicalize(&self.command)
                .unwrap_or_else(|_| PathBuf::from(&self.command))
        } else {
            PathBuf::from(&self.command)
        };

        info!("running `{command}`");
        let status = Command::new(program)
            .args(&self.args)
            .arg(name)
            .current_dir(dir)
            .stdout(Stdio::from(out))
            .stderr(Stdio::from(err))
            .status()
            .map_err(spawn)?;

        if !status.success() {
            return Err(EngineError::Failed {
                command,
                status,
                diagnostic: tail(&outfile, DIAGNOSTIC_LINES),
            });
        }
        Ok(outfile)
    }
}

/// the last `n` lines of the file at `path`, or an empty string if it can't
/// be read
fn tail(path: &Path, n: usize) -> String {
    let Ok(bytes) = std::fs::read(path) else {
        return String::new();
    };
    let text = String::from_utf8_lossy(&bytes);
    let lines: Vec<_> = text.lines().collect();
    lines[lines.len().saturating_sub(n)..].join("\n")
}
